use super::adr::{adr_document, adr_status};
use super::markdown::{
    loose_spec_document, metadata_footer, plan_document, spec_document, task_checklist_document,
    tasks_document, timestamp, week_range, MarkdownDoc,
};
use super::{folder_name, require_session, supports_sessions_only, OutputStrategy};
use crate::config::RenderOptions;
use crate::constitution::Constitution;
use crate::domain::{session_sections, DomainResult};
use crate::error::{DesignDocError, Result};
use crate::extract::{FieldExtractor, NONE_SPECIFIED};
use crate::output::{OutputArtifacts, OutputDocument};
use crate::plan::{derive_phases, derive_plan, Plan};
use crate::session::SessionRecord;
use crate::spec::ParsedSpec;
use crate::tasks::{derive_tasks, fallback_tasks, tasks_by_phase, total_estimate, DerivedTask};
use crate::text::{bullet_list, checklist, humanize_key, table_cell};
use crate::types::Approach;
use crate::validate::{validate_spec, SpecContent, ValidationResult};

/// The full Spec-Kit set: README, spec, plan, tasks, adr, roadmap and
/// (optionally) progress, with constitution validation on the spec.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SpecKitStrategy;

/// What the session yields: a parsed spec with derived tasks, or only the
/// tolerant extractor view.
enum Content {
    Derived { spec: ParsedSpec, tasks: Vec<DerivedTask> },
    Loose { tasks: Vec<DerivedTask> },
}

impl Content {
    fn from_session(session: &SessionRecord, ex: &FieldExtractor<'_>) -> Self {
        let parsed = match ParsedSpec::from_session(session) {
            Ok(spec) if spec.has_structured_data() => spec,
            Ok(_) => {
                tracing::warn!(
                    session = %session.id,
                    "no requirements or acceptance criteria; using task checklist"
                );
                return Content::Loose {
                    tasks: fallback_tasks(ex),
                };
            }
            Err(e) => {
                tracing::warn!(session = %session.id, error = %e, "spec did not parse; using task checklist");
                return Content::Loose {
                    tasks: fallback_tasks(ex),
                };
            }
        };
        match derive_tasks(&parsed) {
            Ok(tasks) => Content::Derived {
                spec: parsed,
                tasks,
            },
            Err(e) => {
                tracing::warn!(session = %session.id, error = %e, "task derivation failed; using task checklist");
                Content::Loose {
                    tasks: fallback_tasks(ex),
                }
            }
        }
    }

    fn tasks(&self) -> &[DerivedTask] {
        match self {
            Content::Derived { tasks, .. } | Content::Loose { tasks } => tasks,
        }
    }

    fn requirement_count(&self, ex: &FieldExtractor<'_>) -> usize {
        match self {
            Content::Derived { spec, .. } => spec.all_requirements().count(),
            Content::Loose { .. } => ex.requirements().len() + ex.non_functional_requirements().len(),
        }
    }

    fn spec_content(&self, ex: &FieldExtractor<'_>) -> SpecContent {
        match self {
            Content::Derived { spec, .. } => SpecContent::from_spec(spec),
            Content::Loose { .. } => SpecContent::from_extractor(ex),
        }
    }
}

// ---------------------------------------------------------------------------
// Validation
// ---------------------------------------------------------------------------

/// Validation runs when a constitution is supplied, or when the caller asked
/// to fail on errors (structure-only checks against an empty constitution).
fn run_validation(
    content: &SpecContent,
    options: &RenderOptions,
) -> Result<Option<ValidationResult>> {
    if !options.validate || (options.constitution.is_none() && !options.fail_on_validation_errors) {
        return Ok(None);
    }
    let empty = Constitution::default();
    let constitution = options.constitution.as_ref().unwrap_or(&empty);
    let result = validate_spec(content, constitution);

    if !result.valid {
        let errors: Vec<String> = result.errors().map(|i| i.message.clone()).collect();
        if options.fail_on_validation_errors {
            return Err(DesignDocError::ValidationFailed {
                score: result.score,
                errors,
            });
        }
        tracing::warn!(
            score = result.score,
            errors = errors.len(),
            "spec has validation errors; appending report"
        );
    }
    Ok(Some(result))
}

// ---------------------------------------------------------------------------
// Documents
// ---------------------------------------------------------------------------

const DOCUMENT_INDEX: &[(&str, &str)] = &[
    ("spec.md", "Requirements and acceptance criteria"),
    ("plan.md", "Phases, timeline, dependencies and risks"),
    ("tasks.md", "Ordered implementation tasks"),
    ("adr.md", "Architecture decision record"),
    ("roadmap.md", "Milestones and schedule"),
];

fn readme(
    title: &str,
    ex: &FieldExtractor<'_>,
    content: &Content,
    plan: &Plan,
    validation: Option<&ValidationResult>,
    include_progress: bool,
) -> MarkdownDoc {
    let mut doc = MarkdownDoc::new(title);
    doc.paragraph(&ex.overview());

    let mut index = String::from("| Document | Purpose |\n|----------|---------|\n");
    for (name, purpose) in DOCUMENT_INDEX {
        index.push_str(&format!("| [{name}]({name}) | {purpose} |\n"));
    }
    if include_progress {
        index.push_str("| [progress.md](progress.md) | Current status and history |\n");
    }
    doc.section("Documents", &index);

    let tasks = content.tasks();
    let mut summary = vec![
        format!("- **Phase**: {}", ex.phase()),
        format!("- **Status**: {}", ex.status()),
        format!("- **Requirements**: {}", content.requirement_count(ex)),
        format!("- **Tasks**: {}", tasks.len()),
        format!("- **Estimate**: {}", total_estimate(tasks)),
        format!("- **Duration**: {} weeks", plan.total_weeks()),
    ];
    if let Some(v) = validation {
        summary.push(format!("- **Validation score**: {}/100", v.score));
    }
    doc.section("Summary", &summary.join("\n"));
    doc
}

/// Plan fallback: the phase names as a checklist.
fn phase_checklist(title: &str, ex: &FieldExtractor<'_>) -> MarkdownDoc {
    let names: Vec<String> = derive_phases(ex).into_iter().map(|p| p.name).collect();
    let mut doc = MarkdownDoc::new(&format!("Implementation Plan: {title}"));
    doc.section("Phases", &checklist(&names, NONE_SPECIFIED));
    doc
}

fn roadmap(title: &str, ex: &FieldExtractor<'_>, plan: &Plan) -> MarkdownDoc {
    let mut doc = MarkdownDoc::new(&format!("Roadmap: {title}"));
    doc.section("Milestones", &checklist(&ex.milestones(), NONE_SPECIFIED));

    let mut schedule = String::from("| Phase | Weeks | Deliverables |\n|-------|-------|--------------|\n");
    for entry in &plan.timeline {
        let Some(phase) = plan.phase_for(entry) else {
            continue;
        };
        schedule.push_str(&format!(
            "| {} | {} | {} |\n",
            table_cell(&phase.name),
            week_range(entry),
            table_cell(&phase.deliverables.join(", "))
        ));
    }
    doc.section("Schedule", &schedule);
    doc.paragraph(&format!("**Total duration**: {} weeks", plan.total_weeks()));
    doc
}

fn progress(title: &str, session: &SessionRecord, tasks: &[DerivedTask]) -> MarkdownDoc {
    let ex = FieldExtractor::new(session);
    let mut doc = MarkdownDoc::new(&format!("Progress: {title}"));
    let updated = session
        .last_updated()
        .map(timestamp)
        .unwrap_or_else(|| "Not recorded".to_string());
    doc.paragraph(&format!(
        "- **Current phase**: {}\n- **Status**: {}\n- **Last updated**: {updated}",
        ex.phase(),
        ex.status()
    ));

    let body = if tasks.is_empty() {
        "No tasks defined.".to_string()
    } else {
        let mut table = String::from("| Phase | Tasks | Estimate |\n|-------|-------|----------|\n");
        for (phase, group) in tasks_by_phase(tasks) {
            let hours: u32 = group.iter().map(|t| t.estimate.hours()).sum();
            table.push_str(&format!(
                "| {} | {} | {hours}h |\n",
                humanize_key(&phase),
                group.len()
            ));
        }
        table.push_str(&format!(
            "| **Total** | {} | {} |\n",
            tasks.len(),
            total_estimate(tasks)
        ));
        table
    };
    doc.section("Tasks", &body);

    let history: Vec<String> = session
        .history
        .iter()
        .map(|t| {
            let mut line = format!("{}: {} -> {}", timestamp(t.timestamp), t.from, t.to);
            if let Some(d) = t.description.as_deref().filter(|d| !d.trim().is_empty()) {
                line.push_str(&format!(" ({})", d.trim()));
            }
            line
        })
        .collect();
    doc.section("History", &bullet_list(&history, "No phase transitions recorded."));
    doc
}

// ---------------------------------------------------------------------------
// Strategy
// ---------------------------------------------------------------------------

impl OutputStrategy for SpecKitStrategy {
    fn approach(&self) -> Approach {
        Approach::SpecKit
    }

    fn supports(&self, domain_type: &str) -> bool {
        supports_sessions_only(domain_type)
    }

    fn render(&self, input: &DomainResult, options: &RenderOptions) -> Result<OutputArtifacts> {
        let session = require_session(self, input)?;
        let ex = FieldExtractor::new(session);
        let title = ex.title();
        let folder = folder_name(&title);

        let content = Content::from_session(session, &ex);
        let validation = run_validation(&content.spec_content(&ex), options)?;
        let plan = derive_plan(&ex);

        let mut spec_md = match &content {
            Content::Derived { spec, .. } => spec_document(spec),
            Content::Loose { .. } => loose_spec_document(&ex),
        }
        .finish(None);
        if let Some(v) = &validation {
            spec_md.push('\n');
            spec_md.push_str(&v.to_markdown());
        }

        let (plan_md, tasks_md) = match &content {
            Content::Derived { tasks, .. } => (
                plan_document(&title, &plan).finish(None),
                tasks_document(&title, tasks).finish(None),
            ),
            Content::Loose { tasks } => (
                phase_checklist(&title, &ex).finish(None),
                task_checklist_document(&title, tasks).finish(None),
            ),
        };

        let readme_md = readme(
            &title,
            &ex,
            &content,
            &plan,
            validation.as_ref(),
            options.include_progress,
        )
        .finish(metadata_footer(input, options));
        let adr_md = adr_document(&title, adr_status(&ex.status()), &session_sections(session))
            .finish(None);
        let roadmap_md = roadmap(&title, &ex, &plan).finish(None);

        let mut secondary = vec![
            OutputDocument::markdown(format!("{folder}/spec.md"), spec_md),
            OutputDocument::markdown(format!("{folder}/plan.md"), plan_md),
            OutputDocument::markdown(format!("{folder}/tasks.md"), tasks_md),
            OutputDocument::markdown(format!("{folder}/adr.md"), adr_md),
            OutputDocument::markdown(format!("{folder}/roadmap.md"), roadmap_md),
        ];
        if options.include_progress {
            let progress_md = progress(&title, session, content.tasks()).finish(None);
            secondary.push(OutputDocument::markdown(
                format!("{folder}/progress.md"),
                progress_md,
            ));
        }

        Ok(OutputArtifacts::with_secondary(
            OutputDocument::markdown(format!("{folder}/README.md"), readme_md),
            secondary,
        ))
    }
}
