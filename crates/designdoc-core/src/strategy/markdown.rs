use crate::config::RenderOptions;
use crate::domain::DomainResult;
use crate::extract::{FieldExtractor, NONE_SPECIFIED};
use crate::plan::{Plan, TimelineEntry};
use crate::spec::{AcceptanceCriterion, ParsedSpec, Requirement};
use crate::tasks::{tasks_by_phase, total_estimate, DerivedTask};
use crate::text::{bullet_list, checklist, humanize_key, table_cell};
use chrono::{DateTime, SecondsFormat, Utc};

// ---------------------------------------------------------------------------
// MarkdownDoc
// ---------------------------------------------------------------------------

/// Accumulates a markdown document: one `#` heading, then `##` sections.
pub(crate) struct MarkdownDoc {
    out: String,
}

impl MarkdownDoc {
    pub(crate) fn new(heading: &str) -> Self {
        Self {
            out: format!("# {heading}\n"),
        }
    }

    pub(crate) fn section(&mut self, title: &str, body: &str) -> &mut Self {
        self.out.push_str(&format!("\n## {title}\n\n{}\n", body.trim_end()));
        self
    }

    pub(crate) fn paragraph(&mut self, text: &str) -> &mut Self {
        self.out.push_str(&format!("\n{}\n", text.trim_end()));
        self
    }

    pub(crate) fn finish(mut self, footer: Option<String>) -> String {
        if let Some(footer) = footer {
            self.out.push('\n');
            self.out.push_str(&footer);
        }
        self.out
    }
}

pub(crate) fn timestamp(ts: DateTime<Utc>) -> String {
    ts.to_rfc3339_opts(SecondsFormat::Secs, true)
}

// ---------------------------------------------------------------------------
// Metadata footer
// ---------------------------------------------------------------------------

/// Footer listing where the document came from, or `None` when metadata is
/// switched off. The timestamp is `generated_at`, else the latest history
/// entry; the clock is never read.
pub(crate) fn metadata_footer(input: &DomainResult, options: &RenderOptions) -> Option<String> {
    if !options.include_metadata {
        return None;
    }

    let mut lines: Vec<String> = Vec::new();
    let mut stamp = options.generated_at;
    match input {
        DomainResult::Session(session) => {
            let ex = FieldExtractor::new(session);
            if !session.id.trim().is_empty() {
                lines.push(format!("- **Session**: {}", session.id.trim()));
            }
            lines.push(format!("- **Phase**: {}", ex.phase()));
            lines.push(format!("- **Status**: {}", ex.status()));
            stamp = stamp.or_else(|| session.last_updated());
        }
        DomainResult::Prompt(prompt) => {
            for (key, value) in &prompt.metadata {
                lines.push(format!("- **{}**: {}", humanize_key(key), value));
            }
        }
    }
    if let Some(ts) = stamp {
        lines.push(format!("- **Generated**: {}", timestamp(ts)));
    }
    if let Some(author) = options.author.as_deref().filter(|a| !a.trim().is_empty()) {
        lines.push(format!("- **Author**: {}", author.trim()));
    }
    if lines.is_empty() {
        return None;
    }
    Some(format!("---\n\n{}\n", lines.join("\n")))
}

// ---------------------------------------------------------------------------
// Spec
// ---------------------------------------------------------------------------

fn requirement_table(reqs: &[Requirement]) -> String {
    if reqs.is_empty() {
        return NONE_SPECIFIED.to_string();
    }
    let mut out = String::from("| ID | Requirement | Priority |\n|----|-------------|----------|\n");
    for r in reqs {
        out.push_str(&format!(
            "| {} | {} | {} |\n",
            r.id,
            table_cell(&r.description),
            r.priority
        ));
    }
    out
}

fn criteria_table(criteria: &[AcceptanceCriterion]) -> String {
    if criteria.is_empty() {
        return NONE_SPECIFIED.to_string();
    }
    let mut out = String::from("| ID | Criterion | Verification |\n|----|-----------|--------------|\n");
    for c in criteria {
        out.push_str(&format!(
            "| {} | {} | {} |\n",
            c.id,
            table_cell(&c.description),
            c.verification_method
        ));
    }
    out
}

pub(crate) fn spec_document(spec: &ParsedSpec) -> MarkdownDoc {
    let mut doc = MarkdownDoc::new(&spec.title);
    doc.section("Overview", &spec.overview)
        .section("Objectives", &bullet_list(&spec.objectives, NONE_SPECIFIED))
        .section(
            "Functional Requirements",
            &requirement_table(&spec.functional_requirements),
        )
        .section(
            "Non-Functional Requirements",
            &requirement_table(&spec.non_functional_requirements),
        )
        .section("Acceptance Criteria", &criteria_table(&spec.acceptance_criteria))
        .section("Constraints", &bullet_list(&spec.constraints, NONE_SPECIFIED))
        .section("Out of Scope", &bullet_list(&spec.out_of_scope, NONE_SPECIFIED));
    doc
}

/// Same layout as `spec_document`, read straight off the extractor.
pub(crate) fn loose_spec_document(ex: &FieldExtractor<'_>) -> MarkdownDoc {
    let mut doc = MarkdownDoc::new(&ex.title());
    doc.section("Overview", &ex.overview())
        .section("Objectives", &bullet_list(&ex.objectives(), NONE_SPECIFIED))
        .section(
            "Functional Requirements",
            &bullet_list(&ex.requirements(), NONE_SPECIFIED),
        )
        .section(
            "Non-Functional Requirements",
            &bullet_list(&ex.non_functional_requirements(), NONE_SPECIFIED),
        )
        .section(
            "Acceptance Criteria",
            &checklist(&ex.acceptance_criteria(), NONE_SPECIFIED),
        )
        .section("Constraints", &bullet_list(&ex.constraints(), NONE_SPECIFIED))
        .section("Out of Scope", &bullet_list(&ex.out_of_scope(), NONE_SPECIFIED));
    doc
}

// ---------------------------------------------------------------------------
// Plan
// ---------------------------------------------------------------------------

pub(crate) fn week_range(entry: &TimelineEntry) -> String {
    if entry.start_week == entry.end_week {
        format!("Week {}", entry.start_week)
    } else {
        format!("Weeks {}-{}", entry.start_week, entry.end_week)
    }
}

pub(crate) fn timeline_table(plan: &Plan) -> String {
    if plan.timeline.is_empty() {
        return NONE_SPECIFIED.to_string();
    }
    let mut out = String::from("| Phase | Weeks |\n|-------|-------|\n");
    for entry in &plan.timeline {
        let name = plan
            .phase_for(entry)
            .map(|p| p.name.as_str())
            .unwrap_or(entry.phase.as_str());
        out.push_str(&format!("| {} | {} |\n", table_cell(name), week_range(entry)));
    }
    out
}

pub(crate) fn plan_document(title: &str, plan: &Plan) -> MarkdownDoc {
    let mut doc = MarkdownDoc::new(&format!("Implementation Plan: {title}"));
    doc.section("Approach", &plan.approach);

    let mut phases = String::new();
    for phase in &plan.phases {
        phases.push_str(&format!(
            "### {}: {}\n\n{}\n\n**Duration**: {}\n\n**Deliverables**:\n{}\n\n",
            phase.id,
            phase.name,
            phase.description,
            phase.duration,
            bullet_list(&phase.deliverables, NONE_SPECIFIED)
        ));
    }
    doc.section("Phases", &phases);
    doc.section("Timeline", &timeline_table(plan));

    let deps: Vec<String> = plan
        .dependencies
        .iter()
        .map(|d| match &d.owner {
            Some(owner) => format!("{}: {} (owner: {owner})", d.id, d.description),
            None => format!("{}: {}", d.id, d.description),
        })
        .collect();
    doc.section("Dependencies", &bullet_list(&deps, NONE_SPECIFIED));

    let risks = if plan.risks.is_empty() {
        NONE_SPECIFIED.to_string()
    } else {
        let mut out =
            String::from("| ID | Risk | Severity | Mitigation |\n|----|------|----------|------------|\n");
        for r in &plan.risks {
            out.push_str(&format!(
                "| {} | {} | {} | {} |\n",
                r.id,
                table_cell(&r.description),
                r.severity,
                table_cell(&r.mitigation)
            ));
        }
        out
    };
    doc.section("Risks", &risks);
    doc
}

// ---------------------------------------------------------------------------
// Tasks
// ---------------------------------------------------------------------------

pub(crate) fn tasks_document(title: &str, tasks: &[DerivedTask]) -> MarkdownDoc {
    let mut doc = MarkdownDoc::new(&format!("Tasks: {title}"));
    doc.paragraph(&format!(
        "**Total tasks**: {}\n**Total estimate**: {}",
        tasks.len(),
        total_estimate(tasks)
    ));
    if tasks.is_empty() {
        doc.paragraph("No tasks defined.");
        return doc;
    }

    for (phase, group) in tasks_by_phase(tasks) {
        let mut body = String::new();
        for task in group {
            body.push_str(&format!(
                "### {}: {}\n\n- **Priority**: {}\n- **Estimate**: {}\n",
                task.id, task.title, task.priority, task.estimate
            ));
            if !task.dependencies.is_empty() {
                body.push_str(&format!("- **Depends on**: {}\n", task.dependencies.join(", ")));
            }
            body.push_str(&format!(
                "\n{}\n\n{}\n\n",
                task.description,
                checklist(&task.acceptance_criteria, NONE_SPECIFIED)
            ));
        }
        doc.section(&humanize_key(&phase), &body);
    }
    doc
}

/// The degraded task document: one checklist line per task.
pub(crate) fn task_checklist_document(title: &str, tasks: &[DerivedTask]) -> MarkdownDoc {
    let items: Vec<String> = tasks
        .iter()
        .map(|t| format!("{}: {} ({})", t.id, t.title, t.estimate))
        .collect();
    let mut doc = MarkdownDoc::new(&format!("Tasks: {title}"));
    doc.section("Checklist", &checklist(&items, "No tasks defined."));
    doc
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
