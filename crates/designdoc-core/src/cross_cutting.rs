use crate::error::Result;
use crate::extract::FieldExtractor;
use crate::output::CrossCuttingArtifact;
use crate::plan::derive_phases;
use crate::session::SessionRecord;
use crate::spec::{sequence_id, ParsedSpec, Requirement};
use crate::strategy::folder_name;
use crate::text::{checklist, short_title};
use crate::types::{CrossCuttingCapability, DocumentFormat, Priority};
use serde_yaml::{Mapping, Value as YamlValue};

/// Build one cross-cutting artifact for a session. Output depends only on
/// the session, so repeated calls agree byte for byte.
pub fn generate(capability: CrossCuttingCapability, session: &SessionRecord) -> Result<CrossCuttingArtifact> {
    let ex = FieldExtractor::new(session);
    let title = ex.title();
    let folder = folder_name(&title);

    let (name, content, format) = match capability {
        CrossCuttingCapability::Workflow => (
            format!(".github/workflows/{folder}-docs.yml"),
            workflow(&title, &folder)?,
            DocumentFormat::Yaml,
        ),
        CrossCuttingCapability::Diagram => (
            format!("{folder}/diagram.mmd"),
            diagram(session),
            DocumentFormat::Mermaid,
        ),
        CrossCuttingCapability::Issues => (
            format!("{folder}/issues.md"),
            issues(session, &title),
            DocumentFormat::Markdown,
        ),
    };
    Ok(CrossCuttingArtifact {
        capability,
        name,
        content,
        format,
    })
}

// ---------------------------------------------------------------------------
// Workflow
// ---------------------------------------------------------------------------

fn ystr(s: impl Into<String>) -> YamlValue {
    YamlValue::String(s.into())
}

fn ymap(entries: Vec<(&str, YamlValue)>) -> YamlValue {
    let mut map = Mapping::new();
    for (key, value) in entries {
        map.insert(ystr(key), value);
    }
    YamlValue::Mapping(map)
}

/// GitHub Actions job that lints the generated documents on pull requests.
fn workflow(title: &str, folder: &str) -> Result<String> {
    let docs_glob = format!("{folder}/**");
    let doc = ymap(vec![
        ("name", ystr(format!("Docs: {title}"))),
        (
            "on",
            ymap(vec![(
                "pull_request",
                ymap(vec![("paths", YamlValue::Sequence(vec![ystr(docs_glob.clone())]))]),
            )]),
        ),
        (
            "jobs",
            ymap(vec![(
                "docs",
                ymap(vec![
                    ("runs-on", ystr("ubuntu-latest")),
                    (
                        "steps",
                        YamlValue::Sequence(vec![
                            ymap(vec![("uses", ystr("actions/checkout@v4"))]),
                            ymap(vec![
                                ("name", ystr("Lint markdown")),
                                ("uses", ystr("DavidAnson/markdownlint-cli2-action@v16")),
                                ("with", ymap(vec![("globs", ystr(format!("{docs_glob}/*.md")))])),
                            ]),
                        ]),
                    ),
                ]),
            )]),
        ),
    ]);
    Ok(serde_yaml::to_string(&doc)?)
}

// ---------------------------------------------------------------------------
// Diagram
// ---------------------------------------------------------------------------

fn node_index<'a>(nodes: &mut Vec<&'a str>, phase: &'a str) -> usize {
    match nodes.iter().position(|n| *n == phase) {
        Some(i) => i,
        None => {
            nodes.push(phase);
            nodes.len() - 1
        }
    }
}

fn mermaid_label(s: &str) -> String {
    s.replace('"', "'").replace('|', "/")
}

/// Flowchart of the phase history; the plan phases stand in when the
/// session has no transitions yet.
fn diagram(session: &SessionRecord) -> String {
    let mut out = String::from("flowchart LR\n");

    if session.history.is_empty() {
        let phases = derive_phases(&FieldExtractor::new(session));
        for (i, phase) in phases.iter().enumerate() {
            out.push_str(&format!(
                "    p{i}[\"{} ({})\"]\n",
                mermaid_label(&phase.name),
                mermaid_label(&phase.duration)
            ));
        }
        for i in 1..phases.len() {
            out.push_str(&format!("    p{} --> p{i}\n", i - 1));
        }
        return out;
    }

    let mut nodes: Vec<&str> = Vec::new();
    let mut edges: Vec<(usize, usize, Option<String>)> = Vec::new();
    for t in &session.history {
        let from = node_index(&mut nodes, &t.from);
        let to = node_index(&mut nodes, &t.to);
        let label = t
            .description
            .as_deref()
            .map(str::trim)
            .filter(|d| !d.is_empty())
            .map(mermaid_label);
        edges.push((from, to, label));
    }

    for (i, phase) in nodes.iter().enumerate() {
        out.push_str(&format!("    n{i}[\"{}\"]\n", mermaid_label(phase)));
    }
    for (from, to, label) in edges {
        match label {
            Some(label) => out.push_str(&format!("    n{from} -->|{label}| n{to}\n")),
            None => out.push_str(&format!("    n{from} --> n{to}\n")),
        }
    }
    if let Some(current) = nodes.iter().position(|n| *n == session.phase.trim()) {
        out.push_str(&format!("    style n{current} stroke-width:3px\n"));
    }
    out
}

// ---------------------------------------------------------------------------
// Issues
// ---------------------------------------------------------------------------

fn requirements(session: &SessionRecord) -> Vec<Requirement> {
    if let Ok(spec) = ParsedSpec::from_session(session) {
        return spec.all_requirements().cloned().collect();
    }
    let ex = FieldExtractor::new(session);
    let functional = ex.requirements().into_iter().enumerate().map(|(i, d)| Requirement {
        id: sequence_id("FR", i),
        description: d,
        priority: Priority::High,
    });
    let non_functional = ex
        .non_functional_requirements()
        .into_iter()
        .enumerate()
        .map(|(i, d)| Requirement {
            id: sequence_id("NFR", i),
            description: d,
            priority: Priority::Medium,
        });
    functional.chain(non_functional).collect()
}

/// One issue stub per requirement, ready to paste into a tracker.
fn issues(session: &SessionRecord, title: &str) -> String {
    let mut out = format!("# Issues: {title}\n");
    let reqs = requirements(session);
    if reqs.is_empty() {
        out.push_str("\nNo requirements defined.\n");
        return out;
    }
    let done: Vec<String> = ["Implemented", "Tests added", "Documentation updated"]
        .iter()
        .map(|s| s.to_string())
        .collect();
    for req in reqs {
        out.push_str(&format!(
            "\n## [{}] {}\n\n- **Labels**: requirement, priority:{}\n\n{}\n\n{}\n",
            req.id,
            short_title(&req.description),
            req.priority,
            req.description,
            checklist(&done, "")
        ));
    }
    out
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::{PhaseTransition, SessionConfig};
    use chrono::{TimeZone, Utc};
    use serde_json::json;

    fn session() -> SessionRecord {
        let mut s = SessionRecord::new("cc-1", "design");
        s.config = Some(SessionConfig {
            goal: Some("Webhook Retries".into()),
            requirements: vec!["Retry failed deliveries with backoff".into()],
            constraints: vec![],
        });
        s.context
            .insert("nonFunctionalRequirements".into(), json!(["p99 under 200ms"]));
        s
    }

    #[test]
    fn workflow_is_valid_yaml() {
        let art = generate(CrossCuttingCapability::Workflow, &session()).unwrap();
        assert_eq!(art.name, ".github/workflows/webhook-retries-docs.yml");
        assert_eq!(art.format, DocumentFormat::Yaml);
        let parsed: YamlValue = serde_yaml::from_str(&art.content).unwrap();
        assert_eq!(parsed["jobs"]["docs"]["runs-on"].as_str(), Some("ubuntu-latest"));
        assert_eq!(
            parsed["on"]["pull_request"]["paths"][0].as_str(),
            Some("webhook-retries/**")
        );
        assert_eq!(parsed["name"].as_str(), Some("Docs: Webhook Retries"));
    }

    #[test]
    fn diagram_from_plan_phases() {
        let art = generate(CrossCuttingCapability::Diagram, &session()).unwrap();
        assert_eq!(art.format, DocumentFormat::Mermaid);
        assert!(art.content.starts_with("flowchart LR\n"));
        assert!(art.content.contains("p0[\"Requirements Gathering (1 week)\"]"));
        assert!(art.content.contains("p2 --> p3"));
    }

    #[test]
    fn diagram_from_history() {
        let mut s = session();
        let at = |h| Utc.with_ymd_and_hms(2026, 4, 1, h, 0, 0).unwrap();
        s.history = vec![
            PhaseTransition {
                from: "intake".into(),
                to: "discovery".into(),
                timestamp: at(9),
                description: Some("Kickoff".into()),
            },
            PhaseTransition {
                from: "discovery".into(),
                to: "design".into(),
                timestamp: at(10),
                description: None,
            },
        ];
        let art = generate(CrossCuttingCapability::Diagram, &s).unwrap();
        assert_eq!(
            art.content,
            "flowchart LR\n    n0[\"intake\"]\n    n1[\"discovery\"]\n    n2[\"design\"]\n\
             \x20   n0 -->|Kickoff| n1\n    n1 --> n2\n    style n2 stroke-width:3px\n"
        );
    }

    #[test]
    fn issue_per_requirement() {
        let art = generate(CrossCuttingCapability::Issues, &session()).unwrap();
        assert_eq!(art.name, "webhook-retries/issues.md");
        let md = &art.content;
        assert!(md.contains("## [FR-001] retry failed deliveries with backoff"));
        assert!(md.contains("## [NFR-001] p99 under 200ms"));
        assert!(md.contains("priority:medium"));
        assert!(md.contains("- [ ] Tests added"));

        let empty = generate(CrossCuttingCapability::Issues, &SessionRecord::default()).unwrap();
        assert!(empty.content.contains("No requirements defined."));
    }
}
