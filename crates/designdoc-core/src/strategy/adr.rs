use super::markdown::{metadata_footer, MarkdownDoc};
use super::{ensure_supported, supports_any, OutputStrategy};
use crate::config::RenderOptions;
use crate::domain::{section_body_or, DomainResult, Section};
use crate::error::Result;
use crate::extract::{FieldExtractor, TBD, TO_BE_DEFINED};
use crate::output::{OutputArtifacts, OutputDocument};
use crate::types::Approach;

pub const ADR_DOCUMENT: &str = "adr.md";

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AdrStrategy;

/// Map a workflow status onto the ADR lifecycle.
pub fn adr_status(raw: &str) -> &'static str {
    match raw.trim().to_ascii_lowercase().as_str() {
        "completed" | "complete" | "accepted" | "approved" => "Accepted",
        "deprecated" => "Deprecated",
        "superseded" => "Superseded",
        _ => "Proposed",
    }
}

/// Decision record body shared with the Spec-Kit set.
pub(crate) fn adr_document(title: &str, status: &str, sections: &[Section]) -> MarkdownDoc {
    let mut doc = MarkdownDoc::new(&format!("ADR: {title}"));
    doc.section("Status", status)
        .section(
            "Context",
            &section_body_or(
                sections,
                &["context", "background", "overview", "summary", "problem"],
                TO_BE_DEFINED,
            ),
        )
        .section(
            "Decision",
            &section_body_or(
                sections,
                &["decision", "proposal", "approach", "solution"],
                TBD,
            ),
        )
        .section(
            "Consequences",
            &section_body_or(sections, &["consequences", "impact", "tradeoffs", "risks"], TBD),
        )
        .section(
            "Alternatives Considered",
            &section_body_or(sections, &["alternatives", "options"], TBD),
        );
    doc
}

fn raw_status(input: &DomainResult) -> String {
    match input {
        DomainResult::Session(s) => FieldExtractor::new(s).status(),
        DomainResult::Prompt(p) => p.metadata.get("status").cloned().unwrap_or_default(),
    }
}

impl OutputStrategy for AdrStrategy {
    fn approach(&self) -> Approach {
        Approach::Adr
    }

    fn supports(&self, domain_type: &str) -> bool {
        supports_any(domain_type)
    }

    fn render(&self, input: &DomainResult, options: &RenderOptions) -> Result<OutputArtifacts> {
        ensure_supported(self, input)?;

        let doc = adr_document(
            &input.title(),
            adr_status(&raw_status(input)),
            &input.sections(),
        );
        let content = doc.finish(metadata_footer(input, options));
        Ok(OutputArtifacts::single(OutputDocument::markdown(
            ADR_DOCUMENT,
            content,
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::PromptResult;
    use crate::session::SessionRecord;
    use serde_json::json;

    #[test]
    fn status_mapping() {
        assert_eq!(adr_status("completed"), "Accepted");
        assert_eq!(adr_status(" Accepted "), "Accepted");
        assert_eq!(adr_status("deprecated"), "Deprecated");
        assert_eq!(adr_status("superseded"), "Superseded");
        assert_eq!(adr_status("draft"), "Proposed");
        assert_eq!(adr_status(""), "Proposed");
    }

    #[test]
    fn session_decision_record() {
        let mut s = SessionRecord::default();
        s.status = Some("completed".into());
        s.context.insert("title".into(), json!("Adopt Postgres"));
        s.context.insert("decision".into(), json!("Use Postgres 16 for all services"));
        s.context
            .insert("alternatives".into(), json!(["MySQL", {"name": "CockroachDB"}]));
        let out = AdrStrategy
            .render(&DomainResult::from(s), &RenderOptions::default().without_metadata())
            .unwrap();
        let md = &out.primary.content;
        assert_eq!(out.primary.name, "adr.md");
        assert!(md.starts_with("# ADR: Adopt Postgres\n\n## Status\n\nAccepted\n"));
        assert!(md.contains("## Decision\n\nUse Postgres 16 for all services\n"));
        assert!(md.contains("## Alternatives Considered\n\n- MySQL\n- CockroachDB\n"));
        assert!(md.contains("## Consequences\n\nTBD\n"));
    }

    #[test]
    fn prompt_status_from_metadata() {
        let mut prompt = PromptResult::default();
        prompt.metadata.insert("status".into(), "superseded".into());
        prompt.sections.push(Section::new("Background", "Two queues exist"));
        let out = AdrStrategy
            .render(&DomainResult::from(prompt), &RenderOptions::default().without_metadata())
            .unwrap();
        assert!(out.primary.content.contains("## Status\n\nSuperseded\n"));
        assert!(out.primary.content.contains("## Context\n\nTwo queues exist\n"));
    }
}
