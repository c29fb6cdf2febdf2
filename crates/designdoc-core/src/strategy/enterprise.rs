use super::markdown::{metadata_footer, MarkdownDoc};
use super::{folder_name, require_session, supports_sessions_only, OutputStrategy};
use crate::config::RenderOptions;
use crate::domain::DomainResult;
use crate::error::Result;
use crate::extract::{FieldExtractor, NONE_SPECIFIED, TO_BE_DEFINED};
use crate::output::{OutputArtifacts, OutputDocument};
use crate::session::ContextKey;
use crate::text::{bullet_list, checklist};
use crate::types::Approach;

const COMPANION_DOCUMENTS: &[(&str, &str)] = &[
    ("HLD.md", "High-level design"),
    ("LLD.md", "Low-level design"),
    ("SECURITY.md", "Security review"),
    ("OPERATIONS.md", "Operations runbook"),
];

/// Technical design document plus its companion reviews.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct EnterpriseStrategy;

fn list(items: Vec<String>) -> String {
    bullet_list(&items, NONE_SPECIFIED)
}

fn technical_design(ex: &FieldExtractor<'_>, title: &str) -> MarkdownDoc {
    let mut doc = MarkdownDoc::new(&format!("Technical Design: {title}"));
    doc.section("Overview", &ex.overview())
        .section("Goals", &list(ex.objectives()))
        .section("Functional Requirements", &list(ex.requirements()))
        .section(
            "Non-Functional Requirements",
            &list(ex.non_functional_requirements()),
        )
        .section("Constraints", &list(ex.constraints()))
        .section("Out of Scope", &list(ex.out_of_scope()))
        .section("Stakeholders", &list(ex.stakeholders()));

    let index: Vec<String> = COMPANION_DOCUMENTS
        .iter()
        .map(|(name, purpose)| format!("[{name}]({name}): {purpose}"))
        .collect();
    doc.section("Related Documents", &bullet_list(&index, NONE_SPECIFIED));
    doc
}

fn high_level_design(ex: &FieldExtractor<'_>, title: &str) -> MarkdownDoc {
    let mut doc = MarkdownDoc::new(&format!("High-Level Design: {title}"));
    doc.section(
        "Architecture Overview",
        &ex.approach().unwrap_or_else(|| TO_BE_DEFINED.to_string()),
    )
    .section("Components", &ex.text(ContextKey::Components, TO_BE_DEFINED))
    .section(
        "Technology Choices",
        &ex.text(ContextKey::Technologies, TO_BE_DEFINED),
    )
    .section("External Dependencies", &list(ex.dependencies()));
    doc
}

fn low_level_design(ex: &FieldExtractor<'_>, title: &str) -> MarkdownDoc {
    let mut doc = MarkdownDoc::new(&format!("Low-Level Design: {title}"));
    doc.section("Data Model", &ex.text(ContextKey::DataEntities, TO_BE_DEFINED))
        .section(
            "Interface Contracts",
            &ex.text(ContextKey::Interfaces, TO_BE_DEFINED),
        )
        .section(
            "Acceptance Criteria",
            &checklist(&ex.acceptance_criteria(), NONE_SPECIFIED),
        );
    doc
}

fn security_review(ex: &FieldExtractor<'_>, title: &str) -> MarkdownDoc {
    let mut doc = MarkdownDoc::new(&format!("Security Review: {title}"));
    doc.section("Security Controls", &ex.text(ContextKey::Security, TO_BE_DEFINED))
        .section("Compliance Constraints", &list(ex.constraints()))
        .section("Threats and Risks", &list(ex.risks()));
    doc
}

fn operations_runbook(ex: &FieldExtractor<'_>, title: &str) -> MarkdownDoc {
    let mut doc = MarkdownDoc::new(&format!("Operations: {title}"));
    doc.section("Deployment", &ex.text(ContextKey::Deployment, TO_BE_DEFINED))
        .section("Monitoring", &ex.text(ContextKey::Monitoring, TO_BE_DEFINED))
        .section("Rollout Milestones", &checklist(&ex.milestones(), NONE_SPECIFIED));
    doc
}

impl OutputStrategy for EnterpriseStrategy {
    fn approach(&self) -> Approach {
        Approach::Enterprise
    }

    fn supports(&self, domain_type: &str) -> bool {
        supports_sessions_only(domain_type)
    }

    fn render(&self, input: &DomainResult, options: &RenderOptions) -> Result<OutputArtifacts> {
        let session = require_session(self, input)?;
        let ex = FieldExtractor::new(session);
        let title = ex.title();
        let folder = folder_name(&title);

        let tdd = technical_design(&ex, &title).finish(metadata_footer(input, options));
        let companions = [
            high_level_design(&ex, &title),
            low_level_design(&ex, &title),
            security_review(&ex, &title),
            operations_runbook(&ex, &title),
        ];

        Ok(OutputArtifacts::with_secondary(
            OutputDocument::markdown(format!("{folder}/TDD.md"), tdd),
            COMPANION_DOCUMENTS
                .iter()
                .zip(companions)
                .map(|((name, _), doc)| {
                    OutputDocument::markdown(format!("{folder}/{name}"), doc.finish(None))
                })
                .collect(),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::SessionRecord;
    use serde_json::json;

    #[test]
    fn document_set_names() {
        let mut s = SessionRecord::default();
        s.context.insert("title".into(), json!("Billing Service"));
        let out = EnterpriseStrategy
            .render(&DomainResult::from(s), &RenderOptions::default())
            .unwrap();
        let names: Vec<&str> = out.documents().map(|d| d.name.as_str()).collect();
        assert_eq!(
            names,
            vec![
                "billing-service/TDD.md",
                "billing-service/HLD.md",
                "billing-service/LLD.md",
                "billing-service/SECURITY.md",
                "billing-service/OPERATIONS.md",
            ]
        );
        assert!(out.primary.content.contains("[HLD.md](HLD.md): High-level design"));
    }

    #[test]
    fn sections_read_context() {
        let mut s = SessionRecord::default();
        s.context.insert("security".into(), json!("mTLS between services"));
        s.context.insert("approach".into(), json!("Event-sourced ledger"));
        let out = EnterpriseStrategy
            .render(&DomainResult::from(s), &RenderOptions::default().without_metadata())
            .unwrap();
        let hld = &out.secondary[0].content;
        assert!(hld.contains("## Architecture Overview\n\nEvent-sourced ledger\n"));
        let security = &out.secondary[2].content;
        assert!(security.contains("## Security Controls\n\nmTLS between services\n"));
        let ops = &out.secondary[3].content;
        assert!(ops.contains("## Deployment\n\nTo be defined\n"));
    }
}
