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

/// TOGAF ADM document set. Purely extraction-driven; every section has a
/// placeholder for sessions that never captured the field.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TogafStrategy;

fn list(items: Vec<String>) -> String {
    bullet_list(&items, NONE_SPECIFIED)
}

fn architecture_vision(ex: &FieldExtractor<'_>, title: &str) -> MarkdownDoc {
    let mut doc = MarkdownDoc::new(&format!("Architecture Vision: {title}"));
    doc.section("Vision", &ex.overview())
        .section("Stakeholders", &list(ex.stakeholders()))
        .section("Business Goals", &list(ex.objectives()))
        .section("Constraints", &list(ex.constraints()))
        .section("Success Criteria", &list(ex.success_criteria()))
        .section("Scope Exclusions", &list(ex.out_of_scope()));
    doc
}

fn business_architecture(ex: &FieldExtractor<'_>, title: &str) -> MarkdownDoc {
    let mut doc = MarkdownDoc::new(&format!("Business Architecture: {title}"));
    doc.section(
        "Business Drivers",
        &ex.text(ContextKey::BusinessDrivers, TO_BE_DEFINED),
    )
    .section("Stakeholders", &list(ex.stakeholders()))
    .section("Business Capabilities", &list(ex.requirements()))
    .section("Business Risks", &list(ex.risks()));
    doc
}

fn data_architecture(ex: &FieldExtractor<'_>, title: &str) -> MarkdownDoc {
    let mut doc = MarkdownDoc::new(&format!("Data Architecture: {title}"));
    doc.section(
        "Data Entities",
        &ex.text(ContextKey::DataEntities, TO_BE_DEFINED),
    )
    .section(
        "Data Security",
        &ex.text(ContextKey::Security, TO_BE_DEFINED),
    )
    .section("Data Constraints", &list(ex.constraints()));
    doc
}

fn application_architecture(ex: &FieldExtractor<'_>, title: &str) -> MarkdownDoc {
    let mut doc = MarkdownDoc::new(&format!("Application Architecture: {title}"));
    doc.section(
        "Applications",
        &ex.text(ContextKey::Applications, TO_BE_DEFINED),
    )
    .section("Components", &ex.text(ContextKey::Components, TO_BE_DEFINED))
    .section("Interfaces", &ex.text(ContextKey::Interfaces, TO_BE_DEFINED));
    doc
}

fn technology_architecture(ex: &FieldExtractor<'_>, title: &str) -> MarkdownDoc {
    let mut doc = MarkdownDoc::new(&format!("Technology Architecture: {title}"));
    doc.section(
        "Technology Stack",
        &ex.text(ContextKey::Technologies, TO_BE_DEFINED),
    )
    .section("Deployment", &ex.text(ContextKey::Deployment, TO_BE_DEFINED))
    .section("Monitoring", &ex.text(ContextKey::Monitoring, TO_BE_DEFINED));
    doc
}

fn migration_plan(ex: &FieldExtractor<'_>, title: &str) -> MarkdownDoc {
    let mut doc = MarkdownDoc::new(&format!("Migration Plan: {title}"));
    doc.section(
        "Work Packages",
        &checklist(&ex.milestones(), NONE_SPECIFIED),
    )
    .section("Dependencies", &list(ex.dependencies()))
    .section("Transition Risks", &list(ex.risks()));
    doc
}

impl OutputStrategy for TogafStrategy {
    fn approach(&self) -> Approach {
        Approach::Togaf
    }

    fn supports(&self, domain_type: &str) -> bool {
        supports_sessions_only(domain_type)
    }

    fn render(&self, input: &DomainResult, options: &RenderOptions) -> Result<OutputArtifacts> {
        let session = require_session(self, input)?;
        let ex = FieldExtractor::new(session);
        let title = ex.title();
        let folder = folder_name(&title);

        let vision = architecture_vision(&ex, &title).finish(metadata_footer(input, options));
        let rest = [
            ("business-architecture.md", business_architecture(&ex, &title)),
            ("data-architecture.md", data_architecture(&ex, &title)),
            ("application-architecture.md", application_architecture(&ex, &title)),
            ("technology-architecture.md", technology_architecture(&ex, &title)),
            ("migration-plan.md", migration_plan(&ex, &title)),
        ];

        Ok(OutputArtifacts::with_secondary(
            OutputDocument::markdown(format!("{folder}/architecture-vision.md"), vision),
            rest.into_iter()
                .map(|(name, doc)| OutputDocument::markdown(format!("{folder}/{name}"), doc.finish(None)))
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
    fn six_documents_with_placeholders() {
        let out = TogafStrategy
            .render(&DomainResult::from(SessionRecord::default()), &RenderOptions::default())
            .unwrap();
        assert_eq!(out.document_count(), 6);
        assert_eq!(out.primary.name, "untitled-specification/architecture-vision.md");
        let tech = &out
            .document("untitled-specification/technology-architecture.md")
            .unwrap()
            .content;
        assert!(tech.contains("## Technology Stack\n\nTo be defined\n"));
    }

    #[test]
    fn context_fields_fill_sections() {
        let mut s = SessionRecord::default();
        s.context.insert("title".into(), json!("Claims Platform"));
        s.context
            .insert("technologies".into(), json!(["Kafka", "Postgres"]));
        s.context
            .insert("dataEntities".into(), json!({"claim": "A filed claim", "policy": "Coverage"}));
        s.context.insert("stakeholders".into(), json!(["Adjusters"]));
        let out = TogafStrategy
            .render(&DomainResult::from(s), &RenderOptions::default())
            .unwrap();
        let vision = &out.primary.content;
        assert!(vision.contains("## Stakeholders\n\n- Adjusters\n"));
        let tech = &out.document("claims-platform/technology-architecture.md").unwrap().content;
        assert!(tech.contains("- Kafka\n- Postgres"));
        let data = &out.document("claims-platform/data-architecture.md").unwrap().content;
        assert!(data.contains("- **Claim**: A filed claim"));
    }
}
