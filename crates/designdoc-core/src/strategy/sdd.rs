use super::markdown::{metadata_footer, plan_document, spec_document, tasks_document};
use super::{folder_name, require_session, supports_sessions_only, OutputStrategy};
use crate::config::RenderOptions;
use crate::domain::DomainResult;
use crate::error::Result;
use crate::extract::FieldExtractor;
use crate::output::{OutputArtifacts, OutputDocument};
use crate::plan::derive_plan;
use crate::spec::ParsedSpec;
use crate::tasks::derive_tasks;
use crate::types::Approach;

/// spec / plan / tasks, all derived. Unlike Spec-Kit there is no fallback:
/// a session that does not parse is an error for the caller to handle.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SddStrategy;

impl OutputStrategy for SddStrategy {
    fn approach(&self) -> Approach {
        Approach::Sdd
    }

    fn supports(&self, domain_type: &str) -> bool {
        supports_sessions_only(domain_type)
    }

    fn render(&self, input: &DomainResult, options: &RenderOptions) -> Result<OutputArtifacts> {
        let session = require_session(self, input)?;
        let ex = FieldExtractor::new(session);

        let spec = ParsedSpec::from_session(session)?;
        let tasks = derive_tasks(&spec)?;
        let plan = derive_plan(&ex);
        let folder = folder_name(&spec.title);

        let spec_md = spec_document(&spec).finish(metadata_footer(input, options));
        let plan_md = plan_document(&spec.title, &plan).finish(None);
        let tasks_md = tasks_document(&spec.title, &tasks).finish(None);

        Ok(OutputArtifacts::with_secondary(
            OutputDocument::markdown(format!("{folder}/spec.md"), spec_md),
            vec![
                OutputDocument::markdown(format!("{folder}/plan.md"), plan_md),
                OutputDocument::markdown(format!("{folder}/tasks.md"), tasks_md),
            ],
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::PromptResult;
    use crate::error::DesignDocError;
    use crate::session::{SessionConfig, SessionRecord};
    use serde_json::json;

    fn session() -> SessionRecord {
        let mut s = SessionRecord::new("s-7", "planning");
        s.config = Some(SessionConfig {
            goal: Some("Audit Log Export".into()),
            requirements: vec!["Add simple CSV export".into()],
            constraints: vec![],
        });
        s
    }

    #[test]
    fn three_documents_in_slug_folder() {
        let out = SddStrategy
            .render(&DomainResult::from(session()), &RenderOptions::default())
            .unwrap();
        let names: Vec<&str> = out.documents().map(|d| d.name.as_str()).collect();
        assert_eq!(
            names,
            vec![
                "audit-log-export/spec.md",
                "audit-log-export/plan.md",
                "audit-log-export/tasks.md"
            ]
        );
        let tasks = &out.document("audit-log-export/tasks.md").unwrap().content;
        assert!(tasks.contains("### T001: Implement: simple CSV export"));
        assert!(tasks.contains("- **Estimate**: 2h"));
        assert!(out.primary.content.contains("- **Session**: s-7"));
    }

    #[test]
    fn malformed_session_is_an_error() {
        let mut s = session();
        s.context
            .insert("acceptanceCriteria".into(), json!({"not": "a list"}));
        let err = SddStrategy
            .render(&DomainResult::from(s), &RenderOptions::default())
            .unwrap_err();
        assert!(matches!(err, DesignDocError::InvalidSpec { .. }));
    }

    #[test]
    fn prompt_results_are_rejected() {
        let err = SddStrategy
            .render(&DomainResult::from(PromptResult::default()), &RenderOptions::default())
            .unwrap_err();
        assert!(matches!(err, DesignDocError::UnsupportedDomain { .. }));
    }
}
