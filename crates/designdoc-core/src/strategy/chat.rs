use super::markdown::{metadata_footer, MarkdownDoc};
use super::{ensure_supported, supports_any, OutputStrategy};
use crate::config::RenderOptions;
use crate::domain::DomainResult;
use crate::error::Result;
use crate::extract::TO_BE_DEFINED;
use crate::output::{OutputArtifacts, OutputDocument};
use crate::types::Approach;

pub const CHAT_DOCUMENT: &str = "chat.md";

/// Section-by-section dump into a single document.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ChatStrategy;

impl OutputStrategy for ChatStrategy {
    fn approach(&self) -> Approach {
        Approach::Chat
    }

    fn supports(&self, domain_type: &str) -> bool {
        supports_any(domain_type)
    }

    fn render(&self, input: &DomainResult, options: &RenderOptions) -> Result<OutputArtifacts> {
        ensure_supported(self, input)?;

        let mut doc = MarkdownDoc::new(&input.title());
        let sections = input.sections();
        if sections.is_empty() {
            doc.paragraph(TO_BE_DEFINED);
        }
        for section in &sections {
            doc.section(&section.title, &section.body);
        }

        let content = doc.finish(metadata_footer(input, options));
        Ok(OutputArtifacts::single(OutputDocument::markdown(
            CHAT_DOCUMENT,
            content,
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{PromptResult, Section};
    use crate::session::SessionRecord;
    use serde_json::json;

    #[test]
    fn empty_session_renders_placeholders() {
        let input = DomainResult::from(SessionRecord::default());
        let out = ChatStrategy
            .render(&input, &RenderOptions::default().without_metadata())
            .unwrap();
        assert!(out.secondary.is_empty());
        assert_eq!(out.primary.name, "chat.md");
        assert_eq!(
            out.primary.content,
            "# Untitled Specification\n\n## Overview\n\nTo be defined\n\n\
             ## Requirements\n\nNone specified\n\n## Constraints\n\nNone specified\n"
        );
    }

    #[test]
    fn session_sections_in_order() {
        let mut s = SessionRecord::new("s1", "design");
        s.context.insert("title".into(), json!("Search"));
        s.context.insert("risks".into(), json!(["Index drift"]));
        let out = ChatStrategy
            .render(&DomainResult::from(s), &RenderOptions::default())
            .unwrap();
        let md = &out.primary.content;
        assert!(md.starts_with("# Search\n"));
        let overview = md.find("## Overview").unwrap();
        let risks = md.find("## Risks").unwrap();
        assert!(overview < risks);
        assert!(md.contains("- **Session**: s1"));
    }

    #[test]
    fn prompt_result_sections() {
        let prompt = PromptResult {
            title: Some("Caching".into()),
            sections: vec![Section::new("Goal", "Cut p99 latency")],
            ..PromptResult::default()
        };
        let out = ChatStrategy
            .render(&DomainResult::from(prompt), &RenderOptions::default())
            .unwrap();
        assert_eq!(out.primary.content, "# Caching\n\n## Goal\n\nCut p99 latency\n");

        let bare = ChatStrategy
            .render(&DomainResult::from(PromptResult::default()), &RenderOptions::default())
            .unwrap();
        assert!(bare.primary.content.contains("To be defined"));
    }
}
