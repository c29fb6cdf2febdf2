use super::markdown::{metadata_footer, MarkdownDoc};
use super::{ensure_supported, supports_any, OutputStrategy};
use crate::config::RenderOptions;
use crate::domain::{find_section, DomainResult, Section};
use crate::error::Result;
use crate::extract::{FieldExtractor, TBD, TO_BE_DEFINED};
use crate::output::{OutputArtifacts, OutputDocument};
use crate::types::Approach;

pub const RFC_DOCUMENT: &str = "rfc.md";

/// Heading, lookup keywords in preference order, fallback body.
const RFC_SECTIONS: &[(&str, &[&str], &str)] = &[
    ("Summary", &["summary", "overview", "goal", "context"], TO_BE_DEFINED),
    ("Scope", &["requirements", "scope", "objectives"], TO_BE_DEFINED),
    ("Proposal", &["proposal", "approach", "design", "solution"], TO_BE_DEFINED),
    ("Pros", &["pros", "benefits", "advantages"], TBD),
    ("Cons", &["drawbacks", "disadvantages", "risks"], TBD),
    ("Alternatives", &["alternatives", "options"], TBD),
    ("Conclusion", &["conclusion", "recommendation", "decision", "next steps"], TBD),
];

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RfcStrategy;

/// A section titled exactly like the heading wins over keyword matches, so
/// "Cons" does not fall through to "Constraints".
fn best_match<'a>(sections: &'a [Section], heading: &str, keywords: &[&str]) -> Option<&'a Section> {
    sections
        .iter()
        .find(|s| s.title.trim().eq_ignore_ascii_case(heading) && !s.body.trim().is_empty())
        .or_else(|| find_section(sections, keywords))
}

fn status(input: &DomainResult) -> String {
    match input {
        DomainResult::Session(s) => FieldExtractor::new(s).status(),
        DomainResult::Prompt(p) => p
            .metadata
            .get("status")
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .unwrap_or_else(|| "draft".to_string()),
    }
}

impl OutputStrategy for RfcStrategy {
    fn approach(&self) -> Approach {
        Approach::Rfc
    }

    fn supports(&self, domain_type: &str) -> bool {
        supports_any(domain_type)
    }

    fn render(&self, input: &DomainResult, options: &RenderOptions) -> Result<OutputArtifacts> {
        ensure_supported(self, input)?;

        let sections = input.sections();
        let mut doc = MarkdownDoc::new(&format!("RFC: {}", input.title()));
        doc.paragraph(&format!("**Status**: {}", status(input)));
        for (heading, keywords, fallback) in RFC_SECTIONS {
            let body = best_match(&sections, heading, keywords)
                .map(|s| s.body.as_str())
                .unwrap_or(*fallback);
            doc.section(heading, body);
        }

        let content = doc.finish(metadata_footer(input, options));
        Ok(OutputArtifacts::single(OutputDocument::markdown(
            RFC_DOCUMENT,
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

    fn body_of<'a>(md: &'a str, heading: &str) -> &'a str {
        let marker = format!("## {heading}\n\n");
        let start = md.find(&marker).unwrap() + marker.len();
        let rest = &md[start..];
        rest[..rest.find("\n\n## ").unwrap_or(rest.len())].trim_end()
    }

    #[test]
    fn prompt_sections_map_by_keyword() {
        let prompt = PromptResult {
            title: Some("Move to gRPC".into()),
            sections: vec![
                Section::new("Executive Summary", "Replace REST between services"),
                Section::new("Benefits", "Typed contracts"),
                Section::new("Cons", "New tooling"),
                Section::new("Constraints", "Keep REST for public API"),
            ],
            ..PromptResult::default()
        };
        let out = RfcStrategy
            .render(&DomainResult::from(prompt), &RenderOptions::default())
            .unwrap();
        let md = &out.primary.content;
        assert!(md.starts_with("# RFC: Move to gRPC\n\n**Status**: draft\n"));
        assert_eq!(body_of(md, "Summary"), "Replace REST between services");
        assert_eq!(body_of(md, "Pros"), "Typed contracts");
        assert_eq!(body_of(md, "Cons"), "New tooling");
        assert_eq!(body_of(md, "Scope"), "To be defined");
        assert_eq!(body_of(md, "Alternatives"), "TBD");
        assert_eq!(body_of(md, "Conclusion"), "TBD");
    }

    #[test]
    fn session_uses_context_sections() {
        let mut s = SessionRecord::default();
        s.status = Some("review".into());
        s.context.insert("title".into(), json!("Rate limits"));
        s.context.insert("approach".into(), json!("Token bucket per tenant"));
        s.context.insert("risks".into(), json!(["Hot tenants"]));
        let out = RfcStrategy
            .render(&DomainResult::from(s), &RenderOptions::default().without_metadata())
            .unwrap();
        let md = &out.primary.content;
        assert!(md.contains("**Status**: review"));
        assert_eq!(body_of(md, "Summary"), "To be defined");
        assert_eq!(body_of(md, "Scope"), "None specified");
        assert_eq!(body_of(md, "Proposal"), "Token bucket per tenant");
        assert_eq!(body_of(md, "Cons"), "- Hot tenants");
    }
}
