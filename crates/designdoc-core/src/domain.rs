use crate::extract::{value_text, FieldExtractor, NONE_SPECIFIED};
use crate::session::{ContextKey, SessionRecord};
use crate::text::{bullet_list, humanize_key};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

pub const SESSION_STATE: &str = "SessionState";
pub const PROMPT_RESULT: &str = "PromptResult";

// ---------------------------------------------------------------------------
// Section / PromptResult
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Section {
    pub title: String,
    pub body: String,
}

impl Section {
    pub fn new(title: impl Into<String>, body: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            body: body.into(),
        }
    }
}

/// Output of a prompt builder: ordered sections plus free-form metadata.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PromptResult {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default)]
    pub sections: Vec<Section>,
    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    pub metadata: IndexMap<String, String>,
}

// ---------------------------------------------------------------------------
// DomainResult
// ---------------------------------------------------------------------------

/// Everything a strategy can be asked to render.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value")]
pub enum DomainResult {
    #[serde(rename = "SessionState")]
    Session(SessionRecord),
    #[serde(rename = "PromptResult")]
    Prompt(PromptResult),
}

impl DomainResult {
    pub fn type_name(&self) -> &'static str {
        match self {
            DomainResult::Session(_) => SESSION_STATE,
            DomainResult::Prompt(_) => PROMPT_RESULT,
        }
    }

    pub fn as_session(&self) -> Option<&SessionRecord> {
        match self {
            DomainResult::Session(s) => Some(s),
            DomainResult::Prompt(_) => None,
        }
    }

    pub fn title(&self) -> String {
        match self {
            DomainResult::Session(s) => FieldExtractor::new(s).title(),
            DomainResult::Prompt(p) => p
                .title
                .as_deref()
                .map(str::trim)
                .filter(|t| !t.is_empty())
                .unwrap_or(crate::extract::UNTITLED)
                .to_string(),
        }
    }

    /// Ordered sections for section-driven strategies.
    pub fn sections(&self) -> Vec<Section> {
        match self {
            DomainResult::Session(s) => session_sections(s),
            DomainResult::Prompt(p) => p.sections.clone(),
        }
    }
}

impl From<SessionRecord> for DomainResult {
    fn from(s: SessionRecord) -> Self {
        DomainResult::Session(s)
    }
}

impl From<PromptResult> for DomainResult {
    fn from(p: PromptResult) -> Self {
        DomainResult::Prompt(p)
    }
}

// ---------------------------------------------------------------------------
// Session sections
// ---------------------------------------------------------------------------

/// Overview, Requirements, Constraints, then every other non-empty context
/// entry in insertion order.
pub fn session_sections(session: &SessionRecord) -> Vec<Section> {
    let ex = FieldExtractor::new(session);
    let mut sections = vec![
        Section::new("Overview", ex.overview()),
        Section::new("Requirements", bullet_list(&ex.requirements(), NONE_SPECIFIED)),
        Section::new("Constraints", bullet_list(&ex.constraints(), NONE_SPECIFIED)),
    ];

    let consumed = [
        ContextKey::Title,
        ContextKey::Overview,
        ContextKey::Requirements,
        ContextKey::Constraints,
    ];
    for (key, value) in &session.context {
        if consumed.iter().any(|k| k.aliases().contains(&key.as_str())) {
            continue;
        }
        if let Some(body) = value_text(value) {
            sections.push(Section::new(humanize_key(key), body));
        }
    }
    sections
}

/// First section whose title contains one of `keywords`, trying keywords in
/// order; matching is case-insensitive.
pub fn find_section<'a>(sections: &'a [Section], keywords: &[&str]) -> Option<&'a Section> {
    keywords.iter().find_map(|kw| {
        let kw = kw.to_lowercase();
        sections
            .iter()
            .find(|s| s.title.to_lowercase().contains(&kw) && !s.body.trim().is_empty())
    })
}

pub fn section_body_or(sections: &[Section], keywords: &[&str], default: &str) -> String {
    find_section(sections, keywords)
        .map(|s| s.body.clone())
        .unwrap_or_else(|| default.to_string())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
