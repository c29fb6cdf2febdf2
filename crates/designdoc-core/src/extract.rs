use crate::session::{ContextKey, SessionRecord};
use crate::text::{bullet_list, humanize_key};
use serde_json::Value;

pub const TO_BE_DEFINED: &str = "To be defined";
pub const NONE_SPECIFIED: &str = "None specified";
pub const TBD: &str = "TBD";
pub const UNTITLED: &str = "Untitled Specification";

const LABEL_FIELDS: &[&str] = &["title", "name", "description", "text", "id"];

// ---------------------------------------------------------------------------
// Value guards
// ---------------------------------------------------------------------------

/// A non-blank string, trimmed.
pub fn value_str(v: &Value) -> Option<String> {
    v.as_str()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}

/// The human label of a list entry: the string itself, or the first string
/// field of an object among title/name/description/text/id.
pub fn item_label(v: &Value) -> Option<String> {
    match v {
        Value::String(_) => value_str(v),
        Value::Object(map) => LABEL_FIELDS
            .iter()
            .find_map(|f| map.get(*f).and_then(value_str)),
        _ => None,
    }
}

/// Labels of every usable entry when `v` is an array; `None` for any other shape.
pub fn value_string_list(v: &Value) -> Option<Vec<String>> {
    v.as_array()
        .map(|items| items.iter().filter_map(item_label).collect())
}

/// Renders any scalar, list, or object as markdown text. `None` when there is
/// nothing printable.
pub fn value_text(v: &Value) -> Option<String> {
    match v {
        Value::Null => None,
        Value::Bool(b) => Some(b.to_string()),
        Value::Number(n) => Some(n.to_string()),
        Value::String(_) => value_str(v),
        Value::Array(_) => value_string_list(v)
            .filter(|items| !items.is_empty())
            .map(|items| bullet_list(&items, NONE_SPECIFIED)),
        Value::Object(map) => {
            let lines: Vec<String> = map
                .iter()
                .filter_map(|(k, v)| {
                    let text = match v {
                        Value::Array(_) => value_string_list(v)
                            .filter(|items| !items.is_empty())
                            .map(|items| items.join(", ")),
                        Value::Object(_) => item_label(v),
                        _ => value_text(v),
                    }?;
                    Some(format!("- **{}**: {}", humanize_key(k), text))
                })
                .collect();
            if lines.is_empty() {
                None
            } else {
                Some(lines.join("\n"))
            }
        }
    }
}

// ---------------------------------------------------------------------------
// FieldExtractor
// ---------------------------------------------------------------------------

/// Tolerant read access to a session. Every accessor returns a value; a field
/// of the wrong shape reads as absent and degrades to its default.
#[derive(Debug, Clone, Copy)]
pub struct FieldExtractor<'a> {
    session: &'a SessionRecord,
}

impl<'a> FieldExtractor<'a> {
    pub fn new(session: &'a SessionRecord) -> Self {
        Self { session }
    }

    pub fn session(&self) -> &'a SessionRecord {
        self.session
    }

    // -----------------------------------------------------------------------
    // Generic probes
    // -----------------------------------------------------------------------

    pub fn string(&self, key: ContextKey) -> Option<String> {
        self.session.context_value(key).and_then(value_str)
    }

    pub fn string_or(&self, key: ContextKey, default: &str) -> String {
        self.string(key).unwrap_or_else(|| default.to_string())
    }

    /// List entries of a context key; empty when absent or not an array.
    pub fn list(&self, key: ContextKey) -> Vec<String> {
        self.session
            .context_value(key)
            .and_then(value_string_list)
            .unwrap_or_default()
    }

    /// Any shape rendered as markdown text, or the default.
    pub fn text(&self, key: ContextKey, default: &str) -> String {
        self.session
            .context_value(key)
            .and_then(value_text)
            .unwrap_or_else(|| default.to_string())
    }

    /// Raw array entries of a context key; empty when absent or not an array.
    pub fn entries(&self, key: ContextKey) -> &'a [Value] {
        self.session
            .context_value(key)
            .and_then(Value::as_array)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    // -----------------------------------------------------------------------
    // Logical fields
    // -----------------------------------------------------------------------

    pub fn title(&self) -> String {
        self.string(ContextKey::Title)
            .or_else(|| self.session.goal().map(str::to_string))
            .unwrap_or_else(|| UNTITLED.to_string())
    }

    pub fn overview(&self) -> String {
        self.overview_opt()
            .unwrap_or_else(|| TO_BE_DEFINED.to_string())
    }

    pub fn overview_opt(&self) -> Option<String> {
        self.session
            .goal()
            .map(str::to_string)
            .or_else(|| self.string(ContextKey::Overview))
    }

    pub fn objectives(&self) -> Vec<String> {
        self.list(ContextKey::Objectives)
    }

    pub fn requirements(&self) -> Vec<String> {
        let from_config = self.session.config_requirements();
        if from_config.iter().any(|r| !r.trim().is_empty()) {
            return non_blank(from_config);
        }
        self.list(ContextKey::Requirements)
    }

    pub fn non_functional_requirements(&self) -> Vec<String> {
        self.list(ContextKey::NonFunctionalRequirements)
    }

    pub fn constraints(&self) -> Vec<String> {
        let from_config = self.session.config_constraints();
        if from_config.iter().any(|c| !c.trim().is_empty()) {
            return non_blank(from_config);
        }
        self.list(ContextKey::Constraints)
    }

    pub fn acceptance_criteria(&self) -> Vec<String> {
        self.list(ContextKey::AcceptanceCriteria)
    }

    pub fn out_of_scope(&self) -> Vec<String> {
        self.list(ContextKey::OutOfScope)
    }

    pub fn success_criteria(&self) -> Vec<String> {
        self.list(ContextKey::SuccessCriteria)
    }

    pub fn risks(&self) -> Vec<String> {
        self.list(ContextKey::Risks)
    }

    pub fn dependencies(&self) -> Vec<String> {
        self.list(ContextKey::Dependencies)
    }

    pub fn milestones(&self) -> Vec<String> {
        self.list(ContextKey::Milestones)
    }

    pub fn tasks(&self) -> Vec<String> {
        self.list(ContextKey::Tasks)
    }

    pub fn stakeholders(&self) -> Vec<String> {
        self.list(ContextKey::Stakeholders)
    }

    pub fn approach(&self) -> Option<String> {
        self.session
            .context_value(ContextKey::Approach)
            .and_then(value_text)
    }

    pub fn phase(&self) -> String {
        let phase = self.session.phase.trim();
        if phase.is_empty() {
            "unknown".to_string()
        } else {
            phase.to_string()
        }
    }

    pub fn status(&self) -> String {
        self.session
            .status
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .unwrap_or("draft")
            .to_string()
    }
}

fn non_blank(items: &[String]) -> Vec<String> {
    items
        .iter()
        .map(|s| s.trim())
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::SessionConfig;
    use serde_json::json;

    fn session_with(context: Value) -> SessionRecord {
        let mut s = SessionRecord::new("s1", "design");
        if let Value::Object(map) = context {
            for (k, v) in map {
                s.context.insert(k, v);
            }
        }
        s
    }

    #[test]
    fn empty_session_uses_defaults() {
        let s = SessionRecord::default();
        let ex = FieldExtractor::new(&s);
        assert_eq!(ex.title(), UNTITLED);
        assert_eq!(ex.overview(), TO_BE_DEFINED);
        assert!(ex.requirements().is_empty());
        assert!(ex.risks().is_empty());
        assert_eq!(ex.phase(), "unknown");
        assert_eq!(ex.status(), "draft");
        assert_eq!(ex.text(ContextKey::Security, NONE_SPECIFIED), NONE_SPECIFIED);
    }

    #[test]
    fn config_takes_priority_over_context() {
        let mut s = session_with(json!({
            "requirements": ["from context"],
            "overview": "context overview"
        }));
        s.config = Some(SessionConfig {
            goal: Some("Ship the login flow".into()),
            requirements: vec!["Add login".into(), "  ".into()],
            constraints: vec![],
        });
        let ex = FieldExtractor::new(&s);
        assert_eq!(ex.requirements(), vec!["Add login".to_string()]);
        assert_eq!(ex.overview(), "Ship the login flow");
        assert_eq!(ex.title(), "Ship the login flow");
    }

    #[test]
    fn context_used_when_config_empty() {
        let s = session_with(json!({
            "title": "Payments",
            "requirements": ["Charge cards", {"description": "Refund charges"}],
            "constraints": ["PCI"]
        }));
        let ex = FieldExtractor::new(&s);
        assert_eq!(ex.title(), "Payments");
        assert_eq!(ex.requirements(), vec!["Charge cards", "Refund charges"]);
        assert_eq!(ex.constraints(), vec!["PCI"]);
    }

    #[test]
    fn wrong_shapes_read_as_absent() {
        let s = session_with(json!({
            "title": 42,
            "objectives": "not a list",
            "risks": {"description": "object, not array"},
            "requirements": [1, 2, null],
            "overview": ["not", "a", "string"]
        }));
        let ex = FieldExtractor::new(&s);
        assert_eq!(ex.title(), UNTITLED);
        assert!(ex.objectives().is_empty());
        assert!(ex.risks().is_empty());
        assert!(ex.requirements().is_empty());
        assert_eq!(ex.overview(), TO_BE_DEFINED);
        assert!(ex.entries(ContextKey::Risks).is_empty());
    }

    #[test]
    fn text_renders_lists_and_objects() {
        let s = session_with(json!({
            "security": ["TLS everywhere", "Rotate keys"],
            "deployment": {"region": "eu-west-1", "replicas": 3, "zones": ["a", "b"]}
        }));
        let ex = FieldExtractor::new(&s);
        assert_eq!(
            ex.text(ContextKey::Security, TBD),
            "- TLS everywhere\n- Rotate keys"
        );
        let deployment = ex.text(ContextKey::Deployment, TBD);
        assert!(deployment.contains("- **Region**: eu-west-1"));
        assert!(deployment.contains("- **Replicas**: 3"));
        assert!(deployment.contains("- **Zones**: a, b"));
    }

    #[test]
    fn item_label_prefers_title_fields() {
        assert_eq!(
            item_label(&json!({"id": "M1", "name": "Beta"})),
            Some("Beta".to_string())
        );
        assert_eq!(item_label(&json!({"id": "M1"})), Some("M1".to_string()));
        assert_eq!(item_label(&json!({"weeks": 3})), None);
        assert_eq!(item_label(&json!("  ")), None);
    }
}
