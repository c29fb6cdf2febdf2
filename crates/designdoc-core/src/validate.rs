use crate::constitution::{Constitution, RuleKind};
use crate::extract::{FieldExtractor, TO_BE_DEFINED, UNTITLED};
use crate::spec::ParsedSpec;
use crate::types::IssueSeverity;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::OnceLock;

const VAGUE_REQUIREMENT_CHARS: usize = 15;

// ---------------------------------------------------------------------------
// SpecContent
// ---------------------------------------------------------------------------

/// The parts of a specification the validator reads.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SpecContent {
    pub title: String,
    pub overview: String,
    pub objectives: Vec<String>,
    pub requirements: Vec<String>,
    pub acceptance_criteria: Vec<String>,
    /// Constitution ids the spec claims to honour, in first-mention order.
    pub constraint_refs: Vec<String>,
}

static LEADING_ID_RE: OnceLock<Regex> = OnceLock::new();
static INLINE_ID_RE: OnceLock<Regex> = OnceLock::new();

fn leading_id_re() -> &'static Regex {
    LEADING_ID_RE.get_or_init(|| Regex::new(r"^\s*([A-Z]{1,4}-?\d+)\s*:").unwrap())
}

fn inline_id_re() -> &'static Regex {
    INLINE_ID_RE.get_or_init(|| Regex::new(r"\[([A-Z]{1,4}-?\d+)\]").unwrap())
}

impl SpecContent {
    pub fn from_spec(spec: &ParsedSpec) -> Self {
        let requirements: Vec<String> = spec
            .all_requirements()
            .map(|r| r.description.clone())
            .collect();
        Self {
            title: spec.title.clone(),
            overview: spec.overview.clone(),
            objectives: spec.objectives.clone(),
            constraint_refs: constraint_refs(&spec.constraints, &requirements),
            requirements,
            acceptance_criteria: spec
                .acceptance_criteria
                .iter()
                .map(|a| a.description.clone())
                .collect(),
        }
    }

    /// Tolerant variant for sessions that do not parse into a `ParsedSpec`.
    pub fn from_extractor(ex: &FieldExtractor<'_>) -> Self {
        let mut requirements = ex.requirements();
        requirements.extend(ex.non_functional_requirements());
        Self {
            title: ex.title(),
            overview: ex.overview(),
            objectives: ex.objectives(),
            constraint_refs: constraint_refs(&ex.constraints(), &requirements),
            requirements,
            acceptance_criteria: ex.acceptance_criteria(),
        }
    }
}

/// Leading `ID:` prefixes of constraints, then inline `[ID]` mentions in requirements,
/// deduplicated in first-mention order.
fn constraint_refs(constraints: &[String], requirements: &[String]) -> Vec<String> {
    let mut refs: Vec<String> = Vec::new();
    let mut push = |id: &str| {
        if !refs.iter().any(|r| r == id) {
            refs.push(id.to_string());
        }
    };
    for constraint in constraints {
        if let Some(c) = leading_id_re().captures(constraint) {
            push(&c[1]);
        }
    }
    for req in requirements {
        for c in inline_id_re().captures_iter(req) {
            push(&c[1]);
        }
    }
    refs
}

// ---------------------------------------------------------------------------
// Issue / ValidationResult
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Issue {
    pub code: String,
    pub severity: IssueSeverity,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub suggestion: Option<String>,
}

impl Issue {
    fn new(code: &str, severity: IssueSeverity, message: impl Into<String>) -> Self {
        Self {
            code: code.to_string(),
            severity,
            message: message.into(),
            suggestion: None,
        }
    }

    fn suggest(mut self, suggestion: impl Into<String>) -> Self {
        self.suggestion = Some(suggestion.into());
        self
    }
}

/// A constraint reference that resolved against the constitution.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatchedRule {
    pub id: String,
    pub kind: RuleKind,
    pub title: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidationResult {
    pub valid: bool,
    /// 0 to 100, over the structural checks and the constraint references.
    pub score: u32,
    /// Constitution references only; structural checks count toward `score`.
    pub checked_constraints: u32,
    pub passed_constraints: u32,
    #[serde(default)]
    pub matched_rules: Vec<MatchedRule>,
    pub issues: Vec<Issue>,
}

impl ValidationResult {
    pub fn errors(&self) -> impl Iterator<Item = &Issue> {
        self.issues_with(IssueSeverity::Error)
    }

    pub fn issues_with(&self, severity: IssueSeverity) -> impl Iterator<Item = &Issue> {
        self.issues.iter().filter(move |i| i.severity == severity)
    }

    /// The "Validation Results" section appended to a rendered spec.
    pub fn to_markdown(&self) -> String {
        let mut out = String::from("## Validation Results\n\n");
        out.push_str(&format!(
            "- **Status**: {}\n- **Score**: {}/100\n- **Constraints**: {}/{} passed\n",
            if self.valid { "valid" } else { "invalid" },
            self.score,
            self.passed_constraints,
            self.checked_constraints
        ));
        if !self.matched_rules.is_empty() {
            out.push_str("\n### Matched Rules\n\n");
            for rule in &self.matched_rules {
                out.push_str(&format!(
                    "- **{}** ({}): {}\n",
                    rule.id,
                    rule.kind.label(),
                    rule.title
                ));
            }
        }
        if self.issues.is_empty() {
            out.push_str("\nNo issues found.\n");
            return out;
        }
        for severity in IssueSeverity::all() {
            let group: Vec<&Issue> = self.issues_with(*severity).collect();
            if group.is_empty() {
                continue;
            }
            out.push_str(&format!("\n### {}\n\n", severity.heading()));
            for issue in group {
                out.push_str(&format!("- **{}**: {}\n", issue.code, issue.message));
                if let Some(s) = &issue.suggestion {
                    out.push_str(&format!("  - Suggestion: {s}\n"));
                }
            }
        }
        out
    }
}

// ---------------------------------------------------------------------------
// Validation
// ---------------------------------------------------------------------------

#[derive(Default)]
struct Tally {
    checked: u32,
    passed: u32,
    issues: Vec<Issue>,
}

impl Tally {
    fn check(&mut self, ok: bool, on_fail: impl FnOnce() -> Issue) {
        self.checked += 1;
        if ok {
            self.passed += 1;
        } else {
            self.issues.push(on_fail());
        }
    }
}

/// Score `spec` against `constitution`. Pure; neither input is modified.
pub fn validate_spec(spec: &SpecContent, constitution: &Constitution) -> ValidationResult {
    let mut tally = Tally::default();
    let mut refs = Tally::default();
    let mut matched_rules = Vec::new();

    let title = spec.title.trim();
    tally.check(!title.is_empty() && title != UNTITLED, || {
        Issue::new("MISSING_TITLE", IssueSeverity::Error, "Specification has no title")
            .suggest("Set a title in context or a goal in config")
    });

    let overview = spec.overview.trim();
    tally.check(!overview.is_empty() && overview != TO_BE_DEFINED, || {
        Issue::new("MISSING_OVERVIEW", IssueSeverity::Warning, "Specification has no overview")
            .suggest("Describe the problem and the intended outcome")
    });

    tally.check(!spec.objectives.is_empty(), || {
        Issue::new("NO_OBJECTIVES", IssueSeverity::Warning, "No objectives defined")
            .suggest("List the measurable goals this work serves")
    });

    tally.check(!spec.requirements.is_empty(), || {
        Issue::new("NO_REQUIREMENTS", IssueSeverity::Error, "No requirements defined")
            .suggest("Add at least one functional requirement")
    });

    tally.check(!spec.acceptance_criteria.is_empty(), || {
        Issue::new(
            "NO_ACCEPTANCE_CRITERIA",
            IssueSeverity::Warning,
            "No acceptance criteria defined",
        )
        .suggest("Add testable criteria that define done")
    });

    for req in &spec.requirements {
        if req.trim().chars().count() < VAGUE_REQUIREMENT_CHARS {
            tally.issues.push(
                Issue::new(
                    "VAGUE_REQUIREMENT",
                    IssueSeverity::Info,
                    format!("Requirement '{}' may be too brief to verify", req.trim()),
                )
                .suggest("State the expected behaviour and its conditions"),
            );
        }
    }

    for id in &spec.constraint_refs {
        let found = constitution.find(id);
        if let Some((kind, item)) = found {
            matched_rules.push(MatchedRule {
                id: item.id.clone(),
                kind,
                title: item.title.clone(),
            });
        }
        refs.check(found.is_some(), || {
            Issue::new(
                "UNKNOWN_CONSTRAINT",
                IssueSeverity::Error,
                format!("Referenced constraint '{id}' is not defined in the constitution"),
            )
            .suggest("Fix the reference or add the rule to the constitution")
        });
    }

    if spec.constraint_refs.is_empty() && !constitution.is_empty() {
        tally.issues.push(
            Issue::new(
                "NO_CONSTRAINT_REFERENCES",
                IssueSeverity::Info,
                format!(
                    "Specification references none of the {} constitution rules",
                    constitution.len()
                ),
            )
            .suggest("Cite applicable rules, e.g. 'C1: ...' in constraints or [P1] in requirements"),
        );
    }

    let checked = tally.checked + refs.checked;
    let passed = tally.passed + refs.passed;
    let score = if checked == 0 {
        100
    } else {
        ((f64::from(passed) * 100.0) / f64::from(checked)).round() as u32
    };

    // Structural findings first, then reference findings.
    let mut issues = tally.issues;
    issues.extend(refs.issues);
    let valid = !issues.iter().any(|i| i.severity == IssueSeverity::Error);

    ValidationResult {
        valid,
        score,
        checked_constraints: refs.checked,
        passed_constraints: refs.passed,
        matched_rules,
        issues,
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constitution::ConstitutionItem;
    use crate::spec::{AcceptanceCriterion, Requirement};
    use crate::types::{Priority, VerificationMethod};

    fn constitution() -> Constitution {
        let item = |id: &str| ConstitutionItem {
            id: id.to_string(),
            title: format!("Rule {id}"),
            description: String::new(),
        };
        Constitution {
            principles: vec![item("P1")],
            constraints: vec![item("C1"), item("C2")],
            architecture_rules: vec![item("AR1")],
            design_principles: vec![],
        }
    }

    fn complete_spec() -> SpecContent {
        SpecContent {
            title: "Checkout".into(),
            overview: "One-page checkout".into(),
            objectives: vec!["Raise conversion".into()],
            requirements: vec!["Accept card payments via Stripe".into()],
            acceptance_criteria: vec!["Payment succeeds".into()],
            constraint_refs: vec!["C1".into(), "AR1".into()],
        }
    }

    #[test]
    fn complete_spec_scores_full() {
        let result = validate_spec(&complete_spec(), &constitution());
        assert!(result.valid);
        assert_eq!(result.score, 100);
        assert_eq!(result.checked_constraints, 2);
        assert_eq!(result.passed_constraints, 2);
        assert!(result.issues.is_empty());
        let matched: Vec<(&str, RuleKind)> = result
            .matched_rules
            .iter()
            .map(|m| (m.id.as_str(), m.kind))
            .collect();
        assert_eq!(
            matched,
            vec![("C1", RuleKind::Constraint), ("AR1", RuleKind::ArchitectureRule)]
        );
    }

    #[test]
    fn unknown_reference_is_error() {
        let mut spec = complete_spec();
        spec.constraint_refs.push("C9".into());
        let result = validate_spec(&spec, &constitution());
        assert!(!result.valid);
        assert_eq!(result.checked_constraints, 3);
        assert_eq!(result.passed_constraints, 2);
        // 7 of 8 checks pass once the five structural checks are included.
        assert_eq!(result.score, 88);
        let err = result.errors().next().unwrap();
        assert_eq!(err.code, "UNKNOWN_CONSTRAINT");
        assert!(err.message.contains("C9"));
    }

    #[test]
    fn empty_spec_reports_structure() {
        let spec = SpecContent {
            title: UNTITLED.into(),
            overview: TO_BE_DEFINED.into(),
            ..SpecContent::default()
        };
        let result = validate_spec(&spec, &constitution());
        assert!(!result.valid);
        assert_eq!(result.checked_constraints, 0);
        assert_eq!(result.passed_constraints, 0);
        assert_eq!(result.score, 0);
        let codes: Vec<&str> = result.issues.iter().map(|i| i.code.as_str()).collect();
        assert_eq!(
            codes,
            vec![
                "MISSING_TITLE",
                "MISSING_OVERVIEW",
                "NO_OBJECTIVES",
                "NO_REQUIREMENTS",
                "NO_ACCEPTANCE_CRITERIA",
                "NO_CONSTRAINT_REFERENCES"
            ]
        );
    }

    #[test]
    fn vague_requirements_are_info_only() {
        let mut spec = complete_spec();
        spec.requirements.push("Be fast".into());
        let result = validate_spec(&spec, &constitution());
        assert!(result.valid);
        assert_eq!(result.score, 100);
        assert_eq!(result.issues_with(IssueSeverity::Info).count(), 1);
    }

    #[test]
    fn refs_collected_from_constraints_and_requirements() {
        let spec = ParsedSpec {
            title: "T".into(),
            overview: "O".into(),
            objectives: vec![],
            functional_requirements: vec![Requirement {
                id: "FR-001".into(),
                description: "Store data locally [C2] and simply [P1]".into(),
                priority: Priority::High,
            }],
            non_functional_requirements: vec![],
            acceptance_criteria: vec![AcceptanceCriterion {
                id: "AC-001".into(),
                description: "ok".into(),
                verification_method: VerificationMethod::Manual,
            }],
            constraints: vec![
                "C1: No external services".into(),
                "C2 applies".into(),
                "S3 buckets stay private".into(),
                "Plain prose".into(),
            ],
            out_of_scope: vec![],
        };
        let content = SpecContent::from_spec(&spec);
        assert_eq!(content.constraint_refs, vec!["C1", "C2", "P1"]);
        assert_eq!(content.requirements.len(), 1);
    }

    #[test]
    fn prose_constraints_are_not_references() {
        let refs = constraint_refs(
            &[
                "S3 buckets stay private".to_string(),
                "EC2 only".to_string(),
                "P99 under 200ms".to_string(),
                "  C1 : Read-only upstream".to_string(),
            ],
            &[],
        );
        assert_eq!(refs, vec!["C1"]);

        let mut spec = complete_spec();
        spec.constraint_refs = refs;
        let result = validate_spec(&spec, &constitution());
        assert!(result.valid);
        assert_eq!(result.errors().count(), 0);
    }

    #[test]
    fn extractor_content_tolerates_bad_shapes() {
        let mut session = crate::session::SessionRecord::default();
        session.config = Some(crate::session::SessionConfig {
            goal: Some("Offline sync".into()),
            requirements: vec!["Sync notes when back online [C1]".into()],
            constraints: vec!["AR1: keep storage local".into()],
        });
        session
            .context
            .insert("acceptanceCriteria".into(), serde_json::json!("not a list"));
        let content = SpecContent::from_extractor(&FieldExtractor::new(&session));
        assert_eq!(content.title, "Offline sync");
        assert!(content.acceptance_criteria.is_empty());
        assert_eq!(content.constraint_refs, vec!["AR1", "C1"]);
        let result = validate_spec(&content, &constitution());
        assert!(result.valid);
    }

    #[test]
    fn markdown_report() {
        let mut spec = complete_spec();
        spec.constraint_refs.push("X7".into());
        let md = validate_spec(&spec, &constitution()).to_markdown();
        assert!(md.starts_with("## Validation Results"));
        assert!(md.contains("- **Status**: invalid"));
        assert!(md.contains("### Errors"));
        assert!(md.contains("UNKNOWN_CONSTRAINT"));
        assert!(md.contains("Suggestion:"));
        assert!(md.contains("### Matched Rules\n\n- **C1** (constraint): Rule C1\n"));
        assert!(md.contains("- **AR1** (architecture rule): Rule AR1\n"));

        let clean = validate_spec(&complete_spec(), &constitution()).to_markdown();
        assert!(clean.contains("No issues found."));
    }
}
