use crate::error::{DesignDocError, Result};
use crate::extract::FieldExtractor;
use crate::spec::{AcceptanceCriterion, ParsedSpec, Requirement};
use crate::text::short_title;
use crate::types::{Priority, VerificationMethod};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::fmt;

pub const PHASE_IMPLEMENTATION: &str = "implementation";
pub const PHASE_VERIFICATION: &str = "verification";
pub const PHASE_VALIDATION: &str = "validation";

// ---------------------------------------------------------------------------
// Estimate
// ---------------------------------------------------------------------------

/// Effort in whole hours. Serialises as "3h".
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct Estimate(pub u32);

impl Estimate {
    pub fn hours(self) -> u32 {
        self.0
    }

    /// Keyword heuristic over requirement text; the first matching rule wins.
    pub fn for_text(text: &str) -> Estimate {
        let lower = text.to_lowercase();
        let has = |words: &[&str]| words.iter().any(|w| lower.contains(w));
        if has(&["simple", "basic"]) {
            Estimate(2)
        } else if has(&["complex", "comprehensive"]) {
            Estimate(8)
        } else if has(&["integration", "refactor"]) {
            Estimate(4)
        } else {
            Estimate(3)
        }
    }

    pub fn for_verification() -> Estimate {
        Estimate(2)
    }

    pub fn for_criterion(method: VerificationMethod) -> Estimate {
        match method {
            VerificationMethod::Automated => Estimate(1),
            VerificationMethod::Manual => Estimate(2),
        }
    }
}

impl fmt::Display for Estimate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}h", self.0)
    }
}

impl Serialize for Estimate {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Estimate {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.trim()
            .trim_end_matches('h')
            .parse::<u32>()
            .map(Estimate)
            .map_err(|_| serde::de::Error::custom(format!("invalid estimate '{raw}'")))
    }
}

// ---------------------------------------------------------------------------
// DerivedTask
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DerivedTask {
    pub id: String,
    pub title: String,
    pub description: String,
    pub priority: Priority,
    pub estimate: Estimate,
    pub acceptance_criteria: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub dependencies: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phase: Option<String>,
}

// ---------------------------------------------------------------------------
// Derivation
// ---------------------------------------------------------------------------

/// Hands out T001, T002, ... in call order.
#[derive(Debug, Default)]
struct TaskIds {
    next: usize,
}

impl TaskIds {
    fn next(&mut self) -> String {
        self.next += 1;
        format!("T{:03}", self.next)
    }
}

/// Turn requirements and acceptance criteria into an ordered task list.
///
/// Each requirement (functional first, then non-functional) yields an
/// implementation task followed by a verification task that depends on it.
/// Each acceptance criterion then yields one validation task.
pub fn derive_tasks(spec: &ParsedSpec) -> Result<Vec<DerivedTask>> {
    let mut ids = TaskIds::default();
    let mut tasks = Vec::new();

    for (i, req) in spec.all_requirements().enumerate() {
        if req.description.trim().is_empty() {
            return Err(DesignDocError::invalid_spec(
                format!("requirements[{i}]"),
                "description is blank",
            ));
        }
        let implementation = implementation_task(ids.next(), req);
        let verification = verification_task(ids.next(), req, &implementation.id);
        tasks.push(implementation);
        tasks.push(verification);
    }

    for (i, criterion) in spec.acceptance_criteria.iter().enumerate() {
        if criterion.description.trim().is_empty() {
            return Err(DesignDocError::invalid_spec(
                format!("acceptanceCriteria[{i}]"),
                "description is blank",
            ));
        }
        tasks.push(validation_task(ids.next(), criterion));
    }

    Ok(tasks)
}

fn implementation_task(id: String, req: &Requirement) -> DerivedTask {
    DerivedTask {
        id,
        title: format!("Implement: {}", short_title(&req.description)),
        description: format!("{} ({})", req.description, req.id),
        priority: req.priority,
        estimate: Estimate::for_text(&req.description),
        acceptance_criteria: vec![
            "Requirement satisfied".to_string(),
            "Unit tests pass".to_string(),
            "Code review approved".to_string(),
        ],
        dependencies: Vec::new(),
        phase: Some(PHASE_IMPLEMENTATION.to_string()),
    }
}

fn verification_task(id: String, req: &Requirement, implementation_id: &str) -> DerivedTask {
    DerivedTask {
        id,
        title: format!("Verify: {}", short_title(&req.description)),
        description: format!("Write and run tests covering {}: {}", req.id, req.description),
        priority: req.priority,
        estimate: Estimate::for_verification(),
        acceptance_criteria: vec![
            "Happy path tested".to_string(),
            "Edge cases tested".to_string(),
            "Error conditions tested".to_string(),
        ],
        dependencies: vec![implementation_id.to_string()],
        phase: Some(PHASE_VERIFICATION.to_string()),
    }
}

fn validation_task(id: String, criterion: &AcceptanceCriterion) -> DerivedTask {
    DerivedTask {
        id,
        title: format!("Validate: {}", short_title(&criterion.description)),
        description: format!(
            "Confirm {} via {} verification: {}",
            criterion.id, criterion.verification_method, criterion.description
        ),
        priority: Priority::Medium,
        estimate: Estimate::for_criterion(criterion.verification_method),
        acceptance_criteria: vec![format!("{} met", criterion.id)],
        dependencies: Vec::new(),
        phase: Some(PHASE_VALIDATION.to_string()),
    }
}

/// Degraded task list built straight from `context.tasks`, used when the
/// session cannot be parsed into a spec.
pub fn fallback_tasks(ex: &FieldExtractor<'_>) -> Vec<DerivedTask> {
    let mut ids = TaskIds::default();
    ex.tasks()
        .into_iter()
        .map(|title| DerivedTask {
            id: ids.next(),
            description: title.clone(),
            title,
            priority: Priority::Medium,
            estimate: Estimate(3),
            acceptance_criteria: vec!["Task complete".to_string()],
            dependencies: Vec::new(),
            phase: None,
        })
        .collect()
}

// ---------------------------------------------------------------------------
// Summaries
// ---------------------------------------------------------------------------

pub fn total_estimate(tasks: &[DerivedTask]) -> Estimate {
    Estimate(tasks.iter().map(|t| t.estimate.hours()).sum())
}

/// Tasks grouped by phase in first-seen order; tasks without a phase land
/// under "general".
pub fn tasks_by_phase(tasks: &[DerivedTask]) -> IndexMap<String, Vec<&DerivedTask>> {
    let mut groups: IndexMap<String, Vec<&DerivedTask>> = IndexMap::new();
    for task in tasks {
        let phase = task.phase.clone().unwrap_or_else(|| "general".to_string());
        groups.entry(phase).or_default().push(task);
    }
    groups
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::SessionRecord;
    use serde_json::json;

    fn spec_with(reqs: &[&str], criteria: &[(&str, VerificationMethod)]) -> ParsedSpec {
        ParsedSpec {
            title: "T".into(),
            overview: String::new(),
            objectives: vec![],
            functional_requirements: reqs
                .iter()
                .enumerate()
                .map(|(i, d)| Requirement {
                    id: format!("FR-{:03}", i + 1),
                    description: d.to_string(),
                    priority: Priority::High,
                })
                .collect(),
            non_functional_requirements: vec![],
            acceptance_criteria: criteria
                .iter()
                .enumerate()
                .map(|(i, (d, m))| AcceptanceCriterion {
                    id: format!("AC-{:03}", i + 1),
                    description: d.to_string(),
                    verification_method: *m,
                })
                .collect(),
            constraints: vec![],
            out_of_scope: vec![],
        }
    }

    #[test]
    fn single_requirement_yields_pair() {
        let tasks = derive_tasks(&spec_with(&["Add login"], &[])).unwrap();
        assert_eq!(tasks.len(), 2);
        assert_eq!(tasks[0].id, "T001");
        assert_eq!(tasks[0].title, "Implement: add login");
        assert!(tasks[0].dependencies.is_empty());
        assert_eq!(tasks[0].estimate, Estimate(3));
        assert_eq!(tasks[0].priority, Priority::High);
        assert_eq!(tasks[1].id, "T002");
        assert_eq!(tasks[1].title, "Verify: add login");
        assert_eq!(tasks[1].dependencies, vec!["T001".to_string()]);
        assert_eq!(tasks[1].priority, Priority::High);
        assert_eq!(tasks[1].estimate, Estimate(2));
    }

    #[test]
    fn ids_run_across_requirements_then_criteria() {
        let spec = spec_with(
            &["Add login", "Add logout"],
            &[
                ("Login works in Safari", VerificationMethod::Automated),
                ("Security sign-off", VerificationMethod::Manual),
            ],
        );
        let tasks = derive_tasks(&spec).unwrap();
        let ids: Vec<&str> = tasks.iter().map(|t| t.id.as_str()).collect();
        assert_eq!(ids, vec!["T001", "T002", "T003", "T004", "T005", "T006"]);
        assert_eq!(tasks[3].dependencies, vec!["T003".to_string()]);
        assert!(tasks[4].title.starts_with("Validate: "));
        assert_eq!(tasks[4].estimate, Estimate(1));
        assert_eq!(tasks[5].estimate, Estimate(2));
    }

    #[test]
    fn estimate_heuristic_first_match_wins() {
        assert_eq!(Estimate::for_text("A simple form"), Estimate(2));
        assert_eq!(Estimate::for_text("Basic auth"), Estimate(2));
        assert_eq!(Estimate::for_text("Comprehensive audit log"), Estimate(8));
        assert_eq!(Estimate::for_text("Payment INTEGRATION"), Estimate(4));
        assert_eq!(Estimate::for_text("Refactor the parser"), Estimate(4));
        assert_eq!(Estimate::for_text("Simple but complex"), Estimate(2));
        assert_eq!(Estimate::for_text("Export CSV"), Estimate(3));
    }

    #[test]
    fn synthesized_acceptance_criteria() {
        let tasks = derive_tasks(&spec_with(&["Export CSV"], &[])).unwrap();
        assert_eq!(
            tasks[0].acceptance_criteria,
            vec!["Requirement satisfied", "Unit tests pass", "Code review approved"]
        );
        assert!(tasks[1].acceptance_criteria[0].contains("Happy path"));
        assert!(tasks[1].acceptance_criteria[1].contains("Edge cases"));
        assert!(tasks[1].acceptance_criteria[2].contains("Error conditions"));
    }

    #[test]
    fn blank_requirement_is_rejected() {
        let err = derive_tasks(&spec_with(&["  "], &[])).unwrap_err();
        assert!(matches!(err, DesignDocError::InvalidSpec { .. }));
    }

    #[test]
    fn estimate_serde() {
        let json = serde_json::to_string(&Estimate(8)).unwrap();
        assert_eq!(json, "\"8h\"");
        let parsed: Estimate = serde_json::from_str("\"4h\"").unwrap();
        assert_eq!(parsed, Estimate(4));
        assert!(serde_json::from_str::<Estimate>("\"soon\"").is_err());
    }

    #[test]
    fn fallback_uses_context_tasks() {
        let mut s = SessionRecord::default();
        s.context.insert(
            "tasks".into(),
            json!(["Set up CI", {"title": "Write docs"}, 3]),
        );
        let tasks = fallback_tasks(&FieldExtractor::new(&s));
        assert_eq!(tasks.len(), 2);
        assert_eq!(tasks[0].id, "T001");
        assert_eq!(tasks[1].title, "Write docs");
    }

    #[test]
    fn summaries() {
        let spec = spec_with(
            &["Add login"],
            &[("Works", VerificationMethod::Automated)],
        );
        let tasks = derive_tasks(&spec).unwrap();
        assert_eq!(total_estimate(&tasks), Estimate(6));
        let groups = tasks_by_phase(&tasks);
        let phases: Vec<&String> = groups.keys().collect();
        assert_eq!(phases, vec!["implementation", "verification", "validation"]);
    }
}
