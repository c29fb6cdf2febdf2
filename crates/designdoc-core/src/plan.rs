use crate::extract::{item_label, value_str, value_string_list, FieldExtractor};
use crate::session::ContextKey;
use crate::spec::sequence_id;
use crate::types::{Priority, RiskSeverity};
use regex::Regex;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::sync::OnceLock;

pub const DEFAULT_APPROACH: &str = "Iterative delivery: refine requirements, design, build, then verify each increment.";
pub const DEFAULT_MITIGATION: &str = "To be defined";

// ---------------------------------------------------------------------------
// Plan entities
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlanPhase {
    pub id: String,
    pub name: String,
    pub description: String,
    pub deliverables: Vec<String>,
    pub duration: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Dependency {
    pub id: String,
    pub description: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub owner: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Risk {
    pub id: String,
    pub description: String,
    pub severity: RiskSeverity,
    pub mitigation: String,
}

/// Inclusive week range of one phase; `phase` holds the phase id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TimelineEntry {
    pub phase: String,
    pub start_week: u32,
    pub end_week: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Plan {
    pub approach: String,
    pub phases: Vec<PlanPhase>,
    pub dependencies: Vec<Dependency>,
    pub risks: Vec<Risk>,
    pub timeline: Vec<TimelineEntry>,
}

impl Plan {
    pub fn phase_for(&self, entry: &TimelineEntry) -> Option<&PlanPhase> {
        self.phases.iter().find(|p| p.id == entry.phase)
    }

    /// Last week covered by the timeline; 0 when there are no phases.
    pub fn total_weeks(&self) -> u32 {
        self.timeline.last().map(|t| t.end_week).unwrap_or(0)
    }
}

// ---------------------------------------------------------------------------
// Derivation
// ---------------------------------------------------------------------------

pub fn derive_plan(ex: &FieldExtractor<'_>) -> Plan {
    let phases = derive_phases(ex);
    let timeline = compute_timeline(&phases);
    Plan {
        approach: ex
            .approach()
            .unwrap_or_else(|| DEFAULT_APPROACH.to_string()),
        phases,
        dependencies: derive_dependencies(ex),
        risks: derive_risks(ex),
        timeline,
    }
}

/// Phases from the session's `phases` map in insertion order, or the four
/// canonical defaults when the map is absent or empty.
pub fn derive_phases(ex: &FieldExtractor<'_>) -> Vec<PlanPhase> {
    let Some(map) = ex.session().phases.as_ref().filter(|m| !m.is_empty()) else {
        return default_phases();
    };
    map.iter()
        .enumerate()
        .map(|(i, (name, detail))| phase_from_detail(i, name, detail))
        .collect()
}

fn phase_from_detail(index: usize, name: &str, detail: &Value) -> PlanPhase {
    let description = match detail {
        Value::String(_) => value_str(detail),
        Value::Object(map) => map.get("description").and_then(value_str),
        _ => None,
    }
    .unwrap_or_else(|| format!("{name} phase"));

    let deliverables = detail
        .get("deliverables")
        .and_then(value_string_list)
        .filter(|d| !d.is_empty())
        .unwrap_or_else(|| vec![format!("{name} deliverables")]);

    let duration = detail
        .get("duration")
        .and_then(value_str)
        .unwrap_or_else(|| "1 week".to_string());

    PlanPhase {
        id: sequence_id("PHASE", index),
        name: name.to_string(),
        description,
        deliverables,
        duration,
    }
}

pub fn default_phases() -> Vec<PlanPhase> {
    let defaults: [(&str, &str, &[&str], &str); 4] = [
        (
            "Requirements Gathering",
            "Collect and confirm functional and non-functional requirements",
            &["Requirements document", "Acceptance criteria"],
            "1 week",
        ),
        (
            "Design & Architecture",
            "Define architecture, interfaces and data model",
            &["Architecture design", "Interface definitions"],
            "2 weeks",
        ),
        (
            "Implementation",
            "Build features against the agreed design",
            &["Working software", "Unit tests"],
            "4 weeks",
        ),
        (
            "Testing & Validation",
            "Verify behaviour against acceptance criteria",
            &["Test report", "Release sign-off"],
            "1 week",
        ),
    ];
    defaults
        .iter()
        .enumerate()
        .map(|(i, (name, description, deliverables, duration))| PlanPhase {
            id: sequence_id("PHASE", i),
            name: name.to_string(),
            description: description.to_string(),
            deliverables: deliverables.iter().map(|d| d.to_string()).collect(),
            duration: duration.to_string(),
        })
        .collect()
}

pub fn derive_dependencies(ex: &FieldExtractor<'_>) -> Vec<Dependency> {
    ex.entries(ContextKey::Dependencies)
        .iter()
        .filter_map(|entry| {
            let description = item_label(entry)?;
            let owner = entry.get("owner").and_then(value_str);
            Some((description, owner, entry.get("id").and_then(value_str)))
        })
        .enumerate()
        .map(|(i, (description, owner, id))| Dependency {
            id: id.unwrap_or_else(|| sequence_id("DEP", i)),
            description,
            owner,
        })
        .collect()
}

pub fn derive_risks(ex: &FieldExtractor<'_>) -> Vec<Risk> {
    ex.entries(ContextKey::Risks)
        .iter()
        .filter_map(|entry| {
            let description = match entry {
                Value::Object(map) => map
                    .get("description")
                    .and_then(value_str)
                    .or_else(|| item_label(entry)),
                _ => item_label(entry),
            }?;
            let severity = match entry.get("severity").and_then(Value::as_str) {
                Some("high") => Priority::High,
                Some("low") => Priority::Low,
                _ => Priority::Medium,
            };
            let mitigation = entry
                .get("mitigation")
                .and_then(value_str)
                .unwrap_or_else(|| DEFAULT_MITIGATION.to_string());
            Some((description, severity, mitigation, entry.get("id").and_then(value_str)))
        })
        .enumerate()
        .map(|(i, (description, severity, mitigation, id))| Risk {
            id: id.unwrap_or_else(|| sequence_id("RISK", i)),
            description,
            severity,
            mitigation,
        })
        .collect()
}

// ---------------------------------------------------------------------------
// Timeline
// ---------------------------------------------------------------------------

static WEEKS_RE: OnceLock<Regex> = OnceLock::new();

fn weeks_re() -> &'static Regex {
    WEEKS_RE.get_or_init(|| Regex::new(r"(?i)(\d+)\s*week").unwrap())
}

/// Longest duration a single phase may claim, ten years.
pub const MAX_PHASE_WEEKS: u32 = 520;

/// Whole weeks named by a duration like "3 weeks"; 1 when absent or zero,
/// capped at `MAX_PHASE_WEEKS`. Counts too large for `u32` also cap.
pub fn parse_weeks(duration: &str) -> u32 {
    weeks_re()
        .captures(duration)
        .and_then(|c| c.get(1))
        .map(|m| {
            let digits = m.as_str().trim_start_matches('0');
            if digits.len() > 9 {
                MAX_PHASE_WEEKS
            } else {
                digits.parse::<u32>().unwrap_or(0).min(MAX_PHASE_WEEKS)
            }
        })
        .filter(|w| *w > 0)
        .unwrap_or(1)
}

/// Back-to-back week ranges, one per phase, starting at week 1.
pub fn compute_timeline(phases: &[PlanPhase]) -> Vec<TimelineEntry> {
    let mut current_week: u32 = 1;
    phases
        .iter()
        .map(|phase| {
            let weeks = parse_weeks(&phase.duration);
            let end_week = current_week.saturating_add(weeks - 1);
            let entry = TimelineEntry {
                phase: phase.id.clone(),
                start_week: current_week,
                end_week,
            };
            current_week = end_week.saturating_add(1);
            entry
        })
        .collect()
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
