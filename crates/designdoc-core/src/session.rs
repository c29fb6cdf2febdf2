use chrono::{DateTime, Utc};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;

// ---------------------------------------------------------------------------
// SessionConfig
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SessionConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub goal: Option<String>,
    #[serde(default)]
    pub requirements: Vec<String>,
    #[serde(default)]
    pub constraints: Vec<String>,
}

// ---------------------------------------------------------------------------
// PhaseTransition
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PhaseTransition {
    pub from: String,
    pub to: String,
    pub timestamp: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

// ---------------------------------------------------------------------------
// ContextKey
// ---------------------------------------------------------------------------

/// Known fields of the open `context` bag. Each key accepts a camelCase and a
/// snake_case spelling, plus a few historical aliases; the first present
/// spelling wins. Keys outside this set are extensions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ContextKey {
    Title,
    Overview,
    Objectives,
    Requirements,
    NonFunctionalRequirements,
    AcceptanceCriteria,
    Constraints,
    OutOfScope,
    SuccessCriteria,
    Risks,
    Dependencies,
    Milestones,
    Tasks,
    Approach,
    Decision,
    Alternatives,
    Consequences,
    Stakeholders,
    BusinessDrivers,
    DataEntities,
    Applications,
    Technologies,
    Components,
    Interfaces,
    Security,
    Deployment,
    Monitoring,
}

impl ContextKey {
    pub fn all() -> &'static [ContextKey] {
        &[
            ContextKey::Title,
            ContextKey::Overview,
            ContextKey::Objectives,
            ContextKey::Requirements,
            ContextKey::NonFunctionalRequirements,
            ContextKey::AcceptanceCriteria,
            ContextKey::Constraints,
            ContextKey::OutOfScope,
            ContextKey::SuccessCriteria,
            ContextKey::Risks,
            ContextKey::Dependencies,
            ContextKey::Milestones,
            ContextKey::Tasks,
            ContextKey::Approach,
            ContextKey::Decision,
            ContextKey::Alternatives,
            ContextKey::Consequences,
            ContextKey::Stakeholders,
            ContextKey::BusinessDrivers,
            ContextKey::DataEntities,
            ContextKey::Applications,
            ContextKey::Technologies,
            ContextKey::Components,
            ContextKey::Interfaces,
            ContextKey::Security,
            ContextKey::Deployment,
            ContextKey::Monitoring,
        ]
    }

    pub fn aliases(self) -> &'static [&'static str] {
        match self {
            ContextKey::Title => &["title", "name"],
            ContextKey::Overview => &["overview", "description", "summary"],
            ContextKey::Objectives => &["objectives", "goals"],
            ContextKey::Requirements => &[
                "requirements",
                "functionalRequirements",
                "functional_requirements",
            ],
            ContextKey::NonFunctionalRequirements => {
                &["nonFunctionalRequirements", "non_functional_requirements"]
            }
            ContextKey::AcceptanceCriteria => &["acceptanceCriteria", "acceptance_criteria"],
            ContextKey::Constraints => &["constraints"],
            ContextKey::OutOfScope => &["outOfScope", "out_of_scope", "nonGoals", "non_goals"],
            ContextKey::SuccessCriteria => &["successCriteria", "success_criteria"],
            ContextKey::Risks => &["risks"],
            ContextKey::Dependencies => &["dependencies"],
            ContextKey::Milestones => &["milestones"],
            ContextKey::Tasks => &["tasks"],
            ContextKey::Approach => &["approach", "proposal", "solution"],
            ContextKey::Decision => &["decision", "decisions"],
            ContextKey::Alternatives => &["alternatives", "options"],
            ContextKey::Consequences => &["consequences", "tradeoffs", "trade_offs"],
            ContextKey::Stakeholders => &["stakeholders"],
            ContextKey::BusinessDrivers => &["businessDrivers", "business_drivers", "businessGoals"],
            ContextKey::DataEntities => &["dataEntities", "data_entities", "dataModel", "data_model"],
            ContextKey::Applications => &["applications", "services"],
            ContextKey::Technologies => &["technologies", "techStack", "tech_stack"],
            ContextKey::Components => &["components", "modules"],
            ContextKey::Interfaces => &["interfaces", "apis", "api"],
            ContextKey::Security => &["security", "securityRequirements", "security_requirements"],
            ContextKey::Deployment => &["deployment", "infrastructure"],
            ContextKey::Monitoring => &["monitoring", "observability", "operations"],
        }
    }

    pub fn is_known(name: &str) -> bool {
        Self::all().iter().any(|k| k.aliases().contains(&name))
    }
}

// ---------------------------------------------------------------------------
// SessionRecord
// ---------------------------------------------------------------------------

/// The design session as handed over by the workflow manager. Read-only here.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SessionRecord {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub phase: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub config: Option<SessionConfig>,
    #[serde(default)]
    pub context: IndexMap<String, Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phases: Option<IndexMap<String, Value>>,
    #[serde(default)]
    pub history: Vec<PhaseTransition>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub artifacts: Option<IndexMap<String, Value>>,
}

impl SessionRecord {
    pub fn new(id: impl Into<String>, phase: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            phase: phase.into(),
            ..Self::default()
        }
    }

    pub fn from_json_str(data: &str) -> crate::error::Result<Self> {
        Ok(serde_json::from_str(data)?)
    }

    pub fn from_yaml_str(data: &str) -> crate::error::Result<Self> {
        Ok(serde_yaml::from_str(data)?)
    }

    /// First present spelling of a known context key, regardless of shape.
    pub fn context_value(&self, key: ContextKey) -> Option<&Value> {
        key.aliases()
            .iter()
            .find_map(|alias| self.context.get(*alias))
            .filter(|v| !v.is_null())
    }

    /// Context entries whose keys are not part of the known set, in insertion order.
    pub fn extensions(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.context
            .iter()
            .filter(|(k, _)| !ContextKey::is_known(k))
            .map(|(k, v)| (k.as_str(), v))
    }

    pub fn goal(&self) -> Option<&str> {
        self.config
            .as_ref()
            .and_then(|c| c.goal.as_deref())
            .map(str::trim)
            .filter(|g| !g.is_empty())
    }

    pub fn config_requirements(&self) -> &[String] {
        self.config
            .as_ref()
            .map(|c| c.requirements.as_slice())
            .unwrap_or(&[])
    }

    pub fn config_constraints(&self) -> &[String] {
        self.config
            .as_ref()
            .map(|c| c.constraints.as_slice())
            .unwrap_or(&[])
    }

    pub fn has_phases(&self) -> bool {
        self.phases.as_ref().is_some_and(|p| !p.is_empty())
    }

    /// Timestamp of the most recent phase transition, if any.
    pub fn last_updated(&self) -> Option<DateTime<Utc>> {
        self.history.iter().map(|t| t.timestamp).max()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
