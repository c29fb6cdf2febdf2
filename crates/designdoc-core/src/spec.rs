use crate::error::{DesignDocError, Result};
use crate::extract::{value_str, FieldExtractor};
use crate::session::{ContextKey, SessionRecord};
use crate::types::{Priority, VerificationMethod};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

// ---------------------------------------------------------------------------
// Requirement / AcceptanceCriterion
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Requirement {
    pub id: String,
    pub description: String,
    pub priority: Priority,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AcceptanceCriterion {
    pub id: String,
    pub description: String,
    pub verification_method: VerificationMethod,
}

// ---------------------------------------------------------------------------
// ParsedSpec
// ---------------------------------------------------------------------------

/// Structured view of a session used as input to task derivation and
/// validation. Building one is strict about shapes, unlike `FieldExtractor`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ParsedSpec {
    pub title: String,
    pub overview: String,
    pub objectives: Vec<String>,
    pub functional_requirements: Vec<Requirement>,
    pub non_functional_requirements: Vec<Requirement>,
    pub acceptance_criteria: Vec<AcceptanceCriterion>,
    pub constraints: Vec<String>,
    pub out_of_scope: Vec<String>,
}

impl ParsedSpec {
    /// Build from a session. A context list field that is present but not an
    /// array, or holds an entry with no usable text, is an `InvalidSpec` error.
    pub fn from_session(session: &SessionRecord) -> Result<Self> {
        let ex = FieldExtractor::new(session);

        let functional_requirements = if session
            .config_requirements()
            .iter()
            .any(|r| !r.trim().is_empty())
        {
            ex.requirements()
                .into_iter()
                .enumerate()
                .map(|(i, description)| Requirement {
                    id: sequence_id("FR", i),
                    description,
                    priority: Priority::High,
                })
                .collect()
        } else {
            parse_requirements(
                optional_array(session, ContextKey::Requirements)?,
                "requirements",
                "FR",
                Priority::High,
            )?
        };

        let non_functional_requirements = parse_requirements(
            optional_array(session, ContextKey::NonFunctionalRequirements)?,
            "nonFunctionalRequirements",
            "NFR",
            Priority::Medium,
        )?;

        let acceptance_criteria = parse_criteria(
            optional_array(session, ContextKey::AcceptanceCriteria)?,
            "acceptanceCriteria",
        )?;

        let constraints = if session
            .config_constraints()
            .iter()
            .any(|c| !c.trim().is_empty())
        {
            ex.constraints()
        } else {
            parse_strings(optional_array(session, ContextKey::Constraints)?, "constraints")?
        };

        Ok(Self {
            title: ex.title(),
            overview: ex.overview(),
            objectives: parse_strings(
                optional_array(session, ContextKey::Objectives)?,
                "objectives",
            )?,
            functional_requirements,
            non_functional_requirements,
            acceptance_criteria,
            constraints,
            out_of_scope: parse_strings(
                optional_array(session, ContextKey::OutOfScope)?,
                "outOfScope",
            )?,
        })
    }

    /// Build from a caller-supplied JSON object. Every list field is required.
    pub fn from_value(value: &Value) -> Result<Self> {
        let obj = value
            .as_object()
            .ok_or_else(|| DesignDocError::invalid_spec("spec", "expected an object"))?;

        Ok(Self {
            title: obj
                .get("title")
                .and_then(value_str)
                .ok_or_else(|| DesignDocError::invalid_spec("title", "missing or blank"))?,
            overview: obj.get("overview").and_then(value_str).unwrap_or_default(),
            objectives: parse_strings(required_array(obj, "objectives")?, "objectives")?,
            functional_requirements: parse_requirements(
                required_array(obj, "functionalRequirements")?,
                "functionalRequirements",
                "FR",
                Priority::High,
            )?,
            non_functional_requirements: parse_requirements(
                required_array(obj, "nonFunctionalRequirements")?,
                "nonFunctionalRequirements",
                "NFR",
                Priority::Medium,
            )?,
            acceptance_criteria: parse_criteria(
                required_array(obj, "acceptanceCriteria")?,
                "acceptanceCriteria",
            )?,
            constraints: parse_strings(required_array(obj, "constraints")?, "constraints")?,
            out_of_scope: parse_strings(required_array(obj, "outOfScope")?, "outOfScope")?,
        })
    }

    pub fn from_json_str(data: &str) -> Result<Self> {
        let value: Value = serde_json::from_str(data)?;
        Self::from_value(&value)
    }

    /// Functional then non-functional, in declaration order.
    pub fn all_requirements(&self) -> impl Iterator<Item = &Requirement> {
        self.functional_requirements
            .iter()
            .chain(self.non_functional_requirements.iter())
    }

    pub fn has_structured_data(&self) -> bool {
        !self.functional_requirements.is_empty()
            || !self.non_functional_requirements.is_empty()
            || !self.acceptance_criteria.is_empty()
    }
}

// ---------------------------------------------------------------------------
// Shape checks
// ---------------------------------------------------------------------------

pub(crate) fn sequence_id(prefix: &str, index: usize) -> String {
    format!("{prefix}-{:03}", index + 1)
}

fn optional_array(session: &SessionRecord, key: ContextKey) -> Result<&[Value]> {
    match session.context_value(key) {
        None => Ok(&[]),
        Some(Value::Array(items)) => Ok(items.as_slice()),
        Some(_) => Err(DesignDocError::invalid_spec(
            key.aliases()[0],
            "expected an array",
        )),
    }
}

fn required_array<'a>(obj: &'a Map<String, Value>, field: &str) -> Result<&'a [Value]> {
    match obj.get(field) {
        Some(Value::Array(items)) => Ok(items.as_slice()),
        Some(_) => Err(DesignDocError::invalid_spec(field, "expected an array")),
        None => Err(DesignDocError::invalid_spec(field, "missing")),
    }
}

fn entry_text(entry: &Value) -> Option<String> {
    match entry {
        Value::String(_) => value_str(entry),
        Value::Object(map) => map
            .get("description")
            .or_else(|| map.get("title"))
            .and_then(value_str),
        _ => None,
    }
}

fn parse_strings(items: &[Value], field: &str) -> Result<Vec<String>> {
    items
        .iter()
        .enumerate()
        .map(|(i, entry)| {
            entry_text(entry).ok_or_else(|| {
                DesignDocError::invalid_spec(format!("{field}[{i}]"), "expected text")
            })
        })
        .collect()
}

fn parse_requirements(
    items: &[Value],
    field: &str,
    prefix: &str,
    default_priority: Priority,
) -> Result<Vec<Requirement>> {
    items
        .iter()
        .enumerate()
        .map(|(i, entry)| {
            let description = entry_text(entry).ok_or_else(|| {
                DesignDocError::invalid_spec(
                    format!("{field}[{i}]"),
                    "expected a string or an object with a description",
                )
            })?;
            let id = entry
                .get("id")
                .and_then(value_str)
                .unwrap_or_else(|| sequence_id(prefix, i));
            let priority = entry
                .get("priority")
                .and_then(Value::as_str)
                .and_then(Priority::parse_exact)
                .unwrap_or(default_priority);
            Ok(Requirement {
                id,
                description,
                priority,
            })
        })
        .collect()
}

fn parse_criteria(items: &[Value], field: &str) -> Result<Vec<AcceptanceCriterion>> {
    items
        .iter()
        .enumerate()
        .map(|(i, entry)| {
            let description = entry_text(entry).ok_or_else(|| {
                DesignDocError::invalid_spec(
                    format!("{field}[{i}]"),
                    "expected a string or an object with a description",
                )
            })?;
            let id = entry
                .get("id")
                .and_then(value_str)
                .unwrap_or_else(|| sequence_id("AC", i));
            let verification_method = match entry
                .get("verificationMethod")
                .or_else(|| entry.get("verification_method"))
                .and_then(Value::as_str)
            {
                Some("automated") => VerificationMethod::Automated,
                _ => VerificationMethod::Manual,
            };
            Ok(AcceptanceCriterion {
                id,
                description,
                verification_method,
            })
        })
        .collect()
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
