use crate::constitution::Constitution;
use crate::error::Result;
use crate::types::CrossCuttingCapability;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::Path;

// ---------------------------------------------------------------------------
// ConfigWarning / WarnLevel
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConfigWarning {
    pub level: WarnLevel,
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WarnLevel {
    Warning,
    Error,
}

// ---------------------------------------------------------------------------
// RenderOptions
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RenderOptions {
    /// Append a metadata footer (session id, phase, status, timestamp).
    #[serde(default = "default_true")]
    pub include_metadata: bool,
    /// Run the constraint validator where a strategy supports it.
    #[serde(default = "default_true")]
    pub validate: bool,
    /// Abort rendering when validation reports errors instead of appending them.
    #[serde(default)]
    pub fail_on_validation_errors: bool,
    /// Emit the progress document alongside the Spec-Kit set.
    #[serde(default = "default_true")]
    pub include_progress: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub constitution: Option<Constitution>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub cross_cutting: Vec<CrossCuttingCapability>,
    /// Stamp written into metadata footers. Never read from the clock.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub generated_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub author: Option<String>,
}

fn default_true() -> bool {
    true
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            include_metadata: true,
            validate: true,
            fail_on_validation_errors: false,
            include_progress: true,
            constitution: None,
            cross_cutting: Vec::new(),
            generated_at: None,
            author: None,
        }
    }
}

impl RenderOptions {
    pub fn from_yaml_str(data: &str) -> Result<Self> {
        Ok(serde_yaml::from_str(data)?)
    }

    pub fn load(path: &Path) -> Result<Self> {
        let data = std::fs::read_to_string(path)?;
        Self::from_yaml_str(&data)
    }

    pub fn with_constitution(mut self, constitution: Constitution) -> Self {
        self.constitution = Some(constitution);
        self
    }

    pub fn without_metadata(mut self) -> Self {
        self.include_metadata = false;
        self
    }

    // -----------------------------------------------------------------------
    // Validation
    // -----------------------------------------------------------------------

    pub fn validate(&self) -> Vec<ConfigWarning> {
        let mut warnings = Vec::new();

        if self.fail_on_validation_errors && !self.validate {
            warnings.push(ConfigWarning {
                level: WarnLevel::Error,
                message: "fail_on_validation_errors is set but validate is false".to_string(),
            });
        }

        if self.fail_on_validation_errors && self.constitution.is_none() {
            warnings.push(ConfigWarning {
                level: WarnLevel::Warning,
                message: "fail_on_validation_errors without a constitution only checks spec structure"
                    .to_string(),
            });
        }

        let mut seen: Vec<CrossCuttingCapability> = Vec::new();
        for cap in &self.cross_cutting {
            if seen.contains(cap) {
                warnings.push(ConfigWarning {
                    level: WarnLevel::Warning,
                    message: format!("cross-cutting capability '{cap}' listed more than once"),
                });
            } else {
                seen.push(*cap);
            }
        }

        warnings
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
