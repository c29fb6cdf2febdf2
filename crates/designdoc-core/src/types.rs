use serde::{Deserialize, Serialize};
use std::fmt;

// ---------------------------------------------------------------------------
// Approach
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Approach {
    Chat,
    Rfc,
    Adr,
    Sdd,
    #[serde(rename = "speckit")]
    SpecKit,
    Togaf,
    Enterprise,
}

impl Approach {
    pub fn all() -> &'static [Approach] {
        &[
            Approach::Chat,
            Approach::Rfc,
            Approach::Adr,
            Approach::Sdd,
            Approach::SpecKit,
            Approach::Togaf,
            Approach::Enterprise,
        ]
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Approach::Chat => "chat",
            Approach::Rfc => "rfc",
            Approach::Adr => "adr",
            Approach::Sdd => "sdd",
            Approach::SpecKit => "speckit",
            Approach::Togaf => "togaf",
            Approach::Enterprise => "enterprise",
        }
    }
}

impl fmt::Display for Approach {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Approach {
    type Err = crate::error::DesignDocError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "chat" => Ok(Approach::Chat),
            "rfc" => Ok(Approach::Rfc),
            "adr" => Ok(Approach::Adr),
            "sdd" => Ok(Approach::Sdd),
            "speckit" | "spec-kit" | "spec_kit" => Ok(Approach::SpecKit),
            "togaf" => Ok(Approach::Togaf),
            "enterprise" => Ok(Approach::Enterprise),
            _ => Err(crate::error::DesignDocError::UnknownApproach(s.to_string())),
        }
    }
}

// ---------------------------------------------------------------------------
// Priority
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Priority {
    High,
    Medium,
    Low,
}

impl Priority {
    /// Exact, case-sensitive match on the three tags. Anything else is `None`.
    pub fn parse_exact(s: &str) -> Option<Priority> {
        match s {
            "high" => Some(Priority::High),
            "medium" => Some(Priority::Medium),
            "low" => Some(Priority::Low),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Priority::High => "high",
            Priority::Medium => "medium",
            Priority::Low => "low",
        }
    }
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Risk severity shares the high/medium/low scale.
pub type RiskSeverity = Priority;

// ---------------------------------------------------------------------------
// VerificationMethod
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VerificationMethod {
    Automated,
    Manual,
}

impl fmt::Display for VerificationMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            VerificationMethod::Automated => "automated",
            VerificationMethod::Manual => "manual",
        };
        f.write_str(s)
    }
}

// ---------------------------------------------------------------------------
// IssueSeverity
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IssueSeverity {
    Error,
    Warning,
    Info,
}

impl IssueSeverity {
    pub fn all() -> &'static [IssueSeverity] {
        &[IssueSeverity::Error, IssueSeverity::Warning, IssueSeverity::Info]
    }

    pub fn heading(self) -> &'static str {
        match self {
            IssueSeverity::Error => "Errors",
            IssueSeverity::Warning => "Warnings",
            IssueSeverity::Info => "Info",
        }
    }
}

impl fmt::Display for IssueSeverity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            IssueSeverity::Error => "error",
            IssueSeverity::Warning => "warning",
            IssueSeverity::Info => "info",
        };
        f.write_str(s)
    }
}

// ---------------------------------------------------------------------------
// DocumentFormat
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DocumentFormat {
    Markdown,
    Yaml,
    Mermaid,
}

impl fmt::Display for DocumentFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            DocumentFormat::Markdown => "markdown",
            DocumentFormat::Yaml => "yaml",
            DocumentFormat::Mermaid => "mermaid",
        };
        f.write_str(s)
    }
}

// ---------------------------------------------------------------------------
// CrossCuttingCapability
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CrossCuttingCapability {
    Workflow,
    Diagram,
    Issues,
}

impl CrossCuttingCapability {
    pub fn as_str(self) -> &'static str {
        match self {
            CrossCuttingCapability::Workflow => "workflow",
            CrossCuttingCapability::Diagram => "diagram",
            CrossCuttingCapability::Issues => "issues",
        }
    }
}

impl fmt::Display for CrossCuttingCapability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for CrossCuttingCapability {
    type Err = crate::error::DesignDocError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "workflow" => Ok(CrossCuttingCapability::Workflow),
            "diagram" => Ok(CrossCuttingCapability::Diagram),
            "issues" => Ok(CrossCuttingCapability::Issues),
            _ => Err(crate::error::DesignDocError::UnknownCapability(
                s.to_string(),
            )),
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
