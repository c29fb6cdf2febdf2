use crate::types::{CrossCuttingCapability, DocumentFormat};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutputDocument {
    pub name: String,
    pub content: String,
    pub format: DocumentFormat,
}

impl OutputDocument {
    pub fn new(name: impl Into<String>, content: impl Into<String>, format: DocumentFormat) -> Self {
        Self {
            name: name.into(),
            content: content.into(),
            format,
        }
    }

    pub fn markdown(name: impl Into<String>, content: impl Into<String>) -> Self {
        Self::new(name, content, DocumentFormat::Markdown)
    }
}

/// An additive, format-independent output attached to any strategy's result.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CrossCuttingArtifact {
    pub capability: CrossCuttingCapability,
    pub name: String,
    pub content: String,
    pub format: DocumentFormat,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OutputArtifacts {
    pub primary: OutputDocument,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub secondary: Vec<OutputDocument>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub cross_cutting: Vec<CrossCuttingArtifact>,
}

impl OutputArtifacts {
    pub fn single(primary: OutputDocument) -> Self {
        Self {
            primary,
            secondary: Vec::new(),
            cross_cutting: Vec::new(),
        }
    }

    pub fn with_secondary(primary: OutputDocument, secondary: Vec<OutputDocument>) -> Self {
        Self {
            primary,
            secondary,
            cross_cutting: Vec::new(),
        }
    }

    /// Primary first, then secondaries in order.
    pub fn documents(&self) -> impl Iterator<Item = &OutputDocument> {
        std::iter::once(&self.primary).chain(self.secondary.iter())
    }

    pub fn document(&self, name: &str) -> Option<&OutputDocument> {
        self.documents().find(|d| d.name == name)
    }

    pub fn document_count(&self) -> usize {
        1 + self.secondary.len()
    }
}
