use crate::error::{DesignDocError, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

// ---------------------------------------------------------------------------
// ConstitutionItem / RuleKind
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConstitutionItem {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub description: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RuleKind {
    Principle,
    Constraint,
    ArchitectureRule,
    DesignPrinciple,
}

impl RuleKind {
    /// Lookup order used by `Constitution::find`.
    pub fn all() -> &'static [RuleKind] {
        &[
            RuleKind::Principle,
            RuleKind::Constraint,
            RuleKind::ArchitectureRule,
            RuleKind::DesignPrinciple,
        ]
    }

    pub fn label(self) -> &'static str {
        match self {
            RuleKind::Principle => "principle",
            RuleKind::Constraint => "constraint",
            RuleKind::ArchitectureRule => "architecture rule",
            RuleKind::DesignPrinciple => "design principle",
        }
    }

    fn from_heading(heading: &str) -> Option<RuleKind> {
        let h = heading.trim().to_lowercase();
        if h.contains("architecture") {
            Some(RuleKind::ArchitectureRule)
        } else if h.contains("design principle") {
            Some(RuleKind::DesignPrinciple)
        } else if h.contains("principle") {
            Some(RuleKind::Principle)
        } else if h.contains("constraint") {
            Some(RuleKind::Constraint)
        } else {
            None
        }
    }
}

// ---------------------------------------------------------------------------
// Constitution
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Constitution {
    #[serde(default)]
    pub principles: Vec<ConstitutionItem>,
    #[serde(default)]
    pub constraints: Vec<ConstitutionItem>,
    #[serde(default)]
    pub architecture_rules: Vec<ConstitutionItem>,
    #[serde(default)]
    pub design_principles: Vec<ConstitutionItem>,
}

impl Constitution {
    pub fn items(&self, kind: RuleKind) -> &[ConstitutionItem] {
        match kind {
            RuleKind::Principle => &self.principles,
            RuleKind::Constraint => &self.constraints,
            RuleKind::ArchitectureRule => &self.architecture_rules,
            RuleKind::DesignPrinciple => &self.design_principles,
        }
    }

    fn items_mut(&mut self, kind: RuleKind) -> &mut Vec<ConstitutionItem> {
        match kind {
            RuleKind::Principle => &mut self.principles,
            RuleKind::Constraint => &mut self.constraints,
            RuleKind::ArchitectureRule => &mut self.architecture_rules,
            RuleKind::DesignPrinciple => &mut self.design_principles,
        }
    }

    /// First item with this id, searching principles, constraints,
    /// architecture rules, then design principles.
    pub fn find(&self, id: &str) -> Option<(RuleKind, &ConstitutionItem)> {
        RuleKind::all().iter().find_map(|kind| {
            self.items(*kind)
                .iter()
                .find(|item| item.id == id)
                .map(|item| (*kind, item))
        })
    }

    pub fn len(&self) -> usize {
        RuleKind::all().iter().map(|k| self.items(*k).len()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    // -----------------------------------------------------------------------
    // Sources
    // -----------------------------------------------------------------------

    pub fn from_yaml_str(data: &str) -> Result<Self> {
        Ok(serde_yaml::from_str(data)?)
    }

    pub fn from_json_str(data: &str) -> Result<Self> {
        Ok(serde_json::from_str(data)?)
    }

    /// Parse a markdown constitution:
    ///
    /// ```text
    /// ## Principles
    /// ### P1: Simplicity first
    /// Prefer the simplest design that works.
    /// ```
    ///
    /// `##` headings select the collection and `### ID: Title` starts an item.
    /// Lines up to the next heading form its description.
    pub fn from_markdown(data: &str) -> Result<Self> {
        let mut constitution = Constitution::default();
        let mut kind: Option<RuleKind> = None;
        let mut current: Option<(RuleKind, ConstitutionItem)> = None;

        for (lineno, line) in data.lines().enumerate() {
            let trimmed = line.trim();
            if let Some(heading) = trimmed.strip_prefix("### ") {
                if let Some((k, item)) = current.take() {
                    constitution.items_mut(k).push(item);
                }
                let Some(k) = kind else {
                    return Err(DesignDocError::InvalidConstitution(format!(
                        "line {}: item outside of a section",
                        lineno + 1
                    )));
                };
                let (id, title) = heading.split_once(':').ok_or_else(|| {
                    DesignDocError::InvalidConstitution(format!(
                        "line {}: expected '### ID: Title'",
                        lineno + 1
                    ))
                })?;
                current = Some((
                    k,
                    ConstitutionItem {
                        id: id.trim().to_string(),
                        title: title.trim().to_string(),
                        description: String::new(),
                    },
                ));
            } else if let Some(heading) = trimmed.strip_prefix("## ") {
                if let Some((k, item)) = current.take() {
                    constitution.items_mut(k).push(item);
                }
                kind = RuleKind::from_heading(heading);
            } else if let Some((_, item)) = current.as_mut() {
                if !trimmed.is_empty() {
                    if !item.description.is_empty() {
                        item.description.push(' ');
                    }
                    item.description.push_str(trimmed);
                }
            }
        }
        if let Some((k, item)) = current.take() {
            constitution.items_mut(k).push(item);
        }
        Ok(constitution)
    }

    /// Load by extension: `.yaml`/`.yml`, `.json`, or `.md`.
    pub fn load(path: &Path) -> Result<Self> {
        let data = std::fs::read_to_string(path)?;
        match path.extension().and_then(|e| e.to_str()) {
            Some("yaml") | Some("yml") => Self::from_yaml_str(&data),
            Some("json") => Self::from_json_str(&data),
            Some("md") | Some("markdown") => Self::from_markdown(&data),
            _ => Err(DesignDocError::InvalidConstitution(format!(
                "unsupported file type: {}",
                path.display()
            ))),
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    const MARKDOWN: &str = "\
# Project Constitution

## Principles
### P1: Simplicity first
Prefer the simplest design
that works.

### P2: Tests before merge

## Constraints
### C1: No external services
Everything runs on-prem.

## Architecture Rules
### AR1: Layered modules

## Design Principles
### DP1: Explicit errors
";

    #[test]
    fn markdown_sections_and_items() {
        let c = Constitution::from_markdown(MARKDOWN).unwrap();
        assert_eq!(c.principles.len(), 2);
        assert_eq!(c.principles[0].id, "P1");
        assert_eq!(c.principles[0].title, "Simplicity first");
        assert_eq!(c.principles[0].description, "Prefer the simplest design that works.");
        assert_eq!(c.principles[1].description, "");
        assert_eq!(c.constraints[0].id, "C1");
        assert_eq!(c.architecture_rules[0].id, "AR1");
        assert_eq!(c.design_principles[0].id, "DP1");
        assert_eq!(c.len(), 5);
    }

    #[test]
    fn markdown_item_without_section_is_error() {
        let err = Constitution::from_markdown("### P1: Orphan\n").unwrap_err();
        assert!(matches!(err, DesignDocError::InvalidConstitution(_)));
    }

    #[test]
    fn markdown_item_without_colon_is_error() {
        let err = Constitution::from_markdown("## Principles\n### Missing colon\n").unwrap_err();
        assert!(err.to_string().contains("line 2"));
    }

    #[test]
    fn find_searches_in_fixed_order() {
        let c = Constitution {
            principles: vec![ConstitutionItem {
                id: "X1".into(),
                title: "From principles".into(),
                description: String::new(),
            }],
            design_principles: vec![ConstitutionItem {
                id: "X1".into(),
                title: "From design principles".into(),
                description: String::new(),
            }],
            ..Constitution::default()
        };
        let (kind, item) = c.find("X1").unwrap();
        assert_eq!(kind, RuleKind::Principle);
        assert_eq!(item.title, "From principles");
        assert!(c.find("nope").is_none());
    }

    #[test]
    fn yaml_constitution() {
        let yaml = "\
constraints:
  - id: C1
    title: No external services
architectureRules:
  - id: AR1
    title: Layered modules
    description: UI never touches storage
";
        let c = Constitution::from_yaml_str(yaml).unwrap();
        assert!(c.principles.is_empty());
        assert_eq!(c.find("AR1").unwrap().0, RuleKind::ArchitectureRule);
    }

    #[test]
    fn load_by_extension() {
        let mut md = tempfile::Builder::new().suffix(".md").tempfile().unwrap();
        md.write_all(MARKDOWN.as_bytes()).unwrap();
        let c = Constitution::load(md.path()).unwrap();
        assert_eq!(c.len(), 5);

        let mut json = tempfile::Builder::new().suffix(".json").tempfile().unwrap();
        json.write_all(br#"{"principles": [{"id": "P9", "title": "Ship it"}]}"#)
            .unwrap();
        let c = Constitution::load(json.path()).unwrap();
        assert_eq!(c.principles[0].id, "P9");

        let txt = tempfile::Builder::new().suffix(".txt").tempfile().unwrap();
        assert!(Constitution::load(txt.path()).is_err());
    }
}
