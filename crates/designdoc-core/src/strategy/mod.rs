pub mod adr;
pub mod chat;
pub mod enterprise;
pub mod rfc;
pub mod sdd;
pub mod speckit;
pub mod togaf;

mod markdown;

use crate::config::RenderOptions;
use crate::cross_cutting;
use crate::domain::{DomainResult, PROMPT_RESULT, SESSION_STATE};
use crate::error::{DesignDocError, Result};
use crate::output::OutputArtifacts;
use crate::session::SessionRecord;
use crate::text::slugify;
use crate::types::{Approach, CrossCuttingCapability};

pub use adr::AdrStrategy;
pub use chat::ChatStrategy;
pub use enterprise::EnterpriseStrategy;
pub use rfc::RfcStrategy;
pub use sdd::SddStrategy;
pub use speckit::SpecKitStrategy;
pub use togaf::TogafStrategy;

// ---------------------------------------------------------------------------
// OutputStrategy
// ---------------------------------------------------------------------------

/// The rendering contract. Implementations only compose documents; field
/// extraction, derivation, and validation live in their own modules.
pub trait OutputStrategy {
    fn approach(&self) -> Approach;

    fn supports(&self, domain_type: &str) -> bool;

    fn render(&self, input: &DomainResult, options: &RenderOptions) -> Result<OutputArtifacts>;
}

/// Reject inputs a strategy does not accept.
pub(crate) fn ensure_supported(strategy: &dyn OutputStrategy, input: &DomainResult) -> Result<()> {
    if strategy.supports(input.type_name()) {
        Ok(())
    } else {
        Err(DesignDocError::UnsupportedDomain {
            approach: strategy.approach().to_string(),
            domain: input.type_name().to_string(),
        })
    }
}

/// The session inside `input`, or `UnsupportedDomain`.
pub(crate) fn require_session<'a>(
    strategy: &dyn OutputStrategy,
    input: &'a DomainResult,
) -> Result<&'a SessionRecord> {
    ensure_supported(strategy, input)?;
    input
        .as_session()
        .ok_or_else(|| DesignDocError::UnsupportedDomain {
            approach: strategy.approach().to_string(),
            domain: input.type_name().to_string(),
        })
}

pub(crate) fn supports_sessions_only(domain_type: &str) -> bool {
    domain_type == SESSION_STATE
}

pub(crate) fn supports_any(domain_type: &str) -> bool {
    domain_type == SESSION_STATE || domain_type == PROMPT_RESULT
}

/// Folder name for multi-document sets.
pub fn folder_name(title: &str) -> String {
    let slug = slugify(title);
    if slug.is_empty() {
        "untitled".to_string()
    } else {
        slug
    }
}

// ---------------------------------------------------------------------------
// Strategy
// ---------------------------------------------------------------------------

/// Closed set of the seven strategies.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Strategy {
    Chat(ChatStrategy),
    Rfc(RfcStrategy),
    Adr(AdrStrategy),
    Sdd(SddStrategy),
    SpecKit(SpecKitStrategy),
    Togaf(TogafStrategy),
    Enterprise(EnterpriseStrategy),
}

impl Strategy {
    pub fn for_approach(approach: Approach) -> Self {
        match approach {
            Approach::Chat => Strategy::Chat(ChatStrategy),
            Approach::Rfc => Strategy::Rfc(RfcStrategy),
            Approach::Adr => Strategy::Adr(AdrStrategy),
            Approach::Sdd => Strategy::Sdd(SddStrategy),
            Approach::SpecKit => Strategy::SpecKit(SpecKitStrategy),
            Approach::Togaf => Strategy::Togaf(TogafStrategy),
            Approach::Enterprise => Strategy::Enterprise(EnterpriseStrategy),
        }
    }

    fn inner(&self) -> &dyn OutputStrategy {
        match self {
            Strategy::Chat(s) => s,
            Strategy::Rfc(s) => s,
            Strategy::Adr(s) => s,
            Strategy::Sdd(s) => s,
            Strategy::SpecKit(s) => s,
            Strategy::Togaf(s) => s,
            Strategy::Enterprise(s) => s,
        }
    }
}

impl OutputStrategy for Strategy {
    fn approach(&self) -> Approach {
        self.inner().approach()
    }

    fn supports(&self, domain_type: &str) -> bool {
        self.inner().supports(domain_type)
    }

    fn render(&self, input: &DomainResult, options: &RenderOptions) -> Result<OutputArtifacts> {
        self.inner().render(input, options)
    }
}

// ---------------------------------------------------------------------------
// Dispatcher
// ---------------------------------------------------------------------------

/// Caller-owned registry that routes an input to the strategy for an approach.
#[derive(Debug, Clone)]
pub struct Dispatcher {
    strategies: Vec<Strategy>,
}

impl Default for Dispatcher {
    fn default() -> Self {
        Self::new(
            Approach::all()
                .iter()
                .map(|a| Strategy::for_approach(*a))
                .collect(),
        )
    }
}

impl Dispatcher {
    pub fn new(strategies: Vec<Strategy>) -> Self {
        Self { strategies }
    }

    pub fn approaches(&self) -> Vec<Approach> {
        self.strategies.iter().map(|s| s.approach()).collect()
    }

    pub fn strategy(&self, approach: Approach) -> Option<&Strategy> {
        self.strategies.iter().find(|s| s.approach() == approach)
    }

    /// Approaches whose strategy accepts this kind of input.
    pub fn supporting(&self, input: &DomainResult) -> Vec<Approach> {
        self.strategies
            .iter()
            .filter(|s| s.supports(input.type_name()))
            .map(|s| s.approach())
            .collect()
    }

    pub fn render(
        &self,
        approach: Approach,
        input: &DomainResult,
        options: &RenderOptions,
    ) -> Result<OutputArtifacts> {
        let strategy = self
            .strategy(approach)
            .ok_or_else(|| DesignDocError::UnknownApproach(approach.to_string()))?;
        ensure_supported(strategy, input)?;

        let mut artifacts = strategy.render(input, options)?;
        tracing::debug!(
            approach = %approach,
            domain = input.type_name(),
            documents = artifacts.document_count(),
            "rendered"
        );

        let mut requested: Vec<CrossCuttingCapability> = Vec::new();
        for cap in &options.cross_cutting {
            if !requested.contains(cap) {
                requested.push(*cap);
            }
        }
        for cap in requested {
            match input.as_session() {
                Some(session) => artifacts
                    .cross_cutting
                    .push(cross_cutting::generate(cap, session)?),
                None => tracing::debug!(
                    capability = %cap,
                    domain = input.type_name(),
                    "skipping cross-cutting capability"
                ),
            }
        }
        Ok(artifacts)
    }

    /// Parse the approach tag first, then render.
    pub fn render_named(
        &self,
        approach: &str,
        input: &DomainResult,
        options: &RenderOptions,
    ) -> Result<OutputArtifacts> {
        self.render(approach.parse()?, input, options)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
