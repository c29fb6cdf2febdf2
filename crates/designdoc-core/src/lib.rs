pub mod config;
pub mod constitution;
pub mod cross_cutting;
pub mod domain;
pub mod error;
pub mod extract;
pub mod output;
pub mod plan;
pub mod session;
pub mod spec;
pub mod strategy;
pub mod tasks;
pub mod text;
pub mod types;
pub mod validate;

pub use config::RenderOptions;
pub use domain::{DomainResult, PromptResult, Section};
pub use error::{DesignDocError, Result};
pub use output::{CrossCuttingArtifact, OutputArtifacts, OutputDocument};
pub use session::SessionRecord;
pub use strategy::{Dispatcher, OutputStrategy, Strategy};
pub use types::{Approach, CrossCuttingCapability};
