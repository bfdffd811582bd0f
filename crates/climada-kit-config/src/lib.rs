//! climada-kit Config
//!
//! Serializable configuration for the workflow runner. A [`KitConfig`] is
//! built once at startup (defaults, then an optional JSON file, then CLI
//! overrides) and handed to the runner by value. Nothing in here is global.
//!
//! ```json
//! {
//!   "runner": { "interpreter": "python3", "timeout_secs": 300 },
//!   "project": { "root": ".", "reference_year": 2024 },
//!   "workflows": [{ "path": "01_basic_risk_assessment.py" }]
//! }
//! ```

mod error;
mod kit;
mod project;
mod runner;
mod workflow;

pub use error::ConfigError;
pub use kit::KitConfig;
pub use project::{ProjectSettings, ScenarioSettings};
pub use runner::{MissingPrerequisite, PrerequisiteConfig, RunnerConfig};
pub use workflow::WorkflowDef;
