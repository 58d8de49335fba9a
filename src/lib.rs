//! extdeploy library
//!
//! Core functionality behind the `extdeploy` binary: deploying packaged
//! editor extensions and a small calculator.

pub mod calculator;
pub mod cli;
pub mod config_file;
pub mod deploy;
pub mod error;

// Re-export main types for convenience
pub use calculator::{CalcError, Operation};
pub use config_file::{ConfigOverrides, DeployConfig};
pub use deploy::{DeployEvent, DeployPlan, DeployReport, Deployer, ExtensionIdentity};
pub use error::DeployError;
