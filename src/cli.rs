use clap::{Parser, Subcommand};
use std::path::PathBuf;

use crate::calculator::Operation;
use crate::config_file::ConfigOverrides;

/// extdeploy - install packaged editor extensions
#[derive(Parser)]
#[command(name = "extdeploy")]
#[command(about = "Deploy packaged editor extensions into an extensions directory")]
#[command(version)]
pub struct Cli {
    /// Dry-run mode: show what would be removed and installed without
    /// making changes.
    #[arg(long, global = true)]
    pub dry_run: bool,

    /// Log progress details to stderr (RUST_LOG overrides)
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Replace installed versions of an extension with the archive's payload
    Deploy {
        /// JSON configuration file; flags below override its values
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Directory holding installed extensions
        #[arg(short, long)]
        extensions_dir: Option<PathBuf>,

        /// Zip archive (.vsix) to deploy
        #[arg(short, long)]
        archive: Option<PathBuf>,

        /// Installed directory name (default: <publisher>.<name>-<version>
        /// from the archive manifest)
        #[arg(short, long)]
        target_name: Option<String>,

        /// Name stem of previously installed versions to remove
        #[arg(short, long)]
        prefix: Option<String>,

        /// Payload folder inside the archive
        #[arg(long)]
        subfolder: Option<String>,

        /// Scratch directory name inside the extensions directory
        #[arg(long)]
        scratch_name: Option<String>,
    },
    /// Validate a deploy configuration file
    Validate {
        /// Path to configuration file to validate
        config: PathBuf,
    },
    /// Simple calculator
    Calc {
        /// Operation to perform
        #[arg(value_enum)]
        operation: Operation,
        /// First number
        #[arg(allow_negative_numbers = true)]
        x: f64,
        /// Second number
        #[arg(allow_negative_numbers = true)]
        y: f64,
    },
}

impl Cli {
    /// Parse command line arguments
    pub fn parse_args() -> Self {
        Self::parse()
    }
}

impl Commands {
    /// Command line values for `deploy`, if this is a deploy command
    pub fn deploy_overrides(&self) -> Option<ConfigOverrides> {
        match self {
            Self::Deploy {
                extensions_dir,
                archive,
                target_name,
                prefix,
                subfolder,
                scratch_name,
                ..
            } => Some(ConfigOverrides {
                extensions_dir: extensions_dir.clone(),
                archive: archive.clone(),
                target_name: target_name.clone(),
                prefix: prefix.clone(),
                subfolder: subfolder.clone(),
                scratch_name: scratch_name.clone(),
            }),
            _ => None,
        }
    }
}
