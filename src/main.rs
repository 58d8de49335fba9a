//! extdeploy - Main entry point

use std::path::Path;
use std::process::ExitCode;
use tracing::{debug, error, info};
use tracing_subscriber::EnvFilter;

use extdeploy::cli::{Cli, Commands};
use extdeploy::{ConfigOverrides, DeployConfig, DeployPlan, Deployer, Operation};

/// Initialize the tracing subscriber on stderr
///
/// Stdout is reserved for progress lines and calculator results.
fn init_logger(verbose: bool) {
    let default_level = if verbose { "info" } else { "warn" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

/// Main application entry point
fn main() -> ExitCode {
    let cli = Cli::parse_args();
    init_logger(cli.verbose);
    debug!("CLI arguments parsed");

    let overrides = cli.command.deploy_overrides();
    match cli.command {
        Commands::Deploy { config, .. } => {
            let overrides = overrides.unwrap_or_default();
            run_deploy(config.as_deref(), overrides, cli.dry_run)
        }
        Commands::Validate { config } => run_validate(&config),
        Commands::Calc { operation, x, y } => run_calc(operation, x, y),
    }
}

/// Resolve the deploy plan and run it, or print it in dry-run mode
fn run_deploy(config_path: Option<&Path>, overrides: ConfigOverrides, dry_run: bool) -> ExitCode {
    let base = match config_path {
        Some(path) => {
            info!("Loading configuration from: {:?}", path);
            match DeployConfig::load_from_file(path) {
                Ok(config) => config,
                Err(e) => {
                    error!("Failed to load configuration file: {:#}", e);
                    eprintln!("Error: {:#}", e);
                    return ExitCode::FAILURE;
                }
            }
        }
        None => DeployConfig::default(),
    };
    let config = base.merge(overrides);

    let plan = match DeployPlan::resolve(&config) {
        Ok(plan) => plan,
        Err(e) => {
            error!("Failed to resolve deploy plan: {}", e);
            eprintln!("Error: {}", e);
            return ExitCode::FAILURE;
        }
    };
    let deployer = Deployer::new(plan);

    if dry_run {
        return print_dry_run(&deployer);
    }

    match deployer.run_with(|event| println!("{}", event)) {
        Ok(report) => {
            debug!("Deploy report: {:?}", report);
            ExitCode::SUCCESS
        }
        Err(e) => {
            error!("Deployment failed: {}", e);
            eprintln!("Error: {}", e);
            ExitCode::FAILURE
        }
    }
}

fn print_dry_run(deployer: &Deployer) -> ExitCode {
    let plan = deployer.plan();
    println!(
        "[dry-run] Would deploy {} to {}",
        plan.archive.display(),
        plan.target_path.display()
    );
    match deployer.preview_removals() {
        Ok(paths) => {
            for path in paths {
                println!("[dry-run] Would remove old extension: {}", path.display());
            }
        }
        Err(e) => {
            eprintln!("Error: {}", e);
            return ExitCode::FAILURE;
        }
    }
    println!(
        "[dry-run] Would extract into {} and move '{}' to {}",
        plan.scratch_dir.display(),
        plan.subfolder,
        plan.target_path.display()
    );
    ExitCode::SUCCESS
}

fn run_validate(path: &Path) -> ExitCode {
    info!("Validating configuration file: {:?}", path);
    match DeployConfig::load_from_file(path).and_then(|config| config.validate()) {
        Ok(()) => {
            println!("✓ Configuration file is valid: {}", path.display());
            ExitCode::SUCCESS
        }
        Err(e) => {
            error!("Configuration validation failed: {:#}", e);
            eprintln!("✗ Configuration validation failed: {:#}", e);
            ExitCode::FAILURE
        }
    }
}

fn run_calc(operation: Operation, x: f64, y: f64) -> ExitCode {
    match operation.apply(x, y) {
        Ok(result) => {
            println!("{}", result);
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("Error: {}", e);
            ExitCode::FAILURE
        }
    }
}
