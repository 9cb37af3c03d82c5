use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use sbm::config::{self, Config};
use sbm::docker::{self, ContainerCommand};
use sbm::{ContainerOrchestrator, PlatformHint};

#[derive(Parser, Debug)]
#[command(name = "sbm", version)]
#[command(about = "Build, pull, and run the FreeSurfer SBM container")]
struct Cli {
    /// Print the runtime command instead of executing it
    #[arg(long, global = true)]
    dry_run: bool,
    /// Config file (defaults to .sbm.yaml in the current directory)
    #[arg(long, global = true, env = "SBM_CONFIG")]
    config: Option<PathBuf>,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Build the multi-platform image and push it to the registry
    Build,
    /// Pull an image for the host's default platform
    Pull {
        /// Image reference (defaults to the configured image)
        image: Option<String>,
    },
    /// Pull an image pinned to the architecture selected by --os
    Setup {
        image: Option<String>,
        /// `mac` pulls linux/arm64, `windows` pulls linux/amd64, anything else uses the host default
        #[arg(long = "os")]
        os: Option<String>,
    },
    /// Run a script inside an ephemeral container with the dataset mounted at /data
    Run {
        /// Host script, mounted at /scripts/run_reconall.sh
        #[arg(long)]
        script: PathBuf,
        /// Host dataset directory, mounted at /data
        #[arg(long)]
        data: PathBuf,
        #[arg(long)]
        image: Option<String>,
        #[arg(long = "os")]
        os: Option<String>,
        /// Also write the container output to this file
        #[arg(long)]
        log_file: Option<PathBuf>,
    },
    /// Check that the container daemon is reachable
    Check,
}

fn main() {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();

    let (what, result) = match load_config(cli.config.as_deref()) {
        Ok(cfg) => dispatch(cli.command, cfg, cli.dry_run),
        Err(e) => ("loading the configuration", Err(e)),
    };

    // Every failing operation is fatal for the process.
    if let Err(e) = result {
        eprintln!("An error occurred while {what}: {e:#}");
        std::process::exit(1);
    }
}

fn load_config(path: Option<&std::path::Path>) -> Result<Config> {
    match path {
        Some(p) => config::load_file(p),
        None => {
            let cwd = std::env::current_dir().context("cannot determine working directory")?;
            config::load(&cwd)
        }
    }
}

/// Run the chosen subcommand. Returns a description of the operation for
/// diagnostics alongside its outcome.
fn dispatch(command: Commands, cfg: Config, dry_run: bool) -> (&'static str, Result<()>) {
    let default_hint = cfg.default_platform();
    let orch = ContainerOrchestrator::from_config(cfg);
    let image_or_default =
        |image: Option<String>| image.unwrap_or_else(|| orch.config().image.clone());
    let hint_or_default = |os: Option<String>| match os {
        Some(label) => PlatformHint::from_label(&label),
        None => default_hint,
    };

    match command {
        Commands::Build => {
            let result: Result<()> = if dry_run {
                orch.plan_build_and_publish()
                    .map(|cmd| print_plan(&orch, &cmd))
                    .map_err(Into::into)
            } else {
                orch.build_and_publish().map(drop).map_err(Into::into)
            };
            ("building the Docker image", result)
        }
        Commands::Pull { image } => {
            let image = image_or_default(image);
            let result: Result<()> = if dry_run {
                orch.plan_pull(&image, None)
                    .map(|cmd| print_plan(&orch, &cmd))
                    .map_err(Into::into)
            } else {
                orch.pull_image(&image).map(drop).map_err(Into::into)
            };
            ("pulling the Docker image", result)
        }
        Commands::Setup { image, os } => {
            let image = image_or_default(image);
            let hint = hint_or_default(os);
            let result: Result<()> = if dry_run {
                orch.plan_pull(&image, hint)
                    .map(|cmd| print_plan(&orch, &cmd))
                    .map_err(Into::into)
            } else {
                orch.prepare_platform(&image, hint).map(drop).map_err(Into::into)
            };
            ("pulling the Docker image", result)
        }
        Commands::Run {
            script,
            data,
            image,
            os,
            log_file,
        } => {
            let image = image_or_default(image);
            let hint = hint_or_default(os);
            let result: Result<()> = if dry_run {
                orch.plan_run_script(&image, &script, &data, hint)
                    .map(|cmd| print_plan(&orch, &cmd))
                    .map_err(Into::into)
            } else {
                orch.run_script_with_log(&image, &script, &data, hint, log_file.as_deref())
                    .map(drop)
                    .map_err(Into::into)
            };
            ("running the Docker container", result)
        }
        Commands::Check => {
            let program = orch.config().docker_binary.clone();
            let result: Result<()> = docker::ensure_available(&program)
                .map(|version| println!("{program} server {version}"))
                .map_err(Into::into);
            ("checking the Docker daemon", result)
        }
    }
}

fn print_plan(orch: &ContainerOrchestrator, cmd: &ContainerCommand) {
    println!("{}", cmd.command_line(&orch.config().docker_binary));
}
