use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

use anyhow::Context;
use clap::{ArgAction, Args, Parser, Subcommand, ValueEnum};
use tokio::task::JoinSet;

use grayscale_bridge_rs::acquisition::{
    AcquisitionKind, FsImageSource, Permission, PermissionGate, PermissionGrants, PermissionStatus,
    PickerSession, Presenter, SelectionOutcome,
};
use grayscale_bridge_rs::config::AppConfig;
use grayscale_bridge_rs::image_pipeline::{self, ImageReference, StandardBridge, VisionRuntime};
use grayscale_bridge_rs::logger::{self, debug, error, info};

const EXIT_FAILED: u8 = 1;
const EXIT_SETUP: u8 = 2;

/// Convert images to grayscale in place.
#[derive(Parser)]
#[command(name = "grayscale_bridge_rs", version, about)]
struct Cli {
    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,

    /// Configuration file (defaults to the nearest .grayscale-bridge.toml)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(flatten)]
    output: OutputArgs,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Process one or more locators (paths or file:// URIs)
    Process {
        #[arg(required = true)]
        locators: Vec<String>,
    },
    /// Run a picker session against a file on disk
    Pick {
        path: PathBuf,
        /// Ask for a camera capture instead of a library pick
        #[arg(long)]
        camera: bool,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum FormatArg {
    Jpeg,
    Png,
}

#[derive(Args)]
struct OutputArgs {
    /// Output encoding
    #[arg(long, value_enum, global = true)]
    format: Option<FormatArg>,

    /// JPEG quality
    #[arg(long, value_parser = clap::value_parser!(u8).range(1..=100), global = true)]
    quality: Option<u8>,

    /// Write <stem><SUFFIX>.<ext> next to the input instead of overwriting it
    #[arg(long, global = true)]
    suffix: Option<String>,

    /// Write directly to the target instead of through a temporary file
    #[arg(long, global = true)]
    no_atomic: bool,

    /// Serialize calls on the same path
    #[arg(long, overrides_with = "no_serialize", global = true)]
    serialize: bool,

    #[arg(long, overrides_with = "serialize", global = true)]
    no_serialize: bool,
}

impl OutputArgs {
    fn apply(&self, config: &mut AppConfig) {
        if let Some(format) = self.format {
            config.output.format = Some(
                match format {
                    FormatArg::Jpeg => "jpeg",
                    FormatArg::Png => "png",
                }
                .to_string(),
            );
        }
        if self.quality.is_some() {
            config.output.quality = self.quality;
        }
        if self.suffix.is_some() {
            config.output.suffix = self.suffix.clone();
        }
        if self.no_atomic {
            config.output.atomic_write = Some(false);
        }
        if self.serialize {
            config.concurrency.serialize_per_path = Some(true);
        } else if self.no_serialize {
            config.concurrency.serialize_per_path = Some(false);
        }
    }
}

/// Desktop hosts have no runtime permission prompts.
struct HostPermissionGate;

impl PermissionGate for HostPermissionGate {
    fn request(&self, permissions: &[Permission]) -> Result<PermissionGrants, String> {
        debug!(?permissions, "Granting host permissions");
        Ok(permissions
            .iter()
            .map(|p| (*p, PermissionStatus::Granted))
            .collect())
    }
}

struct StdoutPresenter;

impl Presenter for StdoutPresenter {
    fn display(&self, reference: &ImageReference) {
        println!("{}", reference);
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    logger::init(logger::level_for_verbosity(cli.verbose));

    match run(cli).await {
        Ok(code) => code,
        Err(e) => {
            error!("{:#}", e);
            eprintln!("error: {e:#}");
            ExitCode::from(EXIT_SETUP)
        }
    }
}

async fn run(cli: Cli) -> anyhow::Result<ExitCode> {
    let mut config = AppConfig::load(cli.config.as_deref())?;
    cli.output.apply(&mut config);
    let bridge_config = config.bridge_config()?;

    image_pipeline::initialize().context("failed to initialize vision runtime")?;
    info!(format = bridge_config.format.name(), target = ?bridge_config.target, "Bridge ready");
    let bridge = Arc::new(StandardBridge::new(VisionRuntime::global(), bridge_config));

    let failed = match cli.command {
        Commands::Process { locators } => process_all(&bridge, locators).await,
        Commands::Pick { path, camera } => {
            let session = PickerSession::new(
                FsImageSource::new(path),
                HostPermissionGate,
                StdoutPresenter,
                bridge,
                config.permission_requirements(),
            );
            session.prepare();
            let kind = if camera { AcquisitionKind::Camera } else { AcquisitionKind::Library };
            match session.select(kind).await {
                SelectionOutcome::Displayed(_) | SelectionOutcome::Cancelled => 0,
                SelectionOutcome::PermissionDenied(missing) => {
                    eprintln!("error[PERMISSION_DENIED]: missing {:?}", missing);
                    1
                }
                SelectionOutcome::AcquisitionFailed { code, message } => {
                    eprintln!("error[{}]: {}", code, message);
                    1
                }
                SelectionOutcome::ProcessingFailed(e) => {
                    eprintln!("error[{}]: {}", e.code(), e);
                    1
                }
            }
        }
    };

    Ok(if failed == 0 { ExitCode::SUCCESS } else { ExitCode::from(EXIT_FAILED) })
}

/// Processes every locator concurrently and prints results in input order.
async fn process_all(bridge: &Arc<StandardBridge>, locators: Vec<String>) -> usize {
    let mut tasks = JoinSet::new();
    for (index, locator) in locators.iter().enumerate() {
        let bridge = Arc::clone(bridge);
        let locator = locator.clone();
        tasks.spawn(async move { (index, bridge.process(locator).await) });
    }

    let mut results: Vec<Option<_>> = (0..locators.len()).map(|_| None).collect();
    while let Some(joined) = tasks.join_next().await {
        match joined {
            Ok((index, result)) => results[index] = Some(result),
            Err(e) => error!("Processing task failed: {}", e),
        }
    }

    let mut failed = 0;
    for (locator, result) in locators.iter().zip(results) {
        match result {
            Some(Ok(processed)) => println!("{}", processed),
            Some(Err(e)) => {
                failed += 1;
                eprintln!("error[{}]: {}", e.code(), e);
            }
            None => {
                failed += 1;
                eprintln!("error[WORKER_FAILED]: {}", locator);
            }
        }
    }
    failed
}
