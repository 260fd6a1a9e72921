use std::path::PathBuf;

use clap::Parser;
use surprise_core::RevealConfig;
use tracing_subscriber::EnvFilter;

use crate::error::{DemoError, Result};
use crate::simulate::{Scenario, run_scenario};

#[derive(Debug, Parser)]
#[command(
    name = "surprise-demo",
    about = "Play the reveal timeline and hold trigger over an in-memory scene",
    version
)]
pub struct Cli {
    /// TOML file with hold threshold, trigger key, replacement text, and
    /// required nodes.
    #[arg(long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Virtual frame length in milliseconds.
    #[arg(long, default_value_t = 16)]
    pub frame_ms: u64,

    /// When the trigger key goes down, in ms from start.
    #[arg(long, default_value_t = 2500)]
    pub hold_at_ms: u64,

    /// How long the trigger key stays down.
    #[arg(long, default_value_t = 3200)]
    pub hold_for_ms: u64,

    /// Number of batches the scene nodes arrive in, 100 ms apart.
    #[arg(long, default_value_t = 3)]
    pub batches: usize,

    /// Emit logs as JSON lines.
    #[arg(long)]
    pub json: bool,
}

impl Cli {
    /// Validate flags and resolve them into a scenario.
    pub fn scenario(&self) -> Result<Scenario> {
        if self.frame_ms == 0 {
            return Err(DemoError::invalid("--frame-ms must be at least 1"));
        }
        if !(1..=surprise_core::NodeId::ALL.len()).contains(&self.batches) {
            return Err(DemoError::invalid(format!(
                "--batches must be between 1 and {}",
                surprise_core::NodeId::ALL.len()
            )));
        }
        let config = match &self.config {
            Some(path) => {
                RevealConfig::from_toml_file(path).map_err(|source| DemoError::Config {
                    path: path.clone(),
                    source,
                })?
            }
            None => RevealConfig::default(),
        };
        Ok(Scenario {
            config,
            frame_ms: self.frame_ms,
            hold_at_ms: self.hold_at_ms,
            hold_for_ms: self.hold_for_ms,
            batches: self.batches,
        })
    }
}

/// Install the global subscriber. `RUST_LOG` overrides the `info` default.
pub fn init_logging(json: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(true);
    // A subscriber may already be installed (tests); keep the existing one.
    let _ = if json {
        builder.json().try_init()
    } else {
        builder.try_init()
    };
}

pub fn run_from_env() -> Result<()> {
    let cli = Cli::parse();
    run(cli)
}

pub fn run(cli: Cli) -> Result<()> {
    init_logging(cli.json);
    let scenario = cli.scenario()?;
    let report = run_scenario(&scenario)?;
    print!("{report}");
    Ok(())
}
