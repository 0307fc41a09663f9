use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use hrec::apply::{self, Controllers, Report};
use hrec::config::{self, Config};
use hrec::heroku::client::HerokuClient;
use hrec::heroku::http::format_heroku_error;
use hrec::manifest::Manifest;
use hrec::resource::{AddonController, DrainController, GateRegistry, Managed};
use hrec::state::State;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::Level;
use tracing_subscriber::fmt::writer::MakeWriterExt;

/// Reconcile Heroku add-ons and log drains
#[derive(Parser, Debug)]
#[command(name = "hrec", version = hrec::VERSION, about, long_about = None)]
struct Args {
    /// State file to read and update
    #[arg(short, long, global = true)]
    state: Option<PathBuf>,

    /// Platform API endpoint
    #[arg(long, global = true)]
    api_url: Option<String>,

    /// Log level for debugging
    #[arg(long, value_enum, default_value = "off", global = true)]
    log_level: LogLevel,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Create, update, replace or delete resources to match the manifest
    Apply {
        /// Manifest describing the desired resources
        manifest: PathBuf,
    },
    /// Track resources that already exist remotely
    Import {
        manifest: PathBuf,
        /// Only import this address
        #[arg(long)]
        address: Option<String>,
    },
    /// Delete every resource in the state
    Destroy,
    /// Print the state
    Show,
    /// Save --api-url, --state and the account to the config file
    Config {
        /// Account identity used to serialize add-on creation
        #[arg(long)]
        account: Option<String>,
    },
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum LogLevel {
    Off,
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl LogLevel {
    fn to_tracing_level(self) -> Option<Level> {
        match self {
            LogLevel::Off => None,
            LogLevel::Error => Some(Level::ERROR),
            LogLevel::Warn => Some(Level::WARN),
            LogLevel::Info => Some(Level::INFO),
            LogLevel::Debug => Some(Level::DEBUG),
            LogLevel::Trace => Some(Level::TRACE),
        }
    }
}

fn setup_logging(level: LogLevel) -> Result<Option<tracing_appender::non_blocking::WorkerGuard>> {
    let Some(tracing_level) = level.to_tracing_level() else {
        return Ok(None);
    };

    let log_path = get_log_path();

    if let Some(parent) = log_path.parent() {
        let _ = std::fs::create_dir_all(parent);
    }

    let file = std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(&log_path)
        .with_context(|| format!("Failed to open log file {:?}", log_path))?;

    let (non_blocking, guard) = tracing_appender::non_blocking(file);

    tracing_subscriber::fmt()
        .with_max_level(tracing_level)
        .with_writer(non_blocking.with_max_level(tracing_level))
        .with_ansi(false)
        .with_target(true)
        .with_thread_ids(false)
        .with_file(true)
        .with_line_number(true)
        .init();

    tracing::info!("hrec started with log level: {:?}", level);
    tracing::info!("Log file: {:?}", log_path);

    Ok(Some(guard))
}

fn get_log_path() -> PathBuf {
    if let Some(config_dir) = dirs::config_dir() {
        return config_dir.join("hrec").join("hrec.log");
    }
    if let Some(home) = dirs::home_dir() {
        return home.join(".hrec").join("hrec.log");
    }
    PathBuf::from("hrec.log")
}

fn build_controllers(config: &Config, api_url: Option<&str>, gates: &GateRegistry) -> Result<Controllers> {
    let api_url = api_url
        .map(String::from)
        .unwrap_or_else(|| config.effective_api_url());
    let account = config.effective_account(&api_url);
    tracing::info!("Using API: {}, account: {}", api_url, account);

    let client = HerokuClient::new(&api_url, &config::api_key()?)?;

    Ok(Controllers {
        addons: AddonController::new(Arc::new(client.clone()), gates.gate_for(&account)),
        drains: DrainController::new(Arc::new(client)),
    })
}

fn finish(report: Report, state_path: &Path) -> Result<()> {
    for outcome in &report.outcomes {
        println!("{outcome}");
        if let Err(hrec::Error::Remote { cause, .. }) = &outcome.result {
            eprintln!("  {}", format_heroku_error(cause));
        }
    }

    report
        .state
        .save(state_path)
        .with_context(|| format!("Failed to save state to {:?}", state_path))?;

    let failed = report.failures().count();
    if failed > 0 {
        anyhow::bail!("{} of {} resources failed", failed, report.outcomes.len());
    }
    Ok(())
}

fn show(state: &State) -> Result<()> {
    for (address, stored) in &state.addons {
        let record: hrec::resource::AddonRecord = stored.to_record()?;
        println!("addon.{address}: {} ({}, app {})", record.id(), record.plan, record.app);
    }
    for (address, stored) in &state.drains {
        let record: hrec::resource::DrainRecord = stored.to_record()?;
        println!("drain.{address}: {} ({}, app {})", record.id(), record.url, record.app);
    }
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let _log_guard = setup_logging(args.log_level)?;

    let mut config = Config::load();

    if let Command::Config { account } = &args.command {
        config.apply_overrides(
            args.api_url.as_deref(),
            account.as_deref(),
            args.state.as_deref(),
        );
        return config.save();
    }

    let state_path = args.state.clone().unwrap_or_else(|| config.effective_state_path());
    let state = State::load(&state_path)?;

    let gates = GateRegistry::new();
    let controllers = || build_controllers(&config, args.api_url.as_deref(), &gates);

    let report = match &args.command {
        Command::Show => return show(&state),
        Command::Apply { manifest } => {
            let manifest = Manifest::load(manifest)?;
            apply::apply(&controllers()?, &manifest, &state).await
        }
        Command::Import { manifest, address } => {
            let manifest = Manifest::load(manifest)?;
            apply::import(&controllers()?, &manifest, &state, address.as_deref()).await
        }
        Command::Destroy => apply::destroy(&controllers()?, &state).await,
        Command::Config { .. } => return Ok(()),
    };

    finish(report, &state_path)
}
