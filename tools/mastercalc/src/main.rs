//! MasterCalc - engineering calculators for electricians and I&C technicians
//!
//! Every calculator is a subcommand; results are appended to the persistent
//! history. `mastercalc shell` keeps one session open with screen navigation.

mod calc;
mod commands;
mod context;
mod output;
mod shell;

use std::path::PathBuf;

use anyhow::{bail, Result};
use clap::{Parser, Subcommand};
use common::logging::{self, LogConfig};
use common::{AppConfig, StorageBackend};
use mastercalc_calc::Screen;
use tracing::debug;

use crate::calc::CalcCommand;
use crate::commands::{
    DraftCommand, FavoritesCommand, HistoryCommand, TemplatesCommand, ThemeCommand,
};
use crate::context::AppContext;
use crate::output::Output;

#[derive(Debug, Parser)]
#[command(name = "mastercalc")]
#[command(about = "MasterCalc PRO - engineering calculators")]
#[command(long_about = "MasterCalc PRO - engineering calculators

Calculators:
  ohm, power, divider, elec-convert          Electrical
  pressure, temperature, flow, level         Instrumentation
  voltage-drop, cable-section, cable-current Cabling
  lighting, motor, heat, length, volume      Building services
  breaker, resistor, ups, grounding, busbar  Tools
  convert                                    Any unit conversion

Data:
  history, favorites, templates, draft, theme, stats, storage

Examples:
  mastercalc ohm --solve voltage -i 5 -r 44
  mastercalc voltage-drop -i 10 -l 50 -s 2,5
  mastercalc temperature 100 c f
  mastercalc resistor brown black red gold
  mastercalc favorites toggle cable-section
  mastercalc shell")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Configuration file (toml, yaml or json)
    #[arg(short = 'c', long, global = true)]
    config: Option<PathBuf>,

    /// SQLite database file
    #[arg(long = "db-path", global = true)]
    db_path: Option<PathBuf>,

    /// Keep everything in memory for this run
    #[arg(long, global = true)]
    memory: bool,

    /// Print results as JSON
    #[arg(long, global = true)]
    json: bool,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Disable colored output
    #[arg(long, global = true)]
    no_color: bool,
}

#[derive(Debug, Clone, Subcommand)]
pub enum Commands {
    #[command(flatten)]
    Calc(CalcCommand),

    /// Calculation history
    #[command(subcommand)]
    History(HistoryCommand),

    /// Favorite calculators
    #[command(subcommand)]
    Favorites(FavoritesCommand),

    /// Saved calculation templates
    #[command(subcommand)]
    Templates(TemplatesCommand),

    /// Notes draft
    #[command(subcommand)]
    Draft(DraftCommand),

    /// Color theme preference
    #[command(subcommand)]
    Theme(ThemeCommand),

    /// Usage statistics
    Stats,

    /// Check every stored value, fail on corruption
    Storage,

    /// Print the effective configuration
    Config,

    /// Main menu with all calculators
    #[command(alias = "esc")]
    Menu,

    /// Switch to a screen by id (elec, kip, cable, tools, ...)
    Open { screen: String },

    /// Interactive session
    Shell,
}

impl Cli {
    /// Configuration after CLI overrides
    fn app_config(&self) -> Result<AppConfig> {
        let mut config = AppConfig::load(self.config.as_deref())?;
        if self.memory {
            config.storage.backend = StorageBackend::Memory;
        }
        if let Some(path) = &self.db_path {
            config.storage.db_path = path.clone();
        }
        config.validate()?;
        Ok(config)
    }

    fn log_config(&self, config: &AppConfig) -> LogConfig {
        LogConfig {
            level: if self.verbose {
                "debug".to_string()
            } else {
                config.log.level.clone()
            },
            log_dir: config.log.dir.clone(),
            enable_json: config.log.json,
            ansi: !self.no_color,
            ..Default::default()
        }
    }
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    if cli.no_color {
        colored::control::set_override(false);
    }

    let output = Output::new(cli.json);
    if let Err(e) = run(cli, output).await {
        let code = output.error(&e);
        std::process::exit(code);
    }
}

async fn run(cli: Cli, output: Output) -> Result<()> {
    let config = cli.app_config()?;
    logging::init_with_config(cli.log_config(&config))?;

    let mut ctx = AppContext::open(config, output).await?;
    let stats = ctx.store.record_launch().await?;
    debug!("Launch #{}", stats.launch_count);

    match cli.command {
        Some(Commands::Shell) => shell::run(&mut ctx).await,
        Some(command) => dispatch(&mut ctx, command).await,
        None => commands::menu(&mut ctx).await,
    }
}

/// Run one command against an open context
pub async fn dispatch(ctx: &mut AppContext, command: Commands) -> Result<()> {
    match command {
        Commands::Calc(cmd) => cmd.run(ctx).await,
        Commands::History(cmd) => commands::history(ctx, cmd).await,
        Commands::Favorites(cmd) => commands::favorites(ctx, cmd).await,
        Commands::Templates(cmd) => commands::templates(ctx, cmd).await,
        Commands::Draft(cmd) => commands::draft(ctx, cmd).await,
        Commands::Theme(cmd) => commands::theme(ctx, cmd).await,
        Commands::Stats => commands::stats(ctx).await,
        Commands::Storage => commands::storage(ctx).await,
        Commands::Config => commands::config(ctx),
        Commands::Menu => commands::menu(ctx).await,
        Commands::Open { screen } => {
            let screen = screen.parse::<Screen>()?;
            ctx.state.open(screen);
            ctx.output.heading(&ctx.state.title());
            Ok(())
        },
        Commands::Shell => bail!("Интерактивный режим уже запущен"),
    }
}
