//! Lumen CLI
//!
//! Play slide quizzes in the terminal and manage the persisted theme.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use lumen_core::{JsonFileStore, PreferenceStore};
use lumen_theme::{
    resolve_initial_scheme_with_source, AmbientPreference, ColorScheme, SystemAmbient,
    ThemeProvider, TransitionOutcome, TransitionPhase,
};
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{info, warn};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

mod config;
mod document;
mod play;

use config::LumenConfig;
use document::SlideDocument;

#[derive(Parser)]
#[command(name = "lumen")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Interactive slide quizzes and theme preferences", long_about = None)]
struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Path to lumen.toml (defaults to ./lumen.toml when present)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Play a slide's quiz, answering on stdin
    Play {
        /// Slide document (TOML)
        path: PathBuf,

        /// Hide explanations after each answer
        #[arg(long)]
        no_explanations: bool,
    },

    /// Validate a slide document without playing it
    Check {
        /// Slide document (TOML)
        path: PathBuf,
    },

    /// Show or change the persisted color scheme
    Theme {
        #[command(subcommand)]
        action: Option<ThemeAction>,
    },

    /// Show version and configuration paths
    Info,
}

#[derive(Subcommand)]
enum ThemeAction {
    /// Print the current scheme
    Show,
    /// Switch to the opposite scheme
    Toggle,
    /// Switch to the given scheme
    Set {
        /// `light` or `dark`
        scheme: ColorScheme,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("info")
    };

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(io::stderr))
        .with(filter)
        .init();

    let cwd = std::env::current_dir().context("Failed to read the working directory")?;
    let (config, config_path) = LumenConfig::load(cli.config.as_deref(), &cwd)?;
    if let Some(path) = &config_path {
        tracing::debug!("Loaded config from {}", path.display());
    }

    match cli.command {
        Commands::Play {
            path,
            no_explanations,
        } => cmd_play(
            &path,
            config.play.show_explanations && !no_explanations,
        ),

        Commands::Check { path } => cmd_check(&path),

        Commands::Theme { action } => {
            cmd_theme(&config, action.unwrap_or(ThemeAction::Show))
        }

        Commands::Info => cmd_info(&config, config_path.as_deref()),
    }
}

fn cmd_play(path: &Path, show_explanations: bool) -> Result<()> {
    let doc = SlideDocument::load(path)?;

    let stdin = io::stdin();
    let mut stdout = io::stdout();
    let report = play::play(&doc, stdin.lock(), &mut stdout, show_explanations)?;

    if !report.completed {
        warn!("Quiz stopped before the last question");
    }

    println!();
    println!("Responses:");
    println!("{}", serde_json::to_string_pretty(&report.registry)?);
    Ok(())
}

fn cmd_check(path: &Path) -> Result<()> {
    let doc = SlideDocument::load(path)?;
    doc.validate()?;

    info!("Checking slide: {}", doc.title());
    let questions = doc.quiz.as_ref().map_or(0, |quiz| quiz.questions.len());
    let graded = doc
        .interactions
        .iter()
        .filter(|descriptor| descriptor.kind.is_graded())
        .count();

    info!(
        "{} interactions ({} graded), {} quiz questions",
        doc.interactions.len(),
        graded,
        questions
    );
    info!("Slide is valid!");
    Ok(())
}

fn open_store(config: &LumenConfig) -> Result<Arc<JsonFileStore>> {
    let path = config.store_path()?;
    let store = JsonFileStore::open(&path)
        .with_context(|| format!("Failed to open preferences at {}", path.display()))?;
    Ok(Arc::new(store))
}

/// Startup scheme and the source it was resolved from, e.g. `dark (persisted)`
fn theme_summary(store: &dyn PreferenceStore, ambient: &dyn AmbientPreference) -> String {
    let (scheme, source) = resolve_initial_scheme_with_source(store, ambient);
    format!("{} ({})", scheme, source)
}

fn cmd_theme(config: &LumenConfig, action: ThemeAction) -> Result<()> {
    let store = open_store(config)?;

    let target = match action {
        ThemeAction::Show => {
            println!("{}", theme_summary(store.as_ref(), &SystemAmbient));
            return Ok(());
        }
        ThemeAction::Toggle => None,
        ThemeAction::Set { scheme } => Some(scheme),
    };

    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_time()
        .build()
        .context("Failed to start the async runtime")?;

    let provider = ThemeProvider::new(store.clone(), &SystemAmbient, config.theme.timings);
    let theme = provider.context();
    let _subscription = theme.subscribe(|state| {
        tracing::debug!(
            dark = state.is_dark_mode,
            transitioning = state.is_transitioning,
            overlay = state.overlay_active,
            "theme state changed"
        );
    })?;

    tracing::debug!(
        "transition takes {:?} ({:?} before the flip)",
        config.theme.timings.total(),
        config.theme.timings.delay(TransitionPhase::OverlayOn)
            + config.theme.timings.delay(TransitionPhase::Flip)
    );

    let outcome = runtime.block_on(async {
        match target {
            Some(scheme) => theme.set_scheme(scheme).await,
            None => theme.toggle().await,
        }
    })?;

    match outcome {
        TransitionOutcome::Completed(scheme) => {
            info!("Theme set to {} ({})", scheme, store.path().display());
        }
        TransitionOutcome::Unchanged => info!("Theme is already {}", provider.state().scheme()),
        TransitionOutcome::Busy => warn!("A theme transition is already running"),
    }
    Ok(())
}

fn cmd_info(config: &LumenConfig, config_path: Option<&Path>) -> Result<()> {
    println!("Lumen");
    println!("=====");
    println!();
    println!("Version: {}", env!("CARGO_PKG_VERSION"));
    println!();
    match config_path {
        Some(path) => println!("Config: {}", path.display()),
        None => println!("Config: defaults (no {} found)", config::CONFIG_FILE),
    }
    match config.store_path() {
        Ok(path) => println!("Preferences: {}", path.display()),
        Err(e) => println!("Preferences: unavailable ({})", e),
    }
    println!();
    println!("Theme transition:");
    let timings = config.theme.timings;
    for phase in TransitionPhase::SEQUENCE {
        println!("  - {:?}: {:?}", phase, timings.delay(phase));
    }
    println!();
    println!("Settings:");
    println!("{}", config.to_toml()?);
    Ok(())
}
