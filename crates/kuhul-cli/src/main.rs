//! # Kuhul CLI
//!
//! Drives the kuhul event engine from the command line. Every invocation
//! loads an explicit base state, records the command it builds, applies it,
//! snapshots the result and renders the state as SVG.
//!
//! ```text
//! kuhul --state base.json create card --text Hello --ts-ms 1000
//! kuhul --state base.json --resume theme dark --ts-ms 2000
//! kuhul --state base.json replay
//! ```

mod render;
mod session;
mod settings;
mod shell;

use anyhow::Result;
use clap::{Parser, Subcommand, ValueEnum};
use kuhul_core::{ComponentType, Theme};
use std::path::PathBuf;
use tracing::info;
use tracing_subscriber::EnvFilter;

use crate::session::Session;
use crate::settings::Settings;

#[derive(Parser)]
#[command(name = "kuhul")]
#[command(about = "Kuhul event engine: CLI to SVG with append-only events and replay", long_about = None)]
struct Cli {
    /// Session id (names the log and SVG files)
    #[arg(long)]
    session: Option<String>,

    /// Output directory
    #[arg(long)]
    out: Option<PathBuf>,

    /// Path to the explicit base state JSON
    #[arg(long)]
    state: PathBuf,

    /// Event log path. Default: <out>/<session>.events.jsonl
    #[arg(long)]
    events: Option<PathBuf>,

    /// Suppress event printing
    #[arg(long)]
    quiet: bool,

    /// RON settings file
    #[arg(long)]
    config: Option<PathBuf>,

    /// Fold the existing event log onto the base state first
    #[arg(long)]
    resume: bool,

    /// Log at debug level
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create a UI component
    Create {
        component: ComponentArg,

        /// Optional label/text
        #[arg(long)]
        text: Option<String>,

        /// Explicit timestamp (ms)
        #[arg(long)]
        ts_ms: u64,
    },

    /// Apply a theme
    Theme {
        name: ThemeArg,

        /// Explicit timestamp (ms)
        #[arg(long)]
        ts_ms: u64,
    },

    /// Export the current state to SVG
    ExportSvg {
        /// Output SVG path. Default: <out>/<session>.svg
        #[arg(long)]
        file: Option<PathBuf>,

        /// Explicit timestamp (ms)
        #[arg(long)]
        ts_ms: u64,
    },

    /// Replay an existing event log and export SVG
    Replay {
        /// Event log path. Default: the session event log
        #[arg(long)]
        file: Option<PathBuf>,

        /// Output SVG path. Default: <out>/<session>.replay.svg
        #[arg(long)]
        svg: Option<PathBuf>,
    },

    /// Submit a raw intent to the meta-shell
    Intent {
        /// Raw intent string to normalize
        intent: String,

        /// Explicit subshell hint (e.g. bash, dom, sql)
        #[arg(long)]
        shell: Option<String>,

        /// Explicit timestamp (ms)
        #[arg(long)]
        ts_ms: u64,
    },

    /// Summarize an event log
    Audit {
        /// Event log path. Default: the session event log
        #[arg(long)]
        file: Option<PathBuf>,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum ComponentArg {
    Button,
    Card,
    ChatBubble,
}

impl From<ComponentArg> for ComponentType {
    fn from(arg: ComponentArg) -> Self {
        match arg {
            ComponentArg::Button => ComponentType::Button,
            ComponentArg::Card => ComponentType::Card,
            ComponentArg::ChatBubble => ComponentType::ChatBubble,
        }
    }
}

#[derive(Clone, Copy, ValueEnum)]
enum ThemeArg {
    Dark,
    Light,
}

impl From<ThemeArg> for Theme {
    fn from(arg: ThemeArg) -> Self {
        match arg {
            ThemeArg::Dark => Theme::Dark,
            ThemeArg::Light => Theme::Light,
        }
    }
}

impl Cli {
    /// File settings (if any) with command-line flags layered on top
    fn settings(&self) -> Result<Settings> {
        let mut settings = match &self.config {
            Some(path) => Settings::load(path)?,
            None => Settings::default(),
        };
        if let Some(session) = &self.session {
            settings.session = session.clone();
        }
        if let Some(out) = &self.out {
            settings.out_dir = out.clone();
        }
        settings.quiet |= self.quiet;
        settings.resume |= self.resume;
        Ok(settings)
    }
}

fn init_tracing(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(true)
        .init();
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let settings = cli.settings()?;
    let events_path = cli.events.clone().unwrap_or_else(|| settings.events_path());
    info!(
        session = %settings.session,
        out_dir = %settings.out_dir.display(),
        events = %events_path.display(),
        sync = ?settings.sync,
        "configuration loaded"
    );

    match cli.command {
        Commands::Create {
            component,
            text,
            ts_ms,
        } => {
            let base = session::load_state(&cli.state)?;
            let mut session = Session::open(settings, &events_path, base)?;
            session.create(component.into(), text.as_deref(), ts_ms)?;
        }
        Commands::Theme { name, ts_ms } => {
            let base = session::load_state(&cli.state)?;
            let mut session = Session::open(settings, &events_path, base)?;
            session.theme(name.into(), ts_ms)?;
        }
        Commands::ExportSvg { file, ts_ms } => {
            let base = session::load_state(&cli.state)?;
            let mut session = Session::open(settings, &events_path, base)?;
            session.export_svg(file.as_deref(), ts_ms)?;
        }
        Commands::Intent {
            intent,
            shell,
            ts_ms,
        } => {
            let base = session::load_state(&cli.state)?;
            let mut session = Session::open(settings, &events_path, base)?;
            session.intent(&intent, shell.as_deref(), ts_ms)?;
        }
        Commands::Replay { file, svg } => {
            let base = session::load_state(&cli.state)?;
            let log = file.unwrap_or(events_path);
            let target = svg.unwrap_or_else(|| settings.replay_svg_path());
            session::replay_to_svg(&base, &log, &target)?;
            if !settings.quiet {
                println!("Replayed SVG written: {}", target.display());
            }
        }
        Commands::Audit { file } => {
            let log = file.unwrap_or(events_path);
            let report = session::audit(&log)?;
            print!("{report}");
        }
    }

    Ok(())
}
