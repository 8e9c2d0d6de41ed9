//! # Customizer CLI
//!
//! Runs design scripts against a software-rendered session, writes exported
//! job sheets to disk and lists saved designs.
//!
//! ## Usage
//!
//! ```bash
//! customizer run order.script --out-dir out/
//! customizer --store designs.json gallery
//! ```
//!
//! ## Architecture
//!
//! - `CliArgs` - Command-line arguments parsed with clap
//! - `CliSettings` - Resolved configuration, store path and output directory
//! - [`script`] - Line-oriented script parsing into core commands
//! - [`run`] - Drives a [`CommandRunner`] over a script

#![forbid(unsafe_code)]
#![deny(missing_docs)]
#![deny(clippy::all)]
#![deny(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod script;

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::Context;
use clap::{Parser, Subcommand};
use customizer_core::{
    CommandOutcome, CommandRunner, CustomizerConfig, DesignRecord, DesignStore, FileDesignStore,
    Notification, NotificationVariant, Notifier,
};
use customizer_renderer::{image::decode_dimensions, software_session, PdfJobSheetGenerator};

pub use script::{Script, ScriptLine};

/// Command-line arguments for the customizer.
#[derive(Debug, Clone, Parser)]
#[command(name = "customizer")]
#[command(about = "Dual-sided product customizer: design scripts, job sheets and saved designs")]
#[command(version)]
pub struct CliArgs {
    /// JSON session configuration file
    #[arg(long, env = "CUSTOMIZER_CONFIG")]
    pub config: Option<PathBuf>,

    /// Design store file
    #[arg(long, env = "CUSTOMIZER_STORE", default_value = "designs.json")]
    pub store: PathBuf,

    /// Directory exported job sheets are written to
    #[arg(long, env = "CUSTOMIZER_OUT_DIR", default_value = ".")]
    pub out_dir: PathBuf,

    /// Skip loading system fonts (text objects are then not drawn)
    #[arg(long)]
    pub no_fonts: bool,

    /// What to do
    #[command(subcommand)]
    pub command: CliCommand,
}

/// Subcommands.
#[derive(Debug, Clone, PartialEq, Eq, Subcommand)]
pub enum CliCommand {
    /// Execute a design script
    Run {
        /// Script file
        script: PathBuf,
    },
    /// List saved designs
    Gallery,
}

/// Resolved CLI configuration.
#[derive(Debug, Clone)]
pub struct CliSettings {
    /// Session configuration.
    pub config: CustomizerConfig,
    /// Design store file.
    pub store: PathBuf,
    /// Output directory for job sheets.
    pub out_dir: PathBuf,
    /// Whether to load system fonts for text rendering.
    pub system_fonts: bool,
    /// What to do.
    pub command: CliCommand,
}

impl TryFrom<CliArgs> for CliSettings {
    type Error = anyhow::Error;

    fn try_from(args: CliArgs) -> anyhow::Result<Self> {
        let config = match &args.config {
            Some(path) => CustomizerConfig::from_json_file(path)
                .with_context(|| format!("loading config {}", path.display()))?,
            None => CustomizerConfig::default(),
        };
        Ok(Self {
            config,
            store: args.store,
            out_dir: args.out_dir,
            system_fonts: !args.no_fonts,
            command: args.command,
        })
    }
}

/// Prints notifications to standard error.
#[derive(Debug, Clone, Copy, Default)]
pub struct ConsoleNotifier;

impl Notifier for ConsoleNotifier {
    fn notify(&self, notification: Notification) {
        let marker = match notification.variant {
            NotificationVariant::Default => "ok",
            NotificationVariant::Destructive => "error",
        };
        eprintln!(
            "[{marker}] {}: {}",
            notification.title, notification.description
        );
    }
}

/// What a script run did.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ScriptReport {
    /// Commands that completed.
    pub executed: usize,
    /// Commands that failed.
    pub failed: usize,
    /// Job sheets written.
    pub exported: Vec<PathBuf>,
    /// Designs saved.
    pub saved: usize,
}

/// Run the selected subcommand.
///
/// # Errors
///
/// Returns an error if the script cannot be parsed, the store cannot be read
/// or output cannot be written.
pub async fn run(settings: &CliSettings) -> anyhow::Result<()> {
    let store = Arc::new(FileDesignStore::new(&settings.store));
    match &settings.command {
        CliCommand::Run { script } => {
            let parsed = Script::from_file(script)
                .with_context(|| format!("parsing {}", script.display()))?;
            let session = software_session(settings.config.clone(), settings.system_fonts);
            let mut runner = CommandRunner::new(
                session,
                Arc::new(PdfJobSheetGenerator::new()),
                store,
                Arc::new(ConsoleNotifier),
            );
            let report = run_script(&mut runner, parsed, &settings.out_dir).await?;
            tracing::info!(
                executed = report.executed,
                failed = report.failed,
                saved = report.saved,
                "Script finished"
            );
            for path in &report.exported {
                println!("Wrote {}", path.display());
            }
        }
        CliCommand::Gallery => {
            let records = store.list_all().await?;
            if records.is_empty() {
                println!("No saved designs");
            }
            for record in &records {
                println!("{}", gallery_line(record));
            }
        }
    }
    Ok(())
}

/// Execute every script line. Failed commands are logged and skipped.
///
/// # Errors
///
/// Returns an error only if an exported job sheet cannot be written.
pub async fn run_script(
    runner: &mut CommandRunner,
    script: Script,
    out_dir: &Path,
) -> anyhow::Result<ScriptReport> {
    let mut report = ScriptReport::default();
    for line in script {
        let name = line.command.name();
        match runner.execute(line.command).await {
            Ok(outcome) => {
                report.executed += 1;
                match outcome {
                    CommandOutcome::Exported(document) => {
                        tokio::fs::create_dir_all(out_dir)
                            .await
                            .with_context(|| format!("creating {}", out_dir.display()))?;
                        let path = out_dir.join(&document.file_name);
                        tokio::fs::write(&path, &document.bytes)
                            .await
                            .with_context(|| format!("writing {}", path.display()))?;
                        report.exported.push(path);
                    }
                    CommandOutcome::Saved(record) => {
                        report.saved += 1;
                        println!("Saved design {}", record.id);
                    }
                    CommandOutcome::Gallery(records) => {
                        for record in &records {
                            println!("{}", gallery_line(record));
                        }
                    }
                    CommandOutcome::Unchanged => {
                        tracing::debug!("line {}: {name} had no effect", line.number);
                    }
                    _ => {}
                }
            }
            Err(e) => {
                report.failed += 1;
                tracing::warn!("line {}: {name} failed: {e}", line.number);
            }
        }
    }
    Ok(report)
}

/// One gallery row: id, timestamp, product, side and preview size.
#[must_use]
pub fn gallery_line(record: &DesignRecord) -> String {
    let design = &record.design;
    let preview = design
        .preview_image
        .decode()
        .ok()
        .and_then(|bytes| decode_dimensions(&bytes).ok())
        .map_or_else(|| "no preview".to_string(), |(w, h)| format!("{w}x{h}"));
    format!(
        "{}  {}  {}  {}  {}",
        record.id,
        record.created_at.format("%Y-%m-%d %H:%M:%S"),
        design.product_name,
        design.side,
        preview
    )
}
