#![forbid(unsafe_code)]

mod cmd;
mod output;
mod tui;

use anyhow::Context;
use clap::{CommandFactory, Parser, Subcommand};
use output::{CliError, OutputMode, render_error, resolve_output_mode};
use rolodex_core::config::{FileMode, resolve_settings};
use rolodex_core::{ErrorCode, Settings};
use std::env;
use std::fs::{self, File, OpenOptions};
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tracing::debug;
use tracing_subscriber::{EnvFilter, Layer, Registry, fmt, prelude::*};

/// Env var holding a tracing filter directive; overrides configured levels.
const LOG_ENV: &str = "ROLODEX_LOG";
/// Env var selecting `json` or `compact` log lines.
const LOG_FORMAT_ENV: &str = "ROLODEX_LOG_FORMAT";

#[derive(Parser, Debug)]
#[command(
    author,
    version,
    about = "rdx: terminal address book with labels",
    long_about = None
)]
struct Cli {
    /// Config file (default: <config dir>/rolodex/config.toml).
    #[arg(long, global = true, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Address book database, overriding the configured path.
    #[arg(long, global = true, value_name = "PATH")]
    db: Option<PathBuf>,

    /// Enable verbose logging.
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Emit JSON output instead of human-readable text.
    #[arg(long, global = true)]
    json: bool,

    /// Output format (overrides --json and FORMAT).
    #[arg(long, global = true, value_enum)]
    format: Option<OutputMode>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
enum Commands {
    #[command(
        next_help_heading = "Browse",
        about = "Open the interactive browser (default)",
        long_about = "Open the full-screen address list with detail pane, selection, editing, and bulk labeling.",
        after_help = "EXAMPLES:\n    # Browse the default address book\n    rdx\n\n    # Browse a specific database\n    rdx --db ./holiday.db tui"
    )]
    Tui,

    #[command(
        next_help_heading = "Read",
        about = "List addresses",
        long_about = "List addresses in name order with completeness and labels.",
        after_help = "EXAMPLES:\n    # List every address\n    rdx list\n\n    # Only addresses carrying a label\n    rdx list --label \"Christmas 2024\"\n\n    # Emit machine-readable output\n    rdx list --json"
    )]
    List(cmd::list::ListArgs),

    #[command(
        next_help_heading = "Read",
        about = "Show one address",
        long_about = "Show the detail view (nickname, postal block, labels) for one address.",
        after_help = "EXAMPLES:\n    # Show an address\n    rdx show 12\n\n    # Emit machine-readable output\n    rdx show 12 --json"
    )]
    Show(cmd::show::ShowArgs),

    #[command(
        next_help_heading = "Read",
        about = "List labels with usage counts",
        after_help = "EXAMPLES:\n    rdx labels\n    rdx labels --format text"
    )]
    Labels,

    #[command(
        next_help_heading = "Labels",
        about = "Attach a label to addresses",
        long_about = "Attach one label to every given address. Addresses that already carry it are left alone.",
        after_help = "EXAMPLES:\n    # Label three addresses\n    rdx tag \"Christmas 2024\" 3 7 12\n\n    # Create the label on the fly\n    rdx tag \"Easter 2025\" 3 --create"
    )]
    Tag(cmd::tag::TagArgs),

    #[command(
        next_help_heading = "Labels",
        about = "Remove a label from addresses",
        after_help = "EXAMPLES:\n    rdx untag \"Christmas 2024\" 3 7"
    )]
    Untag(cmd::tag::UntagArgs),

    #[command(
        next_help_heading = "Write",
        about = "Edit an address",
        long_about = "Apply the given field values to one address and commit them together. Nothing is written if validation fails.",
        after_help = "EXAMPLES:\n    # Complete a postal record\n    rdx edit 4 --street \"42 Elm\" --city Town --state ST --zipcode 00000\n\n    # Clear a nickname\n    rdx edit 4 --nickname \"\""
    )]
    Edit(cmd::edit::EditArgs),

    #[command(
        next_help_heading = "Write",
        about = "Populate the database with sample data",
        long_about = "Generate random addresses and yearly Christmas labels. Refuses to touch a non-empty address book unless --force is given.",
        after_help = "EXAMPLES:\n    # Seed a fresh database\n    rdx --db ./demo.db seed\n\n    # Reproducible data, replacing what is there\n    rdx seed --seed 42 --count 20 --force"
    )]
    Seed(cmd::seed::SeedArgs),

    #[command(
        next_help_heading = "Utilities",
        about = "Generate shell completions",
        after_help = "EXAMPLES:\n    rdx completions bash > ~/.local/share/bash-completion/completions/rdx\n    rdx completions zsh > ~/.zfunc/_rdx"
    )]
    Completions(cmd::completions::CompletionsArgs),
}

/// Defaults, then config file, then `ROLODEX_*`, then `--db`.
fn load_settings(cli: &Cli, output: OutputMode) -> anyhow::Result<Settings> {
    let mut settings = match resolve_settings(cli.config.as_deref()) {
        Ok(settings) => settings,
        Err(err) => {
            render_error(
                output,
                &CliError::with_details(
                    format!("{err:#}"),
                    ErrorCode::ConfigParseError.hint().unwrap_or("check the config file"),
                    ErrorCode::ConfigParseError.code(),
                ),
            )?;
            return Err(err);
        }
    };
    if let Some(db) = &cli.db {
        settings.database.path = Some(db.clone());
    }
    Ok(settings)
}

fn open_log_file(path: &Path, mode: FileMode) -> anyhow::Result<File> {
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        fs::create_dir_all(parent)
            .with_context(|| format!("create log directory {}", parent.display()))?;
    }
    let mut options = OpenOptions::new();
    options.create(true);
    match mode {
        FileMode::Append => options.append(true),
        FileMode::Truncate => options.write(true).truncate(true),
    };
    options
        .open(path)
        .with_context(|| format!("open log file {}", path.display()))
}

/// Console logs go to stderr; the TUI silences them unless `ROLODEX_LOG`
/// asks otherwise. A log file is added when `logging.filename` is set.
fn init_tracing(settings: &Settings, verbose: bool, interactive: bool) -> anyhow::Result<()> {
    let env_filter = || EnvFilter::try_from_env(LOG_ENV).ok();
    let json = env::var(LOG_FORMAT_ENV).is_ok_and(|format| format == "json");

    let console_level = if interactive {
        "off"
    } else if verbose {
        "debug"
    } else {
        settings.log_level()
    };
    let console_filter = env_filter().unwrap_or_else(|| EnvFilter::new(console_level));

    let mut layers: Vec<Box<dyn Layer<Registry> + Send + Sync>> = Vec::new();
    let console = fmt::layer().with_writer(io::stderr);
    layers.push(if json {
        console
            .json()
            .with_ansi(false)
            .with_filter(console_filter)
            .boxed()
    } else {
        console.compact().with_filter(console_filter).boxed()
    });

    if let Some(path) = &settings.logging.filename {
        let file = open_log_file(path, settings.logging.file_mode)?;
        let file_level = if settings.debug {
            "debug"
        } else {
            settings.logging.file_level.as_str()
        };
        let file_filter = env_filter().unwrap_or_else(|| EnvFilter::new(file_level));
        let layer = fmt::layer().with_writer(Mutex::new(file)).with_ansi(false);
        layers.push(if json {
            layer.json().with_filter(file_filter).boxed()
        } else {
            layer.with_filter(file_filter).boxed()
        });
    }

    tracing_subscriber::registry().with(layers).init();
    Ok(())
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let output = resolve_output_mode(cli.format, cli.json);
    let settings = load_settings(&cli, output)?;
    let command = cli.command.unwrap_or(Commands::Tui);

    init_tracing(&settings, cli.verbose, matches!(command, Commands::Tui))?;
    debug!(
        db = %settings.database_path().display(),
        ?output,
        collation = ?settings.list.collation,
        "rdx starting"
    );

    match command {
        Commands::Tui => tui::run(&settings),
        Commands::List(ref args) => cmd::list::run_list(args, output, &settings),
        Commands::Show(ref args) => cmd::show::run_show(args, output, &settings),
        Commands::Labels => cmd::labels::run_labels(output, &settings),
        Commands::Tag(ref args) => cmd::tag::run_tag(args, output, &settings),
        Commands::Untag(ref args) => cmd::tag::run_untag(args, output, &settings),
        Commands::Edit(ref args) => cmd::edit::run_edit(args, output, &settings),
        Commands::Seed(ref args) => cmd::seed::run_seed(args, output, &settings),
        Commands::Completions(args) => {
            let mut command = Cli::command();
            cmd::completions::run_completions(args.shell, &mut command)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn no_subcommand_means_tui() {
        let cli = Cli::parse_from(["rdx"]);
        assert!(cli.command.is_none());
    }

    #[test]
    fn global_flags_parse_after_subcommand() {
        let cli = Cli::parse_from(["rdx", "list", "--json", "--db", "/tmp/x.db"]);
        assert!(cli.json);
        assert_eq!(cli.db.as_deref(), Some(Path::new("/tmp/x.db")));
        assert!(matches!(cli.command, Some(Commands::List(_))));
    }

    #[test]
    fn format_flag_parses() {
        let cli = Cli::parse_from(["rdx", "--format", "text", "labels"]);
        assert_eq!(cli.format, Some(OutputMode::Text));
        assert!(matches!(cli.command, Some(Commands::Labels)));
    }

    #[test]
    fn tag_collects_ids() {
        let cli = Cli::parse_from(["rdx", "tag", "Christmas 2024", "1", "2"]);
        match cli.command {
            Some(Commands::Tag(args)) => {
                assert_eq!(args.label, "Christmas 2024");
                assert_eq!(args.ids.len(), 2);
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn db_flag_overrides_configured_path() {
        let dir = tempfile::tempdir().expect("tempdir");
        let config = dir.path().join("config.toml");
        fs::write(&config, "[database]\npath = \"/nowhere/else.db\"\n").expect("write");
        let db = dir.path().join("book.db");
        let cli = Cli::parse_from([
            "rdx",
            "--config",
            config.to_str().expect("utf8 path"),
            "--db",
            db.to_str().expect("utf8 path"),
            "labels",
        ]);
        let settings = load_settings(&cli, OutputMode::Text).expect("settings");
        assert_eq!(settings.database_path(), db);
    }

    #[test]
    fn missing_explicit_config_is_an_error() {
        let cli = Cli::parse_from(["rdx", "--config", "/definitely/not/here.toml", "labels"]);
        assert!(load_settings(&cli, OutputMode::Text).is_err());
    }

    #[test]
    fn command_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn truncate_mode_replaces_log_contents() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("logs/rdx.log");
        fs::create_dir_all(path.parent().expect("parent")).expect("mkdir");
        fs::write(&path, "old line\n").expect("write");

        drop(open_log_file(&path, FileMode::Truncate).expect("open"));
        assert_eq!(fs::read_to_string(&path).expect("read"), "");

        fs::write(&path, "kept\n").expect("write");
        drop(open_log_file(&path, FileMode::Append).expect("open"));
        assert_eq!(fs::read_to_string(&path).expect("read"), "kept\n");
    }
}
