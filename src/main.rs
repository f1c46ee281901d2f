mod commands;
mod core;
mod publish;
mod release;
mod ui;
mod utils;
mod version;

use clap::{ArgAction, Parser, Subcommand};
use crate::core::context::RepoContext;
use crate::core::error::{ReleaseError, print_error};
use std::path::PathBuf;

/// Cut releases from a snapshot version file and publish build artifacts
#[derive(Parser)]
#[command(name = "release-rail")]
#[command(version, about, long_about = None)]
#[command(propagate_version = true)]
#[command(styles = get_styles())]
struct Cli {
  /// Run as if started in this directory
  #[arg(short = 'C', global = true, value_name = "REPO")]
  repo: Option<PathBuf>,

  /// More log output (-v info, -vv debug); RUST_LOG overrides
  #[arg(short, long, global = true, action = ArgAction::Count)]
  verbose: u8,

  #[command(subcommand)]
  command: Commands,
}

#[derive(Subcommand)]
enum Commands {
  // ============================================================================
  // Release lifecycle
  // ============================================================================
  /// Print the current version
  Version,

  /// Show version, lifecycle state and release tag
  Status {
    /// Output status in JSON format
    #[arg(long)]
    json: bool,
  },

  /// Turn the snapshot version into a release: commit and tag
  Cut {
    /// Show the plan without making changes
    #[arg(long)]
    dry_run: bool,
    /// Output results in JSON format
    #[arg(long)]
    json: bool,
  },

  /// Move a released version to the next snapshot (resumes a partial release)
  Advance {
    /// Push the branch and, when it exists, the release tag afterwards
    #[arg(long)]
    push: bool,
    /// Output results in JSON format
    #[arg(long)]
    json: bool,
  },

  /// Cut, advance and push in one run
  Release {
    /// Show the plan without making changes
    #[arg(long)]
    dry_run: bool,
    /// Keep commits and tag local
    #[arg(long)]
    no_push: bool,
    /// Output results in JSON format
    #[arg(long)]
    json: bool,
  },

  // ============================================================================
  // Artifacts
  // ============================================================================
  /// Upload a directory of packaged artifacts
  Publish {
    /// Directory holding the packaged outputs
    dir: PathBuf,
    /// Bucket name (overrides publish.bucket)
    #[arg(long, env = "B2_BUCKET_NAME")]
    bucket: Option<String>,
    /// Leading key segment (overrides publish.prefix)
    #[arg(long, env = "B2_PREFIX")]
    prefix: Option<String>,
    /// Per-build version segment (default: the version file)
    #[arg(long)]
    build_version: Option<String>,
    /// Platform classifier segment, e.g. linux-x86_64 (default: this platform)
    #[arg(long)]
    classifier: Option<String>,
    /// Upload into DIR/<bucket>/ instead of Backblaze B2
    #[arg(long, value_name = "DIR")]
    local_store: Option<PathBuf>,
    /// List the keys without uploading
    #[arg(long)]
    dry_run: bool,
  },
}

fn get_styles() -> clap::builder::Styles {
  use anstyle::{AnsiColor, Color, Style};

  let yellow_header = Style::new().bold().underline().fg_color(Some(Color::Ansi(AnsiColor::Yellow)));
  let red = Style::new().bold().fg_color(Some(Color::Ansi(AnsiColor::Red)));

  clap::builder::Styles::styled()
    .usage(yellow_header)
    .header(yellow_header)
    .literal(Style::new().fg_color(Some(Color::Ansi(AnsiColor::Green))))
    .invalid(red)
    .error(red)
    .valid(Style::new().bold().underline().fg_color(Some(Color::Ansi(AnsiColor::Green))))
    .placeholder(Style::new().fg_color(Some(Color::Ansi(AnsiColor::White))))
}

fn init_logging(verbose: u8) {
  let level = match verbose {
    0 => log::LevelFilter::Warn,
    1 => log::LevelFilter::Info,
    _ => log::LevelFilter::Debug,
  };

  env_logger::Builder::new()
    .filter_level(level)
    .parse_default_env()
    .format_timestamp(None)
    .format_target(false)
    .init();
}

fn main() {
  let cli = Cli::parse();
  init_logging(cli.verbose);

  let start_dir = match cli.repo {
    Some(dir) => dir,
    None => match std::env::current_dir() {
      Ok(dir) => dir,
      Err(e) => handle_error(ReleaseError::message(format!("Failed to get current directory: {}", e))),
    },
  };

  let ctx = match RepoContext::build(&start_dir) {
    Ok(ctx) => ctx,
    Err(e) => handle_error(e),
  };

  let result = match cli.command {
    Commands::Version => commands::run_version(&ctx),
    Commands::Status { json } => commands::run_status(&ctx, json),
    Commands::Cut { dry_run, json } => commands::run_cut(&ctx, dry_run, json),
    Commands::Advance { push, json } => commands::run_advance(&ctx, push, json),
    Commands::Release { dry_run, no_push, json } => commands::run_release(&ctx, dry_run, no_push, json),
    Commands::Publish {
      dir,
      bucket,
      prefix,
      build_version,
      classifier,
      local_store,
      dry_run,
    } => commands::run_publish(
      &ctx,
      commands::PublishArgs {
        dir,
        bucket,
        prefix,
        build_version,
        classifier,
        local_store,
        dry_run,
      },
    ),
  };

  if let Err(err) = result {
    handle_error(err);
  }
}

fn handle_error(err: ReleaseError) -> ! {
  print_error(&err);
  std::process::exit(err.exit_code().as_i32());
}
