//! CLI entry point for mailgrab.

use std::path::PathBuf;

use clap::Parser;

use mailgrab::config::{self, FileConfig, Overrides, PostAction, Settings};
use mailgrab::error::Result;
use mailgrab::pipeline;
use mailgrab::report;
use mailgrab::session::{ImapSession, MailSession};

#[derive(Parser)]
#[command(
    name = "mailgrab",
    version,
    about = "Fetch image attachments from an IMAP mailbox"
)]
struct Cli {
    /// Path to config file
    #[arg(short, long, env = "MAILGRAB_CONFIG", value_name = "FILE")]
    config: Option<PathBuf>,

    /// IMAP server hostname
    #[arg(short, long, env = "MAILGRAB_SERVER")]
    server: Option<String>,

    /// IMAP port
    #[arg(short, long, env = "MAILGRAB_PORT")]
    port: Option<u16>,

    /// IMAP username
    #[arg(short, long, env = "MAILGRAB_USERNAME")]
    username: Option<String>,

    /// IMAP password
    #[arg(short = 'P', long, env = "MAILGRAB_PASSWORD")]
    password: Option<String>,

    /// Mailbox to check
    #[arg(short, long, env = "MAILGRAB_MAILBOX")]
    mailbox: Option<String>,

    /// Output directory for attachments
    #[arg(short, long, env = "MAILGRAB_OUTPUT")]
    output: Option<PathBuf>,

    /// Action after processing
    #[arg(long, env = "MAILGRAB_POST_ACTION", value_enum)]
    post_action: Option<PostAction>,

    /// Target mailbox for the move action
    #[arg(long, env = "MAILGRAB_MOVE_TO")]
    move_to: Option<String>,

    /// Disable TLS certificate verification
    #[arg(long, env = "MAILGRAB_INSECURE")]
    insecure: bool,

    /// Verbose output (per-message detail)
    #[arg(short, long, env = "MAILGRAB_VERBOSE")]
    verbose: bool,

    /// Suppress non-error output
    #[arg(short, long, env = "MAILGRAB_QUIET")]
    quiet: bool,

    /// Path to a JSON report file
    #[arg(short = 'j', long, env = "MAILGRAB_JSON_OUTPUT")]
    json_output: Option<PathBuf>,
}

fn main() {
    std::process::exit(run());
}

fn run() -> i32 {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(e) => {
            // --help/--version print to stdout and exit clean; anything
            // else is a configuration error.
            let code = if e.use_stderr() { 1 } else { 0 };
            let _ = e.print();
            return code;
        }
    };

    let settings = match resolve_settings(cli) {
        Ok(settings) => settings,
        Err(e) => {
            eprintln!("Error: {e}");
            return e.exit_code();
        }
    };

    setup_logging(&settings);

    let mut session = match ImapSession::connect(&settings) {
        Ok(session) => session,
        Err(e) => {
            eprintln!("Error: {e}");
            return e.exit_code();
        }
    };

    let result = pipeline::run(&mut session, &settings);
    session.close();

    let outcome = match result {
        Ok(outcome) => outcome,
        Err(e) => {
            eprintln!("Error: {e}");
            return e.exit_code();
        }
    };

    if outcome.messages_processed == 0 {
        if !settings.quiet {
            println!("No new messages");
        }
        return 0;
    }

    if !settings.quiet {
        println!(
            "Processed {} message(s), saved {} image(s)",
            outcome.messages_processed, outcome.images_saved
        );
    }

    // The report is supplementary: a write failure is reported but does
    // not change the exit status.
    if let Some(path) = &settings.json_output {
        if !outcome.reports.is_empty() {
            if let Err(e) = report::write_report(path, &outcome.reports) {
                eprintln!("Error: writing JSON report: {e}");
            }
        }
    }

    0
}

/// Merge CLI/env values over the config file over defaults.
fn resolve_settings(cli: Cli) -> Result<Settings> {
    let file = match config::find_config_file(cli.config.as_deref())? {
        Some(path) => config::load_file(&path)?,
        None => FileConfig::default(),
    };

    let overrides = Overrides {
        server: cli.server,
        port: cli.port,
        username: cli.username,
        password: cli.password,
        mailbox: cli.mailbox,
        output: cli.output,
        post_action: cli.post_action,
        move_to: cli.move_to,
        insecure: cli.insecure,
        verbose: cli.verbose,
        quiet: cli.quiet,
        json_output: cli.json_output,
    };

    Settings::resolve(overrides, file)
}

/// Tracing to stderr. Verbosity maps to level; `RUST_LOG` overrides.
fn setup_logging(settings: &Settings) {
    let level = if settings.verbose {
        "info"
    } else if settings.quiet {
        "error"
    } else {
        "warn"
    };

    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(level));

    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .init();
}
