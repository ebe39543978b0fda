//! ztime CLI entry point.
//!
//! Parses command-line arguments, runs the command and prints the timing
//! report to stderr.

use clap::{CommandFactory, Parser};
use tracing_subscriber::EnvFilter;
use ztime::output::{print_error, print_report};
use ztime::{Config, OutputMode, Runner};

/// Environment variable holding the log filter directives.
const LOG_ENV_VAR: &str = "ZTIME_LOG";

#[derive(Parser)]
#[command(name = "ztime")]
#[command(
    version,
    about = "A shell-independent command timer replacement for zsh's `time`",
    after_help = "EXAMPLES:
    ztime make -j8
    ztime --json cargo build
    TIMEFMT='%J: %*E elapsed, %M KB max' ztime ./script.sh

TEMPLATE:
    The report follows zsh's TIMEFMT escapes. The template is taken from
    --format, then $TIMEFMT, then the default:
        %J  %U user %S system %P cpu %*E total

    %J command      %U user time     %S system time   %E elapsed time
    %*E elapsed as [H:]M:SS.SS       %P CPU percent   %% literal percent
    %M max RSS      %X shared        %D data+stack    %K shared+data+stack
    %F major faults %R minor faults  %W swaps         %I/%O block in/out
    %r/%s messages received/sent     %k signals       %w/%c vol/invol switches

EXIT STATUS:
    The command's exit code, 128+N if it was killed by signal N, or 127 if
    it could not be started."
)]
struct Cli {
    /// Print all metrics as JSON instead of the template line
    #[arg(long)]
    json: bool,

    /// Suppress the timing report
    #[arg(short, long)]
    quiet: bool,

    /// Report template, overriding $TIMEFMT
    #[arg(short, long, value_name = "TEMPLATE")]
    format: Option<String>,

    /// Command to execute, followed by its arguments
    #[arg(
        value_name = "COMMAND",
        trailing_var_arg = true,
        allow_hyphen_values = true
    )]
    command: Vec<String>,
}

#[tokio::main(flavor = "current_thread")]
async fn main() {
    init_tracing();

    let cli = Cli::parse();

    if cli.command.is_empty() {
        let _ = Cli::command().print_help();
        std::process::exit(0);
    }

    let config = Config::from_env(cli.format, OutputMode::from_flags(cli.json, cli.quiet));
    let code = execute(&cli.command, &config).await;
    std::process::exit(code);
}

/// Runs the command, prints the report and returns ztime's exit code.
async fn execute(command: &[String], config: &Config) -> i32 {
    match Runner::new().run(command).await {
        Ok(outcome) => {
            if let Err(e) = print_report(&outcome.metrics, config) {
                print_error(&e.to_string());
            }
            outcome.disposition.exit_code()
        }
        Err(e) => {
            print_error(&e.to_string());
            e.exit_code()
        }
    }
}

fn init_tracing() {
    let filter = EnvFilter::try_from_env(LOG_ENV_VAR).unwrap_or_else(|_| EnvFilter::new("warn"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_ansi(false)
        .with_target(false)
        .without_time()
        .init();
}
