//! Pomodoro Client - a terminal client for a remote focus-session service
//!
//! Log in, start a session and watch the countdown:
//! - 25 minutes of focused work
//! - 5 minutes of break, completed on the server when it runs out
//! - Session history and deletion from the same shell or as one-shot commands

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use clap::{CommandFactory, Parser};

use pomodoro_client::cli::{
    Cli, Commands, CredentialArgs, Display, Shell, ShellArgs, ShellCommand, HELP_TEXT,
};
use pomodoro_client::config::AppConfig;
use pomodoro_client::display::{DisplaySink, TerminalDisplay};
use pomodoro_client::session::{AuthorizedSession, HttpSessionClient, SessionApi};
use pomodoro_client::settings::DurationSettings;
use pomodoro_client::timer::SystemClock;

/// Main entry point
#[tokio::main(flavor = "current_thread")]
async fn main() {
    // Parse command line arguments
    let cli = Cli::parse();

    // Initialize logging
    init_tracing(cli.verbose);

    // Execute command
    if let Err(e) = execute(cli).await {
        Display::show_error(&format!("{:#}", e));
        std::process::exit(1);
    }
}

/// Initializes the tracing subscriber for logging.
///
/// Logs go to stderr so they never mix with the status line on stdout.
fn init_tracing(verbose: bool) {
    use tracing_subscriber::{fmt, EnvFilter};

    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };

    fmt()
        .with_env_filter(filter)
        .with_target(false)
        .without_time()
        .with_writer(std::io::stderr)
        .init();
}

/// Executes the CLI command.
async fn execute(cli: Cli) -> Result<()> {
    if let Some(Commands::Completions { shell }) = cli.command {
        generate_completions(shell);
        return Ok(());
    }

    let config = load_config(cli.config.as_ref(), cli.base_url.as_deref())?;
    tracing::debug!("using session service at {}", config.base_url);

    match cli.command {
        Some(Commands::History(credentials)) => {
            let session = login(&config, &credentials).await?;
            let entries = session.list_history().await?;
            Display::show_history(&entries);
        }
        Some(Commands::Delete { id, credentials }) => {
            let session = login(&config, &credentials).await?;
            session.delete(id).await?;
            Display::show_delete_success(id);
        }
        Some(Commands::Shell(args)) => run_shell(&config, args).await?,
        Some(Commands::Completions { .. }) => {}
        None => run_shell(&config, ShellArgs::default()).await?,
    }

    Ok(())
}

/// Loads the config file and applies command-line overrides.
fn load_config(path: Option<&PathBuf>, base_url: Option<&str>) -> Result<AppConfig> {
    let mut config = match path {
        Some(path) => AppConfig::load(path)?,
        None => AppConfig::load_default()?,
    };
    if let Some(url) = base_url {
        config = config.with_base_url(url);
    }
    config.validate()?;
    Ok(config)
}

fn build_api(config: &AppConfig) -> Result<Arc<dyn SessionApi>> {
    let client = HttpSessionClient::new(
        &config.base_url,
        Duration::from_secs(config.request_timeout_secs),
    )?;
    Ok(Arc::new(client))
}

async fn login(config: &AppConfig, credentials: &CredentialArgs) -> Result<AuthorizedSession> {
    let api = build_api(config)?;
    let session =
        AuthorizedSession::login(api, &credentials.username, &credentials.password).await?;
    Ok(session)
}

/// Runs the interactive shell until the user quits.
async fn run_shell(config: &AppConfig, args: ShellArgs) -> Result<()> {
    let api = build_api(config)?;
    let display = Arc::new(TerminalDisplay::new(Duration::from_secs(
        config.message_seconds,
    )));
    let clock = Arc::new(SystemClock::local(config.timezone_override()));
    let settings = DurationSettings::new(config.work_minutes, config.break_minutes);

    let mut shell = Shell::new(api, display.clone(), settings, clock);
    display.print_block(HELP_TEXT);

    match (args.username, args.password) {
        (Some(username), Some(password)) => shell.login(&username, &password).await,
        (Some(username), None) => {
            shell.handle(ShellCommand::Login { username }).await;
        }
        _ => {}
    }

    let result = shell.run().await;
    display.finish();
    result
}

/// Generates shell completion scripts.
fn generate_completions(shell: clap_complete::Shell) {
    use clap_complete::generate;
    use std::io;

    let mut cmd = Cli::command();
    let bin_name = cmd.get_name().to_string();
    generate(shell, &mut cmd, bin_name, &mut io::stdout());
}

// ============================================================================
// Tests
// ============================================================================
