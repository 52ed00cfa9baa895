use anyhow::{Context, Result};
use clap::Parser;
use std::path::PathBuf;
use std::time::Duration;
use tokio::runtime::Handle;
use tokio::sync::mpsc;
use tracing_subscriber::EnvFilter;

use termflux::app::{App, AppEvent};
use termflux::config::{ensure_config_dir, resolve_config_dir, Config, CONFIG_FILE};
use termflux::content::HtmlRenderer;
use termflux::credentials::{
    load_credentials, prompt_credentials, save_credentials, Credentials, CREDENTIALS_FILE,
};
use termflux::keybindings::KeybindingRegistry;
use termflux::miniflux::{ClientError, MinifluxClient};
use termflux::navigation::NavigationController;
use termflux::store::EntryStore;
use termflux::sync::RemoteReadDispatcher;
use termflux::ui;

const SHUTDOWN_GRACE: Duration = Duration::from_secs(2);

#[derive(Parser, Debug)]
#[command(name = "termflux", about = "Triage unread Miniflux entries from the terminal")]
struct Args {
    /// Ask for the instance URL and API key again, replacing saved ones
    #[arg(long)]
    login: bool,

    #[arg(long, value_name = "DIR")]
    config_dir: Option<PathBuf>,
}

fn obtain_credentials(path: &std::path::Path, force_prompt: bool) -> Result<Credentials> {
    if !force_prompt {
        if let Some(creds) = load_credentials(path)
            .with_context(|| format!("Failed to load credentials from {}", path.display()))?
        {
            return Ok(creds);
        }
        println!("No credentials found. Enter your Miniflux instance details.");
    }

    let stdin = std::io::stdin();
    let creds = prompt_credentials(&mut stdin.lock(), &mut std::io::stdout())
        .context("Failed to read credentials")?;
    save_credentials(path, &creds)
        .with_context(|| format!("Failed to save credentials to {}", path.display()))?;
    println!("Saved credentials to {}", path.display());
    Ok(creds)
}

#[tokio::main]
async fn main() -> Result<()> {
    // stdout belongs to the terminal UI; logs go to stderr and only when asked for
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("off")),
        )
        .init();

    let args = Args::parse();

    let config_dir = resolve_config_dir(args.config_dir)?;
    ensure_config_dir(&config_dir)
        .with_context(|| format!("Failed to create config directory {}", config_dir.display()))?;

    let config = Config::load(&config_dir.join(CONFIG_FILE)).context("Failed to load config")?;
    let creds = obtain_credentials(&config_dir.join(CREDENTIALS_FILE), args.login)?;

    let client = MinifluxClient::new(&creds, config.request_timeout())
        .context("Failed to create HTTP client")?;

    println!("Fetching unread entries from {}...", client.base_url());
    let entries = match client.fetch_unread(config.fetch_limit).await {
        Ok(entries) => entries,
        Err(e @ ClientError::Unauthorized(_)) => {
            eprintln!("Error: {}", e);
            eprintln!("Run `termflux --login` to enter a new API key.");
            std::process::exit(1);
        }
        Err(e) => return Err(e).context("Failed to fetch unread entries"),
    };
    tracing::info!(count = entries.len(), "Fetched unread entries");

    let (event_tx, event_rx) = mpsc::channel::<AppEvent>(64);
    let dispatcher = RemoteReadDispatcher::new(client, event_tx, Handle::current());
    let pending_syncs = dispatcher.in_flight();

    let nav = NavigationController::new(
        EntryStore::load(entries),
        Box::new(dispatcher),
        Box::new(HtmlRenderer::new(config.content_width)),
    );

    let mut keybindings = KeybindingRegistry::new();
    for warning in keybindings.apply_overrides(&config.keybindings) {
        tracing::warn!(warning = %warning, "Keybinding override skipped");
        eprintln!("Warning: {}", warning);
    }

    let mut app = App::new(nav, keybindings, pending_syncs);
    ui::run(&mut app, event_rx).await?;

    // Give detached mark-read tasks a moment before the runtime drops them
    let deadline = tokio::time::Instant::now() + SHUTDOWN_GRACE;
    while app.syncing() > 0 && tokio::time::Instant::now() < deadline {
        tokio::time::sleep(Duration::from_millis(50)).await;
    }
    if app.syncing() > 0 {
        tracing::warn!(pending = app.syncing(), "Exiting with mark-read updates in flight");
    }

    let read = app.nav.store().len() - app.nav.store().unread_count();
    if app.sync_failures > 0 {
        eprintln!(
            "{} mark-read update(s) failed to reach the server; those entries stay unread there.",
            app.sync_failures
        );
    }
    println!("Marked {} entries read. Goodbye!", read);
    Ok(())
}
