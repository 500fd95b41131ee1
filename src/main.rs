use std::fs;
use std::io;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use clap::Parser;
use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use crossterm::execute;
use crossterm::terminal::{
    disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen,
};
use ratatui::backend::CrosstermBackend;
use ratatui::Terminal;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use ledgerview::app::{App, AppSettings, InputMode, StatusLevel, Tab};
use ledgerview::config::{self, Config};
use ledgerview::infrastructure::ledger::{normalize_base_url, ClientConfig, RemoteLedgerClient};
use ledgerview::infrastructure::runtime::{RuntimeBridge, RuntimeCommand};
use ledgerview::ui;

#[derive(Debug, Parser)]
#[command(
    name = "ledgerview",
    version,
    about = "Terminal client for a ledger service: blocks, pool, history, wallet and tools"
)]
struct Args {
    /// Base URL of the ledger service (e.g. http://localhost:8080)
    #[arg(long)]
    service: Option<String>,

    /// Wallet address whose mined blocks and coinbase transactions are shown
    #[arg(long)]
    wallet: Option<String>,

    /// Number of latest blocks to load
    #[arg(long)]
    blocks: Option<u32>,

    /// Config file to use instead of the default location
    #[arg(long)]
    config: Option<PathBuf>,
}

fn main() -> Result<()> {
    let args = Args::parse();
    let config = match args.config.as_deref() {
        Some(path) => config::load_from(path),
        None => config::load(),
    };
    init_logging(&config);

    let settings = settings_from_args_and_config(&args, &config);
    let client = RemoteLedgerClient::new(
        ClientConfig::new(settings.service_url.clone()).with_timeout(config.service.timeout()),
    )
    .context("building ledger client")?;
    info!(service = %client.base_url(), "starting");

    let mut stdout = io::stdout();
    enable_raw_mode()?;
    execute!(stdout, EnterAlternateScreen)?;

    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    // Create the runtime bridge
    let runtime = RuntimeBridge::new(Arc::new(client))?;

    let mut app = App::new(settings);
    app.start();

    let res = run_app(&mut terminal, app, runtime);

    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    if let Err(err) = res {
        eprintln!("{err:?}");
    }

    Ok(())
}

fn settings_from_args_and_config(args: &Args, config: &Config) -> AppSettings {
    let service = args
        .service
        .clone()
        .unwrap_or_else(|| config.service.base_url.clone());
    let wallet_address = args
        .wallet
        .clone()
        .or_else(|| config.wallet.configured_address().map(str::to_string));
    AppSettings {
        service_url: normalize_base_url(&service),
        wallet_address,
        latest_blocks: args.blocks.unwrap_or(config.view.latest_blocks).max(1),
        normalize_wallet_timestamps: config.view.normalize_wallet_timestamps,
    }
}

/// Log to a file; the terminal belongs to the UI. `RUST_LOG` wins over the
/// configured filter.
fn init_logging(config: &Config) {
    let Some(path) = config::log_path() else {
        return;
    };
    if let Some(parent) = path.parent() {
        let _ = fs::create_dir_all(parent);
    }
    let file = match fs::OpenOptions::new().create(true).append(true).open(&path) {
        Ok(file) => file,
        Err(err) => {
            eprintln!("logging disabled: {}: {err}", path.display());
            return;
        }
    };
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&config.log.filter))
        .unwrap_or_else(|_| EnvFilter::new(config::DEFAULT_LOG_FILTER));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .try_init();
}

fn run_app<B: ratatui::backend::Backend>(
    terminal: &mut Terminal<B>,
    mut app: App,
    runtime: RuntimeBridge,
) -> Result<()> {
    let tick_rate = Duration::from_millis(200);
    let mut last_tick = Instant::now();

    loop {
        pump_background(&mut app, &runtime);
        terminal.draw(|f| ui::draw(f, &app))?;
        if app.should_quit {
            let _ = runtime.send(RuntimeCommand::Shutdown);
            info!("quit");
            return Ok(());
        }

        let timeout = tick_rate
            .checked_sub(last_tick.elapsed())
            .unwrap_or_else(|| Duration::from_secs(0));

        if event::poll(timeout)? {
            if let Event::Key(key) = event::read()? {
                handle_key(&mut app, key);
            }
        }

        if last_tick.elapsed() >= tick_rate {
            app.on_tick();
            last_tick = Instant::now();
        }

        pump_background(&mut app, &runtime);
    }
}

fn pump_background(app: &mut App, runtime: &RuntimeBridge) {
    // Process runtime events
    for event in runtime.poll_events() {
        app.apply_event(event);
    }

    // Process pending requests
    for request in app.take_requests() {
        if let Err(err) = runtime.dispatch(request) {
            warn!("dispatch failed: {err:#}");
            app.set_status(format!("{err:#}"), StatusLevel::Error);
        }
    }
}

fn handle_key(app: &mut App, key: KeyEvent) {
    if key.kind != KeyEventKind::Press {
        return;
    }

    if app.alert.is_some() {
        if matches!(key.code, KeyCode::Enter | KeyCode::Esc) {
            app.dismiss_alert();
        }
        return;
    }

    if app.help_open {
        if matches!(key.code, KeyCode::Char('?') | KeyCode::Esc) {
            app.help_open = false;
        }
        return;
    }

    match app.input_mode {
        InputMode::Normal => handle_normal_mode(app, key),
        InputMode::Command => handle_command_mode(app, key),
        InputMode::Form => handle_form_mode(app, key),
    }
}

fn handle_normal_mode(app: &mut App, key: KeyEvent) {
    if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
        app.should_quit = true;
        return;
    }

    match key.code {
        KeyCode::Char('q') => app.should_quit = true,
        KeyCode::Char('?') => app.help_open = true,
        KeyCode::Char(':') => app.enter_command(),
        KeyCode::Tab => app.cycle_tab(true),
        KeyCode::BackTab => app.cycle_tab(false),
        KeyCode::Char(c @ '1'..='5') => {
            if let Some(tab) = Tab::from_shortcut(c) {
                app.set_tab(tab);
            }
        }
        _ => {
            let action = app.active_module().handle_key(key);
            app.apply_action(action);
        }
    }
}

fn handle_command_mode(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Esc => app.exit_command(),
        KeyCode::Enter => app.apply_command(),
        KeyCode::Backspace => {
            app.command.input.pop();
        }
        KeyCode::Char(ch) => {
            if key.modifiers.contains(KeyModifiers::CONTROL) {
                return;
            }
            app.command.input.push(ch);
        }
        _ => {}
    }
}

fn handle_form_mode(app: &mut App, key: KeyEvent) {
    let action = app.active_module().handle_form_key(key);
    app.apply_action(action);
}
