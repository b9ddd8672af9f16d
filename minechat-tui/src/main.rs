//! minechat terminal client.
//!
//! Wires the session engine to a ratatui front end: the engine's display
//! and status queues drive the conversation pane and the connection panel,
//! the input line feeds the send queue, and a background task appends the
//! raw feed to the history file. Reconnection is invisible here beyond the
//! status panel flicking through its states; only a fatal engine error
//! (bad token, protocol violation) tears the UI down.

mod app;
mod config;
mod history;
mod ui;

use std::io::{stdout, Stdout};
use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;
use crossterm::event::{Event, EventStream, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use crossterm::terminal::{
    disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen,
};
use crossterm::ExecutableCommand;
use futures::StreamExt;
use ratatui::backend::CrosstermBackend;
use ratatui::Terminal;
use tokio::sync::mpsc;
use tracing_subscriber::EnvFilter;

use minechat_sdk::session::{run_session, Sinks};
use minechat_sdk::{Credentials, SessionConfig, StatusEvent};

use crate::app::App;

/// Terminal client for minechat
#[derive(Parser, Debug)]
#[command(name = "minechat-tui")]
#[command(about = "Terminal client for the minechat chat protocol")]
#[command(version)]
pub struct Cli {
    /// Chat server host
    #[arg(long, env = "MINECHAT_HOST")]
    host: Option<String>,

    /// Room feed port
    #[arg(long, env = "MINECHAT_READ_PORT")]
    read_port: Option<u16>,

    /// Auth/messaging port
    #[arg(long, env = "MINECHAT_WRITE_PORT")]
    write_port: Option<u16>,

    /// Credentials file (written by minechat-register)
    #[arg(long, env = "MINECHAT_CREDENTIALS")]
    credentials: Option<PathBuf>,

    /// Chat history file
    #[arg(long, env = "MINECHAT_HISTORY")]
    history: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Logs go to stderr so they never corrupt the alternate screen.
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let file_config = config::Config::load();
    let resolved = config::Resolved::merge(&cli, &file_config)?;

    // Persist the effective settings for the next run.
    config::Config {
        host: Some(resolved.host.clone()),
        read_port: Some(resolved.read_port),
        write_port: Some(resolved.write_port),
        credentials: Some(resolved.credentials.clone()),
        history: Some(resolved.history.clone()),
    }
    .save();

    let credentials = Credentials::load(&resolved.credentials).with_context(|| {
        format!(
            "no usable credentials at {}; run minechat-register first",
            resolved.credentials.display()
        )
    })?;

    let mut session_config = SessionConfig::new(resolved.host.clone());
    session_config.read_port = resolved.read_port;
    session_config.write_port = resolved.write_port;

    let (display_tx, display_rx) = mpsc::unbounded_channel();
    let (persist_tx, persist_rx) = mpsc::unbounded_channel();
    let (status_tx, status_rx) = mpsc::unbounded_channel();
    let (outbound_tx, outbound_rx) = mpsc::unbounded_channel();

    let sinks = Sinks {
        display: display_tx,
        persist: persist_tx,
        status: status_tx,
    };

    let mut app = App::new(&credentials.nickname);
    for line in history::load(&resolved.history) {
        app.push_history(line);
    }
    app.push_system(&format!(
        "Welcome to minechat ({}). Press Esc to quit.",
        resolved.host
    ));

    let session_task = tokio::spawn(run_session(
        session_config,
        credentials.account_hash,
        sinks,
        outbound_rx,
    ));
    let logger_task = tokio::spawn(history::run_logger(resolved.history.clone(), persist_rx));

    let mut terminal = setup_terminal()?;
    let result = run(
        &mut terminal,
        &mut app,
        display_rx,
        status_rx,
        outbound_tx,
        session_task,
    )
    .await;
    restore_terminal()?;

    logger_task.abort();
    result
}

fn setup_terminal() -> anyhow::Result<Terminal<CrosstermBackend<Stdout>>> {
    enable_raw_mode()?;
    stdout().execute(EnterAlternateScreen)?;
    Ok(Terminal::new(CrosstermBackend::new(stdout()))?)
}

fn restore_terminal() -> anyhow::Result<()> {
    disable_raw_mode()?;
    stdout().execute(LeaveAlternateScreen)?;
    Ok(())
}

async fn run(
    terminal: &mut Terminal<CrosstermBackend<Stdout>>,
    app: &mut App,
    mut display_rx: mpsc::UnboundedReceiver<String>,
    mut status_rx: mpsc::UnboundedReceiver<StatusEvent>,
    outbound_tx: mpsc::UnboundedSender<String>,
    mut session_task: tokio::task::JoinHandle<minechat_sdk::Result<()>>,
) -> anyhow::Result<()> {
    let mut events = EventStream::new();

    loop {
        terminal.draw(|frame| ui::draw(frame, app))?;

        tokio::select! {
            maybe_event = events.next() => match maybe_event {
                Some(Ok(Event::Key(key))) if key.kind == KeyEventKind::Press => {
                    handle_key(app, key, &outbound_tx);
                }
                Some(Ok(_)) => {}
                Some(Err(e)) => return Err(e.into()),
                None => app.should_quit = true,
            },
            Some(line) = display_rx.recv() => app.push_chat(line),
            Some(event) = status_rx.recv() => app.apply_status(event),
            joined = &mut session_task => {
                // run_session only ever returns on a fatal fault; surface
                // it once the terminal is restored.
                let result = joined.context("session task panicked")?;
                let err = result.err().unwrap_or(minechat_sdk::Error::Shutdown);
                return Err(anyhow::Error::new(err).context("chat session ended"));
            }
        }

        if app.should_quit {
            session_task.abort();
            return Ok(());
        }
    }
}

fn handle_key(app: &mut App, key: KeyEvent, outbound_tx: &mpsc::UnboundedSender<String>) {
    match key.code {
        KeyCode::Esc => app.should_quit = true,
        KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => {
            app.should_quit = true;
        }
        KeyCode::Enter => {
            let text = app.input_take();
            if !text.is_empty() {
                let _ = outbound_tx.send(text);
            }
        }
        KeyCode::Char(c) => app.insert_char(c),
        KeyCode::Backspace => app.backspace(),
        KeyCode::Left => app.cursor_left(),
        KeyCode::Right => app.cursor_right(),
        KeyCode::Up => app.scroll_up(1),
        KeyCode::Down => app.scroll_down(1),
        KeyCode::PageUp => app.scroll_up(10),
        KeyCode::PageDown => app.scroll_down(10),
        _ => {}
    }
}
