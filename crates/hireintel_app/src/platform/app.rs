use std::io::{self, BufRead, IsTerminal, Write};
use std::sync::mpsc;
use std::thread;
use std::time::Duration;

use hireintel_core::{update, AppState, Msg};
use hireintel_logging::{hi_info, hi_warn};

use super::commands::{parse_command, Command, HELP};
use super::config;
use super::effects::EffectRunner;
use super::logging;
use super::ui::render::{render, render_notification};

/// Everything the main loop reacts to.
pub(crate) enum Input {
    Msg(Msg),
    Line(String),
    Quit,
}

pub fn run_app() -> anyhow::Result<()> {
    let path = config::config_path(std::env::args().skip(1));
    let (config, problem) = config::load(&path);
    let config = config.with_token_override(std::env::var(config::TOKEN_ENV_VAR).ok());

    logging::initialize(config.log_destination, config.level_filter());
    if let Some(err) = problem {
        hi_warn!("{}; using defaults", err);
    }
    hi_info!("Starting dashboard (config {:?})", path);

    let (input_tx, input_rx) = mpsc::channel::<Input>();
    let runner = EffectRunner::new(
        config.fetch_settings(),
        config.reconnect_policy(),
        input_tx.clone(),
    )?;
    spawn_ticker(config.refresh_interval(), input_tx.clone())?;
    spawn_stdin_reader(input_tx)?;

    let mut screen = Screen::new();
    screen.line(HELP);

    let mut state = AppState::new();
    dispatch(&mut state, &runner, &mut screen, Msg::Started);

    while let Ok(input) = input_rx.recv() {
        match input {
            Input::Msg(msg) => dispatch(&mut state, &runner, &mut screen, msg),
            Input::Line(line) => match parse_command(&line) {
                Ok(None) => {}
                Ok(Some(Command::Dispatch(msg))) => dispatch(&mut state, &runner, &mut screen, msg),
                Ok(Some(Command::Help)) => screen.line(HELP),
                Ok(Some(Command::Quit)) => break,
                Err(err) => screen.line(&err.to_string()),
            },
            Input::Quit => break,
        }
    }

    hi_info!("Dashboard exiting");
    Ok(())
}

fn dispatch(state: &mut AppState, runner: &EffectRunner, screen: &mut Screen, msg: Msg) {
    let (next, effects) = update(std::mem::take(state), msg);
    *state = next;
    runner.enqueue(effects);

    let notifications = state.take_notifications();
    if state.consume_dirty() {
        screen.repaint(&render(&state.view()));
    }
    for notification in &notifications {
        screen.line(&render_notification(notification));
    }
}

/// Background tick driving the refresh timers.
fn spawn_ticker(interval: Duration, input_tx: mpsc::Sender<Input>) -> io::Result<()> {
    thread::Builder::new()
        .name("hireintel-tick".to_string())
        .spawn(move || loop {
            thread::sleep(interval);
            if input_tx.send(Input::Msg(Msg::RefreshTick)).is_err() {
                break;
            }
        })?;
    Ok(())
}

fn spawn_stdin_reader(input_tx: mpsc::Sender<Input>) -> io::Result<()> {
    thread::Builder::new()
        .name("hireintel-stdin".to_string())
        .spawn(move || {
            for line in io::stdin().lock().lines() {
                let Ok(line) = line else {
                    break;
                };
                if input_tx.send(Input::Line(line)).is_err() {
                    return;
                }
            }
            let _ = input_tx.send(Input::Quit);
        })?;
    Ok(())
}

struct Screen {
    out: io::Stdout,
    interactive: bool,
}

impl Screen {
    fn new() -> Self {
        let out = io::stdout();
        let interactive = out.is_terminal();
        Self { out, interactive }
    }

    /// Replace the dashboard. Clears the terminal when attached to one.
    fn repaint(&mut self, text: &str) {
        let mut out = self.out.lock();
        if self.interactive {
            let _ = write!(out, "\x1b[2J\x1b[H");
        }
        let _ = write!(out, "{text}");
        let _ = out.flush();
    }

    fn line(&mut self, text: &str) {
        let mut out = self.out.lock();
        let _ = writeln!(out, "{text}");
        let _ = out.flush();
    }
}
