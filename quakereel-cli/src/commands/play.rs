//! Play command - replay a feed in the terminal.
//!
//! Playback runs on the library's tick task. This command only forwards
//! user input to the session:
//!
//! ```text
//! stdin thread ──┐
//!                ├── mpsc ──► control loop ──► FeedSession
//! Ctrl+C ────────┘                  ▲
//!                      state watch ─┘ (completion)
//! ```

use std::io::BufRead;
use std::sync::Arc;

use quakereel::app::{FeedSession, LoadOutcome};
use quakereel::playback::{CompressionRate, PlaybackState, StartOutcome};
use tokio::sync::mpsc::{self, UnboundedSender};
use tracing::{debug, info};

use super::common::{format_span, parse_rate, print_load_report, resolve_feed, resolve_rate};
use crate::error::CliError;
use crate::render::TerminalRenderer;
use crate::runner::CliRunner;

/// Arguments for the play command.
pub struct PlayArgs {
    pub feed: Option<String>,
    pub rate: Option<String>,
    pub refresh: bool,
    pub no_cache: bool,
}

/// A user request to the control loop.
#[derive(Debug, Clone, PartialEq)]
pub enum Control {
    Pause,
    Resume,
    Faster,
    Slower,
    SetRate(CompressionRate),
    Reset,
    Status,
    Help,
    Quit,
    /// Ctrl+C: reset and exit.
    Interrupt,
    /// Stdin reached end of file.
    InputClosed,
    Unknown(String),
}

/// Parses one input line. Blank lines yield `None`.
pub fn parse_control(line: &str) -> Option<Control> {
    let line = line.trim();
    if line.is_empty() {
        return None;
    }

    let control = match line {
        "p" | "pause" => Control::Pause,
        "r" | "resume" | "start" => Control::Resume,
        "+" | "faster" => Control::Faster,
        "-" | "slower" => Control::Slower,
        "x" | "reset" => Control::Reset,
        "s" | "status" => Control::Status,
        "h" | "?" | "help" => Control::Help,
        "q" | "quit" | "exit" => Control::Quit,
        _ => match line.strip_prefix("rate") {
            Some(value) => match parse_rate(value) {
                Ok(rate) => Control::SetRate(rate),
                Err(_) => Control::Unknown(line.to_string()),
            },
            None => Control::Unknown(line.to_string()),
        },
    };
    Some(control)
}

const HELP: &str = "Commands: p pause | r resume | + faster | - slower | rate N | x reset | s status | q quit";

/// Run the play command.
pub fn run(args: PlayArgs, runner: &CliRunner) -> Result<(), CliError> {
    let selector = resolve_feed(args.feed.as_deref(), runner.config())?;
    let rate = resolve_rate(args.rate.as_deref(), runner.config())?;
    let app_config = runner.app_config(args.no_cache).with_rate(rate);
    let runtime = runner.runtime()?;

    let renderer = Arc::new(TerminalRenderer::new());

    runtime.block_on(async move {
        let session = FeedSession::from_config(&app_config, Arc::clone(&renderer))?;

        println!("Loading {} ...", selector.describe());
        let outcome = if args.refresh {
            session.refresh(selector).await?
        } else {
            session.load(selector).await?
        };
        let report = match outcome {
            LoadOutcome::Loaded(report) => report,
            LoadOutcome::Superseded => return Ok(()),
        };

        print_load_report(&report, session.rate());
        println!();

        let (tx, rx) = mpsc::unbounded_channel();
        install_interrupt_handler(tx.clone())?;
        spawn_input_reader(tx);

        println!("{}", HELP);
        renderer.prepare(report.summary.count);

        match session.start() {
            StartOutcome::NoData => {
                println!("No earthquakes in this feed; nothing to play.");
                return Ok(());
            }
            outcome => debug!(?outcome, "Playback started"),
        }

        control_loop(&session, &renderer, rx).await;
        renderer.finish();
        Ok::<(), CliError>(())
    })
}

type Session = FeedSession<quakereel::provider::AsyncReqwestClient, Arc<TerminalRenderer>>;

async fn control_loop(
    session: &Session,
    renderer: &TerminalRenderer,
    mut rx: mpsc::UnboundedReceiver<Control>,
) {
    let mut states = session.subscribe();
    let mut input_open = true;

    loop {
        tokio::select! {
            control = rx.recv() => {
                let Some(control) = control else { break };
                info!(?control, "Control input");

                match control {
                    Control::Pause => {
                        if session.pause() {
                            renderer.println("Paused. 'r' to resume.");
                        }
                    }
                    Control::Resume => match session.start() {
                        StartOutcome::Finished => {
                            renderer.println("Playback finished. 'x' to reset and replay.");
                        }
                        StartOutcome::NoData => renderer.println("Nothing to play."),
                        _ => {}
                    },
                    Control::Faster => change_rate(session, renderer, session.rate().hours_per_second() * 2.0),
                    Control::Slower => change_rate(session, renderer, session.rate().hours_per_second() / 2.0),
                    Control::SetRate(rate) => change_rate(session, renderer, rate.hours_per_second()),
                    Control::Reset => {
                        session.reset();
                        renderer.println("Reset. 'r' to play from the start.");
                    }
                    Control::Status => print_status(session, renderer),
                    Control::Help => renderer.println(HELP),
                    Control::Quit => break,
                    Control::Interrupt => {
                        session.reset();
                        renderer.println("Interrupted.");
                        break;
                    }
                    Control::InputClosed => {
                        input_open = false;
                        if session.status().state != PlaybackState::Running {
                            break;
                        }
                    }
                    Control::Unknown(line) => {
                        renderer.println(format!("Unknown command '{}'. {}", line, HELP));
                    }
                }
            }

            changed = states.changed() => {
                if changed.is_err() {
                    break;
                }
                let state = *states.borrow_and_update();
                if state == PlaybackState::Completed {
                    renderer.println(format!(
                        "Playback complete: {} events.",
                        session.status().total
                    ));
                    if !input_open {
                        break;
                    }
                    renderer.println("'x' to reset and replay, 'q' to quit.");
                }
            }
        }
    }
}

fn change_rate(session: &Session, renderer: &TerminalRenderer, hours_per_second: f64) {
    let rate = CompressionRate::new(hours_per_second);
    session.set_rate(rate);
    renderer.println(format!("Rate: {}", rate));
}

fn print_status(session: &Session, renderer: &TerminalRenderer) {
    let status = session.status();
    let step = status
        .step
        .map(format_span)
        .unwrap_or_else(|| "-".to_string());
    renderer.println(format!(
        "{} | {}/{} events ({:.0}%) | rate {} | step {}",
        status.state,
        status.cursor,
        status.total,
        status.progress() * 100.0,
        status.rate,
        step
    ));
}

fn install_interrupt_handler(tx: UnboundedSender<Control>) -> Result<(), CliError> {
    ctrlc::set_handler(move || {
        let _ = tx.send(Control::Interrupt);
    })
    .map_err(|e| CliError::Runtime(format!("Failed to set signal handler: {}", e)))
}

/// Reads stdin lines on a plain thread; the runtime never blocks on input.
fn spawn_input_reader(tx: UnboundedSender<Control>) {
    std::thread::spawn(move || {
        let stdin = std::io::stdin();
        for line in stdin.lock().lines() {
            let Ok(line) = line else { break };
            if let Some(control) = parse_control(&line) {
                if tx.send(control).is_err() {
                    return;
                }
            }
        }
        let _ = tx.send(Control::InputClosed);
    });
}
