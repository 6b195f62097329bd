//! A terminal front end for a storyboard session.

#[macro_use]
extern crate tracing;

mod input;

use std::io::Write as _;
use std::time::Duration;

use anyhow::{Context as _, Result};
use indicatif::{ProgressBar, ProgressStyle};
use input::{Command, InputReader};
use owo_colors::OwoColorize;
use storyboard::core::{PendingOperation, Source, TranscriptEntry};
use storyboard::{Config, Session, SessionBuilder};
use tokio::io::{self, BufReader};
use tokio::select;
use tokio::sync::mpsc;
use tokio::time::sleep;

enum SessionEvent {
    Entry(TranscriptEntry),
    BusyChanged(bool),
}

const BAR_CHAR: &str = "▎";

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let config = Config::from_env().context("failed to load configuration")?;
    debug!("using {config:?}");

    let (event_tx, mut event_rx) = mpsc::unbounded_channel();

    let session = SessionBuilder::with_config(config)
        .on_entry({
            let event_tx = event_tx.clone();
            move |entry, _| {
                event_tx.send(SessionEvent::Entry(entry.clone())).ok();
            }
        })
        .on_busy_changed({
            let event_tx = event_tx.clone();
            move |busy| {
                event_tx.send(SessionEvent::BusyChanged(busy)).ok();
            }
        })
        .build();

    // The greeting has been appended while building the session.
    while let Ok(event) = event_rx.try_recv() {
        if let SessionEvent::Entry(entry) = event {
            print_entry(&entry);
        }
    }

    let progress_style = ProgressStyle::with_template("{spinner} {wide_msg}")
        .context("invalid progress template")?
        .tick_chars("⠋⠙⠹⠸⠼⠴⠦⠧⠇⠏");

    let mut input = InputReader::new(BufReader::new(io::stdin()));

    'outer: loop {
        print!("> ");
        std::io::stdout().flush()?;

        let Some(line) = input.read_entry().await else {
            break;
        };
        let has_options = session.snapshot().await.latest_options().is_some();
        let Some(command) = Command::parse(&line, has_options) else {
            continue;
        };

        let (result, message) = match command {
            Command::Quit => break,
            Command::Show => {
                show_transcript(&session).await;
                continue;
            }
            Command::Usage(usage) => {
                println!("{}{}", BAR_CHAR.bright_yellow(), usage.yellow());
                continue;
            }
            Command::Paste => {
                println!("(end the excerpt with a line holding only \".\")");
                let excerpt = input.read_block().await;
                (session.send_message(&excerpt).await, "🤔 Reading...")
            }
            Command::Choose(number) => {
                (session.choose_option(number).await, "🎨 Drawing...")
            }
            Command::Draw(prompt) => {
                (session.draw(prompt).await, "🎨 Drawing...")
            }
            Command::Send(text) => {
                (session.send_message(text).await, "🤔 Reading...")
            }
        };
        let pending = match result {
            Ok(pending) => pending,
            Err(err) => {
                println!("{}{}", BAR_CHAR.bright_yellow(), err.yellow());
                continue;
            }
        };

        let progress_bar = ProgressBar::new_spinner();
        progress_bar.set_style(progress_style.clone());
        progress_bar.set_message(message);

        loop {
            progress_bar.inc(1);

            let sleep = sleep(Duration::from_millis(100));
            let event = select! {
                event = event_rx.recv() => {
                    let Some(event) = event else {
                        break 'outer;
                    };
                    event
                },
                _ = sleep => {
                    continue;
                }
            };

            match event {
                SessionEvent::Entry(entry) => {
                    if entry.source() != Source::User {
                        progress_bar.suspend(|| print_entry(&entry));
                    }
                }
                SessionEvent::BusyChanged(false) => break,
                SessionEvent::BusyChanged(true) => {}
            }
        }

        progress_bar.finish_and_clear();
        report_failure(pending).await;
    }

    Ok(())
}

async fn report_failure(pending: PendingOperation) {
    if let Some(err) = pending.settled().await.error {
        warn!("{} request failed ({:?}): {}", err.service(), err.kind(), err);
    }
}

async fn show_transcript(session: &Session) {
    let snapshot = session.snapshot().await;
    for entry in &snapshot.entries {
        print_entry(entry);
    }
}

fn print_entry(entry: &TranscriptEntry) {
    match entry.source() {
        Source::User => {
            println!("{}🙂 {}", BAR_CHAR.bright_green(), entry.content());
        }
        Source::PromptBot => {
            let bar = BAR_CHAR.bright_cyan();
            println!("{bar}🤖 {}", entry.content().bright_white());
            let options = entry.options().unwrap_or_default();
            for (i, option) in options.iter().enumerate() {
                println!("{bar}  {}. {option}", (i + 1).bold());
            }
        }
        Source::ImageBot => {
            let bar = BAR_CHAR.bright_magenta();
            match entry.image_ref() {
                Some(image_ref) => {
                    println!("{bar}🖼  {}", image_ref.underline());
                }
                None => {
                    println!("{bar}🎨 {}", entry.content().bright_white());
                }
            }
        }
    }
    println!();
}
