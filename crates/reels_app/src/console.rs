use reels_core::ReelEvent;
use reels_engine::{Controller, EventSink};
use reels_logging::{reels_info, Lane};
use tokio::io::{AsyncBufReadExt, BufReader};

const HELP: &str =
    "commands: next|n, prev|p, current|c, url, status|s, queue|q, like, save, help, quit";

/// Prints every pipeline event to stdout as one JSON line.
pub struct EventPrinter;

impl EventSink for EventPrinter {
    fn emit(&self, event: &ReelEvent) {
        match serde_json::to_string(event) {
            Ok(line) => println!("event {line}"),
            Err(_) => println!("event {event:?}"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Next,
    Previous,
    Current,
    Url,
    Status,
    Queue,
    Like,
    Save,
    Help,
    Quit,
    Unknown(String),
}

impl Command {
    /// `None` for a blank line.
    pub fn parse(line: &str) -> Option<Self> {
        let word = line.trim();
        let command = match word.to_ascii_lowercase().as_str() {
            "" => return None,
            "next" | "n" => Command::Next,
            "prev" | "previous" | "p" => Command::Previous,
            "current" | "c" => Command::Current,
            "url" => Command::Url,
            "status" | "s" => Command::Status,
            "queue" | "q" => Command::Queue,
            "like" => Command::Like,
            "save" => Command::Save,
            "help" | "h" | "?" => Command::Help,
            "quit" | "exit" => Command::Quit,
            _ => Command::Unknown(word.to_string()),
        };
        Some(command)
    }
}

/// Reads commands from stdin until `quit`, end of input or Ctrl-C.
pub async fn run(controller: &Controller) -> anyhow::Result<()> {
    println!("{HELP}");
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        let line = tokio::select! {
            line = lines.next_line() => line?,
            _ = tokio::signal::ctrl_c() => {
                reels_info!(Lane::Controller, "interrupted");
                None
            }
        };
        let Some(line) = line else {
            break;
        };
        let Some(command) = Command::parse(&line) else {
            continue;
        };
        if command == Command::Quit {
            break;
        }
        execute(controller, command).await;
    }
    Ok(())
}

async fn execute(controller: &Controller, command: Command) {
    match command {
        Command::Next => match controller.go_next().await {
            Ok(index) => println!("index {index}"),
            Err(err) => println!("next failed: {err}"),
        },
        Command::Previous => match controller.go_previous().await {
            Ok(index) => println!("index {index}"),
            Err(err) => println!("prev failed: {err}"),
        },
        Command::Current => match controller.current_item().await {
            Some(id) => println!("current {id}"),
            None => println!("current (none)"),
        },
        Command::Url => match controller.reel_url().await {
            Some(url) => println!("url {url}"),
            None => println!("url (none)"),
        },
        Command::Status => print_json("status", &controller.buffer_status()),
        Command::Queue => print_json("queue", &controller.queue_snapshot()),
        Command::Like => {
            if let Err(err) = controller.like_current().await {
                println!("like failed: {err}");
            }
        }
        Command::Save => {
            if let Err(err) = controller.save_current().await {
                println!("save failed: {err}");
            }
        }
        Command::Help | Command::Quit => println!("{HELP}"),
        Command::Unknown(word) => println!("unknown command `{word}`; {HELP}"),
    }
}

fn print_json<T: serde::Serialize>(label: &str, value: &T) {
    match serde_json::to_string(value) {
        Ok(json) => println!("{label} {json}"),
        Err(err) => println!("{label} unavailable: {err}"),
    }
}
