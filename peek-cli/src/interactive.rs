use std::io;

use camino::Utf8PathBuf;
use log::{debug, warn};
use peek_core::{FileHandle, PreviewDispatcher};
use tokio::{io::{AsyncBufRead, AsyncBufReadExt}, task::JoinSet};

use crate::preview::{guess_type, print_state};

pub const HELP: &str = "commands:\n  \
    select <path> [type]  choose a file, optionally overriding its declared type\n  \
    clear                 drop the current selection\n  \
    upload                start previewing the selected file\n  \
    wait                  wait for every started preview to finish\n  \
    state                 print the current preview\n  \
    quit                  exit";

#[derive(Debug, PartialEq)]
pub enum Command {
    Select { path: Utf8PathBuf, declared_type: Option<String> },
    Clear,
    Upload,
    Wait,
    State,
    Help,
    Quit,
}

impl Command {
    pub fn parse(line: &str) -> Result<Command, String> {
        let mut words = line.split_whitespace();
        let Some(command) = words.next() else {
            return Err("empty command".to_string());
        };

        let command = match command {
            "select" => {
                let path = words.next().ok_or("select needs a path")?;
                Command::Select { path: Utf8PathBuf::from(path), declared_type: words.next().map(str::to_string) }
            },
            "clear" => Command::Clear,
            "upload" => Command::Upload,
            "wait" => Command::Wait,
            "state" => Command::State,
            "help" | "?" => Command::Help,
            "quit" | "exit" => Command::Quit,
            other => return Err(format!("unknown command {:?}, try help", other)),
        };

        match words.next() {
            Some(extra) => Err(format!("unexpected argument {:?}", extra)),
            None => Ok(command),
        }
    }
}

/// Runs commands read from `input` until it ends or `quit` is entered.
///
/// Uploads run in the background, so a new file can be selected while an earlier preview is
/// still decoding. Every state transition is printed by a separate render task. The selection
/// is cleared on exit, releasing any document backing file.
pub async fn interactive<R>(dispatcher: &PreviewDispatcher, input: R) -> io::Result<()>
where
    R: AsyncBufRead + Unpin,
{
    let mut states = dispatcher.subscribe();
    let renderer = tokio::spawn(async move {
        while states.changed().await.is_ok() {
            let state = states.borrow_and_update().clone();
            print_state(&state);
        }
    });

    let mut uploads = JoinSet::new();
    let mut lines = input.lines();
    while let Some(line) = lines.next_line().await? {
        if line.trim().is_empty() {
            continue;
        }

        let command = match Command::parse(&line) {
            Ok(command) => command,
            Err(e) => {
                eprintln!("{}", e);
                continue;
            }
        };
        debug!("Command: {:?}", command);

        match command {
            Command::Select { path, declared_type } => {
                let declared_type = declared_type.unwrap_or_else(|| guess_type(&path));
                println!("selected {} ({})", path, declared_type);
                dispatcher.select(Some(FileHandle::from_path(&path, declared_type)));
            },
            Command::Clear => dispatcher.select(None),
            Command::Upload => {
                uploads.spawn(dispatcher.upload());
            },
            Command::Wait => wait_for(&mut uploads).await,
            Command::State => print_state(&dispatcher.state()),
            Command::Help => println!("{}", HELP),
            Command::Quit => break,
        }
    }

    wait_for(&mut uploads).await;
    dispatcher.select(None);
    renderer.abort();
    Ok(())
}

async fn wait_for(uploads: &mut JoinSet<bool>) {
    while let Some(result) = uploads.join_next().await {
        if let Err(e) = result {
            warn!("Preview task failed: {}", e);
        }
    }
}
