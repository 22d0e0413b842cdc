use anyhow::Result;
use async_trait::async_trait;
use colored::*;
use connect4_client::{ClientError, ClientResult, Console};
use rustyline::error::ReadlineError;
use rustyline::DefaultEditor;
use std::path::PathBuf;
use std::sync::mpsc as std_mpsc;
use std::thread;
use tokio::sync::{mpsc, oneshot};
use tracing::{debug, warn};

use crate::config::ReplConfig;

struct LineRequest {
    prompt: String,
    reply: oneshot::Sender<ClientResult<Option<String>>>,
}

/// Terminal console backed by a rustyline editor.
///
/// The editor lives on its own thread; `read_line` hands it a prompt and
/// awaits the answer, so printing from event handlers never waits on input.
pub struct TerminalConsole {
    requests: mpsc::UnboundedSender<LineRequest>,
}

impl TerminalConsole {
    pub fn new(config: ReplConfig) -> Result<Self> {
        let (requests, receiver) = mpsc::unbounded_channel();
        let (ready_tx, ready_rx) = std_mpsc::channel();

        thread::Builder::new()
            .name("c4-line-editor".to_string())
            .spawn(move || {
                let editor = match open_editor(&config) {
                    Ok(editor) => {
                        let _ = ready_tx.send(Ok(()));
                        editor
                    }
                    Err(e) => {
                        let _ = ready_tx.send(Err(e));
                        return;
                    }
                };
                serve_lines(editor, receiver, config.history_file);
            })?;

        ready_rx.recv()??;
        Ok(Self { requests })
    }

    pub fn display_welcome(&self, provider_url: &str) {
        println!("{}", "Connect4 on-chain client".bright_blue().bold());
        println!("{}", format!("Connected to {}", provider_url).cyan());
        println!("{}", "Type a command, or anything else for the list of options".dimmed());
        println!();
    }
}

fn open_editor(config: &ReplConfig) -> rustyline::Result<DefaultEditor> {
    let editor_config = rustyline::Config::builder()
        .max_history_size(config.max_history)?
        .build();
    let mut editor = DefaultEditor::with_config(editor_config)?;

    // Load history if configured
    if let Some(history_file) = &config.history_file {
        let _ = editor.load_history(history_file);
    }

    Ok(editor)
}

fn serve_lines(
    mut editor: DefaultEditor,
    mut receiver: mpsc::UnboundedReceiver<LineRequest>,
    history_file: Option<PathBuf>,
) {
    while let Some(request) = receiver.blocking_recv() {
        let result = match editor.readline(&request.prompt) {
            Ok(line) => {
                if !line.trim().is_empty() {
                    let _ = editor.add_history_entry(line.as_str());
                    if let Some(path) = &history_file {
                        if let Err(e) = editor.save_history(path) {
                            warn!(path = %path.display(), error = %e, "Failed to save history");
                        }
                    }
                }
                Ok(Some(line))
            }
            Err(ReadlineError::Eof) | Err(ReadlineError::Interrupted) => Ok(None),
            Err(e) => Err(ClientError::Console(e.to_string())),
        };

        if request.reply.send(result).is_err() {
            debug!("Line read after the session stopped waiting");
        }
    }
}

#[async_trait]
impl Console for TerminalConsole {
    async fn read_line(&self, prompt: &str) -> ClientResult<Option<String>> {
        let (reply, answer) = oneshot::channel();
        self.requests
            .send(LineRequest {
                prompt: prompt.to_string(),
                reply,
            })
            .map_err(|_| ClientError::Console("line editor stopped".to_string()))?;

        answer
            .await
            .map_err(|_| ClientError::Console("line editor stopped".to_string()))?
    }

    fn print_line(&self, line: &str) {
        let styled = match LineStyle::of(line) {
            LineStyle::Failure => line.red(),
            LineStyle::Victory => line.green().bold(),
            LineStyle::Event => line.cyan(),
            LineStyle::Heading => line.bold(),
            LineStyle::Hint => line.yellow(),
            LineStyle::Plain => line.normal(),
        };
        println!("{}", styled);
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum LineStyle {
    Failure,
    Victory,
    Event,
    Heading,
    Hint,
    Plain,
}

impl LineStyle {
    fn of(line: &str) -> Self {
        if line.contains(" failed: ") || line.contains("] Error: ") {
            LineStyle::Failure
        } else if line.starts_with("[GameEnd]") {
            LineStyle::Victory
        } else if line.starts_with('[') {
            LineStyle::Event
        } else if line.starts_with("====") {
            LineStyle::Heading
        } else if line.starts_with("Options:") {
            LineStyle::Hint
        } else {
            LineStyle::Plain
        }
    }
}
