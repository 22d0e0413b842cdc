//! The interactive command loop

use std::fmt;
use std::str::FromStr;
use tracing::{error, info};
use crate::console::address_label;
use crate::context::ClientContext;
use crate::error::ClientResult;
use crate::workflows;

pub const PROMPT: &str = "C4> ";

/// Printed whenever a line is not a known command
pub const VOCABULARY: &str =
    "Options: createGame, createPlayer, listGames, listPlayers, playGame, showBoard, exit";

/// Operator commands
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    CreateGame,
    CreatePlayer,
    ListGames,
    ListPlayers,
    PlayGame,
    ShowBoard,
    Exit,
}

impl Command {
    pub const ALL: [Command; 7] = [
        Command::CreateGame,
        Command::CreatePlayer,
        Command::ListGames,
        Command::ListPlayers,
        Command::PlayGame,
        Command::ShowBoard,
        Command::Exit,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Command::CreateGame => "createGame",
            Command::CreatePlayer => "createPlayer",
            Command::ListGames => "listGames",
            Command::ListPlayers => "listPlayers",
            Command::PlayGame => "playGame",
            Command::ShowBoard => "showBoard",
            Command::Exit => "exit",
        }
    }
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Command {
    type Err = String;

    /// Commands match exactly, after trimming surrounding whitespace
    fn from_str(input: &str) -> Result<Self, Self::Err> {
        let input = input.trim();
        Command::ALL
            .into_iter()
            .find(|command| command.as_str() == input)
            .ok_or_else(|| input.to_string())
    }
}

/// Reads commands one line at a time and runs each to completion before
/// prompting again
#[derive(Debug, Clone)]
pub struct Dispatcher {
    ctx: ClientContext,
}

impl Dispatcher {
    pub fn new(ctx: ClientContext) -> Self {
        Self { ctx }
    }

    /// Run until `exit`, end of input, or session cancellation
    pub async fn run(&self) -> ClientResult<()> {
        loop {
            let line = tokio::select! {
                biased;
                _ = self.ctx.shutdown.cancelled() => {
                    info!("Session cancelled");
                    break;
                }
                line = self.ctx.console.read_line(PROMPT) => line?,
            };

            let Some(line) = line else {
                info!("End of input");
                break;
            };

            match line.parse::<Command>() {
                Ok(Command::Exit) => {
                    self.ctx.print(Command::Exit.as_str());
                    break;
                }
                Ok(command) => {
                    self.ctx.print(command.as_str());
                    self.execute(command).await;
                }
                Err(_) => self.ctx.print(VOCABULARY),
            }
        }

        Ok(())
    }

    /// Run one command. Failures are reported and swallowed so the loop
    /// can carry on.
    pub async fn execute(&self, command: Command) {
        let ctx = &self.ctx;
        let result = match command {
            Command::CreateGame => workflows::create_game(ctx)
                .await
                .map(|address| ctx.print(format!("Deployed game at address: {}", address_label(&address)))),
            Command::CreatePlayer => workflows::create_player(ctx)
                .await
                .map(|address| ctx.print(format!("Deployed player at address: {}", address_label(&address)))),
            Command::ListGames => {
                workflows::list_games(ctx).await;
                Ok(())
            }
            Command::ListPlayers => {
                workflows::list_players(ctx).await;
                Ok(())
            }
            Command::PlayGame => workflows::play_game(ctx).await.map(|_| ()),
            Command::ShowBoard => workflows::show_board(ctx).await.map(|_| ()),
            Command::Exit => Ok(()),
        };

        if let Err(e) = result {
            error!(command = %command, error = %e, "Command failed");
            ctx.print(format!("{} failed: {}", command, e));
        }
    }
}
