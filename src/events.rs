//! Contract events observed by the client
//!
//! Two revisions of the Connect4 ABI are in circulation. They agree on the
//! shape of the events but not on every name: the turn event is emitted as
//! either `NewTurn` or `newTurn`, and the next player is carried under
//! `nextPlayer`, `nextPlayerAddr` or `player`, with a name string beside it
//! in some builds. Decoding looks parameters up by name and type, so a name
//! shared between revisions with different types still resolves.

use ethers::abi::{Abi, Event as AbiEvent, LogParam, RawLog, Token};
use ethers::types::{Address, Log, H256, U256};
use std::fmt;
use crate::error::{ClientError, ClientResult};

/// The three notifications a game emits
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventKind {
    PlayerMoved,
    NewTurn,
    GameEnd,
}

impl EventKind {
    pub const ALL: [EventKind; 3] = [EventKind::PlayerMoved, EventKind::NewTurn, EventKind::GameEnd];

    /// Names the event may carry in the ABI, preferred first
    pub fn abi_names(&self) -> &'static [&'static str] {
        match self {
            EventKind::PlayerMoved => &["PlayerMoved", "playerMoved"],
            EventKind::NewTurn => &["NewTurn", "newTurn"],
            EventKind::GameEnd => &["GameEnd", "gameEnd"],
        }
    }

    /// Find the matching event definition in a contract ABI
    pub fn resolve<'a>(&self, abi: &'a Abi) -> ClientResult<&'a AbiEvent> {
        self.abi_names()
            .iter()
            .find_map(|name| abi.events_by_name(name).ok().and_then(|events| events.first()))
            .ok_or_else(|| ClientError::UnknownEvent(self.abi_names().to_vec()))
    }
}

impl fmt::Display for EventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EventKind::PlayerMoved => write!(f, "PlayerMoved"),
            EventKind::NewTurn => write!(f, "NewTurn"),
            EventKind::GameEnd => write!(f, "GameEnd"),
        }
    }
}

/// Decoded event payload
#[derive(Debug, Clone, PartialEq)]
pub enum GameEvent {
    PlayerMoved {
        game: Address,
        player: Address,
        col: U256,
        row: U256,
    },
    NewTurn {
        game: Address,
        next_player: Address,
        next_player_name: Option<String>,
        /// Player whose move produced this turn change, when the ABI carries it
        mover: Option<Address>,
    },
    GameEnd {
        game: Address,
        winner: Address,
        winner_name: Option<String>,
    },
}

impl GameEvent {
    /// Game contract the event refers to
    pub fn game(&self) -> Address {
        match self {
            GameEvent::PlayerMoved { game, .. } => *game,
            GameEvent::NewTurn { game, .. } => *game,
            GameEvent::GameEnd { game, .. } => *game,
        }
    }

    pub fn kind(&self) -> EventKind {
        match self {
            GameEvent::PlayerMoved { .. } => EventKind::PlayerMoved,
            GameEvent::NewTurn { .. } => EventKind::NewTurn,
            GameEvent::GameEnd { .. } => EventKind::GameEnd,
        }
    }
}

/// A decoded log together with its delivery metadata
#[derive(Debug, Clone, PartialEq)]
pub struct Notification {
    pub event: GameEvent,
    pub tx_hash: Option<H256>,
    /// Set when the log was retracted by a chain reorganisation
    pub removed: bool,
}

/// Decode a raw log emitted by a game contract
pub fn decode_log(kind: EventKind, abi_event: &AbiEvent, log: &Log) -> ClientResult<Notification> {
    let raw = RawLog {
        topics: log.topics.clone(),
        data: log.data.to_vec(),
    };
    let params = abi_event.parse_log(raw)?.params;
    let label = kind_label(kind);

    let game = address_param(&params, &["c4", "game"]).ok_or(ClientError::MissingEventParam {
        event: label,
        param: "c4",
    })?;

    let event = match kind {
        EventKind::PlayerMoved => GameEvent::PlayerMoved {
            game,
            player: address_param(&params, &["player"]).ok_or(ClientError::MissingEventParam {
                event: label,
                param: "player",
            })?,
            col: uint_param(&params, &["col", "column"]).ok_or(ClientError::MissingEventParam {
                event: label,
                param: "col",
            })?,
            row: uint_param(&params, &["row"]).ok_or(ClientError::MissingEventParam {
                event: label,
                param: "row",
            })?,
        },
        EventKind::NewTurn => {
            let (source, next_player) = find_param(&params, &["nextPlayerAddr", "nextPlayer", "player"], is_address)
                .and_then(|p| p.value.clone().into_address().map(|addr| (p.name.as_str(), addr)))
                .ok_or(ClientError::MissingEventParam {
                    event: label,
                    param: "nextPlayer",
                })?;
            // `player` names the mover only when another address carries the next player.
            let mover = match source {
                "player" => None,
                _ => address_param(&params, &["player"]),
            };
            GameEvent::NewTurn {
                game,
                next_player,
                next_player_name: string_param(&params, &["nextPlayerName", "nextPlayer"]),
                mover,
            }
        }
        EventKind::GameEnd => GameEvent::GameEnd {
            game,
            winner: address_param(&params, &["player", "winner"]).ok_or(ClientError::MissingEventParam {
                event: label,
                param: "player",
            })?,
            winner_name: string_param(&params, &["winner", "winnerName"]),
        },
    };

    Ok(Notification {
        event,
        tx_hash: log.transaction_hash,
        removed: log.removed.unwrap_or(false),
    })
}

fn kind_label(kind: EventKind) -> &'static str {
    kind.abi_names()[0]
}

fn find_param<'a>(params: &'a [LogParam], names: &[&str], accepts: fn(&Token) -> bool) -> Option<&'a LogParam> {
    names
        .iter()
        .find_map(|name| params.iter().find(|p| p.name == *name && accepts(&p.value)))
}

fn is_address(token: &Token) -> bool {
    matches!(token, Token::Address(_))
}

fn address_param(params: &[LogParam], names: &[&str]) -> Option<Address> {
    find_param(params, names, is_address).and_then(|p| p.value.clone().into_address())
}

fn uint_param(params: &[LogParam], names: &[&str]) -> Option<U256> {
    match find_param(params, names, |t| matches!(t, Token::Uint(_) | Token::Int(_))).map(|p| &p.value) {
        Some(Token::Uint(value)) | Some(Token::Int(value)) => Some(*value),
        _ => None,
    }
}

fn string_param(params: &[LogParam], names: &[&str]) -> Option<String> {
    find_param(params, names, |t| matches!(t, Token::String(_))).and_then(|p| p.value.clone().into_string())
}
