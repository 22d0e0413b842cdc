//! Operator-driven workflows: deployment, listing and the play pipeline

use ethers::abi::{Abi, Token};
use ethers::types::{Address, TransactionReceipt, U256};
use std::fmt;
use std::sync::Arc;
use tracing::{debug, info};
use crate::artifact::ContractArtifact;
use crate::chain::ContractCall;
use crate::console::address_label;
use crate::context::ClientContext;
use crate::error::{ClientError, ClientResult};
use crate::registry::PlayerHandle;
use crate::subscriber::EventSubscriber;

pub const BOARD_ROWS: usize = 6;
pub const BOARD_COLS: usize = 7;

/// Prompt for one line, treating end of input as an error
pub async fn prompt(ctx: &ClientContext, prompt: &str) -> ClientResult<String> {
    ctx.console
        .read_line(prompt)
        .await?
        .ok_or_else(|| ClientError::Console("input closed".to_string()))
}

/// Parse an operator-supplied address
pub fn parse_address(field: &str, input: &str) -> ClientResult<Address> {
    input
        .trim()
        .parse::<Address>()
        .map_err(|e| ClientError::invalid_input(field, format!("'{}' is not an address: {}", input.trim(), e)))
}

/// Deploy a fresh game contract and record it
pub async fn create_game(ctx: &ClientContext) -> ClientResult<Address> {
    let artifact = ContractArtifact::load(&ctx.config.contracts.game_artifact).await?;
    let address = ctx.chain.deploy(&artifact, Vec::new(), &ctx.tx_params()).await?;

    ctx.registry.lock().await.insert_game(address);
    info!(game = ?address, contract = artifact.display_name(), "Deployed game");
    Ok(address)
}

/// Deploy a player contract bound to a name and a game
pub async fn create_player(ctx: &ClientContext) -> ClientResult<Address> {
    let artifact = ContractArtifact::load(&ctx.config.contracts.player_artifact).await?;

    let name = prompt(ctx, "Player name> ").await?;
    ctx.print(format!("Name is: {}", name));
    let game_input = prompt(ctx, "Game address> ").await?;
    ctx.print(format!("Game is: {}", game_input.trim()));
    let game = parse_address("game address", &game_input)?;

    let args = vec![Token::String(name.clone()), Token::Address(game)];
    let address = ctx.chain.deploy(&artifact, args, &ctx.tx_params()).await?;

    ctx.registry.lock().await.insert_player(PlayerHandle {
        address,
        name: name.clone(),
        game,
    });
    info!(player = ?address, name = %name, game = ?game, "Deployed player");
    Ok(address)
}

/// Print every known game in creation order
pub async fn list_games(ctx: &ClientContext) -> Vec<Address> {
    let games = ctx.registry.lock().await.game_addresses();
    ctx.print("==== List of games ====");
    for game in &games {
        ctx.print(address_label(game));
    }
    games
}

/// Print every player deployed in this session
pub async fn list_players(ctx: &ClientContext) -> Vec<PlayerHandle> {
    let players = ctx.registry.lock().await.players().to_vec();
    ctx.print("==== List of players ====");
    for player in &players {
        ctx.print(format!(
            "{} {} (game {})",
            address_label(&player.address),
            player.name,
            address_label(&player.game)
        ));
    }
    players
}

/// Prompt for a game address and make it the game being played
pub async fn select_game(ctx: &ClientContext) -> ClientResult<Address> {
    let input = prompt(ctx, "Game address> ").await?;
    ctx.print(format!("Game address is: {}", input.trim()));
    let game = parse_address("game address", &input)?;

    ctx.registry.lock().await.select_game(game);
    debug!(game = ?game, "Selected game");
    Ok(game)
}

/// Which seat a player is registered for
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlayerSlot {
    One,
    Two,
}

impl PlayerSlot {
    fn setter(&self) -> &'static str {
        match self {
            PlayerSlot::One => "setPlayer1",
            PlayerSlot::Two => "setPlayer2",
        }
    }
}

impl fmt::Display for PlayerSlot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PlayerSlot::One => write!(f, "Player1"),
            PlayerSlot::Two => write!(f, "Player2"),
        }
    }
}

/// Prompt for a player address and register it on the game, waiting for
/// the transaction to be confirmed. The player's gas tally starts at zero.
pub async fn set_player(
    ctx: &ClientContext,
    game_abi: &Arc<Abi>,
    game: Address,
    slot: PlayerSlot,
) -> ClientResult<TransactionReceipt> {
    let input = prompt(ctx, &format!("{} address> ", slot)).await?;
    ctx.print(format!("{} address is: {}", slot, input.trim()));
    let player = parse_address(&format!("{} address", slot), &input)?;

    let call = ContractCall::new(game, game_abi.clone(), slot.setter()).arg(Token::Address(player));
    let receipt = ctx.chain.send_confirmed(&call, &ctx.tx_params()).await?;

    {
        let mut registry = ctx.registry.lock().await;
        let handle = registry.insert_game(game);
        match slot {
            PlayerSlot::One => handle.player1 = Some(player),
            PlayerSlot::Two => handle.player2 = Some(player),
        }
        handle.gas.register(player);
    }

    ctx.print(format!("{} set in block {}", slot, block_label(&receipt)));
    info!(game = ?game, player = ?player, slot = %slot, tx_hash = ?receipt.transaction_hash, "Player registered");
    Ok(receipt)
}

/// Start the game and wait for confirmation
pub async fn init_game(ctx: &ClientContext, game_abi: &Arc<Abi>, game: Address) -> ClientResult<TransactionReceipt> {
    let call = ContractCall::new(game, game_abi.clone(), "initGame");
    let receipt = ctx.chain.send_confirmed(&call, &ctx.tx_params()).await?;

    ctx.print(format!("Game initialised in block {}", block_label(&receipt)));
    info!(game = ?game, tx_hash = ?receipt.transaction_hash, "Game initialised");

    let seats = ctx.registry.lock().await.game(&game).map(|handle| (handle.player1, handle.player2));
    if let Some((Some(player1), Some(player2))) = seats {
        ctx.print(format!("Playing {} against {}", address_label(&player1), address_label(&player2)));
    }
    Ok(receipt)
}

/// Select a game, subscribe to its events, seat both players and start it.
/// Steps run strictly in order; the first failure aborts the rest.
pub async fn play_game(ctx: &ClientContext) -> ClientResult<Address> {
    let game_artifact = ContractArtifact::load(&ctx.config.contracts.game_artifact).await?;
    let player_artifact = ContractArtifact::load(&ctx.config.contracts.player_artifact).await?;

    let game = select_game(ctx).await?;
    EventSubscriber::new(ctx.clone(), game_artifact.abi.clone(), player_artifact.abi.clone())
        .subscribe_game(game)
        .await?;
    set_player(ctx, &game_artifact.abi, game, PlayerSlot::One).await?;
    set_player(ctx, &game_artifact.abi, game, PlayerSlot::Two).await?;
    init_game(ctx, &game_artifact.abi, game).await?;

    Ok(game)
}

/// Snapshot of a game's public state
#[derive(Debug, Clone, PartialEq)]
pub struct BoardView {
    pub game: Address,
    /// Accessor name and rendered value, for the accessors the ABI exposes
    pub fields: Vec<(&'static str, String)>,
    /// Rows top (highest index) first
    pub rows: Vec<String>,
}

const STATUS_ACCESSORS: [&str; 5] = ["player1", "player2", "turn", "winner", "end"];

/// Prompt for a game and print its players, turn, result and grid
pub async fn show_board(ctx: &ClientContext) -> ClientResult<BoardView> {
    let artifact = ContractArtifact::load(&ctx.config.contracts.game_artifact).await?;
    let input = prompt(ctx, "Game address> ").await?;
    let game = parse_address("game address", &input)?;
    let abi = artifact.abi.clone();

    let mut fields = Vec::new();
    let mut player1 = None;
    let mut player2 = None;
    for accessor in STATUS_ACCESSORS {
        if abi.function(accessor).is_err() {
            continue;
        }
        let output = ctx.chain.call(&ContractCall::new(game, abi.clone(), accessor)).await?;
        let value = output.first().cloned();
        match (accessor, &value) {
            ("player1", Some(Token::Address(addr))) => player1 = Some(*addr),
            ("player2", Some(Token::Address(addr))) => player2 = Some(*addr),
            _ => {}
        }
        fields.push((accessor, value.as_ref().map(token_label).unwrap_or_default()));
    }

    let mut rows = Vec::new();
    if abi.function("board").is_ok() {
        for row in (0..BOARD_ROWS).rev() {
            let mut line = String::with_capacity(BOARD_COLS * 2);
            for col in 0..BOARD_COLS {
                let call = ContractCall::new(game, abi.clone(), "board")
                    .arg(Token::Uint(U256::from(row as u64)))
                    .arg(Token::Uint(U256::from(col as u64)));
                let output = ctx.chain.call(&call).await?;
                line.push(cell_symbol(output.first(), player1, player2));
                line.push(' ');
            }
            rows.push(line.trim_end().to_string());
        }
    }

    ctx.print(format!("==== Game {} ====", address_label(&game)));
    for (name, value) in &fields {
        ctx.print(format!("{}: {}", name, value));
    }
    for row in &rows {
        ctx.print(row);
    }

    Ok(BoardView { game, fields, rows })
}

fn block_label(receipt: &TransactionReceipt) -> String {
    receipt
        .block_number
        .map(|n| n.to_string())
        .unwrap_or_else(|| "pending".to_string())
}

/// Human rendering of a returned value
pub fn token_label(token: &Token) -> String {
    match token {
        Token::Address(addr) => address_label(addr),
        Token::Uint(value) | Token::Int(value) => value.to_string(),
        Token::Bool(b) => b.to_string(),
        Token::String(s) => s.clone(),
        other => format!("{:?}", other),
    }
}

/// One board cell: `.` empty, `1`/`2` for the seated players, `?` otherwise
pub fn cell_symbol(token: Option<&Token>, player1: Option<Address>, player2: Option<Address>) -> char {
    match token {
        Some(Token::Address(addr)) if addr.is_zero() => '.',
        Some(Token::Address(addr)) if Some(*addr) == player1 => '1',
        Some(Token::Address(addr)) if Some(*addr) == player2 => '2',
        Some(Token::Uint(value)) if value.is_zero() => '.',
        Some(Token::Uint(value)) if *value == U256::from(1u64) => '1',
        Some(Token::Uint(value)) if *value == U256::from(2u64) => '2',
        _ => '?',
    }
}
