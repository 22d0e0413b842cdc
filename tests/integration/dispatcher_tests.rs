//! Command loop behaviour against a mock node

use connect4_client::console::address_label;
use connect4_client::dispatcher::{Dispatcher, PROMPT, VOCABULARY};
use connect4_client::Address;
use ethers::abi::Token;
use crate::mocks::{operator, MockConsole, SentTx, TestEnv};

async fn run_script(env: &TestEnv) {
    Dispatcher::new(env.ctx.clone()).run().await.unwrap();
}

#[tokio::test]
async fn test_unrecognized_command_prints_vocabulary_without_side_effects() {
    let env = TestEnv::new(MockConsole::scripted(&["dance", "  ", "exit"])).await;
    run_script(&env).await;

    assert_eq!(env.console.count(VOCABULARY), 2);
    assert!(env.chain.sent().is_empty());
    let registry = env.ctx.registry.lock().await;
    assert!(registry.game_addresses().is_empty());
    assert!(registry.players().is_empty());
    assert_eq!(env.console.output().last().map(String::as_str), Some("exit"));
}

#[tokio::test]
async fn test_create_game_then_list_prints_exactly_that_address() {
    let game: Address = "0xaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaa".parse().unwrap();
    let env = TestEnv::new(MockConsole::scripted(&["createGame", "listGames", "exit"])).await;
    env.chain.queue_deploy_addresses(&[game]);

    run_script(&env).await;

    assert!(env
        .console
        .output()
        .contains(&format!("Deployed game at address: {}", address_label(&game))));
    assert_eq!(
        env.console.output_after("==== List of games ===="),
        vec![address_label(&game), "exit".to_string()]
    );
    assert_eq!(
        env.chain.sent(),
        vec![SentTx::Deploy {
            contract: Some("Connect4".to_string()),
            args: vec![],
            from: operator(),
        }]
    );
}

#[tokio::test]
async fn test_list_games_keeps_creation_order() {
    let games = [Address::repeat_byte(0x30), Address::repeat_byte(0x10), Address::repeat_byte(0x20)];
    let env = TestEnv::new(MockConsole::scripted(&[
        "createGame",
        "createGame",
        "bogus",
        "createGame",
        "listGames",
    ]))
    .await;
    env.chain.queue_deploy_addresses(&games);

    run_script(&env).await;

    let listed = env.console.output_after("==== List of games ====");
    assert_eq!(listed, games.iter().map(address_label).collect::<Vec<_>>());
}

#[tokio::test]
async fn test_create_player_records_name_and_game() {
    let game = Address::repeat_byte(0xaa);
    let player = Address::repeat_byte(0x11);
    let game_input = format!("{:?}", game);
    let env = TestEnv::new(MockConsole::scripted(&[
        "createPlayer",
        "alice",
        &game_input,
        "listPlayers",
        "exit",
    ]))
    .await;
    env.chain.queue_deploy_addresses(&[player]);

    run_script(&env).await;

    assert_eq!(
        env.chain.sent(),
        vec![SentTx::Deploy {
            contract: Some("Player".to_string()),
            args: vec![Token::String("alice".to_string()), Token::Address(game)],
            from: operator(),
        }]
    );

    let registry = env.ctx.registry.lock().await;
    let recorded = registry.player(&player).unwrap();
    assert_eq!(recorded.name, "alice");
    assert_eq!(recorded.game, game);

    let output = env.console.output();
    assert!(output.contains(&"Name is: alice".to_string()));
    assert!(output.contains(&format!("Deployed player at address: {}", address_label(&player))));
    assert!(output.contains(&format!(
        "{} alice (game {})",
        address_label(&player),
        address_label(&game)
    )));
    assert_eq!(
        env.console.prompts(),
        vec![PROMPT, "Player name> ", "Game address> ", PROMPT, PROMPT]
    );
}

#[tokio::test]
async fn test_invalid_game_address_aborts_player_creation() {
    let env = TestEnv::new(MockConsole::scripted(&["createPlayer", "bob", "not-an-address", "exit"])).await;
    run_script(&env).await;

    assert!(env.chain.sent().is_empty());
    assert!(env.ctx.registry.lock().await.players().is_empty());
    assert!(env
        .console
        .output()
        .iter()
        .any(|line| line.starts_with("createPlayer failed: Invalid input for game address")));
}

#[tokio::test]
async fn test_failed_deployment_is_reported_and_loop_continues() {
    let env = TestEnv::new(MockConsole::scripted(&["createGame", "listGames", "exit"])).await;
    env.chain.fail_function("deploy");

    run_script(&env).await;

    let output = env.console.output();
    assert!(output.iter().any(|line| line.starts_with("createGame failed:")));
    assert!(env.console.output_after("==== List of games ====") == vec!["exit".to_string()]);
}

#[tokio::test]
async fn test_missing_artifact_is_reported() {
    let env = TestEnv::with_config(MockConsole::scripted(&["createGame", "exit"]), |config| {
        config.contracts.game_artifact = "/nonexistent/build/Connect4.json".into();
    })
    .await;

    run_script(&env).await;

    assert!(env
        .console
        .output()
        .iter()
        .any(|line| line.starts_with("createGame failed: Failed to read contract artifact")));
    assert!(env.chain.sent().is_empty());
}

#[tokio::test]
async fn test_end_of_input_stops_the_loop() {
    let env = TestEnv::new(MockConsole::scripted(&[])).await;
    run_script(&env).await;

    assert!(env.console.output().is_empty());
    assert_eq!(env.console.prompts(), vec![PROMPT]);
}

#[tokio::test]
async fn test_show_board_renders_grid_and_status() {
    let game = Address::repeat_byte(0xaa);
    let p1 = Address::repeat_byte(0x01);
    let game_input = format!("{:?}", game);
    let env = TestEnv::new(MockConsole::scripted(&["showBoard", &game_input, "exit"])).await;
    env.chain.set_call_result("player1", vec![Token::Address(p1)]);
    env.chain.set_call_result("player2", vec![Token::Address(Address::repeat_byte(0x02))]);
    env.chain.set_call_result("turn", vec![Token::Address(p1)]);
    env.chain.set_call_result("end", vec![Token::Bool(false)]);
    env.chain.set_call_result("board", vec![Token::Address(p1)]);

    run_script(&env).await;

    let output = env.console.output();
    assert!(output.contains(&format!("player1: {}", address_label(&p1))));
    assert!(output.contains(&"end: false".to_string()));
    assert_eq!(output.iter().filter(|line| line.as_str() == "1 1 1 1 1 1 1").count(), 6);

    let board_calls = env
        .chain
        .calls()
        .into_iter()
        .filter(|(_, function, _)| function == "board")
        .count();
    assert_eq!(board_calls, 42);
}
