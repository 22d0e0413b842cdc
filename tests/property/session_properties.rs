//! Property-based tests over random operator sessions

use connect4_client::console::address_label;
use connect4_client::dispatcher::{Dispatcher, VOCABULARY};
use connect4_client::Address;
use proptest::prelude::*;
use crate::mocks::{MockConsole, TestEnv};

#[derive(Debug, Clone)]
enum Step {
    Create(u8),
    Noise(String),
}

fn step_strategy() -> impl Strategy<Value = Step> {
    prop_oneof![
        any::<u8>().prop_map(Step::Create),
        "[a-z ]{0,12}"
            .prop_filter("exit ends the session", |s| s.trim() != "exit")
            .prop_map(Step::Noise),
    ]
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(32))]

    /// listGames shows exactly the created games, in creation order, and
    /// noise lines only ever print the vocabulary
    #[test]
    fn prop_list_games_matches_created_games(steps in proptest::collection::vec(step_strategy(), 0..12)) {
        let mut script: Vec<String> = Vec::new();
        let mut created: Vec<Address> = Vec::new();
        let mut noise = 0;
        for step in &steps {
            match step {
                Step::Create(seed) => {
                    script.push("createGame".to_string());
                    // Distinct address per deployment, independent of the seed's value
                    let mut bytes = [0u8; 20];
                    bytes[0] = *seed;
                    bytes[19] = created.len() as u8;
                    bytes[18] = 0xc4;
                    created.push(Address::from(bytes));
                }
                Step::Noise(text) => {
                    script.push(text.clone());
                    noise += 1;
                }
            }
        }
        script.push("listGames".to_string());

        let lines: Vec<&str> = script.iter().map(String::as_str).collect();
        let (output, sent) = tokio_test::block_on(async {
            let env = TestEnv::new(MockConsole::scripted(&lines)).await;
            env.chain.queue_deploy_addresses(&created);
            Dispatcher::new(env.ctx.clone()).run().await.unwrap();
            (env.console.output(), env.chain.sent().len())
        });

        let listed: Vec<String> = {
            let start = output.iter().rposition(|l| l == "==== List of games ====").unwrap();
            output[start + 1..].to_vec()
        };
        prop_assert_eq!(listed, created.iter().map(address_label).collect::<Vec<_>>());
        prop_assert_eq!(sent, created.len());
        prop_assert_eq!(output.iter().filter(|l| l.as_str() == VOCABULARY).count(), noise);
    }
}
