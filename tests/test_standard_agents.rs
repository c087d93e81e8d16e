use std::path::PathBuf;

use manta_negotiators::builtin::StandardAgent;
use manta_negotiators::decision::{frontier_outcomes, UtilityFunction};
use manta_negotiators::factory::{create_builtin, create_runner, NegotiationSetup};
use manta_negotiators::{
    AgentMut, AgentState, IssueValue, NegotiationStatus, Proposal, Response, Runner,
};

fn setup_path(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("setups")
        .join(name)
}

fn initialized(setup: &NegotiationSetup, idx: usize) -> StandardAgent {
    let config = &setup.agents[idx];
    let mut agent = StandardAgent::new(&config.name, config.params.clone()).unwrap();
    agent.initialize(&setup.negotiation.outcome_space).unwrap();
    agent
}

#[tokio::test]
async fn test_buyer_seller_agreement() {
    let _ = env_logger::builder().is_test(true).try_init();

    let setup = NegotiationSetup::from_file(&setup_path("buyer_seller.yaml")).unwrap();
    let space = setup.negotiation.outcome_space.clone();
    let seller = initialized(&setup, 0);
    let buyer = initialized(&setup, 1);

    let state = create_runner(setup).unwrap().run().await;

    assert_eq!(state.status, NegotiationStatus::Success, "{:?}", state.failure);
    assert!(state.step > 0);
    assert_eq!(state.history.len() as u32, state.step + 1);

    let agreement = state.current_offer.unwrap();
    assert!(agreement.outcomes().all(|outcome| space.is_complete(outcome)));

    // Both sides end up above their reservation value.
    for (agent, min) in [(&seller, 0.5), (&buyer, 0.5)] {
        let utility = &agent.state().unwrap().utility;
        let best = agreement
            .outcomes()
            .map(|outcome| utility.calculate(outcome))
            .fold(f64::NEG_INFINITY, f64::max);
        assert!(best >= min, "{} scored agreement {}", agent.name(), best);
    }

    // Proposals get closer to the other side over time.
    let seller_prices: Vec<f64> = state
        .history
        .iter()
        .filter(|round| round.proposer == "seller")
        .filter_map(|round| round.proposal.outcomes().next())
        .filter_map(|outcome| outcome["price"].as_f64())
        .collect();
    assert!(seller_prices.windows(2).all(|pair| pair[0] >= pair[1]));
}

#[tokio::test]
async fn test_agreement_on_pareto_frontier_of_bundle() {
    let setup = NegotiationSetup::from_file(&setup_path("buyer_seller.yaml")).unwrap();
    let seller = initialized(&setup, 0);
    let buyer = initialized(&setup, 1);

    let state = create_runner(setup).unwrap().run().await;
    assert_eq!(state.status, NegotiationStatus::Success);

    let bundle: Vec<_> = state.current_offer.unwrap().outcomes().cloned().collect();
    let parties: [&dyn UtilityFunction; 2] = [
        &seller.state().unwrap().utility,
        &buyer.state().unwrap().utility,
    ];
    // Seller is indifferent to service level, buyer prefers enterprise.
    let frontier = frontier_outcomes(&bundle, &parties);
    assert_eq!(frontier.len(), 1);
    assert_eq!(frontier[0]["service"], IssueValue::from("enterprise"));
}

#[tokio::test]
async fn test_standard_agent_against_accept_all() {
    let setup = NegotiationSetup::from_file(&setup_path("buyer_seller.yaml")).unwrap();
    let buyer = &setup.agents[1];

    let state = Runner::new(setup.negotiation.clone())
        .add_agent("buyer", create_builtin("StandardAgent", buyer.params.clone()).unwrap())
        .add_agent(
            "accept-all",
            create_builtin("AcceptAll", serde_yaml::Value::Null).unwrap(),
        )
        .run()
        .await;

    assert_eq!(state.status, NegotiationStatus::Success);
    assert_eq!(state.step, 0);
    match state.current_offer.unwrap() {
        Proposal::Single(outcome) => {
            assert!(setup.negotiation.outcome_space.is_complete(&outcome))
        }
        Proposal::Bundle(outcomes) => assert!(outcomes.len() <= 3),
    }
}

#[tokio::test]
async fn test_accept_all_never_proposes() {
    let setup = NegotiationSetup::from_file(&setup_path("buyer_seller.yaml")).unwrap();

    let state = Runner::new(setup.negotiation)
        .add_agent(
            "accept-all",
            create_builtin("AcceptAll", serde_yaml::Value::Null).unwrap(),
        )
        .add_agent(
            "seller",
            create_builtin("StandardAgent", setup.agents[0].params.clone()).unwrap(),
        )
        .run()
        .await;

    assert_eq!(state.status, NegotiationStatus::Broken);
    assert!(state.history.is_empty());
}

#[test]
fn test_standard_agent_mut_contract() {
    let setup = NegotiationSetup::from_file(&setup_path("buyer_seller.yaml")).unwrap();
    let mut seller = initialized(&setup, 0);

    let state = AgentState {
        step: 0,
        max_steps: setup.negotiation.max_steps,
        wall_time: chrono::Utc::now(),
        relative_time: 0.0,
        current_offer: None,
        history: vec![],
        outcome_space: std::sync::Arc::new(setup.negotiation.outcome_space.clone()),
    };
    let result = seller.propose(&state).unwrap();
    assert_eq!(result.response, Response::Offer);
    assert_eq!(result.proposal.unwrap().len(), 3);
}
