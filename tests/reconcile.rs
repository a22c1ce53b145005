use ecovila::{
    components::ResourceKind,
    reconcile::{Field, MergePolicy},
    world::GameState,
};

fn authoritative() -> GameState {
    let mut state = GameState::default();
    state.current_turn = 5;
    state.turn_time_left = 30;
    state.is_lobby = false;
    state.system_market_stock.iron = 7.0;
    state
}

fn stale_push() -> GameState {
    let mut incoming = GameState::default();
    incoming.current_turn = 1;
    incoming.turn_time_left = 999;
    incoming.is_lobby = true;
    incoming.lobby_countdown = Some(3);
    incoming.is_paused = true;
    incoming.system_market_stock.iron = 0.0;
    incoming.config.initial_coins = 900.0;
    incoming
}

#[test]
fn server_keeps_clock_fields_and_adopts_the_rest() {
    let merged = MergePolicy::default().merge(&authoritative(), stale_push());

    assert_eq!(merged.current_turn, 5);
    assert_eq!(merged.turn_time_left, 30);
    assert!(!merged.is_lobby);
    assert_eq!(merged.lobby_countdown, None);

    assert!(merged.is_paused);
    assert_eq!(merged.system_market_stock.get(ResourceKind::Iron), 0.0);
    assert_eq!(merged.config.initial_coins, 900.0);
}

#[test]
fn owning_system_stock_protects_it_from_pushes() {
    let policy = MergePolicy::with_system_stock(true);
    assert!(policy.is_server_owned(Field::SystemMarketStock));

    let merged = policy.merge(&authoritative(), stale_push());
    assert_eq!(merged.system_market_stock.iron, 7.0);
    assert_eq!(merged.current_turn, 5);
}

#[test]
fn every_field_is_either_owned_or_proposed() {
    let policy = MergePolicy::new([Field::Villages, Field::CurrentTurn]);
    let proposed = policy.client_proposed();
    assert_eq!(proposed.len() + policy.server_owned().len(), Field::ALL.len());
    assert!(!proposed.contains(&Field::Villages));
    assert!(proposed.contains(&Field::Market));
}
