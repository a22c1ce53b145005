use ecovila::{
    actions,
    catalog::Catalog,
    components::{BuildingInstance, LoanKind, ResourceKind, ResourceMap},
    engine::Engine,
    world::GameState,
};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

fn state_with_village(name: &str) -> (GameState, String) {
    let mut state = GameState::default();
    let mut rng = ChaCha8Rng::seed_from_u64(7);
    let id = actions::register(&mut state, &mut rng, name, "secret").unwrap();
    // Neutral terrain so production amounts are the catalog values.
    state.village_mut(&id).unwrap().terrain_bonuses = ResourceMap::new();
    (state, id)
}

fn place(state: &mut GameState, village_id: &str, type_id: &str, x: i32) -> String {
    let building_id = format!("{type_id}-{x}");
    state.village_mut(village_id).unwrap().coins = 10_000.0;
    actions::build(
        state,
        &Catalog::standard(),
        village_id,
        type_id,
        x,
        0,
        building_id.clone(),
    )
    .unwrap();
    building_id
}

fn advance(engine: &mut Engine, state: GameState, turns: usize) -> GameState {
    (0..turns).fold(state, |state, _| engine.advance(&state).unwrap())
}

#[test]
fn turn_counter_advances_and_villages_are_stamped() {
    let (state, id) = state_with_village("Ana");
    let mut engine = Engine::standard(Catalog::standard());

    let next = engine.advance(&state).unwrap();
    assert_eq!(state.current_turn, 1);
    assert_eq!(next.current_turn, 2);
    assert_eq!(next.village(&id).unwrap().last_turn_processed, 2);
}

#[test]
fn terrain_bonus_is_applied_and_floored() {
    let (mut state, id) = state_with_village("Ana");
    place(&mut state, &id, "woodcutter", 0);
    state
        .village_mut(&id)
        .unwrap()
        .terrain_bonuses
        .insert(ResourceKind::Wood, 25.0);

    let mut engine = Engine::standard(Catalog::standard());
    let next = engine.advance(&state).unwrap();
    // 10 * 1.25 = 12.5, floored.
    assert_eq!(next.village(&id).unwrap().inventory.wood, 512.0);
}

#[test]
fn short_inputs_keep_accumulating_until_paid() {
    let (mut state, id) = state_with_village("Ana");
    let kiln = place(&mut state, &id, "charcoal_kiln", 0);
    state.village_mut(&id).unwrap().inventory.wood = 5.0;

    let mut engine = Engine::standard(Catalog::standard());
    let mut state = advance(&mut engine, state, 4);
    {
        let village = state.village(&id).unwrap();
        assert_eq!(village.inventory.coal, 0.0);
        assert_eq!(village.inventory.wood, 5.0);
        assert_eq!(village.building(&kiln).unwrap().turns_active, 4);
    }

    state.village_mut(&id).unwrap().inventory.wood = 15.0;
    let state = engine.advance(&state).unwrap();
    let village = state.village(&id).unwrap();
    assert_eq!(village.inventory.coal, 5.0);
    assert_eq!(village.inventory.wood, 5.0);
    assert_eq!(village.building(&kiln).unwrap().turns_active, 0);
}

#[test]
fn selected_mode_drives_production() {
    let (mut state, id) = state_with_village("Ana");
    let mill = place(&mut state, &id, "steel_mill", 0);
    actions::change_mode(&mut state, &Catalog::standard(), &id, &mill, "nails").unwrap();
    {
        let inventory = &mut state.village_mut(&id).unwrap().inventory;
        inventory.iron = 100.0;
        inventory.coal = 100.0;
    }

    let mut engine = Engine::standard(Catalog::standard());
    let state = advance(&mut engine, state, 6);
    let village = state.village(&id).unwrap();
    assert_eq!(village.inventory.nails, 210.0);
    assert_eq!(village.inventory.iron, 50.0);
    assert_eq!(village.inventory.iron_beams, 250.0);
}

#[test]
fn inventories_never_go_negative() {
    let (mut state, id) = state_with_village("Ana");
    for (x, type_id) in ["charcoal_kiln", "mill", "sugar_refinery", "dairy_factory", "bakery"]
        .into_iter()
        .enumerate()
    {
        place(&mut state, &id, type_id, x as i32);
    }
    state.village_mut(&id).unwrap().inventory.wood = 25.0;

    let mut engine = Engine::standard(Catalog::standard());
    let state = advance(&mut engine, state, 30);
    let village = state.village(&id).unwrap();
    for kind in ResourceKind::ALL {
        assert!(village.inventory.get(kind) >= 0.0, "{kind:?} went negative");
    }
    assert_eq!(village.inventory.coal, 10.0);
}

#[test]
fn loans_accrue_once_per_turn() {
    let (mut state, id) = state_with_village("Ana");
    actions::take_loan(&mut state, &id, 1000.0, LoanKind::Simple, "simple".into()).unwrap();
    actions::take_loan(&mut state, &id, 1000.0, LoanKind::Compound, "compound".into()).unwrap();
    assert_eq!(state.village(&id).unwrap().coins, 2500.0);

    let mut engine = Engine::standard(Catalog::standard());
    let state = advance(&mut engine, state, 2);
    let loans = &state.village(&id).unwrap().loans;
    assert_eq!(loans[0].remaining_amount, 1100.0);
    assert!((loans[1].remaining_amount - 1102.5).abs() < 1e-9);
}

#[test]
fn system_stock_replenishes_up_to_its_cap() {
    let mut state = GameState::default();
    state.system_market_stock.wood = 98.0;
    state.system_market_stock.iron = 0.0;
    state.system_market_stock.cake = 3.0;

    let mut engine = Engine::standard(Catalog::standard());
    let state = engine.advance(&state).unwrap();
    assert_eq!(state.system_market_stock.wood, 100.0);
    assert_eq!(state.system_market_stock.iron, 2.0);
    // No generation rate: untouched.
    assert_eq!(state.system_market_stock.cake, 3.0);

    for kind in ResourceKind::ALL {
        let cap = state.config.system_market.max_stock(kind);
        if state.config.system_market.generation_rates.contains_key(&kind) {
            assert!(state.system_market_stock.get(kind) <= cap, "{kind:?} above cap");
        }
    }
}

#[test]
fn unknown_building_types_pass_through_untouched() {
    let (mut state, id) = state_with_village("Ana");
    place(&mut state, &id, "woodcutter", 0);
    let ghost = BuildingInstance {
        id: "ghost-1".into(),
        type_id: "ghost".into(),
        x: 5,
        y: 5,
        placed_at_turn: 1,
        mode_id: None,
        turns_active: 2,
    };
    state.village_mut(&id).unwrap().buildings.push(ghost.clone());

    let mut engine = Engine::standard(Catalog::standard());
    let next = engine.advance(&state).unwrap();
    let village = next.village(&id).unwrap();
    assert_eq!(next.current_turn, 2);
    assert_eq!(village.building("ghost-1"), Some(&ghost));
    assert_eq!(village.inventory.wood, 510.0);
}
