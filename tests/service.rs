use ecovila::{
    actions::Action,
    catalog::Catalog,
    components::BuildingInstance,
    config::{LobbySettings, ResetSettings, ServerConfig},
    lobby::Phase,
    protocol::{Audience, ClientId, ClientMessage, Outbound, ServerMessage},
    service::GameService,
};

const PROFESSOR: ClientId = ClientId(1);
const STUDENT: ClientId = ClientId(2);

fn server_config() -> ServerConfig {
    ServerConfig {
        lobby: LobbySettings {
            threshold: 2,
            grace_seconds: 2,
            start_in_lobby: true,
        },
        seed: Some(42),
        ..ServerConfig::default()
    }
}

fn service() -> GameService {
    GameService::new(server_config(), Catalog::standard())
}

fn register(service: &mut GameService, client: ClientId, name: &str) -> String {
    let out = service.handle(
        client,
        ClientMessage::Register {
            name: name.into(),
            password: "pw".into(),
        },
    );
    match &out[0] {
        Outbound {
            audience: Audience::Only(to),
            message: ServerMessage::Registered { village_id },
        } if *to == client => village_id.clone(),
        other => panic!("unexpected reply {other:?}"),
    }
}

fn started_service() -> GameService {
    let mut service = service();
    service.force_turn();
    assert_eq!(service.phase(), Phase::Active { time_left: 120 });
    service
}

#[test]
fn lobby_counts_down_once_enough_villages_join() {
    let mut service = service();
    register(&mut service, STUDENT, "Ana");

    let out = service.tick();
    assert!(matches!(
        &out[0].message,
        ServerMessage::LobbyTick(status) if status.count == 1 && status.countdown.is_none()
    ));

    register(&mut service, STUDENT, "Bia");
    let out = service.tick();
    assert!(matches!(
        &out[0].message,
        ServerMessage::LobbyTick(status) if status.count == 2 && status.countdown == Some(2)
    ));
    assert_eq!(service.state().lobby_countdown, Some(2));

    service.tick();
    let out = service.tick();
    assert_eq!(out[0].message, ServerMessage::GameStarted);
    assert!(matches!(out[1].message, ServerMessage::StateUpdate(_)));
    assert!(!service.state().is_lobby);
    assert_eq!(service.state().turn_time_left, 120);
}

#[test]
fn timer_expiry_processes_a_turn() {
    let mut service = started_service();
    for _ in 0..119 {
        let out = service.tick();
        assert!(matches!(out[0].message, ServerMessage::Tick(_)));
    }
    assert_eq!(service.state().current_turn, 1);

    let out = service.tick();
    let events: Vec<_> = out.iter().map(|o| &o.message).collect();
    assert!(matches!(events[0], ServerMessage::StateUpdate(state) if state.current_turn == 2));
    assert_eq!(events[1], &ServerMessage::TurnEnded);
    assert_eq!(events[2], &ServerMessage::Tick(120));
}

#[test]
fn client_push_cannot_rewind_the_clock() {
    let mut service = started_service();
    for _ in 0..4 {
        service.force_turn();
    }
    for _ in 0..90 {
        service.tick();
    }
    assert_eq!(service.state().current_turn, 5);
    assert_eq!(service.state().turn_time_left, 30);
    let village_id = register(&mut service, STUDENT, "Ana");

    let mut incoming = service.state().clone();
    incoming.current_turn = 1;
    incoming.turn_time_left = 999;
    incoming.villages[0].coins = 777.0;

    let out = service.handle(STUDENT, ClientMessage::UpdateState(Box::new(incoming)));
    assert_eq!(out.len(), 1);
    assert_eq!(out[0].audience, Audience::AllExcept(STUDENT));
    assert!(!out[0].audience.includes(STUDENT));
    assert!(out[0].audience.includes(PROFESSOR));

    let state = service.state();
    assert_eq!(state.current_turn, 5);
    assert_eq!(state.turn_time_left, 30);
    assert_eq!(state.village(&village_id).unwrap().coins, 777.0);
}

#[test]
fn pushed_pause_flag_freezes_the_timer() {
    let mut service = started_service();
    let mut incoming = service.state().clone();
    incoming.is_paused = true;
    service.update_state(STUDENT, incoming);

    assert_eq!(service.phase(), Phase::Paused { time_left: 120 });
    assert!(service.tick().is_empty());

    service.set_paused(false);
    assert_eq!(service.tick()[0].message, ServerMessage::Tick(119));
}

#[test]
fn forcing_a_turn_while_paused_stays_paused() {
    let mut service = started_service();
    service.set_paused(true);
    let out = service.force_turn();
    assert_eq!(out[1].message, ServerMessage::TurnEnded);
    assert_eq!(service.state().current_turn, 2);
    assert!(service.state().is_paused);
}

#[test]
fn rejected_actions_are_reported_to_the_sender_only() {
    let mut service = started_service();
    let village_id = register(&mut service, STUDENT, "Ana");
    let before = service.state().clone();

    let out = service.handle(
        STUDENT,
        ClientMessage::ApplyAction {
            village_id,
            action: Action::BuyListing {
                listing_id: "nope".into(),
            },
        },
    );
    assert_eq!(out.len(), 1);
    assert_eq!(out[0].audience, Audience::Only(STUDENT));
    assert!(matches!(out[0].message, ServerMessage::ActionRejected { .. }));
    assert_eq!(service.state(), &before);
}

#[test]
fn accepted_actions_broadcast_the_new_state() {
    let mut service = started_service();
    let village_id = register(&mut service, STUDENT, "Ana");

    let out = service.apply_action(
        STUDENT,
        &village_id,
        Action::Build {
            type_id: "woodcutter".into(),
            x: 2,
            y: 3,
        },
    );
    assert_eq!(out[0].audience, Audience::Everyone);
    let village = service.state().village(&village_id).unwrap();
    assert_eq!(village.coins, 350.0);
    assert!(village.building_at(2, 3).is_some());
}

#[test]
fn reserved_and_duplicate_names_are_refused() {
    let mut service = service();
    register(&mut service, STUDENT, "Ana");
    for name in ["Professor", "Ana", "  "] {
        let out = service.register(STUDENT, name, "pw");
        assert_eq!(out.len(), 1, "{name} should be refused");
        assert!(matches!(out[0].message, ServerMessage::ActionRejected { .. }));
    }
    assert_eq!(service.state().villages.len(), 1);
}

#[test]
fn reset_keeps_live_config_by_default() {
    let mut service = started_service();
    register(&mut service, STUDENT, "Ana");
    let mut incoming = service.state().clone();
    incoming.config.turn_duration_seconds = 60;
    service.update_state(PROFESSOR, incoming);
    service.force_turn();

    let out = service.reset();
    assert_eq!(out[0].audience, Audience::Everyone);
    let state = service.state();
    assert_eq!(state.current_turn, 1);
    assert!(state.villages.is_empty());
    assert!(state.market.is_empty());
    assert!(state.is_lobby);
    assert_eq!(state.config.turn_duration_seconds, 60);
    assert_eq!(state.turn_time_left, 60);
}

#[test]
fn reset_can_restore_configured_defaults() {
    let mut service = GameService::new(
        ServerConfig {
            reset: ResetSettings {
                preserve_config: false,
            },
            ..server_config()
        },
        Catalog::standard(),
    );
    let mut incoming = service.state().clone();
    incoming.config.turn_duration_seconds = 60;
    service.update_state(PROFESSOR, incoming);
    assert_eq!(service.state().config.turn_duration_seconds, 60);

    service.reset();
    assert_eq!(service.state().config.turn_duration_seconds, 120);
}

#[test]
fn services_do_not_share_state() {
    let mut first = service();
    let second = service();
    register(&mut first, STUDENT, "Ana");
    first.force_turn();
    first.force_turn();

    assert_eq!(first.state().current_turn, 2);
    assert_eq!(second.state().current_turn, 1);
    assert!(second.state().villages.is_empty());
}

#[test]
fn saturated_cycle_counter_from_a_push_does_not_stop_turns() {
    let mut service = started_service();
    let village_id = register(&mut service, STUDENT, "Ana");

    let mut incoming = service.state().clone();
    incoming.villages[0].buildings.push(BuildingInstance {
        id: "b1".into(),
        type_id: "bakery".into(),
        x: 0,
        y: 0,
        placed_at_turn: 1,
        mode_id: None,
        turns_active: u32::MAX,
    });
    service.handle(STUDENT, ClientMessage::UpdateState(Box::new(incoming)));

    service.force_turn();
    service.force_turn();
    let state = service.state();
    assert_eq!(state.current_turn, 3);
    let bakery = &state.village(&village_id).unwrap().buildings[0];
    assert_eq!(bakery.turns_active, u32::MAX);
    assert_eq!(state.village(&village_id).unwrap().inventory.cake, 0.0);
}
