//! The state-owning game service.
//!
//! [`GameService`] holds the one authoritative [`GameState`] of a game
//! together with everything that mutates it. It is synchronous and owns no
//! I/O: every entry point returns the messages to fan out, and the caller
//! (the web runtime, or a test) decides how to deliver them.

use tracing::{error, info, warn};

use crate::{
    actions::{self, Action},
    catalog::Catalog,
    config::{GameConfig, ResetSettings, ServerConfig},
    engine::Engine,
    lobby::{ClockEvent, ForceOutcome, Phase, TurnClock},
    protocol::{ClientId, ClientMessage, LobbyStatus, Outbound, ServerMessage},
    reconcile::{Field, MergePolicy},
    rng::RngManager,
    world::GameState,
};

pub struct GameService {
    state: GameState,
    engine: Engine,
    clock: TurnClock,
    policy: MergePolicy,
    rng: RngManager,
    defaults: GameConfig,
    reset: ResetSettings,
}

impl GameService {
    pub fn new(config: ServerConfig, catalog: Catalog) -> Self {
        let ServerConfig {
            game,
            lobby,
            reset,
            reconciliation,
            seed,
        } = config;
        let clock = TurnClock::new(lobby, game.turn_duration_seconds);
        let mut state = GameState::new(game.clone());
        clock.project(&mut state);
        Self {
            state,
            engine: Engine::standard(catalog),
            clock,
            policy: MergePolicy::with_system_stock(reconciliation.server_owns_system_stock),
            rng: seed.map_or_else(RngManager::from_entropy, RngManager::new),
            defaults: game,
            reset,
        }
    }

    pub fn state(&self) -> &GameState {
        &self.state
    }

    pub fn phase(&self) -> Phase {
        self.clock.phase()
    }

    pub fn catalog(&self) -> &Catalog {
        self.engine.catalog()
    }

    pub fn policy(&self) -> &MergePolicy {
        &self.policy
    }

    pub fn handle(&mut self, from: ClientId, message: ClientMessage) -> Vec<Outbound> {
        match message {
            ClientMessage::UpdateState(incoming) => self.update_state(from, *incoming),
            ClientMessage::ForceTurn => self.force_turn(),
            ClientMessage::ResetGame => self.reset(),
            ClientMessage::ApplyAction { village_id, action } => {
                self.apply_action(from, &village_id, action)
            }
            ClientMessage::Register { name, password } => self.register(from, &name, &password),
            ClientMessage::SetPaused { paused } => self.set_paused(paused),
        }
    }

    /// One wall-clock second.
    pub fn tick(&mut self) -> Vec<Outbound> {
        let event = self.clock.tick(
            self.state.villages.len(),
            self.state.config.turn_duration_seconds,
        );
        match event {
            ClockEvent::LobbyTick { countdown } => {
                self.clock.project(&mut self.state);
                vec![Outbound::everyone(ServerMessage::LobbyTick(LobbyStatus {
                    count: self.state.villages.len(),
                    countdown,
                    villages: self.state.villages.clone(),
                }))]
            }
            ClockEvent::GameStarted => {
                info!(villages = self.state.villages.len(), "lobby closed, game started");
                self.clock.project(&mut self.state);
                vec![
                    Outbound::everyone(ServerMessage::GameStarted),
                    self.state_update(),
                ]
            }
            ClockEvent::Tick { time_left } => {
                self.clock.project(&mut self.state);
                vec![Outbound::everyone(ServerMessage::Tick(time_left))]
            }
            ClockEvent::TurnDue => {
                self.run_turn();
                self.clock.project(&mut self.state);
                vec![
                    self.state_update(),
                    Outbound::everyone(ServerMessage::TurnEnded),
                    Outbound::everyone(ServerMessage::Tick(self.state.turn_time_left)),
                ]
            }
            ClockEvent::Idle => Vec::new(),
        }
    }

    /// Accepts a client's full-state push under the merge policy and relays
    /// the result to every other client.
    pub fn update_state(&mut self, from: ClientId, incoming: GameState) -> Vec<Outbound> {
        let merged = self.policy.merge(&self.state, incoming);
        if !self.policy.is_server_owned(Field::IsPaused) {
            self.clock.set_paused(merged.is_paused);
        }
        self.state = merged;
        self.clock.project(&mut self.state);
        vec![Outbound::all_except(
            from,
            ServerMessage::StateUpdate(Box::new(self.state.clone())),
        )]
    }

    /// Skips the lobby, or processes a turn immediately when already playing.
    pub fn force_turn(&mut self) -> Vec<Outbound> {
        match self.clock.force(self.state.config.turn_duration_seconds) {
            ForceOutcome::Started => {
                info!("lobby skipped by force");
                self.clock.project(&mut self.state);
                vec![
                    Outbound::everyone(ServerMessage::GameStarted),
                    self.state_update(),
                ]
            }
            ForceOutcome::TurnDue => {
                self.run_turn();
                self.clock.project(&mut self.state);
                vec![
                    self.state_update(),
                    Outbound::everyone(ServerMessage::TurnEnded),
                ]
            }
        }
    }

    /// Replaces the whole game with a fresh one.
    pub fn reset(&mut self) -> Vec<Outbound> {
        let config = if self.reset.preserve_config {
            self.state.config.clone()
        } else {
            self.defaults.clone()
        };
        self.clock.reset(config.turn_duration_seconds);
        self.state = GameState::new(config);
        self.clock.project(&mut self.state);
        info!(preserve_config = self.reset.preserve_config, "game reset");
        vec![self.state_update()]
    }

    pub fn apply_action(&mut self, from: ClientId, village_id: &str, action: Action) -> Vec<Outbound> {
        let mut ids = self.rng.stream("ids");
        match actions::apply(
            &mut self.state,
            self.engine.catalog(),
            &mut ids,
            village_id,
            action,
        ) {
            Ok(()) => vec![self.state_update()],
            Err(err) => {
                warn!(client = from.0, village_id, %err, "action rejected");
                vec![rejected(from, err)]
            }
        }
    }

    pub fn register(&mut self, from: ClientId, name: &str, password: &str) -> Vec<Outbound> {
        let mut placement = self.rng.stream("placement");
        match actions::register(&mut self.state, &mut placement, name, password) {
            Ok(village_id) => {
                info!(client = from.0, %village_id, name, "village registered");
                vec![
                    Outbound::only(from, ServerMessage::Registered { village_id }),
                    self.state_update(),
                ]
            }
            Err(err) => {
                warn!(client = from.0, name, %err, "registration rejected");
                vec![rejected(from, err)]
            }
        }
    }

    pub fn set_paused(&mut self, paused: bool) -> Vec<Outbound> {
        self.clock.set_paused(paused);
        self.clock.project(&mut self.state);
        vec![self.state_update()]
    }

    fn run_turn(&mut self) {
        match self.engine.advance(&self.state) {
            Ok(next) => {
                self.state = next;
                info!(
                    turn = self.state.current_turn,
                    villages = self.state.villages.len(),
                    "turn processed"
                );
            }
            Err(err) => error!(turn = self.state.current_turn, "turn processing failed: {err:#}"),
        }
    }

    fn state_update(&self) -> Outbound {
        Outbound::everyone(ServerMessage::StateUpdate(Box::new(self.state.clone())))
    }
}

fn rejected(to: ClientId, err: actions::ActionError) -> Outbound {
    Outbound::only(
        to,
        ServerMessage::ActionRejected {
            reason: err.to_string(),
        },
    )
}
