//! Lobby and turn timer state machine, advanced once per wall-clock second.

use crate::{config::LobbySettings, world::GameState};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    /// Waiting for enough villages to register.
    Lobby,
    /// Enough villages are in; counting down to the start.
    Countdown { remaining: i64 },
    /// Game running; a turn fires when `time_left` reaches zero.
    Active { time_left: i64 },
    /// Game running with the turn timer frozen.
    Paused { time_left: i64 },
}

impl Phase {
    /// Reads the phase encoded in a snapshot's clock flags.
    pub fn of(state: &GameState) -> Self {
        match (state.is_lobby, state.lobby_countdown, state.is_paused) {
            (true, Some(remaining), _) => Phase::Countdown { remaining },
            (true, None, _) => Phase::Lobby,
            (false, _, true) => Phase::Paused {
                time_left: state.turn_time_left,
            },
            (false, _, false) => Phase::Active {
                time_left: state.turn_time_left,
            },
        }
    }
}

/// What a single clock tick asks the caller to do.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClockEvent {
    /// Still in the lobby; announce the village count and countdown.
    LobbyTick { countdown: Option<i64> },
    /// The countdown finished and play has begun.
    GameStarted,
    /// The turn timer moved.
    Tick { time_left: i64 },
    /// The turn timer ran out; process a turn. The timer is already reset.
    TurnDue,
    /// Paused; nothing changes.
    Idle,
}

/// Outcome of the manual "force turn" control.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ForceOutcome {
    /// The lobby was skipped and play started.
    Started,
    /// A turn must be processed right away. The timer is already reset.
    TurnDue,
}

#[derive(Debug, Clone)]
pub struct TurnClock {
    phase: Phase,
    settings: LobbySettings,
}

impl TurnClock {
    pub fn new(settings: LobbySettings, turn_duration: u32) -> Self {
        let phase = initial_phase(&settings, turn_duration);
        Self { phase, settings }
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    /// Advances one second. `villages` is the registered village count and
    /// `turn_duration` the configured seconds per turn.
    pub fn tick(&mut self, villages: usize, turn_duration: u32) -> ClockEvent {
        let full = villages >= self.settings.threshold;
        match self.phase {
            Phase::Lobby if full => {
                let remaining = i64::from(self.settings.grace_seconds);
                self.phase = Phase::Countdown { remaining };
                ClockEvent::LobbyTick {
                    countdown: Some(remaining),
                }
            }
            Phase::Lobby => ClockEvent::LobbyTick { countdown: None },
            Phase::Countdown { .. } if !full => {
                self.phase = Phase::Lobby;
                ClockEvent::LobbyTick { countdown: None }
            }
            Phase::Countdown { remaining } => {
                let remaining = remaining - 1;
                if remaining <= 0 {
                    self.phase = Phase::Active {
                        time_left: i64::from(turn_duration),
                    };
                    ClockEvent::GameStarted
                } else {
                    self.phase = Phase::Countdown { remaining };
                    ClockEvent::LobbyTick {
                        countdown: Some(remaining),
                    }
                }
            }
            Phase::Active { time_left } => {
                let time_left = time_left - 1;
                if time_left <= 0 {
                    self.phase = Phase::Active {
                        time_left: i64::from(turn_duration),
                    };
                    ClockEvent::TurnDue
                } else {
                    self.phase = Phase::Active { time_left };
                    ClockEvent::Tick { time_left }
                }
            }
            Phase::Paused { .. } => ClockEvent::Idle,
        }
    }

    pub fn force(&mut self, turn_duration: u32) -> ForceOutcome {
        let time_left = i64::from(turn_duration);
        match self.phase {
            Phase::Lobby | Phase::Countdown { .. } => {
                self.phase = Phase::Active { time_left };
                ForceOutcome::Started
            }
            Phase::Active { .. } => {
                self.phase = Phase::Active { time_left };
                ForceOutcome::TurnDue
            }
            Phase::Paused { .. } => {
                self.phase = Phase::Paused { time_left };
                ForceOutcome::TurnDue
            }
        }
    }

    /// Freezes or resumes the turn timer. No effect while in the lobby.
    pub fn set_paused(&mut self, paused: bool) {
        self.phase = match (self.phase, paused) {
            (Phase::Active { time_left }, true) => Phase::Paused { time_left },
            (Phase::Paused { time_left }, false) => Phase::Active { time_left },
            (phase, _) => phase,
        };
    }

    pub fn reset(&mut self, turn_duration: u32) {
        self.phase = initial_phase(&self.settings, turn_duration);
    }

    /// Writes the phase into the snapshot's clock flags.
    pub fn project(&self, state: &mut GameState) {
        let turn_duration = i64::from(state.config.turn_duration_seconds);
        let (is_lobby, lobby_countdown, is_paused, turn_time_left) = match self.phase {
            Phase::Lobby => (true, None, false, turn_duration),
            Phase::Countdown { remaining } => (true, Some(remaining), false, turn_duration),
            Phase::Active { time_left } => (false, None, false, time_left),
            Phase::Paused { time_left } => (false, None, true, time_left),
        };
        state.is_lobby = is_lobby;
        state.lobby_countdown = lobby_countdown;
        state.is_paused = is_paused;
        state.turn_time_left = turn_time_left;
    }
}

fn initial_phase(settings: &LobbySettings, turn_duration: u32) -> Phase {
    if settings.start_in_lobby {
        Phase::Lobby
    } else {
        Phase::Active {
            time_left: i64::from(turn_duration),
        }
    }
}
