//! Messages carried by the real-time channel.
//!
//! Every frame is a JSON object `{"event": <name>, "data": <payload>}`;
//! events without a payload omit `data`.

use serde::{Deserialize, Serialize};

use crate::{actions::Action, world::{GameState, Village}};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ClientId(pub u64);

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event", content = "data", rename_all = "snake_case")]
pub enum ClientMessage {
    /// Optimistic full-state push.
    UpdateState(Box<GameState>),
    ForceTurn,
    ResetGame,
    #[serde(rename_all = "camelCase")]
    ApplyAction { village_id: String, action: Action },
    Register { name: String, password: String },
    SetPaused { paused: bool },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LobbyStatus {
    pub count: usize,
    pub countdown: Option<i64>,
    pub villages: Vec<Village>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event", content = "data", rename_all = "snake_case")]
pub enum ServerMessage {
    StateUpdate(Box<GameState>),
    /// Seconds left in the current turn.
    Tick(i64),
    LobbyTick(LobbyStatus),
    GameStarted,
    TurnEnded,
    ActionRejected { reason: String },
    #[serde(rename_all = "camelCase")]
    Registered { village_id: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Audience {
    Everyone,
    /// Everyone but the client whose push caused the message.
    AllExcept(ClientId),
    Only(ClientId),
}

impl Audience {
    pub fn includes(self, client: ClientId) -> bool {
        match self {
            Audience::Everyone => true,
            Audience::AllExcept(excluded) => excluded != client,
            Audience::Only(target) => target == client,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Outbound {
    pub audience: Audience,
    pub message: ServerMessage,
}

impl Outbound {
    pub fn everyone(message: ServerMessage) -> Self {
        Self {
            audience: Audience::Everyone,
            message,
        }
    }

    pub fn all_except(client: ClientId, message: ServerMessage) -> Self {
        Self {
            audience: Audience::AllExcept(client),
            message,
        }
    }

    pub fn only(client: ClientId, message: ServerMessage) -> Self {
        Self {
            audience: Audience::Only(client),
            message,
        }
    }
}
