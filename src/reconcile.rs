//! Merge policy for client-pushed snapshots.
//!
//! A client sends its whole optimistic [`GameState`]; the server keeps its
//! own value for every field listed as server-owned and adopts the client's
//! value for everything else. The merge is last-write-wins at document
//! granularity: villages, market and config are taken wholesale from the
//! latest push.

use crate::world::GameState;

/// Top-level fields of a [`GameState`] snapshot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Field {
    CurrentTurn,
    TurnTimeLeft,
    IsLobby,
    LobbyCountdown,
    IsPaused,
    SystemMarketStock,
    Villages,
    Market,
    Config,
}

impl Field {
    pub const ALL: [Field; 9] = [
        Field::CurrentTurn,
        Field::TurnTimeLeft,
        Field::IsLobby,
        Field::LobbyCountdown,
        Field::IsPaused,
        Field::SystemMarketStock,
        Field::Villages,
        Field::Market,
        Field::Config,
    ];

    /// Copies this field from `source` into `target`.
    fn copy(self, source: &GameState, target: &mut GameState) {
        match self {
            Field::CurrentTurn => target.current_turn = source.current_turn,
            Field::TurnTimeLeft => target.turn_time_left = source.turn_time_left,
            Field::IsLobby => target.is_lobby = source.is_lobby,
            Field::LobbyCountdown => target.lobby_countdown = source.lobby_countdown,
            Field::IsPaused => target.is_paused = source.is_paused,
            Field::SystemMarketStock => {
                target.system_market_stock = source.system_market_stock.clone()
            }
            Field::Villages => target.villages = source.villages.clone(),
            Field::Market => target.market = source.market.clone(),
            Field::Config => target.config = source.config.clone(),
        }
    }
}

/// Which fields the server keeps when a client pushes a snapshot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MergePolicy {
    server_owned: Vec<Field>,
}

impl MergePolicy {
    /// The turn clock and lobby state only.
    pub const CLOCK_FIELDS: [Field; 4] = [
        Field::CurrentTurn,
        Field::TurnTimeLeft,
        Field::IsLobby,
        Field::LobbyCountdown,
    ];

    pub fn new(server_owned: impl IntoIterator<Item = Field>) -> Self {
        let mut fields: Vec<Field> = Vec::new();
        for field in server_owned {
            if !fields.contains(&field) {
                fields.push(field);
            }
        }
        Self {
            server_owned: fields,
        }
    }

    /// Clock fields, plus the system market stock when requested.
    pub fn with_system_stock(server_owns_system_stock: bool) -> Self {
        let mut policy = Self::default();
        if server_owns_system_stock {
            policy.server_owned.push(Field::SystemMarketStock);
        }
        policy
    }

    pub fn is_server_owned(&self, field: Field) -> bool {
        self.server_owned.contains(&field)
    }

    pub fn server_owned(&self) -> &[Field] {
        &self.server_owned
    }

    /// Fields adopted from the client.
    pub fn client_proposed(&self) -> Vec<Field> {
        Field::ALL
            .into_iter()
            .filter(|field| !self.is_server_owned(*field))
            .collect()
    }

    /// Returns the client snapshot with every server-owned field overwritten
    /// by the authoritative value.
    pub fn merge(&self, authoritative: &GameState, incoming: GameState) -> GameState {
        let mut merged = incoming;
        for field in &self.server_owned {
            field.copy(authoritative, &mut merged);
        }
        merged
    }
}

impl Default for MergePolicy {
    fn default() -> Self {
        Self::new(Self::CLOCK_FIELDS)
    }
}
