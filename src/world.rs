use serde::{Deserialize, Serialize};

use crate::{
    components::{
        BuildingInstance, Coordinates, Loan, MarketListing, ResourceKind, ResourceLedger,
        ResourceMap, Terrain,
    },
    config::GameConfig,
};

/// Side length of the square world board villages are placed on.
pub const BOARD_SIZE: i32 = 10;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Village {
    pub id: String,
    pub name: String,
    pub password_hash: String,
    pub coins: f64,
    pub inventory: ResourceLedger,
    #[serde(default)]
    pub buildings: Vec<BuildingInstance>,
    #[serde(default)]
    pub loans: Vec<Loan>,
    pub terrain: Terrain,
    pub coordinates: Coordinates,
    #[serde(default)]
    pub terrain_bonuses: ResourceMap,
    pub last_turn_processed: u64,
}

impl Village {
    pub fn building(&self, building_id: &str) -> Option<&BuildingInstance> {
        self.buildings.iter().find(|b| b.id == building_id)
    }

    pub fn building_at(&self, x: i32, y: i32) -> Option<&BuildingInstance> {
        self.buildings.iter().find(|b| b.x == x && b.y == y)
    }
}

/// The single authoritative game document shared with every client.
///
/// The four clock fields (`turn_time_left`, `is_lobby`, `lobby_countdown`,
/// `is_paused`) are the wire projection of the lobby clock; the server keeps
/// them in sync with [`crate::lobby::Phase`] before each broadcast.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GameState {
    pub current_turn: u64,
    #[serde(default)]
    pub villages: Vec<Village>,
    #[serde(default)]
    pub market: Vec<MarketListing>,
    pub system_market_stock: ResourceLedger,
    pub config: GameConfig,
    #[serde(default)]
    pub is_paused: bool,
    pub turn_time_left: i64,
    #[serde(default)]
    pub is_lobby: bool,
    #[serde(default)]
    pub lobby_countdown: Option<i64>,
}

impl GameState {
    pub fn new(config: GameConfig) -> Self {
        Self {
            current_turn: 1,
            villages: Vec::new(),
            market: Vec::new(),
            system_market_stock: ResourceLedger::starting(),
            turn_time_left: i64::from(config.turn_duration_seconds),
            config,
            is_paused: false,
            is_lobby: true,
            lobby_countdown: None,
        }
    }

    pub fn village(&self, village_id: &str) -> Option<&Village> {
        self.villages.iter().find(|v| v.id == village_id)
    }

    pub fn village_mut(&mut self, village_id: &str) -> Option<&mut Village> {
        self.villages.iter_mut().find(|v| v.id == village_id)
    }

    pub fn listing(&self, listing_id: &str) -> Option<&MarketListing> {
        self.market.iter().find(|l| l.id == listing_id)
    }

    pub fn is_occupied(&self, coordinates: Coordinates) -> bool {
        self.villages.iter().any(|v| v.coordinates == coordinates)
    }

    /// Total coins held by every village, useful for conservation checks.
    pub fn total_coins(&self) -> f64 {
        self.villages.iter().map(|v| v.coins).sum()
    }

    /// Units of `kind` across village inventories, open listings and the
    /// system market.
    pub fn total_resource(&self, kind: ResourceKind) -> f64 {
        let held: f64 = self.villages.iter().map(|v| v.inventory.get(kind)).sum();
        let listed: f64 = self
            .market
            .iter()
            .filter(|l| l.resource == kind)
            .map(|l| l.amount)
            .sum();
        held + listed + self.system_market_stock.get(kind)
    }
}

impl Default for GameState {
    fn default() -> Self {
        Self::new(GameConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fresh_state_starts_in_lobby_on_turn_one() {
        let state = GameState::default();
        assert_eq!(state.current_turn, 1);
        assert!(state.is_lobby);
        assert_eq!(state.lobby_countdown, None);
        assert_eq!(state.turn_time_left, 120);
        assert_eq!(state.system_market_stock, ResourceLedger::starting());
    }

    #[test]
    fn deserialises_client_snapshot() {
        let json = serde_json::json!({
            "currentTurn": 3,
            "villages": [{
                "id": "v1",
                "name": "Ana",
                "passwordHash": "1234",
                "coins": 320.5,
                "inventory": { "wood": 40 },
                "buildings": [{
                    "id": "b1", "typeId": "woodcutter", "x": 1, "y": 2,
                    "placedAtTurn": 1, "turnsActive": 0
                }],
                "loans": [],
                "terrain": "FORESTS",
                "coordinates": { "x": 4, "y": 5 },
                "terrainBonuses": { "wood": 20 },
                "lastTurnProcessed": 2
            }],
            "market": [],
            "systemMarketStock": {},
            "config": {},
            "isPaused": false,
            "turnTimeLeft": 17,
            "isLobby": false,
            "lobbyCountdown": null
        });
        let state: GameState = serde_json::from_value(json).unwrap();
        let village = state.village("v1").unwrap();
        assert_eq!(village.inventory.wood, 40.0);
        assert_eq!(village.terrain_bonuses.get(&ResourceKind::Wood), Some(&20.0));
        assert_eq!(village.building_at(1, 2).map(|b| b.id.as_str()), Some("b1"));
        assert_eq!(state.config, GameConfig::default());
    }
}
