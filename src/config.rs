//! Game and server configuration.
//!
//! [`GameConfig`] travels inside every state snapshot and uses the camelCase
//! keys the browser client expects. [`ServerConfig`] wraps it together with
//! the knobs that only the server reads, and can be loaded from YAML.

use std::{
    collections::BTreeMap,
    fs,
    path::{Path, PathBuf},
};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::components::{ResourceKind, ResourceMap, Terrain};

fn default_initial_coins() -> f64 {
    500.0
}

fn default_turn_duration_seconds() -> u32 {
    120
}

fn default_base_interest_rate() -> f64 {
    0.05
}

fn default_terrain_bonus_range() -> [i32; 2] {
    [10, 25]
}

fn default_lobby_threshold() -> usize {
    5
}

fn default_lobby_grace_seconds() -> u32 {
    20
}

fn default_true() -> bool {
    true
}

/// Tunables shared with every client as part of the game state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GameConfig {
    #[serde(default = "default_initial_coins")]
    pub initial_coins: f64,
    #[serde(default = "default_turn_duration_seconds")]
    pub turn_duration_seconds: u32,
    #[serde(default = "default_base_interest_rate")]
    pub base_interest_rate: f64,
    #[serde(default = "default_terrain_bonus_range")]
    pub terrain_bonus_range: [i32; 2],
    #[serde(default = "default_terrain_modifiers")]
    pub terrain_modifiers: BTreeMap<Terrain, ResourceMap>,
    #[serde(default)]
    pub system_market: SystemMarketConfig,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            initial_coins: default_initial_coins(),
            turn_duration_seconds: default_turn_duration_seconds(),
            base_interest_rate: default_base_interest_rate(),
            terrain_bonus_range: default_terrain_bonus_range(),
            terrain_modifiers: default_terrain_modifiers(),
            system_market: SystemMarketConfig::default(),
        }
    }
}

impl GameConfig {
    /// Percentage modifiers for a terrain; empty for terrains without any.
    pub fn terrain_bonuses(&self, terrain: Terrain) -> ResourceMap {
        self.terrain_modifiers
            .get(&terrain)
            .cloned()
            .unwrap_or_default()
    }
}

/// Price, replenishment and cap tables of the system-operated market.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SystemMarketConfig {
    /// What the market pays per unit when a village sells to it.
    #[serde(default)]
    pub buy_prices: ResourceMap,
    /// What a village pays per unit when buying from the market.
    #[serde(default)]
    pub sell_prices: ResourceMap,
    /// Units added to stock every turn.
    #[serde(default)]
    pub generation_rates: ResourceMap,
    #[serde(default)]
    pub max_stock: ResourceMap,
}

impl SystemMarketConfig {
    pub fn buy_price(&self, kind: ResourceKind) -> f64 {
        self.buy_prices.get(&kind).copied().unwrap_or(0.0)
    }

    pub fn sell_price(&self, kind: ResourceKind) -> f64 {
        self.sell_prices.get(&kind).copied().unwrap_or(0.0)
    }

    pub fn max_stock(&self, kind: ResourceKind) -> f64 {
        self.max_stock.get(&kind).copied().unwrap_or(0.0)
    }
}

impl Default for SystemMarketConfig {
    fn default() -> Self {
        use ResourceKind::*;

        // wood iron stone salt coal wheat sugar_cane eggs milk flour sugar butter cheese iron_beams nails
        let kinds = [
            Wood, Iron, Stone, Salt, Coal, Wheat, SugarCane, Eggs, Milk, Flour, Sugar, Butter,
            Cheese, IronBeams, Nails,
        ];
        let table = |values: [f64; 15]| -> ResourceMap { kinds.into_iter().zip(values).collect() };
        Self {
            buy_prices: table([
                2.0, 4.0, 2.0, 10.0, 5.0, 1.0, 1.0, 5.0, 8.0, 15.0, 20.0, 40.0, 50.0, 100.0, 15.0,
            ]),
            sell_prices: table([
                10.0, 20.0, 10.0, 50.0, 25.0, 5.0, 5.0, 25.0, 40.0, 75.0, 100.0, 200.0, 250.0,
                500.0, 75.0,
            ]),
            generation_rates: table([
                5.0, 2.0, 5.0, 1.0, 2.0, 10.0, 10.0, 5.0, 2.0, 1.0, 1.0, 1.0, 1.0, 1.0, 5.0,
            ]),
            max_stock: table([
                100.0, 50.0, 100.0, 20.0, 50.0, 200.0, 200.0, 50.0, 20.0, 10.0, 10.0, 5.0, 5.0,
                5.0, 50.0,
            ]),
        }
    }
}

fn default_terrain_modifiers() -> BTreeMap<Terrain, ResourceMap> {
    use ResourceKind::*;

    let modifiers = |entries: &[(ResourceKind, f64)]| -> ResourceMap {
        entries.iter().copied().collect()
    };
    BTreeMap::from([
        (
            Terrain::Mountains,
            modifiers(&[
                (Iron, 20.0),
                (Stone, 15.0),
                (Coal, 15.0),
                (Wheat, -15.0),
                (SugarCane, -15.0),
                (Milk, -10.0),
            ]),
        ),
        (
            Terrain::Plains,
            modifiers(&[
                (Wheat, 20.0),
                (SugarCane, 20.0),
                (Milk, 10.0),
                (Iron, -15.0),
                (Stone, -15.0),
                (Coal, -10.0),
            ]),
        ),
        (
            Terrain::Forests,
            modifiers(&[
                (Wood, 20.0),
                (Wheat, 10.0),
                (Eggs, 10.0),
                (Iron, -15.0),
                (Stone, -10.0),
                (Salt, -10.0),
            ]),
        ),
        (
            Terrain::Pastures,
            modifiers(&[
                (Milk, 20.0),
                (Eggs, 20.0),
                (Wheat, 10.0),
                (Iron, -15.0),
                (Wood, -10.0),
                (Stone, -10.0),
            ]),
        ),
        (Terrain::Water, ResourceMap::new()),
        (Terrain::Desert, ResourceMap::new()),
    ])
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LobbySettings {
    /// Registered villages needed before the start countdown begins.
    #[serde(default = "default_lobby_threshold")]
    pub threshold: usize,
    #[serde(default = "default_lobby_grace_seconds")]
    pub grace_seconds: u32,
    /// When false a fresh or reset game goes straight to active play.
    #[serde(default = "default_true")]
    pub start_in_lobby: bool,
}

impl Default for LobbySettings {
    fn default() -> Self {
        Self {
            threshold: default_lobby_threshold(),
            grace_seconds: default_lobby_grace_seconds(),
            start_in_lobby: true,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResetSettings {
    /// Keep the live game config across `reset_game` instead of restoring
    /// the configured defaults.
    #[serde(default = "default_true")]
    pub preserve_config: bool,
}

impl Default for ResetSettings {
    fn default() -> Self {
        Self {
            preserve_config: true,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReconciliationSettings {
    /// Treat the system market stock as server-owned during client pushes.
    #[serde(default)]
    pub server_owns_system_stock: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ServerConfig {
    #[serde(default)]
    pub game: GameConfig,
    #[serde(default)]
    pub lobby: LobbySettings,
    #[serde(default)]
    pub reset: ResetSettings,
    #[serde(default)]
    pub reconciliation: ReconciliationSettings,
    /// Seed for id generation and village placement; entropy when absent.
    #[serde(default)]
    pub seed: Option<u64>,
}

pub struct ConfigLoader {
    base_dir: PathBuf,
}

impl ConfigLoader {
    pub fn new(base_dir: impl AsRef<Path>) -> Self {
        Self {
            base_dir: base_dir.as_ref().to_path_buf(),
        }
    }

    pub fn load(&self, file: impl AsRef<Path>) -> Result<ServerConfig> {
        let path = self.base_dir.join(file);
        let data = fs::read_to_string(&path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        let config: ServerConfig = serde_yaml::from_str(&data)
            .with_context(|| format!("Failed to parse {}", path.display()))?;
        Ok(config)
    }
}
