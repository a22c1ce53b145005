use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResourceKind {
    Wood,
    Iron,
    Stone,
    Salt,
    Coal,
    Wheat,
    SugarCane,
    Eggs,
    Milk,
    Flour,
    Sugar,
    Butter,
    Cheese,
    IronBeams,
    Cake,
    Nails,
}

impl ResourceKind {
    pub const ALL: [ResourceKind; 16] = [
        ResourceKind::Wood,
        ResourceKind::Iron,
        ResourceKind::Stone,
        ResourceKind::Salt,
        ResourceKind::Coal,
        ResourceKind::Wheat,
        ResourceKind::SugarCane,
        ResourceKind::Eggs,
        ResourceKind::Milk,
        ResourceKind::Flour,
        ResourceKind::Sugar,
        ResourceKind::Butter,
        ResourceKind::Cheese,
        ResourceKind::IronBeams,
        ResourceKind::Cake,
        ResourceKind::Nails,
    ];
}

/// Sparse per-resource amounts: recipes, terrain bonuses and price tables.
pub type ResourceMap = BTreeMap<ResourceKind, f64>;

/// Dense quantity of every resource kind held by one owner.
///
/// Serialises as a flat object keyed by the snake_case resource name so the
/// wire shape matches what browser clients already store.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ResourceLedger {
    pub wood: f64,
    pub iron: f64,
    pub stone: f64,
    pub salt: f64,
    pub coal: f64,
    pub wheat: f64,
    pub sugar_cane: f64,
    pub eggs: f64,
    pub milk: f64,
    pub flour: f64,
    pub sugar: f64,
    pub butter: f64,
    pub cheese: f64,
    pub iron_beams: f64,
    pub cake: f64,
    pub nails: f64,
}

impl ResourceLedger {
    /// Inventory handed to a freshly registered village, also the system
    /// market's stock after a reset.
    pub fn starting() -> Self {
        Self {
            wood: 500.0,
            stone: 500.0,
            iron_beams: 250.0,
            nails: 200.0,
            ..Self::default()
        }
    }

    pub fn get(&self, kind: ResourceKind) -> f64 {
        match kind {
            ResourceKind::Wood => self.wood,
            ResourceKind::Iron => self.iron,
            ResourceKind::Stone => self.stone,
            ResourceKind::Salt => self.salt,
            ResourceKind::Coal => self.coal,
            ResourceKind::Wheat => self.wheat,
            ResourceKind::SugarCane => self.sugar_cane,
            ResourceKind::Eggs => self.eggs,
            ResourceKind::Milk => self.milk,
            ResourceKind::Flour => self.flour,
            ResourceKind::Sugar => self.sugar,
            ResourceKind::Butter => self.butter,
            ResourceKind::Cheese => self.cheese,
            ResourceKind::IronBeams => self.iron_beams,
            ResourceKind::Cake => self.cake,
            ResourceKind::Nails => self.nails,
        }
    }

    pub fn get_mut(&mut self, kind: ResourceKind) -> &mut f64 {
        match kind {
            ResourceKind::Wood => &mut self.wood,
            ResourceKind::Iron => &mut self.iron,
            ResourceKind::Stone => &mut self.stone,
            ResourceKind::Salt => &mut self.salt,
            ResourceKind::Coal => &mut self.coal,
            ResourceKind::Wheat => &mut self.wheat,
            ResourceKind::SugarCane => &mut self.sugar_cane,
            ResourceKind::Eggs => &mut self.eggs,
            ResourceKind::Milk => &mut self.milk,
            ResourceKind::Flour => &mut self.flour,
            ResourceKind::Sugar => &mut self.sugar,
            ResourceKind::Butter => &mut self.butter,
            ResourceKind::Cheese => &mut self.cheese,
            ResourceKind::IronBeams => &mut self.iron_beams,
            ResourceKind::Cake => &mut self.cake,
            ResourceKind::Nails => &mut self.nails,
        }
    }

    pub fn add(&mut self, kind: ResourceKind, amount: f64) {
        *self.get_mut(kind) += amount;
    }

    pub fn subtract(&mut self, kind: ResourceKind, amount: f64) {
        *self.get_mut(kind) -= amount;
    }

    /// True when every entry of `bill` is covered by the held quantity.
    pub fn covers(&self, bill: &ResourceMap) -> bool {
        bill.iter().all(|(kind, amount)| self.get(*kind) >= *amount)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Terrain {
    Mountains,
    Forests,
    Plains,
    Pastures,
    Water,
    Desert,
}

impl Terrain {
    /// Terrain of a board cell. Only the four land kinds are ever assigned.
    pub fn at(x: i32, y: i32) -> Self {
        const LAND: [Terrain; 4] = [
            Terrain::Mountains,
            Terrain::Forests,
            Terrain::Plains,
            Terrain::Pastures,
        ];
        let index = (x * 31 + y * 17).rem_euclid(LAND.len() as i32) as usize;
        LAND[index]
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Coordinates {
    pub x: i32,
    pub y: i32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BuildingInstance {
    pub id: String,
    pub type_id: String,
    pub x: i32,
    pub y: i32,
    pub placed_at_turn: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mode_id: Option<String>,
    #[serde(default)]
    pub turns_active: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum LoanKind {
    /// Interest on the principal every turn.
    Simple,
    /// Interest on the outstanding balance every turn.
    Compound,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Loan {
    pub id: String,
    /// Principal.
    pub amount: f64,
    pub remaining_amount: f64,
    pub interest_rate: f64,
    #[serde(rename = "type")]
    pub kind: LoanKind,
    pub turn_taken: u64,
}

impl Loan {
    /// Balance below which a repaid loan is considered settled.
    pub const SETTLED_EPSILON: f64 = 0.01;

    pub fn accrue_interest(&mut self) {
        match self.kind {
            LoanKind::Compound => self.remaining_amount *= 1.0 + self.interest_rate,
            LoanKind::Simple => self.remaining_amount += self.amount * self.interest_rate,
        }
    }

    pub fn is_settled(&self) -> bool {
        self.remaining_amount <= Self::SETTLED_EPSILON
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ListingKind {
    Sell,
    Buy,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MarketListing {
    pub id: String,
    pub village_id: String,
    pub village_name: String,
    pub resource: ResourceKind,
    pub amount: f64,
    pub price_per_unit: f64,
    #[serde(rename = "type")]
    pub kind: ListingKind,
}

impl MarketListing {
    pub fn total_price(&self) -> f64 {
        self.amount * self.price_per_unit
    }
}
