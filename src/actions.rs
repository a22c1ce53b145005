//! Player actions applied as atomic transitions on a [`GameState`].
//!
//! These are the moves a browser client performs optimistically before it
//! pushes its snapshot; the server can also apply them directly against the
//! authoritative state (see [`crate::service::GameService::apply_action`]).

use rand::Rng;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::{
    catalog::Catalog,
    components::{BuildingInstance, Coordinates, Loan, LoanKind, ResourceKind, ResourceLedger, Terrain},
    market,
    rng::short_id,
    world::{GameState, Village, BOARD_SIZE},
};

/// Name kept for the game master's login; villages may not use it.
pub const RESERVED_NAME: &str = "professor";

#[derive(Debug, Clone, PartialEq, Error)]
pub enum ActionError {
    #[error("unknown village '{0}'")]
    UnknownVillage(String),
    #[error("unknown building type '{0}'")]
    UnknownBuildingType(String),
    #[error("unknown building '{0}'")]
    UnknownBuilding(String),
    #[error("building type '{type_id}' has no mode '{mode_id}'")]
    UnknownMode { type_id: String, mode_id: String },
    #[error("unknown loan '{0}'")]
    UnknownLoan(String),
    #[error("unknown market listing '{0}'")]
    UnknownListing(String),
    #[error("insufficient coins: need {needed}, have {available}")]
    InsufficientCoins { needed: f64, available: f64 },
    #[error("insufficient {resource:?}: need {needed}, have {available}")]
    InsufficientInventory {
        resource: ResourceKind,
        needed: f64,
        available: f64,
    },
    #[error("system market has only {available} {resource:?}, {needed} requested")]
    InsufficientSystemStock {
        resource: ResourceKind,
        needed: f64,
        available: f64,
    },
    #[error("listing '{0}' belongs to another village")]
    NotOwner(String),
    #[error("listing '{0}' is your own")]
    OwnListing(String),
    #[error("amount must be a positive number, got {0}")]
    InvalidAmount(f64),
    #[error("price must be a non-negative number, got {0}")]
    InvalidPrice(f64),
    #[error("village name must not be empty")]
    EmptyName,
    #[error("the name '{0}' is reserved")]
    ReservedName(String),
    #[error("a village named '{0}' already exists")]
    NameTaken(String),
    #[error("every cell of the world board is taken")]
    BoardFull,
    #[error("position ({x}, {y}) already has a building")]
    PositionOccupied { x: i32, y: i32 },
}

/// A single move by one village, as sent over the wire.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case", rename_all_fields = "camelCase")]
pub enum Action {
    Build { type_id: String, x: i32, y: i32 },
    ChangeMode { building_id: String, mode_id: String },
    TakeLoan { amount: f64, loan_type: LoanKind },
    RepayLoan { loan_id: String, amount: f64 },
    ListResource {
        resource: ResourceKind,
        amount: f64,
        price_per_unit: f64,
    },
    CancelListing { listing_id: String },
    BuyListing { listing_id: String },
    SystemBuy { resource: ResourceKind, amount: f64 },
    SystemSell { resource: ResourceKind, amount: f64 },
}

/// Applies `action` on behalf of `village_id`. On error nothing changed.
pub fn apply(
    state: &mut GameState,
    catalog: &Catalog,
    ids: &mut impl Rng,
    village_id: &str,
    action: Action,
) -> Result<(), ActionError> {
    match action {
        Action::Build { type_id, x, y } => {
            build(state, catalog, village_id, &type_id, x, y, short_id(ids, 5))
        }
        Action::ChangeMode {
            building_id,
            mode_id,
        } => change_mode(state, catalog, village_id, &building_id, &mode_id),
        Action::TakeLoan { amount, loan_type } => {
            take_loan(state, village_id, amount, loan_type, short_id(ids, 5))
        }
        Action::RepayLoan { loan_id, amount } => repay_loan(state, village_id, &loan_id, amount),
        Action::ListResource {
            resource,
            amount,
            price_per_unit,
        } => market::list(
            state,
            village_id,
            resource,
            amount,
            price_per_unit,
            short_id(ids, 5),
        ),
        Action::CancelListing { listing_id } => market::cancel(state, village_id, &listing_id),
        Action::BuyListing { listing_id } => market::buy(state, village_id, &listing_id),
        Action::SystemBuy { resource, amount } => {
            market::system_buy(state, village_id, resource, amount)
        }
        Action::SystemSell { resource, amount } => {
            market::system_sell(state, village_id, resource, amount)
        }
    }
}

/// Founds a village on a random free cell of the board and returns its id.
pub fn register(
    state: &mut GameState,
    rng: &mut impl Rng,
    name: &str,
    password_hash: &str,
) -> Result<String, ActionError> {
    let name = name.trim();
    if name.is_empty() {
        return Err(ActionError::EmptyName);
    }
    if name.eq_ignore_ascii_case(RESERVED_NAME) {
        return Err(ActionError::ReservedName(name.to_string()));
    }
    if state.villages.iter().any(|v| v.name == name) {
        return Err(ActionError::NameTaken(name.to_string()));
    }
    if state.villages.len() >= (BOARD_SIZE * BOARD_SIZE) as usize {
        return Err(ActionError::BoardFull);
    }

    let coordinates = loop {
        let candidate = Coordinates {
            x: rng.gen_range(0..BOARD_SIZE),
            y: rng.gen_range(0..BOARD_SIZE),
        };
        if !state.is_occupied(candidate) {
            break candidate;
        }
    };
    let terrain = Terrain::at(coordinates.x, coordinates.y);
    let village = Village {
        id: short_id(rng, 9),
        name: name.to_string(),
        password_hash: password_hash.to_string(),
        coins: state.config.initial_coins,
        inventory: ResourceLedger::starting(),
        buildings: Vec::new(),
        loans: Vec::new(),
        terrain,
        coordinates,
        terrain_bonuses: state.config.terrain_bonuses(terrain),
        last_turn_processed: state.current_turn,
    };
    let id = village.id.clone();
    state.villages.push(village);
    Ok(id)
}

pub fn build(
    state: &mut GameState,
    catalog: &Catalog,
    village_id: &str,
    type_id: &str,
    x: i32,
    y: i32,
    building_id: String,
) -> Result<(), ActionError> {
    let def = catalog
        .definition(type_id)
        .ok_or_else(|| ActionError::UnknownBuildingType(type_id.to_string()))?;
    let current_turn = state.current_turn;
    let village = find_village(state, village_id)?;
    if village.building_at(x, y).is_some() {
        return Err(ActionError::PositionOccupied { x, y });
    }
    if village.coins < def.cost {
        return Err(ActionError::InsufficientCoins {
            needed: def.cost,
            available: village.coins,
        });
    }

    village.coins -= def.cost;
    village.buildings.push(BuildingInstance {
        id: building_id,
        type_id: def.id.clone(),
        x,
        y,
        placed_at_turn: current_turn,
        mode_id: def.default_mode().map(|mode| mode.id.clone()),
        turns_active: 0,
    });
    Ok(())
}

/// Switches a multi-mode building and restarts its cycle.
pub fn change_mode(
    state: &mut GameState,
    catalog: &Catalog,
    village_id: &str,
    building_id: &str,
    mode_id: &str,
) -> Result<(), ActionError> {
    let village = find_village(state, village_id)?;
    let instance = village
        .buildings
        .iter_mut()
        .find(|b| b.id == building_id)
        .ok_or_else(|| ActionError::UnknownBuilding(building_id.to_string()))?;
    let has_mode = catalog
        .definition(&instance.type_id)
        .is_some_and(|def| def.mode(mode_id).is_some());
    if !has_mode {
        return Err(ActionError::UnknownMode {
            type_id: instance.type_id.clone(),
            mode_id: mode_id.to_string(),
        });
    }

    instance.mode_id = Some(mode_id.to_string());
    instance.turns_active = 0;
    Ok(())
}

pub fn take_loan(
    state: &mut GameState,
    village_id: &str,
    amount: f64,
    kind: LoanKind,
    loan_id: String,
) -> Result<(), ActionError> {
    check_amount(amount)?;
    let interest_rate = state.config.base_interest_rate;
    let turn_taken = state.current_turn;
    let village = find_village(state, village_id)?;
    village.coins += amount;
    village.loans.push(Loan {
        id: loan_id,
        amount,
        remaining_amount: amount,
        interest_rate,
        kind,
        turn_taken,
    });
    Ok(())
}

/// Pays `amount` towards a loan. The full amount is debited even when it
/// exceeds the balance; a loan left at or below the settle threshold is
/// removed.
pub fn repay_loan(
    state: &mut GameState,
    village_id: &str,
    loan_id: &str,
    amount: f64,
) -> Result<(), ActionError> {
    check_amount(amount)?;
    let village = find_village(state, village_id)?;
    if village.coins < amount {
        return Err(ActionError::InsufficientCoins {
            needed: amount,
            available: village.coins,
        });
    }
    let loan = village
        .loans
        .iter_mut()
        .find(|l| l.id == loan_id)
        .ok_or_else(|| ActionError::UnknownLoan(loan_id.to_string()))?;

    loan.remaining_amount = (loan.remaining_amount - amount).max(0.0);
    village.coins -= amount;
    village.loans.retain(|l| !l.is_settled());
    Ok(())
}

pub(crate) fn check_amount(amount: f64) -> Result<(), ActionError> {
    if amount.is_finite() && amount > 0.0 {
        Ok(())
    } else {
        Err(ActionError::InvalidAmount(amount))
    }
}

fn find_village<'a>(state: &'a mut GameState, village_id: &str) -> Result<&'a mut Village, ActionError> {
    state
        .village_mut(village_id)
        .ok_or_else(|| ActionError::UnknownVillage(village_id.to_string()))
}
