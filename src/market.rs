//! Market clearing: peer listings and the system-operated market.
//!
//! Every operation validates first and mutates second, so an `Err` means the
//! state was not touched.

use crate::{
    actions::{check_amount, ActionError},
    components::{ListingKind, MarketListing, ResourceKind},
    world::GameState,
};

/// Escrows `amount` of `resource` from the village and opens a sell listing.
pub fn list(
    state: &mut GameState,
    village_id: &str,
    resource: ResourceKind,
    amount: f64,
    price_per_unit: f64,
    listing_id: String,
) -> Result<(), ActionError> {
    check_amount(amount)?;
    if !price_per_unit.is_finite() || price_per_unit < 0.0 {
        return Err(ActionError::InvalidPrice(price_per_unit));
    }
    let village = state
        .village_mut(village_id)
        .ok_or_else(|| ActionError::UnknownVillage(village_id.to_string()))?;
    let available = village.inventory.get(resource);
    if available < amount {
        return Err(ActionError::InsufficientInventory {
            resource,
            needed: amount,
            available,
        });
    }

    village.inventory.subtract(resource, amount);
    let listing = MarketListing {
        id: listing_id,
        village_id: village.id.clone(),
        village_name: village.name.clone(),
        resource,
        amount,
        price_per_unit,
        kind: ListingKind::Sell,
    };
    state.market.push(listing);
    Ok(())
}

/// Withdraws a listing and returns the escrowed goods to its owner.
pub fn cancel(state: &mut GameState, village_id: &str, listing_id: &str) -> Result<(), ActionError> {
    let index = listing_index(state, listing_id)?;
    if state.market[index].village_id != village_id {
        return Err(ActionError::NotOwner(listing_id.to_string()));
    }
    if state.village(village_id).is_none() {
        return Err(ActionError::UnknownVillage(village_id.to_string()));
    }

    let listing = state.market.remove(index);
    if let Some(owner) = state.village_mut(village_id) {
        owner.inventory.add(listing.resource, listing.amount);
    }
    Ok(())
}

/// Buys a whole listing: goods move to the buyer, coins to the seller.
pub fn buy(state: &mut GameState, village_id: &str, listing_id: &str) -> Result<(), ActionError> {
    let index = listing_index(state, listing_id)?;
    let listing = &state.market[index];
    if listing.village_id == village_id {
        return Err(ActionError::OwnListing(listing_id.to_string()));
    }
    let total = listing.total_price();
    let buyer = state
        .village(village_id)
        .ok_or_else(|| ActionError::UnknownVillage(village_id.to_string()))?;
    if buyer.coins < total {
        return Err(ActionError::InsufficientCoins {
            needed: total,
            available: buyer.coins,
        });
    }
    if state.village(&listing.village_id).is_none() {
        return Err(ActionError::UnknownVillage(listing.village_id.clone()));
    }

    let listing = state.market.remove(index);
    if let Some(buyer) = state.village_mut(village_id) {
        buyer.coins -= total;
        buyer.inventory.add(listing.resource, listing.amount);
    }
    if let Some(seller) = state.village_mut(&listing.village_id) {
        seller.coins += total;
    }
    Ok(())
}

/// Buys from the system market at its sell price.
pub fn system_buy(
    state: &mut GameState,
    village_id: &str,
    resource: ResourceKind,
    amount: f64,
) -> Result<(), ActionError> {
    check_amount(amount)?;
    let total = state.config.system_market.sell_price(resource) * amount;
    let stock = state.system_market_stock.get(resource);
    let village = state
        .village_mut(village_id)
        .ok_or_else(|| ActionError::UnknownVillage(village_id.to_string()))?;
    if village.coins < total {
        return Err(ActionError::InsufficientCoins {
            needed: total,
            available: village.coins,
        });
    }
    if stock < amount {
        return Err(ActionError::InsufficientSystemStock {
            resource,
            needed: amount,
            available: stock,
        });
    }

    village.coins -= total;
    village.inventory.add(resource, amount);
    state.system_market_stock.subtract(resource, amount);
    Ok(())
}

/// Sells to the system market at its buy price.
pub fn system_sell(
    state: &mut GameState,
    village_id: &str,
    resource: ResourceKind,
    amount: f64,
) -> Result<(), ActionError> {
    check_amount(amount)?;
    let total = state.config.system_market.buy_price(resource) * amount;
    let village = state
        .village_mut(village_id)
        .ok_or_else(|| ActionError::UnknownVillage(village_id.to_string()))?;
    let available = village.inventory.get(resource);
    if available < amount {
        return Err(ActionError::InsufficientInventory {
            resource,
            needed: amount,
            available,
        });
    }

    village.coins += total;
    village.inventory.subtract(resource, amount);
    state.system_market_stock.add(resource, amount);
    Ok(())
}

fn listing_index(state: &GameState, listing_id: &str) -> Result<usize, ActionError> {
    state
        .market
        .iter()
        .position(|l| l.id == listing_id)
        .ok_or_else(|| ActionError::UnknownListing(listing_id.to_string()))
}
