use anyhow::Result;

use crate::{
    engine::{System, TurnContext},
    world::GameState,
};

/// Replenishes the system market by its configured generation rates,
/// clamped to each resource's max stock. A stock pushed past its cap by
/// village sales is brought back down to the cap, so unlike a pure top-up
/// this step can lower a stock.
pub struct SupplySystem;

impl SupplySystem {
    pub fn new() -> Self {
        Self
    }
}

impl Default for SupplySystem {
    fn default() -> Self {
        Self::new()
    }
}

impl System for SupplySystem {
    fn name(&self) -> &str {
        "supply"
    }

    fn run(&mut self, _ctx: &TurnContext, state: &mut GameState) -> Result<()> {
        let market = &state.config.system_market;
        for (kind, rate) in &market.generation_rates {
            let stock = state.system_market_stock.get_mut(*kind);
            *stock = (*stock + rate).min(market.max_stock(*kind));
        }
        Ok(())
    }
}
