use anyhow::Result;

use crate::{
    engine::{System, TurnContext},
    world::GameState,
};

/// Stamps every village with the turn it was last processed for.
pub struct BookkeepingSystem;

impl BookkeepingSystem {
    pub fn new() -> Self {
        Self
    }
}

impl Default for BookkeepingSystem {
    fn default() -> Self {
        Self::new()
    }
}

impl System for BookkeepingSystem {
    fn name(&self) -> &str {
        "bookkeeping"
    }

    fn run(&mut self, ctx: &TurnContext, state: &mut GameState) -> Result<()> {
        for village in &mut state.villages {
            village.last_turn_processed = ctx.turn;
        }
        Ok(())
    }
}
