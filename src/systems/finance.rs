use anyhow::Result;

use crate::{
    engine::{System, TurnContext},
    world::GameState,
};

/// Accrues one turn of interest on every outstanding loan. Settled loans are
/// only removed by repayment, never here.
pub struct FinanceSystem;

impl FinanceSystem {
    pub fn new() -> Self {
        Self
    }
}

impl Default for FinanceSystem {
    fn default() -> Self {
        Self::new()
    }
}

impl System for FinanceSystem {
    fn name(&self) -> &str {
        "finance"
    }

    fn run(&mut self, _ctx: &TurnContext, state: &mut GameState) -> Result<()> {
        for village in &mut state.villages {
            for loan in &mut village.loans {
                loan.accrue_interest();
            }
        }
        Ok(())
    }
}
