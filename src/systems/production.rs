use anyhow::Result;

use crate::{
    engine::{System, TurnContext},
    world::{GameState, Village},
};

/// Advances every placed building by one turn and settles the ones whose
/// cycle is complete and whose consumption bill the village can pay.
pub struct ProductionSystem;

impl ProductionSystem {
    pub fn new() -> Self {
        Self
    }
}

impl Default for ProductionSystem {
    fn default() -> Self {
        Self::new()
    }
}

impl System for ProductionSystem {
    fn name(&self) -> &str {
        "production"
    }

    fn run(&mut self, ctx: &TurnContext, state: &mut GameState) -> Result<()> {
        for village in &mut state.villages {
            run_village(ctx, village);
        }
        Ok(())
    }
}

fn run_village(ctx: &TurnContext, village: &mut Village) {
    let Village {
        buildings,
        inventory,
        terrain_bonuses,
        ..
    } = village;

    for instance in buildings.iter_mut() {
        // Unknown types pass through untouched.
        let Some(recipe) = ctx.catalog.resolve(instance) else {
            continue;
        };

        // Counters arrive from client snapshots and may sit at the top of the range.
        instance.turns_active = instance.turns_active.saturating_add(1);
        if instance.turns_active < recipe.cycle {
            continue;
        }
        // Short on inputs: keep accumulating until the bill can be paid.
        if !inventory.covers(recipe.consumption) {
            continue;
        }

        for (kind, amount) in recipe.consumption {
            inventory.subtract(*kind, *amount);
        }
        for (kind, amount) in recipe.production {
            let bonus = terrain_bonuses.get(kind).copied().unwrap_or(0.0);
            inventory.add(*kind, apply_bonus(*amount, bonus));
        }
        instance.turns_active = 0;
    }
}

/// `floor(base * (1 + bonus / 100))`.
pub fn apply_bonus(base: f64, bonus_percent: f64) -> f64 {
    (base * (1.0 + bonus_percent / 100.0)).floor()
}
