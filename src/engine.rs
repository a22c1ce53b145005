use std::time::Instant;

use anyhow::Result;
use tracing::debug;

use crate::{
    catalog::Catalog,
    systems::{BookkeepingSystem, FinanceSystem, ProductionSystem, SupplySystem},
    world::GameState,
};

pub struct EngineBuilder {
    catalog: Catalog,
    systems: Vec<Box<dyn System + Send>>,
}

impl EngineBuilder {
    pub fn new(catalog: Catalog) -> Self {
        Self {
            catalog,
            systems: Vec::new(),
        }
    }

    pub fn with_system(mut self, system: impl System + Send + 'static) -> Self {
        self.systems.push(Box::new(system));
        self
    }

    /// Supply, production, loan interest and bookkeeping, in that order.
    pub fn with_standard_systems(self) -> Self {
        self.with_system(SupplySystem::new())
            .with_system(ProductionSystem::new())
            .with_system(FinanceSystem::new())
            .with_system(BookkeepingSystem::new())
    }

    pub fn build(self) -> Engine {
        Engine {
            catalog: self.catalog,
            systems: self.systems,
        }
    }
}

/// The turn processor: runs every registered system over a copy of the
/// state and returns the next turn's state.
pub struct Engine {
    catalog: Catalog,
    systems: Vec<Box<dyn System + Send>>,
}

impl Engine {
    pub fn standard(catalog: Catalog) -> Self {
        EngineBuilder::new(catalog).with_standard_systems().build()
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    /// Produces the state for `state.current_turn + 1`. The input is never
    /// modified, so a failed system leaves the caller's state intact.
    pub fn advance(&mut self, state: &GameState) -> Result<GameState> {
        let mut next = state.clone();
        let ctx = TurnContext {
            turn: state.current_turn + 1,
            catalog: &self.catalog,
        };
        for system in &mut self.systems {
            let start = Instant::now();
            system.run(&ctx, &mut next)?;
            debug!(
                system = system.name(),
                turn = ctx.turn,
                duration_ms = start.elapsed().as_secs_f64() * 1_000.0,
                "system finished"
            );
        }
        next.current_turn = ctx.turn;
        Ok(next)
    }
}

pub struct TurnContext<'a> {
    /// Number of the turn being produced.
    pub turn: u64,
    pub catalog: &'a Catalog,
}

pub trait System {
    fn name(&self) -> &str;
    fn run(&mut self, ctx: &TurnContext, state: &mut GameState) -> Result<()>;
}
