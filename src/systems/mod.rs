mod bookkeeping;
mod finance;
mod production;
mod supply;

pub use bookkeeping::BookkeepingSystem;
pub use finance::FinanceSystem;
pub use production::{apply_bonus, ProductionSystem};
pub use supply::SupplySystem;
