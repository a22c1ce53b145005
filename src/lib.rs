pub mod actions;
pub mod catalog;
pub mod components;
pub mod config;
pub mod engine;
pub mod lobby;
pub mod market;
pub mod protocol;
pub mod reconcile;
pub mod rng;
pub mod service;
pub mod systems;
pub mod web;
pub mod world;

pub use actions::{Action, ActionError};
pub use catalog::Catalog;
pub use config::{ConfigLoader, ServerConfig};
pub use engine::{Engine, EngineBuilder};
pub use service::GameService;
pub use world::{GameState, Village};
