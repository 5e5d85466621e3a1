//! The state manager: config resolution, world and player state, bootstrap,
//! and player profiles, all sharing one merge/version/write discipline.

mod bootstrap;
mod manager;
mod player;
mod profile;
mod world;

pub use manager::StateManager;
