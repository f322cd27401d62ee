pub mod battle;
pub mod classify;
pub mod config;
pub mod equipment;
pub mod error;
pub mod item;
pub mod model;
pub mod outcome;
pub mod player;
pub mod reported;
pub mod roster;
pub mod source;
pub mod teams;
pub mod watcher;

#[cfg(test)]
mod fixtures;
