//! Builders to construct simulator sessions from configuration.

pub mod sim_builder;

pub use sim_builder::{build_runner, build_session, build_simulator, Session, SharedJournal};
