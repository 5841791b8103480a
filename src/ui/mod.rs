//! Terminal presentation
//!
//! Renders simulation events and turns typed lines into playback commands.
//! Nothing here feeds back into the simulation except through [`Command`]s.
//!
//! [`Command`]: crate::simulation::Command

pub mod commands;
pub mod console;
pub mod json;

pub use commands::{spawn_stdin_reader, ShortcutManager};
pub use console::ConsolePresenter;
pub use json::JsonPresenter;

use crate::simulation::SimulationEvent;
use anyhow::Result;

/// Consumer of simulation output
pub trait Presenter {
    fn present(&mut self, event: &SimulationEvent) -> Result<()>;

    /// Called once when the driver stops
    fn finish(&mut self) -> Result<()> {
        Ok(())
    }
}
