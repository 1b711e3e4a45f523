//! Crate-level error for the process surface.
//!
//! Everything below the simulation loop absorbs rule, format and transport
//! failures itself. What reaches this type aborts the run.

use thiserror::Error;

use crate::cards::CatalogError;
use crate::core::ConfigError;
use crate::events::{EventLogError, ReconstructionError};
use crate::provider::ProviderError;
use crate::sim::SimulationError;

#[derive(Debug, Error)]
pub enum Error {
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),
    #[error("card catalog error: {0}")]
    Catalog(#[from] CatalogError),
    #[error("cannot resume game: {0}")]
    Reconstruction(#[from] ReconstructionError),
    #[error("event log error: {0}")]
    EventLog(#[from] EventLogError),
    #[error("provider setup failed: {0}")]
    Provider(#[from] ProviderError),
    #[error("simulation failed: {0}")]
    Simulation(#[from] SimulationError),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
