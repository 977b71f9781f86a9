use thiserror::Error;

use super::config::ConfigError;
use crate::core::models::error::ModelError;
use crate::core::models::ids::MoleculeId;

#[derive(Debug, Error)]
pub enum EngineError {
    #[error("Invalid configuration: {source}")]
    Config {
        #[from]
        source: ConfigError,
    },

    #[error("Model operation failed: {source}")]
    Model {
        #[from]
        source: ModelError,
    },

    #[error("Molecule not found in scene: {molecule:?}")]
    MoleculeNotFound { molecule: MoleculeId },

    #[error("Molecule {molecule:?} has no atom at index {atom_index}")]
    AtomNotFound {
        molecule: MoleculeId,
        atom_index: usize,
    },
}
