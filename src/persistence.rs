//! Saving and restoring a single creature across runs.
//!
//! Creatures are stored as pretty-printed JSON, including their genome,
//! Q-table, fitness and whatever per-generation state they held when saved.

use std::fs;
use std::io;
use std::path::Path;

use crate::compute::Creature;

/// Errors from encoding, decoding or file access.
#[derive(Debug, thiserror::Error)]
pub enum PersistenceError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
    #[error("Invalid creature data: {0}")]
    Codec(#[from] serde_json::Error),
}

/// Encode a creature.
pub fn to_bytes(creature: &Creature) -> Result<Vec<u8>, PersistenceError> {
    Ok(serde_json::to_vec_pretty(creature)?)
}

/// Decode a creature.
pub fn from_bytes(bytes: &[u8]) -> Result<Creature, PersistenceError> {
    Ok(serde_json::from_slice(bytes)?)
}

/// Write a creature to `path`, replacing any existing file.
pub fn save_creature<P: AsRef<Path>>(path: P, creature: &Creature) -> Result<(), PersistenceError> {
    fs::write(path, to_bytes(creature)?)?;
    Ok(())
}

/// Read a creature from `path`. A missing file yields `Ok(None)`.
pub fn load_creature<P: AsRef<Path>>(path: P) -> Result<Option<Creature>, PersistenceError> {
    match fs::read(path) {
        Ok(bytes) => from_bytes(&bytes).map(Some),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
        Err(e) => Err(e.into()),
    }
}
