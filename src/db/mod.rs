pub mod connection;
pub mod migrations;
pub mod queries;

pub use connection::Database;

use crate::error::Result;
use crate::models::Pitch;
use uuid::Uuid;

/// Durable storage of pitch entities.
///
/// `update_pitch` is a conditional write: it only succeeds if the stored
/// revision still matches the one the caller read, and bumps it on success.
/// A vanished row yields `NotFound`, a revision mismatch `Conflict`.
pub trait PitchStore: Send + Sync {
    fn list_pitches(&self) -> Result<Vec<Pitch>>;

    fn get_pitch(&self, id: Uuid) -> Result<Option<Pitch>>;

    fn create_pitch(&self, pitch: &Pitch) -> Result<()>;

    /// Write back a modified pitch, returning the stored state with its
    /// revision bumped.
    fn update_pitch(&self, pitch: &Pitch) -> Result<Pitch>;

    /// Returns false if no pitch with that id existed.
    fn delete_pitch(&self, id: Uuid) -> Result<bool>;

    /// Pitches with condition strictly between the critical floor and perfect.
    fn pitches_needing_maintenance(&self) -> Result<Vec<Pitch>>;

    /// Pitches at or below the critical floor.
    fn pitches_needing_replacement(&self) -> Result<Vec<Pitch>>;
}
