//! Operator-triggered pitch transitions, invoked from the admin surface
//! rather than the periodic loop. Both write through the same
//! revision-checked update as the monitor, so a concurrent evaluation of the
//! same pitch turns into a rejected stale write instead of a silent overwrite.

use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::db::PitchStore;
use crate::error::{PitchWatchError, Result};
use crate::models::{Pitch, MAX_CONDITION};

/// Carry out a scheduled maintenance that has come due.
///
/// Rejected when no maintenance is scheduled or the window hasn't arrived.
/// On success the pitch is restored to perfect condition, the rain counter
/// is cleared, and the maintenance slot is consumed; the periodic loop will
/// schedule the next one when the pitch degrades again.
pub fn execute_due_maintenance(
    store: &dyn PitchStore,
    id: Uuid,
    now: DateTime<Utc>,
) -> Result<Pitch> {
    let mut pitch = store
        .get_pitch(id)?
        .ok_or_else(|| PitchWatchError::NotFound(format!("pitch {}", id)))?;

    if !pitch.maintenance_due(now) {
        return Err(PitchWatchError::InvalidData(format!(
            "pitch {} has no maintenance due",
            id
        )));
    }

    pitch.current_condition = MAX_CONDITION;
    pitch.current_consecutive_rain_hours = 0;
    pitch.last_maintenance_date = Some(now);
    pitch.next_scheduled_maintenance = None;
    pitch.updated_at = now;

    store.update_pitch(&pitch)
}

/// Record a future turf replacement date.
///
/// Independent of the maintenance cycle; rejected unless the date is strictly
/// in the future.
pub fn schedule_replacement(
    store: &dyn PitchStore,
    id: Uuid,
    date: DateTime<Utc>,
    now: DateTime<Utc>,
) -> Result<Pitch> {
    if date <= now {
        return Err(PitchWatchError::InvalidData(format!(
            "replacement date {} is not in the future",
            date.to_rfc3339()
        )));
    }

    let mut pitch = store
        .get_pitch(id)?
        .ok_or_else(|| PitchWatchError::NotFound(format!("pitch {}", id)))?;

    pitch.replacement_date = Some(date);
    pitch.updated_at = now;

    store.update_pitch(&pitch)
}
