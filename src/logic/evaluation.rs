use chrono::{DateTime, Duration, Utc};

use crate::logic::rules::TurfRules;
use crate::models::{Pitch, CRITICAL_CONDITION, MAX_CONDITION, MIN_CONDITION};

/// Condition points lost when rain exposure crosses the turf's tolerance.
const RAIN_DAMAGE: u8 = 2;

/// Advance a pitch by one evaluation cycle.
///
/// Pure transform: takes the persisted state plus a single "is it raining
/// right now" observation and returns the next state. The surrounding loop
/// performs all I/O. Sub-transitions run in a fixed order; later steps see the
/// outputs of earlier ones.
pub fn evaluate(
    pitch: &Pitch,
    is_raining_now: bool,
    now: DateTime<Utc>,
    rules: &TurfRules,
) -> Pitch {
    let mut next = pitch.clone();

    accumulate_rain(&mut next, is_raining_now);
    reschedule_due_to_rain(&mut next, is_raining_now, now, rules);
    apply_rain_damage(&mut next, rules);
    schedule_regular_maintenance(&mut next, now, rules);
    cancel_maintenance_if_critical(&mut next);

    // Stamped unconditionally, even when nothing else changed.
    next.last_checked_at = Some(now);
    next.updated_at = now;

    next
}

/// Rain extends the consecutive counter; a dry observation leaves it alone.
/// Only a damage event resets it.
fn accumulate_rain(pitch: &mut Pitch, is_raining_now: bool) {
    if is_raining_now {
        pitch.current_consecutive_rain_hours += 1;
    }
}

/// Rain in progress invalidates a maintenance window that hasn't started yet:
/// push it out to now + drying time.
fn reschedule_due_to_rain(
    pitch: &mut Pitch,
    is_raining_now: bool,
    now: DateTime<Utc>,
    rules: &TurfRules,
) {
    let scheduled_ahead = pitch
        .next_scheduled_maintenance
        .map(|at| at > now)
        .unwrap_or(false);

    if is_raining_now && scheduled_ahead {
        pitch.next_scheduled_maintenance =
            Some(now + Duration::hours(rules.drying_time(pitch.turf_type) as i64));
    }
}

/// A completed rain exposure cycle is a discrete damage event: condition
/// drops, floored at the minimum, and the counter starts over.
fn apply_rain_damage(pitch: &mut Pitch, rules: &TurfRules) {
    if pitch.current_consecutive_rain_hours >= rules.rain_tolerance(pitch.turf_type) {
        pitch.current_condition = pitch
            .current_condition
            .saturating_sub(RAIN_DAMAGE)
            .max(MIN_CONDITION);
        pitch.current_consecutive_rain_hours = 0;
    }
}

/// Degraded but not critical pitches with no pending maintenance get one at
/// now + drying time. Perfect pitches need none; critical pitches need
/// replacement instead.
fn schedule_regular_maintenance(pitch: &mut Pitch, now: DateTime<Utc>, rules: &TurfRules) {
    if pitch.next_scheduled_maintenance.is_none()
        && pitch.current_condition > CRITICAL_CONDITION
        && pitch.current_condition < MAX_CONDITION
    {
        pitch.next_scheduled_maintenance =
            Some(now + Duration::hours(rules.drying_time(pitch.turf_type) as i64));
    }
}

/// Below the critical floor, routine maintenance is superseded by the
/// replacement workflow.
fn cancel_maintenance_if_critical(pitch: &mut Pitch) {
    if pitch.current_condition <= CRITICAL_CONDITION {
        pitch.next_scheduled_maintenance = None;
    }
}
