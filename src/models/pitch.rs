use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Best possible condition rating.
pub const MAX_CONDITION: u8 = 10;

/// Worst possible condition rating; damage never drops a pitch below this.
pub const MIN_CONDITION: u8 = 1;

/// At or below this rating a pitch needs turf replacement, not maintenance.
pub const CRITICAL_CONDITION: u8 = 2;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TurfType {
    Natural,
    Artificial,
    Hybrid,
}

impl TurfType {
    pub fn as_str(&self) -> &'static str {
        match self {
            TurfType::Natural => "Natural",
            TurfType::Artificial => "Artificial",
            TurfType::Hybrid => "Hybrid",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "natural" => Some(TurfType::Natural),
            "artificial" => Some(TurfType::Artificial),
            "hybrid" => Some(TurfType::Hybrid),
            _ => None,
        }
    }
}

impl std::fmt::Display for TurfType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Where a pitch sits; latitude/longitude drive the weather lookup.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Location {
    pub city: String,
    pub country: String,
    pub latitude: f64,
    pub longitude: f64,
}

impl std::fmt::Display for Location {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}, {}", self.city, self.country)
    }
}

/// A tracked playing surface.
///
/// The monitor loop owns `current_condition`, `current_consecutive_rain_hours`,
/// `next_scheduled_maintenance` and `last_checked_at`. `replacement_date` and
/// `last_maintenance_date` are only touched by the admin surface.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Pitch {
    pub uuid: Uuid,
    pub name: String,
    pub location: Location,
    pub turf_type: TurfType,
    /// Condition rating from 1 (critical) to 10 (perfect).
    pub current_condition: u8,
    /// Contiguous evaluation cycles with active rain since the last damage event.
    pub current_consecutive_rain_hours: u32,
    pub last_maintenance_date: Option<DateTime<Utc>>,
    pub next_scheduled_maintenance: Option<DateTime<Utc>>,
    pub replacement_date: Option<DateTime<Utc>>,
    pub last_checked_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    /// Bumped on every persisted write; guards against stale read-modify-write.
    pub revision: i64,
}

impl Pitch {
    pub fn new(name: String, location: Location, turf_type: TurfType) -> Self {
        let now = Utc::now();
        Self {
            uuid: Uuid::new_v4(),
            name,
            location,
            turf_type,
            current_condition: MAX_CONDITION,
            current_consecutive_rain_hours: 0,
            last_maintenance_date: None,
            next_scheduled_maintenance: None,
            replacement_date: None,
            last_checked_at: None,
            created_at: now,
            updated_at: now,
            revision: 0,
        }
    }

    /// Degraded but not critical: eligible for regular maintenance scheduling.
    pub fn needs_maintenance(&self) -> bool {
        self.current_condition > CRITICAL_CONDITION && self.current_condition < MAX_CONDITION
    }

    /// At or below the critical floor: routine maintenance no longer applies.
    pub fn needs_replacement(&self) -> bool {
        self.current_condition <= CRITICAL_CONDITION
    }

    /// Whether a scheduled maintenance exists and its window has arrived.
    pub fn maintenance_due(&self, now: DateTime<Utc>) -> bool {
        self.next_scheduled_maintenance
            .map(|at| at <= now)
            .unwrap_or(false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_location() -> Location {
        Location {
            city: "Kaiserslautern".to_string(),
            country: "Germany".to_string(),
            latitude: 49.4343,
            longitude: 7.7767,
        }
    }

    #[test]
    fn turf_type_from_str_valid() {
        assert_eq!(TurfType::from_str("natural"), Some(TurfType::Natural));
        assert_eq!(TurfType::from_str("Natural"), Some(TurfType::Natural));
        assert_eq!(TurfType::from_str("ARTIFICIAL"), Some(TurfType::Artificial));
        assert_eq!(TurfType::from_str("hybrid"), Some(TurfType::Hybrid));
    }

    #[test]
    fn turf_type_from_str_invalid() {
        assert_eq!(TurfType::from_str("astroturf"), None);
        assert_eq!(TurfType::from_str(""), None);
    }

    #[test]
    fn turf_type_round_trip() {
        for turf_type in [TurfType::Natural, TurfType::Artificial, TurfType::Hybrid] {
            assert_eq!(TurfType::from_str(turf_type.as_str()), Some(turf_type));
        }
    }

    #[test]
    fn new_pitch_starts_perfect() {
        let pitch = Pitch::new("Fritz-Walter-Stadion".into(), sample_location(), TurfType::Natural);
        assert_eq!(pitch.current_condition, MAX_CONDITION);
        assert_eq!(pitch.current_consecutive_rain_hours, 0);
        assert!(pitch.next_scheduled_maintenance.is_none());
        assert!(pitch.last_checked_at.is_none());
        assert_eq!(pitch.revision, 0);
    }

    #[test]
    fn condition_bands() {
        let mut pitch = Pitch::new("Test".into(), sample_location(), TurfType::Hybrid);
        assert!(!pitch.needs_maintenance());
        assert!(!pitch.needs_replacement());

        pitch.current_condition = 5;
        assert!(pitch.needs_maintenance());
        assert!(!pitch.needs_replacement());

        pitch.current_condition = 2;
        assert!(!pitch.needs_maintenance());
        assert!(pitch.needs_replacement());

        pitch.current_condition = 1;
        assert!(pitch.needs_replacement());
    }

    #[test]
    fn maintenance_due_checks_window() {
        let now = Utc::now();
        let mut pitch = Pitch::new("Test".into(), sample_location(), TurfType::Artificial);
        assert!(!pitch.maintenance_due(now));

        pitch.next_scheduled_maintenance = Some(now + chrono::Duration::hours(2));
        assert!(!pitch.maintenance_due(now));

        pitch.next_scheduled_maintenance = Some(now - chrono::Duration::hours(2));
        assert!(pitch.maintenance_due(now));
    }
}
