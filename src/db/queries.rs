use crate::db::{Database, PitchStore};
use crate::error::{PitchWatchError, Result};
use crate::models::{Location, Pitch, TurfType, CRITICAL_CONDITION, MAX_CONDITION};
use chrono::{DateTime, Utc};
use rusqlite::{params, Row};
use tracing::warn;
use uuid::Uuid;

impl PitchStore for Database {
    fn list_pitches(&self) -> Result<Vec<Pitch>> {
        self.with_conn(|conn| {
            let mut stmt = conn.prepare("SELECT * FROM pitches ORDER BY name")?;
            let pitches = stmt
                .query_map([], row_to_pitch)?
                .filter_map(|r| r.ok())
                .collect();
            Ok(pitches)
        })
    }

    fn get_pitch(&self, id: Uuid) -> Result<Option<Pitch>> {
        self.with_conn(|conn| {
            conn.query_row(
                "SELECT * FROM pitches WHERE uuid = ?1",
                [id.to_string()],
                row_to_pitch,
            )
            .optional()
            .map_err(Into::into)
        })
    }

    fn create_pitch(&self, pitch: &Pitch) -> Result<()> {
        self.with_conn(|conn| {
            conn.execute(
                r#"
                INSERT INTO pitches
                    (uuid, name, city, country, latitude, longitude, turf_type,
                     current_condition, current_consecutive_rain_hours,
                     last_maintenance_date, next_scheduled_maintenance, replacement_date,
                     last_checked_at, created_at, updated_at, revision)
                VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15, ?16)
                "#,
                params![
                    pitch.uuid.to_string(),
                    pitch.name,
                    pitch.location.city,
                    pitch.location.country,
                    pitch.location.latitude,
                    pitch.location.longitude,
                    format!("{:?}", pitch.turf_type),
                    pitch.current_condition,
                    pitch.current_consecutive_rain_hours,
                    pitch.last_maintenance_date.map(|d| d.to_rfc3339()),
                    pitch.next_scheduled_maintenance.map(|d| d.to_rfc3339()),
                    pitch.replacement_date.map(|d| d.to_rfc3339()),
                    pitch.last_checked_at.map(|d| d.to_rfc3339()),
                    pitch.created_at.to_rfc3339(),
                    pitch.updated_at.to_rfc3339(),
                    pitch.revision,
                ],
            )?;
            Ok(())
        })
    }

    fn update_pitch(&self, pitch: &Pitch) -> Result<Pitch> {
        let affected = self.with_conn(|conn| {
            conn.execute(
                r#"
                UPDATE pitches SET
                    name = ?1, city = ?2, country = ?3, latitude = ?4, longitude = ?5,
                    turf_type = ?6, current_condition = ?7,
                    current_consecutive_rain_hours = ?8, last_maintenance_date = ?9,
                    next_scheduled_maintenance = ?10, replacement_date = ?11,
                    last_checked_at = ?12, updated_at = ?13, revision = revision + 1
                WHERE uuid = ?14 AND revision = ?15
                "#,
                params![
                    pitch.name,
                    pitch.location.city,
                    pitch.location.country,
                    pitch.location.latitude,
                    pitch.location.longitude,
                    format!("{:?}", pitch.turf_type),
                    pitch.current_condition,
                    pitch.current_consecutive_rain_hours,
                    pitch.last_maintenance_date.map(|d| d.to_rfc3339()),
                    pitch.next_scheduled_maintenance.map(|d| d.to_rfc3339()),
                    pitch.replacement_date.map(|d| d.to_rfc3339()),
                    pitch.last_checked_at.map(|d| d.to_rfc3339()),
                    pitch.updated_at.to_rfc3339(),
                    pitch.uuid.to_string(),
                    pitch.revision,
                ],
            )
            .map_err(Into::into)
        })?;

        if affected == 1 {
            let mut stored = pitch.clone();
            stored.revision += 1;
            return Ok(stored);
        }

        // Zero rows: either the pitch vanished or our revision is stale.
        match self.get_pitch(pitch.uuid)? {
            None => Err(PitchWatchError::NotFound(format!(
                "pitch {}",
                pitch.uuid
            ))),
            Some(current) => Err(PitchWatchError::Conflict(format!(
                "pitch {} is at revision {}, write was based on {}",
                pitch.uuid, current.revision, pitch.revision
            ))),
        }
    }

    fn delete_pitch(&self, id: Uuid) -> Result<bool> {
        self.with_conn(|conn| {
            let affected =
                conn.execute("DELETE FROM pitches WHERE uuid = ?1", [id.to_string()])?;
            Ok(affected > 0)
        })
    }

    fn pitches_needing_maintenance(&self) -> Result<Vec<Pitch>> {
        self.with_conn(|conn| {
            let mut stmt = conn.prepare(
                "SELECT * FROM pitches
                 WHERE current_condition > ?1 AND current_condition < ?2
                 ORDER BY current_condition",
            )?;
            let pitches = stmt
                .query_map(params![CRITICAL_CONDITION, MAX_CONDITION], row_to_pitch)?
                .filter_map(|r| r.ok())
                .collect();
            Ok(pitches)
        })
    }

    fn pitches_needing_replacement(&self) -> Result<Vec<Pitch>> {
        self.with_conn(|conn| {
            let mut stmt = conn.prepare(
                "SELECT * FROM pitches WHERE current_condition <= ?1 ORDER BY current_condition",
            )?;
            let pitches = stmt
                .query_map(params![CRITICAL_CONDITION], row_to_pitch)?
                .filter_map(|r| r.ok())
                .collect();
            Ok(pitches)
        })
    }
}

fn row_to_pitch(row: &Row) -> rusqlite::Result<Pitch> {
    let uuid_str: String = row.get("uuid")?;
    let turf_type_str: String = row.get("turf_type")?;
    let created_at_str: String = row.get("created_at")?;
    let updated_at_str: String = row.get("updated_at")?;

    let uuid = Uuid::parse_str(&uuid_str).map_err(|e| {
        rusqlite::Error::FromSqlConversionFailure(0, rusqlite::types::Type::Text, Box::new(e))
    })?;

    let turf_type = TurfType::from_str(&turf_type_str).unwrap_or_else(|| {
        warn!(
            turf_type = %turf_type_str,
            "Unknown turf_type in database, defaulting to Natural"
        );
        TurfType::Natural
    });

    Ok(Pitch {
        uuid,
        name: row.get("name")?,
        location: Location {
            city: row.get("city")?,
            country: row.get("country")?,
            latitude: row.get("latitude")?,
            longitude: row.get("longitude")?,
        },
        turf_type,
        current_condition: row.get("current_condition")?,
        current_consecutive_rain_hours: row.get("current_consecutive_rain_hours")?,
        last_maintenance_date: parse_optional_datetime(row.get("last_maintenance_date")?),
        next_scheduled_maintenance: parse_optional_datetime(row.get("next_scheduled_maintenance")?),
        replacement_date: parse_optional_datetime(row.get("replacement_date")?),
        last_checked_at: parse_optional_datetime(row.get("last_checked_at")?),
        created_at: DateTime::parse_from_rfc3339(&created_at_str)
            .map(|dt| dt.with_timezone(&Utc))
            .unwrap_or_else(|_| Utc::now()),
        updated_at: DateTime::parse_from_rfc3339(&updated_at_str)
            .map(|dt| dt.with_timezone(&Utc))
            .unwrap_or_else(|_| Utc::now()),
        revision: row.get("revision")?,
    })
}

fn parse_optional_datetime(value: Option<String>) -> Option<DateTime<Utc>> {
    value.and_then(|s| {
        DateTime::parse_from_rfc3339(&s)
            .map(|dt| dt.with_timezone(&Utc))
            .ok()
    })
}

trait OptionalExt<T> {
    fn optional(self) -> rusqlite::Result<Option<T>>;
}

impl<T> OptionalExt<T> for rusqlite::Result<T> {
    fn optional(self) -> rusqlite::Result<Option<T>> {
        match self {
            Ok(v) => Ok(Some(v)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e),
        }
    }
}
