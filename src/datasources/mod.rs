pub mod openweathermap;

pub use openweathermap::OpenWeatherMapClient;

use crate::error::Result;
use crate::models::Location;
use async_trait::async_trait;

/// Live weather signal for a pitch location.
///
/// Implementations fail with `PitchWatchError::WeatherUnavailable` on
/// transport or upstream errors; the monitor loop treats that as a per-pitch
/// pipeline failure. Test doubles substitute at construction time.
#[async_trait]
pub trait WeatherProvider: Send + Sync {
    async fn is_raining_now(&self, location: &Location) -> Result<bool>;
}
