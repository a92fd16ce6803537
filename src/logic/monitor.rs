use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;

use crate::config::MonitorConfig;
use crate::datasources::WeatherProvider;
use crate::db::PitchStore;
use crate::error::Result;
use crate::logic::evaluation;
use crate::logic::rules::TurfRules;
use crate::models::Pitch;

/// Periodic health-evaluation engine.
///
/// On a fixed cadence, reads every pitch, fans out one evaluation pipeline
/// per pitch (weather query → pure transform → write back) and waits for the
/// whole fan-out to settle before sleeping again. Cycles never overlap: a
/// long cycle delays the next tick instead of running concurrently with it.
pub struct PitchMonitorService {
    store: Arc<dyn PitchStore>,
    weather: Arc<dyn WeatherProvider>,
    rules: Arc<TurfRules>,
    interval: Duration,
    max_concurrent_checks: usize,
}

/// Fan-in summary of a single evaluation cycle.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CycleOutcome {
    pub evaluated: usize,
    pub failed: usize,
}

impl PitchMonitorService {
    pub fn new(
        store: Arc<dyn PitchStore>,
        weather: Arc<dyn WeatherProvider>,
        rules: TurfRules,
        config: &MonitorConfig,
    ) -> Self {
        Self {
            store,
            weather,
            rules: Arc::new(rules),
            interval: Duration::from_secs(config.interval_secs),
            max_concurrent_checks: config.max_concurrent_checks,
        }
    }

    /// Drive evaluation cycles until `cancel` is triggered.
    pub async fn run(&self, cancel: CancellationToken) {
        tracing::info!(
            interval_secs = self.interval.as_secs(),
            max_concurrent_checks = self.max_concurrent_checks,
            "Pitch monitor started"
        );

        let mut interval = tokio::time::interval(self.interval);
        interval.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                _ = cancel.cancelled() => {
                    tracing::info!("Pitch monitor stopping");
                    break;
                }
                _ = interval.tick() => {
                    match self.run_cycle().await {
                        Ok(outcome) => {
                            tracing::info!(
                                evaluated = outcome.evaluated,
                                failed = outcome.failed,
                                "Evaluation cycle complete"
                            );
                        }
                        Err(e) => {
                            // Nothing to fan out over; wait for the next tick.
                            tracing::error!(error = %e, "Evaluation cycle skipped");
                        }
                    }
                }
            }
        }
    }

    /// Run a single evaluation cycle over every stored pitch.
    ///
    /// Public so tests and `run --once` can drive cycles without a timer.
    pub async fn run_cycle(&self) -> Result<CycleOutcome> {
        let pitches = self.store.list_pitches()?;
        if pitches.is_empty() {
            tracing::debug!("No pitches to evaluate");
            return Ok(CycleOutcome::default());
        }

        let semaphore = Arc::new(Semaphore::new(self.max_concurrent_checks));
        let mut pipelines = JoinSet::new();

        for pitch in pitches {
            let store = Arc::clone(&self.store);
            let weather = Arc::clone(&self.weather);
            let rules = Arc::clone(&self.rules);
            let semaphore = Arc::clone(&semaphore);

            pipelines.spawn(async move {
                let _permit = semaphore.acquire_owned().await.ok();
                let uuid = pitch.uuid;
                let result = check_pitch(store.as_ref(), weather.as_ref(), &rules, &pitch).await;
                (uuid, result)
            });
        }

        let mut outcome = CycleOutcome::default();
        while let Some(joined) = pipelines.join_next().await {
            match joined {
                Ok((_, Ok(()))) => outcome.evaluated += 1,
                Ok((uuid, Err(e))) => {
                    outcome.failed += 1;
                    tracing::warn!(pitch = %uuid, error = %e, "Pitch evaluation failed");
                }
                Err(e) => {
                    outcome.failed += 1;
                    tracing::warn!(error = %e, "Pitch evaluation task aborted");
                }
            }
        }

        Ok(outcome)
    }
}

/// One per-pitch pipeline: observe, transform, persist.
async fn check_pitch(
    store: &dyn PitchStore,
    weather: &dyn WeatherProvider,
    rules: &TurfRules,
    pitch: &Pitch,
) -> Result<()> {
    let is_raining_now = weather.is_raining_now(&pitch.location).await?;
    let next = evaluation::evaluate(pitch, is_raining_now, Utc::now(), rules);
    store.update_pitch(&next)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::Database;
    use crate::error::PitchWatchError;
    use crate::models::{Location, TurfType};
    use async_trait::async_trait;

    /// Weather double: fixed observation, with an optional city that always
    /// fails the query.
    struct FixedWeather {
        raining: bool,
        failing_city: Option<&'static str>,
    }

    #[async_trait]
    impl WeatherProvider for FixedWeather {
        async fn is_raining_now(&self, location: &Location) -> Result<bool> {
            if Some(location.city.as_str()) == self.failing_city {
                return Err(PitchWatchError::WeatherUnavailable(
                    "upstream down".to_string(),
                ));
            }
            Ok(self.raining)
        }
    }

    fn pitch_in(city: &str, turf_type: TurfType) -> Pitch {
        Pitch::new(
            format!("{} Ground", city),
            Location {
                city: city.to_string(),
                country: "Germany".to_string(),
                latitude: 49.4343,
                longitude: 7.7767,
            },
            turf_type,
        )
    }

    fn service(store: Arc<Database>, weather: Arc<dyn WeatherProvider>) -> PitchMonitorService {
        let config = MonitorConfig {
            interval_secs: 30,
            max_concurrent_checks: 4,
        };
        PitchMonitorService::new(store, weather, TurfRules::default(), &config)
    }

    #[tokio::test]
    async fn cycle_evaluates_and_persists_every_pitch() {
        let db = Arc::new(Database::open_in_memory().unwrap());
        let first = pitch_in("Kaiserslautern", TurfType::Natural);
        let second = pitch_in("Dortmund", TurfType::Artificial);
        db.create_pitch(&first).unwrap();
        db.create_pitch(&second).unwrap();

        let monitor = service(
            Arc::clone(&db),
            Arc::new(FixedWeather {
                raining: true,
                failing_city: None,
            }),
        );

        let outcome = monitor.run_cycle().await.unwrap();
        assert_eq!(outcome, CycleOutcome { evaluated: 2, failed: 0 });

        for id in [first.uuid, second.uuid] {
            let stored = db.get_pitch(id).unwrap().unwrap();
            assert_eq!(stored.current_consecutive_rain_hours, 1);
            assert!(stored.last_checked_at.is_some());
            assert_eq!(stored.revision, 1);
        }
    }

    #[tokio::test]
    async fn failing_pitch_does_not_affect_siblings() {
        let db = Arc::new(Database::open_in_memory().unwrap());
        let doomed = pitch_in("Atlantis", TurfType::Hybrid);
        let healthy = pitch_in("Dortmund", TurfType::Hybrid);
        db.create_pitch(&doomed).unwrap();
        db.create_pitch(&healthy).unwrap();

        let monitor = service(
            Arc::clone(&db),
            Arc::new(FixedWeather {
                raining: true,
                failing_city: Some("Atlantis"),
            }),
        );

        let outcome = monitor.run_cycle().await.unwrap();
        assert_eq!(outcome, CycleOutcome { evaluated: 1, failed: 1 });

        let untouched = db.get_pitch(doomed.uuid).unwrap().unwrap();
        assert_eq!(untouched.current_consecutive_rain_hours, 0);
        assert!(untouched.last_checked_at.is_none());

        let evaluated = db.get_pitch(healthy.uuid).unwrap().unwrap();
        assert_eq!(evaluated.current_consecutive_rain_hours, 1);
        assert!(evaluated.last_checked_at.is_some());
    }

    #[tokio::test]
    async fn empty_store_yields_empty_cycle() {
        let db = Arc::new(Database::open_in_memory().unwrap());
        let monitor = service(
            Arc::clone(&db),
            Arc::new(FixedWeather {
                raining: false,
                failing_city: None,
            }),
        );

        let outcome = monitor.run_cycle().await.unwrap();
        assert_eq!(outcome, CycleOutcome::default());
    }

    #[tokio::test]
    async fn consecutive_cycles_accumulate_rain_damage() {
        // Natural tolerance 3: three rainy cycles produce one damage event.
        let db = Arc::new(Database::open_in_memory().unwrap());
        let pitch = pitch_in("Kaiserslautern", TurfType::Natural);
        db.create_pitch(&pitch).unwrap();

        let monitor = service(
            Arc::clone(&db),
            Arc::new(FixedWeather {
                raining: true,
                failing_city: None,
            }),
        );

        for _ in 0..3 {
            monitor.run_cycle().await.unwrap();
        }

        let stored = db.get_pitch(pitch.uuid).unwrap().unwrap();
        assert_eq!(stored.current_condition, 8);
        assert_eq!(stored.current_consecutive_rain_hours, 0);
        assert!(stored.next_scheduled_maintenance.is_some());
        assert_eq!(stored.revision, 3);
    }

    #[tokio::test]
    async fn run_stops_on_cancellation() {
        let db = Arc::new(Database::open_in_memory().unwrap());
        let monitor = service(
            Arc::clone(&db),
            Arc::new(FixedWeather {
                raining: false,
                failing_city: None,
            }),
        );

        let cancel = CancellationToken::new();
        cancel.cancel();

        // Returns promptly instead of looping forever.
        monitor.run(cancel).await;
    }
}
