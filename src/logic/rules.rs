use crate::config::RulesConfig;
use crate::models::TurfType;

/// Hours a turf type needs to dry out before maintenance can proceed.
const DEFAULT_DRYING_TIME: TurfTable = TurfTable {
    natural: 36,
    hybrid: 24,
    artificial: 12,
};

/// Consecutive rain-hours a turf type withstands before condition damage.
const DEFAULT_RAIN_TOLERANCE: TurfTable = TurfTable {
    natural: 3,
    hybrid: 4,
    artificial: 6,
};

/// Hours keyed by turf type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TurfTable {
    pub natural: u32,
    pub hybrid: u32,
    pub artificial: u32,
}

impl TurfTable {
    pub fn get(&self, turf_type: TurfType) -> u32 {
        match turf_type {
            TurfType::Natural => self.natural,
            TurfType::Hybrid => self.hybrid,
            TurfType::Artificial => self.artificial,
        }
    }
}

/// Turf tolerance and drying tables.
///
/// Built once at startup, optionally overridden from config, never mutated
/// afterwards.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TurfRules {
    drying_time: TurfTable,
    rain_tolerance: TurfTable,
}

impl TurfRules {
    pub fn from_config(overrides: Option<&RulesConfig>) -> Self {
        let mut rules = Self::default();

        if let Some(cfg) = overrides {
            if let Some(ref dt) = cfg.drying_time_hours {
                rules.drying_time.natural = dt.natural.unwrap_or(rules.drying_time.natural);
                rules.drying_time.hybrid = dt.hybrid.unwrap_or(rules.drying_time.hybrid);
                rules.drying_time.artificial =
                    dt.artificial.unwrap_or(rules.drying_time.artificial);
            }
            if let Some(ref rt) = cfg.rain_tolerance_hours {
                rules.rain_tolerance.natural = rt.natural.unwrap_or(rules.rain_tolerance.natural);
                rules.rain_tolerance.hybrid = rt.hybrid.unwrap_or(rules.rain_tolerance.hybrid);
                rules.rain_tolerance.artificial =
                    rt.artificial.unwrap_or(rules.rain_tolerance.artificial);
            }
        }

        rules
    }

    /// Hours of drying before a maintenance window is viable for this turf.
    pub fn drying_time(&self, turf_type: TurfType) -> u32 {
        self.drying_time.get(turf_type)
    }

    /// Consecutive rain-hours this turf withstands before suffering damage.
    pub fn rain_tolerance(&self, turf_type: TurfType) -> u32 {
        self.rain_tolerance.get(turf_type)
    }
}

impl Default for TurfRules {
    fn default() -> Self {
        Self {
            drying_time: DEFAULT_DRYING_TIME,
            rain_tolerance: DEFAULT_RAIN_TOLERANCE,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::TurfHoursConfig;

    #[test]
    fn default_tables() {
        let rules = TurfRules::default();
        assert_eq!(rules.drying_time(TurfType::Natural), 36);
        assert_eq!(rules.drying_time(TurfType::Hybrid), 24);
        assert_eq!(rules.drying_time(TurfType::Artificial), 12);
        assert_eq!(rules.rain_tolerance(TurfType::Natural), 3);
        assert_eq!(rules.rain_tolerance(TurfType::Hybrid), 4);
        assert_eq!(rules.rain_tolerance(TurfType::Artificial), 6);
    }

    #[test]
    fn drying_decreases_with_moisture_retention() {
        let rules = TurfRules::default();
        assert!(rules.drying_time(TurfType::Natural) > rules.drying_time(TurfType::Hybrid));
        assert!(rules.drying_time(TurfType::Hybrid) > rules.drying_time(TurfType::Artificial));
    }

    #[test]
    fn tolerance_increases_with_artificial_content() {
        let rules = TurfRules::default();
        assert!(rules.rain_tolerance(TurfType::Artificial) > rules.rain_tolerance(TurfType::Hybrid));
        assert!(rules.rain_tolerance(TurfType::Hybrid) > rules.rain_tolerance(TurfType::Natural));
    }

    #[test]
    fn config_overrides_are_partial() {
        let cfg = RulesConfig {
            drying_time_hours: Some(TurfHoursConfig {
                natural: Some(48),
                hybrid: None,
                artificial: None,
            }),
            rain_tolerance_hours: None,
        };

        let rules = TurfRules::from_config(Some(&cfg));
        assert_eq!(rules.drying_time(TurfType::Natural), 48);
        assert_eq!(rules.drying_time(TurfType::Hybrid), 24);
        assert_eq!(rules.rain_tolerance(TurfType::Natural), 3);
    }

    #[test]
    fn no_config_means_defaults() {
        assert_eq!(TurfRules::from_config(None), TurfRules::default());
    }
}
