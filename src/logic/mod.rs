pub mod evaluation;
pub mod maintenance;
pub mod monitor;
pub mod rules;

pub use monitor::PitchMonitorService;
pub use rules::TurfRules;
