pub mod config;
pub mod diet;
pub mod error;
pub mod telemetry;

pub use diet::{
    DietSuitabilityService, EvidenceScorer, MemoryDietStore, RuleRegistry, ENGINE_VERSION,
};
