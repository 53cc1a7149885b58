//! Plain-language insights over Medicare spending aggregates.
//!
//! Callers build an [`EntityContext`] for a provider, region, specialty or
//! procedure code and ask an [`InsightEngine`] for up to five short
//! statements about it. Generation is pure: the same context and thresholds
//! always yield the same insights.
//!
//! ```no_run
//! use spending_insights::{default_engine, EntityContext};
//!
//! let ctx = EntityContext::from_json_str(r#"{"domain":"region","code":"FL"}"#)?;
//! for insight in default_engine().generate_for(&ctx) {
//!     println!("{}", insight);
//! }
//! # Ok::<(), serde_json::Error>(())
//! ```

pub mod config;
pub mod error;
pub mod format;
pub mod insights;
pub mod types;

pub use config::DetectorConfig;
pub use error::EngineError;
pub use insights::engine::{default_engine, InsightEngine};
pub use insights::selector::MAX_INSIGHTS;
pub use insights::{Category, Insight};
pub use types::{
    Domain, EntityContext, ProcedureContext, ProviderContext, RegionContext, SpecialtyContext,
};
