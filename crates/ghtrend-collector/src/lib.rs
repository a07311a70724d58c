//! Periodic, rate-limited ingestion of repository snapshots.
//!
//! A [`Collector`] pulls repositories from a [`ghtrend_core::RepositorySource`]
//! one at a time, spacing fetches by a fixed throttle, and writes an identity
//! upsert followed by a snapshot append for each into a
//! [`ghtrend_db::SnapshotStore`].

mod collector;
mod cursor;
mod guard;
mod throttle;

pub use collector::{CollectError, Collector, CollectorSettings, RunOutcome};
pub use cursor::SourceCursor;
pub use guard::{FlightGuard, SingleFlight};
pub use throttle::Throttle;
