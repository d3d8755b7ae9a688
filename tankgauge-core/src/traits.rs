//! Validation and storage seams
//!
//! `Validate` is implemented by every configuration and input type; all
//! bounds are enforced there so the reading path can assume well-formed
//! data. The storage traits are the engine's only persistence surface -
//! the in-memory implementations in `store` are reference backends, and
//! a database-backed deployment swaps in its own without touching the
//! processing code.

use crate::errors::ValidationResult;

/// Self-validation of configuration and input types
///
/// Implementations check every documented bound and return the first
/// violation. Computed *outputs* are clamped instead - validation guards
/// inputs only.
pub trait Validate {
    /// Check all invariants, returning the first violation
    fn validate(&self) -> ValidationResult<()>;
}

#[cfg(feature = "std")]
mod storage {
    use crate::analytics::{PeriodKey, PeriodRecord};
    use crate::bucket::PeriodType;
    use crate::errors::PersistenceResult;
    use crate::history::VolumeRecord;
    use crate::tank::TankId;
    use crate::time::Timestamp;

    /// Append-only store of immutable volume history records
    ///
    /// Records for one tank are totally ordered by timestamp; `latest`
    /// and `range` observe that order. Implementations must not mutate
    /// stored records.
    pub trait HistoryStore {
        /// Append one immutable record
        fn append(&mut self, record: VolumeRecord) -> PersistenceResult<()>;

        /// Most recent record for a tank, if any
        fn latest(&self, tank: &TankId) -> PersistenceResult<Option<VolumeRecord>>;

        /// Records with `since <= timestamp <= until`, newest first
        fn range(
            &self,
            tank: &TankId,
            since: Timestamp,
            until: Timestamp,
        ) -> PersistenceResult<Vec<VolumeRecord>>;
    }

    /// Keyed store of mutable period analytics records
    ///
    /// The upsert is atomic per key: the closure observes the current
    /// record (or its absence) and produces the replacement, and no
    /// concurrent upsert for the same key may interleave.
    pub trait AnalyticsStore {
        /// Atomically read-modify-write the record under `key`
        fn upsert_with<F>(&mut self, key: &PeriodKey, update: F) -> PersistenceResult<()>
        where
            F: FnOnce(Option<&PeriodRecord>) -> PeriodRecord;

        /// Fetch the record under `key`, if present
        fn get(&self, key: &PeriodKey) -> PersistenceResult<Option<PeriodRecord>>;

        /// All records for one tank and period type, oldest first
        fn list(&self, tank: &TankId, period: PeriodType) -> PersistenceResult<Vec<PeriodRecord>>;
    }
}

#[cfg(feature = "std")]
pub use storage::{AnalyticsStore, HistoryStore};
