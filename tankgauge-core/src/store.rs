//! In-memory reference stores
//!
//! Hash-map backed implementations of the storage seams, used by the
//! tests and by deployments that keep hot state in memory and snapshot
//! elsewhere. The analytics upsert holds the map entry for the whole
//! read-modify-write, which gives the per-key atomicity the aggregator
//! requires.

use std::collections::HashMap;

use crate::analytics::{PeriodKey, PeriodRecord};
use crate::bucket::PeriodType;
use crate::errors::PersistenceResult;
use crate::history::VolumeRecord;
use crate::tank::TankId;
use crate::time::Timestamp;
use crate::traits::{AnalyticsStore, HistoryStore};

/// Append-only in-memory history store, one timestamp-ordered vec per tank
#[derive(Debug, Default)]
pub struct MemoryHistoryStore {
    records: HashMap<TankId, Vec<VolumeRecord>>,
}

impl MemoryHistoryStore {
    /// Empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Total records across all tanks
    pub fn len(&self) -> usize {
        self.records.values().map(Vec::len).sum()
    }

    /// Whether the store holds no records
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

impl HistoryStore for MemoryHistoryStore {
    fn append(&mut self, record: VolumeRecord) -> PersistenceResult<()> {
        let records = self.records.entry(record.tank_id.clone()).or_default();
        // Keep per-tank order even if a reading arrives late
        let at = records.partition_point(|r| r.timestamp <= record.timestamp);
        records.insert(at, record);
        Ok(())
    }

    fn latest(&self, tank: &TankId) -> PersistenceResult<Option<VolumeRecord>> {
        Ok(self
            .records
            .get(tank)
            .and_then(|records| records.last().cloned()))
    }

    fn range(
        &self,
        tank: &TankId,
        since: Timestamp,
        until: Timestamp,
    ) -> PersistenceResult<Vec<VolumeRecord>> {
        let mut out: Vec<VolumeRecord> = self
            .records
            .get(tank)
            .map(|records| {
                records
                    .iter()
                    .filter(|r| r.timestamp >= since && r.timestamp <= until)
                    .cloned()
                    .collect()
            })
            .unwrap_or_default();
        out.reverse(); // newest first
        Ok(out)
    }
}

/// Keyed in-memory analytics store with per-key atomic upsert
#[derive(Debug, Default)]
pub struct MemoryAnalyticsStore {
    buckets: HashMap<PeriodKey, PeriodRecord>,
}

impl MemoryAnalyticsStore {
    /// Empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of open buckets
    pub fn len(&self) -> usize {
        self.buckets.len()
    }

    /// Whether the store holds no buckets
    pub fn is_empty(&self) -> bool {
        self.buckets.is_empty()
    }
}

impl AnalyticsStore for MemoryAnalyticsStore {
    fn upsert_with<F>(&mut self, key: &PeriodKey, update: F) -> PersistenceResult<()>
    where
        F: FnOnce(Option<&PeriodRecord>) -> PeriodRecord,
    {
        let next = update(self.buckets.get(key));
        self.buckets.insert(key.clone(), next);
        Ok(())
    }

    fn get(&self, key: &PeriodKey) -> PersistenceResult<Option<PeriodRecord>> {
        Ok(self.buckets.get(key).cloned())
    }

    fn list(&self, tank: &TankId, period: PeriodType) -> PersistenceResult<Vec<PeriodRecord>> {
        let mut out: Vec<PeriodRecord> = self
            .buckets
            .values()
            .filter(|r| &r.key.tank_id == tank && r.key.period == period)
            .cloned()
            .collect();
        out.sort_by_key(|r| r.key.start);
        Ok(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analytics::FlowSample;

    fn tank() -> TankId {
        TankId::try_from("tank-1").unwrap()
    }

    fn sample(volume: f32, ts: Timestamp) -> FlowSample {
        FlowSample {
            volume_liters: volume,
            fill_percent: 50.0,
            quality_score: 80,
            mass_kg: None,
            timestamp: ts,
        }
    }

    #[test]
    fn upsert_creates_then_updates() {
        let mut store = MemoryAnalyticsStore::new();
        let key = PeriodKey::containing(tank(), PeriodType::Hourly, 1_710_000_000_000);

        let first = sample(100.0, 1_710_000_000_000);
        store
            .upsert_with(&key, |existing| {
                assert!(existing.is_none());
                PeriodRecord::open(key.clone(), &first)
            })
            .unwrap();

        let second = sample(120.0, 1_710_000_060_000);
        store
            .upsert_with(&key, |existing| {
                let mut record = existing.cloned().unwrap();
                record.apply(&second, Some(&first));
                record
            })
            .unwrap();

        let record = store.get(&key).unwrap().unwrap();
        assert_eq!(record.reading_count, 2);
        assert_eq!(record.total_added, 20.0);
    }

    #[test]
    fn list_orders_by_period_start() {
        let mut store = MemoryAnalyticsStore::new();
        for hour in [3u64, 1, 2] {
            let ts = 1_710_000_000_000 + hour * 3_600_000;
            let key = PeriodKey::containing(tank(), PeriodType::Hourly, ts);
            store
                .upsert_with(&key, |_| PeriodRecord::open(key.clone(), &sample(100.0, ts)))
                .unwrap();
        }
        let listed = store.list(&tank(), PeriodType::Hourly).unwrap();
        assert_eq!(listed.len(), 3);
        assert!(listed.windows(2).all(|w| w[0].key.start < w[1].key.start));
    }
}
