//! Finished-report cache
use fps_core::report::SimulationReport;
use fps_core::schedule::Week;
use fps_core::sport::Sport;
use std::collections::BTreeMap;
use std::sync::{Arc, Mutex};

/// Cache key: one report per league per week.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub struct CacheKey {
    pub platform: String,
    pub league_id: String,
    pub season: i32,
    pub sport: Sport,
    pub week: Week,
}

/// In-memory result cache, shared across threads.
#[derive(Debug, Default, Clone)]
pub struct ResultCache {
    inner: Arc<Mutex<BTreeMap<CacheKey, SimulationReport>>>,
}

impl ResultCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, key: &CacheKey) -> Option<SimulationReport> {
        self.lock().get(key).cloned()
    }

    pub fn set(&self, key: CacheKey, report: SimulationReport) {
        self.lock().insert(key, report);
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, BTreeMap<CacheKey, SimulationReport>> {
        match self.inner.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }
}
