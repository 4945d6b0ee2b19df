//! Per-(language, day) generation leases.
//!
//! Only one generation may run for a key at a time inside this process.
//! Waiters re-check the store after acquiring the lease, so concurrent misses
//! produce one oracle call instead of one per request. Separate processes are
//! not coordinated.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use chrono::NaiveDate;
use tokio::sync::{Mutex as AsyncMutex, OwnedMutexGuard};

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct FlightKey {
    pub language: String,
    pub day: NaiveDate,
}

impl FlightKey {
    pub fn new(language: &str, day: NaiveDate) -> Self {
        Self {
            language: language.to_string(),
            day,
        }
    }
}

#[derive(Default)]
pub struct GenerationFlights {
    leases: Mutex<HashMap<FlightKey, Arc<AsyncMutex<()>>>>,
}

impl GenerationFlights {
    pub fn new() -> Self {
        Self::default()
    }

    /// Waits for and takes the lease for `key`. Leases of earlier days are pruned.
    pub async fn acquire(&self, key: FlightKey) -> OwnedMutexGuard<()> {
        let lease = {
            let mut leases = self.leases.lock().unwrap_or_else(|e| e.into_inner());
            leases.retain(|k, _| k.day >= key.day);
            leases.entry(key).or_default().clone()
        };
        lease.lock_owned().await
    }

    /// True while some request holds the lease for `key`.
    pub fn is_in_flight(&self, key: &FlightKey) -> bool {
        let leases = self.leases.lock().unwrap_or_else(|e| e.into_inner());
        leases
            .get(key)
            .map(|lease| lease.try_lock().is_err())
            .unwrap_or(false)
    }
}
