//! Resource ledger: total and available RAM, disk and CPU-core budgets.
//!
//! Counters sit behind their own `parking_lot::Mutex`. The simulator only mutates
//! the ledger while holding the registry write lock, so a check followed by an
//! allocation (or an eviction followed by a release) is atomic as a pair.

use parking_lot::Mutex;
use serde::{Deserialize, Serialize};

use crate::core::SimError;
use crate::util::serde::{ResourceKind, ResourceQuote};

/// Point-in-time view of the ledger for rendering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LedgerSnapshot {
    /// Configured capacity.
    pub total: ResourceQuote,
    /// Currently unallocated capacity.
    pub available: ResourceQuote,
}

impl LedgerSnapshot {
    /// Capacity currently held by live tasks.
    #[must_use]
    pub const fn used(&self) -> ResourceQuote {
        self.total.saturating_sub(self.available)
    }

    /// Percentage of a dimension in use, `0.0` when the dimension has no capacity.
    #[must_use]
    pub fn used_percent(&self, kind: ResourceKind) -> f64 {
        let total = self.total.get(kind);
        if total == 0 {
            return 0.0;
        }
        f64::from(self.used().get(kind)) / f64::from(total) * 100.0
    }
}

/// Shared capacity pool.
#[derive(Debug)]
pub struct ResourceLedger {
    total: ResourceQuote,
    available: Mutex<ResourceQuote>,
}

impl ResourceLedger {
    /// Create a ledger with all capacity available.
    #[must_use]
    pub fn new(total: ResourceQuote) -> Self {
        Self {
            total,
            available: Mutex::new(total),
        }
    }

    /// Configured capacity.
    #[must_use]
    pub const fn total(&self) -> ResourceQuote {
        self.total
    }

    /// Whether every dimension of `quote` fits in the current availability.
    #[must_use]
    pub fn available(&self, quote: &ResourceQuote) -> bool {
        quote.fits_within(&self.available.lock())
    }

    /// Like [`Self::available`], but reports the shortfall.
    ///
    /// # Errors
    ///
    /// [`SimError::ResourceExhausted`] naming the first short dimension.
    pub fn ensure_available(&self, quote: &ResourceQuote) -> Result<(), SimError> {
        let available = self.available.lock();
        shortfall(quote, &available)
    }

    /// Decrement availability by `quote` without re-validating.
    ///
    /// Callers must have confirmed availability first; prefer [`Self::try_allocate`].
    pub fn allocate(&self, quote: &ResourceQuote) {
        let mut available = self.available.lock();
        if !quote.fits_within(&available) {
            tracing::warn!(
                %quote,
                available = %*available,
                "allocation without prior availability check"
            );
        }
        *available = available.saturating_sub(*quote);
    }

    /// Check and allocate in one critical section.
    ///
    /// # Errors
    ///
    /// Returns [`SimError::ResourceExhausted`] and leaves the counters untouched
    /// when any dimension is short.
    pub fn try_allocate(&self, quote: &ResourceQuote) -> Result<(), SimError> {
        let mut available = self.available.lock();
        shortfall(quote, &available)?;
        *available = available.saturating_sub(*quote);
        tracing::debug!(%quote, available = %*available, "allocated");
        Ok(())
    }

    /// Return `quote` to the pool, reversing a prior allocation.
    pub fn release(&self, quote: &ResourceQuote) {
        let mut available = self.available.lock();
        let restored = available.saturating_add(*quote);
        if !restored.fits_within(&self.total) {
            tracing::warn!(%quote, total = %self.total, "release exceeds total capacity; clamping");
        }
        *available = restored.min(self.total);
        tracing::debug!(%quote, available = %*available, "released");
    }

    /// Current totals and availability.
    #[must_use]
    pub fn snapshot(&self) -> LedgerSnapshot {
        LedgerSnapshot {
            total: self.total,
            available: *self.available.lock(),
        }
    }
}

fn shortfall(requested: &ResourceQuote, available: &ResourceQuote) -> Result<(), SimError> {
    match requested.first_shortfall(available) {
        Some(short) => Err(SimError::ResourceExhausted {
            short,
            requested: *requested,
            available: *available,
        }),
        None => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ledger() -> ResourceLedger {
        ResourceLedger::new(ResourceQuote::new(100, 50, 4))
    }

    #[test]
    fn test_available_checks_every_dimension() {
        let ledger = ledger();
        assert!(ledger.available(&ResourceQuote::new(100, 50, 4)));
        assert!(!ledger.available(&ResourceQuote::new(101, 0, 0)));
        assert!(!ledger.available(&ResourceQuote::new(0, 51, 0)));
        assert!(!ledger.available(&ResourceQuote::new(0, 0, 5)));
    }

    #[test]
    fn test_allocate_then_release() {
        let ledger = ledger();
        let quote = ResourceQuote::new(60, 10, 2);
        ledger.allocate(&quote);
        assert_eq!(ledger.snapshot().available, ResourceQuote::new(40, 40, 2));
        assert_eq!(ledger.snapshot().used(), quote);
        ledger.release(&quote);
        assert_eq!(ledger.snapshot().available, ledger.total());
    }

    #[test]
    fn test_try_allocate_failure_leaves_ledger_unchanged() {
        let ledger = ledger();
        ledger.try_allocate(&ResourceQuote::new(90, 10, 1)).unwrap();
        let before = ledger.snapshot();

        let err = ledger.try_allocate(&ResourceQuote::new(20, 1, 1)).unwrap_err();
        assert!(matches!(
            err,
            SimError::ResourceExhausted { short: ResourceKind::Ram, .. }
        ));
        assert_eq!(ledger.snapshot(), before);
    }

    #[test]
    fn test_release_never_exceeds_total() {
        let ledger = ledger();
        ledger.release(&ResourceQuote::new(10, 10, 10));
        assert_eq!(ledger.snapshot().available, ledger.total());
    }

    #[test]
    fn test_used_percent() {
        let ledger = ledger();
        ledger.allocate(&ResourceQuote::new(25, 0, 1));
        let snap = ledger.snapshot();
        assert!((snap.used_percent(ResourceKind::Ram) - 25.0).abs() < f64::EPSILON);
        assert!((snap.used_percent(ResourceKind::Cores) - 25.0).abs() < f64::EPSILON);

        let empty = ResourceLedger::new(ResourceQuote::default()).snapshot();
        assert!(empty.used_percent(ResourceKind::Disk).abs() < f64::EPSILON);
    }
}
