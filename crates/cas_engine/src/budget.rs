//! Resource bounds for polynomial factorization.
//!
//! Every strategy that can blow up combinatorially checks its bound *before*
//! committing to the expensive work, and falls through to the next strategy
//! (or returns the input unfactored) instead of exceeding it. The only hard
//! failures are the degree bound and cooperative cancellation.
//!
//! # Usage
//!
//! ```ignore
//! let abort = AbortFlag::new();
//! let budget = PolyBudget::default()
//!     .with_max_degree(32)
//!     .with_abort_flag(abort.clone());
//!
//! // from another thread / signal handler:
//! abort.abort();
//!
//! // long-running loops:
//! budget.check_abort()?;
//! ```

use crate::error::CasError;
use num_bigint::BigInt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

// =============================================================================
// AbortFlag
// =============================================================================

/// Shared cancellation flag checked cooperatively by long-running loops.
#[derive(Debug, Clone, Default)]
pub struct AbortFlag(Arc<AtomicBool>);

impl AbortFlag {
    pub fn new() -> Self {
        Self::default()
    }

    /// Request cancellation. Every holder of a clone observes it.
    pub fn abort(&self) {
        self.0.store(true, Ordering::Relaxed);
    }

    pub fn reset(&self) {
        self.0.store(false, Ordering::Relaxed);
    }

    pub fn is_aborted(&self) -> bool {
        self.0.load(Ordering::Relaxed)
    }
}

// =============================================================================
// PolyBudget
// =============================================================================

/// Limits for coefficient extraction and the factorization dispatcher.
#[derive(Clone, Debug)]
pub struct PolyBudget {
    /// Largest degree accepted by extraction and by the dispatcher.
    pub max_degree: usize,
    /// Largest integer magnitude whose divisors are enumerated
    /// (rational-root candidates, split-fallback values).
    pub max_divisor_search: u64,
    /// Degree ceiling for the linear-system split fallback.
    pub max_split_degree: usize,
    /// Number of interpolation candidates the split fallback may try.
    pub max_split_candidates: usize,
    /// Integer powers of sums expanded by the simplifier.
    pub max_binomial_exponent: u32,
    /// Iteration cap of the squarefree re-merge loop.
    pub max_merge_iterations: usize,
    /// Optional cancellation flag.
    pub abort: Option<AbortFlag>,
}

impl Default for PolyBudget {
    fn default() -> Self {
        Self {
            max_degree: 64,
            max_divisor_search: 1_000_000_000_000,
            max_split_degree: 10,
            max_split_candidates: 20_000,
            max_binomial_exponent: 64,
            max_merge_iterations: 256,
            abort: None,
        }
    }
}

impl PolyBudget {
    pub fn with_max_degree(mut self, max_degree: usize) -> Self {
        self.max_degree = max_degree;
        self
    }

    pub fn with_max_divisor_search(mut self, max: u64) -> Self {
        self.max_divisor_search = max;
        self
    }

    pub fn with_max_split_degree(mut self, max: usize) -> Self {
        self.max_split_degree = max;
        self
    }

    pub fn with_max_split_candidates(mut self, max: usize) -> Self {
        self.max_split_candidates = max;
        self
    }

    pub fn with_max_binomial_exponent(mut self, max: u32) -> Self {
        self.max_binomial_exponent = max;
        self
    }

    pub fn with_max_merge_iterations(mut self, max: usize) -> Self {
        self.max_merge_iterations = max;
        self
    }

    pub fn with_abort_flag(mut self, flag: AbortFlag) -> Self {
        self.abort = Some(flag);
        self
    }

    /// `Err(Aborted)` once the abort flag has been raised.
    #[inline]
    pub fn check_abort(&self) -> Result<(), CasError> {
        match &self.abort {
            Some(flag) if flag.is_aborted() => Err(CasError::Aborted),
            _ => Ok(()),
        }
    }

    /// `Err(DegreeLimitExceeded)` if `degree` is above `max_degree`.
    pub fn check_degree(&self, degree: usize) -> Result<(), CasError> {
        if degree > self.max_degree {
            return Err(CasError::DegreeLimitExceeded {
                degree,
                limit: self.max_degree,
            });
        }
        Ok(())
    }

    /// Whether divisors of `n` may be enumerated.
    pub fn allows_divisor_search(&self, n: &BigInt) -> bool {
        n.magnitude() <= &num_bigint::BigUint::from(self.max_divisor_search)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let b = PolyBudget::default();
        assert_eq!(b.max_degree, 64);
        assert_eq!(b.max_split_degree, 10);
        assert!(b.check_abort().is_ok());
    }

    #[test]
    fn test_abort_is_shared_between_clones() {
        let flag = AbortFlag::new();
        let budget = PolyBudget::default().with_abort_flag(flag.clone());
        assert!(budget.check_abort().is_ok());
        flag.abort();
        assert_eq!(budget.check_abort(), Err(CasError::Aborted));
        flag.reset();
        assert!(budget.clone().check_abort().is_ok());
    }

    #[test]
    fn test_degree_check() {
        let budget = PolyBudget::default().with_max_degree(4);
        assert!(budget.check_degree(4).is_ok());
        assert_eq!(
            budget.check_degree(5),
            Err(CasError::DegreeLimitExceeded { degree: 5, limit: 4 })
        );
    }

    #[test]
    fn test_divisor_search_bound() {
        let budget = PolyBudget::default().with_max_divisor_search(100);
        assert!(budget.allows_divisor_search(&BigInt::from(-100)));
        assert!(!budget.allows_divisor_search(&BigInt::from(101)));
    }
}
