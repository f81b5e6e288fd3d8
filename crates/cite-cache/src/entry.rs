//! Stored cache entries and TTL arithmetic.

use chrono::{DateTime, TimeDelta, Utc};
use cite_core::ValidationResult;
use serde::{Deserialize, Serialize};

/// One cached validation result with its lifetime.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CacheEntry {
    pub result: ValidationResult,
    pub created_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
}

impl CacheEntry {
    /// Wrap `result` for storage. The stored copy never claims to be a hit.
    #[must_use]
    pub fn new(result: &ValidationResult, ttl: TimeDelta, now: DateTime<Utc>) -> Self {
        Self {
            result: result.with_cache_hit(false),
            created_at: now,
            expires_at: now.checked_add_signed(ttl).unwrap_or(DateTime::<Utc>::MAX_UTC),
        }
    }

    /// Expired once `now` reaches `expires_at`.
    #[must_use]
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        now >= self.expires_at
    }

    /// The copy handed to callers: flagged as a cache hit.
    #[must_use]
    pub fn hit(&self) -> ValidationResult {
        self.result.with_cache_hit(true)
    }
}

/// Convert configured seconds into a TTL, saturating on overflow.
#[must_use]
pub fn ttl_from_secs(secs: u64) -> TimeDelta {
    i64::try_from(secs)
        .ok()
        .and_then(TimeDelta::try_seconds)
        .unwrap_or(TimeDelta::MAX)
}

#[cfg(test)]
mod tests {
    use super::*;
    use cite_core::ValidationLevel;

    #[test]
    fn zero_ttl_expires_immediately() {
        let now = Utc::now();
        let entry = CacheEntry::new(
            &ValidationResult::new("x", ValidationLevel::Quick),
            TimeDelta::zero(),
            now,
        );
        assert!(entry.is_expired_at(now));
    }

    #[test]
    fn entry_lives_until_expiry() {
        let now = Utc::now();
        let entry = CacheEntry::new(
            &ValidationResult::new("x", ValidationLevel::Quick),
            ttl_from_secs(60),
            now,
        );
        assert!(!entry.is_expired_at(now + TimeDelta::seconds(59)));
        assert!(entry.is_expired_at(now + TimeDelta::seconds(60)));
    }

    #[test]
    fn stored_copy_is_not_a_hit_but_returned_copy_is() {
        let result = ValidationResult::new("x", ValidationLevel::Quick).with_cache_hit(true);
        let entry = CacheEntry::new(&result, ttl_from_secs(60), Utc::now());
        assert!(!entry.result.provenance.cache_hit);
        assert!(entry.hit().provenance.cache_hit);
        assert!(!entry.result.provenance.cache_hit);
    }

    #[test]
    fn huge_ttl_saturates() {
        let entry = CacheEntry::new(
            &ValidationResult::new("x", ValidationLevel::Quick),
            ttl_from_secs(u64::MAX),
            Utc::now(),
        );
        assert_eq!(entry.expires_at, DateTime::<Utc>::MAX_UTC);
    }
}
