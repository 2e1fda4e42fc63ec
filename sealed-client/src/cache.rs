//! Certificate snapshot cache.
//!
//! Holds at most one certificate. Readers get an `Arc` to the current
//! snapshot; writers replace it whole.

use std::sync::{Arc, RwLock};
use std::time::Duration;

use sealed_envelope::PemCertificate;
use tokio::time::Instant;

/// Default snapshot lifetime.
pub const DEFAULT_TTL: Duration = Duration::from_secs(5 * 60);

/// A cached certificate and when it was stored.
#[derive(Clone, Debug)]
pub struct CachedCertificate {
    pub pem: PemCertificate,
    pub fetched_at: Instant,
}

/// Shared, injectable certificate cache.
#[derive(Debug)]
pub struct CertificateCache {
    slot: RwLock<Option<Arc<CachedCertificate>>>,
    ttl: Duration,
}

impl CertificateCache {
    pub fn new() -> Self {
        Self::with_ttl(DEFAULT_TTL)
    }

    pub fn with_ttl(ttl: Duration) -> Self {
        Self {
            slot: RwLock::new(None),
            ttl,
        }
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// The current snapshot, if one exists and is younger than the TTL.
    pub fn get(&self) -> Option<Arc<CachedCertificate>> {
        let slot = self.slot.read().unwrap_or_else(|e| e.into_inner());
        slot.as_ref()
            .filter(|c| c.fetched_at.elapsed() < self.ttl)
            .cloned()
    }

    pub fn set(&self, pem: PemCertificate) {
        let snapshot = Arc::new(CachedCertificate {
            pem,
            fetched_at: Instant::now(),
        });
        *self.slot.write().unwrap_or_else(|e| e.into_inner()) = Some(snapshot);
    }

    pub fn clear(&self) {
        *self.slot.write().unwrap_or_else(|e| e.into_inner()) = None;
    }
}

impl Default for CertificateCache {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pem(tag: &str) -> PemCertificate {
        PemCertificate::new(format!("-----BEGIN CERTIFICATE-----\n{}\n-----END CERTIFICATE-----", tag))
    }

    #[tokio::test(start_paused = true)]
    async fn test_set_get_clear() {
        let cache = CertificateCache::new();
        assert!(cache.get().is_none());

        cache.set(pem("AAAA"));
        assert_eq!(cache.get().unwrap().pem, pem("AAAA"));

        cache.clear();
        assert!(cache.get().is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn test_entry_expires_after_ttl() {
        let cache = CertificateCache::with_ttl(Duration::from_secs(60));
        cache.set(pem("AAAA"));

        tokio::time::advance(Duration::from_secs(59)).await;
        assert!(cache.get().is_some());

        tokio::time::advance(Duration::from_secs(1)).await;
        assert!(cache.get().is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn test_set_replaces_snapshot() {
        let cache = CertificateCache::new();
        cache.set(pem("AAAA"));
        let old = cache.get().unwrap();

        cache.set(pem("BBBB"));
        assert_eq!(cache.get().unwrap().pem, pem("BBBB"));
        // readers holding the old snapshot are unaffected
        assert_eq!(old.pem, pem("AAAA"));
    }
}
