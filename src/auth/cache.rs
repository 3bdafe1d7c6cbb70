//! Cache do resultado de validação do token
//!
//! Uma única entrada: o último token validado, o resultado e quando.

use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use crate::utils::Clock;

/// Validade de uma entrada do cache
pub const TOKEN_CACHE_TTL: Duration = Duration::from_secs(5 * 60);

#[derive(Debug, Clone)]
struct CacheEntry {
    is_valid: bool,
    checked_at: i64,
    token: String,
}

#[derive(Debug)]
pub struct SessionCache {
    entry: Mutex<Option<CacheEntry>>,
    ttl_millis: i64,
    clock: Arc<dyn Clock>,
}

impl SessionCache {
    pub fn new(clock: Arc<dyn Clock>) -> Self {
        Self::with_ttl(clock, TOKEN_CACHE_TTL)
    }

    pub fn with_ttl(clock: Arc<dyn Clock>, ttl: Duration) -> Self {
        Self {
            entry: Mutex::new(None),
            ttl_millis: ttl.as_millis() as i64,
            clock,
        }
    }

    /// Registra o resultado da validação de `token` agora
    pub fn record_validation(&self, token: &str, is_valid: bool) {
        let entry = CacheEntry {
            is_valid,
            checked_at: self.clock.now_millis(),
            token: token.to_string(),
        };
        *self.entry.lock().unwrap_or_else(PoisonError::into_inner) = Some(entry);
    }

    /// Resultado em cache para `token`, se ainda dentro do TTL
    pub fn lookup(&self, token: &str) -> Option<bool> {
        let guard = self.entry.lock().unwrap_or_else(PoisonError::into_inner);
        let entry = guard.as_ref()?;

        if entry.token != token {
            return None;
        }
        if self.clock.now_millis() - entry.checked_at >= self.ttl_millis {
            return None;
        }
        Some(entry.is_valid)
    }

    pub fn is_cached(&self, token: &str) -> bool {
        self.lookup(token).is_some()
    }

    pub fn clear(&self) {
        *self.entry.lock().unwrap_or_else(PoisonError::into_inner) = None;
    }
}
