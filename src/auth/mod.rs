//! # Autenticação e sessão
//!
//! ## Estrutura:
//! - `token.rs`: leitura local do JWT (expiração)
//! - `classify.rs`: detecção de e-mail já cadastrado
//! - `cache.rs`: cache de 5 minutos da validação do token
//! - `gateway.rs`: login/register/validate/me
//! - `session.rs`: estado da sessão com verificação espaçada
//! - `guards.rs`: guards de rota (login obrigatório / já autenticado)

pub mod cache;
pub mod classify;
pub mod gateway;
pub mod guards;
pub mod session;
pub mod token;

pub use cache::{SessionCache, TOKEN_CACHE_TTL};
pub use gateway::AuthGateway;
pub use guards::{AuthRequiredGuard, GuardDecision, RedirectIfAuthenticatedGuard};
pub use session::{Session, SessionPhase, SessionStore, MIN_AUTH_CHECK_INTERVAL};
pub use token::{decode_claims, is_token_expired, TokenClaims};

use std::sync::atomic::{AtomicBool, Ordering};

/// Marca "verificação em andamento" enquanto viva
///
/// Exclusão cooperativa: quem não consegue adquirir devolve o último
/// resultado conhecido em vez de repetir a chamada remota.
pub(crate) struct InFlight<'a>(&'a AtomicBool);

impl<'a> InFlight<'a> {
    pub(crate) fn acquire(flag: &'a AtomicBool) -> Option<Self> {
        flag.compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| Self(flag))
    }
}

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_in_flight_is_exclusive_and_released_on_drop() {
        let flag = AtomicBool::new(false);
        let first = InFlight::acquire(&flag);
        assert!(first.is_some());
        assert!(InFlight::acquire(&flag).is_none());
        drop(first);
        assert!(InFlight::acquire(&flag).is_some());
    }
}
