use std::sync::atomic::AtomicBool;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

use super::session::SessionStore;
use super::InFlight;
use crate::navigation::{Navigator, DASHBOARD_PATH, LOGIN_PATH};

/// Resultado de um guard de rota
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GuardDecision {
    /// Pode exibir a rota
    Allow,
    /// Permanece na rota pública atual
    Stay,
    /// Navegação feita para outra rota
    Redirect(String),
    /// Outra verificação do mesmo guard está em andamento
    Pending,
    /// A tela saiu antes do fim da verificação; nada foi alterado
    Cancelled,
}

/// Guard de rotas protegidas: sem sessão válida, vai para o login
pub struct AuthRequiredGuard {
    session: Arc<SessionStore>,
    navigator: Arc<dyn Navigator>,
    in_progress: AtomicBool,
}

impl AuthRequiredGuard {
    pub fn new(session: Arc<SessionStore>, navigator: Arc<dyn Navigator>) -> Self {
        Self {
            session,
            navigator,
            in_progress: AtomicBool::new(false),
        }
    }

    pub async fn verify(&self, cancel: &CancellationToken) -> GuardDecision {
        let Some(_in_flight) = InFlight::acquire(&self.in_progress) else {
            return GuardDecision::Pending;
        };

        let session = self.session.snapshot().await;
        if session.token.is_none() {
            tracing::debug!("[AuthGuard] Sem token, redirecionando para login");
            return self.redirect(LOGIN_PATH);
        }

        if session.verified && session.user.is_some() {
            return GuardDecision::Allow;
        }

        match self.session.check_auth_cancellable(cancel).await {
            None => GuardDecision::Cancelled,
            Some(true) => GuardDecision::Allow,
            Some(false) => {
                tracing::debug!("[AuthGuard] Sessão inválida, redirecionando para login");
                self.redirect(LOGIN_PATH)
            }
        }
    }

    fn redirect(&self, path: &str) -> GuardDecision {
        self.navigator.redirect(path);
        GuardDecision::Redirect(path.to_string())
    }
}

/// Guard de rotas públicas (login, cadastro): com sessão válida, vai para o dashboard
pub struct RedirectIfAuthenticatedGuard {
    session: Arc<SessionStore>,
    navigator: Arc<dyn Navigator>,
    in_progress: AtomicBool,
}

impl RedirectIfAuthenticatedGuard {
    pub fn new(session: Arc<SessionStore>, navigator: Arc<dyn Navigator>) -> Self {
        Self {
            session,
            navigator,
            in_progress: AtomicBool::new(false),
        }
    }

    pub async fn verify(&self, cancel: &CancellationToken) -> GuardDecision {
        let session = self.session.snapshot().await;
        if session.token.is_none() {
            return GuardDecision::Stay;
        }

        if session.verified && session.user.is_some() {
            return self.redirect(DASHBOARD_PATH);
        }

        let Some(_in_flight) = InFlight::acquire(&self.in_progress) else {
            return GuardDecision::Stay;
        };

        match self.session.check_auth_cancellable(cancel).await {
            None => GuardDecision::Cancelled,
            Some(true) => self.redirect(DASHBOARD_PATH),
            Some(false) => GuardDecision::Stay,
        }
    }

    fn redirect(&self, path: &str) -> GuardDecision {
        tracing::debug!("[RedirectGuard] Sessão ativa, redirecionando para {}", path);
        self.navigator.redirect(path);
        GuardDecision::Redirect(path.to_string())
    }
}
