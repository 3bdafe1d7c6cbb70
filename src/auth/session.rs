//! Estado da sessão
//!
//! `SessionStore` é criado explicitamente e compartilhado via `Arc`; todos
//! os guards e marcas de tempo são campos da instância.

use serde::Serialize;
use std::sync::atomic::AtomicBool;
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;
use tokio::sync::RwLock;
use tokio_util::sync::CancellationToken;

use super::gateway::AuthGateway;
use super::InFlight;
use crate::error::ApiResult;
use crate::models::{LoginCredentials, RegisterCredentials, User};
use crate::storage::USER_KEY;
use crate::utils::Clock;

/// Intervalo mínimo entre verificações completas com o mesmo token
pub const MIN_AUTH_CHECK_INTERVAL: Duration = Duration::from_millis(3000);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionPhase {
    Unauthenticated,
    Verifying,
    Authenticated,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Session {
    pub user: Option<User>,
    pub token: Option<String>,
    pub verified: bool,
    pub loading: bool,
    pub error: Option<String>,
    pub email_already_exists: bool,
}

impl Session {
    pub fn phase(&self) -> SessionPhase {
        if self.loading || (self.token.is_some() && !self.verified) {
            SessionPhase::Verifying
        } else if self.token.is_some() && self.user.is_some() {
            SessionPhase::Authenticated
        } else {
            SessionPhase::Unauthenticated
        }
    }

    pub fn is_authenticated(&self) -> bool {
        self.phase() == SessionPhase::Authenticated
    }

    /// Resultado da última verificação concluída
    fn last_known(&self) -> bool {
        self.verified && self.user.is_some()
    }
}

/// Quando e com qual token a última verificação completa começou
#[derive(Debug, Clone)]
struct CheckMark {
    at: i64,
    token: String,
}

pub struct SessionStore {
    gateway: AuthGateway,
    state: RwLock<Session>,
    last_check: Mutex<Option<CheckMark>>,
    verifying: AtomicBool,
    clock: Arc<dyn Clock>,
    min_check_interval_millis: i64,
}

impl SessionStore {
    /// Cria o store com o token persistido (usuário ainda não verificado)
    pub fn new(gateway: AuthGateway) -> Self {
        let clock = gateway.clock().clone();
        let session = Session {
            token: gateway.stored_token(),
            ..Session::default()
        };

        Self {
            gateway,
            state: RwLock::new(session),
            last_check: Mutex::new(None),
            verifying: AtomicBool::new(false),
            clock,
            min_check_interval_millis: MIN_AUTH_CHECK_INTERVAL.as_millis() as i64,
        }
    }

    pub fn with_min_check_interval(mut self, interval: Duration) -> Self {
        self.min_check_interval_millis = interval.as_millis() as i64;
        self
    }

    pub fn gateway(&self) -> &AuthGateway {
        &self.gateway
    }

    pub async fn snapshot(&self) -> Session {
        self.sync_with_storage().await;
        self.state.read().await.clone()
    }

    pub async fn is_authenticated(&self) -> bool {
        self.sync_with_storage().await;
        self.state.read().await.is_authenticated()
    }

    pub async fn login(&self, email: &str, password: &str) -> ApiResult<User> {
        self.begin_attempt().await;

        let credentials = LoginCredentials {
            email: email.to_string(),
            password: password.to_string(),
        };

        match self.gateway.login(&credentials).await {
            Ok(response) => {
                self.authenticated(response.user.clone(), response.token).await;
                Ok(response.user)
            }
            Err(e) => {
                tracing::error!("[AuthStore] Erro ao login: {}", e);
                let mut state = self.state.write().await;
                state.error = Some(e.user_message());
                state.loading = false;
                Err(e)
            }
        }
    }

    pub async fn register(
        &self,
        email: &str,
        password: &str,
        name: Option<&str>,
    ) -> ApiResult<User> {
        self.begin_attempt().await;

        let credentials = RegisterCredentials {
            email: email.to_string(),
            password: password.to_string(),
            name: name.map(str::to_string),
        };

        match self.gateway.register(&credentials).await {
            Ok(response) => {
                self.authenticated(response.user.clone(), response.token).await;
                Ok(response.user)
            }
            Err(e) => {
                tracing::error!(
                    "[AuthStore] Erro ao registrar (status {:?}, e-mail duplicado: {}): {}",
                    e.status(),
                    e.is_email_exists(),
                    e
                );
                let mut state = self.state.write().await;
                state.error = Some(e.user_message());
                state.email_already_exists = e.is_email_exists();
                state.loading = false;
                Err(e)
            }
        }
    }

    pub async fn logout(&self) {
        self.gateway.logout();
        *self.last_check.lock().unwrap_or_else(PoisonError::into_inner) = None;

        let mut state = self.state.write().await;
        state.user = None;
        state.token = None;
        state.verified = false;
        tracing::info!("[AuthStore] Sessão encerrada");
    }

    /// Verificação espaçada da sessão
    ///
    /// Sem token: `false` imediatamente. Verificação concluída há menos do
    /// intervalo mínimo com o mesmo token: reaproveita o resultado.
    /// Caso contrário: expiração local, cache, `/auth/validate` e `/auth/me`.
    pub async fn check_auth(&self) -> bool {
        let never = CancellationToken::new();
        self.check_auth_cancellable(&never).await.unwrap_or(false)
    }

    /// Como `check_auth`, mas descartável
    ///
    /// `None` quando `cancel` dispara antes do fim da verificação remota;
    /// nesse caso o estado da sessão não é alterado (além de `loading`).
    pub async fn check_auth_cancellable(&self, cancel: &CancellationToken) -> Option<bool> {
        self.sync_with_storage().await;
        let now = self.clock.now_millis();

        let token = {
            let mut state = self.state.write().await;
            match state.token.clone() {
                Some(token) => token,
                None => {
                    tracing::debug!("[AuthStore] checkAuth: sem token");
                    state.user = None;
                    state.verified = true;
                    state.loading = false;
                    return Some(false);
                }
            }
        };

        if self.recently_checked(&token, now) {
            let state = self.state.read().await;
            if state.verified {
                tracing::debug!(
                    "[AuthStore] checkAuth: verificação recente, reusando resultado ({})",
                    state.last_known()
                );
                return Some(state.last_known());
            }
        }

        let Some(_in_flight) = InFlight::acquire(&self.verifying) else {
            tracing::debug!("[AuthStore] checkAuth: verificação já em andamento");
            return Some(self.state.read().await.last_known());
        };

        tracing::debug!("[AuthStore] checkAuth: executando verificação completa");
        self.state.write().await.loading = true;

        let outcome = tokio::select! {
            biased;
            _ = cancel.cancelled() => None,
            user = self.verify_remote() => Some(user),
        };

        let mut state = self.state.write().await;
        state.loading = false;

        let user = match outcome {
            Some(user) => user,
            None => {
                tracing::debug!("[AuthStore] checkAuth: cancelado, resultado descartado");
                return None;
            }
        };

        *self.last_check.lock().unwrap_or_else(PoisonError::into_inner) = Some(CheckMark {
            at: now,
            token,
        });

        state.verified = true;
        match user {
            Some(user) => {
                state.user = Some(user);
                state.error = None;
                Some(true)
            }
            None => {
                state.user = None;
                state.token = None;
                Some(false)
            }
        }
    }

    /// Troca o token da sessão (e o persistido)
    pub async fn set_token(&self, token: Option<String>) -> ApiResult<()> {
        let mut state = self.state.write().await;
        if state.token == token {
            return Ok(());
        }

        self.gateway.store_token(token.as_deref())?;
        // usuário persistido pertence ao token anterior
        self.gateway.api().storage().remove(USER_KEY)?;

        state.token = token;
        state.user = None;
        state.verified = false;
        Ok(())
    }

    pub async fn clear_errors(&self) {
        let mut state = self.state.write().await;
        state.error = None;
        state.email_already_exists = false;
    }

    async fn begin_attempt(&self) {
        let mut state = self.state.write().await;
        state.loading = true;
        state.error = None;
        state.email_already_exists = false;
    }

    async fn authenticated(&self, user: User, token: String) {
        let mut state = self.state.write().await;
        state.user = Some(user);
        state.token = Some(token);
        state.verified = true;
        state.loading = false;
        state.error = None;
    }

    /// Alinha a sessão em memória com o token persistido
    ///
    /// Um 401/403 em qualquer rota remove o token do armazenamento; a partir
    /// daí a sessão deixa de estar autenticada e a marca de verificação
    /// recente não vale mais.
    async fn sync_with_storage(&self) {
        let stored = self.gateway.stored_token();
        let mut state = self.state.write().await;
        if state.token == stored {
            return;
        }

        tracing::info!(
            "[AuthStore] Token persistido mudou fora da sessão (presente: {}), descartando usuário",
            stored.is_some()
        );
        *self.last_check.lock().unwrap_or_else(PoisonError::into_inner) = None;
        state.token = stored;
        state.user = None;
        state.verified = false;
    }

    fn recently_checked(&self, token: &str, now: i64) -> bool {
        self.last_check
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .as_ref()
            .map(|mark| mark.token == token && now - mark.at < self.min_check_interval_millis)
            .unwrap_or(false)
    }

    async fn verify_remote(&self) -> Option<User> {
        if !self.gateway.validate_token().await {
            return None;
        }
        self.gateway.current_user().await
    }
}

impl std::fmt::Debug for SessionStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionStore")
            .field("gateway", &self.gateway)
            .field("min_check_interval_millis", &self.min_check_interval_millis)
            .finish_non_exhaustive()
    }
}
