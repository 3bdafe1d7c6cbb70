//! Chamadas de autenticação contra a API
//!
//! login/register/validate/me e o logout local. O transporte (`ApiClient`)
//! já classificou os erros; aqui só decidimos o que persistir e quando
//! derrubar a sessão.

use serde_json::Value;
use std::sync::Arc;

use super::cache::SessionCache;
use super::token::is_token_expired;
use crate::client::ApiClient;
use crate::error::{ApiError, ApiResult};
use crate::models::{AuthResponse, LoginCredentials, RegisterCredentials, User};
use crate::storage::{TOKEN_KEY, USER_KEY};
use crate::utils::string_utils::token_preview;
use crate::utils::Clock;

#[derive(Debug)]
pub struct AuthGateway {
    api: ApiClient,
    cache: SessionCache,
    clock: Arc<dyn Clock>,
}

impl AuthGateway {
    pub fn new(api: ApiClient, cache: SessionCache, clock: Arc<dyn Clock>) -> Self {
        Self { api, cache, clock }
    }

    pub fn api(&self) -> &ApiClient {
        &self.api
    }

    pub fn clock(&self) -> &Arc<dyn Clock> {
        &self.clock
    }

    pub fn cache(&self) -> &SessionCache {
        &self.cache
    }

    pub async fn login(&self, credentials: &LoginCredentials) -> ApiResult<AuthResponse> {
        tracing::info!("[AuthService] Login de {}", credentials.email);
        let response: AuthResponse = self.api.post("/auth/login", credentials).await?;
        self.persist_session(&response);
        Ok(response)
    }

    pub async fn register(&self, credentials: &RegisterCredentials) -> ApiResult<AuthResponse> {
        tracing::info!("[AuthService] Registrando {}", credentials.email);
        let response: AuthResponse = self.api.post("/auth/register", credentials).await?;
        self.persist_session(&response);
        Ok(response)
    }

    /// Token persistido é válido?
    ///
    /// Expiração local, depois cache, depois `GET /auth/validate`.
    /// Token expirado ou recusado derruba a sessão.
    pub async fn validate_token(&self) -> bool {
        let Some(token) = self.stored_token() else {
            return false;
        };

        if is_token_expired(&token, self.clock.now_millis()) {
            tracing::info!("[AuthService] Token {} expirado localmente", token_preview(&token));
            self.logout();
            return false;
        }

        if let Some(is_valid) = self.cache.lookup(&token) {
            tracing::debug!("[AuthService] Validação em cache: {}", is_valid);
            return is_valid;
        }

        match self.api.get::<Value>("/auth/validate").await {
            Ok(_) => {
                self.cache.record_validation(&token, true);
                true
            }
            Err(e) => {
                tracing::warn!("[AuthService] Token recusado pelo servidor: {}", e);
                self.cache.record_validation(&token, false);
                self.logout();
                false
            }
        }
    }

    /// Usuário atual: o persistido, ou `GET /auth/me`
    pub async fn current_user(&self) -> Option<User> {
        if let Some(user) = self.stored_user() {
            return Some(user);
        }

        match self.api.get::<User>("/auth/me").await {
            Ok(user) => {
                self.store_user(&user);
                Some(user)
            }
            Err(e) => {
                tracing::warn!("[AuthService] Falha ao obter usuário atual: {}", e);
                self.logout();
                None
            }
        }
    }

    /// Remove credenciais persistidas e esvazia o cache de validação
    pub fn logout(&self) {
        for key in [TOKEN_KEY, USER_KEY] {
            if let Err(e) = self.api.storage().remove(key) {
                tracing::error!("[AuthService] Falha ao remover '{}': {}", key, e);
            }
        }
        self.cache.clear();
    }

    pub fn stored_token(&self) -> Option<String> {
        self.api.storage().get(TOKEN_KEY).filter(|t| !t.is_empty())
    }

    pub fn stored_user(&self) -> Option<User> {
        let raw = self.api.storage().get(USER_KEY)?;
        match serde_json::from_str(&raw) {
            Ok(user) => Some(user),
            Err(e) => {
                tracing::warn!("[AuthService] Usuário persistido ilegível, ignorando: {}", e);
                None
            }
        }
    }

    /// Substitui (ou remove) o token persistido
    pub fn store_token(&self, token: Option<&str>) -> ApiResult<()> {
        match token {
            Some(token) => self.api.storage().set(TOKEN_KEY, token),
            None => self.api.storage().remove(TOKEN_KEY),
        }
    }

    fn store_user(&self, user: &User) {
        let result = serde_json::to_string(user)
            .map_err(ApiError::from)
            .and_then(|raw| self.api.storage().set(USER_KEY, &raw));
        if let Err(e) = result {
            tracing::error!("[AuthService] Falha ao persistir usuário: {}", e);
        }
    }

    fn persist_session(&self, response: &AuthResponse) {
        if let Err(e) = self.store_token(Some(&response.token)) {
            tracing::error!("[AuthService] Falha ao persistir token: {}", e);
        }
        self.store_user(&response.user);
        self.cache.record_validation(&response.token, true);
    }
}
