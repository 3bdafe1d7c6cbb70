// Cliente da API de recrutamento (vagas, etapas e candidatos)
// Expõe módulos para uso em testes e no binário `recrutamento`

pub mod auth;
pub mod client;
pub mod config;
pub mod error;
pub mod models;
pub mod navigation;
pub mod services;
pub mod storage;
pub mod utils;

use std::sync::Arc;

pub use error::{ApiError, ApiResult};

use auth::{AuthGateway, AuthRequiredGuard, RedirectIfAuthenticatedGuard, SessionCache, SessionStore};
use client::ApiClient;
use navigation::Navigator;
use services::{CandidatoService, EtapaService, VagaService};
use storage::Storage;
use utils::Clock;

// AppState monta o grafo de dependências uma única vez e é compartilhado
#[derive(Clone)]
pub struct AppState {
    pub settings: config::Settings,
    pub api: ApiClient,
    pub session: Arc<SessionStore>,
    pub vagas: VagaService,
    pub etapas: EtapaService,
    pub candidatos: CandidatoService,
    pub navigator: Arc<dyn Navigator>,
}

impl AppState {
    pub fn new(
        settings: config::Settings,
        storage: Arc<dyn Storage>,
        navigator: Arc<dyn Navigator>,
        clock: Arc<dyn Clock>,
    ) -> ApiResult<Self> {
        let api = ApiClient::with_timeout(
            settings.api.base_url.clone(),
            settings.timeout(),
            storage,
            navigator.clone(),
        )?;
        utils::logging::log_config_loaded(api.base_url());

        let cache = SessionCache::with_ttl(clock.clone(), settings.cache_ttl());
        let gateway = AuthGateway::new(api.clone(), cache, clock);
        let session = Arc::new(
            SessionStore::new(gateway).with_min_check_interval(settings.min_check_interval()),
        );

        Ok(Self {
            vagas: VagaService::new(api.clone()),
            etapas: EtapaService::new(api.clone()),
            candidatos: CandidatoService::new(api.clone()),
            settings,
            api,
            session,
            navigator,
        })
    }

    pub fn auth_required_guard(&self) -> AuthRequiredGuard {
        AuthRequiredGuard::new(self.session.clone(), self.navigator.clone())
    }

    pub fn redirect_if_authenticated_guard(&self) -> RedirectIfAuthenticatedGuard {
        RedirectIfAuthenticatedGuard::new(self.session.clone(), self.navigator.clone())
    }
}
