#![allow(dead_code)]

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use serde_json::{json, Value};
use std::sync::Arc;
use std::time::Duration;
use wiremock::MockServer;

use recrutamento_client::config::Settings;
use recrutamento_client::navigation::MemoryNavigator;
use recrutamento_client::storage::{MemoryStorage, Storage, TOKEN_KEY, USER_KEY};
use recrutamento_client::utils::ManualClock;
use recrutamento_client::AppState;

/// Instante inicial do relógio dos testes (ms)
pub const NOW_MILLIS: i64 = 1_700_000_000_000;

pub struct Harness {
    pub server: MockServer,
    pub state: AppState,
    pub storage: Arc<MemoryStorage>,
    pub navigator: Arc<MemoryNavigator>,
    pub clock: ManualClock,
}

impl Harness {
    /// Sem token persistido, na rota `/`
    pub async fn new() -> Self {
        Self::builder().build().await
    }

    pub fn builder() -> HarnessBuilder {
        HarnessBuilder {
            path: "/".to_string(),
            seed: Vec::new(),
            base_url: None,
        }
    }

    pub fn advance(&self, by: Duration) {
        self.clock.advance(by);
    }

    pub async fn requests_to(&self, endpoint: &str) -> usize {
        self.server
            .received_requests()
            .await
            .unwrap_or_default()
            .iter()
            .filter(|request| request.url.path() == endpoint)
            .count()
    }
}

pub struct HarnessBuilder {
    path: String,
    seed: Vec<(String, String)>,
    base_url: Option<String>,
}

impl HarnessBuilder {
    pub fn at(mut self, path: &str) -> Self {
        self.path = path.to_string();
        self
    }

    pub fn with_token(self, token: &str) -> Self {
        self.with_entry(TOKEN_KEY, token)
    }

    pub fn with_user(self, user: Value) -> Self {
        self.with_entry(USER_KEY, &user.to_string())
    }

    pub fn with_entry(mut self, key: &str, value: &str) -> Self {
        self.seed.push((key.to_string(), value.to_string()));
        self
    }

    /// Aponta para uma porta sem servidor (erro de conectividade)
    pub fn unreachable(mut self) -> Self {
        self.base_url = Some("http://127.0.0.1:9/api".to_string());
        self
    }

    pub async fn build(self) -> Harness {
        let server = MockServer::start().await;

        let storage = Arc::new(MemoryStorage::new());
        for (key, value) in &self.seed {
            storage.set(key, value).unwrap();
        }

        let navigator = Arc::new(MemoryNavigator::new(self.path));
        let clock = ManualClock::new(NOW_MILLIS);

        let mut settings = Settings::default();
        settings.api.base_url = self
            .base_url
            .unwrap_or_else(|| format!("{}/api", server.uri()));

        let state = AppState::new(
            settings,
            storage.clone(),
            navigator.clone(),
            Arc::new(clock.clone()),
        )
        .unwrap();

        Harness {
            server,
            state,
            storage,
            navigator,
            clock,
        }
    }
}

/// JWT sem assinatura válida, só com o payload dado
pub fn make_token(payload: Value) -> String {
    let header = URL_SAFE_NO_PAD.encode(br#"{"alg":"HS256","typ":"JWT"}"#);
    let body = URL_SAFE_NO_PAD.encode(payload.to_string());
    format!("{}.{}.assinatura", header, body)
}

/// Token que expira uma hora depois de `NOW_MILLIS`
pub fn valid_token() -> String {
    make_token(json!({ "sub": "42", "exp": NOW_MILLIS / 1000 + 3600 }))
}

pub fn expired_token() -> String {
    make_token(json!({ "sub": "42", "exp": NOW_MILLIS / 1000 - 60 }))
}

pub fn user_json() -> Value {
    json!({ "id": 42, "email": "ana@exemplo.com", "name": "Ana" })
}

pub fn vaga_json(id: &str, status: &str) -> Value {
    json!({
        "id": id,
        "titulo": "Desenvolvedor Backend Rust",
        "descricao": "Serviços em tokio",
        "status": status,
        "created_at": "2024-03-01T00:00:00Z",
        "updated_at": "2024-03-01T00:00:00Z",
        "etapas": [
            { "id": "101", "nome": "Triagem", "ordem": 1, "vaga_id": id }
        ],
        "candidatos": []
    })
}
