use reqwest::{Client, Method};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use crate::auth::classify::{detect_email_exists, extract_message, mark_email_exists};
use crate::error::{fallback_message, ApiError, ApiResult};
use crate::navigation::{Navigator, LOGIN_PATH};
use crate::storage::{Storage, TOKEN_KEY, USER_KEY};
use crate::utils::logging::{log_api_error, log_request_sent, log_response_received};
use crate::utils::string_utils::body_preview;

/// Timeout padrão de cada requisição
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(5);

/// Cliente HTTP da API de recrutamento
///
/// Todas as requisições passam por aqui: o token bearer é lido do
/// armazenamento a cada chamada e as respostas de erro são classificadas
/// uma única vez, antes de chegar aos serviços.
#[derive(Clone)]
pub struct ApiClient {
    http: Client,
    base_url: String,
    storage: Arc<dyn Storage>,
    navigator: Arc<dyn Navigator>,
}

impl fmt::Debug for ApiClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ApiClient")
            .field("base_url", &self.base_url)
            .finish_non_exhaustive()
    }
}

impl ApiClient {
    pub fn new(
        base_url: impl Into<String>,
        storage: Arc<dyn Storage>,
        navigator: Arc<dyn Navigator>,
    ) -> ApiResult<Self> {
        Self::with_timeout(base_url, DEFAULT_TIMEOUT, storage, navigator)
    }

    pub fn with_timeout(
        base_url: impl Into<String>,
        timeout: Duration,
        storage: Arc<dyn Storage>,
        navigator: Arc<dyn Navigator>,
    ) -> ApiResult<Self> {
        let http = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| ApiError::config_error(format!("Falha ao criar cliente HTTP: {}", e)))?;

        Ok(Self {
            http,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            storage,
            navigator,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn storage(&self) -> &Arc<dyn Storage> {
        &self.storage
    }

    pub fn navigator(&self) -> &Arc<dyn Navigator> {
        &self.navigator
    }

    /// Constrói URL completa para um endpoint
    fn build_url(&self, endpoint: &str) -> String {
        format!("{}/{}", self.base_url, endpoint.trim_start_matches('/'))
    }

    pub async fn get<T: DeserializeOwned>(&self, endpoint: &str) -> ApiResult<T> {
        let value = self.send(Method::GET, endpoint, None).await?;
        decode(endpoint, value)
    }

    pub async fn post<B: Serialize, T: DeserializeOwned>(
        &self,
        endpoint: &str,
        body: &B,
    ) -> ApiResult<T> {
        let value = self.post_value(endpoint, body).await?;
        decode(endpoint, value)
    }

    pub async fn put<B: Serialize, T: DeserializeOwned>(
        &self,
        endpoint: &str,
        body: &B,
    ) -> ApiResult<T> {
        let value = self.put_value(endpoint, body).await?;
        decode(endpoint, value)
    }

    pub async fn patch<B: Serialize, T: DeserializeOwned>(
        &self,
        endpoint: &str,
        body: &B,
    ) -> ApiResult<T> {
        let body = serde_json::to_value(body)?;
        let value = self.send(Method::PATCH, endpoint, Some(body)).await?;
        decode(endpoint, value)
    }

    /// `DELETE`; o corpo da resposta é ignorado
    pub async fn delete(&self, endpoint: &str) -> ApiResult<()> {
        self.send(Method::DELETE, endpoint, None).await?;
        Ok(())
    }

    /// `POST` devolvendo o corpo cru
    pub async fn post_value<B: Serialize>(&self, endpoint: &str, body: &B) -> ApiResult<Value> {
        let body = serde_json::to_value(body)?;
        self.send(Method::POST, endpoint, Some(body)).await
    }

    /// `PUT` devolvendo o corpo cru
    pub async fn put_value<B: Serialize>(&self, endpoint: &str, body: &B) -> ApiResult<Value> {
        let body = serde_json::to_value(body)?;
        self.send(Method::PUT, endpoint, Some(body)).await
    }

    async fn send(&self, method: Method, endpoint: &str, body: Option<Value>) -> ApiResult<Value> {
        let url = self.build_url(endpoint);
        let token = self.storage.get(TOKEN_KEY).filter(|t| !t.is_empty());

        log_request_sent(method.as_str(), endpoint, token.is_some());

        let mut request = self.http.request(method, &url);
        if let Some(token) = &token {
            request = request.bearer_auth(token);
        }
        if let Some(body) = &body {
            request = request.json(body);
        }

        let response = request.send().await.map_err(|e| {
            log_api_error(endpoint, None, &e.to_string());
            ApiError::connectivity(e.to_string())
        })?;

        let status = response.status().as_u16();
        let text = response.text().await.map_err(|e| {
            log_api_error(endpoint, Some(status), &e.to_string());
            ApiError::connectivity(format!("Falha ao ler resposta: {}", e))
        })?;

        log_response_received(endpoint, status);
        tracing::trace!("[API] Corpo: {}", body_preview(&text));

        let data = parse_body(&text);

        if !(200..300).contains(&status) {
            return Err(self.handle_error_response(endpoint, status, data));
        }

        Ok(data)
    }

    /// Classifica uma resposta de erro
    ///
    /// 401/403 sempre limpam as credenciais e mandam para o login, qualquer
    /// que seja o corpo. Depois: e-mail duplicado, 401/403 e, por fim, erro
    /// genérico com a mensagem do corpo.
    fn handle_error_response(&self, endpoint: &str, status: u16, data: Value) -> ApiError {
        let unauthorized = status == 401 || status == 403;
        if unauthorized {
            self.clear_credentials();
            if self.navigator.current_path() != LOGIN_PATH {
                self.navigator.redirect(LOGIN_PATH);
            }
        }

        if detect_email_exists(endpoint, status, &data) {
            tracing::warn!("[API] E-mail já cadastrado detectado em {} ({})", endpoint, status);
            return ApiError::EmailAlreadyExists {
                status,
                body: mark_email_exists(data),
            };
        }

        let message =
            extract_message(&data).unwrap_or_else(|| fallback_message(status).to_string());
        log_api_error(endpoint, Some(status), &message);

        if unauthorized {
            return ApiError::Unauthorized { status, message };
        }

        ApiError::Api {
            status,
            message,
            body: data,
        }
    }

    fn clear_credentials(&self) {
        for key in [TOKEN_KEY, USER_KEY] {
            if let Err(e) = self.storage.remove(key) {
                tracing::error!("[API] Falha ao remover '{}' do armazenamento: {}", key, e);
            }
        }
    }
}

/// Segmento de caminho com escape (`/vagas/{id}`)
pub fn path_segment(id: &str) -> String {
    urlencoding::encode(id).into_owned()
}

fn parse_body(text: &str) -> Value {
    if text.trim().is_empty() {
        return Value::Null;
    }
    serde_json::from_str(text).unwrap_or_else(|_| Value::String(text.to_string()))
}

fn decode<T: DeserializeOwned>(endpoint: &str, value: Value) -> ApiResult<T> {
    serde_json::from_value(value).map_err(|e| {
        ApiError::parse_error(format!("Resposta inesperada de {}: {}", endpoint, e))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::navigation::MemoryNavigator;
    use crate::storage::MemoryStorage;
    use serde_json::json;

    fn client(path: &str) -> (ApiClient, Arc<MemoryStorage>, Arc<MemoryNavigator>) {
        let storage = Arc::new(MemoryStorage::new());
        let navigator = Arc::new(MemoryNavigator::new(path));
        let client = ApiClient::new(
            "http://localhost:8080/api/",
            storage.clone(),
            navigator.clone(),
        )
        .unwrap();
        (client, storage, navigator)
    }

    #[test]
    fn test_build_url_normalizes_slashes() {
        let (client, _, _) = client("/");
        assert_eq!(client.base_url(), "http://localhost:8080/api");
        assert_eq!(client.build_url("/vagas"), "http://localhost:8080/api/vagas");
        assert_eq!(client.build_url("vagas/1"), "http://localhost:8080/api/vagas/1");
    }

    #[test]
    fn test_parse_body_variants() {
        assert_eq!(parse_body(""), Value::Null);
        assert_eq!(parse_body("{\"a\":1}"), json!({"a": 1}));
        assert_eq!(parse_body("Bad Gateway"), json!("Bad Gateway"));
    }

    #[test]
    fn test_path_segment_escapes() {
        assert_eq!(path_segment("12"), "12");
        assert_eq!(path_segment("a/b c"), "a%2Fb%20c");
    }

    #[test]
    fn test_unauthorized_clears_credentials_and_redirects() {
        let (client, storage, navigator) = client("/vagas");
        storage.set(TOKEN_KEY, "abc").unwrap();
        storage.set(USER_KEY, "{}").unwrap();

        let error = client.handle_error_response("/vagas", 401, Value::Null);

        assert!(error.is_unauthorized());
        assert_eq!(error.user_message(), fallback_message(401));
        assert!(storage.get(TOKEN_KEY).is_none());
        assert!(storage.get(USER_KEY).is_none());
        assert_eq!(navigator.redirects(), vec![LOGIN_PATH]);
    }

    #[test]
    fn test_unauthorized_on_login_page_does_not_redirect() {
        let (client, _, navigator) = client(LOGIN_PATH);
        let error = client.handle_error_response("/auth/login", 403, json!({"message": "Negado"}));
        assert_eq!(error.user_message(), "Negado");
        assert!(navigator.redirects().is_empty());
    }

    #[test]
    fn test_email_code_on_403_still_clears_credentials() {
        let (client, storage, navigator) = client("/register");
        storage.set(TOKEN_KEY, "abc").unwrap();

        let body = json!({"code": "EMAIL_ALREADY_EXISTS"});
        let error = client.handle_error_response("/auth/register", 403, body);

        assert!(error.is_email_exists());
        assert_eq!(error.body().unwrap()["isEmailExists"], true);
        assert!(storage.get(TOKEN_KEY).is_none());
        assert_eq!(navigator.redirects(), vec![LOGIN_PATH]);
    }

    #[test]
    fn test_generic_error_keeps_body() {
        let (client, _, _) = client("/");
        let error = client.handle_error_response("/vagas/9", 404, json!({"error": "Vaga não existe"}));
        assert_eq!(error.status(), Some(404));
        assert_eq!(error.user_message(), "Vaga não existe");
        assert_eq!(error.body().unwrap()["error"], "Vaga não existe");
    }
}
