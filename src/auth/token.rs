//! Leitura local do JWT
//!
//! Só o payload é decodificado; a assinatura é responsabilidade do servidor.

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use serde::Deserialize;
use serde_json::{Map, Value};

use crate::error::{ApiError, ApiResult};

/// Claims do payload do token
#[derive(Debug, Clone, Deserialize)]
pub struct TokenClaims {
    /// Expiração em segundos desde o epoch
    #[serde(default)]
    pub exp: Option<Value>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl TokenClaims {
    /// Expiração em milissegundos
    ///
    /// `Ok(None)` quando o token não tem `exp`. Aceita número ou string
    /// numérica (`"1700000000"`); qualquer outra coisa é erro.
    pub fn exp_millis(&self) -> ApiResult<Option<f64>> {
        let secs = match &self.exp {
            None | Some(Value::Null) => return Ok(None),
            Some(Value::String(raw)) => raw.trim().parse::<f64>().ok(),
            Some(value) => value.as_f64(),
        };

        match secs {
            Some(secs) if secs.is_finite() => Ok(Some(secs * 1000.0)),
            _ => Err(ApiError::parse_error(format!(
                "exp inválido: {}",
                self.exp.as_ref().map(Value::to_string).unwrap_or_default()
            ))),
        }
    }
}

/// Decodifica o segmento de payload de um JWT
pub fn decode_claims(token: &str) -> ApiResult<TokenClaims> {
    let mut segments = token.split('.');
    let payload = match (segments.next(), segments.next()) {
        (Some(_), Some(payload)) if !payload.is_empty() => payload,
        _ => return Err(ApiError::parse_error("token sem segmento de payload")),
    };

    let bytes = URL_SAFE_NO_PAD
        .decode(payload.trim_end_matches('='))
        .map_err(|e| ApiError::parse_error(format!("payload base64 inválido: {}", e)))?;

    let json = String::from_utf8(bytes)
        .map_err(|e| ApiError::parse_error(format!("payload não é UTF-8: {}", e)))?;

    let value: Value = serde_json::from_str(&json)?;
    if !value.is_object() {
        return Err(ApiError::parse_error("payload do token não é um objeto JSON"));
    }

    Ok(serde_json::from_value(value)?)
}

/// O token está expirado no instante `now_millis`?
///
/// Token ilegível conta como expirado. Token sem `exp` nunca expira
/// localmente; o servidor continua sendo a autoridade.
pub fn is_token_expired(token: &str, now_millis: i64) -> bool {
    let claims = match decode_claims(token) {
        Ok(claims) => claims,
        Err(e) => {
            tracing::warn!("[Auth] Token ilegível, tratado como expirado: {}", e);
            return true;
        }
    };

    match claims.exp_millis() {
        Ok(Some(exp_millis)) => now_millis as f64 >= exp_millis,
        Ok(None) => false,
        Err(e) => {
            tracing::warn!("[Auth] {}", e);
            true
        }
    }
}
