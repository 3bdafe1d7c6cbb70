//! Detecção de "e-mail já cadastrado" nas respostas de erro
//!
//! Primeiro vale o contrato explícito (`code: "EMAIL_ALREADY_EXISTS"`).
//! A heurística por palavras-chave só entra como compatibilidade com as
//! várias formas de corpo que o backend já devolveu.

use serde_json::{Map, Value};

use crate::error::MSG_EMAIL_JA_CADASTRADO;

/// Código de erro que o backend usa para e-mail duplicado
pub const EMAIL_EXISTS_CODE: &str = "EMAIL_ALREADY_EXISTS";

/// Flag adicionada ao corpo reescrito
pub const EMAIL_EXISTS_FLAG: &str = "isEmailExists";

const REGISTER_ENDPOINT: &str = "/auth/register";

const DIRECT_MARKERS: &[&str] = &[
    "já existe",
    "already exists",
    "já cadastrado",
    "already registered",
    "duplicate",
    "já está sendo usado",
    "already in use",
];

const EMAIL_QUALIFIERS: &[&str] = &["duplicado", "usado", "cadastrado"];

/// A mensagem indica e-mail já existente?
pub fn is_email_exists_message(message: &str) -> bool {
    let lower = message.to_lowercase();

    if DIRECT_MARKERS.iter().any(|marker| lower.contains(marker)) {
        return true;
    }

    lower.contains("email") && EMAIL_QUALIFIERS.iter().any(|q| lower.contains(q))
}

fn str_matches(value: Option<&Value>) -> bool {
    value
        .and_then(Value::as_str)
        .map(is_email_exists_message)
        .unwrap_or(false)
}

/// Inspeção profunda do corpo de erro de `/auth/register`
///
/// Formatos reconhecidos: `message`, `errors[]` (objetos com `message`/`msg`
/// ou strings), `errors.email` (string ou array), `error` e `detail`.
pub fn deep_inspect_error_data(data: &Value) -> bool {
    let Some(obj) = data.as_object() else {
        return false;
    };

    if str_matches(obj.get("message")) {
        return true;
    }

    match obj.get("errors") {
        Some(Value::Array(errors)) => {
            let hit = errors.iter().any(|err| match err {
                Value::String(msg) => is_email_exists_message(msg),
                Value::Object(fields) => {
                    str_matches(fields.get("message")) || str_matches(fields.get("msg"))
                }
                _ => false,
            });
            if hit {
                return true;
            }
        }
        Some(Value::Object(fields)) => {
            let hit = match fields.get("email") {
                Some(Value::String(msg)) => is_email_exists_message(msg),
                Some(Value::Array(msgs)) => msgs
                    .iter()
                    .filter_map(Value::as_str)
                    .any(is_email_exists_message),
                _ => false,
            };
            if hit {
                return true;
            }
        }
        _ => {}
    }

    str_matches(obj.get("error")) || str_matches(obj.get("detail"))
}

/// Mensagem principal ou a primeira mensagem do array de erros (422)
fn primary_message(data: &Value) -> Option<&str> {
    data.get("message").and_then(Value::as_str).or_else(|| {
        data.get("errors")
            .and_then(Value::as_array)
            .and_then(|errors| errors.first())
            .and_then(|first| first.get("message"))
            .and_then(Value::as_str)
    })
}

/// Classifica uma resposta de erro como e-mail duplicado
pub fn detect_email_exists(endpoint: &str, status: u16, data: &Value) -> bool {
    if data.get("code").and_then(Value::as_str) == Some(EMAIL_EXISTS_CODE) {
        return true;
    }

    let is_register = endpoint.contains(REGISTER_ENDPOINT);

    match status {
        409 => true,
        400 if is_register => deep_inspect_error_data(data),
        422 if is_register => primary_message(data)
            .map(is_email_exists_message)
            .unwrap_or(false),
        _ => false,
    }
}

/// Reescreve o corpo com a flag explícita e a mensagem padrão
pub fn mark_email_exists(data: Value) -> Value {
    let mut obj = match data {
        Value::Object(obj) => obj,
        Value::Null => Map::new(),
        other => {
            let mut obj = Map::new();
            obj.insert("detail".to_string(), other);
            obj
        }
    };

    obj.insert(EMAIL_EXISTS_FLAG.to_string(), Value::Bool(true));
    obj.insert(
        "message".to_string(),
        Value::String(MSG_EMAIL_JA_CADASTRADO.to_string()),
    );
    Value::Object(obj)
}

/// `message` ou `error` do corpo, quando presentes e não vazios
pub fn extract_message(data: &Value) -> Option<String> {
    ["message", "error"]
        .iter()
        .filter_map(|key| data.get(*key).and_then(Value::as_str))
        .find(|msg| !msg.trim().is_empty())
        .map(str::to_string)
}
