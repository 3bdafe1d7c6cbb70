pub mod user;
pub mod vaga;

pub use user::{AuthResponse, LoginCredentials, RegisterCredentials, User};
pub use vaga::{
    AtualizacaoCandidato, AtualizacaoEtapa, AtualizacaoVaga, Candidato, Etapa, MoverCandidato,
    NovaEtapa, NovaVaga, NovoCandidato, Vaga, VagaCompleta, VagaStatus,
};

use serde::{Deserialize, Deserializer};
use serde_json::Value;

/// Aceita ids como string ou número
///
/// O backend devolve ids numéricos em algumas rotas e strings em outras;
/// internamente todos viram `String`.
pub(crate) fn de_id<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    match Value::deserialize(deserializer)? {
        Value::String(s) => Ok(s),
        Value::Number(n) => Ok(n.to_string()),
        other => Err(serde::de::Error::custom(format!(
            "id inválido: esperado string ou número, recebido {}",
            other
        ))),
    }
}
