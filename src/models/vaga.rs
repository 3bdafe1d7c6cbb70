use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use super::de_id;

/// Status de uma vaga
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VagaStatus {
    Ativa,
    Congelada,
    Concluida,
}

impl VagaStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            VagaStatus::Ativa => "ativa",
            VagaStatus::Congelada => "congelada",
            VagaStatus::Concluida => "concluida",
        }
    }
}

impl fmt::Display for VagaStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for VagaStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "ativa" | "active" => Ok(VagaStatus::Ativa),
            "congelada" | "frozen" => Ok(VagaStatus::Congelada),
            "concluida" | "concluída" | "completed" => Ok(VagaStatus::Concluida),
            other => Err(format!(
                "Status desconhecido: {}. Use ativa, congelada ou concluida",
                other
            )),
        }
    }
}

/// Vaga de emprego
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Vaga {
    #[serde(deserialize_with = "de_id")]
    pub id: String,
    pub titulo: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub descricao: Option<String>,
    pub status: VagaStatus,
    #[serde(default)]
    pub created_at: String,
    #[serde(default)]
    pub updated_at: String,
}

/// Vaga com etapas e candidatos (resposta de `GET /vagas/:id`)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VagaCompleta {
    #[serde(flatten)]
    pub vaga: Vaga,
    #[serde(default)]
    pub etapas: Vec<Etapa>,
    #[serde(default)]
    pub candidatos: Vec<Candidato>,
}

/// Etapa do processo seletivo de uma vaga
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Etapa {
    #[serde(deserialize_with = "de_id")]
    pub id: String,
    pub nome: String,
    pub ordem: i64,
    #[serde(deserialize_with = "de_id")]
    pub vaga_id: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Candidato {
    #[serde(deserialize_with = "de_id")]
    pub id: String,
    pub nome: String,
    #[serde(default)]
    pub telefone: String,
    #[serde(default)]
    pub email: String,
    #[serde(deserialize_with = "de_id")]
    pub vaga_id: String,
    #[serde(deserialize_with = "de_id")]
    pub etapa_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub etapa: Option<Etapa>,
}

/// Payload de `POST /vagas`
#[derive(Debug, Clone, Serialize)]
pub struct NovaVaga {
    pub titulo: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub descricao: Option<String>,
    pub status: VagaStatus,
}

/// Payload de `PUT /vagas/:id`
#[derive(Debug, Clone, Default, Serialize)]
pub struct AtualizacaoVaga {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub titulo: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub descricao: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<VagaStatus>,
}

/// Payload de `POST /etapas`
#[derive(Debug, Clone, Serialize)]
pub struct NovaEtapa {
    pub nome: String,
    pub ordem: i64,
    pub vaga_id: String,
}

/// Payload de `PUT /etapas/:id`
#[derive(Debug, Clone, Default, Serialize)]
pub struct AtualizacaoEtapa {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub nome: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ordem: Option<i64>,
}

/// Payload de `POST /candidatos`
#[derive(Debug, Clone, Serialize)]
pub struct NovoCandidato {
    pub nome: String,
    pub telefone: String,
    pub email: String,
    pub vaga_id: String,
    pub etapa_id: String,
}

/// Payload de `PUT /candidatos/:id`
#[derive(Debug, Clone, Default, Serialize)]
pub struct AtualizacaoCandidato {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub nome: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub telefone: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub etapa_id: Option<String>,
}

/// Payload de `PATCH /candidatos/:id/mover`
#[derive(Debug, Clone, Serialize)]
pub struct MoverCandidato {
    pub etapa_id: String,
}
