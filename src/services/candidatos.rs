use crate::client::{path_segment, ApiClient};
use crate::error::ApiResult;
use crate::models::{AtualizacaoCandidato, Candidato, MoverCandidato, NovoCandidato};

#[derive(Clone)]
pub struct CandidatoService {
    api: ApiClient,
}

impl CandidatoService {
    pub fn new(api: ApiClient) -> Self {
        Self { api }
    }

    /// `GET /vagas/:id/candidatos`
    pub async fn listar_candidatos(&self, vaga_id: &str) -> ApiResult<Vec<Candidato>> {
        let endpoint = format!("/vagas/{}/candidatos", path_segment(vaga_id));
        self.api.get(&endpoint).await
    }

    pub async fn criar_candidato(&self, candidato: &NovoCandidato) -> ApiResult<Candidato> {
        tracing::info!(
            "[CandidatoService] Criando candidato '{}' na vaga {}",
            candidato.nome,
            candidato.vaga_id
        );
        self.api.post("/candidatos", candidato).await
    }

    pub async fn atualizar_candidato(
        &self,
        id: &str,
        candidato: &AtualizacaoCandidato,
    ) -> ApiResult<Candidato> {
        self.api.put(&candidato_endpoint(id), candidato).await
    }

    pub async fn excluir_candidato(&self, id: &str) -> ApiResult<()> {
        tracing::info!("[CandidatoService] Excluindo candidato {}", id);
        self.api.delete(&candidato_endpoint(id)).await
    }

    /// `PATCH /candidatos/:id/mover` com `{etapa_id}`
    pub async fn mover_para_etapa(&self, candidato_id: &str, etapa_id: &str) -> ApiResult<Candidato> {
        tracing::info!(
            "[CandidatoService] Movendo candidato {} para etapa {}",
            candidato_id,
            etapa_id
        );
        let endpoint = format!("{}/mover", candidato_endpoint(candidato_id));
        let body = MoverCandidato {
            etapa_id: etapa_id.to_string(),
        };
        self.api.patch(&endpoint, &body).await
    }
}

fn candidato_endpoint(id: &str) -> String {
    format!("/candidatos/{}", path_segment(id))
}
