use crate::client::{path_segment, ApiClient};
use crate::error::ApiResult;
use crate::models::{AtualizacaoEtapa, Etapa, NovaEtapa};

/// Etapas do processo seletivo
#[derive(Clone)]
pub struct EtapaService {
    api: ApiClient,
}

impl EtapaService {
    pub fn new(api: ApiClient) -> Self {
        Self { api }
    }

    /// `GET /vagas/:id/etapas`, ordenadas por `ordem`
    ///
    /// Ordens repetidas mantêm a sequência do servidor.
    pub async fn listar_etapas(&self, vaga_id: &str) -> ApiResult<Vec<Etapa>> {
        let endpoint = format!("/vagas/{}/etapas", path_segment(vaga_id));
        let mut etapas: Vec<Etapa> = self.api.get(&endpoint).await?;
        etapas.sort_by_key(|etapa| etapa.ordem);
        Ok(etapas)
    }

    pub async fn criar_etapa(&self, etapa: &NovaEtapa) -> ApiResult<Etapa> {
        tracing::info!("[EtapaService] Criando etapa '{}' na vaga {}", etapa.nome, etapa.vaga_id);
        self.api.post("/etapas", etapa).await
    }

    pub async fn atualizar_etapa(&self, id: &str, etapa: &AtualizacaoEtapa) -> ApiResult<Etapa> {
        self.api.put(&etapa_endpoint(id), etapa).await
    }

    pub async fn excluir_etapa(&self, id: &str) -> ApiResult<()> {
        tracing::info!("[EtapaService] Excluindo etapa {}", id);
        self.api.delete(&etapa_endpoint(id)).await
    }
}

fn etapa_endpoint(id: &str) -> String {
    format!("/etapas/{}", path_segment(id))
}
