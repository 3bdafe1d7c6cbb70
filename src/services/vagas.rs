use serde_json::Value;

use super::status_override::StatusOverrides;
use crate::client::{path_segment, ApiClient};
use crate::error::{ApiError, ApiResult};
use crate::models::{AtualizacaoVaga, NovaVaga, Vaga, VagaCompleta, VagaStatus};

/// Serviço de vagas
///
/// Leituras passam pelo mapa de status locais antes de retornar.
#[derive(Clone)]
pub struct VagaService {
    api: ApiClient,
    overrides: StatusOverrides,
}

impl VagaService {
    pub fn new(api: ApiClient) -> Self {
        let overrides = StatusOverrides::new(api.storage().clone());
        Self { api, overrides }
    }

    pub fn overrides(&self) -> &StatusOverrides {
        &self.overrides
    }

    /// `GET /vagas`
    pub async fn listar_vagas(&self) -> ApiResult<Vec<Vaga>> {
        tracing::debug!("[VagaService] Buscando todas as vagas");
        let mut vagas: Vec<Vaga> = self.api.get("/vagas").await?;
        self.overrides.apply_all(&mut vagas);
        Ok(vagas)
    }

    /// `GET /vagas/:id` com etapas e candidatos
    pub async fn obter_vaga(&self, id: &str) -> ApiResult<VagaCompleta> {
        let mut vaga = self.fetch_remote(id).await?;
        self.overrides.apply(&mut vaga.vaga);
        Ok(vaga)
    }

    pub async fn criar_vaga(&self, vaga: &NovaVaga) -> ApiResult<Vaga> {
        tracing::info!("[VagaService] Criando vaga '{}'", vaga.titulo);
        self.api.post("/vagas", vaga).await
    }

    pub async fn atualizar_vaga(&self, id: &str, vaga: &AtualizacaoVaga) -> ApiResult<Vaga> {
        tracing::info!("[VagaService] Atualizando vaga {}", id);
        self.api.put(&vaga_endpoint(id), vaga).await
    }

    pub async fn excluir_vaga(&self, id: &str) -> ApiResult<()> {
        tracing::info!("[VagaService] Excluindo vaga {}", id);
        self.api.delete(&vaga_endpoint(id)).await
    }

    /// Altera o status e compensa quando o servidor não aplica a mudança
    ///
    /// Se a releitura ainda mostra o status anterior, o novo status vai para
    /// o mapa local e a vaga retornada já o traz aplicado.
    pub async fn alterar_status(&self, id: &str, status: VagaStatus) -> ApiResult<VagaCompleta> {
        tracing::info!("[VagaService] Alterando status da vaga {} para {}", id, status);

        let atual = self.obter_vaga(id).await?;
        let status_anterior = atual.vaga.status;

        let update = AtualizacaoVaga {
            titulo: Some(atual.vaga.titulo.clone()),
            descricao: Some(atual.vaga.descricao.clone().unwrap_or_default()),
            status: Some(status),
        };
        // o corpo da resposta do PUT não é confiável para o status
        self.api.put_value(&vaga_endpoint(id), &update).await?;

        let mut depois = self.obter_vaga(id).await?;

        if depois.vaga.status == status_anterior && depois.vaga.status != status {
            tracing::warn!(
                "[VagaService] API não alterou o status da vaga {} para {}. Usando versão local.",
                id,
                status
            );
            if let Err(e) = self.overrides.record(id, status) {
                tracing::error!("[VagaService] Erro ao salvar status local: {}", e);
            }
            depois.vaga.status = status;
        }

        Ok(depois)
    }

    /// Descarta o status local da vaga se o servidor já reporta o mesmo valor
    pub async fn reconciliar_status(&self, id: &str) -> ApiResult<bool> {
        let remota = self.fetch_remote(id).await?;
        let reconciled = self.overrides.reconcile(id, remota.vaga.status)?;
        if reconciled {
            tracing::info!("[VagaService] Status local da vaga {} reconciliado", id);
        }
        Ok(reconciled)
    }

    pub fn limpar_status_local(&self, id: &str) -> ApiResult<bool> {
        self.overrides.clear(id)
    }

    pub fn status_local(&self, id: &str) -> Option<VagaStatus> {
        self.overrides.get(id)
    }

    async fn fetch_remote(&self, id: &str) -> ApiResult<VagaCompleta> {
        tracing::debug!("[VagaService] Buscando detalhes da vaga {}", id);
        let data: Value = self.api.get(&vaga_endpoint(id)).await?;

        for campo in ["etapas", "candidatos"] {
            if data.get(campo).is_none() {
                tracing::warn!("[VagaService] Vaga {} não possui a propriedade '{}'", id, campo);
            }
        }

        serde_json::from_value(data)
            .map_err(|e| ApiError::parse_error(format!("Vaga {} em formato inesperado: {}", id, e)))
    }
}

fn vaga_endpoint(id: &str) -> String {
    format!("/vagas/{}", path_segment(id))
}
