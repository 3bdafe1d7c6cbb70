//! Mapa local `vaga_id -> status`
//!
//! Guardado quando o servidor aceita a alteração de status mas não a aplica.
//! Enquanto existir, a entrada vence o valor remoto em toda leitura. Não há
//! expiração automática; `reconcile` e `clear` são os únicos caminhos de saída.

use std::collections::BTreeMap;
use std::sync::Arc;

use crate::error::ApiResult;
use crate::models::{Vaga, VagaStatus};
use crate::storage::{Storage, STATUS_OVERRIDES_KEY};

pub type OverrideMap = BTreeMap<String, VagaStatus>;

#[derive(Clone)]
pub struct StatusOverrides {
    storage: Arc<dyn Storage>,
}

impl StatusOverrides {
    pub fn new(storage: Arc<dyn Storage>) -> Self {
        Self { storage }
    }

    /// Mapa persistido; conteúdo ilegível conta como vazio
    pub fn load(&self) -> OverrideMap {
        let Some(raw) = self.storage.get(STATUS_OVERRIDES_KEY) else {
            return OverrideMap::new();
        };

        serde_json::from_str(&raw).unwrap_or_else(|e| {
            tracing::error!("[VagaService] Erro ao carregar status locais: {}", e);
            OverrideMap::new()
        })
    }

    pub fn get(&self, vaga_id: &str) -> Option<VagaStatus> {
        self.load().get(vaga_id).copied()
    }

    pub fn record(&self, vaga_id: &str, status: VagaStatus) -> ApiResult<()> {
        let mut map = self.load();
        map.insert(vaga_id.to_string(), status);
        self.save(&map)
    }

    /// Remove a entrada; `true` se existia
    pub fn clear(&self, vaga_id: &str) -> ApiResult<bool> {
        let mut map = self.load();
        if map.remove(vaga_id).is_none() {
            return Ok(false);
        }
        self.save(&map)?;
        Ok(true)
    }

    /// Remove a entrada se o servidor já reporta o mesmo status
    pub fn reconcile(&self, vaga_id: &str, remote: VagaStatus) -> ApiResult<bool> {
        match self.get(vaga_id) {
            Some(local) if local == remote => self.clear(vaga_id),
            _ => Ok(false),
        }
    }

    /// Aplica o status local, se houver; `true` quando alterou a vaga
    pub fn apply(&self, vaga: &mut Vaga) -> bool {
        apply_from(&self.load(), vaga)
    }

    pub fn apply_all(&self, vagas: &mut [Vaga]) {
        let map = self.load();
        if map.is_empty() {
            return;
        }
        for vaga in vagas.iter_mut() {
            apply_from(&map, vaga);
        }
    }

    fn save(&self, map: &OverrideMap) -> ApiResult<()> {
        let raw = serde_json::to_string(map)?;
        self.storage.set(STATUS_OVERRIDES_KEY, &raw)
    }
}

fn apply_from(map: &OverrideMap, vaga: &mut Vaga) -> bool {
    match map.get(&vaga.id) {
        Some(&status) => {
            tracing::debug!("[VagaService] Aplicando status local para vaga {}: {}", vaga.id, status);
            vaga.status = status;
            true
        }
        None => false,
    }
}
