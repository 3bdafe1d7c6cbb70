//! Navegação entre telas
//!
//! O transporte redireciona para `/login` em 401/403 e os guards de rota
//! decidem entre `/login` e `/dashboard`; ambos falam com um `Navigator`.

use std::sync::{PoisonError, RwLock};

pub const LOGIN_PATH: &str = "/login";
pub const DASHBOARD_PATH: &str = "/dashboard";

pub trait Navigator: Send + Sync {
    fn current_path(&self) -> String;
    fn redirect(&self, path: &str);
}

/// Navegador em memória: guarda a rota atual e o histórico de redirecionamentos
#[derive(Debug)]
pub struct MemoryNavigator {
    current: RwLock<String>,
    history: RwLock<Vec<String>>,
}

impl MemoryNavigator {
    pub fn new(initial_path: impl Into<String>) -> Self {
        Self {
            current: RwLock::new(initial_path.into()),
            history: RwLock::new(Vec::new()),
        }
    }

    /// Redirecionamentos feitos até agora, em ordem
    pub fn redirects(&self) -> Vec<String> {
        self.history
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

impl Default for MemoryNavigator {
    fn default() -> Self {
        Self::new("/")
    }
}

impl Navigator for MemoryNavigator {
    fn current_path(&self) -> String {
        self.current
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    fn redirect(&self, path: &str) {
        tracing::info!("[Navigation] Redirecionando para {}", path);
        *self.current.write().unwrap_or_else(PoisonError::into_inner) = path.to_string();
        self.history
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .push(path.to_string());
    }
}
