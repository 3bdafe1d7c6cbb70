use tracing::{debug, error, info, warn};
use tracing_subscriber::EnvFilter;

/// Inicializa o subscriber global
///
/// `RUST_LOG` tem prioridade; sem ela, `verbose` liga debug para o crate.
pub fn init(verbose: bool) {
    let default_filter = if verbose {
        "recrutamento_client=debug,recrutamento=debug"
    } else {
        "recrutamento_client=warn,recrutamento=warn"
    };

    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));

    // try_init: chamadas repetidas (testes) não devem derrubar o processo
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .try_init();
}

pub fn log_request_sent(method: &str, endpoint: &str, with_token: bool) {
    if with_token {
        debug!("[API] Requisição {} {} com token JWT", method, endpoint);
    } else {
        debug!("[API] Requisição {} {} sem token", method, endpoint);
    }
}

pub fn log_response_received(endpoint: &str, status: u16) {
    debug!("[API] Resposta de {}: status {}", endpoint, status);
}

pub fn log_api_error(endpoint: &str, status: Option<u16>, error: &str) {
    error!("[API] Erro na resposta de {} - Status: {:?} - Erro: {}", endpoint, status, error);
}

pub fn log_config_loaded(base_url: &str) {
    info!("[Config] Serviço inicializado com URL base: {}", base_url);
}

pub fn log_info(message: &str) {
    info!("{}", message);
}

pub fn log_warning(message: &str) {
    warn!("{}", message);
}

pub fn log_error(message: &str) {
    error!("{}", message);
}
