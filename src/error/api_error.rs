use serde_json::Value;
use thiserror::Error;

/// Mensagem exibida quando nenhuma resposta chega do servidor
pub const MSG_SEM_CONEXAO: &str =
    "Não foi possível conectar ao servidor. Verifique sua conexão de internet.";

/// Mensagem única para qualquer variação de "e-mail já cadastrado"
pub const MSG_EMAIL_JA_CADASTRADO: &str = "Este e-mail já está cadastrado no sistema.";

/// Erros do cliente da API de recrutamento
///
/// A classificação acontece uma única vez, perto do transporte
/// (`client::api`). Quem chama só precisa olhar para `is_email_exists()`
/// ou para a mensagem final.
#[derive(Error, Debug)]
pub enum ApiError {
    /// Nenhuma resposta recebida (conexão recusada, DNS, timeout)
    #[error("Não foi possível conectar ao servidor. Verifique sua conexão de internet.")]
    Connectivity { detail: String },

    /// Cadastro recusado porque o e-mail já existe
    #[error("Este e-mail já está cadastrado no sistema.")]
    EmailAlreadyExists { status: u16, body: Value },

    /// 401/403: credenciais locais já foram removidas
    #[error("Não autorizado ({status}): {message}")]
    Unauthorized { status: u16, message: String },

    /// Qualquer outra resposta de erro do servidor
    #[error("Erro de API ({status}): {message}")]
    Api {
        status: u16,
        message: String,
        body: Value,
    },

    #[error("Erro de parsing: {0}")]
    Parse(String),

    #[error("Erro de armazenamento local: {0}")]
    Storage(String),

    #[error("Configuração inválida: {0}")]
    Config(String),

    #[error("Erro de IO: {0}")]
    Io(#[from] std::io::Error),

    #[error("Erro de serialização: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl ApiError {
    pub fn connectivity(detail: impl Into<String>) -> Self {
        Self::Connectivity {
            detail: detail.into(),
        }
    }

    pub fn parse_error(msg: impl Into<String>) -> Self {
        Self::Parse(msg.into())
    }

    pub fn storage_error(msg: impl Into<String>) -> Self {
        Self::Storage(msg.into())
    }

    pub fn config_error(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Status HTTP da resposta, quando houve resposta
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::EmailAlreadyExists { status, .. }
            | Self::Unauthorized { status, .. }
            | Self::Api { status, .. } => Some(*status),
            _ => None,
        }
    }

    pub fn is_email_exists(&self) -> bool {
        matches!(self, Self::EmailAlreadyExists { .. })
    }

    pub fn is_connectivity(&self) -> bool {
        matches!(self, Self::Connectivity { .. })
    }

    pub fn is_unauthorized(&self) -> bool {
        matches!(self, Self::Unauthorized { .. })
    }

    /// Corpo da resposta de erro (já reescrito no caso de e-mail duplicado)
    pub fn body(&self) -> Option<&Value> {
        match self {
            Self::EmailAlreadyExists { body, .. } | Self::Api { body, .. } => Some(body),
            _ => None,
        }
    }

    /// Texto pronto para a interface
    pub fn user_message(&self) -> String {
        match self {
            Self::Connectivity { .. } => MSG_SEM_CONEXAO.to_string(),
            Self::EmailAlreadyExists { .. } => MSG_EMAIL_JA_CADASTRADO.to_string(),
            Self::Unauthorized { message, .. } | Self::Api { message, .. } => message.clone(),
            other => other.to_string(),
        }
    }
}

/// Mensagem padrão por status quando o corpo não traz `message` nem `error`
pub fn fallback_message(status: u16) -> &'static str {
    match status {
        400 => "Requisição inválida. Verifique os dados enviados.",
        401 => "Não autorizado. Faça login novamente.",
        403 => "Acesso negado. Você não tem permissão para acessar este recurso.",
        404 => "Recurso não encontrado.",
        422 => "Dados inválidos. Verifique as informações fornecidas.",
        500 => "Erro interno do servidor. Tente novamente mais tarde.",
        _ => "Erro ao se comunicar com o servidor. Tente novamente.",
    }
}

/// Tipo de resultado padrão do crate
pub type ApiResult<T> = Result<T, ApiError>;
