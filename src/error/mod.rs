pub mod api_error;

pub use api_error::{fallback_message, ApiError, ApiResult, MSG_EMAIL_JA_CADASTRADO, MSG_SEM_CONEXAO};
