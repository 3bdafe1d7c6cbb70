use anyhow::Context;
use clap::{Parser, Subcommand};
use serde::Serialize;
use serde_json::json;
use std::path::PathBuf;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

use recrutamento_client::auth::{decode_claims, is_token_expired, GuardDecision};
use recrutamento_client::config::Settings;
use recrutamento_client::models::{
    AtualizacaoCandidato, AtualizacaoEtapa, AtualizacaoVaga, NovaEtapa, NovaVaga, NovoCandidato,
    VagaStatus,
};
use recrutamento_client::navigation::{MemoryNavigator, Navigator, LOGIN_PATH};
use recrutamento_client::storage::FileStorage;
use recrutamento_client::utils::logging::{self, log_error, log_info, log_warning};
use recrutamento_client::utils::{token_preview, Clock, SystemClock};
use recrutamento_client::{ApiResult, AppState};

/// Recrutamento CLI - vagas, etapas e candidatos pela linha de comando
#[derive(Parser)]
#[command(name = "recrutamento")]
#[command(version)]
#[command(about = "CLI para a API de recrutamento", long_about = None)]
struct Cli {
    /// URL base da API (sobrepõe config/ e RECRUTAMENTO_API_URL)
    #[arg(long, global = true)]
    api_url: Option<String>,

    /// Arquivo de estado local (token, usuário, status locais)
    #[arg(long, global = true)]
    storage: Option<PathBuf>,

    /// Formato de saída (json, pretty)
    #[arg(short = 'o', long, default_value = "pretty", global = true)]
    output: OutputFormat,

    /// Modo verbose para debug
    #[arg(short = 'v', long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Clone, Debug, PartialEq)]
enum OutputFormat {
    Json,
    Pretty,
}

impl std::str::FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "json" => Ok(OutputFormat::Json),
            "pretty" => Ok(OutputFormat::Pretty),
            _ => Err(format!("Formato desconhecido: {}", s)),
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Autentica com e-mail e senha
    Login {
        #[arg(short = 'e', long)]
        email: String,
        #[arg(short = 'p', long, env = "RECRUTAMENTO_PASSWORD", hide_env_values = true)]
        password: String,
    },

    /// Cria uma conta e já autentica
    Register {
        #[arg(short = 'e', long)]
        email: String,
        #[arg(short = 'p', long, env = "RECRUTAMENTO_PASSWORD", hide_env_values = true)]
        password: String,
        #[arg(short = 'n', long)]
        name: Option<String>,
    },

    /// Encerra a sessão local
    Logout,

    /// Verifica se a sessão atual é válida (Ctrl+C cancela)
    Status,

    /// Mostra o usuário autenticado
    Whoami,

    /// Mostra as claims do token armazenado
    Token,

    /// Operações sobre vagas
    Vagas {
        #[command(subcommand)]
        command: VagaCommands,
    },

    /// Operações sobre etapas
    Etapas {
        #[command(subcommand)]
        command: EtapaCommands,
    },

    /// Operações sobre candidatos
    Candidatos {
        #[command(subcommand)]
        command: CandidatoCommands,
    },
}

#[derive(Subcommand)]
enum VagaCommands {
    /// Lista todas as vagas
    Listar,
    /// Detalhes de uma vaga com etapas e candidatos
    Obter { id: String },
    Criar {
        #[arg(short = 't', long)]
        titulo: String,
        #[arg(short = 'd', long)]
        descricao: Option<String>,
        #[arg(short = 's', long, default_value = "ativa")]
        status: VagaStatus,
    },
    Atualizar {
        id: String,
        #[arg(short = 't', long)]
        titulo: Option<String>,
        #[arg(short = 'd', long)]
        descricao: Option<String>,
        #[arg(short = 's', long)]
        status: Option<VagaStatus>,
    },
    Excluir { id: String },
    /// Altera o status (ativa, congelada, concluida)
    Status { id: String, status: VagaStatus },
    /// Remove o status local quando o servidor já concorda (ou sempre, com --limpar)
    Reconciliar {
        id: String,
        #[arg(long)]
        limpar: bool,
    },
}

#[derive(Subcommand)]
enum EtapaCommands {
    Listar { vaga_id: String },
    Criar {
        vaga_id: String,
        #[arg(short = 'n', long)]
        nome: String,
        #[arg(long)]
        ordem: i64,
    },
    Atualizar {
        id: String,
        #[arg(short = 'n', long)]
        nome: Option<String>,
        #[arg(long)]
        ordem: Option<i64>,
    },
    Excluir { id: String },
}

#[derive(Subcommand)]
enum CandidatoCommands {
    Listar { vaga_id: String },
    Criar {
        vaga_id: String,
        #[arg(long)]
        etapa_id: String,
        #[arg(short = 'n', long)]
        nome: String,
        #[arg(long)]
        telefone: String,
        #[arg(short = 'e', long)]
        email: String,
    },
    Atualizar {
        id: String,
        #[arg(short = 'n', long)]
        nome: Option<String>,
        #[arg(long)]
        telefone: Option<String>,
        #[arg(short = 'e', long)]
        email: Option<String>,
        #[arg(long)]
        etapa_id: Option<String>,
    },
    Excluir { id: String },
    /// Move o candidato para outra etapa
    Mover { id: String, etapa_id: String },
}

#[derive(Serialize)]
struct CliResponse {
    success: bool,
    data: Option<serde_json::Value>,
    error: Option<String>,
}

impl CliResponse {
    fn success(data: serde_json::Value) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
        }
    }

    fn error(msg: String) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(msg),
        }
    }
}

/// Converte o resultado de um serviço no envelope da CLI
fn respond<T: Serialize>(result: ApiResult<T>) -> anyhow::Result<CliResponse> {
    match result {
        Ok(data) => Ok(CliResponse::success(serde_json::to_value(data)?)),
        Err(e) => {
            log_error(&format!("❌ {}", e));
            Ok(CliResponse::error(e.user_message()))
        }
    }
}

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    let cli = Cli::parse();
    logging::init(cli.verbose);

    let output_format = cli.output.clone();

    match run(cli).await {
        Ok(response) => {
            let exit_code = if response.success { 0 } else { 1 };
            output_response(response, &output_format);
            std::process::exit(exit_code);
        }
        Err(e) => {
            eprintln!("❌ Erro: {:#}", e);
            std::process::exit(1);
        }
    }
}

async fn run(cli: Cli) -> anyhow::Result<CliResponse> {
    let mut settings = Settings::new().context("Falha ao carregar configuração")?;
    if let Some(url) = &cli.api_url {
        settings.api.base_url = url.clone();
    }
    if let Some(path) = &cli.storage {
        settings.storage.path = path.clone();
    }

    let storage = FileStorage::open(&settings.storage.path).with_context(|| {
        format!("Falha ao abrir estado local em {}", settings.storage.path.display())
    })?;
    let navigator = Arc::new(MemoryNavigator::default());
    let clock: Arc<dyn Clock> = Arc::new(SystemClock);

    let state = AppState::new(settings, Arc::new(storage), navigator.clone(), clock.clone())?;

    let response = execute_command(&state, cli.command, clock.as_ref()).await?;

    if navigator.current_path() == LOGIN_PATH {
        log_warning("⚠️ Sessão inválida ou expirada. Execute `recrutamento login` novamente.");
    }

    Ok(response)
}

async fn execute_command(
    state: &AppState,
    command: Commands,
    clock: &dyn Clock,
) -> anyhow::Result<CliResponse> {
    match command {
        Commands::Login { email, password } => {
            let result = state.session.login(&email, &password).await;
            if result.is_ok() {
                log_info(&format!("✅ Autenticado como {}", email));
            }
            respond(result)
        }

        Commands::Register {
            email,
            password,
            name,
        } => {
            let result = state.session.register(&email, &password, name.as_deref()).await;
            if let Err(e) = &result {
                if e.is_email_exists() {
                    return Ok(CliResponse::error(format!(
                        "{} Use `recrutamento login` para entrar.",
                        e.user_message()
                    )));
                }
            }
            respond(result)
        }

        Commands::Logout => {
            state.session.logout().await;
            Ok(CliResponse::success(json!({ "message": "Sessão encerrada" })))
        }

        Commands::Status => {
            let cancel = CancellationToken::new();
            let on_ctrl_c = cancel.clone();
            tokio::spawn(async move {
                if tokio::signal::ctrl_c().await.is_ok() {
                    on_ctrl_c.cancel();
                }
            });

            let decision = state.auth_required_guard().verify(&cancel).await;
            let session = state.session.snapshot().await;

            let (autenticado, decisao) = match &decision {
                GuardDecision::Allow => (true, "permitido".to_string()),
                GuardDecision::Redirect(path) => (false, format!("redirecionar para {}", path)),
                GuardDecision::Cancelled => {
                    return Ok(CliResponse::error("Verificação cancelada".to_string()))
                }
                other => (false, format!("{:?}", other).to_lowercase()),
            };

            Ok(CliResponse::success(json!({
                "authenticated": autenticado,
                "decision": decisao,
                "phase": session.phase(),
                "user": session.user,
                "token": session.token.as_deref().map(token_preview),
            })))
        }

        Commands::Whoami => {
            if !state.session.check_auth().await {
                return Ok(CliResponse::error("Nenhuma sessão válida".to_string()));
            }
            Ok(CliResponse::success(serde_json::to_value(
                state.session.snapshot().await.user,
            )?))
        }

        Commands::Token => {
            let Some(token) = state.session.gateway().stored_token() else {
                return Ok(CliResponse::error("Nenhum token armazenado".to_string()));
            };
            match decode_claims(&token) {
                Ok(claims) => Ok(CliResponse::success(json!({
                    "token": token_preview(&token),
                    "exp": claims.exp,
                    "expired": is_token_expired(&token, clock.now_millis()),
                    "claims": claims.extra,
                }))),
                Err(e) => Ok(CliResponse::error(format!("Token ilegível: {}", e))),
            }
        }

        Commands::Vagas { command } => execute_vagas(state, command).await,
        Commands::Etapas { command } => execute_etapas(state, command).await,
        Commands::Candidatos { command } => execute_candidatos(state, command).await,
    }
}

async fn execute_vagas(state: &AppState, command: VagaCommands) -> anyhow::Result<CliResponse> {
    let vagas = &state.vagas;
    match command {
        VagaCommands::Listar => respond(vagas.listar_vagas().await),
        VagaCommands::Obter { id } => respond(vagas.obter_vaga(&id).await),
        VagaCommands::Criar {
            titulo,
            descricao,
            status,
        } => {
            let nova = NovaVaga {
                titulo,
                descricao,
                status,
            };
            respond(vagas.criar_vaga(&nova).await)
        }
        VagaCommands::Atualizar {
            id,
            titulo,
            descricao,
            status,
        } => {
            let update = AtualizacaoVaga {
                titulo,
                descricao,
                status,
            };
            respond(vagas.atualizar_vaga(&id, &update).await)
        }
        VagaCommands::Excluir { id } => {
            respond(vagas.excluir_vaga(&id).await.map(|_| json!({ "deleted": id })))
        }
        VagaCommands::Status { id, status } => {
            let result = vagas.alterar_status(&id, status).await.map(|vaga| {
                let local = vagas.status_local(&id);
                json!({ "vaga": vaga, "status_local": local })
            });
            respond(result)
        }
        VagaCommands::Reconciliar { id, limpar } => {
            let result = if limpar {
                vagas.limpar_status_local(&id)
            } else {
                vagas.reconciliar_status(&id).await
            };
            respond(result.map(|removido| {
                json!({ "id": id, "removido": removido, "status_local": vagas.status_local(&id) })
            }))
        }
    }
}

async fn execute_etapas(state: &AppState, command: EtapaCommands) -> anyhow::Result<CliResponse> {
    let etapas = &state.etapas;
    match command {
        EtapaCommands::Listar { vaga_id } => respond(etapas.listar_etapas(&vaga_id).await),
        EtapaCommands::Criar {
            vaga_id,
            nome,
            ordem,
        } => {
            let nova = NovaEtapa {
                nome,
                ordem,
                vaga_id,
            };
            respond(etapas.criar_etapa(&nova).await)
        }
        EtapaCommands::Atualizar { id, nome, ordem } => {
            let update = AtualizacaoEtapa { nome, ordem };
            respond(etapas.atualizar_etapa(&id, &update).await)
        }
        EtapaCommands::Excluir { id } => {
            respond(etapas.excluir_etapa(&id).await.map(|_| json!({ "deleted": id })))
        }
    }
}

async fn execute_candidatos(
    state: &AppState,
    command: CandidatoCommands,
) -> anyhow::Result<CliResponse> {
    let candidatos = &state.candidatos;
    match command {
        CandidatoCommands::Listar { vaga_id } => {
            respond(candidatos.listar_candidatos(&vaga_id).await)
        }
        CandidatoCommands::Criar {
            vaga_id,
            etapa_id,
            nome,
            telefone,
            email,
        } => {
            let novo = NovoCandidato {
                nome,
                telefone,
                email,
                vaga_id,
                etapa_id,
            };
            respond(candidatos.criar_candidato(&novo).await)
        }
        CandidatoCommands::Atualizar {
            id,
            nome,
            telefone,
            email,
            etapa_id,
        } => {
            let update = AtualizacaoCandidato {
                nome,
                telefone,
                email,
                etapa_id,
            };
            respond(candidatos.atualizar_candidato(&id, &update).await)
        }
        CandidatoCommands::Excluir { id } => {
            respond(candidatos.excluir_candidato(&id).await.map(|_| json!({ "deleted": id })))
        }
        CandidatoCommands::Mover { id, etapa_id } => {
            respond(candidatos.mover_para_etapa(&id, &etapa_id).await)
        }
    }
}

fn output_response(response: CliResponse, format: &OutputFormat) {
    match format {
        OutputFormat::Json => match serde_json::to_string(&response) {
            Ok(json) => println!("{}", json),
            Err(e) => eprintln!("❌ Erro ao serializar resposta: {}", e),
        },
        OutputFormat::Pretty => {
            if response.success {
                if let Some(data) = response.data {
                    println!("✅ Sucesso!");
                    println!(
                        "{}",
                        serde_json::to_string_pretty(&data).unwrap_or_else(|_| data.to_string())
                    );
                }
            } else if let Some(error) = response.error {
                eprintln!("❌ Erro: {}", error);
            }
        }
    }
}
