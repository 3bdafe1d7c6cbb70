pub mod candidatos;
pub mod etapas;
pub mod status_override;
pub mod vagas;

pub use candidatos::CandidatoService;
pub use etapas::EtapaService;
pub use status_override::StatusOverrides;
pub use vagas::VagaService;
