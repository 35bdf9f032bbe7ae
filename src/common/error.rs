// src/common/error.rs

use std::path::PathBuf;

use serde::Serialize;
use thiserror::Error;

// Nosso tipo de erro, com `thiserror` para melhor ergonomia.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Erro de validação")]
    ValidationError(#[from] validator::ValidationErrors),

    #[error("Identificador de cliente inválido: {0}")]
    InvalidTenantId(String),

    // Arquivo de entrada do worker ausente no primeiro start
    #[error("Arquivo de entrada não encontrado: {}", .0.display())]
    EntryPointNotFound(PathBuf),

    // Supervisor inacessível ou comando com falha (stderr/stdout capturados em `detail`)
    #[error("Falha no supervisor ao executar '{command}': {detail}")]
    SupervisorTransport { command: String, detail: String },

    #[error("Supervisor não respondeu a '{command}' em {timeout_ms}ms")]
    SupervisorTimeout { command: String, timeout_ms: u64 },

    // Não fatal: o documento é apenas excluído da agregação
    #[error("Documento de lista ilegível {}: {reason}", path.display())]
    PartialRead { path: PathBuf, reason: String },

    // O diretório existe mas não pôde ser listado (não é o mesmo que ausente)
    #[error("Não foi possível listar o diretório {}", path.display())]
    DirectoryAccess {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    // Variante genérica para qualquer outro erro inesperado
    #[error("Erro interno: {0}")]
    InternalServerError(#[from] anyhow::Error),
}

/// Corpo de erro estruturado devolvido à camada de apresentação.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ErrorBody {
    pub kind: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
}

impl AppError {
    /// Código estável da taxonomia de erros, independente de transporte.
    pub fn kind(&self) -> &'static str {
        match self {
            AppError::ValidationError(_) | AppError::InvalidTenantId(_) => "ValidationError",
            AppError::EntryPointNotFound(_) => "NotFound",
            AppError::SupervisorTransport { .. } | AppError::SupervisorTimeout { .. } => {
                "SupervisorTransportError"
            }
            AppError::PartialRead { .. } => "PartialReadError",
            AppError::DirectoryAccess { .. } => "DirectoryAccessError",
            AppError::InternalServerError(_) => "InternalError",
        }
    }

    pub fn to_body(&self) -> ErrorBody {
        let detail = match self {
            AppError::ValidationError(errors) => {
                // Junta as mensagens de cada campo, como o antigo handler HTTP fazia
                let messages: Vec<String> = errors
                    .field_errors()
                    .into_iter()
                    .flat_map(|(field, field_errors)| {
                        field_errors.iter().map(move |e| match &e.message {
                            Some(m) => format!("{field}: {m}"),
                            None => format!("{field}: {}", e.code),
                        })
                    })
                    .collect();
                Some(messages.join("; "))
            }
            AppError::SupervisorTransport { detail, .. } => Some(detail.clone()),
            AppError::DirectoryAccess { source, .. } => Some(source.to_string()),
            AppError::InternalServerError(e) => Some(format!("{e:#}")),
            _ => None,
        };

        ErrorBody {
            kind: self.kind().to_string(),
            message: self.to_string(),
            detail,
        }
    }
}
