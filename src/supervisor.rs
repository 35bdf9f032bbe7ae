// src/supervisor.rs

use std::path::Path;

use async_trait::async_trait;

use crate::{common::error::AppError, models::process::ProcessEntry};

pub mod pm2;
pub use pm2::Pm2Supervisor;

/// Contrato do gerenciador de processos externo.
///
/// Chamadas com um nome desconhecido devem retornar erro, nunca derrubar quem chamou.
#[async_trait]
pub trait ProcessSupervisor: Send + Sync {
    async fn list(&self) -> Result<Vec<ProcessEntry>, AppError>;

    async fn create(&self, name: &str, entrypoint: &Path, interpreter: &str) -> Result<(), AppError>;

    async fn restart(&self, name: &str) -> Result<(), AppError>;

    async fn stop(&self, name: &str) -> Result<(), AppError>;

    async fn delete(&self, name: &str) -> Result<(), AppError>;
}

// Consultado apenas no ramo start/not_found
#[async_trait]
pub trait EntryPointCheck: Send + Sync {
    async fn exists(&self, path: &Path) -> bool;
}

#[derive(Clone, Copy, Default)]
pub struct FsEntryPointCheck;

#[async_trait]
impl EntryPointCheck for FsEntryPointCheck {
    async fn exists(&self, path: &Path) -> bool {
        match tokio::fs::metadata(path).await {
            Ok(meta) => meta.is_file(),
            Err(_) => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn fs_check_requires_a_regular_file() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("index.js");
        std::fs::write(&file, "console.log('oi')").unwrap();

        let check = FsEntryPointCheck;
        assert!(check.exists(&file).await);
        assert!(!check.exists(dir.path()).await);
        assert!(!check.exists(&dir.path().join("ausente.js")).await);
    }
}
