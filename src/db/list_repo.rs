// src/db/list_repo.rs

use std::{
    io::ErrorKind,
    path::{Path, PathBuf},
    time::Duration,
};

use tokio::task::JoinSet;

use crate::{
    common::error::AppError,
    models::{
        dispatch::{DispatchList, RawDispatchList},
        tenant::TenantId,
    },
};

// O repositório de listas de disparo: um documento JSON por lista,
// em <raiz>/<tipoPasta>/<nomeCliente>/<dirListas>/*.json
#[derive(Clone)]
pub struct ListRepository {
    root: PathBuf,
    dir_name: String,
    read_timeout: Duration,
}

impl ListRepository {
    pub fn new(root: impl Into<PathBuf>, dir_name: impl Into<String>, read_timeout: Duration) -> Self {
        Self {
            root: root.into(),
            dir_name: dir_name.into(),
            read_timeout,
        }
    }

    pub fn lists_dir(&self, tenant: &TenantId) -> PathBuf {
        tenant.lists_dir(&self.root, &self.dir_name)
    }

    /// Lê todas as listas do cliente, ordenadas pelo nome do arquivo.
    ///
    /// Diretório ausente = cliente sem listas (vetor vazio). Um documento
    /// ilegível é só registrado no log e deixado de fora.
    pub async fn read_lists(&self, tenant: &TenantId) -> Result<Vec<DispatchList>, AppError> {
        let dir = self.lists_dir(tenant);

        let paths = match list_json_files(&dir).await {
            Ok(paths) => paths,
            Err(AppError::DirectoryAccess { source, .. }) if source.kind() == ErrorKind::NotFound => {
                tracing::debug!(tenant = %tenant, path = %dir.display(), "Cliente ainda sem diretório de listas");
                return Ok(Vec::new());
            }
            Err(e) => return Err(e),
        };

        // 1. Lê os documentos em paralelo (cada um é independente)
        let mut tasks = JoinSet::new();
        for (index, path) in paths.into_iter().enumerate() {
            let timeout = self.read_timeout;
            tasks.spawn(async move { (index, load_document(&path, timeout).await) });
        }

        // 2. Junta tudo antes de devolver: nenhuma agregação parcial é publicada
        let mut loaded: Vec<(usize, DispatchList)> = Vec::new();
        while let Some(joined) = tasks.join_next().await {
            match joined {
                Ok((index, Ok(list))) => loaded.push((index, list)),
                Ok((_, Err(e))) => {
                    tracing::warn!(tenant = %tenant, error = %e, "⚠️ Documento de lista ignorado");
                }
                Err(e) => {
                    tracing::warn!(tenant = %tenant, error = %e, "⚠️ Leitura de lista abortada");
                }
            }
        }

        // 3. Restaura a ordem do diretório
        loaded.sort_by_key(|(index, _)| *index);
        Ok(loaded.into_iter().map(|(_, list)| list).collect())
    }
}

async fn list_json_files(dir: &Path) -> Result<Vec<PathBuf>, AppError> {
    let access_error = |source: std::io::Error| AppError::DirectoryAccess {
        path: dir.to_path_buf(),
        source,
    };

    let mut entries = tokio::fs::read_dir(dir).await.map_err(access_error)?;
    let mut paths = Vec::new();

    while let Some(entry) = entries.next_entry().await.map_err(access_error)? {
        let path = entry.path();
        let is_json = path.extension().and_then(|e| e.to_str()) == Some("json");
        // `metadata` segue links simbólicos: uma lista linkada também conta
        let is_file = tokio::fs::metadata(&path).await.map(|m| m.is_file()).unwrap_or(false);
        if is_json && is_file {
            paths.push(path);
        }
    }

    paths.sort_by(|a, b| a.file_name().cmp(&b.file_name()));
    Ok(paths)
}

pub(crate) async fn load_document(path: &Path, timeout: Duration) -> Result<DispatchList, AppError> {
    let partial = |reason: String| AppError::PartialRead {
        path: path.to_path_buf(),
        reason,
    };

    // Estourar o tempo conta como falha de parse deste documento
    let bytes = match tokio::time::timeout(timeout, tokio::fs::read(path)).await {
        Ok(Ok(bytes)) => bytes,
        Ok(Err(e)) => return Err(partial(e.to_string())),
        Err(_) => return Err(partial(format!("leitura excedeu {}ms", timeout.as_millis()))),
    };

    let raw: RawDispatchList = serde_json::from_slice(&bytes).map_err(|e| partial(e.to_string()))?;

    let fallback_id = path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();

    Ok(DispatchList::from_raw(raw, &fallback_id))
}
