// src/models/tenant.rs

use std::{fmt, path::{Path, PathBuf}};

use serde::{Deserialize, Serialize};
use validator::ValidationError;

use crate::common::error::AppError;

// ---
// 1. TenantId (O "Cliente")
// ---
// Chave de duas partes no formato "<tipoPasta>/<nomeCliente>"
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct TenantId {
    folder_type: String,
    name: String,
}

/// Qual dos dois nomes do supervisor usar.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum NameForm {
    /// Último segmento (`nomeCliente`): usado em lookup, restart e stop.
    Short,
    /// Identificador completo (`tipoPasta/nomeCliente`): usado em create e delete.
    Full,
}

impl TenantId {
    pub fn parse(raw: &str) -> Result<Self, AppError> {
        check_tenant_id(raw).map_err(|_| AppError::InvalidTenantId(raw.to_string()))?;

        // check_tenant_id já garantiu exatamente um '/'
        let (folder_type, name) = raw
            .split_once('/')
            .ok_or_else(|| AppError::InvalidTenantId(raw.to_string()))?;

        Ok(Self {
            folder_type: folder_type.to_string(),
            name: name.to_string(),
        })
    }

    pub fn folder_type(&self) -> &str {
        &self.folder_type
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Nome do processo no registro do supervisor.
    ///
    /// O processo é criado (e removido) com o identificador completo, mas
    /// procurado, reiniciado e parado pelo nome curto. As duas formas existem
    /// de propósito; o controlador reconcilia qual delas o supervisor conhece.
    pub fn registry_name(&self, form: NameForm) -> String {
        match form {
            NameForm::Short => self.name.clone(),
            NameForm::Full => format!("{}/{}", self.folder_type, self.name),
        }
    }

    pub fn tenant_dir(&self, root: &Path) -> PathBuf {
        root.join(&self.folder_type).join(&self.name)
    }

    pub fn entrypoint_path(&self, root: &Path, file: &str) -> PathBuf {
        self.tenant_dir(root).join(file)
    }

    pub fn lists_dir(&self, root: &Path, dir_name: &str) -> PathBuf {
        self.tenant_dir(root).join(dir_name)
    }
}

impl fmt::Display for TenantId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.folder_type, self.name)
    }
}

impl TryFrom<String> for TenantId {
    type Error = AppError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<TenantId> for String {
    fn from(value: TenantId) -> Self {
        value.to_string()
    }
}

fn is_allowed_segment(segment: &str) -> bool {
    !segment.is_empty()
        && segment != "."
        && segment != ".."
        && segment.trim() == segment
        && segment
            .chars()
            .all(|c| c.is_alphanumeric() || matches!(c, '-' | '_' | '.' | ' '))
}

// Validador customizado para os payloads (`#[validate(custom(...))]`).
// Os segmentos viram caminhos no disco e argumentos do supervisor.
pub fn check_tenant_id(value: &str) -> Result<(), ValidationError> {
    let segments: Vec<&str> = value.split('/').collect();

    if segments.len() != 2 || !segments.iter().all(|s| is_allowed_segment(s)) {
        let mut err = ValidationError::new("tenant_id");
        err.message = Some("O cliente deve ter o formato 'tipoPasta/nomeCliente'.".into());
        return Err(err);
    }

    Ok(())
}
