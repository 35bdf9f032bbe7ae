// src/models/process.rs

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::{
    common::error::ErrorBody,
    models::tenant::{check_tenant_id, NameForm},
};

// ---
// 1. ProcessStatus (Estado observado do worker)
// ---
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProcessStatus {
    Online,
    Stopped,
    Errored,
    Launching,
    // Sintético: ausente do registro do supervisor (ou supervisor inacessível)
    NotFound,
    // Qualquer outro estado que o supervisor reporte (ex.: "stopping")
    Other(String),
}

impl ProcessStatus {
    pub fn from_supervisor(raw: &str) -> Self {
        match raw {
            "online" => ProcessStatus::Online,
            "stopped" => ProcessStatus::Stopped,
            "errored" => ProcessStatus::Errored,
            "launching" | "one-launch-status" => ProcessStatus::Launching,
            other => ProcessStatus::Other(other.to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            ProcessStatus::Online => "online",
            ProcessStatus::Stopped => "stopped",
            ProcessStatus::Errored => "errored",
            ProcessStatus::Launching => "launching",
            ProcessStatus::NotFound => "not_found",
            ProcessStatus::Other(s) => s,
        }
    }
}

impl fmt::Display for ProcessStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for ProcessStatus {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

// ---
// 2. ProcessEntry (Uma linha da tabela de processos do supervisor)
// ---
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProcessEntry {
    pub name: String,
    pub status: ProcessStatus,
    pub pid: Option<u32>,
    pub restarts: Option<u64>,
    pub uptime_since: Option<DateTime<Utc>>,
    pub memory_bytes: Option<u64>,
    pub cpu_percent: Option<f64>,
}

impl ProcessEntry {
    pub fn new(name: impl Into<String>, status: ProcessStatus) -> Self {
        Self {
            name: name.into(),
            status,
            pid: None,
            restarts: None,
            uptime_since: None,
            memory_bytes: None,
            cpu_percent: None,
        }
    }
}

// Resultado de uma observação: o estado e sob qual nome o processo foi achado
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ObservedProcess {
    pub status: ProcessStatus,
    pub registered_as: Option<NameForm>,
    pub entry: Option<ProcessEntry>,
}

impl ObservedProcess {
    pub fn not_found() -> Self {
        Self {
            status: ProcessStatus::NotFound,
            registered_as: None,
            entry: None,
        }
    }
}

// ---
// 3. Ação de controle
// ---
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProcessAction {
    Start,
    Stop,
    Delete,
}

impl fmt::Display for ProcessAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            ProcessAction::Start => "start",
            ProcessAction::Stop => "stop",
            ProcessAction::Delete => "delete",
        })
    }
}

// ---
// 4. "Payload" e resposta do controle
// ---
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct ControlRequest {
    #[validate(custom(function = "check_tenant_id"))]
    pub tenant_id: String,
    pub action: ProcessAction,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ControlResult {
    pub success: bool,
    pub status: ProcessStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<ErrorBody>,
}

impl ControlResult {
    pub fn ok(status: ProcessStatus) -> Self {
        Self { success: true, status, error: None }
    }

    pub fn failed(status: ProcessStatus, error: ErrorBody) -> Self {
        Self { success: false, status, error: Some(error) }
    }
}
