// src/models/dispatch.rs

use serde::{Deserialize, Serialize};
use serde_json::Value;
use validator::Validate;

use crate::models::tenant::check_tenant_id;

// ---
// 1. Documento bruto (como está no disco)
// ---
// Os documentos mudam de forma com o tempo (campos opcionais, tipos soltos).
// Tudo é lido como `Value` e os padrões são aplicados em `DispatchList::from_raw`.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawDispatchList {
    #[serde(default)]
    pub id: Option<Value>,
    #[serde(default)]
    pub ativo: Option<Value>,
    #[serde(default)]
    pub status_interno: Option<Value>,
    #[serde(default)]
    pub mensagem_erro: Option<Value>,
    #[serde(default)]
    pub contatos: Option<Value>,
}

// ---
// 2. Estado interno de uma lista
// ---
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InternalStatus {
    Pending,
    Running,
    Finished,
    Error,
    // Ausente ou desconhecido: ociosa / pausada
    Idle,
}

impl InternalStatus {
    pub fn from_raw(raw: Option<&Value>) -> Self {
        match raw.and_then(Value::as_str) {
            Some("pendente") => InternalStatus::Pending,
            Some("rodando") => InternalStatus::Running,
            Some("finalizada") => InternalStatus::Finished,
            Some("erro") => InternalStatus::Error,
            _ => InternalStatus::Idle,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Contact {
    pub sent: bool,
}

// ---
// 3. DispatchList (A lista de disparo já normalizada)
// ---
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DispatchList {
    pub id: String,
    pub active: bool,
    pub internal_status: InternalStatus,
    pub error_message: Option<String>,
    pub contacts: Vec<Contact>,
}

impl DispatchList {
    /// Aplica os padrões do documento: `ativo` só é falso para o literal
    /// `false`, o `id` cai para o nome do arquivo e um contato só conta como
    /// enviado quando `disparo == "sim"`.
    pub fn from_raw(raw: RawDispatchList, fallback_id: &str) -> Self {
        let id = match raw.id {
            Some(Value::String(s)) if !s.is_empty() => s,
            Some(Value::Number(n)) => n.to_string(),
            _ => fallback_id.to_string(),
        };

        let active = !matches!(raw.ativo, Some(Value::Bool(false)));
        let internal_status = InternalStatus::from_raw(raw.status_interno.as_ref());

        let error_message = raw
            .mensagem_erro
            .as_ref()
            .and_then(Value::as_str)
            .filter(|m| !m.trim().is_empty())
            .map(str::to_string);

        // Qualquer coisa que não seja um array conta como lista sem contatos
        let contacts = match raw.contatos {
            Some(Value::Array(items)) => items
                .iter()
                .map(|c| Contact {
                    sent: c.get("disparo").and_then(Value::as_str) == Some("sim"),
                })
                .collect(),
            _ => Vec::new(),
        };

        Self { id, active, internal_status, error_message, contacts }
    }

    pub fn sent_count(&self) -> usize {
        self.contacts.iter().filter(|c| c.sent).count()
    }

    /// round(100 * enviados / total), 0 quando não há contatos.
    pub fn progress_percent(&self) -> u8 {
        let total = self.contacts.len();
        if total == 0 {
            return 0;
        }
        let sent = self.sent_count();
        // Arredondamento "metade para cima" em aritmética inteira
        let pct = (200 * sent + total) / (2 * total);
        pct.min(100) as u8
    }
}

// ---
// 4. Status agregado (derivado, nunca persistido)
// ---
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum OverallStatus {
    SemListasDisparo,
    SemListasAtivas,
    Erro,
    EmAndamento,
    Concluido,
    Pausado,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CurrentList {
    // Posição (1-based) entre as listas ativas; 0 quando não se aplica
    pub indice: usize,
    pub progresso_percentual: u8,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub enviados: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub total: Option<usize>,
}

impl CurrentList {
    pub fn none() -> Self {
        Self { indice: 0, progresso_percentual: 0, id: None, enviados: None, total: None }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DispatchStatus {
    pub status_geral: OverallStatus,
    pub listas_ativas_count: usize,
    pub total_listas_na_fila: usize,
    pub lista_atual: CurrentList,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub log_erro: Option<String>,
}

// ---
// 5. "Payload" da consulta de status
// ---
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct StatusQuery {
    #[validate(custom(function = "check_tenant_id"))]
    pub tenant_id: String,
}
