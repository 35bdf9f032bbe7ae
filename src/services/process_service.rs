// src/services/process_service.rs

use std::{path::PathBuf, sync::Arc};

use tracing::Instrument;
use uuid::Uuid;

use crate::{
    common::{error::AppError, locks::TenantLocks},
    models::{
        process::{ControlResult, ObservedProcess, ProcessAction, ProcessStatus},
        tenant::{NameForm, TenantId},
    },
    supervisor::{EntryPointCheck, ProcessSupervisor},
};

/// Como o worker de um cliente é iniciado.
#[derive(Debug, Clone)]
pub struct WorkerSettings {
    pub clients_root: PathBuf,
    pub entrypoint_file: String,
    pub interpreter: String,
}

// O controlador do ciclo de vida do worker de cada cliente
#[derive(Clone)]
pub struct ProcessService {
    supervisor: Arc<dyn ProcessSupervisor>,
    entrypoints: Arc<dyn EntryPointCheck>,
    settings: WorkerSettings,
    locks: TenantLocks,
}

impl ProcessService {
    pub fn new(
        supervisor: Arc<dyn ProcessSupervisor>,
        entrypoints: Arc<dyn EntryPointCheck>,
        settings: WorkerSettings,
    ) -> Self {
        Self {
            supervisor,
            entrypoints,
            settings,
            locks: TenantLocks::new(),
        }
    }

    /// Procura o processo do cliente na tabela do supervisor.
    ///
    /// O nome curto é o caminho normal. Se só o nome completo existir (o
    /// processo foi criado agora há pouco), ele também é aceito e o resultado
    /// diz sob qual forma foi achado. Supervisor inacessível vira `not_found`.
    pub async fn observe(&self, tenant: &TenantId) -> ObservedProcess {
        let entries = match self.supervisor.list().await {
            Ok(entries) => entries,
            Err(e) => {
                tracing::warn!(tenant = %tenant, error = %e, "Supervisor indisponível; tratando como not_found");
                return ObservedProcess::not_found();
            }
        };

        for form in [NameForm::Short, NameForm::Full] {
            let name = tenant.registry_name(form);
            if let Some(entry) = entries.iter().find(|e| e.name == name) {
                if form == NameForm::Full {
                    tracing::warn!(
                        tenant = %tenant,
                        "Processo registrado com o nome completo, não com o nome curto"
                    );
                }
                return ObservedProcess {
                    status: entry.status.clone(),
                    registered_as: Some(form),
                    entry: Some(entry.clone()),
                };
            }
        }

        tracing::debug!(tenant = %tenant, "Processo ausente do registro do supervisor");
        ObservedProcess::not_found()
    }

    pub async fn observe_status(&self, tenant: &TenantId) -> ProcessStatus {
        self.observe(tenant).await.status
    }

    /// Reconcilia a ação pedida com o estado observado do worker.
    ///
    /// Emite no máximo um comando ao supervisor. As ações repetidas (start
    /// com o processo online, stop/delete com ele ausente) não fazem nada e
    /// respondem sucesso.
    pub async fn apply(&self, tenant: &TenantId, action: ProcessAction) -> ControlResult {
        let request_id = Uuid::new_v4();
        let span = tracing::info_span!("apply", %request_id, tenant = %tenant, %action);

        async move {
            // Serializa ações concorrentes do mesmo cliente
            let _guard = self.locks.acquire(&tenant.to_string()).await;

            let observed = self.observe(tenant).await;
            let before = observed.status.clone();

            match self.decide(tenant, action, observed).await {
                Ok(status) => {
                    tracing::info!(antes = %before, depois = %status, "✅ Ação de controle aplicada");
                    ControlResult::ok(status)
                }
                Err(e) => {
                    tracing::error!(error = %e, status = %before, "🔥 Falha na ação de controle");
                    ControlResult::failed(before, e.to_body())
                }
            }
        }
        .instrument(span)
        .await
    }

    async fn decide(
        &self,
        tenant: &TenantId,
        action: ProcessAction,
        observed: ObservedProcess,
    ) -> Result<ProcessStatus, AppError> {
        // Restart, stop e delete miram o nome que o supervisor realmente conhece.
        // Sem registro observado, vale o padrão de cada ação: curto para
        // restart/stop, completo para delete (o nome usado na criação).
        let known_name = tenant.registry_name(observed.registered_as.unwrap_or(NameForm::Short));
        let delete_name = tenant.registry_name(observed.registered_as.unwrap_or(NameForm::Full));

        match (action, observed.status) {
            // --- start ---
            (ProcessAction::Start, status @ (ProcessStatus::Online | ProcessStatus::Launching)) => {
                Ok(status)
            }
            (ProcessAction::Start, ProcessStatus::NotFound) => {
                let entrypoint = tenant.entrypoint_path(&self.settings.clients_root, &self.settings.entrypoint_file);

                if !self.entrypoints.exists(&entrypoint).await {
                    return Err(AppError::EntryPointNotFound(entrypoint));
                }

                self.supervisor
                    .create(&tenant.registry_name(NameForm::Full), &entrypoint, &self.settings.interpreter)
                    .await?;

                Ok(self.observe_status(tenant).await)
            }
            (ProcessAction::Start, _) => {
                self.supervisor.restart(&known_name).await?;
                Ok(self.observe_status(tenant).await)
            }

            // --- stop ---
            (ProcessAction::Stop, status @ (ProcessStatus::NotFound | ProcessStatus::Stopped)) => {
                Ok(status)
            }
            (ProcessAction::Stop, _) => {
                self.supervisor.stop(&known_name).await?;
                Ok(ProcessStatus::Stopped)
            }

            // --- delete ---
            (ProcessAction::Delete, ProcessStatus::NotFound) => Ok(ProcessStatus::NotFound),
            (ProcessAction::Delete, _) => {
                self.supervisor.delete(&delete_name).await?;
                Ok(ProcessStatus::NotFound)
            }
        }
    }
}
