#![allow(dead_code)]

use std::{
    path::{Path, PathBuf},
    sync::{Arc, Mutex},
};

use async_trait::async_trait;
use disparo_core::{
    AppConfig, AppError, AppState,
    models::process::{ProcessEntry, ProcessStatus},
    supervisor::{EntryPointCheck, ProcessSupervisor},
};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
    Create { name: String, entrypoint: PathBuf, interpreter: String },
    Restart(String),
    Stop(String),
    Delete(String),
}

// Supervisor em memória: guarda a tabela de processos e os comandos recebidos
#[derive(Default)]
pub struct FakeSupervisor {
    table: Mutex<Vec<ProcessEntry>>,
    calls: Mutex<Vec<Call>>,
    unreachable: Mutex<bool>,
    failing_commands: Mutex<Option<String>>,
    // Quando true, o processo criado aparece na tabela pelo último segmento do nome
    shorten_on_create: bool,
}

impl FakeSupervisor {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn shortening() -> Arc<Self> {
        Arc::new(Self { shorten_on_create: true, ..Self::default() })
    }

    pub fn with_process(self: Arc<Self>, name: &str, status: ProcessStatus) -> Arc<Self> {
        self.table.lock().unwrap().push(ProcessEntry::new(name, status));
        self
    }

    pub fn set_unreachable(&self, value: bool) {
        *self.unreachable.lock().unwrap() = value;
    }

    pub fn fail_commands_with(&self, detail: &str) {
        *self.failing_commands.lock().unwrap() = Some(detail.to_string());
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    pub fn status_of(&self, name: &str) -> Option<ProcessStatus> {
        self.table
            .lock()
            .unwrap()
            .iter()
            .find(|e| e.name == name)
            .map(|e| e.status.clone())
    }

    fn record(&self, call: Call, command: &str) -> Result<(), AppError> {
        self.calls.lock().unwrap().push(call);
        match self.failing_commands.lock().unwrap().clone() {
            Some(detail) => Err(AppError::SupervisorTransport {
                command: command.to_string(),
                detail,
            }),
            None => Ok(()),
        }
    }

    fn set_status(&self, name: &str, status: ProcessStatus, command: &str) -> Result<(), AppError> {
        let mut table = self.table.lock().unwrap();
        match table.iter_mut().find(|e| e.name == name) {
            Some(entry) => {
                entry.status = status;
                Ok(())
            }
            None => Err(AppError::SupervisorTransport {
                command: command.to_string(),
                detail: format!("[PM2][ERROR] Process or Namespace {name} not found"),
            }),
        }
    }
}

#[async_trait]
impl ProcessSupervisor for FakeSupervisor {
    async fn list(&self) -> Result<Vec<ProcessEntry>, AppError> {
        if *self.unreachable.lock().unwrap() {
            return Err(AppError::SupervisorTransport {
                command: "pm2 jlist".to_string(),
                detail: "connect ECONNREFUSED".to_string(),
            });
        }
        Ok(self.table.lock().unwrap().clone())
    }

    async fn create(&self, name: &str, entrypoint: &Path, interpreter: &str) -> Result<(), AppError> {
        self.record(
            Call::Create {
                name: name.to_string(),
                entrypoint: entrypoint.to_path_buf(),
                interpreter: interpreter.to_string(),
            },
            "pm2 start",
        )?;

        let registered = if self.shorten_on_create {
            name.rsplit('/').next().unwrap_or(name).to_string()
        } else {
            name.to_string()
        };
        self.table
            .lock()
            .unwrap()
            .push(ProcessEntry::new(registered, ProcessStatus::Online));
        Ok(())
    }

    async fn restart(&self, name: &str) -> Result<(), AppError> {
        self.record(Call::Restart(name.to_string()), "pm2 restart")?;
        self.set_status(name, ProcessStatus::Online, "pm2 restart")
    }

    async fn stop(&self, name: &str) -> Result<(), AppError> {
        self.record(Call::Stop(name.to_string()), "pm2 stop")?;
        self.set_status(name, ProcessStatus::Stopped, "pm2 stop")
    }

    async fn delete(&self, name: &str) -> Result<(), AppError> {
        self.record(Call::Delete(name.to_string()), "pm2 delete")?;
        let mut table = self.table.lock().unwrap();
        let before = table.len();
        table.retain(|e| e.name != name);
        if table.len() == before {
            return Err(AppError::SupervisorTransport {
                command: "pm2 delete".to_string(),
                detail: format!("[PM2][ERROR] Process or Namespace {name} not found"),
            });
        }
        Ok(())
    }
}

pub struct StaticEntryPoints(pub bool);

#[async_trait]
impl EntryPointCheck for StaticEntryPoints {
    async fn exists(&self, _path: &Path) -> bool {
        self.0
    }
}

pub fn config(root: &Path) -> AppConfig {
    AppConfig {
        clients_root: root.to_path_buf(),
        ..AppConfig::default()
    }
}

pub fn state(supervisor: Arc<FakeSupervisor>, entrypoint_exists: bool) -> AppState {
    AppState::with_parts(
        config(Path::new("/srv/clientes")),
        supervisor,
        Arc::new(StaticEntryPoints(entrypoint_exists)),
    )
}
