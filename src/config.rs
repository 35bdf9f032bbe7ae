// src/config.rs

use std::{env, path::PathBuf, sync::Arc, time::Duration};

use anyhow::Context;
use tracing_subscriber::EnvFilter;

use crate::{
    db::ListRepository,
    services::{
        dispatch_service::DispatchService,
        process_service::{ProcessService, WorkerSettings},
    },
    supervisor::{EntryPointCheck, FsEntryPointCheck, Pm2Supervisor, ProcessSupervisor},
};

// Configuração lida do ambiente (e do .env, se existir)
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub clients_root: PathBuf,
    pub lists_dir_name: String,
    pub worker_entrypoint: String,
    pub worker_interpreter: String,
    pub pm2_bin: PathBuf,
    pub supervisor_timeout: Duration,
    pub read_timeout: Duration,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            clients_root: PathBuf::from("./clientes"),
            lists_dir_name: "listas".to_string(),
            worker_entrypoint: "index.js".to_string(),
            worker_interpreter: "node".to_string(),
            pm2_bin: PathBuf::from("pm2"),
            supervisor_timeout: Duration::from_millis(10_000),
            read_timeout: Duration::from_millis(3_000),
        }
    }
}

fn millis_var(raw: Option<String>, key: &str, default: Duration) -> anyhow::Result<Duration> {
    match raw {
        Some(raw) => {
            let ms: u64 = raw
                .trim()
                .parse()
                .with_context(|| format!("{key} deve ser um número de milissegundos, veio '{raw}'"))?;
            Ok(Duration::from_millis(ms))
        }
        None => Ok(default),
    }
}

impl AppConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        // A ausência do .env não é erro: as variáveis podem vir do ambiente
        dotenvy::dotenv().ok();

        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Monta a configuração a partir de uma fonte de variáveis qualquer.
    pub fn from_lookup<F>(lookup: F) -> anyhow::Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();

        Ok(Self {
            clients_root: lookup("CLIENTS_ROOT").map(PathBuf::from).unwrap_or(defaults.clients_root),
            lists_dir_name: lookup("LISTS_DIR_NAME").unwrap_or(defaults.lists_dir_name),
            worker_entrypoint: lookup("WORKER_ENTRYPOINT").unwrap_or(defaults.worker_entrypoint),
            worker_interpreter: lookup("WORKER_INTERPRETER").unwrap_or(defaults.worker_interpreter),
            pm2_bin: lookup("PM2_BIN").map(PathBuf::from).unwrap_or(defaults.pm2_bin),
            supervisor_timeout: millis_var(
                lookup("SUPERVISOR_TIMEOUT_MS"),
                "SUPERVISOR_TIMEOUT_MS",
                defaults.supervisor_timeout,
            )?,
            read_timeout: millis_var(lookup("READ_TIMEOUT_MS"), "READ_TIMEOUT_MS", defaults.read_timeout)?,
        })
    }

    pub fn worker_settings(&self) -> WorkerSettings {
        WorkerSettings {
            clients_root: self.clients_root.clone(),
            entrypoint_file: self.worker_entrypoint.clone(),
            interpreter: self.worker_interpreter.clone(),
        }
    }
}

// O estado compartilhado que a camada de apresentação recebe
#[derive(Clone)]
pub struct AppState {
    pub config: AppConfig,
    pub process_service: ProcessService,
    pub dispatch_service: DispatchService,
}

impl AppState {
    pub async fn new() -> anyhow::Result<Self> {
        let config = AppConfig::from_env()?;

        let supervisor = Arc::new(Pm2Supervisor::new(&config.pm2_bin, config.supervisor_timeout));

        tracing::info!(
            raiz = %config.clients_root.display(),
            pm2 = %config.pm2_bin.display(),
            "✅ Configuração carregada"
        );

        Ok(Self::with_parts(config, supervisor, Arc::new(FsEntryPointCheck)))
    }

    // --- Monta o gráfico de dependências ---
    pub fn with_parts(
        config: AppConfig,
        supervisor: Arc<dyn ProcessSupervisor>,
        entrypoints: Arc<dyn EntryPointCheck>,
    ) -> Self {
        let list_repo = ListRepository::new(
            config.clients_root.clone(),
            config.lists_dir_name.clone(),
            config.read_timeout,
        );

        let process_service = ProcessService::new(supervisor, entrypoints, config.worker_settings());
        let dispatch_service = DispatchService::new(list_repo);

        Self {
            config,
            process_service,
            dispatch_service,
        }
    }
}

/// Inicializa o logger (formato compacto, sem target, filtro via RUST_LOG).
///
/// Chamar mais de uma vez não tem efeito: o primeiro subscriber vence.
pub fn init_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .compact()
        .try_init();
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| vars.get(key).cloned()
    }

    #[test]
    fn reads_overrides_and_keeps_defaults() {
        let config = AppConfig::from_lookup(lookup_from(&[
            ("CLIENTS_ROOT", "/srv/clientes"),
            ("WORKER_INTERPRETER", "bun"),
            ("SUPERVISOR_TIMEOUT_MS", " 2500 "),
        ]))
        .unwrap();

        assert_eq!(config.clients_root, PathBuf::from("/srv/clientes"));
        assert_eq!(config.worker_interpreter, "bun");
        assert_eq!(config.worker_entrypoint, "index.js");
        assert_eq!(config.lists_dir_name, "listas");
        assert_eq!(config.supervisor_timeout, Duration::from_millis(2500));
        assert_eq!(config.read_timeout, Duration::from_millis(3000));
    }

    #[test]
    fn rejects_non_numeric_timeouts() {
        let err = AppConfig::from_lookup(lookup_from(&[("READ_TIMEOUT_MS", "três segundos")])).unwrap_err();
        assert!(err.to_string().contains("READ_TIMEOUT_MS"));
    }

    #[test]
    fn init_logging_is_idempotent() {
        init_logging();
        init_logging();
        tracing::info!("logger ativo");
    }
}
