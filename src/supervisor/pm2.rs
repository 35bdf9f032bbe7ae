// src/supervisor/pm2.rs

use std::{path::{Path, PathBuf}, process::Output, time::Duration};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::Deserialize;
use tokio::process::Command;
use tracing::{debug, error};

use crate::{
    common::error::AppError,
    models::process::{ProcessEntry, ProcessStatus},
    supervisor::ProcessSupervisor,
};

// Cliente tipado do PM2: cada comando é um vetor de argumentos, nunca uma
// string passada para um shell.
#[derive(Debug, Clone)]
pub struct Pm2Supervisor {
    bin: PathBuf,
    timeout: Duration,
}

impl Pm2Supervisor {
    pub fn new(bin: impl Into<PathBuf>, timeout: Duration) -> Self {
        Self { bin: bin.into(), timeout }
    }

    fn describe(&self, args: &[&str]) -> String {
        format!("{} {}", self.bin.display(), args.join(" "))
    }

    async fn run(&self, args: &[&str]) -> Result<Output, AppError> {
        debug!(args = ?args, "Executando comando do supervisor");

        let child = Command::new(&self.bin)
            .args(args)
            .kill_on_drop(true)
            .output();

        match tokio::time::timeout(self.timeout, child).await {
            Ok(Ok(output)) => Ok(output),
            Ok(Err(e)) => Err(AppError::SupervisorTransport {
                command: self.describe(args),
                detail: e.to_string(),
            }),
            Err(_) => Err(AppError::SupervisorTimeout {
                command: self.describe(args),
                timeout_ms: self.timeout.as_millis() as u64,
            }),
        }
    }

    async fn run_checked(&self, args: &[&str]) -> Result<Output, AppError> {
        let output = self.run(args).await?;

        if !output.status.success() {
            let detail = captured_output(&output);
            error!(args = ?args, detail = %detail, "🔥 Comando do supervisor falhou");
            return Err(AppError::SupervisorTransport {
                command: self.describe(args),
                detail,
            });
        }

        Ok(output)
    }
}

// stderr primeiro; se vier vazio, o PM2 costuma explicar no stdout
fn captured_output(output: &Output) -> String {
    let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
    let stdout = String::from_utf8_lossy(&output.stdout).trim().to_string();

    match (stderr.is_empty(), stdout.is_empty()) {
        (false, false) => format!("{stderr}\n{stdout}"),
        (false, true) => stderr,
        (true, false) => stdout,
        (true, true) => format!("código de saída {}", output.status),
    }
}

#[async_trait]
impl ProcessSupervisor for Pm2Supervisor {
    async fn list(&self) -> Result<Vec<ProcessEntry>, AppError> {
        let output = self.run_checked(&["jlist"]).await?;
        let stdout = String::from_utf8_lossy(&output.stdout);

        parse_jlist(&stdout).map_err(|reason| AppError::SupervisorTransport {
            command: self.describe(&["jlist"]),
            detail: reason,
        })
    }

    async fn create(&self, name: &str, entrypoint: &Path, interpreter: &str) -> Result<(), AppError> {
        let entry = entrypoint.to_string_lossy().into_owned();
        self.run_checked(&["start", entry.as_str(), "--name", name, "--interpreter", interpreter])
            .await?;
        Ok(())
    }

    async fn restart(&self, name: &str) -> Result<(), AppError> {
        self.run_checked(&["restart", name]).await?;
        Ok(())
    }

    async fn stop(&self, name: &str) -> Result<(), AppError> {
        self.run_checked(&["stop", name]).await?;
        Ok(())
    }

    async fn delete(&self, name: &str) -> Result<(), AppError> {
        self.run_checked(&["delete", name]).await?;
        Ok(())
    }
}

// ---
// Formato do `pm2 jlist`
// ---
#[derive(Debug, Deserialize)]
struct JlistProcess {
    name: String,
    #[serde(default)]
    pid: Option<u32>,
    #[serde(default)]
    pm2_env: Option<JlistEnv>,
    #[serde(default)]
    monit: Option<JlistMonit>,
}

#[derive(Debug, Deserialize)]
struct JlistEnv {
    #[serde(default)]
    status: Option<String>,
    #[serde(default)]
    restart_time: Option<u64>,
    #[serde(default)]
    pm_uptime: Option<i64>,
}

#[derive(Debug, Deserialize)]
struct JlistMonit {
    #[serde(default)]
    memory: Option<u64>,
    #[serde(default)]
    cpu: Option<f64>,
}

fn parse_jlist(stdout: &str) -> Result<Vec<ProcessEntry>, String> {
    // O PM2 às vezes imprime avisos (inclusive "[PM2] ...") antes e depois do
    // JSON, então tentamos a partir de cada '[' e lemos só o primeiro valor.
    let mut last_error = "saída do jlist sem lista JSON".to_string();
    let mut parsed: Option<Vec<JlistProcess>> = None;
    for (start, _) in stdout.match_indices('[') {
        let mut values = serde_json::Deserializer::from_str(&stdout[start..]).into_iter::<Vec<JlistProcess>>();
        match values.next() {
            Some(Ok(list)) => {
                parsed = Some(list);
                break;
            }
            Some(Err(e)) => last_error = format!("jlist inválido: {e}"),
            None => {}
        }
    }
    let raw = parsed.ok_or(last_error)?;

    Ok(raw
        .into_iter()
        .map(|p| {
            let env = p.pm2_env.unwrap_or(JlistEnv { status: None, restart_time: None, pm_uptime: None });
            let status = env
                .status
                .as_deref()
                .map(ProcessStatus::from_supervisor)
                .unwrap_or_else(|| ProcessStatus::Other("unknown".to_string()));

            ProcessEntry {
                name: p.name,
                status,
                // PM2 reporta pid 0 para processos parados
                pid: p.pid.filter(|pid| *pid > 0),
                restarts: env.restart_time,
                uptime_since: env.pm_uptime.and_then(DateTime::<Utc>::from_timestamp_millis),
                memory_bytes: p.monit.as_ref().and_then(|m| m.memory),
                cpu_percent: p.monit.as_ref().and_then(|m| m.cpu),
            }
        })
        .collect())
}
