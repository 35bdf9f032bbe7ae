// src/common/locks.rs

use std::{
    collections::HashMap,
    sync::{Arc, Mutex},
};

use tokio::sync::{Mutex as AsyncMutex, OwnedMutexGuard};

// ---
// Lock consultivo por cliente
// ---
/// Serializa as ações de controle de um mesmo cliente.
///
/// Cada chave recebe um `tokio::sync::Mutex` próprio. Entradas que ninguém
/// está usando são descartadas a cada aquisição, então o mapa nunca cresce
/// além do número de clientes com uma requisição em andamento.
#[derive(Clone, Default)]
pub struct TenantLocks {
    inner: Arc<Mutex<HashMap<String, Arc<AsyncMutex<()>>>>>,
}

impl TenantLocks {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn acquire(&self, key: &str) -> OwnedMutexGuard<()> {
        let lock = {
            // Um mutex envenenado só significa que outra task entrou em pânico
            // segurando o mapa; o conteúdo continua válido.
            let mut map = self.inner.lock().unwrap_or_else(|e| e.into_inner());
            map.retain(|_, l| Arc::strong_count(l) > 1);
            map.entry(key.to_string())
                .or_insert_with(|| Arc::new(AsyncMutex::new(())))
                .clone()
        };
        lock.lock_owned().await
    }

    /// Quantidade de chaves atualmente retidas.
    pub fn tracked(&self) -> usize {
        self.inner.lock().unwrap_or_else(|e| e.into_inner()).len()
    }
}
