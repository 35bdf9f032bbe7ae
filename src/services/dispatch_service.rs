// src/services/dispatch_service.rs

use crate::{
    common::error::AppError,
    db::ListRepository,
    models::{
        dispatch::{CurrentList, DispatchList, DispatchStatus, InternalStatus, OverallStatus},
        tenant::TenantId,
    },
};

#[derive(Clone)]
pub struct DispatchService {
    repo: ListRepository,
}

impl DispatchService {
    pub fn new(repo: ListRepository) -> Self {
        Self { repo }
    }

    /// Status da campanha do cliente, recalculado a cada consulta (sem cache).
    pub async fn status(&self, tenant: &TenantId) -> Result<DispatchStatus, AppError> {
        let lists = self.repo.read_lists(tenant).await?;
        let status = aggregate(&lists);

        tracing::debug!(
            tenant = %tenant,
            status = ?status.status_geral,
            ativas = status.listas_ativas_count,
            "Status de disparo calculado"
        );

        Ok(status)
    }
}

fn error_log(list: &DispatchList) -> String {
    list.error_message
        .clone()
        .unwrap_or_else(|| format!("Lista '{}' em erro sem mensagem registrada", list.id))
}

/// Reduz as listas do cliente a um único status.
///
/// Prioridade (a primeira regra que casar vence): erro, em andamento,
/// concluído, pausado. Função pura: a mesma entrada dá sempre a mesma saída.
pub fn aggregate(lists: &[DispatchList]) -> DispatchStatus {
    // 1. Nenhuma lista
    if lists.is_empty() {
        return DispatchStatus {
            status_geral: OverallStatus::SemListasDisparo,
            listas_ativas_count: 0,
            total_listas_na_fila: 0,
            lista_atual: CurrentList::none(),
            log_erro: None,
        };
    }

    // 2. A fila é exatamente o conjunto de listas ativas
    let active: Vec<&DispatchList> = lists.iter().filter(|l| l.active).collect();
    let queued = active.len();

    if active.is_empty() {
        // Erro numa lista inativa não muda a fila, mas continua visível
        let log_erro = lists
            .iter()
            .find(|l| l.internal_status == InternalStatus::Error)
            .map(error_log);

        return DispatchStatus {
            status_geral: OverallStatus::SemListasAtivas,
            listas_ativas_count: 0,
            total_listas_na_fila: 0,
            lista_atual: CurrentList::none(),
            log_erro,
        };
    }

    let position_of = |wanted: InternalStatus| {
        active.iter().position(|l| l.internal_status == wanted)
    };

    // 3a. Erro tem prioridade sobre tudo
    let (status_geral, lista_atual, log_erro) = if let Some(pos) = position_of(InternalStatus::Error) {
        let list = active[pos];
        (
            OverallStatus::Erro,
            CurrentList {
                indice: pos + 1,
                progresso_percentual: 0,
                id: Some(list.id.clone()),
                ..CurrentList::none()
            },
            Some(error_log(list)),
        )
    // 3b. Depois, a lista rodando
    } else if let Some(pos) = position_of(InternalStatus::Running) {
        let list = active[pos];
        (
            OverallStatus::EmAndamento,
            CurrentList {
                indice: pos + 1,
                progresso_percentual: list.progress_percent(),
                id: Some(list.id.clone()),
                enviados: Some(list.sent_count()),
                total: Some(list.contacts.len()),
            },
            None,
        )
    // 3c. Todas finalizadas
    } else if active.iter().all(|l| l.internal_status == InternalStatus::Finished) {
        let last = active[queued - 1];
        (
            OverallStatus::Concluido,
            CurrentList {
                indice: queued,
                progresso_percentual: 100,
                id: Some(last.id.clone()),
                ..CurrentList::none()
            },
            None,
        )
    // 3d. Mistura de pendentes/ociosas
    } else {
        (OverallStatus::Pausado, CurrentList::none(), None)
    };

    DispatchStatus {
        status_geral,
        listas_ativas_count: queued,
        total_listas_na_fila: queued,
        lista_atual,
        log_erro,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::dispatch::Contact;

    fn list(id: &str, active: bool, status: InternalStatus, sent: usize, total: usize) -> DispatchList {
        DispatchList {
            id: id.to_string(),
            active,
            internal_status: status,
            error_message: None,
            contacts: (0..total).map(|i| Contact { sent: i < sent }).collect(),
        }
    }

    #[test]
    fn no_lists() {
        let s = aggregate(&[]);
        assert_eq!(s.status_geral, OverallStatus::SemListasDisparo);
        assert_eq!(s.listas_ativas_count, 0);
        assert_eq!(s.total_listas_na_fila, 0);
        assert_eq!(s.lista_atual, CurrentList::none());
    }

    #[test]
    fn only_inactive_lists_surface_their_error() {
        let mut broken = list("velha", false, InternalStatus::Error, 0, 3);
        broken.error_message = Some("sessão do WhatsApp expirou".to_string());
        let s = aggregate(&[list("a", false, InternalStatus::Running, 1, 2), broken]);

        assert_eq!(s.status_geral, OverallStatus::SemListasAtivas);
        assert_eq!(s.log_erro.as_deref(), Some("sessão do WhatsApp expirou"));
        assert_eq!(s.listas_ativas_count, 0);
    }

    #[test]
    fn error_outranks_running_and_finished() {
        let mut broken = list("c", true, InternalStatus::Error, 5, 10);
        broken.error_message = Some("número inválido".to_string());
        let lists = [
            list("a", true, InternalStatus::Finished, 4, 4),
            list("b", true, InternalStatus::Running, 1, 4),
            broken,
        ];

        let s = aggregate(&lists);
        assert_eq!(s.status_geral, OverallStatus::Erro);
        assert_eq!(s.lista_atual.indice, 3);
        assert_eq!(s.lista_atual.progresso_percentual, 0);
        assert_eq!(s.log_erro.as_deref(), Some("número inválido"));
    }

    #[test]
    fn error_without_message_gets_generated_log() {
        let s = aggregate(&[list("promo", true, InternalStatus::Error, 0, 1)]);
        assert!(s.log_erro.unwrap().contains("promo"));
    }

    #[test]
    fn running_list_reports_progress() {
        let s = aggregate(&[list("a", true, InternalStatus::Running, 2, 3)]);
        assert_eq!(s.status_geral, OverallStatus::EmAndamento);
        assert_eq!(s.lista_atual.indice, 1);
        assert_eq!(s.lista_atual.progresso_percentual, 67);
        assert_eq!(s.lista_atual.enviados, Some(2));
        assert_eq!(s.lista_atual.total, Some(3));
    }

    #[test]
    fn running_index_counts_only_active_lists() {
        let lists = [
            list("inativa", false, InternalStatus::Finished, 0, 0),
            list("a", true, InternalStatus::Finished, 1, 1),
            list("b", true, InternalStatus::Running, 0, 0),
        ];
        let s = aggregate(&lists);
        assert_eq!(s.lista_atual.indice, 2);
        assert_eq!(s.lista_atual.progresso_percentual, 0);
        assert_eq!(s.listas_ativas_count, 2);
        assert_eq!(s.total_listas_na_fila, 2);
    }

    #[test]
    fn all_finished_is_completed() {
        let lists = [
            list("a", true, InternalStatus::Finished, 2, 2),
            list("b", true, InternalStatus::Finished, 0, 3),
        ];
        let s = aggregate(&lists);
        assert_eq!(s.status_geral, OverallStatus::Concluido);
        assert_eq!(s.lista_atual.indice, 2);
        assert_eq!(s.lista_atual.progresso_percentual, 100);
    }

    #[test]
    fn pending_mixture_is_paused() {
        let lists = [
            list("a", true, InternalStatus::Finished, 2, 2),
            list("b", true, InternalStatus::Pending, 0, 3),
            list("c", true, InternalStatus::Idle, 0, 3),
        ];
        let s = aggregate(&lists);
        assert_eq!(s.status_geral, OverallStatus::Pausado);
        assert_eq!(s.lista_atual.indice, 0);
        assert_eq!(s.lista_atual.progresso_percentual, 0);
        assert_eq!(s.listas_ativas_count, 3);
    }

    #[test]
    fn aggregation_is_deterministic() {
        let lists = [
            list("a", true, InternalStatus::Pending, 0, 3),
            list("b", true, InternalStatus::Running, 1, 3),
        ];
        assert_eq!(aggregate(&lists), aggregate(&lists));
    }
}
