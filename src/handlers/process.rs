// src/handlers/process.rs

use validator::Validate;

use crate::{
    common::error::AppError,
    config::AppState,
    models::{
        process::{ControlRequest, ControlResult, ProcessStatus},
        tenant::TenantId,
    },
};

// ControlRequest{tenantId, action} -> ControlResult{success, status, error?}
//
// Nunca retorna Err: toda falha vira um resultado estruturado que a camada de
// apresentação só precisa renderizar.
pub async fn control(app_state: &AppState, payload: ControlRequest) -> ControlResult {
    // 1. Validar o payload
    if let Err(e) = payload.validate() {
        return ControlResult::failed(ProcessStatus::NotFound, AppError::ValidationError(e).to_body());
    }

    let tenant = match TenantId::parse(&payload.tenant_id) {
        Ok(tenant) => tenant,
        Err(e) => return ControlResult::failed(ProcessStatus::NotFound, e.to_body()),
    };

    // 2. Chamar o Serviço
    app_state.process_service.apply(&tenant, payload.action).await
}
