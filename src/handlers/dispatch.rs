// src/handlers/dispatch.rs

use validator::Validate;

use crate::{
    common::error::AppError,
    config::AppState,
    models::{
        dispatch::{DispatchStatus, StatusQuery},
        tenant::TenantId,
    },
};

// StatusQuery{tenantId} -> status agregado da campanha
pub async fn status(app_state: &AppState, query: StatusQuery) -> Result<DispatchStatus, AppError> {
    query.validate()?;

    let tenant = TenantId::parse(&query.tenant_id)?;

    app_state.dispatch_service.status(&tenant).await
}
