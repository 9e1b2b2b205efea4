use axum::{body::Bytes, extract::State, http::StatusCode, Json};

use super::dtos::CustomerResponse;
use super::service::CustomerService;
use crate::modules::auth::service::Claims;
use crate::shared::{
    error::AppResult,
    extractors::ResourceId,
    state::AppState,
    validation::{parse_body, Mode},
};

pub async fn list_customers(
    State(state): State<AppState>,
) -> AppResult<Json<Vec<CustomerResponse>>> {
    let customers = CustomerService::list(state.repo_manager.as_ref()).await?;
    Ok(Json(customers))
}

pub async fn get_customer(
    State(state): State<AppState>,
    ResourceId(id): ResourceId,
) -> AppResult<Json<CustomerResponse>> {
    let customer = CustomerService::get(state.repo_manager.as_ref(), id).await?;
    Ok(Json(customer))
}

pub async fn create_customer(
    State(state): State<AppState>,
    claims: Claims,
    body: Bytes,
) -> AppResult<(StatusCode, Json<CustomerResponse>)> {
    tracing::debug!(caller = %claims.sub, "Create customer");
    let data = parse_body(&body, true)?;
    let customer = CustomerService::create(state.repo_manager.as_ref(), data).await?;
    Ok((StatusCode::CREATED, Json(customer)))
}

pub async fn replace_customer(
    State(state): State<AppState>,
    _claims: Claims,
    ResourceId(id): ResourceId,
    body: Bytes,
) -> AppResult<Json<CustomerResponse>> {
    update(state, id, &body, Mode::Full).await
}

pub async fn patch_customer(
    State(state): State<AppState>,
    _claims: Claims,
    ResourceId(id): ResourceId,
    body: Bytes,
) -> AppResult<Json<CustomerResponse>> {
    update(state, id, &body, Mode::Partial).await
}

async fn update(
    state: AppState,
    id: i32,
    body: &[u8],
    mode: Mode,
) -> AppResult<Json<CustomerResponse>> {
    let data = parse_body(body, false)?;
    let customer = CustomerService::update(state.repo_manager.as_ref(), id, data, mode).await?;
    Ok(Json(customer))
}

pub async fn delete_customer(
    State(state): State<AppState>,
    _claims: Claims,
    ResourceId(id): ResourceId,
) -> AppResult<StatusCode> {
    CustomerService::delete(state.repo_manager.as_ref(), id).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn create_customer_with_addresses(
    State(state): State<AppState>,
    claims: Claims,
    body: Bytes,
) -> AppResult<(StatusCode, Json<CustomerResponse>)> {
    tracing::debug!(caller = %claims.sub, "Create customer with addresses");
    let data = parse_body(&body, true)?;
    let customer = CustomerService::create_with_addresses(state.repo_manager.as_ref(), data).await?;
    Ok((StatusCode::CREATED, Json(customer)))
}
