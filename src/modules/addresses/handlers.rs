use axum::{body::Bytes, extract::State, http::StatusCode, Json};

use super::dtos::AddressResponse;
use super::service::AddressService;
use crate::modules::auth::service::Claims;
use crate::shared::{
    error::AppResult,
    extractors::ResourceId,
    state::AppState,
    validation::{parse_body, Mode},
};

pub async fn list_addresses(
    State(state): State<AppState>,
) -> AppResult<Json<Vec<AddressResponse>>> {
    let addresses = AddressService::list(state.repo_manager.as_ref()).await?;
    Ok(Json(addresses))
}

pub async fn get_address(
    State(state): State<AppState>,
    ResourceId(id): ResourceId,
) -> AppResult<Json<AddressResponse>> {
    let address = AddressService::get(state.repo_manager.as_ref(), id).await?;
    Ok(Json(address))
}

pub async fn create_address(
    State(state): State<AppState>,
    _claims: Claims,
    body: Bytes,
) -> AppResult<(StatusCode, Json<AddressResponse>)> {
    let data = parse_body(&body, true)?;
    let address = AddressService::create(state.repo_manager.as_ref(), data).await?;
    Ok((StatusCode::CREATED, Json(address)))
}

pub async fn replace_address(
    State(state): State<AppState>,
    _claims: Claims,
    ResourceId(id): ResourceId,
    body: Bytes,
) -> AppResult<Json<AddressResponse>> {
    let data = parse_body(&body, false)?;
    let address = AddressService::update(state.repo_manager.as_ref(), id, data, Mode::Full).await?;
    Ok(Json(address))
}

pub async fn patch_address(
    State(state): State<AppState>,
    _claims: Claims,
    ResourceId(id): ResourceId,
    body: Bytes,
) -> AppResult<Json<AddressResponse>> {
    let data = parse_body(&body, false)?;
    let address =
        AddressService::update(state.repo_manager.as_ref(), id, data, Mode::Partial).await?;
    Ok(Json(address))
}

pub async fn delete_address(
    State(state): State<AppState>,
    _claims: Claims,
    ResourceId(id): ResourceId,
) -> AppResult<StatusCode> {
    AddressService::delete(state.repo_manager.as_ref(), id).await?;
    Ok(StatusCode::NO_CONTENT)
}
