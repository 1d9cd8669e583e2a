use std::time::Instant;

use axum::{
    extract::{Path, State},
    http::{header, StatusCode},
    Json,
};
use chrono::Utc;
use common::observability::record_operation;
use models::{Customer, CustomerId, CustomerPatch};
use tracing::{debug, info};

use crate::errors::ApiError;
use crate::routes::ServerState;

pub const BASE_PATH: &str = "/customer";

fn finish<T>(operation: &str, started: Instant, result: Result<T, ApiError>) -> Result<T, ApiError> {
    let outcome = match &result {
        Ok(_) => "ok",
        Err(e) => e.outcome(),
    };
    record_operation(operation, outcome, started);
    result
}

#[utoipa::path(
    get, path = "/customer", tag = "customer",
    responses((status = 200, description = "All customers", body = [crate::openapi::CustomerDoc]))
)]
pub async fn list(State(state): State<ServerState>) -> Result<Json<Vec<Customer>>, ApiError> {
    let started = Instant::now();
    let result = state.customers.get_all().await.map_err(ApiError::from);
    if let Ok(customers) = &result {
        debug!(count = customers.len(), "list customers");
    }
    finish("list", started, result.map(Json))
}

#[utoipa::path(
    get, path = "/customer/{id}", tag = "customer",
    params(("id" = i32, Path, description = "Customer id")),
    responses(
        (status = 200, description = "Customer", body = crate::openapi::CustomerDoc),
        (status = 404, description = "Customer not found", body = String, content_type = "text/plain")
    )
)]
pub async fn get_by_id(
    State(state): State<ServerState>,
    Path(id): Path<CustomerId>,
) -> Result<Json<Customer>, ApiError> {
    let started = Instant::now();
    let result = match state.customers.get_by_id(id).await {
        Ok(Some(customer)) => Ok(Json(customer)),
        Ok(None) => Err(ApiError::NotFound),
        Err(e) => Err(e.into()),
    };
    finish("get_by_id", started, result)
}

/// Id from the repository, both timestamps from one clock reading, then a single `create`.
async fn insert_new(state: &ServerState, mut customer: Customer) -> Result<Customer, ApiError> {
    customer.id = state.customers.get_next_id_value().await?;
    customer.stamp_created(Utc::now());

    if !state.customers.create(customer.clone()).await? {
        return Err(ApiError::CreationRejected);
    }
    info!(id = customer.id, "created customer");
    Ok(customer)
}

#[utoipa::path(
    post, path = "/customer", tag = "customer",
    request_body = crate::openapi::CustomerDoc,
    responses(
        (status = 201, description = "Created", body = crate::openapi::CustomerDoc,
            headers(("Location" = String, description = "URL of the new customer"))),
        (status = 400, description = "Rejected by the repository")
    )
)]
pub async fn create(
    State(state): State<ServerState>,
    Json(customer): Json<Customer>,
) -> Result<(StatusCode, [(header::HeaderName, String); 1], Json<Customer>), ApiError> {
    let started = Instant::now();
    let result = insert_new(&state, customer).await.map(|customer| {
        let location = format!("{BASE_PATH}/{}", customer.id);
        (StatusCode::CREATED, [(header::LOCATION, location)], Json(customer))
    });
    finish("create", started, result)
}

#[utoipa::path(
    put, path = "/customer/{id}", tag = "customer",
    params(("id" = i32, Path, description = "Customer id")),
    request_body = crate::openapi::CustomerPatchDoc,
    responses(
        (status = 200, description = "Updated", body = String, content_type = "text/plain"),
        (status = 404, description = "Customer not found", body = String, content_type = "text/plain")
    )
)]
pub async fn update(
    State(state): State<ServerState>,
    Path(id): Path<CustomerId>,
    Json(patch): Json<CustomerPatch>,
) -> Result<String, ApiError> {
    let started = Instant::now();
    if patch.is_empty() {
        debug!(id, "empty patch only refreshes updatedAt");
    }
    let result = match state.customers.update(id, patch).await {
        Ok(true) => {
            info!(id, "updated customer");
            Ok(format!("Customer {id} updated"))
        }
        Ok(false) => Err(ApiError::NotFound),
        Err(e) => Err(e.into()),
    };
    finish("update", started, result)
}

#[utoipa::path(
    delete, path = "/customer/{id}", tag = "customer",
    params(("id" = i32, Path, description = "Customer id")),
    responses(
        (status = 204, description = "Deleted"),
        (status = 404, description = "Customer not found", body = String, content_type = "text/plain")
    )
)]
pub async fn delete(
    State(state): State<ServerState>,
    Path(id): Path<CustomerId>,
) -> Result<StatusCode, ApiError> {
    let started = Instant::now();
    let result = match state.customers.delete(id).await {
        Ok(true) => {
            info!(id, "deleted customer");
            Ok(StatusCode::NO_CONTENT)
        }
        Ok(false) => Err(ApiError::NotFound),
        Err(e) => Err(e.into()),
    };
    finish("delete", started, result)
}
