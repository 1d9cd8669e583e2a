use chrono::{DateTime, Utc};
use serde::Serialize;
use utoipa::OpenApi;
use utoipa::ToSchema;

#[derive(ToSchema)]
pub struct HealthResponse { pub status: String }

#[derive(Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct TransactionDoc {
    pub id: i32,
    pub description: String,
    /// Minor currency units (cents)
    pub amount: i64,
    pub created_at: DateTime<Utc>,
}

/// Field names are matched case-insensitively on input.
#[derive(Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CustomerDoc {
    /// Assigned by the server; ignored on create
    pub id: i32,
    pub name: String,
    pub cpf: String,
    /// Set by the server on create
    pub created_at: DateTime<Utc>,
    /// Set by the server on create and on every update
    pub updated_at: DateTime<Utc>,
    pub transactions: Vec<TransactionDoc>,
}

/// Only the fields present are merged.
#[derive(ToSchema)]
pub struct CustomerPatchDoc {
    pub name: Option<String>,
    pub cpf: Option<String>,
    pub transactions: Option<Vec<TransactionDoc>>,
}

#[derive(OpenApi)]
#[openapi(
    paths(
        crate::routes::health,
        crate::routes::customers::list,
        crate::routes::customers::get_by_id,
        crate::routes::customers::create,
        crate::routes::customers::update,
        crate::routes::customers::delete,
    ),
    components(
        schemas(
            HealthResponse,
            TransactionDoc,
            CustomerDoc,
            CustomerPatchDoc,
        )
    ),
    tags(
        (name = "health"),
        (name = "customer")
    )
)]
pub struct ApiDoc;
