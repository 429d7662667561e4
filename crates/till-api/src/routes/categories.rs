//! Routes for categories.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::routing::{get, put};
use axum::{Json, Router};
use serde::Deserialize;
use tracing::{info, instrument};
use uuid::Uuid;

use till_catalog::application::command_handlers;
use till_catalog::domain::category::Category;
use till_catalog::domain::commands;

use super::{CreatedResponse, ListResponse};
use crate::error::ApiError;
use crate::state::AppState;

/// Request body for POST / and PUT /{id}.
#[derive(Debug, Deserialize)]
pub struct CategoryRequest {
    /// Category name.
    pub name: String,
}

/// GET /
async fn list_categories(State(state): State<AppState>) -> Json<ListResponse<Category>> {
    Json(ListResponse {
        items: state.catalog.categories.items(),
        synced: state.catalog.categories.is_synced(),
    })
}

/// POST /
#[instrument(skip(state, request))]
async fn add_category(
    State(state): State<AppState>,
    Json(request): Json<CategoryRequest>,
) -> Result<(StatusCode, Json<CreatedResponse>), ApiError> {
    let command = commands::AddCategory {
        correlation_id: Uuid::new_v4(),
        name: request.name,
    };

    info!(correlation_id = %command.correlation_id, "handling add_category command");

    let id = command_handlers::handle_add_category(&command, &*state.document_store).await?;

    Ok((StatusCode::CREATED, Json(CreatedResponse { id })))
}

/// PUT /{id}
#[instrument(skip(state, request))]
async fn update_category(
    State(state): State<AppState>,
    Path(category_id): Path<String>,
    Json(request): Json<CategoryRequest>,
) -> Result<StatusCode, ApiError> {
    let command = commands::UpdateCategory {
        correlation_id: Uuid::new_v4(),
        category_id,
        name: request.name,
    };

    info!(correlation_id = %command.correlation_id, "handling update_category command");

    command_handlers::handle_update_category(&command, &*state.document_store).await?;

    Ok(StatusCode::NO_CONTENT)
}

/// DELETE /{id}
#[instrument(skip(state))]
async fn delete_category(
    State(state): State<AppState>,
    Path(category_id): Path<String>,
) -> Result<StatusCode, ApiError> {
    let command = commands::DeleteCategory {
        correlation_id: Uuid::new_v4(),
        category_id,
    };

    info!(correlation_id = %command.correlation_id, "handling delete_category command");

    command_handlers::handle_delete_category(&command, &*state.document_store).await?;

    Ok(StatusCode::NO_CONTENT)
}

/// Returns the router for categories.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_categories).post(add_category))
        .route("/{id}", put(update_category).delete(delete_category))
}
