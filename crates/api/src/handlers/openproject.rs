//! OpenProject proxy handlers.
//!
//! Each handler forwards to the upstream API and relays the HAL response
//! body unchanged. Upstream failures surface through
//! [`AppError::Upstream`] with the upstream status.

use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use serde::Deserialize;
use syncup_upstream::openproject::{NewOpProject, NewWorkPackage, DEFAULT_PAGE_SIZE};

use crate::error::{AppError, AppResult};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkPackageParams {
    pub project_id: Option<String>,
    pub page_size: Option<u32>,
}

fn require_project_id(project_id: Option<&str>) -> AppResult<&str> {
    project_id
        .map(str::trim)
        .filter(|id| !id.is_empty())
        .ok_or_else(|| AppError::BadRequest("projectId is required".into()))
}

/// GET /api/op/projects
pub async fn list_projects(State(state): State<AppState>) -> AppResult<impl IntoResponse> {
    let projects = state.openproject.list_projects().await?;
    Ok(Json(projects))
}

/// POST /api/op/projects
pub async fn create_project(
    State(state): State<AppState>,
    Json(input): Json<NewOpProject>,
) -> AppResult<impl IntoResponse> {
    let created = state.openproject.create_project(&input).await?;
    tracing::info!(name = %input.name, "OpenProject project created");
    Ok((StatusCode::CREATED, Json(created)))
}

/// GET /api/op/types
pub async fn list_types(State(state): State<AppState>) -> AppResult<impl IntoResponse> {
    let types = state.openproject.list_types().await?;
    Ok(Json(types))
}

/// GET /api/op/work-packages?projectId=&pageSize=
pub async fn list_work_packages(
    State(state): State<AppState>,
    Query(params): Query<WorkPackageParams>,
) -> AppResult<impl IntoResponse> {
    let project_id = require_project_id(params.project_id.as_deref())?;
    let page_size = params.page_size.unwrap_or(DEFAULT_PAGE_SIZE);

    let packages = state
        .openproject
        .list_work_packages(project_id, page_size)
        .await?;
    Ok(Json(packages))
}

/// POST /api/op/work-packages
pub async fn create_work_package(
    State(state): State<AppState>,
    Json(input): Json<NewWorkPackage>,
) -> AppResult<impl IntoResponse> {
    let project_id = require_project_id(input.project_id.as_deref())?.to_string();

    let created = state.openproject.create_work_package(&input).await?;
    tracing::info!(project_id = %project_id, subject = %input.subject, "Work package created");
    Ok((StatusCode::CREATED, Json(created)))
}
