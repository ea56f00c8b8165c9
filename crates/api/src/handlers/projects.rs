//! Handlers for the local project list.
//!
//! Mutations addressing an unknown project are accepted and change nothing
//! (204); reads of an unknown project are 404.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use chrono::Utc;
use serde::{Deserialize, Serialize};
use syncup_core::board::{BoardSummary, MemberStats};
use syncup_core::project::{NewProject, Project, ProjectPatch};

use crate::error::AppResult;
use crate::response::DataResponse;
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Project CRUD
// ---------------------------------------------------------------------------

/// GET /api/projects
pub async fn list_projects(State(state): State<AppState>) -> impl IntoResponse {
    let ws = state.workspace.lock().await;
    Json(DataResponse {
        data: ws.projects().list().to_vec(),
    })
}

/// POST /api/projects
pub async fn create_project(
    State(state): State<AppState>,
    Json(input): Json<NewProject>,
) -> AppResult<impl IntoResponse> {
    let project = state.workspace.lock().await.projects_mut().create(input)?;
    Ok((StatusCode::CREATED, Json(DataResponse { data: project })))
}

/// GET /api/projects/{id}
pub async fn get_project(
    State(state): State<AppState>,
    Path(project_id): Path<String>,
) -> AppResult<impl IntoResponse> {
    let ws = state.workspace.lock().await;
    let project = ws.project(&project_id)?.clone();
    Ok(Json(DataResponse { data: project }))
}

/// PUT /api/projects/{id}
///
/// The id in the path wins over any id in the body.
pub async fn update_project(
    State(state): State<AppState>,
    Path(project_id): Path<String>,
    Json(mut patch): Json<ProjectPatch>,
) -> AppResult<impl IntoResponse> {
    patch.id = project_id;
    state.workspace.lock().await.projects_mut().update(&patch)?;
    Ok(StatusCode::NO_CONTENT)
}

/// DELETE /api/projects/{id}
pub async fn delete_project(
    State(state): State<AppState>,
    Path(project_id): Path<String>,
) -> AppResult<impl IntoResponse> {
    state.workspace.lock().await.remove_project(&project_id)?;
    Ok(StatusCode::NO_CONTENT)
}

/// POST /api/projects/{id}/pin
pub async fn toggle_pin(
    State(state): State<AppState>,
    Path(project_id): Path<String>,
) -> AppResult<impl IntoResponse> {
    state.workspace.lock().await.projects_mut().pin(&project_id)?;
    Ok(StatusCode::NO_CONTENT)
}

// ---------------------------------------------------------------------------
// Dashboard
// ---------------------------------------------------------------------------

#[derive(Debug, Serialize)]
pub struct Dashboard {
    pub pinned: Vec<Project>,
    pub others: Vec<Project>,
}

/// GET /api/projects/dashboard
pub async fn dashboard(State(state): State<AppState>) -> impl IntoResponse {
    let ws = state.workspace.lock().await;
    let projects = ws.projects();
    Json(DataResponse {
        data: Dashboard {
            pinned: projects.pinned().cloned().collect(),
            others: projects.others().cloned().collect(),
        },
    })
}

// ---------------------------------------------------------------------------
// Current project
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
pub struct SelectProject {
    pub id: String,
}

/// GET /api/projects/current
///
/// `data` is `null` when nothing is selected or the selection was deleted.
pub async fn get_current(State(state): State<AppState>) -> impl IntoResponse {
    let ws = state.workspace.lock().await;
    Json(DataResponse {
        data: ws.projects().current().cloned(),
    })
}

/// PUT /api/projects/current
pub async fn select_current(
    State(state): State<AppState>,
    Json(input): Json<SelectProject>,
) -> AppResult<impl IntoResponse> {
    state.workspace.lock().await.projects_mut().select(&input.id)?;
    Ok(StatusCode::NO_CONTENT)
}

// ---------------------------------------------------------------------------
// Board view
// ---------------------------------------------------------------------------

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BoardView {
    pub summary: BoardSummary,
    pub members: Vec<MemberStats>,
    /// Elapsed share of the project's scheduled time span, `0..=100`.
    pub schedule_progress: u8,
}

/// GET /api/projects/{id}/board
pub async fn board(
    State(state): State<AppState>,
    Path(project_id): Path<String>,
) -> AppResult<impl IntoResponse> {
    let now = Utc::now();
    let ws = state.workspace.lock().await;
    let project = ws.project(&project_id)?;

    let view = BoardView {
        summary: ws.board(&project_id),
        members: ws.workload(&project_id, now.naive_utc()),
        schedule_progress: project.schedule_progress(now.date_naive()),
    };
    Ok(Json(DataResponse { data: view }))
}
