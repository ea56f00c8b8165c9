//! Handlers for tasks, always addressed through their owning project.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use syncup_core::board::TaskFilter;
use syncup_core::task::{NewTask, TaskPatch};

use crate::error::AppResult;
use crate::response::DataResponse;
use crate::state::AppState;

/// GET /api/projects/{id}/tasks?q=&priority=
///
/// Unknown projects list as empty.
pub async fn list_tasks(
    State(state): State<AppState>,
    Path(project_id): Path<String>,
    Query(filter): Query<TaskFilter>,
) -> impl IntoResponse {
    let ws = state.workspace.lock().await;
    let tasks: Vec<_> = filter
        .apply(ws.tasks().list_by_project(&project_id))
        .into_iter()
        .cloned()
        .collect();
    Json(DataResponse { data: tasks })
}

/// POST /api/projects/{id}/tasks
pub async fn create_task(
    State(state): State<AppState>,
    Path(project_id): Path<String>,
    Json(input): Json<NewTask>,
) -> AppResult<impl IntoResponse> {
    let task = state.workspace.lock().await.create_task(&project_id, input)?;
    Ok((StatusCode::CREATED, Json(DataResponse { data: task })))
}

/// PUT /api/projects/{id}/tasks/{task_id}
pub async fn update_task(
    State(state): State<AppState>,
    Path((project_id, task_id)): Path<(String, String)>,
    Json(patch): Json<TaskPatch>,
) -> AppResult<impl IntoResponse> {
    state
        .workspace
        .lock()
        .await
        .update_task(&project_id, &task_id, patch)?;
    Ok(StatusCode::NO_CONTENT)
}

/// DELETE /api/projects/{id}/tasks/{task_id}
pub async fn delete_task(
    State(state): State<AppState>,
    Path((project_id, task_id)): Path<(String, String)>,
) -> AppResult<impl IntoResponse> {
    state
        .workspace
        .lock()
        .await
        .remove_task(&project_id, &task_id)?;
    Ok(StatusCode::NO_CONTENT)
}

/// POST /api/projects/{id}/tasks/{task_id}/status/next
///
/// Returns the new status, or `null` for an unknown task.
pub async fn next_status(
    State(state): State<AppState>,
    Path((project_id, task_id)): Path<(String, String)>,
) -> AppResult<impl IntoResponse> {
    let status = state
        .workspace
        .lock()
        .await
        .cycle_status(&project_id, &task_id)?;
    Ok(Json(DataResponse { data: status }))
}

/// POST /api/projects/{id}/tasks/{task_id}/priority/next
pub async fn next_priority(
    State(state): State<AppState>,
    Path((project_id, task_id)): Path<(String, String)>,
) -> AppResult<impl IntoResponse> {
    let priority = state
        .workspace
        .lock()
        .await
        .cycle_priority(&project_id, &task_id)?;
    Ok(Json(DataResponse { data: priority }))
}
