use axum::routing::{get, post, put};
use axum::Router;

use crate::handlers::{projects, tasks};
use crate::state::AppState;

/// Local workspace routes mounted at `/projects`.
///
/// ```text
/// GET    /                                   -> list_projects
/// POST   /                                   -> create_project
/// GET    /dashboard                          -> dashboard (pinned / others)
/// GET    /current                            -> get_current
/// PUT    /current                            -> select_current
/// GET    /{id}                               -> get_project
/// PUT    /{id}                               -> update_project
/// DELETE /{id}                               -> delete_project
/// POST   /{id}/pin                           -> toggle_pin
/// GET    /{id}/board                         -> board
/// GET    /{id}/tasks                         -> list_tasks (?q=&priority=)
/// POST   /{id}/tasks                         -> create_task
/// PUT    /{id}/tasks/{task_id}               -> update_task
/// DELETE /{id}/tasks/{task_id}               -> delete_task
/// POST   /{id}/tasks/{task_id}/status/next   -> next_status
/// POST   /{id}/tasks/{task_id}/priority/next -> next_priority
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route(
            "/",
            get(projects::list_projects).post(projects::create_project),
        )
        .route("/dashboard", get(projects::dashboard))
        .route(
            "/current",
            get(projects::get_current).put(projects::select_current),
        )
        .route(
            "/{id}",
            get(projects::get_project)
                .put(projects::update_project)
                .delete(projects::delete_project),
        )
        .route("/{id}/pin", post(projects::toggle_pin))
        .route("/{id}/board", get(projects::board))
        .route(
            "/{id}/tasks",
            get(tasks::list_tasks).post(tasks::create_task),
        )
        .route(
            "/{id}/tasks/{task_id}",
            put(tasks::update_task).delete(tasks::delete_task),
        )
        .route("/{id}/tasks/{task_id}/status/next", post(tasks::next_status))
        .route(
            "/{id}/tasks/{task_id}/priority/next",
            post(tasks::next_priority),
        )
}
