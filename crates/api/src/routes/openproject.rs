use axum::routing::get;
use axum::Router;

use crate::handlers::openproject;
use crate::state::AppState;

/// OpenProject proxy routes mounted at `/op`.
///
/// ```text
/// GET    /projects         -> list_projects
/// POST   /projects         -> create_project
/// GET    /types            -> list_types
/// GET    /work-packages    -> list_work_packages (?projectId=&pageSize=)
/// POST   /work-packages    -> create_work_package
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route(
            "/projects",
            get(openproject::list_projects).post(openproject::create_project),
        )
        .route("/types", get(openproject::list_types))
        .route(
            "/work-packages",
            get(openproject::list_work_packages).post(openproject::create_work_package),
        )
}
