//! REST client for the OpenProject API v3.
//!
//! Authenticates with HTTP basic auth as `apikey:<token>`. Responses are
//! returned as raw HAL JSON; callers relay them or pick
//! `_embedded.elements` with [`embedded_elements`].

use serde::{Deserialize, Deserializer};
use serde_json::{json, Map, Value};

use crate::error::UpstreamError;
use crate::http::{endpoint, parse_response, trim_base};

/// Default page size for work package listings.
pub const DEFAULT_PAGE_SIZE: u32 = 50;

/// HTTP client for one OpenProject instance.
#[derive(Clone)]
pub struct OpenProjectApi {
    client: reqwest::Client,
    api_url: String,
    token: String,
}

/// Accept an id sent as a JSON string or number. Blank strings count as absent.
fn opt_id<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<String>, D::Error> {
    Ok(match Option::<Value>::deserialize(deserializer)? {
        Some(Value::String(s)) if !s.trim().is_empty() => Some(s.trim().to_string()),
        Some(Value::Number(n)) => Some(n.to_string()),
        _ => None,
    })
}

fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|s| !s.is_empty())
}

/// Project creation request as accepted by the gateway.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewOpProject {
    #[serde(default)]
    pub name: String,
    pub identifier: Option<String>,
    pub description: Option<String>,
    pub is_public: Option<bool>,
}

impl NewOpProject {
    /// OpenProject body: `description` is wrapped as `{raw}`, `isPublic`
    /// becomes `public`, and empty optional fields are left out.
    pub fn payload(&self) -> Value {
        let mut body = Map::new();
        body.insert("name".into(), json!(self.name));
        if let Some(identifier) = non_empty(&self.identifier) {
            body.insert("identifier".into(), json!(identifier));
        }
        if let Some(description) = non_empty(&self.description) {
            body.insert("description".into(), json!({ "raw": description }));
        }
        if let Some(public) = self.is_public {
            body.insert("public".into(), json!(public));
        }
        Value::Object(body)
    }
}

/// Work package creation request as accepted by the gateway.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewWorkPackage {
    #[serde(default, deserialize_with = "opt_id")]
    pub project_id: Option<String>,
    #[serde(default)]
    pub subject: String,
    pub description: Option<String>,
    /// `YYYY-MM-DD`
    pub start_date: Option<String>,
    /// `YYYY-MM-DD`
    pub due_date: Option<String>,
    #[serde(default, deserialize_with = "opt_id")]
    pub type_id: Option<String>,
    #[serde(default, deserialize_with = "opt_id")]
    pub assignee_id: Option<String>,
    #[serde(default, deserialize_with = "opt_id")]
    pub priority_id: Option<String>,
}

impl NewWorkPackage {
    /// OpenProject body with hypermedia `_links`. The project link is always
    /// present; type, assignee and priority links only when their id is.
    pub fn payload(&self) -> Value {
        let mut links = Map::new();
        links.insert(
            "project".into(),
            json!({ "href": format!("/api/v3/projects/{}", self.project_id.as_deref().unwrap_or_default()) }),
        );
        let optional = [
            ("type", "types", &self.type_id),
            ("assignee", "users", &self.assignee_id),
            ("priority", "priorities", &self.priority_id),
        ];
        for (rel, collection, id) in optional {
            if let Some(id) = id {
                links.insert(
                    rel.into(),
                    json!({ "href": format!("/api/v3/{collection}/{id}") }),
                );
            }
        }

        let mut body = Map::new();
        body.insert("subject".into(), json!(self.subject));
        if let Some(description) = non_empty(&self.description) {
            body.insert("description".into(), json!({ "raw": description }));
        }
        if let Some(start) = non_empty(&self.start_date) {
            body.insert("startDate".into(), json!(start));
        }
        if let Some(due) = non_empty(&self.due_date) {
            body.insert("dueDate".into(), json!(due));
        }
        body.insert("_links".into(), Value::Object(links));
        Value::Object(body)
    }
}

/// Elements of a HAL collection (`_embedded.elements`), empty if absent.
pub fn embedded_elements(collection: &Value) -> Vec<Value> {
    collection
        .pointer("/_embedded/elements")
        .and_then(Value::as_array)
        .cloned()
        .unwrap_or_default()
}

impl OpenProjectApi {
    /// * `base_url` - Instance root, e.g. `https://op.example.com`. The
    ///   `/api/v3` prefix is appended here.
    pub fn new(client: reqwest::Client, base_url: &str, token: String) -> Self {
        Self {
            client,
            api_url: format!("{}/api/v3", trim_base(base_url)),
            token,
        }
    }

    pub fn api_url(&self) -> &str {
        &self.api_url
    }

    /// `GET /projects`
    pub async fn list_projects(&self) -> Result<Value, UpstreamError> {
        self.get(&["projects"], &[]).await
    }

    /// `POST /projects`
    pub async fn create_project(&self, input: &NewOpProject) -> Result<Value, UpstreamError> {
        tracing::debug!(name = %input.name, "Creating OpenProject project");
        self.post(&["projects"], &input.payload()).await
    }

    /// `GET /types`
    pub async fn list_types(&self) -> Result<Value, UpstreamError> {
        self.get(&["types"], &[]).await
    }

    /// `GET /projects/{project_id}/work_packages?pageSize=`
    pub async fn list_work_packages(
        &self,
        project_id: &str,
        page_size: u32,
    ) -> Result<Value, UpstreamError> {
        self.get(
            &["projects", project_id, "work_packages"],
            &[("pageSize", page_size.to_string())],
        )
        .await
    }

    /// `POST /work_packages`
    pub async fn create_work_package(&self, input: &NewWorkPackage) -> Result<Value, UpstreamError> {
        tracing::debug!(
            project_id = input.project_id.as_deref().unwrap_or_default(),
            "Creating OpenProject work package"
        );
        self.post(&["work_packages"], &input.payload()).await
    }

    // ---- private helpers ----

    async fn get(&self, segments: &[&str], query: &[(&str, String)]) -> Result<Value, UpstreamError> {
        let response = self
            .client
            .get(endpoint(&self.api_url, segments)?)
            .basic_auth("apikey", Some(&self.token))
            .header(reqwest::header::ACCEPT, "application/json")
            .query(query)
            .send()
            .await?;

        parse_response(response).await
    }

    async fn post(&self, segments: &[&str], body: &Value) -> Result<Value, UpstreamError> {
        let response = self
            .client
            .post(endpoint(&self.api_url, segments)?)
            .basic_auth("apikey", Some(&self.token))
            .header(reqwest::header::ACCEPT, "application/json")
            .json(body)
            .send()
            .await?;

        parse_response(response).await
    }
}
