//! HTTP client for the Baserow REST API.
//!
//! One method per resource action, no retries or caching. Every request
//! pulls a fresh authorization header from the [`AuthManager`], which is
//! where transparent login and token refresh happen.

use std::sync::Mutex;

use reqwest::header::AUTHORIZATION;
use reqwest::{Client, Method, RequestBuilder, Response};
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};
use tracing::debug;

use super::auth::AuthManager;
use super::error::BaserowError;
use super::types::{
    ApiErrorBody, Application, Field, PaginatedResponse, Row, RowBatch, RowListQuery, Table,
    Workspace,
};

/// Client for one Baserow instance.
///
/// Also carries the client-side "active workspace" default that tools fall
/// back to when no explicit workspace is given.
pub struct BaserowClient {
    http: Client,
    base_url: String,
    auth: AuthManager,
    active_workspace: Mutex<Option<i64>>,
}

impl BaserowClient {
    /// Create a client wrapping an already configured auth manager.
    ///
    /// `base_url` must not carry a trailing slash.
    pub fn new(http: Client, base_url: String, auth: AuthManager) -> Self {
        Self {
            http,
            base_url,
            auth,
            active_workspace: Mutex::new(None),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn auth(&self) -> &AuthManager {
        &self.auth
    }

    /// Set the default workspace used when operations omit an explicit one.
    pub fn set_active_workspace(&self, workspace_id: i64) {
        *self.active_workspace.lock().unwrap() = Some(workspace_id);
    }

    pub fn active_workspace(&self) -> Option<i64> {
        *self.active_workspace.lock().unwrap()
    }

    /// Start a request with a fresh authorization header.
    async fn request(&self, method: Method, url: &str) -> Result<RequestBuilder, BaserowError> {
        let header = self.auth.auth_header().await?;
        debug!(%method, %url, "baserow api request");
        Ok(self
            .http
            .request(method, url)
            .header(AUTHORIZATION, header))
    }

    // =========================================================================
    // Workspaces
    // =========================================================================

    /// List all workspaces visible to the authenticated user.
    pub async fn list_workspaces(&self) -> Result<Vec<Workspace>, BaserowError> {
        let url = format!("{}/api/workspaces/", self.base_url);
        let response = self.request(Method::GET, &url).await?.send().await?;
        read_json(response).await
    }

    pub async fn get_workspace(&self, workspace_id: i64) -> Result<Workspace, BaserowError> {
        let url = format!("{}/api/workspaces/{}/", self.base_url, workspace_id);
        let response = self.request(Method::GET, &url).await?.send().await?;
        read_json(response).await
    }

    pub async fn create_workspace(&self, name: &str) -> Result<Workspace, BaserowError> {
        let url = format!("{}/api/workspaces/", self.base_url);
        let response = self
            .request(Method::POST, &url)
            .await?
            .json(&serde_json::json!({ "name": name }))
            .send()
            .await?;
        read_json(response).await
    }

    // =========================================================================
    // Databases
    // =========================================================================

    /// List database applications, either inside one workspace or across all
    /// of them. Applications of other types are filtered out.
    pub async fn list_databases(
        &self,
        workspace_id: Option<i64>,
    ) -> Result<Vec<Application>, BaserowError> {
        let url = match workspace_id {
            Some(id) => format!("{}/api/applications/workspace/{}/", self.base_url, id),
            None => format!("{}/api/applications/", self.base_url),
        };
        let response = self.request(Method::GET, &url).await?.send().await?;
        let applications: Vec<Application> = read_json(response).await?;
        Ok(applications
            .into_iter()
            .filter(|app| app.app_type == "database")
            .collect())
    }

    pub async fn get_database(&self, database_id: i64) -> Result<Application, BaserowError> {
        let url = format!("{}/api/applications/{}/", self.base_url, database_id);
        let response = self.request(Method::GET, &url).await?.send().await?;
        read_json(response).await
    }

    pub async fn create_database(
        &self,
        workspace_id: i64,
        name: &str,
    ) -> Result<Application, BaserowError> {
        let url = format!("{}/api/applications/workspace/{}/", self.base_url, workspace_id);
        let response = self
            .request(Method::POST, &url)
            .await?
            .json(&serde_json::json!({ "name": name, "type": "database" }))
            .send()
            .await?;
        read_json(response).await
    }

    // =========================================================================
    // Tables and fields
    // =========================================================================

    pub async fn list_tables(&self, database_id: i64) -> Result<Vec<Table>, BaserowError> {
        let url = format!(
            "{}/api/database/tables/database/{}/",
            self.base_url, database_id
        );
        let response = self.request(Method::GET, &url).await?.send().await?;
        read_json(response).await
    }

    pub async fn get_table(&self, table_id: i64) -> Result<Table, BaserowError> {
        let url = format!("{}/api/database/tables/{}/", self.base_url, table_id);
        let response = self.request(Method::GET, &url).await?.send().await?;
        read_json(response).await
    }

    pub async fn create_table(
        &self,
        database_id: i64,
        name: &str,
    ) -> Result<Table, BaserowError> {
        let url = format!(
            "{}/api/database/tables/database/{}/",
            self.base_url, database_id
        );
        let response = self
            .request(Method::POST, &url)
            .await?
            .json(&serde_json::json!({ "name": name }))
            .send()
            .await?;
        read_json(response).await
    }

    /// List the field (column) definitions of a table.
    pub async fn list_fields(&self, table_id: i64) -> Result<Vec<Field>, BaserowError> {
        let url = format!("{}/api/database/fields/table/{}/", self.base_url, table_id);
        let response = self.request(Method::GET, &url).await?.send().await?;
        read_json(response).await
    }

    // =========================================================================
    // Rows
    // =========================================================================

    /// List rows of a table, one page at a time. Pagination parameters are
    /// forwarded as-is and the raw envelope is returned.
    pub async fn list_rows(
        &self,
        table_id: i64,
        query: &RowListQuery,
    ) -> Result<PaginatedResponse<Row>, BaserowError> {
        let url = format!("{}/api/database/rows/table/{}/", self.base_url, table_id);
        let response = self
            .request(Method::GET, &url)
            .await?
            .query(query)
            .send()
            .await?;
        read_json(response).await
    }

    pub async fn get_row(&self, table_id: i64, row_id: i64) -> Result<Row, BaserowError> {
        let url = format!(
            "{}/api/database/rows/table/{}/{}/",
            self.base_url, table_id, row_id
        );
        let response = self.request(Method::GET, &url).await?.send().await?;
        read_json(response).await
    }

    pub async fn create_row(
        &self,
        table_id: i64,
        fields: &Map<String, Value>,
    ) -> Result<Row, BaserowError> {
        let url = format!("{}/api/database/rows/table/{}/", self.base_url, table_id);
        let response = self
            .request(Method::POST, &url)
            .await?
            .json(fields)
            .send()
            .await?;
        read_json(response).await
    }

    pub async fn update_row(
        &self,
        table_id: i64,
        row_id: i64,
        fields: &Map<String, Value>,
    ) -> Result<Row, BaserowError> {
        let url = format!(
            "{}/api/database/rows/table/{}/{}/",
            self.base_url, table_id, row_id
        );
        let response = self
            .request(Method::PATCH, &url)
            .await?
            .json(fields)
            .send()
            .await?;
        read_json(response).await
    }

    pub async fn delete_row(&self, table_id: i64, row_id: i64) -> Result<(), BaserowError> {
        let url = format!(
            "{}/api/database/rows/table/{}/{}/",
            self.base_url, table_id, row_id
        );
        let response = self.request(Method::DELETE, &url).await?.send().await?;
        expect_success(response).await
    }

    // =========================================================================
    // Batch row operations
    // =========================================================================

    pub async fn batch_create_rows(
        &self,
        table_id: i64,
        rows: Vec<Value>,
    ) -> Result<Vec<Row>, BaserowError> {
        let url = format!(
            "{}/api/database/rows/table/{}/batch/",
            self.base_url, table_id
        );
        let response = self
            .request(Method::POST, &url)
            .await?
            .json(&RowBatch { items: rows })
            .send()
            .await?;
        let created: RowBatch<Row> = read_json(response).await?;
        Ok(created.items)
    }

    pub async fn batch_update_rows(
        &self,
        table_id: i64,
        rows: Vec<Value>,
    ) -> Result<Vec<Row>, BaserowError> {
        let url = format!(
            "{}/api/database/rows/table/{}/batch/",
            self.base_url, table_id
        );
        let response = self
            .request(Method::PATCH, &url)
            .await?
            .json(&RowBatch { items: rows })
            .send()
            .await?;
        let updated: RowBatch<Row> = read_json(response).await?;
        Ok(updated.items)
    }

    pub async fn batch_delete_rows(
        &self,
        table_id: i64,
        row_ids: Vec<i64>,
    ) -> Result<(), BaserowError> {
        let url = format!(
            "{}/api/database/rows/table/{}/batch-delete/",
            self.base_url, table_id
        );
        let response = self
            .request(Method::POST, &url)
            .await?
            .json(&RowBatch { items: row_ids })
            .send()
            .await?;
        expect_success(response).await
    }
}

/// Parse a successful response as JSON, or normalize the failure.
async fn read_json<T: DeserializeOwned>(response: Response) -> Result<T, BaserowError> {
    if !response.status().is_success() {
        return Err(response_error(response).await);
    }
    Ok(response.json().await?)
}

/// Check the status of endpoints that return no useful body.
async fn expect_success(response: Response) -> Result<(), BaserowError> {
    if !response.status().is_success() {
        return Err(response_error(response).await);
    }
    Ok(())
}

/// Convert a failed response into the shared error type: structured
/// `{error, detail}` bodies become `RemoteApi`, anything else `Transport`.
pub(crate) async fn response_error(response: Response) -> BaserowError {
    let status = response.status();
    let reason = status
        .canonical_reason()
        .unwrap_or("unknown status")
        .to_string();

    match response.json::<ApiErrorBody>().await {
        Ok(body) => {
            let code = body
                .error
                .clone()
                .unwrap_or_else(|| format!("HTTP_{}", status.as_u16()));
            let message = body.detail_text().or(body.error).unwrap_or(reason);
            BaserowError::RemoteApi { code, message }
        }
        Err(_) => BaserowError::Transport(format!("HTTP {} {}", status.as_u16(), reason)),
    }
}
