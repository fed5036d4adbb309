//! Mock Baserow instance for end-to-end tests
//!
//! Serves a fixed set of workspaces, databases, tables, and rows over the
//! same REST surface the real Baserow exposes, and records what the server
//! under test sends (authorization headers, login attempts, row queries) so
//! tests can assert on the wire behavior.

use axum::extract::{Path, RawQuery, State};
use axum::http::header::AUTHORIZATION;
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde_json::{json, Value};
use std::sync::{Arc, Mutex};
use tokio::net::TcpListener;

use super::constants::*;

/// What the mock has observed so far, shared with the test body.
pub struct MockState {
    /// Whether `token-auth` accepts the test credentials
    pub login_ok: bool,
    /// Number of `token-auth` requests received
    pub login_calls: usize,
    /// `Authorization` header of the most recent resource request
    pub last_auth_header: Option<String>,
    /// Raw query string of the most recent row listing, empty when absent
    pub last_rows_query: Option<String>,
}

impl Default for MockState {
    fn default() -> Self {
        Self {
            login_ok: true,
            login_calls: 0,
            last_auth_header: None,
            last_rows_query: None,
        }
    }
}

type SharedState = Arc<Mutex<MockState>>;

/// Mock Baserow server bound to a random local port
///
/// When dropped, the server gracefully shuts down.
pub struct MockBaserow {
    /// Base URL for the server under test (e.g., "http://127.0.0.1:12345")
    pub base_url: String,

    /// Observed state, also reachable through the accessor methods
    pub state: SharedState,

    _shutdown_tx: Option<tokio::sync::oneshot::Sender<()>>,
}

impl MockBaserow {
    /// Spawns a mock Baserow on a random port
    ///
    /// # Panics
    ///
    /// Panics if port binding fails.
    pub async fn spawn() -> Self {
        let state: SharedState = Arc::new(Mutex::new(MockState::default()));

        let app = Router::new()
            .route("/api/user/token-auth/", post(token_auth))
            .route("/api/user/token-refresh/", post(token_refresh))
            .route("/api/workspaces/", get(list_workspaces).post(create_workspace))
            .route("/api/workspaces/{workspace_id}/", get(get_workspace))
            .route("/api/applications/", get(list_all_applications))
            .route(
                "/api/applications/workspace/{workspace_id}/",
                get(list_workspace_applications).post(create_application),
            )
            .route("/api/applications/{application_id}/", get(get_application))
            .route(
                "/api/database/tables/database/{database_id}/",
                get(list_tables).post(create_table),
            )
            .route("/api/database/tables/{table_id}/", get(get_table))
            .route("/api/database/fields/table/{table_id}/", get(list_fields))
            .route(
                "/api/database/rows/table/{table_id}/",
                get(list_rows).post(create_row),
            )
            .route(
                "/api/database/rows/table/{table_id}/batch/",
                post(batch_create_rows).patch(batch_update_rows),
            )
            .route(
                "/api/database/rows/table/{table_id}/batch-delete/",
                post(batch_delete_rows),
            )
            .route(
                "/api/database/rows/table/{table_id}/{row_id}/",
                get(get_row).patch(update_row).delete(delete_row),
            )
            .with_state(state.clone());

        let listener = TcpListener::bind("127.0.0.1:0")
            .await
            .expect("Failed to bind to random port");
        let base_url = format!(
            "http://{}",
            listener.local_addr().expect("Failed to get local address")
        );

        let (shutdown_tx, shutdown_rx) = tokio::sync::oneshot::channel::<()>();
        tokio::spawn(async move {
            axum::serve(listener, app)
                .with_graceful_shutdown(async {
                    shutdown_rx.await.ok();
                })
                .await
                .expect("Mock Baserow failed");
        });

        Self {
            base_url,
            state,
            _shutdown_tx: Some(shutdown_tx),
        }
    }

    /// Make `token-auth` reject the test credentials from now on
    pub fn set_login_ok(&self, ok: bool) {
        self.state.lock().unwrap().login_ok = ok;
    }

    pub fn login_calls(&self) -> usize {
        self.state.lock().unwrap().login_calls
    }

    pub fn last_auth_header(&self) -> Option<String> {
        self.state.lock().unwrap().last_auth_header.clone()
    }

    pub fn last_rows_query(&self) -> Option<String> {
        self.state.lock().unwrap().last_rows_query.clone()
    }
}

impl Drop for MockBaserow {
    fn drop(&mut self) {
        if let Some(tx) = self._shutdown_tx.take() {
            let _ = tx.send(());
        }
    }
}

// ============================================================================
// Identity endpoints
// ============================================================================

async fn token_auth(
    State(state): State<SharedState>,
    Json(body): Json<Value>,
) -> (StatusCode, Json<Value>) {
    let login_ok = {
        let mut state = state.lock().unwrap();
        state.login_calls += 1;
        state.login_ok
    };

    if login_ok && body["username"] == TEST_USERNAME && body["password"] == TEST_PASSWORD {
        (
            StatusCode::OK,
            Json(json!({
                "token": SESSION_JWT,
                "refresh_token": VALID_REFRESH_TOKEN,
            })),
        )
    } else {
        (
            StatusCode::BAD_REQUEST,
            Json(json!({
                "error": "ERROR_INVALID_CREDENTIALS",
                "detail": "Invalid username or password."
            })),
        )
    }
}

async fn token_refresh(Json(body): Json<Value>) -> (StatusCode, Json<Value>) {
    if body["refresh_token"] == VALID_REFRESH_TOKEN {
        (StatusCode::OK, Json(json!({ "token": SESSION_JWT })))
    } else {
        (
            StatusCode::UNAUTHORIZED,
            Json(json!({
                "error": "ERROR_INVALID_REFRESH_TOKEN",
                "detail": "Refresh token is expired."
            })),
        )
    }
}

// ============================================================================
// Workspace endpoints
// ============================================================================

async fn list_workspaces(
    State(state): State<SharedState>,
    headers: HeaderMap,
) -> (StatusCode, Json<Value>) {
    record_auth(&state, &headers);
    (
        StatusCode::OK,
        Json(json!([
            workspace_json(WORKSPACE_1_ID, WORKSPACE_1_NAME),
            workspace_json(WORKSPACE_2_ID, WORKSPACE_2_NAME),
        ])),
    )
}

async fn get_workspace(
    State(state): State<SharedState>,
    headers: HeaderMap,
    Path(workspace_id): Path<i64>,
) -> (StatusCode, Json<Value>) {
    record_auth(&state, &headers);
    match workspace_id {
        WORKSPACE_1_ID => (
            StatusCode::OK,
            Json(workspace_json(WORKSPACE_1_ID, WORKSPACE_1_NAME)),
        ),
        WORKSPACE_2_ID => (
            StatusCode::OK,
            Json(workspace_json(WORKSPACE_2_ID, WORKSPACE_2_NAME)),
        ),
        _ => workspace_not_found(),
    }
}

async fn create_workspace(
    State(state): State<SharedState>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> (StatusCode, Json<Value>) {
    record_auth(&state, &headers);
    let name = body["name"].as_str().unwrap_or("");
    (
        StatusCode::OK,
        Json(workspace_json(CREATED_WORKSPACE_ID, name)),
    )
}

// ============================================================================
// Application endpoints
// ============================================================================

async fn list_all_applications(
    State(state): State<SharedState>,
    headers: HeaderMap,
) -> (StatusCode, Json<Value>) {
    record_auth(&state, &headers);
    (
        StatusCode::OK,
        Json(json!([
            database_1_json(),
            non_database_app_json(),
            database_2_json(),
        ])),
    )
}

async fn list_workspace_applications(
    State(state): State<SharedState>,
    headers: HeaderMap,
    Path(workspace_id): Path<i64>,
) -> (StatusCode, Json<Value>) {
    record_auth(&state, &headers);
    match workspace_id {
        WORKSPACE_1_ID => (
            StatusCode::OK,
            Json(json!([database_1_json(), non_database_app_json()])),
        ),
        WORKSPACE_2_ID => (StatusCode::OK, Json(json!([database_2_json()]))),
        _ => workspace_not_found(),
    }
}

async fn create_application(
    State(state): State<SharedState>,
    headers: HeaderMap,
    Path(workspace_id): Path<i64>,
    Json(body): Json<Value>,
) -> (StatusCode, Json<Value>) {
    record_auth(&state, &headers);
    if workspace_id != WORKSPACE_1_ID && workspace_id != WORKSPACE_2_ID {
        return workspace_not_found();
    }
    let name = body["name"].as_str().unwrap_or("");
    let app_type = body["type"].as_str().unwrap_or("database");
    (
        StatusCode::OK,
        Json(application_json(
            CREATED_DATABASE_ID,
            name,
            app_type,
            workspace_id,
        )),
    )
}

async fn get_application(
    State(state): State<SharedState>,
    headers: HeaderMap,
    Path(application_id): Path<i64>,
) -> (StatusCode, Json<Value>) {
    record_auth(&state, &headers);
    match application_id {
        DATABASE_1_ID => (StatusCode::OK, Json(database_1_json())),
        DATABASE_2_ID => (StatusCode::OK, Json(database_2_json())),
        NON_DATABASE_APP_ID => (StatusCode::OK, Json(non_database_app_json())),
        _ => not_found(
            "ERROR_APPLICATION_DOES_NOT_EXIST",
            "The requested application does not exist.",
        ),
    }
}

// ============================================================================
// Table and field endpoints
// ============================================================================

async fn list_tables(
    State(state): State<SharedState>,
    headers: HeaderMap,
    Path(database_id): Path<i64>,
) -> (StatusCode, Json<Value>) {
    record_auth(&state, &headers);
    match database_id {
        DATABASE_1_ID => (
            StatusCode::OK,
            Json(json!([
                table_json(TABLE_1_ID, TABLE_1_NAME, DATABASE_1_ID),
                table_json(TABLE_2_ID, TABLE_2_NAME, DATABASE_1_ID),
            ])),
        ),
        DATABASE_2_ID => (StatusCode::OK, Json(json!([]))),
        _ => not_found(
            "ERROR_APPLICATION_DOES_NOT_EXIST",
            "The requested application does not exist.",
        ),
    }
}

async fn create_table(
    State(state): State<SharedState>,
    headers: HeaderMap,
    Path(database_id): Path<i64>,
    Json(body): Json<Value>,
) -> (StatusCode, Json<Value>) {
    record_auth(&state, &headers);
    if database_id != DATABASE_1_ID && database_id != DATABASE_2_ID {
        return not_found(
            "ERROR_APPLICATION_DOES_NOT_EXIST",
            "The requested application does not exist.",
        );
    }
    let name = body["name"].as_str().unwrap_or("");
    (
        StatusCode::OK,
        Json(table_json(CREATED_TABLE_ID, name, database_id)),
    )
}

async fn get_table(
    State(state): State<SharedState>,
    headers: HeaderMap,
    Path(table_id): Path<i64>,
) -> (StatusCode, Json<Value>) {
    record_auth(&state, &headers);
    match table_id {
        TABLE_1_ID => (
            StatusCode::OK,
            Json(table_json(TABLE_1_ID, TABLE_1_NAME, DATABASE_1_ID)),
        ),
        TABLE_2_ID => (
            StatusCode::OK,
            Json(table_json(TABLE_2_ID, TABLE_2_NAME, DATABASE_1_ID)),
        ),
        _ => table_not_found(),
    }
}

async fn list_fields(
    State(state): State<SharedState>,
    headers: HeaderMap,
    Path(table_id): Path<i64>,
) -> (StatusCode, Json<Value>) {
    record_auth(&state, &headers);
    match table_id {
        TABLE_1_ID => (
            StatusCode::OK,
            Json(json!([
                field_json(FIELD_NAME_ID, "Name", "text", true, TABLE_1_ID),
                field_json(FIELD_NOTES_ID, "Notes", "long_text", false, TABLE_1_ID),
            ])),
        ),
        TABLE_2_ID => (StatusCode::OK, Json(json!([]))),
        _ => table_not_found(),
    }
}

// ============================================================================
// Row endpoints
// ============================================================================

async fn list_rows(
    State(state): State<SharedState>,
    headers: HeaderMap,
    Path(table_id): Path<i64>,
    RawQuery(query): RawQuery,
) -> (StatusCode, Json<Value>) {
    record_auth(&state, &headers);
    state.lock().unwrap().last_rows_query = Some(query.unwrap_or_default());

    if table_id != TABLE_1_ID {
        return table_not_found();
    }
    (
        StatusCode::OK,
        Json(json!({
            "count": 2,
            "next": null,
            "previous": null,
            "results": [row_1_json(), row_2_json()],
        })),
    )
}

async fn get_row(
    State(state): State<SharedState>,
    headers: HeaderMap,
    Path((table_id, row_id)): Path<(i64, i64)>,
) -> (StatusCode, Json<Value>) {
    record_auth(&state, &headers);
    match stored_row(table_id, row_id) {
        Some(row) => (StatusCode::OK, Json(row)),
        None => row_not_found(),
    }
}

async fn create_row(
    State(state): State<SharedState>,
    headers: HeaderMap,
    Path(table_id): Path<i64>,
    Json(body): Json<Value>,
) -> (StatusCode, Json<Value>) {
    record_auth(&state, &headers);
    if table_id != TABLE_1_ID {
        return table_not_found();
    }
    let row = merged(
        json!({"id": CREATED_ROW_ID, "order": "3.00000000000000000000"}),
        &body,
    );
    (StatusCode::OK, Json(row))
}

async fn update_row(
    State(state): State<SharedState>,
    headers: HeaderMap,
    Path((table_id, row_id)): Path<(i64, i64)>,
    Json(body): Json<Value>,
) -> (StatusCode, Json<Value>) {
    record_auth(&state, &headers);
    match stored_row(table_id, row_id) {
        Some(row) => (StatusCode::OK, Json(merged(row, &body))),
        None => row_not_found(),
    }
}

async fn delete_row(
    State(state): State<SharedState>,
    headers: HeaderMap,
    Path((table_id, row_id)): Path<(i64, i64)>,
) -> Response {
    record_auth(&state, &headers);
    if stored_row(table_id, row_id).is_some() {
        StatusCode::NO_CONTENT.into_response()
    } else {
        row_not_found().into_response()
    }
}

async fn batch_create_rows(
    State(state): State<SharedState>,
    headers: HeaderMap,
    Path(table_id): Path<i64>,
    Json(body): Json<Value>,
) -> (StatusCode, Json<Value>) {
    record_auth(&state, &headers);
    if table_id != TABLE_1_ID {
        return table_not_found();
    }
    let items = body["items"].as_array().cloned().unwrap_or_default();
    let created: Vec<Value> = items
        .iter()
        .enumerate()
        .map(|(i, item)| {
            merged(
                json!({
                    "id": CREATED_ROW_ID + i as i64,
                    "order": format!("{}.00000000000000000000", 3 + i),
                }),
                item,
            )
        })
        .collect();
    (StatusCode::OK, Json(json!({ "items": created })))
}

async fn batch_update_rows(
    State(state): State<SharedState>,
    headers: HeaderMap,
    Path(table_id): Path<i64>,
    Json(body): Json<Value>,
) -> (StatusCode, Json<Value>) {
    record_auth(&state, &headers);
    if table_id != TABLE_1_ID {
        return table_not_found();
    }
    let items = body["items"].as_array().cloned().unwrap_or_default();
    let updated: Vec<Value> = items
        .iter()
        .map(|item| merged(json!({"order": "1.00000000000000000000"}), item))
        .collect();
    (StatusCode::OK, Json(json!({ "items": updated })))
}

async fn batch_delete_rows(
    State(state): State<SharedState>,
    headers: HeaderMap,
    Path(table_id): Path<i64>,
) -> Response {
    record_auth(&state, &headers);
    if table_id == TABLE_1_ID {
        StatusCode::NO_CONTENT.into_response()
    } else {
        table_not_found().into_response()
    }
}

// ============================================================================
// Canned payloads
// ============================================================================

fn workspace_json(id: i64, name: &str) -> Value {
    json!({"id": id, "name": name, "order": 1, "permissions": "ADMIN"})
}

fn application_json(id: i64, name: &str, app_type: &str, workspace_id: i64) -> Value {
    json!({
        "id": id,
        "name": name,
        "type": app_type,
        "order": 1,
        "workspace": {"id": workspace_id},
    })
}

fn database_1_json() -> Value {
    application_json(DATABASE_1_ID, DATABASE_1_NAME, "database", WORKSPACE_1_ID)
}

fn database_2_json() -> Value {
    application_json(DATABASE_2_ID, DATABASE_2_NAME, "database", WORKSPACE_2_ID)
}

fn non_database_app_json() -> Value {
    application_json(
        NON_DATABASE_APP_ID,
        NON_DATABASE_APP_NAME,
        "builder",
        WORKSPACE_1_ID,
    )
}

fn table_json(id: i64, name: &str, database_id: i64) -> Value {
    json!({"id": id, "name": name, "database_id": database_id, "order": 1})
}

fn field_json(id: i64, name: &str, field_type: &str, primary: bool, table_id: i64) -> Value {
    json!({
        "id": id,
        "name": name,
        "type": field_type,
        "primary": primary,
        "table_id": table_id,
    })
}

fn row_1_json() -> Value {
    json!({
        "id": ROW_1_ID,
        "order": "1.00000000000000000000",
        "Name": ROW_1_NAME,
        "Notes": "Blocked on QA sign-off",
    })
}

fn row_2_json() -> Value {
    json!({
        "id": ROW_2_ID,
        "order": "2.00000000000000000000",
        "Name": ROW_2_NAME,
        "Notes": null,
    })
}

fn stored_row(table_id: i64, row_id: i64) -> Option<Value> {
    if table_id != TABLE_1_ID {
        return None;
    }
    match row_id {
        ROW_1_ID => Some(row_1_json()),
        ROW_2_ID => Some(row_2_json()),
        _ => None,
    }
}

// ============================================================================
// Helpers
// ============================================================================

fn record_auth(state: &SharedState, headers: &HeaderMap) {
    let header = headers
        .get(AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .map(String::from);
    state.lock().unwrap().last_auth_header = header;
}

/// Overlay `patch`'s fields onto `base`, like Baserow echoing a write.
fn merged(mut base: Value, patch: &Value) -> Value {
    if let (Some(base_map), Some(patch_map)) = (base.as_object_mut(), patch.as_object()) {
        for (key, value) in patch_map {
            base_map.insert(key.clone(), value.clone());
        }
    }
    base
}

fn not_found(code: &str, detail: &str) -> (StatusCode, Json<Value>) {
    (
        StatusCode::NOT_FOUND,
        Json(json!({"error": code, "detail": detail})),
    )
}

fn workspace_not_found() -> (StatusCode, Json<Value>) {
    not_found(
        "ERROR_GROUP_DOES_NOT_EXIST",
        "The requested workspace does not exist.",
    )
}

fn table_not_found() -> (StatusCode, Json<Value>) {
    not_found(
        "ERROR_TABLE_DOES_NOT_EXIST",
        "The requested table does not exist.",
    )
}

fn row_not_found() -> (StatusCode, Json<Value>) {
    not_found(
        "ERROR_ROW_DOES_NOT_EXIST",
        "The requested row does not exist.",
    )
}
