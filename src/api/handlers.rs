//! API request handlers
//!
//! Handlers for all REST API endpoints.

use std::sync::Arc;

use axum::{
    body::Bytes,
    extract::{Query, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use uuid::Uuid;

use super::server::AppState;
use crate::dynamic::{export_json_to_bytes, import_json};
use crate::error::{SheetError, SheetResult};
use crate::excel::{export_to_bytes, XlsxSource, XLSX_CONTENT_TYPE};
use crate::record::Record;

/// Standard API response wrapper
#[derive(Serialize)]
pub struct ApiResponse<T: Serialize> {
    pub success: bool,
    pub request_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl<T: Serialize> ApiResponse<T> {
    pub fn ok(data: T) -> Self {
        Self {
            success: true,
            request_id: Uuid::new_v4().to_string(),
            data: Some(data),
            error: None,
        }
    }

    pub fn err(message: impl Into<String>) -> Self {
        Self {
            success: false,
            request_id: Uuid::new_v4().to_string(),
            data: None,
            error: Some(message.into()),
        }
    }
}

impl SheetError {
    /// HTTP status reported for this error
    pub fn status_code(&self) -> StatusCode {
        if self.is_input_error() {
            StatusCode::BAD_REQUEST
        } else {
            StatusCode::INTERNAL_SERVER_ERROR
        }
    }
}

impl IntoResponse for SheetError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        (status, Json(ApiResponse::<()>::err(self.to_string()))).into_response()
    }
}

/// Serve `bytes` as a downloadable `.xlsx` file named `<file_name>.xlsx`
pub fn xlsx_attachment(file_name: &str, bytes: Vec<u8>) -> Response {
    let disposition = format!("attachment; filename={}.xlsx", attachment_name(file_name));
    (
        [
            (header::CONTENT_TYPE, XLSX_CONTENT_TYPE.to_string()),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        bytes,
    )
        .into_response()
}

/// Export typed records into an `.xlsx` attachment response
pub fn xlsx_response<R: Record>(file_name: &str, sheet: &str, records: &[R]) -> SheetResult<Response> {
    let bytes = export_to_bytes(sheet, records)?;
    Ok(xlsx_attachment(file_name, bytes))
}

/// File stem safe to place in a Content-Disposition header
fn attachment_name(file_name: &str) -> String {
    let stem = file_name.strip_suffix(".xlsx").unwrap_or(file_name);
    let cleaned: String = stem
        .chars()
        .filter(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.'))
        .collect();
    let cleaned = cleaned.trim_start_matches('.');
    if cleaned.is_empty() {
        "export".to_string()
    } else {
        cleaned.to_string()
    }
}

/// Root endpoint response
#[derive(Serialize)]
pub struct RootResponse {
    pub name: String,
    pub version: String,
    pub description: String,
    pub endpoints: Vec<EndpointInfo>,
}

#[derive(Serialize)]
pub struct EndpointInfo {
    pub path: String,
    pub method: String,
    pub description: String,
}

impl EndpointInfo {
    fn new(path: &str, method: &str, description: &str) -> Self {
        Self {
            path: path.to_string(),
            method: method.to_string(),
            description: description.to_string(),
        }
    }
}

/// GET / - Root info
pub async fn root(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let response = RootResponse {
        name: "sheetbind API Server".to_string(),
        version: state.version.clone(),
        description: "Record ↔ spreadsheet conversion over HTTP".to_string(),
        endpoints: vec![
            EndpointInfo::new("/health", "GET", "Health check endpoint"),
            EndpointInfo::new("/version", "GET", "Get server version"),
            EndpointInfo::new(
                "/api/v1/export",
                "POST",
                "Export a JSON array of objects as an .xlsx attachment",
            ),
            EndpointInfo::new(
                "/api/v1/import",
                "POST",
                "Import an .xlsx body as JSON rows keyed by header",
            ),
        ],
    };
    Json(ApiResponse::ok(response))
}

/// Health check response
#[derive(Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub uptime_message: String,
}

/// GET /health - Health check
pub async fn health() -> impl IntoResponse {
    Json(ApiResponse::ok(HealthResponse {
        status: "healthy".to_string(),
        uptime_message: "Server is running".to_string(),
    }))
}

/// Version response
#[derive(Serialize)]
pub struct VersionResponse {
    pub version: String,
    pub features: Vec<String>,
}

/// GET /version - Server version
pub async fn version(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    Json(ApiResponse::ok(VersionResponse {
        version: state.version.clone(),
        features: vec!["export".to_string(), "import".to_string()],
    }))
}

/// Export query parameters
#[derive(Deserialize, Default)]
pub struct ExportParams {
    /// Download file name, without extension
    pub name: Option<String>,
    pub sheet: Option<String>,
}

/// POST /api/v1/export - JSON records to an .xlsx attachment
pub async fn export(
    State(state): State<Arc<AppState>>,
    Query(params): Query<ExportParams>,
    Json(records): Json<Value>,
) -> Result<Response, SheetError> {
    let sheet = params.sheet.unwrap_or_else(|| state.default_sheet.clone());
    let name = params.name.unwrap_or_else(|| sheet.clone());

    let bytes = tokio::task::spawn_blocking(move || export_json_to_bytes(&sheet, &records))
        .await
        .map_err(|e| SheetError::Io(std::io::Error::other(e)))??;

    Ok(xlsx_attachment(&name, bytes))
}

/// Import query parameters
#[derive(Deserialize, Default)]
pub struct ImportParams {
    pub sheet: Option<String>,
}

/// Import response
#[derive(Serialize, Default)]
pub struct ImportResponse {
    pub sheet: String,
    pub row_count: usize,
    pub rows: Vec<Map<String, Value>>,
}

/// POST /api/v1/import - .xlsx body to JSON rows
pub async fn import(
    State(state): State<Arc<AppState>>,
    Query(params): Query<ImportParams>,
    body: Bytes,
) -> Result<Json<ApiResponse<ImportResponse>>, SheetError> {
    let sheet = params.sheet.unwrap_or_else(|| state.default_sheet.clone());

    let task_sheet = sheet.clone();
    let rows = tokio::task::spawn_blocking(move || {
        let mut source = XlsxSource::from_bytes(body.to_vec())?;
        import_json(&mut source, &task_sheet)
    })
    .await
    .map_err(|e| SheetError::Io(std::io::Error::other(e)))??;

    Ok(Json(ApiResponse::ok(ImportResponse {
        sheet,
        row_count: rows.len(),
        rows,
    })))
}
