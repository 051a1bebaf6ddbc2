//! `POST /api/dataApi`: the single operation endpoint.
//!
//! Pipeline per request: request gate, JSON body, method lookup, target
//! fields, session authentication, then one Record Service call. Only
//! `signin` skips session authentication; it is itself a login.

use axum::{body::Bytes, extract::State, http::HeaderMap, Json};
use serde::Deserialize;
use serde_json::{json, Map, Value};
use uuid::Uuid;

use crate::auth::{self, gate, Credential, SessionContext, SessionOutcome};
use crate::error::{AppError, AppResult};
use crate::fields::{missing_fields, scalar_text};
use crate::fm_client::{DataTarget, FmClient, FmError};
use crate::records;
use crate::state::AppState;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    Signin,
    Signout,
    CreateRecord,
    GetRecordById,
    GetAllRecords,
    FindRecord,
    UpdateRecord,
    DeleteRecord,
}

impl Operation {
    pub fn from_name(name: &str) -> Option<Self> {
        let op = match name {
            "signin" => Operation::Signin,
            "signout" => Operation::Signout,
            "createRecord" => Operation::CreateRecord,
            "getRecordById" => Operation::GetRecordById,
            "getAllRecords" => Operation::GetAllRecords,
            "findRecord" => Operation::FindRecord,
            "updateRecord" => Operation::UpdateRecord,
            "deleteRecord" => Operation::DeleteRecord,
            _ => return None,
        };
        Some(op)
    }

    /// Operations that run on the Basic credential alone.
    pub fn skips_session_validation(self) -> bool {
        matches!(self, Operation::Signin)
    }
}

/// Body of a `dataApi` call.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DataApiRequest {
    pub method: Option<String>,
    pub fm_server: Option<String>,
    pub method_body: Option<Map<String, Value>>,
    pub session: Option<SessionParams>,
}

/// Client-held session state.
#[derive(Debug, Default, Deserialize)]
pub struct SessionParams {
    pub token: Option<String>,
    #[serde(default)]
    pub required: Value,
}

impl SessionParams {
    /// Only a JSON `true` marks the token as required.
    pub fn is_required(&self) -> bool {
        self.required == Value::Bool(true)
    }
}

impl DataApiRequest {
    /// Parse a request body; an empty body is an empty request.
    pub fn parse(body: &[u8]) -> AppResult<Self> {
        if body.iter().all(u8::is_ascii_whitespace) {
            return Ok(Self::default());
        }
        serde_json::from_slice(body).map_err(|e| {
            tracing::debug!(error = %e, "Rejecting dataApi body");
            AppError::InvalidJson
        })
    }
}

#[tracing::instrument(skip_all, fields(request_id = %Uuid::new_v4(), method = tracing::field::Empty))]
pub async fn data_api(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> AppResult<Json<Value>> {
    let credential = gate::basic_credential(&headers)?;
    let request = DataApiRequest::parse(&body)?;

    let name = request.method.as_deref().unwrap_or_default();
    let operation = Operation::from_name(name).ok_or_else(|| AppError::InvalidMethod(name.to_string()))?;
    tracing::Span::current().record("method", name);

    let method_body = request.method_body.unwrap_or_default();
    let server_field = request.fm_server.map(Value::String);
    let missing = missing_fields(&[
        ("fmServer", server_field.as_ref()),
        ("database", method_body.get("database")),
    ]);
    if !missing.is_empty() {
        return Err(AppError::MissingFields(missing));
    }
    let server = server_field.as_ref().and_then(Value::as_str).unwrap_or_default().to_string();
    let database =
        scalar_text(method_body.get("database")).ok_or_else(|| AppError::MissingFields(vec!["database".to_string()]))?;

    if operation.skips_session_validation() {
        return signin(&state.fm, &server, &database, &credential).await.map(Json);
    }

    let session = request.session.unwrap_or_default();
    let ctx = SessionContext {
        credential,
        required: session.is_required(),
        supplied_token: session.token,
        database,
        server,
    };

    let token = match auth::authenticate(&*state.fm, &ctx).await {
        SessionOutcome::Confirmed(token) => token,
        SessionOutcome::Rejected(reason) => return Err(AppError::Rejected(reason.to_string())),
    };

    let target = DataTarget {
        server: &ctx.server,
        database: &ctx.database,
        token: &token,
    };
    dispatch(&state.fm, operation, &target, &method_body).await.map(Json)
}

/// Run one operation under a confirmed session.
pub async fn dispatch(
    fm: &FmClient,
    operation: Operation,
    target: &DataTarget<'_>,
    body: &Map<String, Value>,
) -> AppResult<Value> {
    match operation {
        Operation::Signin => Ok(signed_in(target.database, target.token)),
        Operation::Signout => signout(fm, target).await,
        Operation::CreateRecord => records::create_record(fm, target, body).await,
        Operation::GetRecordById => records::get_record_by_id(fm, target, body).await,
        Operation::GetAllRecords => records::get_all_records(fm, target, body).await,
        Operation::FindRecord => records::find_record(fm, target, body).await,
        Operation::UpdateRecord => records::update_record(fm, target, body).await,
        Operation::DeleteRecord => records::delete_record(fm, target, body).await,
    }
}

async fn signin(fm: &FmClient, server: &str, database: &str, credential: &Credential) -> AppResult<Value> {
    let token = fm.login(server, database, credential).await.map_err(|e| {
        tracing::warn!(error = %e, database = %database, "Signin failed");
        match e {
            FmError::Status { body, .. } => AppError::SigninFailed(body),
            other => AppError::SigninFailed(Value::String(other.to_string())),
        }
    })?;

    Ok(signed_in(database, &token))
}

fn signed_in(database: &str, token: &str) -> Value {
    json!({
        "message": "Signin Successful",
        "database": database,
        "session": token,
    })
}

async fn signout(fm: &FmClient, target: &DataTarget<'_>) -> AppResult<Value> {
    match fm.logout(target.server, target.database, target.token).await {
        Ok(true) => Ok(json!({ "message": "Signout success" })),
        Ok(false) | Err(FmError::Status { .. }) => Err(AppError::SignoutFailed),
        Err(e) => Err(e.into()),
    }
}
