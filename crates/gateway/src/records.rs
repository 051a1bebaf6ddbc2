//! Record Service: the CRUD operations forwarded to the Data API once a
//! session is confirmed.
//!
//! Each operation checks its required `methodBody` fields, makes one Data
//! API call under the confirmed token, and reshapes the answer. The token is
//! echoed back as `session` on every success.

use reqwest::Method;
use serde_json::{json, Map, Value};

use crate::error::{AppError, AppResult};
use crate::fields::{require, scalar_text};
use crate::fm_client::{is_ok, DataTarget, FmClient};

/// `findRecord` options copied verbatim into the `_find` request.
const FIND_OPTIONS: &[&str] = &["sort", "limit", "offset", "portal", "dateformats", "layout.response"];

/// Keys accepted inside `findRecord`'s `scripts` object.
const SCRIPT_OPTIONS: &[&str] = &[
    "script",
    "script.param",
    "script.prerequest",
    "script.prerequest.param",
    "script.presort",
    "script.presort.param",
];

/// POST /layouts/{layout}/records
pub async fn create_record(fm: &FmClient, target: &DataTarget<'_>, body: &Map<String, Value>) -> AppResult<Value> {
    require(body, &["database", "layout", "record"])?;
    let layout = text(body, "layout")?;
    let record = body.get("record").unwrap_or(&Value::Null);

    let res = fm
        .data_call(
            Method::POST,
            target,
            &["layouts", layout.as_str(), "records"],
            &[],
            Some(&json!({ "fieldData": record })),
        )
        .await?;

    Ok(json!({
        "status": "created",
        "recordId": res.pointer("/response/recordId").cloned().unwrap_or(Value::Null),
        "fieldData": record,
        "session": target.token,
    }))
}

/// GET /layouts/{layout}/records/{recordId}
pub async fn get_record_by_id(fm: &FmClient, target: &DataTarget<'_>, body: &Map<String, Value>) -> AppResult<Value> {
    require(body, &["database", "layout", "recordId"])?;
    let layout = text(body, "layout")?;
    let record_id = text(body, "recordId")?;

    let res = fm
        .data_call(Method::GET, target, &["layouts", layout.as_str(), "records", record_id.as_str()], &[], None)
        .await?;
    ensure_ok(&res)?;

    Ok(json!({
        "recordId": record_id,
        "record": res.pointer("/response/data/0/fieldData").cloned().unwrap_or(Value::Null),
        "session": target.token,
    }))
}

/// GET /layouts/{layout}/records?_offset&_limit
pub async fn get_all_records(fm: &FmClient, target: &DataTarget<'_>, body: &Map<String, Value>) -> AppResult<Value> {
    require(body, &["database", "layout"])?;
    let layout = text(body, "layout")?;

    let mut query = Vec::new();
    if let Some(offset) = scalar_text(body.get("offset")) {
        query.push(("_offset", offset));
    }
    if let Some(limit) = scalar_text(body.get("limit")) {
        query.push(("_limit", limit));
    }

    let res = fm
        .data_call(Method::GET, target, &["layouts", layout.as_str(), "records"], &query, None)
        .await?;

    listing(&res, "totalRecordCount", target.token)
}

/// POST /layouts/{layout}/_find
pub async fn find_record(fm: &FmClient, target: &DataTarget<'_>, body: &Map<String, Value>) -> AppResult<Value> {
    require(body, &["database", "layout", "query"])?;
    let layout = text(body, "layout")?;

    let res = fm
        .data_call(
            Method::POST,
            target,
            &["layouts", layout.as_str(), "_find"],
            &[],
            Some(&find_request(body)),
        )
        .await?;

    listing(&res, "foundCount", target.token)
}

/// PATCH /layouts/{layout}/records/{recordId}
pub async fn update_record(fm: &FmClient, target: &DataTarget<'_>, body: &Map<String, Value>) -> AppResult<Value> {
    require(body, &["database", "layout", "recordId", "record"])?;
    let layout = text(body, "layout")?;
    let record_id = text(body, "recordId")?;
    let record = body.get("record").unwrap_or(&Value::Null);

    fm.data_call(
        Method::PATCH,
        target,
        &["layouts", layout.as_str(), "records", record_id.as_str()],
        &[],
        Some(&json!({ "fieldData": record })),
    )
    .await?;

    Ok(json!({
        "status": "updated",
        "recordId": record_id,
        "fieldData": record,
        "session": target.token,
    }))
}

/// DELETE /layouts/{layout}/records/{recordId}
pub async fn delete_record(fm: &FmClient, target: &DataTarget<'_>, body: &Map<String, Value>) -> AppResult<Value> {
    require(body, &["database", "layout", "recordId"])?;
    let layout = text(body, "layout")?;
    let record_id = text(body, "recordId")?;

    fm.data_call(Method::DELETE, target, &["layouts", layout.as_str(), "records", record_id.as_str()], &[], None)
        .await?;

    Ok(json!({
        "status": "deleted",
        "recordId": record_id,
        "session": target.token,
    }))
}

fn find_request(body: &Map<String, Value>) -> Value {
    let mut request = Map::new();
    request.insert("query".to_string(), body.get("query").cloned().unwrap_or(Value::Null));

    for key in FIND_OPTIONS {
        if let Some(value) = body.get(*key).filter(|v| !v.is_null()) {
            request.insert(key.to_string(), value.clone());
        }
    }

    if let Some(scripts) = body.get("scripts").and_then(Value::as_object) {
        for key in SCRIPT_OPTIONS {
            if let Some(value) = scripts.get(*key).filter(|v| !v.is_null()) {
                request.insert(key.to_string(), value.clone());
            }
        }
    }

    Value::Object(request)
}

/// Shape a list/find answer: field data per row plus table info.
fn listing(res: &Value, count_key: &str, token: &str) -> AppResult<Value> {
    ensure_ok(res)?;

    let records: Vec<Value> = res
        .pointer("/response/data")
        .and_then(Value::as_array)
        .map(|rows| {
            rows.iter()
                .map(|row| row.get("fieldData").cloned().unwrap_or(Value::Null))
                .collect()
        })
        .unwrap_or_default();
    let info = res.pointer("/response/dataInfo").unwrap_or(&Value::Null);

    Ok(json!({
        "recordInfo": {
            "table": info["table"],
            "layout": info["layout"],
            "totalRecordCount": info[count_key],
        },
        "records": records,
        "session": token,
    }))
}

fn ensure_ok(res: &Value) -> AppResult<()> {
    if is_ok(res) {
        Ok(())
    } else {
        Err(AppError::Backend {
            status: None,
            body: res.clone(),
        })
    }
}

/// A required scalar as text; present-but-not-scalar values count as missing.
fn text(body: &Map<String, Value>, name: &str) -> AppResult<String> {
    scalar_text(body.get(name)).ok_or_else(|| AppError::MissingFields(vec![name.to_string()]))
}
