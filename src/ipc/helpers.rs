use rusqlite::Connection;

use super::error::err;
use super::types::{AppState, Request};

pub fn required_str(req: &Request, key: &str) -> Result<String, serde_json::Value> {
    req.params
        .get(key)
        .and_then(|v| v.as_str())
        .map(|v| v.to_string())
        .ok_or_else(|| err(&req.id, "bad_params", format!("missing {}", key), None))
}

pub fn optional_str(req: &Request, key: &str) -> Option<String> {
    req.params
        .get(key)
        .and_then(|v| v.as_str())
        .map(|v| v.to_string())
}

pub fn required_usize(req: &Request, key: &str) -> Result<usize, serde_json::Value> {
    req.params
        .get(key)
        .and_then(|v| v.as_u64())
        .map(|v| v as usize)
        .ok_or_else(|| {
            err(
                &req.id,
                "bad_params",
                format!("missing or non-numeric {}", key),
                None,
            )
        })
}

pub fn required_u64(req: &Request, key: &str) -> Result<u64, serde_json::Value> {
    req.params.get(key).and_then(|v| v.as_u64()).ok_or_else(|| {
        err(
            &req.id,
            "bad_params",
            format!("missing or non-numeric {}", key),
            None,
        )
    })
}

pub fn db_conn<'a>(state: &'a AppState, req: &Request) -> Result<&'a Connection, serde_json::Value> {
    state
        .db
        .as_ref()
        .ok_or_else(|| err(&req.id, "no_workspace", "select a workspace first", None))
}

pub fn string_array(req: &Request, key: &str) -> Result<Vec<String>, serde_json::Value> {
    let arr = req
        .params
        .get(key)
        .and_then(|v| v.as_array())
        .ok_or_else(|| {
            err(
                &req.id,
                "bad_params",
                format!("missing array {}", key),
                None,
            )
        })?;
    let mut out: Vec<String> = Vec::with_capacity(arr.len());
    for v in arr {
        let Some(s) = v.as_str() else {
            return Err(err(
                &req.id,
                "bad_params",
                format!("{} must be an array of strings", key),
                None,
            ));
        };
        out.push(s.to_string());
    }
    Ok(out)
}
