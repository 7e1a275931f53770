use std::path::PathBuf;

use rusqlite::Connection;
use serde::Deserialize;

/// One request line from the UI: caller-chosen id (echoed back verbatim),
/// dotted method name, and a free-form params object.
#[derive(Debug, Deserialize, Clone)]
pub struct Request {
    pub id: String,
    pub method: String,
    #[serde(default)]
    pub params: serde_json::Value,
}

/// Selected workspace directory and its open library database. Both stay
/// `None` until `workspace.select`; the schedule pipeline itself never
/// needs them.
pub struct AppState {
    pub workspace: Option<PathBuf>,
    pub db: Option<Connection>,
}
