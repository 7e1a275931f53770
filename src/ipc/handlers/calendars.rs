use crate::ipc::error::{err, ok};
use crate::ipc::helpers::{db_conn, optional_str, required_str};
use crate::ipc::types::{AppState, Request};
use chrono::NaiveDate;
use rusqlite::{params, OptionalExtension};
use serde_json::json;
use uuid::Uuid;

fn parse_date(req: &Request, key: &str) -> Result<NaiveDate, serde_json::Value> {
    let s = required_str(req, key)?;
    NaiveDate::parse_from_str(s.trim(), "%Y-%m-%d").map_err(|_| {
        err(
            &req.id,
            "bad_params",
            format!("{} must be YYYY-MM-DD", key),
            None,
        )
    })
}

fn handle_add(state: &mut AppState, req: &Request) -> serde_json::Value {
    let conn = match db_conn(state, req) {
        Ok(c) => c,
        Err(resp) => return resp,
    };
    let name = match required_str(req, "name") {
        Ok(v) => v,
        Err(resp) => return resp,
    };
    let level = match required_str(req, "level") {
        Ok(v) => v,
        Err(resp) => return resp,
    };
    let Some(year) = req.params.get("year").and_then(|v| v.as_i64()) else {
        return err(&req.id, "bad_params", "missing or non-numeric year", None);
    };
    let start = match parse_date(req, "startDate") {
        Ok(v) => v,
        Err(resp) => return resp,
    };
    let end = match parse_date(req, "endDate") {
        Ok(v) => v,
        Err(resp) => return resp,
    };
    if end < start {
        return err(&req.id, "bad_params", "endDate precedes startDate", None);
    }
    let notes = optional_str(req, "notes");

    let id = Uuid::new_v4().to_string();
    let result = conn.execute(
        "INSERT INTO calendars(id, name, level, year, start_date, end_date, notes)
         VALUES(?, ?, ?, ?, ?, ?, ?)",
        params![
            id,
            name.trim(),
            level.trim(),
            year,
            start.format("%Y-%m-%d").to_string(),
            end.format("%Y-%m-%d").to_string(),
            notes,
        ],
    );
    match result {
        Ok(_) => ok(&req.id, json!({ "calendarId": id })),
        Err(e) => err(&req.id, "db_query_failed", e.to_string(), None),
    }
}

fn row_json(r: &rusqlite::Row<'_>) -> rusqlite::Result<serde_json::Value> {
    Ok(json!({
        "id": r.get::<_, String>(0)?,
        "name": r.get::<_, String>(1)?,
        "level": r.get::<_, String>(2)?,
        "year": r.get::<_, i64>(3)?,
        "startDate": r.get::<_, String>(4)?,
        "endDate": r.get::<_, String>(5)?,
        "notes": r.get::<_, Option<String>>(6)?,
    }))
}

/// Library browser: optional case-insensitive name substring, exact level,
/// exact year. Results ordered by name.
fn handle_list(state: &mut AppState, req: &Request) -> serde_json::Value {
    let conn = match db_conn(state, req) {
        Ok(c) => c,
        Err(resp) => return resp,
    };
    let query = optional_str(req, "query").map(|q| q.trim().to_lowercase());
    let level = optional_str(req, "level");
    let year = req.params.get("year").and_then(|v| v.as_i64());

    let result = conn
        .prepare(
            "SELECT id, name, level, year, start_date, end_date, notes
             FROM calendars ORDER BY name",
        )
        .and_then(|mut stmt| {
            stmt.query_map([], |r| {
                let name: String = r.get(1)?;
                let lvl: String = r.get(2)?;
                let yr: i64 = r.get(3)?;
                Ok((row_json(r)?, name, lvl, yr))
            })
            .and_then(|it| it.collect::<Result<Vec<_>, _>>())
        });

    let rows = match result {
        Ok(v) => v,
        Err(e) => return err(&req.id, "db_query_failed", e.to_string(), None),
    };

    let calendars: Vec<serde_json::Value> = rows
        .into_iter()
        .filter(|(_, name, lvl, yr)| {
            if let Some(q) = &query {
                if !name.to_lowercase().contains(q.as_str()) {
                    return false;
                }
            }
            if let Some(l) = &level {
                if !lvl.eq_ignore_ascii_case(l.trim()) {
                    return false;
                }
            }
            if let Some(y) = year {
                if *yr != y {
                    return false;
                }
            }
            true
        })
        .map(|(v, _, _, _)| v)
        .collect();

    ok(&req.id, json!({ "calendars": calendars }))
}

fn handle_get(state: &mut AppState, req: &Request) -> serde_json::Value {
    let conn = match db_conn(state, req) {
        Ok(c) => c,
        Err(resp) => return resp,
    };
    let id = match required_str(req, "id") {
        Ok(v) => v,
        Err(resp) => return resp,
    };
    let result = conn
        .query_row(
            "SELECT id, name, level, year, start_date, end_date, notes
             FROM calendars WHERE id = ?",
            [&id],
            |r| row_json(r),
        )
        .optional();
    match result {
        Ok(Some(v)) => ok(&req.id, v),
        Ok(None) => err(&req.id, "not_found", format!("no calendar {}", id), None),
        Err(e) => err(&req.id, "db_query_failed", e.to_string(), None),
    }
}

fn handle_delete(state: &mut AppState, req: &Request) -> serde_json::Value {
    let conn = match db_conn(state, req) {
        Ok(c) => c,
        Err(resp) => return resp,
    };
    let id = match required_str(req, "id") {
        Ok(v) => v,
        Err(resp) => return resp,
    };
    match conn.execute("DELETE FROM calendars WHERE id = ?", [&id]) {
        Ok(n) => ok(&req.id, json!({ "deleted": n > 0 })),
        Err(e) => err(&req.id, "db_query_failed", e.to_string(), None),
    }
}

pub fn try_handle(state: &mut AppState, req: &Request) -> Option<serde_json::Value> {
    match req.method.as_str() {
        "calendars.add" => Some(handle_add(state, req)),
        "calendars.list" => Some(handle_list(state, req)),
        "calendars.get" => Some(handle_get(state, req)),
        "calendars.delete" => Some(handle_delete(state, req)),
        _ => None,
    }
}
