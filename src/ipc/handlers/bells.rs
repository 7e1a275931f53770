use crate::bells::{build, BellSchedule, BuiltPeriod, PeriodSpec};
use crate::ipc::error::{err, ok};
use crate::ipc::helpers::{db_conn, required_str};
use crate::ipc::types::{AppState, Request};
use rusqlite::{Connection, OptionalExtension};
use serde_json::json;
use uuid::Uuid;

fn parse_specs(req: &Request) -> Result<Vec<PeriodSpec>, serde_json::Value> {
    let arr = req
        .params
        .get("periods")
        .and_then(|v| v.as_array())
        .ok_or_else(|| err(&req.id, "bad_params", "missing array periods", None))?;

    let mut specs: Vec<PeriodSpec> = Vec::with_capacity(arr.len());
    for (i, p) in arr.iter().enumerate() {
        let label = p.get("label").and_then(|v| v.as_str()).unwrap_or("").trim();
        let start = p.get("start").and_then(|v| v.as_str()).unwrap_or("");
        let end = p.get("end").and_then(|v| v.as_str()).unwrap_or("");
        if label.is_empty() {
            return Err(err(
                &req.id,
                "bad_params",
                format!("periods[{}] has no label", i),
                None,
            ));
        }
        specs.push(PeriodSpec {
            label: label.to_string(),
            start: start.to_string(),
            end: end.to_string(),
        });
    }
    Ok(specs)
}

fn build_from_params(req: &Request) -> Result<(BellSchedule, Vec<crate::bells::Notice>), serde_json::Value> {
    let name = required_str(req, "name")?;
    let specs = parse_specs(req)?;
    build(&name, &specs).map_err(|e| err(&req.id, "bad_params", e.to_string(), None))
}

fn schedule_json(id: Option<&str>, sched: &BellSchedule) -> serde_json::Value {
    json!({
        "id": id,
        "name": sched.name,
        "totalMinutes": sched.total_minutes,
        "periods": sched
            .periods
            .iter()
            .map(|p| {
                json!({
                    "label": p.label,
                    "start": p.start,
                    "end": p.end,
                    "minutes": p.minutes,
                })
            })
            .collect::<Vec<_>>(),
    })
}

fn handle_build(_state: &mut AppState, req: &Request) -> serde_json::Value {
    let (sched, notices) = match build_from_params(req) {
        Ok(v) => v,
        Err(resp) => return resp,
    };
    let mut result = schedule_json(None, &sched);
    result["notices"] = json!(notices);
    ok(&req.id, result)
}

fn insert_schedule(conn: &Connection, sched: &BellSchedule) -> anyhow::Result<String> {
    let id = Uuid::new_v4().to_string();
    let created_at = chrono::Utc::now().to_rfc3339();
    conn.execute(
        "INSERT INTO bell_schedules(id, name, total_minutes, created_at) VALUES(?, ?, ?, ?)",
        rusqlite::params![id, sched.name, sched.total_minutes, created_at],
    )?;
    for (i, p) in sched.periods.iter().enumerate() {
        conn.execute(
            "INSERT INTO bell_periods(schedule_id, sort_order, label, start_time, end_time, minutes)
             VALUES(?, ?, ?, ?, ?, ?)",
            rusqlite::params![id, i as i64, p.label, p.start, p.end, p.minutes],
        )?;
    }
    Ok(id)
}

fn handle_save(state: &mut AppState, req: &Request) -> serde_json::Value {
    let conn = match db_conn(state, req) {
        Ok(c) => c,
        Err(resp) => return resp,
    };
    let (sched, notices) = match build_from_params(req) {
        Ok(v) => v,
        Err(resp) => return resp,
    };
    match insert_schedule(conn, &sched) {
        Ok(id) => {
            let mut result = schedule_json(Some(&id), &sched);
            result["notices"] = json!(notices);
            ok(&req.id, result)
        }
        Err(e) => err(&req.id, "db_query_failed", e.to_string(), None),
    }
}

fn handle_list(state: &mut AppState, req: &Request) -> serde_json::Value {
    let conn = match db_conn(state, req) {
        Ok(c) => c,
        Err(resp) => return resp,
    };
    let result = conn
        .prepare(
            "SELECT id, name, total_minutes, created_at FROM bell_schedules ORDER BY name",
        )
        .and_then(|mut stmt| {
            stmt.query_map([], |r| {
                Ok(json!({
                    "id": r.get::<_, String>(0)?,
                    "name": r.get::<_, String>(1)?,
                    "totalMinutes": r.get::<_, i64>(2)?,
                    "createdAt": r.get::<_, String>(3)?,
                }))
            })
            .and_then(|it| it.collect::<Result<Vec<_>, _>>())
        });
    match result {
        Ok(schedules) => ok(&req.id, json!({ "schedules": schedules })),
        Err(e) => err(&req.id, "db_query_failed", e.to_string(), None),
    }
}

fn load_schedule(conn: &Connection, id: &str) -> anyhow::Result<Option<BellSchedule>> {
    let head: Option<(String, i64)> = conn
        .query_row(
            "SELECT name, total_minutes FROM bell_schedules WHERE id = ?",
            [id],
            |r| Ok((r.get(0)?, r.get(1)?)),
        )
        .optional()?;
    let Some((name, total_minutes)) = head else {
        return Ok(None);
    };

    let mut stmt = conn.prepare(
        "SELECT label, start_time, end_time, minutes FROM bell_periods
         WHERE schedule_id = ? ORDER BY sort_order",
    )?;
    let periods = stmt
        .query_map([id], |r| {
            Ok(BuiltPeriod {
                label: r.get(0)?,
                start: r.get(1)?,
                end: r.get(2)?,
                minutes: r.get(3)?,
            })
        })?
        .collect::<Result<Vec<_>, _>>()?;

    Ok(Some(BellSchedule {
        name,
        periods,
        total_minutes,
    }))
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
    match load_schedule(conn, &id) {
        Ok(Some(sched)) => ok(&req.id, schedule_json(Some(&id), &sched)),
        Ok(None) => err(&req.id, "not_found", format!("no bell schedule {}", id), None),
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
    let result = conn
        .execute("DELETE FROM bell_periods WHERE schedule_id = ?", [&id])
        .and_then(|_| conn.execute("DELETE FROM bell_schedules WHERE id = ?", [&id]));
    match result {
        Ok(n) => ok(&req.id, json!({ "deleted": n > 0 })),
        Err(e) => err(&req.id, "db_query_failed", e.to_string(), None),
    }
}

pub fn try_handle(state: &mut AppState, req: &Request) -> Option<serde_json::Value> {
    match req.method.as_str() {
        "bells.build" => Some(handle_build(state, req)),
        "bells.save" => Some(handle_save(state, req)),
        "bells.list" => Some(handle_list(state, req)),
        "bells.get" => Some(handle_get(state, req)),
        "bells.delete" => Some(handle_delete(state, req)),
        _ => None,
    }
}
