use crate::gen;
use crate::ipc::error::{err, ok};
use crate::ipc::helpers::{required_str, required_u64, required_usize, string_array};
use crate::ipc::types::{AppState, Request};
use chrono::NaiveDate;
use serde_json::json;
use std::path::PathBuf;

fn handle_master_schedule(_state: &mut AppState, req: &Request) -> serde_json::Value {
    let teachers = match required_usize(req, "teachers") {
        Ok(v) => v,
        Err(resp) => return resp,
    };
    let periods = match required_usize(req, "periods") {
        Ok(v) => v,
        Err(resp) => return resp,
    };
    let seed = match required_u64(req, "seed") {
        Ok(v) => v,
        Err(resp) => return resp,
    };

    let table = gen::master_schedule(teachers, periods, seed);
    ok(
        &req.id,
        json!({
            "headers": table.headers,
            "rows": table.rows,
        }),
    )
}

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

fn absence_records(req: &Request) -> Result<Vec<gen::AbsenceRecord>, serde_json::Value> {
    let start = parse_date(req, "startDate")?;
    let end = parse_date(req, "endDate")?;
    if end < start {
        return Err(err(&req.id, "bad_params", "endDate precedes startDate", None));
    }
    let staff = string_array(req, "staff")?;
    let seed = required_u64(req, "seed")?;
    let rate = req
        .params
        .get("rate")
        .and_then(|v| v.as_u64())
        .map(|v| v as usize)
        .unwrap_or(2);
    Ok(gen::absence_report(start, end, &staff, rate, seed))
}

fn records_json(records: &[gen::AbsenceRecord]) -> Vec<serde_json::Value> {
    records
        .iter()
        .map(|r| {
            json!({
                "date": r.date.format("%Y-%m-%d").to_string(),
                "teacher": r.teacher,
                "reason": r.reason,
                "coverage": r.coverage,
            })
        })
        .collect()
}

fn handle_absence_report(_state: &mut AppState, req: &Request) -> serde_json::Value {
    let records = match absence_records(req) {
        Ok(v) => v,
        Err(resp) => return resp,
    };
    ok(
        &req.id,
        json!({
            "records": records_json(&records),
            "recordCount": records.len(),
        }),
    )
}

fn handle_absence_report_csv(_state: &mut AppState, req: &Request) -> serde_json::Value {
    let out = match required_str(req, "outPath") {
        Ok(p) => PathBuf::from(p),
        Err(resp) => return resp,
    };
    let records = match absence_records(req) {
        Ok(v) => v,
        Err(resp) => return resp,
    };
    let text = gen::absence_csv(&records);
    if let Err(e) = std::fs::write(&out, text) {
        return err(
            &req.id,
            "file_write_failed",
            format!("failed to write {}: {}", out.to_string_lossy(), e),
            None,
        );
    }
    ok(
        &req.id,
        json!({
            "path": out.to_string_lossy(),
            "recordCount": records.len(),
        }),
    )
}

pub fn try_handle(state: &mut AppState, req: &Request) -> Option<serde_json::Value> {
    match req.method.as_str() {
        "gen.masterSchedule" => Some(handle_master_schedule(state, req)),
        "gen.absenceReport" => Some(handle_absence_report(state, req)),
        "gen.absenceReportCsv" => Some(handle_absence_report_csv(state, req)),
        _ => None,
    }
}
