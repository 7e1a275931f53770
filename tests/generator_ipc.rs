use serde_json::json;
use std::io::{BufRead, BufReader, Write};
use std::path::PathBuf;
use std::process::{Child, ChildStdin, ChildStdout, Command, Stdio};
use std::time::{SystemTime, UNIX_EPOCH};

fn temp_dir(prefix: &str) -> PathBuf {
    let p = std::env::temp_dir().join(format!(
        "{}-{}",
        prefix,
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .expect("clock")
            .as_nanos()
    ));
    std::fs::create_dir_all(&p).expect("create temp dir");
    p
}

fn spawn_sidecar() -> (Child, ChildStdin, BufReader<ChildStdout>) {
    let exe = env!("CARGO_BIN_EXE_scheddeskd");
    let mut child = Command::new(exe)
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::null())
        .spawn()
        .expect("spawn scheddeskd");
    let stdin = child.stdin.take().expect("child stdin");
    let stdout = child.stdout.take().expect("child stdout");
    (child, stdin, BufReader::new(stdout))
}

fn request(
    stdin: &mut ChildStdin,
    reader: &mut BufReader<ChildStdout>,
    id: &str,
    method: &str,
    params: serde_json::Value,
) -> serde_json::Value {
    let payload = json!({ "id": id, "method": method, "params": params });
    writeln!(stdin, "{}", payload).expect("write request");
    stdin.flush().expect("flush request");

    let mut line = String::new();
    reader.read_line(&mut line).expect("read response line");
    serde_json::from_str(line.trim()).expect("parse response json")
}

#[test]
fn generated_schedule_is_seed_deterministic_and_normalizable() {
    let (mut child, mut stdin, mut reader) = spawn_sidecar();

    let params = json!({ "teachers": 8, "periods": 4, "seed": 99 });
    let first = request(&mut stdin, &mut reader, "1", "gen.masterSchedule", params.clone());
    let second = request(&mut stdin, &mut reader, "2", "gen.masterSchedule", params);
    assert_eq!(first.get("result"), second.get("result"));

    // Feed the generated table straight back through the normalizer.
    let headers = first.pointer("/result/headers").expect("headers").clone();
    let rows = first.pointer("/result/rows").expect("rows").clone();
    let normalized = request(
        &mut stdin,
        &mut reader,
        "3",
        "master.normalize",
        json!({ "headers": headers, "rows": rows }),
    );
    assert_eq!(normalized.get("ok").and_then(|v| v.as_bool()), Some(true));
    assert_eq!(
        normalized
            .pointer("/result/rows")
            .and_then(|v| v.as_array())
            .map(|a| a.len()),
        Some(8)
    );
    let issues = normalized
        .pointer("/result/issues")
        .and_then(|v| v.as_array())
        .expect("issues");
    assert!(issues
        .iter()
        .all(|i| i.get("severity").and_then(|v| v.as_str()) != Some("error")));

    drop(stdin);
    let _ = child.wait();
}

#[test]
fn absence_report_csv_lands_on_disk_with_school_days_only() {
    let workspace = temp_dir("scheddesk-absence");
    let out = workspace.join("absences.csv");
    let (mut child, mut stdin, mut reader) = spawn_sidecar();

    let resp = request(
        &mut stdin,
        &mut reader,
        "1",
        "gen.absenceReportCsv",
        json!({
            // 2025-09-06 and 07 are a weekend; no record may use them.
            "startDate": "2025-09-01",
            "endDate": "2025-09-08",
            "staff": ["Lee, Anna", "Ng, Sam", "Smith, Jane"],
            "seed": 5,
            "rate": 1,
            "outPath": out.to_string_lossy(),
        }),
    );
    assert_eq!(resp.get("ok").and_then(|v| v.as_bool()), Some(true));
    // Six school days in the range, one absence per day.
    assert_eq!(
        resp.pointer("/result/recordCount").and_then(|v| v.as_u64()),
        Some(6)
    );

    let text = std::fs::read_to_string(&out).expect("read absence csv");
    let lines: Vec<&str> = text.lines().collect();
    assert_eq!(lines[0], "Date,Teacher,Reason,Coverage");
    assert_eq!(lines.len(), 7);
    for line in &lines[1..] {
        assert!(!line.starts_with("2025-09-06"), "weekend record: {}", line);
        assert!(!line.starts_with("2025-09-07"), "weekend record: {}", line);
    }

    drop(stdin);
    let _ = child.wait();
    let _ = std::fs::remove_dir_all(workspace);
}
