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
fn normalize_splits_ab_cells_and_reports_no_issues() {
    let (mut child, mut stdin, mut reader) = spawn_sidecar();

    let resp = request(
        &mut stdin,
        &mut reader,
        "1",
        "master.normalize",
        json!({
            "headers": ["Teacher", "Department", "Period 1"],
            "rows": [[
                "Lee, Anna",
                "Math",
                "Algebra I\n      FY  Room:204  Days:A\nGeometry\n      FY  Room:204  Days:B"
            ]],
            "labels": "prep, lunch",
        }),
    );

    assert_eq!(resp.get("ok").and_then(|v| v.as_bool()), Some(true));
    let headers: Vec<&str> = resp
        .pointer("/result/headers")
        .and_then(|v| v.as_array())
        .expect("headers")
        .iter()
        .map(|v| v.as_str().expect("header string"))
        .collect();
    assert_eq!(
        headers,
        vec!["Department", "Teacher", "Period 1 A Day", "Period 1 B Day"]
    );

    let cells: Vec<&str> = resp
        .pointer("/result/rows/0/cells")
        .and_then(|v| v.as_array())
        .expect("cells")
        .iter()
        .map(|v| v.as_str().expect("cell string"))
        .collect();
    assert_eq!(cells, vec!["Algebra I (Room: 204)", "Geometry (Room: 204)"]);

    let issues = resp
        .pointer("/result/issues")
        .and_then(|v| v.as_array())
        .expect("issues");
    assert!(issues.is_empty(), "unexpected issues: {:?}", issues);

    drop(stdin);
    let _ = child.wait();
}

#[test]
fn normalize_surfaces_typo_and_duplicate_warnings() {
    let (mut child, mut stdin, mut reader) = spawn_sidecar();

    let resp = request(
        &mut stdin,
        &mut reader,
        "1",
        "master.normalize",
        json!({
            "headers": ["Teacher", "Period 1", "Period 2"],
            "rows": [
                ["Smith, Jane", "perp", "Biology\n FY Room:101"],
                ["smith, jane", "Prep", "Chemistry\n FY Room:102"],
            ],
        }),
    );

    let issues = resp
        .pointer("/result/issues")
        .and_then(|v| v.as_array())
        .expect("issues");
    let messages: Vec<&str> = issues
        .iter()
        .map(|i| i.get("message").and_then(|v| v.as_str()).expect("message"))
        .collect();
    assert!(messages.iter().any(|m| m.contains("duplicate teacher")));
    assert!(messages
        .iter()
        .any(|m| m.contains("misspelling") && m.contains("perp")));
    for issue in issues {
        assert_eq!(
            issue.get("severity").and_then(|v| v.as_str()),
            Some("warning")
        );
    }

    drop(stdin);
    let _ = child.wait();
}

#[test]
fn export_csv_writes_quoted_file() {
    let workspace = temp_dir("scheddesk-export");
    let out = workspace.join("schedule.csv");
    let (mut child, mut stdin, mut reader) = spawn_sidecar();

    let resp = request(
        &mut stdin,
        &mut reader,
        "1",
        "master.exportCsv",
        json!({
            "headers": ["Teacher", "Department", "Period 1"],
            "rows": [["Lee, Anna", "Math", "Algebra I\n FY Room:204"]],
            "outPath": out.to_string_lossy(),
        }),
    );
    assert_eq!(resp.get("ok").and_then(|v| v.as_bool()), Some(true));
    assert_eq!(resp.pointer("/result/rowCount").and_then(|v| v.as_u64()), Some(1));

    let text = std::fs::read_to_string(&out).expect("read exported csv");
    let lines: Vec<&str> = text.lines().collect();
    assert_eq!(
        lines[0],
        "Department,Teacher,Period 1 A Day,Period 1 B Day"
    );
    // The teacher name contains a comma, so it must be quoted in the file.
    assert_eq!(
        lines[1],
        "Math,\"Lee, Anna\",Algebra I (Room: 204),Algebra I (Room: 204)"
    );
    assert!(text.ends_with('\n'));

    drop(stdin);
    let _ = child.wait();
    let _ = std::fs::remove_dir_all(workspace);
}

#[test]
fn export_bundle_contains_schedule_and_issue_report() {
    let workspace = temp_dir("scheddesk-bundle");
    let out = workspace.join("schedule-bundle.zip");
    let (mut child, mut stdin, mut reader) = spawn_sidecar();

    let resp = request(
        &mut stdin,
        &mut reader,
        "1",
        "master.exportBundle",
        json!({
            "headers": ["Teacher", "Period 1"],
            "rows": [["Ng, Sam", "Science 8\n FY Room:210"]],
            "outPath": out.to_string_lossy(),
        }),
    );
    assert_eq!(resp.get("ok").and_then(|v| v.as_bool()), Some(true));
    assert_eq!(
        resp.pointer("/result/entryCount").and_then(|v| v.as_u64()),
        Some(3)
    );

    // Zip magic bytes are enough to confirm the bundle landed on disk.
    let bytes = std::fs::read(&out).expect("read bundle");
    assert_eq!(&bytes[..4], &[0x50, 0x4B, 0x03, 0x04]);

    drop(stdin);
    let _ = child.wait();
    let _ = std::fs::remove_dir_all(workspace);
}

#[test]
fn workspace_label_setting_feeds_normalization() {
    let workspace = temp_dir("scheddesk-labels");
    let (mut child, mut stdin, mut reader) = spawn_sidecar();

    let _ = request(
        &mut stdin,
        &mut reader,
        "1",
        "workspace.select",
        json!({ "path": workspace.to_string_lossy() }),
    );
    let _ = request(
        &mut stdin,
        &mut reader,
        "2",
        "settings.set",
        json!({ "key": "labels.nonTeaching", "value": "Prep, Hall Duty" }),
    );

    // "Hall Duty" is a label in this workspace, so the cell short-circuits
    // to Prep instead of parsing as a course.
    let resp = request(
        &mut stdin,
        &mut reader,
        "3",
        "master.normalize",
        json!({
            "headers": ["Teacher", "Period 1"],
            "rows": [["Ng, Sam", "Hall Duty"]],
        }),
    );
    let cells: Vec<&str> = resp
        .pointer("/result/rows/0/cells")
        .and_then(|v| v.as_array())
        .expect("cells")
        .iter()
        .map(|v| v.as_str().expect("cell string"))
        .collect();
    assert_eq!(cells, vec!["Prep", "Prep"]);

    drop(stdin);
    let _ = child.wait();
    let _ = std::fs::remove_dir_all(workspace);
}
