//! Consistency checks over a normalized master schedule.
//!
//! All problems are reported as data; nothing here aborts a run. `error`
//! severity blocks export in the calling layer, `warning` does not.

use serde::Serialize;

use crate::master::{NonTeachingLabels, TeacherRow, PREP_CELL};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Error,
    Warning,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Issue {
    pub severity: Severity,
    pub message: String,
}

impl Issue {
    fn error(message: String) -> Issue {
        Issue {
            severity: Severity::Error,
            message,
        }
    }

    fn warning(message: String) -> Issue {
        Issue {
            severity: Severity::Warning,
            message,
        }
    }
}

const ROOM_MARKER: &str = "(Room:";

/// Run every check and collect all findings. Checks never short-circuit;
/// a schedule with ten problems reports ten issues.
pub fn validate(rows: &[TeacherRow], labels: &NonTeachingLabels) -> Vec<Issue> {
    let mut issues: Vec<Issue> = Vec::new();

    // The normalizer skips empty-name rows, so this only fires for rows
    // built by some other caller. Kept anyway.
    for row in rows {
        if row.name.trim().is_empty() {
            issues.push(Issue::error(format!(
                "row with department \"{}\" has no teacher name",
                row.department
            )));
        }
    }

    let mut seen: Vec<String> = Vec::new();
    for row in rows {
        let key = row.name.trim().to_lowercase();
        if key.is_empty() {
            continue;
        }
        if seen.contains(&key) {
            issues.push(Issue::warning(format!(
                "duplicate teacher: {}",
                row.name
            )));
        } else {
            seen.push(key);
        }
    }

    for row in rows {
        let all_prep = row
            .cells
            .iter()
            .all(|c| c == PREP_CELL || c.trim().is_empty());
        let any_room = row.cells.iter().any(|c| c.contains(ROOM_MARKER));
        // Zero period columns means the sheet had no periods to teach in;
        // that is a mapping problem, not a blank teaching load.
        if !row.cells.is_empty() && all_prep && !any_room {
            issues.push(Issue::warning(format!(
                "{} has no assigned classes (every period is Prep)",
                row.name
            )));
        }
    }

    issues.extend(typo_issues(rows, labels));

    issues
}

/// Flag course strings that look like misspelled non-teaching labels.
/// At most one warning per distinct course string; labels are tried in
/// configuration order and the first within distance 2 wins. Distance 0 is
/// an intentional match, never a typo.
fn typo_issues(rows: &[TeacherRow], labels: &NonTeachingLabels) -> Vec<Issue> {
    let mut issues: Vec<Issue> = Vec::new();
    let mut checked: Vec<String> = Vec::new();

    for row in rows {
        for cell in &row.cells {
            // Blank cells are exempt alongside Prep and room-bearing cells:
            // with a short configured label ("PD") an empty string sits
            // within distance 2 and would flag every blank period.
            if cell == PREP_CELL || cell.contains(ROOM_MARKER) || cell.trim().is_empty() {
                continue;
            }
            if checked.contains(cell) {
                continue;
            }
            checked.push(cell.clone());

            let folded = cell.to_lowercase();
            for label in labels.iter() {
                let d = levenshtein(&folded, label);
                if d > 0 && d <= 2 {
                    issues.push(Issue::warning(format!(
                        "\"{}\" looks like a misspelling of \"{}\"",
                        cell, label
                    )));
                    break;
                }
            }
        }
    }

    issues
}

/// Classic single-character insert/delete/substitute edit distance, unit
/// cost, over full strings.
pub fn levenshtein(a: &str, b: &str) -> usize {
    let a: Vec<char> = a.chars().collect();
    let b: Vec<char> = b.chars().collect();
    if a.is_empty() {
        return b.len();
    }
    if b.is_empty() {
        return a.len();
    }

    let mut prev: Vec<usize> = (0..=b.len()).collect();
    let mut cur: Vec<usize> = vec![0; b.len() + 1];

    for (i, ca) in a.iter().enumerate() {
        cur[0] = i + 1;
        for (j, cb) in b.iter().enumerate() {
            let sub_cost = if ca == cb { 0 } else { 1 };
            cur[j + 1] = (prev[j] + sub_cost)
                .min(prev[j + 1] + 1)
                .min(cur[j] + 1);
        }
        std::mem::swap(&mut prev, &mut cur);
    }

    prev[b.len()]
}
