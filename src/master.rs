//! Master-schedule normalization core.
//!
//! Input is a tabular dump of a master schedule spreadsheet: one row per
//! teacher, one column per period, each period cell holding a multi-line
//! block of course names with optional `Room:` / `Days:` / term-type detail
//! lines. Output is a canonical wide table with one (A day, B day) column
//! pair per period, ready for CSV export.

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TermType {
    FullYear,
    Sem1,
    Sem2,
    Q1,
    Q2,
    Q3,
    Q4,
}

impl TermType {
    fn from_token(t: &str) -> Option<TermType> {
        match t.to_ascii_uppercase().as_str() {
            "FY" => Some(TermType::FullYear),
            "S1" => Some(TermType::Sem1),
            "S2" => Some(TermType::Sem2),
            "Q1" => Some(TermType::Q1),
            "Q2" => Some(TermType::Q2),
            "Q3" => Some(TermType::Q3),
            "Q4" => Some(TermType::Q4),
            _ => None,
        }
    }
}

/// One course occupying one day track of one period for one teacher.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClassAssignment {
    pub course: String,
    pub room: String,
    pub term_type: TermType,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DayAssignments {
    pub a_day: Vec<ClassAssignment>,
    pub b_day: Vec<ClassAssignment>,
}

/// Parse one spreadsheet cell into per-day assignments.
///
/// The cell is a block of newline-separated records. A line followed by a
/// details line (anything containing `Room:` or `Days:`) is a course name;
/// the details line is scanned order-independently for a room, a term type
/// and a day flag. A line with no details line after it is a standalone
/// course on both day tracks. Missing details degrade to defaults (empty
/// room, full year, both days); nothing here is an error — consistency
/// problems are the validator's job.
pub fn parse_cell(text: &str) -> DayAssignments {
    let mut out = DayAssignments::default();
    let lines: Vec<&str> = text.lines().collect();

    let mut i = 0usize;
    while i < lines.len() {
        let course = lines[i].trim();
        if course.is_empty() {
            i += 1;
            continue;
        }

        let details = lines
            .get(i + 1)
            .filter(|l| l.contains("Room:") || l.contains("Days:"));

        let Some(details) = details else {
            // Standalone course name: defaults, both tracks.
            let a = ClassAssignment {
                course: course.to_string(),
                room: String::new(),
                term_type: TermType::FullYear,
            };
            out.b_day.push(a.clone());
            out.a_day.push(a);
            i += 1;
            continue;
        };

        let (room, term_type, day_flag) = scan_details(details);
        let a = ClassAssignment {
            course: course.to_string(),
            room,
            term_type,
        };
        match day_flag {
            Some(DayFlag::A) => out.a_day.push(a),
            Some(DayFlag::B) => out.b_day.push(a),
            None => {
                out.b_day.push(a.clone());
                out.a_day.push(a);
            }
        }
        i += 2;
    }

    out
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum DayFlag {
    A,
    B,
}

fn scan_details(line: &str) -> (String, TermType, Option<DayFlag>) {
    let mut room = String::new();
    let mut term_type = TermType::FullYear;
    let mut day_flag: Option<DayFlag> = None;

    let tokens: Vec<&str> = line.split_whitespace().collect();
    let mut i = 0usize;
    while i < tokens.len() {
        let tok = tokens[i];
        if let Some(rest) = strip_tag(tok, "Room:") {
            // `Room:204`, or `Room:` with the value as the next token.
            if !rest.is_empty() {
                room = rest.to_string();
            } else if let Some(next) = tokens.get(i + 1) {
                room = next.to_string();
                i += 1;
            }
        } else if let Some(rest) = strip_tag(tok, "Days:") {
            let v = if rest.is_empty() {
                tokens.get(i + 1).copied().unwrap_or("")
            } else {
                rest
            };
            match v.to_ascii_uppercase().as_str() {
                "A" => day_flag = Some(DayFlag::A),
                "B" => day_flag = Some(DayFlag::B),
                _ => {}
            }
        } else if let Some(tt) = TermType::from_token(tok) {
            term_type = tt;
        }
        i += 1;
    }

    (room, term_type, day_flag)
}

fn strip_tag<'a>(tok: &'a str, tag: &str) -> Option<&'a str> {
    let head = tok.get(..tag.len())?;
    if head.eq_ignore_ascii_case(tag) {
        Some(&tok[tag.len()..])
    } else {
        None
    }
}

pub const TEACHER_COLUMNS: &[&str] = &[
    "Teacher Name",
    "Teacher",
    "Name",
    "Staff",
    "Staff Name",
    "Instructor",
];

pub const DEPARTMENT_COLUMNS: &[&str] = &["Department", "Dept", "Subject", "Subject Area"];

/// Locate a column by trying candidate header names in priority order.
/// Matching is case-insensitive and trimmed on both sides; the first
/// candidate with a match wins.
pub fn find_column(headers: &[String], candidates: &[&str]) -> Option<usize> {
    for cand in candidates {
        let cand = cand.trim();
        for (idx, h) in headers.iter().enumerate() {
            if h.trim().eq_ignore_ascii_case(cand) {
                return Some(idx);
            }
        }
    }
    None
}

#[derive(Debug, Clone)]
pub struct PeriodColumn {
    pub index: usize,
    pub raw_header: String,
    pub header_a: String,
    pub header_b: String,
}

/// Any header containing "period" (case-insensitive) is a period column.
/// Ordering is source column order, left to right; period columns are never
/// re-sorted by their apparent period number.
pub fn period_columns(headers: &[String]) -> Vec<PeriodColumn> {
    headers
        .iter()
        .enumerate()
        .filter(|(_, h)| h.to_lowercase().contains("period"))
        .map(|(index, h)| {
            let raw = h.trim().to_string();
            PeriodColumn {
                index,
                header_a: format!("{} A Day", raw),
                header_b: format!("{} B Day", raw),
                raw_header: raw,
            }
        })
        .collect()
}

/// Configured non-teaching labels ("Prep", "Lunch", "Duty", ...). Order is
/// the user's configuration order; the typo check depends on it.
#[derive(Debug, Clone)]
pub struct NonTeachingLabels {
    folded: Vec<String>,
}

pub const DEFAULT_LABELS: &str = "Prep, Lunch, Duty";

impl NonTeachingLabels {
    /// Parse a comma-separated label string. Labels are trimmed and
    /// case-folded; empty entries and repeats are dropped.
    pub fn from_config(config: &str) -> NonTeachingLabels {
        let mut folded: Vec<String> = Vec::new();
        for part in config.split(',') {
            let p = part.trim().to_lowercase();
            if p.is_empty() || folded.contains(&p) {
                continue;
            }
            folded.push(p);
        }
        NonTeachingLabels { folded }
    }

    pub fn contains(&self, value: &str) -> bool {
        let v = value.trim().to_lowercase();
        self.folded.contains(&v)
    }

    /// Labels in configuration order, case-folded.
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.folded.iter().map(|s| s.as_str())
    }
}

impl Default for NonTeachingLabels {
    fn default() -> Self {
        NonTeachingLabels::from_config(DEFAULT_LABELS)
    }
}

/// Tabular input as handed over by the spreadsheet loader: ordered headers
/// plus rows of cells aligned to them. Short rows read as empty cells.
#[derive(Debug, Clone, Default)]
pub struct ScheduleTable {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

fn row_cell<'a>(row: &'a [String], idx: Option<usize>) -> &'a str {
    idx.and_then(|i| row.get(i)).map(|s| s.as_str()).unwrap_or("")
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TeacherRow {
    pub name: String,
    pub department: String,
    /// One (A day, B day) string pair per period column, flattened in
    /// period order.
    pub cells: Vec<String>,
}

#[derive(Debug, Clone, Default)]
pub struct NormalizedSchedule {
    pub headers: Vec<String>,
    pub rows: Vec<TeacherRow>,
    /// Input rows dropped for having no teacher name. A silent skip, not an
    /// error.
    pub skipped_rows: usize,
}

impl NormalizedSchedule {
    /// Rows in CSV column order: Department, Teacher, then period cells.
    pub fn csv_rows(&self) -> Vec<Vec<String>> {
        self.rows
            .iter()
            .map(|r| {
                let mut row = Vec::with_capacity(2 + r.cells.len());
                row.push(r.department.clone());
                row.push(r.name.clone());
                row.extend(r.cells.iter().cloned());
                row
            })
            .collect()
    }
}

pub const PREP_CELL: &str = "Prep";

/// Normalize a raw master-schedule table into one row per teacher with one
/// (A, B) column pair per detected period.
pub fn normalize(table: &ScheduleTable, labels: &NonTeachingLabels) -> NormalizedSchedule {
    let teacher_idx = find_column(&table.headers, TEACHER_COLUMNS);
    let dept_idx = find_column(&table.headers, DEPARTMENT_COLUMNS);
    let periods = period_columns(&table.headers);

    let mut headers: Vec<String> = vec!["Department".to_string(), "Teacher".to_string()];
    for p in &periods {
        headers.push(p.header_a.clone());
        headers.push(p.header_b.clone());
    }

    let mut rows: Vec<TeacherRow> = Vec::new();
    let mut skipped_rows = 0usize;

    for row in &table.rows {
        let name = row_cell(row, teacher_idx).trim().to_string();
        if name.is_empty() {
            skipped_rows += 1;
            continue;
        }
        let department = row_cell(row, dept_idx).trim().to_string();

        let mut cells: Vec<String> = Vec::with_capacity(periods.len() * 2);
        for p in &periods {
            let raw = row_cell(row, Some(p.index));
            if labels.contains(raw) {
                // Whole cell is a configured non-teaching label; skip the
                // parser entirely.
                cells.push(PREP_CELL.to_string());
                cells.push(PREP_CELL.to_string());
                continue;
            }
            let parsed = parse_cell(raw);
            cells.push(format_day_cell(parsed.a_day.first()));
            cells.push(format_day_cell(parsed.b_day.first()));
        }

        rows.push(TeacherRow {
            name,
            department,
            cells,
        });
    }

    NormalizedSchedule {
        headers,
        rows,
        skipped_rows,
    }
}

// Only the first assignment of a day track is kept. A co-taught second
// course in the same period/day is dropped; downstream consumers expect one
// course per period-day cell, so this reduction is load-bearing.
fn format_day_cell(assignment: Option<&ClassAssignment>) -> String {
    match assignment {
        None => PREP_CELL.to_string(),
        Some(a) if a.room.is_empty() => a.course.clone(),
        Some(a) => format!("{} (Room: {})", a.course, a.room),
    }
}
