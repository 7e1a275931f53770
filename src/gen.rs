//! Synthetic data generators for demos and pipeline exercises: a fake
//! master schedule in the raw spreadsheet cell format, and a fake absence
//! report over a school-year date range.
//!
//! Everything is seeded; the same inputs always produce the same output.

use chrono::{Datelike, Duration, NaiveDate, Weekday};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::master::ScheduleTable;

const LAST_NAMES: &[&str] = &[
    "Lee", "Nguyen", "Smith", "Garcia", "Patel", "Brown", "Kim", "Rossi", "Chen", "Walker",
    "Dubois", "Okafor", "Ivanov", "Silva", "Murphy", "Haddad", "Kowalski", "Sato", "Ng", "Reyes",
];

const FIRST_NAMES: &[&str] = &[
    "Anna", "Marcus", "Priya", "Diego", "Grace", "Sam", "Elena", "Tariq", "June", "Viktor",
    "Amara", "Noah", "Yuki", "Leila", "Owen", "Claire",
];

const DEPARTMENTS: &[(&str, &[&str])] = &[
    (
        "Math",
        &["Algebra I", "Geometry", "Algebra II", "Pre-Calculus", "Statistics"],
    ),
    (
        "Science",
        &["Biology", "Chemistry", "Physics", "Earth Science", "Science 8"],
    ),
    (
        "English",
        &["English 9", "English 10", "English 11", "Creative Writing"],
    ),
    (
        "Social Studies",
        &["World History", "Civics", "Geography", "Economics"],
    ),
    ("Arts", &["Band", "Choir", "Visual Arts", "Drama"]),
    ("PE", &["Phys Ed 9", "Phys Ed 10", "Health"]),
];

const ABSENCE_REASONS: &[&str] = &[
    "Sick",
    "Personal",
    "Professional Development",
    "Field Trip",
    "Jury Duty",
    "Bereavement",
];

fn pick<'a, T: ?Sized>(rng: &mut StdRng, items: &'a [&'a T]) -> &'a T {
    items[rng.gen_range(0..items.len())]
}

fn teacher_name(i: usize) -> String {
    let last = LAST_NAMES[i % LAST_NAMES.len()];
    let first = FIRST_NAMES[(i / LAST_NAMES.len() + i) % FIRST_NAMES.len()];
    format!("{}, {}", last, first)
}

fn room(rng: &mut StdRng) -> u32 {
    rng.gen_range(100..400)
}

fn term_token(rng: &mut StdRng) -> &'static str {
    // Mostly full-year courses, a sprinkling of semestered ones.
    match rng.gen_range(0..10) {
        0 => "S1",
        1 => "S2",
        _ => "FY",
    }
}

/// Generate a synthetic master-schedule table in the raw format the
/// normalizer consumes: multi-line period cells with `Room:`/`Days:`
/// details, one prep period per teacher.
pub fn master_schedule(teachers: usize, periods: usize, seed: u64) -> ScheduleTable {
    let mut rng = StdRng::seed_from_u64(seed);

    let mut headers: Vec<String> = vec!["Teacher".to_string(), "Department".to_string()];
    for p in 1..=periods {
        headers.push(format!("Period {}", p));
    }

    let mut rows: Vec<Vec<String>> = Vec::with_capacity(teachers);
    for i in 0..teachers {
        let (dept, courses) = DEPARTMENTS[rng.gen_range(0..DEPARTMENTS.len())];
        let prep_period = if periods > 0 {
            rng.gen_range(0..periods)
        } else {
            0
        };

        let mut row: Vec<String> = Vec::with_capacity(2 + periods);
        row.push(teacher_name(i));
        row.push(dept.to_string());
        for p in 0..periods {
            if p == prep_period {
                row.push("Prep".to_string());
                continue;
            }
            row.push(period_cell(&mut rng, courses));
        }
        rows.push(row);
    }

    ScheduleTable { headers, rows }
}

fn period_cell(rng: &mut StdRng, courses: &[&str]) -> String {
    match rng.gen_range(0..10) {
        // A/B split: two courses, one per day track, sharing a room.
        0..=2 => {
            let r = room(rng);
            let a = pick(rng, courses);
            let b = pick(rng, courses);
            format!(
                "{}\n      {}  Room:{}  Days:A\n{}\n      {}  Room:{}  Days:B",
                a,
                term_token(rng),
                r,
                b,
                term_token(rng),
                r
            )
        }
        // Bare course line, no details: defaults, both days.
        3 => pick(rng, courses).to_string(),
        // Single course with details, both days.
        _ => {
            let c = pick(rng, courses);
            format!("{}\n      {}  Room:{}", c, term_token(rng), room(rng))
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AbsenceRecord {
    pub date: NaiveDate,
    pub teacher: String,
    pub reason: String,
    pub coverage: String,
}

fn is_school_day(d: NaiveDate) -> bool {
    !matches!(d.weekday(), Weekday::Sat | Weekday::Sun)
}

/// Generate synthetic absence records across the school days of a date
/// range. `rate` teachers (at most, bounded by the staff list) are absent
/// per day, each at most once per day.
pub fn absence_report(
    start: NaiveDate,
    end: NaiveDate,
    staff: &[String],
    rate: usize,
    seed: u64,
) -> Vec<AbsenceRecord> {
    let mut rng = StdRng::seed_from_u64(seed);
    let mut out: Vec<AbsenceRecord> = Vec::new();
    if staff.is_empty() {
        return out;
    }

    let per_day = rate.min(staff.len());
    let mut day = start;
    while day <= end {
        if !is_school_day(day) {
            day += Duration::days(1);
            continue;
        }

        let mut picked: Vec<usize> = Vec::with_capacity(per_day);
        while picked.len() < per_day {
            let idx = rng.gen_range(0..staff.len());
            if !picked.contains(&idx) {
                picked.push(idx);
            }
        }

        for idx in picked {
            let coverage = if rng.gen_bool(0.5) {
                "All Day".to_string()
            } else {
                let from = rng.gen_range(1..=3);
                let to = rng.gen_range(from..=4);
                if from == to {
                    format!("Period {}", from)
                } else {
                    format!("Periods {}-{}", from, to)
                }
            };
            out.push(AbsenceRecord {
                date: day,
                teacher: staff[idx].clone(),
                reason: pick(&mut rng, ABSENCE_REASONS).to_string(),
                coverage,
            });
        }
        day += Duration::days(1);
    }

    out
}

pub fn absence_csv(records: &[AbsenceRecord]) -> String {
    let headers: Vec<String> = ["Date", "Teacher", "Reason", "Coverage"]
        .iter()
        .map(|s| s.to_string())
        .collect();
    let rows: Vec<Vec<String>> = records
        .iter()
        .map(|r| {
            vec![
                r.date.format("%Y-%m-%d").to_string(),
                r.teacher.clone(),
                r.reason.clone(),
                r.coverage.clone(),
            ]
        })
        .collect();
    crate::csv::to_csv(&headers, &rows)
}
