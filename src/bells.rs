//! Bell-schedule builder core: HH:MM parsing, per-period lengths, and
//! structural notices (overlaps, long passing gaps).

use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum NoticeLevel {
    Info,
    Warning,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Notice {
    pub level: NoticeLevel,
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PeriodSpec {
    pub label: String,
    pub start: String,
    pub end: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuiltPeriod {
    pub label: String,
    pub start: String,
    pub end: String,
    pub minutes: i64,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BellSchedule {
    pub name: String,
    pub periods: Vec<BuiltPeriod>,
    pub total_minutes: i64,
}

/// Passing time longer than this between consecutive periods gets an info
/// notice.
const GAP_NOTICE_MINUTES: i64 = 5;

/// Parse `HH:MM` (24h) to minutes since midnight.
pub fn parse_hhmm(s: &str) -> anyhow::Result<i64> {
    let t = s.trim();
    let (h, m) = t
        .split_once(':')
        .ok_or_else(|| anyhow::anyhow!("bad time (expected HH:MM): {}", s))?;
    let h: i64 = h
        .trim()
        .parse()
        .map_err(|_| anyhow::anyhow!("bad hour in time: {}", s))?;
    let m: i64 = m
        .trim()
        .parse()
        .map_err(|_| anyhow::anyhow!("bad minute in time: {}", s))?;
    if !(0..24).contains(&h) || !(0..60).contains(&m) {
        anyhow::bail!("time out of range: {}", s);
    }
    Ok(h * 60 + m)
}

/// Build a bell schedule from ordered period specs. Times must parse;
/// everything else (zero-length periods, overlaps, big gaps) is reported as
/// a notice rather than an error so the wizard can show it inline.
pub fn build(name: &str, specs: &[PeriodSpec]) -> anyhow::Result<(BellSchedule, Vec<Notice>)> {
    let mut periods: Vec<BuiltPeriod> = Vec::with_capacity(specs.len());
    let mut notices: Vec<Notice> = Vec::new();
    let mut prev_end: Option<(String, i64)> = None;
    let mut total_minutes: i64 = 0;

    for spec in specs {
        let start = parse_hhmm(&spec.start)?;
        let end = parse_hhmm(&spec.end)?;
        let minutes = end - start;

        if minutes <= 0 {
            notices.push(Notice {
                level: NoticeLevel::Warning,
                message: format!("{} ends at or before it starts", spec.label),
            });
        } else {
            total_minutes += minutes;
        }

        if let Some((prev_label, prev)) = &prev_end {
            if start < *prev {
                notices.push(Notice {
                    level: NoticeLevel::Warning,
                    message: format!("{} overlaps {}", spec.label, prev_label),
                });
            } else {
                let gap = start - prev;
                if gap > GAP_NOTICE_MINUTES {
                    notices.push(Notice {
                        level: NoticeLevel::Info,
                        message: format!(
                            "{} minute gap before {}",
                            gap, spec.label
                        ),
                    });
                }
            }
        }
        prev_end = Some((spec.label.clone(), end));

        periods.push(BuiltPeriod {
            label: spec.label.clone(),
            start: spec.start.trim().to_string(),
            end: spec.end.trim().to_string(),
            minutes,
        });
    }

    Ok((
        BellSchedule {
            name: name.trim().to_string(),
            periods,
            total_minutes,
        },
        notices,
    ))
}
