use std::collections::HashMap;
use std::path::Path;

use chrono::{Local, NaiveDate, NaiveTime, SecondsFormat, Utc};
use uuid::Uuid;

use crate::csvline::split_record;
use crate::duration::parse_duration;
use crate::model::{Meet, Participant};
use crate::names::normalize;

#[derive(Debug)]
pub enum AttendanceError {
    /// Underlying read failure; surfaced as-is, not a format problem.
    Read(std::io::Error),
    /// Readable content that is not a usable call report.
    InvalidFormat(String),
}

impl std::fmt::Display for AttendanceError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AttendanceError::Read(e) => write!(f, "failed to read report file: {}", e),
            AttendanceError::InvalidFormat(msg) => f.write_str(msg),
        }
    }
}

impl std::error::Error for AttendanceError {}

#[derive(Debug, Clone, Copy)]
struct Columns {
    name: usize,
    email: Option<usize>,
    duration: usize,
    // The column header declares minutes; bare numeric cells scale by 60.
    duration_in_minutes: bool,
    join_time: Option<usize>,
}

const NAME_HEADERS: &[&str] = &["full name", "participant", "повне ім'я"];
const EMAIL_HEADERS: &[&str] = &["email", "електронна пошта"];
const JOIN_HEADERS: &[&str] = &["first seen", "час приєднання"];

fn canon_header(cell: &str) -> String {
    cell.trim().replace('\u{2019}', "'").to_lowercase()
}

fn map_columns(header_cells: &[String]) -> Option<Columns> {
    let mut name: Option<usize> = None;
    let mut email: Option<usize> = None;
    let mut duration: Option<usize> = None;
    let mut duration_in_minutes = false;
    let mut join_time: Option<usize> = None;

    for (i, cell) in header_cells.iter().enumerate() {
        let h = canon_header(cell);
        if name.is_none() && NAME_HEADERS.contains(&h.as_str()) {
            name = Some(i);
        } else if email.is_none() && EMAIL_HEADERS.contains(&h.as_str()) {
            email = Some(i);
        } else if join_time.is_none() && JOIN_HEADERS.contains(&h.as_str()) {
            join_time = Some(i);
        } else if duration.is_none()
            && (h.contains("duration") || h.contains("time in call") || h.contains("хвилин"))
        {
            duration = Some(i);
            duration_in_minutes = h.contains("minute") || h.contains("хвилин");
        }
    }

    Some(Columns {
        // Reports without a recognized name header keep names in the first column.
        name: name.unwrap_or(0),
        email,
        duration: duration?,
        duration_in_minutes,
        join_time,
    })
}

fn is_max_points_cell(cell: &str) -> bool {
    let h = canon_header(cell);
    h.contains("max points") || h.contains("maximum points") || h == "бали"
}

// A marks sheet puts "Max Points" either in a header column or as the label
// of its third row; both identify the file as the wrong format here.
fn looks_like_marks_sheet(header_cells: &[String], body: &[&str]) -> bool {
    if header_cells.iter().any(|c| is_max_points_cell(c)) {
        return true;
    }
    body.iter()
        .filter(|l| !l.trim().is_empty())
        .take(3)
        .any(|l| {
            split_record(l)
                .first()
                .map(|c| is_max_points_cell(c))
                .unwrap_or(false)
        })
}

/// Reads and parses one call-report CSV from disk.
pub fn read_attendance_csv(path: &Path) -> Result<Meet, AttendanceError> {
    let bytes = std::fs::read(path).map_err(AttendanceError::Read)?;
    let text = String::from_utf8_lossy(&bytes);
    let filename = path
        .file_name()
        .and_then(|s| s.to_str())
        .unwrap_or("report.csv");
    parse_attendance_csv(filename, &text)
}

/// Parses a call-report CSV into one session record.
///
/// Leading `*` lines (optionally quoted) carry the meeting code and the
/// "Created on" / "Ended on" stamps; the filename is the fallback source for
/// both the code and an ISO date, and the current date is the last resort.
/// Participants dedup by normalized name: durations sum, the earliest
/// non-empty join time wins, first-seen spelling and email are kept, and
/// zero-duration totals are dropped.
pub fn parse_attendance_csv(filename: &str, text: &str) -> Result<Meet, AttendanceError> {
    let text = text.strip_prefix('\u{feff}').unwrap_or(text);
    let lines: Vec<&str> = text.lines().collect();

    let mut meet_id: Option<String> = None;
    let mut date: Option<NaiveDate> = None;
    let mut start_time: Option<String> = None;
    let mut end_time: Option<String> = None;

    let mut idx = 0usize;
    while idx < lines.len() {
        let t = lines[idx].trim();
        if t.is_empty() {
            idx += 1;
            continue;
        }
        if !(t.starts_with('*') || t.starts_with("\"*")) {
            break;
        }
        if meet_id.is_none() {
            meet_id = find_meet_code(t);
        }
        let lower = t.replace('\u{2019}', "'").to_lowercase();
        if let Some(pos) = lower.find("created on") {
            let (d, tm) = parse_meta_datetime(&lower[pos + "created on".len()..]);
            if date.is_none() {
                date = d;
            }
            if start_time.is_none() {
                start_time = tm.map(fmt_time);
            }
        } else if let Some(pos) = lower.find("ended on") {
            let (d, tm) = parse_meta_datetime(&lower[pos + "ended on".len()..]);
            if date.is_none() {
                date = d;
            }
            if end_time.is_none() {
                end_time = tm.map(fmt_time);
            }
        }
        idx += 1;
    }

    if meet_id.is_none() {
        meet_id = find_meet_code(filename);
    }
    if date.is_none() {
        date = find_iso_date(filename);
    }
    let date = date.unwrap_or_else(|| Local::now().date_naive());
    let meet_id = meet_id.unwrap_or_else(|| filename_stem(filename));

    while idx < lines.len() && lines[idx].trim().is_empty() {
        idx += 1;
    }
    let header_cells = split_record(lines.get(idx).copied().unwrap_or(""));
    let body = &lines[(idx + 1).min(lines.len())..];
    if looks_like_marks_sheet(&header_cells, body) {
        return Err(AttendanceError::InvalidFormat(
            "This file looks like a Marks CSV, not a call attendance report.".to_string(),
        ));
    }
    let Some(cols) = map_columns(&header_cells) else {
        return Err(AttendanceError::InvalidFormat(
            "Missing required column: call duration / time in call.".to_string(),
        ));
    };
    idx += 1;

    // Explicit dedup fold keyed by normalized name, insertion order preserved.
    let mut order: Vec<String> = Vec::new();
    let mut by_name: HashMap<String, Participant> = HashMap::new();
    let mut saw_named_row = false;
    while idx < lines.len() {
        let line = lines[idx];
        idx += 1;
        if line.trim().is_empty() {
            continue;
        }
        let cells = split_record(line);
        let raw_name = cells.get(cols.name).map(|s| s.trim()).unwrap_or("");
        if raw_name.is_empty() {
            continue;
        }
        saw_named_row = true;

        let key = normalize(raw_name);
        let secs = read_duration_cell(&cells, cols);
        let email = opt_cell(&cells, cols.email);
        let join_time = opt_cell(&cells, cols.join_time);

        match by_name.get_mut(&key) {
            Some(p) => {
                p.duration += secs;
                p.join_time = min_join(p.join_time.take(), join_time);
                if p.email.is_none() {
                    p.email = email;
                }
            }
            None => {
                order.push(key.clone());
                by_name.insert(
                    key.clone(),
                    Participant {
                        id: Uuid::new_v4().to_string(),
                        name: key,
                        original_name: raw_name.to_string(),
                        email,
                        join_time,
                        duration: secs,
                    },
                );
            }
        }
    }

    let mut participants: Vec<Participant> = Vec::with_capacity(order.len());
    for key in &order {
        if let Some(p) = by_name.remove(key) {
            if p.duration > 0 {
                participants.push(p);
            }
        }
    }

    if participants.is_empty() {
        let msg = if saw_named_row {
            "No participants with valid attendance found."
        } else {
            "No participants found."
        };
        return Err(AttendanceError::InvalidFormat(msg.to_string()));
    }

    Ok(Meet {
        id: Uuid::new_v4().to_string(),
        meet_id,
        date: date.format("%Y-%m-%d").to_string(),
        start_time,
        end_time,
        filename: filename.to_string(),
        uploaded_at: Utc::now().to_rfc3339_opts(SecondsFormat::Secs, true),
        participants,
    })
}

fn read_duration_cell(cells: &[String], cols: Columns) -> i64 {
    let cell = cells.get(cols.duration).map(|s| s.trim()).unwrap_or("");
    if cols.duration_in_minutes {
        if let Ok(v) = cell.parse::<f64>() {
            if v.is_finite() && v > 0.0 {
                return (v * 60.0) as i64;
            }
            return 0;
        }
    }
    parse_duration(cell)
}

fn opt_cell(cells: &[String], idx: Option<usize>) -> Option<String> {
    let cell = cells.get(idx?)?.trim();
    if cell.is_empty() {
        None
    } else {
        Some(cell.to_string())
    }
}

fn min_join(a: Option<String>, b: Option<String>) -> Option<String> {
    match (a, b) {
        (Some(x), Some(y)) => Some(if y < x { y } else { x }),
        (Some(x), None) => Some(x),
        (None, y) => y,
    }
}

fn fmt_time(t: NaiveTime) -> String {
    t.format("%H:%M:%S").to_string()
}

fn filename_stem(filename: &str) -> String {
    let base = filename
        .rsplit(['/', '\\'])
        .next()
        .unwrap_or(filename);
    match base.rfind('.') {
        Some(0) | None => base.to_string(),
        Some(i) => base[..i].to_string(),
    }
}

/// Scans for the `xxx-xxxx-xxx` meeting room code (lowercase ASCII letters)
/// with non-word boundaries on both sides.
pub fn find_meet_code(s: &str) -> Option<String> {
    let b = s.as_bytes();
    let n = b.len();
    let low = |i: usize| i < n && b[i].is_ascii_lowercase();
    let boundary = |i: Option<usize>| match i {
        Some(i) if i < n => !(b[i].is_ascii_alphanumeric() || b[i] == b'-'),
        _ => true,
    };
    for i in 0..n.saturating_sub(11) {
        let shape = low(i)
            && low(i + 1)
            && low(i + 2)
            && b[i + 3] == b'-'
            && low(i + 4)
            && low(i + 5)
            && low(i + 6)
            && low(i + 7)
            && b[i + 8] == b'-'
            && low(i + 9)
            && low(i + 10)
            && low(i + 11);
        if shape && boundary(i.checked_sub(1)) && boundary(Some(i + 12)) {
            return String::from_utf8(b[i..i + 12].to_vec()).ok();
        }
    }
    None
}

/// Finds a `YYYY-MM-DD` date with digit boundaries, validated by chrono.
pub fn find_iso_date(s: &str) -> Option<NaiveDate> {
    let b = s.as_bytes();
    let n = b.len();
    let digit = |i: usize| i < n && b[i].is_ascii_digit();
    for i in 0..n.saturating_sub(9) {
        let shape = digit(i)
            && digit(i + 1)
            && digit(i + 2)
            && digit(i + 3)
            && b[i + 4] == b'-'
            && digit(i + 5)
            && digit(i + 6)
            && b[i + 7] == b'-'
            && digit(i + 8)
            && digit(i + 9);
        if !shape {
            continue;
        }
        if i > 0 && b[i - 1].is_ascii_digit() {
            continue;
        }
        if i + 10 < n && b[i + 10].is_ascii_digit() {
            continue;
        }
        let text = std::str::from_utf8(&b[i..i + 10]).ok()?;
        if let Ok(d) = NaiveDate::parse_from_str(text, "%Y-%m-%d") {
            return Some(d);
        }
    }
    None
}

/// Best-effort extraction of a date and clock time from locale-formatted
/// metadata text. Unrecognized pieces simply come back as None.
fn parse_meta_datetime(s: &str) -> (Option<NaiveDate>, Option<NaiveTime>) {
    (find_date(s), find_time(s))
}

fn find_time(s: &str) -> Option<NaiveTime> {
    let b = s.as_bytes();
    let n = b.len();
    let digit = |i: usize| i < n && b[i].is_ascii_digit();
    let mut i = 0usize;
    while i < n {
        if !digit(i) || (i > 0 && b[i - 1].is_ascii_digit()) {
            i += 1;
            continue;
        }
        let mut j = i;
        while digit(j) && j - i < 2 {
            j += 1;
        }
        if j >= n || b[j] != b':' || !(digit(j + 1) && digit(j + 2)) {
            i += 1;
            continue;
        }
        let hour: u32 = std::str::from_utf8(&b[i..j]).ok()?.parse().ok()?;
        let minute: u32 = std::str::from_utf8(&b[j + 1..j + 3]).ok()?.parse().ok()?;
        let mut second: u32 = 0;
        let mut end = j + 3;
        if end < n && b[end] == b':' && digit(end + 1) && digit(end + 2) {
            second = std::str::from_utf8(&b[end + 1..end + 3])
                .ok()?
                .parse()
                .ok()?;
            end += 3;
        }
        // 12-hour stamps carry an am/pm marker after the clock.
        let tail = s.get(end..).unwrap_or("").trim_start();
        let mut h = hour;
        if tail.starts_with("pm") && hour < 12 {
            h = hour + 12;
        } else if tail.starts_with("am") && hour == 12 {
            h = 0;
        }
        if let Some(t) = NaiveTime::from_hms_opt(h, minute, second) {
            return Some(t);
        }
        i = end;
    }
    None
}

fn find_date(s: &str) -> Option<NaiveDate> {
    if let Some(d) = find_iso_date(s) {
        return Some(d);
    }
    if let Some(d) = find_numeric_date(s) {
        return Some(d);
    }
    find_worded_date(s)
}

// `12/31/2024` (month first) or `31.12.2024` (day first).
fn find_numeric_date(s: &str) -> Option<NaiveDate> {
    let b = s.as_bytes();
    let n = b.len();
    let digit = |i: usize| i < n && b[i].is_ascii_digit();
    let mut i = 0usize;
    while i < n {
        if !digit(i) || (i > 0 && b[i - 1].is_ascii_digit()) {
            i += 1;
            continue;
        }
        let start = i;
        let mut j = i;
        while digit(j) && j - start < 2 {
            j += 1;
        }
        let Some(&sep) = b.get(j) else {
            break;
        };
        if sep != b'/' && sep != b'.' {
            i = j + 1;
            continue;
        }
        let first: u32 = match std::str::from_utf8(&b[start..j]).ok()?.parse() {
            Ok(v) => v,
            Err(_) => {
                i = j + 1;
                continue;
            }
        };
        let mut k = j + 1;
        let second_start = k;
        while digit(k) && k - second_start < 2 {
            k += 1;
        }
        if k == second_start || k >= n || b[k] != sep {
            i = j + 1;
            continue;
        }
        let second: u32 = std::str::from_utf8(&b[second_start..k]).ok()?.parse().ok()?;
        let year_start = k + 1;
        let mut m = year_start;
        while digit(m) && m - year_start < 4 {
            m += 1;
        }
        if m - year_start != 4 || digit(m) {
            i = j + 1;
            continue;
        }
        let year: i32 = std::str::from_utf8(&b[year_start..m]).ok()?.parse().ok()?;
        let (month, day) = if sep == b'/' { (first, second) } else { (second, first) };
        if let Some(d) = NaiveDate::from_ymd_opt(year, month, day) {
            return Some(d);
        }
        if let Some(d) = NaiveDate::from_ymd_opt(year, day, month) {
            return Some(d);
        }
        i = m;
    }
    None
}

// `15 Jan 2024`, `Jan 15, 2024`, `15 січня 2024`.
fn find_worded_date(s: &str) -> Option<NaiveDate> {
    let tokens: Vec<&str> = s
        .split(|c: char| c.is_whitespace() || c == ',')
        .filter(|t| !t.is_empty())
        .collect();
    for (i, tok) in tokens.iter().enumerate() {
        let Some(month) = month_from_name(tok) else {
            continue;
        };
        let day_before = i.checked_sub(1).and_then(|k| small_number(tokens[k]));
        let day_after = tokens.get(i + 1).and_then(|t| small_number(t));
        let day = day_before.or(day_after)?;
        let year = tokens
            .iter()
            .skip(i)
            .take(3)
            .find_map(|t| four_digit_year(t))?;
        if let Some(d) = NaiveDate::from_ymd_opt(year, month, day) {
            return Some(d);
        }
    }
    None
}

fn small_number(tok: &str) -> Option<u32> {
    let t = tok.trim_matches(|c: char| !c.is_ascii_digit());
    if t.is_empty() || t.len() > 2 {
        return None;
    }
    let v: u32 = t.parse().ok()?;
    if (1..=31).contains(&v) {
        Some(v)
    } else {
        None
    }
}

fn four_digit_year(tok: &str) -> Option<i32> {
    let t = tok.trim_matches(|c: char| !c.is_ascii_digit());
    if t.len() != 4 {
        return None;
    }
    t.parse().ok()
}

fn month_from_name(tok: &str) -> Option<u32> {
    let t: String = tok
        .chars()
        .filter(|c| c.is_alphabetic())
        .collect::<String>()
        .to_lowercase();
    if t.is_empty() {
        return None;
    }
    const EN: [&str; 12] = [
        "jan", "feb", "mar", "apr", "may", "jun", "jul", "aug", "sep", "oct", "nov", "dec",
    ];
    for (i, m) in EN.iter().enumerate() {
        if t.starts_with(m) {
            return Some(i as u32 + 1);
        }
    }
    const UK: [&str; 12] = [
        "січ", "лют", "бер", "кві", "тра", "чер", "лип", "сер", "вер", "жов", "лис", "гру",
    ];
    for (i, m) in UK.iter().enumerate() {
        if t.starts_with(m) {
            return Some(i as u32 + 1);
        }
    }
    None
}
