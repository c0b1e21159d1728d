/// Parses the duration text found in call reports into whole seconds.
///
/// Recognized, in priority order: colon clock forms (`HH:MM:SS`, `MM:SS`),
/// worded forms combining `N hr` / `N min` / `N s` tokens in any order, and
/// bare numeric strings taken as seconds. Anything else degrades to 0 rather
/// than failing the surrounding parse; a column declared in minutes is scaled
/// by the caller.
pub fn parse_duration(text: &str) -> i64 {
    let t = text.trim();
    if t.is_empty() {
        return 0;
    }
    if let Some(secs) = parse_clock(t) {
        return secs;
    }
    if let Some(secs) = parse_worded(t) {
        return secs;
    }
    match t.parse::<f64>() {
        Ok(v) if v.is_finite() && v > 0.0 => v as i64,
        _ => 0,
    }
}

fn parse_clock(t: &str) -> Option<i64> {
    let fields: Vec<&str> = t.split(':').collect();
    if fields.len() != 2 && fields.len() != 3 {
        return None;
    }
    let mut total: i64 = 0;
    for f in &fields {
        let f = f.trim();
        if f.is_empty() || !f.chars().all(|c| c.is_ascii_digit()) {
            return None;
        }
        total = total * 60 + f.parse::<i64>().ok()?;
    }
    Some(total)
}

fn parse_worded(t: &str) -> Option<i64> {
    let mut total: i64 = 0;
    let mut matched = false;
    let chars: Vec<char> = t.chars().collect();
    let mut i = 0usize;
    while i < chars.len() {
        if !chars[i].is_ascii_digit() {
            i += 1;
            continue;
        }
        let mut value: i64 = 0;
        while i < chars.len() && chars[i].is_ascii_digit() {
            value = value * 10 + (chars[i] as i64 - '0' as i64);
            i += 1;
        }
        while i < chars.len() && chars[i].is_whitespace() {
            i += 1;
        }
        let mut unit = String::new();
        while i < chars.len() && chars[i].is_alphabetic() {
            unit.push(chars[i].to_ascii_lowercase());
            i += 1;
        }
        let factor = if unit.starts_with("hr") || unit == "h" {
            3600
        } else if unit.starts_with("min") || unit == "m" {
            60
        } else if unit.starts_with('s') {
            1
        } else {
            continue;
        };
        total += value * factor;
        matched = true;
    }
    if matched {
        Some(total)
    } else {
        None
    }
}
