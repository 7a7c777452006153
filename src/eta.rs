use chrono::{DateTime, NaiveDate, Utc};

const SECONDS_PER_DAY: i64 = 24 * 60 * 60;

pub fn estimated_return_text(estimated_return: Option<&str>) -> String {
    estimated_return_text_at(Utc::now(), estimated_return)
}

/// Human wording for how far away the announced return date is.
pub fn estimated_return_text_at(now: DateTime<Utc>, estimated_return: Option<&str>) -> String {
    let Some(return_at) = estimated_return.and_then(parse_return) else {
        return "Soon".to_string();
    };

    let seconds = (return_at - now).num_seconds();
    // Round partial days up.
    let days =
        seconds.div_euclid(SECONDS_PER_DAY) + i64::from(seconds.rem_euclid(SECONDS_PER_DAY) > 0);

    match days {
        d if d <= 0 => "Very Soon".to_string(),
        1 => "Tomorrow".to_string(),
        d => format!("In {d} days"),
    }
}

fn parse_return(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    if let Ok(parsed) = DateTime::parse_from_rfc3339(raw) {
        return Some(parsed.with_timezone(&Utc));
    }
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
}
