use chrono::{DateTime, Duration, NaiveDateTime, Utc};
use url::Url;

pub mod brave;

pub use brave::BraveClient;

pub const UNKNOWN_SOURCE: &str = "Inconnu";

/// Host part of an article URL, if it parses.
pub fn hostname(url: &str) -> Option<String> {
    Url::parse(url)
        .ok()
        .and_then(|u| u.host_str().map(str::to_string))
        .filter(|h| !h.is_empty())
}

/// Best-effort conversion of a provider date into a UTC timestamp.
///
/// Accepts RFC 3339, naive ISO datetimes (taken as UTC), RFC 2822 and
/// relative ages such as `"3 hours ago"`. Anything else falls back to `now`,
/// so a stored article always has a valid publish date.
pub fn parse_published_at(raw: &str, now: DateTime<Utc>) -> DateTime<Utc> {
    let raw = raw.trim();
    if raw.is_empty() {
        return now;
    }

    if let Ok(ts) = DateTime::parse_from_rfc3339(raw) {
        return ts.with_timezone(&Utc);
    }
    for format in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"] {
        if let Ok(ts) = NaiveDateTime::parse_from_str(raw, format) {
            return ts.and_utc();
        }
    }
    if let Ok(ts) = DateTime::parse_from_rfc2822(raw) {
        return ts.with_timezone(&Utc);
    }

    parse_relative_age(raw)
        .and_then(|age| now.checked_sub_signed(age))
        .unwrap_or(now)
}

fn parse_relative_age(raw: &str) -> Option<Duration> {
    let lower = raw.to_lowercase();
    let mut parts = lower.split_whitespace();
    let amount = match parts.next()? {
        "a" | "an" | "one" => 1,
        n => n.parse::<i64>().ok()?,
    };
    if !(0..=100_000).contains(&amount) {
        return None;
    }
    let unit = parts.next()?.trim_end_matches('s');
    if parts.next() != Some("ago") {
        return None;
    }

    match unit {
        "second" => Some(Duration::seconds(amount)),
        "minute" => Some(Duration::minutes(amount)),
        "hour" => Some(Duration::hours(amount)),
        "day" => Some(Duration::days(amount)),
        "week" => Some(Duration::weeks(amount)),
        "month" => Some(Duration::days(amount * 30)),
        "year" => Some(Duration::days(amount * 365)),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 5, 10, 12, 0, 0).unwrap()
    }

    #[test]
    fn test_parse_absolute_dates() {
        let expected = Utc.with_ymd_and_hms(2024, 5, 1, 8, 30, 0).unwrap();
        assert_eq!(parse_published_at("2024-05-01T08:30:00Z", now()), expected);
        assert_eq!(parse_published_at("2024-05-01T10:30:00+02:00", now()), expected);
        assert_eq!(parse_published_at("2024-05-01T08:30:00", now()), expected);
        assert_eq!(parse_published_at("Wed, 01 May 2024 08:30:00 +0000", now()), expected);
    }

    #[test]
    fn test_parse_relative_ages() {
        assert_eq!(parse_published_at("3 hours ago", now()), now() - Duration::hours(3));
        assert_eq!(parse_published_at("1 day ago", now()), now() - Duration::days(1));
        assert_eq!(parse_published_at("2 weeks ago", now()), now() - Duration::weeks(2));
        assert_eq!(parse_published_at("an hour ago", now()), now() - Duration::hours(1));
    }

    #[test]
    fn test_unparseable_dates_fall_back_to_now() {
        assert_eq!(parse_published_at("", now()), now());
        assert_eq!(parse_published_at("hier", now()), now());
        assert_eq!(parse_published_at("3 fortnights ago", now()), now());
    }

    #[test]
    fn test_hostname() {
        assert_eq!(hostname("https://www.lemonde.fr/economie/article"), Some("www.lemonde.fr".to_string()));
        assert_eq!(hostname("not a url"), None);
    }
}
