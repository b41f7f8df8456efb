//! Parsing helpers shared by the instrument descriptors.
use crate::astrodata::{Date, DateTime, Section, Time};
use regex::Regex;
use std::sync::LazyLock;

static COMPONENT_ID: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(?P<name>.*?)_G").expect("Failed to compile component ID regex"));

static PERCENTILE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(\d\d)-percentile$").expect("Failed to compile percentile regex"));

static DATE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(\d{4})-(\d{1,2})-(\d{1,2})$").expect("Failed to compile date regex")
});

static TIME: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(\d{1,2}):(\d{1,2}):(\d{1,2})(?:\.(\d*))?$").expect("Failed to compile time regex")
});

/// Strip the Gemini component ID from a component name, e.g. `g_G0301` → `g`.
pub fn remove_component_id(name: &str) -> &str {
    COMPONENT_ID
        .captures(name)
        .and_then(|c| c.name("name"))
        .map_or(name, |m| m.as_str())
}

/// The percentile of a sky condition band: `Any` is 100, `70-percentile` is 70.
pub fn parse_percentile(band: &str) -> Option<i64> {
    if band == "Any" {
        return Some(100);
    }
    PERCENTILE
        .captures(band)
        .and_then(|c| c[1].parse().ok())
}

/// Length units of wavelengths and dispersions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Unit {
    /// m
    Meters,
    /// µm, the unit of most near-infrared keywords
    Micrometers,
    /// nm
    Nanometers,
    /// Å
    Angstroms,
}

impl Unit {
    fn power_of_ten(self) -> i32 {
        match self {
            Unit::Meters => 0,
            Unit::Micrometers => -6,
            Unit::Nanometers => -9,
            Unit::Angstroms => -10,
        }
    }
}

/// Convert `value` from unit `from` to unit `to`.
pub fn convert_units(from: Unit, value: f64, to: Unit) -> f64 {
    let power = from.power_of_ten() - to.power_of_ten();
    value * 10f64.powi(power)
}

/// Turn an IRAF section `[x1:x2,y1:y2]` (1-based, inclusive) into a 0-based,
/// end-exclusive [`Section`].
pub fn section_to_tuple(section: &str) -> Option<Section> {
    let inner = section.trim_matches(|c| c == '[' || c == ']');
    let (x, y) = inner.split_once(',')?;
    let (x1, x2) = parse_range(x)?;
    let (y1, y2) = parse_range(y)?;
    Some(Section {
        x1: x1.checked_sub(1)?,
        x2,
        y1: y1.checked_sub(1)?,
        y2,
    })
}

fn parse_range(range: &str) -> Option<(i64, i64)> {
    let (start, end) = range.split_once(':')?;
    Some((start.trim().parse().ok()?, end.trim().parse().ok()?))
}

/// Parse `YYYY-MM-DD`.
pub fn parse_date(text: &str) -> Option<Date> {
    let c = DATE.captures(text.trim())?;
    Date::new(c[1].parse().ok()?, c[2].parse().ok()?, c[3].parse().ok()?)
}

/// Parse `HH:MM:SS` with an optional fraction of a second.
pub fn parse_time(text: &str) -> Option<Time> {
    let c = TIME.captures(text.trim())?;
    let microsecond = match c.get(4) {
        Some(fraction) => fraction_to_microseconds(fraction.as_str())?,
        None => 0,
    };
    Time::new(
        c[1].parse().ok()?,
        c[2].parse().ok()?,
        c[3].parse().ok()?,
        microsecond,
    )
}

// Digits beyond the sixth are truncated.
fn fraction_to_microseconds(digits: &str) -> Option<u32> {
    if digits.is_empty() {
        return Some(0);
    }
    let padded: String = digits.chars().chain("000000".chars()).take(6).collect();
    padded.parse().ok()
}

/// Parse a date and a time separated by `T` or a space.
pub fn parse_datetime(text: &str) -> Option<DateTime> {
    let text = text.trim();
    let (date, time) = text.split_once(['T', ' '])?;
    Some(DateTime::new(parse_date(date)?, parse_time(time)?))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn component_ids_are_removed() {
        assert_eq!(remove_component_id("g_G0301"), "g");
        assert_eq!(remove_component_id("B600_G5307"), "B600");
        assert_eq!(remove_component_id("open2-8"), "open2-8");
        assert_eq!(remove_component_id("K_G0802_x"), "K");
    }

    #[test]
    fn percentiles() {
        assert_eq!(parse_percentile("Any"), Some(100));
        assert_eq!(parse_percentile("70-percentile"), Some(70));
        assert_eq!(parse_percentile("IQ70"), None);
    }

    #[test]
    fn units_are_powers_of_ten_apart() {
        assert!((convert_units(Unit::Nanometers, 475.0, Unit::Meters) - 4.75e-7).abs() < 1e-20);
        assert!((convert_units(Unit::Micrometers, 2.2, Unit::Nanometers) - 2200.0).abs() < 1e-9);
        assert!((convert_units(Unit::Meters, 1.0, Unit::Angstroms) - 1e10).abs() < 1e-3);
    }

    #[test]
    fn sections_become_zero_based() {
        assert_eq!(
            section_to_tuple("[1:2048,1:4608]"),
            Some(Section {
                x1: 0,
                x2: 2048,
                y1: 0,
                y2: 4608
            })
        );
        assert_eq!(
            section_to_tuple("[ 33 : 544 , 1 : 2304 ]").map(|s| s.x1),
            Some(32)
        );
        assert_eq!(section_to_tuple("[1:2048]"), None);
        assert_eq!(section_to_tuple(&format!("[{}:1,1:1]", i64::MIN)), None);
        assert_eq!(section_to_tuple("whole"), None);
    }

    #[test]
    fn dates_and_times() {
        assert_eq!(parse_date("2017-01-01").unwrap().to_string(), "2017-01-01");
        assert!(parse_date("2017-13-01").is_none());
        assert_eq!(parse_time("5:03:07").unwrap().to_string(), "05:03:07");
        assert_eq!(
            parse_time("10:20:30.5").unwrap().to_string(),
            "10:20:30.500000"
        );
        assert_eq!(
            parse_datetime("2017-01-01T10:20:30.123456789").unwrap().to_string(),
            "2017-01-01 10:20:30.123456"
        );
        assert!(parse_datetime("2017-01-01").is_none());
    }
}
