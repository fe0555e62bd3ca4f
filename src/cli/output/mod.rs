pub mod chart;
pub mod table;

use ansi_term::Colour;
use chrono::Duration;

pub fn format_duration(v: Duration) -> String {
    if v.num_hours() > 0 {
        format!(
            "{}h{}m{}s",
            v.num_hours(),
            v.num_minutes() % 60,
            v.num_seconds() % 60
        )
    } else if v.num_minutes() > 0 {
        format!("{}m{}s", v.num_minutes() % 60, v.num_seconds() % 60)
    } else {
        format!("{}s", v.num_seconds() % 60)
    }
}

pub fn format_seconds(seconds: u64) -> String {
    format_duration(Duration::seconds(seconds as i64))
}

/// Parses `#rgb` and `#rrggbb` colors. Anything else is drawn in the terminal's default color.
pub fn parse_hex_color(value: &str) -> Option<Colour> {
    let hex = value.strip_prefix('#')?;
    let channel = |range: std::ops::Range<usize>, scale: u8| {
        hex.get(range)
            .and_then(|v| u8::from_str_radix(v, 16).ok())
            .map(|v| v * scale)
    };
    match hex.len() {
        3 => Some(Colour::RGB(
            channel(0..1, 17)?,
            channel(1..2, 17)?,
            channel(2..3, 17)?,
        )),
        6 => Some(Colour::RGB(
            channel(0..2, 1)?,
            channel(2..4, 1)?,
            channel(4..6, 1)?,
        )),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use ansi_term::Colour;
    use chrono::Duration;

    use super::{format_duration, parse_hex_color};

    #[test]
    fn hex_colors() {
        assert_eq!(parse_hex_color("#ff8000"), Some(Colour::RGB(255, 128, 0)));
        assert_eq!(parse_hex_color("#f80"), Some(Colour::RGB(255, 136, 0)));
        assert_eq!(parse_hex_color("ff8000"), None);
        assert_eq!(parse_hex_color("#ff80"), None);
        assert_eq!(parse_hex_color("#gg0000"), None);
    }

    #[test]
    fn durations() {
        assert_eq!(format_duration(Duration::seconds(45)), "45s");
        assert_eq!(format_duration(Duration::seconds(600)), "10m0s");
        assert_eq!(format_duration(Duration::seconds(3725)), "1h2m5s");
    }
}
