//! Display formatting for countdown values

/// Format a number of seconds as zero-padded `HH:MM:SS`
pub fn format_hms(total_seconds: u64) -> String {
    let hours = total_seconds / 3600;
    let minutes = (total_seconds % 3600) / 60;
    let seconds = total_seconds % 60;
    format!("{:02}:{:02}:{:02}", hours, minutes, seconds)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn formats_hours_minutes_seconds() {
        assert_eq!(format_hms(3661), "01:01:01");
        assert_eq!(format_hms(59), "00:00:59");
        assert_eq!(format_hms(0), "00:00:00");
    }

    #[test]
    fn formats_picker_maximum() {
        assert_eq!(format_hms(23 * 3600 + 59 * 60 + 59), "23:59:59");
    }

    #[test]
    fn hours_are_not_wrapped_past_a_day() {
        assert_eq!(format_hms(100 * 3600), "100:00:00");
    }
}
