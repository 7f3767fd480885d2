use time::OffsetDateTime;
use time::macros::format_description;

/// The current time in the local offset, or UTC when the local offset cannot
/// be determined.
pub fn now() -> OffsetDateTime {
    OffsetDateTime::now_local().unwrap_or_else(|_| OffsetDateTime::now_utc())
}

/// Format a timestamp as a 24-hour `HH:MM` clock reading.
pub fn clock(datetime: OffsetDateTime) -> String {
    let format = format_description!("[hour]:[minute]");
    datetime
        .format(&format)
        .unwrap_or_else(|_| format!("{:02}:{:02}", datetime.hour(), datetime.minute()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::macros::datetime;

    #[test]
    fn clock_pads_fields() {
        assert_eq!(clock(datetime!(2024-03-01 09:05 UTC)), "09:05");
        assert_eq!(clock(datetime!(2024-03-01 23:59:59 UTC)), "23:59");
    }
}
