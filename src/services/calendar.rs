use chrono::{Duration, NaiveDateTime};

use crate::models::availability::parse_time;
use crate::models::PersistedBooking;

pub fn generate_ics(booking: &PersistedBooking, business_name: &str) -> anyhow::Result<String> {
    let minutes = parse_time(&booking.time)?;
    let start: NaiveDateTime = booking
        .date
        .and_hms_opt(minutes / 60, minutes % 60, 0)
        .ok_or_else(|| anyhow::anyhow!("invalid booking time: {}", booking.time))?;
    let end = start + Duration::minutes(booking.effective_duration() as i64);

    let dtstart = start.format("%Y%m%dT%H%M%S").to_string();
    let dtend = end.format("%Y%m%dT%H%M%S").to_string();
    let dtstamp = booking.created_at.format("%Y%m%dT%H%M%SZ").to_string();
    let uid = format!("{}@salonbook", booking.id);

    let summary = format!("Appointment with {business_name}");
    let location = if booking.is_home_service {
        booking.address.as_deref().unwrap_or("Home service")
    } else {
        business_name
    };

    Ok(format!(
        "BEGIN:VCALENDAR\r\n\
         VERSION:2.0\r\n\
         PRODID:-//Salonbook//Booking//EN\r\n\
         BEGIN:VEVENT\r\n\
         UID:{uid}\r\n\
         DTSTAMP:{dtstamp}\r\n\
         DTSTART:{dtstart}\r\n\
         DTEND:{dtend}\r\n\
         SUMMARY:{summary}\r\n\
         LOCATION:{location}\r\n\
         END:VEVENT\r\n\
         END:VCALENDAR\r\n"
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{NaiveDate, TimeZone, Utc};

    fn booking(is_home_service: bool, duration_minutes: Option<u32>) -> PersistedBooking {
        PersistedBooking {
            id: "test-123".to_string(),
            name: "Alice".to_string(),
            email: "alice@example.com".to_string(),
            phone: "+56911111111".to_string(),
            date: NaiveDate::from_ymd_opt(2025, 3, 15).unwrap(),
            time: "14:00".to_string(),
            is_home_service,
            address: Some("Los Leones 45".to_string()),
            duration_minutes,
            created_at: Utc.with_ymd_and_hms(2025, 3, 10, 10, 0, 0).unwrap(),
        }
    }

    #[test]
    fn test_generate_ics() {
        let ics = generate_ics(&booking(false, Some(90)), "Studio Vale").unwrap();
        assert!(ics.contains("BEGIN:VCALENDAR"));
        assert!(ics.contains("DTSTART:20250315T140000"));
        assert!(ics.contains("DTEND:20250315T153000"));
        assert!(ics.contains("DTSTAMP:20250310T100000Z"));
        assert!(ics.contains("SUMMARY:Appointment with Studio Vale"));
        assert!(ics.contains("LOCATION:Studio Vale"));
        assert!(ics.contains("UID:test-123@salonbook"));
        assert!(ics.contains("END:VCALENDAR"));
    }

    #[test]
    fn test_generate_ics_home_service_legacy_duration() {
        let ics = generate_ics(&booking(true, None), "Studio Vale").unwrap();
        assert!(ics.contains("DTEND:20250315T150000"));
        assert!(ics.contains("LOCATION:Los Leones 45"));
    }

    #[test]
    fn test_generate_ics_bad_time() {
        let mut b = booking(false, Some(60));
        b.time = "later".to_string();
        assert!(generate_ics(&b, "Studio").is_err());
    }
}
