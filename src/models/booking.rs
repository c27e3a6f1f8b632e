use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use super::availability::BookedInterval;

/// Records cached before durations were stored are assumed to take an hour.
pub const LEGACY_DURATION_MINUTES: u32 = 60;

/// The booking form's draft. Mutated field by field until submitted.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BookingRequest {
    pub name: String,
    pub email: String,
    pub phone: String,
    pub date: Option<NaiveDate>,
    pub time: Option<String>,
    pub is_home_service: bool,
    pub address: Option<String>,
}

/// One confirmed booking as laid out in the local cache slot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PersistedBooking {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub email: String,
    pub phone: String,
    pub date: NaiveDate,
    pub time: String,
    #[serde(rename = "isHomeService", default)]
    pub is_home_service: bool,
    #[serde(default)]
    pub address: Option<String>,
    #[serde(default)]
    pub duration_minutes: Option<u32>,
    pub created_at: DateTime<Utc>,
}

impl PersistedBooking {
    pub fn effective_duration(&self) -> u32 {
        self.duration_minutes.unwrap_or(LEGACY_DURATION_MINUTES)
    }

    pub fn interval(&self) -> anyhow::Result<BookedInterval> {
        BookedInterval::from_time(&self.time, self.effective_duration())
    }

    /// Same client: phone equal ignoring whitespace, name equal ignoring case.
    pub fn matches_client(&self, name: &str, phone: &str) -> bool {
        normalize_phone(&self.phone) == normalize_phone(phone)
            && self.name.trim().to_lowercase() == name.trim().to_lowercase()
    }
}

pub fn normalize_phone(phone: &str) -> String {
    phone.chars().filter(|c| !c.is_whitespace()).collect()
}

/// Row shape returned by the remote bookings query.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RemoteBookedTime {
    pub time: String,
    #[serde(default)]
    pub duration_minutes: Option<u32>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Lead {
    pub phone: String,
    pub name: String,
    pub email: String,
    pub last_booking_date: NaiveDate,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RemoteBookingRow {
    pub name: String,
    pub email: String,
    pub phone: String,
    pub date: NaiveDate,
    pub time: String,
    pub is_home_service: bool,
    pub address: Option<String>,
    pub duration_minutes: u32,
}

impl From<&PersistedBooking> for RemoteBookingRow {
    fn from(b: &PersistedBooking) -> Self {
        Self {
            name: b.name.clone(),
            email: b.email.clone(),
            phone: b.phone.clone(),
            date: b.date,
            time: b.time.clone(),
            is_home_service: b.is_home_service,
            address: b.address.clone(),
            duration_minutes: b.effective_duration(),
        }
    }
}

impl From<&PersistedBooking> for Lead {
    fn from(b: &PersistedBooking) -> Self {
        Self {
            phone: b.phone.clone(),
            name: b.name.clone(),
            email: b.email.clone(),
            last_booking_date: b.date,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn booking(name: &str, phone: &str) -> PersistedBooking {
        PersistedBooking {
            id: "b-1".to_string(),
            name: name.to_string(),
            email: "maria@example.com".to_string(),
            phone: phone.to_string(),
            date: NaiveDate::from_ymd_opt(2025, 6, 16).unwrap(),
            time: "10:00".to_string(),
            is_home_service: false,
            address: None,
            duration_minutes: Some(90),
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_matches_client_ignores_case_and_spaces() {
        let b = booking("Maria Perez", "+56 9 1234 5678");
        assert!(b.matches_client("maria perez", "+56912345678"));
        assert!(b.matches_client("MARIA PEREZ ", "+569 1234 5678"));
        assert!(!b.matches_client("Maria Perez", "+56900000000"));
        assert!(!b.matches_client("Mario Perez", "+56912345678"));
    }

    #[test]
    fn test_normalize_phone_strips_whitespace_only() {
        assert_eq!(normalize_phone(" +56 9\t1234 5678 "), "+56912345678");
        assert_eq!(normalize_phone("+56-9-1234-5678"), "+56-9-1234-5678");
        let b = booking("Maria Perez", "+56912345678");
        assert!(!b.matches_client("Maria Perez", "+56-9-1234-5678"));
    }

    #[test]
    fn test_legacy_record_defaults_duration() {
        let json = r#"{"id":"x","name":"Ana","phone":"+569","date":"2025-06-16","time":"11:00","created_at":"2025-06-01T10:00:00Z"}"#;
        let b: PersistedBooking = serde_json::from_str(json).unwrap();
        assert_eq!(b.duration_minutes, None);
        assert_eq!(b.effective_duration(), 60);
        assert_eq!(b.interval().unwrap(), BookedInterval::new(660, 720));
        assert!(!b.is_home_service);
    }

    #[test]
    fn test_cache_layout_field_names() {
        let b = booking("Ana", "+569");
        let value = serde_json::to_value(&b).unwrap();
        assert_eq!(value["isHomeService"], false);
        assert_eq!(value["duration_minutes"], 90);
        assert_eq!(value["date"], "2025-06-16");
        assert!(value.get("created_at").is_some());
    }
}
