use std::sync::Arc;

use chrono::{NaiveDate, Utc};

use crate::errors::AppError;
use crate::models::booking::LEGACY_DURATION_MINUTES;
use crate::models::{BookedInterval, BookingRequest, Lead, PersistedBooking, RemoteBookingRow};
use crate::services::cache::LocalCache;
use crate::services::remote::RemoteStore;

/// Merges the local cache and the optional remote store into one view of
/// the booked day. The local cache is the commit point for new bookings;
/// the remote store is written after it and never rolled back against it.
#[derive(Clone)]
pub struct BookingRepository {
    cache: Arc<dyn LocalCache>,
    remote: Option<Arc<dyn RemoteStore>>,
}

impl BookingRepository {
    pub fn new(cache: Arc<dyn LocalCache>, remote: Option<Arc<dyn RemoteStore>>) -> Self {
        Self { cache, remote }
    }

    /// Union of remote and local intervals for `date`. Bookings mirrored in
    /// both sources show up twice, which only makes availability stricter.
    pub async fn load_booked_intervals(
        &self,
        date: NaiveDate,
    ) -> Result<Vec<BookedInterval>, AppError> {
        let mut intervals = self.remote_intervals(date).await;

        let local = self.cache.load().map_err(|e| {
            tracing::error!(error = %e, "failed to load local bookings");
            AppError::Cache(e)
        })?;

        for booking in local.iter().filter(|b| b.date == date) {
            match booking.interval() {
                Ok(interval) => intervals.push(interval),
                Err(e) => {
                    tracing::warn!(id = %booking.id, error = %e, "skipping cached booking with bad time")
                }
            }
        }

        Ok(intervals)
    }

    async fn remote_intervals(&self, date: NaiveDate) -> Vec<BookedInterval> {
        let Some(remote) = &self.remote else {
            return Vec::new();
        };

        match remote.booked_times(date).await {
            Ok(rows) => rows
                .iter()
                .filter_map(|row| {
                    let duration = row.duration_minutes.unwrap_or(LEGACY_DURATION_MINUTES);
                    BookedInterval::from_time(&row.time, duration)
                        .map_err(|e| tracing::warn!(error = %e, "skipping remote row with bad time"))
                        .ok()
                })
                .collect(),
            Err(e) => {
                tracing::warn!(%date, error = %e, "remote store unavailable, using local bookings only");
                Vec::new()
            }
        }
    }

    /// Writes the booking to the local cache, then mirrors it remotely on a
    /// best-effort basis. Only a local failure is reported.
    pub async fn save_booking(
        &self,
        request: &BookingRequest,
        duration_minutes: u32,
    ) -> Result<PersistedBooking, AppError> {
        let date = request
            .date
            .ok_or_else(|| AppError::field("date", "date is required"))?;
        let time = request
            .time
            .clone()
            .ok_or_else(|| AppError::field("time", "time is required"))?;

        let booking = PersistedBooking {
            id: uuid::Uuid::new_v4().to_string(),
            name: request.name.trim().to_string(),
            email: request.email.trim().to_string(),
            phone: request.phone.trim().to_string(),
            date,
            time,
            is_home_service: request.is_home_service,
            address: request
                .address
                .as_ref()
                .map(|a| a.trim().to_string())
                .filter(|a| request.is_home_service && !a.is_empty()),
            duration_minutes: Some(duration_minutes),
            created_at: Utc::now(),
        };

        self.cache.append(&booking).map_err(|e| {
            tracing::error!(error = %e, "failed to write booking to local cache");
            AppError::Cache(e)
        })?;

        tracing::info!(id = %booking.id, date = %booking.date, time = %booking.time, "booking saved locally");

        self.mirror_remote(&booking).await;

        Ok(booking)
    }

    async fn mirror_remote(&self, booking: &PersistedBooking) {
        let Some(remote) = &self.remote else {
            return;
        };

        if let Err(e) = remote.upsert_lead(&Lead::from(booking)).await {
            tracing::warn!(id = %booking.id, error = %e, "failed to upsert lead remotely");
        }

        if let Err(e) = remote.insert_booking(&RemoteBookingRow::from(booking)).await {
            tracing::warn!(id = %booking.id, error = %e, "failed to insert booking remotely");
        }
    }

    /// First cached booking for the same client. Local cache only.
    pub fn find_existing_booking(
        &self,
        name: &str,
        phone: &str,
    ) -> Result<Option<PersistedBooking>, AppError> {
        if name.trim().is_empty() || phone.trim().is_empty() {
            return Ok(None);
        }

        let local = self.cache.load()?;
        Ok(local.into_iter().find(|b| b.matches_client(name, phone)))
    }

    pub fn find_by_id(&self, id: &str) -> Result<Option<PersistedBooking>, AppError> {
        let local = self.cache.load()?;
        Ok(local.into_iter().find(|b| b.id == id))
    }

    /// Removes the booking from the local cache. Remote rows are left in
    /// place and keep blocking their slot.
    pub fn delete_booking(&self, id: &str) -> Result<bool, AppError> {
        let removed = self.cache.remove(id)?;
        if removed {
            tracing::info!(id, "booking deleted from local cache");
        }
        Ok(removed)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use async_trait::async_trait;

    use super::*;
    use crate::models::RemoteBookedTime;
    use crate::services::cache::MemoryCache;

    #[derive(Default)]
    struct FakeRemote {
        times: Vec<RemoteBookedTime>,
        fail: bool,
        leads: Mutex<Vec<Lead>>,
        rows: Mutex<Vec<RemoteBookingRow>>,
    }

    #[async_trait]
    impl RemoteStore for FakeRemote {
        async fn booked_times(&self, _date: NaiveDate) -> anyhow::Result<Vec<RemoteBookedTime>> {
            if self.fail {
                anyhow::bail!("connection refused");
            }
            Ok(self.times.clone())
        }

        async fn upsert_lead(&self, lead: &Lead) -> anyhow::Result<()> {
            if self.fail {
                anyhow::bail!("connection refused");
            }
            self.leads.lock().unwrap().push(lead.clone());
            Ok(())
        }

        async fn insert_booking(&self, row: &RemoteBookingRow) -> anyhow::Result<()> {
            if self.fail {
                anyhow::bail!("connection refused");
            }
            self.rows.lock().unwrap().push(row.clone());
            Ok(())
        }
    }

    fn date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 6, 16).unwrap()
    }

    fn request(name: &str, phone: &str, time: &str) -> BookingRequest {
        BookingRequest {
            name: name.to_string(),
            email: "maria@example.com".to_string(),
            phone: phone.to_string(),
            date: Some(date()),
            time: Some(time.to_string()),
            is_home_service: false,
            address: None,
        }
    }

    fn repo_with(remote: Option<Arc<FakeRemote>>) -> BookingRepository {
        let remote = remote.map(|r| r as Arc<dyn RemoteStore>);
        BookingRepository::new(Arc::new(MemoryCache::new()), remote)
    }

    #[tokio::test]
    async fn test_merges_remote_and_local_intervals() {
        let remote = FakeRemote {
            times: vec![
                RemoteBookedTime {
                    time: "09:00:00".to_string(),
                    duration_minutes: Some(90),
                },
                RemoteBookedTime {
                    time: "15:00".to_string(),
                    duration_minutes: None,
                },
            ],
            ..Default::default()
        };
        let repo = repo_with(Some(Arc::new(remote)));
        repo.save_booking(&request("Ana", "+56911111111", "12:00"), 45)
            .await
            .unwrap();

        let intervals = repo.load_booked_intervals(date()).await.unwrap();
        assert_eq!(
            intervals,
            vec![
                BookedInterval::new(540, 630),
                BookedInterval::new(900, 960),
                BookedInterval::new(720, 765),
            ]
        );
    }

    #[tokio::test]
    async fn test_oversized_remote_duration_blocks_rest_of_day() {
        let remote = FakeRemote {
            times: vec![RemoteBookedTime {
                time: "10:00".to_string(),
                duration_minutes: Some(u32::MAX),
            }],
            ..Default::default()
        };
        let repo = repo_with(Some(Arc::new(remote)));

        let intervals = repo.load_booked_intervals(date()).await.unwrap();
        assert_eq!(intervals, vec![BookedInterval::new(600, u32::MAX)]);

        let slots = crate::services::availability::compute_available_slots(&intervals, 60);
        assert_eq!(slots, vec!["09:00".to_string()]);
    }

    #[tokio::test]
    async fn test_local_bookings_on_other_dates_ignored() {
        let repo = repo_with(None);
        let mut other = request("Ana", "+56911111111", "10:00");
        other.date = NaiveDate::from_ymd_opt(2025, 6, 17);
        repo.save_booking(&other, 60).await.unwrap();

        assert!(repo.load_booked_intervals(date()).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_remote_failure_falls_back_to_local() {
        let remote = FakeRemote {
            fail: true,
            ..Default::default()
        };
        let repo = repo_with(Some(Arc::new(remote)));

        let saved = repo
            .save_booking(&request("Maria Perez", "+56912345678", "10:00"), 60)
            .await
            .unwrap();

        let found = repo
            .find_existing_booking("Maria Perez", "+56912345678")
            .unwrap();
        assert_eq!(found.map(|b| b.id), Some(saved.id));

        let intervals = repo.load_booked_intervals(date()).await.unwrap();
        assert_eq!(intervals, vec![BookedInterval::new(600, 660)]);
    }

    #[tokio::test]
    async fn test_save_mirrors_lead_and_row() {
        let remote = Arc::new(FakeRemote::default());
        let repo = repo_with(Some(remote.clone()));
        let mut req = request("Ana", "+56911111111", "10:00");
        req.is_home_service = true;
        req.address = Some("  Av. Providencia 123 ".to_string());

        let saved = repo.save_booking(&req, 90).await.unwrap();
        assert_eq!(saved.address.as_deref(), Some("Av. Providencia 123"));
        assert_eq!(saved.duration_minutes, Some(90));

        let leads = remote.leads.lock().unwrap();
        assert_eq!(leads.len(), 1);
        assert_eq!(leads[0].phone, "+56911111111");
        assert_eq!(leads[0].last_booking_date, date());

        let rows = remote.rows.lock().unwrap();
        assert_eq!(rows.len(), 1);
        assert!(rows[0].is_home_service);
        assert_eq!(rows[0].duration_minutes, 90);
    }

    #[tokio::test]
    async fn test_address_dropped_without_home_service() {
        let repo = repo_with(None);
        let mut req = request("Ana", "+56911111111", "10:00");
        req.address = Some("Somewhere 1".to_string());
        let saved = repo.save_booking(&req, 60).await.unwrap();
        assert_eq!(saved.address, None);
    }

    #[tokio::test]
    async fn test_find_existing_booking() {
        let repo = repo_with(None);
        let saved = repo
            .save_booking(&request("Maria Perez", "+569 1234 5678", "10:00"), 60)
            .await
            .unwrap();

        let found = repo
            .find_existing_booking("maria perez", "+56912345678")
            .unwrap();
        assert_eq!(found.map(|b| b.id), Some(saved.id));

        assert!(repo
            .find_existing_booking("Maria Perez", "+56999999999")
            .unwrap()
            .is_none());
        assert!(repo.find_existing_booking("", "+56912345678").unwrap().is_none());
    }

    #[tokio::test]
    async fn test_load_is_idempotent() {
        let repo = repo_with(None);
        repo.save_booking(&request("Ana", "+56911111111", "10:00"), 60)
            .await
            .unwrap();

        let first = repo.load_booked_intervals(date()).await.unwrap();
        let second = repo.load_booked_intervals(date()).await.unwrap();
        assert_eq!(first, second);
    }

    #[tokio::test]
    async fn test_delete_booking_is_local_only() {
        let remote = Arc::new(FakeRemote::default());
        let repo = repo_with(Some(remote.clone()));
        let saved = repo
            .save_booking(&request("Ana", "+56911111111", "10:00"), 60)
            .await
            .unwrap();

        assert!(repo.delete_booking(&saved.id).unwrap());
        assert!(!repo.delete_booking(&saved.id).unwrap());
        assert!(repo.find_by_id(&saved.id).unwrap().is_none());
        assert_eq!(remote.rows.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_save_requires_date_and_time() {
        let repo = repo_with(None);
        let mut req = request("Ana", "+56911111111", "10:00");
        req.time = None;
        assert!(matches!(
            repo.save_booking(&req, 60).await,
            Err(AppError::Validation(_))
        ));
    }
}
