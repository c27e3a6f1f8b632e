pub mod rest;

use async_trait::async_trait;
use chrono::NaiveDate;

use crate::models::{Lead, RemoteBookedTime, RemoteBookingRow};

/// Shared bookings store. Best-effort: callers treat every error as
/// "remote unavailable" and carry on with local data.
#[async_trait]
pub trait RemoteStore: Send + Sync {
    async fn booked_times(&self, date: NaiveDate) -> anyhow::Result<Vec<RemoteBookedTime>>;
    async fn upsert_lead(&self, lead: &Lead) -> anyhow::Result<()>;
    async fn insert_booking(&self, row: &RemoteBookingRow) -> anyhow::Result<()>;
}
