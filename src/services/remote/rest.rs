use std::time::Duration;

use anyhow::Context;
use async_trait::async_trait;
use chrono::NaiveDate;

use super::RemoteStore;
use crate::models::{Lead, RemoteBookedTime, RemoteBookingRow};

/// PostgREST-style client: `bookings` and `leads` tables under `/rest/v1`.
pub struct RestRemoteStore {
    base_url: String,
    api_key: String,
    client: reqwest::Client,
}

impl RestRemoteStore {
    /// Every request, connect included, is bounded by `timeout` so a stalled
    /// store degrades to "unavailable" instead of hanging callers.
    pub fn new(base_url: String, api_key: String, timeout: Duration) -> anyhow::Result<Self> {
        let client = reqwest::Client::builder()
            .connect_timeout(timeout)
            .timeout(timeout)
            .build()
            .context("failed to build remote store client")?;

        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key,
            client,
        })
    }

    fn table_url(&self, table: &str) -> String {
        format!("{}/rest/v1/{table}", self.base_url)
    }

    fn request(&self, method: reqwest::Method, url: &str) -> reqwest::RequestBuilder {
        self.client
            .request(method, url)
            .header("apikey", &self.api_key)
            .bearer_auth(&self.api_key)
    }
}

#[async_trait]
impl RemoteStore for RestRemoteStore {
    async fn booked_times(&self, date: NaiveDate) -> anyhow::Result<Vec<RemoteBookedTime>> {
        let date_filter = format!("eq.{}", date.format("%Y-%m-%d"));
        let rows = self
            .request(reqwest::Method::GET, &self.table_url("bookings"))
            .query(&[("select", "time,duration_minutes"), ("date", date_filter.as_str())])
            .send()
            .await
            .context("failed to query remote bookings")?
            .error_for_status()
            .context("remote bookings query returned error")?
            .json::<Vec<RemoteBookedTime>>()
            .await
            .context("failed to parse remote bookings")?;

        Ok(rows)
    }

    async fn upsert_lead(&self, lead: &Lead) -> anyhow::Result<()> {
        self.request(reqwest::Method::POST, &self.table_url("leads"))
            .query(&[("on_conflict", "phone")])
            .header("Prefer", "resolution=merge-duplicates")
            .json(lead)
            .send()
            .await
            .context("failed to upsert lead")?
            .error_for_status()
            .context("remote lead upsert returned error")?;

        Ok(())
    }

    async fn insert_booking(&self, row: &RemoteBookingRow) -> anyhow::Result<()> {
        self.request(reqwest::Method::POST, &self.table_url("bookings"))
            .json(row)
            .send()
            .await
            .context("failed to insert remote booking")?
            .error_for_status()
            .context("remote booking insert returned error")?;

        Ok(())
    }
}
