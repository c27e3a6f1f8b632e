use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::errors::AppError;
use crate::models::{BookedInterval, BookingRequest, Catalog, PersistedBooking, Service};
use crate::services::availability::{compute_available_slots, reconcile_selection};
use crate::services::conflict::{ConflictFlow, ConflictOutcome, ConflictState, Resolution};
use crate::services::debounce::Debouncer;
use crate::services::notify::BookingSummary;
use crate::services::repository::BookingRepository;
use crate::services::validation::validate_request;

/// A booking form in progress. Slots are recomputed whenever the date,
/// the home-service flag or the booked intervals change.
pub struct DraftSession {
    pub id: Uuid,
    pub service_id: String,
    pub request: BookingRequest,
    pub booked: Vec<BookedInterval>,
    pub slots: Vec<String>,
    pub conflict: ConflictFlow,
    pub submitting: bool,
    pub expires_at: DateTime<Utc>,
    lookup: Debouncer,
}

impl DraftSession {
    fn new(service_id: String, expires_at: DateTime<Utc>, lookup_delay: Duration) -> Self {
        Self {
            id: Uuid::new_v4(),
            service_id,
            request: BookingRequest::default(),
            booked: Vec::new(),
            slots: Vec::new(),
            conflict: ConflictFlow::default(),
            submitting: false,
            expires_at,
            lookup: Debouncer::new(lookup_delay),
        }
    }

    fn is_expired(&self, now: DateTime<Utc>) -> bool {
        self.expires_at <= now
    }
}

/// Field edits; absent fields are left alone, an empty `time` or
/// `address` clears it.
#[derive(Debug, Default, Deserialize)]
pub struct DraftPatch {
    pub name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub date: Option<NaiveDate>,
    pub time: Option<String>,
    pub is_home_service: Option<bool>,
    pub address: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct DraftView {
    pub id: Uuid,
    pub service_id: String,
    pub request: BookingRequest,
    pub duration_minutes: u32,
    pub total_price: u32,
    pub slots: Vec<String>,
    pub conflict: ConflictState,
    pub lookup_pending: bool,
    pub submitting: bool,
    pub expires_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct SubmittedDraft {
    pub booking: PersistedBooking,
    pub summary: BookingSummary,
}

pub struct DraftStore {
    sessions: Mutex<HashMap<Uuid, DraftSession>>,
    repo: BookingRepository,
    catalog: Arc<Catalog>,
    ttl: chrono::Duration,
    lookup_delay: Duration,
}

impl DraftStore {
    pub fn new(
        repo: BookingRepository,
        catalog: Arc<Catalog>,
        ttl_minutes: i64,
        lookup_delay: Duration,
    ) -> Self {
        Self {
            sessions: Mutex::new(HashMap::new()),
            repo,
            catalog,
            ttl: chrono::Duration::minutes(ttl_minutes),
            lookup_delay,
        }
    }

    fn sessions(&self) -> MutexGuard<'_, HashMap<Uuid, DraftSession>> {
        self.sessions.lock().unwrap_or_else(|e| e.into_inner())
    }

    fn expiry(&self) -> DateTime<Utc> {
        Utc::now() + self.ttl
    }

    pub fn create(&self, service_id: &str) -> Result<DraftView, AppError> {
        let service = self
            .catalog
            .service(service_id)
            .ok_or_else(|| AppError::NotFound(format!("service {service_id}")))?;

        let mut sessions = self.sessions();
        let now = Utc::now();
        let before = sessions.len();
        sessions.retain(|_, s| !s.is_expired(now));
        if sessions.len() != before {
            tracing::debug!(purged = before - sessions.len(), "expired drafts purged");
        }

        let session = DraftSession::new(service.id.clone(), self.expiry(), self.lookup_delay);
        let view = self.view(&session)?;
        sessions.insert(session.id, session);

        tracing::info!(draft = %view.id, service = service_id, "draft created");
        Ok(view)
    }

    pub fn get(&self, id: Uuid) -> Result<DraftView, AppError> {
        let sessions = self.sessions();
        self.view(live(&sessions, id)?)
    }

    pub async fn patch(
        self: &Arc<Self>,
        id: Uuid,
        patch: DraftPatch,
    ) -> Result<DraftView, AppError> {
        let reload = {
            let mut sessions = self.sessions();
            let session = live_mut(&mut sessions, id)?;
            if session.submitting {
                return Err(AppError::Busy);
            }

            let request = &mut session.request;
            let mut identity_changed = false;
            if let Some(name) = patch.name {
                identity_changed |= request.name != name;
                request.name = name;
            }
            if let Some(phone) = patch.phone {
                identity_changed |= request.phone != phone;
                request.phone = phone;
            }
            if let Some(email) = patch.email {
                request.email = email;
            }
            if let Some(address) = patch.address {
                request.address = Some(address).filter(|a| !a.trim().is_empty());
            }

            let mut reload = false;
            if let Some(date) = patch.date {
                reload |= request.date != Some(date);
                request.date = Some(date);
            }
            if let Some(home) = patch.is_home_service {
                reload |= request.is_home_service != home;
                request.is_home_service = home;
            }

            session.expires_at = self.expiry();
            if identity_changed {
                self.schedule_lookup(session);
            }
            reload
        };

        if reload {
            self.refresh(id).await?;
        }
        if let Some(time) = patch.time {
            self.select_time(id, &time)?;
        }
        self.get(id)
    }

    pub async fn resolve(
        &self,
        id: Uuid,
        choice: Resolution,
    ) -> Result<(DraftView, ConflictOutcome), AppError> {
        let outcome = {
            let mut sessions = self.sessions();
            let session = live_mut(&mut sessions, id)?;
            let outcome = session
                .conflict
                .resolve(choice, &self.repo, &mut session.request)?;
            if choice == Resolution::Keep {
                session.lookup.cancel();
            }
            outcome
        };

        tracing::info!(draft = %id, ?choice, "existing booking conflict resolved");

        // A removed booking may free slots on the selected date
        if choice == Resolution::Replace {
            self.refresh(id).await?;
        }
        Ok((self.get(id)?, outcome))
    }

    /// Validates, re-checks the selected time against fresh data and saves.
    /// The draft is discarded on success; on failure it stays editable.
    pub async fn submit(&self, id: Uuid, today: NaiveDate) -> Result<SubmittedDraft, AppError> {
        {
            let mut sessions = self.sessions();
            let session = live_mut(&mut sessions, id)?;
            if session.submitting {
                return Err(AppError::Busy);
            }
            if session.conflict.is_detected() {
                return Err(AppError::Conflict(
                    "resolve the existing booking first".to_string(),
                ));
            }
            let errors = validate_request(&session.request, today);
            if !errors.is_empty() {
                return Err(AppError::Validation(errors));
            }
            session.submitting = true;
        }

        match self.commit(id).await {
            Ok(submitted) => {
                self.sessions().remove(&id);
                tracing::info!(draft = %id, booking = %submitted.booking.id, "draft submitted");
                Ok(submitted)
            }
            Err(e) => {
                if let Some(session) = self.sessions().get_mut(&id) {
                    session.submitting = false;
                }
                Err(e)
            }
        }
    }

    async fn commit(&self, id: Uuid) -> Result<SubmittedDraft, AppError> {
        self.refresh(id).await?;

        let (request, service) = {
            let sessions = self.sessions();
            let session = live(&sessions, id)?;
            if session.request.time.is_none() {
                return Err(AppError::field(
                    "time",
                    "that time is no longer available, pick another",
                ));
            }
            (session.request.clone(), self.service_for(session)?.clone())
        };

        let addon = &self.catalog.home_service;
        let duration = service.duration_for(addon, request.is_home_service);
        let booking = self.repo.save_booking(&request, duration).await?;

        let summary = BookingSummary {
            name: booking.name.clone(),
            phone: booking.phone.clone(),
            service_name: service.name.clone(),
            is_home_service: booking.is_home_service,
            date: booking.date,
            time: booking.time.clone(),
            duration_minutes: duration,
            address: booking.address.clone(),
            total_price: service.price_for(addon, booking.is_home_service),
        };
        Ok(SubmittedDraft { booking, summary })
    }

    /// Reloads the booked intervals for the draft's date and recomputes its
    /// slots. Results for a date the draft has since moved away from are
    /// dropped.
    async fn refresh(&self, id: Uuid) -> Result<(), AppError> {
        let date = {
            let sessions = self.sessions();
            live(&sessions, id)?.request.date
        };
        let Some(date) = date else {
            return Ok(());
        };

        let booked = self.repo.load_booked_intervals(date).await?;

        let mut sessions = self.sessions();
        let session = live_mut(&mut sessions, id)?;
        if session.request.date != Some(date) {
            tracing::debug!(draft = %id, %date, "discarding intervals for stale date");
            return Ok(());
        }
        session.booked = booked;
        self.recompute(session)
    }

    fn recompute(&self, session: &mut DraftSession) -> Result<(), AppError> {
        let duration = self.duration_for(session)?;
        session.slots = compute_available_slots(&session.booked, duration);
        session.request.time =
            reconcile_selection(&session.slots, session.request.time.as_deref());
        Ok(())
    }

    fn select_time(&self, id: Uuid, time: &str) -> Result<(), AppError> {
        let mut sessions = self.sessions();
        let session = live_mut(&mut sessions, id)?;
        let time = time.trim();
        if time.is_empty() {
            session.request.time = None;
            return Ok(());
        }
        if !session.slots.iter().any(|s| s == time) {
            return Err(AppError::field("time", format!("{time} is not available")));
        }
        session.request.time = Some(time.to_string());
        Ok(())
    }

    fn schedule_lookup(self: &Arc<Self>, session: &mut DraftSession) {
        let store = Arc::clone(self);
        let id = session.id;
        session.lookup.schedule(async move { store.run_lookup(id) });
    }

    fn run_lookup(&self, id: Uuid) {
        let mut sessions = self.sessions();
        let Some(session) = sessions.get_mut(&id) else {
            return;
        };

        match self
            .repo
            .find_existing_booking(&session.request.name, &session.request.phone)
        {
            Ok(found) => {
                if let Some(prior) = &found {
                    tracing::info!(draft = %id, prior = %prior.id, "existing booking detected");
                }
                session.conflict.observe(found);
            }
            Err(e) => tracing::warn!(draft = %id, error = %e, "existing booking lookup failed"),
        }
    }

    fn service_for(&self, session: &DraftSession) -> Result<&Service, AppError> {
        self.catalog
            .service(&session.service_id)
            .ok_or_else(|| AppError::NotFound(format!("service {}", session.service_id)))
    }

    fn duration_for(&self, session: &DraftSession) -> Result<u32, AppError> {
        let service = self.service_for(session)?;
        Ok(service.duration_for(&self.catalog.home_service, session.request.is_home_service))
    }

    fn view(&self, session: &DraftSession) -> Result<DraftView, AppError> {
        let service = self.service_for(session)?;
        let addon = &self.catalog.home_service;
        let home = session.request.is_home_service;
        Ok(DraftView {
            id: session.id,
            service_id: session.service_id.clone(),
            request: session.request.clone(),
            duration_minutes: service.duration_for(addon, home),
            total_price: service.price_for(addon, home),
            slots: session.slots.clone(),
            conflict: session.conflict.state().clone(),
            lookup_pending: session.lookup.is_pending(),
            submitting: session.submitting,
            expires_at: session.expires_at,
        })
    }
}

fn live(sessions: &HashMap<Uuid, DraftSession>, id: Uuid) -> Result<&DraftSession, AppError> {
    sessions
        .get(&id)
        .filter(|s| !s.is_expired(Utc::now()))
        .ok_or_else(|| AppError::NotFound(format!("draft {id}")))
}

fn live_mut(
    sessions: &mut HashMap<Uuid, DraftSession>,
    id: Uuid,
) -> Result<&mut DraftSession, AppError> {
    sessions
        .get_mut(&id)
        .filter(|s| !s.is_expired(Utc::now()))
        .ok_or_else(|| AppError::NotFound(format!("draft {id}")))
}
