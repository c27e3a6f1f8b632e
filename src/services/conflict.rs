use serde::{Deserialize, Serialize};

use crate::errors::AppError;
use crate::models::{BookingRequest, PersistedBooking};
use crate::services::repository::BookingRepository;

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum ConflictState {
    #[default]
    Idle,
    Detected { prior: PersistedBooking },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Resolution {
    Replace,
    Keep,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum ConflictOutcome {
    Replaced { removed: PersistedBooking },
    Kept { kept: PersistedBooking },
}

impl ConflictOutcome {
    pub fn message(&self) -> String {
        match self {
            ConflictOutcome::Replaced { removed } => format!(
                "Your previous appointment on {} at {} was cancelled. Pick your new time.",
                removed.date.format("%d-%m-%Y"),
                removed.time
            ),
            ConflictOutcome::Kept { kept } => format!(
                "Your appointment on {} at {} is still booked.",
                kept.date.format("%d-%m-%Y"),
                kept.time
            ),
        }
    }
}

/// Returning-client detection: `Idle -> Detected -> Idle`, where leaving
/// `Detected` always goes through [`ConflictFlow::resolve`].
#[derive(Debug, Default)]
pub struct ConflictFlow {
    state: ConflictState,
}

impl ConflictFlow {
    pub fn state(&self) -> &ConflictState {
        &self.state
    }

    pub fn is_detected(&self) -> bool {
        matches!(self.state, ConflictState::Detected { .. })
    }

    /// Feeds the result of an existing-booking lookup. Only an `Idle` flow
    /// reacts; a detected conflict stays put until it is resolved.
    pub fn observe(&mut self, found: Option<PersistedBooking>) {
        if let ConflictState::Idle = self.state {
            if let Some(prior) = found {
                self.state = ConflictState::Detected { prior };
            }
        }
    }

    pub fn resolve(
        &mut self,
        choice: Resolution,
        repo: &BookingRepository,
        draft: &mut BookingRequest,
    ) -> Result<ConflictOutcome, AppError> {
        let ConflictState::Detected { prior } = &self.state else {
            return Err(AppError::BadRequest("no existing booking to resolve".to_string()));
        };

        let outcome = match choice {
            Resolution::Replace => {
                repo.delete_booking(&prior.id)?;
                ConflictOutcome::Replaced {
                    removed: prior.clone(),
                }
            }
            Resolution::Keep => {
                // Clearing identity stops the next lookup from matching again
                draft.name.clear();
                draft.phone.clear();
                ConflictOutcome::Kept { kept: prior.clone() }
            }
        };

        self.state = ConflictState::Idle;
        Ok(outcome)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use chrono::NaiveDate;

    use super::*;
    use crate::services::cache::MemoryCache;

    fn draft() -> BookingRequest {
        BookingRequest {
            name: "Maria Perez".to_string(),
            email: "maria@example.com".to_string(),
            phone: "+56912345678".to_string(),
            date: NaiveDate::from_ymd_opt(2025, 6, 16),
            time: Some("10:00".to_string()),
            is_home_service: false,
            address: None,
        }
    }

    async fn repo_with_prior() -> (BookingRepository, PersistedBooking) {
        let repo = BookingRepository::new(Arc::new(MemoryCache::new()), None);
        let prior = repo.save_booking(&draft(), 60).await.unwrap();
        (repo, prior)
    }

    #[tokio::test]
    async fn test_resolve_without_detection_fails() {
        let (repo, _) = repo_with_prior().await;
        let mut flow = ConflictFlow::default();
        let mut request = draft();
        assert!(matches!(
            flow.resolve(Resolution::Keep, &repo, &mut request),
            Err(AppError::BadRequest(_))
        ));
        assert_eq!(request, draft());
    }

    #[tokio::test]
    async fn test_detected_only_leaves_through_resolve() {
        let (repo, prior) = repo_with_prior().await;
        let mut flow = ConflictFlow::default();
        flow.observe(None);
        assert_eq!(flow.state(), &ConflictState::Idle);

        flow.observe(Some(prior.clone()));
        assert_eq!(flow.state(), &ConflictState::Detected { prior: prior.clone() });

        flow.observe(None);
        assert_eq!(flow.state(), &ConflictState::Detected { prior: prior.clone() });

        let mut other = prior.clone();
        other.id = "other".to_string();
        flow.observe(Some(other));
        assert_eq!(flow.state(), &ConflictState::Detected { prior: prior.clone() });

        let mut request = draft();
        flow.resolve(Resolution::Keep, &repo, &mut request).unwrap();
        assert_eq!(flow.state(), &ConflictState::Idle);
    }

    #[tokio::test]
    async fn test_replace_deletes_prior_booking() {
        let (repo, prior) = repo_with_prior().await;
        let mut flow = ConflictFlow::default();
        flow.observe(Some(prior.clone()));

        let mut request = draft();
        let outcome = flow.resolve(Resolution::Replace, &repo, &mut request).unwrap();

        assert_eq!(outcome, ConflictOutcome::Replaced { removed: prior.clone() });
        assert_eq!(flow.state(), &ConflictState::Idle);
        assert!(repo.find_by_id(&prior.id).unwrap().is_none());
        assert_eq!(request.name, "Maria Perez");
    }

    #[tokio::test]
    async fn test_keep_clears_identity_fields() {
        let (repo, prior) = repo_with_prior().await;
        let mut flow = ConflictFlow::default();
        flow.observe(Some(prior.clone()));

        let mut request = draft();
        let outcome = flow.resolve(Resolution::Keep, &repo, &mut request).unwrap();

        assert!(outcome.message().contains("16-06-2025 at 10:00"));
        assert_eq!(flow.state(), &ConflictState::Idle);
        assert!(request.name.is_empty());
        assert!(request.phone.is_empty());
        assert_eq!(request.email, "maria@example.com");
        assert!(repo.find_by_id(&prior.id).unwrap().is_some());
    }

    #[test]
    fn test_state_serialization() {
        let value = serde_json::to_value(ConflictState::Idle).unwrap();
        assert_eq!(value["state"], "idle");
    }
}
