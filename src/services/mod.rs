pub mod availability;
pub mod cache;
pub mod calendar;
pub mod conflict;
pub mod debounce;
pub mod drafts;
pub mod notify;
pub mod remote;
pub mod repository;
pub mod validation;
