pub mod availability;
pub mod booking;
pub mod catalog;

pub use availability::{BookedInterval, WorkingHours};
pub use booking::{
    normalize_phone, BookingRequest, Lead, PersistedBooking, RemoteBookedTime, RemoteBookingRow,
};
pub use catalog::{Catalog, Decant, DecantFamily, DecantSize, HomeServiceAddon, Service};
