use crate::models::availability::format_time;
use crate::models::{BookedInterval, WorkingHours};

/// Start times (`HH:MM`, ascending) at which an appointment of
/// `duration_minutes` fits inside the default working hours without
/// touching any booked interval.
pub fn compute_available_slots(booked: &[BookedInterval], duration_minutes: u32) -> Vec<String> {
    available_slots_within(&WorkingHours::default(), booked, duration_minutes)
}

pub fn available_slots_within(
    hours: &WorkingHours,
    booked: &[BookedInterval],
    duration_minutes: u32,
) -> Vec<String> {
    if duration_minutes == 0 {
        return Vec::new();
    }

    hours
        .candidates()
        .filter(|&start| {
            let end = start.saturating_add(duration_minutes);
            end <= hours.close && !booked.iter().any(|b| b.overlaps(start, end))
        })
        .map(format_time)
        .collect()
}

/// Keeps `selected` only while it is still one of `slots`.
pub fn reconcile_selection(slots: &[String], selected: Option<&str>) -> Option<String> {
    let selected = selected?;
    if slots.iter().any(|s| s == selected) {
        Some(selected.to_string())
    } else {
        tracing::debug!(time = selected, "selected time no longer available, clearing");
        None
    }
}
