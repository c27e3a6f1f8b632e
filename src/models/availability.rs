use serde::{Deserialize, Serialize};

/// A half-open `[start, end)` range of minutes since midnight already taken
/// by a reservation on some date.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BookedInterval {
    pub start: u32,
    pub end: u32,
}

impl BookedInterval {
    pub fn new(start: u32, end: u32) -> Self {
        Self { start, end }
    }

    /// Oversized durations saturate, so the interval covers the rest of the day.
    pub fn from_time(time: &str, duration_minutes: u32) -> anyhow::Result<Self> {
        let start = parse_time(time)?;
        Ok(Self::new(start, start.saturating_add(duration_minutes)))
    }

    /// Touching ranges (`end == other.start`) do not overlap.
    pub fn overlaps(&self, start: u32, end: u32) -> bool {
        start < self.end && end > self.start
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkingHours {
    pub open: u32,
    pub close: u32,
    pub step: u32,
}

impl Default for WorkingHours {
    fn default() -> Self {
        Self {
            open: 9 * 60,
            close: 20 * 60,
            step: 30,
        }
    }
}

impl WorkingHours {
    /// Candidate start minutes, `open` inclusive to `close` exclusive.
    pub fn candidates(&self) -> impl Iterator<Item = u32> {
        (self.open..self.close).step_by(self.step.max(1) as usize)
    }
}

/// Parses `HH:MM` (or `HH:MM:SS`, as some stores return) into minutes since
/// midnight. Seconds are ignored.
pub fn parse_time(s: &str) -> anyhow::Result<u32> {
    let parts: Vec<&str> = s.trim().split(':').collect();
    if parts.len() != 2 && parts.len() != 3 {
        return Err(anyhow::anyhow!("invalid time format: {s}"));
    }
    let hour: u32 = parts[0]
        .parse()
        .map_err(|_| anyhow::anyhow!("invalid hour in: {s}"))?;
    let minute: u32 = parts[1]
        .parse()
        .map_err(|_| anyhow::anyhow!("invalid minute in: {s}"))?;
    if hour > 23 || minute > 59 {
        return Err(anyhow::anyhow!("time out of range: {s}"));
    }
    Ok(hour * 60 + minute)
}

pub fn format_time(minutes: u32) -> String {
    format!("{:02}:{:02}", minutes / 60, minutes % 60)
}
