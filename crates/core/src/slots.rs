use chrono::{DateTime, Duration, Utc};
use chrono_tz::Tz;

use crate::errors::{ScheduleError, ScheduleResult};
use crate::models::{appointment::Appointment, time_slot::TimeSlot};

/// Longest appointment the engine accepts.
pub const MAX_DURATION_MINUTES: i64 = 24 * 60;

pub fn validate_duration(minutes: i64) -> ScheduleResult<Duration> {
    if minutes <= 0 || minutes > MAX_DURATION_MINUTES {
        return Err(ScheduleError::InvalidDuration(minutes));
    }
    Ok(Duration::minutes(minutes))
}

/// Lazy sequence of back-to-back slots covering `[start, end)`.
///
/// The last slot ends at or before `end`; a trailing remainder shorter than
/// `step` is dropped.
#[derive(Debug, Clone)]
pub struct SlotGrid {
    cursor: DateTime<Tz>,
    end: DateTime<Tz>,
    step: Duration,
}

impl SlotGrid {
    pub fn new(start: DateTime<Tz>, end: DateTime<Tz>, step: Duration) -> Self {
        Self { cursor: start, end, step }
    }
}

impl Iterator for SlotGrid {
    type Item = TimeSlot;

    fn next(&mut self) -> Option<Self::Item> {
        let slot_end = self.cursor + self.step;
        if self.step <= Duration::zero() || slot_end > self.end {
            return None;
        }
        let slot = TimeSlot::new(self.cursor, slot_end);
        self.cursor = slot_end;
        Some(slot)
    }
}

/// Busy interval `[start, end)` taken from a stored appointment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BusyInterval {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

impl From<&Appointment> for BusyInterval {
    fn from(appointment: &Appointment) -> Self {
        Self {
            start: appointment.start,
            end: appointment.end,
        }
    }
}

/// Free slots of one day.
///
/// Holds the grid definition and the busy intervals rather than a computed
/// list, so every call to [`AvailableSlots::iter`] replays the same
/// sequence.
#[derive(Debug, Clone)]
pub struct AvailableSlots {
    grid: SlotGrid,
    busy: Vec<BusyInterval>,
    limit: usize,
}

impl AvailableSlots {
    pub fn new(grid: SlotGrid, busy: Vec<BusyInterval>, limit: usize) -> Self {
        Self { grid, busy, limit }
    }

    pub fn iter(&self) -> impl Iterator<Item = TimeSlot> + '_ {
        self.grid
            .clone()
            .filter(|slot| !self.busy.iter().any(|b| slot.overlaps(&b.start, &b.end)))
            .take(self.limit)
    }

    pub fn busy(&self) -> &[BusyInterval] {
        &self.busy
    }

    pub fn to_vec(&self) -> Vec<TimeSlot> {
        self.iter().collect()
    }

    pub fn is_empty(&self) -> bool {
        self.iter().next().is_none()
    }
}

impl<'a> IntoIterator for &'a AvailableSlots {
    type Item = TimeSlot;
    type IntoIter = Box<dyn Iterator<Item = TimeSlot> + 'a>;

    fn into_iter(self) -> Self::IntoIter {
        Box::new(self.iter())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use chrono_tz::Asia::Dubai;

    #[test]
    fn test_grid_drops_short_remainder() {
        let start = Dubai.with_ymd_and_hms(2025, 11, 15, 9, 0, 0).unwrap();
        let end = Dubai.with_ymd_and_hms(2025, 11, 15, 10, 0, 0).unwrap();
        let slots: Vec<_> = SlotGrid::new(start, end, Duration::minutes(25)).collect();
        assert_eq!(slots.len(), 2);
        assert_eq!(slots[1].end, Dubai.with_ymd_and_hms(2025, 11, 15, 9, 50, 0).unwrap());
    }

    #[test]
    fn test_validate_duration_bounds() {
        assert!(validate_duration(0).is_err());
        assert!(validate_duration(-30).is_err());
        assert!(validate_duration(MAX_DURATION_MINUTES + 1).is_err());
        assert_eq!(validate_duration(45).unwrap(), Duration::minutes(45));
    }
}
