use chrono::{DateTime, FixedOffset, NaiveDate};
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};

/// Candidate interval `[start, end)` in the clinic timezone.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimeSlot {
    pub start: DateTime<Tz>,
    pub end: DateTime<Tz>,
}

impl TimeSlot {
    pub fn new(start: DateTime<Tz>, end: DateTime<Tz>) -> Self {
        Self { start, end }
    }

    pub fn duration(&self) -> chrono::Duration {
        self.end - self.start
    }

    pub fn overlaps<T: chrono::TimeZone>(&self, start: &DateTime<T>, end: &DateTime<T>) -> bool {
        self.start < *end && *start < self.end
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimeSlotResponse {
    pub start: DateTime<FixedOffset>,
    pub end: DateTime<FixedOffset>,
}

impl From<&TimeSlot> for TimeSlotResponse {
    fn from(slot: &TimeSlot) -> Self {
        Self {
            start: slot.start.fixed_offset(),
            end: slot.end.fixed_offset(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SlotListing {
    pub slots: Vec<TimeSlotResponse>,
    pub date: NaiveDate,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NormalizedDateTime {
    pub input: String,
    pub normalized: DateTime<FixedOffset>,
}
