//! Overlap test between a requested slot and booked appointments.

use chrono::{DateTime, Duration, Utc};

use crate::models::Appointment;

/// Duration assumed for appointments that are already booked.
///
/// The store keeps no duration, so a booked appointment always occupies
/// 30 minutes here, whatever length it was requested with.
pub const ASSUMED_EXISTING_DURATION_MINUTES: i64 = 30;

/// Half-open interval `[start, end)` an appointment occupies.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ConflictWindow {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

impl ConflictWindow {
    /// The end saturates at the representable range instead of overflowing.
    pub fn new(start: DateTime<Utc>, duration: Duration) -> Self {
        let end = match start.checked_add_signed(duration) {
            Some(end) => end,
            None if duration < Duration::zero() => DateTime::<Utc>::MIN_UTC,
            None => DateTime::<Utc>::MAX_UTC,
        };
        Self { start, end }
    }

    /// Window of `minutes` length; out-of-range lengths saturate.
    pub fn from_minutes(start: DateTime<Utc>, minutes: i64) -> Self {
        match Duration::try_minutes(minutes) {
            Some(duration) => Self::new(start, duration),
            None if minutes < 0 => Self {
                start,
                end: DateTime::<Utc>::MIN_UTC,
            },
            None => Self {
                start,
                end: DateTime::<Utc>::MAX_UTC,
            },
        }
    }

    /// Window of an already booked appointment.
    pub fn of_existing(appointment: &Appointment) -> Self {
        Self::from_minutes(appointment.timestamp, ASSUMED_EXISTING_DURATION_MINUTES)
    }

    /// Strict overlap: windows that only touch at an endpoint do not overlap.
    pub fn overlaps(&self, other: &ConflictWindow) -> bool {
        self.start < other.end && self.end > other.start
    }
}

/// Booked appointments that overlap `candidate`, skipping `exclude_id`.
pub fn find_conflicts<'a>(
    candidate: &ConflictWindow,
    booked: &'a [Appointment],
    exclude_id: Option<i64>,
) -> Vec<&'a Appointment> {
    booked
        .iter()
        .filter(|a| Some(a.id) != exclude_id)
        .filter(|a| candidate.overlaps(&ConflictWindow::of_existing(a)))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn at(h: u32, m: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 10, 20, h, m, 0).unwrap()
    }

    fn booked(id: i64, h: u32, m: u32) -> Appointment {
        Appointment {
            id,
            title: "Booked".to_string(),
            patient: None,
            doctor: "Dr. Quinn".to_string(),
            timestamp: at(h, m),
            notes: String::new(),
        }
    }

    #[test]
    fn test_overlap_is_symmetric() {
        let windows = [
            ConflictWindow::new(at(9, 0), Duration::minutes(30)),
            ConflictWindow::new(at(9, 15), Duration::minutes(30)),
            ConflictWindow::new(at(9, 30), Duration::minutes(30)),
            ConflictWindow::new(at(8, 0), Duration::minutes(180)),
            ConflictWindow::new(at(10, 0), Duration::minutes(5)),
        ];
        for a in &windows {
            for b in &windows {
                assert_eq!(a.overlaps(b), b.overlaps(a), "{:?} vs {:?}", a, b);
            }
        }
    }

    #[test]
    fn test_back_to_back_is_not_a_conflict() {
        let list = vec![booked(1, 9, 0)];
        let after = ConflictWindow::new(at(9, 30), Duration::minutes(30));
        let before = ConflictWindow::new(at(8, 30), Duration::minutes(30));
        assert!(find_conflicts(&after, &list, None).is_empty());
        assert!(find_conflicts(&before, &list, None).is_empty());
    }

    #[test]
    fn test_partial_overlap_conflicts() {
        let list = vec![booked(1, 9, 0)];
        let candidate = ConflictWindow::new(at(9, 15), Duration::minutes(30));
        assert_eq!(find_conflicts(&candidate, &list, None).len(), 1);
    }

    #[test]
    fn test_later_slot_is_free() {
        let list = vec![booked(1, 9, 0)];
        let candidate = ConflictWindow::new(at(10, 0), Duration::minutes(30));
        assert!(find_conflicts(&candidate, &list, None).is_empty());
    }

    #[test]
    fn test_excluded_appointment_does_not_conflict_with_itself() {
        let list = vec![booked(5, 9, 0)];
        let candidate = ConflictWindow::new(at(9, 0), Duration::minutes(30));
        assert!(find_conflicts(&candidate, &list, Some(5)).is_empty());
        assert_eq!(find_conflicts(&candidate, &list, Some(6)).len(), 1);
    }

    #[test]
    fn test_existing_duration_is_assumed() {
        // A long candidate sees a booked slot only through its assumed 30 minutes.
        let list = vec![booked(1, 9, 0)];
        let long = ConflictWindow::new(at(8, 0), Duration::minutes(60));
        assert!(find_conflicts(&long, &list, None).is_empty());
        let longer = ConflictWindow::new(at(8, 0), Duration::minutes(61));
        assert_eq!(find_conflicts(&longer, &list, None).len(), 1);
    }

    #[test]
    fn test_huge_durations_saturate() {
        let open_ended = ConflictWindow::from_minutes(at(9, 0), i64::MAX);
        assert_eq!(open_ended.end, DateTime::<Utc>::MAX_UTC);

        let far = ConflictWindow::from_minutes(at(9, 0), 1_000_000_000_000);
        assert_eq!(far.end, DateTime::<Utc>::MAX_UTC);

        let backwards = ConflictWindow::from_minutes(at(9, 0), i64::MIN);
        assert_eq!(backwards.end, DateTime::<Utc>::MIN_UTC);

        let list = vec![booked(1, 10, 0)];
        assert_eq!(find_conflicts(&open_ended, &list, None).len(), 1);
        assert!(find_conflicts(&backwards, &list, None).is_empty());
    }
}
