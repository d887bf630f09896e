//! Calendar view model: which appointments land in which cell.

use chrono::{Days, Months, NaiveDate, NaiveTime, Weekday};
use chrono_tz::Tz;
use serde::Serialize;

use super::range::{
    end_of_week, is_same_day, local_to_utc, month_grid, start_of_month, start_of_week, week_range,
};
use crate::models::Appointment;

/// Appointments shown in a month cell before collapsing into "+N more".
pub const MONTH_CELL_LIMIT: usize = 3;

/// Granularity of the calendar.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ViewMode {
    Month,
    Week,
    Day,
}

/// One cell of the month grid.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DayCell {
    pub date: NaiveDate,
    pub in_current_month: bool,
    pub is_today: bool,
    pub is_selected: bool,
    /// Count shown in the cell badge.
    pub total: usize,
    pub visible: Vec<Appointment>,
    /// Hidden appointments, rendered as "+N more".
    pub overflow: usize,
}

/// One column of the week view.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WeekColumn {
    pub date: NaiveDate,
    pub is_today: bool,
    pub is_selected: bool,
    pub appointments: Vec<Appointment>,
}

/// The single-day agenda.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DayAgenda {
    pub date: NaiveDate,
    pub is_today: bool,
    pub appointments: Vec<Appointment>,
}

/// Appointments whose start falls on `date` in `tz`, in input order.
pub fn appointments_on_day(
    date: NaiveDate,
    appointments: &[Appointment],
    tz: &Tz,
) -> Vec<Appointment> {
    // Midday is never skipped by a DST jump, so it always lands on `date`.
    let midday = date
        .and_hms_opt(12, 0, 0)
        .unwrap_or_else(|| date.and_time(NaiveTime::MIN));
    let midday = local_to_utc(midday, tz).with_timezone(tz);
    appointments
        .iter()
        .filter(|a| is_same_day(&a.timestamp.with_timezone(tz), &midday))
        .cloned()
        .collect()
}

/// Anchor date and mode of a calendar, plus the rules for rendering it.
#[derive(Debug, Clone, PartialEq)]
pub struct CalendarView {
    anchor: NaiveDate,
    mode: ViewMode,
    week_start: Weekday,
    timezone: Tz,
}

impl CalendarView {
    pub fn new(anchor: NaiveDate, week_start: Weekday, timezone: Tz) -> Self {
        Self {
            anchor,
            mode: ViewMode::Month,
            week_start,
            timezone,
        }
    }

    pub fn anchor(&self) -> NaiveDate {
        self.anchor
    }

    pub fn mode(&self) -> ViewMode {
        self.mode
    }

    pub fn set_mode(&mut self, mode: ViewMode) {
        self.mode = mode;
    }

    pub fn set_anchor(&mut self, anchor: NaiveDate) {
        self.anchor = anchor;
    }

    /// Advance by one month, week or day. Month steps clamp the day of month.
    pub fn next(&mut self) {
        let moved = match self.mode {
            ViewMode::Month => self.anchor.checked_add_months(Months::new(1)),
            ViewMode::Week => self.anchor.checked_add_days(Days::new(7)),
            ViewMode::Day => self.anchor.checked_add_days(Days::new(1)),
        };
        if let Some(anchor) = moved {
            self.anchor = anchor;
        }
    }

    pub fn previous(&mut self) {
        let moved = match self.mode {
            ViewMode::Month => self.anchor.checked_sub_months(Months::new(1)),
            ViewMode::Week => self.anchor.checked_sub_days(Days::new(7)),
            ViewMode::Day => self.anchor.checked_sub_days(Days::new(1)),
        };
        if let Some(anchor) = moved {
            self.anchor = anchor;
        }
    }

    pub fn today(&mut self, today: NaiveDate) {
        self.anchor = today;
    }

    /// First and last date the current mode renders, for fetching.
    pub fn visible_range(&self) -> (NaiveDate, NaiveDate) {
        match self.mode {
            ViewMode::Month => {
                let grid = month_grid(self.anchor, self.week_start);
                (
                    grid.first().copied().unwrap_or(self.anchor),
                    grid.last().copied().unwrap_or(self.anchor),
                )
            }
            ViewMode::Week => (
                start_of_week(self.anchor, self.week_start),
                end_of_week(self.anchor, self.week_start),
            ),
            ViewMode::Day => (self.anchor, self.anchor),
        }
    }

    /// Heading such as "October 2026", "Oct 18 - Oct 24, 2026" or
    /// "Monday, October 19, 2026".
    pub fn title(&self) -> String {
        match self.mode {
            ViewMode::Month => self.anchor.format("%B %Y").to_string(),
            ViewMode::Week => {
                let start = start_of_week(self.anchor, self.week_start);
                let end = end_of_week(self.anchor, self.week_start);
                format!("{} - {}", start.format("%b %-d"), end.format("%b %-d, %Y"))
            }
            ViewMode::Day => self.anchor.format("%A, %B %-d, %Y").to_string(),
        }
    }

    pub fn month_cells(
        &self,
        appointments: &[Appointment],
        today: NaiveDate,
        selected: Option<NaiveDate>,
    ) -> Vec<DayCell> {
        let month = start_of_month(self.anchor);
        month_grid(self.anchor, self.week_start)
            .into_iter()
            .map(|date| {
                let mut on_day = appointments_on_day(date, appointments, &self.timezone);
                let total = on_day.len();
                on_day.truncate(MONTH_CELL_LIMIT);
                DayCell {
                    date,
                    in_current_month: start_of_month(date) == month,
                    is_today: date == today,
                    is_selected: selected == Some(date),
                    total,
                    visible: on_day,
                    overflow: total.saturating_sub(MONTH_CELL_LIMIT),
                }
            })
            .collect()
    }

    pub fn week_columns(
        &self,
        appointments: &[Appointment],
        today: NaiveDate,
        selected: Option<NaiveDate>,
    ) -> Vec<WeekColumn> {
        week_range(self.anchor, self.week_start)
            .into_iter()
            .map(|date| WeekColumn {
                date,
                is_today: date == today,
                is_selected: selected == Some(date),
                appointments: appointments_on_day(date, appointments, &self.timezone),
            })
            .collect()
    }

    /// The anchor day's appointments, sorted by start time whatever the
    /// input order.
    pub fn day_agenda(&self, appointments: &[Appointment], today: NaiveDate) -> DayAgenda {
        let mut on_day = appointments_on_day(self.anchor, appointments, &self.timezone);
        on_day.sort_by_key(|a| a.timestamp);
        DayAgenda {
            date: self.anchor,
            is_today: self.anchor == today,
            appointments: on_day,
        }
    }
}
