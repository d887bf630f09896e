//! Calendar boundary arithmetic.

use chrono::{
    DateTime, Datelike, Days, Months, NaiveDate, NaiveDateTime, NaiveTime, TimeZone, Utc, Weekday,
};
use chrono_tz::Tz;

// Boundaries clamp to `NaiveDate::MIN`/`MAX` at the edges of the date range.

/// First day of the week containing `date`.
pub fn start_of_week(date: NaiveDate, week_start: Weekday) -> NaiveDate {
    let offset =
        (7 + date.weekday().num_days_from_monday() - week_start.num_days_from_monday()) % 7;
    date.checked_sub_days(Days::new(u64::from(offset)))
        .unwrap_or(NaiveDate::MIN)
}

/// Last day of the week containing `date`.
pub fn end_of_week(date: NaiveDate, week_start: Weekday) -> NaiveDate {
    start_of_week(date, week_start)
        .checked_add_days(Days::new(6))
        .unwrap_or(NaiveDate::MAX)
}

pub fn start_of_month(date: NaiveDate) -> NaiveDate {
    date.with_day(1).unwrap_or(date)
}

pub fn end_of_month(date: NaiveDate) -> NaiveDate {
    start_of_month(date)
        .checked_add_months(Months::new(1))
        .and_then(|next| next.pred_opt())
        .unwrap_or(NaiveDate::MAX)
}

/// Every date from the start of the week holding the 1st of `date`'s month to
/// the end of the week holding its last day, so the grid is always whole weeks.
pub fn month_grid(date: NaiveDate, week_start: Weekday) -> Vec<NaiveDate> {
    let first = start_of_week(start_of_month(date), week_start);
    let last = end_of_week(end_of_month(date), week_start);
    days_from(first).take_while(|day| *day <= last).collect()
}

/// The 7 dates of the week containing `date`.
pub fn week_range(date: NaiveDate, week_start: Weekday) -> Vec<NaiveDate> {
    days_from(start_of_week(date, week_start)).take(7).collect()
}

// `NaiveDate::iter_days` stops short of `NaiveDate::MAX`; this yields it.
fn days_from(first: NaiveDate) -> impl Iterator<Item = NaiveDate> {
    std::iter::successors(Some(first), |day| day.succ_opt())
}

/// Calendar-day equality, ignoring time of day.
pub fn is_same_day<T: TimeZone>(a: &DateTime<T>, b: &DateTime<T>) -> bool {
    a.date_naive() == b.date_naive()
}

/// Calendar day an instant falls on in `tz`.
pub fn local_day(instant: DateTime<Utc>, tz: &Tz) -> NaiveDate {
    instant.with_timezone(tz).date_naive()
}

/// Resolve a wall-clock time in `tz` to an instant.
///
/// Ambiguous times take the earlier offset; times skipped by a DST jump are
/// read as UTC wall time.
pub fn local_to_utc(local: NaiveDateTime, tz: &Tz) -> DateTime<Utc> {
    tz.from_local_datetime(&local)
        .earliest()
        .map(|t| t.with_timezone(&Utc))
        .unwrap_or_else(|| Utc.from_utc_datetime(&local))
}

/// Inclusive instant bounds of a calendar day: midnight to 23:59:59.999.
pub fn day_bounds(date: NaiveDate, tz: &Tz) -> (DateTime<Utc>, DateTime<Utc>) {
    let start = local_to_utc(date.and_time(NaiveTime::MIN), tz);
    let end = match date.succ_opt() {
        Some(next) => local_to_utc(next.and_time(NaiveTime::MIN), tz),
        None => return (start, DateTime::<Utc>::MAX_UTC),
    } - chrono::Duration::milliseconds(1);
    (start, end)
}
