//! Next-occurrence calculator for recurring tasks.
//!
//! # Invariants
//! - Month and year steps clamp to the last day of the target month.
//! - A monthly `day_of_month` is applied after the step and clamped to the
//!   target month's length.
//! - Dates past `end_date` yield `None`.

use crate::model::task::{Recurrence, RecurrenceKind, Task};
use chrono::{Datelike, Days, Months, NaiveDate};

/// Next due date of `task`, or `None` when it does not repeat (any more).
///
/// The step starts from `last_completed`, falling back to `due_date` and
/// then to `today` for tasks that were never completed.
pub fn next_due_date(task: &Task, today: NaiveDate) -> Option<NaiveDate> {
    let rule = task.recurrence.as_ref().filter(|rule| rule.is_active())?;
    let start = task.last_completed.or(task.due_date).unwrap_or(today);
    next_occurrence(rule, start)
}

/// Applies one step of `rule` to `start`.
pub fn next_occurrence(rule: &Recurrence, start: NaiveDate) -> Option<NaiveDate> {
    let interval = rule.interval.max(1);
    let next = match rule.kind {
        RecurrenceKind::None => return None,
        RecurrenceKind::Daily => start.checked_add_days(Days::new(u64::from(interval)))?,
        RecurrenceKind::Weekly => {
            start.checked_add_days(Days::new(u64::from(interval).saturating_mul(7)))?
        }
        RecurrenceKind::Monthly => {
            let stepped = start.checked_add_months(Months::new(interval))?;
            match rule.day_of_month {
                Some(day) => {
                    let last = days_in_month(stepped.year(), stepped.month())?;
                    stepped.with_day(u32::from(day).clamp(1, last))?
                }
                None => stepped,
            }
        }
        RecurrenceKind::Yearly => {
            start.checked_add_months(Months::new(interval.checked_mul(12)?))?
        }
    };

    match rule.end_date {
        Some(end) if next > end => None,
        _ => Some(next),
    }
}

/// Number of days in `month` of `year`.
pub fn days_in_month(year: i32, month: u32) -> Option<u32> {
    let first = NaiveDate::from_ymd_opt(year, month, 1)?;
    let next_first = first.checked_add_months(Months::new(1))?;
    Some(next_first.signed_duration_since(first).num_days() as u32)
}

#[cfg(test)]
mod tests {
    use super::{days_in_month, next_due_date, next_occurrence};
    use crate::model::task::{Recurrence, RecurrenceKind, Task};
    use chrono::NaiveDate;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).expect("valid date")
    }

    fn monthly_on(day: u8) -> Recurrence {
        Recurrence {
            day_of_month: Some(day),
            ..Recurrence::new(RecurrenceKind::Monthly, 1)
        }
    }

    #[test]
    fn monthly_day_of_month_clamps_to_short_months() {
        assert_eq!(
            next_occurrence(&monthly_on(31), date(2024, 1, 31)),
            Some(date(2024, 2, 29))
        );
        assert_eq!(
            next_occurrence(&monthly_on(31), date(2023, 1, 15)),
            Some(date(2023, 2, 28))
        );
        assert_eq!(
            next_occurrence(&monthly_on(31), date(2024, 3, 31)),
            Some(date(2024, 4, 30))
        );
    }

    #[test]
    fn monthly_without_day_keeps_start_day_when_possible() {
        let rule = Recurrence::new(RecurrenceKind::Monthly, 2);
        assert_eq!(next_occurrence(&rule, date(2024, 1, 15)), Some(date(2024, 3, 15)));
        assert_eq!(next_occurrence(&rule, date(2024, 12, 31)), Some(date(2025, 2, 28)));
    }

    #[test]
    fn daily_weekly_and_yearly_steps() {
        let start = date(2024, 2, 29);
        assert_eq!(
            next_occurrence(&Recurrence::new(RecurrenceKind::Daily, 3), start),
            Some(date(2024, 3, 3))
        );
        assert_eq!(
            next_occurrence(&Recurrence::new(RecurrenceKind::Weekly, 2), start),
            Some(date(2024, 3, 14))
        );
        assert_eq!(
            next_occurrence(&Recurrence::new(RecurrenceKind::Yearly, 1), start),
            Some(date(2025, 2, 28))
        );
    }

    #[test]
    fn end_date_stops_the_series() {
        let rule = Recurrence {
            end_date: Some(date(2024, 5, 10)),
            ..Recurrence::new(RecurrenceKind::Daily, 1)
        };
        assert_eq!(next_occurrence(&rule, date(2024, 5, 9)), Some(date(2024, 5, 10)));
        assert_eq!(next_occurrence(&rule, date(2024, 5, 10)), None);
    }

    #[test]
    fn start_date_prefers_last_completed_then_due_date_then_today() {
        let today = date(2024, 6, 1);
        let mut task = Task::new("water plants", "all");
        task.recurrence = Some(Recurrence::new(RecurrenceKind::Daily, 1));
        assert_eq!(next_due_date(&task, today), Some(date(2024, 6, 2)));

        task.due_date = Some(date(2024, 6, 10));
        assert_eq!(next_due_date(&task, today), Some(date(2024, 6, 11)));

        task.last_completed = Some(date(2024, 5, 20));
        assert_eq!(next_due_date(&task, today), Some(date(2024, 5, 21)));
    }

    #[test]
    fn non_recurring_tasks_have_no_next_date() {
        let today = date(2024, 6, 1);
        let mut task = Task::new("one-off", "all");
        assert_eq!(next_due_date(&task, today), None);
        task.recurrence = Some(Recurrence::default());
        assert_eq!(next_due_date(&task, today), None);
    }

    #[test]
    fn days_in_month_handles_leap_years() {
        assert_eq!(days_in_month(2024, 2), Some(29));
        assert_eq!(days_in_month(2100, 2), Some(28));
        assert_eq!(days_in_month(2024, 12), Some(31));
        assert_eq!(days_in_month(2024, 13), None);
    }
}
