//! The schedule rule for recurring transactions.
//!
//! Decides, for one definition and one calendar date, whether a transaction
//! should be materialized. All comparisons are calendar-date comparisons,
//! [time::Date] makes time-of-day unrepresentable so there is nothing to
//! normalize away.

use time::Date;

use crate::recurring::models::{Frequency, RecurringTransaction};

/// Evaluate `definition` against `target_date`.
///
/// Returns `Some(matched_date)` when a transaction should be materialized
/// for `target_date`, and `None` otherwise. The matched date is always
/// `target_date` itself, the rule never emits for any other date.
///
/// The rule, applied in order:
///
/// 1. Inactive definitions never match.
/// 2. A definition whose `last_processed_date` equals `target_date` never
///    matches, so that repeated runs on the same calendar date emit at most
///    one transaction.
/// 3. The target date must be within `start_date..=end_date` (an absent
///    `end_date` means the schedule runs indefinitely).
/// 4. The frequency must match: daily always does, weekly matches on the
///    configured weekday (0 = Sunday), monthly matches on the configured
///    day of the month, and yearly matches on the month and day of
///    `start_date` ignoring the year.
///
/// A monthly definition whose `day_of_month` exceeds the length of the
/// target month simply does not match that month, there is no rolling to the
/// last day. Likewise a yearly definition starting on 29 February only
/// matches in leap years.
///
/// This function is pure and never errors. Malformed definitions, such as a
/// weekly schedule without a `day_of_week`, never match.
pub fn evaluate(definition: &RecurringTransaction, target_date: Date) -> Option<Date> {
    if !definition.is_active {
        return None;
    }

    if definition.last_processed_date == Some(target_date) {
        return None;
    }

    if let Some(end_date) = definition.end_date
        && end_date < target_date
    {
        return None;
    }

    if definition.start_date > target_date {
        return None;
    }

    let matches = match definition.frequency {
        Frequency::Daily => true,
        Frequency::Weekly => {
            definition.day_of_week == Some(target_date.weekday().number_days_from_sunday())
        }
        Frequency::Monthly => definition.day_of_month == Some(target_date.day()),
        Frequency::Yearly => {
            target_date.month() == definition.start_date.month()
                && target_date.day() == definition.start_date.day()
        }
    };

    matches.then_some(target_date)
}

#[cfg(test)]
mod schedule_tests {
    use time::{Date, Duration, Month};

    use crate::{
        recurring::models::{Frequency, RecurringTransaction},
        transaction::TransactionType,
        user::UserID,
    };

    use super::evaluate;

    fn date(year: i32, month: Month, day: u8) -> Date {
        Date::from_calendar_date(year, month, day).unwrap()
    }

    fn definition(frequency: Frequency, start_date: Date) -> RecurringTransaction {
        RecurringTransaction {
            id: 1,
            user_id: UserID::new(1),
            category_id: 1,
            transaction_type: TransactionType::Expense,
            amount: 25.0,
            description: "Gym membership".to_string(),
            notes: None,
            frequency,
            start_date,
            end_date: None,
            day_of_week: None,
            day_of_month: None,
            last_processed_date: None,
            is_active: true,
        }
    }

    #[test]
    fn daily_matches_every_date_from_start() {
        let definition = definition(Frequency::Daily, date(2024, Month::January, 1));

        for offset in 0..30 {
            let target = date(2024, Month::January, 1) + Duration::days(offset);
            assert_eq!(evaluate(&definition, target), Some(target));
        }
    }

    #[test]
    fn nothing_matches_before_the_start_date() {
        let definition = definition(Frequency::Daily, date(2024, Month::June, 1));

        assert_eq!(evaluate(&definition, date(2024, Month::May, 31)), None);
    }

    #[test]
    fn inactive_definitions_never_match() {
        let mut definition = definition(Frequency::Daily, date(2024, Month::January, 1));
        definition.is_active = false;

        assert_eq!(evaluate(&definition, date(2024, Month::June, 1)), None);
    }

    #[test]
    fn already_processed_date_does_not_match_again() {
        let target = date(2024, Month::June, 1);
        let mut definition = definition(Frequency::Daily, date(2024, Month::January, 1));

        assert_eq!(evaluate(&definition, target), Some(target));

        definition.last_processed_date = Some(target);
        assert_eq!(evaluate(&definition, target), None);
    }

    #[test]
    fn a_different_processed_date_still_matches() {
        let mut definition = definition(Frequency::Daily, date(2024, Month::January, 1));
        definition.last_processed_date = Some(date(2024, Month::May, 31));

        let target = date(2024, Month::June, 1);
        assert_eq!(evaluate(&definition, target), Some(target));
    }

    #[test]
    fn end_date_is_inclusive() {
        let mut definition = definition(Frequency::Daily, date(2024, Month::January, 1));
        definition.end_date = Some(date(2024, Month::June, 30));

        assert_eq!(
            evaluate(&definition, date(2024, Month::June, 30)),
            Some(date(2024, Month::June, 30))
        );
        assert_eq!(evaluate(&definition, date(2024, Month::July, 1)), None);
    }

    #[test]
    fn weekly_matches_only_the_configured_weekday() {
        let mut definition = definition(Frequency::Weekly, date(2024, Month::January, 1));
        // 3 = Wednesday.
        definition.day_of_week = Some(3);

        // The week of 2024-06-10 (Monday) through 2024-06-16 (Sunday).
        for day in 10..=16 {
            let target = date(2024, Month::June, day);
            let expected = if day == 12 { Some(target) } else { None };
            assert_eq!(evaluate(&definition, target), expected, "day {day}");
        }
    }

    #[test]
    fn weekly_without_a_weekday_never_matches() {
        let definition = definition(Frequency::Weekly, date(2024, Month::January, 1));

        for day in 10..=16 {
            assert_eq!(evaluate(&definition, date(2024, Month::June, day)), None);
        }
    }

    #[test]
    fn weekly_weekday_zero_is_sunday() {
        let mut definition = definition(Frequency::Weekly, date(2024, Month::January, 1));
        definition.day_of_week = Some(0);

        // 2024-06-16 is a Sunday.
        let sunday = date(2024, Month::June, 16);
        assert_eq!(evaluate(&definition, sunday), Some(sunday));
    }

    #[test]
    fn monthly_matches_only_the_configured_day() {
        let mut definition = definition(Frequency::Monthly, date(2024, Month::January, 1));
        definition.day_of_month = Some(15);

        assert_eq!(
            evaluate(&definition, date(2024, Month::June, 15)),
            Some(date(2024, Month::June, 15))
        );
        assert_eq!(evaluate(&definition, date(2024, Month::June, 14)), None);
        assert_eq!(evaluate(&definition, date(2024, Month::June, 16)), None);
    }

    #[test]
    fn monthly_day_31_skips_short_months() {
        let mut definition = definition(Frequency::Monthly, date(2020, Month::January, 1));
        definition.day_of_month = Some(31);

        // Day 31 never matches in February, even in a leap year. The month
        // is skipped, not rolled to its last day.
        for day in 1..=29 {
            assert_eq!(
                evaluate(&definition, date(2024, Month::February, day)),
                None,
                "2024-02-{day:02}"
            );
        }
        for day in 1..=28 {
            assert_eq!(
                evaluate(&definition, date(2023, Month::February, day)),
                None,
                "2023-02-{day:02}"
            );
        }

        // It still matches months that have 31 days.
        assert_eq!(
            evaluate(&definition, date(2024, Month::March, 31)),
            Some(date(2024, Month::March, 31))
        );
    }

    #[test]
    fn monthly_without_a_day_never_matches() {
        let definition = definition(Frequency::Monthly, date(2024, Month::January, 1));

        assert_eq!(evaluate(&definition, date(2024, Month::June, 1)), None);
    }

    #[test]
    fn yearly_matches_month_and_day_of_start_date_ignoring_year() {
        let definition = definition(Frequency::Yearly, date(2020, Month::March, 15));

        assert_eq!(
            evaluate(&definition, date(2031, Month::March, 15)),
            Some(date(2031, Month::March, 15))
        );
        assert_eq!(evaluate(&definition, date(2031, Month::March, 16)), None);
        assert_eq!(evaluate(&definition, date(2031, Month::April, 15)), None);
    }

    #[test]
    fn yearly_matches_its_own_start_date() {
        let start = date(2020, Month::March, 15);
        let definition = definition(Frequency::Yearly, start);

        assert_eq!(evaluate(&definition, start), Some(start));
    }

    #[test]
    fn yearly_starting_on_leap_day_matches_only_leap_years() {
        let definition = definition(Frequency::Yearly, date(2020, Month::February, 29));

        assert_eq!(
            evaluate(&definition, date(2024, Month::February, 29)),
            Some(date(2024, Month::February, 29))
        );
        // 2023 has no 29 February and 28 February does not match.
        assert_eq!(evaluate(&definition, date(2023, Month::February, 28)), None);
    }
}
