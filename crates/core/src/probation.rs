//! Probation durations.

use chrono::{Duration, Months};

use crate::types::Timestamp;

define_text_enum! {
    /// A probation length as sent by moderators.
    ProbationDuration {
        OneHour = "1 HOUR",
        TwoHours = "2 HOURS",
        SixHours = "6 HOURS",
        TwelveHours = "12 HOURS",
        OneDay = "1 DAY",
        ThreeDays = "3 DAYS",
        OneWeek = "1 WEEK",
        TwoWeeks = "2 WEEKS",
        OneMonth = "1 MONTH",
        TwoMonths = "2 MONTHS",
        ThreeMonths = "3 MONTHS",
        SixMonths = "6 MONTHS",
    }
}

/// A calendar offset split into the units it is applied in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Span {
    pub hours: i64,
    pub days: i64,
    pub months: u32,
}

impl ProbationDuration {
    pub fn span(self) -> Span {
        let (hours, days, months) = match self {
            ProbationDuration::OneHour => (1, 0, 0),
            ProbationDuration::TwoHours => (2, 0, 0),
            ProbationDuration::SixHours => (6, 0, 0),
            ProbationDuration::TwelveHours => (12, 0, 0),
            ProbationDuration::OneDay => (0, 1, 0),
            ProbationDuration::ThreeDays => (0, 3, 0),
            ProbationDuration::OneWeek => (0, 7, 0),
            ProbationDuration::TwoWeeks => (0, 14, 0),
            ProbationDuration::OneMonth => (0, 0, 1),
            ProbationDuration::TwoMonths => (0, 0, 2),
            ProbationDuration::ThreeMonths => (0, 0, 3),
            ProbationDuration::SixMonths => (0, 0, 6),
        };
        Span {
            hours,
            days,
            months,
        }
    }

    /// End of a probation starting at `start`.
    ///
    /// Months are added first and clamp to the last day of the target month,
    /// then days, then hours. `None` only if the result is out of range.
    pub fn end_from(self, start: Timestamp) -> Option<Timestamp> {
        let span = self.span();
        start
            .checked_add_months(Months::new(span.months))?
            .checked_add_signed(Duration::days(span.days))?
            .checked_add_signed(Duration::hours(span.hours))
    }
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;

    use super::*;

    fn at(y: i32, m: u32, d: u32) -> Timestamp {
        chrono::Utc.with_ymd_and_hms(y, m, d, 9, 30, 0).unwrap()
    }

    #[test]
    fn every_token_parses() {
        for duration in ProbationDuration::ALL {
            let parsed: ProbationDuration = duration.as_str().parse().unwrap();
            assert_eq!(parsed, *duration);
            assert_ne!(duration.span(), Span::default());
        }
        assert!("1 YEAR".parse::<ProbationDuration>().is_err());
        assert!("1 hour".parse::<ProbationDuration>().is_err());
    }

    #[test]
    fn one_month_clamps_to_end_of_february() {
        let end = ProbationDuration::OneMonth.end_from(at(2024, 1, 31)).unwrap();
        assert_eq!(end, at(2024, 2, 29));

        let end = ProbationDuration::OneMonth.end_from(at(2023, 1, 31)).unwrap();
        assert_eq!(end, at(2023, 2, 28));
    }

    #[test]
    fn six_months_crosses_the_year() {
        let end = ProbationDuration::SixMonths.end_from(at(2024, 8, 31)).unwrap();
        assert_eq!(end, at(2025, 2, 28));
    }

    #[test]
    fn short_durations() {
        let start = at(2024, 3, 1);
        assert_eq!(
            ProbationDuration::TwelveHours.end_from(start).unwrap(),
            start + Duration::hours(12)
        );
        assert_eq!(
            ProbationDuration::OneWeek.end_from(start).unwrap(),
            at(2024, 3, 8)
        );
        assert_eq!(
            ProbationDuration::TwoWeeks.end_from(start).unwrap(),
            at(2024, 3, 15)
        );
    }

    #[test]
    fn end_is_always_after_start() {
        let start = at(2024, 12, 31);
        for duration in ProbationDuration::ALL {
            assert!(duration.end_from(start).unwrap() > start, "{duration}");
        }
    }
}
