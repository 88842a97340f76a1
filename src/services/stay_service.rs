use chrono::{DateTime, NaiveDate, Utc};

pub struct StayService;

impl StayService {
    /// Whole nights between check-in and check-out.
    ///
    /// Returns 0 when check-out is not strictly after check-in. 0 is the
    /// sentinel for "no valid stay" and callers render it as pricing
    /// unavailable rather than treating it as an error.
    pub fn nights(check_in: NaiveDate, check_out: NaiveDate) -> u32 {
        if check_out <= check_in {
            return 0;
        }
        (check_out - check_in).num_days() as u32
    }

    /// Night count for optional dates; either side missing means no stay.
    pub fn nights_opt(check_in: Option<NaiveDate>, check_out: Option<NaiveDate>) -> u32 {
        match (check_in, check_out) {
            (Some(arrival), Some(departure)) => Self::nights(arrival, departure),
            _ => 0,
        }
    }

    /// Night count for full datetimes. Time-of-day carries no meaning for a
    /// stay, so both ends are truncated to whole-day boundaries first; any
    /// residual sub-day offset from timezone or DST artifacts cannot shift
    /// the count.
    pub fn nights_between(arrival: DateTime<Utc>, departure: DateTime<Utc>) -> u32 {
        Self::nights(arrival.date_naive(), departure.date_naive())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn date(s: &str) -> NaiveDate {
        s.parse().unwrap()
    }

    #[test]
    fn counts_whole_nights() {
        assert_eq!(StayService::nights(date("2024-09-01"), date("2024-09-05")), 4);
        assert_eq!(StayService::nights(date("2024-09-01"), date("2024-09-02")), 1);
        assert_eq!(StayService::nights(date("2024-12-30"), date("2025-01-02")), 3);
    }

    #[test]
    fn same_day_is_zero_nights() {
        assert_eq!(StayService::nights(date("2024-09-01"), date("2024-09-01")), 0);
    }

    #[test]
    fn reversed_dates_are_zero_nights() {
        assert_eq!(StayService::nights(date("2024-09-05"), date("2024-09-01")), 0);
    }

    #[test]
    fn missing_dates_are_zero_nights() {
        assert_eq!(StayService::nights_opt(None, Some(date("2024-09-05"))), 0);
        assert_eq!(StayService::nights_opt(Some(date("2024-09-01")), None), 0);
        assert_eq!(StayService::nights_opt(None, None), 0);
        assert_eq!(
            StayService::nights_opt(Some(date("2024-09-01")), Some(date("2024-09-05"))),
            4
        );
    }

    #[test]
    fn time_of_day_is_ignored() {
        let arrival = Utc.with_ymd_and_hms(2024, 9, 1, 22, 30, 0).unwrap();
        let departure = Utc.with_ymd_and_hms(2024, 9, 5, 3, 15, 0).unwrap();
        // 3.2 elapsed days, but the stay still spans four calendar nights
        assert_eq!(StayService::nights_between(arrival, departure), 4);
    }

    #[test]
    fn repeated_calls_are_identical() {
        let a = StayService::nights(date("2024-09-01"), date("2024-09-05"));
        let b = StayService::nights(date("2024-09-01"), date("2024-09-05"));
        assert_eq!(a, b);
    }
}
