//! A US Eastern zone with the 2024 daylight-saving rules, for date-boundary tests.

use chrono::{FixedOffset, MappedLocalTime, NaiveDate, NaiveDateTime, TimeZone};

#[derive(Debug, Clone, Copy)]
pub(crate) struct Eastern2024;

fn est() -> FixedOffset {
    FixedOffset::west_opt(5 * 3600).unwrap()
}

fn edt() -> FixedOffset {
    FixedOffset::west_opt(4 * 3600).unwrap()
}

/// EDT from 2024-03-10 07:00 UTC until 2024-11-03 06:00 UTC.
fn offset_at(utc: &NaiveDateTime) -> FixedOffset {
    let start = NaiveDate::from_ymd_opt(2024, 3, 10).unwrap().and_hms_opt(7, 0, 0).unwrap();
    let end = NaiveDate::from_ymd_opt(2024, 11, 3).unwrap().and_hms_opt(6, 0, 0).unwrap();
    if *utc >= start && *utc < end { edt() } else { est() }
}

impl TimeZone for Eastern2024 {
    type Offset = FixedOffset;

    fn from_offset(_offset: &FixedOffset) -> Self {
        Eastern2024
    }

    fn offset_from_local_date(&self, local: &NaiveDate) -> MappedLocalTime<FixedOffset> {
        match local.and_hms_opt(12, 0, 0) {
            Some(noon) => self.offset_from_local_datetime(&noon),
            None => MappedLocalTime::None,
        }
    }

    fn offset_from_local_datetime(&self, local: &NaiveDateTime) -> MappedLocalTime<FixedOffset> {
        let fits = |offset: FixedOffset| offset_at(&(*local - offset)) == offset;
        match (fits(est()), fits(edt())) {
            (true, true) => MappedLocalTime::Ambiguous(edt(), est()),
            (true, false) => MappedLocalTime::Single(est()),
            (false, true) => MappedLocalTime::Single(edt()),
            (false, false) => MappedLocalTime::None,
        }
    }

    fn offset_from_utc_date(&self, utc: &NaiveDate) -> FixedOffset {
        offset_at(&utc.and_hms_opt(0, 0, 0).unwrap())
    }

    fn offset_from_utc_datetime(&self, utc: &NaiveDateTime) -> FixedOffset {
        offset_at(utc)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{DateTime, Utc};

    #[test]
    fn test_eastern_switches_offset() {
        let local = |t: DateTime<Utc>| t.with_timezone(&Eastern2024).naive_local().to_string();
        let winter = Utc.with_ymd_and_hms(2024, 1, 15, 12, 0, 0).unwrap();
        let summer = Utc.with_ymd_and_hms(2024, 7, 2, 4, 30, 0).unwrap();
        assert_eq!(local(winter), "2024-01-15 07:00:00");
        assert_eq!(local(summer), "2024-07-02 00:30:00");
    }

    #[test]
    fn test_eastern_local_gap_and_overlap() {
        let at = |d: u32, m: u32, h: u32, min: u32| {
            NaiveDate::from_ymd_opt(2024, m, d).unwrap().and_hms_opt(h, min, 0).unwrap()
        };
        assert!(matches!(
            Eastern2024.offset_from_local_datetime(&at(10, 3, 2, 30)),
            MappedLocalTime::None
        ));
        assert!(matches!(
            Eastern2024.offset_from_local_datetime(&at(3, 11, 1, 30)),
            MappedLocalTime::Ambiguous(_, _)
        ));
    }
}
