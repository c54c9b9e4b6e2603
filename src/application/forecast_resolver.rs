// Forecast resolver - picks the representative forecast entry for a day
use crate::domain::forecast::{DailyForecast, ForecastEntry};
use chrono::{DateTime, Duration, FixedOffset, NaiveDate, NaiveTime, Offset, Timelike, Utc};

const SLOT_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResolveMode {
    /// Only an entry stamped exactly at the target time of day
    ExactSlot,
    /// The entry of that day closest to the target time of day
    Nearest,
}

/// All date comparisons happen in one timezone basis, given at construction.
#[derive(Debug, Clone, Copy)]
pub struct ForecastResolver {
    basis: FixedOffset,
}

impl Default for ForecastResolver {
    fn default() -> Self {
        Self::new(Utc.fix())
    }
}

impl ForecastResolver {
    pub fn new(basis: FixedOffset) -> Self {
        Self { basis }
    }

    pub fn basis(&self) -> FixedOffset {
        self.basis
    }

    pub fn local_date(&self, timestamp: DateTime<Utc>) -> NaiveDate {
        timestamp.with_timezone(&self.basis).date_naive()
    }

    pub fn resolve_for_day(
        &self,
        entries: &[ForecastEntry],
        target_date: NaiveDate,
        target_hour_fraction: f64,
        mode: ResolveMode,
    ) -> Option<ForecastEntry> {
        match mode {
            ResolveMode::ExactSlot => self.exact_slot(entries, target_date, target_hour_fraction),
            ResolveMode::Nearest => {
                self.nearest_to_target(entries, target_date, target_hour_fraction)
            }
        }
        .cloned()
    }

    /// Entry whose local timestamp equals `target_date` at the given time of day,
    /// compared as formatted strings at second precision.
    pub fn exact_slot<'a>(
        &self,
        entries: &'a [ForecastEntry],
        target_date: NaiveDate,
        target_hour_fraction: f64,
    ) -> Option<&'a ForecastEntry> {
        let slot = slot_time(target_hour_fraction)?;
        let wanted = target_date.and_time(slot).format(SLOT_FORMAT).to_string();

        entries
            .iter()
            .filter(|e| {
                e.timestamp
                    .with_timezone(&self.basis)
                    .format(SLOT_FORMAT)
                    .to_string()
                    == wanted
            })
            .min_by_key(|e| e.timestamp)
    }

    /// Among entries on `target_date`, the one minimising
    /// `|hour + minute/60 - target_hour_fraction|`; ties go to the earliest timestamp.
    pub fn nearest_to_target<'a>(
        &self,
        entries: &'a [ForecastEntry],
        target_date: NaiveDate,
        target_hour_fraction: f64,
    ) -> Option<&'a ForecastEntry> {
        entries
            .iter()
            .filter_map(|e| {
                let local = e.timestamp.with_timezone(&self.basis);
                (local.date_naive() == target_date).then(|| {
                    let hour = f64::from(local.hour()) + f64::from(local.minute()) / 60.0;
                    ((hour - target_hour_fraction).abs(), e)
                })
            })
            .min_by(|(da, a), (db, b)| da.total_cmp(db).then(a.timestamp.cmp(&b.timestamp)))
            .map(|(_, e)| e)
    }

    /// First `n` entries strictly after `now`, ascending.
    pub fn next_chronological(
        &self,
        entries: &[ForecastEntry],
        now: DateTime<Utc>,
        n: usize,
    ) -> Vec<ForecastEntry> {
        let mut upcoming: Vec<ForecastEntry> = entries
            .iter()
            .filter(|e| e.timestamp > now)
            .cloned()
            .collect();
        upcoming.sort_by_key(|e| e.timestamp);
        upcoming.truncate(n);
        upcoming
    }

    /// One entry per day for the `days` days following `today`.
    pub fn daily_outlook(
        &self,
        entries: &[ForecastEntry],
        today: NaiveDate,
        days: u32,
        target_hour_fraction: f64,
        mode: ResolveMode,
    ) -> Vec<DailyForecast> {
        (1..=i64::from(days))
            .filter_map(|offset| today.checked_add_signed(Duration::days(offset)))
            .map(|date| DailyForecast {
                date,
                entry: self.resolve_for_day(entries, date, target_hour_fraction, mode),
            })
            .collect()
    }
}

fn slot_time(hour_fraction: f64) -> Option<NaiveTime> {
    if !(0.0..24.0).contains(&hour_fraction) {
        return None;
    }
    let secs = (hour_fraction * 3600.0).round() as u32;
    NaiveTime::from_num_seconds_from_midnight_opt(secs, 0)
}

/// Short day label such as "Jun 11".
pub fn outlook_label(date: NaiveDate) -> String {
    date.format("%b %d").to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn entry(y: i32, m: u32, d: u32, h: u32, temp: f64) -> ForecastEntry {
        ForecastEntry {
            timestamp: Utc.with_ymd_and_hms(y, m, d, h, 0, 0).unwrap(),
            temperature: Some(temp),
            weather_icon: None,
            weather_category: None,
        }
    }

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn three_hourly_day() -> Vec<ForecastEntry> {
        // Shuffled on purpose: payloads are unordered
        [12, 0, 21, 3, 18, 6, 15, 9]
            .iter()
            .map(|&h| entry(2025, 6, 11, h, f64::from(h)))
            .collect()
    }

    #[test]
    fn test_nearest_hits_exact_noon() {
        let resolver = ForecastResolver::default();
        let picked = resolver
            .resolve_for_day(&three_hourly_day(), date(2025, 6, 11), 12.0, ResolveMode::Nearest)
            .unwrap();
        assert_eq!(picked.timestamp.hour(), 12);
    }

    #[test]
    fn test_nearest_tie_goes_to_earliest() {
        let resolver = ForecastResolver::default();
        let entries = vec![entry(2025, 6, 11, 15, 20.0), entry(2025, 6, 11, 9, 14.0)];
        let picked = resolver
            .resolve_for_day(&entries, date(2025, 6, 11), 12.0, ResolveMode::Nearest)
            .unwrap();
        assert_eq!(picked.timestamp.hour(), 9);
    }

    #[test]
    fn test_nearest_ignores_other_days() {
        let resolver = ForecastResolver::default();
        let entries = vec![entry(2025, 6, 10, 12, 1.0), entry(2025, 6, 12, 12, 3.0)];
        assert!(
            resolver
                .resolve_for_day(&entries, date(2025, 6, 11), 12.0, ResolveMode::Nearest)
                .is_none()
        );
    }

    #[test]
    fn test_exact_slot_requires_exact_match() {
        let resolver = ForecastResolver::default();
        let entries = vec![entry(2025, 6, 11, 9, 14.0), entry(2025, 6, 11, 15, 20.0)];
        assert!(
            resolver
                .resolve_for_day(&entries, date(2025, 6, 11), 12.0, ResolveMode::ExactSlot)
                .is_none()
        );

        let picked = resolver
            .resolve_for_day(&three_hourly_day(), date(2025, 6, 11), 12.0, ResolveMode::ExactSlot)
            .unwrap();
        assert_eq!(picked.temperature, Some(12.0));
    }

    #[test]
    fn test_date_basis_follows_offset() {
        // 23:00 UTC on the 10th is 01:00 on the 11th at UTC+2
        let resolver = ForecastResolver::new(FixedOffset::east_opt(2 * 3600).unwrap());
        let entries = vec![entry(2025, 6, 10, 23, 8.0), entry(2025, 6, 11, 10, 19.0)];

        let picked = resolver
            .resolve_for_day(&entries, date(2025, 6, 11), 12.0, ResolveMode::ExactSlot)
            .unwrap();
        assert_eq!(picked.temperature, Some(19.0));

        let early = resolver
            .resolve_for_day(&entries, date(2025, 6, 11), 0.0, ResolveMode::Nearest)
            .unwrap();
        assert_eq!(early.temperature, Some(8.0));
    }

    #[test]
    fn test_next_chronological() {
        let resolver = ForecastResolver::default();
        let now = Utc.with_ymd_and_hms(2025, 6, 11, 6, 0, 0).unwrap();
        let upcoming = resolver.next_chronological(&three_hourly_day(), now, 4);

        let hours: Vec<u32> = upcoming.iter().map(|e| e.timestamp.hour()).collect();
        assert_eq!(hours, vec![9, 12, 15, 18]);
    }

    #[test]
    fn test_daily_outlook_marks_missing_days() {
        let resolver = ForecastResolver::default();
        let outlook = resolver.daily_outlook(
            &three_hourly_day(),
            date(2025, 6, 10),
            4,
            12.0,
            ResolveMode::ExactSlot,
        );

        assert_eq!(outlook.len(), 4);
        assert_eq!(outlook[0].date, date(2025, 6, 11));
        assert!(outlook[0].entry.is_some());
        assert!(outlook[1..].iter().all(|d| d.entry.is_none()));
        assert_eq!(outlook_label(outlook[0].date), "Jun 11");
    }
}
