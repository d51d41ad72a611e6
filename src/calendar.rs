use crate::error::{ScheduleError, ScheduleResult};
use chrono::{Datelike, Duration, NaiveDate, Weekday};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet, HashMap, HashSet};

/// Upper bound on how many consecutive unavailable days a forward search
/// walks through before giving up (three years).
pub const DEFAULT_SEARCH_HORIZON_DAYS: i64 = 366 * 3;

/// Per-plan exclusion rules deciding which calendar days can carry work.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AvailabilityRules {
    excluded_dates: BTreeSet<NaiveDate>,
    skip_weekends: bool,
    skip_weekdays: HashSet<Weekday>,
    weekly_pattern: Option<HashMap<Weekday, bool>>,
}

/// Persisted shape of [`AvailabilityRules`]: ISO date strings and weekday
/// indices (0 = Monday .. 6 = Sunday).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AvailabilityConfig {
    #[serde(default)]
    pub excluded_dates: Vec<NaiveDate>,
    #[serde(default)]
    pub skip_weekends: bool,
    #[serde(default)]
    pub skip_weekdays: Vec<u8>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub weekly_pattern: Option<BTreeMap<u8, bool>>,
}

pub const ALL_WEEKDAYS: [Weekday; 7] = [
    Weekday::Mon,
    Weekday::Tue,
    Weekday::Wed,
    Weekday::Thu,
    Weekday::Fri,
    Weekday::Sat,
    Weekday::Sun,
];

pub fn weekday_from_index(index: u8) -> Option<Weekday> {
    ALL_WEEKDAYS.get(index as usize).copied()
}

pub fn weekday_index(weekday: Weekday) -> u8 {
    weekday.num_days_from_monday() as u8
}

/// Decide whether `date` can carry work. Checks run in a fixed order and the
/// first match wins: explicit dates, weekend skipping, skipped weekdays, then
/// the weekly pattern lookup. Anything left over is available.
pub fn is_day_available(
    date: NaiveDate,
    excluded_dates: &BTreeSet<NaiveDate>,
    weekly_pattern: Option<&HashMap<Weekday, bool>>,
    skip_weekends: bool,
    skip_weekdays: &HashSet<Weekday>,
) -> bool {
    if excluded_dates.contains(&date) {
        return false;
    }

    let weekday = date.weekday();
    if skip_weekends && matches!(weekday, Weekday::Sat | Weekday::Sun) {
        return false;
    }

    if skip_weekdays.contains(&weekday) {
        return false;
    }

    if let Some(available) = weekly_pattern.and_then(|pattern| pattern.get(&weekday)) {
        return *available;
    }

    true
}

impl AvailabilityRules {
    /// Rules that leave every day available.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_excluded_dates<I>(mut self, dates: I) -> Self
    where
        I: IntoIterator<Item = NaiveDate>,
    {
        self.excluded_dates.extend(dates);
        self
    }

    pub fn with_skip_weekends(mut self, skip: bool) -> Self {
        self.skip_weekends = skip;
        self
    }

    pub fn with_skip_weekdays<I>(mut self, weekdays: I) -> Self
    where
        I: IntoIterator<Item = Weekday>,
    {
        self.skip_weekdays.extend(weekdays);
        self
    }

    pub fn with_weekly_pattern<I>(mut self, pattern: I) -> Self
    where
        I: IntoIterator<Item = (Weekday, bool)>,
    {
        self.weekly_pattern = Some(pattern.into_iter().collect());
        self
    }

    pub fn excluded_dates(&self) -> &BTreeSet<NaiveDate> {
        &self.excluded_dates
    }

    pub fn skip_weekends(&self) -> bool {
        self.skip_weekends
    }

    pub fn skip_weekdays(&self) -> &HashSet<Weekday> {
        &self.skip_weekdays
    }

    pub fn weekly_pattern(&self) -> Option<&HashMap<Weekday, bool>> {
        self.weekly_pattern.as_ref()
    }

    pub fn from_config(config: &AvailabilityConfig) -> ScheduleResult<Self> {
        let mut skip_weekdays = HashSet::with_capacity(config.skip_weekdays.len());
        for index in &config.skip_weekdays {
            let weekday = weekday_from_index(*index).ok_or_else(|| {
                ScheduleError::InvalidRules(format!("skip weekday index {index} is not in 0..=6"))
            })?;
            skip_weekdays.insert(weekday);
        }

        let weekly_pattern = match &config.weekly_pattern {
            Some(pattern) => {
                let mut resolved = HashMap::with_capacity(pattern.len());
                for (index, available) in pattern {
                    let weekday = weekday_from_index(*index).ok_or_else(|| {
                        ScheduleError::InvalidRules(format!(
                            "weekly pattern index {index} is not in 0..=6"
                        ))
                    })?;
                    resolved.insert(weekday, *available);
                }
                Some(resolved)
            }
            None => None,
        };

        Ok(Self {
            excluded_dates: config.excluded_dates.iter().copied().collect(),
            skip_weekends: config.skip_weekends,
            skip_weekdays,
            weekly_pattern,
        })
    }

    pub fn to_config(&self) -> AvailabilityConfig {
        AvailabilityConfig::from(self)
    }

    /// Check if a date is available for scheduling
    pub fn is_available(&self, date: NaiveDate) -> bool {
        is_day_available(
            date,
            &self.excluded_dates,
            self.weekly_pattern.as_ref(),
            self.skip_weekends,
            &self.skip_weekdays,
        )
    }

    /// First available date on or after `from`, walking at most
    /// `horizon_days` unavailable days.
    pub fn first_available_on_or_after(
        &self,
        from: NaiveDate,
        horizon_days: i64,
    ) -> Option<NaiveDate> {
        let mut current = from;
        let mut skipped = 0;
        while !self.is_available(current) {
            skipped += 1;
            if skipped > horizon_days {
                return None;
            }
            current = current.checked_add_signed(Duration::days(1))?;
        }
        Some(current)
    }

    /// Find the next available date strictly after a given date
    pub fn next_available(&self, from: NaiveDate, horizon_days: i64) -> Option<NaiveDate> {
        let start = from.checked_add_signed(Duration::days(1))?;
        self.first_available_on_or_after(start, horizon_days)
    }

    /// The next `count` available dates, starting with `from` when it is
    /// itself available. Stops early if the horizon is exhausted.
    pub fn available_dates_from(
        &self,
        from: NaiveDate,
        count: usize,
        horizon_days: i64,
    ) -> Vec<NaiveDate> {
        let mut dates = Vec::with_capacity(count.min(366));
        let mut cursor = from;
        while dates.len() < count {
            let Some(day) = self.first_available_on_or_after(cursor, horizon_days) else {
                break;
            };
            dates.push(day);
            match day.checked_add_signed(Duration::days(1)) {
                Some(next) => cursor = next,
                None => break,
            }
        }
        dates
    }

    /// Get all available days in a date range
    pub fn available_days_in_range(&self, start: NaiveDate, end: NaiveDate) -> Vec<NaiveDate> {
        start
            .iter_days()
            .take_while(|day| *day <= end)
            .filter(|day| self.is_available(*day))
            .collect()
    }

    /// Count available days in a date range
    pub fn count_available_days(&self, start: NaiveDate, end: NaiveDate) -> i64 {
        self.available_days_in_range(start, end).len() as i64
    }
}

impl TryFrom<&AvailabilityConfig> for AvailabilityRules {
    type Error = ScheduleError;

    fn try_from(config: &AvailabilityConfig) -> Result<Self, Self::Error> {
        Self::from_config(config)
    }
}

impl From<&AvailabilityRules> for AvailabilityConfig {
    fn from(rules: &AvailabilityRules) -> Self {
        let mut skip_weekdays: Vec<u8> = rules
            .skip_weekdays
            .iter()
            .copied()
            .map(weekday_index)
            .collect();
        skip_weekdays.sort_unstable();

        let weekly_pattern = rules.weekly_pattern.as_ref().map(|pattern| {
            pattern
                .iter()
                .map(|(weekday, available)| (weekday_index(*weekday), *available))
                .collect::<BTreeMap<_, _>>()
        });

        Self {
            excluded_dates: rules.excluded_dates.iter().copied().collect(),
            skip_weekends: rules.skip_weekends,
            skip_weekdays,
            weekly_pattern,
        }
    }
}
