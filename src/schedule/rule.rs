use std::num::NonZeroU32;

use chrono::{Datelike, NaiveDate, Weekday};

use crate::models::{FrequencyLabel, RawCount, RawSelection};

/// Which dates inside a medication's range are due.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RecurrenceRule {
    Daily,
    DaysOfWeek(WeekdaySet),
    DaysOfMonth(MonthDaySet),
    /// Every nth day counted from the start date.
    EveryNDays(NonZeroU32),
}

impl RecurrenceRule {
    /// Build a rule from the backend's string fields.
    ///
    /// A missing or unrecognised frequency means daily. "Every x days"
    /// without a usable interval also falls back to daily.
    pub fn from_parts(
        frequency: Option<&str>,
        selected_days: Option<&RawSelection>,
        selected_dates: Option<&RawSelection>,
        count: Option<&RawCount>,
    ) -> Self {
        let label = match frequency {
            Some(raw) => FrequencyLabel::parse_lenient(raw).unwrap_or_else(|| {
                tracing::debug!(frequency = raw, "Unrecognised frequency, treating as daily");
                FrequencyLabel::EveryDay
            }),
            None => FrequencyLabel::EveryDay,
        };

        match label {
            FrequencyLabel::EveryDay => Self::Daily,
            FrequencyLabel::DayOfWeek => {
                Self::DaysOfWeek(selected_days.map(WeekdaySet::from_selection).unwrap_or_default())
            }
            FrequencyLabel::DayOfMonth => Self::DaysOfMonth(
                selected_dates.map(MonthDaySet::from_selection).unwrap_or_default(),
            ),
            FrequencyLabel::EveryXDays => match count.and_then(RawCount::interval) {
                Some(n) => Self::EveryNDays(n),
                None => {
                    tracing::warn!(?count, "Every x days without a valid interval, treating as daily");
                    Self::Daily
                }
            },
        }
    }

    /// Does `date` match this rule for a range beginning at `start`?
    ///
    /// Range bounds are not checked here.
    pub fn matches(&self, start: NaiveDate, date: NaiveDate) -> bool {
        match self {
            Self::Daily => true,
            Self::DaysOfWeek(days) => days.contains(date.weekday()),
            Self::DaysOfMonth(days) => days.contains(date.day()),
            Self::EveryNDays(n) => {
                let offset = (date - start).num_days();
                offset >= 0 && offset % i64::from(n.get()) == 0
            }
        }
    }

    pub fn label(&self) -> FrequencyLabel {
        match self {
            Self::Daily => FrequencyLabel::EveryDay,
            Self::DaysOfWeek(_) => FrequencyLabel::DayOfWeek,
            Self::DaysOfMonth(_) => FrequencyLabel::DayOfMonth,
            Self::EveryNDays(_) => FrequencyLabel::EveryXDays,
        }
    }
}

/// Set of weekdays, stored as a bitmask indexed from Monday.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct WeekdaySet(u8);

const WEEK: [Weekday; 7] = [
    Weekday::Mon,
    Weekday::Tue,
    Weekday::Wed,
    Weekday::Thu,
    Weekday::Fri,
    Weekday::Sat,
    Weekday::Sun,
];

impl WeekdaySet {
    pub fn from_selection(selection: &RawSelection) -> Self {
        let mut set = Self::default();
        for token in selection.tokens() {
            match token.parse::<Weekday>() {
                Ok(day) => set.insert(day),
                Err(_) => tracing::debug!(token = %token, "Dropping unknown weekday"),
            }
        }
        set
    }

    pub fn insert(&mut self, day: Weekday) {
        self.0 |= 1 << day.num_days_from_monday();
    }

    pub fn contains(&self, day: Weekday) -> bool {
        self.0 & (1 << day.num_days_from_monday()) != 0
    }

    pub fn len(&self) -> usize {
        self.0.count_ones() as usize
    }

    pub fn is_empty(&self) -> bool {
        self.0 == 0
    }

    /// Members in Monday..Sunday order.
    pub fn iter(&self) -> impl Iterator<Item = Weekday> {
        let set = *self;
        WEEK.into_iter().filter(move |day| set.contains(*day))
    }
}

impl FromIterator<Weekday> for WeekdaySet {
    fn from_iter<I: IntoIterator<Item = Weekday>>(iter: I) -> Self {
        let mut set = Self::default();
        for day in iter {
            set.insert(day);
        }
        set
    }
}

/// Set of day-of-month numbers in 1..=31.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct MonthDaySet(u32);

impl MonthDaySet {
    pub fn from_selection(selection: &RawSelection) -> Self {
        let mut set = Self::default();
        for token in selection.tokens() {
            let accepted = token.parse::<u32>().map(|day| set.insert(day)).unwrap_or(false);
            if !accepted {
                tracing::debug!(token = %token, "Dropping invalid day of month");
            }
        }
        set
    }

    /// Adds `day`; returns false (and ignores it) when outside 1..=31.
    pub fn insert(&mut self, day: u32) -> bool {
        if !(1..=31).contains(&day) {
            return false;
        }
        self.0 |= 1 << day;
        true
    }

    pub fn contains(&self, day: u32) -> bool {
        (1..=31).contains(&day) && self.0 & (1 << day) != 0
    }

    pub fn len(&self) -> usize {
        self.0.count_ones() as usize
    }

    pub fn is_empty(&self) -> bool {
        self.0 == 0
    }

    /// Members in ascending order.
    pub fn iter(&self) -> impl Iterator<Item = u32> {
        let set = *self;
        (1..=31).filter(move |day| set.contains(*day))
    }
}

impl FromIterator<u32> for MonthDaySet {
    fn from_iter<I: IntoIterator<Item = u32>>(iter: I) -> Self {
        let mut set = Self::default();
        for day in iter {
            set.insert(day);
        }
        set
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    fn text(s: &str) -> RawSelection {
        RawSelection::Text(s.into())
    }

    fn every(n: u32) -> RecurrenceRule {
        RecurrenceRule::EveryNDays(NonZeroU32::new(n).unwrap())
    }

    #[test]
    fn missing_frequency_is_daily() {
        assert_eq!(RecurrenceRule::from_parts(None, None, None, None), RecurrenceRule::Daily);
    }

    #[test]
    fn unknown_frequency_is_daily() {
        let rule = RecurrenceRule::from_parts(Some("Every 8 hours"), None, None, None);
        assert_eq!(rule, RecurrenceRule::Daily);
    }

    #[test]
    fn day_of_week_parses_abbreviations() {
        let days = text("Mon, Wed,Fri");
        let rule = RecurrenceRule::from_parts(Some("Day of the week"), Some(&days), None, None);
        let RecurrenceRule::DaysOfWeek(set) = &rule else {
            panic!("expected DaysOfWeek, got {rule:?}");
        };
        assert_eq!(set.len(), 3);
        assert!(set.contains(Weekday::Mon));
        assert!(set.contains(Weekday::Fri));
        assert!(!set.contains(Weekday::Tue));
    }

    #[test]
    fn day_of_week_drops_junk_tokens() {
        let set = WeekdaySet::from_selection(&text("Mon, Funday, 3"));
        assert_eq!(set.iter().collect::<Vec<_>>(), vec![Weekday::Mon]);
    }

    #[test]
    fn day_of_week_without_selection_matches_nothing() {
        let rule = RecurrenceRule::from_parts(Some("Day of the week"), None, None, None);
        let start = date("2024-01-01");
        for offset in 0..7 {
            let d = start + chrono::Duration::days(offset);
            assert!(!rule.matches(start, d));
        }
    }

    #[test]
    fn day_of_month_filters_range() {
        let set = MonthDaySet::from_selection(&text("0, 1, 15, 32, x, 31"));
        assert_eq!(set.iter().collect::<Vec<_>>(), vec![1, 15, 31]);
    }

    #[test]
    fn every_n_days_counts_from_start() {
        let count = RawCount::Number(3);
        let rule = RecurrenceRule::from_parts(Some("Every x days"), None, None, Some(&count));
        assert_eq!(rule, every(3));

        let start = date("2024-01-01");
        assert!(rule.matches(start, date("2024-01-01")));
        assert!(!rule.matches(start, date("2024-01-02")));
        assert!(rule.matches(start, date("2024-01-04")));
        assert!(!rule.matches(start, date("2023-12-29")));
    }

    #[test]
    fn every_n_days_without_count_is_daily() {
        let rule = RecurrenceRule::from_parts(Some("Every x days"), None, None, None);
        assert_eq!(rule, RecurrenceRule::Daily);

        let zero = RawCount::Text("0".into());
        let rule = RecurrenceRule::from_parts(Some("Every x days"), None, None, Some(&zero));
        assert_eq!(rule, RecurrenceRule::Daily);
    }

    #[test]
    fn every_day_interval_matches_whole_range() {
        let rule = every(1);
        let start = date("2024-02-27");
        for offset in 0..5 {
            assert!(rule.matches(start, start + chrono::Duration::days(offset)));
        }
    }

    #[test]
    fn zero_interval_cannot_be_built() {
        assert!(NonZeroU32::new(0).is_none());
        let zero = RawCount::Number(0);
        assert_eq!(zero.interval(), None);
        let rule = RecurrenceRule::from_parts(Some("Every x days"), None, None, Some(&zero));
        let start = date("2024-01-01");
        assert!(rule.matches(start, date("2024-01-02")));
    }

    #[test]
    fn weekday_computed_from_date() {
        let set: WeekdaySet = [Weekday::Mon].into_iter().collect();
        let rule = RecurrenceRule::DaysOfWeek(set);
        // 2024-01-03 is a Wednesday; the start date must not shift weekdays.
        let start = date("2024-01-03");
        assert!(!rule.matches(start, start));
        assert!(rule.matches(start, date("2024-01-08")));
    }

    #[test]
    fn labels_match_form_options() {
        assert_eq!(RecurrenceRule::Daily.label().as_str(), "Every day");
        assert_eq!(every(2).label().as_str(), "Every x days");
    }
}
