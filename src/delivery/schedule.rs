//! Delivery Schedules
//!
//! Operational hours, delivery time slots, and the slot generator. Slots
//! are rebuilt on every call from the schedule configuration; nothing is
//! cached between calls.

use std::fmt;

use chrono::{Datelike, Duration, NaiveDate, NaiveDateTime, NaiveTime, Weekday};
use rustc_hash::FxHashMap;
use smallvec::SmallVec;
use thiserror::Error;

use crate::delivery::DeliveryConfigError;

/// Errors from slot generation.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ScheduleError {
    /// The requested delivery date is before today.
    #[error("requested delivery date {0} is in the past")]
    DateInPast(NaiveDate),
}

/// A bounded delivery window within a day.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TimeSlot {
    start: NaiveTime,
    end: NaiveTime,
}

impl TimeSlot {
    /// Create a slot from its bounds.
    #[must_use]
    pub fn new(start: NaiveTime, end: NaiveTime) -> Self {
        Self { start, end }
    }

    /// When the slot begins.
    #[must_use]
    pub fn start(&self) -> NaiveTime {
        self.start
    }

    /// When the slot ends.
    #[must_use]
    pub fn end(&self) -> NaiveTime {
        self.end
    }
}

impl fmt::Display for TimeSlot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} - {}",
            self.start.format("%H:%M"),
            self.end.format("%H:%M")
        )
    }
}

/// A window during which a store delivers on a given weekday.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HoursWindow {
    opens: NaiveTime,
    closes: NaiveTime,
}

impl HoursWindow {
    /// When the window opens.
    #[must_use]
    pub fn opens(&self) -> NaiveTime {
        self.opens
    }

    /// When the window closes.
    #[must_use]
    pub fn closes(&self) -> NaiveTime {
        self.closes
    }
}

/// Operational hours per weekday.
#[derive(Debug, Clone, Default)]
pub struct OperationalHours {
    windows: FxHashMap<Weekday, SmallVec<[HoursWindow; 2]>>,
}

impl OperationalHours {
    /// Create an empty set of operational hours.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a delivery window on a weekday, keeping that day's windows in
    /// chronological order.
    ///
    /// # Errors
    ///
    /// - [`DeliveryConfigError::WindowInverted`] when the window closes at
    ///   or before it opens.
    /// - [`DeliveryConfigError::OverlappingWindows`] when it overlaps an
    ///   existing window on the same day.
    pub fn add_window(
        &mut self,
        day: Weekday,
        opens: NaiveTime,
        closes: NaiveTime,
    ) -> Result<&mut Self, DeliveryConfigError> {
        if closes <= opens {
            return Err(DeliveryConfigError::WindowInverted);
        }

        let windows = self.windows.entry(day).or_default();

        let overlaps = windows
            .iter()
            .any(|existing| opens < existing.closes && existing.opens < closes);

        if overlaps {
            return Err(DeliveryConfigError::OverlappingWindows);
        }

        let position = windows
            .iter()
            .position(|existing| opens < existing.opens)
            .unwrap_or(windows.len());

        windows.insert(position, HoursWindow { opens, closes });

        Ok(self)
    }

    /// The windows configured for a weekday, in chronological order.
    #[must_use]
    pub fn windows_for(&self, day: Weekday) -> &[HoursWindow] {
        self.windows.get(&day).map_or(&[], SmallVec::as_slice)
    }
}

/// Units for auto-generated slot intervals.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IntervalUnit {
    /// Interval measured in minutes.
    Minutes,

    /// Interval measured in hours.
    Hours,
}

/// Length of auto-generated time slots.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SlotInterval {
    value: u32,
    unit: IntervalUnit,
}

impl SlotInterval {
    /// Create an interval.
    ///
    /// # Errors
    ///
    /// Returns [`DeliveryConfigError::ZeroInterval`] when the value is zero.
    pub fn new(value: u32, unit: IntervalUnit) -> Result<Self, DeliveryConfigError> {
        if value == 0 {
            return Err(DeliveryConfigError::ZeroInterval);
        }

        Ok(Self { value, unit })
    }

    /// An interval of whole minutes.
    ///
    /// # Errors
    ///
    /// Returns [`DeliveryConfigError::ZeroInterval`] when the value is zero.
    pub fn minutes(value: u32) -> Result<Self, DeliveryConfigError> {
        Self::new(value, IntervalUnit::Minutes)
    }

    /// An interval of whole hours.
    ///
    /// # Errors
    ///
    /// Returns [`DeliveryConfigError::ZeroInterval`] when the value is zero.
    pub fn hours(value: u32) -> Result<Self, DeliveryConfigError> {
        Self::new(value, IntervalUnit::Hours)
    }

    fn as_duration(self) -> Duration {
        match self.unit {
            IntervalUnit::Minutes => Duration::minutes(i64::from(self.value)),
            IntervalUnit::Hours => Duration::hours(i64::from(self.value)),
        }
    }
}

/// Schedule configuration for a delivery method.
#[derive(Debug, Clone)]
pub struct DeliverySchedule {
    hours: OperationalHours,
    auto_generate: Option<SlotInterval>,
    minimum_notice: Option<Duration>,
    maximum_notice: Option<Duration>,
    daily_order_limit: Option<u32>,
}

impl DeliverySchedule {
    /// Create a schedule over the given operational hours.
    #[must_use]
    pub fn new(hours: OperationalHours) -> Self {
        Self {
            hours,
            auto_generate: None,
            minimum_notice: None,
            maximum_notice: None,
            daily_order_limit: None,
        }
    }

    /// Partition operational-hours windows into slots of this interval.
    #[must_use]
    pub fn with_auto_generate(mut self, interval: SlotInterval) -> Self {
        self.auto_generate = Some(interval);
        self
    }

    /// Require at least this much notice before a slot starts.
    ///
    /// # Errors
    ///
    /// Returns [`DeliveryConfigError::NoticeWindowInverted`] when the
    /// minimum exceeds a configured maximum.
    pub fn with_minimum_notice(mut self, notice: Duration) -> Result<Self, DeliveryConfigError> {
        if self.maximum_notice.is_some_and(|maximum| notice > maximum) {
            return Err(DeliveryConfigError::NoticeWindowInverted);
        }

        self.minimum_notice = Some(notice);
        Ok(self)
    }

    /// Refuse slots starting beyond this much notice.
    ///
    /// # Errors
    ///
    /// Returns [`DeliveryConfigError::NoticeWindowInverted`] when the
    /// maximum is below a configured minimum.
    pub fn with_maximum_notice(mut self, notice: Duration) -> Result<Self, DeliveryConfigError> {
        if self.minimum_notice.is_some_and(|minimum| notice < minimum) {
            return Err(DeliveryConfigError::NoticeWindowInverted);
        }

        self.maximum_notice = Some(notice);
        Ok(self)
    }

    /// Cap the number of orders accepted per slot per day.
    #[must_use]
    pub fn with_daily_order_limit(mut self, limit: u32) -> Self {
        self.daily_order_limit = Some(limit);
        self
    }

    /// The configured operational hours.
    #[must_use]
    pub fn hours(&self) -> &OperationalHours {
        &self.hours
    }

    /// Generate the available delivery slots for a date, in ascending
    /// start-time order.
    ///
    /// `booked` carries the number of orders already scheduled per slot;
    /// counting them is the caller's concern. Slots at or above the daily
    /// order limit are excluded.
    ///
    /// # Errors
    ///
    /// Returns [`ScheduleError::DateInPast`] when the requested date is
    /// before `now`'s date.
    pub fn generate_slots(
        &self,
        requested_date: NaiveDate,
        now: NaiveDateTime,
        booked: &FxHashMap<TimeSlot, u32>,
    ) -> Result<Vec<TimeSlot>, ScheduleError> {
        if requested_date < now.date() {
            return Err(ScheduleError::DateInPast(requested_date));
        }

        let windows = self.hours.windows_for(requested_date.weekday());

        let mut slots: Vec<TimeSlot> = match self.auto_generate {
            Some(interval) => windows
                .iter()
                .flat_map(|window| partition_window(*window, interval))
                .collect(),
            None => windows
                .iter()
                .map(|window| TimeSlot::new(window.opens(), window.closes()))
                .collect(),
        };

        if let Some(minimum) = self.minimum_notice {
            if requested_date == now.date() {
                let earliest = now + minimum;

                slots.retain(|slot| requested_date.and_time(slot.start()) >= earliest);
            }
        }

        if let Some(maximum) = self.maximum_notice {
            let cutoff = now + maximum;

            slots.retain(|slot| requested_date.and_time(slot.start()) <= cutoff);
        }

        if let Some(limit) = self.daily_order_limit {
            slots.retain(|slot| booked.get(slot).copied().unwrap_or(0) < limit);
        }

        slots.sort_unstable();

        Ok(slots)
    }
}

/// Split a window into consecutive interval-sized slots. A trailing
/// remainder shorter than the interval is not emitted.
fn partition_window(window: HoursWindow, interval: SlotInterval) -> SmallVec<[TimeSlot; 8]> {
    let step = interval.as_duration();
    let mut slots = SmallVec::new();
    let mut start = window.opens();

    loop {
        let (end, wrapped) = start.overflowing_add_signed(step);

        // A wrap past midnight ends the window as surely as the close time.
        if wrapped != 0 || end > window.closes() || end <= start {
            break;
        }

        slots.push(TimeSlot::new(start, end));
        start = end;
    }

    slots
}

#[cfg(test)]
mod tests {
    use testresult::TestResult;

    use super::*;

    fn time(h: u32, m: u32) -> NaiveTime {
        NaiveTime::from_hms_opt(h, m, 0).unwrap_or_default()
    }

    // 2026-08-10 is a Monday.
    fn monday() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 8, 10).unwrap_or_default()
    }

    fn monday_at(h: u32, m: u32) -> NaiveDateTime {
        monday().and_time(time(h, m))
    }

    fn business_hours() -> Result<OperationalHours, DeliveryConfigError> {
        let mut hours = OperationalHours::new();
        hours.add_window(Weekday::Mon, time(9, 0), time(17, 0))?;
        Ok(hours)
    }

    fn no_bookings() -> FxHashMap<TimeSlot, u32> {
        FxHashMap::default()
    }

    #[test]
    fn auto_generate_partitions_windows() -> TestResult {
        let schedule = DeliverySchedule::new(business_hours()?)
            .with_auto_generate(SlotInterval::hours(2)?);

        let slots = schedule.generate_slots(monday(), monday_at(6, 0), &no_bookings())?;

        let rendered: Vec<String> = slots.iter().map(ToString::to_string).collect();
        assert_eq!(
            rendered,
            vec![
                "09:00 - 11:00",
                "11:00 - 13:00",
                "13:00 - 15:00",
                "15:00 - 17:00",
            ]
        );

        Ok(())
    }

    #[test]
    fn trailing_remainder_is_dropped() -> TestResult {
        let mut hours = OperationalHours::new();
        hours.add_window(Weekday::Mon, time(9, 0), time(12, 30))?;

        let schedule =
            DeliverySchedule::new(hours).with_auto_generate(SlotInterval::minutes(90)?);

        let slots = schedule.generate_slots(monday(), monday_at(6, 0), &no_bookings())?;

        let rendered: Vec<String> = slots.iter().map(ToString::to_string).collect();
        assert_eq!(rendered, vec!["09:00 - 10:30", "10:30 - 12:00"]);

        Ok(())
    }

    #[test]
    fn without_auto_generate_windows_are_the_slots() -> TestResult {
        let mut hours = OperationalHours::new();
        hours
            .add_window(Weekday::Mon, time(9, 0), time(12, 0))?
            .add_window(Weekday::Mon, time(14, 0), time(17, 0))?;

        let schedule = DeliverySchedule::new(hours);

        let slots = schedule.generate_slots(monday(), monday_at(6, 0), &no_bookings())?;

        assert_eq!(
            slots,
            vec![
                TimeSlot::new(time(9, 0), time(12, 0)),
                TimeSlot::new(time(14, 0), time(17, 0)),
            ]
        );

        Ok(())
    }

    #[test]
    fn day_without_windows_has_no_slots() -> TestResult {
        let schedule = DeliverySchedule::new(business_hours()?);

        // 2026-08-11 is a Tuesday; hours only cover Monday.
        let tuesday = NaiveDate::from_ymd_opt(2026, 8, 11).unwrap_or_default();
        let slots = schedule.generate_slots(tuesday, monday_at(6, 0), &no_bookings())?;

        assert!(slots.is_empty());

        Ok(())
    }

    #[test]
    fn past_date_is_rejected() -> TestResult {
        let schedule = DeliverySchedule::new(business_hours()?);

        let yesterday = NaiveDate::from_ymd_opt(2026, 8, 9).unwrap_or_default();
        let result = schedule.generate_slots(yesterday, monday_at(6, 0), &no_bookings());

        assert_eq!(result, Err(ScheduleError::DateInPast(yesterday)));

        Ok(())
    }

    #[test]
    fn minimum_notice_drops_near_slots_today_only() -> TestResult {
        let schedule = DeliverySchedule::new(business_hours()?)
            .with_auto_generate(SlotInterval::hours(2)?)
            .with_minimum_notice(Duration::hours(3))?;

        // At 09:30, a 3-hour notice admits slots from 12:30 onwards.
        let slots = schedule.generate_slots(monday(), monday_at(9, 30), &no_bookings())?;
        let rendered: Vec<String> = slots.iter().map(ToString::to_string).collect();
        assert_eq!(rendered, vec!["13:00 - 15:00", "15:00 - 17:00"]);

        // A future date is unaffected by minimum notice.
        let next_monday = NaiveDate::from_ymd_opt(2026, 8, 17).unwrap_or_default();
        let future = schedule.generate_slots(next_monday, monday_at(9, 30), &no_bookings())?;
        assert_eq!(future.len(), 4);

        Ok(())
    }

    #[test]
    fn maximum_notice_caps_how_far_ahead_slots_go() -> TestResult {
        let schedule = DeliverySchedule::new(business_hours()?)
            .with_auto_generate(SlotInterval::hours(2)?)
            .with_maximum_notice(Duration::hours(6))?;

        // At 08:00, a 6-hour horizon admits starts up to 14:00.
        let slots = schedule.generate_slots(monday(), monday_at(8, 0), &no_bookings())?;
        let rendered: Vec<String> = slots.iter().map(ToString::to_string).collect();
        assert_eq!(
            rendered,
            vec!["09:00 - 11:00", "11:00 - 13:00", "13:00 - 15:00"]
        );

        // A week out, everything is beyond the horizon.
        let next_monday = NaiveDate::from_ymd_opt(2026, 8, 17).unwrap_or_default();
        let future = schedule.generate_slots(next_monday, monday_at(8, 0), &no_bookings())?;
        assert!(future.is_empty());

        Ok(())
    }

    #[test]
    fn daily_order_limit_excludes_full_slots() -> TestResult {
        let schedule = DeliverySchedule::new(business_hours()?)
            .with_auto_generate(SlotInterval::hours(2)?)
            .with_daily_order_limit(2);

        let mut booked = no_bookings();
        booked.insert(TimeSlot::new(time(9, 0), time(11, 0)), 2);
        booked.insert(TimeSlot::new(time(11, 0), time(13, 0)), 1);

        let slots = schedule.generate_slots(monday(), monday_at(6, 0), &booked)?;
        let rendered: Vec<String> = slots.iter().map(ToString::to_string).collect();

        assert_eq!(
            rendered,
            vec!["11:00 - 13:00", "13:00 - 15:00", "15:00 - 17:00"]
        );

        Ok(())
    }

    #[test]
    fn generation_is_idempotent_and_ordered() -> TestResult {
        let schedule = DeliverySchedule::new(business_hours()?)
            .with_auto_generate(SlotInterval::minutes(45)?);

        let first = schedule.generate_slots(monday(), monday_at(6, 0), &no_bookings())?;
        let second = schedule.generate_slots(monday(), monday_at(6, 0), &no_bookings())?;

        assert_eq!(first, second);
        assert!(
            first
                .windows(2)
                .all(|pair| matches!(pair, [a, b] if a.start() < b.start())),
            "slots must be strictly ascending by start time"
        );

        Ok(())
    }

    #[test]
    fn inverted_notice_window_is_rejected() -> TestResult {
        let result = DeliverySchedule::new(business_hours()?)
            .with_maximum_notice(Duration::hours(2))?
            .with_minimum_notice(Duration::hours(4));

        assert!(matches!(
            result,
            Err(DeliveryConfigError::NoticeWindowInverted)
        ));

        Ok(())
    }

    #[test]
    fn overlapping_windows_are_rejected() -> TestResult {
        let mut hours = OperationalHours::new();
        hours.add_window(Weekday::Mon, time(9, 0), time(12, 0))?;

        let result = hours.add_window(Weekday::Mon, time(11, 0), time(14, 0));

        assert!(matches!(
            result,
            Err(DeliveryConfigError::OverlappingWindows)
        ));

        Ok(())
    }

    #[test]
    fn inverted_window_is_rejected() {
        let mut hours = OperationalHours::new();

        let result = hours.add_window(Weekday::Mon, time(17, 0), time(9, 0));

        assert!(matches!(result, Err(DeliveryConfigError::WindowInverted)));
    }

    #[test]
    fn zero_interval_is_rejected() {
        assert!(matches!(
            SlotInterval::minutes(0),
            Err(DeliveryConfigError::ZeroInterval)
        ));
    }

    #[test]
    fn slot_renders_as_bounded_window() {
        let slot = TimeSlot::new(time(9, 0), time(11, 0));

        assert_eq!(slot.to_string(), "09:00 - 11:00");
    }
}
