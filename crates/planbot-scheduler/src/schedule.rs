//! The armed daily fire time.
//!
//! One mutex-guarded state object shared by the engine loop and the control
//! surface — no free-floating global. Readers always observe either the
//! previous or the new configuration, never a torn value.

use std::sync::Mutex;

use chrono::{DateTime, Local, NaiveDate, NaiveTime, Timelike};

use planbot_core::error::{PlanbotError, Result};

pub const DEFAULT_FIRE_TIME: &str = "18:00";

#[derive(Debug, Clone, Copy)]
struct ScheduleState {
    fire_time: NaiveTime,
    /// Guarantees at most one fire per calendar date.
    last_fired: Option<NaiveDate>,
}

#[derive(Debug)]
pub struct Schedule {
    state: Mutex<ScheduleState>,
}

impl Schedule {
    /// Arm with the configured "HH:MM" value; a malformed value logs a
    /// warning and arms the 18:00 default instead.
    pub fn from_config(time_str: &str) -> Self {
        let fire_time = parse_fire_time(time_str).unwrap_or_else(|_| {
            tracing::warn!(
                "invalid scheduler.time '{time_str}', falling back to {DEFAULT_FIRE_TIME}"
            );
            parse_fire_time(DEFAULT_FIRE_TIME).expect("default fire time is valid")
        });
        Self {
            state: Mutex::new(ScheduleState {
                fire_time,
                last_fired: None,
            }),
        }
    }

    /// Replace the armed time. Invalid input returns a config error and
    /// leaves the prior schedule untouched.
    pub fn apply(&self, time_str: &str) -> Result<()> {
        let fire_time = parse_fire_time(time_str)?;
        let mut state = self.state.lock().unwrap();
        state.fire_time = fire_time;
        tracing::info!("daily trigger rearmed for {}", state.fire_time.format("%H:%M"));
        Ok(())
    }

    /// The live armed time as "HH:MM".
    pub fn current(&self) -> String {
        self.state
            .lock()
            .unwrap()
            .fire_time
            .format("%H:%M")
            .to_string()
    }

    /// True when `now` is inside the armed minute and today has not fired.
    pub fn due(&self, now: DateTime<Local>) -> bool {
        self.due_at(now.date_naive(), now.time())
    }

    pub(crate) fn due_at(&self, date: NaiveDate, time: NaiveTime) -> bool {
        let state = self.state.lock().unwrap();
        state.last_fired != Some(date)
            && time.hour() == state.fire_time.hour()
            && time.minute() == state.fire_time.minute()
    }

    /// Record a fire so the date cannot trigger again, regardless of
    /// polling granularity.
    pub fn mark_fired(&self, date: NaiveDate) {
        self.state.lock().unwrap().last_fired = Some(date);
    }

    pub fn last_fired(&self) -> Option<NaiveDate> {
        self.state.lock().unwrap().last_fired
    }
}

fn parse_fire_time(s: &str) -> Result<NaiveTime> {
    NaiveTime::parse_from_str(s.trim(), "%H:%M")
        .map_err(|_| PlanbotError::Config(format!("invalid time '{s}', expected HH:MM")))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn t(h: u32, m: u32) -> NaiveTime {
        NaiveTime::from_hms_opt(h, m, 0).unwrap()
    }

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    #[test]
    fn invalid_reschedule_is_rejected_and_keeps_prior() {
        let schedule = Schedule::from_config("08:15");
        assert!(schedule.apply("25:99").is_err());
        assert!(schedule.apply("9am").is_err());
        assert_eq!(schedule.current(), "08:15");
    }

    #[test]
    fn valid_reschedule_is_visible_immediately() {
        let schedule = Schedule::from_config("18:00");
        schedule.apply("09:30").unwrap();
        assert_eq!(schedule.current(), "09:30");
    }

    #[test]
    fn invalid_config_falls_back_to_default() {
        let schedule = Schedule::from_config("sometime");
        assert_eq!(schedule.current(), DEFAULT_FIRE_TIME);
    }

    #[test]
    fn due_only_inside_armed_minute() {
        let schedule = Schedule::from_config("18:00");
        let day = d(2025, 6, 2);
        assert!(schedule.due_at(day, t(18, 0)));
        assert!(!schedule.due_at(day, t(17, 59)));
        assert!(!schedule.due_at(day, t(18, 1)));
    }

    #[test]
    fn fired_date_never_refires() {
        let schedule = Schedule::from_config("18:00");
        let day = d(2025, 6, 2);
        schedule.mark_fired(day);
        assert!(!schedule.due_at(day, t(18, 0)));
        // The next day is due again.
        assert!(schedule.due_at(d(2025, 6, 3), t(18, 0)));
    }

    #[test]
    fn rearming_before_the_trigger_keeps_today_pending() {
        let schedule = Schedule::from_config("18:00");
        let day = d(2025, 6, 2);
        schedule.apply("20:30").unwrap();
        assert!(!schedule.due_at(day, t(18, 0)));
        assert!(schedule.due_at(day, t(20, 30)));
    }

    #[test]
    fn concurrent_readers_see_consistent_values() {
        use std::sync::Arc;
        let schedule = Arc::new(Schedule::from_config("18:00"));
        let writer = {
            let schedule = schedule.clone();
            std::thread::spawn(move || {
                for _ in 0..200 {
                    schedule.apply("09:30").unwrap();
                    schedule.apply("18:00").unwrap();
                }
            })
        };
        for _ in 0..500 {
            let seen = schedule.current();
            assert!(seen == "09:30" || seen == "18:00", "torn read: {seen}");
        }
        writer.join().unwrap();
    }
}
