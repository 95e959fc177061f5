//! The polling loop.
//!
//! Coarse 1s wall-clock poll (anything up to 60s resolution is acceptable,
//! the armed minute is matched exactly once per day). Each day's job
//! invocation is isolated: whatever it returns, the loop records the fire
//! and keeps polling for subsequent days. A watch channel stops the loop
//! for clean process shutdown.

use std::sync::Arc;
use std::time::Duration;

use chrono::{Local, NaiveDate, NaiveTime};
use tokio::sync::watch;

use planbot_calendar::Calendar;

use crate::executor::{TaskExecutor, Trigger};
use crate::schedule::Schedule;

pub async fn run_loop(
    schedule: Arc<Schedule>,
    calendar: Calendar,
    executor: Arc<TaskExecutor>,
    tick_secs: u64,
    mut shutdown: watch::Receiver<bool>,
) {
    tracing::info!(
        "scheduler started: daily at {} on workdays, polling every {}s",
        schedule.current(),
        tick_secs.max(1)
    );
    let mut interval = tokio::time::interval(Duration::from_secs(tick_secs.max(1)));

    loop {
        tokio::select! {
            _ = interval.tick() => {}
            _ = shutdown.changed() => {
                tracing::info!("scheduler loop stopping");
                return;
            }
        }
        let now = Local::now();
        poll_once(&schedule, calendar, &executor, now.date_naive(), now.time()).await;
    }
}

/// One poll step: fire at most once per date, skipping holidays.
///
/// A holiday still marks the date as fired — otherwise the same minute
/// window would re-check it on every tick.
pub(crate) async fn poll_once(
    schedule: &Schedule,
    calendar: Calendar,
    executor: &TaskExecutor,
    date: NaiveDate,
    time: NaiveTime,
) {
    if !schedule.due_at(date, time) {
        return;
    }

    if let Some(label) = calendar.holiday_label(date) {
        tracing::info!("today is {label}, skipping the daily submission");
        schedule.mark_fired(date);
        return;
    }

    match executor.run(Trigger::Scheduled).await {
        Ok(report) if report.success => {
            tracing::info!("scheduled run finished: {}", report.message);
        }
        Ok(report) => {
            tracing::warn!("scheduled run failed: {}", report.message);
        }
        Err(e) => {
            tracing::error!("scheduled run error: {e}");
        }
    }
    schedule.mark_fired(date);
}
