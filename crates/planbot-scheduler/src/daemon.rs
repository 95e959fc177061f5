//! The assembled service.
//!
//! One facade the CLI (and any front end) drives: schedule get/set, manual
//! trigger, plan CRUD, batch holiday lookup — thin pass-throughs to the
//! underlying components — plus the long-running engine loop.

use std::collections::BTreeMap;
use std::sync::Arc;

use chrono::NaiveDate;
use tokio::sync::watch;

use planbot_calendar::Calendar;
use planbot_core::error::{PlanbotError, Result};
use planbot_core::traits::{PlanDraft, PlanGenerator};
use planbot_store::{MergeMode, PlanStore, WorkPlan};

use crate::engine;
use crate::executor::{RunReport, TaskExecutor, Trigger};
use crate::schedule::Schedule;

pub struct Daemon {
    schedule: Arc<Schedule>,
    calendar: Calendar,
    store: Arc<PlanStore>,
    executor: Arc<TaskExecutor>,
    generator: Option<Arc<dyn PlanGenerator>>,
    tick_secs: u64,
}

impl Daemon {
    pub fn new(
        schedule: Arc<Schedule>,
        calendar: Calendar,
        store: Arc<PlanStore>,
        executor: Arc<TaskExecutor>,
        generator: Option<Arc<dyn PlanGenerator>>,
        tick_secs: u64,
    ) -> Self {
        Self {
            schedule,
            calendar,
            store,
            executor,
            generator,
            tick_secs,
        }
    }

    // ─── Schedule ──────────────────────────────────────

    pub fn schedule_time(&self) -> String {
        self.schedule.current()
    }

    pub fn set_schedule_time(&self, time: &str) -> Result<()> {
        self.schedule.apply(time)
    }

    // ─── Runs ──────────────────────────────────────────

    /// Trigger one submission now, bypassing the fire-time check but not
    /// the single-flight guard.
    pub async fn trigger(&self) -> Result<RunReport> {
        self.executor.run(Trigger::Manual).await
    }

    // ─── Plans ─────────────────────────────────────────

    pub fn plans(&self) -> Result<Vec<WorkPlan>> {
        self.store.all_plans()
    }

    pub fn plans_for(&self, date: NaiveDate) -> Result<Vec<WorkPlan>> {
        self.store.plans_for(date)
    }

    pub fn save_plan(
        &self,
        date: NaiveDate,
        todo: &str,
        progress: &str,
        mode: MergeMode,
    ) -> Result<()> {
        self.store.add_or_update(date, todo, progress, mode)
    }

    pub fn update_plan(&self, id: i64, todo: &str, progress: &str) -> Result<()> {
        self.store.update(id, todo, progress)
    }

    pub fn delete_plan(&self, id: i64) -> Result<()> {
        self.store.delete(id)
    }

    pub fn clear_range(&self, start: NaiveDate, end: NaiveDate) -> Result<()> {
        self.store.clear_range(start, end)
    }

    pub fn clear_all(&self) -> Result<()> {
        self.store.clear_all()
    }

    /// Break a requirement into per-workday drafts and persist them.
    ///
    /// Only workdays inside `[start, end]` get a draft; overwrite mode
    /// clears the whole range first so stale days inside it disappear.
    pub async fn generate_plans(
        &self,
        requirement: &str,
        start: NaiveDate,
        end: NaiveDate,
        mode: MergeMode,
    ) -> Result<Vec<PlanDraft>> {
        let Some(generator) = &self.generator else {
            return Err(PlanbotError::Generator(
                "no plan generator configured (generator.base_url)".into(),
            ));
        };
        let workdays = self.calendar.workdays_in_range(start, end);
        if workdays.is_empty() {
            return Err(PlanbotError::Generator(format!(
                "no workdays between {start} and {end}"
            )));
        }
        let drafts = generator.generate(requirement, &workdays).await?;
        self.store.save_drafts(&drafts, mode, Some((start, end)))?;
        tracing::info!("generated and saved {} daily drafts", drafts.len());
        Ok(drafts)
    }

    // ─── Calendar ──────────────────────────────────────

    pub fn holiday_label(&self, date: NaiveDate) -> Option<String> {
        self.calendar.holiday_label(date)
    }

    pub fn holidays(&self, start: NaiveDate, end: NaiveDate) -> BTreeMap<NaiveDate, String> {
        self.calendar.holidays_in_range(start, end)
    }

    pub fn workdays(&self, start: NaiveDate, end: NaiveDate) -> Vec<NaiveDate> {
        self.calendar.workdays_in_range(start, end)
    }

    // ─── Lifecycle ─────────────────────────────────────

    /// Run the engine loop until ctrl-c, then stop it cleanly.
    pub async fn run_until_shutdown(&self) {
        let (stop_tx, stop_rx) = watch::channel(false);
        let handle = tokio::spawn(engine::run_loop(
            self.schedule.clone(),
            self.calendar,
            self.executor.clone(),
            self.tick_secs,
            stop_rx,
        ));

        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("failed to listen for shutdown signal: {e}");
        }
        tracing::info!("shutdown requested");
        let _ = stop_tx.send(true);
        let _ = handle.await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testutil::{MockAgent, MockGenerator, RecordingSink, StaticEvidence};
    use chrono::Datelike;
    use planbot_calendar::CalendarMode;
    use std::time::Duration;

    fn daemon_with(generator: Option<Arc<dyn PlanGenerator>>) -> Daemon {
        let store = Arc::new(PlanStore::open_in_memory().unwrap());
        let executor = Arc::new(TaskExecutor::new(
            store.clone(),
            Arc::new(MockAgent::succeeding(None)),
            Arc::new(StaticEvidence::returning(None)),
            Arc::new(RecordingSink::default()),
            Duration::from_secs(60),
        ));
        Daemon::new(
            Arc::new(Schedule::from_config("18:00")),
            Calendar::new(CalendarMode::Official),
            store,
            executor,
            generator,
            1,
        )
    }

    fn daemon() -> Daemon {
        daemon_with(None)
    }

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    #[tokio::test]
    async fn control_surface_passes_through() {
        let daemon = daemon();

        assert_eq!(daemon.schedule_time(), "18:00");
        daemon.set_schedule_time("09:30").unwrap();
        assert_eq!(daemon.schedule_time(), "09:30");
        assert!(daemon.set_schedule_time("not a time").is_err());
        assert_eq!(daemon.schedule_time(), "09:30");

        daemon
            .save_plan(d(2025, 6, 2), "a\nb", "p", MergeMode::Overwrite)
            .unwrap();
        let plans = daemon.plans_for(d(2025, 6, 2)).unwrap();
        assert_eq!(plans[0].todo, "1. a\n2. b");
        daemon.delete_plan(plans[0].id).unwrap();
        assert!(daemon.plans().unwrap().is_empty());

        assert_eq!(
            daemon.holiday_label(d(2025, 10, 1)).as_deref(),
            Some("National Day")
        );
        assert!(!daemon.workdays(d(2025, 9, 29), d(2025, 10, 12)).is_empty());

        // Manual trigger with no plan for today → structured failure.
        let report = daemon.trigger().await.unwrap();
        assert!(!report.success);
        assert_eq!(report.message, "no plan for today");
    }

    #[tokio::test]
    async fn generate_plans_covers_workdays_only_and_saves() {
        let daemon = daemon_with(Some(Arc::new(MockGenerator::default())));
        // Mon 2025-06-02 through Sun 2025-06-08: five workdays.
        let drafts = daemon
            .generate_plans("build a CRM", d(2025, 6, 2), d(2025, 6, 8), MergeMode::Overwrite)
            .await
            .unwrap();
        assert_eq!(drafts.len(), 5);
        assert!(drafts.iter().all(|dr| dr.date.weekday().num_days_from_monday() < 5));
        let saved = daemon.plans_for(d(2025, 6, 2)).unwrap();
        assert_eq!(saved[0].todo, "1. work on build a CRM");
        assert!(daemon.plans_for(d(2025, 6, 7)).unwrap().is_empty());
    }

    #[tokio::test]
    async fn generate_overwrite_clears_stale_days_in_range() {
        let daemon = daemon_with(Some(Arc::new(MockGenerator::default())));
        // Saturday inside the range carries a stale plan; overwrite drops it.
        daemon
            .save_plan(d(2025, 6, 7), "stale weekend plan", "", MergeMode::Overwrite)
            .unwrap();
        daemon
            .generate_plans("build a CRM", d(2025, 6, 2), d(2025, 6, 8), MergeMode::Overwrite)
            .await
            .unwrap();
        assert!(daemon.plans_for(d(2025, 6, 7)).unwrap().is_empty());
    }

    #[tokio::test]
    async fn generate_without_a_generator_is_an_error() {
        let daemon = daemon();
        let err = daemon
            .generate_plans("x", d(2025, 6, 2), d(2025, 6, 3), MergeMode::Overwrite)
            .await
            .unwrap_err();
        assert!(err.to_string().contains("no plan generator configured"));
    }

    #[tokio::test]
    async fn generate_over_a_holiday_only_range_is_an_error() {
        let daemon = daemon_with(Some(Arc::new(MockGenerator::default())));
        // National Day week 2025: no workdays at all.
        let err = daemon
            .generate_plans("x", d(2025, 10, 1), d(2025, 10, 5), MergeMode::Overwrite)
            .await
            .unwrap_err();
        assert!(err.to_string().contains("no workdays"));
    }
}
