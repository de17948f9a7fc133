//! Daily completion reset.
//!
//! # Responsibility
//! - Clear yesterday's completion flags so daily tasks reopen each morning.
//! - Detect local date rollover by polling and run a callback once per
//!   detected change.
//!
//! # Invariants
//! - `last_completed` is never cleared; only `completed` flips back.
//! - Missed midnights are not replayed: a worker started after a rollover
//!   sees only the date it starts on.

use crate::clock::Clock;
use crate::model::task::Task;
use chrono::NaiveDate;
use log::{debug, info, warn};
use std::sync::mpsc::{self, RecvTimeoutError, Sender};
use std::thread::JoinHandle;
use std::time::Duration;

/// Default rollover poll period.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(60);

/// Reopens tasks whose completion belongs to an earlier day.
///
/// Returns how many tasks changed.
pub fn reset_completed_tasks(tasks: &mut [Task], today: NaiveDate) -> usize {
    let mut changed = 0;
    for task in tasks.iter_mut() {
        if task.completed && task.last_completed != Some(today) {
            task.completed = false;
            changed += 1;
        }
    }
    changed
}

/// Edge detector for local date changes.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RolloverDetector {
    last_seen: Option<NaiveDate>,
}

impl RolloverDetector {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records `today` and reports whether it differs from the previous
    /// observation. The first observation never fires.
    pub fn observe(&mut self, today: NaiveDate) -> bool {
        match self.last_seen.replace(today) {
            Some(previous) => previous != today,
            None => false,
        }
    }

    pub fn last_seen(&self) -> Option<NaiveDate> {
        self.last_seen
    }
}

/// Background thread that polls a clock and fires on date rollover.
///
/// The thread ends when [`DailyResetWorker::stop`] is called or the worker
/// is dropped.
pub struct DailyResetWorker {
    stop_tx: Option<Sender<()>>,
    handle: Option<JoinHandle<()>>,
}

impl DailyResetWorker {
    /// Spawns the polling thread.
    ///
    /// `on_rollover` receives the new local date. It runs on the worker
    /// thread and must open its own storage handles.
    pub fn spawn<C, F>(
        clock: C,
        poll_interval: Duration,
        mut on_rollover: F,
    ) -> std::io::Result<Self>
    where
        C: Clock + Send + 'static,
        F: FnMut(NaiveDate) + Send + 'static,
    {
        let (stop_tx, stop_rx) = mpsc::channel::<()>();
        let mut detector = RolloverDetector::new();
        detector.observe(clock.today());
        let handle = std::thread::Builder::new()
            .name("eko-daily-reset".to_string())
            .spawn(move || {
                info!(
                    "event=daily_reset module=schedule status=start poll_ms={}",
                    poll_interval.as_millis()
                );
                loop {
                    match stop_rx.recv_timeout(poll_interval) {
                        Err(RecvTimeoutError::Timeout) => {
                            let today = clock.today();
                            if detector.observe(today) {
                                debug!(
                                    "event=daily_reset module=schedule status=rollover date={today}"
                                );
                                on_rollover(today);
                            }
                        }
                        Ok(()) | Err(RecvTimeoutError::Disconnected) => break,
                    }
                }
                info!("event=daily_reset module=schedule status=stopped");
            })?;

        Ok(Self {
            stop_tx: Some(stop_tx),
            handle: Some(handle),
        })
    }

    /// Spawns a worker on the default 60 second poll interval.
    pub fn spawn_default<C, F>(clock: C, on_rollover: F) -> std::io::Result<Self>
    where
        C: Clock + Send + 'static,
        F: FnMut(NaiveDate) + Send + 'static,
    {
        Self::spawn(clock, DEFAULT_POLL_INTERVAL, on_rollover)
    }

    pub fn is_running(&self) -> bool {
        self.handle
            .as_ref()
            .is_some_and(|handle| !handle.is_finished())
    }

    /// Signals the thread and waits for it to exit. Safe to call twice.
    pub fn stop(&mut self) {
        if let Some(stop_tx) = self.stop_tx.take() {
            let _ = stop_tx.send(());
        }
        if let Some(handle) = self.handle.take() {
            if handle.join().is_err() {
                warn!("event=daily_reset module=schedule status=error reason=worker_panicked");
            }
        }
    }
}

impl Drop for DailyResetWorker {
    fn drop(&mut self) {
        self.stop();
    }
}

#[cfg(test)]
mod tests {
    use super::{reset_completed_tasks, DailyResetWorker, RolloverDetector};
    use crate::clock::Clock;
    use crate::model::task::Task;
    use chrono::{DateTime, Datelike, NaiveDate, Utc};
    use std::sync::atomic::{AtomicI64, Ordering};
    use std::sync::mpsc;
    use std::sync::Arc;
    use std::time::Duration;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).expect("valid date")
    }

    #[derive(Clone)]
    struct SharedClock(Arc<AtomicI64>);

    impl SharedClock {
        fn new(day: NaiveDate) -> Self {
            let clock = Self(Arc::new(AtomicI64::new(0)));
            clock.set(day);
            clock
        }

        fn set(&self, day: NaiveDate) {
            self.0
                .store(i64::from(day.num_days_from_ce()), Ordering::SeqCst);
        }
    }

    impl Clock for SharedClock {
        fn today(&self) -> NaiveDate {
            let days = self.0.load(Ordering::SeqCst) as i32;
            NaiveDate::from_num_days_from_ce_opt(days).expect("valid day number")
        }

        fn now(&self) -> DateTime<Utc> {
            Utc::now()
        }
    }

    #[test]
    fn reset_reopens_only_stale_completions() {
        let today = date(2024, 5, 10);
        let mut stale = Task::new("stale", "all");
        stale.completed = true;
        stale.last_completed = Some(date(2024, 5, 9));
        let mut fresh = Task::new("fresh", "all");
        fresh.completed = true;
        fresh.last_completed = Some(today);
        let open = Task::new("open", "all");
        let mut tasks = vec![stale, fresh, open];

        assert_eq!(reset_completed_tasks(&mut tasks, today), 1);
        assert!(!tasks[0].completed);
        assert_eq!(tasks[0].last_completed, Some(date(2024, 5, 9)));
        assert!(tasks[1].completed);
        assert_eq!(reset_completed_tasks(&mut tasks, today), 0);
    }

    #[test]
    fn detector_fires_once_per_change_and_not_on_first_sight() {
        let mut detector = RolloverDetector::new();
        assert!(!detector.observe(date(2024, 5, 10)));
        assert!(!detector.observe(date(2024, 5, 10)));
        assert!(detector.observe(date(2024, 5, 11)));
        assert!(!detector.observe(date(2024, 5, 11)));
        assert_eq!(detector.last_seen(), Some(date(2024, 5, 11)));
    }

    #[test]
    fn worker_fires_on_rollover_and_stops_on_drop() {
        let clock = SharedClock::new(date(2024, 5, 10));
        let (fired_tx, fired_rx) = mpsc::channel();
        let mut worker = DailyResetWorker::spawn(
            clock.clone(),
            Duration::from_millis(5),
            move |day| {
                let _ = fired_tx.send(day);
            },
        )
        .expect("worker should spawn");
        assert!(worker.is_running());

        clock.set(date(2024, 5, 11));
        let fired = fired_rx
            .recv_timeout(Duration::from_secs(5))
            .expect("rollover should fire");
        assert_eq!(fired, date(2024, 5, 11));

        worker.stop();
        assert!(!worker.is_running());
        drop(worker);
        assert!(fired_rx.recv_timeout(Duration::from_millis(50)).is_err());
    }
}
