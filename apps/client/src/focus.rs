//! Runs a [`PomodoroTimer`] in real time.
//!
//! One tokio task ticks the machine each second while it runs. The task is
//! aborted on pause, reset and drop, so at most one interval ever drives the
//! timer. Ticks go through a small lossy channel; completions go through an
//! unbounded one, sent without awaiting, so the task has already finished by
//! the time anyone could abort it.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use tokio::sync::mpsc;
use tokio::sync::mpsc::error::TryRecvError;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::info;

use lumi_core::timer::DEFAULT_DURATION;
use lumi_core::{CoreError, PomodoroTimer, TickOutcome};

const EVENT_BUFFER: usize = 16;
const TICK_PERIOD: Duration = Duration::from_secs(1);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FocusEvent {
    /// Redraw hint; dropped when the receiver falls behind.
    Tick { remaining_seconds: u32 },
    /// The countdown reached 00:00. Sent once per countdown.
    Completed { duration_minutes: u32 },
}

fn lock(timer: &Mutex<PomodoroTimer>) -> MutexGuard<'_, PomodoroTimer> {
    timer.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Receiving side of a [`FocusTimer`].
///
/// Queued ticks are yielded before a queued completion.
pub struct FocusEvents {
    ticks: mpsc::Receiver<FocusEvent>,
    completions: mpsc::UnboundedReceiver<FocusEvent>,
}

impl FocusEvents {
    /// Wait for the next event. `None` once the timer has been dropped.
    pub async fn recv(&mut self) -> Option<FocusEvent> {
        tokio::select! {
            biased;
            Some(event) = self.ticks.recv() => Some(event),
            Some(event) = self.completions.recv() => Some(event),
            else => None,
        }
    }

    pub fn try_recv(&mut self) -> Result<FocusEvent, TryRecvError> {
        match self.ticks.try_recv() {
            Ok(event) => Ok(event),
            Err(_) => self.completions.try_recv(),
        }
    }
}

pub struct FocusTimer {
    timer: Arc<Mutex<PomodoroTimer>>,
    ticks: mpsc::Sender<FocusEvent>,
    completions: mpsc::UnboundedSender<FocusEvent>,
    task: Option<JoinHandle<()>>,
}

impl FocusTimer {
    pub fn new() -> (Self, FocusEvents) {
        Self::with_duration(DEFAULT_DURATION)
    }

    pub fn with_duration(duration_minutes: u32) -> (Self, FocusEvents) {
        let (ticks, ticks_rx) = mpsc::channel(EVENT_BUFFER);
        let (completions, completions_rx) = mpsc::unbounded_channel();
        let timer = Self {
            timer: Arc::new(Mutex::new(PomodoroTimer::new(duration_minutes))),
            ticks,
            completions,
            task: None,
        };
        let events = FocusEvents {
            ticks: ticks_rx,
            completions: completions_rx,
        };
        (timer, events)
    }

    /// Copy of the machine's current state.
    pub fn snapshot(&self) -> PomodoroTimer {
        lock(&self.timer).clone()
    }

    pub fn is_running(&self) -> bool {
        lock(&self.timer).is_running()
    }

    pub fn display(&self) -> String {
        lock(&self.timer).display()
    }

    /// Start counting down. Must be called from within a tokio runtime.
    pub fn start(&mut self) {
        lock(&self.timer).start();

        if self.task.as_ref().is_some_and(|t| !t.is_finished()) {
            return;
        }

        let timer = Arc::clone(&self.timer);
        let ticks = self.ticks.clone();
        let completions = self.completions.clone();
        self.task = Some(tokio::spawn(async move {
            let mut interval = tokio::time::interval(TICK_PERIOD);
            interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
            // The first tick completes immediately
            interval.tick().await;

            loop {
                interval.tick().await;
                let (outcome, remaining_seconds, duration_minutes) = {
                    let mut timer = lock(&timer);
                    let outcome = timer.tick();
                    (outcome, timer.remaining_seconds(), timer.duration_minutes())
                };

                match outcome {
                    TickOutcome::Ticked => {
                        let _ = ticks.try_send(FocusEvent::Tick { remaining_seconds });
                    }
                    TickOutcome::Completed => {
                        info!(duration_minutes, "Focus session completed");
                        let _ = completions.send(FocusEvent::Completed { duration_minutes });
                        break;
                    }
                    TickOutcome::Idle => break,
                }
            }
        }));
    }

    pub fn pause(&mut self) {
        self.stop_task();
        lock(&self.timer).pause();
    }

    pub fn toggle(&mut self) {
        if self.is_running() {
            self.pause();
        } else {
            self.start();
        }
    }

    /// Stop and re-arm the configured duration. Also serves as "skip".
    pub fn reset(&mut self) {
        self.stop_task();
        lock(&self.timer).reset();
    }

    pub fn set_duration(&mut self, minutes: u32) -> Result<(), CoreError> {
        lock(&self.timer).set_duration(minutes)
    }

    fn stop_task(&mut self) {
        if let Some(task) = self.task.take() {
            task.abort();
        }
    }
}

impl Drop for FocusTimer {
    fn drop(&mut self) {
        self.stop_task();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use tokio::time::Instant;

    async fn next_completion(rx: &mut FocusEvents) -> Option<u32> {
        while let Some(event) = rx.recv().await {
            if let FocusEvent::Completed { duration_minutes } = event {
                return Some(duration_minutes);
            }
        }
        None
    }

    #[tokio::test(start_paused = true)]
    async fn full_session_completes_once_after_duration() {
        let (mut timer, mut rx) = FocusTimer::new();
        let started = Instant::now();
        timer.start();

        assert_eq!(next_completion(&mut rx).await, Some(25));
        let elapsed = started.elapsed();
        assert!(elapsed >= Duration::from_secs(1500));
        assert!(elapsed < Duration::from_secs(1501));

        let state = timer.snapshot();
        assert!(!state.is_running());
        assert_eq!(state.display(), "00:00");

        // Nothing else arrives for that countdown
        tokio::time::sleep(Duration::from_secs(120)).await;
        assert!(rx.try_recv().is_err());
    }

    #[tokio::test(start_paused = true)]
    async fn pause_freezes_remaining_time() {
        let (mut timer, _rx) = FocusTimer::with_duration(10);
        timer.start();
        tokio::time::sleep(Duration::from_millis(90_500)).await;
        timer.pause();

        assert_eq!(timer.snapshot().remaining_seconds(), 600 - 90);

        tokio::time::sleep(Duration::from_secs(60)).await;
        assert_eq!(timer.snapshot().remaining_seconds(), 600 - 90);
    }

    #[tokio::test(start_paused = true)]
    async fn restarting_never_doubles_the_tick_rate() {
        let (mut timer, _rx) = FocusTimer::with_duration(10);
        timer.start();
        timer.start();
        timer.pause();
        timer.start();
        tokio::time::sleep(Duration::from_millis(10_500)).await;

        assert_eq!(timer.snapshot().remaining_seconds(), 600 - 10);
    }

    #[tokio::test(start_paused = true)]
    async fn reset_rearms_the_duration() {
        let (mut timer, _rx) = FocusTimer::with_duration(15);
        timer.start();
        tokio::time::sleep(Duration::from_millis(5_500)).await;
        timer.reset();

        assert!(!timer.is_running());
        assert_eq!(timer.display(), "15:00");
    }

    #[tokio::test(start_paused = true)]
    async fn completion_survives_reset_without_draining() {
        let (mut timer, mut rx) = FocusTimer::with_duration(10);
        timer.start();
        tokio::time::sleep(Duration::from_millis(600_500)).await;
        timer.reset();

        let mut completions = 0;
        while let Ok(event) = rx.try_recv() {
            if let FocusEvent::Completed { duration_minutes } = event {
                assert_eq!(duration_minutes, 10);
                completions += 1;
            }
        }
        assert_eq!(completions, 1);
    }

    #[tokio::test(start_paused = true)]
    async fn restart_after_undrained_completion_ticks_again() {
        let (mut timer, _rx) = FocusTimer::with_duration(10);
        timer.start();
        tokio::time::sleep(Duration::from_millis(600_500)).await;
        assert_eq!(timer.display(), "00:00");

        // Starting at 00:00 re-arms the countdown
        timer.start();
        tokio::time::sleep(Duration::from_millis(5_500)).await;
        assert_eq!(timer.snapshot().remaining_seconds(), 600 - 5);
    }

    #[tokio::test]
    async fn duration_change_is_refused_while_running() {
        let (mut timer, _rx) = FocusTimer::new();
        timer.start();
        assert_eq!(timer.set_duration(10), Err(CoreError::TimerRunning));
        timer.pause();
        assert_eq!(timer.set_duration(10), Ok(()));
        assert_eq!(timer.display(), "10:00");
    }
}
