//! Pomodoro countdown state machine.
//!
//! The machine is driven by an external one-second tick. It holds no clock
//! of its own, so every transition is deterministic and testable.

use serde::{Deserialize, Serialize};

use crate::error::{CoreError, Result};

/// Durations offered by the focus screen, in minutes.
pub const PRESET_DURATIONS: [u32; 4] = [10, 15, 20, 25];
pub const DEFAULT_DURATION: u32 = 25;

/// What a single tick did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickOutcome {
    /// The timer was not running; nothing changed.
    Idle,
    /// One second elapsed.
    Ticked,
    /// The countdown reached zero and the timer stopped.
    Completed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TimerPhase {
    Idle,
    Running,
    Paused,
    Completed,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PomodoroTimer {
    duration_minutes: u32,
    minutes: u32,
    seconds: u32,
    running: bool,
}

impl Default for PomodoroTimer {
    fn default() -> Self {
        Self::new(DEFAULT_DURATION)
    }
}

impl PomodoroTimer {
    /// Timer armed with `duration_minutes`, not running.
    ///
    /// Any duration is accepted here; [`set_duration`](Self::set_duration)
    /// is the user-facing path restricted to the presets.
    pub fn new(duration_minutes: u32) -> Self {
        Self {
            duration_minutes,
            minutes: duration_minutes,
            seconds: 0,
            running: false,
        }
    }

    pub fn duration_minutes(&self) -> u32 {
        self.duration_minutes
    }

    pub fn minutes(&self) -> u32 {
        self.minutes
    }

    pub fn seconds(&self) -> u32 {
        self.seconds
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    pub fn remaining_seconds(&self) -> u32 {
        self.minutes * 60 + self.seconds
    }

    pub fn total_seconds(&self) -> u32 {
        self.duration_minutes * 60
    }

    pub fn phase(&self) -> TimerPhase {
        if self.running {
            TimerPhase::Running
        } else if self.remaining_seconds() == 0 {
            TimerPhase::Completed
        } else if self.remaining_seconds() == self.total_seconds() {
            TimerPhase::Idle
        } else {
            TimerPhase::Paused
        }
    }

    pub fn start(&mut self) {
        if self.running {
            return;
        }
        if self.remaining_seconds() == 0 {
            self.rearm();
        }
        self.running = true;
    }

    pub fn pause(&mut self) {
        self.running = false;
    }

    /// Play/pause button.
    pub fn toggle(&mut self) {
        if self.running {
            self.pause();
        } else {
            self.start();
        }
    }

    /// Stop and restore the configured duration. Also used for "skip".
    pub fn reset(&mut self) {
        self.running = false;
        self.rearm();
    }

    /// Pick a preset duration. Refused while the countdown runs.
    pub fn set_duration(&mut self, minutes: u32) -> Result<()> {
        if !PRESET_DURATIONS.contains(&minutes) {
            return Err(CoreError::InvalidDuration(minutes));
        }
        if self.running {
            return Err(CoreError::TimerRunning);
        }
        self.duration_minutes = minutes;
        self.rearm();
        Ok(())
    }

    pub fn tick(&mut self) -> TickOutcome {
        if !self.running {
            return TickOutcome::Idle;
        }
        if self.seconds > 0 {
            self.seconds -= 1;
        } else if self.minutes > 0 {
            self.minutes -= 1;
            self.seconds = 59;
        }
        if self.remaining_seconds() == 0 {
            self.running = false;
            return TickOutcome::Completed;
        }
        TickOutcome::Ticked
    }

    /// Elapsed share of the configured duration, in `[0, 1]`.
    pub fn progress(&self) -> f64 {
        let total = self.total_seconds();
        if total == 0 {
            return 1.0;
        }
        let elapsed = total.saturating_sub(self.remaining_seconds());
        f64::from(elapsed) / f64::from(total)
    }

    /// Remaining time as `MM:SS`.
    pub fn display(&self) -> String {
        format!("{:02}:{:02}", self.minutes, self.seconds)
    }

    fn rearm(&mut self) {
        self.minutes = self.duration_minutes;
        self.seconds = 0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn run_ticks(timer: &mut PomodoroTimer, n: u32) -> u32 {
        let mut completions = 0;
        for _ in 0..n {
            if timer.tick() == TickOutcome::Completed {
                completions += 1;
            }
        }
        completions
    }

    #[test]
    fn starts_idle_at_full_duration() {
        let timer = PomodoroTimer::default();
        assert_eq!(timer.display(), "25:00");
        assert_eq!(timer.phase(), TimerPhase::Idle);
        assert_eq!(timer.progress(), 0.0);
    }

    #[test]
    fn tick_is_ignored_when_not_running() {
        let mut timer = PomodoroTimer::new(10);
        assert_eq!(timer.tick(), TickOutcome::Idle);
        assert_eq!(timer.remaining_seconds(), 600);
    }

    #[test]
    fn remaining_time_tracks_elapsed_ticks() {
        for n in [1u32, 59, 60, 61, 599, 1499] {
            let mut timer = PomodoroTimer::new(25);
            timer.start();
            assert_eq!(run_ticks(&mut timer, n), 0);
            assert_eq!(timer.remaining_seconds(), 25 * 60 - n);
            assert!(timer.seconds() <= 59);
            assert!(timer.is_running());
        }
    }

    #[test]
    fn completes_exactly_once_after_full_duration() {
        let mut timer = PomodoroTimer::new(25);
        timer.start();

        assert_eq!(run_ticks(&mut timer, 1499), 0);
        assert_eq!(timer.display(), "00:01");
        assert_eq!(timer.tick(), TickOutcome::Completed);
        assert_eq!(timer.display(), "00:00");
        assert!(!timer.is_running());
        assert_eq!(timer.phase(), TimerPhase::Completed);
        assert_eq!(run_ticks(&mut timer, 10), 0);
        assert_eq!(timer.progress(), 1.0);
    }

    #[test]
    fn pause_preserves_remaining_time() {
        let mut timer = PomodoroTimer::new(10);
        timer.start();
        run_ticks(&mut timer, 75);
        timer.pause();

        assert_eq!(timer.display(), "08:45");
        assert_eq!(timer.phase(), TimerPhase::Paused);
        assert_eq!(run_ticks(&mut timer, 30), 0);
        assert_eq!(timer.display(), "08:45");
    }

    #[test]
    fn start_twice_is_noop() {
        let mut timer = PomodoroTimer::new(10);
        timer.start();
        timer.tick();
        timer.start();
        assert_eq!(timer.remaining_seconds(), 599);
    }

    #[test]
    fn toggle_alternates_running() {
        let mut timer = PomodoroTimer::default();
        timer.toggle();
        assert!(timer.is_running());
        timer.toggle();
        assert!(!timer.is_running());
    }

    #[test]
    fn reset_restores_duration() {
        let mut timer = PomodoroTimer::new(15);
        timer.start();
        run_ticks(&mut timer, 100);
        timer.reset();
        assert_eq!(timer.display(), "15:00");
        assert!(!timer.is_running());
    }

    #[test]
    fn restart_after_completion_rearms() {
        let mut timer = PomodoroTimer::new(10);
        timer.start();
        assert_eq!(run_ticks(&mut timer, 600), 1);
        assert_eq!(timer.phase(), TimerPhase::Completed);

        timer.start();
        assert_eq!(timer.display(), "10:00");
        assert_eq!(timer.tick(), TickOutcome::Ticked);
    }

    #[test]
    fn set_duration_validates_presets_and_running_state() {
        let mut timer = PomodoroTimer::default();
        assert_eq!(timer.set_duration(12), Err(CoreError::InvalidDuration(12)));

        timer.set_duration(15).unwrap();
        assert_eq!(timer.display(), "15:00");

        timer.start();
        assert_eq!(timer.set_duration(20), Err(CoreError::TimerRunning));
        assert_eq!(timer.duration_minutes(), 15);
    }

    #[test]
    fn progress_is_elapsed_over_total() {
        let mut timer = PomodoroTimer::new(10);
        timer.start();
        run_ticks(&mut timer, 150);
        assert!((timer.progress() - 0.25).abs() < 1e-9);
    }
}
