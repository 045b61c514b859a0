//! Competition countdown timer.
//!
//! The timer itself never reads the clock. A surface owns a [`TickSchedule`]
//! and feeds one [`CountdownTimer::tick`] per elapsed second while the timer
//! is running; pausing or resetting cancels the schedule.

use std::time::{Duration, Instant};

pub const TICK_INTERVAL: Duration = Duration::from_secs(1);

const WARNING_SECONDS: u32 = 30;
const CRITICAL_SECONDS: u32 = 10;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimerState {
    Idle,
    Running,
    Paused,
    Expired,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimerEvent {
    Ticked { remaining: u32 },
    /// Reported once, on the tick that reaches zero.
    Expired,
    Ignored,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Urgency {
    Normal,
    Warning,
    Critical,
}

#[derive(Debug, Clone)]
pub struct CountdownTimer {
    default_seconds: u32,
    remaining: u32,
    state: TimerState,
}

impl CountdownTimer {
    pub fn new(default_seconds: u32) -> Self {
        Self {
            default_seconds,
            remaining: default_seconds,
            state: TimerState::Idle,
        }
    }

    pub fn state(&self) -> TimerState {
        self.state
    }

    pub fn remaining(&self) -> u32 {
        self.remaining
    }

    pub fn is_running(&self) -> bool {
        self.state == TimerState::Running
    }

    /// Idle/Paused -> Running. No-op while running or with nothing left.
    pub fn start(&mut self) -> bool {
        if self.is_running() || self.remaining == 0 {
            return false;
        }
        self.state = TimerState::Running;
        true
    }

    pub fn pause(&mut self) -> bool {
        if !self.is_running() {
            return false;
        }
        self.state = TimerState::Paused;
        true
    }

    /// Any state -> Idle with the default duration.
    pub fn reset(&mut self) {
        self.remaining = self.default_seconds;
        self.state = TimerState::Idle;
    }

    /// Presets the duration; refused while running.
    pub fn set(&mut self, seconds: u32) -> bool {
        if self.is_running() {
            return false;
        }
        self.remaining = seconds;
        self.state = TimerState::Idle;
        true
    }

    pub fn tick(&mut self) -> TimerEvent {
        if !self.is_running() {
            return TimerEvent::Ignored;
        }
        self.remaining = self.remaining.saturating_sub(1);
        if self.remaining == 0 {
            self.state = TimerState::Expired;
            TimerEvent::Expired
        } else {
            TimerEvent::Ticked {
                remaining: self.remaining,
            }
        }
    }

    /// `MM:SS`
    pub fn display(&self) -> String {
        format!("{:02}:{:02}", self.remaining / 60, self.remaining % 60)
    }

    pub fn urgency(&self) -> Urgency {
        match self.remaining {
            r if r <= CRITICAL_SECONDS => Urgency::Critical,
            r if r <= WARNING_SECONDS => Urgency::Warning,
            _ => Urgency::Normal,
        }
    }
}

/// The one pending "tick in a second" callback. At most one exists; arming
/// again while armed keeps the original deadline.
#[derive(Debug, Clone, Default)]
pub struct TickSchedule {
    next: Option<Instant>,
}

impl TickSchedule {
    pub fn arm(&mut self, now: Instant) {
        if self.next.is_none() {
            self.next = Some(now + TICK_INTERVAL);
        }
    }

    pub fn cancel(&mut self) {
        self.next = None;
    }

    pub fn is_armed(&self) -> bool {
        self.next.is_some()
    }

    /// Number of ticks that fell due by `now`; re-arms for the next one.
    pub fn due(&mut self, now: Instant) -> u32 {
        let Some(mut next) = self.next else {
            return 0;
        };
        let mut fired = 0;
        while next <= now {
            fired += 1;
            next += TICK_INTERVAL;
        }
        self.next = Some(next);
        fired
    }

    pub fn until_next(&self, now: Instant) -> Option<Duration> {
        self.next.map(|next| next.saturating_duration_since(now))
    }
}
