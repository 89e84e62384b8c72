use std::time::{Duration, Instant};

/// Seconds allowed per question.
pub const COUNTDOWN_SECS: u32 = 10;

const TICK: Duration = Duration::from_secs(1);

/// Per-question countdown.
///
/// There is a single deadline per countdown, so starting it again replaces
/// the previous run and no tick of the old run can be observed afterwards.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Countdown {
  #[default]
  Idle,
  Running {
    remaining: u32,
    next_tick: Instant,
  },
  Expired,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tick {
  /// Not running, nothing to do.
  Inactive,
  /// No second boundary passed since the last call.
  Unchanged,
  Counted(u32),
  /// Reached zero. Reported by exactly one call per run.
  Expired,
}

impl Countdown {
  pub fn start(&mut self, now: Instant) {
    *self = Self::Running {
      remaining: COUNTDOWN_SECS,
      next_tick: now + TICK,
    };
  }

  pub fn reset(&mut self, now: Instant) {
    self.stop();
    self.start(now);
  }

  pub fn stop(&mut self) {
    *self = Self::Idle;
  }

  pub fn tick(&mut self, now: Instant) -> Tick {
    let Self::Running {
      mut remaining,
      mut next_tick,
    } = *self
    else {
      return Tick::Inactive;
    };

    if now < next_tick {
      return Tick::Unchanged;
    }

    while remaining > 0 && now >= next_tick {
      remaining -= 1;
      next_tick += TICK;
    }

    if remaining == 0 {
      *self = Self::Expired;
      Tick::Expired
    } else {
      *self = Self::Running {
        remaining,
        next_tick,
      };
      Tick::Counted(remaining)
    }
  }

  #[cfg(test)]
  pub fn is_running(&self) -> bool {
    matches!(self, Self::Running { .. })
  }

  pub fn remaining(&self) -> u32 {
    match self {
      Self::Running { remaining, .. } => *remaining,
      Self::Idle | Self::Expired => 0,
    }
  }

  pub fn display(&self) -> String {
    format_clock(self.remaining())
  }
}

/// `mm:ss`, both fields zero padded.
pub fn format_clock(secs: u32) -> String {
  format!("{:02}:{:02}", secs / 60, secs % 60)
}
