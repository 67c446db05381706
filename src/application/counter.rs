use tracing::debug;

use super::config::InteractionConfig;
use super::scheduler::{TimerQueue, TimerTask};
use crate::domain::{CounterPhase, CounterWidget};

/// Drives counters through `Idle -> Running -> Settled`.
///
/// The displayed value after tick `k` of `n` is `floor(target * k / n)`,
/// which is the running sum of `target / n` per tick rounded down, computed
/// without accumulating float error. Tick `n` lands exactly on the target.
#[derive(Debug, Clone)]
pub struct CounterAnimator {
    ticks: u32,
    tick_ms: u64,
}

impl CounterAnimator {
    pub fn new(config: &InteractionConfig) -> Self {
        Self {
            ticks: config.counter_ticks(),
            tick_ms: config.tick_ms.max(1),
        }
    }

    /// Starts an idle counter. Returns false if it already ran or is running.
    pub fn start(&self, counter: &mut CounterWidget, queue: &mut TimerQueue, now: u64) -> bool {
        if counter.phase != CounterPhase::Idle {
            return false;
        }

        counter.displayed = 0;
        if counter.target == 0 {
            counter.phase = CounterPhase::Settled;
            return true;
        }

        let timer = queue.schedule_interval(now, self.tick_ms, TimerTask::CounterTick(counter.id.clone()));
        counter.phase = CounterPhase::Running { timer, ticks: 0 };
        debug!(counter = %counter.id, target = counter.target, "counter animation started");
        true
    }

    /// Advances one tick. Returns true when this tick settled the counter.
    ///
    /// A tick for a counter that is not running is ignored.
    pub fn tick(&self, counter: &mut CounterWidget, queue: &mut TimerQueue) -> bool {
        let CounterPhase::Running { timer, ticks } = counter.phase else {
            return false;
        };

        let ticks = ticks + 1;
        let value = (u128::from(counter.target) * u128::from(ticks) / u128::from(self.ticks)) as u64;
        if ticks >= self.ticks || value >= counter.target {
            counter.displayed = counter.target;
            counter.phase = CounterPhase::Settled;
            queue.cancel(timer);
            debug!(counter = %counter.id, value = counter.displayed, "counter settled");
            return true;
        }

        counter.displayed = value.max(counter.displayed);
        counter.phase = CounterPhase::Running { timer, ticks };
        false
    }
}
