//! Time-delayed one-shot triggers
//!
//! [`ChronoScheduler`] keeps pending callbacks sorted by trigger time. Each
//! call to [`ChronoScheduler::update`] fires every trigger that is due, oldest
//! first, and stops at the first one still in the future.
//!
//! Unlike the event bus, a failing trigger never affects the others: errors
//! and panics are logged and the remaining due triggers still fire.

use std::collections::VecDeque;
use std::fmt;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;

use chrono::{DateTime, Months, TimeDelta, Utc};
use parking_lot::Mutex;
use tracing::{debug, error, trace};

use crate::bus::HandlerResult;
use crate::clock::{Clock, SystemClock};
use crate::error::ScheduleError;

/// A one-shot trigger callback
pub type TriggerCallback = Box<dyn FnOnce() -> HandlerResult + Send>;

/// Handle to a pending trigger
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TriggerId(u64);

impl fmt::Display for TriggerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "trigger#{}", self.0)
    }
}

/// A calendar-aware delay.
///
/// Years and months use calendar arithmetic (Jan 31 + 1 month = Feb 28/29);
/// the remaining components are exact durations. All components may be
/// negative.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Delay {
    pub years: i32,
    pub months: i32,
    pub weeks: i64,
    pub days: i64,
    pub hours: i64,
    pub minutes: i64,
    pub seconds: i64,
    pub milliseconds: i64,
}

impl Delay {
    pub const ZERO: Delay = Delay {
        years: 0,
        months: 0,
        weeks: 0,
        days: 0,
        hours: 0,
        minutes: 0,
        seconds: 0,
        milliseconds: 0,
    };

    pub fn years(years: i32) -> Self {
        Self::ZERO.with_years(years)
    }

    pub fn months(months: i32) -> Self {
        Self::ZERO.with_months(months)
    }

    pub fn weeks(weeks: i64) -> Self {
        Self::ZERO.with_weeks(weeks)
    }

    pub fn days(days: i64) -> Self {
        Self::ZERO.with_days(days)
    }

    pub fn hours(hours: i64) -> Self {
        Self::ZERO.with_hours(hours)
    }

    pub fn minutes(minutes: i64) -> Self {
        Self::ZERO.with_minutes(minutes)
    }

    pub fn seconds(seconds: i64) -> Self {
        Self::ZERO.with_seconds(seconds)
    }

    pub fn milliseconds(milliseconds: i64) -> Self {
        Self::ZERO.with_milliseconds(milliseconds)
    }

    pub fn with_years(mut self, years: i32) -> Self {
        self.years = years;
        self
    }

    pub fn with_months(mut self, months: i32) -> Self {
        self.months = months;
        self
    }

    pub fn with_weeks(mut self, weeks: i64) -> Self {
        self.weeks = weeks;
        self
    }

    pub fn with_days(mut self, days: i64) -> Self {
        self.days = days;
        self
    }

    pub fn with_hours(mut self, hours: i64) -> Self {
        self.hours = hours;
        self
    }

    pub fn with_minutes(mut self, minutes: i64) -> Self {
        self.minutes = minutes;
        self
    }

    pub fn with_seconds(mut self, seconds: i64) -> Self {
        self.seconds = seconds;
        self
    }

    pub fn with_milliseconds(mut self, milliseconds: i64) -> Self {
        self.milliseconds = milliseconds;
        self
    }

    /// The instant `self` after `from`
    pub fn after(&self, from: DateTime<Utc>) -> Result<DateTime<Utc>, ScheduleError> {
        let overflow = || ScheduleError::DelayOverflow(format!("{self:?}"));

        let total_months = i64::from(self.years) * 12 + i64::from(self.months);
        let months = Months::new(u32::try_from(total_months.unsigned_abs()).map_err(|_| overflow())?);
        let shifted = if total_months >= 0 {
            from.checked_add_months(months)
        } else {
            from.checked_sub_months(months)
        }
        .ok_or_else(overflow)?;

        let exact = [
            TimeDelta::try_weeks(self.weeks),
            TimeDelta::try_days(self.days),
            TimeDelta::try_hours(self.hours),
            TimeDelta::try_minutes(self.minutes),
            TimeDelta::try_seconds(self.seconds),
            TimeDelta::try_milliseconds(self.milliseconds),
        ]
        .into_iter()
        .try_fold(TimeDelta::zero(), |acc, part| acc.checked_add(&part?))
        .ok_or_else(overflow)?;

        shifted.checked_add_signed(exact).ok_or_else(overflow)
    }
}

/// A pending trigger
pub struct Trigger {
    id: TriggerId,
    trigger_time: DateTime<Utc>,
    placement_time: DateTime<Utc>,
    callback: TriggerCallback,
}

impl Trigger {
    pub fn id(&self) -> TriggerId {
        self.id
    }

    pub fn trigger_time(&self) -> DateTime<Utc> {
        self.trigger_time
    }

    pub fn placement_time(&self) -> DateTime<Utc> {
        self.placement_time
    }
}

impl fmt::Debug for Trigger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Trigger")
            .field("id", &self.id)
            .field("trigger_time", &self.trigger_time)
            .field("placement_time", &self.placement_time)
            .finish_non_exhaustive()
    }
}

#[derive(Default)]
struct TriggerQueue {
    /// Sorted ascending by trigger time; ties keep insertion order
    triggers: VecDeque<Trigger>,
    next_id: u64,
}

impl TriggerQueue {
    /// Earliest trigger due at `now` that was placed before `cutoff`
    fn pop_due(&mut self, now: DateTime<Utc>, cutoff: u64) -> Option<Trigger> {
        let index = self
            .triggers
            .iter()
            .take_while(|pending| pending.trigger_time <= now)
            .position(|pending| pending.id.0 < cutoff)?;
        self.triggers.remove(index)
    }
}

/// Fires callbacks once their trigger time has passed
pub struct ChronoScheduler {
    clock: Arc<dyn Clock>,
    queue: Mutex<TriggerQueue>,
}

impl ChronoScheduler {
    /// Scheduler on wall-clock time
    pub fn new() -> Self {
        Self::with_clock(Arc::new(SystemClock))
    }

    pub fn with_clock(clock: Arc<dyn Clock>) -> Self {
        Self {
            clock,
            queue: Mutex::new(TriggerQueue::default()),
        }
    }

    pub fn clock(&self) -> &Arc<dyn Clock> {
        &self.clock
    }

    /// Schedule `callback` to run once `delay` has elapsed.
    ///
    /// A zero or negative delay fires on the next [`update`](Self::update).
    pub fn add_trigger<F>(&self, delay: Delay, callback: F) -> Result<TriggerId, ScheduleError>
    where
        F: FnOnce() -> HandlerResult + Send + 'static,
    {
        let placement_time = self.clock.now();
        let trigger_time = delay.after(placement_time)?;

        let mut queue = self.queue.lock();
        let id = TriggerId(queue.next_id);
        queue.next_id += 1;

        let index = queue
            .triggers
            .partition_point(|pending| pending.trigger_time <= trigger_time);
        queue.triggers.insert(
            index,
            Trigger {
                id,
                trigger_time,
                placement_time,
                callback: Box::new(callback),
            },
        );

        debug!(trigger = %id, %trigger_time, pending = queue.triggers.len(), "Trigger added");
        Ok(id)
    }

    /// Schedule `callback(args)`; the arguments are captured now.
    pub fn add_trigger_with<A, F>(&self, delay: Delay, args: A, callback: F) -> Result<TriggerId, ScheduleError>
    where
        A: Send + 'static,
        F: FnOnce(A) -> HandlerResult + Send + 'static,
    {
        self.add_trigger(delay, move || callback(args))
    }

    /// Fire every trigger due at the current time.
    ///
    /// The time is sampled once; triggers added by a callback are never fired
    /// in the same pass. Returns the number of triggers fired.
    pub fn update(&self) -> usize {
        let now = self.clock.now();
        let cutoff = self.queue.lock().next_id;
        let mut fired = 0;

        loop {
            // Lock released before the callback runs so callbacks can re-schedule
            let Some(trigger) = self.queue.lock().pop_due(now, cutoff) else {
                break;
            };
            fired += 1;

            let Trigger {
                id,
                trigger_time,
                callback,
                ..
            } = trigger;
            trace!(trigger = %id, %trigger_time, "Firing trigger");

            match panic::catch_unwind(AssertUnwindSafe(callback)) {
                Ok(Ok(())) => {}
                Ok(Err(err)) => {
                    error!(trigger = %id, %trigger_time, error = %err, "Trigger callback failed");
                }
                Err(payload) => {
                    error!(
                        trigger = %id,
                        %trigger_time,
                        panic = panic_message(payload.as_ref()),
                        "Trigger callback panicked"
                    );
                }
            }
        }

        fired
    }

    /// Remove a pending trigger. Returns false if it already fired or never
    /// existed.
    pub fn cancel(&self, id: TriggerId) -> bool {
        let mut queue = self.queue.lock();
        match queue.triggers.iter().position(|pending| pending.id == id) {
            Some(index) => {
                queue.triggers.remove(index);
                true
            }
            None => false,
        }
    }

    pub fn len(&self) -> usize {
        self.queue.lock().triggers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.queue.lock().triggers.is_empty()
    }

    /// Trigger time of the earliest pending trigger
    pub fn next_trigger_time(&self) -> Option<DateTime<Utc>> {
        self.queue.lock().triggers.front().map(Trigger::trigger_time)
    }
}

impl Default for ChronoScheduler {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for ChronoScheduler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ChronoScheduler")
            .field("pending", &self.len())
            .finish_non_exhaustive()
    }
}

fn panic_message(payload: &(dyn std::any::Any + Send)) -> &str {
    if let Some(message) = payload.downcast_ref::<&str>() {
        message
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message
    } else {
        "<non-string panic payload>"
    }
}
