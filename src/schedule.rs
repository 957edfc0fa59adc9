//! Virtual-clock scheduling for the spawn and render loops.
//!
//! Both loops live on one [`Timeline`]. Callbacks never overlap: the engine
//! pops one due task at a time and runs it to completion before popping the
//! next, so the burst list and the buffers need no locking.

/// Shortest delay a task can be scheduled with.
pub const MIN_DELAY_MS: f64 = 1.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Task {
    Spawn,
    Render,
}

/// Identifies one scheduled callback; required to cancel it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TaskHandle(u64);

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Timing {
    /// Plain timer, fires after the given number of milliseconds.
    After(f64),
    /// Fires on the next display refresh.
    NextFrame,
}

#[derive(Debug, Clone, Copy)]
struct Entry {
    handle: TaskHandle,
    task: Task,
    due_ms: f64,
}

#[derive(Debug, Clone)]
pub struct Timeline {
    now_ms: f64,
    refresh_ms: f64,
    next_id: u64,
    entries: Vec<Entry>,
}

impl Timeline {
    /// `refresh_rate` is the display's native refresh rate in Hz.
    pub fn new(refresh_rate: f64) -> Self {
        Self {
            now_ms: 0.0,
            refresh_ms: 1000.0 / refresh_rate.max(1.0),
            next_id: 0,
            entries: Vec::with_capacity(2),
        }
    }

    pub fn now_ms(&self) -> f64 {
        self.now_ms
    }

    pub fn refresh_ms(&self) -> f64 {
        self.refresh_ms
    }

    pub fn schedule(&mut self, task: Task, timing: Timing) -> TaskHandle {
        let due_ms = match timing {
            Timing::After(delay) => self.now_ms + delay.max(MIN_DELAY_MS),
            Timing::NextFrame => ((self.now_ms / self.refresh_ms).floor() + 1.0) * self.refresh_ms,
        };

        let handle = TaskHandle(self.next_id);
        self.next_id += 1;
        self.entries.push(Entry {
            handle,
            task,
            due_ms,
        });
        handle
    }

    /// Returns whether something was actually cancelled. Unknown handles are ignored.
    pub fn cancel(&mut self, handle: TaskHandle) -> bool {
        let before = self.entries.len();
        self.entries.retain(|entry| entry.handle != handle);
        self.entries.len() != before
    }

    pub fn is_pending(&self, handle: TaskHandle) -> bool {
        self.entries.iter().any(|entry| entry.handle == handle)
    }

    pub fn pending(&self) -> usize {
        self.entries.len()
    }

    pub fn next_due_ms(&self) -> Option<f64> {
        self.entries.iter().map(|entry| entry.due_ms).reduce(f64::min)
    }

    /// Moves the clock to `now_ms` and removes the earliest task that is due by then.
    ///
    /// Ties fire in the order they were scheduled.
    pub fn pop_due(&mut self, now_ms: f64) -> Option<(TaskHandle, Task)> {
        self.now_ms = self.now_ms.max(now_ms);

        let (index, _) = self
            .entries
            .iter()
            .enumerate()
            .filter(|(_, entry)| entry.due_ms <= self.now_ms)
            .min_by(|(_, a), (_, b)| a.due_ms.total_cmp(&b.due_ms).then(a.handle.0.cmp(&b.handle.0)))?;

        let entry = self.entries.swap_remove(index);
        Some((entry.handle, entry.task))
    }
}

/// A loop that performs one step per firing and then asks for the next one.
#[derive(Debug, Clone)]
pub struct RepeatingTask {
    task: Task,
    pending: Option<TaskHandle>,
}

impl RepeatingTask {
    pub fn new(task: Task) -> Self {
        Self {
            task,
            pending: None,
        }
    }

    pub fn is_armed(&self) -> bool {
        self.pending.is_some()
    }

    /// Schedules the next step, replacing any step already pending.
    pub fn arm(&mut self, timeline: &mut Timeline, timing: Timing) {
        self.cancel(timeline);
        self.pending = Some(timeline.schedule(self.task, timing));
    }

    /// Checks that a fired handle is this loop's pending step and consumes it.
    ///
    /// Stale handles from a cancelled step return `false` and must be ignored.
    pub fn claim(&mut self, handle: TaskHandle) -> bool {
        if self.pending == Some(handle) {
            self.pending = None;
            true
        } else {
            false
        }
    }

    /// Idempotent.
    pub fn cancel(&mut self, timeline: &mut Timeline) {
        if let Some(handle) = self.pending.take() {
            timeline.cancel(handle);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pops_in_due_order() {
        let mut timeline = Timeline::new(60.0);
        let late = timeline.schedule(Task::Spawn, Timing::After(300.0));
        let early = timeline.schedule(Task::Render, Timing::After(10.0));

        assert_eq!(timeline.pop_due(5.0), None);
        assert_eq!(timeline.pop_due(400.0), Some((early, Task::Render)));
        assert_eq!(timeline.pop_due(400.0), Some((late, Task::Spawn)));
        assert_eq!(timeline.pop_due(400.0), None);
    }

    #[test]
    fn ties_fire_in_scheduling_order() {
        let mut timeline = Timeline::new(60.0);
        let first = timeline.schedule(Task::Render, Timing::After(20.0));
        let second = timeline.schedule(Task::Spawn, Timing::After(20.0));
        assert_eq!(timeline.pop_due(20.0).map(|(h, _)| h), Some(first));
        assert_eq!(timeline.pop_due(20.0).map(|(h, _)| h), Some(second));
    }

    #[test]
    fn next_frame_lands_on_refresh_boundary() {
        let mut timeline = Timeline::new(60.0);
        timeline.pop_due(20.0);
        timeline.schedule(Task::Render, Timing::NextFrame);
        let due = timeline.next_due_ms().unwrap();
        assert!((due - 2.0 * timeline.refresh_ms()).abs() < 1e-9);
        assert!((timeline.refresh_ms() - 1000.0 / 60.0).abs() < 1e-9);
    }

    #[test]
    fn zero_delay_is_clamped() {
        let mut timeline = Timeline::new(60.0);
        timeline.schedule(Task::Spawn, Timing::After(0.0));
        assert_eq!(timeline.pop_due(0.0), None);
        assert!(timeline.pop_due(MIN_DELAY_MS).is_some());
    }

    #[test]
    fn cancel_is_a_no_op_for_unknown_handles() {
        let mut timeline = Timeline::new(60.0);
        let handle = timeline.schedule(Task::Spawn, Timing::After(5.0));
        assert!(timeline.is_pending(handle));
        assert!(timeline.cancel(handle));
        assert!(!timeline.is_pending(handle));
        assert!(!timeline.cancel(handle));
        assert_eq!(timeline.pending(), 0);
    }

    #[test]
    fn repeating_task_cancel_is_idempotent() {
        let mut timeline = Timeline::new(60.0);
        let mut task = RepeatingTask::new(Task::Render);
        task.arm(&mut timeline, Timing::NextFrame);
        assert!(task.is_armed());

        task.cancel(&mut timeline);
        task.cancel(&mut timeline);
        assert!(!task.is_armed());
        assert_eq!(timeline.pending(), 0);
    }

    #[test]
    fn rearming_replaces_the_pending_step() {
        let mut timeline = Timeline::new(60.0);
        let mut task = RepeatingTask::new(Task::Spawn);
        task.arm(&mut timeline, Timing::After(10.0));
        task.arm(&mut timeline, Timing::After(10.0));
        assert_eq!(timeline.pending(), 1);
    }

    #[test]
    fn stale_handles_are_not_claimed() {
        let mut timeline = Timeline::new(60.0);
        let mut task = RepeatingTask::new(Task::Spawn);
        task.arm(&mut timeline, Timing::After(10.0));
        let (handle, _) = timeline.pop_due(10.0).unwrap();

        assert!(task.claim(handle));
        assert!(!task.claim(handle));
    }
}
