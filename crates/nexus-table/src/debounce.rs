//! Debounced values and the schedulers that drive them.
//!
//! A [`Debouncer`] holds a *settled* value that only changes once input has
//! been quiet for a fixed delay. Time is supplied by an injected
//! [`Scheduler`]: [`ThreadScheduler`] uses the wall clock, [`ManualScheduler`]
//! a virtual clock that tests advance explicitly, and `TokioScheduler`
//! (feature `tokio`) the tokio timer.

use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;

/// A unit of deferred work.
pub type Task = Box<dyn FnOnce() + Send + 'static>;

/// Handle that prevents a scheduled task from running.
#[derive(Debug, Clone, Default)]
pub struct CancelToken {
    cancelled: Arc<AtomicBool>,
}

impl CancelToken {
    /// Creates a live token.
    pub fn new() -> Self {
        Self::default()
    }

    /// Cancels the task. Has no effect if it already ran.
    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::SeqCst);
    }

    /// Returns `true` once [`CancelToken::cancel`] has been called.
    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::SeqCst)
    }
}

/// Runs a task once after a delay.
pub trait Scheduler: Send + Sync {
    /// Schedules `task` to run after `delay` unless the returned token is
    /// cancelled first.
    fn schedule(&self, delay: Duration, task: Task) -> CancelToken;
}

/// Wall-clock scheduler: each task sleeps on its own thread.
///
/// Fine for the handful of timers a search box produces; cancelled tasks
/// still sleep out their delay but never run.
#[derive(Debug, Clone, Copy, Default)]
pub struct ThreadScheduler;

impl Scheduler for ThreadScheduler {
    fn schedule(&self, delay: Duration, task: Task) -> CancelToken {
        let token = CancelToken::new();
        let guard = token.clone();
        std::thread::spawn(move || {
            std::thread::sleep(delay);
            if !guard.is_cancelled() {
                task();
            }
        });
        token
    }
}

/// Scheduler backed by the tokio timer of a runtime handle.
#[cfg(feature = "tokio")]
#[derive(Debug, Clone)]
pub struct TokioScheduler {
    handle: tokio::runtime::Handle,
}

#[cfg(feature = "tokio")]
impl TokioScheduler {
    /// Uses the given runtime.
    pub fn new(handle: tokio::runtime::Handle) -> Self {
        Self { handle }
    }

    /// Uses the runtime the caller is running on.
    ///
    /// # Panics
    ///
    /// Panics when called outside a tokio runtime.
    pub fn current() -> Self {
        Self::new(tokio::runtime::Handle::current())
    }
}

#[cfg(feature = "tokio")]
impl Scheduler for TokioScheduler {
    fn schedule(&self, delay: Duration, task: Task) -> CancelToken {
        let token = CancelToken::new();
        let guard = token.clone();
        self.handle.spawn(async move {
            tokio::time::sleep(delay).await;
            if !guard.is_cancelled() {
                task();
            }
        });
        token
    }
}

/// Virtual-clock scheduler for deterministic tests.
///
/// Nothing runs until [`ManualScheduler::advance`] moves the clock past a
/// task's due time. Clones share the same clock and queue.
///
/// ```
/// use std::sync::atomic::{AtomicUsize, Ordering};
/// use std::sync::Arc;
/// use std::time::Duration;
/// use nexus_table::{ManualScheduler, Scheduler};
///
/// let clock = ManualScheduler::new();
/// let hits = Arc::new(AtomicUsize::new(0));
/// let h = hits.clone();
/// clock.schedule(Duration::from_millis(300), Box::new(move || {
///     h.fetch_add(1, Ordering::SeqCst);
/// }));
///
/// clock.advance(Duration::from_millis(299));
/// assert_eq!(hits.load(Ordering::SeqCst), 0);
/// clock.advance(Duration::from_millis(1));
/// assert_eq!(hits.load(Ordering::SeqCst), 1);
/// ```
#[derive(Clone, Default)]
pub struct ManualScheduler {
    state: Arc<Mutex<ManualState>>,
}

#[derive(Default)]
struct ManualState {
    now: Duration,
    next_seq: u64,
    queue: Vec<Scheduled>,
}

struct Scheduled {
    due: Duration,
    seq: u64,
    token: CancelToken,
    task: Task,
}

impl ManualScheduler {
    /// Creates a scheduler with its clock at zero.
    pub fn new() -> Self {
        Self::default()
    }

    /// Current virtual time.
    pub fn now(&self) -> Duration {
        self.state.lock().now
    }

    /// Number of scheduled tasks that are neither run nor cancelled.
    pub fn pending(&self) -> usize {
        self.state
            .lock()
            .queue
            .iter()
            .filter(|s| !s.token.is_cancelled())
            .count()
    }

    /// Moves the clock forward by `by`, running every task that falls due in
    /// due-time order. Tasks scheduled by running tasks are honored if they
    /// fall inside the window. Returns the number of tasks run.
    pub fn advance(&self, by: Duration) -> usize {
        let target = self.state.lock().now + by;
        let mut ran = 0;

        loop {
            let next = {
                let mut state = self.state.lock();
                state.queue.retain(|s| !s.token.is_cancelled());
                let due_index = state
                    .queue
                    .iter()
                    .enumerate()
                    .filter(|(_, s)| s.due <= target)
                    .min_by_key(|(_, s)| (s.due, s.seq))
                    .map(|(i, _)| i);

                match due_index {
                    Some(i) => {
                        let scheduled = state.queue.remove(i);
                        state.now = scheduled.due;
                        Some(scheduled)
                    }
                    None => {
                        state.now = target;
                        None
                    }
                }
            };

            // Run outside the lock so the task may schedule more work
            match next {
                Some(scheduled) => {
                    if !scheduled.token.is_cancelled() {
                        (scheduled.task)();
                        ran += 1;
                    }
                }
                None => return ran,
            }
        }
    }
}

impl Scheduler for ManualScheduler {
    fn schedule(&self, delay: Duration, task: Task) -> CancelToken {
        let token = CancelToken::new();
        let mut state = self.state.lock();
        let seq = state.next_seq;
        state.next_seq += 1;
        let due = state.now + delay;
        state.queue.push(Scheduled {
            due,
            seq,
            token: token.clone(),
            task,
        });
        token
    }
}

impl fmt::Debug for ManualScheduler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = self.state.lock();
        f.debug_struct("ManualScheduler")
            .field("now", &state.now)
            .field("queued", &state.queue.len())
            .finish()
    }
}

type SettleHook<T> = Arc<dyn Fn(&T) + Send + Sync>;

struct Slot<T> {
    value: T,
    generation: u64,
    closed: bool,
}

/// A value that settles to the latest input after a quiet period.
///
/// Every [`Debouncer::push`] supersedes the previous one: the earlier timer
/// is cancelled and only the latest value is ever written, exactly once per
/// quiet period. After [`Debouncer::close`] (or drop) nothing is written.
pub struct Debouncer<T> {
    delay: Duration,
    scheduler: Arc<dyn Scheduler>,
    slot: Arc<Mutex<Slot<T>>>,
    pending: Option<CancelToken>,
    on_settle: Option<SettleHook<T>>,
}

impl<T: Clone + Send + 'static> Debouncer<T> {
    /// Creates a debouncer whose settled value starts at `initial`.
    pub fn new(initial: T, delay: Duration, scheduler: Arc<dyn Scheduler>) -> Self {
        Self {
            delay,
            scheduler,
            slot: Arc::new(Mutex::new(Slot {
                value: initial,
                generation: 0,
                closed: false,
            })),
            pending: None,
            on_settle: None,
        }
    }

    /// Registers a hook called with the new value each time it settles.
    ///
    /// The hook runs on whichever thread the scheduler fires on.
    pub fn on_settle(mut self, hook: impl Fn(&T) + Send + Sync + 'static) -> Self {
        self.on_settle = Some(Arc::new(hook));
        self
    }

    /// The settling delay.
    pub fn delay(&self) -> Duration {
        self.delay
    }

    /// Feeds a new input value, restarting the quiet period.
    pub fn push(&mut self, value: T) {
        if let Some(token) = self.pending.take() {
            token.cancel();
        }

        let generation = {
            let mut slot = self.slot.lock();
            if slot.closed {
                return;
            }
            slot.generation += 1;
            slot.generation
        };

        let slot = Arc::clone(&self.slot);
        let hook = self.on_settle.clone();
        let token = self.scheduler.schedule(
            self.delay,
            Box::new(move || {
                {
                    let mut slot = slot.lock();
                    if slot.closed || slot.generation != generation {
                        return;
                    }
                    slot.value = value.clone();
                }
                if let Some(hook) = hook {
                    hook(&value);
                }
            }),
        );
        self.pending = Some(token);
    }

    /// The current settled value.
    pub fn settled(&self) -> T {
        self.slot.lock().value.clone()
    }

    /// Cancels any pending update without closing the debouncer.
    pub fn cancel(&mut self) {
        if let Some(token) = self.pending.take() {
            token.cancel();
        }
        // Invalidate a task that already slipped past its cancel check
        self.slot.lock().generation += 1;
    }

    /// Cancels any pending update and stops accepting new ones.
    pub fn close(&mut self) {
        self.cancel();
        self.slot.lock().closed = true;
    }

    /// Returns `true` once closed.
    pub fn is_closed(&self) -> bool {
        self.slot.lock().closed
    }
}

impl<T> Drop for Debouncer<T> {
    fn drop(&mut self) {
        if let Some(token) = self.pending.take() {
            token.cancel();
        }
        self.slot.lock().closed = true;
    }
}

impl<T: fmt::Debug> fmt::Debug for Debouncer<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let slot = self.slot.lock();
        f.debug_struct("Debouncer")
            .field("delay", &self.delay)
            .field("settled", &slot.value)
            .field("closed", &slot.closed)
            .finish()
    }
}
