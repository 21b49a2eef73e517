//! Latency-adaptive stepping towards a target value.
//!
//! Large jumps in brightness are written as a sequence of intermediate values so the change is
//! perceived as a fade rather than a flash. The number of writes adapts to the hardware: every
//! write is timed, and the next step is sized so that one step costs roughly
//! [`MAX_SMOOTH_STEP_TIME_MS`] of write latency. A monitor that answers DDC/CI in 50 ms takes
//! steps of 5; a fast one moves one unit at a time.
//!
//! Transitions run on a dedicated [`TransitionWorker`] thread per display so the caller that
//! produced the signal never waits for the whole sequence.

use std::sync::mpsc::{self, Receiver, Sender};
use std::sync::{Arc, Condvar, Mutex, PoisonError};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use crate::common::constants::*;
use crate::common::utils::cap;
use crate::core::error::AdaptError;
use crate::state::display::DisplayId;

/// Step size for the next write given the latency of the previous one.
pub fn step_size_for(elapsed: Duration) -> u32 {
    let steps = elapsed.as_millis() / MAX_SMOOTH_STEP_TIME_MS as u128;
    cap(steps.min(u32::MAX as u128) as u32, MIN_STEP_SIZE, MAX_STEP_SIZE)
}

/// Explicit state machine for one control's transition.
///
/// Every value produced by [`next_value`](Self::next_value) before the last lies strictly
/// between the start and the target; the last one is the target itself, produced exactly once.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TransitionStepper {
    current: u8,
    target: u8,
    step_size: u32,
}

impl TransitionStepper {
    pub fn new(current: u8, target: u8, step_size: u32) -> Self {
        Self {
            current,
            target,
            step_size: cap(step_size, MIN_STEP_SIZE, MAX_STEP_SIZE),
        }
    }

    pub fn current(&self) -> u8 {
        self.current
    }

    pub fn step_size(&self) -> u32 {
        self.step_size
    }

    pub fn remaining(&self) -> u32 {
        self.current.abs_diff(self.target) as u32
    }

    pub fn is_finished(&self) -> bool {
        self.current == self.target
    }

    /// The value to write next, `None` once the target has been reached.
    pub fn next_value(&self) -> Option<u8> {
        let remaining = self.remaining();
        if remaining == 0 {
            return None;
        }
        let magnitude = cap(self.step_size, 1, remaining) as u8;
        Some(if self.target > self.current {
            self.current + magnitude
        } else {
            self.current - magnitude
        })
    }

    /// Mark `value` as written.
    pub fn advance(&mut self, value: u8) {
        self.current = value;
    }

    /// Resize future steps from the latency of the last write.
    pub fn record_latency(&mut self, elapsed: Duration) {
        self.step_size = step_size_for(elapsed);
    }

    /// Drive the transition to completion through `write`.
    ///
    /// Each write is timed and feeds [`record_latency`](Self::record_latency). The first failing
    /// write aborts the sequence; the stepper then still holds the last value that was
    /// successfully written.
    ///
    /// Returns the number of writes issued.
    pub fn run<E>(&mut self, mut write: impl FnMut(u8) -> Result<(), E>) -> Result<u32, E> {
        let mut writes = 0;
        while let Some(value) = self.next_value() {
            let started = Instant::now();
            write(value)?;
            self.advance(value);
            self.record_latency(started.elapsed());
            writes += 1;
        }
        Ok(writes)
    }
}

/// Targets for one queued transition. `None` leaves the control untouched.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TransitionJob {
    pub brightness: Option<u8>,
    pub contrast: Option<u8>,
    /// Write targets even when they equal the stored values
    pub force: bool,
}

impl TransitionJob {
    /// Fold a newer job into this one; newer targets win, untouched controls keep theirs.
    pub fn then(self, newer: TransitionJob) -> TransitionJob {
        TransitionJob {
            brightness: newer.brightness.or(self.brightness),
            contrast: newer.contrast.or(self.contrast),
            force: self.force || newer.force,
        }
    }
}

#[derive(Default)]
struct Pending {
    count: Mutex<usize>,
    idle: Condvar,
}

impl Pending {
    fn add(&self) {
        *self.count.lock().unwrap_or_else(PoisonError::into_inner) += 1;
    }

    fn finish(&self, jobs: usize) {
        let mut count = self.count.lock().unwrap_or_else(PoisonError::into_inner);
        *count = count.saturating_sub(jobs);
        if *count == 0 {
            self.idle.notify_all();
        }
    }

    fn wait(&self) {
        let mut count = self.count.lock().unwrap_or_else(PoisonError::into_inner);
        while *count > 0 {
            count = self
                .idle
                .wait(count)
                .unwrap_or_else(PoisonError::into_inner);
        }
    }
}

/// Waits for a [`TransitionWorker`]'s queue to drain.
#[derive(Clone)]
pub struct IdleWaiter(Arc<Pending>);

impl IdleWaiter {
    pub fn wait(&self) {
        self.0.wait();
    }
}

/// Worker thread that serializes transitions for one display.
///
/// Jobs queued while a transition is running are coalesced into one, with the newest targets
/// winning since they were computed from the freshest signal.
pub struct TransitionWorker {
    display: DisplayId,
    sender: Option<Sender<TransitionJob>>,
    handle: Option<JoinHandle<()>>,
    pending: Arc<Pending>,
}

impl TransitionWorker {
    /// Spawn a worker that runs `handler` for every job.
    pub fn spawn<F>(display: DisplayId, handler: F) -> Result<Self, AdaptError>
    where
        F: FnMut(TransitionJob) + Send + 'static,
    {
        let (sender, receiver) = mpsc::channel();
        let pending = Arc::new(Pending::default());
        let thread_pending = Arc::clone(&pending);

        let handle = thread::Builder::new()
            .name(format!("transition-{display}"))
            .spawn(move || worker_loop(receiver, handler, &thread_pending))
            .map_err(|_| AdaptError::WorkerUnavailable(display.clone()))?;

        Ok(Self {
            display,
            sender: Some(sender),
            handle: Some(handle),
            pending,
        })
    }

    /// Queue a transition.
    pub fn submit(&self, job: TransitionJob) -> Result<(), AdaptError> {
        let sender = self
            .sender
            .as_ref()
            .ok_or_else(|| AdaptError::WorkerUnavailable(self.display.clone()))?;

        self.pending.add();
        if sender.send(job).is_err() {
            self.pending.finish(1);
            return Err(AdaptError::WorkerUnavailable(self.display.clone()));
        }
        Ok(())
    }

    /// Block until every submitted job has been handled.
    pub fn wait_idle(&self) {
        self.pending.wait();
    }

    /// Handle for waiting on this worker without borrowing it.
    pub fn idle_waiter(&self) -> IdleWaiter {
        IdleWaiter(Arc::clone(&self.pending))
    }

    /// Close the queue and join the thread after the current job finishes.
    pub fn shutdown(mut self) {
        self.stop();
    }

    fn stop(&mut self) {
        self.sender.take();
        if let Some(handle) = self.handle.take()
            && handle.join().is_err()
        {
            log_error!("Transition worker for display {} panicked", self.display);
        }
    }
}

impl Drop for TransitionWorker {
    fn drop(&mut self) {
        self.stop();
    }
}

fn worker_loop<F>(receiver: Receiver<TransitionJob>, mut handler: F, pending: &Pending)
where
    F: FnMut(TransitionJob),
{
    while let Ok(mut job) = receiver.recv() {
        let mut handled = 1;
        while let Ok(newer) = receiver.try_recv() {
            job = job.then(newer);
            handled += 1;
        }
        handler(job);
        pending.finish(handled);
    }
}
