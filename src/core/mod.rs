//! The adaptation engine.
//!
//! [`AdaptationController`] owns the display registry and turns signals into hardware writes:
//!
//! 1. A signal arrives: the solar clock ticked ([`Signal::Solar`]), the reference sensor produced a
//!    sample ([`Signal::Reference`]), or the user moved a slider ([`AdaptationController::set_manual`]).
//! 2. Targets are computed per display from its bounds, the global offsets and an optional
//!    per-application override.
//! 3. Locked fields keep their stored value; if no unlocked field differs from what is stored the
//!    display is left alone.
//! 4. Changed values are written either directly or through the display's
//!    [`TransitionWorker`](smoothing::TransitionWorker), which steps towards the target.
//! 5. Once the hardware accepted the values they are stored and every listener is notified.
//!
//! A failed write is logged and returned but never poisons the controller: the stored value stays
//! what the hardware last acknowledged and the next signal simply tries again.

pub mod curve;
pub mod error;
pub mod period;
pub mod smoothing;

use chrono::NaiveTime;
use std::collections::{BTreeMap, HashMap};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, RwLock};

use crate::backend::{BrightnessBackend, Control};
use crate::config::{AdaptationConfig, AppOverride};
use crate::core::curve::{compute_brightness, compute_contrast};
use crate::core::error::AdaptError;
use crate::core::period::{ScheduleParams, at_wall_clock, day_phase_targets};
use crate::core::smoothing::{IdleWaiter, TransitionJob, TransitionStepper, TransitionWorker};
use crate::geo::SolarMoment;
use crate::sensor::ReferenceSensor;
use crate::state::display::{DisplayBounds, DisplayId, DisplayState};
use crate::state::events::{ChangeEvent, ChangeListener};

/// Input driving one adaptation cycle.
#[derive(Debug, Clone, PartialEq)]
pub enum Signal {
    /// Follow the sun. `at` pins the wall-clock time on the moment's date; without it the
    /// current time from [`time_source::now`](crate::time_source::now) is used.
    Solar {
        moment: SolarMoment,
        at: Option<NaiveTime>,
    },
    /// Follow a reference reading, 0..=100.
    Reference(f64),
}

impl Signal {
    pub fn solar(moment: SolarMoment) -> Self {
        Signal::Solar { moment, at: None }
    }

    pub fn solar_at(moment: SolarMoment, at: NaiveTime) -> Self {
        Signal::Solar {
            moment,
            at: Some(at),
        }
    }

    /// Sample `sensor` once.
    pub fn from_sensor(sensor: &dyn ReferenceSensor) -> Result<Self, AdaptError> {
        sensor
            .read_percent()
            .map(Signal::Reference)
            .ok_or(AdaptError::MissingSensorReading)
    }

    pub fn kind(&self) -> &'static str {
        match self {
            Signal::Solar { .. } => "solar",
            Signal::Reference(_) => "reference",
        }
    }
}

/// Why a display was left alone.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    NotAdaptive,
    NoSensorReading,
    /// `readapt` before any signal was seen
    NoSignal,
}

/// What one adaptation did to a display.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AdaptOutcome {
    Skipped(SkipReason),
    /// Targets equal the stored values for every unlocked field
    Unchanged,
    /// Written directly; carries the values now stored
    Applied { brightness: u8, contrast: u8 },
    /// Handed to the transition worker; carries the targets
    Scheduled { brightness: u8, contrast: u8 },
}

impl AdaptOutcome {
    /// Whether hardware writes were issued or queued.
    pub fn is_write(&self) -> bool {
        matches!(
            self,
            AdaptOutcome::Applied { .. } | AdaptOutcome::Scheduled { .. }
        )
    }
}

/// Per-display outcomes of a cycle over every registered display.
pub type CycleReport = Vec<(DisplayId, Result<AdaptOutcome, AdaptError>)>;

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

/// A registered display.
struct DisplaySlot {
    state: Mutex<DisplayState>,
    /// Held for the whole duration of a direct write or a transition
    write_lock: Mutex<()>,
}

/// What the caller thread and the transition workers share.
struct Shared {
    backend: Arc<dyn BrightnessBackend>,
    listeners: RwLock<Vec<Arc<dyn ChangeListener>>>,
}

impl Shared {
    fn notify(&self, event: &ChangeEvent) {
        let listeners = self
            .listeners
            .read()
            .unwrap_or_else(PoisonError::into_inner);
        for listener in listeners.iter() {
            listener.on_change(event);
        }
    }

    fn write(&self, control: Control, display: &DisplayId, value: u8) -> Result<(), AdaptError> {
        if display.is_generic() {
            return Ok(());
        }
        control
            .write(self.backend.as_ref(), display, value)
            .map_err(|source| AdaptError::Write {
                display: display.clone(),
                field: control.as_str(),
                value,
                source,
            })
    }

    /// Write `brightness` and `contrast` in one go.
    ///
    /// Each control is written and stored on its own, so one failing control does not hold back
    /// the other. Listeners hear about the result once, after the write lock is released, and
    /// only if a stored value changed. The first failure is returned.
    fn write_direct(
        &self,
        slot: &DisplaySlot,
        brightness: Option<u8>,
        contrast: Option<u8>,
    ) -> Result<(u8, u8), AdaptError> {
        let (state, before, failure) = {
            let _guard = lock(&slot.write_lock);
            let (id, before) = {
                let state = lock(&slot.state);
                (state.id.clone(), state.values())
            };

            let mut failure = None;
            for (control, target) in [
                (Control::Brightness, brightness),
                (Control::Contrast, contrast),
            ] {
                let Some(value) = target else { continue };
                match self.write(control, &id, value) {
                    Ok(()) => commit(&mut lock(&slot.state), control, value),
                    Err(e) => {
                        failure.get_or_insert(e);
                    }
                }
            }
            let state = lock(&slot.state).clone();
            (state, before, failure)
        };

        if state.values() != before {
            self.announce(&state);
        }
        match failure {
            Some(e) => Err(e),
            None => Ok(state.values()),
        }
    }

    /// Step each control from its stored value to the job's target.
    ///
    /// Controls are independent: a failed transition leaves that control at its stored value
    /// while the other one still runs.
    fn run_transition(&self, slot: &DisplaySlot, job: TransitionJob) -> Result<(), AdaptError> {
        let (state, start, failure) = {
            let _guard = lock(&slot.write_lock);
            let (id, start, mut step_size) = {
                let state = lock(&slot.state);
                (state.id.clone(), state.values(), state.step_size)
            };

            let mut failure = None;
            for (control, current, target) in [
                (Control::Brightness, start.0, job.brightness),
                (Control::Contrast, start.1, job.contrast),
            ] {
                let Some(target) = target else { continue };
                if target == current && !job.force {
                    continue;
                }

                let started = std::time::Instant::now();
                let result = if target == current {
                    // Forced rewrite of a value the display should already show
                    self.write(control, &id, target).map(|()| 1)
                } else {
                    let mut stepper = TransitionStepper::new(current, target, step_size);
                    let result = stepper.run(|value| self.write(control, &id, value));
                    step_size = stepper.step_size();
                    lock(&slot.state).step_size = step_size;
                    result
                };

                match result {
                    Ok(writes) => {
                        commit(&mut lock(&slot.state), control, target);
                        log_debug!(
                            "Display {id}: {} {current} -> {target} in {writes} writes ({}ms, next step {step_size})",
                            control.as_str(),
                            started.elapsed().as_millis()
                        );
                    }
                    Err(e) => {
                        failure.get_or_insert(e);
                    }
                }
            }
            let state = lock(&slot.state).clone();
            (state, start, failure)
        };

        if state.values() != start {
            self.announce(&state);
        }
        match failure {
            Some(e) => Err(e),
            None => Ok(()),
        }
    }

    fn announce(&self, state: &DisplayState) {
        log_block_start!("{} (display {})", state.name, state.id);
        log_indented!("Brightness: {}", state.brightness);
        log_indented!("Contrast: {}", state.contrast);
        self.notify(&ChangeEvent::new(
            state.id.clone(),
            state.brightness,
            state.contrast,
        ));
    }
}

fn commit(state: &mut DisplayState, control: Control, value: u8) {
    match control {
        Control::Brightness => state.brightness = value,
        Control::Contrast => state.contrast = value,
    }
}

/// Orchestrates signal -> targets -> locks -> writes -> notifications for every display.
///
/// All methods take `&self`; the controller can be shared across threads behind an `Arc`.
pub struct AdaptationController {
    config: AdaptationConfig,
    shared: Arc<Shared>,
    displays: RwLock<BTreeMap<DisplayId, Arc<DisplaySlot>>>,
    workers: Mutex<HashMap<DisplayId, TransitionWorker>>,
    last_signal: Mutex<Option<(Signal, Option<AppOverride>)>>,
}

impl AdaptationController {
    pub fn new(config: AdaptationConfig, backend: Arc<dyn BrightnessBackend>) -> Self {
        Self {
            config,
            shared: Arc::new(Shared {
                backend,
                listeners: RwLock::new(Vec::new()),
            }),
            displays: RwLock::new(BTreeMap::new()),
            workers: Mutex::new(HashMap::new()),
            last_signal: Mutex::new(None),
        }
    }

    pub fn config(&self) -> &AdaptationConfig {
        &self.config
    }

    pub fn backend_name(&self) -> &'static str {
        self.shared.backend.backend_name()
    }

    pub fn add_listener(&self, listener: impl ChangeListener + 'static) {
        self.shared
            .listeners
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .push(Arc::new(listener));
    }

    /// Take ownership of a display. Re-registering an id replaces the previous record.
    pub fn register(&self, mut display: DisplayState) -> Result<(), AdaptError> {
        display.bounds().validate(&display.id)?;
        display.step_size = display.step_size.max(1);

        let id = display.id.clone();
        let slot = Arc::new(DisplaySlot {
            state: Mutex::new(display),
            write_lock: Mutex::new(()),
        });

        let replaced = self
            .displays
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(id.clone(), slot);
        if replaced.is_some() {
            log_warning!("Display {id} was already registered, replacing it");
            self.stop_worker(&id);
        }
        Ok(())
    }

    /// Forget a display, returning its final state.
    pub fn deregister(&self, id: &DisplayId) -> Result<DisplayState, AdaptError> {
        self.stop_worker(id);
        let slot = self
            .displays
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(id)
            .ok_or_else(|| AdaptError::UnknownDisplay(id.clone()))?;
        let state = lock(&slot.state).clone();
        Ok(state)
    }

    pub fn snapshot(&self, id: &DisplayId) -> Result<DisplayState, AdaptError> {
        let slot = self.slot(id)?;
        let state = lock(&slot.state).clone();
        Ok(state)
    }

    /// Copies of every registered display, ordered by id.
    pub fn displays(&self) -> Vec<DisplayState> {
        self.slots()
            .iter()
            .map(|slot| lock(&slot.state).clone())
            .collect()
    }

    /// Adapt one display to `signal`.
    pub fn adapt(
        &self,
        id: &DisplayId,
        signal: &Signal,
        app: Option<&AppOverride>,
    ) -> Result<AdaptOutcome, AdaptError> {
        let slot = self.slot(id)?;
        *lock(&self.last_signal) = Some((signal.clone(), app.cloned()));
        self.adapt_slot(&slot, signal, app)
    }

    /// Adapt every registered display. Failures are logged and reported, never fatal.
    pub fn adapt_all(&self, signal: &Signal, app: Option<&AppOverride>) -> CycleReport {
        *lock(&self.last_signal) = Some((signal.clone(), app.cloned()));
        self.slots()
            .into_iter()
            .map(|slot| {
                let id = lock(&slot.state).id.clone();
                let result = self.adapt_slot(&slot, signal, app);
                if let Err(e) = &result {
                    log_error!(
                        "Adaptation failed for display {id} ({} signal): {e}",
                        signal.kind()
                    );
                }
                (id, result)
            })
            .collect()
    }

    /// Sample `sensor` and adapt every display to the reading.
    ///
    /// Without a reading nothing is written and every display reports
    /// [`SkipReason::NoSensorReading`].
    pub fn adapt_from_sensor(
        &self,
        sensor: &dyn ReferenceSensor,
        app: Option<&AppOverride>,
    ) -> CycleReport {
        match Signal::from_sensor(sensor) {
            Ok(signal) => self.adapt_all(&signal, app),
            Err(e) => {
                log_debug!("Skipping sensor cycle: {e}");
                self.slots()
                    .into_iter()
                    .map(|slot| {
                        let id = lock(&slot.state).id.clone();
                        (id, Ok(AdaptOutcome::Skipped(SkipReason::NoSensorReading)))
                    })
                    .collect()
            }
        }
    }

    /// Adapt `id` again to the last signal seen.
    pub fn readapt(&self, id: &DisplayId) -> Result<AdaptOutcome, AdaptError> {
        let slot = self.slot(id)?;
        let last = lock(&self.last_signal).clone();
        match last {
            Some((signal, app)) => self.adapt_slot(&slot, &signal, app.as_ref()),
            None => Ok(AdaptOutcome::Skipped(SkipReason::NoSignal)),
        }
    }

    /// Set raw values, ignoring the adaptive flag and locks. Inputs above 100 are capped.
    ///
    /// Both values are written even when they equal the stored ones, since the stored values
    /// may only be an assumption about what the hardware shows. Listeners only hear about it
    /// when a stored value changes.
    pub fn set_manual(
        &self,
        id: &DisplayId,
        brightness: u8,
        contrast: u8,
    ) -> Result<AdaptOutcome, AdaptError> {
        let slot = self.slot(id)?;
        let brightness = brightness.min(100);
        let contrast = contrast.min(100);
        self.dispatch(&slot, Some(brightness), Some(contrast), true)
    }

    /// Replace the display's bounds and readapt it.
    pub fn set_bounds(
        &self,
        id: &DisplayId,
        bounds: DisplayBounds,
    ) -> Result<AdaptOutcome, AdaptError> {
        bounds.validate(id)?;
        let slot = self.slot(id)?;
        lock(&slot.state).set_bounds(bounds);
        self.readapt(id)
    }

    /// Toggle adaptation. Turning it back on readapts immediately.
    pub fn set_adaptive(&self, id: &DisplayId, adaptive: bool) -> Result<AdaptOutcome, AdaptError> {
        let slot = self.slot(id)?;
        lock(&slot.state).adaptive = adaptive;
        if adaptive {
            self.readapt(id)
        } else {
            Ok(AdaptOutcome::Skipped(SkipReason::NotAdaptive))
        }
    }

    pub fn set_locks(
        &self,
        id: &DisplayId,
        locked_brightness: bool,
        locked_contrast: bool,
    ) -> Result<(), AdaptError> {
        let slot = self.slot(id)?;
        let mut state = lock(&slot.state);
        state.locked_brightness = locked_brightness;
        state.locked_contrast = locked_contrast;
        Ok(())
    }

    /// Block until every queued transition has finished.
    ///
    /// The worker registry is not held while waiting, so listeners running on a worker thread
    /// may call back into the controller.
    pub fn wait_idle(&self) {
        let waiters: Vec<IdleWaiter> = lock(&self.workers)
            .values()
            .map(TransitionWorker::idle_waiter)
            .collect();
        for waiter in waiters {
            waiter.wait();
        }
    }

    /// Stop all transition workers after their current job.
    pub fn shutdown(&self) {
        let workers: Vec<_> = lock(&self.workers).drain().map(|(_, w)| w).collect();
        for worker in workers {
            worker.shutdown();
        }
    }

    /// Targets for `state` under `signal`, before locks are applied.
    fn targets(
        &self,
        state: &DisplayState,
        signal: &Signal,
        app: Option<&AppOverride>,
    ) -> (u8, u8) {
        match signal {
            Signal::Solar { moment, at } => {
                let now = match at {
                    Some(time) => at_wall_clock(moment.date, *time),
                    None => crate::time_source::now(),
                };
                let params = ScheduleParams::new(&self.config, app);
                let targets = day_phase_targets(now, moment, &state.bounds(), &params);
                log_debug!(
                    "Display {}: {} phase, targets {}/{}",
                    state.id,
                    targets.phase,
                    targets.brightness,
                    targets.contrast
                );
                (targets.brightness, targets.contrast)
            }
            Signal::Reference(percent) => (
                compute_brightness(
                    *percent,
                    self.config.brightness_offset,
                    app.map_or(0, |a| a.brightness),
                    state.min_brightness,
                    state.max_brightness,
                ),
                compute_contrast(
                    *percent,
                    self.config.contrast_offset,
                    app.map_or(0, |a| a.contrast),
                    state.min_contrast,
                    state.max_contrast,
                ),
            ),
        }
    }

    fn adapt_slot(
        &self,
        slot: &DisplaySlot,
        signal: &Signal,
        app: Option<&AppOverride>,
    ) -> Result<AdaptOutcome, AdaptError> {
        let state = lock(&slot.state).clone();
        if !state.adaptive {
            return Ok(AdaptOutcome::Skipped(SkipReason::NotAdaptive));
        }

        let (brightness, contrast) = self.targets(&state, signal, app);
        let brightness = (!state.locked_brightness).then_some(brightness);
        let contrast = (!state.locked_contrast).then_some(contrast);
        self.dispatch(slot, brightness, contrast, false)
    }

    /// Write whichever targets differ from the stored values, or all of them with `force`.
    fn dispatch(
        &self,
        slot: &DisplaySlot,
        brightness: Option<u8>,
        contrast: Option<u8>,
        force: bool,
    ) -> Result<AdaptOutcome, AdaptError> {
        let state = lock(&slot.state).clone();
        let brightness = brightness.filter(|&v| force || v != state.brightness);
        let contrast = contrast.filter(|&v| force || v != state.contrast);
        if brightness.is_none() && contrast.is_none() {
            return Ok(AdaptOutcome::Unchanged);
        }

        if self.config.smooth_transition {
            self.worker_submit(
                &state.id,
                TransitionJob {
                    brightness,
                    contrast,
                    force,
                },
            )?;
            return Ok(AdaptOutcome::Scheduled {
                brightness: brightness.unwrap_or(state.brightness),
                contrast: contrast.unwrap_or(state.contrast),
            });
        }

        let (brightness, contrast) = self.shared.write_direct(slot, brightness, contrast)?;
        Ok(AdaptOutcome::Applied {
            brightness,
            contrast,
        })
    }

    fn worker_submit(&self, id: &DisplayId, job: TransitionJob) -> Result<(), AdaptError> {
        let mut workers = lock(&self.workers);
        if !workers.contains_key(id) {
            let slot = self.slot(id)?;
            let shared = Arc::clone(&self.shared);
            let display = id.clone();
            let worker = TransitionWorker::spawn(id.clone(), move |job| {
                if let Err(e) = shared.run_transition(&slot, job) {
                    log_error!("Transition failed for display {display}: {e}");
                }
            })?;
            workers.insert(id.clone(), worker);
        }

        workers
            .get(id)
            .ok_or_else(|| AdaptError::WorkerUnavailable(id.clone()))?
            .submit(job)
    }

    fn stop_worker(&self, id: &DisplayId) {
        let worker = lock(&self.workers).remove(id);
        if let Some(worker) = worker {
            worker.shutdown();
        }
    }

    fn slot(&self, id: &DisplayId) -> Result<Arc<DisplaySlot>, AdaptError> {
        self.displays
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(id)
            .cloned()
            .ok_or_else(|| AdaptError::UnknownDisplay(id.clone()))
    }

    fn slots(&self) -> Vec<Arc<DisplaySlot>> {
        self.displays
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .values()
            .cloned()
            .collect()
    }
}

impl Drop for AdaptationController {
    fn drop(&mut self) {
        self.shutdown();
    }
}
