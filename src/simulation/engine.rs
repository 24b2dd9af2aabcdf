//! Threaded simulation engine.
//!
//! One worker thread steps the bound automaton at a fixed interval. The
//! automaton sits behind a single mutex shared by the worker and
//! [`SimulationEngine::step_once`]; lifecycle changes go through a second
//! mutex and a condition variable that doubles as the pause gate.

use std::any::Any;
use std::panic::{self, AssertUnwindSafe};
use std::sync::mpsc::{self, Receiver, RecvTimeoutError, Sender};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use parking_lot::{Condvar, Mutex};

use super::state::{ExitReason, SimState, SimulationStatus, StepEvent, StepTimer};
use crate::automaton::Automaton;
use crate::config::SimulationConfig;
use crate::error::{Error, Result};

pub type StepCallback = Arc<dyn Fn(&StepEvent) + Send + Sync>;
pub type ErrorCallback = Arc<dyn Fn(&Error) + Send + Sync>;
pub type CompleteCallback = Arc<dyn Fn(&ExitReason) + Send + Sync>;

#[derive(Clone, Default)]
struct Callbacks {
    on_step: Option<StepCallback>,
    on_error: Option<ErrorCallback>,
    on_complete: Option<CompleteCallback>,
}

struct Control {
    state: SimState,
    speed_ms: u64,
    max_generations: Option<u64>,
    /// Steps since the last `start()`, including `step_once` calls
    steps: u64,
    timer: StepTimer,
    started_at: Option<Instant>,
    finished_at: Option<Instant>,
}

struct Shared {
    automaton: Mutex<Option<Box<dyn Automaton>>>,
    control: Mutex<Control>,
    gate: Condvar,
    callbacks: Mutex<Callbacks>,
}

impl Shared {
    fn callbacks(&self) -> Callbacks {
        self.callbacks.lock().clone()
    }

    /// Record a successful step and notify the step callback
    fn finish_step(&self, generation: u64, duration: Duration) {
        let event = {
            let mut control = self.control.lock();
            control.steps += 1;
            control.timer.record(duration);
            StepEvent {
                generation,
                steps: control.steps,
                duration,
            }
        };
        log::debug!("generation {} in {:?}", generation, duration);
        if let Some(on_step) = self.callbacks().on_step {
            on_step(&event);
        }
    }

    /// Route a step failure to the error callback. Returns the error back
    /// when nobody is listening.
    fn report_error(&self, error: Error) -> Result<()> {
        match self.callbacks().on_error {
            Some(on_error) => {
                on_error(&error);
                Ok(())
            }
            None => Err(error),
        }
    }
}

struct Worker {
    handle: JoinHandle<()>,
    done: Receiver<Result<()>>,
}

/// Play/pause/step controller for one automaton at a time
pub struct SimulationEngine {
    shared: Arc<Shared>,
    worker: Option<Worker>,
    join_timeout: Duration,
}

impl SimulationEngine {
    pub fn new() -> Self {
        Self::from_config(&SimulationConfig::default())
    }

    pub fn from_config(config: &SimulationConfig) -> Self {
        let control = Control {
            state: SimState::Idle,
            speed_ms: config.speed_ms.max(1),
            max_generations: config.max_generations,
            steps: 0,
            timer: StepTimer::new(),
            started_at: None,
            finished_at: None,
        };
        Self {
            shared: Arc::new(Shared {
                automaton: Mutex::new(None),
                control: Mutex::new(control),
                gate: Condvar::new(),
                callbacks: Mutex::new(Callbacks::default()),
            }),
            worker: None,
            join_timeout: Duration::from_millis(config.join_timeout_ms),
        }
    }

    pub fn with_automaton(automaton: Box<dyn Automaton>) -> Self {
        let engine = Self::new();
        engine.set_automaton(automaton);
        engine
    }

    /// Bind an automaton, returning the previously bound one
    pub fn set_automaton(&self, automaton: Box<dyn Automaton>) -> Option<Box<dyn Automaton>> {
        log::info!("simulation bound to {}", automaton.metadata().name);
        self.shared.automaton.lock().replace(automaton)
    }

    /// Unbind the automaton. A running worker exits at its next step.
    pub fn take_automaton(&self) -> Option<Box<dyn Automaton>> {
        self.shared.automaton.lock().take()
    }

    pub fn has_automaton(&self) -> bool {
        self.shared.automaton.lock().is_some()
    }

    /// Read the automaton under the mutation lock
    pub fn inspect<R>(&self, f: impl FnOnce(&dyn Automaton) -> R) -> Option<R> {
        self.shared.automaton.lock().as_deref().map(f)
    }

    /// Mutate the automaton under the mutation lock, e.g. to edit cells
    /// while the simulation runs
    pub fn modify<R>(&self, f: impl FnOnce(&mut dyn Automaton) -> R) -> Option<R> {
        let mut slot = self.shared.automaton.lock();
        match slot.as_mut() {
            Some(automaton) => Some(f(automaton.as_mut())),
            None => None,
        }
    }

    pub fn on_step(&self, callback: impl Fn(&StepEvent) + Send + Sync + 'static) {
        self.shared.callbacks.lock().on_step = Some(Arc::new(callback));
    }

    pub fn on_error(&self, callback: impl Fn(&Error) + Send + Sync + 'static) {
        self.shared.callbacks.lock().on_error = Some(Arc::new(callback));
    }

    pub fn on_complete(&self, callback: impl Fn(&ExitReason) + Send + Sync + 'static) {
        self.shared.callbacks.lock().on_complete = Some(Arc::new(callback));
    }

    pub fn clear_callbacks(&self) {
        *self.shared.callbacks.lock() = Callbacks::default();
    }

    /// Launch the worker thread
    pub fn start(&mut self) -> Result<()> {
        if !self.has_automaton() {
            return Err(Error::NoAutomaton);
        }

        if let Some(worker) = &self.worker {
            if !worker.handle.is_finished() {
                let state = self.shared.control.lock().state;
                if !state.is_active() {
                    log::warn!("previous simulation worker is still shutting down");
                }
                return Ok(());
            }
        }
        if let Err(e) = self.reap_worker() {
            log::warn!("previous run ended with: {}", e);
        }

        {
            let mut control = self.shared.control.lock();
            control.state = SimState::Running;
            control.steps = 0;
            control.timer.clear();
            control.started_at = Some(Instant::now());
            control.finished_at = None;
        }

        let (done_tx, done_rx) = mpsc::channel();
        let shared = Arc::clone(&self.shared);
        let spawned = thread::Builder::new()
            .name("calab-sim".to_string())
            .spawn(move || run_worker(shared, done_tx));
        let handle = match spawned {
            Ok(handle) => handle,
            Err(e) => {
                self.shared.control.lock().state = SimState::Stopped;
                return Err(e.into());
            }
        };

        self.worker = Some(Worker {
            handle,
            done: done_rx,
        });
        log::info!("simulation started");
        Ok(())
    }

    /// Signal the worker to stop and wait up to the join timeout.
    ///
    /// A timeout is logged and is not an error; `is_worker_alive()` tells
    /// whether the worker is still around. A step failure that ended the run
    /// is returned here.
    pub fn stop(&mut self) -> Result<()> {
        self.shutdown(false)
    }

    /// Like [`stop`](Self::stop), but a worker still running after the join
    /// timeout is reported as `Error::JoinTimeout`
    pub fn stop_strict(&mut self) -> Result<()> {
        self.shutdown(true)
    }

    fn shutdown(&mut self, strict: bool) -> Result<()> {
        {
            let mut control = self.shared.control.lock();
            if control.state.is_active() {
                control.state = SimState::Stopping;
            }
        }
        self.shared.gate.notify_all();

        let received = match &self.worker {
            Some(worker) => worker.done.recv_timeout(self.join_timeout),
            None => return Ok(()),
        };

        match received {
            Ok(outcome) => {
                if let Some(worker) = self.worker.take() {
                    if worker.handle.join().is_err() {
                        log::error!("simulation worker panicked after finishing");
                    }
                }
                outcome
            }
            Err(RecvTimeoutError::Timeout) => {
                log::warn!("simulation worker did not stop within {:?}", self.join_timeout);
                if strict {
                    Err(Error::JoinTimeout(self.join_timeout))
                } else {
                    Ok(())
                }
            }
            Err(RecvTimeoutError::Disconnected) => self.reap_worker(),
        }
    }

    /// Join a worker that has already exited
    fn reap_worker(&mut self) -> Result<()> {
        let Some(worker) = self.worker.take() else {
            return Ok(());
        };
        let previous = worker.done.try_recv().ok();
        let joined = worker.handle.join();

        {
            let mut control = self.shared.control.lock();
            if control.state != SimState::Idle {
                control.state = SimState::Stopped;
            }
            control.finished_at.get_or_insert_with(Instant::now);
        }

        match (joined, previous) {
            (Err(payload), _) => {
                let message = panic_message(payload.as_ref());
                log::error!("simulation worker died: {}", message);
                Err(Error::StepFailure(message))
            }
            (Ok(()), Some(Err(error))) => {
                log::warn!("discarding result of previous run: {}", error);
                Ok(())
            }
            (Ok(()), _) => Ok(()),
        }
    }

    pub fn pause(&self) {
        let mut control = self.shared.control.lock();
        if control.state == SimState::Running {
            control.state = SimState::Paused;
            log::info!("simulation paused");
        }
        drop(control);
        self.shared.gate.notify_all();
    }

    pub fn resume(&self) {
        let mut control = self.shared.control.lock();
        if control.state == SimState::Paused {
            control.state = SimState::Running;
            log::info!("simulation resumed");
        }
        drop(control);
        self.shared.gate.notify_all();
    }

    /// Run exactly one step under the mutation lock.
    ///
    /// The step callback runs on the calling thread. Failures go to the
    /// error callback when one is registered and are returned otherwise.
    pub fn step_once(&self) -> Result<()> {
        let (outcome, duration) = {
            let mut slot = self.shared.automaton.lock();
            let automaton = slot.as_mut().ok_or(Error::NoAutomaton)?;
            let started = Instant::now();
            let outcome = guarded_step(automaton.as_mut());
            (outcome, started.elapsed())
        };

        match outcome {
            Ok(generation) => {
                self.shared.finish_step(generation, duration);
                Ok(())
            }
            Err(error) => {
                log::error!("{}", error);
                self.shared.report_error(error)
            }
        }
    }

    /// Milliseconds between steps, at least 1
    pub fn set_speed(&self, speed_ms: u64) {
        self.shared.control.lock().speed_ms = speed_ms.max(1);
    }

    /// Stop a run after this many steps; `None` runs until stopped
    pub fn set_max_generations(&self, max_generations: Option<u64>) {
        self.shared.control.lock().max_generations = max_generations;
    }

    pub fn set_join_timeout(&mut self, timeout: Duration) {
        self.join_timeout = timeout;
    }

    pub fn state(&self) -> SimState {
        self.shared.control.lock().state
    }

    pub fn is_running(&self) -> bool {
        self.state() == SimState::Running
    }

    pub fn is_paused(&self) -> bool {
        self.state() == SimState::Paused
    }

    pub fn is_worker_alive(&self) -> bool {
        self.worker.as_ref().map_or(false, |w| !w.handle.is_finished())
    }

    pub fn get_status(&self) -> SimulationStatus {
        let generation = self.inspect(|a| a.generation()).unwrap_or(0);
        let control = self.shared.control.lock();
        let elapsed = match control.started_at {
            Some(started) => control.finished_at.unwrap_or_else(Instant::now).duration_since(started),
            None => Duration::ZERO,
        };
        SimulationStatus {
            state: control.state,
            running: control.state == SimState::Running,
            paused: control.state == SimState::Paused,
            generation,
            total_steps: control.steps,
            elapsed_seconds: elapsed.as_secs_f64(),
            fps: control.timer.fps(),
            speed_ms: control.speed_ms,
            max_generations: control.max_generations,
        }
    }
}

impl Default for SimulationEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for SimulationEngine {
    fn drop(&mut self) {
        if let Err(e) = self.stop() {
            log::error!("simulation stopped with error: {}", e);
        }
    }
}

fn run_worker(shared: Arc<Shared>, done: Sender<Result<()>>) {
    let outcome = worker_loop(&shared);
    let reason = match &outcome {
        Ok(reason) => reason.clone(),
        Err(error) => ExitReason::Failed(error.to_string()),
    };

    let steps = {
        let mut control = shared.control.lock();
        control.state = SimState::Stopped;
        control.finished_at = Some(Instant::now());
        control.steps
    };
    shared.gate.notify_all();
    log::info!("simulation finished after {} steps: {:?}", steps, reason);

    if let Some(on_complete) = shared.callbacks().on_complete {
        on_complete(&reason);
    }
    // the receiver is gone when the engine was dropped mid-timeout
    let _ = done.send(outcome.map(|_| ()));
}

fn worker_loop(shared: &Shared) -> Result<ExitReason> {
    loop {
        {
            let mut control = shared.control.lock();
            while control.state == SimState::Paused {
                shared.gate.wait(&mut control);
            }
            if control.state != SimState::Running {
                return Ok(ExitReason::Stopped);
            }
            if let Some(max) = control.max_generations {
                if control.steps >= max {
                    return Ok(ExitReason::MaxGenerations);
                }
            }
        }

        let (outcome, duration) = {
            let mut slot = shared.automaton.lock();
            let Some(automaton) = slot.as_mut() else {
                return Ok(ExitReason::Unbound);
            };
            if automaton.is_exhausted() {
                return Ok(ExitReason::Exhausted);
            }
            let started = Instant::now();
            let outcome = guarded_step(automaton.as_mut());
            (outcome, started.elapsed())
        };

        match outcome {
            Ok(generation) => shared.finish_step(generation, duration),
            Err(error) => {
                log::error!("{}", error);
                shared.report_error(error)?;
            }
        }

        let mut control = shared.control.lock();
        let interval = Duration::from_millis(control.speed_ms);
        if let Some(remaining) = interval.checked_sub(duration) {
            let deadline = Instant::now() + remaining;
            while control.state == SimState::Running {
                if shared.gate.wait_until(&mut control, deadline).timed_out() {
                    break;
                }
            }
        }
    }
}

/// Step, turning both errors and panics into `StepFailure`
fn guarded_step(automaton: &mut dyn Automaton) -> Result<u64> {
    match panic::catch_unwind(AssertUnwindSafe(|| automaton.step())) {
        Ok(Ok(())) => Ok(automaton.generation()),
        Ok(Err(Error::StepFailure(message))) => Err(Error::StepFailure(message)),
        Ok(Err(other)) => Err(Error::StepFailure(other.to_string())),
        Err(payload) => Err(Error::StepFailure(panic_message(payload.as_ref()))),
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        format!("panic: {}", message)
    } else if let Some(message) = payload.downcast_ref::<String>() {
        format!("panic: {}", message)
    } else {
        "panic with unknown payload".to_string()
    }
}
