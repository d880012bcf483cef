//! The embedding session.
//!
//! [`ScriptSession`] is the harness an embedding drives: it owns the shared
//! host cell the proxies borrow, the loaded script text, the timer threads,
//! and the event queue those threads deliver into. The embedding loads a
//! script, registers the binding functions with its engine, and drains the
//! queue from its own loop — the session never executes script code itself.

use std::{
    cell::RefCell,
    collections::VecDeque,
    rc::Rc,
    sync::{Arc, Condvar, Mutex},
    thread::{self, JoinHandle},
    time::{Duration, Instant},
};

use ahash::AHashMap;

use crate::{
    bindings::{ArgValues, BindingFunction, CallError, call},
    host::SceneHost,
    object::Object,
    scene::{SceneHandle, find_scene},
    tracer::SessionTracer,
};

/// Identifier of a scheduled timer, unique within one session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, serde::Serialize, serde::Deserialize)]
pub struct TimerId(u32);

impl TimerId {
    /// Returns the raw integer identifier.
    #[must_use]
    pub fn raw(self) -> u32 {
        self.0
    }
}

/// An event delivered on the session's queue.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionEvent {
    /// A timer's delay elapsed without the session being stopped.
    TimerFired(TimerId),
}

/// Condvar-backed event queue shared with the timer threads.
#[derive(Debug, Default)]
struct EventQueue {
    queue: Mutex<VecDeque<SessionEvent>>,
    condvar: Condvar,
}

impl EventQueue {
    fn push(&self, event: SessionEvent) {
        let mut queue = self.queue.lock().expect("event queue lock poisoned");
        queue.push_back(event);
        drop(queue);
        self.condvar.notify_one();
    }

    fn pop(&self) -> SessionEvent {
        let mut queue = self.queue.lock().expect("event queue lock poisoned");
        loop {
            if let Some(event) = queue.pop_front() {
                return event;
            }
            queue = self.condvar.wait(queue).expect("event queue lock poisoned");
        }
    }

    fn try_pop(&self) -> Option<SessionEvent> {
        self.queue.lock().expect("event queue lock poisoned").pop_front()
    }

    fn clear(&self) {
        self.queue.lock().expect("event queue lock poisoned").clear();
    }
}

/// Halt signal shared with the timer threads.
///
/// Timers wait on the condvar instead of sleeping so that [`ScriptSession::stop`]
/// can cancel them immediately rather than waiting out their delays.
#[derive(Debug, Default)]
struct Halt {
    flag: Mutex<bool>,
    condvar: Condvar,
}

impl Halt {
    /// Waits for up to `delay`. Returns `true` if halted before the delay
    /// elapsed, `false` if the full delay passed.
    fn wait_for(&self, delay: Duration) -> bool {
        let deadline = Instant::now() + delay;
        let mut halted = self.flag.lock().expect("timer halt lock poisoned");
        loop {
            if *halted {
                return true;
            }
            let now = Instant::now();
            if now >= deadline {
                return false;
            }
            let (guard, result) = self
                .condvar
                .wait_timeout(halted, deadline - now)
                .expect("timer halt lock poisoned");
            halted = guard;
            if result.timed_out() {
                return *halted;
            }
        }
    }

    fn raise(&self) {
        let mut halted = self.flag.lock().expect("timer halt lock poisoned");
        *halted = true;
        drop(halted);
        self.condvar.notify_all();
    }

    fn reset(&self) {
        *self.flag.lock().expect("timer halt lock poisoned") = false;
    }
}

/// One embedded script's native-side session.
///
/// Owns the shared host cell and the script lifecycle: load, timers, events,
/// stop. Stopping (explicitly or on drop) halts and joins every outstanding
/// timer thread and clears the queue, so no timer event outlives the script
/// it was scheduled by.
#[derive(Debug)]
pub struct ScriptSession<H: SceneHost, T: SessionTracer> {
    host: Rc<RefCell<H>>,
    tracer: T,
    script: String,
    events: Arc<EventQueue>,
    halt: Arc<Halt>,
    timers: AHashMap<TimerId, JoinHandle<()>>,
    next_timer: u32,
    running: bool,
}

impl<H: SceneHost, T: SessionTracer> ScriptSession<H, T> {
    /// Creates a session around the given host. No script is loaded yet;
    /// timers are refused until [`load`](Self::load) is called with a
    /// non-empty script.
    pub fn new(host: H, tracer: T) -> Self {
        Self {
            host: Rc::new(RefCell::new(host)),
            tracer,
            script: String::new(),
            events: Arc::new(EventQueue::default()),
            halt: Arc::new(Halt::default()),
            timers: AHashMap::new(),
            next_timer: 0,
            running: false,
        }
    }

    /// The shared host cell. Proxies constructed from it outlive the
    /// session's script lifecycle; their handles are governed only by their
    /// own drops.
    #[must_use]
    pub fn host(&self) -> &Rc<RefCell<H>> {
        &self.host
    }

    /// The currently loaded script text.
    #[must_use]
    pub fn script(&self) -> &str {
        &self.script
    }

    /// Whether a non-empty script is loaded and the session has not been
    /// stopped since.
    #[must_use]
    pub fn is_running(&self) -> bool {
        self.running
    }

    /// Number of scheduled timers that have not fired or been cancelled.
    #[must_use]
    pub fn pending_timers(&self) -> usize {
        self.timers.len()
    }

    /// Replaces the current script.
    ///
    /// Any previous script is stopped first: outstanding timers are halted
    /// and the event queue is cleared. Loading an empty script leaves the
    /// session stopped.
    pub fn load(&mut self, text: &str) {
        self.stop();
        self.script.clear();
        self.script.push_str(text);
        if self.script.is_empty() {
            return;
        }
        self.halt.reset();
        self.running = true;
        self.tracer.on_load(&self.script);
    }

    /// Stops the session: halts and joins every timer thread and clears the
    /// event queue. Idempotent; also invoked on drop.
    pub fn stop(&mut self) {
        self.halt.raise();
        for (_, handle) in self.timers.drain() {
            let _ = handle.join();
        }
        self.events.clear();
        if self.running {
            self.running = false;
            self.tracer.on_stop();
        }
    }

    /// Looks up a scene on the session's host and wraps it in a proxy.
    ///
    /// Pass-through to [`find_scene`]; usable regardless of script state,
    /// since the host registry exists independently of any script.
    #[must_use]
    pub fn find_scene(&self, name: &str) -> Option<SceneHandle<H>> {
        find_scene(&self.host, name)
    }

    /// Dispatches one raw binding call against the session's host.
    pub fn call(&mut self, function: BindingFunction, args: ArgValues) -> Result<Object, CallError> {
        call(&mut *self.host.borrow_mut(), function, args)
    }

    /// Schedules a timer.
    ///
    /// Spawns a thread that waits out `delay` (interruptibly, so
    /// [`stop`](Self::stop) cancels it) and then pushes
    /// [`SessionEvent::TimerFired`] onto the queue. Returns `None` when no
    /// script is running.
    #[must_use]
    pub fn set_timer(&mut self, delay: Duration) -> Option<TimerId> {
        if !self.running {
            return None;
        }
        let id = TimerId(self.next_timer);
        self.next_timer += 1;

        let halt = Arc::clone(&self.halt);
        let events = Arc::clone(&self.events);
        let handle = thread::spawn(move || {
            if halt.wait_for(delay) {
                return;
            }
            events.push(SessionEvent::TimerFired(id));
        });
        self.timers.insert(id, handle);
        self.tracer.on_timer_set(id, delay);
        Some(id)
    }

    /// Blocks until the next event is available and returns it.
    ///
    /// Callers should only block while a timer is outstanding
    /// ([`pending_timers`](Self::pending_timers) is non-zero); otherwise
    /// nothing will ever be delivered.
    pub fn next_event(&mut self) -> SessionEvent {
        let event = self.events.pop();
        self.reap(event);
        event
    }

    /// Returns the next event if one is already queued.
    pub fn try_next_event(&mut self) -> Option<SessionEvent> {
        let event = self.events.try_pop()?;
        self.reap(event);
        Some(event)
    }

    /// Reports a script error from the embedding's engine.
    ///
    /// The message and optional source line are routed to the tracer.
    pub fn report_script_error(&mut self, message: &str, line: Option<u32>) {
        self.tracer.on_script_error(message, line);
    }

    /// The session's tracer.
    #[must_use]
    pub fn tracer(&self) -> &T {
        &self.tracer
    }

    /// Mutable access to the session's tracer.
    pub fn tracer_mut(&mut self) -> &mut T {
        &mut self.tracer
    }

    /// Joins the finished thread behind a consumed timer event.
    fn reap(&mut self, event: SessionEvent) {
        let SessionEvent::TimerFired(id) = event;
        if let Some(handle) = self.timers.remove(&id) {
            let _ = handle.join();
        }
        self.tracer.on_timer_fired(id);
    }
}

impl<H: SceneHost, T: SessionTracer> Drop for ScriptSession<H, T> {
    fn drop(&mut self) {
        self.stop();
    }
}
