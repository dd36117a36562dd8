//! Live registry of in-flight tasks and the thread that paints them
//!
//! ```no_run
//! use std::fs::File;
//! use parprog::{bounded_exec, Registry, RegistryConfig};
//!
//! # fn main() -> parprog::Result<()> {
//! let registry = Registry::start_terminal(&RegistryConfig::default())?;
//! bounded_exec(3, ["a.csv", "b.csv"], |path| {
//!     let file = File::open(path);
//!     match &file {
//!         Ok(f) => registry.add(path, f),
//!         Err(_) => registry.add(path, parprog::ProgressHandle::Untracked),
//!     }
//!     // ... long-running read here ...
//!     registry.complete(path, file.err().map(Into::into));
//! });
//! registry.stop()?;
//! # Ok(())
//! # }
//! ```

mod input;
mod render;
mod surface;

use std::io;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{self, Receiver, RecvTimeoutError, SyncSender};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::thread::{self, JoinHandle};
use std::time::Duration;

use tracing::{debug, info, warn};

use crate::error::{ProgressError, Result};
use crate::source::{
    classify, format_elapsed, ProgressHandle, ProgressSource, ReadStatus, Stopwatch,
};

pub use input::{ChannelInput, CrosstermInput, InputEvent, InputSource};
pub use render::STATUS_WIDTH;
pub use surface::{CrosstermSurface, HeadlessSurface, Surface};

/// Longest the input thread waits before re-checking for shutdown.
const MAX_INPUT_POLL: Duration = Duration::from_millis(250);

/// What to do when the user cancels from the keyboard.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InterruptAction {
    /// Restore the terminal, then exit the process with this code.
    Exit(i32),
    /// Restore the terminal and stop drawing; the process keeps running.
    Detach,
}

impl InterruptAction {
    /// Exit code 0 would read as success, so an interrupt always exits
    /// with at least 1.
    pub fn normalized(self) -> Self {
        match self {
            InterruptAction::Exit(0) => {
                warn!("interrupt exit code 0 is reserved for a clean stop, using 1");
                InterruptAction::Exit(1)
            }
            other => other,
        }
    }
}

#[derive(Debug, Clone)]
pub struct RegistryConfig {
    pub refresh_interval: Duration,
    pub on_interrupt: InterruptAction,
}

impl Default for RegistryConfig {
    fn default() -> Self {
        Self {
            refresh_interval: Duration::from_secs(1),
            on_interrupt: InterruptAction::Exit(1),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Quit {
    Stop,
    Interrupt,
}

/// One tracked task.
pub struct ProgressEntry {
    name: String,
    source: ProgressSource,
    error: Option<anyhow::Error>,
}

impl ProgressEntry {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn source(&self) -> &ProgressSource {
        &self.source
    }

    /// Construction error, or the error the task finished with.
    pub fn error(&self) -> Option<&anyhow::Error> {
        self.error.as_ref()
    }

    pub fn status(&mut self) -> String {
        self.source.status()
    }

    pub fn is_done(&self) -> bool {
        self.source.is_done()
    }
}

impl std::fmt::Debug for ProgressEntry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProgressEntry")
            .field("name", &self.name)
            .field("source", &self.source)
            .field("error", &self.error.as_ref().map(|e| e.to_string()))
            .finish()
    }
}

struct State<S> {
    entries: Vec<ProgressEntry>,
    surface: S,
    released: bool,
}

struct Shared<S> {
    // Entries and the terminal share one lock so every screen update is
    // serialized with every mutation.
    state: Mutex<State<S>>,
    started: Stopwatch,
    interrupted: AtomicBool,
}

impl<S: Surface> Shared<S> {
    fn lock(&self) -> MutexGuard<'_, State<S>> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn redraw(&self) {
        let mut state = self.lock();
        if let Err(e) = self.redraw_locked(&mut state) {
            warn!("redraw failed: {}", e);
        }
    }

    fn redraw_locked(&self, state: &mut State<S>) -> io::Result<()> {
        if state.released {
            return Ok(());
        }
        let header = format!("Running for {}", format_elapsed(self.started.elapsed()));
        let State {
            entries, surface, ..
        } = state;
        surface
            .terminal()
            .draw(|frame| render::draw(frame, &header, entries))?;
        Ok(())
    }

    fn release(&self) -> io::Result<()> {
        let mut state = self.lock();
        if state.released {
            return Ok(());
        }
        state.released = true;
        state.surface.release()
    }
}

/// Ordered, named collection of progress entries drawn at a fixed interval.
///
/// All methods take `&self`, so the registry can be shared by reference
/// with any number of worker threads.
pub struct Registry<S: Surface> {
    shared: Arc<Shared<S>>,
    quit: Option<SyncSender<Quit>>,
    redraw: Option<JoinHandle<io::Result<()>>>,
    input: Option<JoinHandle<()>>,
    input_stop: Arc<AtomicBool>,
}

impl Registry<CrosstermSurface> {
    /// Take over the controlling terminal and start drawing.
    ///
    /// Fails if the terminal cannot be initialized.
    pub fn start_terminal(config: &RegistryConfig) -> Result<Self> {
        let surface = CrosstermSurface::acquire().map_err(ProgressError::Terminal)?;
        Ok(Self::start(surface, Some(Box::new(CrosstermInput)), config))
    }
}

impl<S: Surface> Registry<S> {
    /// Start the redraw thread on `surface`, plus an input watcher when
    /// `input` is given.
    pub fn start(
        surface: S,
        input: Option<Box<dyn InputSource>>,
        config: &RegistryConfig,
    ) -> Self {
        let shared = Arc::new(Shared {
            state: Mutex::new(State {
                entries: Vec::new(),
                surface,
                released: false,
            }),
            started: Stopwatch::start(),
            interrupted: AtomicBool::new(false),
        });
        let interval = config.refresh_interval.max(Duration::from_millis(1));
        let (quit_tx, quit_rx) = mpsc::sync_channel(0);
        let input_stop = Arc::new(AtomicBool::new(false));

        let input = input.map(|source| {
            let quit = quit_tx.clone();
            let stop = Arc::clone(&input_stop);
            let poll = interval.min(MAX_INPUT_POLL);
            thread::spawn(move || input::watch(source, quit, stop, poll))
        });

        let redraw = thread::spawn({
            let shared = Arc::clone(&shared);
            let on_interrupt = config.on_interrupt.normalized();
            move || redraw_loop(shared, quit_rx, interval, on_interrupt)
        });

        info!("progress display started, refresh every {:?}", interval);

        Self {
            shared,
            quit: Some(quit_tx),
            redraw: Some(redraw),
            input,
            input_stop,
        }
    }

    /// Track a new task and redraw right away.
    ///
    /// The entry is always added; if the handle cannot be inspected the
    /// task gets a spinner and the error is shown on its line.
    pub fn add(&self, name: impl Into<String>, handle: impl Into<ProgressHandle>) {
        let name = name.into();
        let (source, error) = classify(handle.into());
        if let Some(e) = &error {
            debug!("{}: falling back to spinner: {}", name, e);
        }
        debug!("adding {} ({:?})", name, source.kind());

        let mut state = self.shared.lock();
        state.entries.push(ProgressEntry {
            name,
            source,
            error: error.map(anyhow::Error::from),
        });
        if let Err(e) = self.shared.redraw_locked(&mut state) {
            warn!("redraw after add failed: {}", e);
        }
    }

    /// Mark the first entry called `name` as finished, recording `err`.
    /// Unknown names are ignored.
    pub fn complete(&self, name: &str, err: Option<anyhow::Error>) {
        let mut state = self.shared.lock();
        match state.entries.iter_mut().find(|e| e.name == name) {
            Some(entry) => {
                debug!("completing {}", name);
                entry.source.mark_done();
                entry.error = err;
            }
            None => debug!("complete: no entry named {}", name),
        }
    }

    /// Drop the first entry called `name`. Unknown names are ignored.
    pub fn remove(&self, name: &str) {
        let mut state = self.shared.lock();
        if let Some(idx) = state.entries.iter().position(|e| e.name == name) {
            debug!("removing {}", name);
            state.entries.remove(idx);
        }
    }

    pub fn len(&self) -> usize {
        self.shared.lock().entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Entry names in the order they were added.
    pub fn names(&self) -> Vec<String> {
        self.shared
            .lock()
            .entries
            .iter()
            .map(|e| e.name.clone())
            .collect()
    }

    /// Run `f` on the first entry called `name`, under the registry lock.
    pub fn inspect<R>(
        &self,
        name: &str,
        f: impl FnOnce(&mut ProgressEntry) -> R,
    ) -> Option<R> {
        let mut state = self.shared.lock();
        state.entries.iter_mut().find(|e| e.name == name).map(f)
    }

    /// Run `f` on the surface, under the registry lock.
    pub fn with_surface<R>(&self, f: impl FnOnce(&mut S) -> R) -> R {
        f(&mut self.shared.lock().surface)
    }

    /// Whether the display was torn down by a cancel keystroke.
    pub fn interrupted(&self) -> bool {
        self.shared.interrupted.load(Ordering::Acquire)
    }

    /// Stop drawing and give the terminal back. Returns once the redraw
    /// thread has released the surface.
    pub fn stop(mut self) -> Result<()> {
        self.shutdown().map_err(ProgressError::Terminal)
    }

    fn shutdown(&mut self) -> io::Result<()> {
        self.input_stop.store(true, Ordering::Release);
        if let Some(quit) = self.quit.take() {
            // Fails only if the redraw thread already exited after an interrupt.
            let _ = quit.send(Quit::Stop);
        }
        let result = match self.redraw.take() {
            Some(handle) => handle.join().unwrap_or_else(|_| {
                Err(io::Error::new(
                    io::ErrorKind::Other,
                    "redraw thread panicked",
                ))
            }),
            None => Ok(()),
        };
        if let Some(handle) = self.input.take() {
            let _ = handle.join();
        }
        info!("progress display stopped");
        result
    }
}

impl<S: Surface> Drop for Registry<S> {
    fn drop(&mut self) {
        if self.redraw.is_some() {
            if let Err(e) = self.shutdown() {
                warn!("failed to release terminal: {}", e);
            }
        }
    }
}

fn redraw_loop<S: Surface>(
    shared: Arc<Shared<S>>,
    quit: Receiver<Quit>,
    interval: Duration,
    on_interrupt: InterruptAction,
) -> io::Result<()> {
    loop {
        match quit.recv_timeout(interval) {
            Err(RecvTimeoutError::Timeout) => shared.redraw(),
            Ok(Quit::Stop) | Err(RecvTimeoutError::Disconnected) => return shared.release(),
            Ok(Quit::Interrupt) => {
                let released = shared.release();
                shared.interrupted.store(true, Ordering::Release);
                match on_interrupt {
                    InterruptAction::Exit(code) => {
                        if let Err(e) = released {
                            warn!("failed to release terminal: {}", e);
                        }
                        info!("interrupted, exiting with {}", code);
                        std::process::exit(code);
                    }
                    InterruptAction::Detach => {
                        info!("interrupted, display detached");
                        return released;
                    }
                }
            }
        }
    }
}
