//! Terminal input watching
//!
//! The input thread only ever turns a cancel keystroke into a quit signal; it
//! never touches registry entries.

use std::io;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{Receiver, RecvTimeoutError, SyncSender};
use std::sync::Arc;
use std::time::Duration;

use crossterm::event::{self, Event, KeyCode, KeyEventKind, KeyModifiers};
use tracing::{debug, warn};

use super::Quit;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputEvent {
    /// The user asked to cancel (Ctrl-C).
    Cancel,
    /// The input side is going away; stop watching.
    Closed,
    Other,
}

pub trait InputSource: Send {
    /// Wait up to `timeout` for the next event. `Ok(None)` means nothing
    /// arrived in time.
    fn next_event(&mut self, timeout: Duration) -> io::Result<Option<InputEvent>>;
}

/// Keyboard events from the controlling terminal.
#[derive(Debug, Default)]
pub struct CrosstermInput;

impl InputSource for CrosstermInput {
    fn next_event(&mut self, timeout: Duration) -> io::Result<Option<InputEvent>> {
        if !event::poll(timeout)? {
            return Ok(None);
        }
        let ev = match event::read()? {
            Event::Key(key)
                if key.kind == KeyEventKind::Press
                    && key.code == KeyCode::Char('c')
                    && key.modifiers.contains(KeyModifiers::CONTROL) =>
            {
                InputEvent::Cancel
            }
            _ => InputEvent::Other,
        };
        Ok(Some(ev))
    }
}

/// Events fed over a channel, for callers that own their own event loop.
#[derive(Debug)]
pub struct ChannelInput {
    rx: Receiver<InputEvent>,
}

impl ChannelInput {
    pub fn new(rx: Receiver<InputEvent>) -> Self {
        Self { rx }
    }
}

impl InputSource for ChannelInput {
    fn next_event(&mut self, timeout: Duration) -> io::Result<Option<InputEvent>> {
        match self.rx.recv_timeout(timeout) {
            Ok(ev) => Ok(Some(ev)),
            Err(RecvTimeoutError::Timeout) => Ok(None),
            Err(RecvTimeoutError::Disconnected) => Ok(Some(InputEvent::Closed)),
        }
    }
}

pub(super) fn watch(
    mut input: Box<dyn InputSource>,
    quit: SyncSender<Quit>,
    stop: Arc<AtomicBool>,
    poll: Duration,
) {
    while !stop.load(Ordering::Acquire) {
        match input.next_event(poll) {
            Ok(Some(InputEvent::Cancel)) => {
                debug!("cancel key received");
                // Fails only if the redraw thread is already gone.
                let _ = quit.send(Quit::Interrupt);
                return;
            }
            Ok(Some(InputEvent::Closed)) => return,
            Ok(Some(InputEvent::Other)) | Ok(None) => {}
            Err(e) => {
                warn!("input watcher stopped: {}", e);
                return;
            }
        }
    }
}
