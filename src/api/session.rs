//! Background reconciliation session
//!
//! Runs the engine on a dedicated thread at the configured tick interval.
//! Location updates arrive over a crossbeam channel (or from an attached
//! [`LocationSource`]) and are drained at the start of every tick, so the
//! estimate store is only ever touched under the engine lock.

use crate::api::callback::{CallbackHandle, EventCallback, EventDispatcher};
use crate::api::engine::SceneLocationEngine;
use crate::hardware::{LocationSource, LocationUpdate, SceneError, SceneInterface};
use crossbeam_channel::{Receiver, Sender};
use parking_lot::Mutex;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use thiserror::Error;

/// Session lifecycle errors
#[derive(Debug, Error)]
pub enum SessionError {
    #[error("session already running")]
    AlreadyRunning,
    #[error("scene failed to start: {0}")]
    Scene(#[from] SceneError),
    #[error("failed to spawn reconciliation thread: {0}")]
    Spawn(#[from] std::io::Error),
}

type SourceSlot = Option<Box<dyn LocationSource>>;

/// Owns the engine and its reconciliation thread
pub struct Session<S: SceneInterface + Send + 'static> {
    engine: Arc<Mutex<SceneLocationEngine<S>>>,
    dispatcher: Arc<Mutex<EventDispatcher>>,
    sender: Sender<LocationUpdate>,
    receiver: Receiver<LocationUpdate>,
    source: SourceSlot,
    running: Arc<AtomicBool>,
    handle: Option<JoinHandle<SourceSlot>>,
}

impl<S: SceneInterface + Send + 'static> Session<S> {
    pub fn new(engine: SceneLocationEngine<S>) -> Self {
        let (sender, receiver) = crossbeam_channel::unbounded();
        Self {
            engine: Arc::new(Mutex::new(engine)),
            dispatcher: Arc::new(Mutex::new(EventDispatcher::new())),
            sender,
            receiver,
            source: None,
            running: Arc::new(AtomicBool::new(false)),
            handle: None,
        }
    }

    /// Poll `source` for updates on every tick
    pub fn with_source(mut self, source: Box<dyn LocationSource>) -> Self {
        log::debug!("Attached location source '{}'", source.name());
        self.source = Some(source);
        self
    }

    /// Sender feeding fixes and headings into the session
    pub fn location_sender(&self) -> Sender<LocationUpdate> {
        self.sender.clone()
    }

    /// Shared handle to the engine
    pub fn engine(&self) -> Arc<Mutex<SceneLocationEngine<S>>> {
        Arc::clone(&self.engine)
    }

    pub fn register_callback(&self, callback: EventCallback) -> CallbackHandle {
        self.dispatcher.lock().register(callback)
    }

    pub fn unregister_callback(&self, handle: CallbackHandle) -> bool {
        self.dispatcher.lock().unregister(handle)
    }

    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::Acquire)
    }

    /// Start the scene and spawn the reconciliation thread
    pub fn start(&mut self) -> Result<(), SessionError> {
        if self.handle.is_some() {
            return Err(SessionError::AlreadyRunning);
        }

        let interval = {
            let mut engine = self.engine.lock();
            engine.start()?;
            engine.config().tick_interval()
        };

        self.running.store(true, Ordering::Release);

        let engine = Arc::clone(&self.engine);
        let dispatcher = Arc::clone(&self.dispatcher);
        let receiver = self.receiver.clone();
        let running = Arc::clone(&self.running);
        let mut source = self.source.take();

        let spawned = thread::Builder::new()
            .name("scene-location".into())
            .spawn(move || {
                let ticker = crossbeam_channel::tick(interval);
                let mut ticks: u64 = 0;

                while running.load(Ordering::Acquire) {
                    if ticker.recv().is_err() {
                        break;
                    }
                    if !running.load(Ordering::Acquire) {
                        break;
                    }

                    // One lock acquisition per tick
                    let events = {
                        let mut engine = engine.lock();
                        if let Some(source) = source.as_mut() {
                            while let Some(update) = source.poll_update() {
                                engine.handle_update(update);
                            }
                        }
                        for update in receiver.try_iter() {
                            engine.handle_update(update);
                        }
                        engine.on_frame_rendered();
                        engine.tick()
                    };

                    dispatcher.lock().dispatch_all(&events);
                    ticks += 1;
                }

                log::debug!("Reconciliation thread exiting after {} ticks", ticks);
                source
            });

        match spawned {
            Ok(handle) => {
                self.handle = Some(handle);
                log::info!("Session started, ticking every {:?}", interval);
                Ok(())
            }
            Err(e) => {
                self.running.store(false, Ordering::Release);
                self.engine.lock().pause();
                Err(SessionError::Spawn(e))
            }
        }
    }

    /// Halt ticking, join the thread and discard queued updates
    pub fn stop(&mut self) {
        self.running.store(false, Ordering::Release);

        if let Some(handle) = self.handle.take() {
            match handle.join() {
                Ok(source) => self.source = source,
                Err(_) => log::warn!("Reconciliation thread panicked"),
            }
        }

        let discarded = self.receiver.try_iter().count();
        if discarded > 0 {
            log::debug!("Discarded {} pending location updates", discarded);
        }

        let mut engine = self.engine.lock();
        if engine.is_running() {
            engine.pause();
            log::info!("Session stopped");
        }
    }
}

impl<S: SceneInterface + Send + 'static> Drop for Session<S> {
    fn drop(&mut self) {
        self.stop();
    }
}
