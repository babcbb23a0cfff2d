//! Background analysis worker
//!
//! Runs one analysis on a dedicated thread so the caller (typically a UI
//! loop) stays responsive.
//!
//! ```text
//! Caller                               Analysis Thread
//!   │                                        │
//!   │  spawn(buffer)  ── ownership moves ──► │
//!   │                                        │ K-weighting, gating, ...
//!   │  ◄── Progress(0..=100) ─────────────── │
//!   │  ◄── Completed(report) | Failed(err) ─ │  (exactly one)
//!   │                                        │
//! ```
//!
//! The buffer is moved into the thread and dropped there once the run ends;
//! nothing is shared between the two sides except the channel and the
//! cancel flag.

use crate::buffer::SampleBuffer;
use crate::config::AnalysisConfig;
use crate::engine::LoudnessEngine;
use crate::error::{LoudnessError, Result};
use crate::progress::CancelFlag;
use crate::result::LoudnessReport;
use crossbeam_channel::{unbounded, Receiver, RecvTimeoutError, Sender, TryRecvError};
use std::thread::{self, JoinHandle};
use std::time::Duration;
use tracing::{debug, warn};

/// Message sent from the analysis thread
#[derive(Debug)]
pub enum AnalysisEvent {
    /// Percentage done; strictly increasing within one run
    Progress(u8),
    /// Terminal: the run finished
    Completed(Box<LoudnessReport>),
    /// Terminal: the run failed or was cancelled
    Failed(LoudnessError),
}

impl AnalysisEvent {
    pub fn is_terminal(&self) -> bool {
        !matches!(self, Self::Progress(_))
    }
}

/// Starts analysis runs on background threads
pub struct AnalysisWorker;

impl AnalysisWorker {
    /// Move `buffer` to a new thread and start analyzing it
    ///
    /// The configuration is validated before the thread starts. Input
    /// problems in the buffer are reported through the handle as a
    /// `Failed` event, before any progress.
    ///
    /// # Errors
    /// Returns [`LoudnessError::InvalidConfig`] for bad settings or
    /// [`LoudnessError::WorkerSpawn`] if the thread cannot be created
    pub fn spawn(buffer: SampleBuffer, config: AnalysisConfig) -> Result<AnalysisHandle> {
        Self::spawn_with_cancel(buffer, config, CancelFlag::new())
    }

    /// Like [`spawn`](Self::spawn), but stopped through a flag the caller
    /// already holds
    ///
    /// Useful when one flag should stop several runs, or when it has to be
    /// wired up before the handle exists.
    ///
    /// # Errors
    /// Same as [`spawn`](Self::spawn)
    pub fn spawn_with_cancel(
        buffer: SampleBuffer,
        config: AnalysisConfig,
        cancel: CancelFlag,
    ) -> Result<AnalysisHandle> {
        let engine = LoudnessEngine::new(config)?;
        let (event_tx, event_rx) = unbounded::<AnalysisEvent>();
        let thread_cancel = cancel.clone();

        let thread = thread::Builder::new()
            .name("loudness-analysis".to_string())
            .spawn(move || Self::analysis_thread(&engine, buffer, &event_tx, &thread_cancel))
            .map_err(LoudnessError::WorkerSpawn)?;

        Ok(AnalysisHandle {
            events: event_rx,
            cancel,
            thread: Some(thread),
            finished: false,
        })
    }

    fn analysis_thread(
        engine: &LoudnessEngine,
        buffer: SampleBuffer,
        events: &Sender<AnalysisEvent>,
        cancel: &CancelFlag,
    ) {
        debug!(
            frames = buffer.frames(),
            channels = buffer.channel_count(),
            "Analysis thread started"
        );

        let mut send_progress = |percent: u8| {
            // A dropped handle just means nobody is listening any more
            let _ = events.send(AnalysisEvent::Progress(percent));
        };

        let terminal = match engine.analyze(&buffer, &mut send_progress, cancel) {
            Ok(report) => AnalysisEvent::Completed(Box::new(report)),
            Err(err) => {
                warn!("Loudness analysis failed: {}", err);
                AnalysisEvent::Failed(err)
            }
        };
        drop(buffer);

        if events.send(terminal).is_err() {
            debug!("Analysis handle dropped before the result was delivered");
        }
    }
}

/// Caller's side of a running analysis
pub struct AnalysisHandle {
    events: Receiver<AnalysisEvent>,
    cancel: CancelFlag,
    thread: Option<JoinHandle<()>>,
    finished: bool,
}

impl AnalysisHandle {
    /// Raw event receiver, for `select!`-style integration
    pub fn events(&self) -> &Receiver<AnalysisEvent> {
        &self.events
    }

    /// Ask the worker to stop at its next checkpoint
    ///
    /// The run then ends with `Failed(LoudnessError::Cancelled)` unless it
    /// had already finished.
    pub fn cancel(&self) {
        self.cancel.cancel();
    }

    /// Whether the terminal event has been received
    pub fn is_finished(&self) -> bool {
        self.finished
    }

    /// Next event if one is waiting (non-blocking)
    ///
    /// A worker that vanished without a terminal event is reported once as
    /// `Failed(WorkerDisconnected)`; after the terminal event this returns
    /// `None`.
    pub fn try_next(&mut self) -> Option<AnalysisEvent> {
        if self.finished {
            return None;
        }
        match self.events.try_recv() {
            Ok(event) => Some(self.observe(event)),
            Err(TryRecvError::Empty) => None,
            Err(TryRecvError::Disconnected) => Some(self.disconnected()),
        }
    }

    /// Next event, waiting at most `timeout`
    pub fn next_timeout(&mut self, timeout: Duration) -> Option<AnalysisEvent> {
        if self.finished {
            return None;
        }
        match self.events.recv_timeout(timeout) {
            Ok(event) => Some(self.observe(event)),
            Err(RecvTimeoutError::Timeout) => None,
            Err(RecvTimeoutError::Disconnected) => Some(self.disconnected()),
        }
    }

    /// Block until the run ends, forwarding progress to `on_progress`
    ///
    /// # Errors
    /// The failure the worker reported, or
    /// [`LoudnessError::WorkerDisconnected`]
    pub fn wait(mut self, mut on_progress: impl FnMut(u8)) -> Result<LoudnessReport> {
        loop {
            if self.finished {
                return Err(LoudnessError::WorkerDisconnected);
            }
            let event = match self.events.recv() {
                Ok(event) => self.observe(event),
                Err(_) => self.disconnected(),
            };
            match event {
                AnalysisEvent::Progress(percent) => on_progress(percent),
                AnalysisEvent::Completed(report) => return Ok(*report),
                AnalysisEvent::Failed(err) => return Err(err),
            }
        }
    }

    fn observe(&mut self, event: AnalysisEvent) -> AnalysisEvent {
        if event.is_terminal() {
            self.finished = true;
            self.join();
        }
        event
    }

    fn disconnected(&mut self) -> AnalysisEvent {
        self.finished = true;
        self.join();
        AnalysisEvent::Failed(LoudnessError::WorkerDisconnected)
    }

    fn join(&mut self) {
        if let Some(thread) = self.thread.take() {
            if thread.join().is_err() {
                warn!("Analysis thread panicked");
            }
        }
    }
}

impl Drop for AnalysisHandle {
    fn drop(&mut self) {
        // Let an abandoned run stop early; the thread is detached
        if !self.finished {
            self.cancel.cancel();
        }
    }
}
