//! Submission lifecycle and the background worker that drives it.

use std::sync::mpsc::{self, Receiver, TryRecvError};
use std::thread;
use std::time::{Duration, Instant};

use tracing::{debug, warn};

use super::client::ConversionGateway;
use super::transport::HttpTransport;
use crate::error::ConvertError;
use crate::models::{ConversionOutcome, PendingConversionRequest};

/// `Idle → Submitting → {Succeeded, Failed}`. Terminal states never move.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum SubmissionState {
    #[default]
    Idle,
    Submitting,
    Succeeded(ConversionOutcome),
    Failed(String),
}

impl SubmissionState {
    pub fn is_pending(&self) -> bool {
        matches!(self, Self::Submitting)
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Succeeded(_) | Self::Failed(_))
    }

    /// Idle to Submitting. Returns false from any other state.
    pub fn begin(&mut self) -> bool {
        if *self != Self::Idle {
            return false;
        }
        *self = Self::Submitting;
        true
    }

    /// Submitting to a terminal state. Returns false unless a submission
    /// is in flight, so a result is applied at most once.
    pub fn finish(&mut self, result: Result<ConversionOutcome, ConvertError>) -> bool {
        if !self.is_pending() {
            return false;
        }
        *self = match result {
            Ok(outcome) => Self::Succeeded(outcome),
            Err(err) => Self::Failed(err.to_string()),
        };
        true
    }
}

/// Handle on one in-flight submission.
pub struct Submission {
    request: PendingConversionRequest,
    receiver: Receiver<Result<ConversionOutcome, ConvertError>>,
    started: Instant,
}

impl Submission {
    pub fn request(&self) -> &PendingConversionRequest {
        &self.request
    }

    pub fn started(&self) -> Instant {
        self.started
    }

    /// Non-blocking check for the worker's result. A worker that went
    /// away without sending counts as a transport failure.
    pub fn poll(&self) -> Option<Result<ConversionOutcome, ConvertError>> {
        match self.receiver.try_recv() {
            Ok(result) => Some(result),
            Err(TryRecvError::Empty) => None,
            Err(TryRecvError::Disconnected) => {
                warn!("Conversion worker exited without a result");
                Some(Err(ConvertError::transport("Conversion was interrupted")))
            }
        }
    }

    /// Block until the worker reports.
    pub fn wait(self) -> Result<ConversionOutcome, ConvertError> {
        self.receiver
            .recv()
            .unwrap_or_else(|_| Err(ConvertError::transport("Conversion was interrupted")))
    }
}

/// Run `request` on a worker thread. Validation and encoding happen on
/// the worker too, so every submission reports through the channel.
pub fn spawn_submission<T>(
    gateway: ConversionGateway<T>,
    request: PendingConversionRequest,
) -> Submission
where
    T: HttpTransport + Clone + 'static,
{
    let (sender, receiver) = mpsc::channel();
    let worker_request = request.clone();
    thread::spawn(move || {
        debug!(kind = %worker_request.kind, "Submitting conversion");
        let result = gateway.submit(&worker_request);
        // The receiver may already be gone if the UI quit.
        let _ = sender.send(result);
    });
    Submission { request, receiver, started: Instant::now() }
}

const TICK: Duration = Duration::from_millis(200);
const STEP: u16 = 5;
const PENDING_CEILING: u16 = 90;
const LINGER: Duration = Duration::from_millis(300);

/// Progress shown while a request is in flight. Advances with elapsed
/// time, holds at 90% until the request completes, then shows 100%
/// briefly before hiding.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SimulatedProgress {
    started: Instant,
    completed: Option<Instant>,
}

impl SimulatedProgress {
    pub fn start(now: Instant) -> Self {
        Self { started: now, completed: None }
    }

    pub fn complete(&mut self, now: Instant) {
        if self.completed.is_none() {
            self.completed = Some(now);
        }
    }

    pub fn percent(&self, now: Instant) -> u16 {
        if self.completed.is_some() {
            return 100;
        }
        let ticks = now.saturating_duration_since(self.started).as_millis() / TICK.as_millis();
        let ticks = u16::try_from(ticks).unwrap_or(u16::MAX);
        ticks.saturating_mul(STEP).min(PENDING_CEILING)
    }

    pub fn is_visible(&self, now: Instant) -> bool {
        match self.completed {
            Some(done) => now.saturating_duration_since(done) < LINGER,
            None => true,
        }
    }
}
