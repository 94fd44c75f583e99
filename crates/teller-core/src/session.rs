//! A chat bound to a backend: owns the turn controller and the one request
//! that may be in flight for it.

use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinHandle;
use tracing::debug;

use crate::api::{ApiError, AskResponse, AssistantBackend};
use crate::reveal::RevealEvent;
use crate::turn::{SubmitOutcome, TurnController, TurnState};

pub struct ChatSession {
    controller: TurnController,
    backend: Arc<dyn AssistantBackend>,
    in_flight: Option<JoinHandle<Result<AskResponse, ApiError>>>,
    reveal_delay: Duration,
}

impl ChatSession {
    pub fn new(
        controller: TurnController,
        backend: Arc<dyn AssistantBackend>,
        reveal_delay: Duration,
    ) -> Self {
        Self {
            controller,
            backend,
            in_flight: None,
            reveal_delay,
        }
    }

    pub fn controller(&self) -> &TurnController {
        &self.controller
    }

    pub fn controller_mut(&mut self) -> &mut TurnController {
        &mut self.controller
    }

    pub fn reveal_delay(&self) -> Duration {
        self.reveal_delay
    }

    pub fn is_awaiting_response(&self) -> bool {
        self.in_flight.is_some()
    }

    pub fn is_revealing(&self) -> bool {
        self.controller.state() == TurnState::Revealing
    }

    /// Submit a question; on `Sent` the request is spawned right away.
    /// Must be called from within a tokio runtime.
    pub fn submit(&mut self, text: &str) -> SubmitOutcome {
        let outcome = self.controller.submit(text);
        self.dispatch(&outcome);
        outcome
    }

    pub fn submit_suggestion(&mut self, index: usize) -> SubmitOutcome {
        let outcome = self.controller.submit_suggestion(index);
        self.dispatch(&outcome);
        outcome
    }

    fn dispatch(&mut self, outcome: &SubmitOutcome) {
        if let SubmitOutcome::Sent(request) = outcome {
            let backend = Arc::clone(&self.backend);
            let request = request.clone();
            self.in_flight = Some(tokio::spawn(async move { backend.ask(request).await }));
        }
    }

    /// Wait for the in-flight request and hand its outcome to the controller.
    /// Pends forever when nothing is in flight. Safe to cancel: the request
    /// keeps running and a later call picks it up.
    pub async fn settle_response(&mut self) {
        let Some(handle) = self.in_flight.as_mut() else {
            return std::future::pending().await;
        };

        let joined = handle.await;
        self.in_flight = None;

        let result = match joined {
            Ok(result) => result,
            Err(err) => Err(ApiError::Task(err.to_string())),
        };
        self.controller.resolve(result);
    }

    /// Wait one reveal delay, then reveal the next character. Pends forever
    /// when no reply is being revealed.
    pub async fn next_reveal(&mut self) -> Option<RevealEvent> {
        if !self.is_revealing() {
            return std::future::pending().await;
        }
        tokio::time::sleep(self.reveal_delay).await;
        self.controller.advance_reveal()
    }

    /// Make whatever progress the turn allows: settle the request if one is
    /// out, otherwise reveal the next character. Pends forever when idle.
    pub async fn drive(&mut self) -> Option<RevealEvent> {
        if self.in_flight.is_some() {
            self.settle_response().await;
            return None;
        }
        self.next_reveal().await
    }

    /// Run one whole turn without animation. Returns the outcome of the
    /// submit; the controller holds the result.
    pub async fn run_turn(&mut self, text: &str) -> SubmitOutcome {
        let outcome = self.submit(text);
        if matches!(outcome, SubmitOutcome::Sent(_)) {
            self.settle_response().await;
            self.controller.finish_reveal();
        }
        outcome
    }

    /// Stop everything: abort the request and drop any reveal.
    pub fn dismiss(&mut self) {
        if let Some(handle) = self.in_flight.take() {
            debug!("aborting in-flight assistant request");
            handle.abort();
        }
        self.controller.dismiss();
    }
}

impl Drop for ChatSession {
    fn drop(&mut self) {
        if let Some(handle) = self.in_flight.take() {
            handle.abort();
        }
    }
}
