//! The per-turn state machine of a chat.
//!
//! ```text
//! Idle --submit--> AwaitingResponse --reply--> Revealing --done--> Idle
//!                        |                         |
//!                        +--failure--> Idle        +--hand-off--> HandoffPending --confirm/cancel--> Idle
//! ```
//!
//! The controller does no I/O. `submit` hands back the request to send, the
//! caller feeds the outcome to `resolve`, and reveal ticks arrive through
//! `advance_reveal`.

use tracing::{debug, info, warn};

use crate::api::{ApiError, AskRequest, AskResponse};
use crate::format;
use crate::handoff::{self, HandoffRejection, PendingPayment};
use crate::locale::Locale;
use crate::reveal::{RevealEvent, RevealState, Typewriter};
use crate::state::ConversationLog;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TurnState {
    Idle,
    AwaitingResponse,
    Revealing,
    HandoffPending,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmitOutcome {
    /// The question was logged; send this request.
    Sent(AskRequest),
    /// Blank input, nothing happened.
    Empty,
    /// A turn is already in progress for this conversation.
    Busy,
    /// The chat has been dismissed.
    Closed,
}

/// Reply being revealed, kept until the reveal finishes
#[derive(Debug)]
struct ActiveReveal {
    typewriter: Typewriter,
    response: AskResponse,
}

#[derive(Debug)]
pub struct TurnController {
    user_id: String,
    locale: Locale,
    log: ConversationLog,
    state: TurnState,
    reveal: Option<ActiveReveal>,
    pending_payment: Option<PendingPayment>,
    last_rejection: Option<HandoffRejection>,
    suggestions: Vec<String>,
    show_suggestions: bool,
    dismissed: bool,
}

impl TurnController {
    /// A fresh chat that opens with the locale's greeting.
    pub fn new(user_id: impl Into<String>, locale: Locale) -> Self {
        let mut log = ConversationLog::new();
        log.push_assistant(vec![format::FormattedSegment::plain(locale.strings().greeting)]);

        Self {
            user_id: user_id.into(),
            locale,
            log,
            state: TurnState::Idle,
            reveal: None,
            pending_payment: None,
            last_rejection: None,
            suggestions: Vec::new(),
            show_suggestions: false,
            dismissed: false,
        }
    }

    /// Seed questions shown before the first turn.
    pub fn with_suggestions(mut self, suggestions: Vec<String>) -> Self {
        self.suggestions = suggestions
            .into_iter()
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();
        self.show_suggestions = !self.suggestions.is_empty();
        self
    }

    pub fn state(&self) -> TurnState {
        self.state
    }

    pub fn log(&self) -> &ConversationLog {
        &self.log
    }

    pub fn locale(&self) -> Locale {
        self.locale
    }

    /// Switch the language used for apologies and the payment description.
    /// Entries already in the log keep their text.
    pub fn set_locale(&mut self, locale: Locale) {
        self.locale = locale;
    }

    pub fn user_id(&self) -> &str {
        &self.user_id
    }

    pub fn pending_payment(&self) -> Option<&PendingPayment> {
        self.pending_payment.as_ref()
    }

    /// Why the most recent hand-off was refused, if it was
    pub fn last_rejection(&self) -> Option<&HandoffRejection> {
        self.last_rejection.as_ref()
    }

    /// Suggestions are visible until the first turn starts.
    pub fn suggestions(&self) -> &[String] {
        if self.show_suggestions {
            &self.suggestions
        } else {
            &[]
        }
    }

    pub fn reveal_state(&self) -> Option<RevealState> {
        self.reveal.as_ref().map(|r| r.typewriter.state())
    }

    pub fn visible_segments(&self) -> Option<&[format::FormattedSegment]> {
        self.reveal.as_ref().map(|r| r.typewriter.visible())
    }

    pub fn is_dismissed(&self) -> bool {
        self.dismissed
    }

    pub fn submit(&mut self, text: &str) -> SubmitOutcome {
        if self.dismissed {
            return SubmitOutcome::Closed;
        }
        let question = text.trim();
        if question.is_empty() {
            return SubmitOutcome::Empty;
        }
        if self.state != TurnState::Idle {
            debug!(state = ?self.state, "submit ignored while a turn is in progress");
            return SubmitOutcome::Busy;
        }

        self.log.push_user(question);
        self.show_suggestions = false;
        self.last_rejection = None;
        self.state = TurnState::AwaitingResponse;
        debug!("turn started");

        SubmitOutcome::Sent(AskRequest {
            user_input: question.to_string(),
            user_id: self.user_id.clone(),
        })
    }

    pub fn submit_suggestion(&mut self, index: usize) -> SubmitOutcome {
        match self.suggestions().get(index).cloned() {
            Some(question) => self.submit(&question),
            None => SubmitOutcome::Empty,
        }
    }

    /// Feed the outcome of the outbound request. Ignored unless awaiting one.
    pub fn resolve(&mut self, result: Result<AskResponse, ApiError>) {
        if self.dismissed || self.state != TurnState::AwaitingResponse {
            debug!(state = ?self.state, "dropping response outside of a pending turn");
            return;
        }

        let strings = self.locale.strings();
        match result {
            Ok(response) if response.success => {
                let segments = format::segments(&response.response);
                if format::joined(&segments).trim().is_empty() {
                    warn!("assistant replied successfully with an empty body");
                    self.fail(strings.failure_apology);
                    return;
                }
                self.reveal = Some(ActiveReveal {
                    typewriter: Typewriter::new(segments),
                    response,
                });
                self.state = TurnState::Revealing;
            }
            Ok(_) => {
                warn!("assistant reported failure");
                self.fail(strings.failure_apology);
            }
            Err(err) => {
                warn!(error = %err, "assistant request failed");
                self.fail(strings.error_apology);
            }
        }
    }

    /// Reveal one more character of the reply. On the final step the reply
    /// is logged and the hand-off gate consulted.
    pub fn advance_reveal(&mut self) -> Option<RevealEvent> {
        if self.dismissed || self.state != TurnState::Revealing {
            return None;
        }
        let event = self.reveal.as_mut()?.typewriter.advance()?;
        if event == RevealEvent::Complete {
            self.finish_reveal_now();
        }
        Some(event)
    }

    /// Skip the animation and finalize the reply immediately.
    pub fn finish_reveal(&mut self) {
        if self.dismissed || self.state != TurnState::Revealing {
            return;
        }
        self.finish_reveal_now();
    }

    fn finish_reveal_now(&mut self) {
        let Some(active) = self.reveal.take() else {
            return;
        };
        let ActiveReveal {
            typewriter,
            response,
        } = active;

        self.log.push_assistant(typewriter.segments().to_vec());

        match handoff::evaluate(&response, self.locale.strings().payment_description) {
            Ok(Some(payment)) => {
                info!(
                    amount = %payment.amount,
                    account = %payment.account_id,
                    "reply requested a payment hand-off"
                );
                self.pending_payment = Some(payment);
                self.state = TurnState::HandoffPending;
            }
            Ok(None) => {
                self.state = TurnState::Idle;
            }
            Err(rejection) => {
                warn!(%rejection, "ignoring incomplete payment hand-off");
                self.last_rejection = Some(rejection);
                self.state = TurnState::Idle;
            }
        }
    }

    /// Accept the pending payment and hand it to the verification flow.
    pub fn confirm_handoff(&mut self) -> Option<PendingPayment> {
        if self.dismissed || self.state != TurnState::HandoffPending {
            return None;
        }
        self.state = TurnState::Idle;
        self.pending_payment.take()
    }

    pub fn cancel_handoff(&mut self) {
        if self.dismissed || self.state != TurnState::HandoffPending {
            return;
        }
        debug!("payment hand-off cancelled");
        self.pending_payment = None;
        self.state = TurnState::Idle;
    }

    /// Tear the chat down. Any running reveal stops and later events are ignored.
    pub fn dismiss(&mut self) {
        self.reveal = None;
        self.pending_payment = None;
        self.state = TurnState::Idle;
        self.dismissed = true;
    }

    fn fail(&mut self, apology: &str) {
        self.log.push_assistant(vec![format::FormattedSegment::plain(apology)]);
        self.state = TurnState::Idle;
    }
}
