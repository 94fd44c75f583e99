use std::time::{Duration, Instant};

use chrono::{DateTime, Local};
use ratatui::layout::Rect;
use ratatui::widgets::ListState;
use teller_core::{ChatSession, Locale, PendingPayment, SubmitOutcome, TurnState};
use tracing::info;
use uuid::Uuid;

const PROCESSING_TIME: Duration = Duration::from_millis(1500);
const SUCCESS_TIME: Duration = Duration::from_millis(1000);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputMode {
    Normal,
    Editing,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FocusPane {
    Chat,
    Suggestions,
    Input,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VerificationPhase {
    Review,
    Processing,
    Success,
}

/// The payment verification screen opened after a confirmed hand-off.
/// Nothing is charged here; completing only plays the confirmation.
#[derive(Debug, Clone)]
pub struct Verification {
    pub payment: PendingPayment,
    pub transaction_id: String,
    pub opened_at: DateTime<Local>,
    pub phase: VerificationPhase,
    phase_started: Instant,
}

impl Verification {
    pub fn new(payment: PendingPayment) -> Self {
        let reference = Uuid::new_v4().simple().to_string().to_uppercase();
        Self {
            payment,
            transaction_id: reference[..13].to_string(),
            opened_at: Local::now(),
            phase: VerificationPhase::Review,
            phase_started: Instant::now(),
        }
    }

    pub fn start_processing(&mut self) {
        if self.phase == VerificationPhase::Review {
            self.set_phase(VerificationPhase::Processing);
        }
    }

    fn set_phase(&mut self, phase: VerificationPhase) {
        self.phase = phase;
        self.phase_started = Instant::now();
    }

    /// Step the timed phases. Returns true once the screen should close.
    pub fn tick(&mut self, now: Instant) -> bool {
        let elapsed = now.saturating_duration_since(self.phase_started);
        match self.phase {
            VerificationPhase::Review => false,
            VerificationPhase::Processing => {
                if elapsed >= PROCESSING_TIME {
                    self.set_phase(VerificationPhase::Success);
                }
                false
            }
            VerificationPhase::Success => elapsed >= SUCCESS_TIME,
        }
    }
}

pub struct App {
    // Core state
    pub should_quit: bool,
    pub input_mode: InputMode,
    pub focus: FocusPane,
    pub locale: Locale,

    // Conversation
    pub session: ChatSession,

    // Input box
    pub input: String,
    pub cursor: usize, // cursor position in input, in chars

    // Chat scroll
    pub chat_scroll: u16,
    pub follow_tail: bool,
    pub chat_height: u16,

    pub suggestion_state: ListState,
    pub verification: Option<Verification>,

    // Animation state
    pub animation_frame: u8, // 0-2 for ellipsis animation

    // Panel areas for mouse hit-testing (updated during render)
    pub chat_area: Option<Rect>,
    pub suggestions_area: Option<Rect>,
}

impl App {
    pub fn new(session: ChatSession) -> Self {
        let locale = session.controller().locale();
        let has_suggestions = !session.controller().suggestions().is_empty();

        let mut suggestion_state = ListState::default();
        if has_suggestions {
            suggestion_state.select(Some(0));
        }

        Self {
            should_quit: false,
            input_mode: InputMode::Editing,
            focus: FocusPane::Input,
            locale,

            session,

            input: String::new(),
            cursor: 0,

            chat_scroll: 0,
            follow_tail: true,
            chat_height: 0,

            suggestion_state,
            verification: None,

            animation_frame: 0,

            chat_area: None,
            suggestions_area: None,
        }
    }

    pub fn turn_state(&self) -> TurnState {
        self.session.controller().state()
    }

    pub fn suggestions(&self) -> &[String] {
        self.session.controller().suggestions()
    }

    /// Send the input box contents. The text stays put if the chat is busy.
    pub fn submit_input(&mut self) {
        match self.session.submit(&self.input) {
            SubmitOutcome::Sent(_) => {
                self.input.clear();
                self.cursor = 0;
                self.after_submit();
            }
            SubmitOutcome::Empty | SubmitOutcome::Busy | SubmitOutcome::Closed => {}
        }
    }

    pub fn submit_selected_suggestion(&mut self) {
        let Some(i) = self.suggestion_state.selected() else {
            return;
        };
        if let SubmitOutcome::Sent(_) = self.session.submit_suggestion(i) {
            self.after_submit();
        }
    }

    fn after_submit(&mut self) {
        self.follow_tail = true;
        if self.focus == FocusPane::Suggestions {
            self.focus = FocusPane::Input;
            self.input_mode = InputMode::Editing;
        }
    }

    pub fn confirm_payment(&mut self) {
        if let Some(payment) = self.session.controller_mut().confirm_handoff() {
            info!(account = %payment.account_id, "opening payment verification");
            self.verification = Some(Verification::new(payment));
        }
    }

    pub fn cancel_payment(&mut self) {
        self.session.controller_mut().cancel_handoff();
    }

    pub fn close_verification(&mut self) {
        if let Some(v) = &self.verification {
            if v.phase == VerificationPhase::Review {
                self.verification = None;
            }
        }
    }

    /// Tick animation frame and timed screens (called by Tick event)
    pub fn tick(&mut self) {
        if self.turn_state() == TurnState::AwaitingResponse {
            self.animation_frame = (self.animation_frame + 1) % 3;
        }

        let done = self
            .verification
            .as_mut()
            .map(|v| v.tick(Instant::now()))
            .unwrap_or(false);
        if done {
            self.verification = None;
        }
    }

    /// Switch to the next interface language. Returns the new locale.
    pub fn toggle_locale(&mut self) -> Locale {
        let locale = self.locale.next();
        self.locale = locale;
        self.session.controller_mut().set_locale(locale);
        info!(locale = locale.as_str(), "switched interface language");
        locale
    }

    pub fn scroll_up(&mut self, lines: u16) {
        self.follow_tail = false;
        self.chat_scroll = self.chat_scroll.saturating_sub(lines);
    }

    pub fn scroll_down(&mut self, lines: u16) {
        self.chat_scroll = self.chat_scroll.saturating_add(lines);
    }

    pub fn scroll_to_bottom(&mut self) {
        self.follow_tail = true;
    }

    pub fn suggestion_nav_down(&mut self) {
        let len = self.suggestions().len();
        if len > 0 {
            let i = self.suggestion_state.selected().unwrap_or(0);
            self.suggestion_state.select(Some((i + 1).min(len - 1)));
        }
    }

    pub fn suggestion_nav_up(&mut self) {
        let i = self.suggestion_state.selected().unwrap_or(0);
        self.suggestion_state.select(Some(i.saturating_sub(1)));
    }

    /// Cycle focus between the panes that are currently shown
    pub fn cycle_focus(&mut self) {
        let has_suggestions = !self.suggestions().is_empty();
        self.focus = match self.focus {
            FocusPane::Input => FocusPane::Chat,
            FocusPane::Chat if has_suggestions => FocusPane::Suggestions,
            FocusPane::Chat | FocusPane::Suggestions => FocusPane::Input,
        };
        self.input_mode = if self.focus == FocusPane::Input {
            InputMode::Editing
        } else {
            InputMode::Normal
        };
    }

    /// Tear down the chat before exit
    pub fn shutdown(&mut self) {
        self.session.dismiss();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal::Decimal;
    use std::sync::Arc;
    use teller_core::{AssistantClient, TurnController};

    fn app(locale: Locale) -> App {
        // Never contacted: these tests do not submit
        let backend = Arc::new(AssistantClient::new("http://127.0.0.1:9", Duration::from_secs(1)));
        let session = ChatSession::new(
            TurnController::new("user_001", locale),
            backend,
            Duration::from_millis(2),
        );
        App::new(session)
    }

    fn payment() -> PendingPayment {
        PendingPayment {
            amount: Decimal::from(500_000),
            account_id: "ACC1".to_string(),
            account_name: "Electric Co".to_string(),
            description: "Payment for banking service".to_string(),
        }
    }

    #[test]
    fn test_verification_phases() {
        let mut v = Verification::new(payment());
        let start = Instant::now();
        assert!(!v.tick(start + Duration::from_secs(10)));
        assert_eq!(v.phase, VerificationPhase::Review);

        v.start_processing();
        let t0 = v.phase_started;
        assert!(!v.tick(t0 + Duration::from_millis(100)));
        assert_eq!(v.phase, VerificationPhase::Processing);
        assert!(!v.tick(t0 + PROCESSING_TIME));
        assert_eq!(v.phase, VerificationPhase::Success);

        let t1 = v.phase_started;
        assert!(!v.tick(t1 + Duration::from_millis(10)));
        assert!(v.tick(t1 + SUCCESS_TIME));
    }

    #[test]
    fn test_transaction_id_shape() {
        let v = Verification::new(payment());
        assert_eq!(v.transaction_id.len(), 13);
        assert!(v.transaction_id.chars().all(|c| c.is_ascii_hexdigit() && !c.is_ascii_lowercase()));
    }

    #[test]
    fn test_toggle_locale_updates_chat_language() {
        let mut app = app(Locale::Vietnamese);
        assert_eq!(app.toggle_locale(), Locale::English);
        assert_eq!(app.locale, Locale::English);
        assert_eq!(app.session.controller().locale(), Locale::English);

        assert_eq!(app.toggle_locale(), Locale::Vietnamese);
        assert_eq!(app.session.controller().locale(), Locale::Vietnamese);
    }
}
