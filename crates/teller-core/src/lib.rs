pub mod api;
pub mod config;
pub mod format;
pub mod handoff;
pub mod locale;
pub mod logging;
pub mod money;
pub mod reveal;
pub mod session;
pub mod state;
pub mod turn;

// Re-export main types for convenience
pub use api::{ApiError, AskRequest, AskResponse, AssistantBackend, AssistantClient, PaymentMetadata};
pub use config::Config;
pub use format::FormattedSegment;
pub use handoff::{HandoffRejection, PendingPayment};
pub use locale::Locale;
pub use reveal::{RevealEvent, RevealState, Typewriter};
pub use session::ChatSession;
pub use state::{Author, ConversationEntry, ConversationLog};
pub use turn::{SubmitOutcome, TurnController, TurnState};
