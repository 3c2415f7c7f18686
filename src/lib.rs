//! Docs Chat - question-answering client for a documentation site
//!
//! One chat surface holds one conversation. Questions go through a
//! pure state machine that serializes submissions, then out to the
//! answering service over HTTP; every failure comes back as a readable
//! assistant turn.

pub mod gateway;
pub mod state_machine;
pub mod store;
pub mod surface;

pub use gateway::{
    AnswerService, ErrorKind, GatewayConfig, GatewayError, HttpGateway, LoggingGateway,
    PageContext,
};
pub use state_machine::{ChatState, Conversation, Role, Turn};
pub use store::ConversationStore;
pub use surface::{ChatSurface, SharedStore};
