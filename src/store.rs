//! Conversation store
//!
//! Owns one [`Conversation`], feeds events through the pure state machine
//! and runs the resulting effects against an [`AnswerService`].


use crate::gateway::{Answer, AnswerService, ChatRequest, PageContext};
use crate::state_machine::{
    transition, Conversation, Effect, Event, TransitionError, TransitionResult,
};
use chrono::Utc;
use tokio::sync::watch;

/// Single source of truth for one chat conversation
///
/// The conversation lives in a watch channel: presentation code can pull a
/// [`snapshot`](Self::snapshot) or [`subscribe`](Self::subscribe) to changes.
/// It is only mutated synchronously, never across an await.
pub struct ConversationStore<G: AnswerService> {
    id: String,
    gateway: G,
    conversation: watch::Sender<Conversation>,
}

impl<G: AnswerService> ConversationStore<G> {
    pub fn new(gateway: G) -> Self {
        let conversation = Conversation::new();
        let id = conversation.id().to_string();
        let (conversation, _) = watch::channel(conversation);
        tracing::debug!(conv_id = %id, endpoint = %gateway.endpoint(), "Conversation created");
        Self {
            id,
            gateway,
            conversation,
        }
    }

    pub fn conversation_id(&self) -> &str {
        &self.id
    }

    /// Current state, cloned
    pub fn snapshot(&self) -> Conversation {
        self.conversation.borrow().clone()
    }

    /// Receiver that is marked changed on every applied transition
    pub fn subscribe(&self) -> watch::Receiver<Conversation> {
        self.conversation.subscribe()
    }

    pub fn is_busy(&self) -> bool {
        self.conversation.borrow().is_busy()
    }

    /// Ask a question. Blank text, or a call while an answer is pending, is ignored.
    pub async fn submit(&self, text: &str, user_id: Option<&str>) {
        self.submit_with_context(text, user_id, PageContext::default())
            .await;
    }

    /// Ask a question along with what the reader was looking at
    pub async fn submit_with_context(
        &self,
        text: &str,
        user_id: Option<&str>,
        context: PageContext,
    ) {
        let has_context = !context.is_empty();
        let event = Event::Submit {
            text: text.to_string(),
            user_id: user_id.map(str::to_string),
            context,
        };

        let request = match self.dispatch(event) {
            Ok(Some(request)) => request,
            Ok(None) => return,
            Err(e) => {
                tracing::debug!(conv_id = %self.id, error = %e, "Submission ignored");
                return;
            }
        };

        tracing::info!(
            conv_id = %self.id,
            chars = request.message.chars().count(),
            has_token = request.session_id.is_some(),
            has_user = request.user_id.is_some(),
            has_context,
            "Question submitted"
        );

        let in_flight = InFlight::new(self);
        let result = self.gateway.ask(&request).await;
        in_flight.disarm();

        let event = match result {
            Ok(answer) => {
                self.note_rotated_token(&answer);
                Event::AnswerReceived(answer)
            }
            Err(e) => {
                tracing::warn!(
                    conv_id = %self.id,
                    error_kind = %e.kind,
                    error = %e.message,
                    "Question failed"
                );
                Event::RequestFailed {
                    kind: e.kind,
                    message: e.message,
                }
            }
        };

        if let Err(e) = self.dispatch(event) {
            tracing::error!(conv_id = %self.id, error = %e, "Failed to record resolution");
        }
    }

    /// Run one event through the state machine and apply its effects.
    /// Returns the request to send, if the transition asked for one.
    fn dispatch(&self, event: Event) -> Result<Option<ChatRequest>, TransitionError> {
        let mut outcome = Ok(None);
        self.conversation
            .send_if_modified(|conv| match transition(conv, event) {
                Ok(result) => {
                    outcome = Ok(apply(conv, result));
                    true
                }
                Err(e) => {
                    outcome = Err(e);
                    false
                }
            });
        outcome
    }

    fn note_rotated_token(&self, answer: &Answer) {
        let rotated = {
            let conv = self.conversation.borrow();
            match (conv.continuation_token(), answer.continuation_token.as_ref()) {
                (Some(held), Some(offered)) if held != offered => Some(offered.clone()),
                _ => None,
            }
        };
        if let Some(offered) = rotated {
            tracing::debug!(conv_id = %self.id, offered = %offered, "Discarding changed continuation token");
        }
    }
}

/// Execute effects against the conversation. Returns the outgoing request.
fn apply(conv: &mut Conversation, result: TransitionResult) -> Option<ChatRequest> {
    let mut request = None;
    for effect in result.effects {
        match effect {
            Effect::AppendTurn(draft) => {
                conv.append(draft, Utc::now());
            }
            Effect::AdoptToken(token) => {
                if conv.adopt_token(token) {
                    tracing::debug!(conv_id = %conv.id(), "Continuation token adopted");
                }
            }
            Effect::RequestAnswer(outgoing) => request = Some(outgoing),
        }
    }
    conv.set_state(result.new_state);
    request
}

/// Returns the store to idle if the submitting future is dropped mid-exchange
struct InFlight<'a, G: AnswerService> {
    store: &'a ConversationStore<G>,
    armed: bool,
}

impl<'a, G: AnswerService> InFlight<'a, G> {
    fn new(store: &'a ConversationStore<G>) -> Self {
        Self { store, armed: true }
    }

    fn disarm(mut self) {
        self.armed = false;
    }
}

impl<G: AnswerService> Drop for InFlight<'_, G> {
    fn drop(&mut self) {
        if self.armed {
            tracing::warn!(conv_id = %self.store.id, "Question abandoned before an answer arrived");
            // Only fails if the exchange already resolved, which disarms first
            let _ = self.store.dispatch(Event::Abandoned);
        }
    }
}
