//! Chat surface lifecycle
//!
//! Opening the surface starts a fresh conversation; closing it drops the
//! conversation. Nothing survives a reopen.

use crate::gateway::AnswerService;
use crate::store::ConversationStore;
use std::sync::Arc;

/// Store type handed to hosts
pub type SharedStore = Arc<ConversationStore<Arc<dyn AnswerService>>>;

/// One chat surface with at most one active conversation
pub struct ChatSurface {
    gateway: Arc<dyn AnswerService>,
    active: Option<SharedStore>,
}

impl ChatSurface {
    pub fn new(gateway: Arc<dyn AnswerService>) -> Self {
        Self {
            gateway,
            active: None,
        }
    }

    /// Return the active conversation, starting one if the surface is closed
    pub fn open(&mut self) -> SharedStore {
        let gateway = &self.gateway;
        let store = self.active.get_or_insert_with(|| {
            let store = Arc::new(ConversationStore::new(Arc::clone(gateway)));
            tracing::info!(conv_id = %store.conversation_id(), "Chat surface opened");
            store
        });
        Arc::clone(store)
    }

    /// Drop the active conversation. Returns whether one was open.
    pub fn close(&mut self) -> bool {
        match self.active.take() {
            Some(store) => {
                tracing::info!(
                    conv_id = %store.conversation_id(),
                    turns = store.snapshot().transcript().len(),
                    "Chat surface closed"
                );
                true
            }
            None => false,
        }
    }

    #[must_use]
    pub fn is_open(&self) -> bool {
        self.active.is_some()
    }

    #[must_use]
    pub fn active(&self) -> Option<&SharedStore> {
        self.active.as_ref()
    }
}
