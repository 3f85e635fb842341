use std::sync::Arc;

use crate::application::ports::ConversationClient;
use crate::application::services::{ConversationRelay, SessionGuard};
use crate::presentation::config::Settings;

pub struct AppState<C>
where
    C: ConversationClient,
{
    pub relay: Arc<ConversationRelay<C>>,
    pub conversation_client: Arc<C>,
    pub session_guard: Arc<SessionGuard>,
    pub settings: Settings,
}

impl<C> AppState<C>
where
    C: ConversationClient,
{
    pub fn new(
        conversation_client: Arc<C>,
        session_guard: Arc<SessionGuard>,
        settings: Settings,
    ) -> Self {
        Self {
            relay: Arc::new(ConversationRelay::new(Arc::clone(&conversation_client))),
            conversation_client,
            session_guard,
            settings,
        }
    }
}

impl<C> Clone for AppState<C>
where
    C: ConversationClient,
{
    fn clone(&self) -> Self {
        Self {
            relay: Arc::clone(&self.relay),
            conversation_client: Arc::clone(&self.conversation_client),
            session_guard: Arc::clone(&self.session_guard),
            settings: self.settings.clone(),
        }
    }
}
