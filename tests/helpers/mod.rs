#![allow(dead_code)]

use std::collections::VecDeque;
use std::net::SocketAddr;
use std::sync::Arc;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};

use axum::Router;
use bytes::Bytes;
use chrono::{TimeZone, Utc};
use futures::stream::{self, StreamExt};
use tokio::net::TcpListener;

use acacia_edge::application::ports::{
    ChatTransport, ChatTransportError, ConversationClient, ConversationClientError, FrameStream,
    IdentityClient, IdentityClientError, SessionRefresh, UpstreamStream,
};
use acacia_edge::application::services::SessionGuard;
use acacia_edge::domain::{
    Conversation, ConversationId, ConversationWithMessages, Credentials, Message, MessageId,
    MessageRole, NewConversation, SendMessage,
};
use acacia_edge::infrastructure::codec::decode_frames;
use acacia_edge::presentation::config::{
    BackendSettings, LoggingSettings, ServerSettings, SessionSettings, Settings,
};
use acacia_edge::presentation::{AppState, create_router};

pub fn test_settings() -> Settings {
    Settings {
        server: ServerSettings {
            host: "127.0.0.1".to_string(),
            port: 0,
        },
        backend: BackendSettings {
            base_url: "http://127.0.0.1:9".to_string(),
            identity_path: "/users/auth/me".to_string(),
            identity_timeout_ms: 2_000,
            connect_timeout_ms: 1_000,
        },
        session: SessionSettings {
            protected_paths: vec![
                "/projects".to_string(),
                "/teams".to_string(),
                "/api/chat/conversations".to_string(),
            ],
            login_path: "/login".to_string(),
        },
        logging: LoggingSettings {
            level: "info".to_string(),
            json: false,
        },
    }
}

pub fn sample_conversation(id: i64) -> Conversation {
    let at = Utc.with_ymd_and_hms(2025, 1, 2, 3, 4, 5).unwrap();
    Conversation {
        id: ConversationId::new(id),
        user_id: 7,
        title: "How do I move an issue...".to_string(),
        provider: "openai".to_string(),
        model: "gpt-4o-mini".to_string(),
        created_at: at,
        updated_at: at,
    }
}

pub fn sample_history(id: i64) -> ConversationWithMessages {
    let at = Utc.with_ymd_and_hms(2025, 1, 2, 3, 4, 6).unwrap();
    ConversationWithMessages {
        conversation: sample_conversation(id),
        messages: vec![
            Message {
                id: MessageId::new(1),
                conversation_id: ConversationId::new(id),
                role: MessageRole::User,
                content: "How do I move an issue?".to_string(),
                sequence_number: 1,
                created_at: at,
            },
            Message {
                id: MessageId::new(2),
                conversation_id: ConversationId::new(id),
                role: MessageRole::Assistant,
                content: "Drag it to another column.".to_string(),
                sequence_number: 2,
                created_at: at,
            },
        ],
    }
}

/// What the mock backend answers to a send-message call.
pub enum SendBehavior {
    Chunks(Vec<&'static str>),
    ChunksThenError(Vec<&'static str>),
    Fail(fn() -> ConversationClientError),
}

pub struct MockConversationClient {
    pub send_behavior: SendBehavior,
    pub send_set_cookies: Vec<String>,
    pub latest: Option<ConversationWithMessages>,
    pub seen_credentials: Mutex<Vec<Credentials>>,
    pub seen_messages: Mutex<Vec<SendMessage>>,
    pub created: Mutex<Vec<NewConversation>>,
}

impl MockConversationClient {
    pub fn streaming(chunks: Vec<&'static str>) -> Self {
        Self::with_behavior(SendBehavior::Chunks(chunks))
    }

    pub fn with_behavior(send_behavior: SendBehavior) -> Self {
        Self {
            send_behavior,
            send_set_cookies: Vec::new(),
            latest: None,
            seen_credentials: Mutex::new(Vec::new()),
            seen_messages: Mutex::new(Vec::new()),
            created: Mutex::new(Vec::new()),
        }
    }

    pub fn last_credentials(&self) -> Option<Credentials> {
        self.seen_credentials.lock().unwrap().last().cloned()
    }
}

#[async_trait::async_trait]
impl ConversationClient for MockConversationClient {
    async fn create_conversation(
        &self,
        credentials: &Credentials,
        request: &NewConversation,
    ) -> Result<Conversation, ConversationClientError> {
        self.seen_credentials
            .lock()
            .unwrap()
            .push(credentials.clone());
        self.created.lock().unwrap().push(request.clone());
        Ok(sample_conversation(42))
    }

    async fn latest_conversation(
        &self,
        credentials: &Credentials,
    ) -> Result<Option<ConversationWithMessages>, ConversationClientError> {
        self.seen_credentials
            .lock()
            .unwrap()
            .push(credentials.clone());
        Ok(self.latest.clone())
    }

    async fn send_message(
        &self,
        credentials: &Credentials,
        message: &SendMessage,
    ) -> Result<UpstreamStream, ConversationClientError> {
        self.seen_credentials
            .lock()
            .unwrap()
            .push(credentials.clone());
        self.seen_messages.lock().unwrap().push(message.clone());

        let items: Vec<Result<Bytes, ConversationClientError>> = match &self.send_behavior {
            SendBehavior::Fail(make_error) => return Err(make_error()),
            SendBehavior::Chunks(chunks) => chunks
                .iter()
                .map(|c| Ok(Bytes::from_static(c.as_bytes())))
                .collect(),
            SendBehavior::ChunksThenError(chunks) => chunks
                .iter()
                .map(|c| Ok(Bytes::from_static(c.as_bytes())))
                .chain(std::iter::once(Err(ConversationClientError::Transport(
                    "connection reset".to_string(),
                ))))
                .collect(),
        };

        Ok(UpstreamStream {
            set_cookies: self.send_set_cookies.clone(),
            body: Box::pin(stream::iter(items)),
        })
    }
}

pub enum IdentityBehavior {
    Accept(Vec<&'static str>),
    Reject,
    Fail,
}

pub struct MockIdentityClient {
    pub behavior: IdentityBehavior,
    pub calls: AtomicUsize,
    pub seen_tokens: Mutex<Vec<String>>,
}

impl MockIdentityClient {
    pub fn new(behavior: IdentityBehavior) -> Self {
        Self {
            behavior,
            calls: AtomicUsize::new(0),
            seen_tokens: Mutex::new(Vec::new()),
        }
    }

    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait::async_trait]
impl IdentityClient for MockIdentityClient {
    async fn refresh_session(
        &self,
        refresh_token: &str,
    ) -> Result<SessionRefresh, IdentityClientError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.seen_tokens
            .lock()
            .unwrap()
            .push(refresh_token.to_string());
        match &self.behavior {
            IdentityBehavior::Accept(cookies) => Ok(SessionRefresh::Accepted {
                set_cookies: cookies.iter().map(|c| c.to_string()).collect(),
            }),
            IdentityBehavior::Reject => Ok(SessionRefresh::Rejected),
            IdentityBehavior::Fail => Err(IdentityClientError::Transport(
                "connection refused".to_string(),
            )),
        }
    }
}

pub fn create_test_app(
    client: Arc<MockConversationClient>,
    identity: Arc<MockIdentityClient>,
) -> Router {
    let guard = Arc::new(SessionGuard::new(identity));
    create_router(AppState::new(client, guard, test_settings()))
}

/// Serves `router` on an ephemeral loopback port.
pub async fn spawn_server(router: Router) -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });
    addr
}

/// One scripted answer of the relay for `ScriptedTransport::open_stream`.
pub enum StreamScript {
    Bytes(Vec<&'static str>),
    BytesThenDisconnect(Vec<&'static str>),
    OpenFails(&'static str),
    Pending,
}

pub struct ScriptedTransport {
    pub create_fails: bool,
    pub latest: Option<ConversationWithMessages>,
    pub scripts: Mutex<VecDeque<StreamScript>>,
    pub opened: Mutex<Vec<(ConversationId, String)>>,
    pub created: Mutex<Vec<NewConversation>>,
}

impl ScriptedTransport {
    pub fn new(scripts: Vec<StreamScript>) -> Self {
        Self {
            create_fails: false,
            latest: None,
            scripts: Mutex::new(scripts.into()),
            opened: Mutex::new(Vec::new()),
            created: Mutex::new(Vec::new()),
        }
    }
}

#[async_trait::async_trait]
impl ChatTransport for ScriptedTransport {
    async fn create_conversation(
        &self,
        request: &NewConversation,
    ) -> Result<Conversation, ChatTransportError> {
        self.created.lock().unwrap().push(request.clone());
        if self.create_fails {
            return Err(ChatTransportError::Rejected(
                "Failed to create conversation. Cannot find project's team".to_string(),
            ));
        }
        Ok(sample_conversation(42))
    }

    async fn latest_conversation(
        &self,
    ) -> Result<Option<ConversationWithMessages>, ChatTransportError> {
        Ok(self.latest.clone())
    }

    async fn open_stream(
        &self,
        conversation_id: ConversationId,
        content: &str,
    ) -> Result<FrameStream, ChatTransportError> {
        self.opened
            .lock()
            .unwrap()
            .push((conversation_id, content.to_string()));

        let script = self
            .scripts
            .lock()
            .unwrap()
            .pop_front()
            .expect("no stream scripted");

        match script {
            StreamScript::Bytes(chunks) => Ok(decode_frames(stream::iter(
                chunks
                    .into_iter()
                    .map(|c| Ok::<_, std::io::Error>(Bytes::from_static(c.as_bytes()))),
            ))),
            StreamScript::BytesThenDisconnect(chunks) => Ok(decode_frames(stream::iter(
                chunks
                    .into_iter()
                    .map(|c| Ok(Bytes::from_static(c.as_bytes())))
                    .chain(std::iter::once(Err(std::io::Error::new(
                        std::io::ErrorKind::ConnectionReset,
                        "connection reset by peer",
                    )))),
            ))),
            StreamScript::OpenFails(message) => {
                Err(ChatTransportError::RequestFailed(message.to_string()))
            }
            StreamScript::Pending => Ok(decode_frames(
                stream::iter(vec![Ok::<_, std::io::Error>(Bytes::from_static(
                    b"data: partial\n\n",
                ))])
                .chain(stream::pending()),
            )),
        }
    }
}
