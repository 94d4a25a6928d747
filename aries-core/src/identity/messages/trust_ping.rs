use rst_common::standard::serde::{self, Deserialize, Serialize};
use rst_common::standard::uuid::Uuid;

use super::decorators::ThreadDecorator;
use super::types::{AgentMessage, MessageType};

/// `TrustPing` confirms the new channel is alive, it's threaded to the connection
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(crate = "self::serde")]
pub struct TrustPing {
    #[serde(rename = "@id")]
    id: String,

    #[serde(default)]
    response_requested: bool,

    #[serde(rename = "~thread", skip_serializing_if = "Option::is_none", default)]
    thread: Option<ThreadDecorator>,
}

impl TrustPing {
    pub fn new(thread: Option<ThreadDecorator>) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            response_requested: true,
            thread,
        }
    }

    pub fn is_response_requested(&self) -> bool {
        self.response_requested
    }

    pub fn get_thread(&self) -> Option<&ThreadDecorator> {
        self.thread.as_ref()
    }
}

impl AgentMessage for TrustPing {
    fn message_type(&self) -> MessageType {
        MessageType::TrustPing
    }

    fn get_id(&self) -> String {
        self.id.to_owned()
    }
}
