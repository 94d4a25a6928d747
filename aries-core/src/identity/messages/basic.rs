use rst_common::standard::chrono::Utc;
use rst_common::standard::serde::{self, Deserialize, Serialize};
use rst_common::standard::uuid::Uuid;

use super::decorators::ThreadDecorator;
use super::types::{AgentMessage, MessageType};

/// `BasicMessage` is a plain text message sent over an established connection
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(crate = "self::serde")]
pub struct BasicMessage {
    #[serde(rename = "@id")]
    id: String,

    content: String,
    sent_time: String,

    #[serde(rename = "~thread", skip_serializing_if = "Option::is_none", default)]
    thread: Option<ThreadDecorator>,
}

impl BasicMessage {
    pub fn new(content: String) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            content,
            sent_time: Utc::now().to_rfc3339(),
            thread: None,
        }
    }

    pub fn get_content(&self) -> String {
        self.content.to_owned()
    }

    pub fn get_sent_time(&self) -> String {
        self.sent_time.to_owned()
    }

    pub fn get_thread(&self) -> Option<&ThreadDecorator> {
        self.thread.as_ref()
    }
}

impl AgentMessage for BasicMessage {
    fn message_type(&self) -> MessageType {
        MessageType::BasicMessage
    }

    fn get_id(&self) -> String {
        self.id.to_owned()
    }
}
