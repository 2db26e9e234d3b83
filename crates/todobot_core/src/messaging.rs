use crate::error::AppError;
use crate::model::ChatId;
use std::sync::Mutex;

pub trait MessageSink {
    fn send(&self, chat: &ChatId, text: &str) -> Result<(), AppError>;
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SentMessage {
    pub chat: ChatId,
    pub text: String,
}

#[derive(Debug, Default)]
pub struct MemorySink {
    sent: Mutex<Vec<SentMessage>>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn messages(&self) -> Vec<SentMessage> {
        self.sent
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }

    pub fn texts_for(&self, chat: &ChatId) -> Vec<String> {
        self.messages()
            .into_iter()
            .filter(|message| &message.chat == chat)
            .map(|message| message.text)
            .collect()
    }
}

impl MessageSink for MemorySink {
    fn send(&self, chat: &ChatId, text: &str) -> Result<(), AppError> {
        self.sent
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .push(SentMessage {
                chat: chat.clone(),
                text: text.to_string(),
            });
        Ok(())
    }
}
