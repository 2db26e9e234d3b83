use std::io::{self, Write};
use todobot_core::error::AppError;
use todobot_core::messaging::MessageSink;
use todobot_core::model::{ChatId, UserKey};

/// Prints every outbound message to stdout.
#[derive(Debug, Default)]
pub struct ConsoleSink;

impl MessageSink for ConsoleSink {
    fn send(&self, _chat: &ChatId, text: &str) -> Result<(), AppError> {
        let mut stdout = io::stdout().lock();
        writeln!(stdout, "{text}")
            .and_then(|_| stdout.flush())
            .map_err(|err| AppError::io(err.to_string()))
    }
}

/// Sender and chat of one console line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Inbound<'a> {
    pub user: UserKey,
    pub chat: ChatId,
    pub text: &'a str,
}

/// Splits an `@name text` line into its sender; other lines come from the
/// defaults.
pub fn route_line<'a>(line: &'a str, default_user: &str, default_chat: &str) -> Inbound<'a> {
    if let Some(rest) = line.strip_prefix('@') {
        let (name, text) = match rest.find(char::is_whitespace) {
            Some(index) => (&rest[..index], rest[index..].trim_start()),
            None => (rest, ""),
        };
        if !name.is_empty() {
            return Inbound {
                user: UserKey::new(name),
                chat: ChatId::new(name),
                text,
            };
        }
    }

    Inbound {
        user: UserKey::new(default_user),
        chat: ChatId::new(default_chat),
        text: line,
    }
}
