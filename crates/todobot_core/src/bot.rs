use crate::config::Config;
use crate::datetime::{format_timestamp, resolve_offset};
use crate::error::AppError;
use crate::messaging::MessageSink;
use crate::model::{ChatId, ListFilter, Task, UserKey};
use crate::router::{Command, CommandParser, DEFAULT_PREFIX};
use crate::schedule::Scheduler;
use crate::store::TodoStore;
use log::{debug, warn};
use std::sync::Arc;
use time::UtcOffset;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BotSettings {
    pub prefix: String,
    pub preserve_case: bool,
    pub offset: UtcOffset,
}

impl BotSettings {
    pub fn from_config(config: &Config) -> Result<Self, AppError> {
        Ok(Self {
            prefix: config.command_prefix.clone(),
            preserve_case: config.preserve_case,
            offset: resolve_offset(config.utc_offset.as_deref())?,
        })
    }
}

impl Default for BotSettings {
    fn default() -> Self {
        Self {
            prefix: DEFAULT_PREFIX.to_string(),
            preserve_case: false,
            offset: UtcOffset::UTC,
        }
    }
}

pub struct TodoBot<S: Scheduler> {
    parser: CommandParser,
    store: TodoStore,
    scheduler: S,
    sink: Arc<dyn MessageSink + Send + Sync>,
}

impl<S: Scheduler> TodoBot<S> {
    pub fn new(
        settings: BotSettings,
        scheduler: S,
        sink: Arc<dyn MessageSink + Send + Sync>,
    ) -> Self {
        Self {
            parser: CommandParser::new(settings.prefix, settings.preserve_case),
            store: TodoStore::new(settings.offset),
            scheduler,
            sink,
        }
    }

    pub fn store(&self) -> &TodoStore {
        &self.store
    }

    pub fn scheduler(&self) -> &S {
        &self.scheduler
    }

    // Unrecognized text returns None and sends nothing.
    pub fn handle_message(
        &mut self,
        user: &UserKey,
        chat: &ChatId,
        text: &str,
    ) -> Option<String> {
        let Some(command) = self.parser.parse(text) else {
            debug!("ignoring message from {user}");
            return None;
        };

        debug!("user {user} in chat {chat}: {command:?}");
        let reply = self.execute(user, chat, command);

        if let Err(err) = self.sink.send(chat, &reply) {
            warn!("reply to chat {chat} not delivered: {err}");
        }

        Some(reply)
    }

    pub fn execute(&mut self, user: &UserKey, chat: &ChatId, command: Command) -> String {
        let offset = self.store.offset();

        let outcome = match command {
            Command::Add(text) => self
                .store
                .add_task(user, &text)
                .map(|task| format!("TODO added: {}", task.description)),
            Command::List(filter) => self
                .store
                .list_tasks(user, filter)
                .map(|tasks| render_list(filter, &tasks, offset)),
            Command::Complete(Some(position)) => self
                .store
                .complete_task(user, position)
                .map(|task| format!("Completed TODO: {}", task.description)),
            Command::Delete(Some(position)) => self
                .store
                .delete_task(user, position)
                .map(|task| format!("Deleted TODO: {}", task.description)),
            Command::Complete(None) | Command::Delete(None) => Err(AppError::InvalidIndex),
            Command::Remind(raw) => self
                .store
                .set_reminder(user, chat, &raw, &self.scheduler)
                .map(|reminder| {
                    format!(
                        "Reminder set for {} at {}",
                        reminder.description,
                        format_timestamp(reminder.fire_at, offset)
                    )
                }),
            Command::Help => Ok(help_text(self.parser.prefix())),
        };

        outcome.unwrap_or_else(|err| {
            debug!("user {user}: {err}");
            err.reply(self.parser.prefix())
        })
    }
}

fn render_list(filter: ListFilter, tasks: &[&Task], offset: UtcOffset) -> String {
    let header = match filter {
        ListFilter::All => "Your TODOs:",
        ListFilter::Completed => "Completed TODOs:",
        ListFilter::Pending => "Pending TODOs:",
    };

    let mut lines = Vec::with_capacity(tasks.len() + 1);
    lines.push(header.to_string());
    for (index, task) in tasks.iter().enumerate() {
        let number = index + 1;
        match task.completed_at.filter(|_| task.completed) {
            Some(completed_at) => lines.push(format!(
                "{number}. ✅ {} (Completed on: {})",
                task.description,
                format_timestamp(completed_at, offset)
            )),
            None if task.completed => lines.push(format!("{number}. ✅ {}", task.description)),
            None => lines.push(format!("{number}. ❌ {}", task.description)),
        }
    }

    lines.join("\n")
}

pub fn help_text(prefix: &str) -> String {
    format!(
        "TODO Bot Commands:
• {prefix} add [task] - Add a new TODO
• {prefix} list - List all TODOs
• {prefix} list done - List completed TODOs
• {prefix} list pending - List pending TODOs
• {prefix} complete [index] - Mark a TODO as completed
• {prefix} delete [index] - Delete a TODO by its index
• {prefix} remind [task] at [time/date] - Set a reminder
• {prefix} help - Show this help message

Reminder Format Examples:
• {prefix} remind Buy groceries at 2024-03-27 18:30
• {prefix} remind Team meeting at \"March 28, 2024 09:00\""
    )
}
