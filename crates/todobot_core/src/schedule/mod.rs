use crate::error::AppError;
use crate::messaging::MessageSink;
use crate::model::ChatId;
use log::{info, warn};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use time::OffsetDateTime;
use tokio::task::AbortHandle;

mod manual;
mod runtime;

pub use manual::ManualScheduler;
pub use runtime::TokioScheduler;

// Implementations run `job` once, at or after `at`; past instants fire right away.
pub trait Scheduler {
    fn schedule_once(&self, at: OffsetDateTime, job: ReminderJob)
    -> Result<ScheduleHandle, AppError>;
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReminderJob {
    pub chat: ChatId,
    pub description: String,
}

impl ReminderJob {
    pub fn new<D: Into<String>>(chat: ChatId, description: D) -> Self {
        Self {
            chat,
            description: description.into(),
        }
    }

    pub fn text(&self) -> String {
        format!("⏰ Reminder: {}", self.description)
    }

    pub fn run(&self, sink: &dyn MessageSink) {
        match sink.send(&self.chat, &self.text()) {
            Ok(()) => info!("reminder delivered to chat {}", self.chat),
            Err(err) => warn!("reminder for chat {} not delivered: {err}", self.chat),
        }
    }
}

#[derive(Debug, Clone)]
pub struct ScheduleHandle {
    id: u64,
    fired: Arc<AtomicBool>,
    cancelled: Arc<AtomicBool>,
    abort: Option<Arc<AbortHandle>>,
}

impl ScheduleHandle {
    pub(crate) fn new(id: u64) -> Self {
        Self {
            id,
            fired: Arc::new(AtomicBool::new(false)),
            cancelled: Arc::new(AtomicBool::new(false)),
            abort: None,
        }
    }

    pub(crate) fn with_abort(mut self, abort: AbortHandle) -> Self {
        self.abort = Some(Arc::new(abort));
        self
    }

    pub fn id(&self) -> u64 {
        self.id
    }

    pub fn is_fired(&self) -> bool {
        self.fired.load(Ordering::SeqCst)
    }

    /// Stops a timer that has not fired yet. Returns `false` when there was
    /// nothing left to stop.
    pub fn cancel(&self) -> bool {
        let Some(abort) = self.abort.as_ref() else {
            return false;
        };
        if self.is_fired() || self.cancelled.swap(true, Ordering::SeqCst) {
            return false;
        }
        abort.abort();
        true
    }

    pub(crate) fn mark_fired(&self) {
        self.fired.store(true, Ordering::SeqCst);
    }
}

#[cfg(test)]
mod tests {
    use super::{ReminderJob, ScheduleHandle};
    use crate::messaging::MemorySink;
    use crate::model::ChatId;

    #[test]
    fn reminder_job_sends_to_captured_chat() {
        let sink = MemorySink::new();
        let chat = ChatId::new("family");
        let job = ReminderJob::new(chat.clone(), "buy milk");

        job.run(&sink);

        assert_eq!(sink.texts_for(&chat), vec!["⏰ Reminder: buy milk"]);
    }

    #[test]
    fn handle_clones_share_fired_state() {
        let handle = ScheduleHandle::new(7);
        let copy = handle.clone();
        assert!(!copy.is_fired());

        handle.mark_fired();

        assert!(copy.is_fired());
        assert_eq!(copy.id(), 7);
    }
}
