use crate::error::AppError;
use crate::messaging::MessageSink;
use crate::schedule::{ReminderJob, ScheduleHandle, Scheduler};
use std::sync::Mutex;
use std::sync::atomic::{AtomicU64, Ordering};
use time::OffsetDateTime;

struct QueuedJob {
    fire_at: OffsetDateTime,
    job: ReminderJob,
    handle: ScheduleHandle,
}

#[derive(Default)]
pub struct ManualScheduler {
    next_id: AtomicU64,
    queued: Mutex<Vec<QueuedJob>>,
}

impl ManualScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn pending(&self) -> usize {
        self.lock_queue().len()
    }

    pub fn fire_due(&self, now: OffsetDateTime, sink: &dyn MessageSink) -> usize {
        let due: Vec<QueuedJob> = {
            let mut queue = self.lock_queue();
            let (due, later): (Vec<_>, Vec<_>) =
                queue.drain(..).partition(|queued| queued.fire_at <= now);
            *queue = later;
            due
        };
        run_jobs(due, sink)
    }

    pub fn fire_all(&self, sink: &dyn MessageSink) -> usize {
        let all: Vec<QueuedJob> = self.lock_queue().drain(..).collect();
        run_jobs(all, sink)
    }

    fn lock_queue(&self) -> std::sync::MutexGuard<'_, Vec<QueuedJob>> {
        self.queued
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl Scheduler for ManualScheduler {
    fn schedule_once(
        &self,
        at: OffsetDateTime,
        job: ReminderJob,
    ) -> Result<ScheduleHandle, AppError> {
        let handle = ScheduleHandle::new(self.next_id.fetch_add(1, Ordering::Relaxed) + 1);
        self.lock_queue().push(QueuedJob {
            fire_at: at,
            job,
            handle: handle.clone(),
        });
        Ok(handle)
    }
}

fn run_jobs(jobs: Vec<QueuedJob>, sink: &dyn MessageSink) -> usize {
    let count = jobs.len();
    for queued in jobs {
        queued.job.run(sink);
        queued.handle.mark_fired();
    }
    count
}
