use crate::error::AppError;
use crate::messaging::MessageSink;
use crate::schedule::{ReminderJob, ScheduleHandle, Scheduler};
use log::{debug, warn};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};
use time::OffsetDateTime;
use tokio::runtime::Handle;
use tokio::task::JoinHandle;

struct PendingTimer {
    fire_at: OffsetDateTime,
    task: JoinHandle<()>,
}

pub struct TokioScheduler {
    runtime: Handle,
    sink: Arc<dyn MessageSink + Send + Sync>,
    next_id: AtomicU64,
    pending: Mutex<Vec<PendingTimer>>,
}

impl TokioScheduler {
    pub fn new(runtime: Handle, sink: Arc<dyn MessageSink + Send + Sync>) -> Self {
        Self {
            runtime,
            sink,
            next_id: AtomicU64::new(1),
            pending: Mutex::new(Vec::new()),
        }
    }

    pub fn pending(&self) -> usize {
        let mut pending = self.lock_pending();
        prune_finished(&mut pending);
        pending.len()
    }

    pub async fn wait_for_due(&self) {
        let now = OffsetDateTime::now_utc();
        let due: Vec<PendingTimer> = {
            let mut pending = self.lock_pending();
            let (due, later): (Vec<_>, Vec<_>) =
                pending.drain(..).partition(|timer| timer.fire_at <= now);
            *pending = later;
            due
        };
        join_timers(due).await;
    }

    pub async fn wait_all(&self) {
        let all: Vec<PendingTimer> = self.lock_pending().drain(..).collect();
        join_timers(all).await;
    }

    fn lock_pending(&self) -> MutexGuard<'_, Vec<PendingTimer>> {
        self.pending
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl Scheduler for TokioScheduler {
    fn schedule_once(
        &self,
        at: OffsetDateTime,
        job: ReminderJob,
    ) -> Result<ScheduleHandle, AppError> {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let handle = ScheduleHandle::new(id);
        let delay = delay_until(at, OffsetDateTime::now_utc());
        let sink = Arc::clone(&self.sink);
        let fired = handle.clone();

        let task = self.runtime.spawn(async move {
            tokio::time::sleep(delay).await;
            job.run(sink.as_ref());
            fired.mark_fired();
        });

        debug!("armed reminder timer {id} for {at} ({delay:?} from now)");
        let handle = handle.with_abort(task.abort_handle());

        let mut pending = self.lock_pending();
        prune_finished(&mut pending);
        pending.push(PendingTimer { fire_at: at, task });

        Ok(handle)
    }
}

fn prune_finished(pending: &mut Vec<PendingTimer>) {
    pending.retain(|timer| !timer.task.is_finished());
}

async fn join_timers(timers: Vec<PendingTimer>) {
    for timer in timers {
        match timer.task.await {
            Ok(()) => {}
            Err(err) if err.is_cancelled() => {
                debug!("reminder timer for {} was cancelled", timer.fire_at)
            }
            Err(_) => warn!("reminder timer for {} panicked", timer.fire_at),
        }
    }
}

fn delay_until(at: OffsetDateTime, now: OffsetDateTime) -> std::time::Duration {
    let remaining = at - now;
    if remaining.is_positive() {
        remaining.unsigned_abs()
    } else {
        std::time::Duration::ZERO
    }
}
