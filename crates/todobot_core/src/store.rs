use crate::datetime::parse_reminder_time;
use crate::error::AppError;
use crate::model::{ChatId, ListFilter, Reminder, Task, UserKey};
use crate::schedule::{ReminderJob, Scheduler};
use log::info;
use std::collections::HashMap;
use time::{OffsetDateTime, UtcOffset};

const REMINDER_SEPARATOR: &str = " at ";

/// Per-user task and reminder lists.
///
/// Positions passed to [`TodoStore::complete_task`] and
/// [`TodoStore::delete_task`] are 1-based over the full, unfiltered list.
#[derive(Debug)]
pub struct TodoStore {
    tasks: HashMap<UserKey, Vec<Task>>,
    reminders: HashMap<UserKey, Vec<Reminder>>,
    offset: UtcOffset,
}

impl TodoStore {
    pub fn new(offset: UtcOffset) -> Self {
        Self {
            tasks: HashMap::new(),
            reminders: HashMap::new(),
            offset,
        }
    }

    pub fn offset(&self) -> UtcOffset {
        self.offset
    }

    pub fn tasks(&self, user: &UserKey) -> &[Task] {
        self.tasks.get(user).map(Vec::as_slice).unwrap_or_default()
    }

    pub fn reminders(&self, user: &UserKey) -> &[Reminder] {
        self.reminders.get(user).map(Vec::as_slice).unwrap_or_default()
    }

    pub fn add_task(&mut self, user: &UserKey, description: &str) -> Result<&Task, AppError> {
        self.add_task_at(user, description, OffsetDateTime::now_utc())
    }

    fn add_task_at(
        &mut self,
        user: &UserKey,
        description: &str,
        now: OffsetDateTime,
    ) -> Result<&Task, AppError> {
        let trimmed = description.trim();
        if trimmed.is_empty() {
            return Err(AppError::invalid_input("task text is required"));
        }

        let tasks = self.tasks.entry(user.clone()).or_default();
        tasks.push(Task::new(trimmed, now));
        info!("user {user} added task #{}", tasks.len());

        tasks
            .last()
            .ok_or_else(|| AppError::invalid_data("task list empty after insert"))
    }

    pub fn list_tasks(&self, user: &UserKey, filter: ListFilter) -> Result<Vec<&Task>, AppError> {
        let tasks = self.tasks(user);
        if tasks.is_empty() {
            return Err(AppError::EmptyList);
        }

        let matching: Vec<&Task> = tasks.iter().filter(|task| filter.matches(task)).collect();
        if matching.is_empty() {
            return Err(AppError::NoMatches(filter));
        }

        Ok(matching)
    }

    pub fn complete_task(&mut self, user: &UserKey, position: usize) -> Result<&Task, AppError> {
        self.complete_task_at(user, position, OffsetDateTime::now_utc())
    }

    fn complete_task_at(
        &mut self,
        user: &UserKey,
        position: usize,
        now: OffsetDateTime,
    ) -> Result<&Task, AppError> {
        let tasks = self.tasks.get_mut(user).ok_or(AppError::InvalidIndex)?;
        let slot = slot_for(position, tasks.len())?;
        let task = &mut tasks[slot];

        if task.completed {
            return Err(AppError::AlreadyCompleted);
        }

        task.completed = true;
        task.completed_at = Some(now);
        info!("user {user} completed task #{position}");

        Ok(task)
    }

    pub fn delete_task(&mut self, user: &UserKey, position: usize) -> Result<Task, AppError> {
        let tasks = self.tasks.get_mut(user).ok_or(AppError::InvalidIndex)?;
        let slot = slot_for(position, tasks.len())?;
        let removed = tasks.remove(slot);
        info!("user {user} deleted task #{position}");

        Ok(removed)
    }

    pub fn set_reminder(
        &mut self,
        user: &UserKey,
        chat: &ChatId,
        raw: &str,
        scheduler: &dyn Scheduler,
    ) -> Result<&Reminder, AppError> {
        let (description, when) = split_reminder(raw)?;
        let fire_at = parse_reminder_time(when, self.offset)?;

        let job = ReminderJob::new(chat.clone(), description);
        let handle = scheduler.schedule_once(fire_at, job)?;
        info!("user {user} armed reminder {} for {fire_at}", handle.id());

        let reminders = self.reminders.entry(user.clone()).or_default();
        reminders.push(Reminder {
            description: description.to_string(),
            fire_at,
            handle,
        });

        reminders
            .last()
            .ok_or_else(|| AppError::invalid_data("reminder list empty after insert"))
    }
}

fn slot_for(position: usize, len: usize) -> Result<usize, AppError> {
    if position == 0 || position > len {
        return Err(AppError::InvalidIndex);
    }
    Ok(position - 1)
}

// Exactly one ` at `, with text on both sides.
fn split_reminder(raw: &str) -> Result<(&str, &str), AppError> {
    // ASCII lowering keeps byte offsets valid for `raw`.
    let lowered = raw.to_ascii_lowercase();
    let mut found = lowered.match_indices(REMINDER_SEPARATOR).map(|(index, _)| index);

    let index = found.next().ok_or(AppError::InvalidReminderFormat)?;
    if found.next().is_some() {
        return Err(AppError::InvalidReminderFormat);
    }

    let description = raw[..index].trim();
    let when = raw[index + REMINDER_SEPARATOR.len()..].trim();
    if description.is_empty() || when.is_empty() {
        return Err(AppError::InvalidReminderFormat);
    }

    Ok((description, when))
}

#[cfg(test)]
mod tests {
    use super::{TodoStore, split_reminder};
    use crate::messaging::MemorySink;
    use crate::model::{ChatId, ListFilter, Priority, UserKey};
    use crate::schedule::ManualScheduler;
    use time::macros::{datetime, offset};
    use time::{Duration, OffsetDateTime};

    fn store_with(user: &UserKey, descriptions: &[&str]) -> TodoStore {
        let mut store = TodoStore::new(offset!(UTC));
        for description in descriptions {
            store.add_task(user, description).unwrap();
        }
        store
    }

    fn descriptions(store: &TodoStore, user: &UserKey) -> Vec<String> {
        store
            .tasks(user)
            .iter()
            .map(|task| task.description.clone())
            .collect()
    }

    #[test]
    fn add_task_appends_pending_medium_task() {
        let user = UserKey::new("alice");
        let mut store = TodoStore::new(offset!(UTC));
        let now = datetime!(2025-01-02 10:00 UTC);

        let task = store.add_task_at(&user, "  buy milk ", now).unwrap();

        assert_eq!(task.description, "buy milk");
        assert_eq!(task.created_at, now);
        assert!(!task.completed);
        assert_eq!(task.completed_at, None);
        assert_eq!(task.priority, Priority::Medium);
        assert_eq!(store.tasks(&user).len(), 1);
    }

    #[test]
    fn add_task_rejects_blank_text() {
        let user = UserKey::new("alice");
        let mut store = TodoStore::new(offset!(UTC));

        let err = store.add_task(&user, "   ").unwrap_err();

        assert_eq!(err.code(), "invalid_input");
        assert!(store.tasks(&user).is_empty());
    }

    #[test]
    fn users_do_not_see_each_other() {
        let alice = UserKey::new("alice");
        let bob = UserKey::new("bob");
        let mut store = store_with(&alice, &["a1", "a2"]);
        store.add_task(&bob, "b1").unwrap();

        store.complete_task(&bob, 1).unwrap();
        store.delete_task(&alice, 2).unwrap();

        assert_eq!(descriptions(&store, &alice), vec!["a1"]);
        assert!(!store.tasks(&alice)[0].completed);
        assert_eq!(descriptions(&store, &bob), vec!["b1"]);
        assert!(store.tasks(&bob)[0].completed);
        assert_eq!(
            store.complete_task(&alice, 2).unwrap_err().code(),
            "invalid_index"
        );
    }

    #[test]
    fn delete_shifts_later_positions_down() {
        let user = UserKey::new("alice");
        let mut store = store_with(&user, &["one", "two", "three", "four", "five"]);

        let removed = store.delete_task(&user, 3).unwrap();

        assert_eq!(removed.description, "three");
        assert_eq!(descriptions(&store, &user), vec!["one", "two", "four", "five"]);

        let removed = store.delete_task(&user, 3).unwrap();
        assert_eq!(removed.description, "four");
    }

    #[test]
    fn delete_rejects_out_of_range_positions() {
        let user = UserKey::new("alice");
        let mut store = store_with(&user, &["one"]);

        for position in [0, 2, 99] {
            let err = store.delete_task(&user, position).unwrap_err();
            assert_eq!(err.code(), "invalid_index");
        }
        assert_eq!(store.tasks(&user).len(), 1);
    }

    #[test]
    fn complete_twice_keeps_first_timestamp() {
        let user = UserKey::new("alice");
        let mut store = store_with(&user, &["buy milk"]);
        let first = datetime!(2025-01-02 10:00 UTC);

        store.complete_task_at(&user, 1, first).unwrap();
        let err = store
            .complete_task_at(&user, 1, first + Duration::hours(1))
            .unwrap_err();

        assert_eq!(err.code(), "already_completed");
        assert_eq!(store.tasks(&user)[0].completed_at, Some(first));
    }

    #[test]
    fn complete_on_empty_list_is_invalid_index() {
        let mut store = TodoStore::new(offset!(UTC));
        let err = store.complete_task(&UserKey::new("nobody"), 99).unwrap_err();
        assert_eq!(err.code(), "invalid_index");
    }

    #[test]
    fn filters_partition_the_list() {
        let user = UserKey::new("alice");
        let mut store = store_with(&user, &["a", "b", "c", "d"]);
        store.complete_task(&user, 2).unwrap();
        store.complete_task(&user, 4).unwrap();

        let all = store.list_tasks(&user, ListFilter::All).unwrap().len();
        let done = store.list_tasks(&user, ListFilter::Completed).unwrap();
        let pending = store.list_tasks(&user, ListFilter::Pending).unwrap();

        assert_eq!(all, done.len() + pending.len());
        assert_eq!(done[0].description, "b");
        assert_eq!(pending[1].description, "c");
    }

    #[test]
    fn list_distinguishes_empty_from_no_matches() {
        let user = UserKey::new("alice");
        let mut store = TodoStore::new(offset!(UTC));

        assert_eq!(
            store.list_tasks(&user, ListFilter::Completed).unwrap_err(),
            crate::error::AppError::EmptyList
        );

        store.add_task(&user, "pending only").unwrap();

        assert_eq!(
            store.list_tasks(&user, ListFilter::Completed).unwrap_err(),
            crate::error::AppError::NoMatches(ListFilter::Completed)
        );
        assert_eq!(store.list_tasks(&user, ListFilter::Pending).unwrap().len(), 1);
    }

    #[test]
    fn split_reminder_requires_exactly_one_separator() {
        assert_eq!(
            split_reminder("buy milk at 2025-01-02 10:00").unwrap(),
            ("buy milk", "2025-01-02 10:00")
        );
        assert_eq!(
            split_reminder("Call Mom AT 5/1/2025 9:00").unwrap(),
            ("Call Mom", "5/1/2025 9:00")
        );

        for raw in ["buy milk", "meet at cafe at 10:00", " at 10:00", "buy milk at  "] {
            let err = split_reminder(raw).unwrap_err();
            assert_eq!(err.code(), "invalid_reminder_format", "raw: {raw:?}");
        }
    }

    #[test]
    fn set_reminder_records_and_arms_without_touching_tasks() {
        let user = UserKey::new("alice");
        let chat = ChatId::new("alice-chat");
        let mut store = store_with(&user, &["existing"]);
        let scheduler = ManualScheduler::new();
        let sink = MemorySink::new();

        let reminder = store
            .set_reminder(&user, &chat, "buy milk at 2030-05-01 08:00", &scheduler)
            .unwrap();
        assert_eq!(reminder.description, "buy milk");
        assert_eq!(reminder.fire_at, datetime!(2030-05-01 8:00 UTC));
        assert!(!reminder.has_fired());

        assert_eq!(scheduler.fire_all(&sink), 1);

        assert_eq!(sink.texts_for(&chat), vec!["⏰ Reminder: buy milk"]);
        assert_eq!(descriptions(&store, &user), vec!["existing"]);
        assert_eq!(store.reminders(&user).len(), 1);
        assert!(store.reminders(&user)[0].has_fired());
    }

    #[test]
    fn set_reminder_rejections_record_nothing() {
        let user = UserKey::new("alice");
        let chat = ChatId::new("alice-chat");
        let mut store = TodoStore::new(offset!(UTC));
        let scheduler = ManualScheduler::new();

        let err = store
            .set_reminder(&user, &chat, "standup at not-a-date", &scheduler)
            .unwrap_err();
        assert_eq!(err.code(), "invalid_datetime");

        let err = store
            .set_reminder(&user, &chat, "standup tomorrow", &scheduler)
            .unwrap_err();
        assert_eq!(err.code(), "invalid_reminder_format");

        assert!(store.reminders(&user).is_empty());
        assert_eq!(scheduler.pending(), 0);
    }

    #[test]
    fn past_reminder_is_still_armed() {
        let user = UserKey::new("alice");
        let chat = ChatId::new("alice-chat");
        let mut store = TodoStore::new(offset!(UTC));
        let scheduler = ManualScheduler::new();

        store
            .set_reminder(&user, &chat, "old news at 2001-01-01 00:00", &scheduler)
            .unwrap();

        let sink = MemorySink::new();
        assert_eq!(scheduler.fire_due(OffsetDateTime::now_utc(), &sink), 1);
    }

    #[test]
    fn task_serializes_with_priority() {
        let user = UserKey::new("alice");
        let mut store = store_with(&user, &["buy milk"]);
        store.complete_task(&user, 1).unwrap();
        let task = store.tasks(&user)[0].clone();

        let json = serde_json::to_value(&task).unwrap();
        assert_eq!(json["priority"], "medium");
        assert!(json["completed_at"].is_string());

        let restored: crate::model::Task = serde_json::from_value(json).unwrap();
        assert_eq!(restored, task);
    }
}
