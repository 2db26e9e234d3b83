use crate::schedule::ScheduleHandle;
use time::OffsetDateTime;

#[derive(Debug, Clone)]
pub struct Reminder {
    pub description: String,
    pub fire_at: OffsetDateTime,
    pub handle: ScheduleHandle,
}

impl Reminder {
    pub fn has_fired(&self) -> bool {
        self.handle.is_fired()
    }
}
