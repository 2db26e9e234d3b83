use crate::model::ListFilter;
use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AppError {
    InvalidIndex,
    AlreadyCompleted,
    EmptyList,
    NoMatches(ListFilter),
    InvalidReminderFormat,
    InvalidDateTime(String),
    InvalidInput(String),
    InvalidData(String),
    Io(String),
}

impl AppError {
    pub fn invalid_input<M: Into<String>>(message: M) -> Self {
        Self::InvalidInput(message.into())
    }

    pub fn invalid_data<M: Into<String>>(message: M) -> Self {
        Self::InvalidData(message.into())
    }

    pub fn invalid_datetime<M: Into<String>>(message: M) -> Self {
        Self::InvalidDateTime(message.into())
    }

    pub fn io<M: Into<String>>(message: M) -> Self {
        Self::Io(message.into())
    }

    pub fn code(&self) -> &'static str {
        match self {
            Self::InvalidIndex => "invalid_index",
            Self::AlreadyCompleted => "already_completed",
            Self::EmptyList => "empty_list",
            Self::NoMatches(_) => "no_matches",
            Self::InvalidReminderFormat => "invalid_reminder_format",
            Self::InvalidDateTime(_) => "invalid_datetime",
            Self::InvalidInput(_) => "invalid_input",
            Self::InvalidData(_) => "invalid_data",
            Self::Io(_) => "io_error",
        }
    }

    pub fn message(&self) -> &str {
        match self {
            Self::InvalidIndex => "task position out of range",
            Self::AlreadyCompleted => "task already completed",
            Self::EmptyList => "no tasks recorded",
            Self::NoMatches(ListFilter::Completed) => "no completed tasks",
            Self::NoMatches(ListFilter::Pending) => "no pending tasks",
            Self::NoMatches(ListFilter::All) => "no tasks",
            Self::InvalidReminderFormat => "reminder must look like '<task> at <time>'",
            Self::InvalidDateTime(message) => message,
            Self::InvalidInput(message) => message,
            Self::InvalidData(message) => message,
            Self::Io(message) => message,
        }
    }

    pub fn reply(&self, prefix: &str) -> String {
        match self {
            Self::InvalidIndex => {
                format!("Invalid TODO index. Use {prefix} list to see your TODOs.")
            }
            Self::AlreadyCompleted => "This TODO is already completed.".to_string(),
            Self::EmptyList => {
                format!("No TODOs found. Use {prefix} add [task] to create a new todo.")
            }
            Self::NoMatches(ListFilter::Completed) => "No completed TODOs found.".to_string(),
            Self::NoMatches(ListFilter::Pending) => "No pending TODOs found.".to_string(),
            Self::NoMatches(ListFilter::All) => "No TODOs found.".to_string(),
            Self::InvalidReminderFormat => {
                format!("Invalid reminder format. Use: {prefix} remind [task] at [time/date]")
            }
            Self::InvalidDateTime(_) => {
                "Invalid date/time format. Use a valid date and time.".to_string()
            }
            Self::InvalidInput(message) => format!("Invalid input: {message}."),
            Self::InvalidData(_) | Self::Io(_) => {
                "Sorry, something went wrong handling that command.".to_string()
            }
        }
    }
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} - {}", self.code(), self.message())
    }
}

impl std::error::Error for AppError {}
