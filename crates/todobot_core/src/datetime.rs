use crate::error::AppError;
use time::format_description::BorrowedFormatItem;
use time::format_description::well_known::Rfc3339;
use time::macros::format_description;
use time::{Date, OffsetDateTime, PrimitiveDateTime, Time, UtcOffset};

const DATE_TIME_LAYOUTS: &[&[BorrowedFormatItem<'static>]] = &[
    format_description!("[year]-[month padding:none]-[day padding:none] [hour padding:none]:[minute]"),
    format_description!(
        "[year]-[month padding:none]-[day padding:none] [hour padding:none]:[minute]:[second]"
    ),
    format_description!("[year]-[month padding:none]-[day padding:none]T[hour padding:none]:[minute]"),
    format_description!(
        "[year]-[month padding:none]-[day padding:none]T[hour padding:none]:[minute]:[second]"
    ),
    format_description!("[year]/[month padding:none]/[day padding:none] [hour padding:none]:[minute]"),
    format_description!(
        "[year]/[month padding:none]/[day padding:none] [hour padding:none]:[minute]:[second]"
    ),
    format_description!("[month padding:none]/[day padding:none]/[year] [hour padding:none]:[minute]"),
    format_description!(
        "[month padding:none]/[day padding:none]/[year] [hour padding:none]:[minute]:[second]"
    ),
    format_description!(
        "[month padding:none]/[day padding:none]/[year], [hour repr:12 padding:none]:[minute]:[second] [period]"
    ),
    format_description!(
        "[month padding:none]/[day padding:none]/[year] [hour repr:12 padding:none]:[minute] [period]"
    ),
    format_description!(
        "[month repr:long case_sensitive:false] [day padding:none], [year] [hour padding:none]:[minute]"
    ),
    format_description!(
        "[month repr:long case_sensitive:false] [day padding:none], [year] [hour padding:none]:[minute]:[second]"
    ),
    format_description!(
        "[month repr:short case_sensitive:false] [day padding:none], [year] [hour padding:none]:[minute]"
    ),
    format_description!(
        "[month repr:short case_sensitive:false] [day padding:none], [year] [hour padding:none]:[minute]:[second]"
    ),
];

const DATE_LAYOUTS: &[&[BorrowedFormatItem<'static>]] = &[
    format_description!("[year]-[month padding:none]-[day padding:none]"),
    format_description!("[year]/[month padding:none]/[day padding:none]"),
    format_description!("[month padding:none]/[day padding:none]/[year]"),
    format_description!("[month repr:long case_sensitive:false] [day padding:none], [year]"),
    format_description!("[month repr:short case_sensitive:false] [day padding:none], [year]"),
];

const DISPLAY_LAYOUT: &[BorrowedFormatItem<'static>] = format_description!(
    "[month padding:none]/[day padding:none]/[year], [hour repr:12 padding:none]:[minute]:[second] [period]"
);

const OFFSET_LAYOUT: &[BorrowedFormatItem<'static>] =
    format_description!("[offset_hour sign:mandatory]:[offset_minute]");

pub fn parse_reminder_time(expr: &str, offset: UtcOffset) -> Result<OffsetDateTime, AppError> {
    let cleaned = strip_quotes(expr.trim()).trim();
    if cleaned.is_empty() {
        return Err(AppError::invalid_datetime("time is required"));
    }

    // Layout literals and AM/PM are upper case; month names match either way.
    let normalized = cleaned.to_ascii_uppercase();

    if let Ok(parsed) = OffsetDateTime::parse(&normalized, &Rfc3339) {
        return Ok(parsed);
    }

    for layout in DATE_TIME_LAYOUTS {
        if let Ok(parsed) = PrimitiveDateTime::parse(&normalized, layout) {
            return Ok(parsed.assume_offset(offset));
        }
    }

    for layout in DATE_LAYOUTS {
        if let Ok(date) = Date::parse(&normalized, layout) {
            return Ok(PrimitiveDateTime::new(date, Time::MIDNIGHT).assume_offset(offset));
        }
    }

    Err(AppError::invalid_datetime(format!(
        "unrecognized date/time '{cleaned}'"
    )))
}

pub fn format_timestamp(timestamp: OffsetDateTime, offset: UtcOffset) -> String {
    let local = timestamp.to_offset(offset);
    local
        .format(DISPLAY_LAYOUT)
        .unwrap_or_else(|_| local.to_string())
}

pub fn resolve_offset(configured: Option<&str>) -> Result<UtcOffset, AppError> {
    match configured.map(str::trim).filter(|value| !value.is_empty()) {
        Some(value) if value.eq_ignore_ascii_case("utc") || value.eq_ignore_ascii_case("z") => {
            Ok(UtcOffset::UTC)
        }
        Some(value) => UtcOffset::parse(value, OFFSET_LAYOUT).map_err(|_| {
            AppError::invalid_data(format!("utc_offset must look like +02:00, got '{value}'"))
        }),
        None => Ok(UtcOffset::current_local_offset().unwrap_or(UtcOffset::UTC)),
    }
}

fn strip_quotes(value: &str) -> &str {
    for quote in ['"', '\''] {
        if let Some(inner) = value
            .strip_prefix(quote)
            .and_then(|rest| rest.strip_suffix(quote))
        {
            return inner;
        }
    }
    value
}
