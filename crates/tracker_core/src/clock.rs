use time::{Date, OffsetDateTime, UtcOffset};

/// Falls back to UTC when the local offset cannot be determined.
pub fn local_offset() -> UtcOffset {
    UtcOffset::current_local_offset().unwrap_or(UtcOffset::UTC)
}

pub fn now() -> OffsetDateTime {
    OffsetDateTime::now_utc()
}

/// Current instant expressed in the local offset, for human-facing output.
pub fn local_now() -> OffsetDateTime {
    now().to_offset(local_offset())
}

/// Calendar date in the local timezone.
pub fn today() -> Date {
    local_now().date()
}
