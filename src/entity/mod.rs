mod note;
mod validation;

pub use note::{Note, NoteDraft, DEFAULT_NOTE_COLOR};
pub use validation::{FieldErrors, NoteInput, NotePayload, MAX_TITLE_CHARS};

use chrono::{DateTime, SubsecRound, Utc};

/// Current time at the precision the store keeps (microseconds).
pub fn now() -> DateTime<Utc> {
    Utc::now().trunc_subsecs(6)
}

/// Timestamp for a write that must sort strictly after `previous`.
///
/// Two writes inside the same microsecond would otherwise share a stamp.
pub fn next_timestamp(previous: DateTime<Utc>) -> DateTime<Utc> {
    let now = now();
    if now > previous {
        now
    } else {
        previous + chrono::Duration::microseconds(1)
    }
}
