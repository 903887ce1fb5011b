//! Note lifecycle state machine.
//!
//! ```text
//!            archive              soft_delete
//!   Active ───────────▶ Archived ─────────────┐
//!     ▲  ◀───────────              │          ▼
//!     │      unarchive             └────▶ Trashed ──▶ (removed)
//!     │                  soft_delete        │     permanent_delete
//!     └─────────────────────────────────────┘
//!                      recover
//! ```
//!
//! Transitions here are pure: they mutate an in-memory [`Note`] and never
//! touch storage. Illegal moves return [`Error::Conflict`] and leave the note
//! unchanged.

use chrono::{DateTime, Duration, Utc};

use crate::error::{Error, Result};
use crate::models::{to_storage_precision, Note, NoteState};

/// Advance `updated_at` to `now`, or one microsecond past its previous value
/// when the clock has not moved. Stored at microsecond precision.
pub fn touch(note: &mut Note, now: DateTime<Utc>) {
    let now = to_storage_precision(now);
    let floor = note.updated_at + Duration::microseconds(1);
    note.updated_at = if now >= floor { now } else { floor };
}

/// Active → Archived.
pub fn archive(note: &mut Note, now: DateTime<Utc>) -> Result<()> {
    match note.state() {
        NoteState::Active => {
            note.archived = true;
            touch(note, now);
            Ok(())
        }
        NoteState::Archived => Err(Error::Conflict("Note is already archived".to_string())),
        NoteState::Trashed => Err(Error::Conflict(
            "Note is in the trash and cannot be archived".to_string(),
        )),
    }
}

/// Archived → Active.
pub fn unarchive(note: &mut Note, now: DateTime<Utc>) -> Result<()> {
    match note.state() {
        NoteState::Archived => {
            note.archived = false;
            touch(note, now);
            Ok(())
        }
        _ => Err(Error::Conflict("Note is not archived".to_string())),
    }
}

/// Active or Archived → Trashed. The archived flag is left as it was.
pub fn soft_delete(note: &mut Note, now: DateTime<Utc>) -> Result<()> {
    if note.deleted {
        return Err(Error::Conflict("Note is already in the trash".to_string()));
    }
    note.deleted = true;
    touch(note, now);
    Ok(())
}

/// Trashed → Active. Clears the archived flag as well.
pub fn recover(note: &mut Note, now: DateTime<Utc>) -> Result<()> {
    if !note.deleted {
        return Err(Error::Conflict("Note is not in the trash".to_string()));
    }
    note.deleted = false;
    note.archived = false;
    touch(note, now);
    Ok(())
}

/// Check that a note may be removed for good. Only trashed notes qualify.
pub fn ensure_purgeable(note: &Note) -> Result<()> {
    if note.deleted {
        Ok(())
    } else {
        Err(Error::Conflict(
            "Note must be in the trash before it can be permanently deleted".to_string(),
        ))
    }
}

/// Check that a note's text may be edited. Trashed notes are read-only.
pub fn ensure_editable(note: &Note) -> Result<()> {
    if note.deleted {
        Err(Error::Conflict(
            "Note is in the trash and cannot be edited".to_string(),
        ))
    } else {
        Ok(())
    }
}
