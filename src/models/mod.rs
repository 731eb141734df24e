pub mod customer;
pub mod error;
pub mod reservation;

/// Falsy notes (missing or empty) are kept as an empty string.
pub(crate) fn normalize_notes(notes: Option<String>) -> String {
    notes.unwrap_or_default()
}
