//! Error types for path resolution.

/// Errors raised while resolving a field path against an entry.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ResolveError {
    /// The path did not resolve: unknown uid, out-of-range index, or a
    /// malformed path. One uniform error for every mid-walk failure.
    #[error("Invalid uid, Field not found")]
    FieldNotFound,

    /// The entry has no saved data yet, so no field can be resolved.
    /// Distinct from [`ResolveError::FieldNotFound`] so callers can tell
    /// "save the entry first" apart from a genuinely bad uid.
    #[error("Entry is not saved yet, field data is unavailable")]
    EntryUnsaved,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn field_not_found_message_is_stable() {
        assert_eq!(
            ResolveError::FieldNotFound.to_string(),
            "Invalid uid, Field not found"
        );
    }

    #[test]
    fn unsaved_entry_is_distinguishable() {
        assert_ne!(
            ResolveError::EntryUnsaved.to_string(),
            ResolveError::FieldNotFound.to_string()
        );
    }
}
