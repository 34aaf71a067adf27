//! Dotted field paths into an entry.

use std::fmt;
use std::str::FromStr;

use crate::ResolveError;

/// One component of a [`FieldPath`].
///
/// A segment is either a schema uid or, immediately after a multiple-valued
/// node (multiple group, modular blocks), a numeric index into the sequence.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Segment {
    /// A schema uid to look up in the current schema list.
    Uid(String),
    /// An index into a multiple-valued node's data sequence.
    Index(usize),
}

impl Segment {
    /// The index this segment carries, if it is numeric.
    pub fn as_index(&self) -> Option<usize> {
        match self {
            Segment::Index(i) => Some(*i),
            Segment::Uid(_) => None,
        }
    }

    /// The uid this segment carries, if it is not numeric.
    pub fn as_uid(&self) -> Option<&str> {
        match self {
            Segment::Uid(uid) => Some(uid),
            Segment::Index(_) => None,
        }
    }
}

impl fmt::Display for Segment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Segment::Uid(uid) => write!(f, "{}", uid),
            Segment::Index(i) => write!(f, "{}", i),
        }
    }
}

/// A validated dotted field uid, e.g. `modular_blocks.0.banner.banner_image`.
///
/// # Path Syntax
///
/// - Segments are separated by `.`
/// - A segment of ASCII digits is an index; anything else is a schema uid
/// - Empty paths and empty segments are malformed
///
/// # Examples
///
/// ```rust
/// use extkit_model::FieldPath;
///
/// let path = FieldPath::parse("group.1.child").unwrap();
/// assert_eq!(path.len(), 3);
/// assert_eq!(path.to_string(), "group.1.child");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct FieldPath {
    segments: Vec<Segment>,
}

impl FieldPath {
    /// Parse a dotted path string.
    ///
    /// An empty string or an empty segment (`a..b`, trailing dot) is
    /// malformed and fails with [`ResolveError::FieldNotFound`], matching
    /// the resolver's uniform failure for bad paths.
    pub fn parse(s: &str) -> Result<Self, ResolveError> {
        if s.is_empty() {
            return Err(ResolveError::FieldNotFound);
        }

        let mut segments = Vec::new();
        for part in s.split('.') {
            if part.is_empty() {
                return Err(ResolveError::FieldNotFound);
            }
            if part.bytes().all(|b| b.is_ascii_digit()) {
                let index = part.parse().map_err(|_| ResolveError::FieldNotFound)?;
                segments.push(Segment::Index(index));
            } else {
                segments.push(Segment::Uid(part.to_string()));
            }
        }

        Ok(FieldPath { segments })
    }

    /// Number of segments.
    pub fn len(&self) -> usize {
        self.segments.len()
    }

    /// True for the (unconstructible-via-parse) empty path.
    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    /// The parsed segments.
    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    /// Iterate over segments.
    pub fn iter(&self) -> impl Iterator<Item = &Segment> {
        self.segments.iter()
    }
}

impl FromStr for FieldPath {
    type Err = ResolveError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        FieldPath::parse(s)
    }
}

impl fmt::Display for FieldPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, segment) in self.segments.iter().enumerate() {
            if i > 0 {
                write!(f, ".")?;
            }
            write!(f, "{}", segment)?;
        }
        Ok(())
    }
}

/// Macro for field path literals.
///
/// # Example
///
/// ```rust
/// use extkit_model::fieldpath;
///
/// let p = fieldpath!("blocks.0.banner");
/// assert_eq!(p.len(), 3);
/// ```
#[macro_export]
macro_rules! fieldpath {
    ($s:expr) => {
        $crate::FieldPath::parse($s).expect("invalid field path literal")
    };
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_basic_paths() {
        assert_eq!(FieldPath::parse("title").unwrap().len(), 1);
        assert_eq!(FieldPath::parse("group.child").unwrap().len(), 2);
        assert_eq!(FieldPath::parse("mb.0.banner.image").unwrap().len(), 4);
    }

    #[test]
    fn numeric_segments_become_indices() {
        let p = fieldpath!("group.12.child");
        assert_eq!(p.segments()[1], Segment::Index(12));
        assert_eq!(p.segments()[1].as_index(), Some(12));
        assert_eq!(p.segments()[0].as_uid(), Some("group"));
    }

    #[test]
    fn mixed_alphanumeric_is_a_uid() {
        let p = fieldpath!("field2");
        assert_eq!(p.segments()[0], Segment::Uid("field2".to_string()));
        assert_eq!(p.segments()[0].as_index(), None);
    }

    #[test]
    fn empty_path_rejected() {
        assert_eq!(FieldPath::parse(""), Err(ResolveError::FieldNotFound));
    }

    #[test]
    fn empty_segments_rejected() {
        assert!(FieldPath::parse("a..b").is_err());
        assert!(FieldPath::parse(".a").is_err());
        assert!(FieldPath::parse("a.").is_err());
    }

    #[test]
    fn display_round_trips() {
        let p = fieldpath!("mb.0.banner.banner_image");
        assert_eq!(p.to_string(), "mb.0.banner.banner_image");
        assert_eq!(FieldPath::parse(&p.to_string()).unwrap(), p);
    }

    #[test]
    fn from_str_works() {
        let p: FieldPath = "group.0.child".parse().unwrap();
        assert_eq!(p.len(), 3);
    }

    #[test]
    fn iter_yields_all_segments() {
        let p = fieldpath!("a.b.c");
        assert_eq!(p.iter().count(), 3);
        assert!(!p.is_empty());
    }
}
