use std::fmt;
use std::sync::Arc;

/// A location in a `.proto` source text.
///
/// Lines and columns are 1-based. Columns count characters, so a tab or a
/// multi-byte UTF-8 character each advance the column by one.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Position {
    pub filename: Arc<str>,
    pub line: usize,
    pub column: usize,
}

impl Position {
    pub fn new(filename: impl Into<Arc<str>>, line: usize, column: usize) -> Self {
        Position {
            filename: filename.into(),
            line,
            column,
        }
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}:{}", self.filename, self.line, self.column)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display() {
        let pos = Position::new("<input>", 4, 3);
        assert_eq!(pos.to_string(), "<input>:4:3");
    }

    #[test]
    fn test_shared_filename() {
        let a = Position::new("a.proto", 1, 1);
        let b = Position {
            line: 2,
            ..a.clone()
        };
        assert!(Arc::ptr_eq(&a.filename, &b.filename));
        assert_eq!(b.to_string(), "a.proto:2:1");
    }
}
