//! Migration payloads handed from a source driver to a database driver

use std::fmt;
use tokio::io::AsyncRead;

/// Direction of a migration step
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Direction {
    Up,
    Down,
}

impl Direction {
    pub fn as_str(&self) -> &'static str {
        match self {
            Direction::Up => "up",
            Direction::Down => "down",
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Encoding of a payload body
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PayloadFormat {
    /// Raw SQL statements
    Sql,
    /// A YAML list of admin API queries
    Yaml,
}

impl PayloadFormat {
    /// Map a file extension (without the dot) to a format
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext {
            "sql" => Some(PayloadFormat::Sql),
            "yaml" | "yml" => Some(PayloadFormat::Yaml),
            _ => None,
        }
    }
}

impl fmt::Display for PayloadFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PayloadFormat::Sql => f.write_str("sql"),
            PayloadFormat::Yaml => f.write_str("yaml"),
        }
    }
}

/// Streaming body of one migration in one direction.
///
/// The reader is opened lazily by the source driver; consumers must read it
/// to the end and must not assume the body arrives in a single chunk.
pub struct Payload {
    /// Migration version
    pub version: u64,

    /// Human readable name, if the file carried one
    pub identifier: Option<String>,

    /// Body encoding
    pub format: PayloadFormat,

    /// Body stream
    pub reader: Box<dyn AsyncRead + Send + Unpin>,
}

impl Payload {
    pub fn new(
        version: u64,
        identifier: Option<String>,
        format: PayloadFormat,
        reader: impl AsyncRead + Send + Unpin + 'static,
    ) -> Self {
        Self {
            version,
            identifier,
            format,
            reader: Box::new(reader),
        }
    }

    /// Replace the reader with a wrapped version of itself
    pub fn map_reader<F, R>(self, wrap: F) -> Self
    where
        F: FnOnce(Box<dyn AsyncRead + Send + Unpin>) -> R,
        R: AsyncRead + Send + Unpin + 'static,
    {
        Self {
            version: self.version,
            identifier: self.identifier,
            format: self.format,
            reader: Box::new(wrap(self.reader)),
        }
    }
}

impl fmt::Debug for Payload {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Payload")
            .field("version", &self.version)
            .field("identifier", &self.identifier)
            .field("format", &self.format)
            .finish_non_exhaustive()
    }
}
