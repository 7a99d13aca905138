use serde::Deserialize;

use super::cursor::DEFAULT_INPUT_BUFFER_SIZE;

/// Configuration for reading documents
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct ReaderConfig {
    /// Capacity of the buffered reader wrapped around opened files
    pub buffer_size: usize,
}

impl Default for ReaderConfig {
    fn default() -> Self {
        Self {
            buffer_size: DEFAULT_INPUT_BUFFER_SIZE,
        }
    }
}
