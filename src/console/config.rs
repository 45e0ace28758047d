use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ConsoleConfig {
    pub max_line_length: usize,
    pub key_buffer: usize,
}

impl Default for ConsoleConfig {
    fn default() -> Self {
        Self {
            max_line_length: 1024,
            key_buffer: 16,
        }
    }
}
