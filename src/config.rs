use crate::detect::{PlaylistFormat, DEFAULT_DETECTION_WINDOW};
use serde::{Deserialize, Serialize};

/// Options for [`Parser`](crate::Parser).
///
/// Every field has a default, so a partial document deserializes fine:
///
/// ```
/// use m3u_rs::{ParserConfig, PlaylistFormat};
///
/// let config: ParserConfig = serde_json::from_str(r#"{ "format": "hls" }"#).unwrap();
/// assert_eq!(config.format, Some(PlaylistFormat::Hls));
/// assert_eq!(config.detection_window, 50);
/// assert_eq!(config.max_input_bytes, None);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ParserConfig {
    /// Skips detection and parses as this format.
    pub format: Option<PlaylistFormat>,
    /// Inputs larger than this are rejected with
    /// [`Error::InputTooLarge`](crate::Error::InputTooLarge).
    pub max_input_bytes: Option<usize>,
    /// Number of leading lines scored by the format detector.
    pub detection_window: usize,
}

impl Default for ParserConfig {
    fn default() -> ParserConfig {
        ParserConfig {
            format: None,
            max_input_bytes: None,
            detection_window: DEFAULT_DETECTION_WINDOW,
        }
    }
}

impl ParserConfig {
    pub fn with_format(mut self, format: PlaylistFormat) -> ParserConfig {
        self.format = Some(format);
        self
    }

    pub fn with_max_input_bytes(mut self, limit: usize) -> ParserConfig {
        self.max_input_bytes = Some(limit);
        self
    }

    pub fn with_detection_window(mut self, lines: usize) -> ParserConfig {
        self.detection_window = lines;
        self
    }
}
