//! Records produced by the diagnostic parser.

use serde::ser::SerializeMap;
use serde::{Deserialize, Serialize, Serializer};

/// Kind of elementary stream reported by the engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StreamKind {
    Video,
    Audio,
    Other,
}

impl StreamKind {
    /// Maps the engine's stream type word (`Video`, `Audio`, `Data`, ...).
    pub fn from_label(label: &str) -> Self {
        if label.eq_ignore_ascii_case("video") {
            Self::Video
        } else if label.eq_ignore_ascii_case("audio") {
            Self::Audio
        } else {
            Self::Other
        }
    }
}

/// Insertion-ordered string map for free-form `key: value` metadata blocks.
///
/// Re-inserting an existing key replaces its value in place.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Tags(Vec<(String, String)>);

impl Tags {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) {
        let key = key.into();
        let value = value.into();
        match self.0.iter_mut().find(|(k, _)| *k == key) {
            Some(entry) => entry.1 = value,
            None => self.0.push((key, value)),
        }
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.0
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}

impl Serialize for Tags {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.0.len()))?;
        for (key, value) in &self.0 {
            map.serialize_entry(key, value)?;
        }
        map.end()
    }
}

/// Video-only stream attributes.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct VideoDetails {
    pub fps: Option<f64>,
    pub width: Option<u32>,
    pub height: Option<u32>,
    /// `width / height`, only set when both dimensions are known.
    pub aspect_ratio: Option<f64>,
    /// Pixel format / color description (e.g. `yuv420p`).
    pub pixel_format: Option<String>,
}

/// Audio-only stream attributes.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct AudioDetails {
    pub sample_rate: Option<u32>,
    /// `mono` is 1 and `stereo` is 2.
    pub channels: Option<u32>,
}

/// Kind-specific part of a stream descriptor.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum StreamDetails {
    Video(VideoDetails),
    Audio(AudioDetails),
    Other,
}

/// One elementary stream discovered in an input or output section.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StreamDescriptor {
    pub codec: Option<String>,
    /// Bits per second.
    pub bitrate: Option<u64>,
    #[serde(flatten)]
    pub details: StreamDetails,
    /// Attached when a `Metadata:` block follows this stream's line.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub metadata: Option<Tags>,
}

impl StreamDescriptor {
    pub fn kind(&self) -> StreamKind {
        match self.details {
            StreamDetails::Video(_) => StreamKind::Video,
            StreamDetails::Audio(_) => StreamKind::Audio,
            StreamDetails::Other => StreamKind::Other,
        }
    }

    pub fn video(&self) -> Option<&VideoDetails> {
        match &self.details {
            StreamDetails::Video(video) => Some(video),
            _ => None,
        }
    }

    pub fn audio(&self) -> Option<&AudioDetails> {
        match &self.details {
            StreamDetails::Audio(audio) => Some(audio),
            _ => None,
        }
    }
}

/// Input or output container description.
///
/// `duration_ms` and `synched` are only ever populated on the input section.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct MediaSection {
    /// Index from the `#N` in the section header.
    pub index: Option<u32>,
    /// Container format list as printed by the engine (`mov,mp4,m4a`).
    pub format: Option<String>,
    /// Path or URL from the section header.
    pub location: Option<String>,
    pub streams: Vec<StreamDescriptor>,
    pub metadata: Tags,
    pub duration_ms: Option<u64>,
    /// Container bitrate from the duration line, bits per second.
    pub bitrate: Option<u64>,
    /// True when the engine reported a start offset of exactly zero.
    pub synched: bool,
}

/// Snapshot of everything learned before transcoding started.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct MetadataRecord {
    pub input: MediaSection,
    pub output: MediaSection,
    /// False when the diagnostic stream ended before the metadata phase did.
    pub complete: bool,
}

/// One periodic status line.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ProgressRecord {
    pub frame: Option<u64>,
    pub fps: Option<f64>,
    pub quality: Option<f64>,
    pub size_bytes: Option<u64>,
    pub time_ms: Option<u64>,
    /// Bits per second.
    pub bitrate: Option<f64>,
    /// Processing speed relative to real time.
    pub speed: Option<f64>,
    /// `time_ms / input duration`, when the duration is known and non-zero.
    pub fraction_complete: Option<f64>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tags_keep_insertion_order() {
        let mut tags = Tags::new();
        tags.insert("major_brand", "isom");
        tags.insert("encoder", "Lavf60");
        tags.insert("compatible_brands", "mp41");
        let keys: Vec<&str> = tags.iter().map(|(k, _)| k).collect();
        assert_eq!(keys, vec!["major_brand", "encoder", "compatible_brands"]);
    }

    #[test]
    fn test_tags_replace_existing_key() {
        let mut tags = Tags::new();
        tags.insert("title", "first");
        tags.insert("title", "second");
        assert_eq!(tags.len(), 1);
        assert_eq!(tags.get("title"), Some("second"));
    }

    #[test]
    fn test_tags_serialize_as_object() {
        let mut tags = Tags::new();
        tags.insert("b", "1");
        tags.insert("a", "2");
        let json = serde_json::to_string(&tags).unwrap();
        assert_eq!(json, r#"{"b":"1","a":"2"}"#);
    }

    #[test]
    fn test_stream_kind_from_label() {
        assert_eq!(StreamKind::from_label("Video"), StreamKind::Video);
        assert_eq!(StreamKind::from_label("AUDIO"), StreamKind::Audio);
        assert_eq!(StreamKind::from_label("Subtitle"), StreamKind::Other);
    }

    #[test]
    fn test_stream_descriptor_serializes_kind_tag() {
        let stream = StreamDescriptor {
            codec: Some("aac".to_string()),
            bitrate: Some(128_000),
            details: StreamDetails::Audio(AudioDetails {
                sample_rate: Some(44_100),
                channels: Some(2),
            }),
            metadata: None,
        };
        let value = serde_json::to_value(&stream).unwrap();
        assert_eq!(value["kind"], "audio");
        assert_eq!(value["sample_rate"], 44_100);
        assert!(value.get("metadata").is_none());
    }
}
