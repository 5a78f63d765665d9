//! Pattern-driven field extraction from single diagnostic lines.
//!
//! A [`FieldSpec`] pairs a pattern with either a capture group index and a
//! transform of that group's text, or a transform over all captures for fields
//! that need more than one group (frame size, aspect ratio, suffixed rates).
//!
//! Extracted values that are not [`Truthy`] are dropped. A bitrate of `0` or
//! an empty codec name is reported as absent rather than as a value.

use once_cell::sync::Lazy;
use regex_lite::{Captures, Regex};

use super::types::{AudioDetails, StreamDescriptor, StreamDetails, StreamKind, VideoDetails};

/// Values that count as present once extracted.
///
/// Zero, NaN and empty strings are falsy.
pub trait Truthy {
    fn is_truthy(&self) -> bool;
}

impl Truthy for u32 {
    fn is_truthy(&self) -> bool {
        *self != 0
    }
}

impl Truthy for u64 {
    fn is_truthy(&self) -> bool {
        *self != 0
    }
}

impl Truthy for f64 {
    fn is_truthy(&self) -> bool {
        *self != 0.0 && !self.is_nan()
    }
}

impl Truthy for String {
    fn is_truthy(&self) -> bool {
        !self.is_empty()
    }
}

impl Truthy for (u32, u32) {
    fn is_truthy(&self) -> bool {
        self.0 != 0 && self.1 != 0
    }
}

/// How a matched pattern turns into a value.
pub enum Capture<T> {
    /// Transform the text of one capture group.
    Group(usize, fn(&str) -> Option<T>),
    /// Transform the whole capture set.
    Whole(fn(&Captures<'_>) -> Option<T>),
}

/// A named field recognised by a pattern.
pub struct FieldSpec<T> {
    pub name: &'static str,
    pattern: Regex,
    capture: Capture<T>,
}

impl<T: Truthy> FieldSpec<T> {
    /// Compiles a field spec. Patterns are static literals, so a bad one is a
    /// programming error.
    pub fn new(name: &'static str, pattern: &str, capture: Capture<T>) -> Self {
        Self {
            name,
            pattern: Regex::new(pattern).unwrap(),
            capture,
        }
    }

    /// Extracts the field from `line`, or `None` when it is absent.
    pub fn extract(&self, line: &str) -> Option<T> {
        let caps = self.pattern.captures(line)?;
        let value = match &self.capture {
            Capture::Group(index, transform) => transform(caps.get(*index)?.as_str()),
            Capture::Whole(transform) => transform(&caps),
        }?;
        value.is_truthy().then_some(value)
    }
}

fn text(raw: &str) -> Option<String> {
    Some(raw.trim().to_string())
}

fn integer<T: std::str::FromStr>(raw: &str) -> Option<T> {
    raw.trim().parse().ok()
}

fn decimal(raw: &str) -> Option<f64> {
    raw.trim().parse().ok()
}

/// Leading digits only, so `5.1(side)` reads as 5.
fn leading_integer(raw: &str) -> Option<u32> {
    let digits: String = raw
        .trim()
        .chars()
        .take_while(|c| c.is_ascii_digit())
        .collect();
    digits.parse().ok()
}

fn channel_count(raw: &str) -> Option<u32> {
    let raw = raw.trim();
    if raw.eq_ignore_ascii_case("mono") {
        Some(1)
    } else if raw.eq_ignore_ascii_case("stereo") {
        Some(2)
    } else {
        leading_integer(raw)
    }
}

/// k = 1000, m = 1 000 000.
pub(crate) fn decimal_multiplier(unit: Option<&str>) -> u64 {
    match unit.map(|s| s.to_ascii_lowercase()).as_deref() {
        Some("k") => 1000,
        Some("m") => 1_000_000,
        _ => 1,
    }
}

/// k = 1024, m = 1024 * 1024.
fn binary_multiplier(unit: Option<&str>) -> u64 {
    match unit.map(|s| s.to_ascii_lowercase()).as_deref() {
        Some("k") => 1024,
        Some("m") => 1024 * 1024,
        _ => 1,
    }
}

fn suffix<'a>(caps: &'a Captures<'_>, index: usize) -> Option<&'a str> {
    caps.get(index).map(|m| m.as_str())
}

fn decimal_rate(caps: &Captures<'_>) -> Option<u64> {
    let base: u64 = integer(caps.get(1)?.as_str())?;
    base.checked_mul(decimal_multiplier(suffix(caps, 2)))
}

fn frame_size(caps: &Captures<'_>) -> Option<(u32, u32)> {
    Some((integer(caps.get(1)?.as_str())?, integer(caps.get(2)?.as_str())?))
}

fn aspect_ratio(caps: &Captures<'_>) -> Option<f64> {
    let (width, height) = frame_size(caps)?;
    Some(width as f64 / height as f64)
}

/// Fields read from a `Stream #i:j ...` line.
pub struct StreamFields {
    pub kind: FieldSpec<String>,
    pub codec: FieldSpec<String>,
    pub sample_rate: FieldSpec<u32>,
    pub channels: FieldSpec<u32>,
    pub bitrate: FieldSpec<u64>,
    pub fps: FieldSpec<f64>,
    pub size: FieldSpec<(u32, u32)>,
    pub aspect: FieldSpec<f64>,
    pub colors: FieldSpec<String>,
}

pub static STREAM_FIELDS: Lazy<StreamFields> = Lazy::new(|| StreamFields {
    kind: FieldSpec::new(
        "type",
        r"(?i)^stream\s+#\d+:\d+[^:]*:\s*(\w+):",
        Capture::Group(1, text),
    ),
    codec: FieldSpec::new(
        "codec",
        r"(?i)^stream\s+#\d+:\d+[^:]*:\s*\w+:\s*([^\s,(]+)",
        Capture::Group(1, text),
    ),
    sample_rate: FieldSpec::new("samplerate", r"(?i)(\d+)\s*Hz", Capture::Group(1, integer)),
    channels: FieldSpec::new(
        "channels",
        r"(?i)Hz,\s*([^,]+)",
        Capture::Group(1, channel_count),
    ),
    bitrate: FieldSpec::new(
        "bitrate",
        r"(?i)(\d+)\s*(k|m)?b/s",
        Capture::Whole(decimal_rate),
    ),
    fps: FieldSpec::new("fps", r"(?i)([\d.]+)\s*fps", Capture::Group(1, decimal)),
    size: FieldSpec::new(
        "size",
        r"\b(\d{2,})x(\d{2,})\b",
        Capture::Whole(frame_size),
    ),
    aspect: FieldSpec::new(
        "aspect",
        r"\b(\d{2,})x(\d{2,})\b",
        Capture::Whole(aspect_ratio),
    ),
    colors: FieldSpec::new(
        "colors",
        r"(?i)Video:\s*[^,]+,\s*([^,]+)",
        Capture::Group(1, text),
    ),
});

/// Builds a stream descriptor from a `Stream #` line.
pub fn extract_stream(line: &str) -> StreamDescriptor {
    let fields = &*STREAM_FIELDS;
    let kind = fields
        .kind
        .extract(line)
        .map(|label| StreamKind::from_label(&label))
        .unwrap_or(StreamKind::Other);

    let details = match kind {
        StreamKind::Video => {
            let size = fields.size.extract(line);
            StreamDetails::Video(VideoDetails {
                fps: fields.fps.extract(line),
                width: size.map(|(w, _)| w),
                height: size.map(|(_, h)| h),
                aspect_ratio: fields.aspect.extract(line),
                pixel_format: fields.colors.extract(line),
            })
        }
        StreamKind::Audio => StreamDetails::Audio(AudioDetails {
            sample_rate: fields.sample_rate.extract(line),
            channels: fields.channels.extract(line),
        }),
        StreamKind::Other => StreamDetails::Other,
    };

    StreamDescriptor {
        codec: fields.codec.extract(line),
        bitrate: fields.bitrate.extract(line),
        details,
        metadata: None,
    }
}

/// Fields read from a `frame=... time=...` status line.
pub struct ProgressFields {
    pub frame: FieldSpec<u64>,
    pub fps: FieldSpec<f64>,
    pub quality: FieldSpec<f64>,
    pub size: FieldSpec<u64>,
    pub time: FieldSpec<u64>,
    pub bitrate: FieldSpec<f64>,
    pub speed: FieldSpec<f64>,
}

fn binary_size(caps: &Captures<'_>) -> Option<u64> {
    let base: u64 = integer(caps.get(1)?.as_str())?;
    base.checked_mul(binary_multiplier(suffix(caps, 2)))
}

fn decimal_bits(caps: &Captures<'_>) -> Option<f64> {
    let base = decimal(caps.get(1)?.as_str())?;
    Some(base * decimal_multiplier(suffix(caps, 2)) as f64)
}

fn timestamp(raw: &str) -> Option<u64> {
    crate::duration::parse_timestamp(raw).ok()
}

pub static PROGRESS_FIELDS: Lazy<ProgressFields> = Lazy::new(|| ProgressFields {
    frame: FieldSpec::new("frame", r"(?i)frame=\s*(\d+)", Capture::Group(1, integer)),
    fps: FieldSpec::new("fps", r"(?i)fps=\s*([\d.]+)", Capture::Group(1, decimal)),
    quality: FieldSpec::new("quality", r"(?i)q=\s*(-?[\d.]+)", Capture::Group(1, decimal)),
    size: FieldSpec::new(
        "size",
        r"(?i)size=\s*(\d+)\s*(k|m)?b",
        Capture::Whole(binary_size),
    ),
    time: FieldSpec::new(
        "time",
        r"(?i)time=\s*(\d+:\d{2}:\d{2}(?:\.\d+)?)",
        Capture::Group(1, timestamp),
    ),
    bitrate: FieldSpec::new(
        "bitrate",
        r"(?i)bitrate=\s*([\d.]+)\s*(k|m)?bits/s",
        Capture::Whole(decimal_bits),
    ),
    speed: FieldSpec::new("speed", r"(?i)speed=\s*([\d.]+)x", Capture::Group(1, decimal)),
});

#[cfg(test)]
mod tests {
    use super::*;

    const VIDEO_LINE: &str = "Stream #0:0(und): Video: h264 (High) (avc1 / 0x31637661), yuv420p, 1280x720 [SAR 1:1 DAR 16:9], 2000 kb/s, 30 fps, 30 tbr, 15360 tbn (default)";
    const AUDIO_LINE: &str =
        "Stream #0:1(eng): Audio: aac (LC) (mp4a / 0x6134706D), 44100 Hz, stereo, fltp, 128 kb/s (default)";

    #[test]
    fn test_extract_video_stream() {
        let stream = extract_stream(VIDEO_LINE);
        assert_eq!(stream.kind(), StreamKind::Video);
        assert_eq!(stream.codec.as_deref(), Some("h264"));
        assert_eq!(stream.bitrate, Some(2_000_000));

        let video = stream.video().unwrap();
        assert_eq!(video.width, Some(1280));
        assert_eq!(video.height, Some(720));
        assert_eq!(video.fps, Some(30.0));
        assert_eq!(video.pixel_format.as_deref(), Some("yuv420p"));
        let aspect = video.aspect_ratio.unwrap();
        assert!((aspect - 16.0 / 9.0).abs() < 1e-9);
    }

    #[test]
    fn test_extract_audio_stream() {
        let stream = extract_stream(AUDIO_LINE);
        assert_eq!(stream.kind(), StreamKind::Audio);
        assert_eq!(stream.codec.as_deref(), Some("aac"));
        assert_eq!(stream.bitrate, Some(128_000));

        let audio = stream.audio().unwrap();
        assert_eq!(audio.sample_rate, Some(44_100));
        assert_eq!(audio.channels, Some(2));
    }

    #[test]
    fn test_channel_layouts() {
        assert_eq!(channel_count("mono"), Some(1));
        assert_eq!(channel_count(" Stereo "), Some(2));
        assert_eq!(channel_count("5.1(side)"), Some(5));
        assert_eq!(channel_count("6 channels"), Some(6));
        assert_eq!(channel_count("downmix"), None);
    }

    #[test]
    fn test_zero_bitrate_is_absent() {
        let stream = extract_stream("Stream #0:1: Audio: pcm_s16le, 48000 Hz, mono, s16, 0 kb/s");
        assert_eq!(stream.bitrate, None);
        assert_eq!(stream.audio().unwrap().channels, Some(1));
    }

    #[test]
    fn test_unmatched_pattern_is_absent() {
        let fields = &*STREAM_FIELDS;
        assert_eq!(fields.sample_rate.extract("nothing to see here"), None);
        assert_eq!(fields.size.extract("Stream #0:0: Video: h264"), None);
    }

    #[test]
    fn test_metadata_bitrate_uses_decimal_multiplier() {
        let fields = &*STREAM_FIELDS;
        assert_eq!(fields.bitrate.extract("1 mb/s"), Some(1_000_000));
        assert_eq!(fields.bitrate.extract("320 kb/s"), Some(320_000));
        assert_eq!(fields.bitrate.extract("900 b/s"), Some(900));
    }

    #[test]
    fn test_progress_size_uses_binary_multiplier() {
        let fields = &*PROGRESS_FIELDS;
        assert_eq!(fields.size.extract("size=    512kB"), Some(512 * 1024));
        assert_eq!(fields.size.extract("size=2mB"), Some(2 * 1024 * 1024));
        assert_eq!(fields.size.extract("size=N/A"), None);
    }

    #[test]
    fn test_oversized_values_are_absent() {
        let progress = &*PROGRESS_FIELDS;
        assert_eq!(progress.size.extract("size=18014398509481984kB"), None);
        assert_eq!(progress.size.extract("size=99999999999999999999999kB"), None);

        let stream = &*STREAM_FIELDS;
        assert_eq!(stream.bitrate.extract("18446744073709552 kb/s"), None);
        assert_eq!(stream.bitrate.extract("18446744073710 mb/s"), None);
    }

    #[test]
    fn test_progress_bitrate_uses_decimal_multiplier() {
        let fields = &*PROGRESS_FIELDS;
        assert_eq!(fields.bitrate.extract("bitrate= 800.0kbits/s"), Some(800_000.0));
        assert_eq!(fields.bitrate.extract("bitrate=N/A"), None);
    }

    #[test]
    fn test_other_stream_has_no_details() {
        let stream = extract_stream("Stream #0:2: Data: none (rtp  / 0x20707472), 53 kb/s");
        assert_eq!(stream.kind(), StreamKind::Other);
        assert_eq!(stream.codec.as_deref(), Some("none"));
        assert_eq!(stream.bitrate, Some(53_000));
    }

    #[test]
    fn test_stream_with_bracketed_id() {
        let stream =
            extract_stream("Stream #0:0[0x1](und): Video: hevc (Main), yuv420p10le(tv), 3840x2160, 23.98 fps");
        assert_eq!(stream.codec.as_deref(), Some("hevc"));
        let video = stream.video().unwrap();
        assert_eq!(video.width, Some(3840));
        assert_eq!(video.fps, Some(23.98));
    }
}
