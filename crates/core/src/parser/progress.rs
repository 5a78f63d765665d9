//! Decoding of periodic status lines.

use super::fields::PROGRESS_FIELDS;
use super::types::ProgressRecord;

/// Decodes a progress line.
///
/// `fraction_complete` is filled in when `input_duration_ms` is known and
/// non-zero and the line carries a time.
pub fn decode(line: &str, input_duration_ms: Option<u64>) -> ProgressRecord {
    let fields = &*PROGRESS_FIELDS;
    let time_ms = fields.time.extract(line);
    let fraction_complete = match (time_ms, input_duration_ms) {
        (Some(time), Some(total)) if total != 0 => Some(time as f64 / total as f64),
        _ => None,
    };

    ProgressRecord {
        frame: fields.frame.extract(line),
        fps: fields.fps.extract(line),
        quality: fields.quality.extract(line),
        size_bytes: fields.size.extract(line),
        time_ms,
        bitrate: fields.bitrate.extract(line),
        speed: fields.speed.extract(line),
        fraction_complete,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const LINE: &str =
        "frame=  100 fps= 30 q=28.0 size=    512kB time=00:00:05.00 bitrate= 800.0kbits/s speed=1.5x";

    #[test]
    fn test_decode_full_line() {
        let record = decode(LINE, Some(10_000));
        assert_eq!(record.frame, Some(100));
        assert_eq!(record.fps, Some(30.0));
        assert_eq!(record.quality, Some(28.0));
        assert_eq!(record.size_bytes, Some(512 * 1024));
        assert_eq!(record.time_ms, Some(5000));
        assert_eq!(record.bitrate, Some(800_000.0));
        assert_eq!(record.speed, Some(1.5));
        assert_eq!(record.fraction_complete, Some(0.5));
    }

    #[test]
    fn test_no_fraction_without_duration() {
        assert_eq!(decode(LINE, None).fraction_complete, None);
        assert_eq!(decode(LINE, Some(0)).fraction_complete, None);
    }

    #[test]
    fn test_audio_only_progress() {
        let record = decode(
            "size=     256kB time=00:00:16.00 bitrate= 131.1kbits/s speed=32x",
            Some(32_000),
        );
        assert_eq!(record.frame, None);
        assert_eq!(record.size_bytes, Some(256 * 1024));
        assert_eq!(record.fraction_complete, Some(0.5));
        assert_eq!(record.speed, Some(32.0));
    }

    #[test]
    fn test_zero_values_are_absent() {
        let record = decode(
            "frame=    0 fps=0.0 q=0.0 size=       0kB time=00:00:00.00 bitrate=N/A speed=   0x",
            Some(10_000),
        );
        assert_eq!(record.frame, None);
        assert_eq!(record.fps, None);
        assert_eq!(record.quality, None);
        assert_eq!(record.size_bytes, None);
        assert_eq!(record.time_ms, None);
        assert_eq!(record.bitrate, None);
        assert_eq!(record.fraction_complete, None);
    }

    #[test]
    fn test_negative_quality() {
        let record = decode("frame=  250 fps=120 q=-1.0 Lsize=    1024kB time=00:00:10.00", None);
        assert_eq!(record.quality, Some(-1.0));
        assert_eq!(record.size_bytes, Some(1024 * 1024));
    }
}
