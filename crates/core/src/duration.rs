//! Conversion between the engine's `HH:MM:SS.mmm` timestamps and milliseconds.

use thiserror::Error;

/// Error returned when timestamp text cannot be interpreted.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TimestampError {
    /// A component between separators is not an unsigned integer.
    #[error("Invalid timestamp component {component:?} in {text:?}")]
    InvalidComponent { text: String, component: String },

    /// Too many or too few colon separated parts.
    #[error("Malformed timestamp: {text:?}")]
    Malformed { text: String },

    /// The value does not fit in a millisecond count.
    #[error("Timestamp out of range: {text:?}")]
    Overflow { text: String },
}

/// Parses `H+:MM:SS.mmm` into milliseconds.
///
/// `SS` and `MM:SS` forms are accepted as well. The fraction is read as a
/// decimal fraction of a second, so the engine's two digit `.50` is 500 ms and
/// `.456` is 456 ms; digits past the third are truncated.
pub fn parse_timestamp(text: &str) -> Result<u64, TimestampError> {
    let trimmed = text.trim();
    let (clock, fraction) = match trimmed.split_once('.') {
        Some((clock, fraction)) => (clock, Some(fraction)),
        None => (trimmed, None),
    };

    let parts: Vec<&str> = clock.split(':').collect();
    if parts.is_empty() || parts.len() > 3 {
        return Err(TimestampError::Malformed {
            text: text.to_string(),
        });
    }

    let overflow = || TimestampError::Overflow {
        text: text.to_string(),
    };

    let mut total_secs: u64 = 0;
    for part in &parts {
        let value = parse_component(text, part)?;
        total_secs = total_secs
            .checked_mul(60)
            .and_then(|secs| secs.checked_add(value))
            .ok_or_else(overflow)?;
    }

    let millis = match fraction {
        Some(fraction) => {
            // Validate the whole fraction before truncating it
            parse_component(text, fraction)?;
            let digits: String = fraction.chars().take(3).collect();
            let scale = 10u64.pow(3 - digits.len() as u32);
            parse_component(text, &digits)? * scale
        }
        None => 0,
    };

    total_secs
        .checked_mul(1000)
        .and_then(|ms| ms.checked_add(millis))
        .ok_or_else(overflow)
}

/// Formats milliseconds as `HH:MM:SS.mmm`.
pub fn format_timestamp(ms: u64) -> String {
    let hours = ms / 3_600_000;
    let minutes = (ms / 60_000) % 60;
    let seconds = (ms / 1000) % 60;
    let millis = ms % 1000;
    format!("{:02}:{:02}:{:02}.{:03}", hours, minutes, seconds, millis)
}

fn parse_component(text: &str, component: &str) -> Result<u64, TimestampError> {
    if component.is_empty() || !component.bytes().all(|b| b.is_ascii_digit()) {
        return Err(TimestampError::InvalidComponent {
            text: text.to_string(),
            component: component.to_string(),
        });
    }
    component
        .parse::<u64>()
        .map_err(|_| TimestampError::InvalidComponent {
            text: text.to_string(),
            component: component.to_string(),
        })
}
