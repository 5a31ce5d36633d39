//! Encoded polyline codec
//!
//! Implements the compact ASCII path format used by the Google Routes API and
//! OSRM (`geometries=polyline`). Every coordinate is stored as a latitude delta
//! followed by a longitude delta. Each delta is scaled by 1e5, zig-zag signed
//! and split into 5-bit groups, least significant first. A group is emitted as
//! `group + 63`, with bit `0x20` set on every group except the last.
//!
//! Both directions are pure functions and keep no state between calls.

use thiserror::Error;

use crate::value_objects::Coordinate;

/// Fixed-point precision of the format (five decimal places)
const PRECISION: f64 = 1e5;

/// Offset that maps a 6-bit group into printable ASCII (`'?'`)
const ASCII_OFFSET: u8 = 63;

/// Continuation flag within a group
const CONTINUATION: i64 = 0x20;

/// Payload mask within a group
const GROUP_MASK: i64 = 0x1f;

/// Largest shift before a value exceeds 32 bits of payload
const MAX_SHIFT: u32 = 30;

/// Errors raised while decoding an encoded polyline
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DecodeError {
    /// The input ended while a continuation bit was still set
    #[error("Polyline truncated: value starting at byte {position} never terminates")]
    Truncated {
        /// Byte offset where the unterminated value began
        position: usize,
    },

    /// A latitude delta was not followed by a longitude delta
    #[error("Polyline has an unpaired latitude at byte {position}")]
    UnpairedCoordinate {
        /// Byte offset of the unpaired latitude
        position: usize,
    },

    /// A byte outside the `'?'..='~'` range
    #[error("Polyline contains invalid byte 0x{byte:02x} at {position}")]
    InvalidCharacter {
        /// Byte offset of the offending byte
        position: usize,
        /// The offending byte
        byte: u8,
    },

    /// A single value used more than 32 bits
    #[error("Polyline value starting at byte {position} overflows 32 bits")]
    Overflow {
        /// Byte offset where the value began
        position: usize,
    },

    /// Accumulated coordinate fell outside the WGS84 range
    #[error("Polyline point at byte {position} is out of range")]
    OutOfRange {
        /// Byte offset of the point's latitude
        position: usize,
    },
}

/// Decode an encoded polyline into an ordered coordinate sequence
///
/// An empty string decodes to an empty sequence.
///
/// # Errors
///
/// Returns a [`DecodeError`] describing the first malformed byte sequence.
pub fn decode(encoded: &str) -> Result<Vec<Coordinate>, DecodeError> {
    let bytes = encoded.as_bytes();
    let mut points = Vec::with_capacity(bytes.len() / 4);
    let mut index = 0;
    let mut lat: i64 = 0;
    let mut lng: i64 = 0;

    while index < bytes.len() {
        let start = index;
        let (delta_lat, next) = decode_value(bytes, index)?;
        if next >= bytes.len() {
            return Err(DecodeError::UnpairedCoordinate { position: start });
        }
        let (delta_lng, after) = decode_value(bytes, next)?;

        lat += delta_lat;
        lng += delta_lng;
        index = after;

        #[allow(clippy::cast_precision_loss)] // values are bounded well below 2^52
        let point = Coordinate::new(lat as f64 / PRECISION, lng as f64 / PRECISION)
            .map_err(|_| DecodeError::OutOfRange { position: start })?;
        points.push(point);
    }

    Ok(points)
}

/// Read one zig-zag varint starting at `start`, returning it and the next offset
fn decode_value(bytes: &[u8], start: usize) -> Result<(i64, usize), DecodeError> {
    let mut result: i64 = 0;
    let mut shift: u32 = 0;
    let mut index = start;

    loop {
        let Some(&byte) = bytes.get(index) else {
            return Err(DecodeError::Truncated { position: start });
        };
        if !(ASCII_OFFSET..=b'~').contains(&byte) {
            return Err(DecodeError::InvalidCharacter {
                position: index,
                byte,
            });
        }
        if shift > MAX_SHIFT {
            return Err(DecodeError::Overflow { position: start });
        }

        let group = i64::from(byte - ASCII_OFFSET);
        result |= (group & GROUP_MASK) << shift;
        shift += 5;
        index += 1;

        if group < CONTINUATION {
            break;
        }
    }

    let value = if result & 1 == 0 {
        result >> 1
    } else {
        !(result >> 1)
    };
    Ok((value, index))
}

/// Encode a coordinate sequence, rounding each value to five decimals
#[must_use]
pub fn encode(points: &[Coordinate]) -> String {
    let mut encoded = String::with_capacity(points.len() * 8);
    let mut prev_lat: i64 = 0;
    let mut prev_lng: i64 = 0;

    for point in points {
        let lat = to_fixed(point.lat());
        let lng = to_fixed(point.lng());
        encode_value(lat - prev_lat, &mut encoded);
        encode_value(lng - prev_lng, &mut encoded);
        prev_lat = lat;
        prev_lng = lng;
    }

    encoded
}

#[allow(clippy::cast_possible_truncation)] // |degrees * 1e5| < 2^25
fn to_fixed(degrees: f64) -> i64 {
    (degrees * PRECISION).round() as i64
}

#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)] // groups are 0..=63
fn encode_value(value: i64, out: &mut String) {
    let mut remaining = if value < 0 { !(value << 1) } else { value << 1 };

    while remaining >= CONTINUATION {
        let group = (CONTINUATION | (remaining & GROUP_MASK)) as u8;
        out.push(char::from(group + ASCII_OFFSET));
        remaining >>= 5;
    }
    out.push(char::from(remaining as u8 + ASCII_OFFSET));
}
