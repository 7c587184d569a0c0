//! EWKB point codec.
//!
//! Points are stored in the PostGIS extended well-known-binary layout:
//!
//! ```text
//! byte order (1) | type word (4) | SRID (4) | x = longitude (8) | y = latitude (8)
//! ```
//!
//! The type word is `0x2000_0001` (Point with the SRID flag set) and the
//! SRID is always 4326. Encoding emits little-endian; decoding accepts
//! either byte order as well as plain WKB points without an SRID.
//!
//! Reading and writing go through [`postgis::ewkb`]. The header checks,
//! the SRID check, trailing-byte detection and coordinate range checks
//! are done here.

use std::fmt;

use postgis::ewkb::{self, AsEwkbPoint, EwkbRead, EwkbWrite};

use crate::domain::Coordinates;

/// Spatial reference identifier of WGS84 longitude/latitude.
pub const SRID_WGS84: i32 = 4326;

const WKB_POINT: u32 = 1;
const EWKB_SRID_FLAG: u32 = 0x2000_0000;
const EWKB_M_FLAG: u32 = 0x4000_0000;
const EWKB_Z_FLAG: u32 = 0x8000_0000;

const BIG_ENDIAN: u8 = 0;
const LITTLE_ENDIAN: u8 = 1;

/// Length of an EWKB point with SRID.
const EWKB_POINT_LEN: usize = 25;

/// Failure to encode or decode a binary point geometry.
#[derive(Debug, thiserror::Error)]
pub enum CodecError {
    /// The EWKB reader or writer failed, typically on truncated input.
    #[error("malformed EWKB: {0}")]
    Ewkb(String),

    /// Extra bytes after a complete point.
    #[error("{0} unexpected trailing bytes after point geometry")]
    TrailingBytes(usize),

    /// The byte-order marker was neither 0 nor 1.
    #[error("invalid byte order marker {0:#04x}")]
    InvalidByteOrder(u8),

    /// The geometry is not a two-dimensional point.
    #[error("unsupported geometry type word {0:#010x}; expected a 2D point")]
    UnsupportedGeometryType(u32),

    /// The geometry carries an SRID other than 4326.
    #[error("unsupported SRID {0}; expected 4326")]
    UnsupportedSrid(i32),

    /// A coordinate is NaN or infinite.
    #[error("geometry contains a non-finite coordinate")]
    NonFiniteCoordinate,

    /// A coordinate lies outside the WGS84 ranges.
    #[error("geometry coordinate out of range: lng {longitude}, lat {latitude}")]
    OutOfRange {
        /// Decoded x value.
        longitude: f64,
        /// Decoded y value.
        latitude: f64,
    },

    /// A stored point has no geometry at all.
    #[error("point has no geometry")]
    MissingGeometry,
}

impl From<postgis::error::Error> for CodecError {
    fn from(err: postgis::error::Error) -> Self {
        Self::Ewkb(err.to_string())
    }
}

/// A validated EWKB point geometry tagged with SRID 4326.
///
/// Only obtainable through [`encode`] or by validating existing bytes, so
/// holding one means the bytes decode to a point.
#[derive(Clone, PartialEq, Eq)]
pub struct EncodedGeometry(Vec<u8>);

impl EncodedGeometry {
    /// Validates raw EWKB/WKB bytes as a point geometry.
    ///
    /// # Errors
    ///
    /// Returns [`CodecError::MissingGeometry`] for empty input, or any
    /// decoding error from [`decode`].
    pub fn from_bytes(bytes: Vec<u8>) -> Result<Self, CodecError> {
        match decode(&bytes)? {
            Some(_) => Ok(Self(bytes)),
            None => Err(CodecError::MissingGeometry),
        }
    }

    /// Raw bytes.
    #[must_use]
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    /// Upper-case hex text form, as PostGIS prints geometry columns.
    #[must_use]
    pub fn to_hex(&self) -> String {
        hex::encode_upper(&self.0)
    }

    /// Decodes the point back into `(longitude, latitude)` order.
    ///
    /// # Errors
    ///
    /// Returns a [`CodecError`] only if the bytes fail to decode, which
    /// validated construction rules out.
    pub fn decode(&self) -> Result<geo::Point<f64>, CodecError> {
        decode(&self.0)?.ok_or(CodecError::MissingGeometry)
    }
}

impl fmt::Debug for EncodedGeometry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("EncodedGeometry").field(&self.to_hex()).finish()
    }
}

/// Encodes coordinates as a little-endian EWKB point with SRID 4326.
///
/// Axis order is GIS order: longitude first, latitude second.
///
/// # Errors
///
/// Returns [`CodecError::Ewkb`] if the writer fails.
pub fn encode(coordinates: Coordinates) -> Result<EncodedGeometry, CodecError> {
    let point = ewkb::Point {
        x: coordinates.longitude(),
        y: coordinates.latitude(),
        srid: Some(SRID_WGS84),
    };
    let mut buf = Vec::with_capacity(EWKB_POINT_LEN);
    point.as_ewkb().write_ewkb(&mut buf)?;
    Ok(EncodedGeometry(buf))
}

/// Decodes an EWKB or WKB point.
///
/// Empty input is "no geometry" and yields `Ok(None)`.
///
/// # Errors
///
/// Returns a [`CodecError`] for anything that is not exactly one finite,
/// in-range 2D point in SRID 4326.
pub fn decode(bytes: &[u8]) -> Result<Option<geo::Point<f64>>, CodecError> {
    let Some((&order, rest)) = bytes.split_first() else {
        return Ok(None);
    };
    let big_endian = match order {
        BIG_ENDIAN => true,
        LITTLE_ENDIAN => false,
        other => return Err(CodecError::InvalidByteOrder(other)),
    };

    // The reader drops Z/M ordinates for a 2D point and ignores the base
    // type, so the type word is checked before handing over.
    if let Some(raw) = rest.first_chunk::<4>() {
        let type_word = if big_endian {
            u32::from_be_bytes(*raw)
        } else {
            u32::from_le_bytes(*raw)
        };
        if type_word & (EWKB_Z_FLAG | EWKB_M_FLAG) != 0
            || type_word & !EWKB_SRID_FLAG != WKB_POINT
        {
            return Err(CodecError::UnsupportedGeometryType(type_word));
        }
    }

    let mut remaining = bytes;
    let point = ewkb::Point::read_ewkb(&mut remaining)?;
    if !remaining.is_empty() {
        return Err(CodecError::TrailingBytes(remaining.len()));
    }

    if let Some(srid) = point.srid.filter(|&srid| srid != SRID_WGS84) {
        return Err(CodecError::UnsupportedSrid(srid));
    }

    let (longitude, latitude) = (point.x, point.y);
    if !longitude.is_finite() || !latitude.is_finite() {
        return Err(CodecError::NonFiniteCoordinate);
    }
    if !(-180.0..=180.0).contains(&longitude) || !(-90.0..=90.0).contains(&latitude) {
        return Err(CodecError::OutOfRange {
            longitude,
            latitude,
        });
    }

    Ok(Some(geo::Point::new(longitude, latitude)))
}
