//! # nmea-core
//!
//! Shared protocol and geometry layer for the NMEA simulation suite:
//! spherical geodesy in nautical miles, NMEA 0183 framing with XOR
//! checksums, talker sentence build/parse, and the bit-exact AIVDM codec
//! for AIS Message 1 and Message 5 including multi-fragment assembly.
//!
//! The simulator crate uses the encode half, the mini-ECDIS receiver the
//! decode half; both share the same field tables so the wire format can
//! never drift between them.

pub mod ais;
pub mod error;
pub mod frame;
pub mod geo;
pub mod identity;
pub mod sentences;

pub use error::ParseError;
pub use geo::Point;
