//! AIVDM codec: 6-bit armor, bit-exact Message 1 / Message 5 payloads and
//! multi-fragment assembly.

pub mod assembler;
pub mod msg1;
pub mod msg5;
pub mod sixbit;
pub mod wire;

use bitvec::prelude::*;

use crate::error::ParseError;
use crate::identity::VesselIdentity;
use msg1::PositionReport;

/// An assembled AIS message this receiver understands.
#[derive(Debug, Clone, PartialEq)]
pub enum AisMessage {
    /// Types 1, 2 and 3 share the position-report layout.
    Position(PositionReport),
    /// Type 5.
    StaticVoyage(VesselIdentity),
}

/// Dispatch an assembled payload on its 6-bit type field.
pub fn decode(bv: &BitSlice<u8, Msb0>) -> Result<AisMessage, ParseError> {
    match wire::pick_u64(bv, 0, 6) {
        1 | 2 | 3 => Ok(AisMessage::Position(PositionReport::decode(bv)?)),
        5 => Ok(AisMessage::StaticVoyage(msg5::decode(bv)?)),
        other => Err(ParseError::UnsupportedMessage(other)),
    }
}
