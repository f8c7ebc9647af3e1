//! assembler.rs — AIVDM fragment header and multi-fragment assembly
//!
//! One `Assembler` per connection: batches are keyed by group id only, so
//! fragments from different connections can never interleave.

use std::collections::hash_map::Entry;
use std::collections::HashMap;

use bitvec::prelude::*;

use crate::ais::sixbit::unarmor;
use crate::error::ParseError;

/// One `AIVDM` sentence body, fields split out.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VdmFragment {
    pub total: u8,
    pub seq: u8,
    /// Batch id digit; single-fragment messages usually leave it empty.
    pub group: Option<u8>,
    pub channel: String,
    pub payload: String,
    pub fill_bits: u8,
}

impl VdmFragment {
    /// Parse a verified sentence body of the form
    /// `AIVDM,<total>,<seq>,<group>,<channel>,<payload>,<fill>`.
    pub fn parse(body: &str) -> Result<Self, ParseError> {
        let parts: Vec<&str> = body.split(',').collect();
        if parts.len() < 7 {
            return Err(ParseError::InvalidField(format!(
                "VDM needs 7 fields, got {}",
                parts.len()
            )));
        }
        let total: u8 = parts[1]
            .parse()
            .map_err(|_| ParseError::InvalidField(format!("fragment total {:?}", parts[1])))?;
        let seq: u8 = parts[2]
            .parse()
            .map_err(|_| ParseError::InvalidField(format!("fragment seq {:?}", parts[2])))?;
        let group = match parts[3] {
            "" => None,
            g => Some(
                g.parse::<u8>()
                    .ok()
                    .filter(|d| *d <= 9)
                    .ok_or_else(|| ParseError::InvalidField(format!("group id {g:?}")))?,
            ),
        };
        let fill_bits: u8 = parts[6]
            .parse()
            .map_err(|_| ParseError::InvalidField(format!("fill bits {:?}", parts[6])))?;
        if fill_bits > 5 {
            return Err(ParseError::InvalidField(format!("fill bits {fill_bits}")));
        }
        if total == 0 || seq == 0 || seq > total {
            return Err(ParseError::InvalidField(format!(
                "fragment {seq}/{total} out of range"
            )));
        }
        Ok(VdmFragment {
            total,
            seq,
            group,
            channel: parts[4].to_string(),
            payload: parts[5].to_string(),
            fill_bits,
        })
    }

    /// Build the sentence body a producer transmits (the framer adds `!`
    /// and the checksum trailer).
    pub fn build_body(total: u8, seq: u8, group: Option<u8>, payload: &str) -> String {
        let group = group.map(|g| g.to_string()).unwrap_or_default();
        format!("AIVDM,{total},{seq},{group},A,{payload},0")
    }
}

#[derive(Debug)]
struct Partial {
    total: u8,
    next_seq: u8,
    payload: String,
}

/// Reassembles multi-fragment AIVDM batches for one connection.
///
/// Fragments must arrive in sequence order; a skip or an out-of-order
/// arrival invalidates the whole group. A single-fragment message reusing
/// a pending group id resets that group's cache.
#[derive(Debug, Default)]
pub struct Assembler {
    partial: HashMap<Option<u8>, Partial>,
}

impl Assembler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Feed one fragment. Returns the assembled payload bits once the final
    /// fragment of a batch (or a single-fragment message) completes.
    pub fn feed(&mut self, frag: &VdmFragment) -> Result<Option<BitVec<u8, Msb0>>, ParseError> {
        if frag.total == 1 {
            self.partial.remove(&frag.group);
            return Ok(Some(unarmor(&frag.payload)?));
        }

        if frag.seq == 1 {
            // A new batch start always wins over anything pending
            if let Some(stale) = self.partial.insert(
                frag.group,
                Partial {
                    total: frag.total,
                    next_seq: 2,
                    payload: frag.payload.clone(),
                },
            ) {
                tracing::debug!(
                    "discarding stale partial batch (group {:?}, {} chars)",
                    frag.group,
                    stale.payload.len()
                );
            }
            return Ok(None);
        }

        match self.partial.entry(frag.group) {
            Entry::Occupied(mut pending) => {
                let p = pending.get_mut();
                if p.total != frag.total || p.next_seq != frag.seq {
                    pending.remove();
                    return Err(ParseError::FragmentGap(format!(
                        "fragment {}/{} breaks pending batch (group {:?})",
                        frag.seq, frag.total, frag.group
                    )));
                }
                p.payload.push_str(&frag.payload);
                p.next_seq += 1;
                if frag.seq == frag.total {
                    let complete = pending.remove().payload;
                    Ok(Some(unarmor(&complete)?))
                } else {
                    Ok(None)
                }
            }
            Entry::Vacant(_) => Err(ParseError::FragmentGap(format!(
                "fragment {}/{} without predecessor (group {:?})",
                frag.seq, frag.total, frag.group
            ))),
        }
    }
}
