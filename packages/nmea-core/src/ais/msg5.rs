//! msg5.rs — AIS Message 5, static and voyage related data (424 bits)
//!
//! The 424 bits armor into 71 characters; producers split the payload at the
//! 56-character boundary into a 1/2 + 2/2 fragment pair.

use bitvec::prelude::*;

use crate::ais::sixbit::armor;
use crate::ais::wire::{pick_string, pick_u64, put_str, put_u64};
use crate::error::ParseError;
use crate::identity::{Eta, VesselIdentity};

const MSG5_BITS: usize = 424;

/// Character offset where the armored payload is split into two fragments.
pub const FRAGMENT_SPLIT: usize = 56;

/// Pack the static/voyage block into its two armored fragment payloads.
pub fn encode(identity: &VesselIdentity) -> (String, String) {
    let mut bv: BitVec<u8, Msb0> = BitVec::with_capacity(MSG5_BITS);
    put_u64(&mut bv, 5, 6); // type
    put_u64(&mut bv, 0, 2); // repeat
    put_u64(&mut bv, identity.mmsi as u64, 30);
    put_u64(&mut bv, 0, 2); // AIS version
    put_u64(&mut bv, 0, 30); // IMO number
    put_str(&mut bv, &identity.call_sign, 42);
    put_str(&mut bv, &identity.name, 120);
    put_u64(&mut bv, identity.ship_type as u64, 8);
    put_u64(&mut bv, identity.dim_a as u64, 9);
    put_u64(&mut bv, identity.dim_b as u64, 9);
    put_u64(&mut bv, identity.dim_c as u64, 6);
    put_u64(&mut bv, identity.dim_d as u64, 6);
    put_u64(&mut bv, 0, 4); // EPFD type
    match identity.eta {
        Some(eta) => {
            put_u64(&mut bv, eta.month as u64, 4);
            put_u64(&mut bv, eta.day as u64, 5);
            put_u64(&mut bv, eta.hour as u64, 5);
            put_u64(&mut bv, eta.minute as u64, 6);
        }
        None => {
            put_u64(&mut bv, 0, 4);
            put_u64(&mut bv, 0, 5);
            put_u64(&mut bv, 24, 5);
            put_u64(&mut bv, 60, 6);
        }
    }
    put_u64(&mut bv, (identity.draught_m * 10.0).round() as u64, 8);
    put_str(&mut bv, &identity.destination, 120);
    put_u64(&mut bv, 0, 1); // DTE
    put_u64(&mut bv, 0, 1); // spare
    debug_assert_eq!(bv.len(), MSG5_BITS);

    let payload = armor(&bv);
    let (head, tail) = payload.split_at(FRAGMENT_SPLIT);
    (head.to_string(), tail.to_string())
}

/// Unpack an assembled Message 5 payload. The caller has already verified
/// the message type is 5.
pub fn decode(bv: &BitSlice<u8, Msb0>) -> Result<VesselIdentity, ParseError> {
    if bv.len() < MSG5_BITS {
        return Err(ParseError::PayloadTruncated(format!(
            "message 5 needs {MSG5_BITS} bits, got {}",
            bv.len()
        )));
    }
    let month = pick_u64(bv, 274, 4) as u8;
    let day = pick_u64(bv, 278, 5) as u8;
    let hour = pick_u64(bv, 283, 5) as u8;
    let minute = pick_u64(bv, 288, 6) as u8;
    let eta = (month > 0 && day > 0 && hour < 24 && minute < 60).then_some(Eta {
        month,
        day,
        hour,
        minute,
    });
    Ok(VesselIdentity {
        mmsi: pick_u64(bv, 8, 30) as u32,
        call_sign: pick_string(bv, 70, 7),
        name: pick_string(bv, 112, 20),
        ship_type: pick_u64(bv, 232, 8) as u8,
        dim_a: pick_u64(bv, 240, 9) as u16,
        dim_b: pick_u64(bv, 249, 9) as u16,
        dim_c: pick_u64(bv, 258, 6) as u16,
        dim_d: pick_u64(bv, 264, 6) as u16,
        eta,
        draught_m: pick_u64(bv, 294, 8) as f64 / 10.0,
        destination: pick_string(bv, 302, 20),
    })
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::ais::sixbit::unarmor;

    fn identity() -> VesselIdentity {
        let (dim_a, dim_b, dim_c, dim_d) = VesselIdentity::dims_from(199, 32);
        VesselIdentity {
            mmsi: 440_962_950,
            name: "HANJIN BUSAN".into(),
            call_sign: "D744096".into(),
            ship_type: 70,
            dim_a,
            dim_b,
            dim_c,
            dim_d,
            draught_m: 10.5,
            destination: "BUSAN NEW PORT".into(),
            eta: Some(Eta {
                month: 8,
                day: 14,
                hour: 6,
                minute: 30,
            }),
        }
    }

    #[test]
    fn fragment_lengths() {
        let (p1, p2) = encode(&identity());
        assert_eq!(p1.len(), 56);
        assert_eq!(p2.len(), 15);
    }

    #[test]
    fn round_trip() {
        let src = identity();
        let (p1, p2) = encode(&src);
        let bits = unarmor(&format!("{p1}{p2}")).unwrap();
        assert_eq!(pick_u64(&bits, 0, 6), 5);
        let decoded = decode(&bits).unwrap();
        assert_eq!(decoded, src);
    }

    #[test]
    fn strings_fold_and_truncate() {
        let mut src = identity();
        src.name = "mv ever given of panama registry".into(); // > 20 chars, lower case
        src.call_sign = "d7abcde9".into(); // > 7 chars
        let (p1, p2) = encode(&src);
        let decoded = decode(&unarmor(&format!("{p1}{p2}")).unwrap()).unwrap();
        assert_eq!(decoded.name, "MV EVER GIVEN OF PAN");
        assert_eq!(decoded.call_sign, "D7ABCDE");
    }

    #[test]
    fn missing_eta_sentinel() {
        let mut src = identity();
        src.eta = None;
        let (p1, p2) = encode(&src);
        let bits = unarmor(&format!("{p1}{p2}")).unwrap();
        assert_eq!(pick_u64(&bits, 274, 4), 0);
        assert_eq!(pick_u64(&bits, 283, 5), 24);
        assert_eq!(pick_u64(&bits, 288, 6), 60);
        assert_eq!(decode(&bits).unwrap().eta, None);
    }

    #[test]
    fn dimension_fields_reconstruct_hull() {
        let (p1, p2) = encode(&identity());
        let decoded = decode(&unarmor(&format!("{p1}{p2}")).unwrap()).unwrap();
        assert_eq!(decoded.length_m(), 199);
        assert_eq!(decoded.beam_m(), 32);
    }
}
