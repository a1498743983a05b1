use crate::error::UpdateError;
use crate::models::*;
use bytes::{Buf, Bytes};

/// Parse an AS_PATH or AS4_PATH segment stream with the given ASN width.
///
/// ```text
/// AS_PATH is a well-known mandatory attribute that is composed
/// of a sequence of AS path segments.  Each AS path segment is
/// represented by a triple <path segment type, path segment
/// length, path segment value>.
/// ```
///
/// The raw payload is retained on the returned path as its interning index.
pub fn parse_as_path(input: Bytes, width: AsnLength) -> Result<AsPath, UpdateError> {
    let index = input.clone();
    let mut data = input;
    let mut sequence = AsnList::new();
    let mut set = AsnList::new();

    while data.has_remaining() {
        if data.remaining() < 2 {
            return Err(UpdateError::MalformedAsPath(
                "not enough data to decode AS_PATH or AS4_PATH".to_string(),
            ));
        }
        let segment_type = data.get_u8();
        let count = data.get_u8() as usize;
        let asns = match segment_type {
            AS_SET => &mut set,
            AS_SEQUENCE => &mut sequence,
            other => {
                return Err(UpdateError::MalformedAsPath(format!(
                    "invalid AS Path type sent {other}"
                )))
            }
        };

        let asn_size = match width {
            AsnLength::Bits16 => 2,
            AsnLength::Bits32 => 4,
        };
        if data.remaining() < count * asn_size {
            return Err(UpdateError::MalformedAsPath(
                "not enough data to decode AS_PATH or AS4_PATH".to_string(),
            ));
        }
        for _ in 0..count {
            asns.push(match width {
                AsnLength::Bits16 => Asn::new_16bit(data.get_u16()),
                AsnLength::Bits32 => Asn::new_32bit(data.get_u32()),
            });
        }
    }

    Ok(AsPath::with_index(sequence, set, index))
}
