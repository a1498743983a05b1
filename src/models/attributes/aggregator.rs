use crate::models::network::{Asn, AsnLength};
use bytes::{BufMut, Bytes, BytesMut};
use std::fmt::{Display, Formatter};
use std::net::Ipv4Addr;

/// AGGREGATOR / AS4_AGGREGATOR value: the aggregating speaker's ASN and its
/// BGP identifier.
#[derive(Debug, PartialEq, Eq, Hash, Copy, Clone)]
pub struct Aggregator {
    pub asn: Asn,
    pub id: Ipv4Addr,
}

impl Aggregator {
    pub fn new(asn: Asn, id: Ipv4Addr) -> Aggregator {
        Aggregator { asn, id }
    }

    /// Encode with the requested ASN width. The 2-byte form truncates; the
    /// caller substitutes AS_TRANS first when the ASN does not fit.
    pub fn encode(&self, width: AsnLength) -> Bytes {
        let mut bytes = BytesMut::with_capacity(if width.is_four_byte() { 8 } else { 6 });
        match width {
            AsnLength::Bits16 => bytes.put_u16(self.asn.to_u32() as u16),
            AsnLength::Bits32 => bytes.put_u32(self.asn.to_u32()),
        }
        bytes.put_u32(self.id.into());
        bytes.freeze()
    }
}

impl Display for Aggregator {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{}", self.asn, self.id)
    }
}
