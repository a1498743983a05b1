//! BGP path attribute value types.
mod aggregator;
mod aspath;
mod cluster;
mod community;
mod origin;
mod set;

use crate::models::network::*;
use bitflags::bitflags;
use bytes::{BufMut, Bytes, BytesMut};
use std::fmt::{Display, Formatter};
use std::net::Ipv4Addr;

pub use aggregator::*;
pub use aspath::*;
pub use cluster::*;
pub use community::*;
pub use origin::*;
pub use set::*;

bitflags! {
    /// The Attribute Flags octet (RFC 4271 §4.3).
    ///
    /// The high-order bit (bit 0) of the Attribute Flags octet is the
    /// Optional bit.  It defines whether the attribute is optional (if
    /// set to 1) or well-known (if set to 0).
    ///
    /// The second high-order bit (bit 1) of the Attribute Flags octet
    /// is the Transitive bit.  It defines whether an optional
    /// attribute is transitive (if set to 1) or non-transitive (if set
    /// to 0).
    ///
    /// The third high-order bit (bit 2) is the Partial bit, and the fourth
    /// (bit 3) the Extended Length bit selecting a two-octet attribute
    /// length. The low-order bits are reserved and preserved verbatim.
    #[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
    pub struct AttrFlags: u8 {
        const OPTIONAL   = 0b10000000;
        const TRANSITIVE = 0b01000000;
        const PARTIAL    = 0b00100000;
        const EXTENDED   = 0b00010000;
    }
}

/// Attribute type codes.
///
/// Wire codes are preserved verbatim: `From<u8>` never fails, unhandled
/// codes land in [AttrType::Unknown]. The three internal markers have no
/// wire code at all; they live above the 8-bit space and serializers skip
/// them.
#[allow(non_camel_case_types)]
#[derive(Debug, PartialEq, Eq, Hash, Copy, Clone)]
pub enum AttrType {
    ORIGIN,
    AS_PATH,
    NEXT_HOP,
    MULTI_EXIT_DISCRIMINATOR,
    LOCAL_PREFERENCE,
    ATOMIC_AGGREGATE,
    AGGREGATOR,
    COMMUNITIES,
    /// <https://tools.ietf.org/html/rfc4456>
    ORIGINATOR_ID,
    CLUSTER_LIST,
    /// <https://tools.ietf.org/html/rfc4760>
    MP_REACHABLE_NLRI,
    MP_UNREACHABLE_NLRI,
    /// <https://datatracker.ietf.org/doc/html/rfc4360>
    EXTENDED_COMMUNITIES,
    AS4_PATH,
    AS4_AGGREGATOR,
    /// Internal marker for split announcements; never on the wire.
    Split,
    /// Internal marker for watchdog-controlled routes; never on the wire.
    Watchdog,
    /// Internal marker for watchdog withdraws; never on the wire.
    Withdraw,
    /// Catch all for any unknown attribute types
    Unknown(u8),
}

impl From<u8> for AttrType {
    fn from(value: u8) -> Self {
        match value {
            1 => AttrType::ORIGIN,
            2 => AttrType::AS_PATH,
            3 => AttrType::NEXT_HOP,
            4 => AttrType::MULTI_EXIT_DISCRIMINATOR,
            5 => AttrType::LOCAL_PREFERENCE,
            6 => AttrType::ATOMIC_AGGREGATE,
            7 => AttrType::AGGREGATOR,
            8 => AttrType::COMMUNITIES,
            9 => AttrType::ORIGINATOR_ID,
            10 => AttrType::CLUSTER_LIST,
            14 => AttrType::MP_REACHABLE_NLRI,
            15 => AttrType::MP_UNREACHABLE_NLRI,
            16 => AttrType::EXTENDED_COMMUNITIES,
            17 => AttrType::AS4_PATH,
            18 => AttrType::AS4_AGGREGATOR,
            x => AttrType::Unknown(x),
        }
    }
}

impl AttrType {
    /// The wire type code, or `None` for the internal markers.
    pub const fn wire_code(&self) -> Option<u8> {
        match self {
            AttrType::ORIGIN => Some(1),
            AttrType::AS_PATH => Some(2),
            AttrType::NEXT_HOP => Some(3),
            AttrType::MULTI_EXIT_DISCRIMINATOR => Some(4),
            AttrType::LOCAL_PREFERENCE => Some(5),
            AttrType::ATOMIC_AGGREGATE => Some(6),
            AttrType::AGGREGATOR => Some(7),
            AttrType::COMMUNITIES => Some(8),
            AttrType::ORIGINATOR_ID => Some(9),
            AttrType::CLUSTER_LIST => Some(10),
            AttrType::MP_REACHABLE_NLRI => Some(14),
            AttrType::MP_UNREACHABLE_NLRI => Some(15),
            AttrType::EXTENDED_COMMUNITIES => Some(16),
            AttrType::AS4_PATH => Some(17),
            AttrType::AS4_AGGREGATOR => Some(18),
            AttrType::Split | AttrType::Watchdog | AttrType::Withdraw => None,
            AttrType::Unknown(x) => Some(*x),
        }
    }

    pub const fn is_internal(&self) -> bool {
        matches!(self, AttrType::Split | AttrType::Watchdog | AttrType::Withdraw)
    }

    /// Whether a set may hold several values under this id. None of the
    /// standard attributes are multi-valued; the hook exists for future
    /// duplicate-tolerant ids.
    pub const fn is_multiple(&self) -> bool {
        false
    }

    /// Slot in the fixed attribute table: wire codes map to themselves, the
    /// internal markers live above them.
    pub(crate) const fn index(&self) -> usize {
        match self.wire_code() {
            Some(code) => code as usize,
            None => match self {
                AttrType::Split => 256,
                AttrType::Watchdog => 257,
                _ => 258,
            },
        }
    }

    pub(crate) fn from_index(index: usize) -> AttrType {
        match index {
            0..=255 => AttrType::from(index as u8),
            256 => AttrType::Split,
            257 => AttrType::Watchdog,
            _ => AttrType::Withdraw,
        }
    }

    /// Name used by the textual and JSON renderings; ids without one render
    /// through the generic `attribute [ .. ]` form.
    pub(crate) const fn repr_name(&self) -> Option<&'static str> {
        match self {
            AttrType::ORIGIN => Some("origin"),
            AttrType::AS_PATH => Some("as-path"),
            AttrType::NEXT_HOP => Some("next-hop"),
            AttrType::MULTI_EXIT_DISCRIMINATOR => Some("med"),
            AttrType::LOCAL_PREFERENCE => Some("local-preference"),
            AttrType::ATOMIC_AGGREGATE => Some("atomic-aggregate"),
            AttrType::AGGREGATOR => Some("aggregator"),
            AttrType::COMMUNITIES => Some("community"),
            AttrType::ORIGINATOR_ID => Some("originator-id"),
            AttrType::CLUSTER_LIST => Some("cluster-list"),
            AttrType::EXTENDED_COMMUNITIES => Some("extended-community"),
            _ => None,
        }
    }
}

/// Raw payload of an attribute the codec has no model for. Only transitive
/// unknowns are retained, and they re-encode bit-identically.
#[derive(Debug, PartialEq, Eq, Clone)]
pub struct AttrRaw {
    pub code: u8,
    pub flags: AttrFlags,
    pub bytes: Bytes,
}

/// The `AttributeValue` enum represents the different kinds of attribute
/// values.
#[derive(Debug, PartialEq, Eq, Clone)]
pub enum AttributeValue {
    Origin(Origin),
    AsPath(AsPath),
    As4Path(AsPath),
    NextHop(NextHop),
    MultiExitDiscriminator(u32),
    LocalPreference(u32),
    AtomicAggregate,
    Aggregator(Aggregator),
    Communities(Communities),
    OriginatorId(Ipv4Addr),
    ClusterList(ClusterList),
    ExtendedCommunities(ExtendedCommunities),
    Unknown(AttrRaw),
}

impl AttributeValue {
    pub fn attr_type(&self) -> AttrType {
        match self {
            AttributeValue::Origin(_) => AttrType::ORIGIN,
            AttributeValue::AsPath(_) => AttrType::AS_PATH,
            AttributeValue::As4Path(_) => AttrType::AS4_PATH,
            AttributeValue::NextHop(_) => AttrType::NEXT_HOP,
            AttributeValue::MultiExitDiscriminator(_) => AttrType::MULTI_EXIT_DISCRIMINATOR,
            AttributeValue::LocalPreference(_) => AttrType::LOCAL_PREFERENCE,
            AttributeValue::AtomicAggregate => AttrType::ATOMIC_AGGREGATE,
            AttributeValue::Aggregator(_) => AttrType::AGGREGATOR,
            AttributeValue::Communities(_) => AttrType::COMMUNITIES,
            AttributeValue::OriginatorId(_) => AttrType::ORIGINATOR_ID,
            AttributeValue::ClusterList(_) => AttrType::CLUSTER_LIST,
            AttributeValue::ExtendedCommunities(_) => AttrType::EXTENDED_COMMUNITIES,
            AttributeValue::Unknown(raw) => AttrType::from(raw.code),
        }
    }

    /// Canonical flag octet for this attribute on the wire. Unknown
    /// attributes keep the flags they arrived with.
    pub fn flags(&self) -> AttrFlags {
        match self {
            AttributeValue::Origin(_)
            | AttributeValue::AsPath(_)
            | AttributeValue::NextHop(_)
            | AttributeValue::LocalPreference(_)
            | AttributeValue::AtomicAggregate => AttrFlags::TRANSITIVE,
            AttributeValue::MultiExitDiscriminator(_)
            | AttributeValue::OriginatorId(_)
            | AttributeValue::ClusterList(_) => AttrFlags::OPTIONAL,
            AttributeValue::As4Path(_)
            | AttributeValue::Aggregator(_)
            | AttributeValue::Communities(_)
            | AttributeValue::ExtendedCommunities(_) => {
                AttrFlags::OPTIONAL | AttrFlags::TRANSITIVE
            }
            AttributeValue::Unknown(raw) => raw.flags,
        }
    }

    /// Canonical value bytes, without the TLV header.
    ///
    /// AS paths encode with 4-byte ASNs here; the peer-width handling for
    /// AS_PATH lives in the encoder, which never reaches this generic form
    /// for it.
    pub fn encode_value(&self) -> Bytes {
        match self {
            AttributeValue::Origin(origin) => Bytes::from(vec![u8::from(*origin)]),
            AttributeValue::AsPath(path) | AttributeValue::As4Path(path) => path.encode(true),
            AttributeValue::NextHop(next_hop) => next_hop.encode(),
            AttributeValue::MultiExitDiscriminator(value)
            | AttributeValue::LocalPreference(value) => {
                let mut bytes = BytesMut::with_capacity(4);
                bytes.put_u32(*value);
                bytes.freeze()
            }
            AttributeValue::AtomicAggregate => Bytes::new(),
            AttributeValue::Aggregator(aggregator) => {
                aggregator.encode(aggregator.asn.required_len())
            }
            AttributeValue::Communities(communities) => communities.encode(),
            AttributeValue::OriginatorId(id) => {
                let mut bytes = BytesMut::with_capacity(4);
                bytes.put_u32((*id).into());
                bytes.freeze()
            }
            AttributeValue::ClusterList(clusters) => clusters.encode(),
            AttributeValue::ExtendedCommunities(communities) => communities.encode(),
            AttributeValue::Unknown(raw) => raw.bytes.clone(),
        }
    }
}

impl Display for AttributeValue {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            AttributeValue::Origin(origin) => write!(f, "{origin}"),
            AttributeValue::AsPath(path) | AttributeValue::As4Path(path) => write!(f, "{path}"),
            AttributeValue::NextHop(next_hop) => write!(f, "{next_hop}"),
            AttributeValue::MultiExitDiscriminator(value)
            | AttributeValue::LocalPreference(value) => write!(f, "{value}"),
            AttributeValue::AtomicAggregate => Ok(()),
            AttributeValue::Aggregator(aggregator) => write!(f, "{aggregator}"),
            AttributeValue::Communities(communities) => write!(f, "{communities}"),
            AttributeValue::OriginatorId(id) => write!(f, "{id}"),
            AttributeValue::ClusterList(clusters) => write!(f, "{clusters}"),
            AttributeValue::ExtendedCommunities(communities) => write!(f, "{communities}"),
            AttributeValue::Unknown(raw) => {
                write!(f, "0x")?;
                for byte in raw.bytes.iter() {
                    write!(f, "{byte:02X}")?;
                }
                Ok(())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_attr_type_round_trip() {
        for code in 0u8..=255 {
            let ty = AttrType::from(code);
            assert_eq!(ty.wire_code(), Some(code));
            assert_eq!(ty.index(), code as usize);
            assert_eq!(AttrType::from_index(ty.index()), ty);
        }
    }

    #[test]
    fn test_internal_markers() {
        for ty in [AttrType::Split, AttrType::Watchdog, AttrType::Withdraw] {
            assert!(ty.is_internal());
            assert_eq!(ty.wire_code(), None);
            assert_eq!(AttrType::from_index(ty.index()), ty);
        }
        assert!(!AttrType::ORIGIN.is_internal());
    }

    #[test]
    fn test_flags_octets() {
        assert_eq!(AttributeValue::Origin(Origin::IGP).flags().bits(), 0x40);
        assert_eq!(
            AttributeValue::MultiExitDiscriminator(0).flags().bits(),
            0x80
        );
        assert_eq!(
            AttributeValue::Communities(Communities::default())
                .flags()
                .bits(),
            0xC0
        );
    }

    #[test]
    fn test_encode_value() {
        assert_eq!(
            AttributeValue::Origin(Origin::EGP).encode_value(),
            Bytes::from_static(&[1])
        );
        assert_eq!(
            AttributeValue::MultiExitDiscriminator(100).encode_value(),
            Bytes::from_static(&[0, 0, 0, 100])
        );
        assert!(AttributeValue::AtomicAggregate.encode_value().is_empty());
    }
}
