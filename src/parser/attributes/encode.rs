//! Path attribute encoding in the canonical emission order.
//!
//! The fixed order keeps encodings byte-for-byte reproducible, which both
//! eases interop and lets raw-byte cache keys stay stable across peers.
use bytes::{BufMut, Bytes, BytesMut};
use log::warn;

use crate::models::*;

/// Write one TLV. Known attributes pass canonical flags and get the
/// extended length form only when the value demands it; unknown attributes
/// pass their stored flags, so an extended-length encoding they arrived
/// with survives bit-identically.
fn put_attribute(out: &mut BytesMut, flags: AttrFlags, code: u8, value: &[u8]) {
    let extended = flags.contains(AttrFlags::EXTENDED) || value.len() > 255;
    match extended {
        true => {
            out.put_u8((flags | AttrFlags::EXTENDED).bits());
            out.put_u8(code);
            out.put_u16(value.len() as u16);
        }
        false => {
            out.put_u8(flags.bits());
            out.put_u8(code);
            out.put_u8(value.len() as u8);
        }
    }
    out.put_slice(value);
}

/// AS_PATH towards a peer, honoring its ASN-4 capability.
///
/// An old speaker gets a 2-byte path with AS_TRANS standing in for every
/// ASN that does not fit, followed by an AS4_PATH carrying the real values
/// whenever any substitution happened (RFC 4893 §4.2.2).
fn put_as_path(out: &mut BytesMut, asn4: bool, path: &AsPath) {
    if asn4 {
        put_attribute(out, AttrFlags::TRANSITIVE, 2, &path.encode(true));
        return;
    }

    let mut substituted = false;
    let mut narrow = |asns: &AsnList| -> AsnList {
        asns.iter()
            .map(|asn| match asn.required_len() {
                AsnLength::Bits16 => *asn,
                AsnLength::Bits32 => {
                    substituted = true;
                    Asn::TRANSITION
                }
            })
            .collect()
    };
    let two = AsPath::new(narrow(&path.sequence), narrow(&path.set));

    put_attribute(out, AttrFlags::TRANSITIVE, 2, &two.encode(false));
    if substituted {
        put_attribute(
            out,
            AttrFlags::OPTIONAL | AttrFlags::TRANSITIVE,
            17,
            &path.encode(true),
        );
    }
}

/// AGGREGATOR in the peer-appropriate width; towards an old speaker whose
/// aggregating ASN does not fit 16 bits, AS_TRANS goes into AGGREGATOR and
/// the real ASN follows in AS4_AGGREGATOR.
fn put_aggregator(out: &mut BytesMut, asn4: bool, aggregator: &Aggregator) {
    let flags = AttrFlags::OPTIONAL | AttrFlags::TRANSITIVE;
    if asn4 {
        put_attribute(out, flags, 7, &aggregator.encode(AsnLength::Bits32));
        return;
    }
    match aggregator.asn.required_len() {
        AsnLength::Bits16 => {
            put_attribute(out, flags, 7, &aggregator.encode(AsnLength::Bits16));
        }
        AsnLength::Bits32 => {
            let transition = Aggregator::new(Asn::TRANSITION, aggregator.id);
            put_attribute(out, flags, 7, &transition.encode(AsnLength::Bits16));
            put_attribute(out, flags, 18, &aggregator.encode(AsnLength::Bits32));
        }
    }
}

/// Encode an attribute set for a peer.
///
/// `asn4` is the peer's 4-byte ASN capability; `ibgp` is derived from the
/// ASN pair. With `autocomplete`, locally generated sets get the mandatory
/// ORIGIN and AS_PATH filled in; without it, a set lacking an AS_PATH is
/// emitted as-is (re-encoding a received set must reproduce exactly what
/// was stored).
pub fn encode_attributes(
    set: &AttributeSet,
    asn4: bool,
    local_asn: Asn,
    peer_asn: Asn,
    autocomplete: bool,
) -> Bytes {
    let ibgp = local_asn == peer_asn;
    let mut out = BytesMut::new();

    match set.get(AttrType::ORIGIN) {
        Some(value) => put_attribute(&mut out, value.flags(), 1, &value.encode_value()),
        None if autocomplete => {
            put_attribute(&mut out, AttrFlags::TRANSITIVE, 1, &[u8::from(Origin::IGP)]);
        }
        None => {}
    }

    match set.get(AttrType::AS_PATH) {
        Some(AttributeValue::AsPath(path)) => put_as_path(&mut out, asn4, path),
        _ if autocomplete => {
            let path = match ibgp {
                true => AsPath::new(AsnList::new(), AsnList::new()),
                false => AsPath::from_sequence([local_asn.to_u32()]),
            };
            put_as_path(&mut out, asn4, &path);
        }
        _ => warn!("encoding an update without an AS_PATH"),
    }

    if let Some(AttributeValue::NextHop(next_hop)) = set.get(AttrType::NEXT_HOP) {
        // ipv6 and VPN next hops travel inside MP_REACH_NLRI instead
        if next_hop.afi == Afi::Ipv4 && next_hop.safi != Safi::MplsVpn {
            put_attribute(&mut out, AttrFlags::TRANSITIVE, 3, &next_hop.encode());
        }
    }

    if let Some(value) = set.get(AttrType::MULTI_EXIT_DISCRIMINATOR) {
        put_attribute(&mut out, value.flags(), 4, &value.encode_value());
    }

    if ibgp {
        let local_pref = match set.get(AttrType::LOCAL_PREFERENCE) {
            Some(value) => value.encode_value(),
            None => Bytes::from_static(&[0, 0, 0, 100]),
        };
        put_attribute(&mut out, AttrFlags::TRANSITIVE, 5, &local_pref);
    }

    if let Some(AttributeValue::Aggregator(aggregator)) = set.get(AttrType::AGGREGATOR) {
        put_aggregator(&mut out, asn4, aggregator);
    }

    for ty in [
        AttrType::ATOMIC_AGGREGATE,
        AttrType::COMMUNITIES,
        AttrType::ORIGINATOR_ID,
        AttrType::CLUSTER_LIST,
        AttrType::EXTENDED_COMMUNITIES,
    ] {
        if let Some(stored) = set.get_stored(ty) {
            let code = ty.wire_code().unwrap_or_default();
            for value in stored.iter() {
                put_attribute(&mut out, value.flags(), code, &value.encode_value());
            }
        }
    }

    // whatever is left, in id order; internal markers never reach the wire
    const ORDERED: [AttrType; 11] = [
        AttrType::ORIGIN,
        AttrType::AS_PATH,
        AttrType::NEXT_HOP,
        AttrType::MULTI_EXIT_DISCRIMINATOR,
        AttrType::LOCAL_PREFERENCE,
        AttrType::AGGREGATOR,
        AttrType::ATOMIC_AGGREGATE,
        AttrType::COMMUNITIES,
        AttrType::ORIGINATOR_ID,
        AttrType::CLUSTER_LIST,
        AttrType::EXTENDED_COMMUNITIES,
    ];
    for (ty, stored) in set.iter() {
        if ty.is_internal() || ORDERED.contains(&ty) {
            continue;
        }
        let Some(code) = ty.wire_code() else { continue };
        for value in stored.iter() {
            put_attribute(&mut out, value.flags(), code, &value.encode_value());
        }
    }

    out.freeze()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::net::Ipv4Addr;

    fn encode(set: &AttributeSet, asn4: bool) -> Bytes {
        encode_attributes(set, asn4, Asn::new_32bit(65000), Asn::new_32bit(64999), false)
    }

    #[test]
    fn test_encode_origin_alone() {
        let mut set = AttributeSet::new();
        set.insert(AttributeValue::Origin(Origin::IGP));
        assert_eq!(
            encode(&set, true),
            Bytes::from_static(&[0x40, 0x01, 0x01, 0x00])
        );
    }

    #[test]
    fn test_encode_atomic_aggregate_alone() {
        let mut set = AttributeSet::new();
        set.insert(AttributeValue::AtomicAggregate);
        assert_eq!(encode(&set, true), Bytes::from_static(&[0x40, 0x06, 0x00]));
    }

    #[test]
    fn test_as_trans_substitution() {
        let mut set = AttributeSet::new();
        set.insert(AttributeValue::AsPath(AsPath::from_sequence([65540, 100])));
        let bytes = encode(&set, false);
        assert_eq!(
            bytes,
            Bytes::from_static(&[
                0x40, 0x02, 0x06, 0x02, 0x02, 0x5B, 0xA0, 0x00, 0x64, // AS_TRANS, 100
                0xC0, 0x11, 0x0A, 0x02, 0x02, 0x00, 0x01, 0x00, 0x04, 0x00, 0x00, 0x00,
                0x64, // the real path
            ])
        );
    }

    #[test]
    fn test_no_as4_path_when_everything_fits() {
        let mut set = AttributeSet::new();
        set.insert(AttributeValue::AsPath(AsPath::from_sequence([100, 200])));
        let bytes = encode(&set, false);
        assert_eq!(
            bytes,
            Bytes::from_static(&[0x40, 0x02, 0x06, 0x02, 0x02, 0x00, 0x64, 0x00, 0xC8])
        );
    }

    #[test]
    fn test_autocomplete_ebgp() {
        let set = AttributeSet::new();
        let bytes = encode_attributes(
            &set,
            true,
            Asn::new_32bit(65000),
            Asn::new_32bit(64999),
            true,
        );
        assert_eq!(
            bytes,
            Bytes::from_static(&[
                0x40, 0x01, 0x01, 0x00, // ORIGIN IGP
                0x40, 0x02, 0x06, 0x02, 0x01, 0x00, 0x00, 0xFD, 0xE8, // AS_PATH [65000]
            ])
        );
    }

    #[test]
    fn test_autocomplete_ibgp_adds_empty_path_and_local_pref() {
        let set = AttributeSet::new();
        let bytes = encode_attributes(
            &set,
            true,
            Asn::new_32bit(65000),
            Asn::new_32bit(65000),
            true,
        );
        assert_eq!(
            bytes,
            Bytes::from_static(&[
                0x40, 0x01, 0x01, 0x00, // ORIGIN IGP
                0x40, 0x02, 0x00, // empty AS_PATH
                0x40, 0x05, 0x04, 0x00, 0x00, 0x00, 0x64, // LOCAL_PREF 100
            ])
        );
    }

    #[test]
    fn test_local_pref_skipped_for_ebgp() {
        let mut set = AttributeSet::new();
        set.insert(AttributeValue::LocalPreference(300));
        assert!(encode(&set, true).is_empty());
    }

    #[test]
    fn test_aggregator_widths() {
        let mut set = AttributeSet::new();
        set.insert(AttributeValue::Aggregator(Aggregator::new(
            Asn::new_32bit(65540),
            Ipv4Addr::new(10, 0, 0, 1),
        )));

        assert_eq!(
            encode(&set, true),
            Bytes::from_static(&[0xC0, 0x07, 0x08, 0x00, 0x01, 0x00, 0x04, 10, 0, 0, 1])
        );
        // 2-byte peers get AS_TRANS plus AS4_AGGREGATOR
        assert_eq!(
            encode(&set, false),
            Bytes::from_static(&[
                0xC0, 0x07, 0x06, 0x5B, 0xA0, 10, 0, 0, 1, // AGGREGATOR AS_TRANS
                0xC0, 0x12, 0x08, 0x00, 0x01, 0x00, 0x04, 10, 0, 0, 1, // AS4_AGGREGATOR
            ])
        );
    }

    #[test]
    fn test_fixed_order_and_trailing_ids() {
        let mut set = AttributeSet::new();
        set.insert(AttributeValue::Unknown(AttrRaw {
            code: 0x63,
            flags: AttrFlags::OPTIONAL | AttrFlags::TRANSITIVE,
            bytes: Bytes::from_static(&[0xBE, 0xEF]),
        }));
        set.insert(AttributeValue::Communities(Communities(vec![Community(
            0xFFFFFF01,
        )])));
        set.insert(AttributeValue::Origin(Origin::INCOMPLETE));
        let bytes = encode(&set, true);
        assert_eq!(
            bytes,
            Bytes::from_static(&[
                0x40, 0x01, 0x01, 0x02, // ORIGIN
                0xC0, 0x08, 0x04, 0xFF, 0xFF, 0xFF, 0x01, // COMMUNITY
                0xC0, 0x63, 0x02, 0xBE, 0xEF, // unknown transitive
            ])
        );
    }

    #[test]
    fn test_unknown_extended_length_preserved() {
        let mut set = AttributeSet::new();
        set.insert(AttributeValue::Unknown(AttrRaw {
            code: 0x63,
            flags: AttrFlags::from_bits_retain(0xD0),
            bytes: Bytes::from_static(&[0x01]),
        }));
        assert_eq!(
            encode(&set, true),
            Bytes::from_static(&[0xD0, 0x63, 0x00, 0x01, 0x01])
        );
    }
}
