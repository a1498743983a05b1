//! Path attribute decoding: the TLV loop, dispatch to the per-attribute
//! parsers, and AS4 reconciliation.
mod attr_01_origin;
mod attr_02_17_as_path;
mod attr_03_next_hop;
mod attr_04_med;
mod attr_05_local_pref;
mod attr_07_18_aggregator;
mod attr_08_communities;
mod attr_09_originator;
mod attr_10_cluster;
mod attr_14_15_nlri;
mod attr_16_extended_communities;
pub(crate) mod encode;

use bytes::{Buf, BufMut, Bytes, BytesMut};
use log::debug;

use crate::error::UpdateError;
use crate::models::*;
use crate::parser::attributes::attr_01_origin::parse_origin;
use crate::parser::attributes::attr_02_17_as_path::parse_as_path;
use crate::parser::attributes::attr_03_next_hop::parse_next_hop;
use crate::parser::attributes::attr_04_med::parse_med;
use crate::parser::attributes::attr_05_local_pref::parse_local_pref;
use crate::parser::attributes::attr_07_18_aggregator::parse_aggregator;
use crate::parser::attributes::attr_08_communities::parse_communities;
use crate::parser::attributes::attr_09_originator::parse_originator_id;
use crate::parser::attributes::attr_10_cluster::parse_clusters;
use crate::parser::attributes::attr_14_15_nlri::{parse_mp_reach, parse_mp_unreach};
use crate::parser::attributes::attr_16_extended_communities::parse_extended_communities;
use crate::parser::ReadUtils;
use crate::session::{Negotiated, Route, RouteFactory, Withdrawn};

/// Everything one UPDATE's path attribute field decodes into.
#[derive(Debug)]
pub struct ParsedUpdate {
    pub attributes: AttributeSet,
    pub announced: Vec<Route>,
    pub withdrawn: Vec<Withdrawn>,
}

/// Parse the Path Attributes field of an UPDATE message.
///
/// `data` holds the entire attributes section. Multiprotocol NLRI are handed
/// to `factory` and come back through `announced`/`withdrawn`;
/// `cache_attributes` gates writes to the process-wide interning cache.
///
/// Any error aborts the whole UPDATE: no partial attribute set escapes, and
/// the error's [`UpdateError::notification`] pair is what the session layer
/// puts in the NOTIFICATION message.
pub fn parse_attributes(
    mut data: Bytes,
    negotiated: &Negotiated,
    factory: &dyn RouteFactory,
    cache_attributes: bool,
) -> Result<ParsedUpdate, UpdateError> {
    let mut set = AttributeSet::new();
    let mut announced: Vec<Route> = vec![];
    let mut withdrawn: Vec<Withdrawn> = vec![];
    let mut seen_nlri = false;

    while data.has_remaining() {
        let flags = AttrFlags::from_bits_retain(data.read_u8()?);
        let code = data.read_u8()?;
        let length = match flags.contains(AttrFlags::EXTENDED) {
            true => data.read_u16()? as usize,
            false => data.read_u8()? as usize,
        };
        data.has_n_remaining(length)?;
        let attribute = data.split_to(length);
        let ty = AttrType::from(code);

        debug!(
            "parsing flags {:02x} type {:02x} ({:?}) len {:02x}",
            flags.bits(),
            code,
            ty,
            length
        );

        // a non-multiprotocol attribute after an MP one means the set cannot
        // be shared across the routes of other UPDATEs
        if seen_nlri
            && !matches!(
                ty,
                AttrType::MP_REACHABLE_NLRI | AttrType::MP_UNREACHABLE_NLRI
            )
        {
            set.mark_not_cacheable();
        }

        match ty {
            AttrType::ORIGIN => {
                if !set.insert_from_cache(ty, &attribute) {
                    let value = parse_origin(attribute.clone())?;
                    set.insert_cached(value, attribute, cache_attributes);
                }
            }
            AttrType::AS_PATH => {
                // an AS4_PATH promotion may already occupy the slot
                if length > 0 && !set.has(AttrType::AS_PATH) {
                    let key = as_path_cache_key(negotiated.asn4, &attribute);
                    if !set.insert_from_cache(ty, &key) {
                        let width = match negotiated.asn4 {
                            true => AsnLength::Bits32,
                            false => AsnLength::Bits16,
                        };
                        let path = parse_as_path(attribute, width)?;
                        set.insert_cached(AttributeValue::AsPath(path), key, cache_attributes);
                    }
                }
            }
            AttrType::AS4_PATH => {
                // ignore the AS4_PATH on new speakers as required by
                // RFC 4893 section 4.1
                if length > 0 && !negotiated.asn4 {
                    if !set.insert_from_cache(ty, &attribute) {
                        let path = parse_as_path(attribute.clone(), AsnLength::Bits32)?;
                        set.insert_cached(
                            AttributeValue::As4Path(path),
                            attribute,
                            cache_attributes,
                        );
                    }
                }
            }
            AttrType::NEXT_HOP => {
                if !set.insert_from_cache(ty, &attribute) {
                    let value = parse_next_hop(attribute.clone())?;
                    set.insert_cached(value, attribute, cache_attributes);
                }
            }
            AttrType::MULTI_EXIT_DISCRIMINATOR => {
                if !set.insert_from_cache(ty, &attribute) {
                    let value = parse_med(attribute.clone())?;
                    set.insert_cached(value, attribute, cache_attributes);
                }
            }
            AttrType::LOCAL_PREFERENCE => {
                if !set.insert_from_cache(ty, &attribute) {
                    let value = parse_local_pref(attribute.clone())?;
                    set.insert_cached(value, attribute, cache_attributes);
                }
            }
            AttrType::ATOMIC_AGGREGATE => {
                // the only valid payload is empty, which the seeded cache
                // always answers
                if !set.insert_from_cache(ty, &attribute) {
                    return Err(UpdateError::InvalidAttribute(format!(
                        "invalid ATOMIC_AGGREGATE with {length} bytes of payload"
                    )));
                }
            }
            AttrType::AGGREGATOR => {
                // AS4_AGGREGATOR is stored as AGGREGATOR, do not overwrite
                if !set.has(AttrType::AGGREGATOR) {
                    if !set.insert_from_cache(AttrType::AGGREGATOR, &attribute) {
                        let value = parse_aggregator(attribute.clone())?;
                        set.insert_cached(value, attribute, cache_attributes);
                    }
                }
            }
            AttrType::AS4_AGGREGATOR => {
                if !set.insert_from_cache(AttrType::AGGREGATOR, &attribute) {
                    let value = parse_aggregator(attribute.clone())?;
                    set.insert_cached(value, attribute, cache_attributes);
                }
            }
            AttrType::COMMUNITIES => {
                if !set.insert_from_cache(ty, &attribute) {
                    let value = parse_communities(attribute.clone())?;
                    set.insert_cached(value, attribute, cache_attributes);
                }
            }
            AttrType::ORIGINATOR_ID => {
                if !set.insert_from_cache(ty, &attribute) {
                    let value = parse_originator_id(attribute.clone())?;
                    set.insert_cached(value, attribute, cache_attributes);
                }
            }
            AttrType::CLUSTER_LIST => {
                if !set.insert_from_cache(ty, &attribute) {
                    let value = parse_clusters(attribute.clone())?;
                    set.insert_cached(value, attribute, cache_attributes);
                }
            }
            AttrType::EXTENDED_COMMUNITIES => {
                if !set.insert_from_cache(ty, &attribute) {
                    let value = parse_extended_communities(attribute.clone())?;
                    set.insert_cached(value, attribute, cache_attributes);
                }
            }
            AttrType::MP_UNREACHABLE_NLRI => {
                seen_nlri = true;
                parse_mp_unreach(attribute, negotiated, factory, &mut withdrawn)?;
            }
            AttrType::MP_REACHABLE_NLRI => {
                seen_nlri = true;
                parse_mp_reach(
                    attribute,
                    negotiated,
                    factory,
                    cache_attributes,
                    &mut announced,
                )?;
            }
            _ => {
                if flags.contains(AttrFlags::TRANSITIVE) {
                    let key = unknown_cache_key(flags, &attribute);
                    if !set.insert_from_cache(ty, &key) {
                        set.insert_cached(
                            AttributeValue::Unknown(AttrRaw {
                                code,
                                flags,
                                bytes: attribute,
                            }),
                            key,
                            cache_attributes,
                        );
                    }
                } else {
                    debug!("ignoring non-transitive attribute {code}");
                }
            }
        }
    }

    if set.has(AttrType::AS_PATH) && set.has(AttrType::AS4_PATH) {
        merge_as_paths(&mut set, cache_attributes);
    }

    Ok(ParsedUpdate {
        attributes: set,
        announced,
        withdrawn,
    })
}

/// The same AS_PATH bytes decode differently per session ASN width, so the
/// interning key carries the width. The prefix bytes `2`/`4` (0x32/0x34) can
/// never open a raw segment stream, whose first byte is a segment type.
fn as_path_cache_key(asn4: bool, raw: &Bytes) -> Bytes {
    let mut key = BytesMut::with_capacity(raw.len() + 1);
    key.put_u8(if asn4 { b'4' } else { b'2' });
    key.put_slice(raw);
    key.freeze()
}

/// Unknown attributes intern under their payload prefixed by the flag
/// octet: the same payload with different flags is a different attribute.
fn unknown_cache_key(flags: AttrFlags, raw: &Bytes) -> Bytes {
    let mut key = BytesMut::with_capacity(raw.len() + 1);
    key.put_u8(flags.bits());
    key.put_slice(raw);
    key.freeze()
}

/// RFC 4893 §4.2.3: fold the AS4_PATH into the AS_PATH once both are
/// present. The merged path interns under `<index2>:<index4>`; the
/// separator keeps the key length odd, so it can never collide with a raw
/// (always even) segment stream.
fn merge_as_paths(set: &mut AttributeSet, cache_attributes: bool) {
    let (two, four) = match (set.get(AttrType::AS_PATH), set.get(AttrType::AS4_PATH)) {
        (Some(AttributeValue::AsPath(two)), Some(AttributeValue::As4Path(four))) => {
            (two.clone(), four.clone())
        }
        _ => return,
    };
    set.remove(AttrType::AS_PATH);
    set.remove(AttrType::AS4_PATH);

    let mut key = BytesMut::with_capacity(two.index().len() + 1 + four.index().len());
    key.put_slice(two.index());
    key.put_u8(b':');
    key.put_slice(four.index());
    let key = key.freeze();

    if set.insert_from_cache(AttrType::AS_PATH, &key) {
        return;
    }
    let merged = AsPath::reconcile(&two, &four, key.clone());
    set.insert_cached(AttributeValue::AsPath(merged), key, cache_attributes);
}
