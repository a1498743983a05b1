use crate::cache;
use crate::models::*;
use bytes::Bytes;
use itertools::Itertools;
use std::fmt::{Display, Formatter};
use std::sync::Arc;

// 256 wire codes plus the three internal markers.
const SLOTS: usize = 259;

/// What a set holds under one attribute id: one atom, or an
/// insertion-ordered group for ids that tolerate duplicates.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Stored {
    Single(Arc<AttributeValue>),
    Multiple(Vec<Arc<AttributeValue>>),
}

impl Stored {
    /// The first (for almost every id: the only) atom.
    pub fn first(&self) -> &AttributeValue {
        match self {
            Stored::Single(value) => value,
            Stored::Multiple(values) => &values[0],
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = &Arc<AttributeValue>> {
        match self {
            Stored::Single(value) => std::slice::from_ref(value).iter(),
            Stored::Multiple(values) => values.iter(),
        }
    }
}

/// The attribute set of one UPDATE message.
///
/// A keyed container backed by a fixed table indexed by attribute id, so
/// iteration is always in ascending id order and renderings are stable.
/// Atoms are shared (`Arc`) between the set and the process-wide interning
/// cache; the set owns only the table.
///
/// Equality compares attribute values per id and ignores the `cacheable`
/// bookkeeping.
#[derive(Debug, Clone)]
pub struct AttributeSet {
    slots: Vec<Option<Stored>>,
    cacheable: bool,
}

impl Default for AttributeSet {
    fn default() -> Self {
        AttributeSet::new()
    }
}

impl AttributeSet {
    pub fn new() -> AttributeSet {
        AttributeSet {
            slots: vec![None; SLOTS],
            cacheable: true,
        }
    }

    pub fn has(&self, ty: AttrType) -> bool {
        self.slots[ty.index()].is_some()
    }

    pub fn get(&self, ty: AttrType) -> Option<&AttributeValue> {
        self.slots[ty.index()].as_ref().map(Stored::first)
    }

    pub fn get_stored(&self, ty: AttrType) -> Option<&Stored> {
        self.slots[ty.index()].as_ref()
    }

    /// Insert an already shared atom under its own id: replaces for
    /// single-valued ids, appends for multi-valued ones.
    pub fn insert_shared(&mut self, value: Arc<AttributeValue>) {
        let ty = value.attr_type();
        if ty.is_multiple() {
            self.append_shared(value);
            return;
        }
        self.slots[ty.index()] = Some(Stored::Single(value));
    }

    pub fn insert(&mut self, value: AttributeValue) -> Arc<AttributeValue> {
        let shared = Arc::new(value);
        self.insert_shared(shared.clone());
        shared
    }

    /// Append under the atom's id regardless of arity, promoting an existing
    /// single entry to an insertion-ordered group. This is how duplicate
    /// occurrences of a future multi-valued id accumulate.
    pub fn append_shared(&mut self, value: Arc<AttributeValue>) {
        let slot = &mut self.slots[value.attr_type().index()];
        match slot.take() {
            None => *slot = Some(Stored::Single(value)),
            Some(Stored::Single(existing)) => {
                *slot = Some(Stored::Multiple(vec![existing, value]));
            }
            Some(Stored::Multiple(mut values)) => {
                values.push(value);
                *slot = Some(Stored::Multiple(values));
            }
        }
    }

    /// Fetch a shared atom from the interning cache and insert it. Returns
    /// false on a miss, in which case the caller decodes afresh.
    pub fn insert_from_cache(&mut self, ty: AttrType, key: &[u8]) -> bool {
        match cache::global().get(ty, key) {
            Some(value) => {
                self.insert_shared(value);
                true
            }
            None => false,
        }
    }

    /// Insert a freshly decoded atom, interning it under `key` when the
    /// caching policy is enabled.
    pub fn insert_cached(
        &mut self,
        value: AttributeValue,
        key: Bytes,
        cache_attributes: bool,
    ) -> Arc<AttributeValue> {
        let shared = Arc::new(value);
        if cache_attributes {
            cache::global().put(shared.attr_type(), key, shared.clone());
        }
        self.insert_shared(shared.clone());
        shared
    }

    pub fn remove(&mut self, ty: AttrType) -> Option<Stored> {
        self.slots[ty.index()].take()
    }

    /// Present entries in ascending id order, internal markers included.
    pub fn iter(&self) -> impl Iterator<Item = (AttrType, &Stored)> {
        self.slots
            .iter()
            .enumerate()
            .filter_map(|(index, slot)| slot.as_ref().map(|s| (AttrType::from_index(index), s)))
    }

    pub fn len(&self) -> usize {
        self.slots.iter().filter(|slot| slot.is_some()).count()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.iter().all(|slot| slot.is_none())
    }

    /// Whether this set may be shared across routes. Starts true; the
    /// decoder clears it when a non-multiprotocol attribute follows an
    /// MP_REACH/MP_UNREACH in the same UPDATE.
    pub fn cacheable(&self) -> bool {
        self.cacheable
    }

    pub(crate) fn mark_not_cacheable(&mut self) {
        self.cacheable = false;
    }

    /// Stable JSON object body, sorted by numeric id. Internal markers are
    /// filtered; `atomic-aggregate` always appears as a boolean; ids without
    /// a representation render as `"attribute-0xCC-0xFF": "0x.."`.
    pub fn json(&self) -> String {
        let mut entries = Vec::with_capacity(self.len() + 1);
        for (index, slot) in self.slots.iter().enumerate() {
            let ty = AttrType::from_index(index);
            if ty.is_internal() {
                continue;
            }
            if ty == AttrType::ATOMIC_AGGREGATE {
                let present = slot.is_some();
                entries.push(format!("\"atomic-aggregate\": {present}"));
                continue;
            }
            let Some(stored) = slot else { continue };
            entries.push(match ty.repr_name() {
                Some(name) => {
                    let rendered = match stored {
                        Stored::Single(value) => json_value(value),
                        Stored::Multiple(values) => {
                            format!("[ {} ]", values.iter().map(|v| json_value(v)).join(", "))
                        }
                    };
                    format!("\"{name}\": {rendered}")
                }
                None => {
                    let (code, flags, hex) = generic_parts(ty, stored);
                    format!("\"attribute-0x{code:02X}-0x{flags:02X}\": \"0x{hex}\"")
                }
            });
        }
        entries.join(", ")
    }

    /// Stable textual form, sorted by numeric id; see [AttributeSet::json]
    /// for the filtering rules.
    pub fn string(&self) -> String {
        self.to_string()
    }
}

impl PartialEq for AttributeSet {
    fn eq(&self, other: &Self) -> bool {
        self.slots == other.slots
    }
}

impl Eq for AttributeSet {}

impl Display for AttributeSet {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let mut entries = Vec::with_capacity(self.len());
        for (ty, stored) in self.iter() {
            if ty.is_internal() {
                continue;
            }
            entries.push(match ty.repr_name() {
                Some("atomic-aggregate") => "atomic-aggregate".to_string(),
                Some("aggregator") => {
                    format!("aggregator ( {} )", stored.iter().join(" "))
                }
                Some(name) => format!("{name} {}", stored.iter().join(" ")),
                None => {
                    let (code, flags, hex) = generic_parts(ty, stored);
                    format!("attribute [ 0x{code:02X} 0x{flags:02X} 0x{hex} ]")
                }
            });
        }
        write!(f, "{}", entries.join(" "))
    }
}

fn json_value(value: &AttributeValue) -> String {
    match value {
        AttributeValue::Origin(origin) => format!("\"{origin}\""),
        AttributeValue::AsPath(path) | AttributeValue::As4Path(path) => path.json(),
        AttributeValue::NextHop(next_hop) => format!("\"{next_hop}\""),
        AttributeValue::MultiExitDiscriminator(value)
        | AttributeValue::LocalPreference(value) => value.to_string(),
        AttributeValue::AtomicAggregate => "true".to_string(),
        AttributeValue::Aggregator(aggregator) => format!("\"( {aggregator} )\""),
        AttributeValue::Communities(communities) => communities.json(),
        AttributeValue::OriginatorId(id) => format!("\"{id}\""),
        AttributeValue::ClusterList(clusters) => clusters.json(),
        AttributeValue::ExtendedCommunities(communities) => communities.json(),
        AttributeValue::Unknown(_) => format!("\"{value}\""),
    }
}

fn generic_parts(ty: AttrType, stored: &Stored) -> (u8, u8, String) {
    let code = ty.wire_code().unwrap_or(0);
    let flags = stored.first().flags().bits();
    let hex = stored
        .iter()
        .flat_map(|value| value.encode_value())
        .map(|byte| format!("{byte:02X}"))
        .collect::<String>();
    (code, flags, hex)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::net::Ipv4Addr;

    #[test]
    fn test_insert_replaces_single_valued() {
        let mut set = AttributeSet::new();
        assert!(set.is_empty());
        set.insert(AttributeValue::LocalPreference(100));
        set.insert(AttributeValue::LocalPreference(200));
        assert_eq!(set.len(), 1);
        assert_eq!(
            set.get(AttrType::LOCAL_PREFERENCE),
            Some(&AttributeValue::LocalPreference(200))
        );
    }

    #[test]
    fn test_append_promotes_to_group() {
        let mut set = AttributeSet::new();
        set.append_shared(Arc::new(AttributeValue::LocalPreference(1)));
        set.append_shared(Arc::new(AttributeValue::LocalPreference(2)));
        set.append_shared(Arc::new(AttributeValue::LocalPreference(3)));
        match set.get_stored(AttrType::LOCAL_PREFERENCE) {
            Some(Stored::Multiple(values)) => {
                let order: Vec<String> = values.iter().map(|v| v.to_string()).collect();
                assert_eq!(order, ["1", "2", "3"]);
            }
            other => panic!("expected a group, got {other:?}"),
        }
    }

    #[test]
    fn test_remove() {
        let mut set = AttributeSet::new();
        set.insert(AttributeValue::Origin(Origin::IGP));
        assert!(set.has(AttrType::ORIGIN));
        set.remove(AttrType::ORIGIN);
        assert!(!set.has(AttrType::ORIGIN));
    }

    #[test]
    fn test_equality_ignores_cacheable() {
        let mut a = AttributeSet::new();
        let mut b = AttributeSet::new();
        a.insert(AttributeValue::Origin(Origin::IGP));
        b.insert(AttributeValue::Origin(Origin::IGP));
        b.mark_not_cacheable();
        assert_eq!(a, b);
    }

    #[test]
    fn test_string_rendering() {
        let mut set = AttributeSet::new();
        set.insert(AttributeValue::Origin(Origin::IGP));
        set.insert(AttributeValue::AsPath(AsPath::from_sequence([65540])));
        set.insert(AttributeValue::MultiExitDiscriminator(50));
        set.insert(AttributeValue::AtomicAggregate);
        set.insert(AttributeValue::Aggregator(Aggregator::new(
            Asn::new_32bit(65540),
            Ipv4Addr::new(10, 0, 0, 1),
        )));
        assert_eq!(
            set.string(),
            "origin IGP as-path [ 65540 ] med 50 atomic-aggregate \
             aggregator ( 65540:10.0.0.1 )"
        );
    }

    #[test]
    fn test_json_rendering() {
        let mut set = AttributeSet::new();
        set.insert(AttributeValue::Origin(Origin::IGP));
        set.insert(AttributeValue::Communities(Communities(vec![Community(
            0xFFFFFF01,
        )])));
        assert_eq!(
            set.json(),
            "\"origin\": \"IGP\", \"atomic-aggregate\": false, \
             \"community\": [ \"no-export\" ]"
        );
    }

    #[test]
    fn test_unknown_rendering() {
        let mut set = AttributeSet::new();
        set.insert(AttributeValue::Unknown(AttrRaw {
            code: 0x63,
            flags: AttrFlags::OPTIONAL | AttrFlags::TRANSITIVE,
            bytes: Bytes::from_static(&[0xDE, 0xAD]),
        }));
        assert_eq!(set.string(), "attribute [ 0x63 0xC0 0xDEAD ]");
        assert_eq!(
            set.json(),
            "\"atomic-aggregate\": false, \"attribute-0x63-0xC0\": \"0xDEAD\""
        );
    }

    #[test]
    fn test_internal_markers_filtered() {
        let mut set = AttributeSet::new();
        set.insert(AttributeValue::Origin(Origin::EGP));
        // internal markers are storable but invisible to the renderings
        set.slots[AttrType::Withdraw.index()] = Some(Stored::Single(Arc::new(
            AttributeValue::Origin(Origin::IGP),
        )));
        assert_eq!(set.string(), "origin EGP");
        assert!(!set.json().contains("attribute-"));
    }
}
