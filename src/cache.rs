/*!
Process-wide attribute interning.

Millions of received routes share a handful of distinct attribute encodings;
decoding each occurrence separately would duplicate the same atoms over and
over. The cache maps raw value bytes to a shared atom, one bucket per
attribute type code. Lookups never fail the decoder: a miss simply falls back
to a fresh decode, and writes are gated by the caller's `cache_attributes`
policy flag.

Keys are the raw encoded attribute bytes, with two exceptions that keep the
key space collision-free (see DESIGN.md): AS_PATH keys carry a one-byte ASN
width prefix, and next hops interned from MP_REACH_NLRI are keyed by
`afi ++ safi ++ address`.
*/
use crate::models::{AttrType, AttributeValue, Origin};
use bytes::Bytes;
use std::collections::HashMap;
use std::sync::{Arc, LazyLock, RwLock};

const BUCKETS: usize = 256;

/// Inserts stop once a bucket holds this many encodings. Correctness never
/// depends on a hit, so a full bucket only costs fresh decodes.
const MAX_ENTRIES_PER_ID: usize = 0x20000;

pub struct AttributeCache {
    buckets: Vec<RwLock<HashMap<Bytes, Arc<AttributeValue>>>>,
}

impl AttributeCache {
    fn new() -> AttributeCache {
        AttributeCache {
            buckets: (0..BUCKETS).map(|_| RwLock::new(HashMap::new())).collect(),
        }
    }

    /// Look up a shared atom. Internal marker ids are never cached.
    pub fn get(&self, ty: AttrType, key: &[u8]) -> Option<Arc<AttributeValue>> {
        let code = ty.wire_code()? as usize;
        self.buckets[code].read().ok()?.get(key).cloned()
    }

    /// Intern an atom under `key`. A poisoned or full bucket drops the write.
    pub fn put(&self, ty: AttrType, key: Bytes, value: Arc<AttributeValue>) {
        let Some(code) = ty.wire_code() else {
            return;
        };
        if let Ok(mut bucket) = self.buckets[code as usize].write() {
            if bucket.len() < MAX_ENTRIES_PER_ID || bucket.contains_key(&key) {
                bucket.insert(key, value);
            }
        }
    }
}

/// The per-process cache, seeded with the atoms that admit only one
/// encoding: the three ORIGIN values and the empty ATOMIC_AGGREGATE.
pub fn global() -> &'static AttributeCache {
    &CACHE
}

static CACHE: LazyLock<AttributeCache> = LazyLock::new(|| {
    let cache = AttributeCache::new();
    cache.put(
        AttrType::ATOMIC_AGGREGATE,
        Bytes::new(),
        Arc::new(AttributeValue::AtomicAggregate),
    );
    for origin in [Origin::IGP, Origin::EGP, Origin::INCOMPLETE] {
        cache.put(
            AttrType::ORIGIN,
            Bytes::from(vec![u8::from(origin)]),
            Arc::new(AttributeValue::Origin(origin)),
        );
    }
    cache
});

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_seeded_atoms() {
        let cache = global();
        assert_eq!(
            cache.get(AttrType::ATOMIC_AGGREGATE, b"").as_deref(),
            Some(&AttributeValue::AtomicAggregate)
        );
        assert_eq!(
            cache.get(AttrType::ORIGIN, &[1]).as_deref(),
            Some(&AttributeValue::Origin(Origin::EGP))
        );
        assert_eq!(cache.get(AttrType::ORIGIN, &[3]), None);
        // a non-empty payload can never be a valid ATOMIC_AGGREGATE
        assert_eq!(cache.get(AttrType::ATOMIC_AGGREGATE, &[0]), None);
    }

    #[test]
    fn test_put_and_get_shares_atom() {
        let cache = global();
        let value = Arc::new(AttributeValue::LocalPreference(200));
        cache.put(
            AttrType::LOCAL_PREFERENCE,
            Bytes::from_static(&[0, 0, 0, 200]),
            value.clone(),
        );
        let hit = cache
            .get(AttrType::LOCAL_PREFERENCE, &[0, 0, 0, 200])
            .unwrap();
        assert!(Arc::ptr_eq(&hit, &value));
    }

    #[test]
    fn test_internal_ids_never_cached() {
        let cache = global();
        cache.put(
            AttrType::Watchdog,
            Bytes::from_static(b"key"),
            Arc::new(AttributeValue::AtomicAggregate),
        );
        assert_eq!(cache.get(AttrType::Watchdog, b"key"), None);
    }
}
