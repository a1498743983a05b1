use crate::models::network::Asn;
use bytes::{BufMut, Bytes, BytesMut};
use itertools::Itertools;
use std::fmt::{Display, Formatter};
use std::hash::{Hash, Hasher};

use smallvec::SmallVec;

/// AS_SET segment type: unordered set of ASes a route has traversed.
pub const AS_SET: u8 = 1;
/// AS_SEQUENCE segment type: ordered set of ASes a route has traversed.
pub const AS_SEQUENCE: u8 = 2;

/// Most paths are short; keep them inline.
pub type AsnList = SmallVec<[Asn; 6]>;

/// AS_PATH / AS4_PATH value.
///
/// The segment stream is flattened into the ordered `sequence` and the
/// unordered `set`, the two views RFC 4893 reconciliation is defined over.
/// The original wire payload is retained as `index`, the opaque byte string
/// the interning cache keys this atom by. Equality ignores `index`: the same
/// logical path may have been produced by different encodings.
#[derive(Debug, Clone)]
pub struct AsPath {
    pub sequence: AsnList,
    pub set: AsnList,
    index: Bytes,
}

impl AsPath {
    pub fn new(sequence: AsnList, set: AsnList) -> AsPath {
        AsPath {
            sequence,
            set,
            index: Bytes::new(),
        }
    }

    pub fn with_index(sequence: AsnList, set: AsnList, index: Bytes) -> AsPath {
        AsPath {
            sequence,
            set,
            index,
        }
    }

    pub fn from_sequence<I: IntoIterator<Item = u32>>(asns: I) -> AsPath {
        AsPath::new(asns.into_iter().map(Asn::new_32bit).collect(), AsnList::new())
    }

    /// The cache key this path was decoded from (or assigned on merge).
    pub fn index(&self) -> &Bytes {
        &self.index
    }

    pub fn is_empty(&self) -> bool {
        self.sequence.is_empty() && self.set.is_empty()
    }

    /// Encode the path as a segment stream, 4-byte ASNs when `asn4`.
    ///
    /// Segments hold at most 255 ASNs; longer lists are split. The caller is
    /// responsible for substituting AS_TRANS before asking for the 2-byte
    /// form.
    pub fn encode(&self, asn4: bool) -> Bytes {
        let mut bytes = BytesMut::new();
        for (kind, asns) in [(AS_SEQUENCE, &self.sequence), (AS_SET, &self.set)] {
            for chunk in asns.chunks(255) {
                bytes.put_u8(kind);
                bytes.put_u8(chunk.len() as u8);
                for asn in chunk {
                    match asn4 {
                        true => bytes.put_u32(asn.to_u32()),
                        false => bytes.put_u16(asn.to_u32() as u16),
                    }
                }
            }
        }
        bytes.freeze()
    }

    /// Merge an AS_PATH with the AS4_PATH received alongside it, following
    /// RFC 4893 §4.2.3: the 2-byte path wins when it is shorter than the
    /// 4-byte one, otherwise its leading ASNs prefix the 4-byte path.
    pub fn reconcile(two: &AsPath, four: &AsPath, index: Bytes) -> AsPath {
        let len2 = two.sequence.len();
        let len4 = four.sequence.len();
        let sequence = if len2 < len4 {
            two.sequence.clone()
        } else {
            let mut merged: AsnList = two.sequence[..len2 - len4].iter().copied().collect();
            merged.extend(four.sequence.iter().copied());
            merged
        };

        let len2 = two.set.len();
        let len4 = four.set.len();
        let set = if len2 < len4 {
            four.set.clone()
        } else {
            let mut merged: AsnList = two.set[..len2 - len4].iter().copied().collect();
            merged.extend(four.set.iter().copied());
            merged
        };

        AsPath::with_index(sequence, set, index)
    }

    /// JSON rendering: the sequence as an array, with the set nested as a
    /// trailing array when present.
    pub fn json(&self) -> String {
        if self.is_empty() {
            return "[ ]".to_string();
        }
        let sequence = self.sequence.iter().join(", ");
        match (self.sequence.is_empty(), self.set.is_empty()) {
            (_, true) => format!("[ {sequence} ]"),
            (true, false) => format!("[ [ {} ] ]", self.set.iter().join(", ")),
            (false, false) => format!("[ {sequence}, [ {} ] ]", self.set.iter().join(", ")),
        }
    }
}

impl PartialEq for AsPath {
    fn eq(&self, other: &Self) -> bool {
        self.sequence == other.sequence && self.set == other.set
    }
}

impl Eq for AsPath {}

impl Hash for AsPath {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.sequence.hash(state);
        self.set.hash(state);
    }
}

impl Display for AsPath {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "[")?;
        for asn in &self.sequence {
            write!(f, " {asn}")?;
        }
        if !self.set.is_empty() {
            write!(f, " (")?;
            for asn in &self.set {
                write!(f, " {asn}")?;
            }
            write!(f, " )")?;
        }
        write!(f, " ]")
    }
}
