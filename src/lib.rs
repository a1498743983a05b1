/*!
`bgp-pathattr` is a codec for the Path Attributes field of BGP-4 UPDATE
messages (RFC 4271), covering:

- **decoding** a contiguous attribute buffer into an [AttributeSet], with
  the defensive validation the wire format demands: every malformed input
  maps to a precise NOTIFICATION `(code, subcode)` pair instead of a crash;
- **multiprotocol reachability** (RFC 4760): MP_REACH_NLRI / MP_UNREACH_NLRI
  parsing, strict next-hop validation per family, end-of-RIB detection, with
  NLRI prefix decoding delegated to a [session::RouteFactory];
- **AS4 reconciliation** (RFC 4893 §4.2.3): folding AS4_PATH / AS4_AGGREGATOR
  into their 2-byte counterparts;
- **encoding** an attribute set back to the wire in the canonical order, for
  both ASN-2 and ASN-4 peers (with AS_TRANS substitution towards the
  former);
- **interning**: attribute values are shared process-wide per raw encoding,
  keeping memory bounded when millions of routes carry identical attribute
  sets.

# Example

```
use bgp_pathattr::{parse_attributes, encode_attributes, Asn, AttrType};
use bgp_pathattr::session::{Negotiated, PrefixRouteFactory};
use bytes::Bytes;

let negotiated = Negotiated::new(true);
let parsed = parse_attributes(
    Bytes::from_static(&[0x40, 0x01, 0x01, 0x00]), // ORIGIN IGP
    &negotiated,
    &PrefixRouteFactory,
    false,
)?;
assert!(parsed.attributes.has(AttrType::ORIGIN));

let wire = encode_attributes(
    &parsed.attributes,
    true,
    Asn::new_32bit(65000),
    Asn::new_32bit(64999),
    false,
);
assert_eq!(wire, Bytes::from_static(&[0x40, 0x01, 0x01, 0x00]));
# Ok::<(), bgp_pathattr::UpdateError>(())
```
*/
pub mod cache;
pub mod error;
pub mod models;
pub mod parser;
pub mod session;

pub use crate::error::UpdateError;
pub use crate::models::*;
pub use crate::parser::{encode_attributes, parse_attributes, ParsedUpdate};
