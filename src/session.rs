/*!
The session-facing collaborators of the codec: the negotiated capability
snapshot, the route factory contract, and the route values the decoder
produces from MP_REACH/MP_UNREACH.
*/
use crate::error::UpdateError;
use crate::models::*;
use bytes::Bytes;
use ipnet::IpNet;
use std::collections::HashSet;
use std::fmt::{Display, Formatter};
use std::net::{IpAddr, Ipv4Addr, Ipv6Addr};
use std::sync::Arc;

/// Per-family add-path state agreed during capability negotiation
/// (RFC 7911). The codec only ever asks about the receive direction.
#[derive(Debug, Clone, Default)]
pub struct AddPath {
    receive: HashSet<(Afi, Safi)>,
}

impl AddPath {
    pub fn enable_receive(&mut self, afi: Afi, safi: Safi) {
        self.receive.insert((afi, safi));
    }

    /// Is the peer going to send path identifiers with this family's NLRI?
    pub fn receive(&self, afi: Afi, safi: Safi) -> bool {
        self.receive.contains(&(afi, safi))
    }
}

/// Read-only snapshot of what the OPEN exchange agreed on, everything the
/// codec needs to know about the session.
#[derive(Debug, Clone)]
pub struct Negotiated {
    /// Both speakers support 4-byte ASNs (RFC 4893).
    pub asn4: bool,
    /// Families both speakers advertised in their multiprotocol capability.
    pub families: HashSet<(Afi, Safi)>,
    pub addpath: AddPath,
}

impl Negotiated {
    pub fn new(asn4: bool) -> Negotiated {
        Negotiated {
            asn4,
            families: HashSet::new(),
            addpath: AddPath::default(),
        }
    }

    pub fn with_family(mut self, afi: Afi, safi: Safi) -> Negotiated {
        self.families.insert((afi, safi));
        self
    }

    pub fn with_addpath_receive(mut self, afi: Afi, safi: Safi) -> Negotiated {
        self.addpath.enable_receive(afi, safi);
        self
    }
}

/// Which UPDATE list an NLRI came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Direction {
    Announced,
    Withdrawn,
}

impl Display for Direction {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Direction::Announced => write!(f, "announced"),
            Direction::Withdrawn => write!(f, "withdrawn"),
        }
    }
}

/// One decoded NLRI entry. `byte_len` is the number of wire bytes the entry
/// consumed; the decoder advances by it between routes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Nlri {
    pub afi: Afi,
    pub safi: Safi,
    pub prefix: NetworkPrefix,
    byte_len: usize,
}

impl Nlri {
    pub fn new(afi: Afi, safi: Safi, prefix: NetworkPrefix, byte_len: usize) -> Nlri {
        Nlri {
            afi,
            safi,
            prefix,
            byte_len,
        }
    }

    pub fn byte_len(&self) -> usize {
        self.byte_len
    }
}

/// A route produced by the route factory. The next hop is attached by the
/// decoder while consuming MP_REACH_NLRI and is shared with the interning
/// cache; the owning UPDATE's attribute set outlives every route produced
/// from it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Route {
    pub nlri: Nlri,
    pub next_hop: Option<Arc<AttributeValue>>,
}

impl Route {
    pub fn new(nlri: Nlri) -> Route {
        Route {
            nlri,
            next_hop: None,
        }
    }

    pub fn next_hop(&self) -> Option<&NextHop> {
        match self.next_hop.as_deref() {
            Some(AttributeValue::NextHop(next_hop)) => Some(next_hop),
            _ => None,
        }
    }
}

/// End-of-RIB marker: an empty MP_UNREACH_NLRI for a family (RFC 4724).
///
/// The action tag is deliberately `announced` even though the marker travels
/// in the withdrawn list; peers expect this exact labeling from the route
/// pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RouteEor {
    pub afi: Afi,
    pub safi: Safi,
    pub action: Direction,
}

impl RouteEor {
    pub fn new(afi: Afi, safi: Safi) -> RouteEor {
        RouteEor {
            afi,
            safi,
            action: Direction::Announced,
        }
    }
}

impl Display for RouteEor {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "eor {}/{}", self.afi, self.safi)
    }
}

/// Entry of the decoder's withdrawn output: a withdrawn route or an
/// end-of-RIB marker.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Withdrawn {
    Route(Route),
    Eor(RouteEor),
}

/// Builds routes from the NLRI portion of MP_REACH/MP_UNREACH.
///
/// The factory reads one entry from the front of `data` and reports through
/// `Nlri::byte_len` how many bytes it consumed. A factory failure aborts the
/// decode of the whole UPDATE with the factory's notification code.
pub trait RouteFactory {
    fn make_route(
        &self,
        afi: Afi,
        safi: Safi,
        data: &Bytes,
        add_path: bool,
        direction: Direction,
    ) -> Result<Route, UpdateError>;
}

/// Stock factory for plain prefix NLRI:
/// `[path-id:u32] <bits:u8> <prefix bytes>`.
#[derive(Debug, Clone, Copy, Default)]
pub struct PrefixRouteFactory;

impl RouteFactory for PrefixRouteFactory {
    fn make_route(
        &self,
        afi: Afi,
        safi: Safi,
        data: &Bytes,
        add_path: bool,
        _direction: Direction,
    ) -> Result<Route, UpdateError> {
        let mut offset = 0usize;
        let path_id = match add_path {
            true => {
                if data.len() < 4 {
                    return Err(UpdateError::InvalidMpReach(
                        "not enough data to decode an add-path identifier".to_string(),
                    ));
                }
                offset = 4;
                u32::from_be_bytes([data[0], data[1], data[2], data[3]])
            }
            false => 0,
        };

        let Some(bit_len) = data.get(offset).copied() else {
            return Err(UpdateError::InvalidMpReach(
                "not enough data to decode an NLRI length".to_string(),
            ));
        };
        offset += 1;

        let byte_len = (bit_len as usize).div_ceil(8);
        if data.len() < offset + byte_len {
            return Err(UpdateError::InvalidMpReach(format!(
                "NLRI of {bit_len} bits overruns the attribute"
            )));
        }

        let addr: IpAddr = match afi {
            Afi::Ipv4 => {
                if byte_len > 4 {
                    return Err(UpdateError::InvalidMpReach(format!(
                        "invalid ipv4 NLRI length {bit_len}"
                    )));
                }
                let mut buf = [0u8; 4];
                buf[..byte_len].copy_from_slice(&data[offset..offset + byte_len]);
                IpAddr::V4(Ipv4Addr::from(buf))
            }
            Afi::Ipv6 => {
                if byte_len > 16 {
                    return Err(UpdateError::InvalidMpReach(format!(
                        "invalid ipv6 NLRI length {bit_len}"
                    )));
                }
                let mut buf = [0u8; 16];
                buf[..byte_len].copy_from_slice(&data[offset..offset + byte_len]);
                IpAddr::V6(Ipv6Addr::from(buf))
            }
        };

        let prefix = IpNet::new(addr, bit_len).map_err(|_| {
            UpdateError::InvalidMpReach(format!("invalid NLRI prefix length {bit_len}"))
        })?;

        Ok(Route::new(Nlri::new(
            afi,
            safi,
            NetworkPrefix::new(prefix, path_id),
            offset + byte_len,
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn test_direction_tags() {
        assert_eq!(Direction::Announced.to_string(), "announced");
        assert_eq!(Direction::Withdrawn.to_string(), "withdrawn");
        // the end-of-RIB marker keeps the announced tag
        assert_eq!(
            RouteEor::new(Afi::Ipv4, Safi::Unicast).action,
            Direction::Announced
        );
    }

    #[test]
    fn test_prefix_factory() {
        let data = Bytes::from_static(&[0x18, 0xC0, 0x00, 0x02, 0xFF]);
        let route = PrefixRouteFactory
            .make_route(
                Afi::Ipv4,
                Safi::Unicast,
                &data,
                false,
                Direction::Announced,
            )
            .unwrap();
        assert_eq!(route.nlri.byte_len(), 4);
        assert_eq!(
            route.nlri.prefix,
            NetworkPrefix::from_str("192.0.2.0/24").unwrap()
        );
    }

    #[test]
    fn test_prefix_factory_add_path() {
        let data = Bytes::from_static(&[0x00, 0x00, 0x00, 0x7B, 0x18, 0xC0, 0x00, 0x02]);
        let route = PrefixRouteFactory
            .make_route(Afi::Ipv4, Safi::Unicast, &data, true, Direction::Announced)
            .unwrap();
        assert_eq!(route.nlri.byte_len(), 8);
        assert_eq!(route.nlri.prefix.path_id, 123);
    }

    #[test]
    fn test_prefix_factory_truncated() {
        let data = Bytes::from_static(&[0x18, 0xC0]);
        let err = PrefixRouteFactory
            .make_route(
                Afi::Ipv4,
                Safi::Unicast,
                &data,
                false,
                Direction::Withdrawn,
            )
            .unwrap_err();
        assert_eq!(err.notification(), (3, 0));
    }

    #[test]
    fn test_prefix_factory_bad_mask() {
        let data = Bytes::from_static(&[0x21, 1, 2, 3, 4, 5]);
        assert!(PrefixRouteFactory
            .make_route(
                Afi::Ipv4,
                Safi::Unicast,
                &data,
                false,
                Direction::Announced,
            )
            .is_err());
    }

    #[test]
    fn test_negotiated() {
        let negotiated = Negotiated::new(true)
            .with_family(Afi::Ipv4, Safi::Unicast)
            .with_addpath_receive(Afi::Ipv4, Safi::Unicast);
        assert!(negotiated.families.contains(&(Afi::Ipv4, Safi::Unicast)));
        assert!(negotiated.addpath.receive(Afi::Ipv4, Safi::Unicast));
        assert!(!negotiated.addpath.receive(Afi::Ipv6, Safi::Unicast));
    }
}
