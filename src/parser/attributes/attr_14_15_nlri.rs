use crate::cache;
use crate::error::UpdateError;
use crate::models::*;
use crate::parser::ReadUtils;
use crate::session::{Direction, Negotiated, Route, RouteEor, RouteFactory, Withdrawn};
use bytes::{Buf, BufMut, Bytes, BytesMut};
use std::sync::Arc;

/// Read the `<afi:u16><safi:u8>` header and reject anything outside the
/// negotiated family set. An AFI/SAFI the codec has no model for cannot have
/// been negotiated either.
fn read_family(data: &mut Bytes, negotiated: &Negotiated) -> Result<(Afi, Safi), UpdateError> {
    let afi = data.read_u16()?;
    let safi = data.read_u8()?;
    let family = match (Afi::try_from(afi), Safi::try_from(safi)) {
        (Ok(afi), Ok(safi)) => (afi, safi),
        _ => return Err(UpdateError::UnsupportedFamily { afi, safi }),
    };
    if !negotiated.families.contains(&family) {
        return Err(UpdateError::UnsupportedFamily { afi, safi });
    }
    Ok(family)
}

/// MP_UNREACH_NLRI (RFC 4760 §4): `<afi:u16><safi:u8><withdrawn NLRI…>`.
///
/// An empty NLRI field is the end-of-RIB marker for the family.
pub(crate) fn parse_mp_unreach(
    mut data: Bytes,
    negotiated: &Negotiated,
    factory: &dyn RouteFactory,
    withdrawn: &mut Vec<Withdrawn>,
) -> Result<(), UpdateError> {
    let (afi, safi) = read_family(&mut data, negotiated)?;
    let add_path = negotiated.addpath.receive(afi, safi);

    if !data.has_remaining() {
        withdrawn.push(Withdrawn::Eor(RouteEor::new(afi, safi)));
        return Ok(());
    }

    while data.has_remaining() {
        let route = factory.make_route(afi, safi, &data, add_path, Direction::Withdrawn)?;
        advance_nlri(&mut data, &route)?;
        withdrawn.push(Withdrawn::Route(route));
    }
    Ok(())
}

/// MP_REACH_NLRI (RFC 4760 §3):
///
/// ```text
/// +---------------------------------------------------------+
/// | Address Family Identifier (2 octets)                    |
/// +---------------------------------------------------------+
/// | Subsequent Address Family Identifier (1 octet)          |
/// +---------------------------------------------------------+
/// | Length of Next Hop Network Address (1 octet)            |
/// +---------------------------------------------------------+
/// | Network Address of Next Hop (variable)                  |
/// +---------------------------------------------------------+
/// | Reserved (1 octet)                                      |
/// +---------------------------------------------------------+
/// | Network Layer Reachability Information (variable)       |
/// +---------------------------------------------------------+
/// ```
pub(crate) fn parse_mp_reach(
    mut data: Bytes,
    negotiated: &Negotiated,
    factory: &dyn RouteFactory,
    cache_attributes: bool,
    announced: &mut Vec<Route>,
) -> Result<(), UpdateError> {
    let (afi, safi) = read_family(&mut data, negotiated)?;

    let len_nh = data.read_u8()? as usize;
    let rd_len = match (afi, safi) {
        (Afi::Ipv4, Safi::Unicast | Safi::Multicast) => {
            if len_nh != 4 {
                return Err(UpdateError::InvalidMpReach(format!(
                    "invalid ipv4 unicast/multicast next-hop length {len_nh} expected 4"
                )));
            }
            0
        }
        (Afi::Ipv4, Safi::MplsVpn) => {
            if len_nh != 12 {
                return Err(UpdateError::InvalidMpReach(format!(
                    "invalid ipv4 mpls_vpn next-hop length {len_nh} expected 12"
                )));
            }
            8
        }
        (Afi::Ipv6, Safi::Unicast) => {
            if len_nh != 16 && len_nh != 32 {
                return Err(UpdateError::InvalidMpReach(format!(
                    "invalid ipv6 unicast next-hop length {len_nh} expected 16 or 32"
                )));
            }
            0
        }
        (Afi::Ipv6, Safi::MplsVpn) => {
            if len_nh != 24 && len_nh != 40 {
                return Err(UpdateError::InvalidMpReach(format!(
                    "invalid ipv6 mpls_vpn next-hop length {len_nh} expected 24 or 40"
                )));
            }
            8
        }
        _ => 0,
    };

    data.has_n_remaining(len_nh)?;
    let mut next_hop_field = data.split_to(len_nh);
    if rd_len > 0 {
        let rd = next_hop_field.split_to(rd_len);
        if rd.iter().any(|byte| *byte != 0) {
            return Err(UpdateError::InvalidMpReach(
                "MP_REACH_NLRI next-hop's route-distinguisher must be zero".to_string(),
            ));
        }
    }

    if data.read_u8()? != 0 {
        return Err(UpdateError::InvalidMpReach(
            "the reserved bit of MP_REACH_NLRI is not zero".to_string(),
        ));
    }

    let add_path = negotiated.addpath.receive(afi, safi);
    let next_hop = intern_next_hop(afi, safi, next_hop_field, cache_attributes);

    while data.has_remaining() {
        let mut route = factory.make_route(afi, safi, &data, add_path, Direction::Announced)?;
        route.next_hop = Some(next_hop.clone());
        advance_nlri(&mut data, &route)?;
        announced.push(route);
    }
    Ok(())
}

/// Intern the extracted next-hop bytes, keyed by family and address so two
/// families sharing address bytes never collide in the NEXT_HOP bucket.
fn intern_next_hop(
    afi: Afi,
    safi: Safi,
    address: Bytes,
    cache_attributes: bool,
) -> Arc<AttributeValue> {
    let mut key = BytesMut::with_capacity(3 + address.len());
    key.put_u16(u16::from(afi));
    key.put_u8(u8::from(safi));
    key.put_slice(&address);
    let key = key.freeze();

    if let Some(shared) = cache::global().get(AttrType::NEXT_HOP, &key) {
        return shared;
    }
    let atom = Arc::new(AttributeValue::NextHop(NextHop::new(afi, safi, address)));
    if cache_attributes {
        cache::global().put(AttrType::NEXT_HOP, key, atom.clone());
    }
    atom
}

fn advance_nlri(data: &mut Bytes, route: &Route) -> Result<(), UpdateError> {
    let consumed = route.nlri.byte_len();
    if consumed == 0 || consumed > data.remaining() {
        return Err(UpdateError::InvalidMpReach(format!(
            "route factory consumed an invalid NLRI length {consumed}"
        )));
    }
    data.advance(consumed);
    Ok(())
}
