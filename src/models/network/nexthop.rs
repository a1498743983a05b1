use crate::models::network::afi::{Afi, Safi};
use bytes::Bytes;
use std::fmt::{Display, Formatter};
use std::net::{Ipv4Addr, Ipv6Addr};

/// Next-hop address for a family.
///
/// The address bytes are kept in wire form: 4 bytes for ipv4, 16 for ipv6,
/// and 32 for the ipv6 global + link-local pair carried in MP_REACH_NLRI.
/// The route-distinguisher prefix of VPN next hops is stripped before
/// construction.
#[derive(Debug, PartialEq, Eq, Hash, Clone)]
pub struct NextHop {
    pub afi: Afi,
    pub safi: Safi,
    pub address: Bytes,
}

impl NextHop {
    pub fn new(afi: Afi, safi: Safi, address: Bytes) -> NextHop {
        NextHop { afi, safi, address }
    }

    /// The wire form of the NEXT_HOP attribute value.
    pub fn encode(&self) -> Bytes {
        self.address.clone()
    }
}

fn ipv6_from(slice: &[u8]) -> Ipv6Addr {
    let mut buf = [0u8; 16];
    buf.copy_from_slice(slice);
    Ipv6Addr::from(buf)
}

impl Display for NextHop {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self.address.len() {
            4 => {
                let mut buf = [0u8; 4];
                buf.copy_from_slice(&self.address);
                write!(f, "{}", Ipv4Addr::from(buf))
            }
            16 => write!(f, "{}", ipv6_from(&self.address)),
            32 => {
                // global followed by link-local
                write!(
                    f,
                    "{} {}",
                    ipv6_from(&self.address[..16]),
                    ipv6_from(&self.address[16..])
                )
            }
            _ => {
                write!(f, "0x")?;
                for byte in self.address.iter() {
                    write!(f, "{byte:02X}")?;
                }
                Ok(())
            }
        }
    }
}
