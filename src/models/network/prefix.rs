use ipnet::IpNet;
use std::fmt::{Display, Formatter};
use std::str::FromStr;

/// A network prefix from an NLRI field, together with the add-path
/// identifier received with it (0 when add-path was not negotiated).
#[derive(Debug, PartialEq, Eq, Hash, Copy, Clone)]
pub struct NetworkPrefix {
    pub prefix: IpNet,
    pub path_id: u32,
}

impl NetworkPrefix {
    pub fn new(prefix: IpNet, path_id: u32) -> NetworkPrefix {
        NetworkPrefix { prefix, path_id }
    }
}

impl Display for NetworkPrefix {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.prefix)
    }
}

impl FromStr for NetworkPrefix {
    type Err = <IpNet as FromStr>::Err;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(NetworkPrefix {
            prefix: IpNet::from_str(s)?,
            path_id: 0,
        })
    }
}
