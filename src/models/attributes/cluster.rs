use bytes::{BufMut, Bytes, BytesMut};
use itertools::Itertools;
use std::fmt::{Display, Formatter};
use std::net::Ipv4Addr;

/// CLUSTER_LIST value (RFC 4456): route-reflection cluster ids in wire
/// order.
#[derive(Debug, PartialEq, Eq, Hash, Clone, Default)]
pub struct ClusterList(pub Vec<Ipv4Addr>);

impl ClusterList {
    pub fn encode(&self) -> Bytes {
        let mut bytes = BytesMut::with_capacity(self.0.len() * 4);
        for id in &self.0 {
            bytes.put_u32((*id).into());
        }
        bytes.freeze()
    }

    pub fn json(&self) -> String {
        format!(
            "[ {} ]",
            self.0.iter().map(|id| format!("\"{id}\"")).join(", ")
        )
    }
}

impl Display for ClusterList {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "[ {} ]", self.0.iter().join(" "))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_encode() {
        let clusters = ClusterList(vec![Ipv4Addr::new(10, 0, 0, 1), Ipv4Addr::new(10, 0, 0, 2)]);
        assert_eq!(
            clusters.encode(),
            Bytes::from_static(&[10, 0, 0, 1, 10, 0, 0, 2])
        );
        assert_eq!(clusters.to_string(), "[ 10.0.0.1 10.0.0.2 ]");
        assert_eq!(clusters.json(), "[ \"10.0.0.1\", \"10.0.0.2\" ]");
    }
}
