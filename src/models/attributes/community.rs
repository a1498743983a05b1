use bytes::{BufMut, Bytes, BytesMut};
use itertools::Itertools;
use std::fmt::{Display, Formatter};

const COMMUNITY_NO_EXPORT: u32 = 0xFFFFFF01;
const COMMUNITY_NO_ADVERTISE: u32 = 0xFFFFFF02;
const COMMUNITY_NO_EXPORT_SUBCONFED: u32 = 0xFFFFFF03;

/// A single RFC 1997 community: a 32-bit opaque value, conventionally split
/// into `asn:value` halves for display.
#[derive(Debug, PartialEq, Eq, Hash, Copy, Clone)]
pub struct Community(pub u32);

impl Display for Community {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self.0 {
            COMMUNITY_NO_EXPORT => write!(f, "no-export"),
            COMMUNITY_NO_ADVERTISE => write!(f, "no-advertise"),
            COMMUNITY_NO_EXPORT_SUBCONFED => write!(f, "no-export-sub-confed"),
            value => write!(f, "{}:{}", value >> 16, value & 0xffff),
        }
    }
}

/// A single RFC 4360 extended community, kept as the opaque 8-octet wire
/// value.
#[derive(Debug, PartialEq, Eq, Hash, Copy, Clone)]
pub struct ExtendedCommunity(pub [u8; 8]);

impl Display for ExtendedCommunity {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "0x")?;
        for byte in self.0 {
            write!(f, "{byte:02X}")?;
        }
        Ok(())
    }
}

/// COMMUNITY attribute value: communities in wire order.
#[derive(Debug, PartialEq, Eq, Hash, Clone, Default)]
pub struct Communities(pub Vec<Community>);

impl Communities {
    pub fn encode(&self) -> Bytes {
        let mut bytes = BytesMut::with_capacity(self.0.len() * 4);
        for community in &self.0 {
            bytes.put_u32(community.0);
        }
        bytes.freeze()
    }

    pub fn json(&self) -> String {
        format!(
            "[ {} ]",
            self.0.iter().map(|c| format!("\"{c}\"")).join(", ")
        )
    }
}

impl Display for Communities {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "[ {} ]", self.0.iter().join(" "))
    }
}

/// EXTENDED_COMMUNITY attribute value: extended communities in wire order.
#[derive(Debug, PartialEq, Eq, Hash, Clone, Default)]
pub struct ExtendedCommunities(pub Vec<ExtendedCommunity>);

impl ExtendedCommunities {
    pub fn encode(&self) -> Bytes {
        let mut bytes = BytesMut::with_capacity(self.0.len() * 8);
        for community in &self.0 {
            bytes.put_slice(&community.0);
        }
        bytes.freeze()
    }

    pub fn json(&self) -> String {
        format!(
            "[ {} ]",
            self.0.iter().map(|c| format!("\"{c}\"")).join(", ")
        )
    }
}

impl Display for ExtendedCommunities {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "[ {} ]", self.0.iter().join(" "))
    }
}
