use crate::error::UpdateError;
use crate::models::*;
use crate::parser::ReadUtils;
use bytes::{Buf, Bytes};

pub fn parse_communities(mut input: Bytes) -> Result<AttributeValue, UpdateError> {
    if input.len() % 4 != 0 {
        return Err(UpdateError::MalformedCommunity(format!(
            "could not decode community, {} trailing bytes",
            input.len() % 4
        )));
    }
    let mut communities = Vec::with_capacity(input.len() / 4);
    while input.has_remaining() {
        communities.push(Community(input.read_u32()?));
    }
    Ok(AttributeValue::Communities(Communities(communities)))
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Test parsing of communities values, as defined in RFC1997.
    #[test]
    fn test_parse_communities() {
        let value = parse_communities(Bytes::from_static(&[
            0xFF, 0xFF, 0xFF, 0x01, // NoExport
            0x00, 0x7B, 0x01, 0xC8, // 123:456
        ]))
        .unwrap();
        match value {
            AttributeValue::Communities(communities) => {
                assert_eq!(
                    communities.0,
                    vec![Community(0xFFFFFF01), Community(0x007B01C8)]
                );
            }
            other => panic!("unexpected value: {other:?}"),
        }
    }

    #[test]
    fn test_parse_communities_bad_length() {
        let err = parse_communities(Bytes::from_static(&[0xFF, 0xFF])).unwrap_err();
        assert_eq!(err.notification(), (3, 1));
    }
}
