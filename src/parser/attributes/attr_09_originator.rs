use crate::error::UpdateError;
use crate::models::*;
use crate::parser::ReadUtils;
use bytes::Bytes;

/// ORIGINATOR_ID (RFC 4456): the router id of the route's originator,
/// decoded from the attribute payload.
pub fn parse_originator_id(mut input: Bytes) -> Result<AttributeValue, UpdateError> {
    if input.len() != 4 {
        return Err(UpdateError::InvalidAttribute(format!(
            "invalid ORIGINATOR_ID length {}",
            input.len()
        )));
    }
    Ok(AttributeValue::OriginatorId(input.read_ipv4_address()?))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::net::Ipv4Addr;

    #[test]
    fn test_parse_originator_id() {
        assert_eq!(
            parse_originator_id(Bytes::from_static(&[10, 0, 0, 1])).unwrap(),
            AttributeValue::OriginatorId(Ipv4Addr::new(10, 0, 0, 1))
        );
        assert_eq!(
            parse_originator_id(Bytes::from_static(&[10, 0]))
                .unwrap_err()
                .notification(),
            (3, 2)
        );
    }
}
