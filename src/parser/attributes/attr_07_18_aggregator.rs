use crate::error::UpdateError;
use crate::models::*;
use crate::parser::ReadUtils;
use bytes::Bytes;

/// Parse AGGREGATOR or AS4_AGGREGATOR; the payload length selects the ASN
/// width: 6 bytes for the classic 2-byte form, 8 for the 4-byte one.
pub fn parse_aggregator(mut input: Bytes) -> Result<AttributeValue, UpdateError> {
    let width = match input.len() {
        6 => AsnLength::Bits16,
        8 => AsnLength::Bits32,
        other => {
            return Err(UpdateError::InvalidAttribute(format!(
                "invalid AGGREGATOR length {other}, expected 6 or 8"
            )))
        }
    };
    let asn = input.read_asn(width)?;
    let id = input.read_ipv4_address()?;
    Ok(AttributeValue::Aggregator(Aggregator::new(asn, id)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::net::Ipv4Addr;

    #[test]
    fn test_parse_aggregator() {
        let value = parse_aggregator(Bytes::from_static(&[1, 2, 10, 0, 0, 1])).unwrap();
        assert_eq!(
            value,
            AttributeValue::Aggregator(Aggregator::new(
                Asn::new_16bit(258),
                Ipv4Addr::new(10, 0, 0, 1)
            ))
        );

        let value = parse_aggregator(Bytes::from_static(&[0, 1, 0, 4, 10, 0, 0, 1])).unwrap();
        assert_eq!(
            value,
            AttributeValue::Aggregator(Aggregator::new(
                Asn::new_32bit(65540),
                Ipv4Addr::new(10, 0, 0, 1)
            ))
        );
    }

    #[test]
    fn test_parse_aggregator_bad_length() {
        let err = parse_aggregator(Bytes::from_static(&[1, 2, 10, 0, 0, 1, 0])).unwrap_err();
        assert_eq!(err.notification(), (3, 2));
    }
}
