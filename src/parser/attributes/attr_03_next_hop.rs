use crate::error::UpdateError;
use crate::models::*;
use bytes::Bytes;

/// The NEXT_HOP attribute proper only ever carries an ipv4 address; every
/// other family's next hop travels inside MP_REACH_NLRI.
pub fn parse_next_hop(input: Bytes) -> Result<AttributeValue, UpdateError> {
    if input.len() != 4 {
        return Err(UpdateError::InvalidAttribute(format!(
            "invalid NEXT_HOP length {}",
            input.len()
        )));
    }
    Ok(AttributeValue::NextHop(NextHop::new(
        Afi::Ipv4,
        Safi::UnicastMulticast,
        input,
    )))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_next_hop() {
        let value = parse_next_hop(Bytes::from_static(&[10, 0, 0, 1])).unwrap();
        match &value {
            AttributeValue::NextHop(next_hop) => {
                assert_eq!(next_hop.afi, Afi::Ipv4);
                assert_eq!(next_hop.safi, Safi::UnicastMulticast);
                assert_eq!(next_hop.to_string(), "10.0.0.1");
            }
            other => panic!("unexpected value: {other:?}"),
        }
    }

    #[test]
    fn test_parse_next_hop_bad_length() {
        let err = parse_next_hop(Bytes::from_static(&[10, 0, 0])).unwrap_err();
        assert_eq!(err.notification(), (3, 2));
    }
}
