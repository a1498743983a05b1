use crate::error::UpdateError;
use crate::models::*;
use bytes::Bytes;

/// ```text
/// ORIGIN is a well-known mandatory attribute that defines the
///        origin of the path information.  The data octet can assume
///        the following values:
///
///           Value      Meaning
///
///           0         IGP - Network Layer Reachability Information
///                        is interior to the originating AS
///
///           1         EGP - Network Layer Reachability Information
///                        learned via the EGP protocol [RFC904]
///
///           2         INCOMPLETE - Network Layer Reachability
///                        Information learned by some other means
/// ```
pub fn parse_origin(input: Bytes) -> Result<AttributeValue, UpdateError> {
    if input.len() != 1 {
        return Err(UpdateError::InvalidAttribute(format!(
            "invalid ORIGIN length {}",
            input.len()
        )));
    }
    let origin = Origin::try_from(input[0])
        .map_err(|_| UpdateError::InvalidAttribute(format!("invalid ORIGIN {}", input[0])))?;
    Ok(AttributeValue::Origin(origin))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_origin() {
        assert_eq!(
            AttributeValue::Origin(Origin::IGP),
            parse_origin(Bytes::from_static(&[0u8])).unwrap()
        );
        assert_eq!(
            AttributeValue::Origin(Origin::EGP),
            parse_origin(Bytes::from_static(&[1u8])).unwrap()
        );
        assert_eq!(
            AttributeValue::Origin(Origin::INCOMPLETE),
            parse_origin(Bytes::from_static(&[2u8])).unwrap()
        );
        assert_eq!(
            parse_origin(Bytes::from_static(&[5u8]))
                .unwrap_err()
                .notification(),
            (3, 2)
        );
        assert_eq!(
            parse_origin(Bytes::from_static(&[0, 0]))
                .unwrap_err()
                .notification(),
            (3, 2)
        );
    }
}
