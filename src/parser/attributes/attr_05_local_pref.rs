use crate::error::UpdateError;
use crate::models::*;
use crate::parser::ReadUtils;
use bytes::Bytes;

pub fn parse_local_pref(mut input: Bytes) -> Result<AttributeValue, UpdateError> {
    if input.len() != 4 {
        return Err(UpdateError::InvalidAttribute(format!(
            "invalid LOCAL_PREF length {}",
            input.len()
        )));
    }
    Ok(AttributeValue::LocalPreference(input.read_u32()?))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_local_pref() {
        assert_eq!(
            parse_local_pref(Bytes::from_static(&[0, 0, 0, 200])).unwrap(),
            AttributeValue::LocalPreference(200)
        );
        assert_eq!(
            parse_local_pref(Bytes::new()).unwrap_err().notification(),
            (3, 2)
        );
    }
}
