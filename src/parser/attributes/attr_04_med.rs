use crate::error::UpdateError;
use crate::models::*;
use crate::parser::ReadUtils;
use bytes::Bytes;

pub fn parse_med(mut input: Bytes) -> Result<AttributeValue, UpdateError> {
    if input.len() != 4 {
        return Err(UpdateError::InvalidAttribute(format!(
            "invalid MED length {}",
            input.len()
        )));
    }
    Ok(AttributeValue::MultiExitDiscriminator(input.read_u32()?))
}
