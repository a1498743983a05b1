use crate::error::UpdateError;
use crate::models::*;
use bytes::{Buf, Bytes};

pub fn parse_extended_communities(mut input: Bytes) -> Result<AttributeValue, UpdateError> {
    if input.len() % 8 != 0 {
        return Err(UpdateError::MalformedCommunity(format!(
            "could not decode extended community, {} trailing bytes",
            input.len() % 8
        )));
    }
    let mut communities = Vec::with_capacity(input.len() / 8);
    while input.has_remaining() {
        let mut value = [0u8; 8];
        input.copy_to_slice(&mut value);
        communities.push(ExtendedCommunity(value));
    }
    Ok(AttributeValue::ExtendedCommunities(ExtendedCommunities(
        communities,
    )))
}
