use crate::error::UpdateError;
use crate::models::*;
use crate::parser::ReadUtils;
use bytes::{Buf, Bytes};

pub fn parse_clusters(mut input: Bytes) -> Result<AttributeValue, UpdateError> {
    if input.len() % 4 != 0 {
        return Err(UpdateError::InvalidAttribute(format!(
            "invalid CLUSTER_LIST length {}",
            input.len()
        )));
    }
    let mut clusters = Vec::with_capacity(input.len() / 4);
    while input.has_remaining() {
        clusters.push(input.read_ipv4_address()?);
    }
    Ok(AttributeValue::ClusterList(ClusterList(clusters)))
}
