//! Packed encoding of the `MultiSendCallOnly` transaction batch

use alloy_primitives::{Bytes, U256};

use crate::traits::MetaTransaction;

/// The Safe operation code for a regular call
pub const OPERATION_CALL: u8 = 0;
/// The Safe operation code for a delegate call
pub const OPERATION_DELEGATE_CALL: u8 = 1;

/// Encode a list of calls into the `transactions` argument of
/// `multiSend(bytes)`
///
/// Each call is packed as
/// `operation (1) || to (20) || value (32) || data length (32) || data`
pub fn encode_multisend(calls: &[MetaTransaction]) -> Bytes {
    let mut buf = Vec::new();
    for call in calls {
        buf.push(OPERATION_CALL);
        buf.extend_from_slice(call.to.as_slice());
        buf.extend_from_slice(&call.value.to_be_bytes::<32>());
        buf.extend_from_slice(&U256::from(call.data.len()).to_be_bytes::<32>());
        buf.extend_from_slice(&call.data);
    }

    buf.into()
}
