//! RLP helpers shared by all transaction shapes.

use alloy_rlp::{length_of_length, Error as RlpError, Header};
use bytes::BufMut;

/// Returns the length of an RLP list with the given payload length, header included.
#[inline]
pub(crate) fn list_length(payload_length: usize) -> usize {
    length_of_length(payload_length) + payload_length
}

/// Encodes the header of an RLP list with the given payload length.
#[inline]
pub(crate) fn encode_list_header(payload_length: usize, out: &mut dyn BufMut) {
    Header { list: true, payload_length }.encode(out);
}

/// Decodes an RLP list header and then the list payload with `f`.
///
/// Fails if `f` does not consume exactly the payload announced by the header.
pub(crate) fn decode_list<T>(
    buf: &mut &[u8],
    f: impl FnOnce(&mut &[u8]) -> alloy_rlp::Result<T>,
) -> alloy_rlp::Result<T> {
    let header = Header::decode(buf)?;
    if !header.list {
        return Err(RlpError::UnexpectedString)
    }
    if buf.len() < header.payload_length {
        return Err(RlpError::InputTooShort)
    }

    let remaining = buf.len();
    let value = f(buf)?;
    let consumed = remaining - buf.len();
    if consumed != header.payload_length {
        return Err(RlpError::ListLengthMismatch { expected: header.payload_length, got: consumed })
    }
    Ok(value)
}
