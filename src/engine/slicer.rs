//! Byte range extraction

use super::{DecodeError, SliceEdge};

/// `payload[from..to]`, or `payload[from..]` without `to`.
///
/// A start offset past the last byte is out of bounds (offset 0 is always
/// accepted), as is an end offset past the payload or before the start.
pub fn slice(payload: &[u8], from: usize, to: Option<usize>) -> Result<&[u8], DecodeError> {
    let size = payload.len();

    if from > 0 && from >= size {
        return Err(DecodeError::SliceBounds {
            edge: SliceEdge::Start,
            offset: from,
            size,
        });
    }

    match to {
        Some(to) if to > size || to < from => Err(DecodeError::SliceBounds {
            edge: SliceEdge::End,
            offset: to,
            size,
        }),
        Some(to) => Ok(&payload[from..to]),
        None => Ok(&payload[from..]),
    }
}
