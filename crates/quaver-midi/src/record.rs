//! Record framing inside a buffer's byte storage.
//!
//! Each record is `[time: i32 LE][len: u16 LE][payload; len]`, packed back to
//! back with no padding. Every function here takes the offset of a record
//! header that is known to be in bounds.

pub(crate) const TIME_LEN: usize = 4;
pub(crate) const HEADER_LEN: usize = TIME_LEN + 2;

#[inline]
pub(crate) fn framed_size(payload_len: usize) -> usize {
    HEADER_LEN + payload_len
}

#[inline]
pub(crate) fn time_at(data: &[u8], offset: usize) -> i32 {
    i32::from_le_bytes([
        data[offset],
        data[offset + 1],
        data[offset + 2],
        data[offset + 3],
    ])
}

#[inline]
pub(crate) fn payload_len_at(data: &[u8], offset: usize) -> usize {
    u16::from_le_bytes([data[offset + TIME_LEN], data[offset + TIME_LEN + 1]]) as usize
}

/// Full framed size of the record at `offset`.
#[inline]
pub(crate) fn size_at(data: &[u8], offset: usize) -> usize {
    framed_size(payload_len_at(data, offset))
}

#[inline]
pub(crate) fn payload_at(data: &[u8], offset: usize) -> &[u8] {
    let start = offset + HEADER_LEN;
    &data[start..start + payload_len_at(data, offset)]
}

/// Writes one record into `dst`, which must be exactly `framed_size(payload.len())` long.
/// Callers guarantee `payload.len() <= u16::MAX`.
#[inline]
pub(crate) fn write(dst: &mut [u8], time: i32, payload: &[u8]) {
    debug_assert_eq!(dst.len(), framed_size(payload.len()));
    dst[..TIME_LEN].copy_from_slice(&time.to_le_bytes());
    dst[TIME_LEN..HEADER_LEN].copy_from_slice(&(payload.len() as u16).to_le_bytes());
    dst[HEADER_LEN..].copy_from_slice(payload);
}

/// Offset of the first record at or after `from` whose time satisfies
/// `stop`, or `data.len()` if there is none. Only headers are read.
#[inline]
pub(crate) fn seek(data: &[u8], mut from: usize, stop: impl Fn(i32) -> bool) -> usize {
    while from < data.len() && !stop(time_at(data, from)) {
        from += size_at(data, from);
    }
    from
}
