use crate::traits::Numeric;
use crate::write_vtk::BLOCK_HEADER_BYTES;

/// convert little endian bytes into a vector of numbers. Trailing bytes that do not form
/// a complete number are ignored.
pub(crate) fn values_from_le_bytes<NUM: Numeric>(bytes: &[u8]) -> Vec<NUM> {
    bytes
        .chunks_exact(NUM::SIZE)
        .map(NUM::from_le_slice)
        .collect()
}

/// slice the payload of a block that starts with a `UInt64` byte count at `offset`
pub(crate) fn read_block(bytes: &[u8], offset: usize) -> Option<&[u8]> {
    let header_end = offset.checked_add(BLOCK_HEADER_BYTES)?;
    let header = bytes.get(offset..header_end)?;
    let length = usize::try_from(u64::from_le_slice(header)).ok()?;

    bytes.get(header_end..header_end.checked_add(length)?)
}
