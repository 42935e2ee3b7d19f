// ============ Molecule Layout ============
// Minimal molecule encoders for the structures this crate hashes or sizes.
// Offsets and lengths are u32 little-endian.

pub const NUMBER_SIZE: usize = 4;

pub fn table_header_size(field_count: usize) -> usize {
    NUMBER_SIZE * (field_count + 1)
}

/// `table`: total size, one offset per field, then the fields.
pub fn table(fields: &[&[u8]]) -> Vec<u8> {
    let header = table_header_size(fields.len());
    let total = header + fields.iter().map(|f| f.len()).sum::<usize>();

    let mut buf = Vec::with_capacity(total);
    buf.extend_from_slice(&(total as u32).to_le_bytes());
    let mut offset = header;
    for field in fields {
        buf.extend_from_slice(&(offset as u32).to_le_bytes());
        offset += field.len();
    }
    for field in fields {
        buf.extend_from_slice(field);
    }
    buf
}

/// `fixvec<byte>`: item count, then items.
pub fn fixvec(items: &[u8]) -> Vec<u8> {
    let mut buf = Vec::with_capacity(NUMBER_SIZE + items.len());
    buf.extend_from_slice(&(items.len() as u32).to_le_bytes());
    buf.extend_from_slice(items);
    buf
}

/// Serialized size of a `dynvec` whose items have the given sizes.
pub fn dynvec_size<I: IntoIterator<Item = usize>>(item_sizes: I) -> usize {
    let mut count = 0;
    let mut body = 0;
    for size in item_sizes {
        count += 1;
        body += size;
    }
    NUMBER_SIZE + NUMBER_SIZE * count + body
}

/// `WitnessArgs` with only the lock field set.
pub fn witness_args_with_lock(lock: &[u8]) -> Vec<u8> {
    let lock = fixvec(lock);
    table(&[&lock, &[], &[]])
}
