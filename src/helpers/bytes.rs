//! Little-endian field access over raw BIFF record payloads.
//! Every accessor is bounds-checked so a truncated record surfaces as `None`
//! instead of a panic.

pub(crate) trait LittleEndian {
    /// Reads a 16-bit unsigned integer at `offset`.
    fn le_u16(&self, offset: usize) -> Option<u16>;

    /// Reads a 32-bit unsigned integer at `offset`.
    fn le_u32(&self, offset: usize) -> Option<u32>;

    /// Reads a 64-bit unsigned integer at `offset`.
    fn le_u64(&self, offset: usize) -> Option<u64>;

    /// Reads a 64-bit IEEE 754 float at `offset`.
    fn le_f64(&self, offset: usize) -> Option<f64> {
        self.le_u64(offset).map(f64::from_bits)
    }
}

impl LittleEndian for [u8] {
    #[inline]
    fn le_u16(&self, offset: usize) -> Option<u16> {
        let bytes: [u8; 2] = self.get(offset..offset.checked_add(2)?)?.try_into().ok()?;
        Some(u16::from_le_bytes(bytes))
    }

    #[inline]
    fn le_u32(&self, offset: usize) -> Option<u32> {
        let bytes: [u8; 4] = self.get(offset..offset.checked_add(4)?)?.try_into().ok()?;
        Some(u32::from_le_bytes(bytes))
    }

    #[inline]
    fn le_u64(&self, offset: usize) -> Option<u64> {
        let bytes: [u8; 8] = self.get(offset..offset.checked_add(8)?)?.try_into().ok()?;
        Some(u64::from_le_bytes(bytes))
    }
}
