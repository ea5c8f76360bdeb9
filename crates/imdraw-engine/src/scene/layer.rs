use std::fmt;

/// Identifier of a named draw layer.
///
/// Applications group primitives into layers to change draw state per layer
/// (e.g. enable depth testing for one group). Ids are a 32-bit FNV-1a hash of the name,
/// so the same name always maps to the same id across frames.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Ord, PartialOrd)]
pub struct LayerId(pub u32);

impl LayerId {
    pub const fn from_name(name: &str) -> Self {
        const OFFSET: u32 = 0x811c_9dc5;
        const PRIME: u32 = 0x0100_0193;

        let bytes = name.as_bytes();
        let mut hash = OFFSET;
        let mut i = 0;
        while i < bytes.len() {
            hash ^= bytes[i] as u32;
            hash = hash.wrapping_mul(PRIME);
            i += 1;
        }
        Self(hash)
    }
}

impl fmt::Debug for LayerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "LayerId({:#010x})", self.0)
    }
}
