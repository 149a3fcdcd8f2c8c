use crate::SyntaxKind;

const SIZE: usize = 1;

/// Bit set of [`SyntaxKind`]s, usable in `const` contexts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Hash)]
pub struct SyntaxSet {
    bits: [u64; SIZE],
}

impl SyntaxSet {
    pub const EMPTY: Self = Self { bits: [0; SIZE] };
    pub const ALL: Self = Self { bits: [u64::MAX; SIZE] };
    const BITS_PER_SLOT: u16 = u64::BITS as u16;

    const fn from_kind(kind: SyntaxKind) -> Self {
        let kind = kind as u16;

        let slot_index = (kind / Self::BITS_PER_SLOT) as usize;

        debug_assert!(
            slot_index < Self::EMPTY.bits.len(),
            "Index out of bounds. Increase the size of the bitset array."
        );

        let bit_index = kind % Self::BITS_PER_SLOT;
        let mask = 1 << bit_index;

        let mut bits = Self::EMPTY.bits;
        bits[slot_index] = mask;

        Self { bits }
    }

    pub const fn union(mut self, other: &Self) -> Self {
        let mut i = 0;

        while i < self.bits.len() {
            self.bits[i] |= other.bits[i];
            i += 1;
        }

        self
    }

    pub const fn new<const N: usize>(kinds: [SyntaxKind; N]) -> Self {
        let mut set = Self::EMPTY;

        let mut i = 0;
        while i < kinds.len() {
            set = set.union(&Self::from_kind(kinds[i]));
            i += 1;
        }

        set
    }

    pub const fn contains(&self, kind: SyntaxKind) -> bool {
        let kind = kind as u16;
        let slot_index = (kind / Self::BITS_PER_SLOT) as usize;
        let bit_index = kind % Self::BITS_PER_SLOT;
        let mask = 1 << bit_index;

        self.bits[slot_index] & mask != 0
    }

    /// Returns `true` if exactly one kind is in the set.
    pub const fn is_single(&self) -> bool {
        let mut count = 0;
        let mut i = 0;
        while i < self.bits.len() {
            count += self.bits[i].count_ones();
            i += 1;
        }
        count == 1
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::SyntaxKind::*;

    #[test]
    fn union_and_contains() {
        let parens = SyntaxSet::new([L_PAREN, R_PAREN]);
        let braces = SyntaxSet::new([L_BRACE, R_BRACE]);
        let all = parens.union(&braces);

        assert!(all.contains(L_PAREN));
        assert!(all.contains(R_BRACE));
        assert!(!parens.contains(L_BRACE));
        assert!(!SyntaxSet::EMPTY.contains(EOF));
        assert!(SyntaxSet::ALL.contains(TOMBSTONE));
        assert!(SyntaxSet::new([COMMA]).is_single());
        assert!(!parens.is_single());
    }
}
