use crate::graph::Vertex;
use bitvec::prelude::*;
use std::fmt;

////////////////////////////////////////////////////////////////////////////////
//
// VertexSet
//
////////////////////////////////////////////////////////////////////////////////

/// Ordered bit-parallel set over a universe `{0, .., n-1}` fixed at
/// construction.
///
/// The backing storage of `BitVec` is forced to `u64` so that whole-set
/// algebra can run on raw words regardless of the platform word size. Every
/// binary operation requires operands of the same universe; bits at positions
/// `>= universe()` are always zero.
#[derive(Clone, PartialEq, Eq)]
pub struct VertexSet {
    bits: BitVec<u64, Lsb0>,
}

impl VertexSet {
    pub fn empty(n: usize) -> Self {
        VertexSet {
            bits: bitvec![u64, Lsb0; 0; n],
        }
    }

    pub fn full(n: usize) -> Self {
        VertexSet {
            bits: bitvec![u64, Lsb0; 1; n],
        }
    }

    pub fn from_vertices<I: IntoIterator<Item = Vertex>>(
        n: usize,
        vs: I,
    ) -> Self {
        let mut b = Self::empty(n);
        for v in vs {
            b.insert(v);
        }
        b
    }

    /// Number of vertices in the universe (not the cardinality).
    pub fn universe(&self) -> usize {
        self.bits.len()
    }

    // Bit-op loops are written against raw words; shifted/partial accesses go
    // through `BitSlice` instead.
    fn words(&self) -> &[u64] {
        self.bits.as_raw_slice()
    }

    fn words_mut(&mut self) -> &mut [u64] {
        self.bits.as_raw_mut_slice()
    }

    /// Zeroes the storage bits at positions `universe()..`.
    fn mask_tail(&mut self) {
        let rem = self.bits.len() % 64;
        if rem != 0 {
            let m = (1u64 << rem) - 1;
            if let Some(last) = self.words_mut().last_mut() {
                *last &= m;
            }
        }
    }

    //--------------------------------------------------------------------------
    // Single-vertex operations
    //--------------------------------------------------------------------------

    pub fn contains(&self, v: Vertex) -> bool {
        debug_assert!((v as usize) < self.universe());
        self.bits[v as usize]
    }

    pub fn insert(&mut self, v: Vertex) {
        debug_assert!((v as usize) < self.universe());
        self.bits.set(v as usize, true);
    }

    pub fn remove(&mut self, v: Vertex) {
        debug_assert!((v as usize) < self.universe());
        self.bits.set(v as usize, false);
    }

    pub fn flip(&mut self, v: Vertex) {
        debug_assert!((v as usize) < self.universe());
        let x = self.bits[v as usize];
        self.bits.set(v as usize, !x);
    }

    //--------------------------------------------------------------------------
    // Whole-set queries
    //--------------------------------------------------------------------------

    pub fn count(&self) -> usize {
        self.bits.count_ones()
    }

    pub fn is_empty(&self) -> bool {
        self.bits.not_any()
    }

    pub fn first(&self) -> Option<Vertex> {
        self.bits.first_one().map(|i| i as Vertex)
    }

    pub fn last(&self) -> Option<Vertex> {
        self.bits.last_one().map(|i| i as Vertex)
    }

    /// Ascending iteration over members; `.rev()` for descending.
    pub fn iter(&self) -> impl DoubleEndedIterator<Item = Vertex> + '_ {
        self.bits.iter_ones().map(|i| i as Vertex)
    }

    //--------------------------------------------------------------------------
    // Whole-set algebra
    //--------------------------------------------------------------------------

    pub fn clear(&mut self) {
        self.words_mut().fill(0);
    }

    pub fn copy_from(&mut self, other: &Self) {
        debug_assert_eq!(self.universe(), other.universe());
        let w = other.words();
        self.words_mut().copy_from_slice(w);
    }

    pub fn intersect_with(&mut self, other: &Self) {
        debug_assert_eq!(self.universe(), other.universe());
        for (a, b) in self.words_mut().iter_mut().zip(other.words()) {
            *a &= b;
        }
    }

    pub fn union_with(&mut self, other: &Self) {
        debug_assert_eq!(self.universe(), other.universe());
        for (a, b) in self.words_mut().iter_mut().zip(other.words()) {
            *a |= b;
        }
    }

    pub fn xor_with(&mut self, other: &Self) {
        debug_assert_eq!(self.universe(), other.universe());
        for (a, b) in self.words_mut().iter_mut().zip(other.words()) {
            *a ^= b;
        }
    }

    /// Set difference: `self -= other`.
    pub fn difference_with(&mut self, other: &Self) {
        debug_assert_eq!(self.universe(), other.universe());
        for (a, b) in self.words_mut().iter_mut().zip(other.words()) {
            *a &= !b;
        }
    }

    pub fn intersection_into(&self, other: &Self, dst: &mut Self) {
        debug_assert_eq!(self.universe(), other.universe());
        debug_assert_eq!(self.universe(), dst.universe());
        for ((d, a), b) in dst
            .words_mut()
            .iter_mut()
            .zip(self.words())
            .zip(other.words())
        {
            *d = a & b;
        }
    }

    pub fn union_into(&self, other: &Self, dst: &mut Self) {
        debug_assert_eq!(self.universe(), other.universe());
        debug_assert_eq!(self.universe(), dst.universe());
        for ((d, a), b) in dst
            .words_mut()
            .iter_mut()
            .zip(self.words())
            .zip(other.words())
        {
            *d = a | b;
        }
    }

    pub fn xor_into(&self, other: &Self, dst: &mut Self) {
        debug_assert_eq!(self.universe(), other.universe());
        debug_assert_eq!(self.universe(), dst.universe());
        for ((d, a), b) in dst
            .words_mut()
            .iter_mut()
            .zip(self.words())
            .zip(other.words())
        {
            *d = a ^ b;
        }
    }

    pub fn difference_into(&self, other: &Self, dst: &mut Self) {
        debug_assert_eq!(self.universe(), other.universe());
        debug_assert_eq!(self.universe(), dst.universe());
        for ((d, a), b) in dst
            .words_mut()
            .iter_mut()
            .zip(self.words())
            .zip(other.words())
        {
            *d = a & !b;
        }
    }

    /// Complement within the universe.
    pub fn invert(&mut self) {
        for a in self.words_mut() {
            *a = !*a;
        }
        self.mask_tail();
    }

    //--------------------------------------------------------------------------
    // Predicates
    //--------------------------------------------------------------------------

    pub fn is_subset(&self, other: &Self) -> bool {
        debug_assert_eq!(self.universe(), other.universe());
        self.words()
            .iter()
            .zip(other.words())
            .all(|(a, b)| a & !b == 0)
    }

    pub fn is_superset(&self, other: &Self) -> bool {
        other.is_subset(self)
    }

    pub fn intersects(&self, other: &Self) -> bool {
        debug_assert_eq!(self.universe(), other.universe());
        self.words()
            .iter()
            .zip(other.words())
            .any(|(a, b)| a & b != 0)
    }

    /// Smallest vertex contained in exactly one of the two sets.
    pub fn first_difference(&self, other: &Self) -> Option<Vertex> {
        debug_assert_eq!(self.universe(), other.universe());
        for (i, (a, b)) in self.words().iter().zip(other.words()).enumerate() {
            let x = a ^ b;
            if x != 0 {
                return Some((i * 64 + x.trailing_zeros() as usize) as Vertex);
            }
        }
        None
    }

    //--------------------------------------------------------------------------
    // Windowed operations
    //
    // Each is equivalent to materializing the window `{.. v}` or `{v ..}` and
    // applying the plain operation; they only avoid the materialization.
    //--------------------------------------------------------------------------

    pub fn first_from(&self, v: Vertex) -> Option<Vertex> {
        let lo = (v as usize).min(self.universe());
        self.bits[lo..].first_one().map(|i| (i + lo) as Vertex)
    }

    pub fn last_before(&self, v: Vertex) -> Option<Vertex> {
        let hi = (v as usize).min(self.universe());
        self.bits[..hi].last_one().map(|i| i as Vertex)
    }

    pub fn iter_from(
        &self,
        v: Vertex,
    ) -> impl DoubleEndedIterator<Item = Vertex> + '_ {
        let lo = (v as usize).min(self.universe());
        self.bits[lo..].iter_ones().map(move |i| (i + lo) as Vertex)
    }

    pub fn iter_before(
        &self,
        v: Vertex,
    ) -> impl DoubleEndedIterator<Item = Vertex> + '_ {
        let hi = (v as usize).min(self.universe());
        self.bits[..hi].iter_ones().map(|i| i as Vertex)
    }

    pub fn count_before(&self, v: Vertex) -> usize {
        let hi = (v as usize).min(self.universe());
        self.bits[..hi].count_ones()
    }

    /// Removes every member at position `v` or later.
    pub fn remove_from(&mut self, v: Vertex) {
        let lo = (v as usize).min(self.universe());
        self.bits[lo..].fill(false);
    }

    pub fn remove_before(&mut self, v: Vertex) {
        let hi = (v as usize).min(self.universe());
        self.bits[..hi].fill(false);
    }

    /// `dst = {u in self & other : u < v}`
    pub fn intersection_before_into(
        &self,
        other: &Self,
        v: Vertex,
        dst: &mut Self,
    ) {
        debug_assert_eq!(self.universe(), other.universe());
        debug_assert_eq!(self.universe(), dst.universe());
        let hi = (v as usize).min(self.universe());
        let nw = self.words().len();
        let whole = hi / 64;
        let rem = hi % 64;
        for i in 0..whole {
            dst.words_mut()[i] = self.words()[i] & other.words()[i];
        }
        if whole < nw {
            let m = if rem == 0 { 0 } else { (1u64 << rem) - 1 };
            dst.words_mut()[whole] = self.words()[whole] & other.words()[whole] & m;
            for i in (whole + 1)..nw {
                dst.words_mut()[i] = 0;
            }
        }
    }
}

impl fmt::Debug for VertexSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.iter()).finish()
    }
}

////////////////////////////////////////////////////////////////////////////////
//
// Tests
//
////////////////////////////////////////////////////////////////////////////////
