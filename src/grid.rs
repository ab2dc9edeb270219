//! C1 — Grid & Field Store.
//!
//! One contiguous buffer per field component, addressed through a
//! [`Strider`], the same shape as the teacher's `Lattice`/`Strider` pair
//! (`app/solver/fdtd/lattice.rs`). Unlike the teacher, each E/B axis gets its
//! own scalar buffer instead of one `Vector3<f64>` per cell: the update
//! stencils (§4.3) and the PEC mask (§3) address each component
//! independently, so packing them together would only add indirection.

use std::ops::{
    Index,
    IndexMut,
};

use serde::{
    Deserialize,
    Serialize,
};

/// Maps 1-based `(i, j, k)` cell coordinates to a flat buffer offset.
///
/// Indices run `1..=sx`, `1..=sy`, `1..=sz` (spec §3); `i` varies fastest.
#[derive(Clone, Copy, Debug, Serialize, Deserialize)]
pub struct Strider {
    sx: usize,
    sy: usize,
    sz: usize,
}

impl Strider {
    pub fn new(sx: usize, sy: usize, sz: usize) -> Self {
        Self { sx, sy, sz }
    }

    pub fn size(&self) -> (usize, usize, usize) {
        (self.sx, self.sy, self.sz)
    }

    pub fn len(&self) -> usize {
        self.sx * self.sy * self.sz
    }

    #[inline]
    pub fn index(&self, i: usize, j: usize, k: usize) -> usize {
        debug_assert!((1..=self.sx).contains(&i), "i={i} out of range 1..={}", self.sx);
        debug_assert!((1..=self.sy).contains(&j), "j={j} out of range 1..={}", self.sy);
        debug_assert!((1..=self.sz).contains(&k), "k={k} out of range 1..={}", self.sz);
        (i - 1) + (j - 1) * self.sx + (k - 1) * self.sx * self.sy
    }

    /// Iterates `(i, j, k)` over the full inclusive `1..=sx × 1..=sy × 1..=sz` range.
    pub fn iter_all(&self) -> impl Iterator<Item = (usize, usize, usize)> + '_ {
        (1..=self.sz).flat_map(move |k| {
            (1..=self.sy).flat_map(move |j| (1..=self.sx).map(move |i| (i, j, k)))
        })
    }

    /// Iterates the interior domain `2..sx × 2..sy × 2..sz` used by the
    /// Maxwell updater (spec §4.3).
    pub fn iter_interior(&self) -> impl Iterator<Item = (usize, usize, usize)> + '_ {
        (2..self.sz).flat_map(move |k| (2..self.sy).flat_map(move |j| (2..self.sx).map(move |i| (i, j, k))))
    }
}

/// Buffer holding a `prev`/`cur` pair, selected by the parity of the tick
/// counter. Copied in spirit from `app/solver/fdtd/util.rs::SwapBuffer`.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct SwapBuffer<T> {
    buffer: [T; 2],
}

#[derive(Clone, Copy, Debug, Serialize, Deserialize)]
pub struct SwapBufferIndex {
    index: usize,
}

impl SwapBufferIndex {
    pub fn from_tick(tick: u64) -> Self {
        Self {
            index: (tick % 2) as usize,
        }
    }

    pub fn other(&self) -> Self {
        Self {
            index: (self.index + 1) % 2,
        }
    }
}

impl<T> SwapBuffer<T> {
    pub fn from_fn(mut f: impl FnMut(usize) -> T) -> Self {
        Self {
            buffer: [f(0), f(1)],
        }
    }
}

impl<T> Index<SwapBufferIndex> for SwapBuffer<T> {
    type Output = T;

    fn index(&self, index: SwapBufferIndex) -> &T {
        &self.buffer[index.index]
    }
}

impl<T> IndexMut<SwapBufferIndex> for SwapBuffer<T> {
    fn index_mut(&mut self, index: SwapBufferIndex) -> &mut T {
        &mut self.buffer[index.index]
    }
}

/// One field component (e.g. `EX`): a two-slot buffer of scalars over the
/// whole grid.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ScalarField {
    data: SwapBuffer<Box<[f64]>>,
}

impl ScalarField {
    pub fn zeros(strider: &Strider) -> Self {
        Self {
            data: SwapBuffer::from_fn(|_| vec![0.0; strider.len()].into_boxed_slice()),
        }
    }

    pub fn reset(&mut self, strider: &Strider) {
        *self = Self::zeros(strider);
    }

    #[inline]
    pub fn get(&self, strider: &Strider, slot: SwapBufferIndex, i: usize, j: usize, k: usize) -> f64 {
        self.data[slot][strider.index(i, j, k)]
    }

    #[inline]
    pub fn set(&mut self, strider: &Strider, slot: SwapBufferIndex, i: usize, j: usize, k: usize, value: f64) {
        let index = strider.index(i, j, k);
        self.data[slot][index] = value;
    }
}

/// One relative-inverse-permittivity volume (`ERX`, `ERY`, or `ERZ`):
/// single-slot, not time-varying (spec §3).
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct PermittivityVolume {
    data: Box<[f64]>,
}

impl PermittivityVolume {
    pub fn vacuum(strider: &Strider) -> Self {
        Self {
            data: vec![1.0; strider.len()].into_boxed_slice(),
        }
    }

    #[inline]
    pub fn get(&self, strider: &Strider, i: usize, j: usize, k: usize) -> f64 {
        self.data[strider.index(i, j, k)]
    }

    #[inline]
    pub fn set(&mut self, strider: &Strider, i: usize, j: usize, k: usize, value: f64) {
        let index = strider.index(i, j, k);
        self.data[index] = value;
    }
}

/// Owns E, B and ER for the whole domain (C1).
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Grid {
    pub strider: Strider,
    pub ex: ScalarField,
    pub ey: ScalarField,
    pub ez: ScalarField,
    pub bx: ScalarField,
    pub by: ScalarField,
    pub bz: ScalarField,
    pub erx: PermittivityVolume,
    pub ery: PermittivityVolume,
    pub erz: PermittivityVolume,
}

impl Grid {
    pub fn new(sx: usize, sy: usize, sz: usize) -> Self {
        let strider = Strider::new(sx, sy, sz);
        Self {
            ex: ScalarField::zeros(&strider),
            ey: ScalarField::zeros(&strider),
            ez: ScalarField::zeros(&strider),
            bx: ScalarField::zeros(&strider),
            by: ScalarField::zeros(&strider),
            bz: ScalarField::zeros(&strider),
            erx: PermittivityVolume::vacuum(&strider),
            ery: PermittivityVolume::vacuum(&strider),
            erz: PermittivityVolume::vacuum(&strider),
            strider,
        }
    }

    /// Re-zeros all field storage, matching `ClearArrays` in the original
    /// program. Permittivity volumes are reset to vacuum; the scenario
    /// loader re-stamps PEC/dielectric cells afterwards.
    pub fn reset(&mut self) {
        self.ex.reset(&self.strider);
        self.ey.reset(&self.strider);
        self.ez.reset(&self.strider);
        self.bx.reset(&self.strider);
        self.by.reset(&self.strider);
        self.bz.reset(&self.strider);
        self.erx = PermittivityVolume::vacuum(&self.strider);
        self.ery = PermittivityVolume::vacuum(&self.strider);
        self.erz = PermittivityVolume::vacuum(&self.strider);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strider_indexes_x_fastest() {
        let strider = Strider::new(3, 4, 5);
        assert_eq!(strider.index(1, 1, 1), 0);
        assert_eq!(strider.index(2, 1, 1), 1);
        assert_eq!(strider.index(1, 2, 1), 3);
        assert_eq!(strider.index(1, 1, 2), 12);
        assert_eq!(strider.len(), 60);
    }

    #[test]
    fn swap_buffer_parity_alternates() {
        let a = SwapBufferIndex::from_tick(0);
        let b = SwapBufferIndex::from_tick(1);
        assert_eq!(a.other().index, b.index);
    }

    #[test]
    fn scalar_field_roundtrips() {
        let strider = Strider::new(4, 4, 4);
        let mut field = ScalarField::zeros(&strider);
        let cur = SwapBufferIndex::from_tick(0);
        field.set(&strider, cur, 2, 2, 2, 42.0);
        assert_eq!(field.get(&strider, cur, 2, 2, 2), 42.0);
    }
}
