//! C5 — Plasma Fluid Updater.
//!
//! Grounded directly on `archive/pffdtd_legacy/plasma.h`'s `Ucalc`/`Ncalc`/
//! `PLASMAclear`: the momentum and continuity equations are transcribed
//! literally (spec §4.5 requires bit-for-bit reproduction up to
//! floating-point associativity), while the storage shape follows this
//! crate's own [`crate::grid`] conventions (a `Strider` plus boxed slices)
//! rather than the original's five-dimensional pointer arrays.

use std::f64::consts::PI;

use serde::{
    Deserialize,
    Serialize,
};

use crate::{
    axis::Axis,
    grid::{
        Grid,
        Strider,
        SwapBufferIndex,
    },
    physics::plasma_constants,
};

pub const SPECIES_COUNT: usize = 3;

/// Cells with `i < U_LO` or `i >= sx - U_HI_MARGIN` (and likewise j, k) keep
/// last step's U; `Ucalc` never touches them (spec §4.5).
const U_LO: usize = 4;
const U_HI_MARGIN: usize = 3;

/// Same, one cell wider, for the continuity update.
const N_LO: usize = 5;
const N_HI_MARGIN: usize = 4;

/// A rolling three-time-level scalar volume: `[0]` = two steps ago, `[1]` =
/// last step, `[2]` = the value being computed this step.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Slots3 {
    data: [Box<[f64]>; 3],
}

impl Slots3 {
    fn zeros(strider: &Strider) -> Self {
        let zero = || vec![0.0; strider.len()].into_boxed_slice();
        Self {
            data: [zero(), zero(), zero()],
        }
    }

    #[inline]
    pub fn get(&self, strider: &Strider, slot: usize, i: usize, j: usize, k: usize) -> f64 {
        self.data[slot][strider.index(i, j, k)]
    }

    #[inline]
    pub fn set(&mut self, strider: &Strider, slot: usize, i: usize, j: usize, k: usize, value: f64) {
        let index = strider.index(i, j, k);
        self.data[slot][index] = value;
    }

    /// `[0] <- [1]`, `[1] <- [2]`, matching the original's "save old" pair of
    /// assignments that precede every `Ucalc`/`Ncalc` write.
    fn advance(&mut self) {
        self.data[0] = self.data[1].clone();
        self.data[1] = self.data[2].clone();
    }
}

#[derive(Clone, Copy, Debug, Serialize, Deserialize)]
pub struct PlasmaSpecies {
    pub mass: f64,
    pub charge: f64,
    pub population_fraction: f64,
}

/// Per-species rolling fluid state: bulk velocity components and the
/// perturbation density.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct SpeciesFields {
    pub ux: Slots3,
    pub uy: Slots3,
    pub uz: Slots3,
    pub n: Slots3,
}

impl SpeciesFields {
    fn zeros(strider: &Strider) -> Self {
        Self {
            ux: Slots3::zeros(strider),
            uy: Slots3::zeros(strider),
            uz: Slots3::zeros(strider),
            n: Slots3::zeros(strider),
        }
    }
}

/// Cyclotron / drift / thermal parameters plus the per-cell masks (spec
/// §3 "Plasma state").
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct PlasmaParams {
    pub freq_plasma: f64,
    pub freq_col_ratio: f64,
    pub freq_cyc: f64,
    pub angle_elevation_deg: f64,
    pub angle_azimuth_deg: f64,
    pub drift_ux0: f64,
    pub drift_uy0: f64,
    pub drift_uz0: f64,
    pub temperature_kelvin: f64,
    /// Antenna charging delta applied to `QF` (spec §6.2, `cA==1` cells).
    pub antenna_charge: f64,
}

impl Default for PlasmaParams {
    fn default() -> Self {
        Self {
            freq_plasma: 10e6,
            freq_col_ratio: 0.1,
            freq_cyc: 1.5 * 10e6,
            angle_elevation_deg: 0.0,
            angle_azimuth_deg: 0.0,
            drift_ux0: 1.0,
            drift_uy0: 1.0,
            drift_uz0: 1.0,
            temperature_kelvin: 0.0,
            antenna_charge: 1.0,
        }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct PlasmaState {
    pub params: PlasmaParams,
    pub species: [PlasmaSpecies; SPECIES_COUNT],
    pub n0: [f64; SPECIES_COUNT],
    pub fields: Vec<SpeciesFields>,
    /// Plasma conductivity mask: 1 where plasma current is computed.
    pub sig: Box<[f64]>,
    /// Electron charging factor: 1 in vacuum, `antenna_charge` on antenna cells.
    pub qf: Box<[f64]>,
}

impl PlasmaState {
    /// Mirrors `PLASMAclear`: electron mass/charge first, then two ion
    /// species with the masses/population fractions hard-coded in the
    /// original (O: 2.6566e-26 kg, NO: 4.9824e-26 kg; 75%/25% split).
    pub fn new(strider: &Strider, params: PlasmaParams, vacuum_permittivity: f64) -> Self {
        let electron_charge = plasma_constants::ELECTRON_CHARGE;
        let species = [
            PlasmaSpecies {
                mass: plasma_constants::ELECTRON_MASS,
                charge: electron_charge,
                population_fraction: 1.0,
            },
            PlasmaSpecies {
                mass: 2.6566e-26,
                charge: -electron_charge,
                population_fraction: 0.75,
            },
            PlasmaSpecies {
                mass: 4.9824e-26,
                charge: -electron_charge,
                population_fraction: 0.25,
            },
        ];

        let n0_electron = 4.0 * PI * PI * params.freq_plasma * params.freq_plasma * species[0].mass
            * vacuum_permittivity
            / (electron_charge * electron_charge);
        let mut n0 = [0.0; SPECIES_COUNT];
        n0[0] = n0_electron;
        for m in 1..SPECIES_COUNT {
            n0[m] = n0_electron * species[m].population_fraction;
        }

        Self {
            params,
            species,
            n0,
            fields: (0..SPECIES_COUNT).map(|_| SpeciesFields::zeros(strider)).collect(),
            sig: vec![0.0; strider.len()].into_boxed_slice(),
            qf: vec![1.0; strider.len()].into_boxed_slice(),
        }
    }

    /// Stamps `SIG=1` over the interior where all three ER components are
    /// vacuum (spec §3 invariant 2: `SIG ⇒ ERX=ERY=ERZ=1`).
    pub fn stamp_sig(&mut self, grid: &Grid) {
        let strider = &grid.strider;
        let (sx, sy, sz) = strider.size();
        for k in 6..sz.saturating_sub(4) {
            for j in 6..sy.saturating_sub(4) {
                for i in 6..sx.saturating_sub(4) {
                    let vacuum = grid.erx.get(strider, i, j, k) == 1.0
                        && grid.ery.get(strider, i, j, k) == 1.0
                        && grid.erz.get(strider, i, j, k) == 1.0;
                    if vacuum {
                        self.sig[strider.index(i, j, k)] = 1.0;
                    }
                }
            }
        }
    }

    #[inline]
    fn sig_at(&self, strider: &Strider, i: usize, j: usize, k: usize) -> f64 {
        self.sig[strider.index(i, j, k)]
    }

    #[inline]
    fn qf_at(&self, strider: &Strider, i: usize, j: usize, k: usize) -> f64 {
        self.qf[strider.index(i, j, k)]
    }

    /// `Ucalc`: momentum update for every species over the active band.
    pub fn momentum_update(&mut self, grid: &Grid, cur: SwapBufferIndex, prev: SwapBufferIndex, dt: f64, dx: f64, dy: f64, dz: f64) {
        let strider = grid.strider;
        let (sx, sy, sz) = strider.size();

        let c_u1 = 2.0 * dt;
        let c_u2 = 4.0 * PI * dt;
        let c_u_tx = plasma_constants::BOLTZMANN * self.params.temperature_kelvin * dt / dx;
        let c_u_ty = plasma_constants::BOLTZMANN * self.params.temperature_kelvin * dt / dy;
        let c_u_tz = plasma_constants::BOLTZMANN * self.params.temperature_kelvin * dt / dz;

        let omega_c = 2.0 * PI * self.params.freq_cyc;
        let theta_e = self.params.angle_elevation_deg * PI / 180.0;
        let theta_a = self.params.angle_azimuth_deg * PI / 180.0;
        let me = plasma_constants::ELECTRON_MASS;
        let qe = plasma_constants::ELECTRON_CHARGE;
        let bx0 = omega_c * me / qe * theta_e.sin() * theta_a.cos();
        let by0 = omega_c * me / qe * theta_e.sin() * theta_a.sin();
        let bz0 = omega_c * me / qe * theta_e.cos();

        let (ux0, uy0, uz0) = (self.params.drift_ux0, self.params.drift_uy0, self.params.drift_uz0);
        let ee_x = uy0 * bz0 - uz0 * bz0;
        let ee_y = uz0 * bx0 - ux0 * bz0;
        let ee_z = ux0 * by0 - uy0 * bx0;

        for m in 0..SPECIES_COUNT {
            self.fields[m].ux.advance();
            self.fields[m].uy.advance();
            self.fields[m].uz.advance();

            let mass = self.species[m].mass;
            let charge = self.species[m].charge;
            let n0 = self.n0[m];

            for k in U_LO..sz - U_HI_MARGIN {
                for j in U_LO..sy - U_HI_MARGIN {
                    for i in U_LO..sx - U_HI_MARGIN {
                        let qf = self.qf_at(&strider, i, j, k);

                        let abx = (grid.bx.get(&strider, prev, i, j, k)
                            + grid.bx.get(&strider, prev, i, j + 1, k)
                            + grid.bx.get(&strider, prev, i, j + 1, k + 1)
                            + grid.bx.get(&strider, prev, i, j, k + 1)
                            + grid.bx.get(&strider, cur, i, j, k)
                            + grid.bx.get(&strider, cur, i, j + 1, k)
                            + grid.bx.get(&strider, cur, i, j + 1, k + 1)
                            + grid.bx.get(&strider, cur, i, j, k + 1))
                            / 8.0;
                        let aby = (grid.by.get(&strider, prev, i, j, k)
                            + grid.by.get(&strider, prev, i + 1, j, k)
                            + grid.by.get(&strider, prev, i + 1, j, k + 1)
                            + grid.by.get(&strider, prev, i, j, k + 1)
                            + grid.by.get(&strider, cur, i, j, k)
                            + grid.by.get(&strider, cur, i + 1, j, k)
                            + grid.by.get(&strider, cur, i + 1, j, k + 1)
                            + grid.by.get(&strider, cur, i, j, k + 1))
                            / 8.0;
                        let abz = (grid.bz.get(&strider, prev, i, j, k)
                            + grid.bz.get(&strider, prev, i + 1, j, k)
                            + grid.bz.get(&strider, prev, i + 1, j + 1, k)
                            + grid.bz.get(&strider, prev, i, j + 1, k)
                            + grid.bz.get(&strider, cur, i, j, k)
                            + grid.bz.get(&strider, cur, i + 1, j, k)
                            + grid.bz.get(&strider, cur, i + 1, j + 1, k)
                            + grid.bz.get(&strider, cur, i, j + 1, k))
                            / 8.0;

                        let u1x = self.fields[m].ux.get(&strider, 1, i, j, k);
                        let u1y = self.fields[m].uy.get(&strider, 1, i, j, k);
                        let u1z = self.fields[m].uz.get(&strider, 1, i, j, k);
                        let u0x = self.fields[m].ux.get(&strider, 0, i, j, k);
                        let u0y = self.fields[m].uy.get(&strider, 0, i, j, k);
                        let u0z = self.fields[m].uz.get(&strider, 0, i, j, k);

                        let n2_ip1 = self.fields[m].n.get(&strider, 2, i + 1, j, k);
                        let n2_im1 = self.fields[m].n.get(&strider, 2, i - 1, j, k);
                        let n2_jp1 = self.fields[m].n.get(&strider, 2, i, j + 1, k);
                        let n2_jm1 = self.fields[m].n.get(&strider, 2, i, j - 1, k);
                        let n2_kp1 = self.fields[m].n.get(&strider, 2, i, j, k + 1);
                        let n2_km1 = self.fields[m].n.get(&strider, 2, i, j, k - 1);

                        let new_x = u0x
                            + (qf
                                * (charge * dt * (grid.ex.get(&strider, cur, i, j, k) + grid.ex.get(&strider, cur, i + 1, j, k))
                                    + charge * c_u1 * (u1y * bz0 + uy0 * abz - u1z * by0 - uz0 * aby + ee_x))
                                - c_u_tx * (n2_ip1 - n2_im1) / n0)
                                / mass
                            - c_u2 * self.params.freq_col_ratio * self.params.freq_plasma * (u1x - ux0);

                        let new_y = u0y
                            + (qf
                                * (charge * dt * (grid.ey.get(&strider, cur, i, j, k) + grid.ey.get(&strider, cur, i, j + 1, k))
                                    + charge * c_u1 * (u1z * bx0 + uz0 * abx - u1x * bz0 - ux0 * abz + ee_y))
                                - c_u_ty * (n2_jp1 - n2_jm1) / n0)
                                / mass
                            - c_u2 * self.params.freq_col_ratio * self.params.freq_plasma * (u1y - uy0);

                        let new_z = u0z
                            + (qf
                                * (charge * dt * (grid.ez.get(&strider, cur, i, j, k) + grid.ez.get(&strider, cur, i, j, k + 1))
                                    + charge * c_u1 * (u1x * by0 + ux0 * aby - u1y * bx0 - uy0 * abx + ee_z))
                                - c_u_tz * (n2_kp1 - n2_km1) / n0)
                                / mass
                            - c_u2 * self.params.freq_col_ratio * self.params.freq_plasma * (u1z - uz0);

                        self.fields[m].ux.set(&strider, 2, i, j, k, new_x);
                        self.fields[m].uy.set(&strider, 2, i, j, k, new_y);
                        self.fields[m].uz.set(&strider, 2, i, j, k, new_z);
                    }
                }
            }
        }
    }

    /// `Ncalc`: continuity update for every species over its (narrower) band.
    pub fn continuity_update(&mut self, grid: &Grid, dt: f64, dx: f64, dy: f64, dz: f64) {
        let strider = grid.strider;
        let (sx, sy, sz) = strider.size();
        let c_tx = dt / dx;
        let c_ty = dt / dy;
        let c_tz = dt / dz;

        for m in 0..SPECIES_COUNT {
            self.fields[m].n.advance();
            let n0 = self.n0[m];
            let (ux0, uy0, uz0) = (self.params.drift_ux0, self.params.drift_uy0, self.params.drift_uz0);

            for k in N_LO..sz - N_HI_MARGIN {
                for j in N_LO..sy - N_HI_MARGIN {
                    for i in N_LO..sx - N_HI_MARGIN {
                        let div_u = (self.fields[m].ux.get(&strider, 1, i + 1, j, k) - self.fields[m].ux.get(&strider, 1, i - 1, j, k)) * c_tx
                            + (self.fields[m].uy.get(&strider, 1, i, j + 1, k) - self.fields[m].uy.get(&strider, 1, i, j - 1, k)) * c_ty
                            + (self.fields[m].uz.get(&strider, 1, i, j, k + 1) - self.fields[m].uz.get(&strider, 1, i, j, k - 1)) * c_tz;
                        let grad_n = ux0 * (self.fields[m].n.get(&strider, 1, i + 1, j, k) - self.fields[m].n.get(&strider, 1, i - 1, j, k)) * c_tx
                            + uy0 * (self.fields[m].n.get(&strider, 1, i, j + 1, k) - self.fields[m].n.get(&strider, 1, i, j - 1, k)) * c_ty
                            + uz0 * (self.fields[m].n.get(&strider, 1, i, j, k + 1) - self.fields[m].n.get(&strider, 1, i, j, k - 1)) * c_tz;

                        let n0_old = self.fields[m].n.get(&strider, 0, i, j, k);
                        self.fields[m].n.set(&strider, 2, i, j, k, n0_old - (n0 * div_u + grad_n));
                    }
                }
            }
        }
    }

    /// Conduction current at `(i,j,k)` for the plasma E-update (spec §4.3),
    /// summed over all species, using slot `[2]` (just-computed) U and N.
    pub fn conduction_current(&self, strider: &Strider, i: usize, j: usize, k: usize) -> (f64, f64, f64) {
        let (mut jx, mut jy, mut jz) = (0.0, 0.0, 0.0);
        for m in 0..SPECIES_COUNT {
            let charge = self.species[m].charge;
            let n0 = self.n0[m];
            let (ux0, uy0, uz0) = (self.params.drift_ux0, self.params.drift_uy0, self.params.drift_uz0);
            let fields = &self.fields[m];

            jx += charge
                * (n0 * (fields.ux.get(strider, 2, i, j, k) + fields.ux.get(strider, 2, i - 1, j, k))
                    + ux0 * (fields.n.get(strider, 2, i, j, k) + fields.n.get(strider, 2, i - 1, j, k))
                    + 2.0 * n0 * ux0);
            jy += charge
                * (n0 * (fields.uy.get(strider, 2, i, j, k) + fields.uy.get(strider, 2, i, j - 1, k))
                    + uy0 * (fields.n.get(strider, 2, i, j, k) + fields.n.get(strider, 2, i, j - 1, k))
                    + 2.0 * n0 * uy0);
            jz += charge
                * (n0 * (fields.uz.get(strider, 2, i, j, k) + fields.uz.get(strider, 2, i, j, k - 1))
                    + uz0 * (fields.n.get(strider, 2, i, j, k) + fields.n.get(strider, 2, i, j, k - 1))
                    + 2.0 * n0 * uz0);
        }
        (jx, jy, jz)
    }

    pub fn sig_mask(&self) -> &[f64] {
        &self.sig
    }

    /// `UBCcalc`: clamps the outermost three cells of the momentum band, on
    /// each axis independently, to the interior value just inside the band.
    /// The original declares this routine but its body was not part of the
    /// filtered source pack; this reproduces the soft-mirror rule described
    /// in the design notes.
    pub fn ubc(&mut self, strider: &Strider) {
        for m in 0..SPECIES_COUNT {
            clamp_band(strider, &mut self.fields[m].ux, 2, Axis::X, U_LO, U_HI_MARGIN);
            clamp_band(strider, &mut self.fields[m].uy, 2, Axis::Y, U_LO, U_HI_MARGIN);
            clamp_band(strider, &mut self.fields[m].uz, 2, Axis::Z, U_LO, U_HI_MARGIN);
        }
    }

    /// `NBCcalc`: same rule, one cell wider, for the continuity band.
    pub fn nbc(&mut self, strider: &Strider) {
        for m in 0..SPECIES_COUNT {
            clamp_band(strider, &mut self.fields[m].n, 2, Axis::X, N_LO, N_HI_MARGIN);
            clamp_band(strider, &mut self.fields[m].n, 2, Axis::Y, N_LO, N_HI_MARGIN);
            clamp_band(strider, &mut self.fields[m].n, 2, Axis::Z, N_LO, N_HI_MARGIN);
        }
    }
}

/// Copies the value three cells inside the band onto the three cells at the
/// edge of the band, independently at the low and high end, varying `axis`
/// while holding the other two coordinates fixed over their full extent.
fn clamp_band(strider: &Strider, field: &mut Slots3, slot: usize, axis: Axis, lo: usize, hi_margin: usize) {
    let (sx, sy, sz) = strider.size();
    let hi = match axis {
        Axis::X => sx - hi_margin - 1,
        Axis::Y => sy - hi_margin - 1,
        Axis::Z => sz - hi_margin - 1,
    };
    let interior_lo = lo + 3;
    let interior_hi = hi - 3;

    let (d1, d2) = match axis {
        Axis::X => (sy, sz),
        Axis::Y => (sx, sz),
        Axis::Z => (sx, sy),
    };

    for o1 in 1..=d1 {
        for o2 in 1..=d2 {
            let at = |v: usize| -> (usize, usize, usize) {
                match axis {
                    Axis::X => (v, o1, o2),
                    Axis::Y => (o1, v, o2),
                    Axis::Z => (o1, o2, v),
                }
            };
            let (ilo, jlo, klo) = at(interior_lo);
            let interior_lo_value = field.get(strider, slot, ilo, jlo, klo);
            let (ihi, jhi, khi) = at(interior_hi);
            let interior_hi_value = field.get(strider, slot, ihi, jhi, khi);
            for offset in 0..3 {
                let (il, jl, kl) = at(lo + offset);
                field.set(strider, slot, il, jl, kl, interior_lo_value);
                let (ih, jh, kh) = at(hi - offset);
                field.set(strider, slot, ih, jh, kh, interior_hi_value);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ambient_density_follows_population_fraction() {
        let strider = Strider::new(20, 20, 20);
        let state = PlasmaState::new(&strider, PlasmaParams::default(), 8.8541878188e-12);
        assert!(state.n0[0] > 0.0);
        assert!((state.n0[1] - state.n0[0] * 0.75).abs() < state.n0[0] * 1e-9);
        assert!((state.n0[2] - state.n0[0] * 0.25).abs() < state.n0[0] * 1e-9);
    }

    #[test]
    fn fresh_state_has_zero_fluid_state() {
        let strider = Strider::new(20, 20, 20);
        let state = PlasmaState::new(&strider, PlasmaParams::default(), 8.8541878188e-12);
        assert_eq!(state.fields[0].ux.get(&strider, 1, 10, 10, 10), 0.0);
        assert_eq!(state.fields[0].n.get(&strider, 1, 10, 10, 10), 0.0);
    }

    #[test]
    fn sig_only_set_where_all_axes_are_vacuum() {
        let grid = Grid::new(20, 20, 20);
        let mut state = PlasmaState::new(&grid.strider, PlasmaParams::default(), 8.8541878188e-12);
        state.stamp_sig(&grid);
        assert_eq!(state.sig_at(&grid.strider, 10, 10, 10), 1.0);
    }
}
