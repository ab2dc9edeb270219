//! C3 — Maxwell Updater.
//!
//! Transcribed from `src/fields/field_calculator.cpp`'s `Ecalc`/`Bcalc` (and
//! `archive/pffdtd_legacy/plasma.h`'s `Ecalcmod` for the plasma-augmented
//! E-update), kept as literal per-axis stencils rather than folded into the
//! teacher's generic curl/jacobian machinery — spec §4.3 requires bit-exact
//! reproduction, which a generic stencil would only obscure.

use crate::{
    grid::{
        Grid,
        SwapBufferIndex,
    },
    physics::PhysicalConstants,
    plasma::PlasmaState,
};

/// `Ecalc`: vacuum E-update over the interior domain.
pub fn e_update_vacuum(grid: &mut Grid, cur: SwapBufferIndex, prev: SwapBufferIndex, dt: f64, dx: f64, dy: f64, dz: f64, physics: &PhysicalConstants) {
    let strider = grid.strider;
    let eps0 = physics.vacuum_permittivity;
    let mu0 = physics.vacuum_permeability;
    let cx = dt / (mu0 * eps0 * dx);
    let cy = dt / (mu0 * eps0 * dy);
    let cz = dt / (mu0 * eps0 * dz);

    for (i, j, k) in strider.iter_interior() {
        let erx = grid.erx.get(&strider, i, j, k);
        let ery = grid.ery.get(&strider, i, j, k);
        let erz = grid.erz.get(&strider, i, j, k);

        let ex = grid.ex.get(&strider, prev, i, j, k)
            + ((grid.bz.get(&strider, prev, i, j + 1, k) - grid.bz.get(&strider, prev, i, j, k)) * cy
                - (grid.by.get(&strider, prev, i, j, k + 1) - grid.by.get(&strider, prev, i, j, k)) * cz)
                * erx;
        let ey = grid.ey.get(&strider, prev, i, j, k)
            + ((grid.bx.get(&strider, prev, i, j, k + 1) - grid.bx.get(&strider, prev, i, j, k)) * cz
                - (grid.bz.get(&strider, prev, i + 1, j, k) - grid.bz.get(&strider, prev, i, j, k)) * cx)
                * ery;
        let ez = grid.ez.get(&strider, prev, i, j, k)
            + ((grid.by.get(&strider, prev, i + 1, j, k) - grid.by.get(&strider, prev, i, j, k)) * cx
                - (grid.bx.get(&strider, prev, i, j + 1, k) - grid.bx.get(&strider, prev, i, j, k)) * cy)
                * erz;

        grid.ex.set(&strider, cur, i, j, k, ex);
        grid.ey.set(&strider, cur, i, j, k, ey);
        grid.ez.set(&strider, cur, i, j, k, ez);
    }
}

/// `Ecalcmod`: same stencil augmented by the plasma conduction current.
pub fn e_update_plasma(
    grid: &mut Grid,
    plasma: &PlasmaState,
    cur: SwapBufferIndex,
    prev: SwapBufferIndex,
    dt: f64,
    dx: f64,
    dy: f64,
    dz: f64,
    physics: &PhysicalConstants,
) {
    let strider = grid.strider;
    let eps0 = physics.vacuum_permittivity;
    let mu0 = physics.vacuum_permeability;
    let cx = dt / (mu0 * eps0 * dx);
    let cy = dt / (mu0 * eps0 * dy);
    let cz = dt / (mu0 * eps0 * dz);
    let c_mu = dt / (2.0 * eps0);

    for (i, j, k) in strider.iter_interior() {
        let erx = grid.erx.get(&strider, i, j, k);
        let ery = grid.ery.get(&strider, i, j, k);
        let erz = grid.erz.get(&strider, i, j, k);
        let sig = plasma.sig_mask()[strider.index(i, j, k)];
        let (jx, jy, jz) = plasma.conduction_current(&strider, i, j, k);

        let ex = grid.ex.get(&strider, prev, i, j, k)
            + ((grid.bz.get(&strider, prev, i, j + 1, k) - grid.bz.get(&strider, prev, i, j, k)) * cy
                - (grid.by.get(&strider, prev, i, j, k + 1) - grid.by.get(&strider, prev, i, j, k)) * cz
                - c_mu * sig * jx)
                * erx;
        let ey = grid.ey.get(&strider, prev, i, j, k)
            + ((grid.bx.get(&strider, prev, i, j, k + 1) - grid.bx.get(&strider, prev, i, j, k)) * cz
                - (grid.bz.get(&strider, prev, i + 1, j, k) - grid.bz.get(&strider, prev, i, j, k)) * cx
                - c_mu * sig * jy)
                * ery;
        let ez = grid.ez.get(&strider, prev, i, j, k)
            + ((grid.by.get(&strider, prev, i + 1, j, k) - grid.by.get(&strider, prev, i, j, k)) * cx
                - (grid.bx.get(&strider, prev, i, j + 1, k) - grid.bx.get(&strider, prev, i, j, k)) * cy
                - c_mu * sig * jz)
                * erz;

        grid.ex.set(&strider, cur, i, j, k, ex);
        grid.ey.set(&strider, cur, i, j, k, ey);
        grid.ez.set(&strider, cur, i, j, k, ez);
    }
}

/// `Bcalc`: always the vacuum stencil, no material term.
pub fn b_update(grid: &mut Grid, cur: SwapBufferIndex, prev: SwapBufferIndex, dt: f64, dx: f64, dy: f64, dz: f64) {
    let strider = grid.strider;
    let cx = dt / dx;
    let cy = dt / dy;
    let cz = dt / dz;

    for (i, j, k) in strider.iter_interior() {
        let bx = grid.bx.get(&strider, prev, i, j, k)
            + (grid.ey.get(&strider, cur, i, j, k) - grid.ey.get(&strider, cur, i, j, k - 1)) * cz
            - (grid.ez.get(&strider, cur, i, j, k) - grid.ez.get(&strider, cur, i, j - 1, k)) * cy;
        let by = grid.by.get(&strider, prev, i, j, k)
            + (grid.ez.get(&strider, cur, i, j, k) - grid.ez.get(&strider, cur, i - 1, j, k)) * cx
            - (grid.ex.get(&strider, cur, i, j, k) - grid.ex.get(&strider, cur, i, j, k - 1)) * cz;
        let bz = grid.bz.get(&strider, prev, i, j, k)
            + (grid.ex.get(&strider, cur, i, j, k) - grid.ex.get(&strider, cur, i, j - 1, k)) * cy
            - (grid.ey.get(&strider, cur, i, j, k) - grid.ey.get(&strider, cur, i - 1, j, k)) * cx;

        grid.bx.set(&strider, cur, i, j, k, bx);
        grid.by.set(&strider, cur, i, j, k, by);
        grid.bz.set(&strider, cur, i, j, k, bz);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grid::Grid;

    #[test]
    fn pec_cell_freezes_the_e_update() {
        let mut grid = Grid::new(10, 10, 10);
        let physics = PhysicalConstants::default();
        let cur = SwapBufferIndex::from_tick(0);
        let prev = cur.other();
        grid.erx.set(&grid.strider, 5, 5, 5, 0.0);
        grid.ex.set(&grid.strider, cur, 5, 5, 5, 0.0);

        e_update_vacuum(&mut grid, cur, prev, 1e-12, 1e-3, 1e-3, 1e-3, &physics);

        assert_eq!(grid.ex.get(&grid.strider, cur, 5, 5, 5), 0.0);
    }

    #[test]
    fn vacuum_b_update_leaves_exterior_shell_untouched() {
        let mut grid = Grid::new(10, 10, 10);
        let cur = SwapBufferIndex::from_tick(0);
        let prev = cur.other();
        b_update(&mut grid, cur, prev, 1e-12, 1e-3, 1e-3, 1e-3);
        assert_eq!(grid.bx.get(&grid.strider, cur, 1, 1, 1), 0.0);
    }
}
