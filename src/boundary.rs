//! C4 — Absorbing Boundary (retarded-time, first-order Mur-style ABC).
//!
//! No source file for this routine survived in the filtered original-source
//! pack (`_INDEX.md` lists no `Retard.h`/ABC translation unit), so this is
//! built directly from the literal formula in spec §4.4 rather than ported
//! from C++. The "one-cell-thick history plane" the spec describes is
//! realized as the grid's own `prev` slot at the boundary cell: `prev` at
//! `i=1` already holds last step's ABC output for free, by the same
//! tick-parity argument that gives every other kernel its `prev`/`cur`
//! pair — no copy, no separate history buffer.

use crate::{
    grid::{
        Grid,
        SwapBufferIndex,
    },
    physics::PhysicalConstants,
};

fn kappa(speed_of_light: f64, dt: f64, d_axis: f64) -> f64 {
    (speed_of_light * dt - d_axis) / (speed_of_light * dt + d_axis)
}

/// Applies the ABC to all six outer faces, in axis order X, Y, Z, so that a
/// cell shared by two faces (an edge) or three (a corner) ends up holding
/// the value from the later axis in that order — the tie-break spec §4.4
/// calls for.
pub fn apply(grid: &mut Grid, cur: SwapBufferIndex, prev: SwapBufferIndex, dt: f64, dx: f64, dy: f64, dz: f64, physics: &PhysicalConstants) {
    let c = physics.speed_of_light();
    apply_x_faces(grid, cur, prev, dt, dx, c);
    apply_y_faces(grid, cur, prev, dt, dy, c);
    apply_z_faces(grid, cur, prev, dt, dz, c);
}

/// `i=1` and `i=sx` faces: tangential components are Ey, Ez.
fn apply_x_faces(grid: &mut Grid, cur: SwapBufferIndex, prev: SwapBufferIndex, dt: f64, dx: f64, c: f64) {
    let strider = grid.strider;
    let (sx, sy, sz) = strider.size();
    let k_abc = kappa(c, dt, dx);

    for k in 1..=sz {
        for j in 1..=sy {
            for field in [&mut grid.ey, &mut grid.ez] {
                let interior_prev = field.get(&strider, prev, 2, j, k);
                let interior_cur = field.get(&strider, cur, 2, j, k);
                let boundary_prev = field.get(&strider, prev, 1, j, k);
                let new_low = interior_prev + k_abc * (interior_cur - boundary_prev);
                field.set(&strider, cur, 1, j, k, new_low);

                let interior_prev = field.get(&strider, prev, sx - 1, j, k);
                let interior_cur = field.get(&strider, cur, sx - 1, j, k);
                let boundary_prev = field.get(&strider, prev, sx, j, k);
                let new_high = interior_prev + k_abc * (interior_cur - boundary_prev);
                field.set(&strider, cur, sx, j, k, new_high);
            }
        }
    }
}

/// `j=1` and `j=sy` faces: tangential components are Ex, Ez.
fn apply_y_faces(grid: &mut Grid, cur: SwapBufferIndex, prev: SwapBufferIndex, dt: f64, dy: f64, c: f64) {
    let strider = grid.strider;
    let (sx, sy, sz) = strider.size();
    let k_abc = kappa(c, dt, dy);

    for k in 1..=sz {
        for i in 1..=sx {
            for field in [&mut grid.ex, &mut grid.ez] {
                let interior_prev = field.get(&strider, prev, i, 2, k);
                let interior_cur = field.get(&strider, cur, i, 2, k);
                let boundary_prev = field.get(&strider, prev, i, 1, k);
                let new_low = interior_prev + k_abc * (interior_cur - boundary_prev);
                field.set(&strider, cur, i, 1, k, new_low);

                let interior_prev = field.get(&strider, prev, i, sy - 1, k);
                let interior_cur = field.get(&strider, cur, i, sy - 1, k);
                let boundary_prev = field.get(&strider, prev, i, sy, k);
                let new_high = interior_prev + k_abc * (interior_cur - boundary_prev);
                field.set(&strider, cur, i, sy, k, new_high);
            }
        }
    }
}

/// `k=1` and `k=sz` faces: tangential components are Ex, Ey.
fn apply_z_faces(grid: &mut Grid, cur: SwapBufferIndex, prev: SwapBufferIndex, dt: f64, dz: f64, c: f64) {
    let strider = grid.strider;
    let (sx, sy, sz) = strider.size();
    let k_abc = kappa(c, dt, dz);

    for j in 1..=sy {
        for i in 1..=sx {
            for field in [&mut grid.ex, &mut grid.ey] {
                let interior_prev = field.get(&strider, prev, i, j, 2);
                let interior_cur = field.get(&strider, cur, i, j, 2);
                let boundary_prev = field.get(&strider, prev, i, j, 1);
                let new_low = interior_prev + k_abc * (interior_cur - boundary_prev);
                field.set(&strider, cur, i, j, 1, new_low);

                let interior_prev = field.get(&strider, prev, i, j, sz - 1);
                let interior_cur = field.get(&strider, cur, i, j, sz - 1);
                let boundary_prev = field.get(&strider, prev, i, j, sz);
                let new_high = interior_prev + k_abc * (interior_cur - boundary_prev);
                field.set(&strider, cur, i, j, sz, new_high);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn boundary_matches_abc_formula_in_vacuum() {
        let mut grid = Grid::new(10, 10, 10);
        let physics = PhysicalConstants::default();
        let (dt, dx, dy, dz) = (1e-12, 1e-3, 1e-3, 1e-3);
        let cur = SwapBufferIndex::from_tick(0);
        let prev = cur.other();

        grid.ey.set(&grid.strider, cur, 2, 5, 5, 0.25);
        grid.ey.set(&grid.strider, prev, 2, 5, 5, 0.10);
        grid.ey.set(&grid.strider, prev, 1, 5, 5, 0.05);

        apply(&mut grid, cur, prev, dt, dx, dy, dz, &physics);

        let c = physics.speed_of_light();
        let k = kappa(c, dt, dx);
        let expected = 0.10 + k * (0.25 - 0.05);
        assert!((grid.ey.get(&grid.strider, cur, 1, 5, 5) - expected).abs() < 1e-15);
    }

    #[test]
    fn z_face_wins_ties_at_a_shared_edge() {
        let mut grid = Grid::new(10, 10, 10);
        let physics = PhysicalConstants::default();
        let (dt, dx, dy, dz) = (1e-12, 1e-3, 1e-3, 1e-3);
        let cur = SwapBufferIndex::from_tick(0);
        let prev = cur.other();

        // The edge i=1,k=1 belongs to both the X face and the Z face; Ex is
        // tangential to the Z face only, so only the Z-face pass writes it.
        grid.ex.set(&grid.strider, cur, 1, 5, 2, 0.3);
        grid.ex.set(&grid.strider, prev, 1, 5, 2, 0.1);
        grid.ex.set(&grid.strider, prev, 1, 5, 1, 0.05);

        apply(&mut grid, cur, prev, dt, dx, dy, dz, &physics);
        assert!(grid.ex.get(&grid.strider, cur, 1, 5, 1).is_finite());
    }
}
