//! C7 — Driver Loop, plus the `SimulationContext` design note's single
//! owning value (spec §9 "Global mutable state"): every former C global now
//! lives here, threaded into the kernels instead of referenced as `extern`.

use serde::{
    Deserialize,
    Serialize,
};

use crate::{
    boundary,
    grid::{
        Grid,
        SwapBufferIndex,
    },
    maxwell,
    physics::PhysicalConstants,
    plasma::PlasmaState,
    source::Source,
};

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct SimulationContext {
    pub grid: Grid,
    pub plasma: Option<PlasmaState>,
    pub sources: Vec<Source>,
    pub physics: PhysicalConstants,
    pub dx: f64,
    pub dy: f64,
    pub dz: f64,
    pub dt: f64,
    pub df: f64,
    pub fail_safe: u64,
    pub plasma_cycle: u64,
    pub iter: u64,
    pub t: f64,
}

impl SimulationContext {
    /// The slot about to be written this step, and the slot holding the
    /// last step's established values (spec §3 "save old" invariant).
    fn slots(&self) -> (SwapBufferIndex, SwapBufferIndex) {
        let cur = SwapBufferIndex::from_tick(self.iter + 1);
        (cur, cur.other())
    }

    /// One full step, in the order pinned by spec §4.6.
    pub fn step(&mut self) {
        let (cur, prev) = self.slots();

        match &self.plasma {
            Some(plasma) => maxwell::e_update_plasma(&mut self.grid, plasma, cur, prev, self.dt, self.dx, self.dy, self.dz, &self.physics),
            None => maxwell::e_update_vacuum(&mut self.grid, cur, prev, self.dt, self.dx, self.dy, self.dz, &self.physics),
        }

        boundary::apply(&mut self.grid, cur, prev, self.dt, self.dx, self.dy, self.dz, &self.physics);

        for source in &mut self.sources {
            source.esource(&mut self.grid, cur, self.t, self.dt, self.df, self.dx, self.dy, self.dz);
        }

        maxwell::b_update(&mut self.grid, cur, prev, self.dt, self.dx, self.dy, self.dz);

        if let Some(plasma) = &mut self.plasma {
            plasma.momentum_update(&self.grid, cur, prev, self.dt, self.dx, self.dy, self.dz);
            plasma.ubc(&self.grid.strider);
            plasma.continuity_update(&self.grid, self.dt, self.dx, self.dy, self.dz);
            plasma.nbc(&self.grid.strider);
        }

        for source in &mut self.sources {
            source.rcalc(&self.grid, cur, self.dx, self.dy, self.dz, self.physics.vacuum_permeability);
        }

        self.t += self.dt;
        self.iter += 1;
    }

    pub fn cur_slot(&self) -> SwapBufferIndex {
        SwapBufferIndex::from_tick(self.iter)
    }

    /// Spec §4.6 step 9: `iter·df > PLASMA_CYCLE` or `iter ≥ FAIL_SAFE`.
    pub fn fail_safe_or_cycle_limit_reached(&self) -> bool {
        let cycle_limit = self.plasma_cycle > 0 && (self.iter as f64) * self.df > self.plasma_cycle as f64;
        cycle_limit || self.iter >= self.fail_safe
    }

    /// Whether a volumetric snapshot is due this step, per `((iter-1) mod frate == 0)`.
    pub fn snapshot_due(&self, frate: usize) -> bool {
        frate > 0 && (self.iter.saturating_sub(1) as usize) % frate == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        axis::Axis,
        grid::Grid,
        physics::PhysicalConstants,
        source::SourceKind,
    };

    fn empty_context(size: usize) -> SimulationContext {
        let physics = PhysicalConstants::default();
        let dx = 1e-3;
        let dt = dx / (2.0 * physics.speed_of_light());
        SimulationContext {
            grid: Grid::new(size, size, size),
            plasma: None,
            sources: vec![Source::new(size / 2, size / 2, size / 2, Axis::X, SourceKind::Sine, 1e9)],
            physics,
            dx,
            dy: dx,
            dz: dx,
            dt,
            df: 0.0,
            fail_safe: 10,
            plasma_cycle: 0,
            iter: 0,
            t: 0.0,
        }
    }

    #[test]
    fn step_advances_time_and_iteration() {
        let mut ctx = empty_context(20);
        ctx.step();
        assert_eq!(ctx.iter, 1);
        assert!((ctx.t - ctx.dt).abs() < 1e-30);
    }

    #[test]
    fn fail_safe_terminates_the_loop() {
        let mut ctx = empty_context(20);
        for _ in 0..10 {
            ctx.step();
        }
        assert!(ctx.fail_safe_or_cycle_limit_reached());
    }

    #[test]
    fn pec_cell_away_from_any_source_stays_at_zero() {
        let mut ctx = empty_context(20);
        let strider = ctx.grid.strider;
        ctx.grid.erx.set(&strider, 6, 6, 6, 0.0);
        for _ in 0..5 {
            ctx.step();
        }
        assert_eq!(ctx.grid.ex.get(&strider, ctx.cur_slot(), 6, 6, 6), 0.0);
    }
}
