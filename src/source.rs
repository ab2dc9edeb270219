//! C2 — Source Generator.
//!
//! Grounded on `app/solver/fdtd/legacy/source.rs`'s `Source` trait (prepare /
//! current-density methods) but expressed the literal, scalar way spec §4.2
//! requires: each source directly imprints one E-component at one cell and
//! reads back V/I from the B-field contour around it, rather than going
//! through a generic current-density closure.

use std::f64::consts::TAU;

use serde::{
    Deserialize,
    Serialize,
};

use crate::{
    axis::Axis,
    grid::{
        Grid,
        SwapBufferIndex,
    },
};

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub enum SourceKind {
    Sine,
    Pulse,
    RaisedCosine,
    Gaussian,
    GaussianDerivative,
    Dc,
    Sinc,
}

/// One entry of the scenario's source table (spec §3 "Source table").
#[derive(Clone, Copy, Debug, Serialize, Deserialize)]
pub struct Source {
    pub i: usize,
    pub j: usize,
    pub k: usize,
    pub axis: Axis,
    pub kind: SourceKind,
    pub param: f64,

    /// Last value written by [`Source::esource`]/read by [`Source::rcalc`].
    pub volt: f64,
    pub current: f64,
}

impl Source {
    pub fn new(i: usize, j: usize, k: usize, axis: Axis, kind: SourceKind, param: f64) -> Self {
        Self {
            i,
            j,
            k,
            axis,
            kind,
            param,
            volt: 0.0,
            current: 0.0,
        }
    }

    /// Waveform value at time `t`, per the table in spec §4.2. `dt` and `df`
    /// (plasma cycles per step) are needed by the Sinc waveform's centering.
    fn waveform(&self, t: f64, dt: f64, df: f64) -> f64 {
        let p = self.param;
        match self.kind {
            SourceKind::Sine => (TAU * p * t).cos(),
            SourceKind::Pulse => {
                if t * p / 4.0 < 1.0 {
                    -1.0
                }
                else {
                    0.0
                }
            }
            SourceKind::RaisedCosine => {
                if t * p / 4.0 < 1.0 {
                    0.5 * (TAU * p * t).cos() - 0.5
                }
                else {
                    0.0
                }
            }
            SourceKind::Gaussian => {
                let sigma = p;
                let tau = 5.0 * sigma * dt;
                let width = sigma * dt;
                -1e-7 / width * (-0.5 * ((tau - t) / width).powi(2)).exp()
            }
            SourceKind::GaussianDerivative => {
                // sigma in time units, tau the center; the derivative of a
                // Gaussian normalized so its peak magnitude is 1.
                let sigma = 0.25 / p;
                let tau = 5.0 * sigma;
                let dt_from_center = t - tau;
                let unnormalized = dt_from_center / (sigma.powi(3) * (TAU).sqrt())
                    * (-dt_from_center * dt_from_center / (2.0 * sigma * sigma)).exp();
                let peak = (-0.5_f64).exp() / sigma.powi(2);
                unnormalized / peak
            }
            SourceKind::Dc => p,
            SourceKind::Sinc => {
                let offset = 10.0 / df * dt + dt / 2.0;
                let gain = 2.0 * p * dt;
                let x = p * (t - offset) * TAU;
                sinc(x) * gain
            }
        }
    }

    /// `Esource(t, a)`: imprints the waveform into the driven E-component,
    /// normalized by the cell size along that axis.
    pub fn esource(&mut self, grid: &mut Grid, cur: SwapBufferIndex, t: f64, dt: f64, df: f64, dx: f64, dy: f64, dz: f64) {
        let value = self.waveform(t, dt, df);
        match self.axis {
            Axis::X => grid.ex.set(&grid.strider, cur, self.i, self.j, self.k, value / dx),
            Axis::Y => grid.ey.set(&grid.strider, cur, self.i, self.j, self.k, value / dy),
            Axis::Z => grid.ez.set(&grid.strider, cur, self.i, self.j, self.k, value / dz),
        }
    }

    /// `Rcalc(a)`: samples terminal voltage and current from the current E/B
    /// state and stores them on `self`.
    pub fn rcalc(&mut self, grid: &Grid, cur: SwapBufferIndex, dx: f64, dy: f64, dz: f64, vacuum_permeability: f64) {
        let (i, j, k) = (self.i, self.j, self.k);
        let s = &grid.strider;
        match self.axis {
            Axis::X => {
                self.current = ((grid.by.get(s, cur, i, j, k) - grid.by.get(s, cur, i, j, k + 1)) * dx
                    + (grid.bz.get(s, cur, i, j + 1, k) - grid.bz.get(s, cur, i, j, k)) * dy)
                    / vacuum_permeability;
                self.volt = -grid.ex.get(s, cur, i, j, k) * dx;
            }
            Axis::Y => {
                self.current = ((grid.bx.get(s, cur, i, j, k + 1) - grid.bx.get(s, cur, i, j, k)) * dx
                    + (grid.bz.get(s, cur, i, j, k) - grid.bz.get(s, cur, i + 1, j, k)) * dy)
                    / vacuum_permeability;
                self.volt = -grid.ey.get(s, cur, i, j, k) * dy;
            }
            Axis::Z => {
                self.current = ((grid.bx.get(s, cur, i, j, k) - grid.bx.get(s, cur, i, j + 1, k)) * dx
                    + (grid.by.get(s, cur, i + 1, j, k) - grid.by.get(s, cur, i, j, k)) * dy)
                    / vacuum_permeability;
                self.volt = -grid.ez.get(s, cur, i, j, k) * dz;
            }
        }
    }
}

/// Classical `sin(x)/x`, with the removable singularity at `x = 0` filled in.
fn sinc(x: f64) -> f64 {
    if x.abs() < 1e-12 { 1.0 } else { x.sin() / x }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sine_matches_cosine_waveform() {
        let source = Source::new(1, 1, 1, Axis::X, SourceKind::Sine, 1e9);
        let t = 1.3e-10;
        assert!((source.waveform(t, 1e-12, 0.0) - (TAU * 1e9 * t).cos()).abs() < 1e-12);
    }

    #[test]
    fn dc_is_constant() {
        let source = Source::new(1, 1, 1, Axis::X, SourceKind::Dc, 3.5);
        assert_eq!(source.waveform(0.0, 1e-12, 0.0), 3.5);
        assert_eq!(source.waveform(100.0, 1e-12, 0.0), 3.5);
    }

    #[test]
    fn pulse_turns_off_after_threshold() {
        let source = Source::new(1, 1, 1, Axis::X, SourceKind::Pulse, 1.0);
        assert_eq!(source.waveform(0.0, 1e-12, 0.0), -1.0);
        assert_eq!(source.waveform(10.0, 1e-12, 0.0), 0.0);
    }

    #[test]
    fn sinc_is_finite_at_its_center() {
        let source = Source::new(1, 1, 1, Axis::X, SourceKind::Sinc, 30e6);
        let dt = 1e-12;
        let df = 1e6 * dt;
        let offset = 10.0 / df * dt + dt / 2.0;
        let value = source.waveform(offset, dt, df);
        assert!(value.is_finite());
    }
}
