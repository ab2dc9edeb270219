//! The three grid axes, shared by the source table, Maxwell updater and ABC.

use strum::EnumIter;

#[derive(Clone, Copy, Debug, PartialEq, Eq, EnumIter, strum::Display, serde::Serialize, serde::Deserialize)]
pub enum Axis {
    X,
    Y,
    Z,
}

impl Axis {
    /// Index into the order `[X, Y, Z]`, used for the ABC tie-break (spec
    /// §4.4: "deterministic tie-break by axis order X, Y, Z").
    pub fn order(self) -> usize {
        match self {
            Axis::X => 0,
            Axis::Y => 1,
            Axis::Z => 2,
        }
    }
}
