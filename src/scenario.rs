//! C6 — Scenario Loader.
//!
//! Grounded on `src/io/file_handler.cpp`'s `setup1`/`setup2`: same
//! line-oriented, tab-separated grammar, same header-echo-to-stdout
//! behavior (via `tracing::info!` here rather than raw `printf`), same
//! antenna-stamping `switch` over `{1,2,3,other}`. Returns `Result` instead
//! of `setup1`/`setup2`'s `return 1` sentinel.

use std::path::{
    Path,
    PathBuf,
};

use bitflags::bitflags;
use tracing::info;

use crate::{
    axis::Axis,
    error::PffdtdError,
    source::{
        Source,
        SourceKind,
    },
};

#[derive(Clone, Copy, Debug)]
pub struct AntennaCell {
    pub i: usize,
    pub j: usize,
    pub k: usize,
    pub cx: u8,
    pub cy: u8,
    pub cz: u8,
}

bitflags! {
    /// Which volumetric quantities `outputfd` emits, one bit per column
    /// group in the original `fout[0..6]` array.
    #[derive(Clone, Copy, Debug, PartialEq, Eq)]
    pub struct OutputFields: u8 {
        const ELECTRIC    = 0b0000_0001;
        const MAGNETIC    = 0b0000_0010;
        const E_VELOCITY  = 0b0000_0100;
        const E_DENSITY   = 0b0000_1000;
        const ION_VELOCITY = 0b0001_0000;
        const ION_DENSITY = 0b0010_0000;
    }
}

#[derive(Clone, Copy, Debug)]
pub struct OutputSpec {
    pub frate: usize,
    pub fields: OutputFields,
    pub lower: (usize, usize, usize),
    pub upper: (usize, usize, usize),
}

#[derive(Clone, Debug)]
pub struct Scenario {
    pub title: String,
    pub sx: usize,
    pub sy: usize,
    pub sz: usize,
    pub dx: f64,
    pub dy: f64,
    pub dz: f64,
    pub fail_safe: u64,
    pub plasma_cycle: u64,
    pub sources: Vec<Source>,
    pub er1: f64,
    pub er2: f64,
    pub antennas: Vec<AntennaCell>,
    pub output: Option<OutputSpec>,
}

fn format_error(path: &Path, reason: impl Into<String>) -> PffdtdError {
    PffdtdError::ScenarioFormat {
        path: path.to_path_buf(),
        reason: reason.into(),
    }
}

fn parse_field<T: std::str::FromStr>(path: &Path, fields: &[&str], index: usize, name: &str) -> Result<T, PffdtdError> {
    fields
        .get(index)
        .ok_or_else(|| format_error(path, format!("missing field {name}")))?
        .trim()
        .parse()
        .map_err(|_| format_error(path, format!("unparseable field {name}")))
}

fn axis_from_code(path: &Path, code: i32) -> Result<Axis, PffdtdError> {
    match code {
        1 => Ok(Axis::X),
        2 => Ok(Axis::Y),
        3 => Ok(Axis::Z),
        other => Err(format_error(path, format!("unknown source axis code {other}"))),
    }
}

fn kind_from_code(path: &Path, code: i32) -> Result<SourceKind, PffdtdError> {
    match code {
        1 => Ok(SourceKind::Sine),
        2 => Ok(SourceKind::Pulse),
        3 => Ok(SourceKind::RaisedCosine),
        4 => Ok(SourceKind::Gaussian),
        5 => Ok(SourceKind::GaussianDerivative),
        6 => Ok(SourceKind::Dc),
        7 => Ok(SourceKind::Sinc),
        other => Err(format_error(path, format!("unknown source waveform code {other}"))),
    }
}

impl Scenario {
    pub fn load(stem: &str) -> Result<Self, PffdtdError> {
        let path = PathBuf::from(format!("{stem}.str"));
        let text = std::fs::read_to_string(&path).map_err(|source| PffdtdError::FileOpen { path: path.clone(), source })?;
        let mut lines = text.lines();

        let mut next_line = |path: &Path| -> Result<&str, PffdtdError> { lines.next().ok_or_else(|| format_error(path, "unexpected end of file")) };

        let title = next_line(&path)?.to_string();
        info!(%title, "loaded scenario title");

        let _header = next_line(&path)?;
        let grid_line = next_line(&path)?;
        let grid_fields: Vec<&str> = grid_line.split('\t').collect();
        let sx = parse_field(&path, &grid_fields, 0, "sx")?;
        let sy = parse_field(&path, &grid_fields, 1, "sy")?;
        let sz = parse_field(&path, &grid_fields, 2, "sz")?;
        info!(sx, sy, sz, "grid dimensions");

        let cell_line = next_line(&path)?;
        let cell_fields: Vec<&str> = cell_line.split('\t').collect();
        let dx = parse_field(&path, &cell_fields, 0, "dx")?;
        let dy = parse_field(&path, &cell_fields, 1, "dy")?;
        let dz = parse_field(&path, &cell_fields, 2, "dz")?;
        info!(dx, dy, dz, "cell sizes");

        let _header = next_line(&path)?;
        let fail_safe: u64 = next_line(&path)?.trim().parse().map_err(|_| format_error(&path, "unparseable FAIL_SAFE"))?;
        let plasma_cycle: u64 = next_line(&path)?.trim().parse().map_err(|_| format_error(&path, "unparseable PLASMA_CYCLE"))?;
        info!(fail_safe, plasma_cycle, "termination limits");

        let _header = next_line(&path)?;
        let source_count: usize = next_line(&path)?.trim().parse().map_err(|_| format_error(&path, "unparseable Snum"))?;

        let mut sources = Vec::with_capacity(source_count);
        for _ in 0..source_count {
            let line = next_line(&path)?;
            let fields: Vec<&str> = line.split('\t').collect();
            let i = parse_field(&path, &fields, 0, "source i")?;
            let j = parse_field(&path, &fields, 1, "source j")?;
            let k = parse_field(&path, &fields, 2, "source k")?;
            let axis_code: i32 = parse_field(&path, &fields, 3, "source axis")?;
            let kind_code: i32 = parse_field(&path, &fields, 4, "source kind")?;
            let param = parse_field(&path, &fields, 5, "source param")?;
            sources.push(Source::new(i, j, k, axis_from_code(&path, axis_code)?, kind_from_code(&path, kind_code)?, param));
        }

        let _header = next_line(&path)?;
        let er1: f64 = next_line(&path)?.trim().parse().map_err(|_| format_error(&path, "unparseable Er1"))?;
        let er2: f64 = next_line(&path)?.trim().parse().map_err(|_| format_error(&path, "unparseable Er2"))?;
        info!(er1, er2, "dielectric constants");

        let _header = next_line(&path)?;
        let antenna_count: usize = next_line(&path)?.trim().parse().map_err(|_| format_error(&path, "unparseable antenna count"))?;
        let mut antennas = Vec::with_capacity(antenna_count);
        for _ in 0..antenna_count {
            let line = next_line(&path)?;
            let fields: Vec<&str> = line.split('\t').collect();
            antennas.push(AntennaCell {
                i: parse_field(&path, &fields, 0, "antenna i")?,
                j: parse_field(&path, &fields, 1, "antenna j")?,
                k: parse_field(&path, &fields, 2, "antenna k")?,
                cx: parse_field(&path, &fields, 3, "antenna cX")?,
                cy: parse_field(&path, &fields, 4, "antenna cY")?,
                cz: parse_field(&path, &fields, 5, "antenna cZ")?,
            });
        }

        // The output block is optional; a missing header line means there is none.
        let output = if let Some(_header) = lines.next() {
            let rate_line = next_line(&path)?;
            let rate_fields: Vec<&str> = rate_line.split('\t').collect();
            let frate = parse_field(&path, &rate_fields, 0, "frate")?;
            const FLAG_BITS: [OutputFields; 6] = [
                OutputFields::ELECTRIC,
                OutputFields::MAGNETIC,
                OutputFields::E_VELOCITY,
                OutputFields::E_DENSITY,
                OutputFields::ION_VELOCITY,
                OutputFields::ION_DENSITY,
            ];
            let mut fields = OutputFields::empty();
            for (slot, bit) in FLAG_BITS.into_iter().enumerate() {
                let code: i32 = parse_field(&path, &rate_fields, slot + 1, "field output flag")?;
                fields.set(bit, code == 1);
            }

            let lower_line = next_line(&path)?;
            let lower_fields: Vec<&str> = lower_line.split('\t').collect();
            let lower = (
                parse_field(&path, &lower_fields, 0, "lower i")?,
                parse_field(&path, &lower_fields, 1, "lower j")?,
                parse_field(&path, &lower_fields, 2, "lower k")?,
            );

            let upper_line = next_line(&path)?;
            let upper_fields: Vec<&str> = upper_line.split('\t').collect();
            let upper = (
                parse_field(&path, &upper_fields, 0, "upper i")?,
                parse_field(&path, &upper_fields, 1, "upper j")?,
                parse_field(&path, &upper_fields, 2, "upper k")?,
            );

            Some(OutputSpec { frate, fields, lower, upper })
        }
        else {
            None
        };

        Ok(Self {
            title,
            sx,
            sy,
            sz,
            dx,
            dy,
            dz,
            fail_safe,
            plasma_cycle,
            sources,
            er1,
            er2,
            antennas,
            output,
        })
    }

    /// `dt = dx / (2c)`, fixed at load (spec §3).
    pub fn dt(&self, speed_of_light: f64) -> f64 {
        self.dx / (2.0 * speed_of_light)
    }

    /// Stamps the antenna/dielectric list onto a freshly allocated grid and
    /// plasma charging mask, mirroring `setup2`'s per-axis `switch`.
    pub fn stamp_materials(&self, grid: &mut crate::grid::Grid, qf: &mut [f64], antenna_charge: f64, plasma_enabled: bool) {
        let strider = grid.strider;
        for antenna in &self.antennas {
            let (i, j, k) = (antenna.i, antenna.j, antenna.k);

            let erx = match antenna.cx {
                1 => {
                    if plasma_enabled {
                        qf[strider.index(i, j, k)] = antenna_charge;
                    }
                    0.0
                }
                2 => 1.0 / self.er1,
                3 => 1.0 / self.er2,
                _ => 1.0,
            };
            let ery = match antenna.cy {
                1 => {
                    if plasma_enabled {
                        qf[strider.index(i, j, k)] = antenna_charge;
                    }
                    0.0
                }
                2 => 1.0 / self.er1,
                3 => 1.0 / self.er2,
                _ => 1.0,
            };
            let erz = match antenna.cz {
                1 => {
                    if plasma_enabled {
                        qf[strider.index(i, j, k)] = antenna_charge;
                    }
                    0.0
                }
                2 => 1.0 / self.er1,
                3 => 1.0 / self.er2,
                _ => 1.0,
            };

            grid.erx.set(&strider, i, j, k, erx);
            grid.ery.set(&strider, i, j, k, ery);
            grid.erz.set(&strider, i, j, k, erz);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn write_scenario(dir: &std::path::Path, name: &str, body: &str) -> String {
        let stem = dir.join(name);
        let mut file = std::fs::File::create(stem.with_extension("str")).unwrap();
        file.write_all(body.as_bytes()).unwrap();
        stem.to_str().unwrap().to_string()
    }

    #[test]
    fn parses_minimal_scenario_with_no_sources_or_antennas() {
        let dir = std::env::temp_dir();
        let body = "empty box\n\
                     Grid Parameters\n\
                     4\t4\t4\n\
                     1e-3\t1e-3\t1e-3\n\
                     Fail Safe\n\
                     100\n\
                     10\n\
                     Sources\n\
                     0\n\
                     Dielectrics\n\
                     1.0\n\
                     1.0\n\
                     Antennas\n\
                     0\n";
        let stem = write_scenario(&dir, "pffdtd_test_minimal", body);
        let scenario = Scenario::load(&stem).expect("scenario parses");
        assert_eq!((scenario.sx, scenario.sy, scenario.sz), (4, 4, 4));
        assert_eq!(scenario.fail_safe, 100);
        assert!(scenario.sources.is_empty());
        assert!(scenario.output.is_none());
    }

    #[test]
    fn parses_one_sine_source() {
        let dir = std::env::temp_dir();
        let body = "box with source\n\
                     Grid Parameters\n\
                     10\t10\t10\n\
                     1e-3\t1e-3\t1e-3\n\
                     Fail Safe\n\
                     200\n\
                     1000000000\n\
                     Sources\n\
                     1\n\
                     5\t5\t5\t1\t1\t1e9\n\
                     Dielectrics\n\
                     1.0\n\
                     1.0\n\
                     Antennas\n\
                     0\n";
        let stem = write_scenario(&dir, "pffdtd_test_source", body);
        let scenario = Scenario::load(&stem).expect("scenario parses");
        assert_eq!(scenario.sources.len(), 1);
        assert_eq!(scenario.sources[0].axis, Axis::X);
        assert_eq!(scenario.sources[0].kind, SourceKind::Sine);
    }

    #[test]
    fn rejects_truncated_file() {
        let dir = std::env::temp_dir();
        let stem = write_scenario(&dir, "pffdtd_test_truncated", "only a title\n");
        assert!(Scenario::load(&stem).is_err());
    }
}
