//! §14 — Output Writers (ambient expansion of C7's external-interface
//! contract, spec §6.3). Grounded on `outputN.h`'s `headvc`/`headfd`/
//! `outputfd`, translated to buffered writers instead of raw `FILE*`.

use std::{
    fs::File,
    io::{
        BufWriter,
        Write,
    },
    path::{
        Path,
        PathBuf,
    },
};

use crate::{
    error::PffdtdError,
    grid::{
        Grid,
        SwapBufferIndex,
    },
    plasma::PlasmaState,
    scenario::{
        OutputFields,
        OutputSpec,
    },
    source::Source,
};

fn open_writer(path: &Path) -> Result<BufWriter<File>, PffdtdError> {
    File::create(path)
        .map(BufWriter::new)
        .map_err(|source| PffdtdError::FileOpen { path: path.to_path_buf(), source })
}

/// Per-step V/I record (`<output-stem>.vc`).
pub struct VcWriter {
    writer: BufWriter<File>,
}

impl VcWriter {
    pub fn create(stem: &str, source_count: usize) -> Result<Self, PffdtdError> {
        let path = PathBuf::from(format!("{stem}.vc"));
        let mut writer = open_writer(&path)?;
        Self::write_header(&mut writer, source_count).map_err(|source| PffdtdError::FileOpen { path, source })?;
        Ok(Self { writer })
    }

    fn write_header(writer: &mut BufWriter<File>, source_count: usize) -> std::io::Result<()> {
        write!(writer, "0")?;
        for i in 1..=source_count {
            write!(writer, "\t{i}1\t{i}2")?;
        }
        writeln!(writer)
    }

    pub fn write_record(&mut self, t: f64, sources: &[Source]) -> Result<(), PffdtdError> {
        let map_err = |source: std::io::Error| PffdtdError::FileOpen {
            path: PathBuf::from("<.vc>"),
            source,
        };
        write!(self.writer, "{t:e}").map_err(map_err)?;
        for source in sources {
            write!(self.writer, "\t{:e}\t{:e}", source.volt, source.current).map_err(map_err)?;
        }
        writeln!(self.writer).map_err(map_err)?;
        Ok(())
    }

    pub fn flush(&mut self) -> Result<(), PffdtdError> {
        self.writer.flush().map_err(|source| PffdtdError::FileOpen { path: PathBuf::from("<.vc>"), source })
    }
}

/// Volumetric field snapshot (`<output-stem>.fd`).
pub struct FdWriter {
    writer: BufWriter<File>,
    spec: OutputSpec,
    plasma_enabled: bool,
}

impl FdWriter {
    pub fn create(stem: &str, spec: OutputSpec, plasma_enabled: bool) -> Result<Self, PffdtdError> {
        let path = PathBuf::from(format!("{stem}.fd"));
        let mut writer = open_writer(&path)?;
        Self::write_headers(&mut writer, &spec, plasma_enabled).map_err(|source| PffdtdError::FileOpen { path, source })?;
        Ok(Self { writer, spec, plasma_enabled })
    }

    fn cells(spec: &OutputSpec) -> impl Iterator<Item = (usize, usize, usize)> + '_ {
        (spec.lower.0..=spec.upper.0)
            .flat_map(move |i| (spec.lower.1..=spec.upper.1).flat_map(move |j| (spec.lower.2..=spec.upper.2).map(move |k| (i, j, k))))
    }

    fn write_headers(writer: &mut BufWriter<File>, spec: &OutputSpec, plasma_enabled: bool) -> std::io::Result<()> {
        // Field-id row.
        write!(writer, "0")?;
        for _ in Self::cells(spec) {
            if spec.fields.contains(OutputFields::ELECTRIC) {
                write!(writer, "\t11\t12\t13")?;
            }
            if spec.fields.contains(OutputFields::MAGNETIC) {
                write!(writer, "\t21\t22\t23")?;
            }
            if plasma_enabled {
                if spec.fields.contains(OutputFields::E_VELOCITY) {
                    write!(writer, "\t31\t32\t33")?;
                }
                if spec.fields.contains(OutputFields::E_DENSITY) {
                    write!(writer, "\t40")?;
                }
                if spec.fields.contains(OutputFields::ION_VELOCITY) {
                    write!(writer, "\t51\t52\t53")?;
                }
            }
        }
        writeln!(writer)?;

        // Location-id rows, one per axis.
        for axis in 0..3 {
            write!(writer, "0")?;
            for (i, j, k) in Self::cells(spec) {
                let coord = [i, j, k][axis];
                if spec.fields.contains(OutputFields::ELECTRIC) {
                    write!(writer, "\t{coord}\t{coord}\t{coord}")?;
                }
                if spec.fields.contains(OutputFields::MAGNETIC) {
                    write!(writer, "\t{coord}\t{coord}\t{coord}")?;
                }
                if plasma_enabled {
                    if spec.fields.contains(OutputFields::E_VELOCITY) {
                        write!(writer, "\t{coord}\t{coord}\t{coord}")?;
                    }
                    if spec.fields.contains(OutputFields::E_DENSITY) {
                        write!(writer, "\t{coord}")?;
                    }
                    if spec.fields.contains(OutputFields::ION_VELOCITY) {
                        write!(writer, "\t{coord}\t{coord}\t{coord}")?;
                    }
                }
            }
            writeln!(writer)?;
        }
        Ok(())
    }

    /// Emits one snapshot line. `fields[5]` (ion density) is parsed from the
    /// scenario but never emitted — the original's `outputfd` has that
    /// branch commented out, so there is no literal formula to reproduce.
    pub fn write_snapshot(&mut self, t: f64, grid: &Grid, cur: SwapBufferIndex, plasma: Option<&PlasmaState>) -> Result<(), PffdtdError> {
        let map_err = |source: std::io::Error| PffdtdError::FileOpen {
            path: PathBuf::from("<.fd>"),
            source,
        };
        write!(self.writer, "{t:e}").map_err(map_err)?;
        let strider = grid.strider;

        for (i, j, k) in Self::cells(&self.spec) {
            if self.spec.fields.contains(OutputFields::ELECTRIC) {
                write!(
                    self.writer,
                    "\t{:e}\t{:e}\t{:e}",
                    grid.ex.get(&strider, cur, i, j, k),
                    grid.ey.get(&strider, cur, i, j, k),
                    grid.ez.get(&strider, cur, i, j, k)
                )
                .map_err(map_err)?;
            }
            if self.spec.fields.contains(OutputFields::MAGNETIC) {
                write!(
                    self.writer,
                    "\t{:e}\t{:e}\t{:e}",
                    grid.bx.get(&strider, cur, i, j, k),
                    grid.by.get(&strider, cur, i, j, k),
                    grid.bz.get(&strider, cur, i, j, k)
                )
                .map_err(map_err)?;
            }
            if let Some(plasma) = plasma {
                if self.spec.fields.contains(OutputFields::E_VELOCITY) {
                    write!(
                        self.writer,
                        "\t{:e}\t{:e}\t{:e}",
                        plasma.fields[0].ux.get(&strider, 1, i, j, k),
                        plasma.fields[0].uy.get(&strider, 1, i, j, k),
                        plasma.fields[0].uz.get(&strider, 1, i, j, k)
                    )
                    .map_err(map_err)?;
                }
                if self.spec.fields.contains(OutputFields::E_DENSITY) {
                    write!(self.writer, "\t{:e}", plasma.fields[0].n.get(&strider, 1, i, j, k)).map_err(map_err)?;
                }
                if self.spec.fields.contains(OutputFields::ION_VELOCITY) {
                    write!(
                        self.writer,
                        "\t{:e}\t{:e}\t{:e}",
                        plasma.fields[1].ux.get(&strider, 1, i, j, k),
                        plasma.fields[1].uy.get(&strider, 1, i, j, k),
                        plasma.fields[1].uz.get(&strider, 1, i, j, k)
                    )
                    .map_err(map_err)?;
                }
            }
        }
        writeln!(self.writer).map_err(map_err)?;
        Ok(())
    }

    pub fn flush(&mut self) -> Result<(), PffdtdError> {
        self.writer.flush().map_err(|source| PffdtdError::FileOpen { path: PathBuf::from("<.fd>"), source })
    }
}
