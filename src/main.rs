//! §13 — CLI & Process Lifecycle.
//!
//! Argument cascade and exit codes are pinned by spec §6.1; the
//! `clap`/`color_eyre`/`tracing_subscriber` wiring follows the teacher's own
//! `main.rs`, minus the GUI (`eframe::run_native`) this program has no use
//! for.

mod axis;
mod boundary;
mod checkpoint;
mod context;
mod error;
mod grid;
mod maxwell;
mod output;
mod physics;
mod plasma;
mod scenario;
mod source;

use std::sync::{
    Arc,
    atomic::{
        AtomicBool,
        Ordering,
    },
};

use clap::Parser;
use tracing::{
    info,
    warn,
};

use crate::{
    context::SimulationContext,
    error::PffdtdError,
    grid::Grid,
    output::{
        FdWriter,
        VcWriter,
    },
    physics::PhysicalConstants,
    plasma::{
        PlasmaParams,
        PlasmaState,
    },
    scenario::Scenario,
};

/// `pffdtd <input-stem> [<output-stem> [<f_plasma> [<f_col_ratio> [<f_cyc> [<θE> [<θA> [<T_Kelvin>]]]]]]]`
#[derive(Parser, Debug)]
#[command(version, about = "FDTD solver for cold/warm magnetized multi-species plasma")]
struct Args {
    input_stem: String,
    output_stem: Option<String>,
    f_plasma: Option<f64>,
    f_col_ratio: Option<f64>,
    f_cyc: Option<f64>,
    angle_elevation_deg: Option<f64>,
    angle_azimuth_deg: Option<f64>,
    temperature_kelvin: Option<f64>,
}

fn main() -> color_eyre::eyre::Result<()> {
    tracing_subscriber::fmt::init();
    color_eyre::install()?;

    let args = Args::parse();
    match run(&args) {
        Ok(()) => Ok(()),
        Err(error) => {
            tracing::error!(%error, "fatal");
            std::process::exit(error.exit_code());
        }
    }
}

fn run(args: &Args) -> Result<(), PffdtdError> {
    let output_stem = args.output_stem.clone().unwrap_or_else(|| args.input_stem.clone());

    info!("opening scenario {}.str", args.input_stem);
    let scenario = Scenario::load(&args.input_stem)?;

    let physics = PhysicalConstants::default();
    let dt = scenario.dt(physics.speed_of_light());

    let mut grid = Grid::new(scenario.sx, scenario.sy, scenario.sz);

    let (mut plasma, df) = match args.f_plasma {
        Some(freq_plasma) => {
            let params = PlasmaParams {
                freq_plasma,
                freq_col_ratio: args.f_col_ratio.unwrap_or(0.1),
                freq_cyc: args.f_cyc.unwrap_or(1.5 * freq_plasma),
                angle_elevation_deg: args.angle_elevation_deg.unwrap_or(0.0),
                angle_azimuth_deg: args.angle_azimuth_deg.unwrap_or(0.0),
                temperature_kelvin: args.temperature_kelvin.unwrap_or(0.0),
                ..PlasmaParams::default()
            };
            let state = PlasmaState::new(&grid.strider, params, physics.vacuum_permittivity);
            info!(n0_electron = state.n0[0], n0_ion1 = state.n0[1], n0_ion2 = state.n0[2], "plasma ambient densities");
            (Some(state), dt * freq_plasma)
        }
        None => (None, 0.0),
    };

    match plasma.as_mut() {
        Some(plasma) => {
            scenario.stamp_materials(&mut grid, &mut plasma.qf, plasma.params.antenna_charge, true);
            plasma.stamp_sig(&grid);
        }
        None => {
            let mut unused_qf = vec![1.0; grid.strider.len()];
            scenario.stamp_materials(&mut grid, &mut unused_qf, 1.0, false);
        }
    }

    let mut ctx = SimulationContext {
        grid,
        plasma,
        sources: scenario.sources.clone(),
        physics,
        dx: scenario.dx,
        dy: scenario.dy,
        dz: scenario.dz,
        dt,
        df,
        fail_safe: scenario.fail_safe,
        plasma_cycle: scenario.plasma_cycle,
        iter: 0,
        t: 0.0,
    };

    let quit = Arc::new(AtomicBool::new(false));
    let quit_for_handler = Arc::clone(&quit);
    let already_warned = Arc::new(AtomicBool::new(false));
    ctrlc::set_handler(move || {
        if already_warned.swap(true, Ordering::SeqCst) {
            warn!("second interrupt received, terminating immediately");
            std::process::exit(130);
        }
        warn!("interrupt received, finishing the current step then exiting");
        quit_for_handler.store(true, Ordering::SeqCst);
    })
    .map_err(|source| PffdtdError::SignalSetup { source })?;

    let mut vc_writer = VcWriter::create(&output_stem, ctx.sources.len())?;
    let mut fd_writer = scenario.output.map(|spec| FdWriter::create(&output_stem, spec, ctx.plasma.is_some())).transpose()?;

    info!("Control-C to exit early");
    loop {
        ctx.step();

        vc_writer.write_record(ctx.t, &ctx.sources)?;
        if let (Some(writer), Some(spec)) = (fd_writer.as_mut(), scenario.output) {
            if ctx.snapshot_due(spec.frate) {
                writer.write_snapshot(ctx.t, &ctx.grid, ctx.cur_slot(), ctx.plasma.as_ref())?;
            }
        }

        if ctx.fail_safe_or_cycle_limit_reached() || quit.load(Ordering::SeqCst) {
            break;
        }
    }

    vc_writer.flush()?;
    if let Some(writer) = fd_writer.as_mut() {
        writer.flush()?;
    }

    info!(iterations = ctx.iter, "simulation complete");
    Ok(())
}
