// ─────────────────────────────────────────────────────────────────────
// SCPN Neutron Core — CLI
// © 1998–2026 Miroslav Šotek. All rights reserved.
// Contact: www.anulum.li | protoscience@anulum.li
// ORCID: https://orcid.org/0009-0009-3560-0851
// License: GNU AGPL v3 | Commercial licensing available
// ─────────────────────────────────────────────────────────────────────
//! Command-line driver: load a problem, solve it, write the payload.

use std::path::PathBuf;
use std::process::ExitCode;
use std::rc::Rc;
use std::sync::atomic::AtomicBool;
use std::sync::Arc;

use clap::Parser;

use neutron_core::core_mesh::CoreMesh;
use neutron_solver::Solver;
use neutron_types::config::ProblemConfig;
use neutron_types::error::TransportResult;

#[derive(Parser)]
#[command(name = "neutron")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Coupled 2D/3D neutron transport solver", long_about = None)]
struct Cli {
    /// Problem description (JSON)
    input: PathBuf,

    /// Output payload path
    #[arg(short, long, default_value = "out.npz")]
    output: PathBuf,

    /// Log level (trace, debug, info, warn, error)
    #[arg(short, long, default_value = "info")]
    log_level: String,
}

fn run(cli: &Cli) -> TransportResult<()> {
    let config = ProblemConfig::from_file(&cli.input.to_string_lossy())?;
    let mesh = Rc::new(CoreMesh::from_config(&config)?);

    let mut solver = Solver::from_config(&config, mesh)?;

    // Embedders wire this flag into their interrupt handling; the
    // solver checks it between outers and stops cleanly so the payload
    // below still gets flushed.
    let interrupt = Arc::new(AtomicBool::new(false));
    solver.install_interrupt(Arc::clone(&interrupt));

    let start = std::time::Instant::now();
    solver.solve()?;
    if let Some(k) = solver.k() {
        log::info!("k-eff = {k:.8}");
    }
    log::info!("Solve time: {:.3} s", start.elapsed().as_secs_f64());

    solver.write_output(&cli.output)?;
    Ok(())
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    env_logger::Builder::new()
        .parse_filters(&cli.log_level)
        .format_timestamp(None)
        .init();

    match run(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            log::error!("{err}");
            eprintln!("Error: {err}");
            ExitCode::FAILURE
        }
    }
}
