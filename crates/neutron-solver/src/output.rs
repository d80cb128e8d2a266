// ─────────────────────────────────────────────────────────────────────
// SCPN Neutron Core — Output
// © 1998–2026 Miroslav Šotek. All rights reserved.
// Contact: www.anulum.li | protoscience@anulum.li
// ORCID: https://orcid.org/0009-0009-3560-0851
// License: GNU AGPL v3 | Commercial licensing available
// ─────────────────────────────────────────────────────────────────────
//! NPZ output payload.
//!
//! Pin-flux grids are written per group with reversed (z, y, x)
//! dimensions, alongside the homogenized cross sections and the
//! solver histories.

use std::fs::File;
use std::path::Path;

use ndarray::{Array1, Array3};
use ndarray_npy::NpzWriter;
use neutron_types::error::{TransportError, TransportResult};

use neutron_core::core_mesh::CoreMesh;
use neutron_core::sweeper::TransportSweeper;

fn wrap<E: std::fmt::Display>(err: E) -> TransportError {
    TransportError::Io(std::io::Error::other(err.to_string()))
}

/// Write the solution payload. `k_history` is present for eigenvalue
/// solves only.
pub fn write_output(
    path: &Path,
    mesh: &CoreMesh,
    sweeper: &dyn TransportSweeper,
    k_history: Option<&[f64]>,
) -> TransportResult<()> {
    let file = File::create(path)?;
    let mut npz = NpzWriter::new(file);

    let (nx, ny, nz) = (mesh.nx(), mesh.ny(), mesh.nz());
    let ng = sweeper.n_group();

    let mut pin = Array1::zeros(mesh.n_pin());
    for g in 0..ng {
        sweeper.get_pin_flux_1g(g, &mut pin);
        let mut cube = Array3::zeros((nz, ny, nx));
        for ipin in 0..mesh.n_pin() {
            let pos = mesh.pin_position(ipin);
            cube[[pos.iz, pos.iy, pos.ix]] = pin[ipin];
        }
        npz.add_array(format!("flux/g{g:03}"), &cube).map_err(wrap)?;
    }

    if let Some(xs) = sweeper.homogenized_xs() {
        let xs = xs.borrow();
        for g in 0..ng {
            let mut xstr = Array3::zeros((nz, ny, nx));
            let mut xsnf = Array3::zeros((nz, ny, nx));
            for (ipin, region) in xs.regions().iter().enumerate() {
                let pos = mesh.pin_position(ipin);
                xstr[[pos.iz, pos.iy, pos.ix]] = region.xsmactr()[g];
                xsnf[[pos.iz, pos.iy, pos.ix]] = region.xsmacnf()[g];
            }
            npz.add_array(format!("xsmesh/xstr/g{g:03}"), &xstr)
                .map_err(wrap)?;
            npz.add_array(format!("xsmesh/xsnf/g{g:03}"), &xsnf)
                .map_err(wrap)?;
        }

        let mut scat = Array3::zeros((xs.regions().len(), ng, ng));
        for (ipin, region) in xs.regions().iter().enumerate() {
            let dense = region.xsmacsc().as_dense();
            for g_to in 0..ng {
                for g_from in 0..ng {
                    scat[[ipin, g_to, g_from]] = dense[g_to][g_from];
                }
            }
        }
        npz.add_array("xsmesh/xssc", &scat).map_err(wrap)?;
    }

    if let Some(history) = k_history {
        let hist = Array1::from_vec(history.to_vec());
        npz.add_array("k_history", &hist).map_err(wrap)?;
        if let Some(&k) = history.last() {
            npz.add_array("k_eff", &Array1::from_vec(vec![k]))
                .map_err(wrap)?;
        }
    }

    if let Some(residuals) = sweeper.sn_moc_residuals() {
        for (g, hist) in residuals.iter().enumerate() {
            let arr = Array1::from_vec(hist.clone());
            npz.add_array(format!("sn_moc_resid/g{g:03}"), &arr)
                .map_err(wrap)?;
        }
    }

    npz.finish().map_err(wrap)?;
    log::info!("Wrote output payload to {}", path.display());
    Ok(())
}
