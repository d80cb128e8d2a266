// ─────────────────────────────────────────────────────────────────────
// SCPN Neutron Core — Sweeper
// © 1998–2026 Miroslav Šotek. All rights reserved.
// Contact: www.anulum.li | protoscience@anulum.li
// ORCID: https://orcid.org/0009-0009-3560-0851
// License: GNU AGPL v3 | Commercial licensing available
// ─────────────────────────────────────────────────────────────────────
//! The transport sweeper contract shared by the Sn, MoC, and 2D3D
//! composite kernels.

use std::cell::RefCell;
use std::rc::Rc;

use ndarray::{Array1, ArrayView2};
use neutron_types::error::TransportResult;

use crate::source::{ScatterFlux, TransportSource};
use crate::xs_mesh::XSMeshRegion;
use crate::xs_mesh_homogenized::XSMeshHomogenized;

/// One transport kernel: owns its flux, sweeps one group at a time
/// against an externally assembled source.
pub trait TransportSweeper {
    /// Regions in the sweeper's primary flux space.
    fn n_reg(&self) -> usize;

    fn n_group(&self) -> usize;

    fn n_pin(&self) -> usize;

    /// Scalar flux, region-major.
    fn flux(&self) -> ArrayView2<'_, f64>;

    /// Flux views for scatter-source assembly.
    fn scatter_flux(&self) -> ScatterFlux<'_>;

    /// Sweep one group against the assembled source.
    fn sweep(&mut self, group: usize, source: &TransportSource) -> TransportResult<()>;

    /// Build the source variant this sweeper consumes.
    fn create_source(&self) -> TransportSource;

    fn store_old_flux(&mut self);

    /// Fission bank on the sweeper's region space, scaled by 1/k.
    fn calc_fission_source(&self, k: f64, fs: &mut Array1<f64>);

    /// Volume-integrated fission production from the current or the
    /// stashed flux.
    fn total_fission(&self, old: bool) -> f64;

    /// Pin-averaged scalar flux for one group.
    fn get_pin_flux_1g(&self, g: usize, out: &mut Array1<f64>);

    /// Impose a pin-averaged flux, rescaling the interior shape.
    /// Returns the relative L2 change of the pin averages.
    fn set_pin_flux_1g(&mut self, g: usize, pin_flux: &Array1<f64>) -> f64;

    /// The homogenized cross-section mesh, when this kernel carries one.
    fn homogenized_xs(&self) -> Option<Rc<RefCell<XSMeshHomogenized>>> {
        None
    }

    /// Per-group Sn–MoC residual histories of a composite sweeper.
    fn sn_moc_residuals(&self) -> Option<&[Vec<f64>]> {
        None
    }
}

/// fs[r] = (1/k) Σ_g νΣ_f(r, g) φ(r, g) over a region set.
pub fn fission_source_into(
    regions: &[XSMeshRegion],
    flux: ArrayView2<'_, f64>,
    k: f64,
    fs: &mut Array1<f64>,
) {
    fs.fill(0.0);
    let rk = 1.0 / k;
    for xsr in regions {
        for (g, &nf) in xsr.xsmacnf().iter().enumerate() {
            if nf == 0.0 {
                continue;
            }
            for &r in xsr.reg() {
                fs[r] += rk * nf * flux[[r, g]];
            }
        }
    }
}

/// Volume-integrated fission production Σ_r Σ_g νΣ_f φ V.
pub fn total_fission_of(
    regions: &[XSMeshRegion],
    flux: ArrayView2<'_, f64>,
    vol: &[f64],
) -> f64 {
    let mut total = 0.0;
    for xsr in regions {
        for (g, &nf) in xsr.xsmacnf().iter().enumerate() {
            if nf == 0.0 {
                continue;
            }
            for &r in xsr.reg() {
                total += nf * flux[[r, g]] * vol[r];
            }
        }
    }
    total
}
