// ─────────────────────────────────────────────────────────────────────
// SCPN Neutron Core — XS Mesh Homogenized
// © 1998–2026 Miroslav Šotek. All rights reserved.
// Contact: www.anulum.li | protoscience@anulum.li
// ORCID: https://orcid.org/0009-0009-3560-0851
// License: GNU AGPL v3 | Commercial licensing available
// ─────────────────────────────────────────────────────────────────────
//! Pin-homogenized cross-section mesh.
//!
//! One cross-section region per pin, indexed lexicographically.
//! The initial build volume-weights material cross sections; `update`
//! re-collapses them with flux-volume weighting. χ is always weighted
//! by the fission source, and a pin with no fission source keeps χ = 0.

use std::rc::Rc;

use ndarray::ArrayView2;
use neutron_types::error::TransportResult;

use crate::core_mesh::CoreMesh;
use crate::geometry::{Pin, PinMesh};
use crate::material::ScatteringMatrix;
use crate::xs_mesh::XSMeshRegion;

#[derive(Debug)]
pub struct XSMeshHomogenized {
    mesh: Rc<CoreMesh>,
    regions: Vec<XSMeshRegion>,
    ng: usize,
}

impl XSMeshHomogenized {
    /// Initial volume-weighted build; no flux estimate required.
    pub fn build(mesh: Rc<CoreMesh>) -> TransportResult<Self> {
        let ng = mesh.n_group();
        let mut regions = Vec::with_capacity(mesh.n_pin());
        for (ipin, pin, pin_mesh) in mesh.pins_lex() {
            regions.push(homogenize_region(&mesh, ipin, pin, pin_mesh)?);
        }
        Ok(XSMeshHomogenized { mesh, regions, ng })
    }

    pub fn n_group(&self) -> usize {
        self.ng
    }

    pub fn regions(&self) -> &[XSMeshRegion] {
        &self.regions
    }

    pub fn iter(&self) -> impl Iterator<Item = &XSMeshRegion> {
        self.regions.iter()
    }

    /// Re-collapse with flux-volume weighting. `flux` is the fine-mesh
    /// scalar flux, region-major.
    pub fn update(&mut self, flux: ArrayView2<'_, f64>) -> TransportResult<()> {
        debug_assert_eq!(flux.nrows(), self.mesh.n_reg());
        debug_assert_eq!(flux.ncols(), self.ng);
        let mesh = Rc::clone(&self.mesh);
        for (ipin, pin, pin_mesh) in mesh.pins_lex() {
            self.regions[ipin] =
                homogenize_region_flux(&mesh, ipin, mesh.first_reg(ipin), pin, pin_mesh, flux)?;
        }
        Ok(())
    }
}

/// Volume-weighted collapse of one pin. χ is weighted by the material
/// fission source Σ_g νΣ_f(g) rather than volume.
fn homogenize_region(
    mesh: &CoreMesh,
    ipin: usize,
    pin: &Pin,
    pin_mesh: &PinMesh,
) -> TransportResult<XSMeshRegion> {
    let mat_lib = mesh.mat_lib();
    let ng = mat_lib.n_group();
    let areas = pin_mesh.areas();
    let pin_area = pin_mesh.area();

    let mut xstr = vec![0.0; ng];
    let mut xsnf = vec![0.0; ng];
    let mut xskf = vec![0.0; ng];
    let mut xsch = vec![0.0; ng];
    let mut scat = vec![vec![0.0; ng]; ng];

    for ig in 0..ng {
        let mut ireg = 0;
        let mut fvol = 0.0;
        for (ixsreg, &mat_id) in pin.mat_ids().iter().enumerate() {
            let mat = mat_lib.get_by_id(mat_id)?;
            let scat_row = mat.xssc().to(ig);
            let fsrc: f64 = mat.xsnf().iter().sum();
            for _ in 0..pin_mesh.n_fsrs(ixsreg) {
                let v = areas[ireg];
                fvol += v * fsrc;
                xstr[ig] += v * mat.xstr(ig);
                xsnf[ig] += v * mat.xsnf()[ig];
                xskf[ig] += v * mat.xskf()[ig];
                xsch[ig] += v * fsrc * mat.xsch()[ig];
                for (igg, s) in scat_row.iter() {
                    scat[ig][igg] += s * v;
                }
                ireg += 1;
            }
        }

        xstr[ig] /= pin_area;
        xsnf[ig] /= pin_area;
        xskf[ig] /= pin_area;
        if fvol > 0.0 {
            xsch[ig] /= fvol;
        }
        for s in scat[ig].iter_mut() {
            *s /= pin_area;
        }
    }

    Ok(XSMeshRegion::new(
        vec![ipin],
        xstr,
        xsnf,
        xsch,
        xskf,
        ScatteringMatrix::from_dense_into(&scat),
    ))
}

/// Flux-volume-weighted collapse of one pin. Scattering normalizes by
/// the source-group flux volume; groups with zero flux volume fall
/// back to the volume-weighted limit.
fn homogenize_region_flux(
    mesh: &CoreMesh,
    ipin: usize,
    first_reg: usize,
    pin: &Pin,
    pin_mesh: &PinMesh,
    flux: ArrayView2<'_, f64>,
) -> TransportResult<XSMeshRegion> {
    let mat_lib = mesh.mat_lib();
    let ng = mat_lib.n_group();
    let areas = pin_mesh.areas();

    // Fission source per fine region, the weighting factor for chi
    let mut fs = vec![0.0; pin_mesh.n_reg()];
    {
        let mut ireg_local = 0;
        for (ixsreg, &mat_id) in pin.mat_ids().iter().enumerate() {
            let mat = mat_lib.get_by_id(mat_id)?;
            for _ in 0..pin_mesh.n_fsrs(ixsreg) {
                let v = areas[ireg_local];
                for ig in 0..ng {
                    fs[ireg_local] += mat.xsnf()[ig] * flux[[first_reg + ireg_local, ig]] * v;
                }
                ireg_local += 1;
            }
        }
    }
    let fs_sum: f64 = fs.iter().sum();

    let mut xstr = vec![0.0; ng];
    let mut xsnf = vec![0.0; ng];
    let mut xskf = vec![0.0; ng];
    let mut xsch = vec![0.0; ng];
    let mut scat = vec![vec![0.0; ng]; ng];

    for ig in 0..ng {
        let mut fluxvolsum = 0.0;
        let mut volsum = 0.0;
        // Volume-weighted accumulators back the zero-flux limit
        let mut xstr_v = 0.0;
        let mut xsnf_v = 0.0;
        let mut xskf_v = 0.0;
        let mut scatsum = vec![0.0; ng];
        let mut scat_v = vec![0.0; ng];
        let mut scatsum_v = vec![0.0; ng];

        let mut ireg_local = 0;
        for (ixsreg, &mat_id) in pin.mat_ids().iter().enumerate() {
            let mat = mat_lib.get_by_id(mat_id)?;
            let scat_row = mat.xssc().to(ig);
            for _ in 0..pin_mesh.n_fsrs(ixsreg) {
                let v = areas[ireg_local];
                let flux_i = flux[[first_reg + ireg_local, ig]];
                fluxvolsum += v * flux_i;
                volsum += v;
                xstr[ig] += v * flux_i * mat.xstr(ig);
                xsnf[ig] += v * flux_i * mat.xsnf()[ig];
                xskf[ig] += v * flux_i * mat.xskf()[ig];
                xstr_v += v * mat.xstr(ig);
                xsnf_v += v * mat.xsnf()[ig];
                xskf_v += v * mat.xskf()[ig];
                xsch[ig] += fs[ireg_local] * mat.xsch()[ig];

                for igg in 0..ng {
                    let fluxgg = flux[[first_reg + ireg_local, igg]];
                    scatsum[igg] += fluxgg * v;
                    scatsum_v[igg] += v;
                    let s = scat_row.from_group(igg);
                    scat[ig][igg] += s * v * fluxgg;
                    scat_v[igg] += s * v;
                }
                ireg_local += 1;
            }
        }

        for igg in 0..ng {
            if scatsum[igg] > 0.0 {
                scat[ig][igg] /= scatsum[igg];
            } else {
                scat[ig][igg] = scat_v[igg] / scatsum_v[igg];
            }
        }

        if fluxvolsum > 0.0 {
            xstr[ig] /= fluxvolsum;
            xsnf[ig] /= fluxvolsum;
            xskf[ig] /= fluxvolsum;
        } else {
            xstr[ig] = xstr_v / volsum;
            xsnf[ig] = xsnf_v / volsum;
            xskf[ig] = xskf_v / volsum;
        }
        if fs_sum > 0.0 {
            xsch[ig] /= fs_sum;
        } else {
            xsch[ig] = 0.0;
        }
    }

    Ok(XSMeshRegion::new(
        vec![ipin],
        xstr,
        xsnf,
        xsch,
        xskf,
        ScatteringMatrix::from_dense_into(&scat),
    ))
}
