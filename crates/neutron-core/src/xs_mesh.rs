// ─────────────────────────────────────────────────────────────────────
// SCPN Neutron Core — XS Mesh
// © 1998–2026 Miroslav Šotek. All rights reserved.
// Contact: www.anulum.li | protoscience@anulum.li
// ORCID: https://orcid.org/0009-0009-3560-0851
// License: GNU AGPL v3 | Commercial licensing available
// ─────────────────────────────────────────────────────────────────────
//! Fine cross-section mesh: one region per material, covering the
//! fine regions assigned to it.

use neutron_types::error::TransportResult;

use crate::core_mesh::CoreMesh;
use crate::material::ScatteringMatrix;

/// A set of fine regions sharing one set of macroscopic cross
/// sections. Immutable once emitted.
#[derive(Debug, Clone)]
pub struct XSMeshRegion {
    reg: Vec<usize>,
    xstr: Vec<f64>,
    xsnf: Vec<f64>,
    xsch: Vec<f64>,
    xskf: Vec<f64>,
    xssc: ScatteringMatrix,
}

impl XSMeshRegion {
    pub fn new(
        reg: Vec<usize>,
        xstr: Vec<f64>,
        xsnf: Vec<f64>,
        xsch: Vec<f64>,
        xskf: Vec<f64>,
        xssc: ScatteringMatrix,
    ) -> Self {
        XSMeshRegion {
            reg,
            xstr,
            xsnf,
            xsch,
            xskf,
            xssc,
        }
    }

    /// Fine regions covered by this cross-section region.
    pub fn reg(&self) -> &[usize] {
        &self.reg
    }

    pub fn xsmactr(&self) -> &[f64] {
        &self.xstr
    }

    pub fn xsmacnf(&self) -> &[f64] {
        &self.xsnf
    }

    pub fn xsmacch(&self) -> &[f64] {
        &self.xsch
    }

    pub fn xsmackf(&self) -> &[f64] {
        &self.xskf
    }

    pub fn xsmacsc(&self) -> &ScatteringMatrix {
        &self.xssc
    }
}

/// Densely indexed cross-section regions keyed by material, in the
/// material library's dense ID order.
#[derive(Debug, Clone)]
pub struct XSMesh {
    regions: Vec<XSMeshRegion>,
    ng: usize,
}

impl XSMesh {
    /// Bucket every fine region by the material of its pin cross-section
    /// region, then emit one region per material.
    pub fn build(mesh: &CoreMesh) -> TransportResult<Self> {
        let mat_lib = mesh.mat_lib();
        let ng = mat_lib.n_group();

        let mut fsrs: Vec<Vec<usize>> = vec![Vec::new(); mat_lib.n_materials()];
        let mut ireg = 0;
        for (_, pin, pin_mesh) in mesh.pins_lex() {
            for (ixsreg, &mat_id) in pin.mat_ids().iter().enumerate() {
                let mat_index = mat_lib.index_of_id(mat_id)?;
                for _ in 0..pin_mesh.n_fsrs(ixsreg) {
                    fsrs[mat_index].push(ireg);
                    ireg += 1;
                }
            }
        }

        let mut regions = Vec::with_capacity(mat_lib.n_materials());
        for (imat, reg) in fsrs.into_iter().enumerate() {
            let mat = mat_lib.material(imat);
            let xstr: Vec<f64> = (0..ng).map(|g| mat.xstr(g)).collect();
            regions.push(XSMeshRegion::new(
                reg,
                xstr,
                mat.xsnf().to_vec(),
                mat.xsch().to_vec(),
                mat.xskf().to_vec(),
                mat.xssc().clone(),
            ));
        }

        Ok(XSMesh { regions, ng })
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
}
