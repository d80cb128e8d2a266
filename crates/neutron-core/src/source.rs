// ─────────────────────────────────────────────────────────────────────
// SCPN Neutron Core — Source
// © 1998–2026 Miroslav Šotek. All rights reserved.
// Contact: www.anulum.li | protoscience@anulum.li
// ORCID: https://orcid.org/0009-0009-3560-0851
// License: GNU AGPL v3 | Commercial licensing available
// ─────────────────────────────────────────────────────────────────────
//! Group source assembly: fission, in-scatter, self-scatter, and
//! external contributions.
//!
//! A plain `Source` serves a single sweeper. The 2D3D composite needs
//! two (the MoC source on the fine mesh and the Sn source on the pin
//! mesh, fed from the same fission bank), composed in `Source2D3D` and
//! dispatched through the `TransportSource` variants so no downcasting
//! is ever required.

use std::cell::RefCell;
use std::rc::Rc;

use ndarray::{Array1, Array2, ArrayView2};
use neutron_types::constants::RFOUR_PI;
use neutron_types::error::{TransportError, TransportResult};

use crate::core_mesh::CoreMesh;
use crate::xs_mesh::{XSMesh, XSMeshRegion};
use crate::xs_mesh_homogenized::XSMeshHomogenized;

/// Cross-section access for a source: the fine mesh is immutable and
/// shared, the homogenized mesh is re-collapsed between outers and so
/// sits behind a `RefCell` under the single-threaded sweep invariant.
#[derive(Clone)]
pub enum XsHandle {
    Fine(Rc<XSMesh>),
    Homogenized(Rc<RefCell<XSMeshHomogenized>>),
}

impl XsHandle {
    pub fn with_regions<R>(&self, f: impl FnOnce(&[XSMeshRegion]) -> R) -> R {
        match self {
            XsHandle::Fine(xs) => f(xs.regions()),
            XsHandle::Homogenized(xs) => f(xs.borrow().regions()),
        }
    }

    pub fn n_group(&self) -> usize {
        match self {
            XsHandle::Fine(xs) => xs.n_group(),
            XsHandle::Homogenized(xs) => xs.borrow().n_group(),
        }
    }
}

/// Per-group scalar source over one region space.
pub struct Source {
    q: Array1<f64>,
    xs: XsHandle,
    external: Option<Array2<f64>>,
}

impl Source {
    pub fn new(n_reg: usize, xs: XsHandle) -> Self {
        Source {
            q: Array1::zeros(n_reg),
            xs,
            external: None,
        }
    }

    pub fn n_reg(&self) -> usize {
        self.q.len()
    }

    /// Attach an external volumetric source, region-major per group.
    pub fn set_external(&mut self, external: Array2<f64>) {
        debug_assert_eq!(external.nrows(), self.q.len());
        self.external = Some(external);
    }

    /// Start the group source from the fission bank: q = χ_g · fs,
    /// plus any external contribution.
    pub fn fission(&mut self, fs: &Array1<f64>, g: usize) {
        debug_assert_eq!(fs.len(), self.q.len());
        self.q.fill(0.0);
        self.xs.with_regions(|regions| {
            for xsr in regions {
                let chi = xsr.xsmacch()[g];
                if chi == 0.0 {
                    continue;
                }
                for &r in xsr.reg() {
                    self.q[r] = chi * fs[r];
                }
            }
        });
        if let Some(ext) = &self.external {
            for r in 0..self.q.len() {
                self.q[r] += ext[[r, g]];
            }
        }
    }

    /// Add in-scatter from every other group into `g`.
    pub fn in_scatter(&mut self, g: usize, flux: ArrayView2<'_, f64>) {
        debug_assert_eq!(flux.nrows(), self.q.len());
        self.xs.with_regions(|regions| {
            for xsr in regions {
                let row = xsr.xsmacsc().to(g);
                for (gg, s) in row.iter() {
                    if gg == g || s == 0.0 {
                        continue;
                    }
                    for &r in xsr.reg() {
                        self.q[r] += s * flux[[r, gg]];
                    }
                }
            }
        });
    }

    /// Produce the per-steradian sweep source: self-scatter from the
    /// latest one-group flux is folded in and the total divided by 4π.
    pub fn self_scatter(&self, g: usize, flux_1g: &Array1<f64>, q_out: &mut Array1<f64>) {
        debug_assert_eq!(flux_1g.len(), self.q.len());
        debug_assert_eq!(q_out.len(), self.q.len());
        self.xs.with_regions(|regions| {
            for xsr in regions {
                let s_self = xsr.xsmacsc().self_scatter(g);
                for &r in xsr.reg() {
                    q_out[r] = (self.q[r] + s_self * flux_1g[r]) * RFOUR_PI;
                }
            }
        });
    }
}

/// Composite source for the 2D3D sweeper: a fine-mesh MoC source and a
/// pin-mesh Sn source reading the same fission bank.
pub struct Source2D3D {
    moc: Source,
    sn: Source,
    mesh: Rc<CoreMesh>,
    fs_pin: Array1<f64>,
}

impl Source2D3D {
    pub fn new(moc: Source, sn: Source, mesh: Rc<CoreMesh>) -> Self {
        let n_pin = mesh.n_pin();
        Source2D3D {
            moc,
            sn,
            mesh,
            fs_pin: Array1::zeros(n_pin),
        }
    }

    pub fn moc(&self) -> &Source {
        &self.moc
    }

    pub fn sn(&self) -> &Source {
        &self.sn
    }

    /// Fine-mesh fission bank drives both sources; the Sn side sees
    /// its volume-weighted pin collapse.
    pub fn fission(&mut self, fs: &Array1<f64>, g: usize) {
        self.moc.fission(fs, g);
        let vols = self.mesh.volumes();
        for ipin in 0..self.mesh.n_pin() {
            let first = self.mesh.first_reg(ipin);
            let (_, pin_mesh) = self.mesh.pin(ipin);
            let mut num = 0.0;
            for r in first..first + pin_mesh.n_reg() {
                num += fs[r] * vols[r];
            }
            self.fs_pin[ipin] = num / self.mesh.coarse_volume(ipin);
        }
        self.sn.fission(&self.fs_pin, g);
    }

    pub fn in_scatter(&mut self, g: usize, fine_flux: ArrayView2<'_, f64>, pin_flux: ArrayView2<'_, f64>) {
        self.moc.in_scatter(g, fine_flux);
        self.sn.in_scatter(g, pin_flux);
    }
}

/// Scalar flux views a sweeper exposes for scatter-source assembly.
/// `fine` lives on the sweeper's primary region space; `pin` is the
/// secondary pin-mesh flux of a composite sweeper.
pub struct ScatterFlux<'a> {
    pub fine: ArrayView2<'a, f64>,
    pub pin: Option<ArrayView2<'a, f64>>,
}

/// Tagged source variant matching the sweeper that created it.
pub enum TransportSource {
    Plain(Source),
    TwoDThreeD(Source2D3D),
}

impl TransportSource {
    pub fn fission(&mut self, fs: &Array1<f64>, g: usize) {
        match self {
            TransportSource::Plain(s) => s.fission(fs, g),
            TransportSource::TwoDThreeD(s) => s.fission(fs, g),
        }
    }

    pub fn in_scatter(&mut self, g: usize, fluxes: &ScatterFlux<'_>) -> TransportResult<()> {
        match self {
            TransportSource::Plain(s) => {
                s.in_scatter(g, fluxes.fine);
                Ok(())
            }
            TransportSource::TwoDThreeD(s) => {
                let pin = fluxes.pin.ok_or_else(|| {
                    TransportError::Config(
                        "2D3D source requires a pin-mesh flux for in-scatter.".into(),
                    )
                })?;
                s.in_scatter(g, fluxes.fine, pin);
                Ok(())
            }
        }
    }

    /// Attach a spatially uniform external source, one strength per group.
    pub fn set_external_uniform(&mut self, per_group: &[f64]) {
        match self {
            TransportSource::Plain(s) => {
                let ext = uniform_external(s.n_reg(), per_group);
                s.set_external(ext);
            }
            TransportSource::TwoDThreeD(s) => {
                let ext = uniform_external(s.moc.n_reg(), per_group);
                s.moc.set_external(ext);
                let ext = uniform_external(s.sn.n_reg(), per_group);
                s.sn.set_external(ext);
            }
        }
    }

    pub fn plain(&self) -> TransportResult<&Source> {
        match self {
            TransportSource::Plain(s) => Ok(s),
            TransportSource::TwoDThreeD(_) => Err(TransportError::Config(
                "Sweeper expects a plain source.".into(),
            )),
        }
    }

    pub fn two_d_three_d(&self) -> TransportResult<&Source2D3D> {
        match self {
            TransportSource::TwoDThreeD(s) => Ok(s),
            TransportSource::Plain(_) => Err(TransportError::Config(
                "2D3D sweeper expects a composite source.".into(),
            )),
        }
    }
}

fn uniform_external(n_reg: usize, per_group: &[f64]) -> Array2<f64> {
    let mut ext = Array2::zeros((n_reg, per_group.len()));
    for (g, &v) in per_group.iter().enumerate() {
        ext.column_mut(g).fill(v);
    }
    ext
}
