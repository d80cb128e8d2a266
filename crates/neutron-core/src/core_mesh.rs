// ─────────────────────────────────────────────────────────────────────
// SCPN Neutron Core — Core Mesh
// © 1998–2026 Miroslav Šotek. All rights reserved.
// Contact: www.anulum.li | protoscience@anulum.li
// ORCID: https://orcid.org/0009-0009-3560-0851
// License: GNU AGPL v3 | Commercial licensing available
// ─────────────────────────────────────────────────────────────────────
//! Owner of the full geometry hierarchy and the material library.
//!
//! Provides the canonical lexicographic pin indexing, the coarse
//! (pin-wise) mesh, per-region volumes, and the per-plane fine grids
//! consumed by the ray tracer.

use std::collections::BTreeMap;

use neutron_types::config::{BoundaryCondition, ProblemConfig};
use neutron_types::error::{TransportError, TransportResult};

use crate::geometry::{Assembly, Core, Lattice, Pin, PinMesh};
use crate::material::MaterialLib;
use crate::mesh::{CoarseMesh, Position, Surface};

/// Merge tolerance for coincident fine-grid cuts.
const CUT_TOL: f64 = 1e-9;

/// Flattened fine grid of one axial plane: a rectilinear grid of fine
/// cells with plane-local flat-source-region and pin indices.
#[derive(Debug, Clone)]
pub struct PlaneGeometry {
    /// Fine-cell x boundaries, ascending, first 0 and last hx.
    pub xcuts: Vec<f64>,
    /// Fine-cell y boundaries.
    pub ycuts: Vec<f64>,
    /// Plane-local flat-source region of each fine cell, row-major
    /// with x fastest.
    pub fsr_of_cell: Vec<usize>,
    /// Plane-local pin index (ix + npin_x·iy) of each fine cell.
    pub pin_of_cell: Vec<usize>,
    /// For each x-cut: the pin x-surface index it coincides with.
    pub xcut_pin_surf: Vec<Option<usize>>,
    /// For each y-cut: the pin y-surface index it coincides with.
    pub ycut_pin_surf: Vec<Option<usize>>,
    /// Pin row of each fine row.
    pub pin_row_of_fine: Vec<usize>,
    /// Pin column of each fine column.
    pub pin_col_of_fine: Vec<usize>,
    /// Plane-local flat-source region areas.
    pub areas: Vec<f64>,
    /// Number of flat-source regions in the plane.
    pub n_reg: usize,
}

impl PlaneGeometry {
    pub fn fine_nx(&self) -> usize {
        self.xcuts.len() - 1
    }

    pub fn fine_ny(&self) -> usize {
        self.ycuts.len() - 1
    }

    pub fn cell(&self, cx: usize, cy: usize) -> usize {
        cy * self.fine_nx() + cx
    }
}

/// The assembled core geometry.
#[derive(Debug)]
pub struct CoreMesh {
    pin_meshes: BTreeMap<u32, PinMesh>,
    pins: BTreeMap<u32, Pin>,
    #[allow(dead_code)]
    lattices: BTreeMap<u32, Lattice>,
    #[allow(dead_code)]
    assemblies: BTreeMap<u32, Assembly>,
    #[allow(dead_code)]
    core: Core,
    mat_lib: MaterialLib,

    nx: usize,
    ny: usize,
    nz: usize,
    hx: f64,
    hy: f64,
    coarse: CoarseMesh,

    pin_ids_lex: Vec<u32>,
    first_reg: Vec<usize>,
    n_reg: usize,
    volumes: Vec<f64>,

    plane_class: Vec<usize>,
    plane_first_reg: Vec<usize>,
    plane_geoms: Vec<PlaneGeometry>,
}

impl CoreMesh {
    pub fn from_config(cfg: &ProblemConfig) -> TransportResult<Self> {
        let mut pin_meshes = BTreeMap::new();
        for mesh_cfg in &cfg.pin_meshes {
            let pm = PinMesh::from_config(mesh_cfg)?;
            if pin_meshes.insert(pm.id(), pm).is_some() {
                return Err(TransportError::Config(format!(
                    "Duplicate pin mesh ID {}.",
                    mesh_cfg.id
                )));
            }
        }

        let mat_lib = MaterialLib::from_configs(&cfg.materials)?;

        let mut pins = BTreeMap::new();
        for pin_cfg in &cfg.pins {
            let pin = Pin::from_config(pin_cfg, &pin_meshes)?;
            for &mat_id in pin.mat_ids() {
                mat_lib.get_by_id(mat_id)?;
            }
            if pins.insert(pin.id(), pin).is_some() {
                return Err(TransportError::Config(format!(
                    "Duplicate pin ID {}.",
                    pin_cfg.id
                )));
            }
        }

        let mut lattices = BTreeMap::new();
        for lat_cfg in &cfg.lattices {
            let lat = Lattice::from_config(lat_cfg, &pins, &pin_meshes)?;
            if lattices.insert(lat.id(), lat).is_some() {
                return Err(TransportError::Config(format!(
                    "Duplicate lattice ID {}.",
                    lat_cfg.id
                )));
            }
        }

        let mut assemblies = BTreeMap::new();
        for asy_cfg in &cfg.assemblies {
            let asy = Assembly::from_config(asy_cfg, &lattices)?;
            if assemblies.insert(asy.id(), asy).is_some() {
                return Err(TransportError::Config(format!(
                    "Duplicate assembly ID {}.",
                    asy_cfg.id
                )));
            }
        }

        let core = Core::from_config(&cfg.core, &assemblies)?;

        // Assemblies must tile: column widths and row heights consistent
        for ix in 0..core.nx() {
            let a0 = &assemblies[&core.at(ix, 0)];
            for iy in 1..core.ny() {
                let a = &assemblies[&core.at(ix, iy)];
                if a.nx() != a0.nx() || (a.hx() - a0.hx()).abs() > 1e-12 {
                    return Err(TransportError::Geometry(
                        "Assemblies do not tile the core along x.".into(),
                    ));
                }
            }
        }
        for iy in 0..core.ny() {
            let a0 = &assemblies[&core.at(0, iy)];
            for ix in 1..core.nx() {
                let a = &assemblies[&core.at(ix, iy)];
                if a.ny() != a0.ny() || (a.hy() - a0.hy()).abs() > 1e-12 {
                    return Err(TransportError::Geometry(
                        "Assemblies do not tile the core along y.".into(),
                    ));
                }
            }
        }

        let nx = core.npin_x();
        let ny = core.npin_y();
        let first_asy = &assemblies[&core.at(0, 0)];
        let nz = first_asy.nz();
        let dz = first_asy.hz().to_vec();

        // Pin-column widths and pin-row heights
        let mut dx = Vec::with_capacity(nx);
        for ax in 0..core.nx() {
            let asy = &assemblies[&core.at(ax, 0)];
            let pitch = asy.hx() / asy.nx() as f64;
            dx.extend(std::iter::repeat(pitch).take(asy.nx()));
        }
        let mut dy = Vec::with_capacity(ny);
        for ay in 0..core.ny() {
            let asy = &assemblies[&core.at(0, ay)];
            let pitch = asy.hy() / asy.ny() as f64;
            dy.extend(std::iter::repeat(pitch).take(asy.ny()));
        }
        let hx: f64 = dx.iter().sum();
        let hy: f64 = dy.iter().sum();

        let boundary = [
            cfg.core.boundary.west,
            cfg.core.boundary.east,
            cfg.core.boundary.south,
            cfg.core.boundary.north,
            cfg.core.boundary.bottom,
            cfg.core.boundary.top,
        ];
        let coarse = CoarseMesh::new(dx, dy, dz, boundary);

        // Resolve every pin in lexicographic order
        let resolver = PinResolver::new(&core, &assemblies);
        let n_pin = nx * ny * nz;
        let mut pin_ids_lex = Vec::with_capacity(n_pin);
        let mut first_reg = Vec::with_capacity(n_pin + 1);
        let mut volumes = Vec::new();
        let mut plane_first_reg = Vec::with_capacity(nz);
        let mut n_reg = 0;
        for iz in 0..nz {
            plane_first_reg.push(n_reg);
            for iy in 0..ny {
                for ix in 0..nx {
                    let pin_id = resolver.pin_at(&core, &assemblies, &lattices, ix, iy, iz);
                    let mesh = &pin_meshes[&pins[&pin_id].mesh_id()];
                    pin_ids_lex.push(pin_id);
                    first_reg.push(n_reg);
                    n_reg += mesh.n_reg();
                    let hz_plane = coarse.dz()[iz];
                    volumes.extend(mesh.areas().iter().map(|a| a * hz_plane));
                }
            }
        }
        first_reg.push(n_reg);

        // Group geometrically identical planes
        let mut class_keys: Vec<Vec<u32>> = Vec::new();
        let mut plane_class = Vec::with_capacity(nz);
        for iz in 0..nz {
            let key: Vec<u32> = (0..core.nx() * core.ny())
                .map(|k| {
                    let (ax, ay) = (k % core.nx(), k / core.nx());
                    assemblies[&core.at(ax, ay)].lattice_id(iz)
                })
                .collect();
            let class = match class_keys.iter().position(|k| *k == key) {
                Some(c) => c,
                None => {
                    class_keys.push(key);
                    class_keys.len() - 1
                }
            };
            plane_class.push(class);
        }

        // Representative fine grid per unique plane
        let mut plane_geoms = Vec::with_capacity(class_keys.len());
        for class in 0..class_keys.len() {
            let iz = plane_class.iter().position(|&c| c == class).unwrap();
            let plane_pins: Vec<u32> = (0..nx * ny)
                .map(|k| pin_ids_lex[iz * nx * ny + k])
                .collect();
            plane_geoms.push(build_plane_geometry(
                &plane_pins,
                &pins,
                &pin_meshes,
                &coarse,
            ));
        }

        log::info!(
            "Core mesh: {} x {} x {} pins, {} fine regions, {} unique planes",
            nx,
            ny,
            nz,
            n_reg,
            plane_geoms.len()
        );

        Ok(CoreMesh {
            pin_meshes,
            pins,
            lattices,
            assemblies,
            core,
            mat_lib,
            nx,
            ny,
            nz,
            hx,
            hy,
            coarse,
            pin_ids_lex,
            first_reg,
            n_reg,
            volumes,
            plane_class,
            plane_first_reg,
            plane_geoms,
        })
    }

    pub fn nx(&self) -> usize {
        self.nx
    }

    pub fn ny(&self) -> usize {
        self.ny
    }

    pub fn nz(&self) -> usize {
        self.nz
    }

    pub fn hx(&self) -> f64 {
        self.hx
    }

    pub fn hy(&self) -> f64 {
        self.hy
    }

    pub fn n_pin(&self) -> usize {
        self.pin_ids_lex.len()
    }

    /// Total fine-region count.
    pub fn n_reg(&self) -> usize {
        self.n_reg
    }

    pub fn n_group(&self) -> usize {
        self.mat_lib.n_group()
    }

    pub fn mat_lib(&self) -> &MaterialLib {
        &self.mat_lib
    }

    pub fn coarse(&self) -> &CoarseMesh {
        &self.coarse
    }

    pub fn boundary(&self, surface: Surface) -> BoundaryCondition {
        self.coarse.boundary(surface)
    }

    pub fn index_lex(&self, pos: Position) -> usize {
        self.coarse.index(pos)
    }

    pub fn pin_position(&self, ipin: usize) -> Position {
        self.coarse.position(ipin)
    }

    /// Pin and its mesh at lexicographic index `ipin`.
    pub fn pin(&self, ipin: usize) -> (&Pin, &PinMesh) {
        let pin = &self.pins[&self.pin_ids_lex[ipin]];
        (pin, &self.pin_meshes[&pin.mesh_id()])
    }

    /// Iterate pins in lexicographic (ix, iy, iz) order.
    pub fn pins_lex(&self) -> impl Iterator<Item = (usize, &Pin, &PinMesh)> {
        self.pin_ids_lex.iter().enumerate().map(move |(i, id)| {
            let pin = &self.pins[id];
            (i, pin, &self.pin_meshes[&pin.mesh_id()])
        })
    }

    /// First fine-region index of pin `ipin`.
    pub fn first_reg(&self, ipin: usize) -> usize {
        self.first_reg[ipin]
    }

    /// Coarse (pin) cell volume.
    pub fn coarse_volume(&self, ipin: usize) -> f64 {
        self.coarse.volumes()[ipin]
    }

    /// Fine-region volumes, in region order.
    pub fn volumes(&self) -> &[f64] {
        &self.volumes
    }

    pub fn n_plane_classes(&self) -> usize {
        self.plane_geoms.len()
    }

    pub fn plane_class(&self, iz: usize) -> usize {
        self.plane_class[iz]
    }

    pub fn plane_geometry(&self, class: usize) -> &PlaneGeometry {
        &self.plane_geoms[class]
    }

    /// Global fine-region offset of plane `iz`.
    pub fn plane_first_reg(&self, iz: usize) -> usize {
        self.plane_first_reg[iz]
    }

    /// Fine regions in plane `iz`.
    pub fn plane_n_reg(&self, iz: usize) -> usize {
        let end = if iz + 1 < self.nz {
            self.plane_first_reg[iz + 1]
        } else {
            self.n_reg
        };
        end - self.plane_first_reg[iz]
    }
}

/// Maps global pin coordinates to assembly-local lattice positions.
struct PinResolver {
    asy_col: Vec<(usize, usize)>,
    asy_row: Vec<(usize, usize)>,
}

impl PinResolver {
    fn new(core: &Core, assemblies: &BTreeMap<u32, Assembly>) -> Self {
        let mut asy_col = Vec::new();
        for ax in 0..core.nx() {
            let n = assemblies[&core.at(ax, 0)].nx();
            for lx in 0..n {
                asy_col.push((ax, lx));
            }
        }
        let mut asy_row = Vec::new();
        for ay in 0..core.ny() {
            let n = assemblies[&core.at(0, ay)].ny();
            for ly in 0..n {
                asy_row.push((ay, ly));
            }
        }
        PinResolver { asy_col, asy_row }
    }

    fn pin_at(
        &self,
        core: &Core,
        assemblies: &BTreeMap<u32, Assembly>,
        lattices: &BTreeMap<u32, Lattice>,
        ix: usize,
        iy: usize,
        iz: usize,
    ) -> u32 {
        let (ax, lx) = self.asy_col[ix];
        let (ay, ly) = self.asy_row[iy];
        let lat_id = assemblies[&core.at(ax, ay)].lattice_id(iz);
        lattices[&lat_id].pin_at(lx, ly)
    }
}

/// Merge a cut position into an ascending list within tolerance.
fn insert_cut(cuts: &mut Vec<f64>, x: f64) {
    match cuts.binary_search_by(|c| c.partial_cmp(&x).unwrap()) {
        Ok(_) => {}
        Err(pos) => {
            let near_prev = pos > 0 && (x - cuts[pos - 1]).abs() < CUT_TOL;
            let near_next = pos < cuts.len() && (cuts[pos] - x).abs() < CUT_TOL;
            if !near_prev && !near_next {
                cuts.insert(pos, x);
            }
        }
    }
}

fn build_plane_geometry(
    plane_pins: &[u32],
    pins: &BTreeMap<u32, Pin>,
    pin_meshes: &BTreeMap<u32, PinMesh>,
    coarse: &CoarseMesh,
) -> PlaneGeometry {
    let (nx, ny) = (coarse.nx(), coarse.ny());
    let mesh_of = |ix: usize, iy: usize| -> &PinMesh {
        let pin = &pins[&plane_pins[iy * nx + ix]];
        &pin_meshes[&pin.mesh_id()]
    };

    // Pin boundary positions
    let mut pin_x = vec![0.0];
    for ix in 0..nx {
        pin_x.push(pin_x[ix] + coarse.dx()[ix]);
    }
    let mut pin_y = vec![0.0];
    for iy in 0..ny {
        pin_y.push(pin_y[iy] + coarse.dy()[iy]);
    }

    // Union of fine cuts over all pins sharing a column / a row
    let mut xcuts: Vec<f64> = pin_x.clone();
    for ix in 0..nx {
        for iy in 0..ny {
            let mesh = mesh_of(ix, iy);
            let step = coarse.dx()[ix] / mesh.fine_nx() as f64;
            for k in 1..mesh.fine_nx() {
                insert_cut(&mut xcuts, pin_x[ix] + step * k as f64);
            }
        }
    }
    let mut ycuts: Vec<f64> = pin_y.clone();
    for iy in 0..ny {
        for ix in 0..nx {
            let mesh = mesh_of(ix, iy);
            let step = coarse.dy()[iy] / mesh.fine_ny() as f64;
            for k in 1..mesh.fine_ny() {
                insert_cut(&mut ycuts, pin_y[iy] + step * k as f64);
            }
        }
    }

    let xcut_pin_surf: Vec<Option<usize>> = xcuts
        .iter()
        .map(|&x| {
            pin_x
                .iter()
                .position(|&p| (p - x).abs() < CUT_TOL)
        })
        .collect();
    let ycut_pin_surf: Vec<Option<usize>> = ycuts
        .iter()
        .map(|&y| {
            pin_y
                .iter()
                .position(|&p| (p - y).abs() < CUT_TOL)
        })
        .collect();

    let fine_nx = xcuts.len() - 1;
    let fine_ny = ycuts.len() - 1;

    let locate = |cuts: &[f64], v: f64| -> usize {
        // Last boundary not greater than v, clamped to a valid cell
        match cuts.binary_search_by(|c| c.partial_cmp(&v).unwrap()) {
            Ok(i) => i.min(cuts.len() - 2),
            Err(i) => (i - 1).min(cuts.len() - 2),
        }
    };

    let pin_col_of_fine: Vec<usize> = (0..fine_nx)
        .map(|cx| locate(&pin_x, 0.5 * (xcuts[cx] + xcuts[cx + 1])))
        .collect();
    let pin_row_of_fine: Vec<usize> = (0..fine_ny)
        .map(|cy| locate(&pin_y, 0.5 * (ycuts[cy] + ycuts[cy + 1])))
        .collect();

    // Plane-local region offsets per pin, lex order within the plane
    let mut pin_first = Vec::with_capacity(nx * ny);
    let mut n_reg = 0;
    let mut areas = Vec::new();
    for iy in 0..ny {
        for ix in 0..nx {
            let mesh = mesh_of(ix, iy);
            pin_first.push(n_reg);
            n_reg += mesh.n_reg();
            areas.extend_from_slice(mesh.areas());
        }
    }

    let mut fsr_of_cell = Vec::with_capacity(fine_nx * fine_ny);
    let mut pin_of_cell = Vec::with_capacity(fine_nx * fine_ny);
    for cy in 0..fine_ny {
        let iy = pin_row_of_fine[cy];
        let ymid = 0.5 * (ycuts[cy] + ycuts[cy + 1]);
        for cx in 0..fine_nx {
            let ix = pin_col_of_fine[cx];
            let xmid = 0.5 * (xcuts[cx] + xcuts[cx + 1]);
            let mesh = mesh_of(ix, iy);
            let fx = ((xmid - pin_x[ix]) / (coarse.dx()[ix] / mesh.fine_nx() as f64)) as usize;
            let fy = ((ymid - pin_y[iy]) / (coarse.dy()[iy] / mesh.fine_ny() as f64)) as usize;
            let fx = fx.min(mesh.fine_nx() - 1);
            let fy = fy.min(mesh.fine_ny() - 1);
            let ipin = iy * nx + ix;
            pin_of_cell.push(ipin);
            fsr_of_cell.push(pin_first[ipin] + mesh.region_at(fx, fy));
        }
    }

    PlaneGeometry {
        xcuts,
        ycuts,
        fsr_of_cell,
        pin_of_cell,
        xcut_pin_surf,
        ycut_pin_surf,
        pin_row_of_fine,
        pin_col_of_fine,
        areas,
        n_reg,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use neutron_types::config::ProblemConfig;

    fn two_by_two() -> CoreMesh {
        let doc = r#"{
            "mesh": [{"id": 1, "pitch_x": 1.0, "pitch_y": 1.0, "sub_x": 2, "sub_y": 2}],
            "materials": [
                {"id": 1, "name": "a", "xsab": [1.0], "scattering": [[0.0]]},
                {"id": 2, "name": "b", "xsab": [2.0], "scattering": [[0.0]]}
            ],
            "pins": [
                {"id": 1, "mesh": 1, "materials": [1, 1, 1, 1]},
                {"id": 2, "mesh": 1, "materials": [2, 2, 2, 2]}
            ],
            "lattices": [{"id": 1, "nx": 2, "ny": 2, "pins": [1, 2, 2, 1]}],
            "assemblies": [{"id": 1, "np": 2, "hz": 1.0, "lattices": [1, 1]}],
            "core": {"nx": 1, "ny": 1, "assemblies": [1]},
            "sweeper": {"type": "sn", "n_inner": 1},
            "solver": {"type": "eigenvalue"}
        }"#;
        let cfg = ProblemConfig::from_str(doc).unwrap();
        CoreMesh::from_config(&cfg).unwrap()
    }

    #[test]
    fn test_dimensions_and_counts() {
        let mesh = two_by_two();
        assert_eq!((mesh.nx(), mesh.ny(), mesh.nz()), (2, 2, 2));
        assert_eq!(mesh.n_pin(), 8);
        assert_eq!(mesh.n_reg(), 8 * 4);
        assert_eq!(mesh.volumes().len(), mesh.n_reg());
    }

    #[test]
    fn test_lex_iteration_matches_positions() {
        let mesh = two_by_two();
        for (i, _, _) in mesh.pins_lex() {
            assert_eq!(mesh.index_lex(mesh.pin_position(i)), i);
        }
    }

    #[test]
    fn test_pin_arrangement_lower_left() {
        let mesh = two_by_two();
        // Lattice input rows: top [1, 2], bottom [2, 1]
        let (pin_ll, _) = mesh.pin(mesh.index_lex(Position::new(0, 0, 0)));
        let (pin_lr, _) = mesh.pin(mesh.index_lex(Position::new(1, 0, 0)));
        let (pin_ul, _) = mesh.pin(mesh.index_lex(Position::new(0, 1, 0)));
        assert_eq!(pin_ll.id(), 2);
        assert_eq!(pin_lr.id(), 1);
        assert_eq!(pin_ul.id(), 1);
    }

    #[test]
    fn test_volumes_sum_to_core_volume() {
        let mesh = two_by_two();
        let total: f64 = mesh.volumes().iter().sum();
        assert!((total - 2.0 * 2.0 * 2.0).abs() < 1e-12);
        let coarse_total: f64 = (0..mesh.n_pin()).map(|i| mesh.coarse_volume(i)).sum();
        assert!((total - coarse_total).abs() < 1e-12);
    }

    #[test]
    fn test_plane_geometry_grid() {
        let mesh = two_by_two();
        assert_eq!(mesh.n_plane_classes(), 1);
        let pg = mesh.plane_geometry(0);
        assert_eq!(pg.fine_nx(), 4);
        assert_eq!(pg.fine_ny(), 4);
        assert_eq!(pg.n_reg, 16);
        // Pin boundaries sit at cuts 0, 2, 4
        assert_eq!(pg.xcut_pin_surf[0], Some(0));
        assert_eq!(pg.xcut_pin_surf[2], Some(1));
        assert_eq!(pg.xcut_pin_surf[4], Some(2));
        assert_eq!(pg.xcut_pin_surf[1], None);
        let area_total: f64 = pg.areas.iter().sum();
        assert!((area_total - 4.0).abs() < 1e-12);
    }

    #[test]
    fn test_plane_first_reg() {
        let mesh = two_by_two();
        assert_eq!(mesh.plane_first_reg(0), 0);
        assert_eq!(mesh.plane_first_reg(1), 16);
        assert_eq!(mesh.plane_n_reg(1), 16);
    }
}
