// ─────────────────────────────────────────────────────────────────────
// SCPN Neutron Core — Mesh
// © 1998–2026 Miroslav Šotek. All rights reserved.
// Contact: www.anulum.li | protoscience@anulum.li
// ORCID: https://orcid.org/0009-0009-3560-0851
// License: GNU AGPL v3 | Commercial licensing available
// ─────────────────────────────────────────────────────────────────────
//! Coarse (pin-wise) orthogonal mesh and the canonical lexicographic
//! indexing used by every pin-resolved array in the solver.

use neutron_types::config::BoundaryCondition;

/// Face normals of the orthogonal mesh.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Normal {
    X,
    Y,
    Z,
}

/// The six bounding surfaces of a cell or of the domain.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Surface {
    West,
    East,
    South,
    North,
    Bottom,
    Top,
}

impl Surface {
    /// Index into a per-face array ordered W, E, S, N, B, T.
    pub fn index(self) -> usize {
        match self {
            Surface::West => 0,
            Surface::East => 1,
            Surface::South => 2,
            Surface::North => 3,
            Surface::Bottom => 4,
            Surface::Top => 5,
        }
    }
}

/// Cell coordinates on the coarse mesh.
///
/// The canonical linear index is lexicographic with x fastest:
/// `i = ix + nx·(iy + ny·iz)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Position {
    pub ix: usize,
    pub iy: usize,
    pub iz: usize,
}

impl Position {
    pub fn new(ix: usize, iy: usize, iz: usize) -> Self {
        Position { ix, iy, iz }
    }
}

/// Pin-wise orthogonal mesh: cell widths, volumes, cell and surface
/// indexing, and the domain boundary conditions.
///
/// Surfaces are indexed per normal family; the x-family has `nx+1`
/// planes of `ny·nz` faces each, and likewise for y and z.
#[derive(Debug, Clone)]
pub struct CoarseMesh {
    nx: usize,
    ny: usize,
    nz: usize,
    dx: Vec<f64>,
    dy: Vec<f64>,
    dz: Vec<f64>,
    vol: Vec<f64>,
    boundary: [BoundaryCondition; 6],
}

impl CoarseMesh {
    pub fn new(
        dx: Vec<f64>,
        dy: Vec<f64>,
        dz: Vec<f64>,
        boundary: [BoundaryCondition; 6],
    ) -> Self {
        let (nx, ny, nz) = (dx.len(), dy.len(), dz.len());
        let mut vol = Vec::with_capacity(nx * ny * nz);
        for iz in 0..nz {
            for iy in 0..ny {
                for ix in 0..nx {
                    vol.push(dx[ix] * dy[iy] * dz[iz]);
                }
            }
        }
        CoarseMesh {
            nx,
            ny,
            nz,
            dx,
            dy,
            dz,
            vol,
            boundary,
        }
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

    pub fn n_cell(&self) -> usize {
        self.nx * self.ny * self.nz
    }

    pub fn dx(&self) -> &[f64] {
        &self.dx
    }

    pub fn dy(&self) -> &[f64] {
        &self.dy
    }

    pub fn dz(&self) -> &[f64] {
        &self.dz
    }

    /// Cell volumes in lexicographic order.
    pub fn volumes(&self) -> &[f64] {
        &self.vol
    }

    pub fn boundary(&self, surface: Surface) -> BoundaryCondition {
        self.boundary[surface.index()]
    }

    pub fn index(&self, pos: Position) -> usize {
        debug_assert!(pos.ix < self.nx && pos.iy < self.ny && pos.iz < self.nz);
        pos.ix + self.nx * (pos.iy + self.ny * pos.iz)
    }

    pub fn position(&self, i: usize) -> Position {
        Position {
            ix: i % self.nx,
            iy: (i / self.nx) % self.ny,
            iz: i / (self.nx * self.ny),
        }
    }

    pub fn n_surf_x(&self) -> usize {
        (self.nx + 1) * self.ny * self.nz
    }

    pub fn n_surf_y(&self) -> usize {
        self.nx * (self.ny + 1) * self.nz
    }

    pub fn n_surf_z(&self) -> usize {
        self.nx * self.ny * (self.nz + 1)
    }

    /// x-normal surface `isx ∈ [0, nx]` of the cell column (iy, iz).
    pub fn surf_x(&self, isx: usize, iy: usize, iz: usize) -> usize {
        debug_assert!(isx <= self.nx && iy < self.ny && iz < self.nz);
        isx + (self.nx + 1) * (iy + self.ny * iz)
    }

    /// y-normal surface `isy ∈ [0, ny]` of the cell column (ix, iz).
    pub fn surf_y(&self, ix: usize, isy: usize, iz: usize) -> usize {
        debug_assert!(ix < self.nx && isy <= self.ny && iz < self.nz);
        ix + self.nx * (isy + (self.ny + 1) * iz)
    }

    /// z-normal surface `isz ∈ [0, nz]` of the cell column (ix, iy).
    pub fn surf_z(&self, ix: usize, iy: usize, isz: usize) -> usize {
        debug_assert!(ix < self.nx && iy < self.ny && isz <= self.nz);
        ix + self.nx * (iy + self.ny * isz)
    }
}
