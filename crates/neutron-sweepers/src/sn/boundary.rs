// ─────────────────────────────────────────────────────────────────────
// SCPN Neutron Core — Sn Boundary
// © 1998–2026 Miroslav Šotek. All rights reserved.
// Contact: www.anulum.li | protoscience@anulum.li
// ORCID: https://orcid.org/0009-0009-3560-0851
// License: GNU AGPL v3 | Commercial licensing available
// ─────────────────────────────────────────────────────────────────────
//! Boundary angular-flux state for the Sn sweep.
//!
//! For each group and angle the three domain faces hold the incoming
//! angular flux on that angle's upwind surfaces. Reflective faces pull
//! from the outgoing flux of the reflected angle; vacuum faces stay
//! zero.

use neutron_types::config::BoundaryCondition;

use neutron_core::angular_quadrature::AngularQuadrature;
use neutron_core::mesh::{CoarseMesh, Normal};

/// Face storage: x faces are ny·nz, y faces nx·nz, z faces nx·ny,
/// indexed `[ny·iz + iy]`, `[nx·iz + ix]`, `[nx·iy + ix]`.
#[derive(Debug, Clone)]
pub struct SnBoundary {
    ng: usize,
    n_ang: usize,
    nx: usize,
    ny: usize,
    nz: usize,
    bc: [BoundaryCondition; 6],
    x: Vec<f64>,
    y: Vec<f64>,
    z: Vec<f64>,
}

impl SnBoundary {
    pub fn new(mesh: &CoarseMesh, ng: usize, n_ang: usize) -> Self {
        let (nx, ny, nz) = (mesh.nx(), mesh.ny(), mesh.nz());
        let bc = [
            mesh.boundary(neutron_core::mesh::Surface::West),
            mesh.boundary(neutron_core::mesh::Surface::East),
            mesh.boundary(neutron_core::mesh::Surface::South),
            mesh.boundary(neutron_core::mesh::Surface::North),
            mesh.boundary(neutron_core::mesh::Surface::Bottom),
            mesh.boundary(neutron_core::mesh::Surface::Top),
        ];
        SnBoundary {
            ng,
            n_ang,
            nx,
            ny,
            nz,
            bc,
            x: vec![0.0; ng * n_ang * ny * nz],
            y: vec![0.0; ng * n_ang * nx * nz],
            z: vec![0.0; ng * n_ang * nx * ny],
        }
    }

    pub fn face_len(&self, norm: Normal) -> usize {
        match norm {
            Normal::X => self.ny * self.nz,
            Normal::Y => self.nx * self.nz,
            Normal::Z => self.nx * self.ny,
        }
    }

    fn offset(&self, g: usize, iang: usize, norm: Normal) -> usize {
        debug_assert!(g < self.ng && iang < self.n_ang);
        (g * self.n_ang + iang) * self.face_len(norm)
    }

    fn store(&self, norm: Normal) -> &Vec<f64> {
        match norm {
            Normal::X => &self.x,
            Normal::Y => &self.y,
            Normal::Z => &self.z,
        }
    }

    fn store_mut(&mut self, norm: Normal) -> &mut Vec<f64> {
        match norm {
            Normal::X => &mut self.x,
            Normal::Y => &mut self.y,
            Normal::Z => &mut self.z,
        }
    }

    pub fn face(&self, g: usize, iang: usize, norm: Normal) -> &[f64] {
        let off = self.offset(g, iang, norm);
        let len = self.face_len(norm);
        &self.store(norm)[off..off + len]
    }

    pub fn set_face(&mut self, g: usize, iang: usize, norm: Normal, data: &[f64]) {
        let off = self.offset(g, iang, norm);
        let len = self.face_len(norm);
        debug_assert_eq!(data.len(), len);
        self.store_mut(norm)[off..off + len].copy_from_slice(data);
    }

    /// Jacobi update of group `g`: pull every angle's incoming faces
    /// from the reflected angles' outgoing faces in `bc_out`.
    pub fn update(&mut self, g: usize, bc_out: &SnBoundary, quad: &AngularQuadrature) {
        for iang in 0..self.n_ang {
            for norm in [Normal::X, Normal::Y, Normal::Z] {
                self.update_face(g, iang, norm, bc_out, quad);
            }
        }
    }

    /// Gauss-Seidel update: the angle just swept pushes its outgoing
    /// faces to the angles that receive them, so later angles in the
    /// same group sweep see fresh boundary data.
    pub fn update_angle(
        &mut self,
        g: usize,
        iang_swept: usize,
        bc_out: &SnBoundary,
        quad: &AngularQuadrature,
    ) {
        for norm in [Normal::X, Normal::Y, Normal::Z] {
            let receiver = quad.reflect(iang_swept, norm);
            self.update_face(g, receiver, norm, bc_out, quad);
        }
    }

    fn update_face(
        &mut self,
        g: usize,
        iang: usize,
        norm: Normal,
        bc_out: &SnBoundary,
        quad: &AngularQuadrature,
    ) {
        let surface = quad.angle(iang).upwind_surface(norm);
        match self.bc[surface.index()] {
            BoundaryCondition::Vacuum => {
                let off = self.offset(g, iang, norm);
                let len = self.face_len(norm);
                self.store_mut(norm)[off..off + len].fill(0.0);
            }
            BoundaryCondition::Reflect => {
                let src = quad.reflect(iang, norm);
                let data = bc_out.face(0, src, norm).to_vec();
                self.set_face(g, iang, norm, &data);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use neutron_core::mesh::CoarseMesh;

    fn mesh(bc: BoundaryCondition) -> CoarseMesh {
        CoarseMesh::new(vec![1.0, 1.0], vec![1.0], vec![1.0], [bc; 6])
    }

    #[test]
    fn test_reflective_update_pulls_reflected_angle() {
        let mesh = mesh(BoundaryCondition::Reflect);
        let quad = AngularQuadrature::product(1, 1).unwrap();
        let mut bc_in = SnBoundary::new(&mesh, 1, quad.ndir());
        let mut bc_out = SnBoundary::new(&mesh, 1, quad.ndir());

        // Angle 0 (octant 1) reflects across x into octant 2 (index 1)
        let src = quad.reflect(0, Normal::X);
        bc_out.set_face(0, src, Normal::X, &[3.5]);
        bc_in.update(0, &bc_out, &quad);
        assert_eq!(bc_in.face(0, 0, Normal::X), &[3.5]);
    }

    #[test]
    fn test_vacuum_update_zeroes() {
        let mesh = mesh(BoundaryCondition::Vacuum);
        let quad = AngularQuadrature::product(1, 1).unwrap();
        let mut bc_in = SnBoundary::new(&mesh, 1, quad.ndir());
        let mut bc_out = SnBoundary::new(&mesh, 1, quad.ndir());
        bc_in.set_face(0, 0, Normal::Y, &[1.0, 1.0]);
        for iang in 0..quad.ndir() {
            bc_out.set_face(0, iang, Normal::Y, &[9.0, 9.0]);
        }
        bc_in.update(0, &bc_out, &quad);
        assert_eq!(bc_in.face(0, 0, Normal::Y), &[0.0, 0.0]);
    }

    #[test]
    fn test_gs_push_reaches_receiver() {
        let mesh = mesh(BoundaryCondition::Reflect);
        let quad = AngularQuadrature::product(1, 1).unwrap();
        let mut bc_in = SnBoundary::new(&mesh, 1, quad.ndir());
        let mut bc_out = SnBoundary::new(&mesh, 1, quad.ndir());
        bc_out.set_face(0, 0, Normal::Z, &[2.0, 4.0]);
        bc_in.update_angle(0, 0, &bc_out, &quad);
        let receiver = quad.reflect(0, Normal::Z);
        assert_eq!(bc_in.face(0, receiver, Normal::Z), &[2.0, 4.0]);
    }
}
