// ─────────────────────────────────────────────────────────────────────
// SCPN Neutron Core — Lattice
// © 1998–2026 Miroslav Šotek. All rights reserved.
// Contact: www.anulum.li | protoscience@anulum.li
// ORCID: https://orcid.org/0009-0009-3560-0851
// License: GNU AGPL v3 | Commercial licensing available
// ─────────────────────────────────────────────────────────────────────
//! A 2-D grid of pins.

use std::collections::BTreeMap;

use neutron_types::config::LatticeConfig;
use neutron_types::error::{TransportError, TransportResult};

use super::pin::Pin;
use super::pin_mesh::PinMesh;

/// Pin grid with lower-left origin. The input lists rows top-down, so
/// rows are flipped once on construction.
#[derive(Debug, Clone)]
pub struct Lattice {
    id: u32,
    nx: usize,
    ny: usize,
    hx: f64,
    hy: f64,
    pitch_x: f64,
    pitch_y: f64,
    pins: Vec<u32>,
    n_reg: usize,
    n_xsreg: usize,
}

impl Lattice {
    pub fn from_config(
        cfg: &LatticeConfig,
        pins: &BTreeMap<u32, Pin>,
        pin_meshes: &BTreeMap<u32, PinMesh>,
    ) -> TransportResult<Self> {
        if cfg.nx == 0 || cfg.ny == 0 {
            return Err(TransportError::Config(format!(
                "Invalid lattice dimensions for lattice {}.",
                cfg.id
            )));
        }
        if cfg.pins.len() != cfg.nx * cfg.ny {
            return Err(TransportError::Config(format!(
                "Incorrect number of pins specified for lattice {} ({} given, {} expected).",
                cfg.id,
                cfg.pins.len(),
                cfg.nx * cfg.ny
            )));
        }

        // Flip the row order to a lower-left origin
        let mut grid = vec![0u32; cfg.nx * cfg.ny];
        for iy in 0..cfg.ny {
            let src_row = cfg.ny - iy - 1;
            let src = &cfg.pins[src_row * cfg.nx..(src_row + 1) * cfg.nx];
            grid[iy * cfg.nx..(iy + 1) * cfg.nx].copy_from_slice(src);
        }

        let mut pitch: Option<(f64, f64)> = None;
        let mut n_reg = 0;
        let mut n_xsreg = 0;
        for &pin_id in &grid {
            let pin = pins.get(&pin_id).ok_or_else(|| {
                TransportError::Config(format!(
                    "Unrecognized pin ID {pin_id} in lattice {}.",
                    cfg.id
                ))
            })?;
            let mesh = &pin_meshes[&pin.mesh_id()];
            match pitch {
                None => pitch = Some((mesh.pitch_x(), mesh.pitch_y())),
                Some((px, py)) => {
                    if (mesh.pitch_x() - px).abs() > 1e-12 || (mesh.pitch_y() - py).abs() > 1e-12 {
                        return Err(TransportError::Config(format!(
                            "Pins in lattice {} have inconsistent pitches.",
                            cfg.id
                        )));
                    }
                }
            }
            n_reg += mesh.n_reg();
            n_xsreg += pin.n_xsreg();
        }

        let (pitch_x, pitch_y) = pitch.unwrap();
        Ok(Lattice {
            id: cfg.id,
            nx: cfg.nx,
            ny: cfg.ny,
            hx: pitch_x * cfg.nx as f64,
            hy: pitch_y * cfg.ny as f64,
            pitch_x,
            pitch_y,
            pins: grid,
            n_reg,
            n_xsreg,
        })
    }

    pub fn id(&self) -> u32 {
        self.id
    }

    pub fn nx(&self) -> usize {
        self.nx
    }

    pub fn ny(&self) -> usize {
        self.ny
    }

    pub fn hx(&self) -> f64 {
        self.hx
    }

    pub fn hy(&self) -> f64 {
        self.hy
    }

    pub fn pitch_x(&self) -> f64 {
        self.pitch_x
    }

    pub fn pitch_y(&self) -> f64 {
        self.pitch_y
    }

    pub fn n_reg(&self) -> usize {
        self.n_reg
    }

    pub fn n_xsreg(&self) -> usize {
        self.n_xsreg
    }

    /// Pin ID at lattice position (ix, iy), lower-left origin.
    pub fn pin_at(&self, ix: usize, iy: usize) -> u32 {
        debug_assert!(ix < self.nx && iy < self.ny);
        self.pins[iy * self.nx + ix]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use neutron_types::config::{PinConfig, PinMeshConfig};

    fn fixtures() -> (BTreeMap<u32, PinMesh>, BTreeMap<u32, Pin>) {
        let mesh_cfg = PinMeshConfig {
            id: 1,
            pitch_x: 1.0,
            pitch_y: 1.0,
            sub_x: 1,
            sub_y: 1,
            fsr_split: 1,
        };
        let mut meshes = BTreeMap::new();
        meshes.insert(1, PinMesh::from_config(&mesh_cfg).unwrap());

        let mut pins = BTreeMap::new();
        for id in [1u32, 2, 3, 4] {
            let cfg = PinConfig {
                id,
                mesh: 1,
                materials: vec![1],
            };
            pins.insert(id, Pin::from_config(&cfg, &meshes).unwrap());
        }
        (meshes, pins)
    }

    #[test]
    fn test_row_flip_to_lower_left() {
        let (meshes, pins) = fixtures();
        // Input top row [1, 2], bottom row [3, 4]
        let cfg = LatticeConfig {
            id: 1,
            nx: 2,
            ny: 2,
            pins: vec![1, 2, 3, 4],
        };
        let lat = Lattice::from_config(&cfg, &pins, &meshes).unwrap();
        assert_eq!(lat.pin_at(0, 0), 3);
        assert_eq!(lat.pin_at(1, 0), 4);
        assert_eq!(lat.pin_at(0, 1), 1);
        assert_eq!(lat.pin_at(1, 1), 2);
    }

    #[test]
    fn test_aggregate_counts() {
        let (meshes, pins) = fixtures();
        let cfg = LatticeConfig {
            id: 1,
            nx: 2,
            ny: 2,
            pins: vec![1, 2, 3, 4],
        };
        let lat = Lattice::from_config(&cfg, &pins, &meshes).unwrap();
        assert_eq!(lat.n_reg(), 4);
        assert_eq!(lat.n_xsreg(), 4);
        assert!((lat.hx() - 2.0).abs() < 1e-15);
    }

    #[test]
    fn test_unknown_pin_rejected() {
        let (meshes, pins) = fixtures();
        let cfg = LatticeConfig {
            id: 1,
            nx: 1,
            ny: 1,
            pins: vec![99],
        };
        assert!(Lattice::from_config(&cfg, &pins, &meshes).is_err());
    }
}
