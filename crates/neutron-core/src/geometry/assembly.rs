// ─────────────────────────────────────────────────────────────────────
// SCPN Neutron Core — Assembly
// © 1998–2026 Miroslav Šotek. All rights reserved.
// Contact: www.anulum.li | protoscience@anulum.li
// ORCID: https://orcid.org/0009-0009-3560-0851
// License: GNU AGPL v3 | Commercial licensing available
// ─────────────────────────────────────────────────────────────────────
//! An axial stack of lattices with per-plane heights.

use std::collections::BTreeMap;

use neutron_types::config::AssemblyConfig;
use neutron_types::error::{TransportError, TransportResult};

use super::lattice::Lattice;

/// Lattice stack; entry 0 is the bottom plane. All lattices in an
/// assembly share (hx, hy) and pin grid dimensions.
#[derive(Debug, Clone)]
pub struct Assembly {
    id: u32,
    nz: usize,
    hz: Vec<f64>,
    hx: f64,
    hy: f64,
    nx: usize,
    ny: usize,
    lattice_ids: Vec<u32>,
    n_reg: usize,
    n_xsreg: usize,
}

impl Assembly {
    pub fn from_config(
        cfg: &AssemblyConfig,
        lattices: &BTreeMap<u32, Lattice>,
    ) -> TransportResult<Self> {
        if cfg.np == 0 {
            return Err(TransportError::Config(format!(
                "Invalid number of planes (np) when parsing assembly {}.",
                cfg.id
            )));
        }

        let hz = match (&cfg.hz, &cfg.hz_list) {
            (Some(_), Some(_)) => {
                return Err(TransportError::Config(
                    "Plane heights are over-specified for assembly.".into(),
                ));
            }
            (Some(h), None) => {
                if *h <= 0.0 {
                    return Err(TransportError::Config(format!(
                        "Invalid plane height for assembly {}.",
                        cfg.id
                    )));
                }
                vec![*h; cfg.np]
            }
            (None, Some(list)) => {
                if list.len() != cfg.np {
                    return Err(TransportError::Config(format!(
                        "Incorrect number of plane heights specified for assembly {}.",
                        cfg.id
                    )));
                }
                if list.iter().any(|h| *h <= 0.0) {
                    return Err(TransportError::Config(format!(
                        "Invalid plane height for assembly {}.",
                        cfg.id
                    )));
                }
                list.clone()
            }
            (None, None) => {
                return Err(TransportError::Config(format!(
                    "No plane heights specified for assembly {}.",
                    cfg.id
                )));
            }
        };

        if cfg.lattices.len() != cfg.np {
            return Err(TransportError::Config(format!(
                "Incorrect number of lattices specified for assembly {}.",
                cfg.id
            )));
        }

        let mut n_reg = 0;
        let mut n_xsreg = 0;
        let mut dims: Option<(f64, f64, usize, usize)> = None;
        for &lat_id in &cfg.lattices {
            let lat = lattices.get(&lat_id).ok_or_else(|| {
                TransportError::Config(format!(
                    "Unrecognized lattice ID {lat_id} in assembly {}.",
                    cfg.id
                ))
            })?;
            match dims {
                None => dims = Some((lat.hx(), lat.hy(), lat.nx(), lat.ny())),
                Some((hx, hy, nx, ny)) => {
                    if (lat.hx() - hx).abs() > 1e-12
                        || (lat.hy() - hy).abs() > 1e-12
                        || lat.nx() != nx
                        || lat.ny() != ny
                    {
                        return Err(TransportError::Config(format!(
                            "Lattices in assembly {} have incompatible dimensions.",
                            cfg.id
                        )));
                    }
                }
            }
            n_reg += lat.n_reg();
            n_xsreg += lat.n_xsreg();
        }

        let (hx, hy, nx, ny) = dims.unwrap();
        Ok(Assembly {
            id: cfg.id,
            nz: cfg.np,
            hz,
            hx,
            hy,
            nx,
            ny,
            lattice_ids: cfg.lattices.clone(),
            n_reg,
            n_xsreg,
        })
    }

    pub fn id(&self) -> u32 {
        self.id
    }

    pub fn nz(&self) -> usize {
        self.nz
    }

    pub fn hz(&self) -> &[f64] {
        &self.hz
    }

    pub fn hx(&self) -> f64 {
        self.hx
    }

    pub fn hy(&self) -> f64 {
        self.hy
    }

    pub fn nx(&self) -> usize {
        self.nx
    }

    pub fn ny(&self) -> usize {
        self.ny
    }

    pub fn n_reg(&self) -> usize {
        self.n_reg
    }

    pub fn n_xsreg(&self) -> usize {
        self.n_xsreg
    }

    /// Lattice ID of plane `iz`, counted from the bottom.
    pub fn lattice_id(&self, iz: usize) -> u32 {
        self.lattice_ids[iz]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use neutron_types::config::{LatticeConfig, PinConfig, PinMeshConfig};
    use crate::geometry::pin::Pin;
    use crate::geometry::pin_mesh::PinMesh;

    fn lattices() -> BTreeMap<u32, Lattice> {
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
        let pin_cfg = PinConfig {
            id: 1,
            mesh: 1,
            materials: vec![1],
        };
        let mut pins = BTreeMap::new();
        pins.insert(1, Pin::from_config(&pin_cfg, &meshes).unwrap());
        let lat_cfg = LatticeConfig {
            id: 1,
            nx: 1,
            ny: 1,
            pins: vec![1],
        };
        let mut lats = BTreeMap::new();
        lats.insert(1, Lattice::from_config(&lat_cfg, &pins, &meshes).unwrap());
        lats
    }

    fn base_config() -> AssemblyConfig {
        AssemblyConfig {
            id: 1,
            np: 2,
            hz: Some(1.5),
            hz_list: None,
            lattices: vec![1, 1],
        }
    }

    #[test]
    fn test_scalar_hz_fills_planes() {
        let asy = Assembly::from_config(&base_config(), &lattices()).unwrap();
        assert_eq!(asy.nz(), 2);
        assert_eq!(asy.hz(), &[1.5, 1.5]);
    }

    #[test]
    fn test_overspecified_hz_rejected() {
        let mut cfg = base_config();
        cfg.hz_list = Some(vec![1.5, 1.5]);
        let err = Assembly::from_config(&cfg, &lattices()).unwrap_err();
        assert!(err.to_string().contains("over-specified"));
    }

    #[test]
    fn test_missing_hz_rejected() {
        let mut cfg = base_config();
        cfg.hz = None;
        assert!(Assembly::from_config(&cfg, &lattices()).is_err());
    }

    #[test]
    fn test_hz_list_length_checked() {
        let mut cfg = base_config();
        cfg.hz = None;
        cfg.hz_list = Some(vec![1.0]);
        assert!(Assembly::from_config(&cfg, &lattices()).is_err());
    }

    #[test]
    fn test_unknown_lattice_rejected() {
        let mut cfg = base_config();
        cfg.lattices = vec![1, 9];
        let err = Assembly::from_config(&cfg, &lattices()).unwrap_err();
        assert!(err.to_string().contains("Unrecognized lattice ID"));
    }
}
