// ─────────────────────────────────────────────────────────────────────
// SCPN Neutron Core — Pin
// © 1998–2026 Miroslav Šotek. All rights reserved.
// Contact: www.anulum.li | protoscience@anulum.li
// ORCID: https://orcid.org/0009-0009-3560-0851
// License: GNU AGPL v3 | Commercial licensing available
// ─────────────────────────────────────────────────────────────────────
//! A pin: a pin mesh plus one material per cross-section region.

use std::collections::BTreeMap;

use neutron_types::config::PinConfig;
use neutron_types::error::{TransportError, TransportResult};

use super::pin_mesh::PinMesh;

#[derive(Debug, Clone)]
pub struct Pin {
    id: u32,
    mesh_id: u32,
    mat_ids: Vec<u32>,
}

impl Pin {
    pub fn from_config(
        cfg: &PinConfig,
        pin_meshes: &BTreeMap<u32, PinMesh>,
    ) -> TransportResult<Self> {
        let mesh = pin_meshes.get(&cfg.mesh).ok_or_else(|| {
            TransportError::Config(format!("Invalid pin mesh ID {} in pin {}.", cfg.mesh, cfg.id))
        })?;

        if cfg.materials.len() != mesh.n_xsreg() {
            return Err(TransportError::Config(format!(
                "Wrong number of materials specified in pin definition {} ({} given, {} regions).",
                cfg.id,
                cfg.materials.len(),
                mesh.n_xsreg()
            )));
        }

        Ok(Pin {
            id: cfg.id,
            mesh_id: cfg.mesh,
            mat_ids: cfg.materials.clone(),
        })
    }

    pub fn id(&self) -> u32 {
        self.id
    }

    pub fn mesh_id(&self) -> u32 {
        self.mesh_id
    }

    pub fn mat_ids(&self) -> &[u32] {
        &self.mat_ids
    }

    pub fn n_xsreg(&self) -> usize {
        self.mat_ids.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use neutron_types::config::PinMeshConfig;

    fn meshes() -> BTreeMap<u32, PinMesh> {
        let cfg = PinMeshConfig {
            id: 1,
            pitch_x: 1.0,
            pitch_y: 1.0,
            sub_x: 2,
            sub_y: 1,
            fsr_split: 1,
        };
        let mut m = BTreeMap::new();
        m.insert(1, PinMesh::from_config(&cfg).unwrap());
        m
    }

    #[test]
    fn test_pin_construction() {
        let cfg = PinConfig {
            id: 10,
            mesh: 1,
            materials: vec![3, 4],
        };
        let pin = Pin::from_config(&cfg, &meshes()).unwrap();
        assert_eq!(pin.n_xsreg(), 2);
        assert_eq!(pin.mat_ids(), &[3, 4]);
    }

    #[test]
    fn test_unknown_mesh_rejected() {
        let cfg = PinConfig {
            id: 10,
            mesh: 9,
            materials: vec![3],
        };
        assert!(Pin::from_config(&cfg, &meshes()).is_err());
    }

    #[test]
    fn test_material_count_mismatch_rejected() {
        let cfg = PinConfig {
            id: 10,
            mesh: 1,
            materials: vec![3],
        };
        assert!(Pin::from_config(&cfg, &meshes()).is_err());
    }
}
