// ─────────────────────────────────────────────────────────────────────
// SCPN Neutron Core — Core
// © 1998–2026 Miroslav Šotek. All rights reserved.
// Contact: www.anulum.li | protoscience@anulum.li
// ORCID: https://orcid.org/0009-0009-3560-0851
// License: GNU AGPL v3 | Commercial licensing available
// ─────────────────────────────────────────────────────────────────────
//! The 2-D grid of assemblies making up the reactor core.

use std::collections::BTreeMap;

use neutron_types::error::{TransportError, TransportResult};
use neutron_types::config::CoreLayoutConfig;

use super::assembly::Assembly;

/// Assembly grid with lower-left origin; the input lists rows top-down
/// and is flipped once on construction. All assemblies must agree on
/// plane count and plane heights.
#[derive(Debug, Clone)]
pub struct Core {
    nx: usize,
    ny: usize,
    asy_ids: Vec<u32>,
    npin_x: usize,
    npin_y: usize,
}

impl Core {
    pub fn from_config(
        cfg: &CoreLayoutConfig,
        assemblies: &BTreeMap<u32, Assembly>,
    ) -> TransportResult<Self> {
        if cfg.nx < 1 || cfg.ny < 1 {
            return Err(TransportError::Config("Invalid core dimensions.".into()));
        }
        if cfg.assemblies.len() != cfg.nx * cfg.ny {
            return Err(TransportError::Config(
                "Trouble reading assembly IDs in core specification.".into(),
            ));
        }

        // Flip the y-index once to store with lower-left origin
        let mut asy_ids = vec![0u32; cfg.nx * cfg.ny];
        for iy in 0..cfg.ny {
            let src_row = cfg.ny - iy - 1;
            let src = &cfg.assemblies[src_row * cfg.nx..(src_row + 1) * cfg.nx];
            asy_ids[iy * cfg.nx..(iy + 1) * cfg.nx].copy_from_slice(src);
        }

        for &id in &asy_ids {
            if !assemblies.contains_key(&id) {
                return Err(TransportError::Config(format!(
                    "Unrecognized assembly ID {id} in core specification."
                )));
            }
        }

        // All assemblies must stack compatibly
        let first = &assemblies[&asy_ids[0]];
        for &id in &asy_ids {
            let asy = &assemblies[&id];
            if asy.nz() != first.nz() {
                return Err(TransportError::Geometry(
                    "Assemblies in the core have incompatible numbers of planes.".into(),
                ));
            }
            for (a, b) in asy.hz().iter().zip(first.hz()) {
                if (a - b).abs() > 1e-12 {
                    return Err(TransportError::Geometry(
                        "Assemblies have incompatible plane heights in core.".into(),
                    ));
                }
            }
        }

        // Total pin counts along each dimension
        let mut npin_x = 0;
        for ix in 0..cfg.nx {
            npin_x += assemblies[&asy_ids[ix]].nx();
        }
        let mut npin_y = 0;
        for iy in 0..cfg.ny {
            npin_y += assemblies[&asy_ids[iy * cfg.nx]].ny();
        }

        log::debug!("Core dimensions in pins: {npin_x} x {npin_y}");

        Ok(Core {
            nx: cfg.nx,
            ny: cfg.ny,
            asy_ids,
            npin_x,
            npin_y,
        })
    }

    pub fn nx(&self) -> usize {
        self.nx
    }

    pub fn ny(&self) -> usize {
        self.ny
    }

    pub fn npin_x(&self) -> usize {
        self.npin_x
    }

    pub fn npin_y(&self) -> usize {
        self.npin_y
    }

    /// Assembly ID at core position (ix, iy), lower-left origin.
    pub fn at(&self, ix: usize, iy: usize) -> u32 {
        debug_assert!(ix < self.nx && iy < self.ny);
        self.asy_ids[iy * self.nx + ix]
    }
}
