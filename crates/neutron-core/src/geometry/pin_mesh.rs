// ─────────────────────────────────────────────────────────────────────
// SCPN Neutron Core — Pin Mesh
// © 1998–2026 Miroslav Šotek. All rights reserved.
// Contact: www.anulum.li | protoscience@anulum.li
// ORCID: https://orcid.org/0009-0009-3560-0851
// License: GNU AGPL v3 | Commercial licensing available
// ─────────────────────────────────────────────────────────────────────
//! Fine-region layout of a single rectangular pin cell.

use neutron_types::config::PinMeshConfig;
use neutron_types::error::{TransportError, TransportResult};

/// Rectangular pin cell subdivided into `sub_x × sub_y` cross-section
/// regions, each split into `fsr_split × fsr_split` flat-source
/// regions.
///
/// Flat-source regions are ordered by cross-section region (row-major
/// over sub-cells, x fastest), then row-major within the sub-cell, so
/// the regions of one cross-section region are consecutive.
#[derive(Debug, Clone)]
pub struct PinMesh {
    id: u32,
    pitch_x: f64,
    pitch_y: f64,
    sub_x: usize,
    sub_y: usize,
    fsr_split: usize,
    areas: Vec<f64>,
}

impl PinMesh {
    pub fn from_config(cfg: &PinMeshConfig) -> TransportResult<Self> {
        if cfg.pitch_x <= 0.0 || cfg.pitch_y <= 0.0 {
            return Err(TransportError::Config(format!(
                "Invalid pitch for pin mesh {}.",
                cfg.id
            )));
        }
        if cfg.sub_x == 0 || cfg.sub_y == 0 || cfg.fsr_split == 0 {
            return Err(TransportError::Config(format!(
                "Invalid subdivision for pin mesh {}.",
                cfg.id
            )));
        }

        let n_reg = cfg.sub_x * cfg.sub_y * cfg.fsr_split * cfg.fsr_split;
        let cell_area = (cfg.pitch_x / (cfg.sub_x * cfg.fsr_split) as f64)
            * (cfg.pitch_y / (cfg.sub_y * cfg.fsr_split) as f64);
        let areas = vec![cell_area; n_reg];

        Ok(PinMesh {
            id: cfg.id,
            pitch_x: cfg.pitch_x,
            pitch_y: cfg.pitch_y,
            sub_x: cfg.sub_x,
            sub_y: cfg.sub_y,
            fsr_split: cfg.fsr_split,
            areas,
        })
    }

    pub fn id(&self) -> u32 {
        self.id
    }

    pub fn pitch_x(&self) -> f64 {
        self.pitch_x
    }

    pub fn pitch_y(&self) -> f64 {
        self.pitch_y
    }

    /// Total flat-source region count.
    pub fn n_reg(&self) -> usize {
        self.areas.len()
    }

    /// Cross-section region count.
    pub fn n_xsreg(&self) -> usize {
        self.sub_x * self.sub_y
    }

    /// Flat-source regions in cross-section region `ixsreg`.
    pub fn n_fsrs(&self, ixsreg: usize) -> usize {
        debug_assert!(ixsreg < self.n_xsreg());
        self.fsr_split * self.fsr_split
    }

    /// Flat-source region areas (2-D), in region order.
    pub fn areas(&self) -> &[f64] {
        &self.areas
    }

    /// Pin area.
    pub fn area(&self) -> f64 {
        self.pitch_x * self.pitch_y
    }

    /// Fine cells along x across the whole pin.
    pub fn fine_nx(&self) -> usize {
        self.sub_x * self.fsr_split
    }

    /// Fine cells along y across the whole pin.
    pub fn fine_ny(&self) -> usize {
        self.sub_y * self.fsr_split
    }

    /// Region index of the fine cell at (fx, fy), fine coordinates
    /// counted from the pin's lower-left corner.
    pub fn region_at(&self, fx: usize, fy: usize) -> usize {
        debug_assert!(fx < self.fine_nx() && fy < self.fine_ny());
        let s = self.fsr_split;
        let (sx, lx) = (fx / s, fx % s);
        let (sy, ly) = (fy / s, fy % s);
        (sy * self.sub_x + sx) * s * s + ly * s + lx
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(sub_x: usize, sub_y: usize, fsr_split: usize) -> PinMeshConfig {
        PinMeshConfig {
            id: 1,
            pitch_x: 1.2,
            pitch_y: 1.2,
            sub_x,
            sub_y,
            fsr_split,
        }
    }

    #[test]
    fn test_counts_and_areas() {
        let pm = PinMesh::from_config(&config(2, 2, 2)).unwrap();
        assert_eq!(pm.n_xsreg(), 4);
        assert_eq!(pm.n_reg(), 16);
        assert_eq!(pm.n_fsrs(0), 4);
        let total: f64 = pm.areas().iter().sum();
        assert!((total - pm.area()).abs() < 1e-12);
    }

    #[test]
    fn test_region_ordering_groups_xsregs() {
        let pm = PinMesh::from_config(&config(2, 1, 2)).unwrap();
        // xs region 0 covers fine cells (0..2, 0..2), regions 0..4
        assert_eq!(pm.region_at(0, 0), 0);
        assert_eq!(pm.region_at(1, 0), 1);
        assert_eq!(pm.region_at(0, 1), 2);
        assert_eq!(pm.region_at(1, 1), 3);
        // xs region 1 starts at region 4
        assert_eq!(pm.region_at(2, 0), 4);
    }

    #[test]
    fn test_rejects_degenerate() {
        let mut cfg = config(1, 1, 1);
        cfg.pitch_x = 0.0;
        assert!(PinMesh::from_config(&cfg).is_err());
        let mut cfg = config(1, 1, 1);
        cfg.sub_x = 0;
        assert!(PinMesh::from_config(&cfg).is_err());
    }
}
