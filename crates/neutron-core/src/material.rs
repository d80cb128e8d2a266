// ─────────────────────────────────────────────────────────────────────
// SCPN Neutron Core — Material
// © 1998–2026 Miroslav Šotek. All rights reserved.
// Contact: www.anulum.li | protoscience@anulum.li
// ORCID: https://orcid.org/0009-0009-3560-0851
// License: GNU AGPL v3 | Commercial licensing available
// ─────────────────────────────────────────────────────────────────────
//! Macroscopic material cross sections and the compact scattering
//! matrix representation.

use std::collections::BTreeMap;

use neutron_types::config::MaterialConfig;
use neutron_types::error::{TransportError, TransportResult};

/// Nonzero in-scatter band into one destination group.
///
/// `from[k]` is the transfer cross section from source group
/// `min_g + k`. An empty `from` means no group scatters into this one.
#[derive(Debug, Clone, Default)]
pub struct ScatteringRow {
    pub min_g: usize,
    pub max_g: usize,
    pub from: Vec<f64>,
}

impl ScatteringRow {
    /// Transfer cross section from `g`, zero outside the band.
    pub fn from_group(&self, g: usize) -> f64 {
        if self.from.is_empty() || g < self.min_g || g > self.max_g {
            0.0
        } else {
            self.from[g - self.min_g]
        }
    }

    /// Iterate (source group, transfer cross section) over the band.
    pub fn iter(&self) -> impl Iterator<Item = (usize, f64)> + '_ {
        self.from
            .iter()
            .enumerate()
            .map(move |(k, &v)| (self.min_g + k, v))
    }
}

/// Compact group-to-group scattering matrix.
///
/// Rows are stored by destination group; `out(g)` is the total
/// scattering out of source group `g` over all destinations.
#[derive(Debug, Clone)]
pub struct ScatteringMatrix {
    rows: Vec<ScatteringRow>,
    out: Vec<f64>,
}

impl ScatteringMatrix {
    /// Build from dense rows indexed `[destination][source]`.
    pub fn from_dense_into(rows_into: &[Vec<f64>]) -> Self {
        let ng = rows_into.len();
        let mut rows = Vec::with_capacity(ng);
        for row in rows_into {
            debug_assert_eq!(row.len(), ng);
            let first = row.iter().position(|&v| v != 0.0);
            let row = match first {
                Some(min_g) => {
                    let max_g = row.iter().rposition(|&v| v != 0.0).unwrap();
                    ScatteringRow {
                        min_g,
                        max_g,
                        from: row[min_g..=max_g].to_vec(),
                    }
                }
                None => ScatteringRow::default(),
            };
            rows.push(row);
        }

        let mut out = vec![0.0; ng];
        for row in &rows {
            for (g, v) in row.iter() {
                out[g] += v;
            }
        }

        ScatteringMatrix { rows, out }
    }

    /// Build from dense rows indexed `[source][destination]`, the
    /// layout used in the input document.
    pub fn from_dense_from(rows_from: &[Vec<f64>]) -> Self {
        let ng = rows_from.len();
        let mut rows_into = vec![vec![0.0; ng]; ng];
        for (g_from, row) in rows_from.iter().enumerate() {
            for (g_to, &v) in row.iter().enumerate() {
                rows_into[g_to][g_from] = v;
            }
        }
        Self::from_dense_into(&rows_into)
    }

    pub fn n_group(&self) -> usize {
        self.rows.len()
    }

    /// In-scatter band into destination group `g`.
    pub fn to(&self, g: usize) -> &ScatteringRow {
        &self.rows[g]
    }

    /// Total scattering out of source group `g`.
    pub fn out(&self, g: usize) -> f64 {
        self.out[g]
    }

    /// Self-scatter within group `g`.
    pub fn self_scatter(&self, g: usize) -> f64 {
        self.rows[g].from_group(g)
    }

    /// Dense `[destination][source]` expansion.
    pub fn as_dense(&self) -> Vec<Vec<f64>> {
        let ng = self.n_group();
        let mut dense = vec![vec![0.0; ng]; ng];
        for (g_to, row) in self.rows.iter().enumerate() {
            for (g_from, v) in row.iter() {
                dense[g_to][g_from] = v;
            }
        }
        dense
    }
}

/// Per-group macroscopic cross sections of one material.
#[derive(Debug, Clone)]
pub struct Material {
    xsab: Vec<f64>,
    xsnf: Vec<f64>,
    xskf: Vec<f64>,
    xsf: Vec<f64>,
    xsch: Vec<f64>,
    xssc: ScatteringMatrix,
}

impl Material {
    pub fn from_config(cfg: &MaterialConfig) -> TransportResult<Self> {
        let ng = cfg.xsab.len();
        if ng == 0 {
            return Err(TransportError::Config(format!(
                "Material {} has no groups.",
                cfg.id
            )));
        }
        if cfg.scattering.len() != ng || cfg.scattering.iter().any(|r| r.len() != ng) {
            return Err(TransportError::Config(format!(
                "Material {} scattering matrix is not {ng}x{ng}.",
                cfg.id
            )));
        }
        let fill = |v: &Vec<f64>, what: &str| -> TransportResult<Vec<f64>> {
            if v.is_empty() {
                Ok(vec![0.0; ng])
            } else if v.len() == ng {
                Ok(v.clone())
            } else {
                Err(TransportError::Config(format!(
                    "Material {} has {} {what} entries, expected {ng}.",
                    cfg.id,
                    v.len()
                )))
            }
        };

        Ok(Material {
            xsab: cfg.xsab.clone(),
            xsnf: fill(&cfg.xsnf, "nu-fission")?,
            xskf: fill(&cfg.xskf, "kappa-fission")?,
            xsf: fill(&cfg.xsf, "fission")?,
            xsch: fill(&cfg.chi, "chi")?,
            xssc: ScatteringMatrix::from_dense_from(&cfg.scattering),
        })
    }

    pub fn n_group(&self) -> usize {
        self.xsab.len()
    }

    pub fn xsab(&self) -> &[f64] {
        &self.xsab
    }

    pub fn xsnf(&self) -> &[f64] {
        &self.xsnf
    }

    pub fn xskf(&self) -> &[f64] {
        &self.xskf
    }

    pub fn xsf(&self) -> &[f64] {
        &self.xsf
    }

    pub fn xsch(&self) -> &[f64] {
        &self.xsch
    }

    pub fn xssc(&self) -> &ScatteringMatrix {
        &self.xssc
    }

    /// Transport cross section: absorption plus total out-scatter.
    pub fn xstr(&self, g: usize) -> f64 {
        self.xsab[g] + self.xssc.out(g)
    }
}

/// Materials by input ID, with a dense index space in ascending ID
/// order for cross-section mesh assembly.
#[derive(Debug, Clone)]
pub struct MaterialLib {
    materials: Vec<Material>,
    names: Vec<String>,
    index_by_id: BTreeMap<u32, usize>,
    ng: usize,
}

impl MaterialLib {
    pub fn from_configs(configs: &[MaterialConfig]) -> TransportResult<Self> {
        if configs.is_empty() {
            return Err(TransportError::Config("No materials specified.".into()));
        }

        let mut sorted: Vec<&MaterialConfig> = configs.iter().collect();
        sorted.sort_by_key(|c| c.id);

        let mut materials = Vec::with_capacity(sorted.len());
        let mut names = Vec::with_capacity(sorted.len());
        let mut index_by_id = BTreeMap::new();
        for (i, cfg) in sorted.iter().enumerate() {
            if index_by_id.insert(cfg.id, i).is_some() {
                return Err(TransportError::Config(format!(
                    "Duplicate material ID {}.",
                    cfg.id
                )));
            }
            materials.push(Material::from_config(cfg)?);
            names.push(cfg.name.clone());
        }

        let ng = materials[0].n_group();
        if materials.iter().any(|m| m.n_group() != ng) {
            return Err(TransportError::Config(
                "Materials have inconsistent group counts.".into(),
            ));
        }

        log::debug!(
            "Material library: {} materials, {} groups",
            materials.len(),
            ng
        );

        Ok(MaterialLib {
            materials,
            names,
            index_by_id,
            ng,
        })
    }

    pub fn n_materials(&self) -> usize {
        self.materials.len()
    }

    pub fn n_group(&self) -> usize {
        self.ng
    }

    pub fn get_by_id(&self, id: u32) -> TransportResult<&Material> {
        self.index_by_id
            .get(&id)
            .map(|&i| &self.materials[i])
            .ok_or_else(|| TransportError::Config(format!("Invalid material ID {id}.")))
    }

    /// Dense index of a material ID (ascending-ID order).
    pub fn index_of_id(&self, id: u32) -> TransportResult<usize> {
        self.index_by_id
            .get(&id)
            .copied()
            .ok_or_else(|| TransportError::Config(format!("Invalid material ID {id}.")))
    }

    pub fn material(&self, index: usize) -> &Material {
        &self.materials[index]
    }

    pub fn name(&self, index: usize) -> &str {
        &self.names[index]
    }
}
