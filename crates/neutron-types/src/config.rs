// ─────────────────────────────────────────────────────────────────────
// SCPN Neutron Core — Config
// © 1998–2026 Miroslav Šotek. All rights reserved.
// Contact: www.anulum.li | protoscience@anulum.li
// ORCID: https://orcid.org/0009-0009-3560-0851
// License: GNU AGPL v3 | Commercial licensing available
// ─────────────────────────────────────────────────────────────────────
//! Problem configuration model.
//!
//! One struct per input node: pin meshes, materials, pins, lattices,
//! assemblies, core, sweeper, solver. The structs are plain data; all
//! cross-referencing validation (unknown IDs, size mismatches) happens
//! when the geometry hierarchy is assembled from them.

use serde::{Deserialize, Serialize};

/// Top-level problem configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProblemConfig {
    #[serde(rename = "mesh")]
    pub pin_meshes: Vec<PinMeshConfig>,
    pub materials: Vec<MaterialConfig>,
    pub pins: Vec<PinConfig>,
    pub lattices: Vec<LatticeConfig>,
    pub assemblies: Vec<AssemblyConfig>,
    pub core: CoreLayoutConfig,
    pub sweeper: SweeperConfig,
    pub solver: SolverConfig,
}

/// Rectangular pin mesh: a pitch_x × pitch_y cell divided into
/// sub_x × sub_y cross-section regions, each further split into
/// fsr_split × fsr_split flat-source regions.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PinMeshConfig {
    pub id: u32,
    pub pitch_x: f64,
    pub pitch_y: f64,
    #[serde(default = "one")]
    pub sub_x: usize,
    #[serde(default = "one")]
    pub sub_y: usize,
    #[serde(default = "one")]
    pub fsr_split: usize,
}

/// Macroscopic cross sections for one material, all per-group.
/// `scattering[g_from][g_to]` is the g_from → g_to transfer cross section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MaterialConfig {
    pub id: u32,
    pub name: String,
    pub xsab: Vec<f64>,
    #[serde(default)]
    pub xsnf: Vec<f64>,
    #[serde(default)]
    pub xskf: Vec<f64>,
    #[serde(default)]
    pub xsf: Vec<f64>,
    #[serde(default)]
    pub chi: Vec<f64>,
    pub scattering: Vec<Vec<f64>>,
}

/// A pin mesh plus one material ID per cross-section region.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PinConfig {
    pub id: u32,
    pub mesh: u32,
    pub materials: Vec<u32>,
}

/// 2-D grid of pins. `pins` is given row by row, first row at the top.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LatticeConfig {
    pub id: u32,
    pub nx: usize,
    pub ny: usize,
    pub pins: Vec<u32>,
}

/// Axial stack of lattices. Plane heights come either from the scalar
/// `hz` (uniform) or the `hz_list` vector; specifying both is an error.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AssemblyConfig {
    pub id: u32,
    pub np: usize,
    #[serde(default)]
    pub hz: Option<f64>,
    #[serde(default)]
    pub hz_list: Option<Vec<f64>>,
    pub lattices: Vec<u32>,
}

/// 2-D grid of assemblies. `assemblies` is given row by row, first row
/// at the top; storage is flipped to a lower-left origin.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CoreLayoutConfig {
    pub nx: usize,
    pub ny: usize,
    pub assemblies: Vec<u32>,
    #[serde(default)]
    pub boundary: BoundarySpec,
}

/// Boundary condition for one core face.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BoundaryCondition {
    Reflect,
    Vacuum,
}

impl Default for BoundaryCondition {
    fn default() -> Self {
        BoundaryCondition::Reflect
    }
}

/// Per-face boundary conditions, reflective unless stated otherwise.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct BoundarySpec {
    #[serde(default)]
    pub west: BoundaryCondition,
    #[serde(default)]
    pub east: BoundaryCondition,
    #[serde(default)]
    pub south: BoundaryCondition,
    #[serde(default)]
    pub north: BoundaryCondition,
    #[serde(default)]
    pub bottom: BoundaryCondition,
    #[serde(default)]
    pub top: BoundaryCondition,
}

/// Transport sweeper selection and knobs.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SweeperConfig {
    #[serde(rename = "type")]
    pub kind: String,
    /// Inner iterations per group sweep (Sn). Negative is rejected.
    #[serde(default = "default_n_inner")]
    pub n_inner: i64,
    /// Azimuthal angles per octant.
    #[serde(default = "default_n_azimuthal")]
    pub n_azimuthal: usize,
    /// Polar angles per octant.
    #[serde(default = "default_n_polar")]
    pub n_polar: usize,
    /// Target ray spacing for MoC plane tracing.
    #[serde(default = "default_ray_spacing")]
    pub ray_spacing: f64,
    /// In 2D3D, whether pin flux queries return the Sn or the MoC flux.
    #[serde(default = "default_true")]
    pub expose_sn: bool,
    /// In 2D3D, project the MoC pin flux into the Sn flux between sub-sweeps.
    #[serde(default)]
    pub do_snproject: bool,
    /// Apply the transverse-leakage correction to the MoC source.
    #[serde(default = "default_true")]
    pub do_tl: bool,
    /// Outer iterations before the first MoC sweep.
    #[serde(default)]
    pub n_inactive_moc: usize,
    /// Run MoC only every k-th outer iteration.
    #[serde(default = "one")]
    pub moc_modulo: usize,
    /// Gauss-Seidel (true) vs Jacobi (false) in-group angle update.
    #[serde(default = "default_true")]
    pub gs_boundary: bool,
}

/// Solver selection: outer eigenvalue iteration or a fixed-source solve.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SolverConfig {
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default = "default_max_iter")]
    pub max_iter: usize,
    #[serde(default = "default_k_tolerance")]
    pub k_tolerance: f64,
    #[serde(default = "default_flux_tolerance")]
    pub flux_tolerance: f64,
    /// Uniform external source strength per group (fixed-source mode).
    #[serde(default)]
    pub external_source: Option<Vec<f64>>,
}

fn one() -> usize {
    1
}

fn default_n_inner() -> i64 {
    1
}

fn default_n_azimuthal() -> usize {
    4
}

fn default_n_polar() -> usize {
    2
}

fn default_ray_spacing() -> f64 {
    0.05
}

fn default_true() -> bool {
    true
}

fn default_max_iter() -> usize {
    200
}

fn default_k_tolerance() -> f64 {
    1e-6
}

fn default_flux_tolerance() -> f64 {
    1e-5
}

impl ProblemConfig {
    /// Load from a JSON file.
    pub fn from_file(path: &str) -> crate::error::TransportResult<Self> {
        let contents = std::fs::read_to_string(path)?;
        let config: Self = serde_json::from_str(&contents)?;
        Ok(config)
    }

    /// Parse from an in-memory JSON document.
    pub fn from_str(doc: &str) -> crate::error::TransportResult<Self> {
        let config: Self = serde_json::from_str(doc)?;
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SINGLE_PIN: &str = r#"{
        "mesh": [{"id": 1, "pitch_x": 1.26, "pitch_y": 1.26}],
        "materials": [{
            "id": 1, "name": "mod",
            "xsab": [1.0],
            "scattering": [[0.0]]
        }],
        "pins": [{"id": 1, "mesh": 1, "materials": [1]}],
        "lattices": [{"id": 1, "nx": 1, "ny": 1, "pins": [1]}],
        "assemblies": [{"id": 1, "np": 1, "hz": 1.0, "lattices": [1]}],
        "core": {"nx": 1, "ny": 1, "assemblies": [1]},
        "sweeper": {"type": "sn", "n_inner": 4},
        "solver": {"type": "fixed_source", "external_source": [1.0]}
    }"#;

    #[test]
    fn test_parse_single_pin() {
        let cfg = ProblemConfig::from_str(SINGLE_PIN).unwrap();
        assert_eq!(cfg.pin_meshes.len(), 1);
        assert_eq!(cfg.pin_meshes[0].sub_x, 1);
        assert_eq!(cfg.sweeper.kind, "sn");
        assert_eq!(cfg.sweeper.n_inner, 4);
        assert!(cfg.sweeper.gs_boundary);
        assert_eq!(cfg.solver.external_source.as_deref(), Some(&[1.0][..]));
    }

    #[test]
    fn test_boundary_defaults_reflective() {
        let cfg = ProblemConfig::from_str(SINGLE_PIN).unwrap();
        assert_eq!(cfg.core.boundary.west, BoundaryCondition::Reflect);
        assert_eq!(cfg.core.boundary.top, BoundaryCondition::Reflect);
    }

    #[test]
    fn test_boundary_override() {
        let doc = SINGLE_PIN.replace(
            r#""core": {"nx": 1, "ny": 1, "assemblies": [1]}"#,
            r#""core": {"nx": 1, "ny": 1, "assemblies": [1],
                "boundary": {"west": "vacuum", "east": "vacuum"}}"#,
        );
        let cfg = ProblemConfig::from_str(&doc).unwrap();
        assert_eq!(cfg.core.boundary.west, BoundaryCondition::Vacuum);
        assert_eq!(cfg.core.boundary.south, BoundaryCondition::Reflect);
    }

    #[test]
    fn test_hz_forms() {
        let cfg = ProblemConfig::from_str(SINGLE_PIN).unwrap();
        assert_eq!(cfg.assemblies[0].hz, Some(1.0));
        assert!(cfg.assemblies[0].hz_list.is_none());

        let doc = SINGLE_PIN.replace(r#""hz": 1.0"#, r#""hz_list": [1.0]"#);
        let cfg = ProblemConfig::from_str(&doc).unwrap();
        assert!(cfg.assemblies[0].hz.is_none());
        assert_eq!(cfg.assemblies[0].hz_list.as_deref(), Some(&[1.0][..]));
    }

    #[test]
    fn test_roundtrip_serialization() {
        let cfg = ProblemConfig::from_str(SINGLE_PIN).unwrap();
        let json = serde_json::to_string_pretty(&cfg).unwrap();
        let cfg2 = ProblemConfig::from_str(&json).unwrap();
        assert_eq!(cfg.sweeper.n_inner, cfg2.sweeper.n_inner);
        assert_eq!(cfg.core.nx, cfg2.core.nx);
    }
}
