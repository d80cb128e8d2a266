// ─────────────────────────────────────────────────────────────────────
// SCPN Neutron Core — Solver Scenarios
// © 1998–2026 Miroslav Šotek. All rights reserved.
// Contact: www.anulum.li | protoscience@anulum.li
// ORCID: https://orcid.org/0009-0009-3560-0851
// License: GNU AGPL v3 | Commercial licensing available
// ─────────────────────────────────────────────────────────────────────
//! End-to-end solver scenarios on small cores.

use std::rc::Rc;

use neutron_core::core_mesh::CoreMesh;
use neutron_core::sweeper::TransportSweeper;
use neutron_solver::{EigenSolver, FixedSourceSolver, Solver};
use neutron_types::config::ProblemConfig;

fn mesh_of(cfg: &ProblemConfig) -> Rc<CoreMesh> {
    Rc::new(CoreMesh::from_config(cfg).unwrap())
}

/// S1: unit-cell infinite-medium fixed source. Pure absorber with
/// Σ_ab = 1 and S = 1 under reflective conditions gives φ = 1.
#[test]
fn s1_infinite_medium_fixed_source() {
    let doc = r#"{
        "mesh": [{"id": 1, "pitch_x": 1.0, "pitch_y": 1.0}],
        "materials": [{"id": 1, "name": "m", "xsab": [1.0], "scattering": [[0.0]]}],
        "pins": [{"id": 1, "mesh": 1, "materials": [1]}],
        "lattices": [{"id": 1, "nx": 1, "ny": 1, "pins": [1]}],
        "assemblies": [{"id": 1, "np": 1, "hz": 1.0, "lattices": [1]}],
        "core": {"nx": 1, "ny": 1, "assemblies": [1]},
        "sweeper": {"type": "sn", "n_inner": 4},
        "solver": {"type": "fixed_source", "external_source": [1.0],
                   "flux_tolerance": 1e-9, "max_iter": 400}
    }"#;
    let cfg = ProblemConfig::from_str(doc).unwrap();
    let mut solver = FixedSourceSolver::new(&cfg, mesh_of(&cfg)).unwrap();
    solver.solve().unwrap();
    let flux = solver.sweeper().flux();
    assert!(
        (flux[[0, 0]] - 1.0).abs() < 1e-6,
        "φ = {}, expected 1.0",
        flux[[0, 0]]
    );
}

/// S2: two-group problem with upscatter, checked against the direct
/// inversion of (Σ_t − S)φ = q on the same cross sections.
#[test]
fn s2_two_group_upscatter() {
    let xsab = [1.0, 2.0];
    // scattering[from][to]
    let scat = [[0.3, 0.0], [0.1, 0.5]];
    let q = [1.0, 0.0];

    let doc = r#"{
        "mesh": [{"id": 1, "pitch_x": 1.0, "pitch_y": 1.0}],
        "materials": [{"id": 1, "name": "m", "xsab": [1.0, 2.0],
                       "scattering": [[0.3, 0.0], [0.1, 0.5]]}],
        "pins": [{"id": 1, "mesh": 1, "materials": [1]}],
        "lattices": [{"id": 1, "nx": 1, "ny": 1, "pins": [1]}],
        "assemblies": [{"id": 1, "np": 1, "hz": 1.0, "lattices": [1]}],
        "core": {"nx": 1, "ny": 1, "assemblies": [1]},
        "sweeper": {"type": "sn", "n_inner": 6},
        "solver": {"type": "fixed_source", "external_source": [1.0, 0.0],
                   "flux_tolerance": 1e-10, "max_iter": 600}
    }"#;
    let cfg = ProblemConfig::from_str(doc).unwrap();
    let mut solver = FixedSourceSolver::new(&cfg, mesh_of(&cfg)).unwrap();
    solver.solve().unwrap();

    // Direct inversion of the 2x2 system:
    //   (Σ_t,g − s_gg) φ_g − Σ_{g'≠g} s_g'g φ_g' = q_g
    let xstr = [
        xsab[0] + scat[0][0] + scat[0][1],
        xsab[1] + scat[1][0] + scat[1][1],
    ];
    let a = xstr[0] - scat[0][0];
    let b = -scat[1][0];
    let c = -scat[0][1];
    let d = xstr[1] - scat[1][1];
    let det = a * d - b * c;
    let expected = [(q[0] * d - b * q[1]) / det, (a * q[1] - c * q[0]) / det];

    let flux = solver.sweeper().flux();
    for g in 0..2 {
        assert!(
            (flux[[0, g]] - expected[g]).abs() < 1e-6,
            "group {g}: φ = {}, expected {}",
            flux[[0, g]],
            expected[g]
        );
    }
}

const S3_CORE: &str = r#"{
    "mesh": [{"id": 1, "pitch_x": 1.0, "pitch_y": 1.0}],
    "materials": [{"id": 1, "name": "fuel", "xsab": [1.0], "xsnf": [1.0],
                   "chi": [1.0], "scattering": [[0.0]]}],
    "pins": [{"id": 1, "mesh": 1, "materials": [1]}],
    "lattices": [{"id": 1, "nx": 2, "ny": 2, "pins": [1, 1, 1, 1]}],
    "assemblies": [{"id": 1, "np": 1, "hz": 1.0, "lattices": [1]}],
    "core": {"nx": 1, "ny": 1, "assemblies": [1]},
    "sweeper": {"type": "sn", "n_inner": 8},
    "solver": {"type": "eigenvalue", "k_tolerance": 1e-9,
               "flux_tolerance": 1e-8, "max_iter": 300}
}"#;

/// S3: symmetric reflective core with νΣ_f = Σ_ab: k converges to
/// exactly νΣ_f/Σ_ab = 1.
#[test]
fn s3_symmetric_core_unit_k() {
    let cfg = ProblemConfig::from_str(S3_CORE).unwrap();
    let mut solver = EigenSolver::new(&cfg, mesh_of(&cfg)).unwrap();
    solver.solve().unwrap();
    assert!(
        (solver.k() - 1.0).abs() < 1e-7,
        "k = {}, expected 1.0",
        solver.k()
    );
}

/// Power-iteration determinism: identical inputs give bitwise
/// identical eigenvalues and fluxes in serial mode.
#[test]
fn power_iteration_is_deterministic() {
    let cfg = ProblemConfig::from_str(S3_CORE).unwrap();
    let mut a = EigenSolver::new(&cfg, mesh_of(&cfg)).unwrap();
    let mut b = EigenSolver::new(&cfg, mesh_of(&cfg)).unwrap();
    a.solve().unwrap();
    b.solve().unwrap();
    assert_eq!(a.k().to_bits(), b.k().to_bits());

    let fa = a.fss().sweeper().flux();
    let fb = b.fss().sweeper().flux();
    for (x, y) in fa.iter().zip(fb.iter()) {
        assert_eq!(x.to_bits(), y.to_bits());
    }
}

fn coupled_doc(kind: &str) -> String {
    format!(
        r#"{{
        "mesh": [{{"id": 1, "pitch_x": 1.0, "pitch_y": 1.0, "sub_x": 2, "sub_y": 2}}],
        "materials": [{{
            "id": 1, "name": "fuel",
            "xsab": [0.8, 1.5],
            "xsnf": [0.4, 1.4],
            "chi": [1.0, 0.0],
            "scattering": [[0.2, 0.3], [0.0, 0.4]]
        }}],
        "pins": [{{"id": 1, "mesh": 1, "materials": [1, 1, 1, 1]}}],
        "lattices": [{{"id": 1, "nx": 2, "ny": 2, "pins": [1, 1, 1, 1]}}],
        "assemblies": [{{"id": 1, "np": 2, "hz": 1.0, "lattices": [1, 1]}}],
        "core": {{"nx": 1, "ny": 1, "assemblies": [1]}},
        "sweeper": {{"type": "{kind}", "n_inner": 4, "ray_spacing": 0.15,
                    "n_azimuthal": 2, "n_polar": 2}},
        "solver": {{"type": "eigenvalue", "k_tolerance": 1e-8,
                   "flux_tolerance": 1e-7, "max_iter": 400}}
    }}"#
    )
}

/// S4: with a single material and reflective boundaries the 2D3D
/// composite and the standalone Sn sweeper agree on k.
#[test]
fn s4_coupled_matches_sn_k() {
    let sn_cfg = ProblemConfig::from_str(&coupled_doc("sn")).unwrap();
    let mut sn = EigenSolver::new(&sn_cfg, mesh_of(&sn_cfg)).unwrap();
    sn.solve().unwrap();

    let cfg = ProblemConfig::from_str(&coupled_doc("2d3d")).unwrap();
    let mut coupled = EigenSolver::new(&cfg, mesh_of(&cfg)).unwrap();
    coupled.solve().unwrap();

    assert!(
        (coupled.k() - sn.k()).abs() < 1e-5,
        "2D3D k = {}, Sn k = {}",
        coupled.k(),
        sn.k()
    );
}

/// CDD coupling consistency: after convergence on a uniform problem
/// the Sn pin flux reproduces the MoC pin flux.
#[test]
fn cdd_correction_roundtrip() {
    let cfg = ProblemConfig::from_str(&coupled_doc("2d3d")).unwrap();
    let mut solver = EigenSolver::new(&cfg, mesh_of(&cfg)).unwrap();
    solver.solve().unwrap();

    let residuals = solver.fss().sweeper().sn_moc_residuals().unwrap();
    for (g, hist) in residuals.iter().enumerate() {
        let last = *hist.last().unwrap();
        assert!(last < 1e-4, "group {g}: Sn-MoC residual {last}");
    }
}

/// S6: an assembly specifying both hz forms must be rejected.
#[test]
fn s6_overspecified_heights_rejected() {
    let doc = r#"{
        "mesh": [{"id": 1, "pitch_x": 1.0, "pitch_y": 1.0}],
        "materials": [{"id": 1, "name": "m", "xsab": [1.0], "scattering": [[0.0]]}],
        "pins": [{"id": 1, "mesh": 1, "materials": [1]}],
        "lattices": [{"id": 1, "nx": 1, "ny": 1, "pins": [1]}],
        "assemblies": [{"id": 1, "np": 2, "hz": 1.0, "hz_list": [1.0, 1.0],
                        "lattices": [1, 1]}],
        "core": {"nx": 1, "ny": 1, "assemblies": [1]},
        "sweeper": {"type": "sn", "n_inner": 1},
        "solver": {"type": "eigenvalue"}
    }"#;
    let cfg = ProblemConfig::from_str(doc).unwrap();
    let err = CoreMesh::from_config(&cfg).unwrap_err();
    assert!(
        err.to_string().contains("over-specified"),
        "unexpected error: {err}"
    );
}

/// Unknown solver types are a configuration error.
#[test]
fn unknown_solver_type_rejected() {
    let doc = S3_CORE.replace(r#""type": "eigenvalue""#, r#""type": "adjoint""#);
    let cfg = ProblemConfig::from_str(&doc).unwrap();
    let err = match Solver::from_config(&cfg, mesh_of(&cfg)) {
        Err(e) => e,
        Ok(_) => panic!("expected Solver::from_config to fail"),
    };
    assert!(err.to_string().contains("valid solver type"));
}

/// Output payload lands on disk with the expected entries present.
#[test]
fn output_payload_written() {
    let cfg = ProblemConfig::from_str(S3_CORE).unwrap();
    let mut solver = Solver::from_config(&cfg, mesh_of(&cfg)).unwrap();
    solver.solve().unwrap();

    let dir = std::env::temp_dir().join("neutron_solver_test_out");
    std::fs::create_dir_all(&dir).unwrap();
    let path = dir.join("out.npz");
    solver.write_output(&path).unwrap();
    let meta = std::fs::metadata(&path).unwrap();
    assert!(meta.len() > 0);
    std::fs::remove_file(&path).ok();
}
