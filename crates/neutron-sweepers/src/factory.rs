// ─────────────────────────────────────────────────────────────────────
// SCPN Neutron Core — Sweeper Factory
// © 1998–2026 Miroslav Šotek. All rights reserved.
// Contact: www.anulum.li | protoscience@anulum.li
// ORCID: https://orcid.org/0009-0009-3560-0851
// License: GNU AGPL v3 | Commercial licensing available
// ─────────────────────────────────────────────────────────────────────
//! Builds the transport sweeper requested by the configuration.

use std::rc::Rc;

use neutron_types::config::ProblemConfig;
use neutron_types::error::{TransportError, TransportResult};

use neutron_core::angular_quadrature::AngularQuadrature;
use neutron_core::core_mesh::CoreMesh;
use neutron_core::sweeper::TransportSweeper;
use neutron_core::xs_mesh::XSMesh;

use crate::cmdo::moc_sweeper::MocSweeper;
use crate::cmdo::plane_sweeper::PlaneSweeper2D3D;
use crate::sn::sweeper::build_sn_dd;

/// Build a sweeper from the `sweeper` node. Unknown types are a
/// configuration error.
pub fn build_sweeper(
    config: &ProblemConfig,
    mesh: Rc<CoreMesh>,
) -> TransportResult<Box<dyn TransportSweeper>> {
    let sweeper_cfg = &config.sweeper;
    let quad = AngularQuadrature::product(sweeper_cfg.n_azimuthal, sweeper_cfg.n_polar)?;

    match sweeper_cfg.kind.as_str() {
        "moc" => {
            let xs = Rc::new(XSMesh::build(&mesh)?);
            let sweeper = MocSweeper::new(sweeper_cfg, mesh, quad, xs)?;
            Ok(Box::new(sweeper))
        }
        "sn" => {
            let sweeper = build_sn_dd(sweeper_cfg, mesh, quad)?;
            Ok(Box::new(sweeper))
        }
        "2d3d" => {
            let sweeper = PlaneSweeper2D3D::new(sweeper_cfg, mesh)?;
            Ok(Box::new(sweeper))
        }
        _ => Err(TransportError::Config(
            "Failed to detect a valid sweeper type.".into(),
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use neutron_types::config::ProblemConfig;

    fn doc(kind: &str) -> String {
        format!(
            r#"{{
            "mesh": [{{"id": 1, "pitch_x": 1.0, "pitch_y": 1.0}}],
            "materials": [{{"id": 1, "name": "m", "xsab": [1.0], "scattering": [[0.0]]}}],
            "pins": [{{"id": 1, "mesh": 1, "materials": [1]}}],
            "lattices": [{{"id": 1, "nx": 1, "ny": 1, "pins": [1]}}],
            "assemblies": [{{"id": 1, "np": 1, "hz": 1.0, "lattices": [1]}}],
            "core": {{"nx": 1, "ny": 1, "assemblies": [1]}},
            "sweeper": {{"type": "{kind}", "n_inner": 1, "n_azimuthal": 2, "n_polar": 1,
                        "ray_spacing": 0.3}},
            "solver": {{"type": "eigenvalue"}}
        }}"#
        )
    }

    #[test]
    fn test_known_types_build() {
        for kind in ["sn", "moc", "2d3d"] {
            let cfg = ProblemConfig::from_str(&doc(kind)).unwrap();
            let mesh = Rc::new(CoreMesh::from_config(&cfg).unwrap());
            let sweeper = build_sweeper(&cfg, mesh).unwrap();
            assert_eq!(sweeper.n_group(), 1);
        }
    }

    #[test]
    fn test_unknown_type_rejected() {
        let cfg = ProblemConfig::from_str(&doc("montecarlo")).unwrap();
        let mesh = Rc::new(CoreMesh::from_config(&cfg).unwrap());
        let err = match build_sweeper(&cfg, mesh) {
            Err(e) => e,
            Ok(_) => panic!("expected build_sweeper to fail"),
        };
        assert!(err.to_string().contains("valid sweeper type"));
    }
}
