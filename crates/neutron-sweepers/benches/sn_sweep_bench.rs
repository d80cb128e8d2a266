// ─────────────────────────────────────────────────────────────────────
// SCPN Neutron Core — Sn Sweep Benchmarks
// © 1998–2026 Miroslav Šotek. All rights reserved.
// Contact: www.anulum.li | protoscience@anulum.li
// License: GNU AGPL v3 | Commercial licensing available
// ─────────────────────────────────────────────────────────────────────

use std::hint::black_box;
use std::rc::Rc;

use criterion::{criterion_group, criterion_main, Criterion};
use ndarray::Array1;

use neutron_core::angular_quadrature::AngularQuadrature;
use neutron_core::core_mesh::CoreMesh;
use neutron_sweepers::sn::sweeper::build_sn_dd;
use neutron_core::sweeper::TransportSweeper;
use neutron_types::config::ProblemConfig;

/// A single-assembly core with an n×n pin lattice, one group, pure
/// absorber. Measures the per-sweep cost of the Sn kernel without
/// source-iteration overhead.
fn lattice_doc(n: usize) -> String {
    let pins: Vec<String> = (0..n * n).map(|_| "1".to_string()).collect();
    format!(
        r#"{{
        "mesh": [{{"id": 1, "pitch_x": 1.26, "pitch_y": 1.26}}],
        "materials": [{{"id": 1, "name": "m", "xsab": [0.6], "scattering": [[0.2]]}}],
        "pins": [{{"id": 1, "mesh": 1, "materials": [1]}}],
        "lattices": [{{"id": 1, "nx": {n}, "ny": {n}, "pins": [{pins}]}}],
        "assemblies": [{{"id": 1, "np": 4, "hz": 2.0, "lattices": [1, 1, 1, 1]}}],
        "core": {{"nx": 1, "ny": 1, "assemblies": [1]}},
        "sweeper": {{"type": "sn", "n_inner": 2}},
        "solver": {{"type": "eigenvalue"}}
    }}"#,
        pins = pins.join(", ")
    )
}

fn bench_sn_sweep(c: &mut Criterion) {
    for n in [4usize, 8] {
        let cfg = ProblemConfig::from_str(&lattice_doc(n)).unwrap();
        let mesh = Rc::new(CoreMesh::from_config(&cfg).unwrap());
        let quad = AngularQuadrature::product(4, 2).unwrap();
        let mut sweeper = build_sn_dd(&cfg.sweeper, Rc::clone(&mesh), quad).unwrap();
        let mut source = sweeper.create_source();
        let fs = Array1::from_elem(sweeper.n_reg(), 1.0);

        c.bench_function(&format!("sn_sweep_{n}x{n}x4"), |b| {
            b.iter(|| {
                source.fission(&fs, 0);
                source.in_scatter(0, &sweeper.scatter_flux()).unwrap();
                sweeper.sweep(0, &source).unwrap();
                black_box(sweeper.flux());
            })
        });
    }
}

criterion_group!(benches, bench_sn_sweep);
criterion_main!(benches);
