// ─────────────────────────────────────────────────────────────────────
// SCPN Neutron Core — Rays
// © 1998–2026 Miroslav Šotek. All rights reserved.
// Contact: www.anulum.li | protoscience@anulum.li
// ORCID: https://orcid.org/0009-0009-3560-0851
// License: GNU AGPL v3 | Commercial licensing available
// ─────────────────────────────────────────────────────────────────────
//! Modular ray tracing for the per-plane MoC sweep.
//!
//! Azimuths are snapped so that track endpoints land on half-integer
//! lattices of each edge: the azimuthal family at α and its mirror at
//! π−α then share every endpoint, which makes reflective boundary
//! conditions an exact endpoint-to-endpoint relink instead of an
//! interpolation.

use std::collections::HashMap;

use neutron_types::config::BoundaryCondition;

use neutron_core::core_mesh::PlaneGeometry;

/// Positional tolerance when matching cuts and endpoints.
const POS_TOL: f64 = 1e-9;

/// 2-D plane edges, y increasing to the north.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Edge2D {
    South,
    North,
    West,
    East,
}

/// Pin-surface crossing marker carried at a segment's downwind end.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum CrossFace {
    None,
    /// Plane-local x-surface: isx + (npin_x+1)·iy.
    X(usize),
    /// Plane-local y-surface: ix + npin_x·isy.
    Y(usize),
}

#[derive(Debug, Clone)]
pub struct Segment {
    /// Plane-local flat-source region.
    pub fsr: usize,
    /// Projected 2-D length.
    pub len: f64,
    /// Pin surface crossed at the downwind end of the segment.
    pub cross: CrossFace,
}

#[derive(Debug, Clone)]
pub struct Track {
    pub segments: Vec<Segment>,
    /// Forward-entry endpoint (edge, slot).
    pub entry: (Edge2D, usize),
    /// Forward-exit endpoint (edge, slot).
    pub exit: (Edge2D, usize),
    /// Pin surface coincident with the forward entry point.
    pub entry_cross: CrossFace,
}

/// All tracks of one azimuthal direction pair (forward = α,
/// backward = α + π).
#[derive(Debug, Clone)]
pub struct RayFamily {
    /// Azimuth of the forward direction, in (0, π).
    pub alpha: f64,
    /// Perpendicular spacing between adjacent tracks.
    pub spacing: f64,
    /// Crossing weight on x-normal (vertical) pin faces.
    pub weight_x: f64,
    /// Crossing weight on y-normal pin faces.
    pub weight_y: f64,
    pub tracks: Vec<Track>,
}

/// Forward/backward direction selector within a family.
pub const DIR_FWD: usize = 0;
pub const DIR_BWD: usize = 1;

/// Traced rays of one geometrically unique plane.
///
/// Families 0..n_azi hold the octant-1 azimuths (α ∈ (0, π/2)); family
/// n_azi+m is the mirror of family m (azimuth π−α). The link table
/// relinks every outgoing track end to the entering (family, track,
/// direction) its reflection feeds, or to nothing on a vacuum edge.
#[derive(Debug, Clone)]
pub struct PlaneRays {
    pub families: Vec<RayFamily>,
    pub n_azi: usize,
    fam_offset: Vec<usize>,
    links: Vec<Option<(usize, usize, usize)>>,
    /// Per family: streaming-tally normalization per plane region.
    pub vol_corr: Vec<Vec<f64>>,
    /// Per family: total crossing weight per plane x pin-surface.
    pub face_x_weight: Vec<Vec<f64>>,
    /// Per family: total crossing weight per plane y pin-surface.
    pub face_y_weight: Vec<Vec<f64>>,
}

/// Inputs describing the plane to trace.
pub struct TraceInput<'a> {
    pub geom: &'a PlaneGeometry,
    pub npin_x: usize,
    pub npin_y: usize,
    /// Boundary conditions for [west, east, south, north].
    pub bc: [BoundaryCondition; 4],
    /// Requested azimuths in (0, π/2), one per family.
    pub azimuths: &'a [f64],
    /// Target ray spacing.
    pub spacing: f64,
}

impl PlaneRays {
    /// Trace every family and build the reflective link table.
    /// Returns the rays plus the snapped azimuths (same order as the
    /// request) for the caller to push back into its quadrature.
    pub fn trace(input: &TraceInput<'_>) -> (PlaneRays, Vec<f64>) {
        let geom = input.geom;
        let width = *geom.xcuts.last().unwrap();
        let height = *geom.ycuts.last().unwrap();
        let n_azi = input.azimuths.len();

        let mut families = Vec::with_capacity(2 * n_azi);
        let mut snapped = Vec::with_capacity(n_azi);

        for &alpha in input.azimuths {
            let n_x = ((width * alpha.sin() / input.spacing).round() as usize).max(1);
            let n_y = ((height * alpha.cos() / input.spacing).round() as usize).max(1);
            let alpha_adj = (height * n_x as f64).atan2(width * n_y as f64);
            snapped.push(alpha_adj);

            let dx = width / n_x as f64;
            let dy = height / n_y as f64;
            let spacing = dx * alpha_adj.sin();
            // Crossing spacings follow from the modular construction:
            // rays cross any vertical line at intervals of exactly dy
            let weight_x = dy;
            let weight_y = dx;

            families.push(trace_family(
                geom,
                input.npin_x,
                alpha_adj,
                true,
                n_x,
                n_y,
                dx,
                dy,
                spacing,
                weight_x,
                weight_y,
            ));
            families.push(trace_family(
                geom,
                input.npin_x,
                alpha_adj,
                false,
                n_x,
                n_y,
                dx,
                dy,
                spacing,
                weight_x,
                weight_y,
            ));
        }

        // Interleaved A/B construction above; regroup as A*, then B*
        let mut reordered = Vec::with_capacity(2 * n_azi);
        for m in 0..n_azi {
            reordered.push(families[2 * m].clone());
        }
        for m in 0..n_azi {
            reordered.push(families[2 * m + 1].clone());
        }
        let families = reordered;

        let mut fam_offset = Vec::with_capacity(families.len() + 1);
        let mut total = 0;
        for fam in &families {
            fam_offset.push(total);
            total += fam.tracks.len();
        }
        fam_offset.push(total);

        let links = build_links(&families, n_azi, input.bc, &fam_offset);

        let (vol_corr, face_x_weight, face_y_weight) =
            build_normalizations(&families, geom, input.npin_x, input.npin_y);

        (
            PlaneRays {
                families,
                n_azi,
                fam_offset,
                links,
                vol_corr,
                face_x_weight,
                face_y_weight,
            },
            snapped,
        )
    }

    pub fn n_tracks(&self) -> usize {
        *self.fam_offset.last().unwrap()
    }

    /// Boundary-flux slots per group: every (track, direction, polar).
    pub fn bc_len(&self, n_polar: usize) -> usize {
        2 * self.n_tracks() * n_polar
    }

    pub fn bc_index(&self, fam: usize, track: usize, dir: usize, p: usize, n_polar: usize) -> usize {
        (2 * (self.fam_offset[fam] + track) + dir) * n_polar + p
    }

    /// Where the outgoing flux of (fam, track, dir) re-enters, if the
    /// exit edge is reflective.
    pub fn link(&self, fam: usize, track: usize, dir: usize) -> Option<(usize, usize, usize)> {
        self.links[2 * (self.fam_offset[fam] + track) + dir]
    }
}

/// Direction signs (x, y) of one family/direction combination.
fn direction_signs(is_a: bool, dir: usize) -> (f64, f64) {
    match (is_a, dir) {
        (true, DIR_FWD) => (1.0, 1.0),
        (true, _) => (-1.0, -1.0),
        (false, DIR_FWD) => (-1.0, 1.0),
        (false, _) => (1.0, -1.0),
    }
}

#[allow(clippy::too_many_arguments)]
fn trace_family(
    geom: &PlaneGeometry,
    npin_x: usize,
    alpha: f64,
    is_a: bool,
    n_x: usize,
    n_y: usize,
    dx: f64,
    dy: f64,
    spacing: f64,
    weight_x: f64,
    weight_y: f64,
) -> RayFamily {
    let width = *geom.xcuts.last().unwrap();
    let height = *geom.ycuts.last().unwrap();
    let (sx, sy) = direction_signs(is_a, DIR_FWD);
    let (ux, uy) = (sx * alpha.cos(), sy * alpha.sin());

    let mut tracks = Vec::with_capacity(n_x + n_y);

    // Bottom-edge entries
    for i in 0..n_x {
        let x0 = (i as f64 + 0.5) * dx;
        tracks.push(march(geom, npin_x, x0, 0.0, ux, uy, dx, dy, width, height));
    }
    // Side-edge entries: west for the α family, east for its mirror
    for j in 0..n_y {
        let y0 = (j as f64 + 0.5) * dy;
        let x0 = if is_a { 0.0 } else { width };
        tracks.push(march(geom, npin_x, x0, y0, ux, uy, dx, dy, width, height));
    }

    RayFamily {
        alpha: if is_a {
            alpha
        } else {
            std::f64::consts::PI - alpha
        },
        spacing,
        weight_x,
        weight_y,
        tracks,
    }
}

/// Cell index containing `v`, biased along the travel direction when
/// `v` sits exactly on a cut.
fn locate_dir(cuts: &[f64], v: f64, positive: bool) -> usize {
    let n = cuts.len() - 1;
    for (i, w) in cuts.windows(2).enumerate() {
        if (v - w[0]).abs() < POS_TOL {
            return if positive { i } else { i.saturating_sub(1) };
        }
        if v > w[0] && v < w[1] {
            return i;
        }
    }
    if (v - cuts[n]).abs() < POS_TOL && !positive {
        return n - 1;
    }
    n - 1
}

#[allow(clippy::too_many_arguments)]
fn march(
    geom: &PlaneGeometry,
    npin_x: usize,
    x0: f64,
    y0: f64,
    ux: f64,
    uy: f64,
    dx_slot: f64,
    dy_slot: f64,
    width: f64,
    height: f64,
) -> Track {
    let xcuts = &geom.xcuts;
    let ycuts = &geom.ycuts;
    let fine_nx = geom.fine_nx() as isize;
    let fine_ny = geom.fine_ny() as isize;

    let mut cx = locate_dir(xcuts, x0, ux > 0.0) as isize;
    let mut cy = locate_dir(ycuts, y0, uy > 0.0) as isize;
    let (mut x, mut y) = (x0, y0);

    let entry = entry_edge(x0, y0, width, height, dx_slot, dy_slot);
    let entry_cross = boundary_cross(geom, npin_x, entry.0, cx as usize, cy as usize);

    let mut segments = Vec::new();
    loop {
        let tx = if ux > 0.0 {
            (xcuts[(cx + 1) as usize] - x) / ux
        } else if ux < 0.0 {
            (xcuts[cx as usize] - x) / ux
        } else {
            f64::INFINITY
        };
        let ty = if uy > 0.0 {
            (ycuts[(cy + 1) as usize] - y) / uy
        } else if uy < 0.0 {
            (ycuts[cy as usize] - y) / uy
        } else {
            f64::INFINITY
        };

        let cross_x = tx <= ty + POS_TOL;
        let cross_y = ty <= tx + POS_TOL;
        let t = tx.min(ty);

        let cell = geom.cell(cx as usize, cy as usize);
        let fsr = geom.fsr_of_cell[cell];

        x += t * ux;
        y += t * uy;

        let mut cross = CrossFace::None;
        if cross_x {
            let cut = if ux > 0.0 { cx + 1 } else { cx } as usize;
            if let Some(isx) = geom.xcut_pin_surf[cut] {
                let iy_pin = geom.pin_row_of_fine[cy as usize];
                cross = CrossFace::X(isx + (npin_x + 1) * iy_pin);
            }
            cx += if ux > 0.0 { 1 } else { -1 };
        }
        if cross_y {
            let cut = if uy > 0.0 { cy + 1 } else { cy } as usize;
            if cross == CrossFace::None {
                if let Some(isy) = geom.ycut_pin_surf[cut] {
                    let ix_pin = geom.pin_col_of_fine[cx.clamp(0, fine_nx - 1) as usize];
                    cross = CrossFace::Y(ix_pin + npin_x * isy);
                }
            }
            cy += if uy > 0.0 { 1 } else { -1 };
        }

        segments.push(Segment { fsr, len: t, cross });

        if cx < 0 || cx >= fine_nx || cy < 0 || cy >= fine_ny {
            break;
        }
    }

    let exit = exit_edge(x, y, width, height, dx_slot, dy_slot);
    Track {
        segments,
        entry,
        exit,
        entry_cross,
    }
}

fn entry_edge(
    x0: f64,
    y0: f64,
    width: f64,
    _height: f64,
    dx_slot: f64,
    dy_slot: f64,
) -> (Edge2D, usize) {
    if y0.abs() < POS_TOL {
        (Edge2D::South, (x0 / dx_slot - 0.5).round() as usize)
    } else if x0.abs() < POS_TOL {
        (Edge2D::West, (y0 / dy_slot - 0.5).round() as usize)
    } else if (x0 - width).abs() < POS_TOL {
        (Edge2D::East, (y0 / dy_slot - 0.5).round() as usize)
    } else {
        (Edge2D::North, (x0 / dx_slot - 0.5).round() as usize)
    }
}

fn exit_edge(
    x: f64,
    y: f64,
    width: f64,
    height: f64,
    dx_slot: f64,
    dy_slot: f64,
) -> (Edge2D, usize) {
    if (y - height).abs() < POS_TOL {
        (Edge2D::North, (x / dx_slot - 0.5).round() as usize)
    } else if (x - width).abs() < POS_TOL {
        (Edge2D::East, (y / dy_slot - 0.5).round() as usize)
    } else if x.abs() < POS_TOL {
        (Edge2D::West, (y / dy_slot - 0.5).round() as usize)
    } else {
        (Edge2D::South, (x / dx_slot - 0.5).round() as usize)
    }
}

/// Pin surface coincident with a boundary entry point.
fn boundary_cross(
    geom: &PlaneGeometry,
    npin_x: usize,
    edge: Edge2D,
    cx: usize,
    cy: usize,
) -> CrossFace {
    let npin_y = geom.pin_row_of_fine.last().map(|&r| r + 1).unwrap_or(1);
    match edge {
        Edge2D::West => CrossFace::X((npin_x + 1) * geom.pin_row_of_fine[cy]),
        Edge2D::East => CrossFace::X(npin_x + (npin_x + 1) * geom.pin_row_of_fine[cy]),
        Edge2D::South => CrossFace::Y(geom.pin_col_of_fine[cx]),
        Edge2D::North => CrossFace::Y(geom.pin_col_of_fine[cx] + npin_x * npin_y),
    }
}

fn build_links(
    families: &[RayFamily],
    n_azi: usize,
    bc: [BoundaryCondition; 4],
    fam_offset: &[usize],
) -> Vec<Option<(usize, usize, usize)>> {
    // Endpoint registries per family
    let mut entry_map: Vec<HashMap<(Edge2D, usize), usize>> = Vec::with_capacity(families.len());
    let mut exit_map: Vec<HashMap<(Edge2D, usize), usize>> = Vec::with_capacity(families.len());
    for fam in families {
        let mut em = HashMap::new();
        let mut xm = HashMap::new();
        for (t, track) in fam.tracks.iter().enumerate() {
            em.insert(track.entry, t);
            xm.insert(track.exit, t);
        }
        entry_map.push(em);
        exit_map.push(xm);
    }

    let edge_bc = |edge: Edge2D| match edge {
        Edge2D::West => bc[0],
        Edge2D::East => bc[1],
        Edge2D::South => bc[2],
        Edge2D::North => bc[3],
    };

    let total = *fam_offset.last().unwrap();
    let mut links = vec![None; 2 * total];
    for (f, fam) in families.iter().enumerate() {
        let is_a = f < n_azi;
        let m = if is_a { f } else { f - n_azi };
        for (t, track) in fam.tracks.iter().enumerate() {
            for dir in [DIR_FWD, DIR_BWD] {
                let (edge, slot) = if dir == DIR_FWD { track.exit } else { track.entry };
                if edge_bc(edge) == BoundaryCondition::Vacuum {
                    continue;
                }
                let (sx, sy) = direction_signs(is_a, dir);
                let (rx, ry) = match edge {
                    Edge2D::West | Edge2D::East => (-sx, sy),
                    Edge2D::South | Edge2D::North => (sx, -sy),
                };
                // Reflected sign pattern picks the target family/dir
                let (tf, td) = match (rx > 0.0, ry > 0.0) {
                    (true, true) => (m, DIR_FWD),
                    (false, false) => (m, DIR_BWD),
                    (false, true) => (n_azi + m, DIR_FWD),
                    (true, false) => (n_azi + m, DIR_BWD),
                };
                let registry = if td == DIR_FWD {
                    &entry_map[tf]
                } else {
                    &exit_map[tf]
                };
                match registry.get(&(edge, slot)) {
                    Some(&tt) => {
                        links[2 * (fam_offset[f] + t) + dir] = Some((tf, tt, td));
                    }
                    None => {
                        log::warn!(
                            "Unlinked ray endpoint: family {f}, track {t}, dir {dir} at {edge:?}/{slot}"
                        );
                    }
                }
            }
        }
    }
    links
}

fn build_normalizations(
    families: &[RayFamily],
    geom: &PlaneGeometry,
    npin_x: usize,
    npin_y: usize,
) -> (Vec<Vec<f64>>, Vec<Vec<f64>>, Vec<Vec<f64>>) {
    let n_surf_x = (npin_x + 1) * npin_y;
    let n_surf_y = npin_x * (npin_y + 1);

    let mut vol_corr = Vec::with_capacity(families.len());
    let mut face_x = Vec::with_capacity(families.len());
    let mut face_y = Vec::with_capacity(families.len());

    let mut untraced = 0usize;
    for fam in families {
        let mut acc = vec![0.0; geom.n_reg];
        let mut fx = vec![0.0; n_surf_x];
        let mut fy = vec![0.0; n_surf_y];
        for track in &fam.tracks {
            match track.entry_cross {
                CrossFace::X(s) => fx[s] += fam.weight_x,
                CrossFace::Y(s) => fy[s] += fam.weight_y,
                CrossFace::None => {}
            }
            for seg in &track.segments {
                acc[seg.fsr] += fam.spacing * seg.len;
                match seg.cross {
                    CrossFace::X(s) => fx[s] += fam.weight_x,
                    CrossFace::Y(s) => fy[s] += fam.weight_y,
                    CrossFace::None => {}
                }
            }
        }
        let corr: Vec<f64> = acc
            .iter()
            .zip(&geom.areas)
            .map(|(&a, &area)| {
                if a > 0.0 {
                    area / a
                } else {
                    untraced += 1;
                    0.0
                }
            })
            .collect();
        vol_corr.push(corr);
        face_x.push(fx);
        face_y.push(fy);
    }
    if untraced > 0 {
        log::warn!("{untraced} flat-source regions received no ray segments; refine ray spacing");
    }

    (vol_corr, face_x, face_y)
}
