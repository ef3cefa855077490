//! Edge collapse simplification
//!
//! Implements iterative edge collapse mesh simplification using a half-edge
//! data structure for efficient topology operations and quadric error metrics
//! (QEM) for error-driven edge prioritization.

use crate::quadric_error::{
    optimal_position, plane_quadric, quadric_error, triangle_plane, triangle_quality,
};
use crate::{DecimationParams, MeshSimplifier};
use nalgebra::Matrix4;
use priority_queue::PriorityQueue;
use std::cmp::Ordering;
use std::collections::{HashMap, HashSet};
use meshpost_core::{Error, Point3f, Result, TriangleMesh, Vector3f};
use tracing::debug;

const INVALID: usize = usize::MAX;

/// Collapses are re-queued when their cost grew by more than this factor
/// since they were queued.
const STALE_COST_RATIO: f64 = 1.0 + 1e-6;

/// Keeps zero-error collapses ordered by triangle quality.
const QUALITY_COST_FLOOR: f64 = 1e-12;

// ============================================================
// Half-Edge Data Structure
// ============================================================

#[derive(Debug, Clone)]
struct HalfEdge {
    target: usize,
    twin: usize,
    next: usize,
    prev: usize,
    face: usize,
}

/// Half-edge mesh for topology-aware edge collapse operations.
struct HalfEdgeMesh {
    half_edges: Vec<HalfEdge>,
    /// One outgoing half-edge per vertex (INVALID if removed or isolated)
    vertex_edge: Vec<usize>,
    /// One half-edge per face (INVALID if removed)
    face_edge: Vec<usize>,
    active_face_count: usize,
    positions: Vec<Point3f>,
    normals: Option<Vec<Vector3f>>,
    colors: Option<Vec<[u8; 3]>>,
    quadrics: Vec<Matrix4<f64>>,
    vertex_removed: Vec<bool>,
}

impl HalfEdgeMesh {
    fn from_triangle_mesh(mesh: &TriangleMesh) -> Self {
        let nv = mesh.vertices.len();
        let nf = mesh.faces.len();

        let mut half_edges = Vec::with_capacity(nf * 3);
        let mut vertex_edge = vec![INVALID; nv];
        let mut face_edge = Vec::with_capacity(nf);

        for (fi, face) in mesh.faces.iter().enumerate() {
            let base = fi * 3;
            for j in 0..3usize {
                half_edges.push(HalfEdge {
                    target: face[(j + 1) % 3],
                    twin: INVALID,
                    next: base + (j + 1) % 3,
                    prev: base + (j + 2) % 3,
                    face: fi,
                });
                if vertex_edge[face[j]] == INVALID {
                    vertex_edge[face[j]] = base + j;
                }
            }
            face_edge.push(base);
        }

        // Build twin pointers
        let mut edge_map: HashMap<(usize, usize), usize> = HashMap::with_capacity(nf * 3);
        for (he_idx, he) in half_edges.iter().enumerate() {
            let src = half_edges[he.prev].target;
            edge_map.insert((src, he.target), he_idx);
        }
        for he_idx in 0..half_edges.len() {
            if half_edges[he_idx].twin != INVALID {
                continue;
            }
            let src = half_edges[half_edges[he_idx].prev].target;
            let tgt = half_edges[he_idx].target;
            if let Some(&twin_idx) = edge_map.get(&(tgt, src)) {
                if half_edges[twin_idx].twin == INVALID && twin_idx != he_idx {
                    half_edges[he_idx].twin = twin_idx;
                    half_edges[twin_idx].twin = he_idx;
                }
            }
        }

        let mut hem = HalfEdgeMesh {
            half_edges,
            vertex_edge,
            face_edge,
            active_face_count: nf,
            positions: mesh.vertices.clone(),
            normals: mesh.normals.clone(),
            colors: mesh.colors.clone(),
            quadrics: vec![Matrix4::zeros(); nv],
            vertex_removed: vec![false; nv],
        };
        hem.initialize_quadrics();
        hem
    }

    #[inline]
    fn source(&self, he: usize) -> usize {
        self.half_edges[self.half_edges[he].prev].target
    }

    fn initialize_quadrics(&mut self) {
        for fi in 0..self.face_edge.len() {
            if self.face_edge[fi] == INVALID {
                continue;
            }
            let [v0, v1, v2] = self.face_vertices(fi);
            let plane =
                triangle_plane(&self.positions[v0], &self.positions[v1], &self.positions[v2]);
            let q = plane_quadric(&plane);
            self.quadrics[v0] += q;
            self.quadrics[v1] += q;
            self.quadrics[v2] += q;
        }
    }

    fn face_vertices(&self, face: usize) -> [usize; 3] {
        let he0 = self.face_edge[face];
        let he1 = self.half_edges[he0].next;
        [
            self.source(he0),
            self.half_edges[he0].target,
            self.half_edges[he1].target,
        ]
    }

    /// Get all outgoing half-edges from a vertex (handles boundary vertices).
    fn outgoing_half_edges(&self, v: usize) -> Vec<usize> {
        let start = self.vertex_edge[v];
        if start == INVALID {
            return vec![];
        }

        // Non-manifold fans may never cycle back to `start`
        let limit = self.half_edges.len();
        let mut result = Vec::new();
        let mut current = start;

        // Rotate counterclockwise: current.prev.twin
        loop {
            result.push(current);
            if result.len() > limit {
                return result;
            }
            let prev = self.half_edges[current].prev;
            let twin = self.half_edges[prev].twin;
            if twin == INVALID {
                break;
            }
            current = twin;
            if current == start {
                return result;
            }
        }

        // Boundary: also rotate clockwise from start via twin.next
        let twin_of_start = self.half_edges[start].twin;
        if twin_of_start != INVALID {
            let mut current = self.half_edges[twin_of_start].next;
            loop {
                if current == start || result.len() > limit {
                    break;
                }
                result.push(current);
                let twin = self.half_edges[current].twin;
                if twin == INVALID {
                    break;
                }
                current = self.half_edges[twin].next;
            }
        }

        result
    }

    fn incident_faces(&self, v: usize) -> Vec<usize> {
        self.outgoing_half_edges(v)
            .iter()
            .map(|&he| self.half_edges[he].face)
            .filter(|&f| f != INVALID)
            .collect()
    }

    fn neighbors(&self, v: usize) -> HashSet<usize> {
        let mut result = HashSet::new();
        for he in self.outgoing_half_edges(v) {
            result.insert(self.half_edges[he].target);
            // The previous vertex closes the fan on boundary vertices
            result.insert(self.source(self.half_edges[he].prev));
        }
        result.remove(&v);
        result
    }

    fn is_boundary_vertex(&self, v: usize) -> bool {
        for &he in &self.outgoing_half_edges(v) {
            if self.half_edges[he].twin == INVALID {
                return true;
            }
            if self.half_edges[self.half_edges[he].prev].twin == INVALID {
                return true;
            }
        }
        false
    }

    /// Check the link condition: common neighbors must equal exactly the
    /// face apices opposite the edge (2 for interior, 1 for boundary).
    fn check_link_condition(&self, v1: usize, v2: usize) -> bool {
        let n1 = self.neighbors(v1);
        let n2 = self.neighbors(v2);
        let common_count = n1.intersection(&n2).count();

        let h = match self.find_half_edge(v1, v2) {
            Some(h) => h,
            None => return false,
        };
        let is_boundary = self.half_edges[h].twin == INVALID;
        let expected = if is_boundary { 1 } else { 2 };
        common_count == expected
    }

    /// Apices opposite the edge whose valence would drop below three,
    /// folding a closed component (e.g. a tetrahedron) flat.
    fn collapse_folds_apex(&self, v1: usize, v2: usize) -> bool {
        let h = match self.find_half_edge(v1, v2) {
            Some(h) => h,
            None => return true,
        };
        let mut apices = vec![self.half_edges[self.half_edges[h].next].target];
        let twin = self.half_edges[h].twin;
        if twin != INVALID {
            apices.push(self.half_edges[self.half_edges[twin].next].target);
        }
        apices
            .into_iter()
            .any(|c| !self.is_boundary_vertex(c) && self.neighbors(c).len() <= 3)
    }

    fn find_half_edge(&self, from: usize, to: usize) -> Option<usize> {
        self.outgoing_half_edges(from)
            .into_iter()
            .find(|&he| self.half_edges[he].target == to)
    }

    fn compute_collapse_cost(&self, v1: usize, v2: usize) -> (Point3f, f64) {
        let q = self.quadrics[v1] + self.quadrics[v2];
        let optimal = optimal_position(&q, &self.positions[v1], &self.positions[v2]);
        let cost = quadric_error(&q, &optimal);
        (optimal, cost)
    }

    /// Faces that survive collapsing (v1, v2), with their vertices after the
    /// merged vertex moves to `new_pos`, alongside their current vertices.
    fn surviving_faces(
        &self,
        v1: usize,
        v2: usize,
        new_pos: &Point3f,
    ) -> Vec<([Point3f; 3], [Point3f; 3])> {
        let mut seen = HashSet::new();
        let mut result = Vec::new();
        for v in [v1, v2] {
            for f in self.incident_faces(v) {
                if !seen.insert(f) {
                    continue;
                }
                let vs = self.face_vertices(f);
                if vs.contains(&v1) && vs.contains(&v2) {
                    continue;
                }
                let before = vs.map(|x| self.positions[x]);
                let after = vs.map(|x| if x == v1 || x == v2 { *new_pos } else { self.positions[x] });
                result.push((before, after));
            }
        }
        result
    }

    /// Collapse edge (v1, v2), merging v2 into v1 at new_pos.
    /// Returns true on success.
    fn collapse_edge(&mut self, v1: usize, v2: usize, new_pos: Point3f) -> bool {
        let h = match self.find_half_edge(v1, v2) {
            Some(h) => h,
            None => return false,
        };

        let h_twin = self.half_edges[h].twin;
        let h_next = self.half_edges[h].next;
        let h_prev = self.half_edges[h].prev;
        let face_a = self.half_edges[h].face;
        let h_next_twin = self.half_edges[h_next].twin;
        let h_prev_twin = self.half_edges[h_prev].twin;
        let c = self.half_edges[h_next].target;

        let (face_b, ht_next, ht_prev, ht_next_twin, ht_prev_twin, d) = if h_twin != INVALID {
            let hn = self.half_edges[h_twin].next;
            let hp = self.half_edges[h_twin].prev;
            (
                self.half_edges[h_twin].face,
                hn,
                hp,
                self.half_edges[hn].twin,
                self.half_edges[hp].twin,
                self.half_edges[hn].target,
            )
        } else {
            (INVALID, INVALID, INVALID, INVALID, INVALID, INVALID)
        };

        // Collect v2 outgoing edges BEFORE any modifications
        let v2_outgoing = self.outgoing_half_edges(v2);

        // Re-pair twins for face A border edges
        if h_next_twin != INVALID {
            self.half_edges[h_next_twin].twin = h_prev_twin;
        }
        if h_prev_twin != INVALID {
            self.half_edges[h_prev_twin].twin = h_next_twin;
        }

        // Mark face A as removed
        self.half_edges[h].face = INVALID;
        self.half_edges[h_next].face = INVALID;
        self.half_edges[h_prev].face = INVALID;
        self.face_edge[face_a] = INVALID;
        self.active_face_count -= 1;

        // Handle face B
        if face_b != INVALID {
            if ht_next_twin != INVALID {
                self.half_edges[ht_next_twin].twin = ht_prev_twin;
            }
            if ht_prev_twin != INVALID {
                self.half_edges[ht_prev_twin].twin = ht_next_twin;
            }
            self.half_edges[h_twin].face = INVALID;
            self.half_edges[ht_next].face = INVALID;
            self.half_edges[ht_prev].face = INVALID;
            self.face_edge[face_b] = INVALID;
            self.active_face_count -= 1;
        }

        // Redirect all v2 references to v1
        for &he in &v2_outgoing {
            let prev = self.half_edges[he].prev;
            self.half_edges[prev].target = v1;

            let twin = self.half_edges[he].twin;
            if twin != INVALID && self.half_edges[twin].face != INVALID {
                self.half_edges[twin].target = v1;
            }
        }

        // Fix vertex_edge pointers for v1
        if self.half_edges[self.vertex_edge[v1]].face == INVALID {
            if h_prev_twin != INVALID && self.half_edges[h_prev_twin].face != INVALID {
                self.vertex_edge[v1] = h_prev_twin;
            } else {
                self.vertex_edge[v1] = self.find_valid_outgoing(v1);
            }
        }

        // Fix vertex_edge for c
        if c != INVALID
            && self.vertex_edge[c] != INVALID
            && self.half_edges[self.vertex_edge[c]].face == INVALID
        {
            if h_next_twin != INVALID && self.half_edges[h_next_twin].face != INVALID {
                self.vertex_edge[c] = h_next_twin;
            } else {
                self.vertex_edge[c] = self.find_valid_outgoing(c);
            }
        }

        // Fix vertex_edge for d
        if d != INVALID
            && d != c
            && self.vertex_edge[d] != INVALID
            && self.half_edges[self.vertex_edge[d]].face == INVALID
        {
            if ht_next_twin != INVALID && self.half_edges[ht_next_twin].face != INVALID {
                self.vertex_edge[d] = ht_next_twin;
            } else {
                self.vertex_edge[d] = self.find_valid_outgoing(d);
            }
        }

        // Mark v2 as removed
        self.vertex_edge[v2] = INVALID;
        self.vertex_removed[v2] = true;

        // Update position and quadric for v1
        let v2_quadric = self.quadrics[v2];
        self.positions[v1] = new_pos;
        self.quadrics[v1] += v2_quadric;

        // Interpolate normals
        if let Some(ref mut normals) = self.normals {
            let avg = (normals[v1] + normals[v2]).normalize();
            if avg.iter().all(|x| x.is_finite()) {
                normals[v1] = avg;
            }
        }

        // Interpolate colors
        if let Some(ref mut colors) = self.colors {
            let c1 = colors[v1];
            let c2 = colors[v2];
            colors[v1] = [
                ((c1[0] as u16 + c2[0] as u16) / 2) as u8,
                ((c1[1] as u16 + c2[1] as u16) / 2) as u8,
                ((c1[2] as u16 + c2[2] as u16) / 2) as u8,
            ];
        }

        true
    }

    /// Find any valid outgoing half-edge from a vertex (linear scan fallback).
    fn find_valid_outgoing(&self, v: usize) -> usize {
        for (i, he) in self.half_edges.iter().enumerate() {
            if he.face != INVALID && self.source(i) == v {
                return i;
            }
        }
        INVALID
    }

    /// Export surviving geometry. With `autoclean`, vertices no longer
    /// referenced by any face are dropped as well as collapsed ones.
    fn to_triangle_mesh(&self, autoclean: bool) -> TriangleMesh {
        let mut old_to_new = vec![INVALID; self.positions.len()];
        let mut new_positions = Vec::new();
        let mut new_normals = self.normals.as_ref().map(|_| Vec::new());
        let mut new_colors = self.colors.as_ref().map(|_| Vec::new());

        for (i, &removed) in self.vertex_removed.iter().enumerate() {
            if removed || (autoclean && self.vertex_edge[i] == INVALID) {
                continue;
            }
            old_to_new[i] = new_positions.len();
            new_positions.push(self.positions[i]);
            if let (Some(out), Some(normals)) = (new_normals.as_mut(), self.normals.as_ref()) {
                out.push(normals[i]);
            }
            if let (Some(out), Some(colors)) = (new_colors.as_mut(), self.colors.as_ref()) {
                out.push(colors[i]);
            }
        }

        let mut new_faces = Vec::with_capacity(self.active_face_count);
        for fi in 0..self.face_edge.len() {
            if self.face_edge[fi] == INVALID {
                continue;
            }
            let [v0, v1, v2] = self.face_vertices(fi).map(|v| old_to_new[v]);
            if v0 == INVALID || v1 == INVALID || v2 == INVALID {
                continue;
            }
            if v0 != v1 && v1 != v2 && v2 != v0 {
                new_faces.push([v0, v1, v2]);
            }
        }

        let mut mesh = TriangleMesh::from_vertices_and_faces(new_positions, new_faces);
        if let Some(normals) = new_normals {
            mesh.set_normals(normals);
        }
        if let Some(colors) = new_colors {
            mesh.set_colors(colors);
        }
        mesh
    }
}

// ============================================================
// Edge Cost for Priority Queue
// ============================================================

#[derive(Debug, Clone)]
struct EdgeCost {
    v1: usize,
    v2: usize,
    cost: f64,
}

impl PartialEq for EdgeCost {
    fn eq(&self, other: &Self) -> bool {
        self.cost.total_cmp(&other.cost) == Ordering::Equal
    }
}
impl Eq for EdgeCost {}

impl PartialOrd for EdgeCost {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for EdgeCost {
    fn cmp(&self, other: &Self) -> Ordering {
        // Min-heap: smallest cost first
        other.cost.total_cmp(&self.cost)
    }
}

// ============================================================
// Edge Collapse Simplifier
// ============================================================

/// Edge collapse mesh simplifier using half-edge data structure and QEM.
///
/// This simplifier builds a half-edge mesh for efficient local topology
/// queries (neighbor iteration, boundary detection, link condition checks)
/// and uses quadric error metrics to prioritize edge collapses. The policy
/// knobs live in [`DecimationParams`].
#[derive(Debug, Clone, Default)]
pub struct EdgeCollapseSimplifier {
    pub params: DecimationParams,
}

impl EdgeCollapseSimplifier {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_params(params: DecimationParams) -> Self {
        Self { params }
    }

    /// Cost of collapsing (v1, v2), or `None` when the collapse is not
    /// allowed under the current policy.
    fn evaluate(&self, hem: &HalfEdgeMesh, v1: usize, v2: usize) -> Option<(Point3f, f64)> {
        let p = &self.params;
        let touches_boundary = hem.is_boundary_vertex(v1) || hem.is_boundary_vertex(v2);
        if p.preserve_boundary && touches_boundary {
            return None;
        }

        let (pos, mut cost) = hem.compute_collapse_cost(v1, v2);
        // Only reachable when boundaries may move
        if touches_boundary {
            cost += p.boundary_weight;
        }

        let faces = hem.surviving_faces(v1, v2, &pos);

        if p.preserve_normal {
            for (before, after) in &faces {
                let n_before = (before[1] - before[0]).cross(&(before[2] - before[0]));
                let n_after = (after[1] - after[0]).cross(&(after[2] - after[0]));
                if n_after.norm_squared() <= f32::EPSILON * f32::EPSILON {
                    return None;
                }
                if n_before.dot(&n_after) <= 0.0 {
                    return None;
                }
            }
        }

        if p.quality_threshold > 0.0 {
            let min_quality = faces
                .iter()
                .map(|(_, after)| triangle_quality(&after[0], &after[1], &after[2]))
                .fold(1.0f64, f64::min);
            let clamped = min_quality.clamp(1e-6, p.quality_threshold);
            cost = (cost + QUALITY_COST_FLOOR) * (p.quality_threshold / clamped);
        }

        Some((pos, cost))
    }

    /// Build the priority queue of edge collapse candidates.
    fn build_queue(&self, hem: &HalfEdgeMesh, next_id: &mut usize) -> PriorityQueue<usize, EdgeCost> {
        let mut queue = PriorityQueue::new();
        let mut seen_edges: HashSet<(usize, usize)> = HashSet::new();

        for vi in 0..hem.positions.len() {
            if hem.vertex_removed[vi] || hem.vertex_edge[vi] == INVALID {
                continue;
            }
            for &he in &hem.outgoing_half_edges(vi) {
                if hem.half_edges[he].face == INVALID {
                    continue;
                }
                let target = hem.half_edges[he].target;
                let key = (vi.min(target), vi.max(target));
                if !seen_edges.insert(key) {
                    continue;
                }

                if let Some((_, cost)) = self.evaluate(hem, vi, target) {
                    queue.push(
                        *next_id,
                        EdgeCost {
                            v1: vi,
                            v2: target,
                            cost,
                        },
                    );
                    *next_id += 1;
                }
            }
        }

        queue
    }
}

impl MeshSimplifier for EdgeCollapseSimplifier {
    fn simplify(&self, mesh: &TriangleMesh, target_face_count: usize) -> Result<TriangleMesh> {
        if mesh.is_empty() {
            return Err(Error::InvalidData("Mesh is empty".to_string()));
        }
        if target_face_count == 0 {
            return Err(Error::InvalidData(
                "Target face count must be positive".to_string(),
            ));
        }
        mesh.validate()?;

        let mut hem = HalfEdgeMesh::from_triangle_mesh(mesh);
        if hem.active_face_count <= target_face_count {
            debug!(
                faces = hem.active_face_count,
                target_faces = target_face_count,
                "mesh already within target face count"
            );
            return Ok(hem.to_triangle_mesh(self.params.autoclean));
        }

        let mut next_id = 0usize;
        let mut queue = self.build_queue(&hem, &mut next_id);
        let mut collapse_count = 0usize;

        while hem.active_face_count > target_face_count {
            let (_, edge_cost) = match queue.pop() {
                Some(item) => item,
                None => break,
            };

            if let Some(threshold) = self.params.error_threshold {
                if edge_cost.cost > threshold {
                    break;
                }
            }

            let v1 = edge_cost.v1;
            let v2 = edge_cost.v2;

            // Validate: both vertices still alive and still neighbors
            if hem.vertex_removed[v1]
                || hem.vertex_removed[v2]
                || hem.vertex_edge[v1] == INVALID
                || hem.vertex_edge[v2] == INVALID
            {
                continue;
            }

            if hem.find_half_edge(v1, v2).is_none() {
                continue;
            }

            // Collapsing across a non-manifold link would corrupt the
            // half-edge structure
            if !hem.check_link_condition(v1, v2) {
                continue;
            }
            if self.params.preserve_topology && hem.collapse_folds_apex(v1, v2) {
                continue;
            }

            // Recompute cost (may have changed since queuing)
            let (pos, cost) = match self.evaluate(&hem, v1, v2) {
                Some(evaluated) => evaluated,
                None => continue,
            };
            if cost > edge_cost.cost * STALE_COST_RATIO + QUALITY_COST_FLOOR {
                queue.push(next_id, EdgeCost { v1, v2, cost });
                next_id += 1;
                continue;
            }

            if hem.collapse_edge(v1, v2, pos) {
                collapse_count += 1;

                // Periodically rebuild queue for accuracy
                if collapse_count % 100 == 0 {
                    queue = self.build_queue(&hem, &mut next_id);
                }
            }
        }

        let result = hem.to_triangle_mesh(self.params.autoclean);
        debug!(
            collapses = collapse_count,
            faces_before = mesh.face_count(),
            faces_after = result.face_count(),
            target_faces = target_face_count,
            "edge collapse finished"
        );
        Ok(result)
    }
}
