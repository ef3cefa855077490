//! Topology cleanup on session meshes
//!
//! Each pass returns the number of elements it removed and keeps the
//! selection masks aligned with the compacted geometry.

use crate::session_mesh::SessionMesh;
use std::collections::HashMap;
use std::collections::HashSet;

/// Totals reported by [`clean`]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CleanupSummary {
    pub duplicate_vertices: usize,
    pub degenerate_faces: usize,
    pub duplicate_faces: usize,
    pub unreferenced_vertices: usize,
}

impl CleanupSummary {
    pub fn had_changes(&self) -> bool {
        self.duplicate_vertices
            + self.degenerate_faces
            + self.duplicate_faces
            + self.unreferenced_vertices
            > 0
    }
}

/// Remove faces with a repeated vertex index or zero area
pub fn remove_degenerate_faces(mesh: &mut SessionMesh) -> usize {
    let vertices = &mesh.mesh().vertices;
    let keep_faces: Vec<bool> = mesh
        .mesh()
        .faces
        .iter()
        .map(|&[a, b, c]| {
            if a == b || b == c || c == a {
                return false;
            }
            let e1 = vertices[b] - vertices[a];
            let e2 = vertices[c] - vertices[a];
            e1.cross(&e2).norm_squared() > 0.0
        })
        .collect();
    let keep_vertices = vec![true; mesh.vertex_count()];
    mesh.retain(&keep_faces, &keep_vertices).0
}

/// Remove faces spanning the same vertex set as an earlier face,
/// regardless of winding or starting vertex
pub fn remove_duplicate_faces(mesh: &mut SessionMesh) -> usize {
    let mut seen: HashSet<[usize; 3]> = HashSet::new();
    let keep_faces: Vec<bool> = mesh
        .mesh()
        .faces
        .iter()
        .map(|face| {
            let mut key = *face;
            key.sort_unstable();
            seen.insert(key)
        })
        .collect();
    let keep_vertices = vec![true; mesh.vertex_count()];
    mesh.retain(&keep_faces, &keep_vertices).0
}

/// Merge vertices with bit-identical positions into their first occurrence
pub fn remove_duplicate_vertices(mesh: &mut SessionMesh) -> usize {
    let mut first: HashMap<[u32; 3], usize> = HashMap::new();
    let remap: Vec<usize> = mesh
        .mesh()
        .vertices
        .iter()
        .enumerate()
        .map(|(i, p)| {
            // +0.0 folds negative zero onto zero
            let key = [(p.x + 0.0).to_bits(), (p.y + 0.0).to_bits(), (p.z + 0.0).to_bits()];
            *first.entry(key).or_insert(i)
        })
        .collect();

    let duplicates = remap.iter().enumerate().filter(|&(i, &r)| i != r).count();
    if duplicates == 0 {
        return 0;
    }

    mesh.remap_faces(&remap);
    let keep_vertices: Vec<bool> = remap.iter().enumerate().map(|(i, &r)| i == r).collect();
    let keep_faces = vec![true; mesh.face_count()];
    mesh.retain(&keep_faces, &keep_vertices).1
}

/// Remove vertices no face references
pub fn remove_unreferenced_vertices(mesh: &mut SessionMesh) -> usize {
    let mut referenced = vec![false; mesh.vertex_count()];
    for face in &mesh.mesh().faces {
        for &v in face {
            referenced[v] = true;
        }
    }
    if referenced.iter().all(|&r| r) {
        return 0;
    }
    let keep_faces = vec![true; mesh.face_count()];
    mesh.retain(&keep_faces, &referenced).1
}

/// Run every cleanup pass: merge duplicate vertices, then drop degenerate
/// and duplicate faces, then unreferenced vertices.
pub fn clean(mesh: &mut SessionMesh) -> CleanupSummary {
    let duplicate_vertices = remove_duplicate_vertices(mesh);
    let degenerate_faces = remove_degenerate_faces(mesh);
    let duplicate_faces = remove_duplicate_faces(mesh);
    let unreferenced_vertices = remove_unreferenced_vertices(mesh);
    CleanupSummary {
        duplicate_vertices,
        degenerate_faces,
        duplicate_faces,
        unreferenced_vertices,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use meshpost_core::{Point3f, TriangleMesh};

    fn session(vertices: Vec<Point3f>, faces: Vec<[usize; 3]>) -> SessionMesh {
        SessionMesh::new("test", TriangleMesh::from_vertices_and_faces(vertices, faces))
    }

    #[test]
    fn test_remove_degenerate_faces() {
        let mut sm = session(
            vec![
                Point3f::new(0.0, 0.0, 0.0),
                Point3f::new(1.0, 0.0, 0.0),
                Point3f::new(0.0, 1.0, 0.0),
                Point3f::new(2.0, 0.0, 0.0),
            ],
            // valid, repeated index, collinear
            vec![[0, 1, 2], [0, 0, 2], [0, 1, 3]],
        );
        assert_eq!(remove_degenerate_faces(&mut sm), 2);
        assert_eq!(sm.mesh().faces, vec![[0, 1, 2]]);
        assert_eq!(sm.vertex_count(), 4);
    }

    #[test]
    fn test_remove_duplicate_faces_any_winding() {
        let mut sm = session(
            vec![
                Point3f::new(0.0, 0.0, 0.0),
                Point3f::new(1.0, 0.0, 0.0),
                Point3f::new(0.0, 1.0, 0.0),
            ],
            vec![[0, 1, 2], [1, 2, 0], [2, 1, 0]],
        );
        assert_eq!(remove_duplicate_faces(&mut sm), 2);
        assert_eq!(sm.face_count(), 1);
    }

    #[test]
    fn test_remove_duplicate_vertices_merges_positions() {
        let mut sm = session(
            vec![
                Point3f::new(0.0, 0.0, 0.0),
                Point3f::new(1.0, 0.0, 0.0),
                Point3f::new(0.0, 1.0, 0.0),
                Point3f::new(1.0, 0.0, 0.0),
                Point3f::new(1.0, 1.0, 0.0),
                Point3f::new(-0.0, 1.0, 0.0),
            ],
            vec![[0, 1, 2], [3, 4, 5]],
        );
        assert_eq!(remove_duplicate_vertices(&mut sm), 2);
        assert_eq!(sm.vertex_count(), 4);
        assert_eq!(sm.mesh().faces, vec![[0, 1, 2], [1, 3, 2]]);
    }

    #[test]
    fn test_remove_unreferenced_vertices() {
        let mut sm = session(
            vec![
                Point3f::new(9.0, 9.0, 9.0),
                Point3f::new(0.0, 0.0, 0.0),
                Point3f::new(1.0, 0.0, 0.0),
                Point3f::new(0.0, 1.0, 0.0),
            ],
            vec![[1, 2, 3]],
        );
        assert_eq!(remove_unreferenced_vertices(&mut sm), 1);
        assert_eq!(sm.mesh().faces, vec![[0, 1, 2]]);
        assert_eq!(remove_unreferenced_vertices(&mut sm), 0);
    }

    #[test]
    fn test_clean_runs_all_passes() {
        let mut sm = session(
            vec![
                Point3f::new(0.0, 0.0, 0.0),
                Point3f::new(1.0, 0.0, 0.0),
                Point3f::new(0.0, 1.0, 0.0),
                Point3f::new(0.0, 0.0, 0.0),
                Point3f::new(5.0, 5.0, 5.0),
            ],
            // Face 1 duplicates face 0 once vertex 3 merges into vertex 0
            vec![[0, 1, 2], [3, 1, 2], [0, 3, 1]],
        );
        let summary = clean(&mut sm);
        assert_eq!(
            summary,
            CleanupSummary {
                duplicate_vertices: 1,
                degenerate_faces: 1,
                duplicate_faces: 1,
                unreferenced_vertices: 1,
            }
        );
        assert!(summary.had_changes());
        assert_eq!(sm.vertex_count(), 3);
        assert_eq!(sm.face_count(), 1);
    }
}
