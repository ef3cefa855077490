//! Edge-connected face components

use meshpost_core::TriangleMesh;
use std::collections::HashMap;

/// Face adjacency through shared edges.
///
/// Every pair of faces sharing an undirected edge is linked, including the
/// faces of non-manifold edges.
#[derive(Debug, Clone)]
pub struct FaceAdjacency {
    adjacent: Vec<Vec<usize>>,
}

impl FaceAdjacency {
    pub fn from_mesh(mesh: &TriangleMesh) -> Self {
        let mut edge_to_faces: HashMap<(usize, usize), Vec<usize>> = HashMap::new();
        for (face_idx, face) in mesh.faces.iter().enumerate() {
            for i in 0..3 {
                let v0 = face[i];
                let v1 = face[(i + 1) % 3];
                if v0 == v1 {
                    continue;
                }
                let edge = if v0 < v1 { (v0, v1) } else { (v1, v0) };
                edge_to_faces.entry(edge).or_default().push(face_idx);
            }
        }

        let mut adjacent: Vec<Vec<usize>> = vec![Vec::new(); mesh.faces.len()];
        for faces in edge_to_faces.values() {
            for (i, &f0) in faces.iter().enumerate() {
                for &f1 in &faces[i + 1..] {
                    if f0 != f1 {
                        adjacent[f0].push(f1);
                        adjacent[f1].push(f0);
                    }
                }
            }
        }
        for list in &mut adjacent {
            list.sort_unstable();
            list.dedup();
        }

        Self { adjacent }
    }

    pub fn neighbors(&self, face_idx: usize) -> &[usize] {
        self.adjacent.get(face_idx).map_or(&[], Vec::as_slice)
    }

    pub fn face_count(&self) -> usize {
        self.adjacent.len()
    }

    /// Label every face with its component id. Ids are assigned in order of
    /// each component's lowest face index.
    ///
    /// Returns `(labels, component_sizes)`.
    pub fn component_labels(&self) -> (Vec<usize>, Vec<usize>) {
        let mut labels = vec![usize::MAX; self.adjacent.len()];
        let mut sizes = Vec::new();
        let mut stack = Vec::new();

        for start in 0..self.adjacent.len() {
            if labels[start] != usize::MAX {
                continue;
            }
            let id = sizes.len();
            let mut size = 0usize;
            labels[start] = id;
            stack.push(start);

            while let Some(face) = stack.pop() {
                size += 1;
                for &neighbor in &self.adjacent[face] {
                    if labels[neighbor] == usize::MAX {
                        labels[neighbor] = id;
                        stack.push(neighbor);
                    }
                }
            }
            sizes.push(size);
        }

        (labels, sizes)
    }
}

/// Faces belonging to components with fewer than `face_ratio * total_faces`
/// faces.
pub fn small_component_faces(mesh: &TriangleMesh, face_ratio: f64) -> Vec<usize> {
    let adjacency = FaceAdjacency::from_mesh(mesh);
    let (labels, sizes) = adjacency.component_labels();
    let threshold = face_ratio * mesh.face_count() as f64;

    labels
        .iter()
        .enumerate()
        .filter(|(_, &label)| (sizes[label] as f64) < threshold)
        .map(|(face, _)| face)
        .collect()
}
