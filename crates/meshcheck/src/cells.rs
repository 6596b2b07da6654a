use itertools::Itertools;
use nalgebra::Point2;
use serde::{Deserialize, Serialize};

/// The integer key every cell is referenced by.
pub type CellId = i64;

/// A classification tag carried by every cell, typically the boundary
/// region the cell lies on.
pub type Marker = i64;

/// A mesh vertex.
#[derive(Debug, Clone, PartialEq)]
pub struct Cell0D {
    pub id: CellId,
    pub marker: Marker,
    pub point: Point2<f64>,
}

/// A mesh edge between two vertices referenced by id.
#[derive(Debug, Clone, PartialEq)]
pub struct Cell1D {
    pub id: CellId,
    pub marker: Marker,
    pub origin: CellId,
    pub end: CellId,
}

/// A polygonal mesh face.
#[derive(Debug, Clone, PartialEq)]
pub struct Cell2D {
    pub id: CellId,
    pub marker: Marker,
    // vertex ids in boundary order
    pub vertices: Vec<CellId>,
    // edge ids, not required to follow `vertices`
    pub edges: Vec<CellId>,
}

impl Cell2D {
    pub fn num_vertices(&self) -> usize {
        self.vertices.len()
    }

    pub fn num_edges(&self) -> usize {
        self.edges.len()
    }

    /// The pairs of vertex ids along the boundary of the face, including
    /// the pair closing the loop from the last vertex back to the first.
    ///
    /// A face with `n` vertices yields exactly `n` pairs.
    pub fn boundary(&self) -> impl Iterator<Item = (CellId, CellId)> + '_ {
        self.vertices
            .iter()
            .copied()
            .circular_tuple_windows::<(_, _)>()
    }

    /// The first three vertex ids, which is the whole face for a triangle.
    pub fn corners(&self) -> Option<[CellId; 3]> {
        match self.vertices.as_slice() {
            [a, b, c, ..] => Some([*a, *b, *c]),
            _ => None,
        }
    }
}

/// The kinds of entities a defect may be attributed to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EntityKind {
    Vertex,
    Edge,
    Face,
    // a pair of consecutive face vertices
    EdgePair,
    // the first three vertices of a face
    Triangle,
}

impl EntityKind {
    /// The name the mesh tables use for this kind of cell.
    pub fn cell_name(&self) -> &'static str {
        match self {
            EntityKind::Vertex => "Cell0D",
            EntityKind::Edge | EntityKind::EdgePair => "Cell1D",
            EntityKind::Face | EntityKind::Triangle => "Cell2D",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn face(vertices: Vec<CellId>) -> Cell2D {
        Cell2D {
            id: 0,
            marker: 0,
            edges: vec![],
            vertices,
        }
    }

    #[test]
    fn test_boundary_wraps() {
        let pairs: Vec<_> = face(vec![4, 5, 6]).boundary().collect();
        assert_eq!(pairs, vec![(4, 5), (5, 6), (6, 4)]);

        let pairs: Vec<_> = face(vec![1, 2, 3, 4]).boundary().collect();
        assert_eq!(pairs.len(), 4);
        assert_eq!(pairs[3], (4, 1));

        assert_eq!(face(vec![]).boundary().count(), 0);
    }

    #[test]
    fn test_corners() {
        assert_eq!(face(vec![0, 1, 2]).corners(), Some([0, 1, 2]));
        // quads only use the first three
        assert_eq!(face(vec![3, 2, 1, 0]).corners(), Some([3, 2, 1]));
        assert_eq!(face(vec![0, 1]).corners(), None);
    }

    #[test]
    fn test_cell_names() {
        assert_eq!(EntityKind::Vertex.cell_name(), "Cell0D");
        assert_eq!(EntityKind::Edge.cell_name(), "Cell1D");
        assert_eq!(EntityKind::Triangle.cell_name(), "Cell2D");
    }
}
