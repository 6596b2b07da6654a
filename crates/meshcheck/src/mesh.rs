use std::sync::{Arc, PoisonError, RwLock};

use ahash::AHashMap;
use meshcheck_macro::cache_access;
use nalgebra::Point2;

use crate::cells::{Cell0D, Cell1D, Cell2D, CellId};
use crate::error::ParseError;
use crate::exchange::{LoadSource, Table, TableKind};

/// Maps the ids of one table to positions in it.
#[derive(Debug, Clone, Default)]
pub struct IdLookup {
    index: AHashMap<CellId, usize>,
    // ids seen more than once, in the order the repeats appear
    duplicates: Vec<CellId>,
}

impl IdLookup {
    /// Build from ids in table order. The first record with an id wins.
    pub fn new(ids: impl IntoIterator<Item = CellId>) -> Self {
        let mut lookup = Self::default();
        for (position, id) in ids.into_iter().enumerate() {
            if lookup.index.contains_key(&id) {
                lookup.duplicates.push(id);
            } else {
                lookup.index.insert(id, position);
            }
        }
        lookup
    }

    pub fn get(&self, id: CellId) -> Option<usize> {
        self.index.get(&id).copied()
    }

    pub fn contains(&self, id: CellId) -> bool {
        self.index.contains_key(&id)
    }

    pub fn duplicates(&self) -> &[CellId] {
        &self.duplicates
    }
}

// The inner cache for the CellMesh struct. Any method that uses
// the `#[cache_access]` macro will be stored here.
#[derive(Default, Debug, Clone)]
pub struct InnerCache {
    pub vertex_lookup: Option<Arc<IdLookup>>,
    pub edge_lookup: Option<Arc<IdLookup>>,
    pub face_lookup: Option<Arc<IdLookup>>,
}

/// A 2D polygonal mesh as three tables of cells tied together by id.
#[derive(Default, Debug)]
pub struct CellMesh {
    pub vertices: Vec<Cell0D>,
    pub edges: Vec<Cell1D>,
    pub faces: Vec<Cell2D>,

    // where each table came from, in `TableKind` order
    pub sources: [LoadSource; 3],

    // records that were dropped while loading
    pub skipped: Vec<ParseError>,

    // the cached values computed for the mesh, the tables must not
    // change once anything has been looked up
    pub _cache: RwLock<InnerCache>,
}

impl Clone for CellMesh {
    fn clone(&self) -> Self {
        let cache = self._cache.read().unwrap_or_else(PoisonError::into_inner);
        Self {
            vertices: self.vertices.clone(),
            edges: self.edges.clone(),
            faces: self.faces.clone(),
            sources: self.sources.clone(),
            skipped: self.skipped.clone(),
            _cache: RwLock::new(cache.clone()),
        }
    }
}

impl CellMesh {
    /// Create a mesh from records that didn't come from a file.
    pub fn new(vertices: Vec<Cell0D>, edges: Vec<Cell1D>, faces: Vec<Cell2D>) -> Self {
        Self {
            vertices,
            edges,
            faces,
            ..Default::default()
        }
    }

    /// Assemble a mesh from loaded tables, keeping their sources and
    /// any records they skipped.
    pub fn from_tables(vertices: Table<Cell0D>, edges: Table<Cell1D>, faces: Table<Cell2D>) -> Self {
        let skipped = vertices
            .skipped
            .into_iter()
            .chain(edges.skipped)
            .chain(faces.skipped)
            .collect();

        Self {
            vertices: vertices.records,
            edges: edges.records,
            faces: faces.records,
            sources: [vertices.source, edges.source, faces.source],
            skipped,
            _cache: RwLock::new(InnerCache::default()),
        }
    }

    pub fn source(&self, table: TableKind) -> &LoadSource {
        match table {
            TableKind::Cell0D => &self.sources[0],
            TableKind::Cell1D => &self.sources[1],
            TableKind::Cell2D => &self.sources[2],
        }
    }

    /// The number of records in a table.
    pub fn len(&self, table: TableKind) -> usize {
        match table {
            TableKind::Cell0D => self.vertices.len(),
            TableKind::Cell1D => self.edges.len(),
            TableKind::Cell2D => self.faces.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.vertices.is_empty() && self.edges.is_empty() && self.faces.is_empty()
    }

    /// Vertex ids to positions in `self.vertices`.
    #[cache_access]
    pub fn vertex_lookup(&self) -> Arc<IdLookup> {
        Arc::new(IdLookup::new(self.vertices.iter().map(|v| v.id)))
    }

    /// Edge ids to positions in `self.edges`.
    #[cache_access]
    pub fn edge_lookup(&self) -> Arc<IdLookup> {
        Arc::new(IdLookup::new(self.edges.iter().map(|e| e.id)))
    }

    /// Face ids to positions in `self.faces`.
    #[cache_access]
    pub fn face_lookup(&self) -> Arc<IdLookup> {
        Arc::new(IdLookup::new(self.faces.iter().map(|f| f.id)))
    }

    /// The lookup for the ids of one table.
    pub fn lookup(&self, table: TableKind) -> Arc<IdLookup> {
        match table {
            TableKind::Cell0D => self.vertex_lookup(),
            TableKind::Cell1D => self.edge_lookup(),
            TableKind::Cell2D => self.face_lookup(),
        }
    }

    /// Resolve a vertex reference.
    pub fn vertex(&self, id: CellId) -> Option<&Cell0D> {
        self.vertex_lookup().get(id).and_then(|i| self.vertices.get(i))
    }

    /// Resolve an edge reference.
    pub fn edge(&self, id: CellId) -> Option<&Cell1D> {
        self.edge_lookup().get(id).and_then(|i| self.edges.get(i))
    }

    /// Resolve a face by id.
    pub fn face(&self, id: CellId) -> Option<&Cell2D> {
        self.face_lookup().get(id).and_then(|i| self.faces.get(i))
    }

    /// The coordinates of a referenced vertex.
    pub fn point(&self, id: CellId) -> Option<&Point2<f64>> {
        self.vertex(id).map(|v| &v.point)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn vertex(id: CellId, x: f64, y: f64) -> Cell0D {
        Cell0D {
            id,
            marker: 0,
            point: Point2::new(x, y),
        }
    }

    fn triangle() -> CellMesh {
        CellMesh::new(
            // ids deliberately don't match positions
            vec![vertex(10, 0.0, 0.0), vertex(11, 1.0, 0.0), vertex(12, 0.0, 2.0)],
            vec![Cell1D {
                id: 5,
                marker: 0,
                origin: 10,
                end: 11,
            }],
            vec![Cell2D {
                id: 0,
                marker: 0,
                vertices: vec![10, 11, 12],
                edges: vec![5],
            }],
        )
    }

    #[test]
    fn test_lookup_by_id() {
        let mesh = triangle();
        assert_eq!(mesh.point(12), Some(&Point2::new(0.0, 2.0)));
        assert!(mesh.vertex(0).is_none());
        assert!(mesh.vertex(-1).is_none());
        assert_eq!(mesh.edge(5).map(|e| e.origin), Some(10));
        assert!(mesh.edge(0).is_none());
        assert_eq!(mesh.face(0).map(|f| f.num_vertices()), Some(3));
    }

    #[test]
    fn test_lookup_cached() {
        let mesh = triangle();
        let a = mesh.vertex_lookup();
        let b = mesh.vertex_lookup();
        // the second call hands out the cached value
        assert!(Arc::ptr_eq(&a, &b));
        assert!(mesh._cache.read().unwrap().vertex_lookup.is_some());
        assert!(mesh._cache.read().unwrap().face_lookup.is_none());

        // clones carry the cache along
        let copy = mesh.clone();
        assert!(Arc::ptr_eq(&a, &copy.vertex_lookup()));
    }

    #[test]
    fn test_duplicate_ids() {
        let lookup = IdLookup::new([3, 4, 3, 5, 4, 3]);
        assert_eq!(lookup.get(3), Some(0));
        assert_eq!(lookup.get(4), Some(1));
        assert_eq!(lookup.get(5), Some(3));
        assert_eq!(lookup.duplicates(), &[3, 4, 3]);
        assert!(!lookup.contains(6));
    }

    #[test]
    fn test_shrunk_table_after_lookup() {
        let mut mesh = triangle();
        assert!(mesh.vertex(12).is_some());
        // the cached positions now point past the end of the table
        mesh.vertices.truncate(1);
        mesh.faces.clear();
        assert!(mesh.vertex(12).is_none());
        assert!(mesh.point(11).is_none());
        assert_eq!(mesh.vertex(10).map(|v| v.id), Some(10));
        assert!(mesh.face(0).is_none());
    }

    #[test]
    fn test_sizes() {
        let mesh = triangle();
        assert_eq!(mesh.len(TableKind::Cell0D), 3);
        assert_eq!(mesh.len(TableKind::Cell1D), 1);
        assert_eq!(mesh.len(TableKind::Cell2D), 1);
        assert!(!mesh.is_empty());
        assert!(CellMesh::default().is_empty());
    }
}
