//! Sanity checks over a loaded mesh.
//!
//! Every check only reads the mesh and returns what it found, none of them
//! stop at the first defect. `validate` runs all of them in order:
//! - skipped records from loading
//! - markers within the configured range
//! - ids unique in their table
//! - every reference resolves
//! - no zero length edges along face boundaries
//! - no zero area triangles

use std::ops::RangeInclusive;

use crate::cells::{CellId, EntityKind, Marker};
use crate::config::CheckConfig;
use crate::exchange::TableKind;
use crate::geometry::{segment_length, triangle_area};
use crate::mesh::CellMesh;
use crate::report::{Checked, Defect, Report};

/// Run every check over `mesh`.
pub fn validate(mesh: &CellMesh, config: &CheckConfig) -> Report {
    let mut report = Report::new();

    report.extend(mesh.skipped.iter().map(Defect::parse));
    report.extend(check_markers(mesh, config.marker_range()));
    report.extend(check_identities(mesh));
    report.extend(check_references(mesh));

    let (lengths, edge_pairs) = check_edge_lengths(mesh, config.zero_tolerance);
    report.extend(lengths);
    let (areas, triangles) = check_triangle_areas(mesh, config.zero_tolerance);
    report.extend(areas);

    report.checked = Checked {
        vertices: mesh.vertices.len(),
        edges: mesh.edges.len(),
        faces: mesh.faces.len(),
        edge_pairs,
        triangles,
    };

    tracing::info!(
        "checked {} vertices, {} edges, {} faces: {} defects",
        mesh.vertices.len(),
        mesh.edges.len(),
        mesh.faces.len(),
        report.len()
    );

    report
}

/// Every vertex, edge and face whose marker is outside of `range`,
/// in table order.
pub fn check_markers(mesh: &CellMesh, range: RangeInclusive<Marker>) -> Vec<Defect> {
    let vertices = mesh.vertices.iter().map(|v| (EntityKind::Vertex, v.id, v.marker));
    let edges = mesh.edges.iter().map(|e| (EntityKind::Edge, e.id, e.marker));
    let faces = mesh.faces.iter().map(|f| (EntityKind::Face, f.id, f.marker));

    vertices
        .chain(edges)
        .chain(faces)
        .filter(|(_, _, marker)| !range.contains(marker))
        .map(|(kind, id, marker)| Defect::marker_range(kind, id, marker))
        .collect()
}

/// Ids used by more than one record of the same table.
pub fn check_identities(mesh: &CellMesh) -> Vec<Defect> {
    TableKind::ALL
        .into_iter()
        .flat_map(|table| {
            mesh.lookup(table)
                .duplicates()
                .iter()
                .map(|id| Defect::duplicate_id(table.entity(), *id))
                .collect::<Vec<_>>()
        })
        .collect()
}

/// References from edges and faces that don't resolve to a record,
/// one defect per occurrence.
pub fn check_references(mesh: &CellMesh) -> Vec<Defect> {
    let vertices = mesh.vertex_lookup();
    let edges = mesh.edge_lookup();
    let mut defects = Vec::new();

    for edge in mesh.edges.iter() {
        for end in [edge.origin, edge.end] {
            if !vertices.contains(end) {
                defects.push(Defect::unresolved(
                    EntityKind::Edge,
                    edge.id,
                    EntityKind::Vertex,
                    end,
                ));
            }
        }
    }

    for face in mesh.faces.iter() {
        for vertex in face.vertices.iter().filter(|v| !vertices.contains(**v)) {
            defects.push(Defect::unresolved(
                EntityKind::Face,
                face.id,
                EntityKind::Vertex,
                *vertex,
            ));
        }
        for edge in face.edges.iter().filter(|e| !edges.contains(**e)) {
            defects.push(Defect::unresolved(
                EntityKind::Face,
                face.id,
                EntityKind::Edge,
                *edge,
            ));
        }
    }

    defects
}

/// Consecutive face vertices, including the pair closing each face, that
/// are no further apart than `tolerance`.
///
/// Returns the defects and the number of vertex pairs measured. Pairs with
/// a vertex that doesn't resolve are left to `check_references`.
pub fn check_edge_lengths(mesh: &CellMesh, tolerance: f64) -> (Vec<Defect>, usize) {
    let mut defects = Vec::new();
    let mut measured = 0;

    for face in mesh.faces.iter() {
        for (a, b) in face.boundary() {
            let (Some(pa), Some(pb)) = (mesh.point(a), mesh.point(b)) else {
                continue;
            };
            measured += 1;
            let length = segment_length(pa, pb);
            if length <= tolerance {
                defects.push(Defect::zero_length(a, b, length));
            }
        }
    }

    (defects, measured)
}

/// Faces whose first three vertices span no more than `tolerance` area.
///
/// Faces with more than three vertices are judged by their first three
/// only. Faces with fewer get a `TooFewVertices` defect instead.
///
/// Returns the defects and the number of triangles measured.
pub fn check_triangle_areas(mesh: &CellMesh, tolerance: f64) -> (Vec<Defect>, usize) {
    let mut defects = Vec::new();
    let mut measured = 0;

    for face in mesh.faces.iter() {
        let Some(corners) = face.corners() else {
            defects.push(Defect::too_few_vertices(face.id, face.num_vertices()));
            continue;
        };
        let Some([a, b, c]) = resolve_corners(mesh, corners) else {
            continue;
        };
        measured += 1;
        let area = triangle_area(a, b, c);
        if area <= tolerance {
            defects.push(Defect::zero_area(corners, area));
        }
    }

    (defects, measured)
}

fn resolve_corners(
    mesh: &CellMesh,
    [a, b, c]: [CellId; 3],
) -> Option<[&nalgebra::Point2<f64>; 3]> {
    Some([mesh.point(a)?, mesh.point(b)?, mesh.point(c)?])
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cells::{Cell0D, Cell1D, Cell2D};
    use crate::report::Violation;
    use approx::relative_eq;
    use nalgebra::Point2;

    fn vertex(id: CellId, marker: Marker, x: f64, y: f64) -> Cell0D {
        Cell0D {
            id,
            marker,
            point: Point2::new(x, y),
        }
    }

    fn edge(id: CellId, origin: CellId, end: CellId) -> Cell1D {
        Cell1D {
            id,
            marker: 0,
            origin,
            end,
        }
    }

    fn face(id: CellId, vertices: Vec<CellId>, edges: Vec<CellId>) -> Cell2D {
        Cell2D {
            id,
            marker: 0,
            vertices,
            edges,
        }
    }

    fn unit_triangle() -> CellMesh {
        CellMesh::new(
            vec![
                vertex(0, 0, 0.0, 0.0),
                vertex(1, 0, 1.0, 0.0),
                vertex(2, 0, 0.0, 1.0),
            ],
            vec![edge(0, 0, 1), edge(1, 1, 2), edge(2, 2, 0)],
            vec![face(0, vec![0, 1, 2], vec![0, 1, 2])],
        )
    }

    #[test]
    fn test_markers_in_range() {
        let mut mesh = unit_triangle();
        for marker in 0..=8 {
            mesh.vertices[0].marker = marker;
            mesh.edges[0].marker = marker;
            mesh.faces[0].marker = marker;
            assert!(check_markers(&mesh, 0..=8).is_empty());
        }
    }

    #[test]
    fn test_markers_out_of_range() {
        for (marker, kind) in [
            (-1, EntityKind::Vertex),
            (9, EntityKind::Edge),
            (100, EntityKind::Face),
        ] {
            let mut mesh = unit_triangle();
            match kind {
                EntityKind::Vertex => mesh.vertices[2].marker = marker,
                EntityKind::Edge => mesh.edges[2].marker = marker,
                _ => mesh.faces[0].marker = marker,
            }
            let defects = check_markers(&mesh, 0..=8);
            let id = if kind == EntityKind::Face { 0 } else { 2 };
            assert_eq!(defects, vec![Defect::marker_range(kind, id, marker)]);
        }

        // the range is configurable
        let mut mesh = unit_triangle();
        mesh.vertices[1].marker = 5;
        assert_eq!(check_markers(&mesh, 0..=4).len(), 1);
    }

    #[test]
    fn test_identities() {
        assert!(check_identities(&unit_triangle()).is_empty());

        // ids are cached on first lookup so set them up front
        let mut mesh = unit_triangle();
        mesh.edges[2].id = 1;
        assert_eq!(
            check_identities(&mesh),
            vec![Defect::duplicate_id(EntityKind::Edge, 1)]
        );
    }

    #[test]
    fn test_references() {
        let mut mesh = unit_triangle();
        assert!(check_references(&mesh).is_empty());

        mesh.edges[1].end = 7;
        mesh.faces[0].vertices = vec![0, 1, -2];
        mesh.faces[0].edges = vec![0, 1, 3];
        assert_eq!(
            check_references(&mesh),
            vec![
                Defect::unresolved(EntityKind::Edge, 1, EntityKind::Vertex, 7),
                Defect::unresolved(EntityKind::Face, 0, EntityKind::Vertex, -2),
                Defect::unresolved(EntityKind::Face, 0, EntityKind::Edge, 3),
            ]
        );
    }

    #[test]
    fn test_edge_lengths_every_pair() {
        // a quad whose last vertex sits on the first
        let mesh = CellMesh::new(
            vec![
                vertex(0, 0, 0.0, 0.0),
                vertex(1, 0, 1.0, 0.0),
                vertex(2, 0, 1.0, 1.0),
                vertex(3, 0, 0.0, 0.0),
            ],
            vec![],
            vec![face(0, vec![0, 1, 2, 3], vec![])],
        );
        let (defects, measured) = check_edge_lengths(&mesh, 0.0);
        // four pairs including the wrap around
        assert_eq!(measured, 4);
        assert_eq!(defects, vec![Defect::zero_length(3, 0, 0.0)]);
    }

    #[test]
    fn test_edge_lengths_repeated_reference() {
        let mesh = CellMesh::new(
            vec![vertex(0, 0, 0.0, 0.0), vertex(1, 0, 1.0, 0.0)],
            vec![],
            vec![face(0, vec![0, 1, 1], vec![])],
        );
        let (defects, _) = check_edge_lengths(&mesh, 0.0);
        assert_eq!(defects, vec![Defect::zero_length(1, 1, 0.0)]);
    }

    #[test]
    fn test_edge_lengths_tolerance() {
        let mut mesh = unit_triangle();
        mesh.vertices[1].point = Point2::new(1e-9, 0.0);
        // exact comparison by default
        assert!(check_edge_lengths(&mesh, 0.0).0.is_empty());
        let (defects, _) = check_edge_lengths(&mesh, 1e-6);
        assert_eq!(defects.len(), 1);
        assert_eq!(defects[0].ids, vec![0, 1]);
    }

    #[test]
    fn test_edge_lengths_skip_unresolved() {
        let mut mesh = unit_triangle();
        mesh.faces[0].vertices = vec![0, 1, 42];
        let (defects, measured) = check_edge_lengths(&mesh, 0.0);
        assert!(defects.is_empty());
        assert_eq!(measured, 1);
    }

    #[test]
    fn test_area_collinear() {
        let mesh = CellMesh::new(
            vec![
                vertex(0, 0, 0.0, 0.0),
                vertex(1, 0, 1.0, 1.0),
                vertex(2, 0, 2.0, 2.0),
            ],
            vec![],
            vec![face(3, vec![0, 1, 2], vec![])],
        );
        let (defects, measured) = check_triangle_areas(&mesh, 0.0);
        assert_eq!(measured, 1);
        assert_eq!(defects, vec![Defect::zero_area([0, 1, 2], 0.0)]);
    }

    #[test]
    fn test_area_uses_first_three() {
        // the quad has area but its first three corners are collinear
        let mesh = CellMesh::new(
            vec![
                vertex(0, 0, 0.0, 0.0),
                vertex(1, 0, 1.0, 0.0),
                vertex(2, 0, 2.0, 0.0),
                vertex(3, 0, 1.0, 1.0),
            ],
            vec![],
            vec![face(0, vec![0, 1, 2, 3], vec![])],
        );
        let (defects, _) = check_triangle_areas(&mesh, 0.0);
        assert_eq!(defects.len(), 1);
        assert_eq!(defects[0].ids, vec![0, 1, 2]);
    }

    #[test]
    fn test_area_too_few_vertices() {
        let mut mesh = unit_triangle();
        mesh.faces[0].vertices = vec![0, 1];
        let (defects, measured) = check_triangle_areas(&mesh, 0.0);
        assert_eq!(measured, 0);
        assert_eq!(defects, vec![Defect::too_few_vertices(0, 2)]);
    }

    #[test]
    fn test_validate_clean() {
        let mesh = unit_triangle();
        let report = validate(&mesh, &CheckConfig::default());
        assert!(report.is_clean(), "{:?}", report.defects());
        assert_eq!(report.checked.edge_pairs, 3);
        assert_eq!(report.checked.triangles, 1);
    }

    #[test]
    fn test_validate_order() {
        let mut mesh = unit_triangle();
        mesh.vertices[1].point = Point2::new(0.0, 0.0);
        mesh.vertices[2].marker = 9;
        let report = validate(&mesh, &CheckConfig::default());

        let violations: Vec<_> = report.defects().iter().map(|d| &d.violation).collect();
        assert!(matches!(violations[0], Violation::MarkerRange { marker: 9 }));
        assert!(matches!(violations[1], Violation::ZeroLength { .. }));
        assert!(matches!(violations[2], Violation::ZeroArea { .. }));
        assert_eq!(report.len(), 3);

        // the area is still reported as measured
        if let Violation::ZeroArea { area } = violations[2] {
            assert!(relative_eq!(*area, 0.0));
        }
    }
}
