//! Defects found in a mesh and the report collecting them.

use std::fmt;

use serde::Serialize;

use crate::cells::{CellId, EntityKind, Marker};
use crate::error::ParseError;

/// What is wrong with the entity a defect names.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type")]
pub enum Violation {
    /// The marker is outside of the accepted range.
    MarkerRange { marker: Marker },
    /// Another record of the same table already uses this id.
    DuplicateId,
    /// A reference to an id missing from the `target` table.
    OutOfRangeReference { target: EntityKind },
    /// Two consecutive face vertices coincide.
    ZeroLength { length: f64 },
    /// The first three vertices of a face don't span an area.
    ZeroArea { area: f64 },
    /// A face needs three vertices for an area.
    TooFewVertices { count: usize },
    /// A record that could not be parsed and was skipped.
    Parse { line: usize, message: String },
}

/// One violation of a mesh invariant.
///
/// `ids` are keys of the entity named by `kind`:
/// - `Vertex`, `Edge`, `Face`: the cell id, followed by the bad reference for
///   `OutOfRangeReference`
/// - `EdgePair`: the two vertex ids
/// - `Triangle`: the three vertex ids
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Defect {
    pub kind: EntityKind,
    pub ids: Vec<CellId>,
    pub violation: Violation,
}

impl Defect {
    pub fn new(kind: EntityKind, ids: Vec<CellId>, violation: Violation) -> Self {
        Self {
            kind,
            ids,
            violation,
        }
    }

    pub fn marker_range(kind: EntityKind, id: CellId, marker: Marker) -> Self {
        Self::new(kind, vec![id], Violation::MarkerRange { marker })
    }

    pub fn duplicate_id(kind: EntityKind, id: CellId) -> Self {
        Self::new(kind, vec![id], Violation::DuplicateId)
    }

    pub fn unresolved(kind: EntityKind, id: CellId, target: EntityKind, reference: CellId) -> Self {
        Self::new(
            kind,
            vec![id, reference],
            Violation::OutOfRangeReference { target },
        )
    }

    pub fn zero_length(a: CellId, b: CellId, length: f64) -> Self {
        Self::new(EntityKind::EdgePair, vec![a, b], Violation::ZeroLength { length })
    }

    pub fn zero_area(corners: [CellId; 3], area: f64) -> Self {
        Self::new(
            EntityKind::Triangle,
            corners.to_vec(),
            Violation::ZeroArea { area },
        )
    }

    pub fn too_few_vertices(face: CellId, count: usize) -> Self {
        Self::new(
            EntityKind::Face,
            vec![face],
            Violation::TooFewVertices { count },
        )
    }

    pub fn parse(error: &ParseError) -> Self {
        Self::new(
            error.table.entity(),
            vec![],
            Violation::Parse {
                line: error.line,
                message: error.kind.to_string(),
            },
        )
    }
}

impl fmt::Display for Defect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let cell = self.kind.cell_name();
        let id = |i: usize| self.ids.get(i).copied().unwrap_or_default();
        match &self.violation {
            Violation::MarkerRange { .. } => write!(f, "Invalid marker for {cell} with ID {}", id(0)),
            Violation::DuplicateId => write!(f, "Duplicate ID {} in {cell} table", id(0)),
            Violation::OutOfRangeReference { target } => write!(
                f,
                "{cell} with ID {} references missing {} {}",
                id(0),
                target.cell_name(),
                id(1)
            ),
            Violation::ZeroLength { .. } => write!(
                f,
                "Edge between vertices {} and {} has zero length.",
                id(0),
                id(1)
            ),
            Violation::ZeroArea { .. } => write!(
                f,
                "Triangle with vertices {}, {}, {} has zero area.",
                id(0),
                id(1),
                id(2)
            ),
            Violation::TooFewVertices { count } => write!(
                f,
                "{cell} with ID {} has {count} vertices, an area needs at least 3.",
                id(0)
            ),
            Violation::Parse { line, message } => {
                write!(f, "Skipped {cell} record on line {line}: {message}")
            }
        }
    }
}

/// Counts of what a validation run looked at.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct Checked {
    pub vertices: usize,
    pub edges: usize,
    pub faces: usize,
    pub edge_pairs: usize,
    pub triangles: usize,
}

/// Every defect found in a mesh, in the order the checks ran.
#[derive(Debug, Clone, Default, Serialize)]
pub struct Report {
    pub checked: Checked,
    defects: Vec<Defect>,
}

impl Report {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, defect: Defect) {
        self.defects.push(defect);
    }

    pub fn is_clean(&self) -> bool {
        self.defects.is_empty()
    }

    pub fn len(&self) -> usize {
        self.defects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.defects.is_empty()
    }

    pub fn defects(&self) -> &[Defect] {
        &self.defects
    }

    /// Defects attributed to one kind of entity.
    pub fn of_kind(&self, kind: EntityKind) -> impl Iterator<Item = &Defect> {
        self.defects.iter().filter(move |d| d.kind == kind)
    }

    /// Serialize to a JSON string.
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}

impl Extend<Defect> for Report {
    fn extend<I: IntoIterator<Item = Defect>>(&mut self, iter: I) {
        self.defects.extend(iter);
    }
}

impl IntoIterator for Report {
    type Item = Defect;
    type IntoIter = std::vec::IntoIter<Defect>;

    fn into_iter(self) -> Self::IntoIter {
        self.defects.into_iter()
    }
}
