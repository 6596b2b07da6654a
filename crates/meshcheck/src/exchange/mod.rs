mod csv;

use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::cells::{Cell0D, Cell1D, Cell2D, EntityKind};
use crate::config::{CheckConfig, ParsePolicy};
use crate::error::{LoadError, LoadResult, ParseError};
use crate::mesh::CellMesh;

pub use crate::exchange::csv::{Fields, Record, detect_delimiter};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
// The three tables a mesh is stored in.
pub enum TableKind {
    // vertices: id, marker, x, y
    Cell0D,
    // edges: id, marker, origin, end
    Cell1D,
    // faces: id, marker, vertex count, vertices, edge count, edges
    Cell2D,
}

impl TableKind {
    pub const ALL: [TableKind; 3] = [TableKind::Cell0D, TableKind::Cell1D, TableKind::Cell2D];

    /// Convert a string to a TableKind enum.
    pub fn from_string(s: &str) -> anyhow::Result<Self> {
        // clean up to match 'cell0d', 'Cell0Ds.csv', ' vertices ', etc
        let binding = s.to_ascii_lowercase();
        let clean = binding.trim().trim_end_matches(".csv").trim_end_matches('s');
        match clean {
            "cell0d" | "vertex" | "vertice" | "0" => Ok(TableKind::Cell0D),
            "cell1d" | "edge" | "1" => Ok(TableKind::Cell1D),
            "cell2d" | "face" | "triangle" | "2" => Ok(TableKind::Cell2D),
            _ => Err(anyhow::anyhow!("Unknown mesh table: `{}`", s.trim())),
        }
    }

    /// The kind of entity a row of this table describes.
    pub fn entity(&self) -> EntityKind {
        match self {
            TableKind::Cell0D => EntityKind::Vertex,
            TableKind::Cell1D => EntityKind::Edge,
            TableKind::Cell2D => EntityKind::Face,
        }
    }
}

impl fmt::Display for TableKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.entity().cell_name())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct LoadSource {
    // the header line, which we keep so a table can be written back
    pub header: Option<String>,

    // the separator fields were split on
    pub delimiter: char,

    // the text of each loaded record, in record order
    pub rows: Vec<String>,

    // `\n` or `\r\n`, taken from the header line
    pub line_ending: &'static str,

    // the file the table was read from, if any
    pub path: Option<PathBuf>,
}

impl Default for LoadSource {
    fn default() -> Self {
        Self {
            header: None,
            delimiter: ',',
            rows: Vec::new(),
            line_ending: "\n",
            path: None,
        }
    }
}

impl LoadSource {
    /// The text a record was loaded from, if it still describes the
    /// record at `position` exactly.
    pub fn row<T: Record>(&self, position: usize, record: &T) -> Option<&str> {
        let row = self.rows.get(position)?;
        csv::parse_line::<T>(row, self.delimiter)
            .is_ok_and(|parsed| &parsed == record)
            .then_some(row.as_str())
    }
}

/// The records of one table in file order.
#[derive(Debug, Clone, Default)]
pub struct Table<T> {
    pub records: Vec<T>,

    // records dropped under `ParsePolicy::Skip`
    pub skipped: Vec<ParseError>,

    pub source: LoadSource,
}

/// Parse one table from its text: a header line and one record per line.
///
/// Parameters
/// ------------
/// text
///   The full contents of the table.
/// config
///   Picks the delimiter and what happens to malformed records.
///
/// Returns
/// ------------
/// The parsed table, or an error if the header is missing or a record
/// is malformed under `ParsePolicy::Abort`.
pub fn load_table<T: Record>(text: &str, config: &CheckConfig) -> LoadResult<Table<T>> {
    let mut lines = text.lines();
    let header = lines
        .next()
        .ok_or(LoadError::MissingHeader { table: T::TABLE })?;
    let line_ending = if text[header.len()..].starts_with("\r\n") {
        "\r\n"
    } else {
        "\n"
    };
    let delimiter = config
        .delimiter
        .unwrap_or_else(|| detect_delimiter(header));

    // records don't depend on each other so parse them in parallel,
    // `collect` keeps them in file order
    let parsed: Vec<(usize, &str, Result<T, _>)> = lines
        .enumerate()
        .collect::<Vec<_>>()
        .into_par_iter()
        .filter(|(_, line)| !line.trim().is_empty())
        .map(|(i, line)| (i + 2, line, csv::parse_line::<T>(line, delimiter)))
        .collect();

    let mut records = Vec::with_capacity(parsed.len());
    let mut rows = Vec::with_capacity(parsed.len());
    let mut skipped = Vec::new();
    for (line, text, result) in parsed {
        match result {
            Ok(record) => {
                records.push(record);
                rows.push(text.to_string());
            }
            Err(kind) => {
                let error = ParseError {
                    table: T::TABLE,
                    line,
                    kind,
                };
                if config.parse_policy == ParsePolicy::Abort {
                    return Err(error.into());
                }
                tracing::warn!("skipping record: {error}");
                skipped.push(error);
            }
        }
    }

    tracing::debug!(
        "parsed {} {} records ({} skipped)",
        records.len(),
        T::TABLE,
        skipped.len()
    );

    Ok(Table {
        records,
        skipped,
        source: LoadSource {
            header: Some(header.to_string()),
            delimiter,
            rows,
            line_ending,
            path: None,
        },
    })
}

/// Read and parse one table file.
pub fn load_table_file<T: Record>(path: &Path, config: &CheckConfig) -> LoadResult<Table<T>> {
    let text = fs::read_to_string(path).map_err(|source| LoadError::Open {
        table: T::TABLE,
        path: path.to_path_buf(),
        source,
    })?;
    let mut table = load_table::<T>(&text, config)?;
    table.source.path = Some(path.to_path_buf());
    Ok(table)
}

/// Load a mesh from the three table files in `dir`, named as in
/// `config.files`. Tables are read one after another and the first
/// table that fails stops the load.
pub fn load_mesh_dir(dir: &Path, config: &CheckConfig) -> LoadResult<CellMesh> {
    let vertices = load_table_file::<Cell0D>(&dir.join(&config.files.vertices), config)?;
    let edges = load_table_file::<Cell1D>(&dir.join(&config.files.edges), config)?;
    let faces = load_table_file::<Cell2D>(&dir.join(&config.files.faces), config)?;
    Ok(CellMesh::from_tables(vertices, edges, faces))
}

/// Load a mesh from the text of its three tables.
pub fn load_mesh_str(
    vertices: &str,
    edges: &str,
    faces: &str,
    config: &CheckConfig,
) -> LoadResult<CellMesh> {
    Ok(CellMesh::from_tables(
        load_table::<Cell0D>(vertices, config)?,
        load_table::<Cell1D>(edges, config)?,
        load_table::<Cell2D>(faces, config)?,
    ))
}

/// Write records in the layout they were parsed from, one per line.
///
/// A record that is unchanged since loading is written as the exact text
/// it was read from, so number formatting and spacing survive. Records
/// built or edited in code are formatted from their fields.
pub fn write_table<T: Record>(records: &[T], source: &LoadSource) -> String {
    let delimiter = source.delimiter.to_string();
    let mut out = String::new();
    if let Some(header) = &source.header {
        out.push_str(header);
        out.push_str(source.line_ending);
    }
    for (position, record) in records.iter().enumerate() {
        match source.row(position, record) {
            Some(row) => out.push_str(row),
            None => out.push_str(&record.to_fields().join(&delimiter)),
        }
        out.push_str(source.line_ending);
    }
    out
}

/// Write one of the tables of a mesh back to text.
pub fn write_mesh_table(mesh: &CellMesh, table: TableKind) -> String {
    let source = mesh.source(table);
    match table {
        TableKind::Cell0D => write_table(&mesh.vertices, source),
        TableKind::Cell1D => write_table(&mesh.edges, source),
        TableKind::Cell2D => write_table(&mesh.faces, source),
    }
}
