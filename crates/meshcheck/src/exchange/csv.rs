use std::str::Split;

use nalgebra::Point2;

use crate::cells::{Cell0D, Cell1D, Cell2D};
use crate::error::ParseErrorKind;
use crate::exchange::TableKind;

// delimiters we look for in a header line, in order of preference
const DELIMITERS: [char; 4] = [',', ';', '\t', '|'];

/// Pick the field separator used by a header line, defaulting to a comma.
pub fn detect_delimiter(header: &str) -> char {
    DELIMITERS
        .into_iter()
        .find(|d| header.contains(*d))
        .unwrap_or(',')
}

/// A cursor over the delimited fields of one line. Fields are consumed
/// strictly in order and surrounding whitespace is ignored.
pub struct Fields<'a> {
    parts: Split<'a, char>,
}

impl<'a> Fields<'a> {
    pub fn new(line: &'a str, delimiter: char) -> Self {
        Self {
            parts: line.split(delimiter),
        }
    }

    fn next_str(&mut self, field: &'static str) -> Result<&'a str, ParseErrorKind> {
        self.parts
            .next()
            .map(str::trim)
            .ok_or(ParseErrorKind::MissingField { field })
    }

    pub fn int(&mut self, field: &'static str) -> Result<i64, ParseErrorKind> {
        let raw = self.next_str(field)?;
        raw.parse().map_err(|_| ParseErrorKind::InvalidInteger {
            field,
            value: raw.to_string(),
        })
    }

    /// Read a finite real. `inf` and `NaN` are refused along with
    /// anything too large to represent.
    pub fn real(&mut self, field: &'static str) -> Result<f64, ParseErrorKind> {
        let raw = self.next_str(field)?;
        raw.parse::<f64>()
            .ok()
            .filter(|value| value.is_finite())
            .ok_or_else(|| ParseErrorKind::InvalidReal {
                field,
                value: raw.to_string(),
            })
    }

    pub fn count(&mut self, field: &'static str) -> Result<usize, ParseErrorKind> {
        let value = self.int(field)?;
        usize::try_from(value).map_err(|_| ParseErrorKind::NegativeCount { field, value })
    }

    /// Read `n` integers in a row, as declared by a preceding count.
    pub fn ints(&mut self, n: usize, field: &'static str) -> Result<Vec<i64>, ParseErrorKind> {
        // don't trust `n` for an allocation, the line may be much shorter
        (0..n).map(|_| self.int(field)).collect()
    }

    /// Make sure the line is used up. A single empty field is allowed so
    /// lines may end with a delimiter.
    pub fn finish(mut self) -> Result<(), ParseErrorKind> {
        let rest: Vec<&str> = self.parts.by_ref().collect();
        match rest.as_slice() {
            [] => Ok(()),
            [last] if last.trim().is_empty() => Ok(()),
            _ => Err(ParseErrorKind::TrailingFields { count: rest.len() }),
        }
    }
}

/// A row type of one of the mesh tables.
pub trait Record: Sized + Send + PartialEq {
    /// The table these records are stored in.
    const TABLE: TableKind;

    /// Parse the fields of one line.
    fn parse(fields: &mut Fields<'_>) -> Result<Self, ParseErrorKind>;

    /// The fields of this record in table order.
    fn to_fields(&self) -> Vec<String>;
}

/// Parse a complete line into a record, rejecting leftover fields.
pub(crate) fn parse_line<T: Record>(line: &str, delimiter: char) -> Result<T, ParseErrorKind> {
    let mut fields = Fields::new(line, delimiter);
    let record = T::parse(&mut fields)?;
    fields.finish()?;
    Ok(record)
}

impl Record for Cell0D {
    const TABLE: TableKind = TableKind::Cell0D;

    fn parse(fields: &mut Fields<'_>) -> Result<Self, ParseErrorKind> {
        let id = fields.int("id")?;
        let marker = fields.int("marker")?;
        let x = fields.real("x")?;
        let y = fields.real("y")?;
        Ok(Cell0D {
            id,
            marker,
            point: Point2::new(x, y),
        })
    }

    fn to_fields(&self) -> Vec<String> {
        vec![
            self.id.to_string(),
            self.marker.to_string(),
            self.point.x.to_string(),
            self.point.y.to_string(),
        ]
    }
}

impl Record for Cell1D {
    const TABLE: TableKind = TableKind::Cell1D;

    fn parse(fields: &mut Fields<'_>) -> Result<Self, ParseErrorKind> {
        Ok(Cell1D {
            id: fields.int("id")?,
            marker: fields.int("marker")?,
            origin: fields.int("origin")?,
            end: fields.int("end")?,
        })
    }

    fn to_fields(&self) -> Vec<String> {
        vec![
            self.id.to_string(),
            self.marker.to_string(),
            self.origin.to_string(),
            self.end.to_string(),
        ]
    }
}

impl Record for Cell2D {
    const TABLE: TableKind = TableKind::Cell2D;

    fn parse(fields: &mut Fields<'_>) -> Result<Self, ParseErrorKind> {
        let id = fields.int("id")?;
        let marker = fields.int("marker")?;
        // both lists are prefixed by their length
        let num_vertices = fields.count("num_vertices")?;
        let vertices = fields.ints(num_vertices, "vertex")?;
        let num_edges = fields.count("num_edges")?;
        let edges = fields.ints(num_edges, "edge")?;
        Ok(Cell2D {
            id,
            marker,
            vertices,
            edges,
        })
    }

    fn to_fields(&self) -> Vec<String> {
        let mut out = Vec::with_capacity(4 + self.vertices.len() + self.edges.len());
        out.push(self.id.to_string());
        out.push(self.marker.to_string());
        out.push(self.vertices.len().to_string());
        out.extend(self.vertices.iter().map(|v| v.to_string()));
        out.push(self.edges.len().to_string());
        out.extend(self.edges.iter().map(|e| e.to_string()));
        out
    }
}
