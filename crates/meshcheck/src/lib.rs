//! Load a 2D polygonal mesh stored as three tables of cells and check it
//! for the usual defects: bad markers, dangling references, zero length
//! edges and zero area triangles.
//!
//! ```no_run
//! use std::path::Path;
//! use meshcheck::{CheckConfig, load_mesh_dir, validate};
//!
//! let config = CheckConfig::default();
//! let mesh = load_mesh_dir(Path::new("mesh"), &config)?;
//! for defect in validate(&mesh, &config).defects() {
//!     eprintln!("Error: {defect}");
//! }
//! # Ok::<(), meshcheck::LoadError>(())
//! ```

pub mod cells;
pub mod config;
pub mod error;
pub mod exchange;
pub mod geometry;
pub mod mesh;
pub mod report;
pub mod validate;

pub use cells::{Cell0D, Cell1D, Cell2D, CellId, EntityKind, Marker};
pub use config::{CheckConfig, ParsePolicy, TableFiles};
pub use error::{ConfigError, LoadError, ParseError, ParseErrorKind};
pub use exchange::{TableKind, load_mesh_dir, load_mesh_str, write_mesh_table};
pub use mesh::CellMesh;
pub use report::{Defect, Report, Violation};
pub use validate::validate;
