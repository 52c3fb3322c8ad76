// Allow unused_assignments lint for error struct fields that are used in thiserror Display macros
// but appear as "never read" to the compiler.
#![allow(unused_assignments)]

//! Error types for distance field generation with rich diagnostics.
//!
//! Each error carries a machine-readable code in the format `SDF-XXXX`:
//! - `SDF-1xxx`: input errors (file reading, parsing, mesh shape)
//! - `SDF-2xxx`: grid errors (invalid parameters, memory limits)
//! - `SDF-3xxx`: output errors (template filling, writing)
//!
//! # Example
//!
//! ```
//! use mesh_sdf::{ErrorCode, SdfError};
//!
//! let err = SdfError::invalid_vertex_index(5, 100, 50);
//! assert_eq!(err.code(), ErrorCode::InvalidVertexIndex);
//! assert_eq!(err.code().as_str(), "SDF-1102");
//! ```

use miette::Diagnostic;
use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for distance field operations.
pub type SdfResult<T> = Result<T, SdfError>;

/// Machine-readable error codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCode {
    /// SDF-1001: Failed to read file
    IoRead = 1001,
    /// SDF-1002: Failed to write file
    IoWrite = 1002,
    /// SDF-1003: Failed to parse mesh file
    ParseError = 1003,
    /// SDF-1004: Unsupported mesh file format
    UnsupportedFormat = 1004,

    /// SDF-1101: Mesh has no vertices or faces
    EmptyMesh = 1101,
    /// SDF-1102: Face references a vertex that does not exist
    InvalidVertexIndex = 1102,
    /// SDF-1103: Vertex has NaN or infinite coordinate
    InvalidCoordinate = 1103,

    /// SDF-2001: Grid origin, cell size or dimensions are invalid
    InvalidGrid = 2001,
    /// SDF-2002: Grid exceeds the voxel budget
    GridTooLarge = 2002,

    /// SDF-3001: Output template has no placeholder
    MissingPlaceholder = 3001,
}

impl ErrorCode {
    /// Returns the error code as a string in the format `SDF-XXXX`.
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorCode::IoRead => "SDF-1001",
            ErrorCode::IoWrite => "SDF-1002",
            ErrorCode::ParseError => "SDF-1003",
            ErrorCode::UnsupportedFormat => "SDF-1004",
            ErrorCode::EmptyMesh => "SDF-1101",
            ErrorCode::InvalidVertexIndex => "SDF-1102",
            ErrorCode::InvalidCoordinate => "SDF-1103",
            ErrorCode::InvalidGrid => "SDF-2001",
            ErrorCode::GridTooLarge => "SDF-2002",
            ErrorCode::MissingPlaceholder => "SDF-3001",
        }
    }
}

impl std::fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Recovery suggestions for distance field errors.
#[derive(Debug, Clone, PartialEq)]
pub enum RecoverySuggestion {
    /// Re-export the mesh from the authoring tool.
    ReexportFile { format: Option<String> },
    /// Check the source mesh for the listed problems.
    CheckSourceMesh { checks: Vec<String> },
    /// Grow the cell size by at least this factor to fit the voxel budget.
    IncreaseCellSize { factor: f64 },
    /// Adjust the named parameters.
    AdjustParameters { parameters: Vec<(String, String)> },
    /// Add the placeholder to the template.
    AddPlaceholder { placeholder: &'static str },
    /// No automatic recovery available.
    None,
}

impl std::fmt::Display for RecoverySuggestion {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RecoverySuggestion::ReexportFile { format } => {
                if let Some(fmt) = format {
                    write!(f, "Try re-exporting the mesh as {} from the original software", fmt)
                } else {
                    write!(f, "Try re-exporting the mesh from the original software")
                }
            }
            RecoverySuggestion::CheckSourceMesh { checks } => {
                write!(f, "Check the source mesh for: {}", checks.join(", "))
            }
            RecoverySuggestion::IncreaseCellSize { factor } => {
                write!(f, "Increase the cell size by a factor of at least {:.2}", factor)
            }
            RecoverySuggestion::AdjustParameters { parameters } => {
                let params: Vec<String> = parameters
                    .iter()
                    .map(|(k, v)| format!("{} = {}", k, v))
                    .collect();
                write!(f, "Try adjusting: {}", params.join(", "))
            }
            RecoverySuggestion::AddPlaceholder { placeholder } => {
                write!(f, "Add the string {} to the template where the data belongs", placeholder)
            }
            RecoverySuggestion::None => write!(f, "No automatic recovery available"),
        }
    }
}

/// Location information for errors.
#[derive(Debug, Clone)]
pub enum ErrorLocation {
    /// Error at a specific vertex.
    Vertex { index: usize },
    /// Error at a specific face.
    Face { index: usize },
    /// Error in a file.
    File { path: PathBuf },
}

impl std::fmt::Display for ErrorLocation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ErrorLocation::Vertex { index } => write!(f, "vertex {}", index),
            ErrorLocation::Face { index } => write!(f, "face {}", index),
            ErrorLocation::File { path } => write!(f, "{}", path.display()),
        }
    }
}

/// Errors that can occur while loading meshes or generating distance fields.
#[derive(Debug, Error, Diagnostic)]
pub enum SdfError {
    /// Error reading from a file.
    #[error("failed to read {path}")]
    #[diagnostic(
        code(sdf::io::read),
        help("Check that the file exists and is readable. Try: ls -la {}", path.display())
    )]
    IoRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Error writing to a file.
    #[error("failed to write {path}")]
    #[diagnostic(code(sdf::io::write), help("Check that the directory exists and is writable"))]
    IoWrite {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Error parsing a mesh file.
    #[error("failed to parse mesh from {path}: {details}")]
    #[diagnostic(
        code(sdf::parse::error),
        help("The file may be corrupted. Try re-exporting it as a triangulated OBJ.")
    )]
    ParseError { path: PathBuf, details: String },

    /// Unsupported mesh file format.
    #[error("unsupported mesh format: {extension:?}")]
    #[diagnostic(code(sdf::format::unsupported), help("Supported formats: OBJ"))]
    UnsupportedFormat { extension: Option<String> },

    /// Mesh has no vertices or no faces.
    #[error("mesh is empty: {details}")]
    #[diagnostic(
        code(sdf::input::empty),
        help("The mesh must have at least one vertex and one triangle.")
    )]
    EmptyMesh { details: String },

    /// A face references a vertex outside the vertex list.
    #[error(
        "invalid vertex index: face {face_index} references vertex {vertex_index}, but mesh only has {vertex_count} vertices"
    )]
    #[diagnostic(
        code(sdf::input::vertex_index),
        help("The mesh file is inconsistent. Check the exporter's index settings.")
    )]
    InvalidVertexIndex {
        face_index: usize,
        vertex_index: u32,
        vertex_count: usize,
    },

    /// A vertex coordinate is NaN or infinite.
    #[error("invalid coordinate at vertex {vertex_index}: {coordinate} is {value}")]
    #[diagnostic(
        code(sdf::input::coordinate),
        help("Check for numerical issues in the source data.")
    )]
    InvalidCoordinate {
        vertex_index: usize,
        coordinate: &'static str,
        value: f64,
    },

    /// Grid origin, cell size or dimensions are invalid.
    #[error("invalid grid: {details}")]
    #[diagnostic(
        code(sdf::grid::invalid),
        help("The cell size must be positive and finite, and every dimension at least 1.")
    )]
    InvalidGrid { details: String },

    /// Grid would exceed the voxel budget.
    #[error("grid too large: {dims:?} = {total} points exceeds limit of {max}")]
    #[diagnostic(
        code(sdf::grid::too_large),
        help("Increase the cell size, reduce the padding, or raise max_voxels.")
    )]
    GridTooLarge {
        dims: [usize; 3],
        total: usize,
        max: usize,
    },

    /// Output template does not contain the data placeholder.
    #[error("template has no {placeholder} placeholder")]
    #[diagnostic(
        code(sdf::output::placeholder),
        help("Insert {placeholder} where the generated asset should go.")
    )]
    MissingPlaceholder { placeholder: &'static str },
}

impl SdfError {
    /// Returns the machine-readable error code.
    pub fn code(&self) -> ErrorCode {
        match self {
            SdfError::IoRead { .. } => ErrorCode::IoRead,
            SdfError::IoWrite { .. } => ErrorCode::IoWrite,
            SdfError::ParseError { .. } => ErrorCode::ParseError,
            SdfError::UnsupportedFormat { .. } => ErrorCode::UnsupportedFormat,
            SdfError::EmptyMesh { .. } => ErrorCode::EmptyMesh,
            SdfError::InvalidVertexIndex { .. } => ErrorCode::InvalidVertexIndex,
            SdfError::InvalidCoordinate { .. } => ErrorCode::InvalidCoordinate,
            SdfError::InvalidGrid { .. } => ErrorCode::InvalidGrid,
            SdfError::GridTooLarge { .. } => ErrorCode::GridTooLarge,
            SdfError::MissingPlaceholder { .. } => ErrorCode::MissingPlaceholder,
        }
    }

    /// Returns a recovery suggestion for this error.
    pub fn recovery_suggestion(&self) -> RecoverySuggestion {
        match self {
            SdfError::IoRead { .. } => RecoverySuggestion::CheckSourceMesh {
                checks: vec!["file exists".into(), "file permissions".into()],
            },
            SdfError::IoWrite { .. } => RecoverySuggestion::CheckSourceMesh {
                checks: vec!["directory exists".into(), "write permissions".into()],
            },
            SdfError::ParseError { .. } => RecoverySuggestion::ReexportFile {
                format: Some("triangulated OBJ".into()),
            },
            SdfError::UnsupportedFormat { .. } => RecoverySuggestion::ReexportFile {
                format: Some("OBJ".into()),
            },
            SdfError::EmptyMesh { .. } => RecoverySuggestion::CheckSourceMesh {
                checks: vec!["mesh has geometry".into(), "correct export settings".into()],
            },
            SdfError::InvalidVertexIndex { .. } => RecoverySuggestion::ReexportFile { format: None },
            SdfError::InvalidCoordinate { .. } => RecoverySuggestion::CheckSourceMesh {
                checks: vec!["coordinate values".into(), "export precision".into()],
            },
            SdfError::InvalidGrid { .. } => RecoverySuggestion::AdjustParameters {
                parameters: vec![
                    ("dx".into(), "a positive number".into()),
                    ("padding".into(), "at least 1".into()),
                ],
            },
            SdfError::GridTooLarge { total, max, .. } => {
                let scale = (*total as f64 / (*max).max(1) as f64).cbrt();
                RecoverySuggestion::IncreaseCellSize { factor: scale }
            }
            SdfError::MissingPlaceholder { placeholder } => {
                RecoverySuggestion::AddPlaceholder {
                    placeholder: *placeholder,
                }
            }
        }
    }

    /// Returns location information if available.
    pub fn location(&self) -> Option<ErrorLocation> {
        match self {
            SdfError::InvalidVertexIndex { face_index, .. } => {
                Some(ErrorLocation::Face { index: *face_index })
            }
            SdfError::InvalidCoordinate { vertex_index, .. } => {
                Some(ErrorLocation::Vertex { index: *vertex_index })
            }
            SdfError::IoRead { path, .. }
            | SdfError::IoWrite { path, .. }
            | SdfError::ParseError { path, .. } => Some(ErrorLocation::File { path: path.clone() }),
            _ => None,
        }
    }

    /// Create an IoRead error.
    pub fn io_read(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        SdfError::IoRead {
            path: path.into(),
            source,
        }
    }

    /// Create an IoWrite error.
    pub fn io_write(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        SdfError::IoWrite {
            path: path.into(),
            source,
        }
    }

    /// Create a ParseError.
    pub fn parse_error(path: impl Into<PathBuf>, details: impl Into<String>) -> Self {
        SdfError::ParseError {
            path: path.into(),
            details: details.into(),
        }
    }

    /// Create an EmptyMesh error.
    pub fn empty_mesh(details: impl Into<String>) -> Self {
        SdfError::EmptyMesh {
            details: details.into(),
        }
    }

    /// Create an InvalidVertexIndex error.
    pub fn invalid_vertex_index(face_index: usize, vertex_index: u32, vertex_count: usize) -> Self {
        SdfError::InvalidVertexIndex {
            face_index,
            vertex_index,
            vertex_count,
        }
    }

    /// Create an InvalidCoordinate error.
    pub fn invalid_coordinate(vertex_index: usize, coordinate: &'static str, value: f64) -> Self {
        SdfError::InvalidCoordinate {
            vertex_index,
            coordinate,
            value,
        }
    }

    /// Create an InvalidGrid error.
    pub fn invalid_grid(details: impl Into<String>) -> Self {
        SdfError::InvalidGrid {
            details: details.into(),
        }
    }
}
