#![doc = include_str!("../README.md")]

mod array;
pub mod builder;
pub mod grid;
pub mod mesh;
pub mod parse;
pub mod prelude;
pub mod snapshot;
mod traits;
mod utils;
mod write_vtk;

pub use builder::{build, GridBuilder};
pub use grid::{CellType, Grid, PointArray, PointData};
pub use snapshot::{Element, Snapshot, Variables};

pub use traits::{Array, Encode, Numeric, Precision};

pub use write_vtk::{with_extension, write_grid, write_snapshot, write_vtk, GridWriter, EXTENSION};
pub use write_vtk::{
    close_inline_array_header, write_appended_dataarray_header, write_inline_array_header,
    Encoding,
};

pub use parse::{parse_grid, read_grid, ParseError};

pub use ndarray;

pub use quick_xml::writer::Writer;

/// general purpose error enumeration for possible causes of failure.
#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error("An io error occured: `{0}`")]
    Io(#[from] std::io::Error),
    #[error("Error while parsing VTK xml: {0}")]
    Parse(#[from] parse::ParseError),
    #[error("Could not write XML data to file: `{0}`")]
    XmlWrite(#[from] quick_xml::Error),
    #[error("the snapshot does not contain element coordinates")]
    MissingPositions,
}

/// Binary encoding marker type, arrays are written raw to an appended section
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Binary;

/// base64 encoding marker type
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Base64;

/// ascii encoding marker type
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Ascii;

impl traits::Encode for Binary {
    fn encoding() -> Encoding {
        Encoding::Binary
    }
}

impl traits::Encode for Ascii {
    fn encoding() -> Encoding {
        Encoding::Ascii
    }
}

impl traits::Encode for Base64 {
    fn encoding() -> Encoding {
        Encoding::Base64
    }
}
