//! Common traits and types that are useful for working with `exavtk`
#![allow(unused_imports)]

pub use crate::grid::{CellType, Grid, PointData};
pub use crate::snapshot::{Snapshot, Variables};
pub use crate::traits::{Array, Encode, Numeric, Precision};
pub use crate::{Ascii, Base64, Binary};
pub use crate::{GridBuilder, GridWriter};
pub use crate::Writer;

pub(crate) use crate::Error;
pub(crate) use std::io::Write;
