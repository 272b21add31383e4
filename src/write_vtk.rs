use crate::builder::GridBuilder;
use crate::grid::Grid;
use crate::prelude::*;
use crate::snapshot::Snapshot;

use std::marker::PhantomData;
use std::path::{Path, PathBuf};

use log::{info, trace};
use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, Event};

/// extension given to every file written by a [`GridWriter`]
pub const EXTENSION: &str = ".vtp";

/// every appended or base64 block starts with its payload size as a `UInt64`
pub(crate) const BLOCK_HEADER_BYTES: usize = 8;

/// Writes a [`Grid`] to disk
///
/// The encoding of the arrays is chosen with the type parameter: [`Binary`] (the default)
/// writes raw little endian data to an `AppendedData` section, [`Base64`] and [`Ascii`]
/// write the data inline in each `DataArray` element.
///
/// ```no_run
/// use exavtk::{Ascii, GridWriter};
/// # fn write(grid: &exavtk::Grid) -> Result<(), exavtk::Error> {
/// // written to `./flow.vtp`
/// GridWriter::<Ascii>::new().write("./flow", grid)?;
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone, Copy, Default)]
pub struct GridWriter<Encoding = Binary> {
    _marker: PhantomData<Encoding>,
}

impl<ENC: Encode> GridWriter<ENC> {
    pub fn new() -> Self {
        Self {
            _marker: PhantomData,
        }
    }

    /// Write `grid` to `path`, appending [`EXTENSION`] if the path does not already end with
    /// it. Returns the path that was written.
    pub fn write<P: AsRef<Path>>(&self, path: P, grid: &Grid) -> Result<PathBuf, Error> {
        let path = with_extension(path.as_ref());

        let file = std::fs::File::create(&path)?;
        let writer = std::io::BufWriter::new(file);
        write_vtk::<_, ENC>(writer, grid)?;

        info!(
            "wrote {} points and {} cells to {}",
            grid.num_points(),
            grid.num_cells(),
            path.display()
        );

        Ok(path)
    }
}

/// Write `grid` to `path` with binary appended data
pub fn write_grid<P: AsRef<Path>>(path: P, grid: &Grid) -> Result<PathBuf, Error> {
    GridWriter::<Binary>::new().write(path, grid)
}

/// Build a grid from every node of `snapshot` and write it to `path` with binary appended data
pub fn write_snapshot<P: AsRef<Path>>(path: P, snapshot: &Snapshot) -> Result<PathBuf, Error> {
    let grid = GridBuilder::new().build(snapshot)?;
    write_grid(path, &grid)
}

/// append [`EXTENSION`] unless `path` already ends with it
pub fn with_extension(path: &Path) -> PathBuf {
    let mut name = path.as_os_str().to_os_string();

    if !name.to_string_lossy().ends_with(EXTENSION) {
        name.push(EXTENSION);
    }

    PathBuf::from(name)
}

/// Write a grid as a VTK xml `UnstructuredGrid` document to a `Writer`
pub fn write_vtk<W, ENC>(writer: W, grid: &Grid) -> Result<(), Error>
where
    W: Write,
    ENC: Encode,
{
    let mut writer = Writer::new(writer);

    let connectivity = grid.vtk_connectivity();
    let offsets = grid.vtk_offsets();
    let types = grid.vtk_types();

    writer.write_event(Event::Decl(BytesDecl::new("1.0", None, None)))?;

    writer.write_event(start_element(
        "VTKFile",
        &[
            ("type", "UnstructuredGrid"),
            ("version", "1.0"),
            ("byte_order", "LittleEndian"),
            ("header_type", "UInt64"),
        ],
    ))?;
    writer.write_event(start_element("UnstructuredGrid", &[]))?;

    if let Some(time) = grid.time {
        writer.write_event(start_element("FieldData", &[]))?;
        // a single value, always written inline
        vec![time].write_ascii(&mut writer, "TimeValue")?;
        writer.write_event(end_element("FieldData"))?;
    }

    let num_points = grid.num_points().to_string();
    let num_cells = grid.num_cells().to_string();
    writer.write_event(start_element(
        "Piece",
        &[
            ("NumberOfPoints", num_points.as_str()),
            ("NumberOfCells", num_cells.as_str()),
        ],
    ))?;

    // offsets into the appended section, in the order the blocks are written at the end
    let mut offset = 0;

    let point_data = &grid.point_data;
    let mut active = Vec::new();
    if let Some(scalars) = point_data.active_scalars() {
        active.push(("Scalars", scalars));
    }
    if let Some(vectors) = point_data.active_vectors() {
        active.push(("Vectors", vectors));
    }
    writer.write_event(start_element("PointData", &active))?;
    for array in point_data.iter() {
        write_array::<_, _, ENC>(&mut writer, &array.values, &array.name, &mut offset)?;
    }
    writer.write_event(end_element("PointData"))?;

    writer.write_event(start_element("Points", &[]))?;
    write_array::<_, _, ENC>(&mut writer, &grid.points, "Points", &mut offset)?;
    writer.write_event(end_element("Points"))?;

    writer.write_event(start_element("Cells", &[]))?;
    write_array::<_, _, ENC>(&mut writer, &connectivity, "connectivity", &mut offset)?;
    write_array::<_, _, ENC>(&mut writer, &offsets, "offsets", &mut offset)?;
    write_array::<_, _, ENC>(&mut writer, &types, "types", &mut offset)?;
    writer.write_event(end_element("Cells"))?;

    writer.write_event(end_element("Piece"))?;
    writer.write_event(end_element("UnstructuredGrid"))?;

    if ENC::is_binary() {
        appended_binary_header_start(&mut writer)?;

        // same order as the headers above
        for array in point_data.iter() {
            array.values.write_binary(&mut writer)?;
        }
        grid.points.write_binary(&mut writer)?;
        connectivity.write_binary(&mut writer)?;
        offsets.write_binary(&mut writer)?;
        types.write_binary(&mut writer)?;

        appended_binary_header_end(&mut writer)?;
    }

    writer.write_event(end_element("VTKFile"))?;

    writer.inner().flush()?;

    Ok(())
}

/// write the `DataArray` element of `array` in the encoding `ENC`. For appended data only the
/// header is written and `offset` is advanced past the block of this array.
fn write_array<W, A, ENC>(
    writer: &mut Writer<W>,
    array: &A,
    name: &str,
    offset: &mut usize,
) -> Result<(), Error>
where
    W: Write,
    A: Array,
    ENC: Encode,
{
    trace!(
        "writing array `{}` ({} values, {:?})",
        name,
        array.length(),
        ENC::encoding()
    );

    match ENC::encoding() {
        Encoding::Ascii => array.write_ascii(writer, name),
        Encoding::Base64 => array.write_base64(writer, name),
        Encoding::Binary => {
            write_appended_dataarray_header(
                writer,
                name,
                *offset,
                array.components(),
                array.precision(),
            )?;
            *offset += array.appended_bytes();
            Ok(())
        }
    }
}

fn start_element<'a>(name: &'a str, attributes: &[(&'a str, &'a str)]) -> Event<'a> {
    let mut start = BytesStart::new(name);
    for attribute in attributes {
        start.push_attribute(*attribute);
    }
    Event::Start(start)
}

fn end_element(name: &str) -> Event<'_> {
    Event::End(BytesEnd::new(name))
}

pub(crate) fn appended_binary_header_start<W: Write>(
    writer: &mut Writer<W>,
) -> Result<(), std::io::Error> {
    let inner = writer.inner();
    // offsets are counted from the byte following the underscore
    inner.write_all(b"<AppendedData encoding=\"raw\">_")?;
    Ok(())
}

pub(crate) fn appended_binary_header_end<W: Write>(
    writer: &mut Writer<W>,
) -> Result<(), std::io::Error> {
    let inner = writer.inner();
    inner.write_all(b"\n</AppendedData>")?;
    Ok(())
}

/// the `format` of a `DataArray`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Encoding {
    Ascii,
    Base64,
    /// raw bytes in the `AppendedData` section
    Binary,
}

impl Encoding {
    pub(crate) fn to_str(self) -> &'static str {
        match self {
            Self::Ascii => "ascii",
            Self::Base64 => "binary",
            Self::Binary => "appended",
        }
    }

    pub(crate) fn from_bytes(bytes: &[u8]) -> Option<Self> {
        match bytes {
            b"ascii" => Some(Self::Ascii),
            b"binary" => Some(Self::Base64),
            b"appended" => Some(Self::Binary),
            _ => None,
        }
    }
}

pub fn write_inline_array_header<W: Write>(
    writer: &mut Writer<W>,
    format: Encoding,
    name: &str,
    components: usize,
    precision: Precision,
) -> Result<(), Error> {
    let components = components.to_string();

    writer.write_event(start_element(
        "DataArray",
        &[
            ("type", precision.as_str()),
            ("NumberOfComponents", components.as_str()),
            ("Name", name),
            ("format", format.to_str()),
        ],
    ))?;

    Ok(())
}

pub fn close_inline_array_header<W: Write>(writer: &mut Writer<W>) -> Result<(), Error> {
    writer.write_event(end_element("DataArray"))?;
    Ok(())
}

/// write the header for an appended data array that will later be written in the appended
/// section of the vtk.
///
/// if you call this function you are also responsible for calling
/// [`Array::write_binary`] with the data in the correct order
#[inline]
pub fn write_appended_dataarray_header<W: Write>(
    writer: &mut Writer<W>,
    name: &str,
    offset: usize,
    components: usize,
    precision: Precision,
) -> Result<(), Error> {
    let components = components.to_string();
    let offset = offset.to_string();

    writer.write_event(start_element(
        "DataArray",
        &[
            ("type", precision.as_str()),
            ("NumberOfComponents", components.as_str()),
            ("Name", name),
            ("format", Encoding::Binary.to_str()),
            ("offset", offset.as_str()),
        ],
    ))?;
    writer.write_event(end_element("DataArray"))?;

    Ok(())
}
