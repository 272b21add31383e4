//! reading and parsing xml VTK unstructured grid files
//!
//! The reader understands the documents produced by [`GridWriter`](crate::GridWriter) in all
//! three encodings and reconstructs the [`Grid`] they were written from. Only grids with a single
//! piece and a single cell type (quads or hexahedra) can be read.

mod error;
mod event_summary;

pub use error::*;
use event_summary::EventSummary;

use crate::grid::{CellType, Grid, PointData};
use crate::prelude::*;
use crate::utils;
use crate::write_vtk::Encoding;

use derive_more::Display;
use log::debug;
use ndarray::Array2;
use quick_xml::events::attributes::Attribute;
use quick_xml::events::{BytesStart, Event};
use quick_xml::reader::Reader;

/// read in and parse an entire unstructured grid file for a given path
pub fn read_grid<P: AsRef<std::path::Path>>(path: P) -> Result<Grid, Error> {
    let bytes = std::fs::read(path.as_ref())?;
    debug!("read {} bytes from {}", bytes.len(), path.as_ref().display());
    let grid = parse_grid(&bytes)?;
    Ok(grid)
}

/// parse an unstructured grid document held in memory
pub fn parse_grid(bytes: &[u8]) -> Result<Grid, ParseError> {
    let document = read_document(bytes)?;

    let appended = document.appended.map(|start| &bytes[start..]);
    let lookup = |section: Section, name: &str| {
        document
            .arrays
            .iter()
            .find(|header| header.section == section && header.name == name)
            .ok_or_else(|| MissingArray::new(section.to_string(), name.to_string()))
    };

    let num_points = document.num_points;
    let num_cells = document.num_cells;

    // the coordinate array does not need a name
    let points = document
        .arrays
        .iter()
        .find(|header| header.section == Section::Points)
        .ok_or_else(|| MissingArray::new(Section::Points.to_string(), "Points".into()))?;
    let points = to_rows(points, decode_f64(points, appended)?, num_points)?;

    let connectivity = lookup(Section::Cells, "connectivity")?;
    let connectivity = decode_i64(connectivity, appended)?;
    let offsets = lookup(Section::Cells, "offsets")?;
    let offsets = decode_i64(offsets, appended)?;
    let types = lookup(Section::Cells, "types")?;
    let types = decode_values::<u8>(types, appended)?;

    let (cell_type, connectivity) = cell_records(&connectivity, &offsets, &types, num_cells)?;

    let mut point_data = PointData::new();
    for header in document
        .arrays
        .iter()
        .filter(|header| header.section == Section::PointData)
    {
        let values = to_rows(header, decode_f64(header, appended)?, num_points)?;
        point_data.push(header.name.clone(), values);
    }
    if let Some(scalars) = document.active_scalars {
        point_data.set_active_scalars(scalars);
    }
    if let Some(vectors) = document.active_vectors {
        point_data.set_active_vectors(vectors);
    }

    let time = match lookup(Section::FieldData, "TimeValue") {
        Ok(header) => decode_f64(header, appended)?.first().copied(),
        Err(_) => None,
    };

    Ok(Grid {
        points,
        cell_type,
        connectivity,
        point_data,
        time,
    })
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
enum Section {
    FieldData,
    PointData,
    Points,
    Cells,
    Other,
}

/// everything in a `DataArray` element except for appended data
#[derive(Debug)]
struct ArrayHeader {
    section: Section,
    name: String,
    precision: Precision,
    components: usize,
    format: Encoding,
    offset: Option<usize>,
    inline: String,
}

/// the xml part of a file
#[derive(Debug, Default)]
struct Document {
    num_points: usize,
    num_cells: usize,
    active_scalars: Option<String>,
    active_vectors: Option<String>,
    arrays: Vec<ArrayHeader>,
    /// position of the first byte after the `_` that starts the appended data
    appended: Option<usize>,
}

fn read_document(bytes: &[u8]) -> Result<Document, ParseError> {
    let mut reader = Reader::from_reader(bytes);
    reader.trim_text(true);

    let mut buffer = Vec::new();
    let mut document = Document::default();
    let mut section = Section::Other;
    let mut current: Option<ArrayHeader> = None;
    let mut seen_root = false;
    let mut seen_piece = false;

    loop {
        let event = reader.read_event_into(&mut buffer)?;

        match &event {
            Event::Start(start) | Event::Empty(start) => {
                let is_empty = matches!(event, Event::Empty(_));

                match start.name().as_ref() {
                    b"VTKFile" => {
                        check_file_header(start)?;
                        seen_root = true;
                    }
                    _ if !seen_root => {
                        let summary = EventSummary::new(&event);
                        return Err(UnexpectedElement::new("VTKFile", summary).into());
                    }
                    b"Piece" => {
                        document.num_points = parse_count(start, "Piece", "NumberOfPoints")?;
                        document.num_cells = parse_count(start, "Piece", "NumberOfCells")?;
                        seen_piece = true;
                    }
                    b"FieldData" => section = Section::FieldData,
                    b"Points" => section = Section::Points,
                    b"Cells" => section = Section::Cells,
                    b"PointData" => {
                        section = Section::PointData;
                        document.active_scalars = optional_attribute(start, "Scalars")?;
                        document.active_vectors = optional_attribute(start, "Vectors")?;
                    }
                    b"DataArray" => {
                        let header = read_array_header(start, section)?;
                        if is_empty {
                            document.arrays.push(header);
                        } else {
                            current = Some(header);
                        }
                    }
                    b"AppendedData" => {
                        let encoding = optional_attribute(start, "encoding")?;
                        if encoding.as_deref() != Some("raw") {
                            return Err(UnexpectedAttributeValue::new(
                                "AppendedData".into(),
                                "encoding".into(),
                                "raw".into(),
                                ParsedNameOrBytes::new(encoding.unwrap_or_default().as_bytes()),
                            )
                            .into());
                        }

                        // stop here, the rest of the file is binary
                        let position = reader.buffer_position();
                        let underscore = bytes[position..]
                            .iter()
                            .position(|&byte| byte == b'_')
                            .ok_or_else(|| ParsingBinary::new("AppendedData".into(), position))?;
                        document.appended = Some(position + underscore + 1);
                        break;
                    }
                    _ => (),
                }
            }
            Event::Text(text) => {
                if let Some(header) = current.as_mut() {
                    let text = std::str::from_utf8(text)
                        .map_err(|_| InlineAsciiArray::new(header.name.clone()))?;
                    header.inline.push_str(text);
                }
            }
            Event::End(end) => match end.name().as_ref() {
                b"DataArray" => {
                    if let Some(header) = current.take() {
                        document.arrays.push(header);
                    }
                }
                b"FieldData" | b"Points" | b"Cells" | b"PointData" => section = Section::Other,
                _ => (),
            },
            Event::Eof => break,
            _ => (),
        }

        buffer.clear();
    }

    if !seen_piece {
        return Err(UnexpectedElement::new("Piece", EventSummary::eof()).into());
    }

    debug!(
        "parsed header: {} points, {} cells, {} arrays",
        document.num_points,
        document.num_cells,
        document.arrays.len()
    );

    Ok(document)
}

fn check_file_header(start: &BytesStart) -> Result<(), ParseError> {
    for (attribute_name, expected) in [
        ("type", "UnstructuredGrid"),
        ("byte_order", "LittleEndian"),
        ("header_type", "UInt64"),
    ] {
        let attribute = required_attribute(start, "VTKFile", attribute_name)?;
        check_attribute_value(attribute, "VTKFile", attribute_name, expected)?;
    }

    Ok(())
}

fn read_array_header(start: &BytesStart, section: Section) -> Result<ArrayHeader, ParseError> {
    let name = optional_attribute(start, "Name")?.unwrap_or_default();

    let precision = required_attribute(start, "DataArray", "type")?;
    let precision = Precision::from_bytes(&precision.value).ok_or_else(|| {
        UnexpectedAttributeValue::new(
            "DataArray".into(),
            "type".into(),
            "UInt8, Int64, UInt64, Float32 or Float64".into(),
            ParsedNameOrBytes::new(&precision.value),
        )
    })?;

    let format = required_attribute(start, "DataArray", "format")?;
    let format = Encoding::from_bytes(&format.value).ok_or_else(|| {
        UnexpectedAttributeValue::new(
            "DataArray".into(),
            "format".into(),
            "ascii, binary or appended".into(),
            ParsedNameOrBytes::new(&format.value),
        )
    })?;

    let components = match start.try_get_attribute("NumberOfComponents")? {
        Some(_) => parse_count(start, "DataArray", "NumberOfComponents")?,
        None => 1,
    };

    let offset = match format {
        Encoding::Binary => Some(parse_count(start, "DataArray", "offset")?),
        _ => None,
    };

    Ok(ArrayHeader {
        section,
        name,
        precision,
        components,
        format,
        offset,
        inline: String::new(),
    })
}

fn required_attribute<'a>(
    start: &'a BytesStart,
    element_name: &str,
    attribute_name: &str,
) -> Result<Attribute<'a>, ParseError> {
    start
        .try_get_attribute(attribute_name)?
        .ok_or_else(|| MissingAttribute::new(element_name.into(), attribute_name.into()).into())
}

fn optional_attribute(start: &BytesStart, attribute_name: &str) -> Result<Option<String>, ParseError> {
    let attribute = match start.try_get_attribute(attribute_name)? {
        Some(attribute) => attribute,
        None => return Ok(None),
    };

    match ParsedNameOrBytes::new(&attribute.value) {
        ParsedNameOrBytes::Utf8(value) => Ok(Some(value)),
        bytes => Err(UnexpectedAttributeValue::new(
            String::from_utf8_lossy(start.name().as_ref()).into_owned(),
            attribute_name.into(),
            "utf8 text".into(),
            bytes,
        )
        .into()),
    }
}

fn parse_count(start: &BytesStart, element_name: &str, attribute_name: &str) -> Result<usize, ParseError> {
    let attribute = required_attribute(start, element_name, attribute_name)?;

    std::str::from_utf8(&attribute.value)
        .ok()
        .and_then(|value| value.trim().parse().ok())
        .ok_or_else(|| {
            UnexpectedAttributeValue::new(
                element_name.into(),
                attribute_name.into(),
                "a non-negative integer".into(),
                ParsedNameOrBytes::new(&attribute.value),
            )
            .into()
        })
}

fn check_attribute_value(
    attribute: Attribute,
    element_name: &str,
    attribute_name: &str,
    expected_value: &str,
) -> Result<(), UnexpectedAttributeValue> {
    if attribute.value.as_ref() == expected_value.as_bytes() {
        Ok(())
    } else {
        Err(UnexpectedAttributeValue::new(
            element_name.into(),
            attribute_name.into(),
            expected_value.into(),
            ParsedNameOrBytes::new(&attribute.value),
        ))
    }
}

/// decode the values of an array in its own precision
fn decode_values<NUM: Numeric>(
    header: &ArrayHeader,
    appended: Option<&[u8]>,
) -> Result<Vec<NUM>, ParseError> {
    if header.precision != NUM::as_precision() {
        return Err(UnexpectedAttributeValue::new(
            "DataArray".into(),
            "type".into(),
            NUM::as_precision().as_str().into(),
            ParsedNameOrBytes::new(header.precision.as_str().as_bytes()),
        )
        .into());
    }

    match header.format {
        Encoding::Ascii => header
            .inline
            .split_ascii_whitespace()
            .map(NUM::from_ascii)
            .collect::<Option<Vec<NUM>>>()
            .ok_or_else(|| InlineAsciiArray::new(header.name.clone()).into()),
        Encoding::Base64 => {
            let bytes = base64::decode(header.inline.trim())
                .map_err(|_| InlineBase64Array::new(header.name.clone()))?;
            let block = utils::read_block(&bytes, 0)
                .ok_or_else(|| InlineBase64Array::new(header.name.clone()))?;
            Ok(utils::values_from_le_bytes(block))
        }
        Encoding::Binary => {
            let offset = header.offset.unwrap_or_default();
            let block = appended
                .and_then(|appended| utils::read_block(appended, offset))
                .ok_or_else(|| ParsingBinary::new(header.name.clone(), offset))?;
            Ok(utils::values_from_le_bytes(block))
        }
    }
}

fn decode_f64(header: &ArrayHeader, appended: Option<&[u8]>) -> Result<Vec<f64>, ParseError> {
    match header.precision {
        Precision::Float32 => Ok(decode_values::<f32>(header, appended)?
            .into_iter()
            .map(f64::from)
            .collect()),
        _ => decode_values::<f64>(header, appended),
    }
}

fn decode_i64(header: &ArrayHeader, appended: Option<&[u8]>) -> Result<Vec<i64>, ParseError> {
    match header.precision {
        Precision::UInt64 => Ok(decode_values::<u64>(header, appended)?
            .into_iter()
            .map(|value| value as i64)
            .collect()),
        _ => decode_values::<i64>(header, appended),
    }
}

/// reshape a flat array into one row per point
fn to_rows(header: &ArrayHeader, values: Vec<f64>, rows: usize) -> Result<Array2<f64>, ParseError> {
    let expected = rows * header.components;
    if values.len() != expected {
        return Err(ArrayLength::new(header.name.clone(), expected, values.len()).into());
    }

    Array2::from_shape_vec((rows, header.components), values)
        .map_err(|_| ArrayLength::new(header.name.clone(), expected, rows).into())
}

/// rebuild `[nvert, vertices..]` records from the vtk cell arrays
fn cell_records(
    connectivity: &[i64],
    offsets: &[i64],
    types: &[u8],
    num_cells: usize,
) -> Result<(CellType, Vec<usize>), ParseError> {
    if types.len() != num_cells {
        return Err(ArrayLength::new("types".into(), num_cells, types.len()).into());
    }
    if offsets.len() != num_cells {
        return Err(ArrayLength::new("offsets".into(), num_cells, offsets.len()).into());
    }

    // an empty grid carries no type information
    let first = types.first().copied().unwrap_or(CellType::Hexahedron.vtk_id());
    let cell_type = CellType::from_vtk_id(first).ok_or(CellLayout::UnsupportedType(first))?;
    if let Some(&other) = types.iter().find(|&&id| id != first) {
        return Err(CellLayout::MixedTypes(first, other).into());
    }

    let nvert = cell_type.vertices();
    for (cell, &offset) in offsets.iter().enumerate() {
        if offset != ((cell + 1) * nvert) as i64 {
            return Err(CellLayout::Offsets(cell, nvert).into());
        }
    }

    if connectivity.len() != num_cells * nvert {
        return Err(ArrayLength::new(
            "connectivity".into(),
            num_cells * nvert,
            connectivity.len(),
        )
        .into());
    }

    let mut records = Vec::with_capacity(num_cells * (nvert + 1));
    for cell in connectivity.chunks_exact(nvert) {
        records.push(nvert);
        records.extend(cell.iter().map(|&index| index as usize));
    }

    Ok((cell_type, records))
}

#[cfg(test)]
mod tests {
    use super::*;

    const ASCII_QUAD: &str = r#"<?xml version="1.0"?>
<VTKFile type="UnstructuredGrid" version="1.0" byte_order="LittleEndian" header_type="UInt64">
  <UnstructuredGrid>
    <Piece NumberOfPoints="4" NumberOfCells="1">
      <PointData Scalars="temp">
        <DataArray type="Float64" Name="temp" format="ascii">1 2 3 4</DataArray>
      </PointData>
      <Points>
        <DataArray type="Float32" NumberOfComponents="3" format="ascii">
          0 0 0  1 0 0  1 1 0  0 1 0
        </DataArray>
      </Points>
      <Cells>
        <DataArray type="Int64" Name="connectivity" format="ascii">0 1 2 3</DataArray>
        <DataArray type="Int64" Name="offsets" format="ascii">4</DataArray>
        <DataArray type="UInt8" Name="types" format="ascii">9</DataArray>
      </Cells>
    </Piece>
  </UnstructuredGrid>
</VTKFile>"#;

    #[test]
    fn hand_written_ascii_file() {
        let grid = parse_grid(ASCII_QUAD.as_bytes()).unwrap();

        assert_eq!(grid.cell_type, CellType::Quad);
        assert_eq!(grid.connectivity, vec![4, 0, 1, 2, 3]);
        assert_eq!(grid.points.row(2).to_vec(), vec![1.0, 1.0, 0.0]);
        assert_eq!(grid.point_data.active_scalars(), Some("temp"));
        assert_eq!(
            grid.point_data.get("temp").unwrap().column(0).to_vec(),
            vec![1.0, 2.0, 3.0, 4.0]
        );
        assert_eq!(grid.time, None);
    }

    #[test]
    fn rejects_other_dataset_types() {
        let text = ASCII_QUAD.replace("type=\"UnstructuredGrid\"", "type=\"PolyData\"");
        let err = parse_grid(text.as_bytes()).unwrap_err();

        assert!(matches!(err, ParseError::UnexpectedAttributeValue(_)));
    }

    #[test]
    fn rejects_mixed_cell_types() {
        let text = ASCII_QUAD
            .replace(r#"NumberOfCells="1""#, r#"NumberOfCells="2""#)
            .replace(">0 1 2 3<", ">0 1 2 3 0 1 2 3<")
            .replace(">4<", ">4 8<")
            .replace(">9<", ">9 12<");
        let err = parse_grid(text.as_bytes()).unwrap_err();

        assert!(matches!(err, ParseError::CellLayout(CellLayout::MixedTypes(9, 12))));
    }

    #[test]
    fn short_point_array() {
        let text = ASCII_QUAD.replace("1 2 3 4", "1 2 3");
        let err = parse_grid(text.as_bytes()).unwrap_err();

        assert!(matches!(err, ParseError::ArrayLength(_)));
    }

    #[test]
    fn missing_cells() {
        let start = ASCII_QUAD.find("<Cells>").unwrap();
        let end = ASCII_QUAD.find("</Cells>").unwrap() + "</Cells>".len();
        let text = format!("{}{}", &ASCII_QUAD[..start], &ASCII_QUAD[end..]);
        let err = parse_grid(text.as_bytes()).unwrap_err();

        assert!(matches!(err, ParseError::MissingArray(_)));
    }

    #[test]
    fn not_a_vtk_file() {
        let err = parse_grid(b"<html></html>").unwrap_err();
        assert!(matches!(err, ParseError::UnexpectedElement(_)));
    }
}
