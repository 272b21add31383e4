//! `Array` implementations for the containers a [`Grid`](crate::Grid) is made of: flat
//! vectors / slices (connectivity, offsets, cell types) and 2D `ndarray` arrays with
//! one row per point (coordinates and point data).

use crate::prelude::*;
use crate::write_vtk::{close_inline_array_header, write_inline_array_header, Encoding};
use ndarray::Array2;
use quick_xml::events::{BytesText, Event};

fn write_ascii_values<W, NUM, I>(
    writer: &mut Writer<W>,
    name: &str,
    components: usize,
    values: I,
) -> Result<(), Error>
where
    W: Write,
    NUM: Numeric,
    I: Iterator<Item = NUM>,
{
    write_inline_array_header(writer, Encoding::Ascii, name, components, NUM::as_precision())?;

    let mut data = String::new();
    for value in values {
        value.push_ascii(&mut data);
        data.push(' ');
    }

    writer.write_event(Event::Text(BytesText::new(&data)))?;

    close_inline_array_header(writer)?;
    Ok(())
}

fn write_base64_values<W, NUM, I>(
    writer: &mut Writer<W>,
    name: &str,
    components: usize,
    length: usize,
    values: I,
) -> Result<(), Error>
where
    W: Write,
    NUM: Numeric,
    I: Iterator<Item = NUM>,
{
    write_inline_array_header(writer, Encoding::Base64, name, components, NUM::as_precision())?;

    let payload_bytes = length * NUM::SIZE;
    let mut byte_data: Vec<u8> =
        Vec::with_capacity(crate::write_vtk::BLOCK_HEADER_BYTES + payload_bytes);

    // the header (byte count of the payload) is encoded in the same stream as the data
    (payload_bytes as u64).extend_le_bytes(&mut byte_data);
    values.for_each(|value| value.extend_le_bytes(&mut byte_data));

    let data = base64::encode(byte_data.as_slice());
    writer.write_event(Event::Text(BytesText::new(&data)))?;

    close_inline_array_header(writer)?;
    Ok(())
}

fn write_binary_values<W, NUM, I>(
    writer: &mut Writer<W>,
    length: usize,
    values: I,
) -> Result<(), Error>
where
    W: Write,
    NUM: Numeric,
    I: Iterator<Item = NUM>,
{
    let inner = writer.inner();

    let payload_bytes = (length * NUM::SIZE) as u64;
    inner.write_all(&payload_bytes.to_le_bytes())?;

    for value in values {
        value.write_le_bytes(inner)?;
    }

    Ok(())
}

impl<NUM> Array for &[NUM]
where
    NUM: Numeric,
{
    fn write_ascii<W: Write>(&self, writer: &mut Writer<W>, name: &str) -> Result<(), Error> {
        write_ascii_values(writer, name, 1, self.iter().copied())
    }

    fn write_base64<W: Write>(&self, writer: &mut Writer<W>, name: &str) -> Result<(), Error> {
        write_base64_values(writer, name, 1, self.len(), self.iter().copied())
    }

    fn write_binary<W: Write>(&self, writer: &mut Writer<W>) -> Result<(), Error> {
        write_binary_values(writer, self.len(), self.iter().copied())
    }

    fn length(&self) -> usize {
        self.len()
    }

    fn precision(&self) -> Precision {
        NUM::as_precision()
    }

    fn size_of_elem(&self) -> usize {
        NUM::SIZE
    }
}

impl<NUM> Array for Vec<NUM>
where
    NUM: Numeric,
{
    fn write_ascii<W: Write>(&self, writer: &mut Writer<W>, name: &str) -> Result<(), Error> {
        self.as_slice().write_ascii(writer, name)
    }

    fn write_base64<W: Write>(&self, writer: &mut Writer<W>, name: &str) -> Result<(), Error> {
        self.as_slice().write_base64(writer, name)
    }

    fn write_binary<W: Write>(&self, writer: &mut Writer<W>) -> Result<(), Error> {
        self.as_slice().write_binary(writer)
    }

    fn length(&self) -> usize {
        self.len()
    }

    fn precision(&self) -> Precision {
        NUM::as_precision()
    }

    fn size_of_elem(&self) -> usize {
        NUM::SIZE
    }
}

/// one row per point, one column per component. Rows are written in order with their
/// components interleaved, which is the tuple layout VTK expects.
impl<NUM> Array for Array2<NUM>
where
    NUM: Numeric,
{
    fn write_ascii<W: Write>(&self, writer: &mut Writer<W>, name: &str) -> Result<(), Error> {
        write_ascii_values(writer, name, self.ncols(), self.iter().copied())
    }

    fn write_base64<W: Write>(&self, writer: &mut Writer<W>, name: &str) -> Result<(), Error> {
        write_base64_values(writer, name, self.ncols(), self.len(), self.iter().copied())
    }

    fn write_binary<W: Write>(&self, writer: &mut Writer<W>) -> Result<(), Error> {
        write_binary_values(writer, self.len(), self.iter().copied())
    }

    fn length(&self) -> usize {
        self.len()
    }

    fn components(&self) -> usize {
        self.ncols()
    }

    fn precision(&self) -> Precision {
        NUM::as_precision()
    }

    fn size_of_elem(&self) -> usize {
        NUM::SIZE
    }
}
