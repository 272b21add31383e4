//! # Traits
//!
//! General purpose traits used while writing and reading unstructured grid files.
//! `Array` describes anything that can be written as a VTK `DataArray`, `Numeric` covers the
//! scalar types that can appear inside such an array, and `Encode` is implemented by the
//! marker types ([`Binary`](crate::Binary), [`Base64`](crate::Base64), [`Ascii`](crate::Ascii))
//! that select how a [`GridWriter`](crate::GridWriter) lays out its data.

use crate::write_vtk::Encoding;
use quick_xml::Writer;
use std::io::Write;

/// describes how a single array of values is written to a vtk file
///
/// Arrays can be written inline within the `DataArray` element (ascii or base64) or
/// as a raw block in the `AppendedData` section at the end of the file. Inline data
/// is easier to inspect but uses significantly more space than the appended data.
///
/// ```ignore
/// let pressure: Vec<f64> = vec![0.0, 1.0, 2.0];
/// pressure.write_ascii(&mut writer, "pres")?;
/// ```
pub trait Array {
    /// write the full `DataArray` element with the values as space separated text
    fn write_ascii<W: Write>(&self, writer: &mut Writer<W>, name: &str)
        -> Result<(), crate::Error>;

    /// write the full `DataArray` element with the values as base64 encoded bytes.
    /// The encoded stream starts with the `UInt64` byte count of the payload.
    fn write_base64<W: Write>(
        &self,
        writer: &mut Writer<W>,
        name: &str,
    ) -> Result<(), crate::Error>;

    /// write the raw block for this array to the appended section in binary form
    ///
    /// You must ensure that you have called `write_appended_dataarray_header` with
    /// the correct offset before calling this function.
    fn write_binary<W: Write>(&self, writer: &mut Writer<W>) -> Result<(), crate::Error>;

    /// total number of scalar values in the array (tuples * components)
    fn length(&self) -> usize;

    fn components(&self) -> usize {
        1
    }

    fn precision(&self) -> Precision;

    fn size_of_elem(&self) -> usize;

    /// number of bytes this array occupies in the appended section, including its header
    fn appended_bytes(&self) -> usize {
        crate::write_vtk::BLOCK_HEADER_BYTES + self.length() * self.size_of_elem()
    }
}

/// the VTK name of a numeric type
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Precision {
    UInt8,
    Int64,
    UInt64,
    Float32,
    Float64,
}

impl Precision {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::UInt8 => "UInt8",
            Self::Int64 => "Int64",
            Self::UInt64 => "UInt64",
            Self::Float32 => "Float32",
            Self::Float64 => "Float64",
        }
    }

    pub(crate) fn from_bytes(bytes: &[u8]) -> Option<Self> {
        match bytes {
            b"UInt8" => Some(Self::UInt8),
            b"Int64" => Some(Self::Int64),
            b"UInt64" => Some(Self::UInt64),
            b"Float32" => Some(Self::Float32),
            b"Float64" => Some(Self::Float64),
            _ => None,
        }
    }

    /// size of a single value of this type in bytes
    pub fn size(&self) -> usize {
        match self {
            Self::UInt8 => 1,
            Self::Int64 => 8,
            Self::UInt64 => 8,
            Self::Float32 => 4,
            Self::Float64 => 8,
        }
    }
}

/// a scalar that can be written into (and read back from) a `DataArray`
pub trait Numeric: Copy + PartialEq + std::fmt::Debug + num_traits::Zero {
    const SIZE: usize;

    fn as_precision() -> Precision;

    fn extend_le_bytes(&self, buffer: &mut Vec<u8>);

    fn write_le_bytes<W: Write>(&self, writer: &mut W) -> Result<(), std::io::Error>;

    /// append the ascii representation of the number (without separators)
    fn push_ascii(&self, buffer: &mut String);

    fn from_le_slice(bytes: &[u8]) -> Self;

    fn from_ascii(text: &str) -> Option<Self>;
}

macro_rules! float_numeric {
    ($ty:ty, $precision:expr) => {
        impl Numeric for $ty {
            const SIZE: usize = std::mem::size_of::<$ty>();

            fn as_precision() -> Precision {
                $precision
            }

            fn extend_le_bytes(&self, buffer: &mut Vec<u8>) {
                buffer.extend_from_slice(&self.to_le_bytes());
            }

            fn write_le_bytes<W: Write>(&self, writer: &mut W) -> Result<(), std::io::Error> {
                writer.write_all(&self.to_le_bytes())
            }

            fn push_ascii(&self, buffer: &mut String) {
                let mut ryu_buffer = ryu::Buffer::new();
                buffer.push_str(ryu_buffer.format(*self));
            }

            fn from_le_slice(bytes: &[u8]) -> Self {
                let mut arr = [0; std::mem::size_of::<$ty>()];
                arr.copy_from_slice(&bytes[..Self::SIZE]);
                <$ty>::from_le_bytes(arr)
            }

            fn from_ascii(text: &str) -> Option<Self> {
                text.parse().ok()
            }
        }
    };
}

macro_rules! int_numeric {
    ($ty:ty, $precision:expr) => {
        impl Numeric for $ty {
            const SIZE: usize = std::mem::size_of::<$ty>();

            fn as_precision() -> Precision {
                $precision
            }

            fn extend_le_bytes(&self, buffer: &mut Vec<u8>) {
                buffer.extend_from_slice(&self.to_le_bytes());
            }

            fn write_le_bytes<W: Write>(&self, writer: &mut W) -> Result<(), std::io::Error> {
                writer.write_all(&self.to_le_bytes())
            }

            fn push_ascii(&self, buffer: &mut String) {
                buffer.push_str(&self.to_string());
            }

            fn from_le_slice(bytes: &[u8]) -> Self {
                let mut arr = [0; std::mem::size_of::<$ty>()];
                arr.copy_from_slice(&bytes[..Self::SIZE]);
                <$ty>::from_le_bytes(arr)
            }

            fn from_ascii(text: &str) -> Option<Self> {
                text.parse().ok()
            }
        }
    };
}

float_numeric!(f64, Precision::Float64);
float_numeric!(f32, Precision::Float32);
int_numeric!(i64, Precision::Int64);
int_numeric!(u8, Precision::UInt8);
int_numeric!(u64, Precision::UInt64);

/// type level information on how the arrays of a file are encoded
pub trait Encode {
    fn encoding() -> Encoding;

    fn is_binary() -> bool {
        matches!(Self::encoding(), Encoding::Binary)
    }
}
