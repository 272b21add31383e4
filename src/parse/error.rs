use super::event_summary::EventSummary;
use derive_more::{Constructor, Display, From};
use quick_xml::name::QName;

/// Everything that can go wrong while reading an unstructured grid file
#[derive(Debug, thiserror::Error, From)]
pub enum ParseError {
    #[error("{0}")]
    MalformedXml(MalformedXml),
    #[error("{0}")]
    MalformedAttribute(MalformedAttribute),
    #[error("{0}")]
    UnexpectedElement(UnexpectedElement),
    #[error("{0}")]
    MissingAttribute(MissingAttribute),
    #[error("{0}")]
    UnexpectedAttributeValue(UnexpectedAttributeValue),
    #[error("{0}")]
    MissingArray(MissingArray),
    #[error("{0}")]
    InlineAsciiArray(InlineAsciiArray),
    #[error("{0}")]
    InlineBase64Array(InlineBase64Array),
    #[error("{0}")]
    ParsingBinary(ParsingBinary),
    #[error("{0}")]
    ArrayLength(ArrayLength),
    #[error("{0}")]
    CellLayout(CellLayout),
}

impl From<quick_xml::Error> for ParseError {
    fn from(xml_err: quick_xml::Error) -> Self {
        Self::MalformedXml(MalformedXml::from(xml_err))
    }
}

impl From<quick_xml::events::attributes::AttrError> for ParseError {
    fn from(att_err: quick_xml::events::attributes::AttrError) -> Self {
        Self::MalformedAttribute(MalformedAttribute::from(att_err))
    }
}

#[derive(From, Display, Debug)]
#[display(fmt = "failed to parse an xml element: {xml_err}")]
pub struct MalformedXml {
    xml_err: quick_xml::Error,
}

#[derive(From, Display, Debug)]
#[display(fmt = "failed to parse an xml attribute: {att_err}")]
pub struct MalformedAttribute {
    att_err: quick_xml::events::attributes::AttrError,
}

#[derive(Display, Debug)]
#[display(fmt = "unexpected element. Expected `{expected_name}`, got {actual_element}")]
pub struct UnexpectedElement {
    expected_name: String,
    actual_element: EventSummary,
}

impl UnexpectedElement {
    pub(crate) fn new<T: Into<String>>(expected_name: T, actual_element: EventSummary) -> Self {
        Self {
            expected_name: expected_name.into(),
            actual_element,
        }
    }
}

#[derive(Display, Debug, Constructor)]
#[display(
    fmt = "unexpected attribute value for {attribute_name} in {element_name} element: expected {expected_value}, got {actual_value}"
)]
pub struct UnexpectedAttributeValue {
    pub(crate) element_name: String,
    pub(crate) attribute_name: String,
    pub(crate) expected_value: String,
    pub(crate) actual_value: ParsedNameOrBytes,
}

#[derive(Display, Debug, Constructor)]
#[display(fmt = "missing attribute `{attribute_name}` in {element_name} element")]
pub struct MissingAttribute {
    element_name: String,
    attribute_name: String,
}

#[derive(Display, Debug, Constructor)]
#[display(fmt = "missing DataArray `{array_name}` in {section} section")]
pub struct MissingArray {
    section: String,
    array_name: String,
}

#[derive(Display, Debug, Constructor)]
#[display(fmt = "Failed to parse inline ascii array `{array_name}` in DataArray element")]
pub struct InlineAsciiArray {
    array_name: String,
}

#[derive(Display, Debug, Constructor)]
#[display(fmt = "Failed to decode inline base64 array `{array_name}` in DataArray element")]
pub struct InlineBase64Array {
    array_name: String,
}

#[derive(Display, Debug, Constructor)]
#[display(
    fmt = "Failed to slice array `{array_name}` at offset {offset} from appended binary bytes. Appended binary section may be too short"
)]
pub struct ParsingBinary {
    array_name: String,
    offset: usize,
}

#[derive(Display, Debug, Constructor)]
#[display(fmt = "array `{array_name}` holds {actual} values, expected {expected}")]
pub struct ArrayLength {
    array_name: String,
    expected: usize,
    actual: usize,
}

#[derive(Display, Debug)]
pub enum CellLayout {
    #[display(fmt = "unsupported vtk cell type {_0}, only quads (9) and hexahedra (12) are read")]
    UnsupportedType(u8),
    #[display(fmt = "grid mixes cell types {_0} and {_1}")]
    MixedTypes(u8, u8),
    #[display(fmt = "offset of cell {_0} does not match a cell of {_1} vertices")]
    Offsets(usize, usize),
}

#[derive(From, Display, Debug)]
pub enum ParsedNameOrBytes {
    #[display(fmt = "{_0}")]
    Utf8(String),
    #[display(fmt = "{_0:?} (cannot convert to UTF8 string)")]
    Bytes(Vec<u8>),
}

impl ParsedNameOrBytes {
    pub(crate) fn new(bytes: &[u8]) -> Self {
        let vec = Vec::from(bytes);
        match String::from_utf8(vec) {
            Ok(string) => Self::Utf8(string),
            Err(e) => Self::Bytes(e.into_bytes()),
        }
    }
}

impl<'a> From<QName<'a>> for ParsedNameOrBytes {
    fn from(x: QName) -> Self {
        Self::new(x.as_ref())
    }
}
