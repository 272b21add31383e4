//! The unstructured grid produced from a [`Snapshot`](crate::Snapshot)

use derive_more::Deref;
use ndarray::Array2;

/// The single cell topology used by a [`Grid`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CellType {
    /// 4 vertex cell, used for 2D meshes
    Quad,
    /// 8 vertex cell, used for 3D meshes
    Hexahedron,
}

impl CellType {
    /// topology of the cells for a mesh of dimension `ndim`
    pub fn for_dimension(ndim: usize) -> Self {
        if ndim == 3 {
            Self::Hexahedron
        } else {
            Self::Quad
        }
    }

    /// number of vertices of a single cell
    pub fn vertices(&self) -> usize {
        match self {
            Self::Quad => 4,
            Self::Hexahedron => 8,
        }
    }

    /// `VTK_QUAD` / `VTK_HEXAHEDRON`
    pub fn vtk_id(&self) -> u8 {
        match self {
            Self::Quad => 9,
            Self::Hexahedron => 12,
        }
    }

    pub(crate) fn from_vtk_id(id: u8) -> Option<Self> {
        match id {
            9 => Some(Self::Quad),
            12 => Some(Self::Hexahedron),
            _ => None,
        }
    }
}

/// A named array with one row per point of the grid
#[derive(Debug, Clone, PartialEq)]
pub struct PointArray {
    pub name: String,
    /// shape `(number of points, components)`
    pub values: Array2<f64>,
}

impl PointArray {
    pub fn components(&self) -> usize {
        self.values.ncols()
    }
}

/// Ordered collection of the point data arrays of a grid
///
/// Arrays are kept in the order they were added, and that order is preserved when the grid is
/// written. One array may be marked as the active scalars and one as the active vectors.
#[derive(Debug, Clone, Default, PartialEq, Deref)]
pub struct PointData {
    #[deref]
    arrays: Vec<PointArray>,
    scalars: Option<String>,
    vectors: Option<String>,
}

impl PointData {
    pub fn new() -> Self {
        Self::default()
    }

    /// append an array after all arrays already present
    pub fn push<T: Into<String>>(&mut self, name: T, values: Array2<f64>) {
        self.arrays.push(PointArray {
            name: name.into(),
            values,
        });
    }

    /// look up an array by name
    pub fn get(&self, name: &str) -> Option<&Array2<f64>> {
        self.arrays
            .iter()
            .find(|array| array.name == name)
            .map(|array| &array.values)
    }

    /// the names of all arrays in order
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.arrays.iter().map(|array| array.name.as_str())
    }

    pub fn set_active_scalars<T: Into<String>>(&mut self, name: T) {
        self.scalars = Some(name.into());
    }

    pub fn set_active_vectors<T: Into<String>>(&mut self, name: T) {
        self.vectors = Some(name.into());
    }

    pub fn active_scalars(&self) -> Option<&str> {
        self.scalars.as_deref()
    }

    pub fn active_vectors(&self) -> Option<&str> {
        self.vectors.as_deref()
    }
}

/// An unstructured grid of a single cell type with data attached to its points
///
/// `connectivity` stores one fixed length record per cell: the number of vertices of the cell
/// followed by the indices of those vertices in `points`.
#[derive(Debug, Clone, PartialEq)]
pub struct Grid {
    /// coordinates, shape `(number of points, 3)`
    pub points: Array2<f64>,
    pub cell_type: CellType,
    pub connectivity: Vec<usize>,
    pub point_data: PointData,
    /// simulation time, written as field data when present
    pub time: Option<f64>,
}

impl Grid {
    pub fn num_points(&self) -> usize {
        self.points.nrows()
    }

    pub fn num_cells(&self) -> usize {
        self.connectivity.len() / self.record_len()
    }

    /// vertex indices of every cell, without the leading vertex count
    pub fn cells(&self) -> impl Iterator<Item = &[usize]> {
        self.connectivity
            .chunks_exact(self.record_len())
            .map(|record| &record[1..])
    }

    fn record_len(&self) -> usize {
        self.cell_type.vertices() + 1
    }

    /// vertex indices of all cells, back to back
    pub(crate) fn vtk_connectivity(&self) -> Vec<i64> {
        self.cells().flatten().map(|&index| index as i64).collect()
    }

    /// end position of every cell in `vtk_connectivity`
    pub(crate) fn vtk_offsets(&self) -> Vec<i64> {
        let nvert = self.cell_type.vertices() as i64;
        (1..=self.num_cells() as i64).map(|cell| cell * nvert).collect()
    }

    pub(crate) fn vtk_types(&self) -> Vec<u8> {
        vec![self.cell_type.vtk_id(); self.num_cells()]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn two_quads() -> Grid {
        Grid {
            points: Array2::zeros((6, 3)),
            cell_type: CellType::Quad,
            connectivity: vec![4, 0, 1, 4, 3, 4, 1, 2, 5, 4],
            point_data: PointData::new(),
            time: None,
        }
    }

    #[test]
    fn cell_records() {
        let grid = two_quads();

        assert_eq!(grid.num_points(), 6);
        assert_eq!(grid.num_cells(), 2);

        let cells: Vec<&[usize]> = grid.cells().collect();
        let expected: Vec<&[usize]> = vec![&[0, 1, 4, 3][..], &[1, 2, 5, 4][..]];
        assert_eq!(cells, expected);
    }

    #[test]
    fn vtk_cell_arrays() {
        let grid = two_quads();

        assert_eq!(grid.vtk_connectivity(), vec![0, 1, 4, 3, 1, 2, 5, 4]);
        assert_eq!(grid.vtk_offsets(), vec![4, 8]);
        assert_eq!(grid.vtk_types(), vec![9, 9]);
    }

    #[test]
    fn point_data_keeps_insertion_order() {
        let mut data = PointData::new();
        data.push("vel", Array2::zeros((2, 3)));
        data.push("temp", Array2::zeros((2, 1)));
        data.push("pres", Array2::zeros((2, 1)));
        data.set_active_scalars("pres");

        assert_eq!(data.names().collect::<Vec<_>>(), vec!["vel", "temp", "pres"]);
        assert_eq!(data.len(), 3);
        assert_eq!(data[0].components(), 3);
        assert_eq!(data.get("temp").map(|a| a.dim()), Some((2, 1)));
        assert_eq!(data.active_scalars(), Some("pres"));
        assert_eq!(data.active_vectors(), None);
    }
}
