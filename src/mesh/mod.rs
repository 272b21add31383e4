//! # Mesh Topology
//!
//! A spectral element stores its nodes on a structured `lx * ly * lz` tensor-product grid. To
//! build an unstructured grid, every element contributes a block of points (the nodes that are
//! kept) and a block of cells (one cell between every 2x2 (2D) or 2x2x2 (3D) group of adjacent
//! kept nodes).
//!
//! ## Sampling
//!
//! A [`Sampling`] describes which nodes of an element are kept. Without downsampling every node
//! is kept. With downsampling the stride along each axis is `nodes - 1`, which keeps only the
//! corner nodes of the element so that every element becomes a single cell. An axis with a
//! single node (the z axis of a 2D mesh) keeps its stride at 1.
//!
//! ## Point numbering
//!
//! The kept nodes of element `iel` occupy the points
//! `iel * nppel .. (iel + 1) * nppel`, with x varying fastest, then y, then z. This mapping is
//! available as the free function [`point_index`].
//!
//! ## Cell winding
//!
//! Quads are wound `(x, y)`, `(x+1, y)`, `(x+1, y+1)`, `(x, y+1)`. Hexahedra are two such quads:
//! the bottom face on layer `z` followed by the top face on layer `z+1`, which is the vertex
//! order VTK expects for `VTK_HEXAHEDRON`.

mod dim_2;
mod dim_3;

use crate::grid::CellType;
use std::iter::StepBy;
use std::ops::Range;

/// Flat index of the kept node `(ix, iy, iz)` of element `iel`
///
/// `kept` is the number of kept nodes along x, y and z.
///
/// ```
/// // second element of a mesh with 2x2x2 kept nodes per element
/// assert_eq!(exavtk::mesh::point_index(1, [1, 1, 0], [2, 2, 2]), 8 + 3);
/// ```
#[inline]
pub fn point_index(iel: usize, local: [usize; 3], kept: [usize; 3]) -> usize {
    let [ix, iy, iz] = local;
    let [nix, niy, niz] = kept;
    iel * nix * niy * niz + ix + iy * nix + iz * nix * niy
}

/// node selection along a single axis of an element
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AxisSampling {
    nodes: usize,
    stride: usize,
}

impl AxisSampling {
    pub fn new(nodes: usize, downsample: bool) -> Self {
        let stride = if downsample {
            nodes.saturating_sub(1).max(1)
        } else {
            1
        };

        Self { nodes, stride }
    }

    pub fn stride(&self) -> usize {
        self.stride
    }

    /// number of nodes kept along this axis
    pub fn kept(&self) -> usize {
        (self.nodes + self.stride - 1) / self.stride
    }

    /// the node indices of the element that are kept, in increasing order
    pub fn indices(&self) -> StepBy<Range<usize>> {
        (0..self.nodes).step_by(self.stride)
    }
}

/// Which nodes of every element become points of the grid
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Sampling {
    pub x: AxisSampling,
    pub y: AxisSampling,
    pub z: AxisSampling,
}

impl Sampling {
    /// sampling for elements with `lr1` nodes along x, y and z
    pub fn new(lr1: [usize; 3], downsample: bool) -> Self {
        Self {
            x: AxisSampling::new(lr1[0], downsample),
            y: AxisSampling::new(lr1[1], downsample),
            z: AxisSampling::new(lr1[2], downsample),
        }
    }

    /// `[nix, niy, niz]`
    pub fn kept(&self) -> [usize; 3] {
        [self.x.kept(), self.y.kept(), self.z.kept()]
    }

    /// number of points contributed by every element (`nppel`)
    pub fn points_per_element(&self) -> usize {
        self.kept().iter().product()
    }

    /// number of cells contributed by every element (`nepel`)
    pub fn cells_per_element(&self) -> usize {
        let [nix, niy, niz] = self.kept();
        nix.saturating_sub(1) * niy.saturating_sub(1) * cell_layers(niz)
    }

    #[inline]
    pub fn point_index(&self, iel: usize, ix: usize, iy: usize, iz: usize) -> usize {
        point_index(iel, [ix, iy, iz], self.kept())
    }

    /// iterate over the kept nodes of an element as `(local, node)` pairs, where `local` is the
    /// `[ix, iy, iz]` position among the kept nodes and `node` is the `[ex, ey, ez]` node index
    /// in the element arrays. x varies fastest.
    pub fn nodes(&self) -> impl Iterator<Item = ([usize; 3], [usize; 3])> + '_ {
        self.z.indices().enumerate().flat_map(move |(iz, ez)| {
            self.y.indices().enumerate().flat_map(move |(iy, ey)| {
                self.x
                    .indices()
                    .enumerate()
                    .map(move |(ix, ex)| ([ix, iy, iz], [ex, ey, ez]))
            })
        })
    }

    /// append the connectivity records of every cell of element `iel`
    ///
    /// Each record is the vertex count followed by the vertex indices.
    pub fn push_cells(&self, cell_type: CellType, iel: usize, connectivity: &mut Vec<usize>) {
        let [nix, niy, niz] = self.kept();

        for iz in 0..cell_layers(niz) {
            for iy in 0..niy.saturating_sub(1) {
                for ix in 0..nix.saturating_sub(1) {
                    connectivity.push(cell_type.vertices());

                    match cell_type {
                        CellType::Quad => {
                            connectivity.extend(dim_2::quad(self, iel, ix, iy, iz));
                        }
                        CellType::Hexahedron => {
                            connectivity.extend(dim_3::hexahedron(self, iel, ix, iy, iz));
                        }
                    }
                }
            }
        }
    }
}

/// a single layer of nodes still makes one layer of (2D) cells
fn cell_layers(niz: usize) -> usize {
    niz.saturating_sub(1).max(1)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn full_resolution_keeps_every_node() {
        let sampling = Sampling::new([5, 4, 3], false);

        assert_eq!(sampling.kept(), [5, 4, 3]);
        assert_eq!(sampling.points_per_element(), 60);
        assert_eq!(sampling.cells_per_element(), 4 * 3 * 2);
    }

    #[test]
    fn downsample_keeps_corners() {
        let sampling = Sampling::new([5, 5, 5], true);

        assert_eq!(sampling.x.stride(), 4);
        assert_eq!(sampling.x.indices().collect::<Vec<_>>(), vec![0, 4]);
        assert_eq!(sampling.kept(), [2, 2, 2]);
        assert_eq!(sampling.points_per_element(), 8);
        assert_eq!(sampling.cells_per_element(), 1);
    }

    #[test]
    fn downsample_degenerate_z_axis() {
        let sampling = Sampling::new([5, 5, 1], true);

        assert_eq!(sampling.z.stride(), 1);
        assert_eq!(sampling.z.indices().collect::<Vec<_>>(), vec![0]);
        assert_eq!(sampling.kept(), [2, 2, 1]);
        assert_eq!(sampling.cells_per_element(), 1);
    }

    #[test]
    fn downsample_even_node_count() {
        // stride 3 over 4 nodes still ends on the last node
        let axis = AxisSampling::new(4, true);
        assert_eq!(axis.indices().collect::<Vec<_>>(), vec![0, 3]);
        assert_eq!(axis.kept(), 2);
    }

    #[test]
    fn point_index_is_x_fastest() {
        let kept = [3, 2, 2];
        assert_eq!(point_index(0, [0, 0, 0], kept), 0);
        assert_eq!(point_index(0, [1, 0, 0], kept), 1);
        assert_eq!(point_index(0, [0, 1, 0], kept), 3);
        assert_eq!(point_index(0, [0, 0, 1], kept), 6);
        assert_eq!(point_index(0, [2, 1, 1], kept), 11);
        assert_eq!(point_index(2, [0, 0, 0], kept), 24);
    }

    #[test]
    fn nodes_follow_point_numbering() {
        let sampling = Sampling::new([3, 3, 3], true);
        let nodes: Vec<_> = sampling.nodes().collect();

        assert_eq!(nodes.len(), 8);
        assert_eq!(nodes[0], ([0, 0, 0], [0, 0, 0]));
        assert_eq!(nodes[1], ([1, 0, 0], [2, 0, 0]));
        assert_eq!(nodes[2], ([0, 1, 0], [0, 2, 0]));
        assert_eq!(nodes[7], ([1, 1, 1], [2, 2, 2]));

        for (position, (local, _)) in nodes.iter().enumerate() {
            assert_eq!(sampling.point_index(0, local[0], local[1], local[2]), position);
        }
    }

    #[test]
    fn single_hexahedron_winding() {
        let sampling = Sampling::new([2, 2, 2], false);
        let mut connectivity = Vec::new();
        sampling.push_cells(CellType::Hexahedron, 0, &mut connectivity);

        assert_eq!(connectivity, vec![8, 0, 1, 3, 2, 4, 5, 7, 6]);
    }

    #[test]
    fn quads_of_second_element() {
        let sampling = Sampling::new([3, 2, 1], false);
        let mut connectivity = Vec::new();
        sampling.push_cells(CellType::Quad, 1, &mut connectivity);

        // element 1 owns points 6..12
        assert_eq!(connectivity, vec![4, 6, 7, 10, 9, 4, 7, 8, 11, 10]);
    }
}
