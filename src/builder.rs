//! Conversion of a [`Snapshot`] into a [`Grid`]

use crate::grid::{CellType, Grid, PointData};
use crate::mesh::Sampling;
use crate::snapshot::{Snapshot, Variables};
use crate::Error;

use log::debug;
use ndarray::{Array2, Array4};

/// Builds an unstructured [`Grid`] from the elements of a [`Snapshot`]
///
/// ```
/// use exavtk::{GridBuilder, Snapshot, Variables};
///
/// let snapshot = Snapshot::new(3, 4, [5, 5, 5], Variables::positions_only());
///
/// let grid = GridBuilder::new().downsample(true).build(&snapshot).unwrap();
/// assert_eq!(grid.num_points(), 4 * 8);
/// assert_eq!(grid.num_cells(), 4);
/// ```
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct GridBuilder {
    downsample: bool,
}

impl GridBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// keep only the corner nodes of every element
    pub fn downsample(mut self, downsample: bool) -> Self {
        self.downsample = downsample;
        self
    }

    /// Build the grid.
    ///
    /// Point data arrays are added in the order `vel`, `pres`, `temp`, `scal_1` .. `scal_N`,
    /// skipping fields that are not present in `snapshot.var`.
    ///
    /// ## Errors
    ///
    /// Returns [`Error::MissingPositions`] if the snapshot has no coordinates.
    ///
    /// ## Panics
    ///
    /// Panics if the element arrays do not have the shapes described by `lr1` and `var`, or if
    /// there are fewer than `nel` elements.
    pub fn build(&self, snapshot: &Snapshot) -> Result<Grid, Error> {
        let var = snapshot.var;

        if !var.position {
            return Err(Error::MissingPositions);
        }

        let sampling = Sampling::new(snapshot.lr1, self.downsample);
        let cell_type = CellType::for_dimension(snapshot.ndim);

        let num_points = sampling.points_per_element() * snapshot.nel;
        let num_cells = sampling.cells_per_element() * snapshot.nel;

        debug!(
            "building {:?} grid: {} elements, kept nodes {:?}, {} points, {} cells",
            cell_type,
            snapshot.nel,
            sampling.kept(),
            num_points,
            num_cells
        );

        let vector = || Array2::<f64>::zeros((num_points, Variables::VECTOR_COMPONENTS));
        let scalar = || Array2::<f64>::zeros((num_points, 1));

        let mut points = vector();
        let mut velocity = var.velocity.then(vector);
        let mut pressure = var.pressure.then(scalar);
        let mut temperature = var.temperature.then(scalar);
        let mut scalars: Vec<Array2<f64>> = (0..var.scalars).map(|_| scalar()).collect();

        let mut connectivity = Vec::with_capacity(num_cells * (cell_type.vertices() + 1));

        for (iel, element) in snapshot.elem[..snapshot.nel].iter().enumerate() {
            for (local, node) in sampling.nodes() {
                let row = sampling.point_index(iel, local[0], local[1], local[2]);

                copy_node(&element.pos, &mut points, row, node);

                if let Some(velocity) = velocity.as_mut() {
                    copy_node(&element.vel, velocity, row, node);
                }
                if let Some(pressure) = pressure.as_mut() {
                    copy_node(&element.pres, pressure, row, node);
                }
                if let Some(temperature) = temperature.as_mut() {
                    copy_node(&element.temp, temperature, row, node);
                }

                let [ex, ey, ez] = node;
                for (component, scalar) in scalars.iter_mut().enumerate() {
                    scalar[[row, 0]] = element.scal[[component, ez, ey, ex]];
                }
            }

            sampling.push_cells(cell_type, iel, &mut connectivity);
        }

        let mut point_data = PointData::new();

        if let Some(velocity) = velocity {
            point_data.push("vel", velocity);
            point_data.set_active_vectors("vel");
        }
        if let Some(pressure) = pressure {
            point_data.push("pres", pressure);
            point_data.set_active_scalars("pres");
        }
        if let Some(temperature) = temperature {
            point_data.push("temp", temperature);
        }
        for (index, scalar) in scalars.into_iter().enumerate() {
            point_data.push(format!("scal_{}", index + 1), scalar);
        }

        Ok(Grid {
            points,
            cell_type,
            connectivity,
            point_data,
            time: Some(snapshot.time),
        })
    }
}

/// Build a grid from `snapshot`, see [`GridBuilder::build`]
pub fn build(snapshot: &Snapshot, downsample: bool) -> Result<Grid, Error> {
    GridBuilder::new().downsample(downsample).build(snapshot)
}

/// copy every component of node `[ex, ey, ez]` of an element array into row `row` of `target`
///
/// 2D meshes may store only two coordinate components, in which case z stays 0.
#[inline]
fn copy_node(source: &Array4<f64>, target: &mut Array2<f64>, row: usize, node: [usize; 3]) {
    let [ex, ey, ez] = node;
    let components = source.shape()[0].min(target.ncols());

    for component in 0..components {
        target[[row, component]] = source[[component, ez, ey, ex]];
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// fill every field with a value that identifies the element, node and component
    fn tagged_snapshot(ndim: usize, nel: usize, lr1: [usize; 3], var: Variables) -> Snapshot {
        let mut snapshot = Snapshot::new(ndim, nel, lr1, var);

        for (iel, element) in snapshot.elem.iter_mut().enumerate() {
            let tag = |c: usize, z: usize, y: usize, x: usize| {
                (iel * 10000 + c * 1000 + z * 100 + y * 10 + x) as f64
            };

            for array in [
                &mut element.pos,
                &mut element.vel,
                &mut element.pres,
                &mut element.temp,
                &mut element.scal,
            ] {
                for ((c, z, y, x), value) in array.indexed_iter_mut() {
                    *value = tag(c, z, y, x);
                }
            }
        }

        snapshot
    }

    #[test]
    fn single_hexahedron() {
        let snapshot = tagged_snapshot(3, 1, [2, 2, 2], Variables::positions_only());
        let grid = build(&snapshot, false).unwrap();

        assert_eq!(grid.num_points(), 8);
        assert_eq!(grid.num_cells(), 1);
        assert_eq!(grid.cell_type, CellType::Hexahedron);
        assert_eq!(grid.connectivity, vec![8, 0, 1, 3, 2, 4, 5, 7, 6]);
        assert!(grid.point_data.is_empty());

        // point 3 is node (x=1, y=1, z=0)
        assert_eq!(grid.points.row(3).to_vec(), vec![11.0, 1011.0, 2011.0]);
    }

    #[test]
    fn missing_positions_are_rejected() {
        let var = Variables::from([0, 3, 1, 0, 0]);
        let snapshot = Snapshot::new(3, 1, [2, 2, 2], var);

        assert!(matches!(
            build(&snapshot, false),
            Err(Error::MissingPositions)
        ));
    }

    #[test]
    fn downsampled_values_come_from_corners() {
        let var = Variables::from([3, 0, 1, 0, 0]);
        let snapshot = tagged_snapshot(3, 2, [4, 4, 4], var);
        let grid = build(&snapshot, true).unwrap();

        assert_eq!(grid.num_points(), 16);
        assert_eq!(grid.num_cells(), 2);

        // last point of the second element is its (3, 3, 3) node
        let pressure = grid.point_data.get("pres").unwrap();
        assert_eq!(pressure[[15, 0]], 10333.0);
        assert_eq!(grid.points[[15, 2]], 12333.0);
        assert_eq!(grid.connectivity[9..], [8, 8, 9, 11, 10, 12, 13, 15, 14]);
    }

    #[test]
    fn quads_in_two_dimensions() {
        let snapshot = tagged_snapshot(2, 3, [3, 3, 1], Variables::positions_only());
        let grid = build(&snapshot, false).unwrap();

        assert_eq!(grid.cell_type, CellType::Quad);
        assert_eq!(grid.num_points(), 27);
        assert_eq!(grid.num_cells(), 12);
        assert!(grid.cells().all(|cell| cell.len() == 4));
    }

    #[test]
    fn two_component_positions_leave_z_at_zero() {
        let mut snapshot = Snapshot::new(2, 1, [2, 2, 1], Variables::positions_only());
        snapshot.elem[0].pos = Array4::from_elem((2, 1, 2, 2), 1.5);

        let grid = build(&snapshot, false).unwrap();

        assert!(grid.points.column(0).iter().all(|&x| x == 1.5));
        assert!(grid.points.column(2).iter().all(|&z| z == 0.0));
    }

    #[test]
    fn point_data_order_and_active_arrays() {
        let var = Variables::from([3, 3, 1, 1, 2]);
        let snapshot = tagged_snapshot(3, 1, [3, 3, 3], var);
        let grid = build(&snapshot, false).unwrap();

        let names: Vec<_> = grid.point_data.names().collect();
        assert_eq!(names, vec!["vel", "pres", "temp", "scal_1", "scal_2"]);
        assert_eq!(grid.point_data.active_vectors(), Some("vel"));
        assert_eq!(grid.point_data.active_scalars(), Some("pres"));

        // node (x=2, y=1, z=0) is point 5
        let scal_2 = grid.point_data.get("scal_2").unwrap();
        assert_eq!(scal_2[[5, 0]], 1012.0);
    }

    #[test]
    fn snapshot_time_is_kept() {
        let mut snapshot = Snapshot::new(3, 1, [2, 2, 2], Variables::positions_only());
        snapshot.time = 0.25;

        assert_eq!(build(&snapshot, false).unwrap().time, Some(0.25));
    }
}
