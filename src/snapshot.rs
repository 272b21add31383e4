//! In-memory representation of a spectral-element field snapshot
//!
//! A [`Snapshot`] holds the nodal values of every element of a Nek5000 style mesh. Each
//! element stores its fields as tensor-product arrays shaped `(component, z, y, x)`, so the
//! node at `(x, y, z)` of the `c`-th component of the velocity is `elem.vel[[c, z, y, x]]`.
//!
//! Reading field files into a `Snapshot` is not handled by this crate.

use ndarray::Array4;

/// Which fields are present in a [`Snapshot`]
///
/// This replaces the positional `var` array of the field file header. The array form is still
/// accepted through `From<[usize; 5]>`:
///
/// ```
/// let var = exavtk::Variables::from([3, 3, 1, 0, 2]);
/// assert!(var.position && var.velocity && var.pressure);
/// assert!(!var.temperature);
/// assert_eq!(var.scalars, 2);
/// ```
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Variables {
    /// element coordinates (`pos`)
    pub position: bool,
    /// velocity vector (`vel`)
    pub velocity: bool,
    /// pressure (`pres`)
    pub pressure: bool,
    /// temperature (`temp`)
    pub temperature: bool,
    /// number of passive scalars (`scal`)
    pub scalars: usize,
}

impl Variables {
    /// only coordinates, the minimum for a grid to be built
    pub fn positions_only() -> Self {
        Self {
            position: true,
            ..Self::default()
        }
    }

    /// number of components stored for the coordinates and velocity of each node
    pub(crate) const VECTOR_COMPONENTS: usize = 3;
}

impl From<[usize; 5]> for Variables {
    /// `[position components, velocity components, pressure, temperature, scalar count]`
    fn from(var: [usize; 5]) -> Self {
        Self {
            position: var[0] != 0,
            velocity: var[1] != 0,
            pressure: var[2] == 1,
            temperature: var[3] == 1,
            scalars: var[4],
        }
    }
}

/// nodal data of a single spectral element
///
/// Every array is shaped `(component, z, y, x)`. Absent fields have zero components.
#[derive(Debug, Clone, PartialEq)]
pub struct Element {
    pub pos: Array4<f64>,
    pub vel: Array4<f64>,
    pub pres: Array4<f64>,
    pub temp: Array4<f64>,
    pub scal: Array4<f64>,
}

impl Element {
    /// allocate zero-filled arrays for an element with `lr1` nodes per axis
    pub fn zeros(lr1: [usize; 3], var: &Variables) -> Self {
        let [lx, ly, lz] = lr1;
        let shape = |components: usize| -> Array4<f64> { Array4::zeros((components, lz, ly, lx)) };
        let vector = |present: bool| if present { Variables::VECTOR_COMPONENTS } else { 0 };

        Self {
            pos: shape(vector(var.position)),
            vel: shape(vector(var.velocity)),
            pres: shape(var.pressure as usize),
            temp: shape(var.temperature as usize),
            scal: shape(var.scalars),
        }
    }
}

/// A complete field snapshot: mesh coordinates and solution for every element
///
/// ## Preconditions
///
/// The shapes of the arrays in `elem` must agree with `lr1` and `var` for every element,
/// and `elem` must hold at least `nel` elements. This is not validated; the conversion
/// routines panic on out of bounds indexing if it does not hold.
#[derive(Debug, Clone, PartialEq)]
pub struct Snapshot {
    /// spatial dimension, 2 or 3
    pub ndim: usize,
    /// number of elements
    pub nel: usize,
    /// nodes per element along x, y and z (z is 1 for 2D meshes)
    pub lr1: [usize; 3],
    pub var: Variables,
    /// simulation time of the snapshot
    pub time: f64,
    /// time step index of the snapshot
    pub istep: usize,
    pub elem: Vec<Element>,
}

impl Snapshot {
    /// allocate a snapshot with zero-filled elements of the correct shape
    pub fn new(ndim: usize, nel: usize, lr1: [usize; 3], var: Variables) -> Self {
        let elem = (0..nel).map(|_| Element::zeros(lr1, &var)).collect();

        Self {
            ndim,
            nel,
            lr1,
            var,
            time: 0.0,
            istep: 0,
            elem,
        }
    }

    /// number of nodes stored for each element
    pub fn nodes_per_element(&self) -> usize {
        self.lr1.iter().product()
    }
}
