use super::dim_2::quad;
use super::Sampling;

/// corners of the hexahedron between layers `iz` and `iz + 1`: the bottom quad followed by
/// the top quad, both with the same winding
#[inline]
pub(super) fn hexahedron(
    sampling: &Sampling,
    iel: usize,
    ix: usize,
    iy: usize,
    iz: usize,
) -> [usize; 8] {
    let bottom = quad(sampling, iel, ix, iy, iz);
    let top = quad(sampling, iel, ix, iy, iz + 1);

    [
        bottom[0], bottom[1], bottom[2], bottom[3], top[0], top[1], top[2], top[3],
    ]
}

#[test]
fn top_face_is_offset_by_one_layer() {
    let sampling = Sampling::new([3, 3, 3], false);
    let corners = hexahedron(&sampling, 0, 1, 1, 1);

    // layer stride is 3 * 3 = 9
    assert_eq!(corners, [13, 14, 17, 16, 22, 23, 26, 25]);
}
