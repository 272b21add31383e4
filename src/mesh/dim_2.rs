use super::Sampling;

/// corners of the quad whose lowest corner is the kept node `(ix, iy)` on layer `iz`
#[inline]
pub(super) fn quad(sampling: &Sampling, iel: usize, ix: usize, iy: usize, iz: usize) -> [usize; 4] {
    [
        sampling.point_index(iel, ix, iy, iz),
        sampling.point_index(iel, ix + 1, iy, iz),
        sampling.point_index(iel, ix + 1, iy + 1, iz),
        sampling.point_index(iel, ix, iy + 1, iz),
    ]
}

#[test]
fn counter_clockwise_from_origin() {
    let sampling = Sampling::new([2, 2, 1], false);
    assert_eq!(quad(&sampling, 0, 0, 0, 0), [0, 1, 3, 2]);
}
