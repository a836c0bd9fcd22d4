use crate::rand::Rng;

/// Maps a point sampled from the source raster into destination space.
///
/// Each axis is scaled by `dest / source` and then offset by an independent uniform integer in
/// `[-jitter, jitter]`. The result is not clamped and may lie outside the destination.
pub fn map_point(
    (source_x, source_y): (f64, f64),
    (source_width, source_height): (u32, u32),
    (dest_width, dest_height): (u32, u32),
    jitter: u32,
    rng: &mut Rng,
) -> (f64, f64) {
    let j = i64::from(jitter);
    let dest_x = source_x * f64::from(dest_width) / f64::from(source_width)
        + rng.uniform_int(-j, j) as f64;
    let dest_y = source_y * f64::from(dest_height) / f64::from(source_height)
        + rng.uniform_int(-j, j) as f64;
    (dest_x, dest_y)
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_scale_without_jitter() {
        let mut rng = Rng::from_seed(b"");
        assert_eq!(
            map_point((10.0, 5.0), (100, 50), (200, 25), 0, &mut rng),
            (20.0, 2.5)
        );
        assert_eq!(
            map_point((0.0, 0.0), (3, 7), (300, 700), 0, &mut rng),
            (0.0, 0.0)
        );
    }

    #[test]
    fn test_jitter_is_bounded_integral_and_per_axis() {
        let mut rng = Rng::from_seed(b"jitter");
        let mut dx_seen = std::collections::HashSet::new();
        let mut differ = false;
        for _ in 0..2000 {
            let (x, y) = map_point((50.0, 50.0), (100, 100), (100, 100), 3, &mut rng);
            let (dx, dy) = (x - 50.0, y - 50.0);
            assert!((-3.0..=3.0).contains(&dx), "dx = {}", dx);
            assert!((-3.0..=3.0).contains(&dy), "dy = {}", dy);
            assert_eq!(dx.fract(), 0.0);
            assert_eq!(dy.fract(), 0.0);
            dx_seen.insert(dx as i64);
            differ |= dx != dy;
        }
        assert_eq!(dx_seen.len(), 7);
        assert!(differ);
    }

    #[test]
    fn test_result_may_leave_destination() {
        let mut rng = Rng::from_seed(b"edge");
        let mut outside = false;
        for _ in 0..200 {
            let (x, y) = map_point((0.0, 0.0), (10, 10), (10, 10), 5, &mut rng);
            outside |= x < 0.0 || y < 0.0;
        }
        assert!(outside);
    }
}
