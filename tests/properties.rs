use approx::assert_abs_diff_eq;
use beta::util::rand_int;
use beta::{Vector2D, hsl, hwb, rgb};
use proptest::prelude::*;
use rand::SeedableRng;
use rand::rngs::StdRng;

fn coord() -> impl Strategy<Value = f64> {
    -1.0e3..1.0e3
}

fn vector() -> impl Strategy<Value = Vector2D> {
    (coord(), coord()).prop_map(|(x, y)| Vector2D::new(x, y))
}

proptest! {
    #[test]
    fn normalize_has_unit_length(v in vector()) {
        prop_assume!(v.magnitude() > 1e-9);
        prop_assert!((v.normalize().magnitude() - 1.0).abs() < 1e-9);
    }

    #[test]
    fn scalar_mult_then_div_recovers_vector(v in vector(), s in prop_oneof![-1.0e3..-1.0e-3, 1.0e-3..1.0e3]) {
        let back = v.scalar_mult(s).scalar_div(s);
        prop_assert!((back.x - v.x).abs() <= 1e-9 * v.x.abs().max(1.0));
        prop_assert!((back.y - v.y).abs() <= 1e-9 * v.y.abs().max(1.0));
    }

    #[test]
    fn dot_is_commutative(a in vector(), b in vector()) {
        prop_assert_eq!(a.dot(b), b.dot(a));
    }

    #[test]
    fn full_turn_returns_home(v in vector(), pivot in vector()) {
        let r = v.rotate(pivot, 360.0);
        prop_assert!((r.x - v.x).abs() < 1e-9);
        prop_assert!((r.y - v.y).abs() < 1e-9);
    }

    #[test]
    fn from_polar_keeps_radius(radius in -1.0e3..1.0e3f64, angle in -720.0..720.0f64) {
        let v = Vector2D::from_polar(radius, angle);
        prop_assert!((v.magnitude() - radius.abs()).abs() < 1e-9);
    }

    #[test]
    fn angle_stays_within_half_turn(v in vector()) {
        prop_assume!(v != Vector2D::ZERO);
        let a = v.angle();
        prop_assert!((-180.0..=180.0).contains(&a));
    }

    #[test]
    fn hsl_hue_wraps_every_turn(hue in -720.0..720.0f64, s in 0.0..100.0f64, l in 0.0..100.0f64) {
        prop_assert_eq!(hsl(hue, s, l), hsl(hue + 360.0, s, l));
    }

    #[test]
    fn hwb_at_full_sum_is_gray(hue in 0.0..360.0f64, w in 0.0..100.0f64) {
        let c = hwb(hue, w, 100.0 - w);
        prop_assert!(c.r().abs_diff(c.g()) <= 1 && c.g().abs_diff(c.b()) <= 1);
    }
}

#[test]
fn zero_vector_normalizes_to_itself() {
    assert_eq!(Vector2D::ZERO.normalize(), Vector2D::ZERO);
}

#[test]
fn distance_examples() {
    let a = Vector2D::new(-1.0, 2.0);
    let b = Vector2D::new(2.0, -2.0);
    assert_abs_diff_eq!(a.distance(b), 5.0);
    assert_abs_diff_eq!(a.grid_distance(b), 7.0);
}

#[test]
fn color_round_trip_sanity() {
    assert_eq!(hsl(0.0, 100.0, 50.0), rgb(255.0, 0.0, 0.0));
    assert_eq!(hsl(120.0, 100.0, 50.0), rgb(0.0, 255.0, 0.0));
    assert_eq!(hsl(240.0, 100.0, 50.0), rgb(0.0, 0.0, 255.0));
    assert_eq!(beta::hsv(0.0, 0.0, 100.0), rgb(255.0, 255.0, 255.0));
    assert_eq!(hwb(0.0, 100.0, 0.0), rgb(255.0, 255.0, 255.0));
    assert_eq!(hsl(-30.0, 70.0, 30.0), hsl(330.0, 70.0, 30.0));

    let clamped = beta::rgba(-10.0, 300.0, 128.5, 1.5);
    assert_eq!((clamped.r(), clamped.g()), (0, 255));
    assert!(clamped.b() == 128 || clamped.b() == 129);
    assert_eq!(clamped.a(), 1.0);
}

#[test]
fn rand_int_bounds() {
    let mut rng = StdRng::seed_from_u64(99);
    for _ in 0..200 {
        assert!((1..=5).contains(&rand_int(&mut rng, 5.0, 1.0).unwrap()));
        assert!((1..=5).contains(&rand_int(&mut rng, 1.0, 5.0).unwrap()));
    }
    assert_eq!(rand_int(&mut rng, 1.1, 1.2), None);
}
