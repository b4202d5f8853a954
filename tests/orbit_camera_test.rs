use std::time::Duration;

use cgmath::{Deg, EuclideanSpace, Point3, Rad};
use vitrine::camera::{
    AUTO_ROTATE_DEG_PER_SEC, ORBIT_DAMPING, OrbitCamera, OrbitController, Projection,
};

const EPS: f32 = 1e-4;

#[test]
fn aspect_matches_viewport_for_arbitrary_dimensions() {
    for (width, height) in [(1u32, 1u32), (1280, 720), (1920, 1080), (333, 77), (77, 333)] {
        let projection = Projection::new(width, height, Deg(50.0), 0.1, 1000.0);
        assert!((projection.aspect - width as f32 / height as f32).abs() < EPS);
    }
}

#[test]
fn resize_keeps_aspect_in_step_with_the_surface() {
    let mut projection = Projection::new(800, 600, Deg(50.0), 0.1, 1000.0);
    for (width, height) in [(1024u32, 768u32), (500, 500), (2560, 1440), (123, 456)] {
        projection.resize(width, height);
        assert!((projection.aspect - width as f32 / height as f32).abs() < EPS);
    }
}

#[test]
fn eye_stays_on_the_orbit_sphere() {
    let camera = OrbitCamera::new(Point3::origin(), Deg(42.0), Deg(10.0), 7.5);
    let eye = camera.eye();
    let distance =
        (eye.x * eye.x + eye.y * eye.y + eye.z * eye.z).sqrt();
    assert!((distance - 7.5).abs() < EPS);
}

#[test]
fn initial_framing_matches_the_reference_eye() {
    // The viewer frames the model from (0, 2, 5)
    let camera = OrbitCamera::new(Point3::origin(), Deg(90.0), Deg(21.8), 5.39);
    let eye = camera.eye();
    assert!(eye.x.abs() < 0.05);
    assert!((eye.y - 2.0).abs() < 0.05);
    assert!((eye.z - 5.0).abs() < 0.05);
}

#[test]
fn auto_rotation_advances_yaw_at_the_fixed_rate() {
    let mut camera = OrbitCamera::new(Point3::origin(), Deg(0.0), Deg(0.0), 5.0);
    let mut controller = OrbitController::new(AUTO_ROTATE_DEG_PER_SEC, ORBIT_DAMPING);

    controller.update(&mut camera, Duration::from_secs(1));
    let expected: Rad<f32> = Deg(AUTO_ROTATE_DEG_PER_SEC).into();
    assert!((camera.yaw.0 - expected.0).abs() < EPS);

    controller.update(&mut camera, Duration::from_secs(1));
    assert!((camera.yaw.0 - 2.0 * expected.0).abs() < EPS);
}

#[test]
fn pitch_is_clamped_off_the_poles() {
    let mut camera = OrbitCamera::new(Point3::origin(), Deg(0.0), Deg(0.0), 5.0);
    let mut controller = OrbitController::new(AUTO_ROTATE_DEG_PER_SEC, ORBIT_DAMPING);

    camera.pitch = Rad(2.0);
    controller.update(&mut camera, Duration::from_millis(16));
    let limit: Rad<f32> = Deg(89.0).into();
    assert!(camera.pitch <= limit);

    camera.pitch = Rad(-2.0);
    controller.update(&mut camera, Duration::from_millis(16));
    assert!(camera.pitch >= -limit);
}
