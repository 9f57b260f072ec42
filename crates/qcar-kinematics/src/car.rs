//! Bicycle-style car model.
//!
//! The car is steered by its front axle. While the wheels are turned, the
//! steering pivot (the front axle midpoint) travels on a circle of radius
//! `r = axle_separation / (2·sin|α|)` and the body centre on the concentric
//! circle of radius `r·cos α`. Each step moves both points exactly along
//! their arcs, so the result does not depend on the step size.

use core::f64::consts::PI;
use core::fmt;
use libm::{cos, fabs, sin};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::error::KinematicsError;
use crate::geometry::{Point2, absolute_position, construct_rect, normalize_angle};
use crate::Pose;

/// Length of the car body.
pub const BODY_LENGTH: f64 = 100.0;
/// Distance between the front and rear axle.
pub const AXLE_SEPARATION: f64 = 80.0;
/// Width of the car, measured across the tyres.
pub const BODY_WIDTH: f64 = 60.0;
/// Longitudinal acceleration at full pedal (units/s²).
pub const ACCELERATION: f64 = 1000.0;
/// Fraction of the speed lost per second.
pub const FRICTION: f64 = 5.0;
/// Steering rate (deg/s).
pub const TURN_RATE: f64 = 60.0;
/// Steering angle bound (deg).
pub const MAX_STEERING: f64 = 30.0;

/// Rectangles making up the car's silhouette, in world coordinates.
///
/// Each rectangle uses the corner order of [`construct_rect`].
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CarOutline {
    /// Main body.
    pub body: [Point2; 4],
    /// Cabin, slightly behind the body centre.
    pub cabin: [Point2; 4],
    /// Front axle.
    pub front_axle: [Point2; 4],
    /// Rear axle.
    pub rear_axle: [Point2; 4],
    /// Tyres: front-left, front-right, rear-left, rear-right.
    pub tyres: [[Point2; 4]; 4],
}

/// Kinematic state of a steered car.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, PartialEq)]
pub struct Car {
    x: f64,
    y: f64,
    /// Heading (deg), normalized to `(-180, 180]`.
    heading: f64,
    /// Signed speed along the heading.
    speed: f64,
    /// Steering angle (deg), clamped to `[-MAX_STEERING, MAX_STEERING]`.
    steering: f64,
    /// Pivot turning radius of the last step, 0 when driving straight.
    radius: f64,
    /// Turning-circle centre of the last turning step.
    center: Point2,
}

fn check_dt(dt: f64) -> Result<(), KinematicsError> {
    if !dt.is_finite() {
        return Err(KinematicsError::NonFiniteInput("time delta must be finite"));
    }
    if dt < 0.0 {
        return Err(KinematicsError::NegativeTimeDelta("must be non-negative"));
    }
    Ok(())
}

impl Car {
    /// Construct a car at rest with straight wheels.
    ///
    /// # Arguments
    ///
    /// * `pose`: Initial position and heading of the body centre.
    pub fn new(pose: Pose) -> Self {
        Car {
            x: pose.x,
            y: pose.y,
            heading: normalize_angle(pose.heading),
            speed: 0.0,
            steering: 0.0,
            radius: 0.0,
            center: Point2::default(),
        }
    }

    /// Current pose of the body centre.
    pub fn pose(&self) -> Pose {
        Pose {
            x: self.x,
            y: self.y,
            heading: self.heading,
        }
    }

    /// Position of the body centre.
    pub fn position(&self) -> Point2 {
        Point2::new(self.x, self.y)
    }

    /// Heading in degrees.
    pub fn heading(&self) -> f64 {
        self.heading
    }

    /// Signed speed.
    pub fn speed(&self) -> f64 {
        self.speed
    }

    /// Steering angle in degrees.
    pub fn steering(&self) -> f64 {
        self.steering
    }

    /// Overrides the speed.
    pub fn set_speed(&mut self, speed: f64) {
        self.speed = speed;
    }

    /// Overrides the steering angle, saturating at the steering bound.
    pub fn set_steering(&mut self, steering: f64) {
        self.steering = steering.clamp(-MAX_STEERING, MAX_STEERING);
    }

    /// Turning radius of the steering pivot during the last step.
    ///
    /// Zero if the last step drove straight.
    pub fn turning_radius(&self) -> f64 {
        self.radius
    }

    /// Turning radius of the body centre during the last step.
    pub fn body_turning_radius(&self) -> f64 {
        self.radius * cos(self.steering.to_radians())
    }

    /// Centre of the turning circle of the last turning step.
    pub fn turning_center(&self) -> Option<Point2> {
        (self.radius > 0.0).then_some(self.center)
    }

    /// Midpoint of the front (steering) axle.
    pub fn front_axle(&self) -> Point2 {
        absolute_position(
            Point2::new(0.0, AXLE_SEPARATION / 2.0),
            self.position(),
            self.heading,
        )
    }

    /// Moves the steering angle by `TURN_RATE · dt` in the sign of `direction`.
    ///
    /// # Errors
    ///
    /// Returns `Err(KinematicsError::NegativeTimeDelta)` if `dt` is negative.
    /// Returns `Err(KinematicsError::NonFiniteInput)` if an input is NaN or infinite.
    pub fn turn_wheel(&mut self, direction: f64, dt: f64) -> Result<(), KinematicsError> {
        check_dt(dt)?;
        if direction.is_nan() {
            return Err(KinematicsError::NonFiniteInput("steering direction is NaN"));
        }

        if direction > 0.0 {
            self.steering += TURN_RATE * dt;
        } else if direction < 0.0 {
            self.steering -= TURN_RATE * dt;
        }
        self.steering = self.steering.clamp(-MAX_STEERING, MAX_STEERING);
        Ok(())
    }

    /// Advances the car by one step of `dt` seconds with the given pedal input.
    ///
    /// The speed is updated first (acceleration, then friction) and the
    /// distance of the step is taken from the decayed speed.
    ///
    /// # Errors
    ///
    /// Returns `Err(KinematicsError::NegativeTimeDelta)` if `dt` is negative.
    /// Returns `Err(KinematicsError::NonFiniteInput)` if an input is NaN or infinite.
    pub fn drive(&mut self, pedal: f64, dt: f64) -> Result<(), KinematicsError> {
        check_dt(dt)?;
        if !pedal.is_finite() {
            return Err(KinematicsError::NonFiniteInput("pedal must be finite"));
        }

        self.speed += pedal * ACCELERATION * dt;
        self.speed -= self.speed * FRICTION * dt;
        self.travel(self.speed * dt);
        Ok(())
    }

    /// Advances by the signed distance `s`, measured along the pivot's arc
    /// when the wheels are turned.
    fn travel(&mut self, s: f64) {
        if self.steering == 0.0 {
            self.radius = 0.0;
            let next = absolute_position(Point2::new(0.0, s), self.position(), self.heading);
            self.x = next.x;
            self.y = next.y;
            return;
        }

        let alpha = self.steering;
        let r = AXLE_SEPARATION / (2.0 * sin(fabs(alpha).to_radians()));
        let pivot = self.front_axle();
        let wheel_heading = self.heading + alpha;

        // Circle centre sits beside the front wheels, on the inside of the turn
        let side = if alpha > 0.0 { 90.0 } else { -90.0 };
        let center = absolute_position(Point2::new(0.0, r), pivot, wheel_heading + side);

        let beta = (180.0 * s) / (PI * r);
        let (sin_b, cos_b) = (sin(beta.to_radians()), cos(beta.to_radians()));
        let arc = if alpha > 0.0 {
            Point2::new(r * (cos_b - 1.0), r * sin_b)
        } else {
            Point2::new(r * (1.0 - cos_b), r * sin_b)
        };
        let pivot_next = absolute_position(arc, pivot, wheel_heading);

        let heading_next = if alpha > 0.0 {
            self.heading + beta
        } else {
            self.heading - beta
        };

        // Body centre trails the pivot by half the axle separation
        let back = (180.0 - alpha).to_radians();
        let offset = Point2::new(
            AXLE_SEPARATION / 2.0 * cos(back),
            AXLE_SEPARATION / 2.0 * sin(back),
        );
        let body = absolute_position(offset, pivot_next, heading_next + alpha + 90.0);

        self.radius = r;
        self.center = center;
        self.x = body.x;
        self.y = body.y;
        self.heading = normalize_angle(heading_next);
    }

    /// Builds the silhouette of the car for drawing.
    pub fn outline(&self) -> CarOutline {
        let origin = self.position();
        let at = |x: f64, y: f64| absolute_position(Point2::new(x, y), origin, self.heading);
        let half_axle = AXLE_SEPARATION / 2.0;
        let half_width = BODY_WIDTH / 2.0;
        let tyre = |x: f64, y: f64, rotation: f64| {
            construct_rect(BODY_LENGTH / 10.0, 0.2 * BODY_LENGTH, at(x, y), rotation)
        };
        let wheel_heading = self.heading + self.steering;

        CarOutline {
            body: construct_rect(0.7 * BODY_WIDTH, BODY_LENGTH, origin, self.heading),
            cabin: construct_rect(
                0.5 * BODY_WIDTH,
                0.5 * BODY_LENGTH,
                at(0.0, -0.1 * BODY_LENGTH),
                self.heading,
            ),
            front_axle: construct_rect(BODY_WIDTH, BODY_LENGTH / 20.0, at(0.0, half_axle), self.heading),
            rear_axle: construct_rect(BODY_WIDTH, BODY_LENGTH / 20.0, at(0.0, -half_axle), self.heading),
            tyres: [
                tyre(-half_width, half_axle, wheel_heading),
                tyre(half_width, half_axle, wheel_heading),
                tyre(-half_width, -half_axle, self.heading),
                tyre(half_width, -half_axle, self.heading),
            ],
        }
    }
}

impl fmt::Display for Car {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Car {} (v: {:.2}, α: {:.2}°)",
            self.pose(),
            self.speed,
            self.steering
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::relative_position;
    const EPSILON: f64 = 1e-6;
    const DT: f64 = 1.0 / 50.0;

    fn car_with(heading: f64, speed: f64, steering: f64) -> Car {
        let mut car = Car::new(Pose::new(0.0, 0.0, heading));
        car.set_speed(speed);
        car.set_steering(steering);
        car
    }

    #[test]
    fn test_turn_wheel_rate_and_clamp() {
        let mut car = Car::new(Pose::default());
        car.turn_wheel(1.0, 0.1).unwrap();
        assert!((car.steering() - 6.0).abs() < EPSILON);
        car.turn_wheel(0.0, 0.1).unwrap();
        assert!((car.steering() - 6.0).abs() < EPSILON);
        car.turn_wheel(-1.0, 0.2).unwrap();
        assert!((car.steering() - -6.0).abs() < EPSILON);

        for _ in 0..100 {
            car.turn_wheel(1.0, DT).unwrap();
        }
        assert_eq!(car.steering(), MAX_STEERING);
        for _ in 0..200 {
            car.turn_wheel(-0.5, DT).unwrap();
        }
        assert_eq!(car.steering(), -MAX_STEERING);
    }

    #[test]
    fn test_set_steering_saturates() {
        let mut car = Car::new(Pose::default());
        car.set_steering(45.0);
        assert_eq!(car.steering(), 30.0);
        car.set_steering(-90.0);
        assert_eq!(car.steering(), -30.0);
    }

    #[test]
    fn test_speed_update_order() {
        let mut car = Car::new(Pose::default());
        car.drive(1.0, 0.01).unwrap();
        // v = 0 + 1000 * 0.01 = 10, then v -= 10 * 5 * 0.01 -> 9.5; s = 0.095
        assert!((car.speed() - 9.5).abs() < EPSILON);
        assert!((car.position().y - 0.095).abs() < EPSILON);
        assert!(car.position().x.abs() < EPSILON);
    }

    #[test]
    fn test_straight_keeps_heading() {
        for heading in [0.0, 45.0, -120.0, 180.0] {
            let mut car = car_with(heading, 50.0, 0.0);
            car.drive(0.0, DT).unwrap();
            let v = car.speed();
            assert!((v - 45.0).abs() < EPSILON); // 50 - 50 * 5 / 50
            assert_eq!(car.heading(), Pose::new(0.0, 0.0, heading).heading);
            assert_eq!(car.turning_radius(), 0.0);
            assert!(car.turning_center().is_none());

            // Displacement is |v·dt| along the heading direction
            let local = relative_position(car.position(), Point2::default(), heading);
            assert!(local.x.abs() < EPSILON);
            assert!((local.y - v * DT).abs() < EPSILON);
            assert!((car.position().distance(Point2::default()) - (v * DT).abs()).abs() < EPSILON);
        }
    }

    #[test]
    fn test_reverse_straight() {
        let mut car = car_with(90.0, -20.0, 0.0);
        car.drive(0.0, DT).unwrap();
        // Facing -x, reversing moves towards +x
        assert!(car.position().x > 0.0);
        assert!(car.position().y.abs() < EPSILON);
    }

    #[test]
    fn test_turning_stays_on_circle() {
        for steering in [30.0, 12.5, 0.5, -0.5, -17.0, -30.0] {
            for speed in [50.0, 400.0, -80.0] {
                let mut car = car_with(33.0, speed, steering);
                let start = car.position();
                let pivot_start = car.front_axle();
                car.drive(0.0, DT).unwrap();

                let r = AXLE_SEPARATION / (2.0 * steering.abs().to_radians().sin());
                let body_r = r * steering.to_radians().cos();
                let center = car.turning_center().unwrap();
                assert!((car.turning_radius() - r).abs() < EPSILON * r);
                assert!((car.body_turning_radius() - body_r).abs() < EPSILON * r);

                // Pivot on radius r, body centre on r·cos α, before and after the step
                assert!((pivot_start.distance(center) - r).abs() < EPSILON * r);
                assert!((car.front_axle().distance(center) - r).abs() < EPSILON * r);
                assert!((start.distance(center) - body_r).abs() < EPSILON * r);
                assert!((car.position().distance(center) - body_r).abs() < EPSILON * r);
            }
        }
    }

    #[test]
    fn test_turning_step_size_independent() {
        for steering in [25.0, -8.0] {
            // Sweeping the same arc length in one or in many steps lands on the same pose
            let mut one = car_with(10.0, 0.0, steering);
            let mut many = one.clone();
            one.travel(120.0);
            for _ in 0..40 {
                many.travel(3.0);
            }
            assert!((one.x - many.x).abs() < EPSILON);
            assert!((one.y - many.y).abs() < EPSILON);
            assert!((one.heading - many.heading).abs() < EPSILON);
        }
    }

    #[test]
    fn test_turn_direction_matches_steering_sign() {
        // Heading 0 faces +y; positive steering turns towards -x (left)
        let mut left = car_with(0.0, 50.0, 30.0);
        let mut right = car_with(0.0, 50.0, -30.0);
        for _ in 0..50 {
            left.drive(0.0, DT).unwrap();
            right.drive(0.0, DT).unwrap();
        }
        assert!(left.heading() > 0.0);
        assert!(left.position().x < 0.0);
        assert!(right.heading() < 0.0);
        assert!(right.position().x > 0.0);
        assert!((left.position().y - right.position().y).abs() < EPSILON);
    }

    #[test]
    fn test_heading_wraps_on_full_circle() {
        let mut car = car_with(170.0, 0.0, 30.0);
        for _ in 0..2_000 {
            car.drive(1.0, DT).unwrap();
            assert!(car.heading() > -180.0 && car.heading() <= 180.0);
        }
    }

    #[test]
    fn test_negative_dt_rejected() {
        let mut car = Car::new(Pose::default());
        assert!(matches!(
            car.drive(1.0, -0.1),
            Err(KinematicsError::NegativeTimeDelta("must be non-negative"))
        ));
        assert!(matches!(
            car.turn_wheel(1.0, -0.1),
            Err(KinematicsError::NegativeTimeDelta(_))
        ));
        assert!(matches!(car.drive(f64::NAN, DT), Err(KinematicsError::NonFiniteInput(_))));
        assert!(matches!(car.drive(1.0, f64::INFINITY), Err(KinematicsError::NonFiniteInput(_))));
        assert_eq!(car, Car::new(Pose::default()));
    }

    #[test]
    fn test_outline_tracks_pose() {
        let mut car = car_with(90.0, 0.0, 30.0);
        car.x = 10.0;
        let outline = car.outline();
        let center = car.position();
        let half_diag = ((0.35 * BODY_WIDTH).powi(2) + (BODY_LENGTH / 2.0).powi(2)).sqrt();
        for corner in outline.body {
            assert!((corner.distance(center) - half_diag).abs() < EPSILON);
        }
        // Front tyres follow the wheel angle, rear tyres the body
        let front_edge = (outline.tyres[0][0].x - outline.tyres[0][1].x, outline.tyres[0][0].y - outline.tyres[0][1].y);
        let rear_edge = (outline.tyres[2][0].x - outline.tyres[2][1].x, outline.tyres[2][0].y - outline.tyres[2][1].y);
        let angle = |e: (f64, f64)| e.1.atan2(e.0).to_degrees();
        assert!((crate::geometry::angle_difference(angle(front_edge), angle(rear_edge)) - 30.0).abs() < EPSILON);
    }
}
