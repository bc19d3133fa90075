use nalgebra::{Rotation3, Vector3};

use super::orientation::OrientationCommand;
use crate::math::{angle_between, backward, forward, is_zero, right, safe_normalize, to_local, up};

// ---------------------------------------------------------------------------
// Attitude solver: desired forward/up + world orientation -> yaw/pitch/roll
// ---------------------------------------------------------------------------

/// Selects which solver the gyro bank runs every tick.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub enum AttitudeAlgorithm {
    /// Yaw, then pitch, then roll, each from a flattened projection.
    #[default]
    Sequential,
    /// All three axes at once from a single angle-axis correction.
    Simultaneous,
}

impl AttitudeAlgorithm {
    pub fn solve(
        self,
        desired_forward: &Vector3<f64>,
        desired_up: &Vector3<f64>,
        orientation: &Rotation3<f64>,
    ) -> OrientationCommand {
        match self {
            AttitudeAlgorithm::Sequential => rotation_angles_with_roll(desired_forward, desired_up, orientation),
            AttitudeAlgorithm::Simultaneous => rotation_angles_simultaneous(desired_forward, desired_up, orientation),
        }
    }
}

fn sign_of(v: f64) -> f64 {
    if v > 0.0 {
        1.0
    } else if v < 0.0 {
        -1.0
    } else {
        0.0
    }
}

fn non_negative_sign(v: f64) -> f64 {
    if v >= 0.0 { 1.0 } else { -1.0 }
}

/// Sequential solver.
///
/// Pass a zero `desired_up` when roll does not matter. Straight up/down
/// targets and an up vector parallel to forward are handled explicitly and
/// never produce NaN.
pub fn rotation_angles_with_roll(
    desired_forward: &Vector3<f64>,
    desired_up: &Vector3<f64>,
    orientation: &Rotation3<f64>,
) -> OrientationCommand {
    let local_target = to_local(orientation, desired_forward);
    let flattened_target = Vector3::new(local_target.x, 0.0, local_target.z);

    // right is positive
    let yaw = angle_between(&forward(), &flattened_target) * non_negative_sign(local_target.x);

    let pitch_sign = sign_of(local_target.y);
    let straight_up_or_down = is_zero(&flattened_target);
    let pitch = if straight_up_or_down {
        std::f64::consts::FRAC_PI_2 * pitch_sign
    } else {
        angle_between(&local_target, &flattened_target) * pitch_sign
    };

    let mut cmd = OrientationCommand { yaw, pitch, roll: 0.0 };
    if is_zero(desired_up) {
        return cmd;
    }

    // Roll is only meaningful for the part of up orthogonal to forward.
    let forward_dir = safe_normalize(desired_forward);
    let orthogonal_up = desired_up - forward_dir * desired_up.dot(&forward_dir);
    if is_zero(&orthogonal_up) {
        return cmd;
    }
    let local_up = to_local(orientation, &orthogonal_up);

    if straight_up_or_down {
        // Pitch is +-90 and yaw is 0: compare against the axis the nose
        // swings away from.
        let local_up_flattened = Vector3::new(local_up.x, 0.0, local_up.z);
        let reference = if up().dot(&local_target) >= 0.0 { backward() } else { forward() };
        let sign = non_negative_sign(local_up.dot(&right()));
        cmd.roll = angle_between(&local_up_flattened, &reference) * sign;
        return cmd;
    }

    // Intermediate frame: Up = world up, Front = flattened target. Reject
    // local up onto the plane whose normal is Front.
    let intermediate_front = flattened_target;
    let projection =
        intermediate_front * (intermediate_front.dot(&local_up) / intermediate_front.norm_squared());
    let flattened_up = local_up - projection;
    let intermediate_right = intermediate_front.cross(&up());
    let sign = non_negative_sign(flattened_up.dot(&intermediate_right));
    cmd.roll = angle_between(&flattened_up, &up()) * sign;
    cmd
}

/// Simultaneous solver: one angle-axis rotation taking the current body
/// frame onto the target frame, split into yaw/pitch/roll components.
pub fn rotation_angles_simultaneous(
    desired_forward: &Vector3<f64>,
    desired_up: &Vector3<f64>,
    orientation: &Rotation3<f64>,
) -> OrientationCommand {
    let local_forward = safe_normalize(&to_local(orientation, desired_forward));
    let local_up = to_local(orientation, desired_up);
    if is_zero(&local_forward) {
        return OrientationCommand::default();
    }

    let left = local_up.cross(&local_forward);
    let (axis, angle) = if is_zero(&local_up) || is_zero(&left) {
        let axis = forward().cross(&local_forward);
        let angle = axis.norm().clamp(-1.0, 1.0).asin();
        (axis, angle)
    } else {
        let left = safe_normalize(&left);
        let target_up = local_forward.cross(&left);
        let target_backward = -local_forward;
        let target_right = -left;

        let axis = backward().cross(&target_backward)
            + up().cross(&target_up)
            + right().cross(&target_right);

        let trace = target_right.x + target_up.y + target_backward.z;
        let angle = ((trace - 1.0) * 0.5).clamp(-1.0, 1.0).acos();
        (axis, angle)
    };

    let axis = safe_normalize(&axis);
    OrientationCommand {
        yaw: -axis.y * angle,
        pitch: axis.x * angle,
        roll: -axis.z * angle,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use std::f64::consts::{FRAC_PI_2, FRAC_PI_4};

    fn identity() -> Rotation3<f64> {
        Rotation3::identity()
    }

    fn no_nan(cmd: &OrientationCommand) -> bool {
        cmd.is_finite()
    }

    #[test]
    fn aligned_target_needs_no_rotation() {
        let cmd = rotation_angles_with_roll(&forward(), &up(), &identity());
        assert_relative_eq!(cmd.yaw, 0.0, epsilon = 1e-12);
        assert_relative_eq!(cmd.pitch, 0.0, epsilon = 1e-12);
        assert_relative_eq!(cmd.roll, 0.0, epsilon = 1e-12);
    }

    #[test]
    fn right_turn_is_positive_yaw() {
        let cmd = rotation_angles_with_roll(&right(), &Vector3::zeros(), &identity());
        assert_relative_eq!(cmd.yaw, FRAC_PI_2, epsilon = 1e-12);
        assert_relative_eq!(cmd.pitch, 0.0, epsilon = 1e-12);
        assert_eq!(cmd.roll, 0.0);
    }

    #[test]
    fn nose_up_is_positive_pitch() {
        let target = Vector3::new(0.0, 1.0, -1.0);
        let cmd = rotation_angles_with_roll(&target, &up(), &identity());
        assert_relative_eq!(cmd.yaw, 0.0, epsilon = 1e-12);
        assert_relative_eq!(cmd.pitch, FRAC_PI_4, epsilon = 1e-12);
    }

    #[test]
    fn straight_up_target_is_degenerate_safe() {
        let cmd = rotation_angles_with_roll(&up(), &up(), &identity());
        assert!(no_nan(&cmd));
        assert_relative_eq!(cmd.pitch, FRAC_PI_2, epsilon = 1e-12);
        assert_eq!(cmd.yaw, 0.0);
        assert_eq!(cmd.roll, 0.0);

        let cmd = rotation_angles_with_roll(&-up(), &up(), &identity());
        assert!(no_nan(&cmd));
        assert_relative_eq!(cmd.pitch, -FRAC_PI_2, epsilon = 1e-12);
        assert_eq!(cmd.yaw, 0.0);
    }

    #[test]
    fn straight_up_with_usable_up_vector_rolls() {
        // Nose to the sky, desired up pointing right: the belly must swing.
        let cmd = rotation_angles_with_roll(&up(), &right(), &identity());
        assert!(no_nan(&cmd));
        assert_relative_eq!(cmd.pitch, FRAC_PI_2, epsilon = 1e-12);
        assert_relative_eq!(cmd.roll, FRAC_PI_2, epsilon = 1e-12);
    }

    #[test]
    fn roll_toward_tilted_up() {
        // Want the top of the vehicle leaning to the right.
        let tilted = Vector3::new(1.0, 1.0, 0.0);
        let cmd = rotation_angles_with_roll(&forward(), &tilted, &identity());
        assert_relative_eq!(cmd.roll, FRAC_PI_4, epsilon = 1e-12);
        let tilted = Vector3::new(-1.0, 1.0, 0.0);
        let cmd = rotation_angles_with_roll(&forward(), &tilted, &identity());
        assert_relative_eq!(cmd.roll, -FRAC_PI_4, epsilon = 1e-12);
    }

    #[test]
    fn sequential_respects_world_orientation() {
        // Vehicle already yawed 90 deg right: a target to the world right
        // is dead ahead.
        let orientation = Rotation3::from_axis_angle(&Vector3::y_axis(), -FRAC_PI_2);
        let cmd = rotation_angles_with_roll(&right(), &up(), &orientation);
        assert_relative_eq!(cmd.yaw, 0.0, epsilon = 1e-9);
        assert_relative_eq!(cmd.pitch, 0.0, epsilon = 1e-9);
        assert_relative_eq!(cmd.roll, 0.0, epsilon = 1e-9);
    }

    #[test]
    fn simultaneous_pure_yaw_and_pitch() {
        let cmd = rotation_angles_simultaneous(&right(), &up(), &identity());
        assert_relative_eq!(cmd.yaw, FRAC_PI_2, epsilon = 1e-9);
        assert_relative_eq!(cmd.pitch, 0.0, epsilon = 1e-9);

        let cmd = rotation_angles_simultaneous(&Vector3::new(0.0, 1.0, -1.0), &up(), &identity());
        assert_relative_eq!(cmd.pitch, FRAC_PI_4, epsilon = 1e-9);
        assert_relative_eq!(cmd.yaw, 0.0, epsilon = 1e-9);
    }

    #[test]
    fn solvers_agree_for_world_up() {
        let targets = [
            Vector3::new(0.05, 0.03, -1.0),
            Vector3::new(-0.04, 0.02, -1.0),
            Vector3::new(0.02, -0.05, -1.0),
            Vector3::new(1.0, 0.0, 0.0),
            Vector3::new(-1.0, 0.0, -1.0),
            Vector3::new(0.0, -1.0, -2.0),
        ];
        for t in targets.iter().map(|t| t.normalize()) {
            let a = rotation_angles_with_roll(&t, &up(), &identity());
            let b = rotation_angles_simultaneous(&t, &up(), &identity());
            assert!((a.yaw - b.yaw).abs() < 1e-2, "yaw {} vs {} for {:?}", a.yaw, b.yaw, t);
            assert!((a.pitch - b.pitch).abs() < 1e-2, "pitch {} vs {} for {:?}", a.pitch, b.pitch, t);
        }
    }

    #[test]
    fn simultaneous_degenerate_inputs() {
        // up parallel to forward -> single-axis fallback
        let cmd = rotation_angles_simultaneous(&up(), &up(), &identity());
        assert!(no_nan(&cmd));
        assert_relative_eq!(cmd.pitch, FRAC_PI_2, epsilon = 1e-9);
        assert_relative_eq!(cmd.yaw, 0.0, epsilon = 1e-9);

        // zero forward
        let cmd = rotation_angles_simultaneous(&Vector3::zeros(), &up(), &identity());
        assert_eq!(cmd, OrientationCommand::default());

        // zero up
        let cmd = rotation_angles_simultaneous(&forward(), &Vector3::zeros(), &identity());
        assert!(no_nan(&cmd));
        assert_relative_eq!(cmd.yaw, 0.0, epsilon = 1e-12);
    }

    #[test]
    fn algorithm_dispatch() {
        let t = Vector3::new(0.3, 0.1, -1.0);
        assert_eq!(
            AttitudeAlgorithm::Sequential.solve(&t, &up(), &identity()),
            rotation_angles_with_roll(&t, &up(), &identity())
        );
        assert_eq!(
            AttitudeAlgorithm::Simultaneous.solve(&t, &up(), &identity()),
            rotation_angles_simultaneous(&t, &up(), &identity())
        );
    }
}
