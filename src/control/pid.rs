use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// PID Controller (single axis, fixed sample period)
// ---------------------------------------------------------------------------

/// Gains and output limit shared by a family of controllers.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PidGains {
    pub kp: f64,
    pub ki: f64,
    pub kd: f64,
    /// Symmetric output clamp; the integral is held to the same band.
    pub max_output: f64,
}

impl Default for PidGains {
    fn default() -> Self {
        Self {
            kp: 2.0,
            ki: 0.0,
            kd: 0.1,
            max_output: std::f64::consts::PI,
        }
    }
}

#[derive(Debug, Clone)]
pub struct Pid {
    pub kp: f64,
    pub ki: f64,
    pub kd: f64,
    max_output: f64,
    dt: f64,
    integral: f64,
    prev_error: f64,
}

impl Pid {
    /// `dt` is the fixed sample period; callers must invoke `control` at
    /// that cadence.
    pub fn new(kp: f64, ki: f64, kd: f64, max_output: f64, dt: f64) -> Self {
        Self {
            kp,
            ki,
            kd,
            max_output: max_output.abs(),
            dt,
            integral: 0.0,
            prev_error: 0.0,
        }
    }

    pub fn from_gains(gains: &PidGains, dt: f64) -> Self {
        Self::new(gains.kp, gains.ki, gains.kd, gains.max_output, dt)
    }

    pub fn control(&mut self, error: f64) -> f64 {
        let max = self.max_output;
        // Anti-windup: never integrate past actuator saturation
        self.integral = (self.integral + error * self.dt).clamp(-max, max);
        let derivative = if self.dt > 0.0 { (error - self.prev_error) / self.dt } else { 0.0 };
        self.prev_error = error;
        (self.kp * error + self.ki * self.integral + self.kd * derivative).clamp(-max, max)
    }

    pub fn reset(&mut self) {
        self.integral = 0.0;
        self.prev_error = 0.0;
    }

    pub fn dt(&self) -> f64 {
        self.dt
    }

    pub fn max_output(&self) -> f64 {
        self.max_output
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pid_proportional() {
        let mut pid = Pid::new(1.0, 0.0, 0.0, 10.0, 0.01);
        let out = pid.control(0.5);
        assert!((out - 0.5).abs() < 1e-10, "Pure P should output Kp * error");
    }

    #[test]
    fn pid_integral_accumulates() {
        let mut pid = Pid::new(0.0, 1.0, 0.0, 10.0, 0.1);
        pid.control(1.0);
        let out = pid.control(1.0);
        assert!((out - 0.2).abs() < 1e-10, "Integral should accumulate");
    }

    #[test]
    fn pid_derivative_uses_fixed_period() {
        let mut pid = Pid::new(0.0, 0.0, 1.0, 100.0, 0.5);
        pid.control(1.0);
        let out = pid.control(2.0);
        assert!((out - 2.0).abs() < 1e-10, "(2 - 1) / 0.5 = 2");
    }

    #[test]
    fn output_stays_within_clamp() {
        for &max in &[0.1, 1.0, 7.5] {
            let mut pid = Pid::new(3.0, 5.0, 0.8, max, 1.0 / 60.0);
            let errors = [1e6, -1e6, 0.0, 42.0, -3.3, 1e-9, 250.0, -250.0];
            for &e in errors.iter().cycle().take(200) {
                let out = pid.control(e);
                assert!(out.abs() <= max, "output {} escaped [-{}, {}]", out, max, max);
            }
        }
    }

    #[test]
    fn integral_does_not_wind_up_past_limit() {
        let mut pid = Pid::new(0.0, 1.0, 0.0, 0.5, 1.0);
        for _ in 0..100 {
            pid.control(10.0);
        }
        // One step of opposite error should already pull the output down.
        let out = pid.control(-0.4);
        assert!((out - 0.1).abs() < 1e-10, "integral was clamped to 0.5, got {}", out);
    }

    #[test]
    fn reset_clears_history() {
        let mut pid = Pid::new(0.0, 1.0, 1.0, 10.0, 1.0);
        pid.control(3.0);
        pid.reset();
        let out = pid.control(0.0);
        assert_eq!(out, 0.0);
        assert_eq!(pid.max_output(), 10.0);
        assert_eq!(pid.dt(), 1.0);
    }
}
