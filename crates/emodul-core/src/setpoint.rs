// ── Setpoint arithmetic ──

use crate::config::DeviceConfig;

/// Clamp into `[min_c, max_c]`, then snap to the nearest multiple of
/// `step_c` counted from `min_c`. A snap past `max_c` falls back one step.
/// NaN maps to `min_c`.
pub fn clamp_and_step(value: f64, device: &DeviceConfig) -> f64 {
    if value.is_nan() {
        return device.min_c;
    }
    let clamped = value.clamp(device.min_c, device.max_c);
    let steps = ((clamped - device.min_c) / device.step_c).round();
    let stepped = device.min_c + steps * device.step_c;
    if stepped > device.max_c {
        stepped - device.step_c
    } else {
        stepped
    }
}

/// Whether a server-reported target matches a requested one within half a step.
pub fn confirms(requested_c: f64, reported_c: f64, step_c: f64) -> bool {
    (requested_c - reported_c).abs() <= step_c / 2.0
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPS: f64 = 1e-9;

    fn device() -> DeviceConfig {
        DeviceConfig::default()
    }

    fn on_grid(v: f64, device: &DeviceConfig) -> bool {
        let steps = (v - device.min_c) / device.step_c;
        (steps - steps.round()).abs() < EPS
    }

    #[test]
    fn clamps_and_rounds_examples() {
        let d = device();
        assert!((clamp_and_step(37.0, &d) - 30.0).abs() < EPS);
        assert!((clamp_and_step(-5.0, &d) - 10.0).abs() < EPS);
        assert!((clamp_and_step(21.3, &d) - 21.5).abs() < EPS);
        assert!((clamp_and_step(21.2, &d) - 21.0).abs() < EPS);
    }

    #[test]
    fn result_is_in_range_and_on_grid() {
        let d = device();
        let mut v = -20.0;
        while v < 50.0 {
            let out = clamp_and_step(v, &d);
            assert!(out >= d.min_c && out <= d.max_c, "{v} -> {out}");
            assert!(on_grid(out, &d), "{v} -> {out} is off the step grid");
            v += 0.037;
        }
    }

    #[test]
    fn grid_is_measured_from_minimum() {
        let d = DeviceConfig {
            min_c: 5.2,
            max_c: 29.9,
            step_c: 1.0,
            off_threshold_c: 5.2,
            ..DeviceConfig::default()
        };
        // 29.9 is not on the grid from 5.2; the highest grid point is 29.2.
        assert!((clamp_and_step(40.0, &d) - 29.2).abs() < EPS);
        assert!((clamp_and_step(7.0, &d) - 7.2).abs() < EPS);
    }

    #[test]
    fn idempotent() {
        let d = device();
        for v in [12.26, 18.74, 29.99, 10.01] {
            let once = clamp_and_step(v, &d);
            assert!((clamp_and_step(once, &d) - once).abs() < EPS);
        }
    }

    #[test]
    fn non_finite_inputs() {
        let d = device();
        assert!((clamp_and_step(f64::NAN, &d) - d.min_c).abs() < EPS);
        assert!((clamp_and_step(f64::INFINITY, &d) - d.max_c).abs() < EPS);
        assert!((clamp_and_step(f64::NEG_INFINITY, &d) - d.min_c).abs() < EPS);
    }

    #[test]
    fn confirmation_tolerance_is_half_a_step() {
        assert!(confirms(22.0, 22.0, 0.5));
        assert!(confirms(22.0, 21.75, 0.5));
        assert!(!confirms(22.0, 21.5, 0.5));
    }
}
