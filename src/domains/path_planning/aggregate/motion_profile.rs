use serde::{Deserialize, Serialize};

/// Slow speed forced onto the last translating segment of a path so the robot
/// creeps into its goal instead of overshooting it.
pub const FINAL_PATH_SEGMENT_SPEED_MMPS: f64 = 20.0;

/// Highest speed considered safe when the robot may be near a cliff edge.
pub const CLIFF_SAFE_SPEED_MMPS: f64 = 60.0;

/// Speed and acceleration limits applied to a geometric path, per motion class.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PathMotionProfile {
    pub speed_mmps: f64,
    pub accel_mmps2: f64,
    pub decel_mmps2: f64,
    pub point_turn_speed_rad_per_sec: f64,
    pub point_turn_accel_rad_per_sec2: f64,
    pub point_turn_decel_rad_per_sec2: f64,
    pub dock_speed_mmps: f64,
    pub dock_accel_mmps2: f64,
    pub dock_decel_mmps2: f64,
    pub reverse_speed_mmps: f64,
    /// True when a caller supplied this profile instead of the defaults.
    pub is_custom: bool,
}

impl Default for PathMotionProfile {
    fn default() -> Self {
        Self {
            speed_mmps: 100.0,
            accel_mmps2: 200.0,
            decel_mmps2: 500.0,
            point_turn_speed_rad_per_sec: 2.0,
            point_turn_accel_rad_per_sec2: 10.0,
            point_turn_decel_rad_per_sec2: 10.0,
            dock_speed_mmps: 60.0,
            dock_accel_mmps2: 200.0,
            dock_decel_mmps2: 500.0,
            reverse_speed_mmps: 80.0,
            is_custom: false,
        }
    }
}

impl PathMotionProfile {
    /// Profile with the given linear limits; everything else keeps its default.
    pub fn custom(speed_mmps: f64, accel_mmps2: f64, decel_mmps2: f64) -> Self {
        Self {
            speed_mmps,
            accel_mmps2,
            decel_mmps2,
            is_custom: true,
            ..Self::default()
        }
    }

    /// Copy of this profile whose forward and reverse speeds do not exceed
    /// the cliff-safe speed.
    pub fn clamp_to_cliff_safe_speed(&self) -> Self {
        Self {
            speed_mmps: self.speed_mmps.min(CLIFF_SAFE_SPEED_MMPS),
            reverse_speed_mmps: self.reverse_speed_mmps.min(CLIFF_SAFE_SPEED_MMPS),
            ..self.clone()
        }
    }

    /// Speed, accel and decel magnitudes for a translating segment.
    pub(crate) fn linear_limits(&self, is_docking: bool, is_reverse: bool) -> (f64, f64, f64) {
        let (speed, accel, decel) = if is_docking {
            (self.dock_speed_mmps, self.dock_accel_mmps2, self.dock_decel_mmps2)
        } else {
            (self.speed_mmps, self.accel_mmps2, self.decel_mmps2)
        };
        let speed = if is_reverse { speed.min(self.reverse_speed_mmps) } else { speed };
        (speed.abs(), accel.abs(), decel.abs())
    }
}
