//! Player input: axis events, the latest sample per player, and the mapping
//! from an axis position to a shield angle.

use std::fmt;

/// One of the two castles.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Player {
    One,
    Two,
}

impl Player {
    pub const ALL: [Player; 2] = [Player::One, Player::Two];

    /// Axis 0 drives player one, axis 1 drives player two. Other axes are
    /// ignored.
    pub fn from_axis(axis: u8) -> Option<Self> {
        match axis {
            0 => Some(Player::One),
            1 => Some(Player::Two),
            _ => None,
        }
    }

    pub fn index(self) -> usize {
        match self {
            Player::One => 0,
            Player::Two => 1,
        }
    }
}

impl fmt::Display for Player {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Player::One => write!(f, "player 1"),
            Player::Two => write!(f, "player 2"),
        }
    }
}

/// Everything the loop reacts to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputEvent {
    Quit,
    AxisChanged { axis: u8, value: i16 },
}

/// Latest axis reading for each player. Only the newest value matters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AxisSamples {
    samples: [i16; 2],
}

impl AxisSamples {
    pub fn get(&self, player: Player) -> i16 {
        self.samples[player.index()]
    }

    pub fn set(&mut self, player: Player, value: i16) {
        self.samples[player.index()] = value;
    }
}

/// Number of distinct axis positions.
const AXIS_RANGE: f32 = 65536.0;

/// Maps the full axis range onto a full turn, times a sensitivity.
///
/// With the default sensitivity of 2 the shield goes round twice over the
/// axis range, so small stick movements turn it quickly.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AxisMapper {
    pub sensitivity: f32,
}

impl Default for AxisMapper {
    fn default() -> Self {
        Self { sensitivity: 2.0 }
    }
}

impl AxisMapper {
    pub fn new(sensitivity: f32) -> Self {
        Self { sensitivity }
    }

    /// Shield angle in degrees: 0 at the lowest axis value.
    pub fn axis_to_angle(&self, sample: i16) -> f32 {
        (sample as f32 + 32768.0) / (AXIS_RANGE / 360.0) * self.sensitivity
    }

    pub fn axis_to_radians(&self, sample: i16) -> f32 {
        self.axis_to_angle(sample).to_radians()
    }
}

/// Turns a pair of held buttons into an analog axis position.
///
/// The position slews towards the pressed direction at `rate` axis units
/// per second and stays where it is when nothing is held. It starts
/// centred, like a real stick at rest, which matches `AxisSamples::default`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AxisEmulator {
    position: f32,
    rate: f32,
}

impl AxisEmulator {
    pub fn new(rate: f32) -> Self {
        Self {
            position: 0.0,
            rate,
        }
    }

    pub fn value(&self) -> i16 {
        self.position as i16
    }

    /// Advances the emulated stick and returns the new value when it moved.
    pub fn update(&mut self, decrease: bool, increase: bool, dt: f32) -> Option<i16> {
        let direction = match (decrease, increase) {
            (true, false) => -1.0,
            (false, true) => 1.0,
            _ => return None,
        };
        let before = self.value();
        self.position = (self.position + direction * self.rate * dt)
            .clamp(i16::MIN as f32, i16::MAX as f32);
        let after = self.value();
        (after != before).then_some(after)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_axis_bounds() {
        let mapper = AxisMapper::new(1.0);
        assert_eq!(mapper.axis_to_angle(i16::MIN), 0.0);
        let max = mapper.axis_to_angle(i16::MAX);
        assert!(max < 360.0 && max > 359.99);
        assert!((mapper.axis_to_angle(0) - 180.0).abs() < 1e-4);
    }

    #[test]
    fn test_default_sensitivity_wraps_twice() {
        let mapper = AxisMapper::default();
        assert!((mapper.axis_to_angle(0) - 360.0).abs() < 1e-3);
        assert!(mapper.axis_to_angle(i16::MAX) > 719.9);
        assert!((mapper.axis_to_radians(0) - std::f32::consts::TAU).abs() < 1e-4);
    }

    #[test]
    fn test_axis_routing() {
        assert_eq!(Player::from_axis(0), Some(Player::One));
        assert_eq!(Player::from_axis(1), Some(Player::Two));
        assert_eq!(Player::from_axis(2), None);

        let mut samples = AxisSamples::default();
        samples.set(Player::Two, -1200);
        assert_eq!(samples.get(Player::One), 0);
        assert_eq!(samples.get(Player::Two), -1200);
    }

    #[test]
    fn test_emulator_slews_and_clamps() {
        let mut stick = AxisEmulator::new(1000.0);
        assert_eq!(stick.update(true, false, 0.5), Some(-500));
        assert_eq!(stick.update(false, true, 0.5), Some(0));
        // Both or neither held: no motion
        assert_eq!(stick.update(true, true, 0.5), None);
        assert_eq!(stick.update(false, false, 0.5), None);
        assert_eq!(stick.update(false, true, 1000.0), Some(i16::MAX));
        // Already at the top
        assert_eq!(stick.update(false, true, 0.5), None);
        assert_eq!(stick.update(true, false, 1000.0), Some(i16::MIN));
    }

    #[test]
    fn test_emulator_starts_where_the_simulation_does() {
        let mut stick = AxisEmulator::new(32768.0);
        let samples = AxisSamples::default();
        for player in Player::ALL {
            assert_eq!(stick.value(), samples.get(player));
        }
        // A first nudge turns the shield a few degrees, not half a turn
        let mapper = AxisMapper::new(1.0);
        let nudged = stick.update(false, true, 1.0 / 60.0).unwrap();
        let jump = mapper.axis_to_angle(nudged) - mapper.axis_to_angle(samples.get(Player::One));
        assert!(jump > 0.0 && jump < 4.0, "jump = {jump}");
    }

    proptest! {
        #[test]
        fn doubling_sensitivity_doubles_angle(sample in any::<i16>(), sensitivity in 0.1f32..8.0) {
            let single = AxisMapper::new(sensitivity).axis_to_angle(sample);
            let double = AxisMapper::new(sensitivity * 2.0).axis_to_angle(sample);
            prop_assert!((double - 2.0 * single).abs() <= 1e-3 * single.max(1.0));
        }

        #[test]
        fn angle_grows_with_axis(a in any::<i16>(), b in any::<i16>()) {
            let mapper = AxisMapper::default();
            if a < b {
                prop_assert!(mapper.axis_to_angle(a) < mapper.axis_to_angle(b));
            }
        }
    }
}
