//! Level meter
//!
//! Turns analyser output into the 0-100 level and the segmented bar shown
//! under "Desktop Audio".

use serde::Serialize;

/// Number of bars in the meter
pub const SEGMENTS: usize = 20;

/// Labels printed under the meter
pub const DB_SCALE: [i32; 5] = [-60, -45, -30, -15, 0];

/// Levels at or below this read as silence
pub const NOISE_FLOOR: f32 = 2.0;

/// Mean of the byte frequency data, scaled to 0-100 and gated at the noise floor
pub fn average_level(data: &[u8]) -> f32 {
    if data.is_empty() {
        return 0.0;
    }
    let sum: u32 = data.iter().map(|&v| v as u32).sum();
    let average = sum as f32 / data.len() as f32;
    let level = average / 255.0 * 100.0;
    if level > NOISE_FLOOR {
        level
    } else {
        0.0
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SegmentColor {
    Off,
    Green,
    Yellow,
    Red,
}

impl SegmentColor {
    fn for_position(position: u32, level: f32) -> Self {
        if position as f32 > level {
            SegmentColor::Off
        } else if position <= 60 {
            SegmentColor::Green
        } else if position <= 80 {
            SegmentColor::Yellow
        } else {
            SegmentColor::Red
        }
    }
}

/// Colour of every bar for `level`, left to right
pub fn segments(level: f32) -> [SegmentColor; SEGMENTS] {
    let mut bars = [SegmentColor::Off; SEGMENTS];
    for (i, bar) in bars.iter_mut().enumerate() {
        *bar = SegmentColor::for_position((i as u32 + 1) * 5, level);
    }
    bars
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_average_level() {
        assert_eq!(average_level(&[]), 0.0);
        assert_eq!(average_level(&[255; 128]), 100.0);
        assert!((average_level(&[0, 255]) - 50.0).abs() < 1e-4);
    }

    #[test]
    fn test_noise_floor_gate() {
        // 5/255 is just under 2%
        assert_eq!(average_level(&[5; 16]), 0.0);
        assert!(average_level(&[6; 16]) > NOISE_FLOOR);
    }

    #[test]
    fn test_segment_colours() {
        let bars = segments(85.0);
        assert_eq!(bars[0], SegmentColor::Green);
        assert_eq!(bars[11], SegmentColor::Green); // 60
        assert_eq!(bars[12], SegmentColor::Yellow); // 65
        assert_eq!(bars[15], SegmentColor::Yellow); // 80
        assert_eq!(bars[16], SegmentColor::Red); // 85
        assert_eq!(bars[17], SegmentColor::Off); // 90

        assert!(segments(0.0).iter().all(|c| *c == SegmentColor::Off));
        assert!(segments(100.0).iter().all(|c| *c != SegmentColor::Off));
    }
}
