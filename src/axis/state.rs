use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AxisStatus {
    Idle,
    Moving,
    Error,
    Homing,
}

impl AxisStatus {
    pub const ALL: [AxisStatus; 4] = [
        AxisStatus::Idle,
        AxisStatus::Moving,
        AxisStatus::Error,
        AxisStatus::Homing,
    ];

    /// Maps a controller status code positionally. Codes outside `0..=3`
    /// resolve to `Idle` so snapshot assembly never fails on them.
    pub fn from_code(code: i64) -> Self {
        match code {
            1 => AxisStatus::Moving,
            2 => AxisStatus::Error,
            3 => AxisStatus::Homing,
            _ => AxisStatus::Idle,
        }
    }

    pub fn code(&self) -> i64 {
        match self {
            AxisStatus::Idle => 0,
            AxisStatus::Moving => 1,
            AxisStatus::Error => 2,
            AxisStatus::Homing => 3,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_codes_map_positionally() {
        for status in AxisStatus::ALL {
            assert_eq!(AxisStatus::from_code(status.code()), status);
        }
    }

    #[test]
    fn test_out_of_range_code_is_idle() {
        assert_eq!(AxisStatus::from_code(4), AxisStatus::Idle);
        assert_eq!(AxisStatus::from_code(-1), AxisStatus::Idle);
        assert_eq!(AxisStatus::from_code(i64::MAX), AxisStatus::Idle);
    }
}
