/// Scoring levels on the reef, lowest to highest.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ElevatorLevel {
    L1,
    L2,
    L3,
    L4,
}

impl ElevatorLevel {
    pub const ALL: [ElevatorLevel; 4] = [Self::L1, Self::L2, Self::L3, Self::L4];

    /// Elevator carriage height that lines the manipulator up with the level.
    pub fn height_meters(self) -> f64 {
        match self {
            Self::L1 => 0.46,
            Self::L2 => 0.81,
            Self::L3 => 1.21,
            Self::L4 => 1.83,
        }
    }

    /// Arm angle for scoring coral at the level. Degrees from horizontal.
    pub fn arm_angle_degrees(self) -> f64 {
        match self {
            Self::L1 => 0.0,
            Self::L2 | Self::L3 => -35.0,
            Self::L4 => -90.0,
        }
    }

    /// Algae sits between levels; removal happens a little under the branch.
    pub fn algae_removal_height_meters(self) -> f64 {
        self.height_meters() - 0.15
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn heights_increase_with_level() {
        let heights: Vec<f64> = ElevatorLevel::ALL
            .iter()
            .map(|level| level.height_meters())
            .collect();
        assert!(heights.windows(2).all(|pair| pair[0] < pair[1]));
    }

    #[test]
    fn removal_height_stays_below_the_branch() {
        for level in ElevatorLevel::ALL {
            assert!(level.algae_removal_height_meters() < level.height_meters());
        }
    }
}
