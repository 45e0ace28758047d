use std::str::FromStr;

use crate::error::InputError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OperatingMode {
    PlacementCoordinates,
    LoadingPosition,
    ManualControl,
    XyHome,
    ZHome,
    ZeroXy,
    ZeroZ,
    Exit,
}

impl OperatingMode {
    /// Menu order; the menu number is the index plus one.
    pub const ALL: [OperatingMode; 8] = [
        OperatingMode::PlacementCoordinates,
        OperatingMode::LoadingPosition,
        OperatingMode::ManualControl,
        OperatingMode::XyHome,
        OperatingMode::ZHome,
        OperatingMode::ZeroXy,
        OperatingMode::ZeroZ,
        OperatingMode::Exit,
    ];

    pub fn token(&self) -> &'static str {
        match self {
            OperatingMode::PlacementCoordinates => "placement coordinates",
            OperatingMode::LoadingPosition => "loading position",
            OperatingMode::ManualControl => "manual control",
            OperatingMode::XyHome => "XY home",
            OperatingMode::ZHome => "Z home",
            OperatingMode::ZeroXy => "zero XY",
            OperatingMode::ZeroZ => "zero Z",
            OperatingMode::Exit => "exit",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            OperatingMode::PlacementCoordinates => "Input placement coordinates",
            OperatingMode::LoadingPosition => "Go to loading station",
            OperatingMode::ManualControl => "Manual control",
            OperatingMode::XyHome => "XY home calibration",
            OperatingMode::ZHome => "Z home calibration",
            OperatingMode::ZeroXy => "Zero X & Y positions",
            OperatingMode::ZeroZ => "Zero Z position",
            OperatingMode::Exit => "Exit",
        }
    }
}

impl std::fmt::Display for OperatingMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.token())
    }
}

impl FromStr for OperatingMode {
    type Err = InputError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.split_whitespace().collect::<Vec<_>>().join(" ");
        if let Ok(number) = wanted.parse::<usize>() {
            return number
                .checked_sub(1)
                .and_then(|idx| Self::ALL.get(idx).copied())
                .ok_or_else(|| InputError::UnknownMode(s.trim().to_string()));
        }
        Self::ALL
            .into_iter()
            .find(|mode| mode.token().eq_ignore_ascii_case(&wanted))
            .ok_or_else(|| InputError::UnknownMode(s.trim().to_string()))
    }
}
