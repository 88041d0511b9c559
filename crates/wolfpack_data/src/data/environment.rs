use rkyv::{Archive, Deserialize as RkyvDeserialize, Serialize as RkyvSerialize};
use serde::{Deserialize, Serialize};

/// Ticks in one simulated day.
pub const DAY_LENGTH: u64 = 24_000;

#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Default,
    Serialize,
    Deserialize,
    Archive,
    RkyvSerialize,
    RkyvDeserialize,
)]
#[archive(check_bytes)]
pub enum Season {
    #[default]
    Spring,
    Summer,
    Autumn,
    Winter,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Weather {
    #[default]
    Clear,
    Rain,
    Blizzard,
}

/// What a siege is allowed to go after.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Default,
    Serialize,
    Deserialize,
    Archive,
    RkyvSerialize,
    RkyvDeserialize,
)]
#[archive(check_bytes)]
pub enum SiegeType {
    /// Livestock only.
    #[default]
    LivestockRaid,
    /// Livestock, villagers and guardians.
    FullAssault,
}

/// Ambient conditions the host reports each tick.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Climate {
    pub season: Season,
    pub weather: Weather,
    /// Time of day in ticks, `0..DAY_LENGTH`.
    pub day_time: u64,
}

impl Climate {
    #[must_use]
    pub fn is_night(&self) -> bool {
        let t = self.day_time % DAY_LENGTH;
        (13_000..23_000).contains(&t)
    }

    #[must_use]
    pub fn is_blizzard(&self) -> bool {
        self.season == Season::Winter && self.weather == Weather::Blizzard
    }
}
