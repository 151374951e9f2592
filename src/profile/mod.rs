//! Racing-driver candidate profiles.
//!
//! A profile is eight categorical attributes, each stored as a two-bit
//! field of a 16-bit [`Genome`], in this order:
//!
//! | bits  | attribute                       |
//! |-------|---------------------------------|
//! | 0-1   | [`Experience`]                  |
//! | 2-3   | [`DrivingStyle`]                |
//! | 4-5   | [`RawPace`]                     |
//! | 6-7   | [`RaceConsistency`]             |
//! | 8-9   | [`TechnicalFeedback`]           |
//! | 10-11 | [`TeamMindset`]                 |
//! | 12-13 | [`BrandFit`]                    |
//! | 14-15 | [`SalaryDemand`]                |
//!
//! Field values `00`, `01`, `10`, `11` map to the four levels of each
//! attribute in declaration order, so every 16-bit genome is a valid
//! profile.
//!
//! [`scoring`] holds the two rule tables that turn a profile into a
//! fitness score.

pub mod scoring;

pub use scoring::{ClassicScoring, RevisedScoring, ScoreBreakdown};

use crate::error::Result;
use crate::ga::Genome;
use std::fmt;

/// Genome length of an encoded profile.
pub const PROFILE_BITS: usize = 16;

/// Bits per attribute.
const FIELD_WIDTH: usize = 2;

/// One of the four levels of a profile attribute.
pub trait Level: Copy + Eq + fmt::Debug + 'static {
    /// Human-readable attribute name.
    const ATTRIBUTE: &'static str;

    /// Levels in field-value order (`00`, `01`, `10`, `11`).
    const ALL: [Self; 4];

    /// Human-readable level name.
    fn label(self) -> &'static str;

    /// The level encoded by the low two bits of `value`.
    fn from_bits(value: u8) -> Self {
        Self::ALL[usize::from(value & 0b11)]
    }

    /// The two-bit field value of this level.
    fn bits(self) -> u8 {
        Self::ALL.iter().position(|&l| l == self).unwrap_or(0) as u8
    }
}

/// Years of top-level racing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Experience {
    /// At most one full season.
    Rookie,
    /// Two to four seasons.
    Prospect,
    /// Five to eight seasons.
    Established,
    /// More than eight seasons.
    Veteran,
}

impl Level for Experience {
    const ATTRIBUTE: &'static str = "Experience";
    const ALL: [Self; 4] = [Self::Rookie, Self::Prospect, Self::Established, Self::Veteran];

    fn label(self) -> &'static str {
        match self {
            Self::Rookie => "Rookie",
            Self::Prospect => "Young Prospect",
            Self::Established => "Established",
            Self::Veteran => "Veteran",
        }
    }
}

/// How the driver approaches a race.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum DrivingStyle {
    ControlledAggressive,
    Calculating,
    Methodical,
    Adaptable,
}

impl Level for DrivingStyle {
    const ATTRIBUTE: &'static str = "Driving Style";
    const ALL: [Self; 4] = [
        Self::ControlledAggressive,
        Self::Calculating,
        Self::Methodical,
        Self::Adaptable,
    ];

    fn label(self) -> &'static str {
        match self {
            Self::ControlledAggressive => "Controlled Aggressive",
            Self::Calculating => "Consistent and Calculating",
            Self::Methodical => "Technical and Methodical",
            Self::Adaptable => "Adaptable",
        }
    }
}

/// Single-lap speed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum RawPace {
    Average,
    Good,
    VeryGood,
    Exceptional,
}

impl RawPace {
    /// Very good or exceptional.
    pub fn is_fast(self) -> bool {
        matches!(self, Self::VeryGood | Self::Exceptional)
    }
}

impl Level for RawPace {
    const ATTRIBUTE: &'static str = "Raw Pace";
    const ALL: [Self; 4] = [Self::Average, Self::Good, Self::VeryGood, Self::Exceptional];

    fn label(self) -> &'static str {
        match self {
            Self::Average => "Average",
            Self::Good => "Good",
            Self::VeryGood => "Very Good",
            Self::Exceptional => "Exceptional",
        }
    }
}

/// Lap-to-lap and race-to-race consistency.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum RaceConsistency {
    Inconsistent,
    SomewhatConsistent,
    VeryConsistent,
    ExtremelyConsistent,
}

impl RaceConsistency {
    /// Very or extremely consistent.
    pub fn is_high(self) -> bool {
        matches!(self, Self::VeryConsistent | Self::ExtremelyConsistent)
    }
}

impl Level for RaceConsistency {
    const ATTRIBUTE: &'static str = "Race Consistency";
    const ALL: [Self; 4] = [
        Self::Inconsistent,
        Self::SomewhatConsistent,
        Self::VeryConsistent,
        Self::ExtremelyConsistent,
    ];

    fn label(self) -> &'static str {
        match self {
            Self::Inconsistent => "Inconsistent",
            Self::SomewhatConsistent => "Somewhat Consistent",
            Self::VeryConsistent => "Very Consistent",
            Self::ExtremelyConsistent => "Extremely Consistent",
        }
    }
}

/// Quality of the driver's feedback to engineers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum TechnicalFeedback {
    Limited,
    Adequate,
    Strong,
    Exceptional,
}

impl TechnicalFeedback {
    /// Strong or exceptional.
    pub fn is_strong(self) -> bool {
        matches!(self, Self::Strong | Self::Exceptional)
    }
}

impl Level for TechnicalFeedback {
    const ATTRIBUTE: &'static str = "Technical Feedback";
    const ALL: [Self; 4] = [Self::Limited, Self::Adequate, Self::Strong, Self::Exceptional];

    fn label(self) -> &'static str {
        match self {
            Self::Limited => "Limited",
            Self::Adequate => "Adequate",
            Self::Strong => "Strong",
            Self::Exceptional => "Exceptional",
        }
    }
}

/// Willingness to put team results ahead of personal ones.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum TeamMindset {
    Individualist,
    Balanced,
    TeamPlayer,
    FullyAligned,
}

impl TeamMindset {
    /// Natural team player or fully aligned with the team.
    pub fn is_team_first(self) -> bool {
        matches!(self, Self::TeamPlayer | Self::FullyAligned)
    }
}

impl Level for TeamMindset {
    const ATTRIBUTE: &'static str = "Team Mindset";
    const ALL: [Self; 4] = [
        Self::Individualist,
        Self::Balanced,
        Self::TeamPlayer,
        Self::FullyAligned,
    ];

    fn label(self) -> &'static str {
        match self {
            Self::Individualist => "Primarily Individualist",
            Self::Balanced => "Balanced",
            Self::TeamPlayer => "Natural Team Player",
            Self::FullyAligned => "Fully Aligned with the Team",
        }
    }
}

/// How well the driver fits the sponsor's brand image.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum BrandFit {
    Low,
    Acceptable,
    Good,
    Perfect,
}

impl BrandFit {
    /// Good or perfect.
    pub fn is_good(self) -> bool {
        matches!(self, Self::Good | Self::Perfect)
    }
}

impl Level for BrandFit {
    const ATTRIBUTE: &'static str = "Brand Fit";
    const ALL: [Self; 4] = [Self::Low, Self::Acceptable, Self::Good, Self::Perfect];

    fn label(self) -> &'static str {
        match self {
            Self::Low => "Low Fit",
            Self::Acceptable => "Acceptable Fit",
            Self::Good => "Good Fit",
            Self::Perfect => "Perfect Fit",
        }
    }
}

/// Salary the driver expects.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum SalaryDemand {
    VeryLow,
    Low,
    Medium,
    High,
}

impl SalaryDemand {
    /// Very low or low.
    pub fn is_cheap(self) -> bool {
        matches!(self, Self::VeryLow | Self::Low)
    }
}

impl Level for SalaryDemand {
    const ATTRIBUTE: &'static str = "Salary Demand";
    const ALL: [Self; 4] = [Self::VeryLow, Self::Low, Self::Medium, Self::High];

    fn label(self) -> &'static str {
        match self {
            Self::VeryLow => "Very Low Salary",
            Self::Low => "Low Salary",
            Self::Medium => "Medium Salary",
            Self::High => "High Salary",
        }
    }
}

/// A decoded candidate profile.
///
/// ```
/// use driver_ga::ga::Genome;
/// use driver_ga::profile::{DriverProfile, Experience, SalaryDemand};
///
/// let profile = DriverProfile::decode(&Genome::from_u64(0b11_00_00_00_00_00_00_10, 16))?;
/// assert_eq!(profile.experience, Experience::Veteran);
/// assert_eq!(profile.salary, SalaryDemand::Medium);
/// # Ok::<(), driver_ga::EvolveError>(())
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct DriverProfile {
    pub experience: Experience,
    pub style: DrivingStyle,
    pub pace: RawPace,
    pub consistency: RaceConsistency,
    pub feedback: TechnicalFeedback,
    pub mindset: TeamMindset,
    pub brand_fit: BrandFit,
    pub salary: SalaryDemand,
}

impl DriverProfile {
    /// Decodes a 16-bit genome.
    ///
    /// Fails with [`InvalidGenomeLength`](crate::EvolveError::InvalidGenomeLength)
    /// for any other length.
    pub fn decode(genome: &Genome) -> Result<Self> {
        genome.check_length(PROFILE_BITS)?;
        let field = |index: usize| genome.field(index * FIELD_WIDTH, FIELD_WIDTH);

        Ok(Self {
            experience: Level::from_bits(field(0)),
            style: Level::from_bits(field(1)),
            pace: Level::from_bits(field(2)),
            consistency: Level::from_bits(field(3)),
            feedback: Level::from_bits(field(4)),
            mindset: Level::from_bits(field(5)),
            brand_fit: Level::from_bits(field(6)),
            salary: Level::from_bits(field(7)),
        })
    }

    /// Encodes back into the 16-bit genome [`decode`](Self::decode) accepts.
    pub fn encode(&self) -> Genome {
        let value = self
            .fields()
            .iter()
            .fold(0u64, |acc, &(_, bits, _)| (acc << FIELD_WIDTH) | u64::from(bits));
        Genome::from_u64(value, PROFILE_BITS)
    }

    /// `(attribute, field value, level label)` for each attribute in genome
    /// order.
    pub fn fields(&self) -> [(&'static str, u8, &'static str); 8] {
        [
            entry(self.experience),
            entry(self.style),
            entry(self.pace),
            entry(self.consistency),
            entry(self.feedback),
            entry(self.mindset),
            entry(self.brand_fit),
            entry(self.salary),
        ]
    }
}

fn entry<L: Level>(level: L) -> (&'static str, u8, &'static str) {
    (L::ATTRIBUTE, level.bits(), level.label())
}

impl fmt::Display for DriverProfile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (attribute, _, label) in self.fields() {
            writeln!(f, "{attribute}: {label}")?;
        }
        Ok(())
    }
}

impl TryFrom<&Genome> for DriverProfile {
    type Error = crate::EvolveError;

    fn try_from(genome: &Genome) -> Result<Self> {
        Self::decode(genome)
    }
}

impl From<DriverProfile> for Genome {
    fn from(profile: DriverProfile) -> Self {
        profile.encode()
    }
}
