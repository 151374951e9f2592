//! Hand-authored fitness rules for driver profiles.
//!
//! Each rule table adds individual bonuses (one per attribute level),
//! synergy bonuses (attribute combinations worth more than their parts)
//! and incompatibility penalties, then clamps the total at zero.
//!
//! - [`ClassicScoring`]: the first table, nine synergies and twenty-one
//!   flat penalties.
//! - [`RevisedScoring`]: the reworked table, nine synergies and three
//!   graded penalties. This is the one the reference run optimizes.
//!
//! The constants are tuning values, not derived quantities.

use super::{
    BrandFit, DriverProfile, DrivingStyle, Experience, RaceConsistency, RawPace, SalaryDemand,
    TeamMindset, TechnicalFeedback,
};
use crate::error::Result;
use crate::ga::{FitnessOracle, Genome};

/// Score components before clamping.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ScoreBreakdown {
    /// Sum of the per-attribute bonuses.
    pub individual: i32,

    /// Sum of the attribute-combination bonuses.
    pub synergy: i32,

    /// Sum of the incompatibility penalties.
    pub penalty: i32,
}

impl ScoreBreakdown {
    /// Bonuses minus penalties, possibly negative.
    pub fn raw(&self) -> i32 {
        self.individual + self.synergy - self.penalty
    }

    /// The raw total clamped at zero.
    pub fn fitness(&self) -> f64 {
        f64::from(self.raw().max(0))
    }
}

/// The first rule table.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ClassicScoring;

impl ClassicScoring {
    /// Fitness of a profile, never negative.
    pub fn score(&self, p: &DriverProfile) -> f64 {
        self.breakdown(p).fitness()
    }

    /// Per-component totals for a profile.
    pub fn breakdown(&self, p: &DriverProfile) -> ScoreBreakdown {
        ScoreBreakdown {
            individual: individual_bonus(p, 4),
            synergy: classic_synergy(p),
            penalty: classic_penalty(p),
        }
    }
}

impl FitnessOracle for ClassicScoring {
    fn evaluate(&self, genome: &Genome) -> Result<f64> {
        Ok(self.score(&DriverProfile::decode(genome)?))
    }
}

/// The revised rule table.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RevisedScoring;

impl RevisedScoring {
    /// Fitness of a profile, never negative.
    pub fn score(&self, p: &DriverProfile) -> f64 {
        self.breakdown(p).fitness()
    }

    /// Per-component totals for a profile.
    pub fn breakdown(&self, p: &DriverProfile) -> ScoreBreakdown {
        ScoreBreakdown {
            individual: individual_bonus(p, 2),
            synergy: revised_synergy(p),
            penalty: revised_penalty(p),
        }
    }
}

impl FitnessOracle for RevisedScoring {
    fn evaluate(&self, genome: &Genome) -> Result<f64> {
        Ok(self.score(&DriverProfile::decode(genome)?))
    }
}

// ============================================================================
// Individual bonuses
// ============================================================================

/// Both tables share these except for the controlled-aggressive style.
fn individual_bonus(p: &DriverProfile, aggressive_style: i32) -> i32 {
    let experience = match p.experience {
        Experience::Rookie => 0,
        Experience::Prospect | Experience::Established => 2,
        Experience::Veteran => 1,
    };
    let style = match p.style {
        DrivingStyle::ControlledAggressive => aggressive_style,
        DrivingStyle::Adaptable => 2,
        DrivingStyle::Calculating | DrivingStyle::Methodical => 0,
    };
    let pace = match p.pace {
        RawPace::Exceptional => 4,
        RawPace::VeryGood => 2,
        RawPace::Average | RawPace::Good => 0,
    };
    let consistency = match p.consistency {
        RaceConsistency::ExtremelyConsistent => 4,
        RaceConsistency::VeryConsistent => 2,
        RaceConsistency::Inconsistent | RaceConsistency::SomewhatConsistent => 0,
    };
    let feedback = match p.feedback {
        TechnicalFeedback::Exceptional => 4,
        TechnicalFeedback::Strong => 2,
        TechnicalFeedback::Limited | TechnicalFeedback::Adequate => 0,
    };
    let mindset = match p.mindset {
        TeamMindset::FullyAligned => 3,
        TeamMindset::TeamPlayer => 2,
        TeamMindset::Balanced => 1,
        TeamMindset::Individualist => 0,
    };
    let brand = match p.brand_fit {
        BrandFit::Perfect => 3,
        BrandFit::Good => 2,
        BrandFit::Low | BrandFit::Acceptable => 0,
    };
    let salary = match p.salary {
        SalaryDemand::VeryLow => 2,
        SalaryDemand::Low => 1,
        SalaryDemand::Medium | SalaryDemand::High => 0,
    };

    experience + style + pace + consistency + feedback + mindset + brand + salary
}

// ============================================================================
// Classic table
// ============================================================================

fn classic_synergy(p: &DriverProfile) -> i32 {
    let senior = matches!(p.experience, Experience::Established | Experience::Veteran);
    let rules = [
        // fast and consistent
        (p.pace.is_fast() && p.consistency.is_high(), 10),
        (p.mindset.is_team_first() && p.feedback.is_strong(), 8),
        // affordable rookie, or affordable and marketable
        (
            (p.experience == Experience::Rookie || p.brand_fit.is_good()) && p.salary.is_cheap(),
            6,
        ),
        (
            p.feedback == TechnicalFeedback::Strong && p.mindset == TeamMindset::TeamPlayer,
            9,
        ),
        (
            p.experience == Experience::Prospect
                && p.brand_fit.is_good()
                && p.salary == SalaryDemand::Low,
            7,
        ),
        (
            p.style == DrivingStyle::Adaptable && p.consistency == RaceConsistency::VeryConsistent,
            6,
        ),
        (
            senior && p.feedback == TechnicalFeedback::Exceptional && p.consistency.is_high(),
            10,
        ),
        (
            p.experience == Experience::Veteran
                && p.brand_fit == BrandFit::Good
                && p.mindset.is_team_first(),
            8,
        ),
        (
            (p.pace == RawPace::Exceptional || p.feedback == TechnicalFeedback::Exceptional)
                && p.salary == SalaryDemand::Medium,
            4,
        ),
    ];
    total(&rules)
}

fn classic_penalty(p: &DriverProfile) -> i32 {
    let veteran = p.experience == Experience::Veteran;
    let senior = matches!(p.experience, Experience::Established | Experience::Veteran);
    let junior = matches!(p.experience, Experience::Rookie | Experience::Prospect);
    let aggressive = p.style == DrivingStyle::ControlledAggressive;
    let exceptional_pace = p.pace == RawPace::Exceptional;

    let rules = [
        (veteran && p.salary.is_cheap(), 9),
        (exceptional_pace && p.mindset == TeamMindset::FullyAligned, 5),
        (
            p.experience == Experience::Rookie && p.feedback == TechnicalFeedback::Exceptional,
            4,
        ),
        (p.mindset.is_team_first() && aggressive, 3),
        // underpriced star
        (elite_traits(p) >= 2 && p.salary.is_cheap(), 13),
        (
            p.style == DrivingStyle::Adaptable && p.feedback == TechnicalFeedback::Limited,
            4,
        ),
        (
            p.salary == SalaryDemand::High && p.brand_fit == BrandFit::Low,
            5,
        ),
        (senior && p.consistency == RaceConsistency::Inconsistent, 4),
        (p.style == DrivingStyle::Calculating && exceptional_pace, 3),
        (junior && p.feedback.is_strong(), 2),
        (
            exceptional_pace && p.consistency == RaceConsistency::ExtremelyConsistent,
            3,
        ),
        (
            p.experience == Experience::Prospect
                && p.style == DrivingStyle::Adaptable
                && p.brand_fit.is_good()
                && (p.pace.is_fast() || p.consistency.is_high()),
            6,
        ),
        (p.mindset.is_team_first() && p.pace.is_fast(), 4),
        (
            junior && p.pace.is_fast() && p.consistency.is_high() && p.salary.is_cheap(),
            8,
        ),
        (
            veteran
                && exceptional_pace
                && p.salary == SalaryDemand::High
                && matches!(p.mindset, TeamMindset::Balanced | TeamMindset::Individualist),
            9,
        ),
        (senior && p.pace.is_fast() && p.consistency.is_high(), 6),
        (
            senior
                && p.feedback.is_strong()
                && matches!(p.salary, SalaryDemand::Medium | SalaryDemand::High),
            7,
        ),
        (veteran && aggressive, 5),
        (
            aggressive
                && p.pace.is_fast()
                && p.consistency != RaceConsistency::ExtremelyConsistent,
            4,
        ),
        (p.consistency.is_high() && p.salary.is_cheap(), 9),
        (veteran && p.brand_fit == BrandFit::Perfect, 5),
    ];
    total(&rules)
}

// ============================================================================
// Revised table
// ============================================================================

fn revised_synergy(p: &DriverProfile) -> i32 {
    let senior = matches!(p.experience, Experience::Established | Experience::Veteran);
    let rules = [
        (p.pace.is_fast() && p.consistency.is_high(), 10),
        (p.feedback.is_strong() && p.mindset.is_team_first(), 10),
        (
            matches!(p.experience, Experience::Rookie | Experience::Prospect)
                && p.brand_fit.is_good()
                && p.salary.is_cheap(),
            6,
        ),
        (
            p.style == DrivingStyle::Adaptable && p.consistency == RaceConsistency::VeryConsistent,
            6,
        ),
        (
            senior
                && p.feedback == TechnicalFeedback::Exceptional
                && p.consistency.is_high()
                && p.mindset.is_team_first(),
            8,
        ),
        (
            p.experience == Experience::Veteran
                && p.brand_fit == BrandFit::Good
                && p.mindset.is_team_first(),
            8,
        ),
        (
            (p.pace == RawPace::Exceptional || p.feedback == TechnicalFeedback::Exceptional)
                && p.salary == SalaryDemand::Medium,
            4,
        ),
        (
            p.experience == Experience::Established
                && p.feedback == TechnicalFeedback::Strong
                && p.mindset == TeamMindset::TeamPlayer
                && p.salary == SalaryDemand::Medium,
            6,
        ),
        (
            p.experience == Experience::Rookie
                && p.feedback == TechnicalFeedback::Adequate
                && p.mindset == TeamMindset::Balanced
                && p.salary == SalaryDemand::VeryLow,
            5,
        ),
    ];
    total(&rules)
}

fn revised_penalty(p: &DriverProfile) -> i32 {
    let mut penalty = 0;

    // underpriced star, graded by how many elite traits
    let elite = elite_traits(p);
    if p.salary.is_cheap() && elite >= 2 {
        penalty += 10 + (elite - 2) * 2;
    }

    // seniority, strong feedback and a cheap salary rarely go together
    let incoherent = [
        matches!(p.experience, Experience::Established | Experience::Veteran),
        p.feedback.is_strong(),
        p.salary.is_cheap(),
    ]
    .into_iter()
    .filter(|&hit| hit)
    .count() as i32;
    if incoherent >= 2 {
        penalty += 9 + (incoherent - 2) * 2;
    }

    // the flawless driver
    if p.pace == RawPace::Exceptional && p.consistency == RaceConsistency::ExtremelyConsistent {
        penalty += 6;
    }

    penalty
}

// ============================================================================
// Helpers
// ============================================================================

/// Count of top-level pace, consistency, feedback and brand fit.
fn elite_traits(p: &DriverProfile) -> i32 {
    [
        p.pace == RawPace::Exceptional,
        p.consistency == RaceConsistency::ExtremelyConsistent,
        p.feedback == TechnicalFeedback::Exceptional,
        p.brand_fit == BrandFit::Perfect,
    ]
    .into_iter()
    .filter(|&hit| hit)
    .count() as i32
}

fn total(rules: &[(bool, i32)]) -> i32 {
    rules.iter().filter(|(hit, _)| *hit).map(|(_, points)| points).sum()
}
