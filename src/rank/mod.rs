//! Rank ⇄ ELO conversion.
//!
//! One canonical ladder, 400 points per tier and 100 per division:
//!
//! - 0–300 Iron IV..I
//! - 400–700 Bronze, 800–1100 Silver, 1200–1500 Gold
//! - 1600–1900 Platinum, 2000–2300 Emerald, 2400–2700 Diamond
//! - 2800+ Master / Grandmaster / Challenger, LP added directly
//!
//! League points are added on top of the tier+division base. Turbo
//! (Hyper Roll) ranks have no divisions or LP and map to fixed mid-tier
//! values. Both directions are pure functions.

use std::fmt;
use std::str::FromStr;
use std::sync::OnceLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

/// A rank tier band.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Tier {
    Iron,
    Bronze,
    Silver,
    Gold,
    Platinum,
    Emerald,
    Diamond,
    Master,
    Grandmaster,
    Challenger,
}

impl Tier {
    /// Base ELO for this tier. All apex tiers share the same base.
    pub fn base_elo(self) -> u32 {
        match self {
            Tier::Iron => 0,
            Tier::Bronze => 400,
            Tier::Silver => 800,
            Tier::Gold => 1200,
            Tier::Platinum => 1600,
            Tier::Emerald => 2000,
            Tier::Diamond => 2400,
            Tier::Master | Tier::Grandmaster | Tier::Challenger => 2800,
        }
    }

    /// Apex tiers have no divisions; LP is added to the base directly.
    pub fn is_apex(self) -> bool {
        matches!(self, Tier::Master | Tier::Grandmaster | Tier::Challenger)
    }

    /// Fixed mid-tier value for Turbo (Hyper Roll) ranks.
    ///
    /// Turbo has no divisions or LP and does not go above Diamond.
    fn turbo_elo(self) -> u32 {
        match self {
            Tier::Iron => 200,
            Tier::Bronze => 600,
            Tier::Silver => 1000,
            Tier::Gold => 1400,
            Tier::Platinum => 1800,
            Tier::Emerald => 2200,
            Tier::Diamond => 2600,
            _ => 0,
        }
    }
}

impl FromStr for Tier {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "IRON" => Ok(Tier::Iron),
            "BRONZE" => Ok(Tier::Bronze),
            "SILVER" => Ok(Tier::Silver),
            "GOLD" => Ok(Tier::Gold),
            "PLATINUM" => Ok(Tier::Platinum),
            "EMERALD" => Ok(Tier::Emerald),
            "DIAMOND" => Ok(Tier::Diamond),
            "MASTER" => Ok(Tier::Master),
            "GRANDMASTER" => Ok(Tier::Grandmaster),
            "CHALLENGER" => Ok(Tier::Challenger),
            _ => Err(()),
        }
    }
}

impl fmt::Display for Tier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Tier::Iron => "IRON",
            Tier::Bronze => "BRONZE",
            Tier::Silver => "SILVER",
            Tier::Gold => "GOLD",
            Tier::Platinum => "PLATINUM",
            Tier::Emerald => "EMERALD",
            Tier::Diamond => "DIAMOND",
            Tier::Master => "MASTER",
            Tier::Grandmaster => "GRANDMASTER",
            Tier::Challenger => "CHALLENGER",
        };
        write!(f, "{}", name)
    }
}

/// A division within a non-apex tier. I is the most senior.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Division {
    I,
    II,
    III,
    IV,
}

impl Division {
    /// Offset above the tier base. Closer to I is higher.
    pub fn offset(self) -> u32 {
        match self {
            Division::IV => 0,
            Division::III => 100,
            Division::II => 200,
            Division::I => 300,
        }
    }
}

impl FromStr for Division {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "I" => Ok(Division::I),
            "II" => Ok(Division::II),
            "III" => Ok(Division::III),
            "IV" => Ok(Division::IV),
            _ => Err(()),
        }
    }
}

/// A structured rank descriptor as reported by the league API.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RankDescriptor {
    /// `None` means unranked.
    pub tier: Option<Tier>,

    /// Ignored for apex tiers; `None` is treated as division IV.
    pub division: Option<Division>,

    /// Negative values are clamped to 0.
    pub league_points: i32,
}

impl RankDescriptor {
    pub fn new(tier: Option<Tier>, division: Option<Division>, league_points: i32) -> Self {
        Self {
            tier,
            division,
            league_points,
        }
    }
}

/// Convert a structured rank descriptor to its ELO score.
///
/// Unranked (no tier) is 0. Apex tiers ignore the division and add LP
/// to the shared apex base.
pub fn rank_to_elo(rank: &RankDescriptor) -> u32 {
    let Some(tier) = rank.tier else {
        return 0;
    };
    let lp = rank.league_points.max(0) as u32;
    if tier.is_apex() {
        tier.base_elo() + lp
    } else {
        let division = rank.division.map(Division::offset).unwrap_or(0);
        tier.base_elo() + division + lp
    }
}

fn rank_pattern() -> &'static Regex {
    static RANK_RE: OnceLock<Regex> = OnceLock::new();
    RANK_RE.get_or_init(|| {
        Regex::new(r"(?i)^(turbo\s+)?([a-z]+)(?:\s+(iv|iii|ii|i))?(?:\s+(-?\d+)\s*(?:lp)?)?\s*$")
            .unwrap()
    })
}

/// Convert a raw rank string to its ELO score.
///
/// Accepts "GOLD II 45LP", "GOLD II 45", "MASTER 120LP", bare tiers,
/// and "TURBO GOLD", case-insensitively. Unrecognized or unranked
/// strings are 0.
pub fn rank_str_to_elo(raw: &str) -> u32 {
    let raw = raw.trim();
    if raw.is_empty() || raw.eq_ignore_ascii_case("UNRANKED") {
        return 0;
    }

    let Some(caps) = rank_pattern().captures(raw) else {
        return 0;
    };
    let Ok(tier) = caps[2].parse::<Tier>() else {
        return 0;
    };

    if caps.get(1).is_some() {
        return tier.turbo_elo();
    }

    let division = caps.get(3).and_then(|m| m.as_str().parse::<Division>().ok());
    let lp = caps
        .get(4)
        .and_then(|m| m.as_str().parse::<i32>().ok())
        .unwrap_or(0);

    rank_to_elo(&RankDescriptor::new(Some(tier), division, lp))
}

/// Map an ELO score back to a coarse tier label.
///
/// Lossy by design: divisions and LP are not recovered, and every apex
/// score reads as Master. `None` means unranked (score 0).
pub fn elo_to_tier(elo: u32) -> Option<Tier> {
    if elo == 0 {
        return None;
    }
    Some(match elo {
        e if e >= 2800 => Tier::Master,
        e if e >= 2400 => Tier::Diamond,
        e if e >= 2000 => Tier::Emerald,
        e if e >= 1600 => Tier::Platinum,
        e if e >= 1200 => Tier::Gold,
        e if e >= 800 => Tier::Silver,
        e if e >= 400 => Tier::Bronze,
        _ => Tier::Iron,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    const ALL_TIERS: [Tier; 10] = [
        Tier::Iron,
        Tier::Bronze,
        Tier::Silver,
        Tier::Gold,
        Tier::Platinum,
        Tier::Emerald,
        Tier::Diamond,
        Tier::Master,
        Tier::Grandmaster,
        Tier::Challenger,
    ];

    #[test]
    fn test_encode_monotonic_across_tiers() {
        // A lower tier at its best (division I, 99 LP) must stay below a
        // higher tier at its worst (division IV, 0 LP). Apex tiers share a
        // base, so apex-apex pairs are excluded.
        for pair in ALL_TIERS.windows(2) {
            let (low, high) = (pair[0], pair[1]);
            if low.is_apex() && high.is_apex() {
                continue;
            }
            let best_low =
                rank_to_elo(&RankDescriptor::new(Some(low), Some(Division::I), 99));
            let worst_high =
                rank_to_elo(&RankDescriptor::new(Some(high), Some(Division::IV), 0));
            assert!(
                best_low < worst_high,
                "{:?} ({}) should be below {:?} ({})",
                low,
                best_low,
                high,
                worst_high
            );
        }
    }

    #[test]
    fn test_encode_deterministic() {
        let rank = RankDescriptor::new(Some(Tier::Gold), Some(Division::II), 45);
        assert_eq!(rank_to_elo(&rank), rank_to_elo(&rank));
        assert_eq!(rank_to_elo(&rank), 1445);
    }

    #[test]
    fn test_unranked_is_zero() {
        assert_eq!(rank_to_elo(&RankDescriptor::new(None, None, 50)), 0);
        assert_eq!(rank_str_to_elo("UNRANKED"), 0);
        assert_eq!(rank_str_to_elo("unranked"), 0);
        assert_eq!(rank_str_to_elo(""), 0);
    }

    #[test]
    fn test_division_ordering() {
        let base = |d| rank_to_elo(&RankDescriptor::new(Some(Tier::Silver), Some(d), 0));
        assert_eq!(base(Division::IV), 800);
        assert_eq!(base(Division::III), 900);
        assert_eq!(base(Division::II), 1000);
        assert_eq!(base(Division::I), 1100);
    }

    #[test]
    fn test_missing_division_is_division_iv() {
        assert_eq!(
            rank_to_elo(&RankDescriptor::new(Some(Tier::Gold), None, 20)),
            1220
        );
    }

    #[test]
    fn test_apex_ignores_division() {
        let with_division =
            rank_to_elo(&RankDescriptor::new(Some(Tier::Master), Some(Division::I), 120));
        let without = rank_to_elo(&RankDescriptor::new(Some(Tier::Master), None, 120));
        assert_eq!(with_division, without);
        assert_eq!(without, 2920);
    }

    #[test]
    fn test_apex_tiers_share_base() {
        for tier in [Tier::Master, Tier::Grandmaster, Tier::Challenger] {
            assert_eq!(
                rank_to_elo(&RankDescriptor::new(Some(tier), None, 0)),
                2800
            );
        }
    }

    #[test]
    fn test_negative_lp_clamped() {
        assert_eq!(
            rank_to_elo(&RankDescriptor::new(Some(Tier::Iron), Some(Division::IV), -30)),
            0
        );
    }

    #[test]
    fn test_parse_rank_strings() {
        assert_eq!(rank_str_to_elo("GOLD II 45LP"), 1445);
        assert_eq!(rank_str_to_elo("gold ii 45"), 1445);
        assert_eq!(rank_str_to_elo("GOLD II"), 1400);
        assert_eq!(rank_str_to_elo("GOLD"), 1200);
        assert_eq!(rank_str_to_elo("MASTER 120LP"), 2920);
        assert_eq!(rank_str_to_elo("CHALLENGER 1250LP"), 4050);
        assert_eq!(rank_str_to_elo("IRON IV 0LP"), 0);
    }

    #[test]
    fn test_parse_garbage_is_zero() {
        assert_eq!(rank_str_to_elo("not a rank at all"), 0);
        assert_eq!(rank_str_to_elo("WOOD V"), 0);
    }

    #[test]
    fn test_turbo_ranks() {
        assert_eq!(rank_str_to_elo("TURBO IRON"), 200);
        assert_eq!(rank_str_to_elo("TURBO GOLD"), 1400);
        assert_eq!(rank_str_to_elo("TURBO DIAMOND"), 2600);
        assert_eq!(rank_str_to_elo("TURBO UNRANKED"), 0);
        assert_eq!(rank_str_to_elo("turbo silver"), 1000);
    }

    #[test]
    fn test_decode_thresholds() {
        assert_eq!(elo_to_tier(0), None);
        assert_eq!(elo_to_tier(1), Some(Tier::Iron));
        assert_eq!(elo_to_tier(399), Some(Tier::Iron));
        assert_eq!(elo_to_tier(400), Some(Tier::Bronze));
        assert_eq!(elo_to_tier(1199), Some(Tier::Silver));
        assert_eq!(elo_to_tier(1200), Some(Tier::Gold));
        assert_eq!(elo_to_tier(2399), Some(Tier::Emerald));
        assert_eq!(elo_to_tier(2400), Some(Tier::Diamond));
        assert_eq!(elo_to_tier(2799), Some(Tier::Diamond));
        assert_eq!(elo_to_tier(2800), Some(Tier::Master));
        assert_eq!(elo_to_tier(4000), Some(Tier::Master));
    }

    #[test]
    fn test_encode_decode_round_trip_is_coarse() {
        let elo = rank_str_to_elo("EMERALD I 72LP");
        assert_eq!(elo, 2372);
        assert_eq!(elo_to_tier(elo), Some(Tier::Emerald));
    }

    #[test]
    fn test_tier_display() {
        assert_eq!(Tier::Gold.to_string(), "GOLD");
        assert_eq!(Tier::Grandmaster.to_string(), "GRANDMASTER");
    }
}
