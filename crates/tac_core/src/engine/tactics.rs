//! Team tactics and per-round role assignment.
//!
//! A tactic is a closed enum resolved once per round into an ordered list of
//! `RoleSpec`s (target zone + behavior bias). Roles are never re-interpreted
//! in the tick loop and never reassigned mid-round; a new tactic takes
//! effect at the next round start.

use serde::{Deserialize, Serialize};

/// Attacker-side tactics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TTactic {
    #[default]
    Default,
    RushA,
    RushB,
    ExecuteA,
    ExecuteB,
    SplitA,
    SplitB,
    ContactA,
    ContactB,
}

/// Defender-side tactics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CtTactic {
    #[default]
    Standard,
    AggressivePush,
    GambleStackA,
    GambleStackB,
    RetakeSetup,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RoleName {
    Entry,
    Support,
    Lurker,
    BombCarrier,
    AwpAnchor,
    SiteAnchor,
    Rotator,
    MidControl,
    Flex,
}

impl RoleName {
    pub fn label(self) -> &'static str {
        match self {
            RoleName::Entry => "Entry",
            RoleName::Support => "Support",
            RoleName::Lurker => "Lurker",
            RoleName::BombCarrier => "Bomb Carrier",
            RoleName::AwpAnchor => "AWP Anchor",
            RoleName::SiteAnchor => "Site Anchor",
            RoleName::Rotator => "Rotator",
            RoleName::MidControl => "Mid Control",
            RoleName::Flex => "Flex",
        }
    }

    /// Roles that favor the sniper bracket when the economy allows.
    pub fn prefers_awp(self) -> bool {
        matches!(self, RoleName::AwpAnchor)
    }
}

/// Resolved behavior descriptor for one agent for one round.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RoleSpec {
    pub name: RoleName,
    /// Zone the agent routes toward at round start.
    pub target_zone: &'static str,
    /// 0.0 passive .. 1.0 reckless; biases engage-vs-hold decisions.
    pub aggression: f32,
    /// Hold the target zone once reached instead of pushing on.
    pub hold: bool,
    pub description: &'static str,
}

impl RoleSpec {
    /// Assigned to agents beyond the tactic's role list and to agents whose
    /// target zone is missing from the loaded map.
    pub fn fallback() -> Self {
        Self {
            name: RoleName::Flex,
            target_zone: "Mid",
            aggression: 0.5,
            hold: true,
            description: "Play off the team, hold mid",
        }
    }
}

fn role(
    name: RoleName,
    target_zone: &'static str,
    aggression: f32,
    hold: bool,
    description: &'static str,
) -> RoleSpec {
    RoleSpec { name, target_zone, aggression, hold, description }
}

/// Ordered role list for a T tactic. Index 0 should go to the opening
/// player; the caller assigns the bomb to the `BombCarrier` slot.
pub fn roles_for_t(tactic: TTactic) -> Vec<RoleSpec> {
    match tactic {
        TTactic::Default => vec![
            role(RoleName::MidControl, "Mid", 0.5, true, "Take map control at mid"),
            role(RoleName::Entry, "Long A", 0.7, false, "Probe long for picks"),
            role(RoleName::BombCarrier, "Mid", 0.3, true, "Keep the bomb safe until a call"),
            role(RoleName::Support, "Long A", 0.4, true, "Trade the long player"),
            role(RoleName::Lurker, "B Tunnels", 0.3, true, "Watch for rotations"),
        ],
        TTactic::RushA => vec![
            role(RoleName::Entry, "A Site", 0.9, false, "First through the choke"),
            role(RoleName::Support, "A Site", 0.7, false, "Trade instantly"),
            role(RoleName::BombCarrier, "A Site", 0.6, false, "Bomb straight to site"),
            role(RoleName::Support, "Long A", 0.7, false, "Second wave"),
            role(RoleName::Flex, "Short A", 0.6, false, "Cut the crossfire"),
        ],
        TTactic::RushB => vec![
            role(RoleName::Entry, "B Site", 0.9, false, "First into B"),
            role(RoleName::Support, "B Site", 0.7, false, "Trade instantly"),
            role(RoleName::BombCarrier, "B Site", 0.6, false, "Bomb straight to site"),
            role(RoleName::Support, "B Tunnels", 0.7, false, "Second wave"),
            role(RoleName::Lurker, "Mid", 0.4, true, "Stop the mid rotation"),
        ],
        TTactic::ExecuteA => vec![
            role(RoleName::Entry, "A Site", 0.8, false, "Entry off utility"),
            role(RoleName::Support, "Short A", 0.5, false, "Clear short"),
            role(RoleName::BombCarrier, "A Site", 0.4, false, "Plant once site is called"),
            role(RoleName::Support, "Long A", 0.5, false, "Hold long crossfire"),
            role(RoleName::Lurker, "Mid", 0.3, true, "Lurk mid for the retake"),
        ],
        TTactic::ExecuteB => vec![
            role(RoleName::Entry, "B Site", 0.8, false, "Entry off utility"),
            role(RoleName::Support, "B Tunnels", 0.5, false, "Clear tunnels"),
            role(RoleName::BombCarrier, "B Site", 0.4, false, "Plant once site is called"),
            role(RoleName::Support, "B Site", 0.5, false, "Post-plant positions"),
            role(RoleName::Lurker, "Mid", 0.3, true, "Lurk mid for the retake"),
        ],
        TTactic::SplitA => vec![
            role(RoleName::Entry, "Long A", 0.7, false, "Long half of the split"),
            role(RoleName::Support, "Long A", 0.5, false, "Trade long"),
            role(RoleName::Entry, "Short A", 0.7, false, "Short half of the split"),
            role(RoleName::BombCarrier, "Short A", 0.4, false, "Bomb with the short group"),
            role(RoleName::Lurker, "Mid", 0.3, true, "Hold mid against the push"),
        ],
        TTactic::SplitB => vec![
            role(RoleName::Entry, "B Tunnels", 0.7, false, "Tunnels half of the split"),
            role(RoleName::Support, "B Tunnels", 0.5, false, "Trade tunnels"),
            role(RoleName::Entry, "Mid", 0.7, false, "Mid half of the split"),
            role(RoleName::BombCarrier, "Mid", 0.4, false, "Bomb with the mid group"),
            role(RoleName::Support, "B Site", 0.5, false, "Collapse onto site"),
        ],
        TTactic::ContactA => vec![
            role(RoleName::Entry, "A Site", 0.6, false, "Walk up quiet, hit on contact"),
            role(RoleName::Support, "A Site", 0.5, false, "Stay linked"),
            role(RoleName::BombCarrier, "Short A", 0.4, false, "Bomb close behind"),
            role(RoleName::Support, "Short A", 0.5, false, "Second pair"),
            role(RoleName::Lurker, "Mid", 0.3, true, "Silent mid presence"),
        ],
        TTactic::ContactB => vec![
            role(RoleName::Entry, "B Site", 0.6, false, "Walk up quiet, hit on contact"),
            role(RoleName::Support, "B Site", 0.5, false, "Stay linked"),
            role(RoleName::BombCarrier, "B Tunnels", 0.4, false, "Bomb close behind"),
            role(RoleName::Support, "B Tunnels", 0.5, false, "Second pair"),
            role(RoleName::Lurker, "Mid", 0.3, true, "Silent mid presence"),
        ],
    }
}

/// Ordered role list for a CT tactic.
pub fn roles_for_ct(tactic: CtTactic) -> Vec<RoleSpec> {
    match tactic {
        CtTactic::Standard => vec![
            role(RoleName::SiteAnchor, "A Site", 0.3, true, "Anchor A"),
            role(RoleName::AwpAnchor, "Long A", 0.3, true, "Hold the long angle"),
            role(RoleName::MidControl, "Mid", 0.4, true, "Contest mid"),
            role(RoleName::SiteAnchor, "B Site", 0.3, true, "Anchor B"),
            role(RoleName::Rotator, "B Tunnels", 0.4, true, "Early tunnels info, rotate late"),
        ],
        CtTactic::AggressivePush => vec![
            role(RoleName::Entry, "Mid", 0.8, false, "Push mid for info"),
            role(RoleName::Entry, "B Tunnels", 0.8, false, "Push tunnels"),
            role(RoleName::AwpAnchor, "Long A", 0.5, true, "Aggressive long angle"),
            role(RoleName::SiteAnchor, "A Site", 0.3, true, "Keep one anchor home"),
            role(RoleName::SiteAnchor, "B Site", 0.3, true, "Keep one anchor home"),
        ],
        CtTactic::GambleStackA => vec![
            role(RoleName::SiteAnchor, "A Site", 0.4, true, "Stacked A"),
            role(RoleName::AwpAnchor, "Long A", 0.4, true, "Long locked down"),
            role(RoleName::Support, "Short A", 0.4, true, "Short crossfire"),
            role(RoleName::SiteAnchor, "A Site", 0.4, true, "Double anchor"),
            role(RoleName::Rotator, "Mid", 0.4, true, "Lone mid player"),
        ],
        CtTactic::GambleStackB => vec![
            role(RoleName::SiteAnchor, "B Site", 0.4, true, "Stacked B"),
            role(RoleName::Support, "B Tunnels", 0.4, true, "Tunnels crossfire"),
            role(RoleName::SiteAnchor, "B Site", 0.4, true, "Double anchor"),
            role(RoleName::Rotator, "Mid", 0.4, true, "Lone mid player"),
            role(RoleName::AwpAnchor, "B Site", 0.4, true, "AWP on the cross"),
        ],
        CtTactic::RetakeSetup => vec![
            role(RoleName::Rotator, "CT Spawn", 0.3, true, "Group for the retake"),
            role(RoleName::Rotator, "CT Spawn", 0.3, true, "Group for the retake"),
            role(RoleName::AwpAnchor, "Mid", 0.3, true, "Pick from distance"),
            role(RoleName::SiteAnchor, "A Site", 0.2, true, "Light A presence"),
            role(RoleName::SiteAnchor, "B Site", 0.2, true, "Light B presence"),
        ],
    }
}
