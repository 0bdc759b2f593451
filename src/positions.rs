use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::model::RosterEntry;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum PositionGroup {
    Quarterback,
    RunningBack,
    WideReceiver,
    TightEnd,
    OffensiveLine,
    DefensiveLine,
    Linebacker,
    DefensiveBack,
    Kicker,
    Punter,
    SpecialTeams,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SuperGroup {
    Offense,
    Defense,
    SpecialTeams,
}

pub const OFFENSE_ORDER: [PositionGroup; 5] = [
    PositionGroup::Quarterback,
    PositionGroup::RunningBack,
    PositionGroup::WideReceiver,
    PositionGroup::TightEnd,
    PositionGroup::OffensiveLine,
];

pub const DEFENSE_ORDER: [PositionGroup; 3] = [
    PositionGroup::DefensiveLine,
    PositionGroup::Linebacker,
    PositionGroup::DefensiveBack,
];

pub const SPECIAL_ORDER: [PositionGroup; 3] = [
    PositionGroup::Kicker,
    PositionGroup::Punter,
    PositionGroup::SpecialTeams,
];

impl PositionGroup {
    pub fn label(self) -> &'static str {
        match self {
            PositionGroup::Quarterback => "Quarterback",
            PositionGroup::RunningBack => "Running Back",
            PositionGroup::WideReceiver => "Wide Receiver",
            PositionGroup::TightEnd => "Tight End",
            PositionGroup::OffensiveLine => "Offensive Line",
            PositionGroup::DefensiveLine => "Defensive Line",
            PositionGroup::Linebacker => "Linebacker",
            PositionGroup::DefensiveBack => "Defensive Back",
            PositionGroup::Kicker => "Kicker",
            PositionGroup::Punter => "Punter",
            PositionGroup::SpecialTeams => "Special Teams",
        }
    }

    pub fn super_group(self) -> SuperGroup {
        match self {
            PositionGroup::Quarterback
            | PositionGroup::RunningBack
            | PositionGroup::WideReceiver
            | PositionGroup::TightEnd
            | PositionGroup::OffensiveLine => SuperGroup::Offense,
            PositionGroup::DefensiveLine
            | PositionGroup::Linebacker
            | PositionGroup::DefensiveBack => SuperGroup::Defense,
            PositionGroup::Kicker | PositionGroup::Punter | PositionGroup::SpecialTeams => {
                SuperGroup::SpecialTeams
            }
        }
    }

    /// Path segment of the position leaderboard, if the stats service has one for this group.
    pub fn stats_slug(self) -> Option<&'static str> {
        match self {
            PositionGroup::Quarterback => Some("quarterback"),
            PositionGroup::RunningBack => Some("running_back"),
            PositionGroup::WideReceiver => Some("wide_receiver"),
            PositionGroup::TightEnd => Some("tight_end"),
            PositionGroup::DefensiveLine => Some("defensive_line"),
            PositionGroup::Linebacker => Some("linebacker"),
            PositionGroup::DefensiveBack => Some("defensive_back"),
            PositionGroup::Kicker => Some("kicker"),
            PositionGroup::OffensiveLine | PositionGroup::Punter | PositionGroup::SpecialTeams => {
                None
            }
        }
    }
}

impl SuperGroup {
    pub fn label(self) -> &'static str {
        match self {
            SuperGroup::Offense => "Offense",
            SuperGroup::Defense => "Defense",
            SuperGroup::SpecialTeams => "Special Teams",
        }
    }

    pub fn order(self) -> &'static [PositionGroup] {
        match self {
            SuperGroup::Offense => &OFFENSE_ORDER,
            SuperGroup::Defense => &DEFENSE_ORDER,
            SuperGroup::SpecialTeams => &SPECIAL_ORDER,
        }
    }
}

/// Classify a raw position into its roster group. Total: anything unrecognised
/// (including `None` and blank input) lands in Special Teams.
pub fn classify(raw: Option<&str>) -> PositionGroup {
    let Some(raw) = raw.map(str::trim).filter(|s| !s.is_empty()) else {
        return PositionGroup::SpecialTeams;
    };
    if let Some(group) = classify_code(&raw.to_ascii_uppercase()) {
        return group;
    }
    classify_text(&raw.to_lowercase())
}

fn classify_code(code: &str) -> Option<PositionGroup> {
    let group = match code {
        "QB" => PositionGroup::Quarterback,
        "RB" | "HB" | "FB" | "TB" => PositionGroup::RunningBack,
        "WR" => PositionGroup::WideReceiver,
        "TE" => PositionGroup::TightEnd,
        "OL" | "OT" | "OG" | "T" | "G" | "C" | "LT" | "RT" | "LG" | "RG" => {
            PositionGroup::OffensiveLine
        }
        "DL" | "DE" | "DT" | "NT" => PositionGroup::DefensiveLine,
        "LB" | "ILB" | "OLB" | "MLB" => PositionGroup::Linebacker,
        "DB" | "CB" | "S" | "FS" | "SS" => PositionGroup::DefensiveBack,
        "K" | "PK" => PositionGroup::Kicker,
        "P" => PositionGroup::Punter,
        "LS" => PositionGroup::SpecialTeams,
        _ => return None,
    };
    Some(group)
}

// Order matters: verbose descriptions can contain tokens of several groups.
fn classify_text(s: &str) -> PositionGroup {
    if s.contains("quarterback") {
        return PositionGroup::Quarterback;
    }
    if s.contains("running") || s.contains("fullback") || s.contains("halfback") {
        return PositionGroup::RunningBack;
    }
    if s.contains("wide receiver") {
        return PositionGroup::WideReceiver;
    }
    if s.contains("tight end") {
        return PositionGroup::TightEnd;
    }
    if s.contains("nose tackle") {
        return PositionGroup::DefensiveLine;
    }
    let line_token = s.contains("guard") || s.contains("tackle") || s.contains("center");
    if line_token && !s.contains("defensive") {
        return PositionGroup::OffensiveLine;
    }
    if s.contains("offensive") && (s.contains("line") || line_token) {
        return PositionGroup::OffensiveLine;
    }
    if s.contains("defensive") && (s.contains("line") || s.contains("end") || s.contains("tackle"))
    {
        return PositionGroup::DefensiveLine;
    }
    if s.contains("linebacker") {
        return PositionGroup::Linebacker;
    }
    if s.contains("cornerback") || s.contains("safety") || s.contains("defensive back") {
        return PositionGroup::DefensiveBack;
    }
    if s.contains("kicker") {
        return PositionGroup::Kicker;
    }
    if s.contains("punter") {
        return PositionGroup::Punter;
    }
    PositionGroup::SpecialTeams
}

/// Roster partitioned by group; each group keeps the input order of its players.
pub type GroupedRoster = HashMap<PositionGroup, Vec<RosterEntry>>;

pub fn group_roster(entries: &[RosterEntry]) -> GroupedRoster {
    let mut grouped: GroupedRoster = HashMap::new();
    for entry in entries {
        grouped
            .entry(entry.position_group())
            .or_default()
            .push(entry.clone());
    }
    grouped
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OrderedGroups {
    pub offense: Vec<PositionGroup>,
    pub defense: Vec<PositionGroup>,
    pub special: Vec<PositionGroup>,
}

impl OrderedGroups {
    pub fn sections(&self) -> [(SuperGroup, &[PositionGroup]); 3] {
        [
            (SuperGroup::Offense, self.offense.as_slice()),
            (SuperGroup::Defense, self.defense.as_slice()),
            (SuperGroup::SpecialTeams, self.special.as_slice()),
        ]
    }

    pub fn is_empty(&self) -> bool {
        self.offense.is_empty() && self.defense.is_empty() && self.special.is_empty()
    }
}

pub fn ordered_groups(grouped: &GroupedRoster) -> OrderedGroups {
    let present = |order: &[PositionGroup]| -> Vec<PositionGroup> {
        order
            .iter()
            .copied()
            .filter(|g| grouped.get(g).is_some_and(|players| !players.is_empty()))
            .collect()
    };
    OrderedGroups {
        offense: present(&OFFENSE_ORDER),
        defense: present(&DEFENSE_ORDER),
        special: present(&SPECIAL_ORDER),
    }
}

/// Roster ready for display: grouped players plus the display order of the groups.
#[derive(Debug, Clone, Default)]
pub struct RosterView {
    pub groups: GroupedRoster,
    pub order: OrderedGroups,
}

impl RosterView {
    pub fn build(entries: &[RosterEntry]) -> Self {
        let groups = group_roster(entries);
        let order = ordered_groups(&groups);
        Self { groups, order }
    }

    /// Players flattened in display order, paired with their group.
    pub fn display_rows(&self) -> Vec<(PositionGroup, &RosterEntry)> {
        let mut rows = Vec::new();
        for (_, groups) in self.order.sections() {
            for group in groups {
                if let Some(players) = self.groups.get(group) {
                    rows.extend(players.iter().map(|p| (*group, p)));
                }
            }
        }
        rows
    }

    pub fn player_count(&self) -> usize {
        self.groups.values().map(Vec::len).sum()
    }
}
