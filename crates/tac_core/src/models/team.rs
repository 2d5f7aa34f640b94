use serde::{Deserialize, Serialize};

/// Side of the map a team is playing. `T` attacks (plants the bomb),
/// `CT` defends. Sides swap at half-time; player identity never changes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum TeamSide {
    T,
    Ct,
}

impl TeamSide {
    pub fn opponent(self) -> Self {
        match self {
            TeamSide::T => TeamSide::Ct,
            TeamSide::Ct => TeamSide::T,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            TeamSide::T => "T",
            TeamSide::Ct => "CT",
        }
    }
}

impl std::fmt::Display for TeamSide {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// A value kept once per side, indexable by `TeamSide`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct PerSide<V> {
    pub t: V,
    pub ct: V,
}

impl<V> PerSide<V> {
    pub fn get(&self, side: TeamSide) -> &V {
        match side {
            TeamSide::T => &self.t,
            TeamSide::Ct => &self.ct,
        }
    }

    pub fn get_mut(&mut self, side: TeamSide) -> &mut V {
        match side {
            TeamSide::T => &mut self.t,
            TeamSide::Ct => &mut self.ct,
        }
    }
}
