use crate::models::challenge::ChallengeSummary;
use crate::models::feedback::Feedback;
use serde::Serialize;
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Tab {
    #[default]
    Description,
    Setup,
    Details,
    Techniques,
}

impl Tab {
    pub const ALL: [Tab; 4] = [Tab::Description, Tab::Setup, Tab::Details, Tab::Techniques];

    pub fn slug(self) -> &'static str {
        match self {
            Tab::Description => "description",
            Tab::Setup => "setup",
            Tab::Details => "details",
            Tab::Techniques => "techniques",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Tab::Description => "Challenge",
            Tab::Setup => "Setup",
            Tab::Details => "Details",
            Tab::Techniques => "Techniques",
        }
    }
}

impl fmt::Display for Tab {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.slug())
    }
}

impl FromStr for Tab {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Tab::ALL
            .into_iter()
            .find(|t| t.slug() == s)
            .ok_or_else(|| format!("unknown tab '{s}'"))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SidebarItem {
    pub id: String,
    pub title: String,
    pub points: u32,
    pub active: bool,
    pub completed: bool,
}

/// What the map area should show.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase", tag = "state")]
pub enum MapView {
    /// No challenge, no map config, or the last rebuild failed.
    Empty,
    /// A rebuild is scheduled; the loading indicator is visible.
    Loading { remaining_ms: u64 },
    Ready,
}

/// Snapshot of everything the page draws.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PageView {
    pub sidebar: Vec<SidebarItem>,
    pub current: Option<ChallengeSummary>,
    pub position: Option<usize>,
    pub tab: Tab,
    pub prev_enabled: bool,
    pub next_enabled: bool,
    pub flag_input: String,
    pub feedback: Option<Feedback>,
    pub map: MapView,
    pub solved_points: u64,
    pub total_points: u64,
}

impl PageView {
    pub fn active_items(&self) -> impl Iterator<Item = &SidebarItem> {
        self.sidebar.iter().filter(|item| item.active)
    }
}
