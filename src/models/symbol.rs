use std::fmt;

use serde::{Deserialize, Serialize};

/// The emoji a note is tagged with.
///
/// The vocabulary is fixed; anything outside it is rejected when deserializing.
/// On the wire a symbol is the emoji itself.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(try_from = "String", into = "&'static str")]
pub enum Symbol {
    #[default]
    Excited,
    Angry,
    Embarrassed,
    Pain,
    Goal,
    Obstacle,
    Workaround,
    Context,
    FeatureRequest,
    Budget,
    Person,
    FollowUp,
}

impl Symbol {
    pub const ALL: [Symbol; 12] = [
        Self::Excited,
        Self::Angry,
        Self::Embarrassed,
        Self::Pain,
        Self::Goal,
        Self::Obstacle,
        Self::Workaround,
        Self::Context,
        Self::FeatureRequest,
        Self::Budget,
        Self::Person,
        Self::FollowUp,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Excited => "\u{1F642}",
            Self::Angry => "\u{1F641}",
            Self::Embarrassed => "\u{1F633}",
            Self::Pain => "\u{26A1}",
            Self::Goal => "\u{1F945}",
            Self::Obstacle => "\u{1F7E5}",
            Self::Workaround => "\u{21AA}\u{FE0F}",
            Self::Context => "\u{1F3D4}",
            Self::FeatureRequest => "\u{2611}\u{FE0F}",
            Self::Budget => "\u{1F4B2}",
            Self::Person => "\u{2640}\u{FE0F}",
            Self::FollowUp => "\u{2B50}",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|symbol| symbol.as_str() == s)
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::Excited => "Excited",
            Self::Angry => "Angry",
            Self::Embarrassed => "Embarrassed",
            Self::Pain => "Pain/Problem",
            Self::Goal => "Goal",
            Self::Obstacle => "Obstacle",
            Self::Workaround => "Workaround",
            Self::Context => "Context",
            Self::FeatureRequest => "Feature Request",
            Self::Budget => "Budget",
            Self::Person => "Person/Company",
            Self::FollowUp => "Follow-up",
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            Self::Excited => "User shows enthusiasm",
            Self::Angry => "User expresses frustration",
            Self::Embarrassed => "User feels awkward or uncomfortable",
            Self::Pain => "User pain point or problem",
            Self::Goal => "User goal or job-to-be-done",
            Self::Obstacle => "Barrier preventing progress",
            Self::Workaround => "User's creative solution",
            Self::Context => "Background information",
            Self::FeatureRequest => "Requested functionality",
            Self::Budget => "Budget or purchasing discussion",
            Self::Person => "Specific person or company",
            Self::FollowUp => "Action item or follow-up task",
        }
    }
}

impl fmt::Display for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<Symbol> for &'static str {
    fn from(symbol: Symbol) -> Self {
        symbol.as_str()
    }
}

impl TryFrom<String> for Symbol {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Symbol::from_str(&value).ok_or_else(|| format!("unknown symbol: {value}"))
    }
}

/// A vocabulary entry as served to clients.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SymbolInfo {
    pub emoji: Symbol,
    pub label: String,
    pub description: String,
}

impl From<Symbol> for SymbolInfo {
    fn from(symbol: Symbol) -> Self {
        Self {
            emoji: symbol,
            label: symbol.label().to_string(),
            description: symbol.description().to_string(),
        }
    }
}
