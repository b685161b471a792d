//! Upstream payload types
//!
//! Each DTO pairs a serde type with the [`Shape`](crate::validation::Shape)
//! its JSON must have. Field names follow the upstream wire format.

pub mod hero;
pub mod leaderboard;
pub mod maps;
pub mod match_history;
pub mod patch_notes;
pub mod player;
pub mod tracker;

pub use hero::{Ability, HeroDetail, HeroSummary, Role};
pub use leaderboard::{HeroLeaderboard, LeaderboardEntry, LeaderboardPlayerInfo};
pub use maps::{GameMap, Maps};
pub use match_history::{MatchHistory, MatchSummary, Pagination};
pub use patch_notes::{FormattedPatch, PatchNotes};
pub use player::{
    FoundPlayer, HeroStats, MainAttack, ModeStats, OverallStats, PlayerDto, PlayerIcon,
    PlayerInfo, PlayerRank, PlayerTeam, PlayerUpdates, RankSeason, SeasonInfo,
};
pub use tracker::{
    Autocomplete, AutocompleteUser, CareerSegment, Stat, TrackerCareer, TrackerHeroes,
    TrackerProfile,
};
