//! Conversion of tracking-service payloads into the stats API's DTOs

use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use crate::dto::tracker::{CareerSegment, TrackerCareer, TrackerHeroes, TrackerProfile};
use crate::dto::{
    HeroStats, HeroSummary, MainAttack, ModeStats, OverallStats, PlayerDto, PlayerIcon,
    PlayerInfo, PlayerRank, PlayerTeam, PlayerUpdates, RankSeason, Role, SeasonInfo,
};
use crate::error::{ApiError, Result};

/// Game mode filter for career stats
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GameMode {
    Ranked,
    Casual,
    #[default]
    Both,
}

impl GameMode {
    /// Mode name understood by the tracking service
    pub const fn tracker_mode(self) -> &'static str {
        match self {
            Self::Ranked => "competitive",
            Self::Casual => "quick-match",
            Self::Both => "all",
        }
    }
}

impl fmt::Display for GameMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Ranked => "ranked",
            Self::Casual => "casual",
            Self::Both => "both",
        })
    }
}

impl FromStr for GameMode {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "ranked" | "competitive" => Ok(Self::Ranked),
            "casual" | "quick-match" => Ok(Self::Casual),
            "both" | "all" => Ok(Self::Both),
            other => Err(format!("unknown game mode: {other}")),
        }
    }
}

/// Checked in order, the first tier contained in the name wins.
const RANK_TIERS: [(&str, u32); 9] = [
    ("bronze", 0),
    ("silver", 1),
    ("gold", 2),
    ("platinum", 3),
    ("diamond", 4),
    ("grandmaster", 6),
    ("eternity", 7),
    ("celestial", 8),
    ("one above all", 9),
];

/// `"Grandmaster III"` is level 6. Unranked and unknown tiers are 0.
pub fn rank_level(tier_name: &str) -> u32 {
    let lower = tier_name.to_lowercase();
    RANK_TIERS
        .iter()
        .find(|(tier, _)| lower.contains(tier))
        .map_or(0, |(_, level)| *level)
}

/// Numeric icon id from an avatar URL ending in `/<digits>.jpg`.
pub fn icon_id(avatar_url: &str) -> String {
    avatar_url
        .match_indices(".jpg")
        .find_map(|(end, _)| {
            let head = &avatar_url[..end];
            let start = head.rfind('/')? + 1;
            let digits = &head[start..];
            (!digits.is_empty() && digits.bytes().all(|b| b.is_ascii_digit()))
                .then(|| digits.to_string())
        })
        .unwrap_or_else(|| "0".to_string())
}

fn count(value: f64) -> u64 {
    if value.is_finite() && value > 0.0 {
        value.round() as u64
    } else {
        0
    }
}

fn hero_stats(segment: &CareerSegment) -> HeroStats {
    HeroStats {
        hero_id: segment.attributes.hero_id.unwrap_or(0),
        hero_name: segment
            .metadata
            .name
            .clone()
            .unwrap_or_else(|| "Unknown".to_string()),
        hero_thumbnail: segment.metadata.image_url.clone().unwrap_or_default(),
        matches: count(segment.stat("matchesPlayed")),
        wins: count(segment.stat("matchesWon")),
        mvp: count(segment.stat("totalMvp")),
        svp: count(segment.stat("totalSvp")),
        kills: count(segment.stat("kills")),
        deaths: count(segment.stat("deaths")),
        assists: count(segment.stat("assists")),
        play_time: segment.stat("timePlayed").round(),
        damage: segment.stat("totalHeroDamage").round(),
        heal: segment.stat("totalHeroHeal").round(),
        damage_taken: segment.stat("totalDamageTaken").round(),
        main_attack: MainAttack {
            total: count(segment.stat("mainAttacks")),
            hits: count(segment.stat("mainAttackHits")),
        },
    }
}

/// Build a [`PlayerDto`] from a tracker profile and career.
///
/// Fails with [`ApiError::Transform`] when the career has no overview segment
/// or the profile timestamp is not RFC 3339.
pub fn career_to_player(career: &TrackerCareer, profile: &TrackerProfile, uid: u64) -> Result<PlayerDto> {
    let platform = &profile.data.platform_info;
    let metadata = &profile.data.metadata;

    let overview = career
        .segments("overview")
        .next()
        .ok_or_else(|| ApiError::Transform("Overview data not found in Career response".to_string()))?;

    let updated: DateTime<Utc> = DateTime::parse_from_rfc3339(&metadata.last_updated.value)
        .map_err(|e| {
            ApiError::Transform(format!(
                "invalid lastUpdated timestamp {:?}: {e}",
                metadata.last_updated.value
            ))
        })?
        .with_timezone(&Utc);

    let ranked_stat = overview.stats.get("ranked");
    let rank_tier = ranked_stat
        .and_then(|s| s.metadata.tier_name.clone())
        .filter(|t| !t.is_empty())
        .unwrap_or_else(|| "Unranked".to_string());
    let rank_score = ranked_stat.map_or(0.0, |s| s.number());

    let peak = overview.stats.get("lifetimePeakRanked");
    let max_level = peak
        .and_then(|p| p.metadata.tier_name.as_deref())
        .map_or_else(|| rank_level(&rank_tier), rank_level);
    let max_rank_score = peak
        .map(|p| p.number())
        .filter(|score| *score != 0.0)
        .unwrap_or(rank_score);

    let total_matches = count(overview.stat("matchesPlayed"));
    let total_wins = count(overview.stat("matchesWon"));

    let heroes_ranked = career
        .segments("hero")
        .map(hero_stats)
        .filter(|h| h.matches > 0)
        .collect();

    let mut rank_game_season = BTreeMap::new();
    rank_game_season.insert(
        "1".to_string(),
        RankSeason {
            rank_game_id: 1,
            level: rank_level(&rank_tier),
            rank_score,
            max_level,
            max_rank_score,
            update_time: updated.timestamp_millis(),
            win_count: total_wins,
            protect_score: 0.0,
            diff_score: 0.0,
        },
    );

    let name = platform.platform_user_handle.clone();
    Ok(PlayerDto {
        uid,
        name: name.clone(),
        is_private: metadata.is_private_career_overview || metadata.is_private_career_statistics,
        player: PlayerInfo {
            uid,
            level: metadata.level.to_string(),
            name,
            icon: PlayerIcon {
                player_icon_id: icon_id(&platform.avatar_url),
                player_icon: platform.avatar_url.clone(),
                banner: None,
            },
            rank: PlayerRank {
                rank: rank_tier,
                image: ranked_stat.and_then(|s| s.metadata.icon_url.clone()),
                color: ranked_stat.and_then(|s| s.metadata.color.clone()),
            },
            team: PlayerTeam {
                club_team_mini_name: metadata.club_mini_name.clone().unwrap_or_default(),
                ..PlayerTeam::default()
            },
            info: SeasonInfo {
                completed_achievements: String::new(),
                login_os: if metadata.is_pc { "pc" } else { "console" }.to_string(),
                rank_game_season,
            },
        },
        overall_stats: OverallStats {
            total_matches,
            total_wins,
            unranked: ModeStats {
                total_time_played: Some("0h 0m".to_string()),
                ..ModeStats::default()
            },
            ranked: ModeStats {
                total_matches,
                total_wins,
                total_assists: count(overview.stat("assists")),
                total_deaths: count(overview.stat("deaths")),
                total_kills: count(overview.stat("kills")),
                total_time_played: overview
                    .stats
                    .get("timePlayed")
                    .and_then(|s| s.display_value.clone()),
                total_time_played_raw: overview.stat("timePlayed"),
                total_mvp: count(overview.stat("totalMvp")),
                total_svp: count(overview.stat("totalSvp")),
            },
        },
        heroes_ranked,
        heroes_unranked: Vec::new(),
        updates: PlayerUpdates {
            info_update_time: Some(updated.to_rfc3339_opts(SecondsFormat::Millis, true)),
            ..PlayerUpdates::default()
        },
        match_history: Vec::new(),
        rank_history: Vec::new(),
        hero_matchups: Vec::new(),
        team_mates: Vec::new(),
        maps: Vec::new(),
    })
}

/// Convert tracker hero metadata into hero list entries.
pub fn tracker_heroes_to_summaries(heroes: &TrackerHeroes) -> Vec<HeroSummary> {
    heroes
        .data
        .items
        .iter()
        .map(|hero| HeroSummary {
            id: hero.key.clone(),
            name: hero.name.clone(),
            real_name: String::new(),
            image_url: hero.image_url.clone(),
            role: Role::from_name(&hero.role_name),
            attack_type: "Projectile".to_string(),
            team: Vec::new(),
            difficulty: String::new(),
            bio: hero.description.clone(),
            lore: String::new(),
            transformations: Vec::new(),
            costumes: Vec::new(),
            abilities: Vec::new(),
        })
        .collect()
}
