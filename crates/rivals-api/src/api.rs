//! Typed façade over the stats and tracking-service endpoints

use rivals_cache::{MemoryCache, MemoryCacheConfig, ResponseCache};
use std::sync::Arc;
use tracing::debug;

use crate::bucket::QuotaSnapshot;
use crate::config::ApiConfig;
use crate::dto::{
    Autocomplete, FormattedPatch, FoundPlayer, HeroDetail, HeroLeaderboard, HeroSummary, Maps,
    MatchHistory, PatchNotes, PlayerDto, TrackerCareer, TrackerHeroes, TrackerProfile,
};
use crate::endpoint::{Domain, Endpoint};
use crate::error::{ApiError, Result};
use crate::pipeline::Pipeline;
use crate::tracker::{GameMode, career_to_player, tracker_heroes_to_summaries};

/// Query options for a match history page
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MatchHistoryOptions {
    /// Falls back to the configured default season
    pub season: Option<String>,
    pub page: Option<u32>,
    pub limit: Option<u32>,
    pub game_mode: Option<u32>,
}

fn is_numeric_id(value: &str) -> bool {
    !value.is_empty() && value.bytes().all(|b| b.is_ascii_digit())
}

/// Client for the stats API.
///
/// Every method returns `Ok(None)` when the upstream reports the resource
/// does not exist and `Err` for everything that could not be recovered by
/// retrying.
pub struct Api {
    config: ApiConfig,
    pipeline: Pipeline,
}

impl Api {
    /// Client with an in-process cache
    pub fn new(config: ApiConfig) -> Result<Self> {
        let cache = MemoryCache::new(MemoryCacheConfig::default())
            .map_err(|e| ApiError::Config(e.to_string()))?;
        Self::with_cache(config, Arc::new(cache))
    }

    /// Client backed by any [`ResponseCache`]
    pub fn with_cache(config: ApiConfig, cache: Arc<dyn ResponseCache>) -> Result<Self> {
        let pipeline = Pipeline::new(&config, cache)?;
        Ok(Self { config, pipeline })
    }

    pub fn config(&self) -> &ApiConfig {
        &self.config
    }

    pub fn cache(&self) -> &Arc<dyn ResponseCache> {
        self.pipeline.cache()
    }

    /// Last known quota per route
    pub fn routes(&self) -> Vec<(String, QuotaSnapshot)> {
        self.pipeline.routes()
    }

    /// Absolute URL for an image path returned by the API.
    pub fn build_image(&self, path: &str) -> String {
        format!("{}{path}", self.config.image_cdn_url)
    }

    fn season<'a>(&'a self, season: Option<&'a str>) -> &'a str {
        season.unwrap_or(&self.config.default_season)
    }

    // Players

    pub async fn search_player(&self, name: &str) -> Result<Option<FoundPlayer>> {
        let endpoint = Endpoint::new(Domain::V1, "find-player/:name")
            .param(name)
            .cached(self.config.cache_ttls.player);
        self.pipeline.fetch(&endpoint).await
    }

    pub async fn fetch_player(&self, uid: &str, season: Option<&str>) -> Result<Option<PlayerDto>> {
        let endpoint = Endpoint::new(Domain::V1, "player/:id")
            .param(uid)
            .query("season", Some(self.season(season)))
            .cached(self.config.cache_ttls.player);
        self.pipeline.fetch(&endpoint).await
    }

    /// Look a player up by numeric id, or by name through a search first.
    pub async fn get_player(&self, name_or_id: &str, season: Option<&str>) -> Result<Option<PlayerDto>> {
        if is_numeric_id(name_or_id) {
            return self.fetch_player(name_or_id, season).await;
        }

        let Some(found) = self.search_player(name_or_id).await? else {
            debug!(name = name_or_id, "No player matches name");
            return Ok(None);
        };
        self.fetch_player(&found.uid.to_string(), season).await
    }

    /// Never cached: pages change with every match played.
    pub async fn get_match_history(
        &self,
        name_or_id: &str,
        options: &MatchHistoryOptions,
    ) -> Result<Option<MatchHistory>> {
        let endpoint = Endpoint::new(Domain::V2, "player/:id/match-history")
            .param(name_or_id)
            .query("season", Some(self.season(options.season.as_deref())))
            .query("page", options.page.map(|p| p.to_string()))
            .query("limit", options.limit.map(|l| l.to_string()))
            .query("game_mode", options.game_mode.map(|m| m.to_string()));
        self.pipeline.fetch(&endpoint).await
    }

    // Heroes

    pub async fn get_heroes(&self) -> Result<Option<Vec<HeroSummary>>> {
        let endpoint = Endpoint::new(Domain::V1, "heroes").cached(self.config.cache_ttls.heroes);
        self.pipeline.fetch(&endpoint).await
    }

    pub async fn get_hero(&self, name_or_id: &str) -> Result<Option<HeroDetail>> {
        let endpoint = Endpoint::new(Domain::V1, "heroes/hero/:id").param(name_or_id);
        self.pipeline.fetch(&endpoint).await
    }

    pub async fn get_hero_leaderboard(
        &self,
        hero_id: &str,
        platform: Option<&str>,
    ) -> Result<Option<HeroLeaderboard>> {
        let endpoint = Endpoint::new(Domain::V1, "heroes/leaderboard/:id")
            .param(hero_id)
            .query("platform", platform)
            .cached(self.config.cache_ttls.leaderboard);
        self.pipeline.fetch(&endpoint).await
    }

    // Game

    pub async fn get_patch_notes(&self) -> Result<Option<PatchNotes>> {
        let endpoint =
            Endpoint::new(Domain::V1, "patch-notes").cached(self.config.cache_ttls.patch_notes);
        self.pipeline.fetch(&endpoint).await
    }

    pub async fn get_patch_note(&self, id: &str) -> Result<Option<FormattedPatch>> {
        let endpoint = Endpoint::new(Domain::V1, "patch-note/:id").param(id);
        self.pipeline.fetch(&endpoint).await
    }

    pub async fn get_maps(&self, page: Option<u32>, limit: Option<u32>) -> Result<Option<Maps>> {
        let endpoint = Endpoint::new(Domain::V1, "maps")
            .query("page", page.map(|p| p.to_string()))
            .query("limit", limit.map(|l| l.to_string()))
            .cached(self.config.cache_ttls.maps);
        self.pipeline.fetch(&endpoint).await
    }

    // Tracking service

    pub async fn autocomplete_player_names(&self, query: &str) -> Result<Option<Autocomplete>> {
        let endpoint = Endpoint::new(Domain::Tracker, "search")
            .query("platform", Some("ugc"))
            .query("query", Some(query))
            .cached(self.config.cache_ttls.autocomplete);
        self.pipeline.fetch(&endpoint).await
    }

    pub async fn get_tracker_profile(&self, name: &str) -> Result<Option<TrackerProfile>> {
        let endpoint = Endpoint::new(Domain::Tracker, "profile/ign/:name")
            .param(name)
            .cached(self.config.cache_ttls.player);
        self.pipeline.fetch(&endpoint).await
    }

    pub async fn get_tracker_career(
        &self,
        name: &str,
        mode: GameMode,
        season: Option<&str>,
    ) -> Result<Option<TrackerCareer>> {
        let endpoint = Endpoint::new(Domain::Tracker, "profile/ign/:name/segments/career")
            .param(name)
            .query("mode", Some(mode.tracker_mode()))
            .query("season", Some(self.season(season)))
            .cached(self.config.cache_ttls.player);
        self.pipeline.fetch(&endpoint).await
    }

    /// Profile and career fetched concurrently and merged into a [`PlayerDto`].
    pub async fn get_player_career_data(
        &self,
        name_or_id: &str,
        mode: GameMode,
        season: Option<&str>,
    ) -> Result<Option<PlayerDto>> {
        let (profile, career) = tokio::try_join!(
            self.get_tracker_profile(name_or_id),
            self.get_tracker_career(name_or_id, mode, season),
        )?;
        let (Some(profile), Some(career)) = (profile, career) else {
            return Ok(None);
        };

        let uid = [name_or_id, profile.data.platform_info.platform_user_identifier.as_str()]
            .into_iter()
            .find(|candidate| is_numeric_id(candidate))
            .and_then(|id| id.parse().ok())
            .unwrap_or(0);

        career_to_player(&career, &profile, uid).map(Some)
    }

    pub async fn get_tracker_heroes(&self) -> Result<Option<Vec<HeroSummary>>> {
        let endpoint = Endpoint::new(Domain::TrackerMetadata, "metadata/type/hero")
            .cached(self.config.cache_ttls.heroes);
        let heroes: Option<TrackerHeroes> = self.pipeline.fetch(&endpoint).await?;
        Ok(heroes.as_ref().map(tracker_heroes_to_summaries))
    }
}

#[cfg(test)]
#[allow(clippy::expect_used)]
mod tests {
    use super::*;

    #[test]
    fn test_numeric_id_detection() {
        assert!(is_numeric_id("12345"));
        assert!(!is_numeric_id("Iron-Fist"));
        assert!(!is_numeric_id("123abc"));
        assert!(!is_numeric_id(""));
        assert!(!is_numeric_id("-1"));
    }

    #[test]
    fn test_construction_rejects_empty_key_pool() {
        assert!(matches!(Api::new(ApiConfig::default()), Err(ApiError::Config(_))));
    }

    #[test]
    fn test_build_image() {
        let api = Api::new(ApiConfig::with_keys(["k"])).expect("Operation should succeed");
        assert_eq!(
            api.build_image("/heroes/hulk.png"),
            "https://marvelrivalsapi.com/rivals/heroes/hulk.png"
        );
    }
}
