use std::sync::Arc;

use tracing::{debug, info, warn};
use uuid::Uuid;

use super::locks::ResolutionLocks;
use super::mapping;
use crate::database::ports::{CatalogRepository, LoadedSeason};
use crate::domain::{
    CatalogKey, Movie, NewEpisode, TvShow, TvShowEpisode, TvShowSeason,
};
use crate::error::CatalogError;
use crate::providers::{MetadataProvider, ProviderError};

#[derive(Debug, thiserror::Error)]
pub enum ResolveError {
    #[error(transparent)]
    Provider(#[from] ProviderError),

    #[error(transparent)]
    Catalog(#[from] CatalogError),
}

/// Show, season and episode for one episode-level resolution.
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedEpisode {
    pub show: TvShow,
    pub season: TvShowSeason,
    pub episode: TvShowEpisode,
    /// True when the provider had no such episode and a stub was created.
    pub stub_created: bool,
}

/// Maps TMDB identifiers to local catalog rows, creating anything missing.
#[derive(Clone)]
pub struct CatalogResolver {
    catalog: Arc<dyn CatalogRepository>,
    provider: Arc<dyn MetadataProvider>,
    locks: ResolutionLocks,
}

impl std::fmt::Debug for CatalogResolver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CatalogResolver")
            .field("locks", &self.locks.len())
            .finish_non_exhaustive()
    }
}

impl CatalogResolver {
    pub fn new(
        catalog: Arc<dyn CatalogRepository>,
        provider: Arc<dyn MetadataProvider>,
    ) -> Self {
        Self {
            catalog,
            provider,
            locks: ResolutionLocks::new(),
        }
    }

    pub async fn resolve_movie(
        &self,
        user_id: Uuid,
        external_id: i64,
    ) -> Result<Movie, ResolveError> {
        if let Some(movie) = self.catalog.find_movie(user_id, external_id).await? {
            return Ok(movie);
        }

        let _guard = self
            .locks
            .acquire(CatalogKey::Movie {
                user_id,
                external_id,
            })
            .await;
        if let Some(movie) = self.catalog.find_movie(user_id, external_id).await? {
            return Ok(movie);
        }

        let details = self.provider.get_movie(external_id).await?;
        let movie = self
            .catalog
            .insert_movie_if_absent(mapping::map_movie(user_id, &details))
            .await?;
        info!(
            movie_id = %movie.id,
            external_id,
            title = %movie.title,
            "Created movie from TMDB"
        );
        Ok(movie)
    }

    pub async fn resolve_tv_show(
        &self,
        user_id: Uuid,
        external_id: i64,
    ) -> Result<TvShow, ResolveError> {
        if let Some(show) = self.catalog.find_tv_show(user_id, external_id).await? {
            return Ok(show);
        }

        let _guard = self
            .locks
            .acquire(CatalogKey::TvShow {
                user_id,
                external_id,
            })
            .await;
        if let Some(show) = self.catalog.find_tv_show(user_id, external_id).await? {
            return Ok(show);
        }

        let details = self.provider.get_tv_show(external_id).await?;
        let show = self
            .catalog
            .insert_tv_show_if_absent(mapping::map_show(user_id, &details))
            .await?;
        info!(
            tv_show_id = %show.id,
            external_id,
            title = %show.title,
            "Created tv show from TMDB"
        );
        Ok(show)
    }

    /// Resolve show, then season, then episode, creating each level on demand.
    ///
    /// A season cached before the episode aired is re-fetched once. When the
    /// provider still has no such episode a stub holding only its number is
    /// stored so the watch can be recorded anyway.
    pub async fn resolve_episode(
        &self,
        user_id: Uuid,
        show_external_id: i64,
        season_number: i32,
        episode_number: i32,
    ) -> Result<ResolvedEpisode, ResolveError> {
        let show = self.resolve_tv_show(user_id, show_external_id).await?;
        let (loaded, created) = self.resolve_season(&show, season_number).await?;

        if let Some(episode) = loaded.find_episode(episode_number) {
            return Ok(ResolvedEpisode {
                show,
                season: loaded.season.clone(),
                episode: episode.clone(),
                stub_created: false,
            });
        }

        let LoadedSeason { season, .. } = loaded;
        let _guard = self
            .locks
            .acquire(CatalogKey::Episode {
                season_id: season.id,
                episode_number,
            })
            .await;

        let mut episodes = self.catalog.list_episodes(season.id).await?;
        if !created && !contains(&episodes, episode_number) {
            debug!(
                season_id = %season.id,
                episode_number,
                "Episode missing from cached season, re-fetching"
            );
            let details = self
                .provider
                .get_tv_season(show.external_id, season_number)
                .await?;
            let missing: Vec<NewEpisode> = mapping::map_episodes(&details)
                .into_iter()
                .filter(|episode| !contains(&episodes, episode.episode_number))
                .collect();
            if !missing.is_empty() {
                info!(
                    season_id = %season.id,
                    added = missing.len(),
                    "Adding newly aired episodes"
                );
                episodes = self
                    .catalog
                    .insert_episodes_if_absent(season.id, missing)
                    .await?;
            }
        }

        if let Some(episode) = find(&episodes, episode_number) {
            return Ok(ResolvedEpisode {
                show,
                season,
                episode: episode.clone(),
                stub_created: false,
            });
        }

        warn!(
            tv_show_id = %show.id,
            season_number,
            episode_number,
            "Episode not found on TMDB, storing stub"
        );
        let episodes = self
            .catalog
            .insert_episodes_if_absent(
                season.id,
                vec![NewEpisode::stub(episode_number)],
            )
            .await?;
        let episode = find(&episodes, episode_number).cloned().ok_or_else(|| {
            CatalogError::Internal(format!(
                "stub episode {episode_number} missing after insert"
            ))
        })?;

        Ok(ResolvedEpisode {
            show,
            season,
            episode,
            stub_created: true,
        })
    }

    /// Returns the season with its stored episodes and whether this call
    /// created it from a fresh provider payload.
    async fn resolve_season(
        &self,
        show: &TvShow,
        season_number: i32,
    ) -> Result<(LoadedSeason, bool), ResolveError> {
        if let Some(loaded) = self.load_season(show.id, season_number).await? {
            return Ok((loaded, false));
        }

        let _guard = self
            .locks
            .acquire(CatalogKey::Season {
                tv_show_id: show.id,
                season_number,
            })
            .await;
        if let Some(loaded) = self.load_season(show.id, season_number).await? {
            return Ok((loaded, false));
        }

        let details = self
            .provider
            .get_tv_season(show.external_id, season_number)
            .await?;
        let loaded = self
            .catalog
            .insert_season_with_episodes(
                mapping::map_season(show.id, &details),
                mapping::map_episodes(&details),
            )
            .await?;
        info!(
            season_id = %loaded.season.id,
            tv_show_id = %show.id,
            season_number,
            episodes = loaded.episodes.len(),
            "Created season from TMDB"
        );
        Ok((loaded, true))
    }

    async fn load_season(
        &self,
        tv_show_id: Uuid,
        season_number: i32,
    ) -> Result<Option<LoadedSeason>, ResolveError> {
        let Some(season) =
            self.catalog.find_season(tv_show_id, season_number).await?
        else {
            return Ok(None);
        };
        let episodes = self.catalog.list_episodes(season.id).await?;
        Ok(Some(LoadedSeason { season, episodes }))
    }
}

fn find(episodes: &[TvShowEpisode], episode_number: i32) -> Option<&TvShowEpisode> {
    episodes
        .iter()
        .find(|episode| episode.episode_number == episode_number)
}

fn contains(episodes: &[TvShowEpisode], episode_number: i32) -> bool {
    find(episodes, episode_number).is_some()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::InMemoryBackend;
    use crate::providers::{
        Credits, CrewMember, EpisodeDetails, MovieDetails, SeasonDetails,
        TvShowDetails,
    };
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[derive(Default)]
    struct FixedProvider {
        movie_calls: AtomicUsize,
        season_calls: AtomicUsize,
        season_episodes: Vec<i32>,
    }

    #[async_trait]
    impl MetadataProvider for FixedProvider {
        async fn get_movie(&self, id: i64) -> Result<MovieDetails, ProviderError> {
            self.movie_calls.fetch_add(1, Ordering::SeqCst);
            if id == 404 {
                return Err(ProviderError::NotFound {
                    resource: format!("movie {id}"),
                });
            }
            Ok(MovieDetails {
                id,
                title: "The Matrix".into(),
                release_date: Some("1999-03-30".into()),
                credits: Some(Credits {
                    cast: vec![],
                    crew: vec![CrewMember {
                        name: Some("Lana Wachowski".into()),
                        job: Some("Director".into()),
                        department: None,
                    }],
                }),
                ..Default::default()
            })
        }

        async fn get_tv_show(&self, id: i64) -> Result<TvShowDetails, ProviderError> {
            Ok(TvShowDetails {
                id,
                name: "Severance".into(),
                ..Default::default()
            })
        }

        async fn get_tv_season(
            &self,
            _id: i64,
            season_number: i32,
        ) -> Result<SeasonDetails, ProviderError> {
            self.season_calls.fetch_add(1, Ordering::SeqCst);
            Ok(SeasonDetails {
                season_number,
                episodes: self
                    .season_episodes
                    .iter()
                    .map(|&n| EpisodeDetails {
                        episode_number: n,
                        name: Some(format!("Episode {n}")),
                        ..Default::default()
                    })
                    .collect(),
                ..Default::default()
            })
        }
    }

    fn resolver(
        backend: &InMemoryBackend,
        provider: Arc<FixedProvider>,
    ) -> CatalogResolver {
        CatalogResolver::new(backend.catalog.clone(), provider)
    }

    #[tokio::test]
    async fn movie_is_fetched_once_then_served_locally() {
        let backend = InMemoryBackend::new();
        let provider = Arc::new(FixedProvider::default());
        let resolver = resolver(&backend, provider.clone());
        let user = Uuid::new_v4();

        let first = resolver.resolve_movie(user, 603).await.unwrap();
        let second = resolver.resolve_movie(user, 603).await.unwrap();

        assert_eq!(first.id, second.id);
        assert_eq!(first.release_year, Some(1999));
        assert_eq!(first.director.as_deref(), Some("Lana Wachowski"));
        assert_eq!(provider.movie_calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn provider_not_found_propagates() {
        let backend = InMemoryBackend::new();
        let resolver = resolver(&backend, Arc::new(FixedProvider::default()));

        let err = resolver.resolve_movie(Uuid::new_v4(), 404).await.unwrap_err();
        assert!(matches!(err, ResolveError::Provider(ref e) if e.is_not_found()));
        assert_eq!(backend.catalog.movie_count().await, 0);
    }

    #[tokio::test]
    async fn new_season_missing_episode_gets_stub_without_refetch() {
        let backend = InMemoryBackend::new();
        let provider = Arc::new(FixedProvider {
            season_episodes: vec![1, 2],
            ..Default::default()
        });
        let resolver = resolver(&backend, provider.clone());

        let resolved = resolver
            .resolve_episode(Uuid::new_v4(), 95396, 1, 9)
            .await
            .unwrap();

        assert!(resolved.stub_created);
        assert!(resolved.episode.is_stub());
        assert_eq!(provider.season_calls.load(Ordering::SeqCst), 1);
        assert_eq!(backend.catalog.episode_count().await, 3);
    }
}
