//! Intent composition
//!
//! Turns a [`Classification`] into the final [`RoutingResult`]. Composition
//! is deterministic apart from `sort_by` and `page`, which come from the
//! injected [`RandomSource`].

use std::sync::Arc;

use crate::extractors::Classification;
use crate::movie::MovieIntent;
use crate::music::{MusicAnalysis, MusicIntent};
use crate::random::RandomSource;
use crate::routing::{
    DiscoverPayload, FallbackPayload, FallbackReason, MusicPayload, Payload, Route, RoutingResult,
    Signal, SimilarTitlePayload, SituationalPayload, SortOrder,
};
use crate::rules::RuleBook;

#[derive(Clone)]
pub struct IntentComposer {
    rules: Arc<RuleBook>,
    random: Arc<dyn RandomSource>,
}

impl IntentComposer {
    pub fn new(rules: Arc<RuleBook>, random: Arc<dyn RandomSource>) -> Self {
        Self { rules, random }
    }

    /// Build the movie result for a classification from either path
    pub fn compose_movie(&self, classification: Classification) -> RoutingResult<MovieIntent> {
        match classification {
            Classification::SimilarTitle(seed_title) => RoutingResult {
                intent: MovieIntent::SimilarByTitle,
                route: Route::RecommendationBackend,
                payload: Payload::SimilarTitle(SimilarTitlePayload { seed_title }),
            },
            Classification::Situational => RoutingResult {
                intent: MovieIntent::RechargeImmersiveContinue,
                route: Route::RecommendationBackend,
                payload: Payload::Situational(SituationalPayload {
                    fast_start: true,
                    mobile_friendly: true,
                    low_cognitive_load: true,
                    likely_to_continue: true,
                    min_vote: self.rules.composition().min_vote,
                    // crowd-tested picks, not variety
                    sort_by: SortOrder::PopularityDesc,
                    page: self.random_page(),
                }),
            },
            Classification::Weather(key) => {
                let prefer_genres = self.rules.weather_genres(&key);
                self.discover(MovieIntent::Weather, Signal::Weather(key), prefer_genres)
            }
            Classification::Mood(key) => {
                let prefer_genres = self.rules.mood_genres(&key);
                self.discover(MovieIntent::Mood, Signal::Mood(key), prefer_genres)
            }
        }
    }

    /// Build the music result for an analysis the model marked as related
    pub fn compose_music(&self, analysis: &MusicAnalysis) -> RoutingResult<MusicIntent> {
        let resolved = analysis.resolve(self.rules.music());
        RoutingResult {
            intent: resolved.intent_type.into(),
            route: Route::RecommendationBackend,
            payload: Payload::Music(MusicPayload {
                is_music_related: true,
                intent_type: resolved.intent_type,
                artist: resolved.artist,
                seed_track: resolved.seed_track,
                context: resolved.context,
                mood: resolved.mood,
                weather: resolved.weather,
            }),
        }
    }

    /// Terminal result: hand the untouched request to the language model
    pub fn fallback<I>(&self, intent: I, user_text: &str, reason: FallbackReason) -> RoutingResult<I> {
        RoutingResult {
            intent,
            route: Route::LanguageModelDirect,
            payload: Payload::Fallback(FallbackPayload {
                user_text: user_text.to_string(),
                reason,
            }),
        }
    }

    fn discover(
        &self,
        intent: MovieIntent,
        signal: Signal,
        prefer_genres: Vec<String>,
    ) -> RoutingResult<MovieIntent> {
        RoutingResult {
            intent,
            route: Route::RecommendationBackend,
            payload: Payload::Discover(DiscoverPayload {
                signal,
                prefer_genres,
                min_vote: self.rules.composition().min_vote,
                sort_by: self.random_sort(),
                page: self.random_page(),
            }),
        }
    }

    fn random_sort(&self) -> SortOrder {
        SortOrder::POOL[self.random.index(SortOrder::POOL.len())]
    }

    fn random_page(&self) -> u32 {
        self.random.between(1, self.rules.composition().max_page)
    }
}

impl std::fmt::Debug for IntentComposer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("IntentComposer")
            .field("rules", &self.rules.version())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::random::SeededRandom;

    /// Always returns the same index and page
    struct FixedRandom {
        index: usize,
        page: u32,
    }

    impl RandomSource for FixedRandom {
        fn index(&self, _len: usize) -> usize {
            self.index
        }

        fn between(&self, _low: u32, _high: u32) -> u32 {
            self.page
        }
    }

    fn composer(random: Arc<dyn RandomSource>) -> IntentComposer {
        IntentComposer::new(Arc::new(RuleBook::builtin().unwrap()), random)
    }

    #[test]
    fn test_similar_title() {
        let result = composer(Arc::new(SeededRandom::new(1)))
            .compose_movie(Classification::SimilarTitle("인셉션".into()));
        assert_eq!(result.intent, MovieIntent::SimilarByTitle);
        assert_eq!(result.route, Route::RecommendationBackend);
        assert_eq!(
            result.payload,
            Payload::SimilarTitle(SimilarTitlePayload {
                seed_title: "인셉션".into()
            })
        );
    }

    #[test]
    fn test_weather_uses_random_knobs() {
        let result = composer(Arc::new(FixedRandom { index: 1, page: 4 }))
            .compose_movie(Classification::Weather("rain".into()));
        assert_eq!(result.intent, MovieIntent::Weather);
        assert_eq!(
            result.payload,
            Payload::Discover(DiscoverPayload {
                signal: Signal::Weather("rain".into()),
                prefer_genres: vec!["18".into(), "10749".into()],
                min_vote: 6.0,
                sort_by: SortOrder::VoteAverageDesc,
                page: 4,
            })
        );
    }

    #[test]
    fn test_situational_pins_sort_order() {
        let result = composer(Arc::new(FixedRandom { index: 2, page: 2 }))
            .compose_movie(Classification::Situational);
        assert_eq!(result.intent, MovieIntent::RechargeImmersiveContinue);
        match result.payload {
            Payload::Situational(p) => {
                assert_eq!(p.sort_by, SortOrder::PopularityDesc);
                assert_eq!(p.page, 2);
                assert_eq!(p.min_vote, 6.0);
                assert!(p.fast_start && p.mobile_friendly && p.low_cognitive_load && p.likely_to_continue);
            }
            other => panic!("unexpected payload: {:?}", other),
        }
    }

    #[test]
    fn test_unknown_category_has_no_genres() {
        let result = composer(Arc::new(SeededRandom::new(3)))
            .compose_movie(Classification::Mood("nostalgic".into()));
        match result.payload {
            Payload::Discover(p) => {
                assert_eq!(p.signal, Signal::Mood("nostalgic".into()));
                assert!(p.prefer_genres.is_empty());
            }
            other => panic!("unexpected payload: {:?}", other),
        }
    }

    #[test]
    fn test_random_knobs_stay_in_pool() {
        let composer = composer(Arc::new(SeededRandom::new(99)));
        for _ in 0..100 {
            match composer.compose_movie(Classification::Mood("sad".into())).payload {
                Payload::Discover(p) => {
                    assert!(SortOrder::POOL.contains(&p.sort_by));
                    assert!((1..=5).contains(&p.page));
                }
                other => panic!("unexpected payload: {:?}", other),
            }
        }
    }

    #[test]
    fn test_fallback() {
        let result = composer(Arc::new(SeededRandom::new(1))).fallback(
            MovieIntent::LlmFallback,
            "  원문 그대로 ",
            FallbackReason::LanguageModelUnavailable,
        );
        assert_eq!(result.route, Route::LanguageModelDirect);
        assert_eq!(
            result.payload,
            Payload::Fallback(FallbackPayload {
                user_text: "  원문 그대로 ".into(),
                reason: FallbackReason::LanguageModelUnavailable,
            })
        );
    }
}
