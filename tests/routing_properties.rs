//! Routing totality: any text, any model behaviour, exactly one
//! well-formed result.

mod helpers;

use helpers::{movie_router, music_router, Reply, ScriptedLlmClient};
use proptest::prelude::*;
use recharge_router::normalize::normalize_text;
use recharge_router::routing::Signal;
use recharge_router::{
    FallbackReason, MovieIntent, MusicIntent, Payload, Route, RoutingResult, SortOrder,
};
use serde_json::json;

/// What the scripted model does for one case
#[derive(Debug, Clone)]
enum ModelBehaviour {
    Unavailable,
    Text(String),
}

impl ModelBehaviour {
    fn reply(&self) -> Reply {
        match self {
            ModelBehaviour::Unavailable => Reply::unavailable(),
            ModelBehaviour::Text(text) => Reply::text(text.clone()),
        }
    }
}

fn arb_user_text() -> impl Strategy<Value = String> {
    let phrases = prop::sample::select(vec![
        "인셉션 같은 영화",
        "a 같은 영화",
        "충전하면서",
        "비가 오는 날",
        "눈",
        "우울해",
        "힐링",
        "주말에 볼 만한 거",
        "아이유 노래",
        "Drive",
        "  ",
        "\u{3000}",
        "{\"is_movie_related\": true}",
    ]);
    prop_oneof![
        any::<String>(),
        "\\PC{0,30}",
        prop::collection::vec(phrases, 0..4).prop_map(|parts| parts.join(" ")),
    ]
}

fn arb_field(values: &'static [&'static str]) -> impl Strategy<Value = Option<String>> {
    prop::option::of(prop_oneof![
        prop::sample::select(values.to_vec()).prop_map(str::to_string),
        "\\PC{0,8}",
    ])
}

fn arb_movie_answer() -> impl Strategy<Value = String> {
    (
        prop::option::of(any::<bool>()),
        arb_field(&["인셉션", "The Dark Knight", "", " "]),
        arb_field(&["charging", "commute", "home", "travel"]),
        arb_field(&["rain", "snow", "sunny", "cloudy", "hot", "cold", "foggy"]),
        arb_field(&["happy", "sad", "tired", "healing", "excited", "nostalgic"]),
    )
        .prop_map(|(related, title, situation, weather, mood)| {
            json!({
                "is_movie_related": related,
                "reference_title": title,
                "situation": situation,
                "weather": weather,
                "mood": mood,
            })
            .to_string()
        })
}

fn arb_music_answer() -> impl Strategy<Value = String> {
    (
        prop::option::of(any::<bool>()),
        arb_field(&["general", "artist", "similar", "playlist"]),
        arb_field(&["아이유", "NewJeans", ""]),
        arb_field(&["Ditto", "밤편지", ""]),
        arb_field(&["charging", "drive", "library"]),
        arb_field(&["calm", "sad", "nostalgic"]),
        arb_field(&["rainy", "foggy"]),
    )
        .prop_map(|(related, intent_type, artist, seed_track, context, mood, weather)| {
            json!({
                "is_music_related": related,
                "intent_type": intent_type,
                "artist": artist,
                "seed_track": seed_track,
                "context": context,
                "mood": mood,
                "weather": weather,
            })
            .to_string()
        })
}

/// Well-formed answers wrapped the ways models wrap them, plus junk
fn arb_model(answer: impl Strategy<Value = String>) -> impl Strategy<Value = ModelBehaviour> {
    let wrapped = (answer, 0..3u8).prop_map(|(json, wrap)| match wrap {
        0 => json,
        1 => format!("```json\n{}\n```", json),
        _ => format!("결과: {} 입니다", json),
    });
    prop_oneof![
        1 => Just(ModelBehaviour::Unavailable),
        3 => wrapped.prop_map(ModelBehaviour::Text),
        1 => any::<String>().prop_map(ModelBehaviour::Text),
    ]
}

fn block_on<F: std::future::Future>(future: F) -> F::Output {
    tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .unwrap()
        .block_on(future)
}

fn check_fallback<I>(
    text: &str,
    result: &RoutingResult<I>,
    calls: usize,
) -> Result<(), TestCaseError> {
    match &result.payload {
        Payload::Fallback(p) => {
            prop_assert_eq!(result.route, Route::LanguageModelDirect);
            prop_assert_eq!(p.user_text.as_str(), text);
            if normalize_text(text).is_empty() {
                prop_assert_eq!(p.reason, FallbackReason::EmptyInput);
                prop_assert_eq!(calls, 0);
            } else {
                prop_assert_ne!(p.reason, FallbackReason::EmptyInput);
                prop_assert_eq!(calls, 1);
            }
        }
        _ => prop_assert_eq!(result.route, Route::RecommendationBackend),
    }
    Ok(())
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(128))]

    #[test]
    fn movie_route_is_total(
        text in arb_user_text(),
        model in arb_model(arb_movie_answer()),
        seed in any::<u64>()
    ) {
        let llm = ScriptedLlmClient::new([model.reply()]);
        let result = block_on(movie_router(llm.clone(), seed).route(&text));
        let calls = llm.call_count();

        prop_assert!(calls <= 1);
        check_fallback(&text, &result, calls)?;

        match (&result.intent, &result.payload) {
            (MovieIntent::LlmFallback, Payload::Fallback(_)) => {}
            (MovieIntent::SimilarByTitle, Payload::SimilarTitle(p)) => {
                prop_assert!(!p.seed_title.trim().is_empty());
            }
            (MovieIntent::RechargeImmersiveContinue, Payload::Situational(p)) => {
                prop_assert!(p.fast_start && p.mobile_friendly);
                prop_assert!(p.low_cognitive_load && p.likely_to_continue);
                prop_assert_eq!(p.sort_by, SortOrder::PopularityDesc);
                prop_assert!((1..=5).contains(&p.page));
                prop_assert_eq!(p.min_vote, 6.0);
            }
            (MovieIntent::Weather, Payload::Discover(p)) | (MovieIntent::Mood, Payload::Discover(p)) => {
                let signal_matches = matches!(
                    (&result.intent, &p.signal),
                    (MovieIntent::Weather, Signal::Weather(_)) | (MovieIntent::Mood, Signal::Mood(_))
                );
                prop_assert!(signal_matches, "{:?} with {:?}", result.intent, p.signal);
                prop_assert!(SortOrder::POOL.contains(&p.sort_by));
                prop_assert!((1..=5).contains(&p.page));
                prop_assert_eq!(p.min_vote, 6.0);
            }
            (intent, payload) => {
                prop_assert!(false, "intent {:?} with payload {:?}", intent, payload);
            }
        }
    }

    #[test]
    fn music_route_is_total(
        text in arb_user_text(),
        model in arb_model(arb_music_answer()),
        seed in any::<u64>()
    ) {
        let llm = ScriptedLlmClient::new([model.reply()]);
        let result = block_on(music_router(llm.clone(), seed).route(&text));
        let calls = llm.call_count();

        prop_assert!(calls <= 1);
        check_fallback(&text, &result, calls)?;

        match (&result.intent, &result.payload) {
            (MusicIntent::Unrelated, Payload::Fallback(_)) => {}
            (MusicIntent::Artist, Payload::Music(p)) => {
                prop_assert!(p.is_music_related);
                prop_assert!(p.artist.is_some());
            }
            (MusicIntent::Similar, Payload::Music(p)) => {
                prop_assert!(p.is_music_related);
                prop_assert!(p.seed_track.is_some());
            }
            (MusicIntent::General, Payload::Music(p)) => prop_assert!(p.is_music_related),
            (intent, payload) => {
                prop_assert!(false, "intent {:?} with payload {:?}", intent, payload);
            }
        }
    }

    #[test]
    fn rule_hits_never_call_the_model(seed in any::<u64>(), prefix in "[가-힣 ]{0,6}") {
        let llm = ScriptedLlmClient::silent();
        let text = format!("{}충전하면서 볼 영화", prefix);
        let result = block_on(movie_router(llm.clone(), seed).route(&text));
        prop_assert_eq!(llm.call_count(), 0);
        prop_assert_eq!(result.route, Route::RecommendationBackend);
    }
}
