//! Recharge Router CLI
//!
//! Routes movie or music requests and prints one JSON result per request.
//!
//! Usage:
//!   cargo run --features cli --bin recharge_router -- "비 오는 날 볼 영화 추천해줘"
//!
//! Examples:
//!   # Music request, reproducible sort/page
//!   cargo run --features cli --bin recharge_router -- --domain music --seed 7 "아이유 노래 틀어줘"
//!
//!   # One request per line from a file, 8 at a time
//!   cat requests.txt | cargo run --features cli --bin recharge_router -- --concurrency 8
//!
//!   # Custom rule tables, and let the model answer fallbacks directly
//!   cargo run --features cli --bin recharge_router -- --rules my_rules.yaml --answer "심심해"

use std::io::BufRead;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use async_trait::async_trait;
use clap::{Parser, ValueEnum};
use futures::stream::{self, StreamExt};
use serde::Serialize;
use tracing::warn;

use recharge_router::{
    create_llm_client, CapabilityError, JsonExtraction, LlmClient, MovieRouter, MusicRouter,
    RandomSource, Route, RoutingResult, RuleLoader, SeededRandom, ThreadRandom,
};

const ANSWER_PROMPT: &str = "너는 영화와 음악 추천을 도와주는 친절한 도우미다. \
사용자의 말에 한국어로 짧고 자연스럽게 답해라.";

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum Domain {
    Movie,
    Music,
}

/// Route recommendation requests to a backend or the language model
#[derive(Parser, Debug)]
#[command(name = "recharge_router")]
#[command(about = "Route movie and music recommendation requests")]
struct Args {
    /// Which domain's router to use
    #[arg(long, short = 'd', value_enum, default_value_t = Domain::Movie)]
    domain: Domain,

    /// Rules YAML file (default: $RECHARGE_RULES_PATH, then the built-in tables)
    #[arg(long, short = 'r')]
    rules: Option<PathBuf>,

    /// Seed for sort order and page selection
    #[arg(long)]
    seed: Option<u64>,

    /// Take the model's JSON from the first `{` to the last `}`
    #[arg(long)]
    greedy_json: bool,

    /// Requests routed at once when reading stdin
    #[arg(long, short = 'c', default_value_t = 4)]
    concurrency: usize,

    /// Ask the model for a direct answer when a request is routed to it
    #[arg(long)]
    answer: bool,

    /// Request text; when omitted, reads one request per stdin line
    text: Option<String>,
}

#[derive(Serialize)]
struct Output<I: Serialize> {
    input: String,
    #[serde(flatten)]
    result: RoutingResult<I>,
    #[serde(skip_serializing_if = "Option::is_none")]
    answer: Option<String>,
}

enum Router {
    Movie(MovieRouter),
    Music(MusicRouter),
}

struct App {
    router: Router,
    llm: Arc<dyn LlmClient>,
    answer: bool,
}

impl App {
    async fn handle(&self, text: String) -> Result<String> {
        let line = match &self.router {
            Router::Movie(router) => {
                let result = router.route(&text).await;
                self.render(text, result).await?
            }
            Router::Music(router) => {
                let result = router.route(&text).await;
                self.render(text, result).await?
            }
        };
        Ok(line)
    }

    async fn render<I: Serialize>(&self, input: String, result: RoutingResult<I>) -> Result<String> {
        let answer = if self.answer && result.route == Route::LanguageModelDirect {
            match self.llm.chat(ANSWER_PROMPT, &input).await {
                Ok(answer) => Some(answer),
                Err(e) => {
                    warn!("Direct answer failed: {}", e);
                    None
                }
            }
        } else {
            None
        };

        let output = Output {
            input,
            result,
            answer,
        };
        serde_json::to_string(&output).context("Failed to serialize routing result")
    }
}

/// Stand-in when no provider is configured; every request that reaches
/// the model falls back with `language_model_unavailable`.
struct UnconfiguredClient {
    reason: String,
}

#[async_trait]
impl LlmClient for UnconfiguredClient {
    async fn chat(&self, _system_prompt: &str, _user_prompt: &str) -> Result<String, CapabilityError> {
        Err(CapabilityError::Config(self.reason.clone()))
    }

    async fn chat_json(
        &self,
        _system_prompt: &str,
        _user_prompt: &str,
    ) -> Result<String, CapabilityError> {
        Err(CapabilityError::Config(self.reason.clone()))
    }

    fn model_name(&self) -> &str {
        "none"
    }

    fn provider_name(&self) -> &str {
        "unconfigured"
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if present
    dotenvy::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::WARN.into()),
        )
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();

    let loader = match &args.rules {
        Some(path) => RuleLoader::new(path),
        None => RuleLoader::from_env(),
    };
    let rules = Arc::new(loader.load().context("Failed to load rule book")?);

    let llm: Arc<dyn LlmClient> = match create_llm_client() {
        Ok(client) => client,
        Err(e) => {
            warn!("LLM client unavailable, rule matches only: {}", e);
            Arc::new(UnconfiguredClient {
                reason: e.to_string(),
            })
        }
    };

    let random: Arc<dyn RandomSource> = match args.seed {
        Some(seed) => Arc::new(SeededRandom::new(seed)),
        None => Arc::new(ThreadRandom),
    };

    let extraction = if args.greedy_json {
        JsonExtraction::Greedy
    } else {
        JsonExtraction::Balanced
    };

    let router = match args.domain {
        Domain::Movie => Router::Movie(
            MovieRouter::new(rules, llm.clone(), random).with_json_extraction(extraction),
        ),
        Domain::Music => Router::Music(
            MusicRouter::new(rules, llm.clone(), random).with_json_extraction(extraction),
        ),
    };

    let app = App {
        router,
        llm,
        answer: args.answer,
    };

    if let Some(text) = args.text {
        println!("{}", app.handle(text).await?);
        return Ok(());
    }

    let lines = std::io::stdin()
        .lock()
        .lines()
        .collect::<std::io::Result<Vec<_>>>()
        .context("Failed to read stdin")?;

    let mut outputs = stream::iter(lines.into_iter().filter(|line| !line.trim().is_empty()))
        .map(|line| app.handle(line))
        .buffer_unordered(args.concurrency.max(1));

    while let Some(output) = outputs.next().await {
        println!("{}", output?);
    }

    Ok(())
}
