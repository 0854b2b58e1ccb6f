use clap::Parser;

pub const DEFAULT_MODEL: &str = "gemini-2.5-pro";
pub const DEFAULT_FALLBACK_MODELS: &str = "gemini-1.0-pro,gemini-pro";

/// Gemini chat client: run a single prompt or start an interactive REPL.
#[derive(Debug, Parser)]
#[command(name = "gema")]
#[command(about = "Gemini chat client (one-shot prompt or REPL)")]
pub struct Cli {
    /// Single prompt to run; omit to start the REPL
    #[arg(short, long)]
    pub prompt: Option<String>,

    /// Gemini model name
    #[arg(short, long, default_value = DEFAULT_MODEL)]
    pub model: String,

    /// Optional system instruction
    #[arg(long)]
    pub system: Option<String>,

    /// Sampling temperature
    #[arg(long, default_value_t = 0.2)]
    pub temperature: f32,

    /// Maximum output tokens per response
    #[arg(long = "max-tokens", default_value_t = 512)]
    pub max_tokens: u32,

    /// API key (or set GEMINI_API_KEY/GOOGLE_API_KEY)
    #[arg(long = "api-key")]
    pub api_key: Option<String>,

    /// Comma-separated fallback models tried when the primary model is not served
    #[arg(long = "fallback-models", default_value = DEFAULT_FALLBACK_MODELS)]
    pub fallback_models: String,
}
