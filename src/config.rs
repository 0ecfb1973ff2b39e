use clap::Parser;

// CLI argument structure
#[derive(Parser, Debug, Clone)]
#[command(name = "pawpaw-gateway")]
#[command(about = "Rate-limited chat gateway for the Pawpaw widget")]
pub struct Args {
    // Port to run the server on
    #[arg(short, long, env = "PORT", default_value_t = 8080)]
    pub port: u16,

    // Chat-completion API base url
    #[arg(long, env = "PAWPAW_UPSTREAM_URL", default_value = "https://api.openai.com/v1")]
    pub upstream_url: String,

    // Model identifier sent upstream
    #[arg(long, env = "PAWPAW_MODEL", default_value = "gpt-4o-mini")]
    pub model: String,

    // Upstream credential. Missing is not fatal, every chat gets a fallback reply
    #[arg(long, env = "OPENAI_API_KEY", hide_env_values = true)]
    pub api_key: Option<String>,

    // Rate limit max requests per window
    #[arg(long, default_value_t = 5)]
    pub rate_limit: u32,

    // Rate limit window in seconds
    #[arg(long, default_value_t = 15)]
    pub rate_window: u64,

    // Longest accepted message, in characters
    #[arg(long, default_value_t = 500)]
    pub max_message_len: usize,

    // Blocked terms (comma-separated, matched case-insensitively as substrings)
    #[arg(
        long,
        env = "PAWPAW_DENYLIST",
        value_delimiter = ',',
        default_value = "sex,kill,fuck,nude,terror,bomb"
    )]
    pub denylist: Vec<String>,

    // Upstream request timeout in seconds
    #[arg(long, default_value_t = 30)]
    pub upstream_timeout: u64,

    // How often expired rate-limit windows are dropped (0 = never)
    #[arg(long, default_value_t = 60)]
    pub sweep_interval: u64,
}

impl Args {
    // Blank keys count as missing
    pub fn api_key(&self) -> Option<String> {
        self.api_key
            .as_deref()
            .map(str::trim)
            .filter(|k| !k.is_empty())
            .map(str::to_string)
    }
}
