use serde::Deserialize;

/// Keywords used when a job is submitted without its own keyword set
pub const DEFAULT_KEYWORDS: &[&str] = &[
    "Budget",
    "ACFR",
    "Finance Director",
    "CFO",
    "Financial Report",
    "Expenditure",
    "Revenue",
    "General Fund",
    "Capital Improvement Plan",
    "Fiscal Year",
    "Audit",
    "Auditor",
    "Treasurer",
    "Bond Issuance",
    "Municipal Bonds",
    "Debt Service",
    "Fund Balance",
    "Operating Budget",
    "Financial Statement",
    "Public Finance",
    "Controller",
    "Accounting",
    "CAFR",
    "GFOA",
    "Financial Planning",
    "Budget Hearing",
    "Budget Proposal",
    "Budget Adoption",
    "Reserve Fund",
    "Financial Forecast",
];

/// Main configuration structure for Keyword-Scout
///
/// Every section is optional in the TOML file; missing sections fall back to
/// the defaults below.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Config {
    pub crawler: CrawlerConfig,
    #[serde(rename = "user-agent")]
    pub user_agent: UserAgentConfig,
    pub filter: FilterConfig,
    pub oracle: OracleConfig,
    pub jobs: JobsConfig,
    pub output: OutputConfig,
    /// Keyword set used when a submission carries none
    pub keywords: Vec<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            crawler: CrawlerConfig::default(),
            user_agent: UserAgentConfig::default(),
            filter: FilterConfig::default(),
            oracle: OracleConfig::default(),
            jobs: JobsConfig::default(),
            output: OutputConfig::default(),
            keywords: DEFAULT_KEYWORDS.iter().map(|k| k.to_string()).collect(),
        }
    }
}

/// Crawler behavior configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct CrawlerConfig {
    /// Maximum link depth from the seed page
    #[serde(rename = "max-depth")]
    pub max_depth: u32,

    /// Minimum time between requests to the same host (milliseconds)
    #[serde(rename = "politeness-delay-ms")]
    pub politeness_delay_ms: u64,

    /// Whole-request timeout for page fetches (seconds)
    #[serde(rename = "request-timeout-secs")]
    pub request_timeout_secs: u64,

    /// Connection timeout for page fetches (seconds)
    #[serde(rename = "connect-timeout-secs")]
    pub connect_timeout_secs: u64,

    /// Maximum characters of extracted text handed to the oracle
    #[serde(rename = "max-text-chars")]
    pub max_text_chars: usize,

    /// Whether robots.txt rules are honored
    #[serde(rename = "respect-robots")]
    pub respect_robots: bool,
}

impl Default for CrawlerConfig {
    fn default() -> Self {
        Self {
            max_depth: 2,
            politeness_delay_ms: 500,
            request_timeout_secs: 30,
            connect_timeout_secs: 10,
            max_text_chars: 4000,
            respect_robots: true,
        }
    }
}

/// User agent sent with every page and robots.txt request
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct UserAgentConfig {
    pub value: String,
}

impl Default for UserAgentConfig {
    fn default() -> Self {
        Self {
            value: "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36".to_string(),
        }
    }
}

/// Link filter heuristics
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct FilterConfig {
    /// Path extensions that never lead to a document worth scoring
    #[serde(rename = "ignored-extensions")]
    pub ignored_extensions: Vec<String>,

    /// Anchor-text words that mark boilerplate links
    #[serde(rename = "skip-words")]
    pub skip_words: Vec<String>,

    /// Substrings identifying social and navigation sites
    #[serde(rename = "nav-patterns")]
    pub nav_patterns: Vec<String>,
}

impl Default for FilterConfig {
    fn default() -> Self {
        let strings = |items: &[&str]| items.iter().map(|s| s.to_string()).collect();
        Self {
            ignored_extensions: strings(&[".jpg", ".jpeg", ".png", ".gif", ".css", ".js"]),
            skip_words: strings(&[
                "login",
                "sign in",
                "register",
                "privacy",
                "terms",
                "contact",
                "about",
                "faq",
                "help",
                "support",
                "cookie",
                "accessibility",
                "sitemap",
                "feedback",
            ]),
            nav_patterns: strings(&[
                "facebook.com",
                "twitter.com",
                "linkedin.com",
                "instagram.com",
                "youtube.com",
            ]),
        }
    }
}

/// Relevance oracle connection settings
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct OracleConfig {
    /// Base URL of an OpenAI-compatible API
    #[serde(rename = "base-url")]
    pub base_url: String,

    pub model: String,

    #[serde(rename = "max-tokens")]
    pub max_tokens: u32,

    pub temperature: f32,

    #[serde(rename = "timeout-secs")]
    pub timeout_secs: u64,

    /// Environment variable holding the API key
    #[serde(rename = "api-key-env")]
    pub api_key_env: String,
}

impl Default for OracleConfig {
    fn default() -> Self {
        Self {
            base_url: "https://api.openai.com/v1".to_string(),
            model: "gpt-4.1-nano".to_string(),
            max_tokens: 17,
            temperature: 0.2,
            timeout_secs: 20,
            api_key_env: "OPENAI_API_KEY".to_string(),
        }
    }
}

/// Job execution settings
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct JobsConfig {
    /// Candidates must score strictly above this to be persisted
    #[serde(rename = "inclusion-threshold")]
    pub inclusion_threshold: f64,

    /// Number of jobs processed at the same time
    #[serde(rename = "worker-concurrency")]
    pub worker_concurrency: usize,

    /// After this many seconds the crawl is asked to stop early
    #[serde(rename = "soft-timeout-secs")]
    pub soft_timeout_secs: u64,

    /// After this many seconds the job is abandoned and marked failed
    #[serde(rename = "hard-timeout-secs")]
    pub hard_timeout_secs: u64,
}

impl Default for JobsConfig {
    fn default() -> Self {
        Self {
            inclusion_threshold: 1.0,
            worker_concurrency: 8,
            soft_timeout_secs: 240,
            hard_timeout_secs: 480,
        }
    }
}

/// Output configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// Path to the SQLite database file
    #[serde(rename = "database-path")]
    pub database_path: String,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            database_path: "./keyword-scout.db".to_string(),
        }
    }
}
