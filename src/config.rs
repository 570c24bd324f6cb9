use std::env;

pub struct Config {
    pub html_url: String,
    pub html_output_filename: String,
    pub html_user_agent: String,
    pub api_url: String,
    pub api_output_filename: String,
    pub api_user_agent: String,
    pub proxy_file: String,
    pub use_proxy: bool,
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        Ok(Self {
            html_url: env::var("HTML_URL")?,
            html_output_filename: env::var("HTML_OUTPUT_FILENAME")?,
            html_user_agent: env::var("HTML_USER_AGENT")?,
            api_url: env::var("API_URL")?,
            api_output_filename: env::var("API_OUTPUT_FILENAME")?,
            api_user_agent: env::var("API_USER_AGENT")?,
            proxy_file: env::var("PROXY_FILE")?,
            use_proxy: env::var("USE_PROXY")
                .map(|v| v == "1" || v.eq_ignore_ascii_case("true"))
                .unwrap_or(false),
        })
    }
}
