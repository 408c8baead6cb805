use std::env;

#[derive(Debug, Clone)]
pub struct Config {
    pub host: String,
    pub port: u16,
    pub board_rows: usize,
    pub board_cols: usize,
    pub round_seconds: i64,
    pub grace_period_seconds: i64,
    pub default_countdown_seconds: i64,
    pub vowel_proportion: f64,
    pub session_timeout_minutes: i64,
}

impl Config {
    pub fn new() -> Self {
        Self {
            host: env::var("HOST").unwrap_or_else(|_| "127.0.0.1".to_string()),
            port: env::var("PORT")
                .unwrap_or_else(|_| "8080".to_string())
                .parse()
                .expect("Invalid PORT"),
            board_rows: env::var("BOARD_ROWS")
                .unwrap_or_else(|_| "4".to_string())
                .parse()
                .expect("Invalid BOARD_ROWS"),
            board_cols: env::var("BOARD_COLS")
                .unwrap_or_else(|_| "4".to_string())
                .parse()
                .expect("Invalid BOARD_COLS"),
            round_seconds: env::var("ROUND_SECONDS")
                .unwrap_or_else(|_| "180".to_string())
                .parse()
                .expect("Invalid ROUND_SECONDS"),
            grace_period_seconds: env::var("GRACE_PERIOD_SECONDS")
                .unwrap_or_else(|_| "10".to_string())
                .parse()
                .expect("Invalid GRACE_PERIOD_SECONDS"),
            default_countdown_seconds: env::var("DEFAULT_COUNTDOWN_SECONDS")
                .unwrap_or_else(|_| "15".to_string())
                .parse()
                .expect("Invalid DEFAULT_COUNTDOWN_SECONDS"),
            vowel_proportion: env::var("VOWEL_PROPORTION")
                .unwrap_or_else(|_| "0.375".to_string())
                .parse()
                .expect("Invalid VOWEL_PROPORTION"),
            session_timeout_minutes: env::var("SESSION_TIMEOUT_MINUTES")
                .unwrap_or_else(|_| "120".to_string())
                .parse()
                .expect("Invalid SESSION_TIMEOUT_MINUTES"),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::new()
    }
}
