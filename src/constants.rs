// UI Constants
pub const SEND_BUTTON_LABEL: &str = "[ Send ]";
pub const INPUT_PROMPT: &str = "→ ";
pub const TICK_RATE_MS: u64 = 100;
pub const SPINNER_FRAMES: [&str; 4] = ["◐", "◓", "◑", "◒"];

// API Constants
pub const DEFAULT_SERVER_URL: &str = "http://127.0.0.1:5000";
pub const DEFAULT_CHAT_PATH: &str = "/chat";
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;
pub const DEFAULT_FOLLOW_UP_DELAY_MS: u64 = 100;

// Environment overrides
pub const ENV_SERVER_URL: &str = "REGO_CHAT_SERVER_URL";
pub const ENV_LOG_LEVEL: &str = "REGO_CHAT_LOG_LEVEL";

pub const LOG_BASENAME: &str = "rego-chat";
pub const EXIT_COMMAND: &str = "exit";
