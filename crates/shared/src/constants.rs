pub const APP_NAME: &str = "Amora";

// Limits
pub const MAX_MESSAGE_LENGTH: usize = 4000;
pub const MAX_EMOJI_LENGTH: usize = 16;

pub const MESSAGE_PAGE_SIZE: i64 = 50;

// Messages
pub const MESSAGE_TYPE_TEXT: &str = "text";
pub const MESSAGE_TYPE_RESCHEDULE: &str = "reschedule_notice";
pub const DEFAULT_RESCHEDULE_REASON: &str = "No reason given";

// Auth
pub const SESSION_COOKIE: &str = "amora.session_token";

// WebSocket
pub const WS_HEARTBEAT_INTERVAL_MS: u64 = 30_000;
