/// Bearer token plus the instant after which it must not be handed out.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    pub value: String,
    /// buffer-adjusted expiry, UNIX seconds
    pub exp_unix_ts: i64,
}

impl Token {
    pub fn new(value: String, exp_unix_ts: i64) -> Self {
        Self { value, exp_unix_ts }
    }

    pub fn is_valid_at(&self, now_unix: i64) -> bool {
        now_unix < self.exp_unix_ts
    }

    pub fn bearer(&self) -> String {
        format!("Bearer {}", self.value)
    }
}
