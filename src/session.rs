use chrono::Utc;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

const RANDOM_LEN: usize = 9;
const BASE36: &[u8; 36] = b"0123456789abcdefghijklmnopqrstuvwxyz";

/// Correlation key the remote API uses to keep conversational context
/// between turns. Generated once per chat surface and never rotated.
///
/// Shape: `session_{unix_millis}_{9 base36 chars}`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SessionId(String);

impl SessionId {
    pub fn generate() -> Self {
        let millis = Utc::now().timestamp_millis();
        Self(format!("session_{millis}_{}", random_base36(RANDOM_LEN)))
    }

    pub fn from_string(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for SessionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// `len` base36 characters drawn from the 122 random bits of a v4 UUID.
fn random_base36(len: usize) -> String {
    let mut bits = Uuid::new_v4().as_u128();
    (0..len)
        .map(|_| {
            let digit = (bits % 36) as usize;
            bits /= 36;
            BASE36[digit] as char
        })
        .collect()
}
