//! Contest platform identifiers.

use serde::{Deserialize, Serialize};

/// Contest platform.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Platform {
    Codeforces,
    LeetCode,
    AtCoder,
    CodeChef,
}

impl Platform {
    /// All supported platforms, in display order.
    pub const ALL: [Platform; 4] = [
        Platform::Codeforces,
        Platform::LeetCode,
        Platform::AtCoder,
        Platform::CodeChef,
    ];

    /// Short code used as the contest id namespace prefix.
    pub fn prefix(self) -> &'static str {
        match self {
            Platform::Codeforces => "cf",
            Platform::LeetCode => "lc",
            Platform::AtCoder => "ac",
            Platform::CodeChef => "cc",
        }
    }

    /// Display name.
    pub fn as_str(self) -> &'static str {
        match self {
            Platform::Codeforces => "Codeforces",
            Platform::LeetCode => "LeetCode",
            Platform::AtCoder => "AtCoder",
            Platform::CodeChef => "CodeChef",
        }
    }

    /// Parse a user-supplied token: short code or full name, case-insensitive.
    pub fn from_token(token: &str) -> Option<Self> {
        match token.to_ascii_lowercase().as_str() {
            "cf" | "codeforces" => Some(Platform::Codeforces),
            "lc" | "leetcode" => Some(Platform::LeetCode),
            "ac" | "atcoder" => Some(Platform::AtCoder),
            "cc" | "codechef" => Some(Platform::CodeChef),
            _ => None,
        }
    }

    /// Build a globally unique contest id from a platform-native id.
    pub fn contest_id(self, native_id: &str) -> String {
        format!("{}_{}", self.prefix(), native_id)
    }
}

impl std::fmt::Display for Platform {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
