//! Platform-specific contest fetchers.
//!
//! Each adapter fetches one platform's listing and normalizes it into
//! canonical [`Contest`](contest_core::Contest) records. The fetch contract
//! is uniform: network, timeout, HTTP, and parse errors are logged and yield
//! an empty listing; malformed individual entries are skipped. Parsing is
//! split from I/O so it can be tested against captured payloads.

pub mod atcoder;
pub mod codechef;
pub mod codeforces;
pub mod leetcode;

pub use atcoder::AtCoderAdapter;
pub use codechef::CodeChefAdapter;
pub use codeforces::CodeforcesAdapter;
pub use leetcode::LeetCodeAdapter;
