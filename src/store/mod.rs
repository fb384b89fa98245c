// Tweet storage: the collaborator the predictor reads tweet vectors from.
//
// Persistence is someone else's job. The TweetStore trait is the seam; the
// in-memory store backs the CLI and the tests.

pub mod memory;
pub mod traits;

pub use memory::MemoryTweetStore;
pub use traits::TweetStore;

/// Canonical form of a user name: surrounding whitespace and a leading `@`
/// removed, lowercased. Handles are case-insensitive.
pub fn normalize_user(name: &str) -> String {
    let name = name.trim();
    name.strip_prefix('@').unwrap_or(name).to_lowercase()
}
