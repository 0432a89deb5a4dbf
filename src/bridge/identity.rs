//! Username/realname assignment for a home identity.

use std::collections::HashSet;
use std::sync::Mutex;

/// Produces the `(username, realname)` pair offered in `USER` for a home identity.
///
/// Invoked exactly once per successful connect; implementations resolve uniqueness
/// collisions (two home identities mapping to the same sanitized username) internally
/// rather than surfacing them to the caller.
pub trait IdentityGenerator: Send + Sync {
    /// Returns `(username, realname)` for `home_user_id`, using `display_name` as the
    /// preferred human-readable realname when present.
    fn generate(&self, home_user_id: &str, display_name: Option<&str>) -> (String, String);

    /// Releases the username claimed by a previous `generate` call, permitting it to be
    /// reassigned to a different `home_user_id`.
    fn release(&self, username: &str);
}

/// Sanitizes `home_user_id` into an ident-safe username, disambiguating collisions by
/// appending a numeric suffix.
#[derive(Debug, Default)]
pub struct DefaultIdentityGenerator {
    taken: Mutex<HashSet<String>>,
}

impl DefaultIdentityGenerator {
    /// Creates a generator with no usernames claimed.
    pub fn new() -> Self {
        Self::default()
    }

    fn sanitize(raw: &str) -> String {
        let cleaned: String = raw
            .chars()
            .filter(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_'))
            .collect();
        let cleaned = if cleaned.is_empty() { "user".to_string() } else { cleaned };
        cleaned.to_lowercase().chars().take(12).collect()
    }
}

impl IdentityGenerator for DefaultIdentityGenerator {
    fn generate(&self, home_user_id: &str, display_name: Option<&str>) -> (String, String) {
        let base = Self::sanitize(home_user_id);
        let realname = display_name.filter(|s| !s.is_empty()).unwrap_or(home_user_id).to_string();

        let mut taken = self.taken.lock().unwrap();
        if taken.insert(base.clone()) {
            return (base, realname);
        }
        for suffix in 1u32.. {
            let candidate = format!("{base}{suffix}");
            if taken.insert(candidate.clone()) {
                return (candidate, realname);
            }
        }
        unreachable!("username space exhausted")
    }

    fn release(&self, username: &str) {
        self.taken.lock().unwrap().remove(username);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sanitizes_and_lowercases() {
        let gen = DefaultIdentityGenerator::new();
        let (user, real) = gen.generate("Home.User 42!", Some("Alice"));
        assert_eq!(user, "homeuser42");
        assert_eq!(real, "Alice");
    }

    #[test]
    fn falls_back_to_home_user_id_for_realname() {
        let gen = DefaultIdentityGenerator::new();
        let (_, real) = gen.generate("home-id", None);
        assert_eq!(real, "home-id");
    }

    #[test]
    fn collisions_get_a_numeric_suffix() {
        let gen = DefaultIdentityGenerator::new();
        let (first, _) = gen.generate("dupe", None);
        let (second, _) = gen.generate("dupe", None);
        assert_eq!(first, "dupe");
        assert_eq!(second, "dupe1");
    }

    #[test]
    fn release_frees_the_username_for_reuse() {
        let gen = DefaultIdentityGenerator::new();
        let (user, _) = gen.generate("dupe", None);
        gen.release(&user);
        let (reused, _) = gen.generate("dupe", None);
        assert_eq!(reused, user);
    }
}
