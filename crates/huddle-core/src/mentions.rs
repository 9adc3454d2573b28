use std::sync::OnceLock;

use regex::Regex;
use uuid::Uuid;

use huddle_types::models::User;

static MENTION_PATTERN: OnceLock<Regex> = OnceLock::new();

fn mention_pattern() -> &'static Regex {
    MENTION_PATTERN.get_or_init(|| Regex::new(r"@(\w+)").expect("mention pattern"))
}

/// Raw `@token` captures from a message body, in order of appearance. A
/// token is `@` followed by one or more word characters; the `@` itself is
/// stripped. Pure and deterministic — no directory lookup happens here.
pub fn extract_mentions(body: &str) -> Vec<String> {
    mention_pattern()
        .captures_iter(body)
        .map(|cap| cap[1].to_string())
        .collect()
}

/// Best-effort send-time resolution of captured tokens against the
/// directory: a token resolves to the first user whose first name equals it
/// case-insensitively. Unresolved tokens contribute nothing; a user matched
/// by two tokens is reported once.
pub fn resolve_mentions(tokens: &[String], directory: &[User]) -> Vec<Uuid> {
    let mut resolved = Vec::new();
    for token in tokens {
        let hit = directory.iter().find(|user| {
            user.name
                .split_whitespace()
                .next()
                .is_some_and(|first| first.eq_ignore_ascii_case(token))
        });
        if let Some(user) = hit {
            if !resolved.contains(&user.id) {
                resolved.push(user.id);
            }
        }
    }
    resolved
}

#[cfg(test)]
mod tests {
    use super::*;
    use huddle_types::models::Presence;

    fn user(id: Uuid, name: &str) -> User {
        User {
            id,
            name: name.to_string(),
            email: format!("{}@example.com", name.to_lowercase().replace(' ', ".")),
            role: "Analyst".to_string(),
            status: Presence::Online,
            last_seen: None,
            avatar_url: None,
        }
    }

    #[test]
    fn extracts_tokens_in_order() {
        assert_eq!(
            extract_mentions("hi @Sarah and @bob_2 please review"),
            vec!["Sarah".to_string(), "bob_2".to_string()]
        );
    }

    #[test]
    fn no_tokens_means_empty() {
        assert!(extract_mentions("no mentions here").is_empty());
    }

    #[test]
    fn bare_at_and_punctuation_are_not_tokens() {
        assert!(extract_mentions("reach me @ the office").is_empty());
        assert_eq!(extract_mentions("ping @sarah."), vec!["sarah".to_string()]);
    }

    #[test]
    fn repeated_tokens_are_kept_in_capture() {
        assert_eq!(
            extract_mentions("@sam @sam again"),
            vec!["sam".to_string(), "sam".to_string()]
        );
    }

    #[test]
    fn resolution_matches_first_name_case_insensitively() {
        let sarah = Uuid::new_v4();
        let directory = vec![user(sarah, "Sarah Johnson"), user(Uuid::new_v4(), "Michael Chen")];

        let ids = resolve_mentions(&["sarah".to_string()], &directory);
        assert_eq!(ids, vec![sarah]);
    }

    #[test]
    fn resolution_skips_unknown_and_dedupes() {
        let sarah = Uuid::new_v4();
        let directory = vec![user(sarah, "Sarah Johnson")];

        let ids = resolve_mentions(
            &["Sarah".to_string(), "nobody".to_string(), "sarah".to_string()],
            &directory,
        );
        assert_eq!(ids, vec![sarah]);
    }
}
