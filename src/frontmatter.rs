use serde_yaml::Value;

/// Extracts the hashtag list for a note from its raw Markdown content.
///
/// YAML front matter with a `tags` field (string or list) wins when present.
/// When front matter is absent, malformed, or carries no tags, the body is
/// scanned for `#word` tokens instead. Malformed front matter is never
/// fatal: the whole content (including the broken block) becomes the scan
/// input, so this function cannot fail for any input.
///
/// Tags are preserved exactly as authored and deduplicated case-sensitively;
/// any normalization is a consumer concern.
pub fn extract_hashtags(content: &str) -> Vec<String> {
    let (mut tags, body) = match split_front_matter(content) {
        Some((yaml, body)) => match front_matter_tags(yaml) {
            Ok(tags) => (tags, body),
            // Broken YAML: fall back to scanning the full content.
            Err(_) => (Vec::new(), content),
        },
        None => (Vec::new(), content),
    };

    if tags.is_empty() {
        tags = scan_body_hashtags(body);
    }

    dedup_preserving_order(tags)
}

/// Splits `content` into its front-matter YAML block and the remaining body.
///
/// The block must open with `---` on the very first line and close with a
/// `---` line of its own. Returns `None` when no such block exists.
fn split_front_matter(content: &str) -> Option<(&str, &str)> {
    let rest = content.strip_prefix("---")?;
    let rest = rest
        .strip_prefix("\r\n")
        .or_else(|| rest.strip_prefix('\n'))?;

    let mut search_from = 0;
    loop {
        let idx = rest[search_from..].find("\n---")? + search_from;
        let after = &rest[idx + 4..];
        let at_line_end = after.is_empty()
            || after.starts_with('\n')
            || after.starts_with("\r\n")
            || after.starts_with('\r');
        if at_line_end {
            let yaml = &rest[..idx];
            let mut body = after;
            if let Some(b) = body.strip_prefix("\r\n") {
                body = b;
            } else if let Some(b) = body.strip_prefix('\n') {
                body = b;
            }
            return Some((yaml, body));
        }
        search_from = idx + 1;
    }
}

/// Reads the `tags` field out of a front-matter block. A scalar string
/// yields a single tag; a sequence yields its string members.
fn front_matter_tags(yaml: &str) -> Result<Vec<String>, serde_yaml::Error> {
    let value: Value = serde_yaml::from_str(yaml)?;
    let tags = match value.get("tags") {
        Some(Value::String(s)) => vec![s.clone()],
        Some(Value::Sequence(seq)) => seq
            .iter()
            .filter_map(|item| match item {
                Value::String(s) => Some(s.clone()),
                Value::Number(n) => Some(n.to_string()),
                _ => None,
            })
            .collect(),
        _ => Vec::new(),
    };
    Ok(tags)
}

/// True for characters that may appear inside a hashtag body: ASCII word
/// characters, the Latin-1 supplement, Hangul syllables, and hyphen.
fn is_hashtag_char(c: char) -> bool {
    c.is_ascii_alphanumeric()
        || c == '_'
        || c == '-'
        || ('\u{00C0}'..='\u{00FF}').contains(&c)
        || ('\u{AC00}'..='\u{D7A3}').contains(&c)
}

/// Scans raw body text for `#tag` tokens.
fn scan_body_hashtags(body: &str) -> Vec<String> {
    let mut tags = Vec::new();
    let mut chars = body.chars().peekable();
    while let Some(c) = chars.next() {
        if c != '#' {
            continue;
        }
        let mut tag = String::new();
        while let Some(&next) = chars.peek() {
            if is_hashtag_char(next) {
                tag.push(next);
                chars.next();
            } else {
                break;
            }
        }
        if !tag.is_empty() {
            tags.push(tag);
        }
    }
    tags
}

fn dedup_preserving_order(tags: Vec<String>) -> Vec<String> {
    let mut seen = std::collections::HashSet::new();
    tags.into_iter().filter(|t| seen.insert(t.clone())).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_front_matter_tag_list() {
        let content = "---\ntags:\n  - work\n  - planning\n---\n\nBody text.";
        assert_eq!(extract_hashtags(content), vec!["work", "planning"]);
    }

    #[test]
    fn test_front_matter_tag_string() {
        let content = "---\ntags: journal\n---\n\nBody text.";
        assert_eq!(extract_hashtags(content), vec!["journal"]);
    }

    #[test]
    fn test_body_scan_when_no_front_matter() {
        let content = "hello #work and #TODO and #work again";
        assert_eq!(extract_hashtags(content), vec!["work", "TODO"]);
    }

    #[test]
    fn test_case_preserved_as_scanned() {
        // Tags keep their authored case; nothing here lowercases.
        let content = "hello #work #TODO";
        assert_eq!(extract_hashtags(content), vec!["work", "TODO"]);
    }

    #[test]
    fn test_front_matter_tags_suppress_body_scan() {
        let content = "---\ntags:\n  - official\n---\n\nBody with #ignored tag.";
        assert_eq!(extract_hashtags(content), vec!["official"]);
    }

    #[test]
    fn test_empty_front_matter_tags_fall_back_to_body() {
        let content = "---\ntitle: something\n---\n\nBody with #found tag.";
        assert_eq!(extract_hashtags(content), vec!["found"]);
    }

    #[test]
    fn test_malformed_front_matter_scans_whole_content() {
        // Unparseable YAML: the broken block is part of the scan input.
        let content = "---\ntags: [unclosed\n---\n\n#body-tag here";
        assert_eq!(extract_hashtags(content), vec!["body-tag"]);
    }

    #[test]
    fn test_unicode_hashtags() {
        let content = "Notes about #café and #한국어 and #mixed-tag_1";
        assert_eq!(
            extract_hashtags(content),
            vec!["café", "한국어", "mixed-tag_1"]
        );
    }

    #[test]
    fn test_bare_hash_is_not_a_tag() {
        assert!(extract_hashtags("# Heading\n\nplain text").is_empty());
    }

    #[test]
    fn test_never_panics_on_odd_content() {
        extract_hashtags("");
        extract_hashtags("---");
        extract_hashtags("---\n");
        extract_hashtags("---\n---");
        extract_hashtags("---\ntags:\n");
        extract_hashtags("\u{0000}\u{FFFF}#");
    }
}
