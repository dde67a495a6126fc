//! Robots.txt parser implementation
//!
//! Rule evaluation is delegated to the robotstxt crate, which follows the standard
//! exclusion semantics: the longest matching rule wins and a URL with no matching rule
//! is allowed.

use robotstxt::DefaultMatcher;

/// Directives recognised when deciding whether a document is a robots.txt at all
const KNOWN_DIRECTIVES: &[&str] = &[
    "user-agent",
    "allow",
    "disallow",
    "sitemap",
    "crawl-delay",
    "host",
    "noindex",
];

/// Parsed robots.txt data
#[derive(Debug, Clone)]
pub struct ParsedRobots {
    /// Raw robots.txt content (empty string means allow all)
    content: String,
}

impl ParsedRobots {
    fn from_content(content: &str) -> Self {
        Self {
            content: content.to_string(),
        }
    }

    /// Parses robots.txt content, rejecting documents that are not robots.txt
    ///
    /// An empty document (or one holding only comments) is a valid allow-all file.
    /// A document with content lines but no recognised directive, such as an HTML
    /// error page served with status 200, is rejected.
    ///
    /// # Returns
    ///
    /// * `Some(ParsedRobots)` - The content is a usable robots.txt
    /// * `None` - The content cannot be interpreted as robots.txt
    pub fn parse(content: &str) -> Option<Self> {
        let mut saw_content = false;

        for line in content.lines() {
            let line = match line.split_once('#') {
                Some((before, _)) => before,
                None => line,
            }
            .trim();

            if line.is_empty() {
                continue;
            }
            saw_content = true;

            if let Some((key, _)) = line.split_once(':') {
                let key = key.trim().to_lowercase();
                if KNOWN_DIRECTIVES.contains(&key.as_str()) {
                    return Some(Self::from_content(content));
                }
            }
        }

        if saw_content {
            None
        } else {
            Some(Self::from_content(content))
        }
    }

    /// Creates a permissive ParsedRobots that allows everything
    pub fn allow_all() -> Self {
        Self {
            content: String::new(),
        }
    }

    /// Checks if a URL is allowed for the given user agent
    ///
    /// # Arguments
    ///
    /// * `url` - The absolute URL (or path) to check
    /// * `user_agent` - The agent identity to match against `User-agent` groups
    pub fn is_allowed(&self, url: &str, user_agent: &str) -> bool {
        if self.content.is_empty() {
            return true;
        }

        let mut matcher = DefaultMatcher::default();
        matcher.one_agent_allowed_by_robots(&self.content, user_agent, url)
    }
}
