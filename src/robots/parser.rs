//! Robots.txt parser implementation
//!
//! Allow/disallow matching is delegated to the robotstxt crate. The group
//! structure is also walked here to expose the disallow patterns and the
//! crawl delay that apply to our user agent.

use robotstxt::DefaultMatcher;
use std::time::Duration;

/// Longest Crawl-delay honored; larger values are clamped
pub const MAX_CRAWL_DELAY: Duration = Duration::from_secs(60);

/// Robots rules for one server, resolved for one user agent
#[derive(Debug, Clone)]
pub struct RobotsRuleSet {
    /// Raw robots.txt content (empty string means allow all)
    content: String,
    /// Product token used for matching
    agent: String,
    /// Disallow patterns from the group that applies to `agent`
    disallow: Vec<String>,
    /// Crawl-delay from the group that applies to `agent`
    crawl_delay: Option<Duration>,
}

/// One `User-agent` group of a robots.txt file
#[derive(Debug, Default)]
struct Group {
    agents: Vec<String>,
    disallow: Vec<String>,
    crawl_delay: Option<Duration>,
}

impl RobotsRuleSet {
    /// Parses raw robots.txt content for the given product token
    pub fn parse(content: &str, agent: &str) -> Self {
        let agent = agent.to_lowercase();
        let groups = parse_groups(content);

        let specific: Vec<&Group> = groups
            .iter()
            .filter(|g| g.agents.iter().any(|a| *a == agent))
            .collect();
        let applicable = if specific.is_empty() {
            groups
                .iter()
                .filter(|g| g.agents.iter().any(|a| a == "*"))
                .collect()
        } else {
            specific
        };

        let disallow = applicable
            .iter()
            .flat_map(|g| g.disallow.iter().cloned())
            .collect();
        let crawl_delay = applicable.iter().find_map(|g| g.crawl_delay);

        Self {
            content: content.to_string(),
            agent,
            disallow,
            crawl_delay,
        }
    }

    /// A permissive rule set, used when robots.txt is missing or unreachable
    pub fn allow_all() -> Self {
        Self {
            content: String::new(),
            agent: String::new(),
            disallow: Vec::new(),
            crawl_delay: None,
        }
    }

    /// Checks whether a full URL may be fetched
    pub fn is_allowed(&self, url: &str) -> bool {
        if self.content.trim().is_empty() {
            return true;
        }

        let mut matcher = DefaultMatcher::default();
        matcher.one_agent_allowed_by_robots(&self.content, &self.agent, url)
    }

    /// Disallow patterns that apply to our agent
    pub fn disallow_patterns(&self) -> &[String] {
        &self.disallow
    }

    /// The Crawl-delay that applies to our agent
    pub fn crawl_delay(&self) -> Option<Duration> {
        self.crawl_delay
    }
}

/// Splits robots.txt content into user-agent groups
///
/// Consecutive `User-agent` lines share a group; the first `User-agent` line
/// after any rule line starts a new one.
fn parse_groups(content: &str) -> Vec<Group> {
    let mut groups = Vec::new();
    let mut current: Option<Group> = None;
    let mut seen_rule = false;

    for line in content.lines() {
        let line = line.split('#').next().unwrap_or_default().trim();
        let Some((key, value)) = line.split_once(':') else {
            continue;
        };
        let value = value.trim();

        match key.trim().to_ascii_lowercase().as_str() {
            "user-agent" => {
                if seen_rule || current.is_none() {
                    groups.extend(current.take());
                    current = Some(Group::default());
                    seen_rule = false;
                }
                if let Some(group) = current.as_mut() {
                    group.agents.push(value.to_lowercase());
                }
            }
            "disallow" => {
                seen_rule = true;
                if let Some(group) = current.as_mut() {
                    if !value.is_empty() {
                        group.disallow.push(value.to_string());
                    }
                }
            }
            "crawl-delay" => {
                seen_rule = true;
                if let Some(group) = current.as_mut() {
                    group.crawl_delay = parse_crawl_delay(value);
                }
            }
            "allow" => seen_rule = true,
            _ => {}
        }
    }

    groups.extend(current);
    groups
}

/// Parses a Crawl-delay value in seconds, clamped to [`MAX_CRAWL_DELAY`]
fn parse_crawl_delay(value: &str) -> Option<Duration> {
    let seconds = value.parse::<f64>().ok()?;
    if !seconds.is_finite() || seconds < 0.0 {
        return None;
    }

    if seconds > MAX_CRAWL_DELAY.as_secs_f64() {
        tracing::warn!(
            "Crawl-delay of {}s exceeds the {:?} maximum; clamping",
            value,
            MAX_CRAWL_DELAY
        );
        return Some(MAX_CRAWL_DELAY);
    }

    Duration::try_from_secs_f64(seconds).ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    const PAGE: &str = "https://example.com";

    fn url(path: &str) -> String {
        format!("{}{}", PAGE, path)
    }

    #[test]
    fn test_allow_all() {
        let robots = RobotsRuleSet::allow_all();
        assert!(robots.is_allowed(&url("/any/path")));
        assert!(robots.is_allowed(&url("/admin")));
        assert_eq!(robots.crawl_delay(), None);
    }

    #[test]
    fn test_parse_disallow_all() {
        let robots = RobotsRuleSet::parse("User-agent: *\nDisallow: /", "TestBot");
        assert!(!robots.is_allowed(&url("/")));
        assert!(!robots.is_allowed(&url("/page")));
    }

    #[test]
    fn test_parse_disallow_specific() {
        let robots = RobotsRuleSet::parse("User-agent: *\nDisallow: /admin", "TestBot");
        assert!(robots.is_allowed(&url("/")));
        assert!(robots.is_allowed(&url("/page")));
        assert!(!robots.is_allowed(&url("/admin")));
        assert!(!robots.is_allowed(&url("/admin/users")));
        assert_eq!(robots.disallow_patterns(), &["/admin".to_string()]);
    }

    #[test]
    fn test_parse_allow_and_disallow() {
        let content = "User-agent: *\nDisallow: /private\nAllow: /private/public";
        let robots = RobotsRuleSet::parse(content, "TestBot");
        assert!(robots.is_allowed(&url("/")));
        assert!(!robots.is_allowed(&url("/private")));
        assert!(robots.is_allowed(&url("/private/public")));
    }

    #[test]
    fn test_specific_user_agent_group() {
        let content = "User-agent: BadBot\nDisallow: /\n\nUser-agent: *\nDisallow: /tmp";
        let good = RobotsRuleSet::parse(content, "GoodBot");
        let bad = RobotsRuleSet::parse(content, "BadBot");

        assert!(good.is_allowed(&url("/page")));
        assert!(!bad.is_allowed(&url("/page")));
        assert_eq!(good.disallow_patterns(), &["/tmp".to_string()]);
        assert_eq!(bad.disallow_patterns(), &["/".to_string()]);
    }

    #[test]
    fn test_invalid_robots_txt() {
        let robots = RobotsRuleSet::parse("This is not valid robots.txt {{{", "TestBot");
        assert!(robots.is_allowed(&url("/any/path")));
        assert!(robots.disallow_patterns().is_empty());
    }

    #[test]
    fn test_empty_robots_txt() {
        let robots = RobotsRuleSet::parse("", "TestBot");
        assert!(robots.is_allowed(&url("/any/path")));
    }

    #[test]
    fn test_crawl_delay_wildcard() {
        let robots = RobotsRuleSet::parse("User-agent: *\nCrawl-delay: 10\nDisallow: /admin", "AnyBot");
        assert_eq!(robots.crawl_delay(), Some(Duration::from_secs(10)));
    }

    #[test]
    fn test_crawl_delay_specific_agent_preferred() {
        let content = "User-agent: TestBot\nCrawl-delay: 5\n\nUser-agent: *\nCrawl-delay: 10";
        assert_eq!(
            RobotsRuleSet::parse(content, "TestBot").crawl_delay(),
            Some(Duration::from_secs(5))
        );
        assert_eq!(
            RobotsRuleSet::parse(content, "OtherBot").crawl_delay(),
            Some(Duration::from_secs(10))
        );
    }

    #[test]
    fn test_crawl_delay_decimal_and_case() {
        let robots = RobotsRuleSet::parse("user-agent: testbot\ncrawl-delay: 2.5", "TESTBOT");
        assert_eq!(robots.crawl_delay(), Some(Duration::from_millis(2500)));
    }

    #[test]
    fn test_crawl_delay_invalid_ignored() {
        let robots = RobotsRuleSet::parse("User-agent: *\nCrawl-delay: soon", "TestBot");
        assert_eq!(robots.crawl_delay(), None);

        let robots = RobotsRuleSet::parse("User-agent: *\nCrawl-delay: -3", "TestBot");
        assert_eq!(robots.crawl_delay(), None);
    }

    #[test]
    fn test_crawl_delay_out_of_range_clamped() {
        let robots = RobotsRuleSet::parse("User-agent: *\nCrawl-delay: 1e20", "TestBot");
        assert_eq!(robots.crawl_delay(), Some(MAX_CRAWL_DELAY));

        let robots = RobotsRuleSet::parse("User-agent: *\nCrawl-delay: 3600", "TestBot");
        assert_eq!(robots.crawl_delay(), Some(MAX_CRAWL_DELAY));

        let robots = RobotsRuleSet::parse("User-agent: *\nCrawl-delay: inf", "TestBot");
        assert_eq!(robots.crawl_delay(), None);
    }

    #[test]
    fn test_multiple_user_agents_share_group() {
        let content = "User-agent: BotA\nUser-agent: BotB\nCrawl-delay: 3\n\nUser-agent: BotC\nDisallow: /x";
        assert_eq!(
            RobotsRuleSet::parse(content, "BotA").crawl_delay(),
            Some(Duration::from_secs(3))
        );
        assert_eq!(
            RobotsRuleSet::parse(content, "BotB").crawl_delay(),
            Some(Duration::from_secs(3))
        );
        assert_eq!(RobotsRuleSet::parse(content, "BotC").crawl_delay(), None);
    }

    #[test]
    fn test_comments_stripped() {
        let content = "# comment\nUser-agent: * # everyone\nDisallow: /secret # hidden";
        let robots = RobotsRuleSet::parse(content, "TestBot");
        assert_eq!(robots.disallow_patterns(), &["/secret".to_string()]);
        assert!(!robots.is_allowed(&url("/secret/file")));
    }
}
