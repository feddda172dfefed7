use lazy_static::lazy_static;
use regex::Regex;

use crate::error::ShellError;

lazy_static! {
    static ref NON_WORD: Regex = Regex::new(r"[^\p{Alphabetic}\p{Nd}\s]").unwrap();
    static ref WHITESPACE: Regex = Regex::new(r"\s+").unwrap();
}

/// Deepest addressable path: show/season/episode
const MAX_SEGMENTS: usize = 3;

const PATH_USAGE: &str =
    "Invalid path format. Use: <show>, <show>/<season> or <show>/<season>/<episode>";

/// Argument of `cd` and `play`
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Address {
    /// `..`
    Up,
    /// A bare number; its meaning depends on the current location
    Index(u32),
    /// A title
    Name(String),
    /// `show/season` or `show/season/episode`
    Path(Vec<String>),
}

impl Address {
    /// Parse a command argument. An empty argument is `None`.
    pub fn parse(argument: &str) -> Result<Option<Address>, ShellError> {
        let argument = argument.trim();
        if argument.is_empty() {
            return Ok(None);
        }
        if argument == ".." {
            return Ok(Some(Address::Up));
        }

        let segments: Vec<String> = argument.split('/').map(|s| s.trim().to_string()).collect();
        if segments.len() > MAX_SEGMENTS || segments.iter().any(|s| s.is_empty()) {
            return Err(ShellError::usage(PATH_USAGE));
        }

        if segments.len() > 1 {
            return Ok(Some(Address::Path(segments)));
        }

        if !argument.chars().all(|c| c.is_ascii_digit()) {
            return Ok(Some(Address::Name(argument.to_string())));
        }

        // Too large to name any result, season or episode
        argument
            .parse::<u32>()
            .map(|index| Some(Address::Index(index)))
            .map_err(|_| ShellError::not_found(format!("Invalid index: {}", argument)))
    }
}

/// Season or episode number inside a path
pub fn path_number(segment: &str) -> Result<u32, ShellError> {
    segment
        .parse()
        .map_err(|_| ShellError::usage(format!("'{}' is not a season or episode number.", segment)))
}

/// Comparison form of a title: lower case, punctuation dropped, single spaces
pub fn normalize_title(title: &str) -> String {
    let lowered = title.to_lowercase();
    let stripped = NON_WORD.replace_all(&lowered, "");
    WHITESPACE.replace_all(&stripped, " ").trim().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_empty_and_up() {
        assert_eq!(Address::parse("").unwrap(), None);
        assert_eq!(Address::parse("   ").unwrap(), None);
        assert_eq!(Address::parse("..").unwrap(), Some(Address::Up));
    }

    #[test]
    fn test_parse_single_segment() {
        assert_eq!(Address::parse("3").unwrap(), Some(Address::Index(3)));
        assert_eq!(
            Address::parse("Breaking Bad").unwrap(),
            Some(Address::Name("Breaking Bad".to_string()))
        );
    }

    #[test]
    fn test_parse_oversized_index() {
        assert_eq!(
            Address::parse("4294967298"),
            Err(ShellError::not_found("Invalid index: 4294967298"))
        );
        assert_eq!(Address::parse("007").unwrap(), Some(Address::Index(7)));
        assert_eq!(
            Address::parse("24601b").unwrap(),
            Some(Address::Name("24601b".to_string()))
        );
    }

    #[test]
    fn test_parse_paths() {
        assert_eq!(
            Address::parse("Breaking Bad/2").unwrap(),
            Some(Address::Path(vec!["Breaking Bad".into(), "2".into()]))
        );
        assert_eq!(
            Address::parse("breaking bad / 2 / 5").unwrap(),
            Some(Address::Path(vec![
                "breaking bad".into(),
                "2".into(),
                "5".into()
            ]))
        );
    }

    #[test]
    fn test_parse_rejects_bad_paths() {
        assert!(matches!(
            Address::parse("a/1/2/3"),
            Err(ShellError::Usage(_))
        ));
        assert!(matches!(Address::parse("a//2"), Err(ShellError::Usage(_))));
    }

    #[test]
    fn test_path_number() {
        assert_eq!(path_number("4").unwrap(), 4);
        assert!(path_number("four").is_err());
    }

    #[test]
    fn test_normalize_title() {
        assert_eq!(normalize_title("Mr. Robot"), "mr robot");
        assert_eq!(normalize_title("  Breaking   Bad "), "breaking bad");
        assert_eq!(normalize_title("Grey's Anatomy"), "greys anatomy");
        assert_eq!(normalize_title("Spider-Man: No Way Home"), "spiderman no way home");
        assert_eq!(normalize_title("Amélie"), "amélie");
    }
}
