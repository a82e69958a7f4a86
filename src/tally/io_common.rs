use std::path::Path;

use crate::tally::*;

pub fn simplify_file_name(path: &str) -> String {
    Path::new(path)
        .file_name()
        .map(|s| s.to_string_lossy().to_string())
        .unwrap_or_else(|| path.to_string())
}

pub fn make_default_id(path: &str) -> impl Fn(usize) -> String {
    let simplified_file_name = simplify_file_name(path);
    move |lineno| format!("{}-{:08}", simplified_file_name, lineno)
}

/// Reads a vote count written as text. Thousands separators are not accepted.
pub fn parse_votes(content: &str, lineno: usize) -> DhondtResult<i64> {
    content
        .trim()
        .parse::<i64>()
        .ok()
        .context(InvalidVoteCountSnafu { lineno, content })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_ids() {
        let f = make_default_id("/data/votes.csv");
        assert_eq!(f(12), "votes.csv-00000012");
    }

    #[test]
    fn votes() {
        assert_eq!(parse_votes(" 1200 ", 3).unwrap(), 1200);
        assert_eq!(parse_votes("-5", 3).unwrap(), -5);
        assert!(matches!(
            parse_votes("1.200", 3),
            Err(DhondtError::InvalidVoteCount { lineno: 3, .. })
        ));
    }
}
