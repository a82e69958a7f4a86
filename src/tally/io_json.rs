use serde::Deserialize;

use crate::tally::{io_common::make_default_id, *};

#[derive(Eq, PartialEq, Debug, Clone, Deserialize)]
struct JsonSubmission {
    id: Option<String>,
    name: String,
    votes: i64,
}

#[derive(Eq, PartialEq, Debug, Clone, Deserialize)]
#[serde(untagged)]
enum SubmissionFile {
    Plain(Vec<JsonSubmission>),
    Wrapped { lists: Vec<JsonSubmission> },
}

pub fn read_json_submissions(path: &str) -> BDhondtResult<Vec<ParsedSubmission>> {
    let default_id = make_default_id(path);
    let contents = fs::read_to_string(path).context(OpeningJsonSnafu { path })?;
    let file: SubmissionFile =
        serde_json::from_str(contents.as_str()).context(ParsingJsonSnafu {})?;
    let submissions = match file {
        SubmissionFile::Plain(l) => l,
        SubmissionFile::Wrapped { lists } => lists,
    };
    debug!("read_json_submissions: {} submissions", submissions.len());
    Ok(submissions
        .into_iter()
        .enumerate()
        .map(|(idx, s)| ParsedSubmission {
            id: s.id.unwrap_or_else(|| default_id(idx + 1)),
            name: s.name,
            votes: s.votes,
        })
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn read(content: &str) -> BDhondtResult<Vec<ParsedSubmission>> {
        let mut f = tempfile::NamedTempFile::new().unwrap();
        f.write_all(content.as_bytes()).unwrap();
        read_json_submissions(&f.path().display().to_string())
    }

    #[test]
    fn plain_and_wrapped() {
        let plain = read(
            r#"[{"name": "Lista A", "votes": 10, "id": "s1"}, {"name": "Lista B", "votes": 3}]"#,
        )
        .unwrap();
        assert_eq!(plain[0].id, "s1");
        assert!(plain[1].id.ends_with("-00000002"));
        assert_eq!(plain[1].votes, 3);

        let wrapped = read(r#"{"lists": [{"name": "Lista A", "votes": -4}]}"#).unwrap();
        assert_eq!(wrapped.len(), 1);
        assert_eq!(wrapped[0].votes, -4);
    }

    #[test]
    fn malformed() {
        assert!(matches!(
            read(r#"[{"name": "Lista A", "votes": "ten"}]"#).map_err(|e| *e),
            Err(DhondtError::ParsingJson { .. })
        ));
    }
}
