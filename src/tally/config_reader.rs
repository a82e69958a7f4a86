use crate::tally::*;

use serde::{Deserialize, Serialize};
use serde_json::Value as JSValue;

#[derive(Eq, PartialEq, Debug, Clone, Serialize, Deserialize)]
pub struct OutputSettings {
    #[serde(rename = "contestName")]
    pub contest_name: String,
    #[serde(rename = "outputDirectory")]
    pub output_directory: Option<String>,
    #[serde(rename = "contestDate")]
    pub contest_date: Option<String>,
    #[serde(rename = "contestJurisdiction")]
    pub contest_jurisdiction: Option<String>,
    #[serde(rename = "contestOffice")]
    pub contest_office: Option<String>,
}

#[derive(PartialEq, Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OutputConfig {
    pub contest: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub date: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub jurisdiction: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub office: Option<String>,
    pub total_seats: u32,
    pub threshold_percent: f64,
    pub threshold_votes: String,
    pub total_votes: u64,
    pub total_submissions: usize,
    pub outcome: String,
}

#[derive(Eq, PartialEq, Debug, Clone, Serialize, Deserialize)]
pub struct FileSource {
    pub provider: String,
    #[serde(rename = "filePath")]
    pub file_path: String,
    #[serde(rename = "nameColumnIndex")]
    _name_column_index: Option<JSValue>,
    #[serde(rename = "votesColumnIndex")]
    _votes_column_index: Option<JSValue>,
    #[serde(rename = "idColumnIndex")]
    _id_column_index: Option<JSValue>,
    #[serde(rename = "firstVoteRowIndex")]
    _first_vote_row_index: Option<JSValue>,
    #[serde(rename = "excelWorksheetName")]
    pub excel_worksheet_name: Option<String>,
}

impl FileSource {
    /// A source with the default layout: names in the first column, votes in the second
    /// one, and a header row.
    pub fn new(provider: String, file_path: String) -> FileSource {
        FileSource {
            provider,
            file_path,
            _name_column_index: None,
            _votes_column_index: None,
            _id_column_index: None,
            _first_vote_row_index: None,
            excel_worksheet_name: None,
        }
    }

    // All the indexes below are returned 0-based.

    pub fn name_column_index(&self) -> DhondtResult<usize> {
        Ok(read_js_index(&self._name_column_index)?.unwrap_or(1) - 1)
    }

    pub fn votes_column_index(&self) -> DhondtResult<usize> {
        Ok(read_js_index(&self._votes_column_index)?.unwrap_or(2) - 1)
    }

    pub fn id_column_index(&self) -> DhondtResult<Option<usize>> {
        Ok(read_js_index(&self._id_column_index)?.map(|x| x - 1))
    }

    pub fn first_vote_row_index(&self) -> DhondtResult<usize> {
        Ok(read_js_index(&self._first_vote_row_index)?.unwrap_or(2) - 1)
    }
}

#[derive(Eq, PartialEq, Debug, Clone, Serialize, Deserialize)]
pub struct ListEntry {
    pub name: String,
}

#[derive(PartialEq, Debug, Clone, Serialize, Deserialize)]
pub struct RulesConfig {
    #[serde(rename = "totalSeats")]
    pub total_seats: Option<i64>,
    #[serde(rename = "thresholdPercent")]
    pub threshold_percent: Option<f64>,
    #[serde(rename = "rulesDescription")]
    pub rules_description: Option<String>,
}

#[derive(PartialEq, Debug, Clone, Serialize, Deserialize)]
pub struct AllocationConfig {
    #[serde(rename = "outputSettings")]
    pub output_settings: OutputSettings,
    #[serde(rename = "submissionSources", default)]
    pub submission_sources: Vec<FileSource>,
    pub lists: Option<Vec<ListEntry>>,
    pub rules: RulesConfig,
}

pub fn read_summary(path: &str) -> BDhondtResult<JSValue> {
    let contents = fs::read_to_string(path).context(OpeningJsonSnafu { path })?;
    let js: JSValue = serde_json::from_str(contents.as_str()).context(ParsingJsonSnafu {})?;
    Ok(js)
}

// Reads a 1-based index: a number, a string with a number, or Excel-style column letters.
fn read_js_index(x: &Option<JSValue>) -> DhondtResult<Option<usize>> {
    let idx = match x {
        None | Some(JSValue::Null) => return Ok(None),
        Some(JSValue::Number(n)) => n.as_u64().map(|x| x as usize),
        Some(JSValue::String(s)) if !s.is_empty() && s.chars().all(|c| c.is_ascii_alphabetic()) => {
            Some(column_letters_to_index(s))
        }
        Some(JSValue::String(s)) => s.trim().parse::<usize>().ok(),
        _ => None,
    };
    match idx {
        Some(i) if i >= 1 => Ok(Some(i)),
        _ => ParsingJsonNumberSnafu {
            content: format!("{:?}", x),
        }
        .fail(),
    }
}

// "A" -> 1, "Z" -> 26, "AA" -> 27
fn column_letters_to_index(s: &str) -> usize {
    s.to_ascii_uppercase()
        .chars()
        .fold(0usize, |acc, c| {
            acc.saturating_mul(26)
                .saturating_add(c as usize - 'A' as usize + 1)
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn source(js: JSValue) -> FileSource {
        serde_json::from_value(js).unwrap()
    }

    #[test]
    fn default_layout() {
        let fs = FileSource::new("csv".to_string(), "votes.csv".to_string());
        assert_eq!(fs.name_column_index().unwrap(), 0);
        assert_eq!(fs.votes_column_index().unwrap(), 1);
        assert_eq!(fs.id_column_index().unwrap(), None);
        assert_eq!(fs.first_vote_row_index().unwrap(), 1);
    }

    #[test]
    fn indexes() {
        let fs = source(json!({
            "provider": "xlsx",
            "filePath": "votes.xlsx",
            "nameColumnIndex": "B",
            "votesColumnIndex": "4",
            "idColumnIndex": 1,
            "firstVoteRowIndex": "AA",
        }));
        assert_eq!(fs.name_column_index().unwrap(), 1);
        assert_eq!(fs.votes_column_index().unwrap(), 3);
        assert_eq!(fs.id_column_index().unwrap(), Some(0));
        assert_eq!(fs.first_vote_row_index().unwrap(), 26);
    }

    #[test]
    fn invalid_indexes() {
        for bad in [json!(0), json!("x1"), json!(-2), json!(true)] {
            let fs = source(json!({
                "provider": "csv",
                "filePath": "v.csv",
                "votesColumnIndex": bad,
            }));
            assert!(fs.votes_column_index().is_err());
        }
    }

    #[test]
    fn full_config() {
        let config: AllocationConfig = serde_json::from_value(json!({
            "outputSettings": {"contestName": "test"},
            "submissionSources": [{"provider": "csv", "filePath": "votes.csv"}],
            "lists": [{"name": "Lista A"}, {"name": "Lista B"}],
            "rules": {"totalSeats": 5, "thresholdPercent": 5.0}
        }))
        .unwrap();
        assert_eq!(config.rules.total_seats, Some(5));
        assert_eq!(config.rules.threshold_percent, Some(5.0));
        assert_eq!(config.lists.map(|l| l.len()), Some(2));
        assert_eq!(config.submission_sources.len(), 1);
    }
}
