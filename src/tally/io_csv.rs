// Primitives for reading CSV files.

use std::fs::File;

use crate::tally::{
    io_common::{make_default_id, parse_votes},
    *,
};

pub fn read_csv_submissions(
    path: &str,
    cfs: &FileSource,
) -> BDhondtResult<Vec<ParsedSubmission>> {
    let default_id = make_default_id(path);

    let id_idx_o = cfs.id_column_index()?;
    let name_idx = cfs.name_column_index()?;
    let votes_idx = cfs.votes_column_index()?;

    let mut res: Vec<ParsedSubmission> = Vec::new();
    let (records, row_offset) = get_records(path, cfs)?;

    for (idx, line_r) in records.enumerate() {
        // Line numbers start at 1 to match what spreadsheets show.
        let lineno = idx + row_offset + 1;
        let line = line_r.context(CsvLineParseSnafu {})?;
        debug!("read_csv_submissions: {:?} {:?}", lineno, line);
        if line.iter().all(|s| s.trim().is_empty()) {
            continue;
        }

        let id = if let Some(id_idx) = id_idx_o {
            line.get(id_idx)
                .context(CsvLineTooShortSnafu { lineno })?
                .to_string()
        } else {
            default_id(lineno)
        };
        let name = line
            .get(name_idx)
            .context(CsvLineTooShortSnafu { lineno })?
            .to_string();
        let votes_s = line.get(votes_idx).context(CsvLineTooShortSnafu { lineno })?;
        let votes = parse_votes(votes_s, lineno)?;

        res.push(ParsedSubmission { id, name, votes });
    }
    Ok(res)
}

fn get_records(
    path: &str,
    cfs: &FileSource,
) -> DhondtResult<(csv::StringRecordsIntoIter<File>, usize)> {
    let first_row = cfs.first_vote_row_index()?;
    let rdr = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_path(path)
        .context(CsvOpenSnafu {})?;
    let mut records = rdr.into_records();
    for _ in 0..first_row {
        if let Some(header) = records.next() {
            header.context(CsvLineParseSnafu {})?;
        }
    }
    Ok((records, first_row))
}
