use calamine::{open_workbook, DataType, Range, Reader, Xlsx};

use crate::tally::{
    io_common::{make_default_id, parse_votes},
    *,
};

pub fn read_excel_submissions(
    path: &str,
    cfs: &FileSource,
) -> BDhondtResult<Vec<ParsedSubmission>> {
    let default_id = make_default_id(path);

    let wrange = get_range(path, cfs)?;

    let id_idx_o = cfs.id_column_index()?;
    let name_idx = cfs.name_column_index()?;
    let votes_idx = cfs.votes_column_index()?;
    let first_row = cfs.first_vote_row_index()?;

    // Ranges start at the first non-empty cell of the sheet.
    let (start_row, start_col) = wrange.start().unwrap_or((0, 0));
    let start_row = start_row as usize;
    let start_col = start_col as usize;

    let mut res: Vec<ParsedSubmission> = Vec::new();
    for (idx, row) in wrange.rows().enumerate() {
        let row_idx = idx + start_row;
        let lineno = row_idx + 1;
        if row_idx < first_row {
            continue;
        }
        debug!("read_excel_submissions: lineno: {:?} row: {:?}", lineno, row);
        if row.iter().all(|c| matches!(c, DataType::Empty)) {
            continue;
        }
        let cell = |col: usize| col.checked_sub(start_col).and_then(|c| row.get(c));

        let id = match id_idx_o.and_then(|i| cell(i)) {
            Some(c) => read_text(c, lineno)?,
            None => default_id(lineno),
        };
        let name = match cell(name_idx) {
            Some(c) => read_text(c, lineno)?,
            None => String::new(),
        };
        let votes = match cell(votes_idx) {
            Some(c) => read_votes(c, lineno)?,
            None => {
                return Err(Box::new(DhondtError::ExcelWrongCellType {
                    lineno,
                    content: format!("{:?}", row),
                }))
            }
        };
        res.push(ParsedSubmission { id, name, votes });
    }
    Ok(res)
}

fn get_range(path: &str, cfs: &FileSource) -> DhondtResult<Range<DataType>> {
    let mut workbook: Xlsx<_> = open_workbook(path).context(OpeningExcelSnafu { path })?;
    let wrange_o = match cfs.excel_worksheet_name.as_deref() {
        Some(name) => workbook.worksheet_range(name),
        None => workbook.worksheet_range_at(0),
    };
    wrange_o
        .context(EmptyExcelSnafu { path })?
        .context(OpeningExcelSnafu { path })
}

fn read_text(cell: &DataType, lineno: usize) -> DhondtResult<String> {
    match cell {
        DataType::String(s) => Ok(s.clone()),
        DataType::Int(i) => Ok(i.to_string()),
        DataType::Float(f) if f.fract() == 0.0 && f.abs() < i64::MAX as f64 => {
            Ok((*f as i64).to_string())
        }
        DataType::Empty => Ok(String::new()),
        _ => ExcelWrongCellTypeSnafu {
            lineno,
            content: format!("{:?}", cell),
        }
        .fail(),
    }
}

fn read_votes(cell: &DataType, lineno: usize) -> DhondtResult<i64> {
    match cell {
        DataType::Int(i) => Ok(*i),
        // Excel stores most numbers as floats.
        DataType::Float(f) if f.fract() == 0.0 && f.abs() < i64::MAX as f64 => Ok(*f as i64),
        DataType::String(s) => parse_votes(s, lineno),
        _ => ExcelWrongCellTypeSnafu {
            lineno,
            content: format!("{:?}", cell),
        }
        .fail(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn vote_cells() {
        assert_eq!(read_votes(&DataType::Int(12), 1).unwrap(), 12);
        assert_eq!(read_votes(&DataType::Float(1200.0), 1).unwrap(), 1200);
        assert_eq!(read_votes(&DataType::String("7".to_string()), 1).unwrap(), 7);
        assert!(matches!(
            read_votes(&DataType::Float(1.5), 4),
            Err(DhondtError::ExcelWrongCellType { lineno: 4, .. })
        ));
        assert!(read_votes(&DataType::Empty, 4).is_err());
    }

    #[test]
    fn text_cells() {
        assert_eq!(
            read_text(&DataType::String("Lista A".to_string()), 1).unwrap(),
            "Lista A"
        );
        assert_eq!(read_text(&DataType::Empty, 1).unwrap(), "");
        assert_eq!(read_text(&DataType::Float(17.0), 1).unwrap(), "17");
        assert!(read_text(&DataType::Float(1.5), 1).is_err());
        assert!(read_text(&DataType::Bool(true), 1).is_err());
    }

    #[test]
    fn reads_named_worksheet_with_offsets() {
        let path = format!(
            "{}/tests/data/excel/votes.xlsx",
            env!("CARGO_MANIFEST_DIR")
        );
        let cfs: FileSource = serde_json::from_value(serde_json::json!({
            "provider": "xlsx",
            "filePath": path,
            "excelWorksheetName": "Votos",
            "idColumnIndex": "B",
            "nameColumnIndex": "C",
            "votesColumnIndex": "D",
            "firstVoteRowIndex": 3,
        }))
        .unwrap();
        let res = read_excel_submissions(&path, &cfs).unwrap();
        let rows: Vec<(&str, &str, i64)> = res
            .iter()
            .map(|s| (s.id.as_str(), s.name.as_str(), s.votes))
            .collect();
        assert_eq!(
            rows,
            vec![
                ("1", "Lista A", 600),
                ("2", "Lista B", 300),
                ("3", "Lista A", 100),
                ("4", "Lista C", 50),
            ]
        );
    }

    #[test]
    fn missing_worksheet() {
        let path = format!(
            "{}/tests/data/excel/votes.xlsx",
            env!("CARGO_MANIFEST_DIR")
        );
        let mut cfs = FileSource::new("xlsx".to_string(), path.clone());
        cfs.excel_worksheet_name = Some("Resultados".to_string());
        assert!(matches!(
            read_excel_submissions(&path, &cfs).map_err(|e| *e),
            Err(DhondtError::EmptyExcel { .. })
        ));
    }

    #[test]
    fn missing_file() {
        let res = read_excel_submissions(
            "/nonexistent/votes.xlsx",
            &FileSource::new("xlsx".to_string(), "votes.xlsx".to_string()),
        );
        assert!(matches!(
            res.map_err(|e| *e),
            Err(DhondtError::OpeningExcel { .. })
        ));
    }
}
