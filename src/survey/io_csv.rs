// Primitives for reading and writing CSV files.

use crate::survey::{
    io_common::{header_name, make_default_id_lineno},
    *,
};

/// Reads a CSV file whose first line is the header.
///
/// Short lines are padded with missing answers. Extra fields beyond the header are dropped.
/// Lines without any answer, such as `,,`, are skipped.
pub fn read_csv_file(path: &str) -> SurveyResult<ParsedFile> {
    let default_id = make_default_id_lineno(path);
    let rdr = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_path(path)
        .context(CsvOpenSnafu { path })?;
    let mut records = rdr.into_records();

    let header: Vec<String> = match records.next() {
        Some(line_r) => {
            let line = line_r.context(CsvLineParseSnafu { path, lineno: 1_usize })?;
            line.iter()
                .enumerate()
                .map(|(idx, s)| header_name(idx, Some(s.to_string())))
                .collect()
        }
        None => Vec::new(),
    };
    debug!("read_csv_file: header: {:?}", header);

    let mut respondents: Vec<ParsedRespondent> = Vec::new();
    for (idx, line_r) in records.enumerate() {
        // The header is on line 1. Blank lines are skipped by the reader.
        let line = line_r.context(CsvLineParseSnafu {
            path,
            lineno: idx + 2,
        })?;
        let lineno = line
            .position()
            .map(|p| p.line() as usize)
            .unwrap_or(idx + 2);
        if line.len() > header.len() {
            warn!(
                "read_csv_file: {:?} line {:?}: {:?} fields, only the first {:?} are kept",
                path,
                lineno,
                line.len(),
                header.len()
            );
        }
        let answers: Vec<Answer> = (0..header.len())
            .map(|i| line.get(i).map(Answer::from_text).unwrap_or(Answer::Missing))
            .collect();
        if answers.iter().all(|a| a.is_missing()) {
            debug!("read_csv_file: skipping blank line {:?}", lineno);
            continue;
        }
        respondents.push(ParsedRespondent {
            id: default_id(lineno),
            answers,
        });
    }

    Ok(ParsedFile {
        path: path.to_string(),
        header,
        respondents,
    })
}

/// Writes the respondents of a subset, with all the columns of the table.
pub fn write_subset_csv(path: &str, subset: &Subset) -> SurveyResult<()> {
    let mut wtr = csv::Writer::from_path(path).context(CsvWriteSnafu { path })?;
    wtr.write_record(subset.table().columns())
        .context(CsvWriteSnafu { path })?;
    for r in subset.rows() {
        let cells: Vec<String> = r
            .answers
            .iter()
            .map(|a| a.key().unwrap_or_default())
            .collect();
        wtr.write_record(&cells).context(CsvWriteSnafu { path })?;
    }
    wtr.flush()
        .map_err(csv::Error::from)
        .context(CsvWriteSnafu { path })?;
    debug!("write_subset_csv: {:?} rows written to {:?}", subset.len(), path);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn reads_ragged_lines() {
        let dir = TempDir::new().unwrap();
        let p = dir.path().join("ragged.csv");
        fs::write(&p, "Country,Lang,\nUSA,Python;Go\n  ,Rust,extra,more\n").unwrap();
        let parsed = read_csv_file(p.to_str().unwrap()).unwrap();
        assert_eq!(
            parsed.header,
            vec!["Country".to_string(), "Lang".to_string(), "Unnamed: 2".to_string()]
        );
        assert_eq!(parsed.respondents.len(), 2);
        assert_eq!(parsed.respondents[0].id, "ragged.csv-00000002");
        assert_eq!(
            parsed.respondents[0].answers,
            vec![
                Answer::Text("USA".to_string()),
                Answer::Text("Python;Go".to_string()),
                Answer::Missing
            ]
        );
        assert_eq!(
            parsed.respondents[1].answers,
            vec![
                Answer::Missing,
                Answer::Text("Rust".to_string()),
                Answer::Text("extra".to_string())
            ]
        );
    }

    #[test]
    fn skips_blank_lines() {
        let dir = TempDir::new().unwrap();
        let p = dir.path().join("blank.csv");
        fs::write(&p, "Country,Age\nUSA,25\n,\n , \n\nUK,30\n").unwrap();
        let parsed = read_csv_file(p.to_str().unwrap()).unwrap();
        assert_eq!(parsed.respondents.len(), 2);
        assert_eq!(parsed.respondents[0].id, "blank.csv-00000002");
        // Ids keep the line number in the file.
        assert_eq!(parsed.respondents[1].id, "blank.csv-00000006");
    }

    #[test]
    fn header_only() {
        let dir = TempDir::new().unwrap();
        let p = dir.path().join("empty.csv");
        fs::write(&p, "A,B\n").unwrap();
        let parsed = read_csv_file(p.to_str().unwrap()).unwrap();
        assert_eq!(parsed.header.len(), 2);
        assert!(parsed.respondents.is_empty());
    }

    #[test]
    fn writes_subset() {
        let dir = TempDir::new().unwrap();
        let p = dir.path().join("in.csv");
        fs::write(&p, "Country,Age\nUSA,25\nIndia,\nUSA,40\n").unwrap();
        let survey = load_survey(&[p.display().to_string()], &AnalyzerConfig::default(), None)
            .unwrap();
        let subset = survey
            .create_subset("Country", &["USA".to_string()])
            .unwrap();
        let out = dir.path().join("out.csv");
        write_subset_csv(out.to_str().unwrap(), &subset).unwrap();
        let written = fs::read_to_string(&out).unwrap();
        assert_eq!(written, "Country,Age\nUSA,25\nUSA,40\n");
    }
}
