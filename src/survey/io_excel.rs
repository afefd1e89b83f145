use calamine::{open_workbook, DataType, Range, Reader, Xlsx};

use crate::survey::{
    io_common::{header_name, make_default_id_lineno},
    *,
};

/// Reads the first worksheet of an Excel workbook, or the worksheet named in the configuration.
pub fn read_excel_file(path: &str, config: &AnalyzerConfig) -> SurveyResult<ParsedFile> {
    let default_id = make_default_id_lineno(path);
    let wrange = get_range(path, config)?;

    let mut iter = wrange.rows();
    let header_row = iter.next().context(EmptyExcelSnafu { path })?;
    let header: Vec<String> = header_row
        .iter()
        .enumerate()
        .map(|(idx, cell)| header_name(idx, cell_text(cell)))
        .collect();
    debug!("read_excel_file: header: {:?}", header);

    // Row number of the header in the spreadsheet, starting at 1.
    let header_lineno = wrange.start().map(|(row, _)| row as usize).unwrap_or(0) + 1;

    let mut respondents: Vec<ParsedRespondent> = Vec::new();
    for (idx, row) in iter.enumerate() {
        let lineno = header_lineno + idx + 1;
        let answers: Vec<Answer> = row.iter().map(read_cell).collect();
        if answers.iter().all(|a| a.is_missing()) {
            debug!("read_excel_file: skipping blank row {:?}", lineno);
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

fn read_cell(cell: &DataType) -> Answer {
    match cell {
        DataType::String(s) => Answer::from_text(s),
        DataType::Float(f) => Answer::Number(*f),
        DataType::Int(i) => Answer::Number(*i as f64),
        // Dates are kept as Excel serial numbers.
        DataType::DateTime(f) => Answer::Number(*f),
        DataType::Bool(b) => Answer::Text(b.to_string()),
        // Errors and empty cells.
        _ => Answer::Missing,
    }
}

fn cell_text(cell: &DataType) -> Option<String> {
    read_cell(cell).key()
}

fn get_range(path: &str, config: &AnalyzerConfig) -> SurveyResult<Range<DataType>> {
    let worksheet_name_o = config.excel_worksheet_name.clone();
    debug!(
        "read_excel_file: path: {:?} worksheet: {:?}",
        path, &worksheet_name_o
    );
    let mut workbook: Xlsx<_> = open_workbook(path).context(OpeningExcelSnafu { path })?;

    // A worksheet name was provided, use it.
    if let Some(worksheet) = worksheet_name_o {
        let wrange = workbook
            .worksheet_range(&worksheet)
            .context(MissingWorksheetSnafu {
                path,
                worksheet: worksheet.clone(),
            })?
            .context(OpeningExcelSnafu { path })?;
        Ok(wrange)
    } else {
        let sheet_names: Vec<String> = workbook.sheet_names().to_vec();
        if sheet_names.len() > 1 {
            warn!(
                "read_excel_file: {:?} has {:?} worksheets, only the first one ({:?}) is read",
                path,
                sheet_names.len(),
                sheet_names[0]
            );
        }
        let wrange = workbook
            .worksheet_range_at(0)
            .context(EmptyExcelSnafu { path })?
            .context(OpeningExcelSnafu { path })?;
        Ok(wrange)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_xlsxwriter::Workbook;
    use tempfile::TempDir;

    fn write_workbook(path: &str) {
        let mut workbook = Workbook::new();
        {
            let sheet = workbook.add_worksheet();
            sheet.set_name("Responses").unwrap();
            sheet.write_string(0, 0, "Country").unwrap();
            sheet.write_string(0, 1, "Age").unwrap();
            sheet.write_string(0, 2, "Lang").unwrap();
            sheet.write_string(1, 0, "USA").unwrap();
            sheet.write_number(1, 1, 25.0).unwrap();
            sheet.write_string(1, 2, "Python;Go").unwrap();
            sheet.write_string(2, 0, "India").unwrap();
            sheet.write_number(2, 1, 31.5).unwrap();
        }
        {
            let sheet = workbook.add_worksheet();
            sheet.set_name("Notes").unwrap();
            sheet.write_string(0, 0, "Comment").unwrap();
            sheet.write_string(1, 0, "pilot run").unwrap();
        }
        workbook.save(path).unwrap();
    }

    #[test]
    fn reads_first_worksheet() {
        let dir = TempDir::new().unwrap();
        let p = dir.path().join("survey.xlsx").display().to_string();
        write_workbook(&p);
        let parsed = read_excel_file(&p, &AnalyzerConfig::default()).unwrap();
        assert_eq!(
            parsed.header,
            vec!["Country".to_string(), "Age".to_string(), "Lang".to_string()]
        );
        assert_eq!(parsed.respondents.len(), 2);
        assert_eq!(parsed.respondents[0].id, "survey.xlsx-00000002");
        assert_eq!(
            parsed.respondents[0].answers,
            vec![
                Answer::Text("USA".to_string()),
                Answer::Number(25.0),
                Answer::Text("Python;Go".to_string())
            ]
        );
        assert_eq!(parsed.respondents[1].answers[1], Answer::Number(31.5));
        assert_eq!(parsed.respondents[1].answers[2], Answer::Missing);
    }

    #[test]
    fn skips_blank_rows() {
        let dir = TempDir::new().unwrap();
        let p = dir.path().join("gaps.xlsx").display().to_string();
        let mut workbook = Workbook::new();
        {
            let sheet = workbook.add_worksheet();
            sheet.write_string(0, 0, "Country").unwrap();
            sheet.write_string(1, 0, "USA").unwrap();
            sheet.write_string(3, 0, "UK").unwrap();
        }
        workbook.save(&p).unwrap();
        let parsed = read_excel_file(&p, &AnalyzerConfig::default()).unwrap();
        let ids: Vec<&str> = parsed.respondents.iter().map(|r| r.id.as_str()).collect();
        assert_eq!(ids, vec!["gaps.xlsx-00000002", "gaps.xlsx-00000004"]);
    }

    #[test]
    fn reads_named_worksheet() {
        let dir = TempDir::new().unwrap();
        let p = dir.path().join("survey.xlsx").display().to_string();
        write_workbook(&p);
        let config = AnalyzerConfig {
            excel_worksheet_name: Some("Notes".to_string()),
            ..AnalyzerConfig::default()
        };
        let parsed = read_excel_file(&p, &config).unwrap();
        assert_eq!(parsed.header, vec!["Comment".to_string()]);
        assert_eq!(
            parsed.respondents[0].answers,
            vec![Answer::Text("pilot run".to_string())]
        );

        let config = AnalyzerConfig {
            excel_worksheet_name: Some("Missing".to_string()),
            ..AnalyzerConfig::default()
        };
        let err = read_excel_file(&p, &config).unwrap_err();
        assert!(matches!(err, SurveyError::MissingWorksheet { .. }));
        assert!(err.is_load_error());
    }

    #[test]
    fn excel_and_csv_files_concatenate() {
        let dir = TempDir::new().unwrap();
        let xlsx = dir.path().join("part1.xlsx").display().to_string();
        write_workbook(&xlsx);
        let csv_path = dir.path().join("part2.csv");
        fs::write(&csv_path, "Lang,Age,Country\nRust,25,UK\n").unwrap();
        let survey = load_survey(
            &[xlsx, csv_path.display().to_string()],
            &AnalyzerConfig::default(),
            None,
        )
        .unwrap();
        assert_eq!(survey.respondent_count(), 3);
        let age = survey.catalog().get("Age").unwrap();
        assert_eq!(age.question_type, QuestionType::Numeric);
        let dist = survey
            .compute_distribution("Age", &survey.all(), &DistributionOptions::default())
            .unwrap();
        // 25.0 from the workbook and "25" from the CSV file are the same answer.
        assert_eq!(dist.entries[0].value, "25");
        assert_eq!(dist.entries[0].count, 2);
    }
}
