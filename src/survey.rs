use log::{debug, info, warn};

use snafu::{prelude::*, Snafu};

use std::fs;
use std::path::Path;

use serde_json::Value as JSValue;

use survey_stats::builder::TableBuilder;
use survey_stats::*;

use crate::args::{Args, Command};
use crate::survey::config_reader::*;
use crate::survey::io_common::*;

pub mod config_reader;
mod io_common;
mod io_csv;
mod io_excel;
mod report;

pub const DEFAULT_SESSION_PATH: &str = ".survey_session.json";

#[derive(Debug, Snafu)]
pub enum SurveyError {
    #[snafu(display("Survey file not found: {path}"))]
    MissingFile { path: String },
    #[snafu(display("Unsupported file format for {path} (expected .xlsx, .xlsm or .csv)"))]
    UnsupportedFormat { path: String },
    #[snafu(display("Error opening file {path}"))]
    OpeningExcel {
        source: calamine::XlsxError,
        path: String,
    },
    #[snafu(display("File {path} does not contain any worksheet or header row"))]
    EmptyExcel { path: String },
    #[snafu(display("Worksheet {worksheet:?} not found in {path}"))]
    MissingWorksheet { path: String, worksheet: String },
    #[snafu(display("Error opening CSV file {path}"))]
    CsvOpen { source: csv::Error, path: String },
    #[snafu(display("Error reading line {lineno} of {path}"))]
    CsvLineParse {
        source: csv::Error,
        path: String,
        lineno: usize,
    },
    #[snafu(display(
        "File {path} does not have the same columns as {reference}: missing {missing:?}, unexpected {unexpected:?}"
    ))]
    ColumnMismatch {
        path: String,
        reference: String,
        missing: Vec<String>,
        unexpected: Vec<String>,
    },
    #[snafu(display("Column {column:?} appears more than once in {path}"))]
    DuplicateColumn { path: String, column: String },
    #[snafu(display("No survey file given: pass --input or run the load command first"))]
    NoInput {},
    #[snafu(display("Cannot read session file {path}"))]
    SessionRead {
        source: std::io::Error,
        path: String,
    },
    #[snafu(display("Cannot parse session file {path}"))]
    SessionParse {
        source: serde_json::Error,
        path: String,
    },
    #[snafu(display("Cannot write session file {path}"))]
    SessionWrite {
        source: std::io::Error,
        path: String,
    },

    #[snafu(display("Unknown question {question:?}"))]
    UnknownQuestion { question: String },

    #[snafu(display("Unknown question type {code:?} (expected sc, mc, numeric or text)"))]
    UnknownQuestionType { code: String },
    #[snafu(display("--where-question and --where-option must be given together"))]
    IncompleteWhere {},
    #[snafu(display("Cannot read configuration file {path}"))]
    ConfigRead {
        source: std::io::Error,
        path: String,
    },
    #[snafu(display("Cannot parse configuration file {path}"))]
    ConfigParse {
        source: serde_json::Error,
        path: String,
    },
    #[snafu(display("Invalid survey table"))]
    InvalidTable { source: StatsError },
    #[snafu(display("Cannot write CSV file {path}"))]
    CsvWrite { source: csv::Error, path: String },
    #[snafu(display("Cannot serialize the output"))]
    SerializingJson { source: serde_json::Error },
}

impl SurveyError {
    /// Errors that prevent the survey data from being loaded.
    pub fn is_load_error(&self) -> bool {
        matches!(
            self,
            SurveyError::MissingFile { .. }
                | SurveyError::UnsupportedFormat { .. }
                | SurveyError::OpeningExcel { .. }
                | SurveyError::EmptyExcel { .. }
                | SurveyError::MissingWorksheet { .. }
                | SurveyError::CsvOpen { .. }
                | SurveyError::CsvLineParse { .. }
                | SurveyError::ColumnMismatch { .. }
                | SurveyError::DuplicateColumn { .. }
                | SurveyError::NoInput {}
                | SurveyError::SessionRead { .. }
                | SurveyError::SessionParse { .. }
        )
    }

    pub fn exit_code(&self) -> i32 {
        match self {
            SurveyError::UnknownQuestion { .. } => 3,
            e if e.is_load_error() => 2,
            _ => 1,
        }
    }
}

impl From<StatsError> for SurveyError {
    fn from(e: StatsError) -> Self {
        match e {
            StatsError::UnknownQuestion(question) => SurveyError::UnknownQuestion { question },
            source => SurveyError::InvalidTable { source },
        }
    }
}

pub type SurveyResult<T> = Result<T, SurveyError>;

/// Respondents as parsed by the readers, before the files are put together.
#[derive(PartialEq, Debug, Clone)]
pub struct ParsedRespondent {
    pub id: String,
    /// One answer per header column.
    pub answers: Vec<Answer>,
}

/// The content of one survey file.
#[derive(PartialEq, Debug, Clone)]
pub struct ParsedFile {
    pub path: String,
    pub header: Vec<String>,
    pub respondents: Vec<ParsedRespondent>,
}

fn read_survey_file(path: &str, config: &AnalyzerConfig) -> SurveyResult<ParsedFile> {
    info!("Attempting to read survey file {:?}", path);
    ensure!(Path::new(path).is_file(), MissingFileSnafu { path });
    let extension = Path::new(path)
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_ascii_lowercase();
    let parsed = match extension.as_str() {
        "xlsx" | "xlsm" => io_excel::read_excel_file(path, config)?,
        "csv" => io_csv::read_csv_file(path)?,
        _ => return UnsupportedFormatSnafu { path }.fail(),
    };
    if let Some(column) = find_duplicate(&parsed.header) {
        return DuplicateColumnSnafu { path, column }.fail();
    }
    info!(
        "Read {:?} respondents and {:?} columns from {:?}",
        parsed.respondents.len(),
        parsed.header.len(),
        path
    );
    Ok(parsed)
}

/// Reads all the files and concatenates them, in the given order, into a single table.
///
/// All the files must have the same set of columns. The columns of the later files
/// are put in the order of the first file.
pub fn load_table(files: &[String], config: &AnalyzerConfig) -> SurveyResult<SurveyTable> {
    let mut paths = files.iter();
    let reference = paths.next().context(NoInputSnafu {})?;
    let first = read_survey_file(reference, config)?;
    let mut builder = TableBuilder::new(&first.header)?;
    append_file(&mut builder, first, reference)?;
    for path in paths {
        let parsed = read_survey_file(path, config)?;
        append_file(&mut builder, parsed, reference)?;
    }
    Ok(builder.build())
}

fn append_file(builder: &mut TableBuilder, parsed: ParsedFile, reference: &str) -> SurveyResult<()> {
    let mapping = match align_columns(builder.columns(), &parsed.header) {
        Ok(m) => m,
        Err((missing, unexpected)) => {
            return ColumnMismatchSnafu {
                path: parsed.path,
                reference,
                missing,
                unexpected,
            }
            .fail();
        }
    };
    debug!("append_file: column mapping for {:?}: {:?}", parsed.path, mapping);
    for pr in parsed.respondents {
        let answers = reorder_answers(pr.answers, &mapping);
        builder.add_respondent(&pr.id, answers)?;
    }
    Ok(())
}

/// Loads the files and derives the catalog of questions.
pub fn load_survey(
    files: &[String],
    config: &AnalyzerConfig,
    max_distinct: Option<usize>,
) -> SurveyResult<Survey> {
    let table = load_table(files, config)?;
    let mut rules = config.catalog_rules();
    if let Some(m) = max_distinct {
        rules.single_choice_max_distinct = m;
    }
    let survey = Survey::new(table, &rules).with_labels(&config.labels);
    info!(
        "Loaded survey: {:?} respondents, {:?} questions",
        survey.respondent_count(),
        survey.catalog().len()
    );
    Ok(survey)
}

/// The files to read, and the configuration file to use, for a command other than `load`.
fn resolve_inputs(args: &Args, session_path: &str) -> SurveyResult<(Vec<String>, Option<String>)> {
    if !args.input.is_empty() {
        return Ok((args.input.clone(), args.config.clone()));
    }
    if !Path::new(session_path).is_file() {
        warn!("resolve_inputs: no session file at {:?}", session_path);
        return NoInputSnafu {}.fail();
    }
    let session = read_session(session_path)?;
    debug!("resolve_inputs: session {:?}", session);
    let config = args.config.clone().or(session.config);
    Ok((session.files, config))
}

fn read_config_opt(path: &Option<String>) -> SurveyResult<AnalyzerConfig> {
    match path {
        Some(p) => read_config(p),
        None => Ok(AnalyzerConfig::default()),
    }
}

fn absolute(path: &str) -> String {
    fs::canonicalize(path)
        .map(|p| p.display().to_string())
        .unwrap_or_else(|_| path.to_string())
}

fn emit(args: &Args, js: JSValue, text: String) -> SurveyResult<()> {
    if args.json {
        let pretty = serde_json::to_string_pretty(&js).context(SerializingJsonSnafu {})?;
        println!("{}", pretty);
    } else {
        print!("{}", text);
    }
    Ok(())
}

fn load_from_session(args: &Args, session_path: &str) -> SurveyResult<Survey> {
    let (files, config_path) = resolve_inputs(args, session_path)?;
    let config = read_config_opt(&config_path)?;
    load_survey(&files, &config, args.max_distinct)
}

pub fn run(args: &Args) -> SurveyResult<()> {
    let session_path = args
        .session
        .clone()
        .unwrap_or_else(|| DEFAULT_SESSION_PATH.to_string());
    debug!("run: args: {:?}", args);

    match &args.command {
        Command::Load { files } => {
            let config = read_config_opt(&args.config)?;
            let survey = load_survey(files, &config, args.max_distinct)?;
            let session = Session {
                files: files.iter().map(|f| absolute(f)).collect(),
                config: args.config.as_deref().map(absolute),
            };
            write_session(&session_path, &session)?;
            info!("Session recorded in {:?}", session_path);
            emit(
                args,
                report::load_js(files, &survey),
                report::load_text(files, &survey),
            )
        }
        Command::ListQuestions { question_type } => {
            let filter = match question_type {
                Some(code) => Some(
                    QuestionType::from_code(code).context(UnknownQuestionTypeSnafu { code })?,
                ),
                None => None,
            };
            let survey = load_from_session(args, &session_path)?;
            emit(
                args,
                report::questions_js(&survey, filter),
                report::questions_text(&survey, filter),
            )
        }
        Command::Summary => {
            let survey = load_from_session(args, &session_path)?;
            emit(
                args,
                report::summary_js(&survey),
                report::summary_text(&survey),
            )
        }
        Command::Search { question, option } => {
            let survey = load_from_session(args, &session_path)?;
            if let Some(term) = question {
                let found = survey.search_question(term);
                emit(
                    args,
                    report::question_matches_js(term, &found),
                    report::question_matches_text(term, &found),
                )
            } else if let Some(term) = option {
                let found = survey.search_option(term);
                emit(
                    args,
                    report::option_matches_js(term, &found),
                    report::option_matches_text(term, &found),
                )
            } else {
                // The argument parser requires one of the two.
                Ok(())
            }
        }
        Command::Filter {
            question,
            option,
            output,
        } => {
            let survey = load_from_session(args, &session_path)?;
            let subset = survey.create_subset(question, option)?;
            if let Some(out) = output {
                io_csv::write_subset_csv(out, &subset)?;
                info!("Subset written to {:?}", out);
            }
            emit(
                args,
                report::subset_js(question, option, &subset, output.as_deref()),
                report::subset_text(&subset, output.as_deref()),
            )
        }
        Command::Distribution {
            question,
            top,
            include_missing,
            where_question,
            where_option,
        } => {
            let survey = load_from_session(args, &session_path)?;
            let rows = match where_question {
                Some(wq) if !where_option.is_empty() => survey.create_subset(wq, where_option)?,
                None if where_option.is_empty() => survey.all(),
                _ => return IncompleteWhereSnafu {}.fail(),
            };
            let options = DistributionOptions {
                include_missing: *include_missing,
            };
            let dist = survey.compute_distribution(question, &rows, &options)?;
            let summary = if dist.question_type == QuestionType::Numeric {
                numeric_summary(survey.catalog(), &rows, question)?
            } else {
                None
            };
            emit(
                args,
                report::distribution_js(&dist, *top, summary.as_ref()),
                report::distribution_text(&dist, *top, summary.as_ref()),
            )
        }
    }
}
