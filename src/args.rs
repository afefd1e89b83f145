use clap::{ArgGroup, Parser, Subcommand};

/// This is a program to explore survey results stored in spreadsheets.
#[derive(Parser, Debug, Clone)]
#[clap(author, version, about, long_about = None)]
pub struct Args {
    #[clap(subcommand)]
    pub command: Command,

    /// (file path, repeatable) A survey file (.xlsx, .xlsm or .csv). If provided, the files recorded by
    /// the last `load` command are ignored.
    #[clap(short, long, value_parser, global = true)]
    pub input: Vec<String>,

    /// (file path, optional) A JSON configuration file. See the manual for the available options.
    #[clap(short, long, value_parser, global = true)]
    pub config: Option<String>,

    /// (file path, default .survey_session.json) The file in which the `load` command records the
    /// survey files, for use by the other commands.
    #[clap(long, value_parser, global = true)]
    pub session: Option<String>,

    /// (integer, default 50) A question without multiple selections is single-choice when it has
    /// fewer distinct answers than this value, and free text otherwise. Overrides the configuration.
    #[clap(long, value_parser, global = true)]
    pub max_distinct: Option<usize>,

    /// If passed as an argument, the results are printed in JSON format.
    #[clap(long, takes_value = false, global = true)]
    pub json: bool,

    // Other arguments
    /// If passed as an argument, will turn on verbose logging to the standard error.
    #[clap(long, takes_value = false, global = true)]
    pub verbose: bool,
}

#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Reads and checks the survey files, and records them for the other commands.
    Load {
        /// (file paths) The survey files, concatenated in the given order.
        #[clap(value_parser, required = true)]
        files: Vec<String>,
    },

    /// Lists the questions of the survey, grouped by type.
    ListQuestions {
        /// (sc, mc, numeric or text) Only lists the questions of this type.
        #[clap(long = "type", value_parser)]
        question_type: Option<String>,
    },

    /// Prints the number of respondents and of questions of each type.
    Summary,

    /// Searches the questions or the answer options (case-insensitive).
    #[clap(group(ArgGroup::new("target").required(true).args(&["question", "option"])))]
    Search {
        /// Text to search in the question identifiers and labels.
        #[clap(long, value_parser)]
        question: Option<String>,
        /// Text to search in the answer options.
        #[clap(long, value_parser)]
        option: Option<String>,
    },

    /// Selects the respondents who gave one of the answers to a question.
    Filter {
        /// The question identifier (column name).
        #[clap(long, value_parser)]
        question: String,
        /// (repeatable) An answer to keep.
        #[clap(long, value_parser, required = true)]
        option: Vec<String>,
        /// (file path, optional) If specified, the selected respondents are written to this CSV file.
        #[clap(long, value_parser)]
        output: Option<String>,
    },

    /// Shows how the answers to a question are distributed.
    Distribution {
        /// The question identifier (column name).
        #[clap(long, value_parser)]
        question: String,
        /// (integer, optional) Only shows the most frequent answers.
        #[clap(long, value_parser)]
        top: Option<usize>,
        /// If passed as an argument, the missing answers are counted as well.
        #[clap(long, takes_value = false)]
        include_missing: bool,
        /// (optional) Restricts the respondents to the ones who gave one of the --where-option
        /// answers to this question.
        #[clap(long, value_parser)]
        where_question: Option<String>,
        /// (repeatable) An answer to --where-question.
        #[clap(long, value_parser)]
        where_option: Vec<String>,
    },
}
