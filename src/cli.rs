use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};

use crate::model::HumanLabel;

#[derive(Parser, Debug)]
#[command(
    name = "qrc-label",
    version,
    about = "Human labeling of generated questions and responses"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    Init(InitArgs),
    Docs(DocsArgs),
    Show(ShowArgs),
    Submit(SubmitArgs),
    Status(StatusArgs),
}

#[derive(Args, Debug, Clone)]
pub struct SessionArgs {
    /// Directory holding docs_out.csv, qrc_out.csv and optionally qrc_filter.csv.
    #[arg(long)]
    pub data_dir: PathBuf,

    #[arg(long, default_value = ".")]
    pub out_dir: PathBuf,

    #[arg(long)]
    pub annotator: String,

    /// Defaults to the final component of --data-dir.
    #[arg(long)]
    pub experiment: Option<String>,
}

#[derive(Args, Debug, Clone)]
pub struct InitArgs {
    #[command(flatten)]
    pub session: SessionArgs,

    /// Create the labels table when it does not exist yet.
    #[arg(long, default_value_t = false)]
    pub create: bool,

    /// Decline creating a missing labels table.
    #[arg(long, default_value_t = false, conflicts_with = "create")]
    pub no_create: bool,
}

#[derive(Args, Debug, Clone)]
pub struct DocsArgs {
    #[command(flatten)]
    pub session: SessionArgs,

    #[arg(long, default_value_t = false)]
    pub json: bool,
}

#[derive(Args, Debug, Clone)]
pub struct ShowArgs {
    #[command(flatten)]
    pub session: SessionArgs,

    #[arg(long)]
    pub doc_id: String,

    #[arg(long, default_value_t = false)]
    pub json: bool,
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, ValueEnum)]
pub enum DesignedFlag {
    Yes,
    No,
}

impl DesignedFlag {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Yes => "yes",
            Self::No => "no",
        }
    }
}

#[derive(Args, Debug, Clone)]
pub struct SubmitArgs {
    #[command(flatten)]
    pub session: SessionArgs,

    #[arg(long)]
    pub doc_id: String,

    #[arg(long, required_unless_present = "question", conflicts_with = "question")]
    pub q_id: Option<String>,

    /// Disambiguates a q_id generated both as confusing and non-confusing.
    #[arg(long, value_enum, requires = "q_id")]
    pub is_confusing: Option<DesignedFlag>,

    /// 1-based position in the order `show` lists the questions.
    #[arg(long)]
    pub question: Option<usize>,

    #[arg(long, value_enum)]
    pub confusing: HumanLabel,

    #[arg(long, value_enum)]
    pub defused: HumanLabel,

    #[arg(long = "category")]
    pub categories: Vec<String>,

    #[arg(long)]
    pub other_text: Option<String>,
}

#[derive(Args, Debug, Clone)]
pub struct StatusArgs {
    #[command(flatten)]
    pub session: SessionArgs,

    #[arg(long)]
    pub report_path: Option<PathBuf>,
}
