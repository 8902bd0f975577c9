use clap::Parser;

/// Counts an instant-runoff election from a CSV file of ranked ballots.
#[derive(Parser, Debug, Clone)]
#[clap(author, version, about, long_about = None)]
pub struct Args {
    /// (file path) The CSV file containing the ballots. The first row is a header. Every other row reads
    /// `<unused>,<voter id>,<choice 1>,<choice 2>,<choice 3>`, the second and third choices being optional.
    #[clap(value_parser)]
    pub ballots: String,

    /// (file path, default studentids.csv) The voter roll in CSV format. The first row is a header, the
    /// first column of every other row is the identifier of a voter allowed to vote.
    /// Setting this option overrides the path that may be specified with the --config option.
    #[clap(long, value_parser)]
    pub roll: Option<String>,

    /// (file path, optional) A JSON file describing the contest: its name, the candidates in
    /// order and the location of the voter roll. Without it, the nine mascot candidates are used.
    #[clap(short, long, value_parser)]
    pub config: Option<String>,

    /// (file path or 'stdout') If specified, the summary of the election will be written in JSON format to the given
    /// location.
    #[clap(short, long, value_parser)]
    pub out: Option<String>,

    /// (file path) A reference file containing the outcome of an election in JSON format. If provided, the
    /// tabulated summary must match the reference.
    #[clap(short, long, value_parser)]
    pub reference: Option<String>,

    // Other arguments
    /// If passed as an argument, will turn on verbose logging to the standard output.
    #[clap(long, takes_value = false)]
    pub verbose: bool,
}
