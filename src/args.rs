use clap::Parser;

/// Compares the polarization of plurality primaries and ranked choice voting
/// on simulated electorates.
#[derive(Parser, Debug, Clone)]
#[clap(author, version, about, long_about = None)]
pub struct Args {
    /// (file path, optional) A scenario file in JSON format. Without it, the scenario is
    /// described by the flags below and the defaults.
    #[clap(short, long, value_parser)]
    pub config: Option<String>,

    /// (file path) A reference summary in JSON format. If provided, polarsim will
    /// check that the produced summary matches the reference.
    #[clap(short, long, value_parser)]
    pub reference: Option<String>,

    /// (file path, 'stdout' or empty) Where to write the JSON summary. Setting this option
    /// overrides the location that may be given in the scenario file.
    #[clap(short, long, value_parser)]
    pub out: Option<String>,

    /// (default trials) The scenario to run: once, trials, candidateSweep,
    /// distributionGrid or histogram.
    #[clap(short, long, value_parser)]
    pub scenario: Option<String>,

    /// (default normal) The voter distribution: normal, randomNormal, uniform, randomSpline,
    /// discrete or discreteUniform.
    #[clap(short, long, value_parser)]
    pub distribution: Option<String>,

    /// The number of trials. Overrides the scenario file.
    #[clap(short, long, value_parser)]
    pub trials: Option<usize>,

    /// The number of candidates drawn from the voter distribution. Overrides the scenario file.
    #[clap(short = 'n', long, value_parser)]
    pub candidates: Option<usize>,

    /// The seed of the random generator. Runs with the same seed produce the same summary.
    #[clap(long, value_parser)]
    pub seed: Option<u64>,

    // Other arguments
    /// If passed as an argument, will turn on verbose logging to the standard output.
    #[clap(long, takes_value = false)]
    pub verbose: bool,
}
