use crate::testbed::SetupStep;
use crate::utils::config::DEFAULT_REPORT_THRESHOLD;
use std::path::PathBuf;

/// One flow/trace pair to analyze
#[derive(Debug, Clone)]
pub struct SessionInput {
    /// Label printed in the report header
    pub tag: String,

    /// Flow log that defines the window and throughput
    pub flow_file: PathBuf,

    /// Function-call trace log
    pub trace_file: PathBuf,
}

/// Arguments for the analyze command
///
/// **Public** - used by main.rs to construct from CLI args
#[derive(Debug, Clone)]
pub struct AnalyzeArgs {
    pub sessions: Vec<SessionInput>,

    /// Report listing stops after the first function below this (seconds)
    pub threshold: f64,

    /// Optional JSON report path
    pub output_json: Option<PathBuf>,
}

impl Default for AnalyzeArgs {
    fn default() -> Self {
        Self {
            sessions: Vec::new(),
            threshold: DEFAULT_REPORT_THRESHOLD,
            output_json: None,
        }
    }
}

impl AnalyzeArgs {
    /// Pair up repeated `--flow`/`--trace`/`--tag` values
    ///
    /// Missing tags default to `session-N`.
    pub fn pair_sessions(
        flows: Vec<PathBuf>,
        traces: Vec<PathBuf>,
        tags: Vec<String>,
    ) -> anyhow::Result<Vec<SessionInput>> {
        if flows.len() != traces.len() {
            anyhow::bail!(
                "Got {} flow logs but {} trace logs; pass one --trace per --flow",
                flows.len(),
                traces.len()
            );
        }
        if tags.len() > flows.len() {
            anyhow::bail!("More --tag values ({}) than sessions ({})", tags.len(), flows.len());
        }

        let mut tags = tags.into_iter();
        Ok(flows
            .into_iter()
            .zip(traces)
            .enumerate()
            .map(|(i, (flow_file, trace_file))| SessionInput {
                tag: tags.next().unwrap_or_else(|| format!("session-{}", i + 1)),
                flow_file,
                trace_file,
            })
            .collect())
    }
}

/// Arguments for the setup command
#[derive(Debug, Clone)]
pub struct SetupArgs {
    pub steps: Vec<SetupStep>,
    pub config: Option<PathBuf>,
    pub dry_run: bool,

    /// Fail on the first command that exits non-zero
    pub strict: bool,
}

impl Default for SetupArgs {
    fn default() -> Self {
        Self {
            steps: SetupStep::DEFAULT.to_vec(),
            config: None,
            dry_run: false,
            strict: false,
        }
    }
}

/// Arguments for the launch command
#[derive(Debug, Clone)]
pub struct LaunchArgs {
    pub profile: String,
    pub config: Option<PathBuf>,
    pub dry_run: bool,
}

impl Default for LaunchArgs {
    fn default() -> Self {
        Self {
            profile: "emu".to_string(),
            config: None,
            dry_run: false,
        }
    }
}
