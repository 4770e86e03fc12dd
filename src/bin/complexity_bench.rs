use clap::{Parser, Subcommand, ValueEnum};
use complexity_bench::benches;
use complexity_bench::harness::{BenchConfig, Profile};
use complexity_bench::introspect::growth_trace;
use complexity_bench::report::render_section;
use complexity_bench::scaling::ScalingPlan;
use complexity_bench::schema::{ExperimentReport, GrowthEntry, RunMeta, ScalingEntry, Section};
use complexity_bench::stats::Basis;
use complexity_bench::{Experiment, ScalingKind};
use std::error::Error;
use std::path::PathBuf;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[derive(Clone, Copy, Debug, ValueEnum)]
enum ProfileArg {
    Quick,
    Full,
}

impl From<ProfileArg> for Profile {
    fn from(v: ProfileArg) -> Self {
        match v {
            ProfileArg::Quick => Profile::Quick,
            ProfileArg::Full => Profile::Full,
        }
    }
}

#[derive(Clone, Copy, Debug, Default, ValueEnum, PartialEq, Eq)]
enum Format {
    /// Aligned human-readable lines.
    #[default]
    Text,
    /// Pretty-printed JSON report.
    Json,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run the built-in experiments.
    Run {
        /// Which experiment(s) to run.
        #[arg(long, value_enum, default_value_t = Experiment::All)]
        experiment: Experiment,
    },

    /// Measure one workload family across increasing sizes and compare the
    /// observed time ratios with an assumed growth exponent.
    Scale {
        #[arg(long, value_enum)]
        workload: ScalingKind,

        /// Strictly increasing problem sizes (at least two).
        #[arg(long, value_delimiter = ',', required = true)]
        sizes: Vec<u64>,

        /// Assumed exponent; defaults to the workload's known growth law.
        #[arg(long)]
        exponent: Option<f64>,

        /// Statistic used for the observed ratio.
        #[arg(long, value_enum, default_value_t = Basis::Mean)]
        basis: Basis,
    },

    /// Show how Vec capacity grows as values are pushed one at a time.
    GrowthTrace {
        #[arg(long, short = 'n', default_value_t = 40)]
        count: u64,
    },
}

#[derive(Parser, Debug)]
#[command(name = "complexity-bench")]
#[command(about = "Timing harness for growth laws and memory layouts")]
struct Args {
    #[arg(long, value_enum, default_value_t = ProfileArg::Quick, global = true)]
    profile: ProfileArg,

    #[arg(long, default_value_t = 0, global = true)]
    seed: u64,

    /// Override the profile's repeat count.
    #[arg(long, global = true)]
    repeat: Option<usize>,

    /// Let workload outputs be freed inside measurement windows.
    #[arg(long, default_value_t = false, global = true)]
    no_suppress: bool,

    #[arg(long, value_enum, default_value_t = Format::Text, global = true)]
    format: Format,

    /// Also write the JSON report to this file.
    #[arg(long, global = true)]
    out: Option<PathBuf>,

    /// Log at debug level (overridden by RUST_LOG).
    #[arg(long, short = 'v', default_value_t = false, global = true)]
    verbose: bool,

    #[command(subcommand)]
    cmd: Command,
}

fn now_utc() -> String {
    use std::time::{SystemTime, UNIX_EPOCH};
    let secs = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_secs();
    format!("unix:{secs}")
}

fn git_sha_short() -> Option<String> {
    // Best-effort: read from environment set by CI/build scripts.
    std::env::var("GIT_SHA")
        .ok()
        .or_else(|| std::env::var("GITHUB_SHA").ok())
        .map(|s| s.chars().take(12).collect())
}

fn init_tracing(verbose: bool) {
    let default = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

fn main() -> Result<(), Box<dyn Error>> {
    let args = Args::parse();
    init_tracing(args.verbose);

    let mut cfg = BenchConfig::new(args.profile.into(), args.seed);
    cfg.repeat = args.repeat;
    cfg.suppress_reclaim = !args.no_suppress;

    info!(
        profile = cfg.profile.as_str(),
        seed = cfg.seed,
        repeat = cfg.repeat_count(),
        suppress_reclaim = cfg.suppress_reclaim,
        "starting"
    );

    let sections = match &args.cmd {
        Command::Run { experiment } => {
            info!(?experiment, "running experiments");
            benches::run_experiment(&cfg, *experiment)?
        }
        Command::Scale {
            workload,
            sizes,
            exponent,
            basis,
        } => {
            let exponent = exponent.unwrap_or_else(|| workload.expected_exponent());
            let plan = ScalingPlan::new(sizes.clone(), exponent).with_basis(*basis);
            info!(?workload, ?sizes, exponent, "running scaling check");

            let report = benches::scale(*workload, &plan, &cfg.trial())?;
            let mut section = Section::new(format!("scale: {workload:?}"));
            section.scaling.push(ScalingEntry {
                name: format!("{workload:?}"),
                report,
            });
            vec![section]
        }
        Command::GrowthTrace { count } => {
            let mut section = Section::new("growth trace");
            section.growth.push(GrowthEntry {
                name: format!("Vec<u64> capacity, {count} pushes"),
                steps: growth_trace(0..*count),
            });
            vec![section]
        }
    };

    let report = ExperimentReport {
        run: RunMeta {
            schema_version: 1,
            bench_version: env!("CARGO_PKG_VERSION").to_string(),
            profile: cfg.profile.as_str().to_string(),
            seed: cfg.seed,
            timestamp_utc: now_utc(),
            git_sha: git_sha_short(),
        },
        sections,
    };

    match args.format {
        Format::Text => {
            for section in &report.sections {
                for line in render_section(section) {
                    println!("{line}");
                }
                println!();
            }
        }
        Format::Json => println!("{}", serde_json::to_string_pretty(&report)?),
    }

    if let Some(out) = args.out {
        report.write_json(&out)?;
        info!(path = %out.display(), "wrote JSON report");
    }

    Ok(())
}
