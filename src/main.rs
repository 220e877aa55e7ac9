// src/main.rs
//
// Research-harness CLI for passlearn.
//
// Config precedence: CLI flags > PASSLEARN_* environment > defaults.
// Results are printed to stdout as JSON; diagnostics go to stderr via
// tracing (RUST_LOG or -v / -vv).

use std::fs;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{ArgAction, Args, Parser, Subcommand};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use serde::Serialize;
use tracing_subscriber::EnvFilter;

use passlearn::metrics::StatsSummary;
use passlearn::sweep::linspace;
use passlearn::{
    expected_success_rate, log_result, AttemptProfile, BaselineSimulator, EnergyBreakdown,
    EventSink, FileSink, NoiseMode, NoopSink, PassEnergyParams, PreferenceModel, SimConfig,
    Simulator, SweepPoint,
};

/// Samples used to estimate the baseline's expected success rate.
const EXPECTATION_SAMPLES: usize = 200_000;
/// Default smoothing window for the reported learning curve.
const DEFAULT_MA_WINDOW: usize = 50;

#[derive(Debug, Parser)]
#[command(
    name = "passlearn",
    about = "Online learning of satellite pass selection (research harness)",
    version
)]
struct Cli {
    /// Verbosity: -v, -vv
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,

    /// Also write the JSON summary to this path.
    #[arg(long, global = true)]
    output: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Run the learning simulation.
    Simulate {
        #[command(flatten)]
        run: RunArgs,

        /// Discount factor λ in [0, 1].
        #[arg(long)]
        lambda: Option<f64>,

        /// Moving-average window for the reported success curve.
        #[arg(long, default_value_t = DEFAULT_MA_WINDOW)]
        ma_window: usize,

        /// Optional JSONL path for per-transmitter records.
        #[arg(long)]
        log_jsonl: Option<PathBuf>,
    },
    /// Run the uniform-choice baseline.
    Baseline {
        #[command(flatten)]
        run: RunArgs,
    },
    /// Run the learner over a range of λ and report power per point.
    Sweep {
        #[command(flatten)]
        run: RunArgs,

        /// Explicit λ values (comma separated). Overrides the range flags.
        #[arg(long, value_delimiter = ',')]
        lambdas: Vec<f64>,

        #[arg(long, default_value_t = 0.5)]
        lambda_min: f64,

        #[arg(long, default_value_t = 1.0)]
        lambda_max: f64,

        #[arg(long, default_value_t = 6)]
        lambda_steps: usize,

        /// Fraction of the pass listened to before a successful upload.
        #[arg(long, default_value_t = 0.5)]
        eps_pass: f64,

        /// Pass length in seconds.
        #[arg(long, default_value_t = 1500.0)]
        t_pass: f64,
    },
    /// Evaluate the energy / power model at one operating point.
    Energy {
        /// Attempts per second.
        #[arg(long)]
        r_attempt: f64,

        #[arg(long)]
        p_success: f64,

        #[arg(long, default_value_t = 0.5)]
        eps_pass: f64,

        /// Pass length in seconds.
        #[arg(long, default_value_t = 1500.0)]
        t_pass: f64,
    },
}

#[derive(Debug, Args)]
struct RunArgs {
    #[arg(long)]
    transmitters: Option<usize>,

    #[arg(long)]
    epochs: Option<usize>,

    /// Candidate passes per epoch.
    #[arg(long)]
    passes: Option<usize>,

    /// constant | bucket | random
    #[arg(long)]
    noise_mode: Option<NoiseMode>,

    /// Preference model: 1 | 2 | 3
    #[arg(long)]
    model: Option<PreferenceModel>,

    #[arg(long)]
    seed: Option<u64>,

    /// Worker threads (default: all cores).
    #[arg(long)]
    threads: Option<usize>,
}

impl RunArgs {
    fn to_config(&self) -> SimConfig {
        let mut cfg = SimConfig::from_env_or_default();
        if let Some(v) = self.transmitters {
            cfg.num_transmitters = v;
        }
        if let Some(v) = self.epochs {
            cfg.num_epochs = v;
        }
        if let Some(v) = self.passes {
            cfg.num_passes = v;
        }
        if let Some(v) = self.noise_mode {
            cfg.noise_mode = v;
        }
        if let Some(v) = self.model {
            cfg.preference_model = v;
        }
        if let Some(v) = self.seed {
            cfg.seed = v;
        }
        if self.threads.is_some() {
            cfg.threads = self.threads;
        }
        cfg
    }
}

#[derive(Debug, Serialize)]
struct SimulateSummary {
    config: SimConfig,
    success_rate: f64,
    time_to_tx_h: StatsSummary,
    ma_window: usize,
    final_success_ma: f64,
    success_curve_ma: Vec<f64>,
}

#[derive(Debug, Serialize)]
struct BaselineSummary {
    config: SimConfig,
    success_rate: f64,
    expected_success_rate: f64,
}

#[derive(Debug, Serialize)]
struct SweepSummary {
    config: SimConfig,
    pass: PassEnergyParams,
    points: Vec<SweepPoint>,
}

fn init_tracing(verbose: u8) {
    let default = match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}

fn emit<T: Serialize>(value: &T, output: Option<&PathBuf>) -> Result<()> {
    let json = serde_json::to_string_pretty(value)?;
    println!("{json}");
    if let Some(path) = output {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)
                .with_context(|| format!("creating {}", parent.display()))?;
        }
        fs::write(path, json.as_bytes()).with_context(|| format!("writing {}", path.display()))?;
    }
    Ok(())
}

fn run_simulate(
    run: &RunArgs,
    lambda: Option<f64>,
    ma_window: usize,
    log_jsonl: Option<&PathBuf>,
) -> Result<SimulateSummary> {
    let mut cfg = run.to_config();
    if let Some(l) = lambda {
        cfg.lambda = l;
    }
    let sim = Simulator::new(cfg.clone())?;
    let (result, transmitters) = sim.run()?;

    let mut sink: Box<dyn EventSink> = match log_jsonl {
        Some(path) => Box::new(
            FileSink::create(path).with_context(|| format!("creating {}", path.display()))?,
        ),
        None => Box::new(NoopSink),
    };
    log_result(sink.as_mut(), &cfg, &result, &transmitters);

    let curve = result.smoothed_success_curve(ma_window);
    Ok(SimulateSummary {
        success_rate: result.success_rate(),
        time_to_tx_h: result.time_to_tx_stats().summary(),
        ma_window,
        final_success_ma: curve.last().copied().unwrap_or(0.0),
        success_curve_ma: curve,
        config: cfg,
    })
}

fn run_baseline_cmd(run: &RunArgs) -> Result<BaselineSummary> {
    let cfg = run.to_config();
    let result = BaselineSimulator::new(cfg.clone())?.run()?;
    // Separate stream from the transmitters' seeds.
    let mut rng = ChaCha8Rng::seed_from_u64(cfg.seed ^ 0x5EED_BA5E);
    let expected = expected_success_rate(
        cfg.preference_model,
        cfg.noise_mode,
        EXPECTATION_SAMPLES,
        &mut rng,
    );
    Ok(BaselineSummary {
        success_rate: result.success_rate(),
        expected_success_rate: expected,
        config: cfg,
    })
}

fn run_energy(r_attempt: f64, p_success: f64, eps_pass: f64, t_pass: f64) -> Result<EnergyBreakdown> {
    let profile = AttemptProfile::new(r_attempt, p_success, eps_pass, t_pass);
    profile.validate()?;
    Ok(profile.breakdown())
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);
    let output = cli.output.as_ref();

    match &cli.command {
        Command::Simulate {
            run,
            lambda,
            ma_window,
            log_jsonl,
        } => {
            let summary = run_simulate(run, *lambda, *ma_window, log_jsonl.as_ref())?;
            emit(&summary, output)
        }
        Command::Baseline { run } => emit(&run_baseline_cmd(run)?, output),
        Command::Sweep {
            run,
            lambdas,
            lambda_min,
            lambda_max,
            lambda_steps,
            eps_pass,
            t_pass,
        } => {
            let cfg = run.to_config();
            let lambdas = if lambdas.is_empty() {
                linspace(*lambda_min, *lambda_max, *lambda_steps)
            } else {
                lambdas.clone()
            };
            let pass = PassEnergyParams {
                eps_pass: *eps_pass,
                t_pass_s: *t_pass,
            };
            let points = passlearn::sweep_lambdas(&cfg, &lambdas, &pass)?;
            emit(
                &SweepSummary {
                    config: cfg,
                    pass,
                    points,
                },
                output,
            )
        }
        Command::Energy {
            r_attempt,
            p_success,
            eps_pass,
            t_pass,
        } => emit(&run_energy(*r_attempt, *p_success, *eps_pass, *t_pass)?, output),
    }
}
