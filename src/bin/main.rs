//! smo-svm Command Line Interface
//!
//! Train a binary SVM with simplified SMO on LibSVM or CSV data and
//! evaluate it, predict with it or validate it on a sequential split.
//! Models are not saved; every command trains from its training file.

use clap::{Args, Parser, Subcommand, ValueEnum};
use env_logger::Env;
use log::{error, info, warn};
use smo_svm::api::SVM;
use smo_svm::core::{DenseDataset, OptimizerConfig, Result, SVMError};
use smo_svm::data::{self, DataFormat};
use smo_svm::kernel::{Kernel, LinearKernel, PolynomialKernel, RBFKernel, SigmoidKernel};
use smo_svm::utils::scaling::{FeatureScaler, ScalingMethod};
use smo_svm::utils::validation;
use smo_svm::Dataset;
use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};
use std::process;

type Classifier = SVM<Box<dyn Kernel>>;

#[derive(Parser)]
#[command(name = "smo-svm")]
#[command(about = "Binary Support Vector Machine trained with simplified SMO")]
#[command(version = env!("CARGO_PKG_VERSION"))]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Enable debug output
    #[arg(short, long, global = true)]
    debug: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Train on one file and report accuracy on another
    Evaluate(EvaluateArgs),
    /// Train on one file and predict the samples of another
    Predict(PredictArgs),
    /// Train/test split validation on a single dataset
    Cv(CvArgs),
    /// Print the default optimizer configuration as JSON
    Config,
}

/// Options shared by every command that trains a model
#[derive(Args, Clone, Debug)]
struct TrainingArgs {
    /// Data format
    #[arg(short, long, value_enum, default_value = "auto")]
    format: CliDataFormat,

    /// JSON optimizer configuration; flags override its values
    #[arg(long)]
    config: Option<PathBuf>,

    /// Regularization parameter C
    #[arg(short = 'C', long)]
    c: Option<f64>,

    /// KKT violation tolerance
    #[arg(long)]
    tol: Option<f64>,

    /// Alphas at or below this value are ignored when predicting
    #[arg(long)]
    alpha_tol: Option<f64>,

    /// Maximum number of outer sweeps
    #[arg(long)]
    max_iterations: Option<usize>,

    /// Quiet sweeps required for convergence
    #[arg(long)]
    passes: Option<usize>,

    /// Seed for pair selection (random if omitted)
    #[arg(long)]
    seed: Option<u64>,

    /// Kernel function
    #[arg(short, long, value_enum, default_value = "linear")]
    kernel: CliKernel,

    /// Kernel gamma (defaults to 1 / n_features)
    #[arg(long)]
    gamma: Option<f64>,

    /// Polynomial degree
    #[arg(long, default_value = "3")]
    degree: u32,

    /// Kernel coef0 (polynomial defaults to 1, sigmoid to 0)
    #[arg(long)]
    coef0: Option<f64>,

    /// Feature scaling method
    #[arg(long, value_enum)]
    feature_scaling: Option<CliScalingMethod>,
}

#[derive(ValueEnum, Clone, Copy, Debug)]
enum CliDataFormat {
    /// Detect from the file extension
    Auto,
    #[value(name = "libsvm")]
    LibSVM,
    Csv,
}

impl From<CliDataFormat> for DataFormat {
    fn from(format: CliDataFormat) -> Self {
        match format {
            CliDataFormat::Auto => DataFormat::Auto,
            CliDataFormat::LibSVM => DataFormat::LibSVM,
            CliDataFormat::Csv => DataFormat::Csv,
        }
    }
}

#[derive(ValueEnum, Clone, Copy, Debug)]
enum CliKernel {
    Linear,
    Polynomial,
    Rbf,
    Sigmoid,
}

#[derive(ValueEnum, Clone, Copy, Debug)]
enum CliScalingMethod {
    /// Min-Max scaling to [-1, 1] range
    #[value(name = "minmax")]
    MinMax,
    /// Standard score (Z-score) normalization
    #[value(name = "standard")]
    StandardScore,
    /// Unit scaling by maximum absolute value
    #[value(name = "unit")]
    UnitScale,
}

impl From<CliScalingMethod> for ScalingMethod {
    fn from(cli_method: CliScalingMethod) -> Self {
        match cli_method {
            CliScalingMethod::MinMax => ScalingMethod::MinMax {
                min_val: -1.0,
                max_val: 1.0,
            },
            CliScalingMethod::StandardScore => ScalingMethod::StandardScore,
            CliScalingMethod::UnitScale => ScalingMethod::UnitScale,
        }
    }
}

#[derive(Args)]
struct EvaluateArgs {
    /// Training data file
    #[arg(long)]
    train: PathBuf,

    /// Test data file
    #[arg(long)]
    test: PathBuf,

    /// Show detailed metrics
    #[arg(long)]
    detailed: bool,

    #[command(flatten)]
    training: TrainingArgs,
}

#[derive(Args)]
struct PredictArgs {
    /// Training data file
    #[arg(long)]
    train: PathBuf,

    /// Samples to predict
    #[arg(long)]
    data: PathBuf,

    /// Output predictions file (optional, prints to stdout if not specified)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Also print the decision value of every sample
    #[arg(long)]
    confidence: bool,

    #[command(flatten)]
    training: TrainingArgs,
}

#[derive(Args)]
struct CvArgs {
    /// Data file
    #[arg(long)]
    data: PathBuf,

    /// Fraction of samples used for training, taken from the front
    #[arg(short, long, default_value = "0.8")]
    ratio: f64,

    #[command(flatten)]
    training: TrainingArgs,
}

fn main() {
    let cli = Cli::parse();

    // Initialize logging
    let log_level = if cli.debug {
        "debug"
    } else if cli.verbose {
        "info"
    } else {
        "warn"
    };

    env_logger::Builder::from_env(Env::default().default_filter_or(log_level)).init();

    let result = match cli.command {
        Commands::Evaluate(args) => evaluate_command(args),
        Commands::Predict(args) => predict_command(args),
        Commands::Cv(args) => cv_command(args),
        Commands::Config => config_command(),
    };

    if let Err(e) = result {
        error!("Error: {e}");
        process::exit(1);
    }
}

/// Defaults, then the config file, then individual flags
fn resolve_config(args: &TrainingArgs) -> Result<OptimizerConfig> {
    let mut config = match &args.config {
        Some(path) => {
            info!("Loading configuration from: {path:?}");
            OptimizerConfig::from_file(path)?
        }
        None => OptimizerConfig::default(),
    };

    if let Some(c) = args.c {
        config.c = c;
    }
    if let Some(tol) = args.tol {
        config.tol = tol;
    }
    if let Some(alpha_tol) = args.alpha_tol {
        config.alpha_tol = alpha_tol;
    }
    if let Some(max_iterations) = args.max_iterations {
        config.max_iterations = max_iterations;
    }
    if let Some(passes) = args.passes {
        config.passes = passes;
    }

    config.validate()?;
    Ok(config)
}

fn build_kernel(args: &TrainingArgs, n_features: usize) -> Result<Box<dyn Kernel>> {
    if let Some(gamma) = args.gamma {
        if !(gamma.is_finite() && gamma > 0.0) {
            return Err(SVMError::InvalidParameter(format!(
                "gamma must be positive, got: {gamma}"
            )));
        }
    }
    if args.degree == 0 {
        return Err(SVMError::InvalidParameter(
            "degree must be positive".to_string(),
        ));
    }

    let gamma = args.gamma.unwrap_or(1.0 / n_features.max(1) as f64);

    let kernel: Box<dyn Kernel> = match args.kernel {
        CliKernel::Linear => Box::new(LinearKernel::new()),
        CliKernel::Polynomial => Box::new(PolynomialKernel::new(
            args.degree,
            gamma,
            args.coef0.unwrap_or(1.0),
        )),
        CliKernel::Rbf => Box::new(RBFKernel::new(gamma)),
        CliKernel::Sigmoid => Box::new(SigmoidKernel::new(gamma, args.coef0.unwrap_or(0.0))),
    };
    Ok(kernel)
}

fn load_dataset(path: &Path, format: CliDataFormat) -> Result<DenseDataset> {
    info!("Loading dataset from: {path:?}");
    let dataset = data::load(path, format.into())?;
    info!(
        "Loaded {} samples with {} dimensions",
        dataset.len(),
        dataset.dim()
    );
    Ok(dataset)
}

/// Bring both sets to a common width (LibSVM files are densified per file)
fn align(train: &mut DenseDataset, other: &mut DenseDataset) {
    let dim = train.dim().max(other.dim());
    train.pad_to(dim);
    other.pad_to(dim);
}

/// Scale both sets with statistics fitted on the training set
fn apply_scaling(
    args: &TrainingArgs,
    train: DenseDataset,
    other: DenseDataset,
) -> Result<(DenseDataset, DenseDataset)> {
    let Some(method) = args.feature_scaling else {
        return Ok((train, other));
    };

    info!("Using feature scaling: {method:?}");
    let scaler = FeatureScaler::fit(train.samples(), method.into());
    let scale = |dataset: DenseDataset| {
        let (samples, labels) = dataset.into_parts();
        DenseDataset::new(scaler.transform_all(&samples), labels)
    };
    Ok((scale(train)?, scale(other)?))
}

fn train(args: &TrainingArgs, dataset: &DenseDataset) -> Result<Classifier> {
    let config = resolve_config(args)?;
    let kernel = build_kernel(args, dataset.dim())?;

    let (positive, negative, _) = validation::label_balance(dataset.labels());
    info!("Training on {positive} positive and {negative} negative samples");
    if positive == 0 || negative == 0 {
        warn!("Training set contains a single class");
    }
    info!(
        "Parameters: kernel={}, C={}, tol={}, max_iter={}, passes={}",
        kernel.name(),
        config.c,
        config.tol,
        config.max_iterations,
        config.passes
    );

    let mut svm = SVM::with_kernel(kernel).with_config(config);
    if let Some(seed) = args.seed {
        svm = svm.with_seed(seed);
    }

    let model = svm.fit_dataset(dataset)?;
    info!(
        "Training finished after {} iterations ({:?})",
        model.iterations(),
        model.termination()
    );
    if !model.converged() {
        warn!("Optimizer stopped before convergence");
    }

    Ok(svm)
}

fn evaluate_command(args: EvaluateArgs) -> Result<()> {
    let mut train_set = load_dataset(&args.train, args.training.format)?;
    let mut test_set = load_dataset(&args.test, args.training.format)?;
    align(&mut train_set, &mut test_set);
    let (train_set, test_set) = apply_scaling(&args.training, train_set, test_set)?;

    let svm = train(&args.training, &train_set)?;
    report(&svm, &train_set, &test_set, args.detailed)
}

fn cv_command(args: CvArgs) -> Result<()> {
    if args.ratio <= 0.0 || args.ratio >= 1.0 {
        return Err(SVMError::InvalidParameter(format!(
            "Train ratio must be between 0 and 1, got: {}",
            args.ratio
        )));
    }

    let dataset = load_dataset(&args.data, args.training.format)?;
    let train_size = (dataset.len() as f64 * args.ratio) as usize;
    info!(
        "Cross-validation on {:?}: {} training, {} test samples",
        args.data,
        train_size,
        dataset.len() - train_size
    );

    // Simple sequential split (not randomized for reproducibility)
    let (train_set, test_set) = dataset.split_at(train_size);
    let (train_set, test_set) = apply_scaling(&args.training, train_set, test_set)?;

    let svm = train(&args.training, &train_set)?;
    println!("=== Cross-Validation ===");
    println!(
        "Train/test ratio: {:.1}/{:.1}",
        args.ratio,
        1.0 - args.ratio
    );
    report(&svm, &train_set, &test_set, false)
}

fn report(
    svm: &Classifier,
    train_set: &DenseDataset,
    test_set: &DenseDataset,
    detailed: bool,
) -> Result<()> {
    let metrics =
        svm.evaluate_detailed(train_set.samples(), test_set.samples(), test_set.labels())?;
    let info = svm.info()?;

    println!("=== Model Evaluation ===");
    println!("Kernel: {}", info.kernel);
    println!("Training samples: {}", info.n_samples);
    println!(
        "Support vectors: {} ({} bound, {} unbound)",
        info.n_support_vectors,
        info.n_bound_support_vectors,
        info.n_unbound_support_vectors
    );
    println!("Bias: {:.6}", info.bias);
    println!("Iterations: {} ({:?})", info.iterations, info.termination);

    println!("\nTest Results:");
    println!("  Samples:  {}", metrics.total());
    println!("  Accuracy: {:.2}%", metrics.accuracy() * 100.0);

    if detailed {
        println!("\nDetailed Metrics:");
        println!("  True Positives:  {}", metrics.true_positives);
        println!("  True Negatives:  {}", metrics.true_negatives);
        println!("  False Positives: {}", metrics.false_positives);
        println!("  False Negatives: {}", metrics.false_negatives);
        println!("  Precision:       {:.4}", metrics.precision());
        println!("  Recall:          {:.4}", metrics.recall());
        println!("  F1 Score:        {:.4}", metrics.f1_score());
        println!("  Specificity:     {:.4}", metrics.specificity());
    }

    Ok(())
}

fn predict_command(args: PredictArgs) -> Result<()> {
    let mut train_set = load_dataset(&args.train, args.training.format)?;
    let mut query_set = load_dataset(&args.data, args.training.format)?;
    align(&mut train_set, &mut query_set);
    let (train_set, query_set) = apply_scaling(&args.training, train_set, query_set)?;

    let svm = train(&args.training, &train_set)?;
    let predictions = svm.predict_batch(train_set.samples(), query_set.samples())?;

    let mut writer: Box<dyn Write> = match &args.output {
        Some(path) => Box::new(BufWriter::new(File::create(path)?)),
        None => Box::new(io::stdout().lock()),
    };

    writeln!(writer, "# Predictions for {} samples", predictions.len())?;
    writeln!(
        writer,
        "# Format: sample_index predicted_label{}",
        if args.confidence { " decision_value" } else { "" }
    )?;

    for (i, pred) in predictions.iter().enumerate() {
        if args.confidence {
            writeln!(writer, "{} {} {:.6}", i, pred.label, pred.decision_value)?;
        } else {
            writeln!(writer, "{} {}", i, pred.label)?;
        }
    }
    writer.flush()?;

    if let Some(path) = &args.output {
        info!("Predictions saved to: {path:?}");
    }

    Ok(())
}

fn config_command() -> Result<()> {
    println!("{}", OptimizerConfig::default().to_json_string()?);
    Ok(())
}
