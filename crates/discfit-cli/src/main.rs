//! discfit CLI: render ring models and fit them to images.

use clap::{Args, Parser, Subcommand};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use discfit::fit::{
    global_annulus, global_ellipse, global_surface, grid_annulus, grid_ellipse, refine_annulus,
    refine_ellipse, refine_surface,
};
use discfit::search::SearchResult;
use discfit::{
    AnnulusBand, EllipseCurve, FitConfig, Image, ModelKind, ModelParams, ParameterBox, RingModel,
    SurfaceModelKind, TracingObserver,
};

type CliError = Box<dyn std::error::Error>;
type CliResult<T> = Result<T, CliError>;

#[derive(Parser)]
#[command(name = "discfit")]
#[command(about = "Fit ring and disc models to astronomical images")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Render a model to a PNG (and optionally a JSON array).
    Render(CliRenderArgs),

    /// Fit a model to an image.
    Fit(CliFitArgs),
}

#[derive(Debug, Clone, Args)]
struct CliRenderArgs {
    /// Model JSON, e.g. {"kind":"gaussian","r":20,"th":4,...}.
    #[arg(long)]
    model: PathBuf,

    /// Output image side length in pixels.
    #[arg(long, default_value = "128")]
    size: usize,

    /// Path to write the rendered map (PNG, min/max normalized).
    #[arg(long)]
    out: PathBuf,

    /// Path to write the raw map as a row-major JSON array.
    #[arg(long)]
    json: Option<PathBuf>,
}

#[derive(Debug, Clone, Args)]
struct CliFitArgs {
    /// Path to the input image (any format the `image` crate reads).
    #[arg(long)]
    image: PathBuf,

    /// Fit request (JSON).
    #[arg(long)]
    request: PathBuf,

    /// Path to write the fit result (JSON).
    #[arg(long)]
    out: PathBuf,

    /// Override the request's RNG seed for global searches.
    #[arg(long)]
    seed: Option<u64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
enum FitMethod {
    Grid,
    Local,
    Global,
    TwoPhase,
}

/// Asinh contrast stretch applied before fitting. Limits are image quantiles.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
struct StretchRequest {
    beta: f64,
    upper_quantile: f64,
    lower_quantile: f64,
}

impl Default for StretchRequest {
    fn default() -> Self {
        Self {
            beta: 1.0,
            upper_quantile: 0.99,
            lower_quantile: 0.0,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
struct FitRequest {
    model: ModelKind,
    method: FitMethod,
    /// Search box, required by `grid`, `global`, and `two_phase`.
    #[serde(default)]
    bounds: Option<ParameterBox>,
    /// Starting vector, required by `local`.
    #[serde(default)]
    initial: Option<Vec<f64>>,
    #[serde(default)]
    stretch: Option<StretchRequest>,
    #[serde(default)]
    config: FitConfig,
}

#[derive(Debug, Serialize)]
struct FitOutput {
    image: String,
    shape: [usize; 2],
    model_kind: ModelKind,
    parameter_names: &'static [&'static str],
    result: SearchResult,
    /// Typed model at the best parameters, when they form a valid model.
    model: Option<RingModel>,
}

fn main() -> CliResult<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Render(args) => run_render(&args),
        Commands::Fit(args) => run_fit(&args),
    }
}

fn read_json<T: serde::de::DeserializeOwned>(path: &Path) -> CliResult<T> {
    let data = std::fs::read_to_string(path).map_err(|e| -> CliError {
        format!("Failed to read {}: {}", path.display(), e).into()
    })?;
    serde_json::from_str(&data).map_err(|e| -> CliError {
        format!("Invalid JSON in {}: {}", path.display(), e).into()
    })
}

fn run_render(args: &CliRenderArgs) -> CliResult<()> {
    let model: RingModel = read_json(&args.model)?;
    tracing::info!("Rendering {:?} at {}x{}", model.kind(), args.size, args.size);

    let map = model.render(args.size, args.size)?;
    let (lo, hi) = map.min_max().unwrap_or((0.0, 1.0));
    map.to_gray_normalized(lo, hi).save(&args.out)?;
    tracing::info!("Map written to {}", args.out.display());

    if let Some(path) = &args.json {
        let rows: Vec<Vec<f64>> = map
            .to_row_major()
            .chunks(args.size.max(1))
            .map(<[f64]>::to_vec)
            .collect();
        std::fs::write(path, serde_json::to_string(&rows)?)?;
        tracing::info!("Raw map written to {}", path.display());
    }
    Ok(())
}

fn load_image(path: &Path) -> CliResult<Image> {
    tracing::info!("Loading image: {}", path.display());
    let img = image::open(path).map_err(|e| -> CliError {
        format!("Failed to open image {}: {}", path.display(), e).into()
    })?;
    let image = Image::from_luma32(&img.to_luma32f()).nan_to_zero();
    tracing::info!("Image size: {}x{}", image.width(), image.height());
    Ok(image)
}

fn apply_stretch(image: &Image, stretch: &StretchRequest) -> CliResult<Image> {
    let upper = image
        .quantile(stretch.upper_quantile)
        .ok_or("cannot stretch an image without finite pixels")?;
    let lower = image
        .quantile(stretch.lower_quantile)
        .ok_or("cannot stretch an image without finite pixels")?;
    tracing::info!(
        "Stretching with beta={} over [{:.4}, {:.4}]",
        stretch.beta,
        lower,
        upper
    );
    Ok(image.hyperbolic_stretch(stretch.beta, upper, lower)?)
}

fn require_bounds(request: &FitRequest) -> CliResult<&ParameterBox> {
    request
        .bounds
        .as_ref()
        .ok_or_else(|| format!("method {:?} needs \"bounds\"", request.method).into())
}

fn require_initial(request: &FitRequest) -> CliResult<&[f64]> {
    request
        .initial
        .as_deref()
        .ok_or_else(|| "method local needs \"initial\"".into())
}

/// `global` is evolution alone; `two_phase` always polishes with Powell.
fn method_config(method: FitMethod, config: &FitConfig) -> FitConfig {
    let mut config = config.clone();
    match method {
        FitMethod::Global => config.evolution.polish = false,
        FitMethod::TwoPhase => config.evolution.polish = true,
        FitMethod::Grid | FitMethod::Local => {}
    }
    config
}

fn run_search(image: &Image, request: &FitRequest) -> CliResult<SearchResult> {
    let config = &request.config;
    let mut observer = TracingObserver::new("fit");
    let surface = SurfaceModelKind::try_from(request.model).ok();

    let result = match (request.method, surface) {
        (FitMethod::Grid, None) => {
            let bounds = require_bounds(request)?;
            let outcome = match request.model {
                ModelKind::Ellipse => grid_ellipse(image, bounds, config, &mut observer)?,
                _ => grid_annulus(image, bounds, config, &mut observer)?,
            };
            outcome.result
        }
        (FitMethod::Grid, Some(_)) => {
            return Err(format!(
                "grid search is not available for {:?}; use local or global",
                request.model
            )
            .into())
        }
        (FitMethod::Local, None) => {
            let x0 = require_initial(request)?;
            match request.model {
                ModelKind::Ellipse => {
                    refine_ellipse(image, &EllipseCurve::from_slice(x0)?, config, &mut observer)?
                }
                _ => refine_annulus(image, &AnnulusBand::from_slice(x0)?, config, &mut observer)?,
            }
        }
        (FitMethod::Local, Some(kind)) => {
            refine_surface(image, kind, require_initial(request)?, config, &mut observer)?
        }
        (FitMethod::Global | FitMethod::TwoPhase, surface) => {
            let config = method_config(request.method, config);
            let bounds = require_bounds(request)?;
            match (surface, request.model) {
                (Some(kind), _) => global_surface(image, kind, bounds, &config, &mut observer)?,
                (None, ModelKind::Ellipse) => {
                    global_ellipse(image, bounds, &config, &mut observer)?
                }
                (None, _) => global_annulus(image, bounds, &config, &mut observer)?,
            }
        }
    };
    Ok(result)
}

fn run_fit(args: &CliFitArgs) -> CliResult<()> {
    let mut request: FitRequest = read_json(&args.request)?;
    if let Some(seed) = args.seed {
        request.config.evolution.seed = Some(seed);
    }

    let mut image = load_image(&args.image)?;
    if let Some(stretch) = &request.stretch {
        image = apply_stretch(&image, stretch)?;
    }

    tracing::info!("Fitting {:?} with {:?}", request.model, request.method);
    let result = run_search(&image, &request)?;
    tracing::info!(
        "Best {:?} = {:.6} after {} evaluations (converged: {})",
        result.sense,
        result.value,
        result.evaluations,
        result.converged
    );

    let output = FitOutput {
        image: args.image.display().to_string(),
        shape: [image.height(), image.width()],
        model_kind: request.model,
        parameter_names: request.model.names(),
        model: RingModel::from_slice(request.model, &result.params).ok(),
        result,
    };
    std::fs::write(&args.out, serde_json::to_string_pretty(&output)?)?;
    tracing::info!("Results written to {}", args.out.display());
    Ok(())
}
