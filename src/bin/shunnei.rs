use std::{
    fs::File,
    io::BufReader,
    path::{Path, PathBuf},
};

use anyhow::Context as _;
use clap::{Parser, Subcommand, ValueEnum};

#[derive(Parser, Debug)]
#[command(name = "shunnei", version)]
struct Cli {
    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Crop and tilt a photo as the editor would, writing a PNG.
    Crop(CropArgs),
    /// Remove the key color from a generated foreground.
    Key(KeyArgs),
    /// Render a full composite described by a job JSON file.
    Render(RenderArgs),
}

#[derive(Parser, Debug)]
struct CropArgs {
    /// Source image.
    #[arg(long = "in")]
    in_path: PathBuf,

    /// Display container the crop was drawn in, as WxH.
    #[arg(long, value_parser = parse_size_f64)]
    container: (f64, f64),

    /// Crop rectangle as container fractions: x,y,width,height.
    #[arg(long, value_parser = parse_crop)]
    crop: [f64; 4],

    /// Tilt in degrees.
    #[arg(long, default_value_t = 0.0, allow_hyphen_values = true)]
    rotate: f64,

    /// Output size as WxH; defaults to the crop's native source resolution.
    #[arg(long, value_parser = parse_size)]
    size: Option<(u32, u32)>,

    /// Output PNG path.
    #[arg(long)]
    out: PathBuf,
}

#[derive(Parser, Debug)]
struct KeyArgs {
    /// Foreground on the key color.
    #[arg(long = "in")]
    in_path: PathBuf,

    /// Output PNG path.
    #[arg(long)]
    out: PathBuf,

    /// Engine configuration JSON.
    #[arg(long)]
    config: Option<PathBuf>,
}

#[derive(Parser, Debug)]
struct RenderArgs {
    /// Job JSON naming the source, crop, foreground and background.
    #[arg(long)]
    job: PathBuf,

    /// Output PNG path.
    #[arg(long)]
    out: PathBuf,

    /// Output tier; sets the decoration and the default size.
    #[arg(long, value_enum, default_value_t = TierChoice::Preview)]
    tier: TierChoice,

    /// Override the tier's standard size, as WxH.
    #[arg(long, value_parser = parse_size)]
    size: Option<(u32, u32)>,

    /// Engine configuration JSON.
    #[arg(long)]
    config: Option<PathBuf>,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum TierChoice {
    Preview,
    Print,
}

impl From<TierChoice> for shunnei::ResolutionTier {
    fn from(t: TierChoice) -> Self {
        match t {
            TierChoice::Preview => Self::Preview,
            TierChoice::Print => Self::Print,
        }
    }
}

/// Job file. Relative image paths resolve against the job file's directory.
#[derive(Debug, serde::Deserialize)]
#[serde(deny_unknown_fields)]
struct Job {
    source: PathBuf,
    container: shunnei::ContainerSize,
    crop: shunnei::CropRegion,
    #[serde(default)]
    foreground: Option<PathBuf>,
    #[serde(default)]
    background: shunnei::BackgroundChoice,
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    match cli.cmd {
        Command::Crop(args) => cmd_crop(args),
        Command::Key(args) => cmd_key(args),
        Command::Render(args) => cmd_render(args),
    }
}

fn load_config(path: Option<&Path>) -> anyhow::Result<shunnei::EngineConfig> {
    match path {
        Some(p) => shunnei::EngineConfig::from_json_file(p)
            .with_context(|| format!("load config '{}'", p.display())),
        None => Ok(shunnei::EngineConfig::default()),
    }
}

fn read_job_json(path: &Path) -> anyhow::Result<Job> {
    let f = File::open(path).with_context(|| format!("open job '{}'", path.display()))?;
    let r = BufReader::new(f);
    let job: Job = serde_json::from_reader(r).with_context(|| "parse job JSON")?;
    Ok(job)
}

fn cmd_crop(args: CropArgs) -> anyhow::Result<()> {
    let source = shunnei::load_image(&args.in_path)?;
    let container = shunnei::ContainerSize::new(args.container.0, args.container.1)?;
    let [x, y, width, height] = args.crop;
    let region = shunnei::CropRegion {
        x,
        y,
        width,
        height,
        rotation_degrees: args.rotate,
    };

    let transform =
        shunnei::CropTransform::new(source.width(), source.height(), container, &region)?;
    let (w, h) = args.size.unwrap_or_else(|| transform.native_size());
    let out = transform.render(&source, w, h)?;

    shunnei::save_png(&out, &args.out)?;
    eprintln!("wrote {} ({w}x{h})", args.out.display());
    Ok(())
}

fn cmd_key(args: KeyArgs) -> anyhow::Result<()> {
    let config = load_config(args.config.as_deref())?;
    let foreground = shunnei::load_image(&args.in_path)?;
    let keyed = shunnei::ChromaKeyExtractor::new(config.chroma)?.extract(&foreground)?;
    shunnei::save_png(&keyed, &args.out)?;
    eprintln!("wrote {}", args.out.display());
    Ok(())
}

fn cmd_render(args: RenderArgs) -> anyhow::Result<()> {
    let config = load_config(args.config.as_deref())?;
    let job = read_job_json(&args.job)?;
    let root = args.job.parent().unwrap_or_else(|| Path::new("."));

    let source = shunnei::load_image(root.join(&job.source))?;
    let foreground = job
        .foreground
        .as_ref()
        .map(|p| shunnei::load_image(root.join(p)))
        .transpose()?;

    let tier = shunnei::ResolutionTier::from(args.tier);
    let (output_width, output_height) = args.size.unwrap_or_else(|| tier.default_size());
    let spec = shunnei::CompositeSpec {
        source: shunnei::SourceLayer::Crop(shunnei::SourceCrop {
            source: &source,
            container: shunnei::ContainerSize::new(job.container.width, job.container.height)?,
            region: job.crop,
        }),
        foreground: foreground.as_ref(),
        background: job.background,
        output_width,
        output_height,
        tier,
    };

    let renderer = shunnei::CompositeRenderer::new(config)?;
    let out = renderer.render(&spec)?;
    shunnei::save_png(&out, &args.out)?;
    eprintln!("wrote {} ({output_width}x{output_height})", args.out.display());
    Ok(())
}

fn parse_size(s: &str) -> Result<(u32, u32), String> {
    let (w, h) = s
        .split_once(['x', 'X'])
        .ok_or_else(|| format!("expected WxH, got '{s}'"))?;
    let w = w.trim().parse().map_err(|e| format!("bad width '{w}': {e}"))?;
    let h = h.trim().parse().map_err(|e| format!("bad height '{h}': {e}"))?;
    Ok((w, h))
}

fn parse_size_f64(s: &str) -> Result<(f64, f64), String> {
    let (w, h) = s
        .split_once(['x', 'X'])
        .ok_or_else(|| format!("expected WxH, got '{s}'"))?;
    let w = w.trim().parse().map_err(|e| format!("bad width '{w}': {e}"))?;
    let h = h.trim().parse().map_err(|e| format!("bad height '{h}': {e}"))?;
    Ok((w, h))
}

fn parse_crop(s: &str) -> Result<[f64; 4], String> {
    let parts: Vec<f64> = s
        .split(',')
        .map(|p| p.trim().parse::<f64>().map_err(|e| format!("bad crop value '{p}': {e}")))
        .collect::<Result<_, _>>()?;
    <[f64; 4]>::try_from(parts).map_err(|v| format!("crop needs 4 values, got {}", v.len()))
}
