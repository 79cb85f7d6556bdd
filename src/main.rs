use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use pageshots::config_file::{self, DEFAULT_CONFIG_FILE};
use pageshots::settings::parse_int;
use pageshots::{
    Browser, ClipInput, DriverConfig, Error, LogReporter, ScrollSettler, Shots, Viewport,
};

#[derive(Parser)]
#[command(name = "pageshots", version)]
#[command(about = "Capture screenshots of one or more pages")]
#[command(after_help = "Examples:
  pageshots -d images -u https://www.mysite.com
  pageshots -u https://www.mysite.com -u https://www.mysite.com/page
  pageshots -d images -u https://www.mysite.com -W 900 -q 80
  pageshots -d images -u https://www.mysite.com -s 1300x800 -s 375x812 --fit
  pageshots init
  pageshots -c myurls.json")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Base URL prepended to relative URLs
    #[arg(short, long)]
    base: Option<String>,

    /// JSON config file; read when no --url is given (default: shots.json)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Directory to write the shots to (created if missing)
    #[arg(short, long)]
    dir: Option<String>,

    /// Milliseconds to wait after the page settled before capturing
    #[arg(short = 'D', long)]
    delay: Option<String>,

    /// Capture only the viewport instead of the full page
    #[arg(short, long)]
    fit: bool,

    /// Viewport height
    #[arg(short = 'H', long)]
    height: Option<String>,

    /// Viewport width
    #[arg(short = 'W', long)]
    width: Option<String>,

    /// Shorthand for --type jpg
    #[arg(long)]
    jpg: bool,

    /// Shorthand for --type png
    #[arg(long)]
    png: bool,

    /// Shorthand for --type pdf
    #[arg(long)]
    pdf: bool,

    /// Filename for the first URL (may contain placeholders)
    #[arg(short, long)]
    name: Option<String>,

    /// Filename template for every URL, e.g. "{stub}-{width}"
    #[arg(long)]
    name_format: Option<String>,

    /// JPG quality, 1-100
    #[arg(short, long)]
    quality: Option<String>,

    /// Viewport size WIDTHxHEIGHT; repeat for several sizes
    #[arg(short, long = "size")]
    sizes: Vec<String>,

    /// Output type: jpg, png or pdf
    #[arg(short = 't', long = "type")]
    format: Option<String>,

    /// URL to capture; repeat for several URLs
    #[arg(short, long = "url")]
    urls: Vec<String>,

    #[arg(long)]
    clip_x: Option<String>,

    #[arg(long)]
    clip_y: Option<String>,

    #[arg(long)]
    clip_w: Option<String>,

    #[arg(long)]
    clip_h: Option<String>,

    /// Navigation timeout in milliseconds
    #[arg(long, default_value_t = 30000)]
    timeout: u64,
}

#[derive(Subcommand)]
enum Commands {
    /// Create a starter JSON config file in the current directory
    Init {
        /// File name (default: shots.json)
        file: Option<String>,
    },
}

#[tokio::main]
async fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();
    match run(cli).await {
        Ok(code) => code,
        Err(e) => {
            log::error!("{:#}", e);
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> anyhow::Result<ExitCode> {
    if let Some(Commands::Init { file }) = &cli.command {
        let cwd = std::env::current_dir()?;
        config_file::init(&cwd, file.as_deref())?;
        return Ok(ExitCode::SUCCESS);
    }

    let mut shots = Shots::new();
    if cli.config.is_some() || cli.urls.is_empty() {
        let path = cli
            .config
            .clone()
            .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_FILE));
        shots.load_config(&path)?;
    }
    apply_args(&mut shots, &cli);

    if shots.targets().is_empty() {
        anyhow::bail!("No URLs to capture; pass --url or list them in a config file");
    }

    let config = DriverConfig {
        viewport: Viewport {
            width: shots.settings().width(),
            height: shots.settings().height(),
        },
        timeout_ms: cli.timeout,
        ..Default::default()
    };
    let browser = Browser::launch(config).await?;
    let page = browser.new_page().await?;
    let mut reporter = LogReporter::new();

    let interrupt = async {
        if tokio::signal::ctrl_c().await.is_err() {
            std::future::pending::<()>().await;
        }
    };
    match shots
        .run_until(page, ScrollSettler::default(), &mut reporter, interrupt)
        .await
    {
        Ok(report) if report.failed.is_empty() => Ok(ExitCode::SUCCESS),
        Ok(_) => Ok(ExitCode::FAILURE),
        Err(Error::Interrupted) => Ok(ExitCode::from(130)),
        Err(e) => Err(e.into()),
    }
}

/// Command line values override whatever the config file set.
fn apply_args(shots: &mut Shots, cli: &Cli) {
    let int = |v: &Option<String>| v.as_deref().and_then(parse_int);
    let settings = shots.settings_mut();

    if let Some(base) = &cli.base {
        settings.set_base_url(base);
    }
    if let Some(dir) = &cli.dir {
        settings.set_dir(dir);
    }
    if let Some(w) = int(&cli.width) {
        settings.set_width(w);
    }
    if let Some(h) = int(&cli.height) {
        settings.set_height(h);
    }
    if cli.fit {
        settings.set_full_page(false);
    }
    if let Some(format) = &cli.format {
        settings.set_format(format);
    }
    for (flag, format) in [(cli.png, "png"), (cli.jpg, "jpg"), (cli.pdf, "pdf")] {
        if flag {
            settings.set_format(format);
        }
    }
    if let Some(q) = int(&cli.quality) {
        settings.set_quality(q);
    }
    if let Some(d) = int(&cli.delay) {
        settings.set_delay(d);
    }
    if let Some(template) = &cli.name_format {
        settings.set_name_format(template);
    }
    for size in &cli.sizes {
        settings.add_size(size);
    }
    if let (Some(x), Some(y), Some(w), Some(h)) =
        (int(&cli.clip_x), int(&cli.clip_y), int(&cli.clip_w), int(&cli.clip_h))
    {
        settings.set_clip(ClipInput { x, y, w, h });
    }

    for url in &cli.urls {
        shots.add_url(url);
    }
    if let Some(name) = &cli.name {
        shots.set_name(name);
    }
}
