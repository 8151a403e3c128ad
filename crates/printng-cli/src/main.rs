use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand, ValueEnum};
use printng::{
    ConfigOverrides, HtmlSurfaceHost, Margin, MapState, Orientation, PageMargins, PageSize,
    PrintConfig, PrintOptionsPatch, PrintOutcome, PrintRequest, PrintSession, ReqwestClient,
    TemplateCatalog, Units, build_layout, snapshot::pixel_dimensions,
};
use printng_async_runtime::PrintLogger;
use std::path::{Path, PathBuf};
use std::time::Duration;

#[derive(Parser)]
#[command(name = "printng", about = "PrintNG map printing CLI", version)]
struct Cli {
    /// Print log output to stderr (-v info, -vv debug)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show the page style sent with print requests
    PageStyle {
        #[command(flatten)]
        page: PageArgs,
    },

    /// Pixel size of the print map for a paper size
    Pixels {
        /// Paper name (see `papers`)
        #[arg(long, default_value = "A4")]
        paper: String,

        #[arg(long, default_value = "landscape", value_enum)]
        orientation: OrientationArg,

        /// Print resolution
        #[arg(long, default_value = "96")]
        dpi: u32,

        /// Print configuration file with the paper sizes (JSON)
        #[arg(short, long)]
        config: Option<PathBuf>,
    },

    /// List the configured paper sizes and resolutions
    Papers {
        /// Print configuration file (JSON)
        #[arg(short, long)]
        config: Option<PathBuf>,
    },

    /// List the templates offered by the template service
    Templates {
        #[command(flatten)]
        service: ServiceArgs,
    },

    /// Print a map through the print service
    Print {
        #[command(flatten)]
        service: ServiceArgs,

        #[command(flatten)]
        page: PageArgs,

        /// Map description (JSON: center, zoom, layers)
        #[arg(short, long)]
        map: PathBuf,

        /// Map identifier appended to the print URL
        #[arg(long)]
        map_id: String,

        /// Template id, defaults to the catalog selection
        #[arg(long)]
        template: Option<String>,

        /// Use a configured paper size for the print map
        #[arg(long)]
        paper: Option<String>,

        /// Print map width in pixels
        #[arg(long)]
        width: Option<u32>,

        /// Print map height in pixels
        #[arg(long)]
        height: Option<u32>,

        /// Only create the document and show its URL
        #[arg(long)]
        preview: bool,

        /// Download the document to this file
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

#[derive(Args)]
struct ServiceArgs {
    /// Print configuration file (JSON)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Print service base URL
    #[arg(long)]
    print_service: Option<String>,

    /// Template service URL
    #[arg(long)]
    template_service: Option<String>,

    /// Print resolution
    #[arg(long)]
    dpi: Option<u32>,
}

#[derive(Args)]
struct PageArgs {
    /// Page units
    #[arg(long, value_enum)]
    units: Option<UnitsArg>,

    /// Page size: a name such as A4 or WIDTHxHEIGHT in page units
    #[arg(long, value_parser = parse_page_size)]
    size: Option<PageSize>,

    /// Page orientation
    #[arg(long, value_enum)]
    orientation: Option<OrientationArg>,

    /// Comma separated margins; bare numbers use the page units
    #[arg(long)]
    margins: Option<String>,
}

#[derive(Clone, Copy, ValueEnum)]
enum UnitsArg {
    Mm,
    Cm,
    In,
    Pt,
    Pc,
    Px,
}

#[derive(Clone, Copy, ValueEnum)]
enum OrientationArg {
    Portrait,
    Landscape,
}

impl From<UnitsArg> for Units {
    fn from(arg: UnitsArg) -> Self {
        match arg {
            UnitsArg::Mm => Self::Mm,
            UnitsArg::Cm => Self::Cm,
            UnitsArg::In => Self::In,
            UnitsArg::Pt => Self::Pt,
            UnitsArg::Pc => Self::Pc,
            UnitsArg::Px => Self::Px,
        }
    }
}

impl From<OrientationArg> for Orientation {
    fn from(arg: OrientationArg) -> Self {
        match arg {
            OrientationArg::Portrait => Self::Portrait,
            OrientationArg::Landscape => Self::Landscape,
        }
    }
}

impl PageArgs {
    fn patch(&self) -> PrintOptionsPatch {
        PrintOptionsPatch {
            page_units: self.units.map(Into::into),
            page_size: self.size.clone(),
            page_orientation: self.orientation.map(Into::into),
            page_margins: self.margins.as_deref().map(parse_margins),
            ..Default::default()
        }
    }
}

impl ServiceArgs {
    async fn config(&self, options: PrintOptionsPatch) -> Result<PrintConfig> {
        let base = load_config(self.config.as_deref()).await?;
        Ok(base.merged(&ConfigOverrides {
            print_service: self.print_service.clone(),
            template_service: self.template_service.clone(),
            dpi: self.dpi,
            options,
        }))
    }
}

fn parse_page_size(value: &str) -> Result<PageSize, String> {
    if value.trim().is_empty() {
        return Err("Page size is empty".to_string());
    }
    let dimensions = value.split_once(['x', 'X']).and_then(|(width, height)| {
        Some((width.trim().parse::<f64>().ok()?, height.trim().parse::<f64>().ok()?))
    });
    Ok(match dimensions {
        Some((width, height)) => PageSize::dimensions(width, height),
        None => PageSize::named(value),
    })
}

fn parse_margins(value: &str) -> PageMargins {
    PageMargins::List(
        value
            .split(',')
            .map(str::trim)
            .filter(|part| !part.is_empty())
            .map(|part| match part.parse::<f64>() {
                Ok(length) => Margin::Length(length),
                Err(_) => Margin::Keyword(part.to_string()),
            })
            .collect(),
    )
}

async fn load_config(path: Option<&Path>) -> Result<PrintConfig> {
    match path {
        Some(path) => PrintConfig::load(path)
            .await
            .with_context(|| format!("Failed to load {}", path.display())),
        None => Ok(PrintConfig::default()),
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let level = match cli.verbose {
        0 => log::LevelFilter::Warn,
        1 => log::LevelFilter::Info,
        _ => log::LevelFilter::Debug,
    };
    PrintLogger::new(1000)
        .with_level(level)
        .with_echo(true)
        .init()?;

    match cli.command {
        Commands::PageStyle { page } => {
            let options = PrintConfig::default().initial_options().merged(&page.patch());
            println!("{}", build_layout(&options).style_element());
        }

        Commands::Pixels {
            paper,
            orientation,
            dpi,
            config,
        } => {
            let config = load_config(config.as_deref()).await?;
            let preset = config
                .find_paper(&paper)
                .with_context(|| format!("Unknown paper size: {}", paper))?;
            let size = preset.dimensions_with_orientation(orientation.into());
            let (width, height) = pixel_dimensions(size, preset.units, dpi);
            println!("{} at {} dpi: {}x{} px", preset.name, dpi, width, height);
        }

        Commands::Papers { config } => {
            let config = load_config(config.as_deref()).await?;
            println!("Paper sizes:");
            for preset in &config.paper_sizes {
                println!(
                    "  {:<8} {} x {} {}",
                    preset.name, preset.size[0], preset.size[1], preset.units
                );
            }
            let resolutions: Vec<String> =
                config.resolutions.iter().map(|dpi| dpi.to_string()).collect();
            println!("Resolutions: {} dpi", resolutions.join(", "));
        }

        Commands::Templates { service } => {
            let config = service.config(PrintOptionsPatch::default()).await?;
            let source = config
                .template_service
                .clone()
                .context("No template service configured")?;
            let http = ReqwestClient::new(Duration::from_secs(config.timeout_secs))?;
            let mut catalog = TemplateCatalog::new();
            catalog.load(&http, &source).await?;

            let active = catalog.active().map(|template| template.id.clone());
            println!("Templates:");
            for template in catalog.templates() {
                let marker = if Some(&template.id) == active.as_ref() { "*" } else { " " };
                println!("{} {:<6} {}", marker, template.id, template.title);
            }
        }

        Commands::Print {
            service,
            page,
            map,
            map_id,
            template,
            paper,
            width,
            height,
            preview,
            output,
        } => {
            let config = service.config(page.patch()).await?;
            let http = ReqwestClient::new(Duration::from_secs(config.timeout_secs))?;
            let downloader = http.clone();
            let map = MapState::load(&map)
                .await
                .with_context(|| format!("Failed to load map {}", map.display()))?;

            let opener = |url: &str| -> printng::Result<()> {
                println!("Document: {}", url);
                Ok(())
            };
            let mut session = PrintSession::new(config, http, HtmlSurfaceHost::new(), opener)?;
            session.load_templates().await?;

            if let Some(name) = &paper {
                session.select_paper_named(name)?;
            }

            let mut request = PrintRequest::new(map_id);
            if let Some(id) = template {
                request = request.with_options(PrintOptionsPatch::default().active_template(id.as_str()));
            }
            if width.is_some() || height.is_some() {
                request.size = Some(printng::SizeOverride { width, height });
            }

            let outcome = if preview {
                session.preview(&map, request).await
            } else {
                session.print(&map, request).await
            };

            let url = match outcome {
                PrintOutcome::Previewed { url, .. } => {
                    println!("Preview: {}", url);
                    url
                }
                PrintOutcome::Delivered { url, .. } | PrintOutcome::Vetoed { url, .. } => url,
                PrintOutcome::Cancelled => {
                    println!("Print cancelled");
                    return Ok(());
                }
                PrintOutcome::Failed { stage, error } => {
                    return Err(error).with_context(|| format!("Print failed at {} stage", stage));
                }
            };

            if let Some(path) = output {
                let bytes = downloader.download(&url).await?;
                tokio::fs::write(&path, &bytes)
                    .await
                    .with_context(|| format!("Failed to write {}", path.display()))?;
                println!("Saved {} bytes → {}", bytes.len(), path.display());
            }
        }
    }

    Ok(())
}
