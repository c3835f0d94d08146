use std::path::PathBuf;
use std::time::Duration;

use anyhow::Context as _;
use clap::{Parser, Subcommand, ValueEnum};

use monoprint::{
    StudioConfig, TitleFont,
    publish::{ImgurClient, PrintfulClient},
    title::render_title_pair,
    tracker::Ledger,
    validate::{validate_artwork, validate_composition},
    workflow::{PublishTargets, Studio, discover_artwork},
};

#[derive(Parser, Debug)]
#[command(name = "monoprint", version)]
struct Cli {
    /// Config JSON; defaults are used when omitted.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Ledger file tracking every product.
    #[arg(long, global = true, default_value = "monoprint_ledger.json")]
    ledger: PathBuf,

    /// Directory for generated rasters.
    #[arg(long = "out", global = true, default_value = "artifacts")]
    out_dir: PathBuf,

    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Render the curved dark/light title pair for a title string.
    Titles(TitlesArgs),
    /// Run one artwork through the full local pipeline (titles + 5 canvases).
    Compose(ComposeArgs),
    /// QA-check an artwork input or a generated composition.
    Validate(ValidateArgs),
    /// Process every artwork in a directory; optionally publish each product.
    Batch(BatchArgs),
    /// Publish one already-composed product to the storefront.
    Publish(PublishArgs),
    /// Print the ledger status summary.
    Ledger,
}

#[derive(Parser, Debug)]
struct TitlesArgs {
    /// Title text, e.g. "Cavallo Spettrale".
    #[arg(long)]
    title: String,
}

#[derive(Parser, Debug)]
struct ComposeArgs {
    /// Artwork raster (transparent PNG).
    #[arg(long)]
    artwork: PathBuf,
}

#[derive(Parser, Debug)]
struct ValidateArgs {
    #[arg(long)]
    path: PathBuf,

    /// What the file is being checked as.
    #[arg(long, value_enum, default_value_t = ValidateKind::Artwork)]
    kind: ValidateKind,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum ValidateKind {
    /// Source artwork against the intake requirements.
    Artwork,
    /// Composition against the main print template.
    Main,
    /// Composition against the sleeve template.
    Sleeve,
}

#[derive(Parser, Debug)]
struct BatchArgs {
    /// Directory of artwork files.
    #[arg(long)]
    input: PathBuf,

    /// Seconds to pause between products.
    #[arg(long, default_value_t = 2)]
    pause: u64,

    /// Also upload and create marketplace listings.
    #[arg(long)]
    publish: bool,

    /// Catalog product to list on when publishing.
    #[arg(long, default_value_t = 71)]
    catalog_product_id: u64,
}

#[derive(Parser, Debug)]
struct PublishArgs {
    /// Product slug, as recorded in the ledger.
    #[arg(long)]
    slug: String,

    /// Catalog product to list on.
    #[arg(long, default_value_t = 71)]
    catalog_product_id: u64,
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();
    let config = load_config(cli.config.as_deref())?;

    match cli.cmd {
        Command::Titles(args) => cmd_titles(args, &config, &cli.out_dir),
        Command::Compose(args) => cmd_compose(args, config, &cli.ledger, &cli.out_dir),
        Command::Validate(args) => cmd_validate(args, &config),
        Command::Batch(args) => cmd_batch(args, config, &cli.ledger, &cli.out_dir),
        Command::Publish(args) => cmd_publish(args, config, &cli.ledger, &cli.out_dir),
        Command::Ledger => cmd_ledger(&cli.ledger),
    }
}

fn load_config(path: Option<&std::path::Path>) -> anyhow::Result<StudioConfig> {
    match path {
        Some(path) => Ok(StudioConfig::load(path)?),
        None => Ok(StudioConfig::default()),
    }
}

fn cmd_titles(args: TitlesArgs, config: &StudioConfig, out_dir: &std::path::Path) -> anyhow::Result<()> {
    let font = TitleFont::load(&config.title.font_path);
    let artifacts = render_title_pair(&font, &args.title, &config.title, &config.colors, out_dir);

    for (name, path) in [("dark", &artifacts.dark), ("light", &artifacts.light)] {
        match path {
            Some(path) => eprintln!("wrote {name}: {}", path.display()),
            None => eprintln!("{name}: render failed"),
        }
    }
    anyhow::ensure!(artifacts.both_rendered(), "title pair incomplete");
    Ok(())
}

fn cmd_compose(
    args: ComposeArgs,
    config: StudioConfig,
    ledger: &std::path::Path,
    out_dir: &std::path::Path,
) -> anyhow::Result<()> {
    let mut studio = Studio::new(config, ledger, out_dir)?;
    let outcome = studio.process_artwork(&args.artwork)?;

    eprintln!(
        "{}: {}/5 compositions",
        outcome.slug,
        outcome.outputs.succeeded()
    );
    for (variant, path) in &outcome.outputs.outputs {
        match path {
            Some(path) => eprintln!("  {variant}: {}", path.display()),
            None => eprintln!("  {variant}: skipped"),
        }
    }
    Ok(())
}

fn cmd_validate(args: ValidateArgs, config: &StudioConfig) -> anyhow::Result<()> {
    let report = match args.kind {
        ValidateKind::Artwork => validate_artwork(&args.path, &config.requirements),
        ValidateKind::Main => validate_composition(&args.path, &config.templates.main),
        ValidateKind::Sleeve => validate_composition(&args.path, &config.templates.sleeve),
    };

    for issue in &report.issues {
        eprintln!("issue: {issue}");
    }
    for warning in &report.warnings {
        eprintln!("warning: {warning}");
    }
    anyhow::ensure!(report.valid, "validation failed");
    eprintln!("ok");
    Ok(())
}

fn cmd_batch(
    args: BatchArgs,
    config: StudioConfig,
    ledger: &std::path::Path,
    out_dir: &std::path::Path,
) -> anyhow::Result<()> {
    let mut studio = Studio::new(config, ledger, out_dir)?;

    if !args.publish {
        studio.run_batch(&args.input, Duration::from_secs(args.pause))?;
        print_stats(&studio);
        return Ok(());
    }

    let (host, marketplace, catalog) = storefront_clients(args.catalog_product_id)?;
    let files = discover_artwork(&args.input)?;
    for (index, file) in files.iter().enumerate() {
        if index > 0 {
            std::thread::sleep(Duration::from_secs(args.pause));
        }
        let outcome = match studio.process_artwork(file) {
            Ok(outcome) => outcome,
            Err(e) => {
                eprintln!("{}: {e}", file.display());
                continue;
            }
        };
        let targets = PublishTargets {
            host: &host,
            marketplace: &marketplace,
            catalog: catalog.clone(),
            product_type: "tshirt".to_string(),
        };
        match studio.publish_product(&outcome.slug, &targets) {
            Ok(created) => eprintln!("published {} as product {}", outcome.slug, created.id),
            Err(e) => eprintln!("publish {} failed: {e}", outcome.slug),
        }
    }

    print_stats(&studio);
    Ok(())
}

fn cmd_publish(
    args: PublishArgs,
    config: StudioConfig,
    ledger: &std::path::Path,
    out_dir: &std::path::Path,
) -> anyhow::Result<()> {
    let mut studio = Studio::new(config, ledger, out_dir)?;
    let (host, marketplace, catalog) = storefront_clients(args.catalog_product_id)?;

    let targets = PublishTargets {
        host: &host,
        marketplace: &marketplace,
        catalog,
        product_type: "tshirt".to_string(),
    };
    let created = studio.publish_product(&args.slug, &targets)?;
    eprintln!("published {} as product {}", args.slug, created.id);
    Ok(())
}

fn cmd_ledger(path: &std::path::Path) -> anyhow::Result<()> {
    let ledger = Ledger::load_or_create(path)?;
    println!("{} products tracked", ledger.len());
    for (status, count) in ledger.status_counts() {
        println!("  {status:?}: {count}");
    }
    Ok(())
}

fn storefront_clients(
    catalog_product_id: u64,
) -> anyhow::Result<(ImgurClient, PrintfulClient, Vec<monoprint::publish::CatalogVariant>)> {
    let imgur_id = std::env::var("IMGUR_CLIENT_ID").context("IMGUR_CLIENT_ID not set")?;
    let api_key = std::env::var("PRINTFUL_API_KEY").context("PRINTFUL_API_KEY not set")?;
    let store_id = std::env::var("PRINTFUL_STORE_ID").context("PRINTFUL_STORE_ID not set")?;

    let host = ImgurClient::new(imgur_id)?;
    let marketplace = PrintfulClient::new(api_key, store_id)?;
    let catalog = marketplace.catalog_variants(catalog_product_id)?;
    Ok((host, marketplace, catalog))
}

fn print_stats(studio: &Studio) {
    let stats = studio.stats();
    eprintln!(
        "processed {} images, {} titles, {} compositions, {} published, {} errors in {:.1}s",
        stats.images_processed,
        stats.titles_rendered,
        stats.compositions_created,
        stats.products_published,
        stats.errors.len(),
        stats.elapsed().as_secs_f64()
    );
}
