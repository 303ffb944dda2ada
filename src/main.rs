use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use clap::{Parser, Subcommand};
use panahon_core::{AppError, Config, ConfigError};
use panahon_ui::{
    render_text, Backdrop, Command, TuiApp, WeatherService, WeatherView, WidgetState,
};
use panahon_weather::{
    Catalog, GeocodingClient, IpLocator, PositionSource, WeatherFetcher, WeatherProvider,
};

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Config file (default: <config dir>/panahon/config.toml)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Device latitude used for auto-detection
    #[arg(long, global = true, allow_negative_numbers = true)]
    lat: Option<f64>,

    /// Device longitude used for auto-detection
    #[arg(long, global = true, allow_negative_numbers = true)]
    lon: Option<f64>,

    /// Without a subcommand the interactive terminal UI starts
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the forecast for one municipality
    Show { name: String },
    /// Detect the municipality from the device position and print its forecast
    Detect,
    /// List catalog municipalities
    List {
        /// Case-insensitive name filter
        #[arg(short, long, default_value = "")]
        search: String,
    },
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    match run(cli) {
        Ok(code) => code,
        Err(e) => {
            tracing::error!("{}", e);
            eprintln!("{}", e.user_message());
            eprintln!("  caused by: {}", e);
            ExitCode::FAILURE
        }
    }
}

fn load_config(cli: &Cli) -> Result<Config, AppError> {
    let mut config = match &cli.config {
        Some(path) => Config::load_from(path),
        None => Config::load(),
    }
    .map_err(|e| ConfigError::Unreadable(format!("{:#}", e)))?;

    if cli.lat.is_some() {
        config.location.latitude = cli.lat;
    }
    if cli.lon.is_some() {
        config.location.longitude = cli.lon;
    }

    Ok(config)
}

fn run(cli: Cli) -> Result<ExitCode, AppError> {
    let config = load_config(&cli)?;

    // The terminal UI owns the screen, so its logs go to a file.
    if cli.command.is_none() {
        panahon_core::init_with_log_file(&config.log_path())?;
    } else {
        panahon_core::init()?;
    }

    let validation = config.validate();
    for warning in &validation.warnings {
        tracing::warn!("Config warning: {}", warning);
    }
    if !validation.is_valid() {
        return Err(ConfigError::Invalid(validation.error_summary()).into());
    }

    let catalog = Arc::new(Catalog::load(config.catalog.path.as_deref()));
    tracing::info!("{} municipalities in catalog", catalog.len());

    if let Some(Commands::List { search }) = &cli.command {
        for m in catalog.filter(search) {
            println!("{:<28} {:<24} {}", m.name, m.province, m.population);
        }
        return Ok(ExitCode::SUCCESS);
    }

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .map_err(|e| AppError::Runtime(e.to_string()))?;

    let request_timeout = Duration::from_secs(config.http.request_timeout_secs);
    let geocoder = GeocodingClient::new(
        &config.geocoding.base_url,
        &config.geocoding.country,
        &config.geocoding.user_agent,
        request_timeout,
    )
    .context("Failed to build geocoding client")?;
    let provider = WeatherProvider::new(&config.forecast.base_url, request_timeout)
        .context("Failed to build forecast client")?;

    let ip_lookup = if config.location.ip_lookup {
        Some(
            IpLocator::new(
                &config.location.ip_lookup_url,
                &config.geocoding.user_agent,
                request_timeout,
            )
            .context("Failed to build IP location client")?,
        )
    } else {
        None
    };
    let position = PositionSource::from_config(config.location.fixed_position(), ip_lookup);
    if !position.is_available() {
        tracing::info!("No position source configured, auto-detection will report unsupported");
    }

    let (service, outcomes) = WeatherService::new(
        runtime.handle().clone(),
        WeatherFetcher::new(geocoder, provider),
        catalog.clone(),
        position,
        Duration::from_secs(config.location.timeout_secs),
    );
    let slots = config.forecast.hourly_slots;

    match cli.command {
        None => {
            let mut app = TuiApp::new(catalog, service, outcomes, slots);
            panahon_ui::tui::launch(&mut app).map_err(|e| AppError::Terminal(format!("{:#}", e)))?;
            Ok(ExitCode::SUCCESS)
        }
        Some(Commands::Show { name }) => {
            let name = match catalog.get(&name).or_else(|| catalog.find_normalized(&name)) {
                Some(m) => m.name.clone(),
                None => {
                    tracing::warn!("{:?} is not in the catalog, looking it up anyway", name);
                    name
                }
            };
            let mut state = WidgetState::new();
            let first = state.select(name);
            Ok(drive(&service, &mut state, first, &catalog, slots))
        }
        Some(Commands::Detect) => {
            let mut state = WidgetState::new();
            let first = state.catalog_loaded(catalog.len());
            if first.is_none() {
                eprintln!("The municipality catalog is empty.");
                return Ok(ExitCode::FAILURE);
            }
            Ok(drive(&service, &mut state, first, &catalog, slots))
        }
        Some(Commands::List { .. }) => Ok(ExitCode::SUCCESS),
    }
}

/// Run commands to completion until the state machine asks for nothing
/// more, then print the result.
fn drive(
    service: &WeatherService,
    state: &mut WidgetState,
    mut next: Option<Command>,
    catalog: &Catalog,
    slots: usize,
) -> ExitCode {
    while let Some(command) = next {
        next = state.apply(service.run_blocking(command));
    }

    let view = WeatherView::build(state, catalog, slots);
    let backdrop = Backdrop::build(state.snapshot());
    print!("{}", render_text(&view, &backdrop));

    if view.panel.is_some() {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    }
}
