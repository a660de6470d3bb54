//! Replays recorded GPS tracks through the acquisition controller.

mod scripted;
mod track;

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use owo_colors::OwoColorize;

use geotag_acquisition::{
    AcquisitionBuilder, AcquisitionConfig, AcquisitionState, Clock, ManualClock,
    ManualScheduler, PresentationSink, StatusView, SystemClock,
};
use geotag_geocode::{OfflineGeocoder, Placemark};
use geotag_records::{
    CATEGORIES, DEFAULT_CATEGORY, JsonFileStore, RecordStore, TagDraft, is_known_category,
    sections_by_category,
};

use scripted::ScriptedSource;
use track::Track;

#[derive(Parser)]
#[command(name = "geotag-sim")]
#[command(about = "Replay GPS tracks through the geotag location controller", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Replay a track and print every status change
    Replay(ReplayArgs),
    /// Print the tagged locations in a store, grouped by category
    List {
        /// Store document (defaults to the documents directory)
        #[arg(long)]
        store: Option<PathBuf>,
    },
    /// Acquire a real fix from the platform positioning service
    Live {
        /// Stop once a reading is at least this accurate, in meters
        #[arg(long, default_value_t = 10.0)]
        desired_accuracy: f64,
        /// Address table (a track file's `geocoder` section is enough)
        #[arg(long)]
        places: Option<PathBuf>,
    },
    /// Print the available categories
    Categories,
}

#[derive(Args)]
struct ReplayArgs {
    /// Track file (JSON)
    track: PathBuf,
    /// Stop once a reading is at least this accurate, in meters
    #[arg(long, default_value_t = 10.0)]
    desired_accuracy: f64,
    /// Give up after this many seconds without a fix
    #[arg(long, default_value_t = 60)]
    timeout: u64,
    /// Ignore readings older than this many seconds
    #[arg(long, default_value_t = 5)]
    max_age: u64,
    /// Tag the final fix into this store document
    #[arg(long)]
    save: Option<PathBuf>,
    /// Description for the saved record
    #[arg(long, default_value = "")]
    description: String,
    /// Category for the saved record
    #[arg(long, default_value = DEFAULT_CATEGORY)]
    category: String,
}

fn main() -> Result<()> {
    env_logger::init();
    let cli = Cli::parse();

    match cli.command {
        Commands::Replay(args) => replay(&args),
        Commands::List { store } => list(store.as_deref()),
        Commands::Live {
            desired_accuracy,
            places,
        } => live(desired_accuracy, places.as_deref()),
        Commands::Categories => {
            for category in CATEGORIES {
                println!("{category}");
            }
            Ok(())
        }
    }
}

/// Prints each state change as the screen would show it.
struct PrintSink {
    clock: ManualClock,
    start_ms: u64,
}

impl PresentationSink for PrintSink {
    fn on_status_changed(&self, state: &AcquisitionState) {
        let elapsed = self.clock.now_ms().saturating_sub(self.start_ms);
        let view = StatusView::from_state(state, true);
        let at = format!("[{:>6.1}s]", Duration::from_millis(elapsed).as_secs_f64());

        if state.has_fix() {
            println!(
                "{} {} {}  [{}]",
                at.dimmed(),
                view.latitude.cyan(),
                view.longitude.cyan(),
                view.button_title
            );
            for line in view.address.lines() {
                println!("{:>10} {}", "", line);
            }
        } else {
            println!("{} {}  [{}]", at.dimmed(), view.message.yellow(), view.button_title);
        }
    }

    fn on_first_fix(&self, placemark: &Placemark) {
        println!("{}", format!("📍 Address found: {}", placemark.summary()).green().bold());
    }
}

fn replay(args: &ReplayArgs) -> Result<()> {
    if !is_known_category(&args.category) {
        anyhow::bail!(
            "Unknown category '{}' (see `geotag-sim categories`)",
            args.category
        );
    }
    let track = Track::load(&args.track)?;
    let config = AcquisitionConfig::default()
        .desired_accuracy(args.desired_accuracy)
        .timeout(Duration::from_secs(args.timeout))
        .max_sample_age(Duration::from_secs(args.max_age));

    let start_ms = geotag_location::timestamp_now();
    let clock = ManualClock::new(start_ms);
    let scheduler = ManualScheduler::new(clock.clone());
    let source = Arc::new(ScriptedSource::default());

    println!(
        "{}",
        format!(
            "▶ Replaying {} ({} steps)",
            args.track.display(),
            track.steps.len()
        )
        .bold()
    );

    let mut acquisition = AcquisitionBuilder::new(source.clone(), Arc::new(track.geocoder))
        .sink(Arc::new(PrintSink {
            clock: clock.clone(),
            start_ms,
        }))
        .config(config)
        .clock(Arc::new(clock.clone()))
        .scheduler(Arc::new(scheduler.clone()))
        .build();

    acquisition.handle().start();
    acquisition.pump();

    for step in &track.steps {
        let due = start_ms.saturating_add(step.at_ms());
        if let Some(wait) = due.checked_sub(clock.now_ms()) {
            scheduler.advance(Duration::from_millis(wait));
            acquisition.pump();
        }
        if !source.is_running() {
            break;
        }
        source.feed(step.event(clock.now_ms()));
        acquisition.pump();
    }

    // Let the session time out if the track ran dry.
    if acquisition.state().is_searching() {
        scheduler.advance(config.timeout);
        acquisition.pump();
    }
    // Still searching means the session had a fix when the timer fired.
    if acquisition.state().is_searching() {
        acquisition.handle().stop();
        acquisition.pump();
    }

    let state = acquisition.state().clone();
    summarize(&state);

    if let Some(path) = &args.save {
        save(path, &state, args, clock.now_ms())?;
    }
    Ok(())
}

fn live(desired_accuracy: f64, places: Option<&Path>) -> Result<()> {
    let geocoder = match places {
        Some(path) => Track::load_places(path)?,
        None => OfflineGeocoder::new(),
    };
    let source = geotag_location::sys::default_source();
    let clock = ManualClock::new(geotag_location::timestamp_now());
    let mut acquisition = AcquisitionBuilder::new(source, Arc::new(geocoder))
        .sink(Arc::new(PrintSink {
            start_ms: clock.now_ms(),
            clock: clock.clone(),
        }))
        .config(AcquisitionConfig::default().desired_accuracy(desired_accuracy))
        .clock(Arc::new(SystemClock))
        .build();

    println!("{}", "▶ Waiting for the positioning service...".bold());
    acquisition.handle().start();
    loop {
        clock.set(geotag_location::timestamp_now());
        acquisition.pump();
        let state = acquisition.state();
        if !state.is_searching() && !state.geocode_in_flight() {
            break;
        }
        std::thread::sleep(Duration::from_millis(100));
    }

    summarize(acquisition.state());
    Ok(())
}

fn summarize(state: &AcquisitionState) {
    match (state.best_sample(), state.last_error()) {
        (Some(best), _) => println!(
            "{} {} ±{:.1} m",
            "✅ Fix:".green().bold(),
            best.coordinate,
            best.horizontal_accuracy
        ),
        (None, Some(err)) => println!("{} {err}", "❌ No fix:".red().bold()),
        (None, None) => println!("{}", "⚠️ No fix".yellow()),
    }
    if let Some(err) = state.geocode_error() {
        println!("{} {err}", "⚠️ Address:".yellow());
    }
}

fn save(path: &Path, state: &AcquisitionState, args: &ReplayArgs, now_ms: u64) -> Result<()> {
    let Some(best) = state.best_sample() else {
        anyhow::bail!("Nothing to save: the replay produced no fix");
    };
    let mut store = JsonFileStore::open(path)
        .with_context(|| format!("Failed to open store {}", path.display()))?;
    let draft = TagDraft::from_fix(best, state.placemark().cloned(), now_ms)
        .description(args.description.clone())
        .category(args.category.clone());
    let record = store.insert(draft).context("Failed to save record")?;
    println!(
        "{} #{} \"{}\" in {}",
        "💾 Tagged".green().bold(),
        record.id,
        record.title(),
        path.display()
    );
    Ok(())
}

fn list(path: Option<&Path>) -> Result<()> {
    let store = match path {
        Some(path) => JsonFileStore::open(path),
        None => JsonFileStore::open_default(),
    }
    .context("Failed to open store")?;

    let sections = sections_by_category(store.records());
    if sections.is_empty() {
        println!("{}", "No tagged locations.".dimmed());
    }
    for section in sections {
        println!("{}", section.category.to_uppercase().bold());
        for record in section.records {
            println!("  {} {}", record.title().cyan(), record.date_label().dimmed());
            println!("    {}", record.list_address());
        }
    }
    Ok(())
}
