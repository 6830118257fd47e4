// main.rs

mod colorby;
mod combine;
mod coords;
mod metadata;
mod plot;
mod prefs;

// --- External Crate Imports ---
use anyhow::{anyhow, Context, Error, Result};
use clap::Parser;
use indicatif::{ProgressBar, ProgressStyle};
use log::{debug, info};
use std::{
    fs, io,
    path::{Path, PathBuf},
    time::Instant,
};

use crate::metadata::MetadataTable;

// --- Main Function ---
fn main() -> Result<(), Error> {
    let total_time_start = Instant::now();
    let cli_args = cli::CliArgs::parse();

    // Initialize logger
    let log_level = cli_args
        .log_level
        .parse::<log::LevelFilter>()
        .unwrap_or_else(|_| {
            eprintln!(
                "Warning: Invalid log level '{}' provided. Defaulting to Info.",
                cli_args.log_level
            );
            log::LevelFilter::Info
        });
    env_logger::Builder::new()
        .filter_level(log_level)
        .format_timestamp_micros()
        .init();

    info!("Starting pcoa_2d_plots with args: {:?}", cli_args);

    // Configure Rayon thread pool
    let num_threads = cli_args.threads.unwrap_or_else(num_cpus::get);
    info!("Using {} threads for rendering.", num_threads);
    rayon::ThreadPoolBuilder::new()
        .num_threads(num_threads)
        .build_global()?;

    let pb_style = ProgressStyle::default_bar()
        .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} categories ({percent}%)")
        .map_err(|e| anyhow!("Failed to create progress bar style: {}", e))?
        .progress_chars("=> ");
    let progress = ProgressBar::new(0).with_style(pb_style);

    let summary = run(&cli_args, &progress)?;

    info!(
        "Wrote {} plot(s) of {} samples and index {} in {:.2?}.",
        summary.image_paths.len(),
        summary.plotted_samples,
        summary.index_path.display(),
        total_time_start.elapsed()
    );
    Ok(())
}

/// Loads the inputs, resolves the colorby preferences and renders the plots
/// into a fresh run directory.
fn run(cli_args: &cli::CliArgs, progress: &ProgressBar) -> Result<plot::RenderSummary> {
    // --- 1. Coordinates ---
    let coord_data = coords::read_coords_file(&cli_args.coord_fname).with_context(|| {
        format!(
            "Failed to load coordinates from {}",
            cli_args.coord_fname.display()
        )
    })?;

    // --- 2. Mapping data, or a pseudo mapping of sample IDs ---
    let table = match &cli_args.map_fname {
        Some(map_fname) => metadata::read_mapping_file(map_fname)
            .with_context(|| format!("Failed to load mapping file {}", map_fname.display()))?,
        None => {
            info!("No mapping file given; building a pseudo mapping from the coordinate sample IDs.");
            MetadataTable::default_for_samples(&coord_data.sample_ids)
                .context("Failed to build the default mapping from the coordinates")?
        }
    };

    // --- 3. Colorby preferences ---
    let (prefs, table) = prefs::resolve_preferences(cli_args.colorby.as_deref(), table)
        .with_context(|| {
            format!(
                "Cannot color by '{}'",
                cli_args.colorby.as_deref().unwrap_or_default()
            )
        })?;
    info!("Resolved {} plot categories.", prefs.len());
    for (label, pref) in prefs.iter() {
        debug!("  '{}' -> column '{}'", label, pref.column);
    }

    // --- 4. Output directory and static assets ---
    let run_dir = output_dir::create_run_dir(&cli_args.dir_path)?;
    output_dir::stage_static_assets(&run_dir)?;

    // --- 5. Render ---
    let coord_file_name = cli_args
        .coord_fname
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| "coords".to_string());
    let request = plot::PlotRequest {
        prefs: &prefs,
        table: &table,
        coords: &coord_data,
        output_dir: &run_dir,
        coord_file_name: &coord_file_name,
    };
    let summary = plot::render_plots(&request, progress)
        .with_context(|| format!("Failed to render plots into {}", run_dir.display()))?;
    Ok(summary)
}

// --- Module Implementations ---

mod cli {
    use clap::Parser; // For the derive macro to find Parser
    use std::path::PathBuf;

    #[derive(Parser, Debug)]
    #[command(author, version, about = "Make 2D PCoA plots colored by sample metadata.", long_about = None, propagate_version = true)]
    pub(crate) struct CliArgs {
        #[arg(
            short = 'i',
            long = "coord_fname",
            required = true,
            help = "Principal coordinates file (tab-delimited, one line per sample)"
        )]
        pub(crate) coord_fname: PathBuf,

        #[arg(short = 'm', long = "map_fname", help = "Tab-delimited sample mapping file")]
        pub(crate) map_fname: Option<PathBuf>,

        #[arg(
            short = 'b',
            long = "colorby",
            help = "Mapping columns to color by, comma separated without spaces (e.g. 'Day,Type'). Join columns with '&&' to color by their combination (e.g. 'Type&&Day')"
        )]
        pub(crate) colorby: Option<String>,

        #[arg(
            short = 'o',
            long = "dir_path",
            default_value = ".",
            help = "Directory in which the run directory is created"
        )]
        pub(crate) dir_path: PathBuf,

        #[arg(short = 't', long)]
        pub(crate) threads: Option<usize>,

        #[arg(long, default_value = "Info")]
        pub(crate) log_level: String,
    }
}

mod output_dir {
    use super::{anyhow, fs, info, io, Context, Path, PathBuf, Result};

    pub(crate) const RUN_DIR_PREFIX: &str = "2d_plots_";
    const MAX_RUN_DIRS: u32 = 100_000;
    const OVERLIB_JS: &str = include_str!("../assets/overlib.js");

    /// Creates `<base>/2d_plots_<n>` for the smallest `n` not already taken.
    pub(crate) fn create_run_dir(base: &Path) -> Result<PathBuf> {
        fs::create_dir_all(base)
            .with_context(|| format!("Failed to create output directory {}", base.display()))?;
        for n in 0..MAX_RUN_DIRS {
            let candidate = base.join(format!("{}{}", RUN_DIR_PREFIX, n));
            match fs::create_dir(&candidate) {
                Ok(()) => {
                    info!("Created run directory: {}", candidate.display());
                    return Ok(candidate);
                }
                Err(e) if e.kind() == io::ErrorKind::AlreadyExists => continue,
                Err(e) => {
                    return Err(anyhow!(
                        "Failed to create run directory {}: {}",
                        candidate.display(),
                        e
                    ))
                }
            }
        }
        Err(anyhow!(
            "No free run directory name under {} (tried {} names).",
            base.display(),
            MAX_RUN_DIRS
        ))
    }

    /// Writes the tooltip script the HTML index loads from `js/`.
    pub(crate) fn stage_static_assets(run_dir: &Path) -> Result<PathBuf> {
        let js_dir = run_dir.join("js");
        fs::create_dir_all(&js_dir)
            .with_context(|| format!("Failed to create {}", js_dir.display()))?;
        let overlib_path = js_dir.join("overlib.js");
        fs::write(&overlib_path, OVERLIB_JS)
            .with_context(|| format!("Failed to write {}", overlib_path.display()))?;
        Ok(overlib_path)
    }

}
