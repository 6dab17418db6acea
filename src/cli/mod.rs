// src/cli/mod.rs
//
// Command-line interface module

mod args;
mod output;

pub use args::{AnalyzeArgs, Cli, Command, GenerateArgs};
pub use output::{format_json, format_report, format_summary, format_timestamp, AnalysisReport};

use anyhow::{bail, Context, Result};
use colorful::Colorful;
use indicatif::{ParallelProgressIterator, ProgressBar, ProgressStyle};
use rayon::prelude::*;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

use crate::config::EngineConfig;
use crate::core::decoder::load_signal;
use crate::core::visualization::{render_overview, PlotConfig};
use crate::core::{AudioSignal, PatternAnalyzer};
use crate::testgen::{FixtureGenerator, FixtureSpec};

const AUDIO_EXTENSIONS: [&str; 7] = ["flac", "wav", "mp3", "ogg", "m4a", "aac", "aiff"];

/// Run a parsed command line
pub fn run(cli: Cli) -> Result<()> {
    match cli.command {
        Command::Analyze(args) => analyze(&args, cli.verbose),
        Command::Generate(args) => generate(&args),
    }
}

fn analyze(args: &AnalyzeArgs, verbose: bool) -> Result<()> {
    let mut builder = PatternAnalyzer::builder()
        .config(EngineConfig::resolve(args.config.as_deref())?)
        .parallel(!args.sequential);
    if let Some(rate) = args.sample_rate {
        builder = builder.sample_rate(rate);
    }
    let analyzer = builder.build()?;
    let rate = analyzer.config().analysis_sample_rate;

    let pattern = load_signal(&args.pattern, rate)
        .with_context(|| format!("Failed to load pattern {}", args.pattern.display()))?;

    let targets = collect_audio_files(&args.target)?;
    if targets.is_empty() {
        println!("{}", "No audio files found!".red());
        return Ok(());
    }

    let outcomes: Vec<(PathBuf, Result<AnalysisReport>)> = if targets.len() == 1 {
        let target = targets[0].clone();
        let outcome = analyze_target(&analyzer, &pattern, &args.pattern, &target);
        vec![(target, outcome)]
    } else {
        let pb = ProgressBar::new(targets.len() as u64);
        pb.set_style(
            ProgressStyle::with_template("{spinner} [{bar:40}] {pos}/{len} {wide_msg}")?
                .progress_chars("=> "),
        );
        let outcomes = targets
            .par_iter()
            .progress_with(pb.clone())
            .map(|target| {
                let outcome = analyze_target(&analyzer, &pattern, &args.pattern, target);
                (target.clone(), outcome)
            })
            .collect();
        pb.finish_and_clear();
        outcomes
    };

    let mut reports = Vec::new();
    let mut failures = 0;
    for (target, outcome) in outcomes {
        match outcome {
            Ok(report) => reports.push(report),
            Err(e) => {
                failures += 1;
                log::error!("{}: {:#}", target.display(), e);
            }
        }
    }

    if let Some(plot) = &args.plot {
        write_plots(plot, &reports, targets.len() > 1)?;
    }

    let json = format_json(&reports)?;
    if let Some(path) = &args.output {
        std::fs::write(path, &json)
            .with_context(|| format!("Failed to write {}", path.display()))?;
        log::info!("Report written to {}", path.display());
    }

    if args.json {
        println!("{}", json);
    } else {
        for report in &reports {
            println!("{}", format_report(report, verbose));
        }
        if targets.len() > 1 {
            println!("{}", format_summary(&reports, failures));
        }
    }

    if reports.is_empty() {
        bail!("No target could be analyzed");
    }
    Ok(())
}

fn analyze_target(
    analyzer: &PatternAnalyzer,
    pattern: &AudioSignal,
    pattern_path: &Path,
    target: &Path,
) -> Result<AnalysisReport> {
    let signal = load_signal(target, analyzer.config().analysis_sample_rate)
        .with_context(|| format!("Failed to load target {}", target.display()))?;
    let result = analyzer.analyze(pattern, &signal)?;
    Ok(AnalysisReport::new(pattern_path, target, result))
}

/// One image per report; `plot` is a directory when there are several targets
fn write_plots(plot: &Path, reports: &[AnalysisReport], many: bool) -> Result<()> {
    let config = PlotConfig::default();
    if !many {
        if let Some(report) = reports.first() {
            render_overview(&report.result, &config, plot)?;
            println!("  Overview saved to: {}", plot.display());
        }
        return Ok(());
    }

    std::fs::create_dir_all(plot)?;
    for report in reports {
        let stem = Path::new(&report.target_filename)
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_else(|| report.analysis_id.to_string());
        render_overview(&report.result, &config, &plot.join(format!("{}.png", stem)))?;
    }
    println!("  Overviews saved to: {}", plot.display());
    Ok(())
}

fn is_audio_file(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|e| AUDIO_EXTENSIONS.contains(&e.to_lowercase().as_str()))
        .unwrap_or(false)
}

/// A single file as given, or every audio file under a directory (sorted)
pub fn collect_audio_files(path: &Path) -> Result<Vec<PathBuf>> {
    if path.is_file() {
        return Ok(vec![path.to_path_buf()]);
    }
    if !path.is_dir() {
        bail!("Target not found: {}", path.display());
    }

    let mut files: Vec<PathBuf> = WalkDir::new(path)
        .follow_links(true)
        .into_iter()
        .filter_map(|e| e.ok())
        .filter(|e| e.file_type().is_file() && is_audio_file(e.path()))
        .map(|e| e.into_path())
        .collect();
    files.sort();
    Ok(files)
}

fn generate(args: &GenerateArgs) -> Result<()> {
    let spec = FixtureSpec {
        name: args.name.clone(),
        sample_rate: args.sample_rate,
        pattern_secs: args.pattern_secs,
        target_secs: args.target_secs,
        offsets: args.offsets.clone(),
        ..Default::default()
    };
    let generator = FixtureGenerator::new(&args.out)?;
    let manifest = generator.generate_all(&[spec])?;

    for entry in &manifest.fixtures {
        println!(
            "{} {} + {} (pattern at {:?}s)",
            "✓".green(),
            entry.pattern_file,
            entry.target_file,
            entry.expected_offsets
        );
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_collect_filters_and_sorts() {
        let dir = std::env::temp_dir().join(format!("audiomatchr-cli-{}", uuid::Uuid::new_v4()));
        std::fs::create_dir_all(dir.join("nested")).unwrap();
        for name in ["b.wav", "a.FLAC", "notes.txt", "nested/c.mp3"] {
            std::fs::write(dir.join(name), b"").unwrap();
        }

        let files = collect_audio_files(&dir).unwrap();
        let names: Vec<String> = files
            .iter()
            .map(|p| p.strip_prefix(&dir).unwrap().display().to_string())
            .collect();
        assert_eq!(names, vec!["a.FLAC", "b.wav", "nested/c.mp3"]);

        std::fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_collect_missing_target() {
        assert!(collect_audio_files(Path::new("/nonexistent/audiomatchr")).is_err());
    }
}
