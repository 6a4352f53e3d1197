// Mon Jan 19 2026 - Alex

use clap::Parser;
use colored::Colorize;
use memfind::{
    config::FinderConfig,
    finder::{FindReport, Finder, SessionReport},
    memory::platform::NativeMemory,
    pattern::{OverlapPolicy, SearchPattern},
    ui::{self, ProgressManager},
    window::{NativeLocator, WindowLocator},
};
use std::fs::File;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::time::Instant;

#[derive(Parser, Debug)]
#[command(author = "Alex")]
#[command(version = "1.0.0")]
#[command(about = "Finds a 32-bit value in the writable private memory of a running process", long_about = None)]
struct Args {
    /// Target process id
    #[arg(short, long, conflicts_with = "window", required_unless_present = "window")]
    pid: Option<u32>,

    /// Exact title of a top-level window owned by the target process
    #[arg(short, long)]
    window: Option<String>,

    #[arg(long, requires = "window")]
    bring_to_front: bool,

    /// Value to search for, decimal or 0x-prefixed hex
    #[arg(short = 'v', long, value_parser = parse_u32)]
    value: u32,

    #[arg(short, long)]
    threads: Option<usize>,

    /// Advance past each match instead of one byte
    #[arg(long)]
    no_overlap: bool,

    /// Give up scanning after this many seconds
    #[arg(long)]
    timeout: Option<u64>,

    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Write the full report as JSON
    #[arg(short, long)]
    json: Option<PathBuf>,

    /// Maximum number of matches printed
    #[arg(short, long, default_value = "50")]
    limit: usize,

    #[arg(long)]
    no_progress: bool,

    #[arg(long, default_value = "warn")]
    log_level: String,
}

fn parse_u32(s: &str) -> Result<u32, String> {
    let s = s.trim();
    let parsed = match s.strip_prefix("0x").or_else(|| s.strip_prefix("0X")) {
        Some(hex) => u32::from_str_radix(hex, 16),
        None => s.parse::<u32>(),
    };
    parsed.map_err(|e| format!("invalid u32 value {:?}: {}", s, e))
}

fn setup_logging(level: &str) {
    let level = match level.to_lowercase().as_str() {
        "trace" => log::LevelFilter::Trace,
        "debug" => log::LevelFilter::Debug,
        "info" => log::LevelFilter::Info,
        "warn" => log::LevelFilter::Warn,
        "error" => log::LevelFilter::Error,
        "off" => log::LevelFilter::Off,
        _ => log::LevelFilter::Warn,
    };

    env_logger::Builder::new()
        .filter_level(level)
        .format_timestamp(None)
        .init();
}

fn load_config(args: &Args) -> anyhow::Result<FinderConfig> {
    let mut config = match &args.config {
        Some(path) => FinderConfig::from_file(path)?,
        None => FinderConfig::default(),
    };

    if let Some(threads) = args.threads {
        config = config.with_threads(threads);
    }
    if args.no_overlap {
        config = config.with_overlap(OverlapPolicy::NonOverlapping);
    }
    if let Some(seconds) = args.timeout {
        config = config.with_timeout(seconds);
    }
    if args.no_progress {
        config = config.with_progress(false);
    }

    config.validate().map_err(|e| anyhow::anyhow!(e))?;
    Ok(config)
}

fn resolve_pid(args: &Args) -> anyhow::Result<u32> {
    if let Some(pid) = args.pid {
        return Ok(pid);
    }

    let title = args.window.as_deref().unwrap_or_default();
    let info = NativeLocator::default().locate(title, args.bring_to_front)?;
    ui::print_success(&format!(
        "Window {:?} belongs to process {}",
        title, info.process_id
    ));
    ui::print_info(&format!(
        "Window bounds {} (capture file {})",
        info.bounds,
        info.bounds.capture_file_name()
    ));
    Ok(info.process_id)
}

fn main() {
    let args = Args::parse();
    setup_logging(&args.log_level);

    println!("{}", "Process Memory Finder".cyan().bold());
    println!("{}", "=".repeat(50).cyan());
    println!();

    let start_time = Instant::now();

    let config = match load_config(&args) {
        Ok(c) => c,
        Err(e) => {
            ui::print_error(&format!("Invalid configuration: {}", e));
            std::process::exit(2);
        }
    };

    let pid = match resolve_pid(&args) {
        Ok(pid) => pid,
        Err(e) => {
            ui::print_error(&format!("Failed to find target process: {}", e));
            std::process::exit(1);
        }
    };

    ui::print_info(&format!("Opening process {}", pid));

    let show_progress = config.show_progress;
    let finder = match Finder::open(NativeMemory::new(), pid, config) {
        Ok(f) => f,
        Err(e) => {
            ui::print_error(&format!("Failed to open process {}: {}", pid, e));
            std::process::exit(1);
        }
    };

    let walk = finder.walk_summary();
    ui::print_success(&format!(
        "Walked {} regions, {} interesting ({:?})",
        walk.visited,
        finder.interesting_count(),
        walk.end
    ));

    let pattern = SearchPattern::from_u32(args.value);
    ui::print_info(&format!(
        "Searching for {} (0x{:08x}) as [{}]",
        args.value, args.value, pattern
    ));

    let progress_manager = ProgressManager::new().with_enabled(show_progress);
    let progress = progress_manager.create_scan_progress(finder.interesting_count());
    let cancel = finder.cancel_token();
    if let Some(limit) = cancel.remaining() {
        ui::print_info(&format!("Giving up after {:.0?}", limit));
    }
    let searched = finder.find(&pattern, &cancel, &progress);
    match &searched {
        Ok(report) if report.complete => progress.finish(),
        Ok(_) => progress.abandon("timed out"),
        Err(_) => progress.abandon("failed"),
    }

    let close_error = match finder.close() {
        Ok(()) => None,
        Err(e) => {
            ui::print_error(&format!("Failed to close process handle: {}", e));
            Some(e.to_string())
        }
    };

    let report = match searched {
        Ok(r) => r,
        Err(e) => {
            ui::print_error(&format!("Search failed: {}", e));
            std::process::exit(1);
        }
    };

    println!();
    print_matches(&report, args.limit);

    let session = SessionReport {
        value: args.value,
        report,
        close_error,
    };

    if let Some(path) = &args.json {
        match save_report(&session, path) {
            Ok(()) => ui::print_success(&format!("Report saved to: {}", path.display())),
            Err(e) => ui::print_error(&format!("Failed to save report: {}", e)),
        }
    }

    let elapsed = start_time.elapsed();
    println!();
    println!("{}", "=".repeat(50).cyan());
    println!(
        "{} Search complete in {:.2}s",
        "[+]".green(),
        elapsed.as_secs_f64()
    );
    println!(
        "{} Matches: {} in {} of {} regions",
        "[+]".green(),
        session.report.match_count(),
        session.report.matches_by_region().len(),
        session.report.interesting_regions
    );
    if !session.report.partial_reads.is_empty() {
        ui::print_warning(&format!(
            "{} regions were only partially readable",
            session.report.partial_reads.len()
        ));
    }
    if !session.report.complete {
        ui::print_warning("Search stopped before every region was scanned");
    }
}

fn print_matches(report: &FindReport, limit: usize) {
    println!("{}", "Matches".cyan().bold());
    println!("{}", "-".repeat(40).cyan());

    if report.matches.is_empty() {
        println!("  {}", "none".yellow());
        return;
    }

    for m in report.matches.iter().take(limit) {
        println!(
            "  {} (region {} + 0x{:x})",
            m.address.to_string().green(),
            m.region_base,
            m.offset
        );
    }
    if report.matches.len() > limit {
        println!("  ... {} more", report.matches.len() - limit);
    }
}

fn save_report(session: &SessionReport, path: &Path) -> Result<(), std::io::Error> {
    let json_string = serde_json::to_string_pretty(session)
        .map_err(|e| std::io::Error::new(std::io::ErrorKind::Other, e))?;

    let mut file = File::create(path)?;
    file.write_all(json_string.as_bytes())?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_u32() {
        assert_eq!(parse_u32("1337"), Ok(1337));
        assert_eq!(parse_u32("0xDEADBEEF"), Ok(0xdead_beef));
        assert_eq!(parse_u32("0Xff"), Ok(0xff));
        assert!(parse_u32("-1").is_err());
        assert!(parse_u32("0x1_0000_0000").is_err());
    }

    #[test]
    fn test_args_require_a_target() {
        assert!(Args::try_parse_from(["memfind", "--value", "5"]).is_err());
        assert!(Args::try_parse_from(["memfind", "--pid", "1", "--window", "x", "--value", "5"]).is_err());

        let args = Args::try_parse_from(["memfind", "--pid", "42", "--value", "0x10", "--no-overlap"]).unwrap();
        assert_eq!(args.pid, Some(42));
        assert_eq!(args.value, 16);
        assert!(args.no_overlap);
    }
}
