/*!
 * Command-line interface for farpath
 */

use std::io;
use std::time::Instant;

use clap::{CommandFactory, Parser};
use clap_complete::generate;
use indicatif::{ProgressBar, ProgressStyle};
use tracing_subscriber::EnvFilter;

use farpath::config::{Args, Command, ScanArgs};
use farpath::error::Result;
use farpath::path::{parse, PathDescriptor};
use farpath::report::{ChildStats, ReportFormat, Reporter, ScanReport};
use farpath::scanner::{ScanOptions, Scanner, SearchDepth};
use farpath::transfer::{
    differing_chunks, hash_file, is_equal_contents, CopyJob, JobState,
};
use farpath::types::DirectoryTree;
use farpath::utils::{format_attributes, format_file_size};
use farpath::{ops, Entry};

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(io::stderr)
        .init();

    let args = Args::parse();
    if let Err(e) = run(args) {
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}

fn run(args: Args) -> Result<()> {
    match args.command {
        Command::List(scan) => list(&scan),
        Command::Tree { scan, json } => tree(&scan, json),
        Command::Stats { scan, json } => stats(&scan, json),
        Command::Copy {
            source,
            target,
            chunk_size,
            overwrite,
        } => copy(&source, &target, chunk_size, overwrite),
        Command::Compare {
            left,
            right,
            chunk_size,
        } => compare(&left, &right, chunk_size),
        Command::Hash { path, algorithm } => {
            let path = parse(&path)?;
            println!("{}  {}", hash_file(&path, algorithm)?, path);
            Ok(())
        }
        Command::Completions { shell } => {
            generate(shell, &mut Args::command(), "farpath", &mut io::stdout());
            Ok(())
        }
    }
}

fn scan_root(scan: &ScanArgs) -> Result<(PathDescriptor, Scanner)> {
    let root = parse(&scan.path)?;
    Ok((root, Scanner::new(scan.scan_options())))
}

fn list(scan: &ScanArgs) -> Result<()> {
    let (root, scanner) = scan_root(scan)?;
    for entry in scanner.entries(&root) {
        let entry = entry?;
        let size = match &entry {
            Entry::File(f) => format_file_size(f.len),
            Entry::Directory(_) => String::new(),
        };
        println!(
            "{} {:>10} {}",
            format_attributes(entry.meta().attributes),
            size,
            entry.path()
        );
    }
    Ok(())
}

fn tree(scan: &ScanArgs, json: bool) -> Result<()> {
    let (root, scanner) = scan_root(scan)?;
    let tree = scanner.build_tree(&root)?;
    if json {
        match serde_json::to_string_pretty(&tree) {
            Ok(out) => println!("{out}"),
            Err(e) => eprintln!("error: {e}"),
        }
    } else {
        print_tree(&tree, 0);
    }
    Ok(())
}

fn print_tree(tree: &DirectoryTree, depth: usize) {
    let indent = "  ".repeat(depth);
    let name = tree
        .directory
        .path
        .name()
        .unwrap_or_else(|| tree.directory.path.display_name());
    println!("{indent}{name}/");
    for file in &tree.files {
        let file_name = file.path.name().unwrap_or_default();
        println!(
            "{indent}  {file_name} ({})",
            format_file_size(file.len)
        );
    }
    for child in &tree.directories {
        print_tree(child, depth + 1);
    }
}

fn stats(scan: &ScanArgs, json: bool) -> Result<()> {
    let (root, scanner) = scan_root(scan)?;
    let start = Instant::now();
    let totals = scanner.compute_statistics(&root)?;

    let mut children = Vec::new();
    let top = Scanner::new(ScanOptions {
        depth: SearchDepth::ThisLevelOnly,
        ..scan.scan_options()
    });
    for dir in top.list_directories(&root) {
        let dir = dir?;
        children.push(ChildStats {
            name: dir.path.name().unwrap_or_default().to_string(),
            stats: scanner.compute_statistics(&dir.path)?,
        });
    }

    let report = ScanReport {
        root: root.display_name().to_string(),
        duration: start.elapsed(),
        totals,
        children,
    };
    let format = if json {
        ReportFormat::Json
    } else {
        ReportFormat::ConsoleTable
    };
    Reporter::new(format).print_report(&report);
    Ok(())
}

fn copy(source: &str, target: &str, chunk_size: usize, overwrite: bool) -> Result<()> {
    let source = parse(source)?;
    let target = parse(target)?;
    let total = ops::stat_file(&source)?.len;

    let progress = ProgressBar::new(total);
    progress.set_style(
        ProgressStyle::default_bar()
            .template("{bar:40.cyan/blue} {bytes}/{total_bytes} ({bytes_per_sec}, ETA {eta})")
            .unwrap_or_else(|_| ProgressStyle::default_bar()),
    );

    let mut job = CopyJob::new(source, target)
        .chunk_size(chunk_size)
        .overwrite(overwrite);
    let state = job.run_with(|chunk| progress.inc(chunk.len() as u64)).clone();
    progress.finish_and_clear();

    match state {
        JobState::Completed => {
            println!(
                "copied {} to {}",
                format_file_size(job.bytes_copied()),
                job.target()
            );
            Ok(())
        }
        JobState::Cancelled => {
            println!("copy cancelled after {} bytes", job.bytes_copied());
            Ok(())
        }
        JobState::Failed(e) => Err(e),
        // run() drives a pending job to a terminal state
        JobState::Pending | JobState::Running => Ok(()),
    }
}

fn compare(left: &str, right: &str, chunk_size: usize) -> Result<()> {
    let left = parse(left)?;
    let right = parse(right)?;
    if is_equal_contents(&left, &right, chunk_size)? {
        println!("equal");
        return Ok(());
    }
    let differing = differing_chunks(&left, &right, chunk_size)?;
    println!("{} differing chunk(s):", differing.len());
    for chunk in differing {
        println!(
            "  offset {:>12}  {}",
            chunk.offset(),
            format_file_size(chunk.len() as u64)
        );
    }
    Ok(())
}
