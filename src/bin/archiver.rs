mod progress;

use std::fs::File;
use std::io::{BufRead, BufReader, Read};
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::{ArgAction, ArgGroup, Parser};
use color_eyre::eyre::{Result, WrapErr};
use console::style;
use huffarc::{ArchiveError, ArchiveStats, ErrorKind};
use progress::ProgressMonitor;
use tracing::{info, level_filters::LevelFilter, warn};
use tracing_indicatif::IndicatifLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Compress and uncompress files with Huffman coding.
///
/// On success three numbers are printed, one per line: the number of bytes in the
/// original data, the size of the encoded payload and the size of header and tree.
#[derive(Parser)]
#[command(version, about, long_about = None)]
#[command(group(ArgGroup::new("mode").required(true).args(["compress", "uncompress"])))]
struct Cli {
    /// Compress the input into an archive
    #[arg(short = 'c', long)]
    compress: bool,

    /// Restore the original data from an archive
    #[arg(short = 'u', long)]
    uncompress: bool,

    /// The file to read from
    #[arg(short = 'f', long = "file", value_name = "INPUT")]
    input: PathBuf,

    /// The file to write to, it is created or truncated
    #[arg(short = 'o', long = "output", value_name = "OUTPUT")]
    output: PathBuf,

    /// Log more about what is happening, repeat for even more
    #[arg(short, long, action = ArgAction::Count)]
    verbose: u8,

    /// Show a progress bar while the input is read
    #[arg(long)]
    progress: bool,
}

fn main() -> ExitCode {
    if let Err(e) = color_eyre::install() {
        eprintln!("failed to install the error report handler: {e}");
    }

    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(e) if !e.use_stderr() => e.exit(),
        Err(e) => {
            // Usage problems are reported by clap itself, only the exit code is ours
            let _ = e.print();
            return exit_code(ErrorKind::InvalidArguments);
        }
    };
    init_tracing(cli.verbose);

    match run(&cli) {
        Ok(stats) => {
            println!("{stats}");
            ExitCode::SUCCESS
        }
        Err(report) => {
            eprintln!("{report:?}");
            exit_code(classify(&report))
        }
    }
}

/// Invocations clap accepts but that can't be carried out.
#[derive(Debug, thiserror::Error)]
enum UsageError {
    #[error("{} is both input and output, it would be truncated before it is read", .0.display())]
    SameFile(PathBuf),
}

fn run(cli: &Cli) -> Result<ArchiveStats> {
    // Both files are opened before any data is processed
    let mut input = BufReader::new(open_input(&cli.input, cli.progress)?);
    if is_same_file(&cli.input, &cli.output) {
        return Err(UsageError::SameFile(cli.output.clone()).into());
    }
    let output = File::create(&cli.output)
        .wrap_err_with(|| format!("can't open output file {}", cli.output.display()))?;

    let (verb, stats) = if cli.compress {
        let stats = huffarc::compress(input, output)
            .wrap_err_with(|| format!("failed to compress {}", cli.input.display()))?;
        ("compressed", stats)
    } else {
        let stats = huffarc::decompress(&mut input, output)
            .wrap_err_with(|| format!("failed to uncompress {}", cli.input.display()))?;
        if matches!(input.fill_buf(), Ok(rest) if !rest.is_empty()) {
            warn!(
                "{} has trailing bytes after the archive, they were ignored",
                cli.input.display()
            );
        }
        ("uncompressed", stats)
    };

    info!(
        "{} {} -> {} ({} symbols, {} payload bytes, {} header and tree bytes)",
        style(verb).green().bold(),
        cli.input.display(),
        cli.output.display(),
        stats.symbol_count,
        stats.payload_bytes,
        stats.header_and_tree_bytes
    );
    Ok(stats)
}

fn open_input(path: &Path, show_progress: bool) -> Result<Box<dyn Read>> {
    let file =
        File::open(path).wrap_err_with(|| format!("can't open input file {}", path.display()))?;
    if !show_progress {
        return Ok(Box::new(file));
    }
    let size = file
        .metadata()
        .wrap_err_with(|| format!("can't read the size of {}", path.display()))?
        .len();
    Ok(Box::new(ProgressMonitor::new(file, size, "reading")))
}

/// Whether both paths lead to the same existing file. An output that doesn't exist yet
/// can't be the input.
fn is_same_file(input: &Path, output: &Path) -> bool {
    match (input.canonicalize(), output.canonicalize()) {
        (Ok(input), Ok(output)) => input == output,
        _ => false,
    }
}

fn init_tracing(verbosity: u8) {
    let level = match verbosity {
        0 => LevelFilter::WARN,
        1 => LevelFilter::INFO,
        2 => LevelFilter::DEBUG,
        _ => LevelFilter::TRACE,
    };
    let indicatif_layer = IndicatifLayer::new();
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(indicatif_layer.get_stderr_writer())
                .with_target(false),
        )
        .with(indicatif_layer)
        .with(level)
        .init();
}

/// Find out which class of failure ended the run, looking through the context added on the way up.
fn classify(report: &color_eyre::Report) -> ErrorKind {
    for cause in report.chain() {
        if let Some(e) = cause.downcast_ref::<ArchiveError>() {
            return e.kind();
        }
        if cause.downcast_ref::<UsageError>().is_some() {
            return ErrorKind::InvalidArguments;
        }
        if cause.downcast_ref::<std::io::Error>().is_some() {
            return ErrorKind::Resource;
        }
    }
    ErrorKind::Resource
}

fn exit_code(kind: ErrorKind) -> ExitCode {
    ExitCode::from(kind.exit_code())
}

#[cfg(test)]
mod tests {
    use std::io;
    use std::path::PathBuf;

    use super::{classify, is_same_file, Cli, UsageError};
    use clap::{CommandFactory, Parser};
    use color_eyre::eyre::{Report, WrapErr};
    use huffarc::{ArchiveError, ErrorKind};

    fn wrapped<E>(error: E) -> Report
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        Err::<(), E>(error)
            .wrap_err_with(|| "failed to uncompress input.huf")
            .unwrap_err()
    }

    #[test]
    fn cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn flag_order_does_not_matter() {
        let a = Cli::try_parse_from(["archiver", "-c", "-f", "in.txt", "-o", "out.huf"]).unwrap();
        let b = Cli::try_parse_from(["archiver", "--output", "out.huf", "--file", "in.txt", "-c"])
            .unwrap();
        assert!(a.compress && b.compress);
        assert_eq!(a.input, b.input);
        assert_eq!(a.output, b.output);
    }

    #[test]
    fn exactly_one_mode() {
        assert!(Cli::try_parse_from(["archiver", "-f", "a", "-o", "b"]).is_err());
        assert!(Cli::try_parse_from(["archiver", "-c", "-u", "-f", "a", "-o", "b"]).is_err());
        let cli = Cli::try_parse_from(["archiver", "-u", "-f", "a", "-o", "b"]).unwrap();
        assert!(cli.uncompress && !cli.compress);
    }

    #[test]
    fn files_are_required() {
        assert!(Cli::try_parse_from(["archiver", "-c", "-f", "a"]).is_err());
        assert!(Cli::try_parse_from(["archiver", "-c", "-o", "b"]).is_err());
    }

    #[test]
    fn format_errors_exit_with_65() {
        let report = wrapped(ArchiveError::EmptyTree { symbol_count: 5 });
        assert_eq!(classify(&report), ErrorKind::Format);
        assert_eq!(classify(&report).exit_code(), 65);

        let report = wrapped(huffarc::decompress_to_vec(&[1, 2, 3]).unwrap_err());
        assert_eq!(classify(&report), ErrorKind::Format);
    }

    #[test]
    fn io_errors_exit_with_74() {
        let report = wrapped(io::Error::new(io::ErrorKind::PermissionDenied, "denied"));
        assert_eq!(classify(&report), ErrorKind::Resource);
        assert_eq!(classify(&report).exit_code(), 74);

        let report = wrapped(ArchiveError::ReadSourceError(io::Error::new(
            io::ErrorKind::Other,
            "disk on fire",
        )));
        assert_eq!(classify(&report), ErrorKind::Resource);
    }

    #[test]
    fn allocation_failures_exit_with_71() {
        let source = Vec::<u8>::new().try_reserve(usize::MAX).unwrap_err();
        let report = wrapped(ArchiveError::AllocationFailure {
            needed: u64::MAX,
            source,
        });
        assert_eq!(classify(&report), ErrorKind::AllocationFailure);
        assert_eq!(classify(&report).exit_code(), 71);
    }

    #[test]
    fn same_input_and_output_exit_with_64() {
        let report = Report::new(UsageError::SameFile(PathBuf::from("data.bin")));
        assert_eq!(classify(&report), ErrorKind::InvalidArguments);
        assert_eq!(classify(&report).exit_code(), 64);
    }

    #[test]
    fn same_file_detection() {
        let manifest = PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("Cargo.toml");
        let detour = PathBuf::from(env!("CARGO_MANIFEST_DIR"))
            .join("src")
            .join("..")
            .join("Cargo.toml");
        assert!(is_same_file(&manifest, &detour));
        assert!(!is_same_file(&manifest, &manifest.with_file_name("Readme.md")));
        assert!(!is_same_file(&manifest, &manifest.with_file_name("does-not-exist.huf")));
    }
}
