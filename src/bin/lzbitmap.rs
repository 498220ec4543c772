use std::fs::File;
use std::io::{self, BufWriter, Read, Write};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::time::Instant;

use clap::Parser;
use log::{debug, LevelFilter};
use lzbitmap::{
    compress_bound, decompress_to_vec, probe, CompressConfig, Compressor, Error,
    ParallelCompressor, SingleThreadedCompressor,
};

#[derive(Parser, Debug)]
#[command(name = "lzbitmap")]
#[command(about = "Compress and decompress LZBITMAP streams")]
#[command(version)]
struct Args {
    /// Input file (use - for stdin)
    #[arg(short, long)]
    input: PathBuf,

    /// Output file (use - for stdout)
    #[arg(short, long, required_unless_present = "probe")]
    output: Option<PathBuf>,

    /// Decompress instead of compress
    #[arg(short, long)]
    decompress: bool,

    /// Number of threads (0 = auto, 1 = single-threaded)
    #[arg(short = 't', long, default_value = "1")]
    threads: usize,

    /// Print the decompressed length and chunk count of a compressed input
    #[arg(long, conflicts_with = "decompress")]
    probe: bool,

    /// After compressing, decompress the result and compare checksums
    #[arg(long, conflicts_with = "decompress")]
    verify: bool,

    /// Show verbose statistics and debug logging
    #[arg(short, long)]
    verbose: bool,
}

const EXIT_SUCCESS: u8 = 0;
const EXIT_ERROR: u8 = 2;

fn main() -> ExitCode {
    match run() {
        Ok(code) => ExitCode::from(code),
        Err(e) => {
            eprintln!("Error: {} (code {})", e, e.kind().code());
            ExitCode::from(EXIT_ERROR)
        }
    }
}

fn run() -> Result<u8, Error> {
    let args = Args::parse();
    init_logging(args.verbose);

    let start = Instant::now();
    let input = read_input(&args.input)?;
    debug!("read {} bytes from {}", input.len(), args.input.display());

    if args.probe {
        let info = probe(&input)?;
        println!("Decompressed size: {} bytes", info.output_bytes);
        println!("Chunks: {}", info.chunks);
        return Ok(EXIT_SUCCESS);
    }

    let output_path = args
        .output
        .as_deref()
        .ok_or_else(|| Error::Internal("output required when not probing".to_string()))?;

    if args.decompress {
        let output = decompress_to_vec(&input)?;
        write_output(output_path, &output)?;

        if args.verbose {
            print_summary("Decompression", input.len(), output.len(), start);
        }
        return Ok(EXIT_SUCCESS);
    }

    let config = CompressConfig { num_threads: args.threads, ..Default::default() };
    let mut output = vec![0u8; compress_bound(input.len())];

    let stats = if config.num_threads == 1 {
        SingleThreadedCompressor::new().compress(&input, &mut output)?
    } else {
        ParallelCompressor::new(config).compress(&input, &mut output)?
    };
    output.truncate(stats.output_bytes as usize);

    if args.verify {
        verify_round_trip(&input, &output)?;
        if args.verbose {
            eprintln!("Verified: CRC32 {:08x}", crc32fast::hash(&input));
        }
    }

    write_output(output_path, &output)?;

    if args.verbose {
        print_summary("Compression", input.len(), output.len(), start);
        eprintln!("  Chunks written:   {}", stats.chunks_written);
        eprintln!("  Chunks discarded: {}", stats.chunks_discarded);
    }

    Ok(EXIT_SUCCESS)
}

fn init_logging(verbose: bool) {
    let default = if verbose { LevelFilter::Debug } else { LevelFilter::Warn };
    env_logger::Builder::new().filter_level(default).parse_default_env().init();
}

fn read_input(path: &Path) -> io::Result<Vec<u8>> {
    let mut data = Vec::new();
    if path.to_str() == Some("-") {
        io::stdin().lock().read_to_end(&mut data)?;
    } else {
        File::open(path)?.read_to_end(&mut data)?;
    }
    Ok(data)
}

fn write_output(path: &Path, data: &[u8]) -> io::Result<()> {
    if path.to_str() == Some("-") {
        let mut stdout = io::stdout().lock();
        stdout.write_all(data)?;
        stdout.flush()
    } else {
        let mut output = BufWriter::new(File::create(path)?);
        output.write_all(data)?;
        output.flush()
    }
}

fn verify_round_trip(original: &[u8], compressed: &[u8]) -> Result<(), Error> {
    let restored = decompress_to_vec(compressed)?;
    let expected = crc32fast::hash(original);
    let found = crc32fast::hash(&restored);
    if restored.len() != original.len() || expected != found {
        return Err(Error::Internal(format!(
            "verification failed: CRC32 {:08x} != {:08x} ({} vs {} bytes)",
            found,
            expected,
            restored.len(),
            original.len()
        )));
    }
    Ok(())
}

fn print_summary(operation: &str, input_bytes: usize, output_bytes: usize, start: Instant) {
    let elapsed = start.elapsed();
    eprintln!("{} complete:", operation);
    eprintln!("  Input bytes:      {}", input_bytes);
    eprintln!("  Output bytes:     {}", output_bytes);
    eprintln!("  Time:             {:.2?}", elapsed);
    eprintln!(
        "  Throughput:       {:.1} MB/s",
        input_bytes as f64 / elapsed.as_secs_f64() / 1_000_000.0
    );
}
