//! Binary entry point for the `zpipe` command-line tool.
//!
//! Compresses or decompresses a single stream, file-to-file or through
//! stdin/stdout (`-`), by pumping a codec session from an input source to an
//! output sink.  A deliberately small surface: the interesting machinery
//! lives in the library.

use std::fs::File;
use std::io::{self, BufReader, BufWriter, Read, Write};
use std::process::ExitCode;

use anyhow::{bail, Context, Result};
use clap::Parser;

use zstream::checksum::ChecksumFamily;
use zstream::stream::pump::{ReadSource, WriteSink};
use zstream::stream::types::{LEVEL_MAX, LEVEL_MIN};
use zstream::{Mode, Params, Session};

/// Marker for stdin/stdout endpoints.
const STDIO_MARK: &str = "-";

/// Suffix appended to compressed output names and stripped on decompression.
const Z_EXTENSION: &str = ".z";

/// Chunk size used when pulling from the input handle.
const PUMP_CHUNK: usize = 64 * 1024;

#[derive(Parser, Debug)]
#[command(
    name = "zpipe",
    version = zstream::ZSTREAM_VERSION_STRING,
    about = "Compress or decompress a stream through the zstream session layer"
)]
struct Args {
    /// Decompress instead of compress.
    #[arg(short = 'd', long)]
    decompress: bool,

    /// Compression level (0 = store, 10 = best).
    #[arg(short = 'l', long, default_value_t = 6)]
    level: i32,

    /// Also compute a checksum of the uncompressed stream.
    #[arg(short = 'c', long, value_parser = parse_family)]
    checksum: Option<ChecksumFamily>,

    /// Overwrite the output file if it exists.
    #[arg(short = 'f', long)]
    force: bool,

    /// Report sizes, ratio, and checksum on stderr.
    #[arg(short = 'v', long)]
    verbose: bool,

    /// Input file, or `-` for stdin.
    input: String,

    /// Output file; derived from the input name when omitted, `-` for stdout.
    output: Option<String>,
}

fn parse_family(s: &str) -> Result<ChecksumFamily, String> {
    match s.to_ascii_lowercase().as_str() {
        "crc32" => Ok(ChecksumFamily::Crc32),
        "adler32" => Ok(ChecksumFamily::Adler32),
        _ => Err(format!("unknown checksum family '{s}' (crc32 | adler32)")),
    }
}

/// Derive the output path when none was given.
fn default_output(input: &str, decompress: bool) -> Result<String> {
    if input == STDIO_MARK {
        return Ok(STDIO_MARK.to_string());
    }
    if decompress {
        match input.strip_suffix(Z_EXTENSION) {
            Some(stem) if !stem.is_empty() => Ok(stem.to_string()),
            _ => bail!("cannot derive output name from '{input}': expected a '{Z_EXTENSION}' suffix"),
        }
    } else {
        Ok(format!("{input}{Z_EXTENSION}"))
    }
}

fn open_input(name: &str) -> Result<Box<dyn Read>> {
    if name == STDIO_MARK {
        Ok(Box::new(io::stdin().lock()))
    } else {
        let file = File::open(name).with_context(|| format!("cannot open input '{name}'"))?;
        Ok(Box::new(BufReader::new(file)))
    }
}

fn open_output(name: &str, force: bool) -> Result<Box<dyn Write>> {
    if name == STDIO_MARK {
        return Ok(Box::new(io::stdout().lock()));
    }
    if !force && std::path::Path::new(name).exists() {
        bail!("output '{name}' already exists (use --force to overwrite)");
    }
    let file = File::create(name).with_context(|| format!("cannot create output '{name}'"))?;
    Ok(Box::new(BufWriter::new(file)))
}

fn run(args: Args) -> Result<()> {
    if !(LEVEL_MIN..=LEVEL_MAX).contains(&args.level) {
        bail!("level {} out of range {LEVEL_MIN}..={LEVEL_MAX}", args.level);
    }

    let output_name = match &args.output {
        Some(name) => name.clone(),
        None => default_output(&args.input, args.decompress)?,
    };

    let params = Params {
        level: args.level,
        checksum: args.checksum,
        ..Params::default()
    };
    let mode = if args.decompress {
        Mode::Decode
    } else {
        Mode::Encode
    };

    let reader = open_input(&args.input)?;
    let writer = open_output(&output_name, args.force)?;

    let mut session = Session::open(mode, &params)
        .with_context(|| "cannot open codec session")?;
    let mut source = ReadSource::new(reader, PUMP_CHUNK);
    let mut sink = WriteSink::new(writer);

    let produced = session
        .run(&mut source, &mut sink)
        .with_context(|| format!("{} '{}' failed", verb(mode), args.input))?;
    sink.finish().with_context(|| "flushing output failed")?;

    if args.verbose {
        let consumed = session.total_in();
        let (plain, packed) = match mode {
            Mode::Encode => (consumed, produced),
            Mode::Decode => (produced, consumed),
        };
        let ratio = if plain > 0 {
            packed as f64 * 100.0 / plain as f64
        } else {
            0.0
        };
        eprintln!(
            "zpipe: {} {} -> {} bytes ({:.2}%)",
            verb(mode),
            consumed,
            produced,
            ratio
        );
        if let Some(ck) = session.checksum() {
            eprintln!("zpipe: {:?} = 0x{:08X}", ck.family(), ck.value());
        }
    }
    session.end();
    Ok(())
}

fn verb(mode: Mode) -> &'static str {
    match mode {
        Mode::Encode => "compressed",
        Mode::Decode => "decompressed",
    }
}

fn main() -> ExitCode {
    let args = Args::parse();
    match run(args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("zpipe: {e:#}");
            ExitCode::FAILURE
        }
    }
}
