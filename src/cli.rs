// Command-line interface for framepress.
//
// Three subcommands around the file helpers: `compress` and `decompress`
// move between length-prefixed header containers and codec streams, `info`
// walks a codec stream and reports per-command record statistics without
// reconstructing any header bytes.

use std::fs::File;
use std::io::{BufReader, Read};
use std::path::PathBuf;
use std::process;

use clap::{ArgAction, Args, Parser, Subcommand, ValueHint};

use crate::io::{compress_file, decompress_file};
use crate::wire::{CMD_ADD_DICT, CMD_DATA, CMD_LAST, CMD_PREV, MAX_DICTIONARIES};

const BUF_SIZE: usize = 64 * 1024;

// ---------------------------------------------------------------------------
// Clap CLI definition
// ---------------------------------------------------------------------------

/// Dictionary-based compressor for repetitive network frame headers.
#[derive(Parser, Debug)]
#[command(
    name = "framepress",
    version,
    about = "Frame header stream compressor",
    arg_required_else_help = true
)]
struct Cli {
    #[command(subcommand)]
    command: Cmd,

    /// Force overwrite existing output files.
    #[arg(short = 'f', long, global = true)]
    force: bool,

    /// Quiet mode (suppress non-error output).
    #[arg(short = 'q', long, global = true, conflicts_with = "verbose")]
    quiet: bool,

    /// Verbose mode (use multiple times for more detail).
    #[arg(short = 'v', long, global = true, action = ArgAction::Count)]
    verbose: u8,

    /// Output stats as JSON to stderr.
    #[arg(long = "json", global = true)]
    json_output: bool,
}

#[derive(Subcommand, Debug)]
enum Cmd {
    /// Compress a length-prefixed header container into a codec stream.
    Compress(StreamArgs),
    /// Decompress a codec stream back into a header container.
    Decompress(StreamArgs),
    /// Print record statistics for a codec stream.
    Info(InfoArgs),
}

#[derive(Args, Debug)]
struct StreamArgs {
    /// Input file.
    #[arg(value_hint = ValueHint::FilePath)]
    input: PathBuf,

    /// Output file.
    #[arg(value_hint = ValueHint::FilePath)]
    output: PathBuf,

    /// Dictionary cache capacity (must match on both sides of a stream).
    #[arg(
        long,
        short = 'd',
        value_parser = clap::value_parser!(u64).range(1..=MAX_DICTIONARIES as u64),
        default_value_t = MAX_DICTIONARIES as u64
    )]
    dictionaries: u64,
}

#[derive(Args, Debug)]
struct InfoArgs {
    /// Codec stream to inspect.
    #[arg(value_hint = ValueHint::FilePath)]
    input: PathBuf,

    /// Dictionary cache capacity the stream was produced with.
    #[arg(
        long,
        short = 'd',
        value_parser = clap::value_parser!(u64).range(1..=MAX_DICTIONARIES as u64),
        default_value_t = MAX_DICTIONARIES as u64
    )]
    dictionaries: u64,
}

// ---------------------------------------------------------------------------
// Stream inspection
// ---------------------------------------------------------------------------

/// Per-command record statistics for one codec stream.
///
/// Walks the records without reconstructing header bytes; only dictionary
/// *lengths* are replayed, enough to know each record's output size.
#[derive(Debug, Default)]
struct StreamInfo {
    add_dict: u64,
    data: u64,
    last: u64,
    prev: u64,
    pairs: u64,
    compressed_bytes: u64,
    output_bytes: u64,
}

impl StreamInfo {
    fn records(&self) -> u64 {
        self.add_dict + self.data + self.last + self.prev
    }
}

fn scan_stream<R: Read>(reader: &mut R, dictionaries: usize) -> Result<StreamInfo, String> {
    let mut info = StreamInfo::default();
    // MRU replay of dictionary lengths only, evicting as the real cache would
    let mut lengths: Vec<usize> = Vec::new();
    let mut last_len = 0usize;
    let mut byte = [0u8; 1];

    loop {
        match reader.read(&mut byte) {
            Ok(0) => return Ok(info),
            Ok(_) => {}
            Err(e) => return Err(format!("read failed: {e}")),
        }
        info.compressed_bytes += 1;
        let record = info.records();
        match byte[0] {
            CMD_ADD_DICT => {
                let size = read_u8(reader, record, "dictionary size")? as usize;
                let mut dict = vec![0u8; size];
                reader
                    .read_exact(&mut dict)
                    .map_err(|e| format!("record {record}: dictionary data: {e}"))?;
                info.add_dict += 1;
                info.compressed_bytes += 1 + size as u64;
                info.output_bytes += size as u64;
                lengths.insert(0, size);
                lengths.truncate(dictionaries);
                last_len = size;
            }
            CMD_DATA => {
                let index = read_u8(reader, record, "dictionary index")? as usize;
                let pairs = read_u8(reader, record, "pair count")? as usize;
                let mut buf = vec![0u8; 2 * pairs];
                reader
                    .read_exact(&mut buf)
                    .map_err(|e| format!("record {record}: pair data: {e}"))?;
                let size = promote_len(&mut lengths, index)
                    .ok_or_else(|| format!("record {record}: invalid dictionary index {index}"))?;
                info.data += 1;
                info.pairs += pairs as u64;
                info.compressed_bytes += 2 + 2 * pairs as u64;
                info.output_bytes += size as u64;
                last_len = size;
            }
            CMD_LAST => {
                info.last += 1;
                info.output_bytes += last_len as u64;
            }
            CMD_PREV => {
                let index = read_u8(reader, record, "dictionary index")? as usize;
                let size = promote_len(&mut lengths, index)
                    .ok_or_else(|| format!("record {record}: invalid dictionary index {index}"))?;
                info.prev += 1;
                info.compressed_bytes += 1;
                info.output_bytes += size as u64;
                last_len = size;
            }
            cmd => return Err(format!("record {record}: invalid command byte {cmd:#04x}")),
        }
    }
}

fn read_u8<R: Read>(reader: &mut R, record: u64, field: &str) -> Result<u8, String> {
    let mut byte = [0u8; 1];
    reader
        .read_exact(&mut byte)
        .map_err(|e| format!("record {record}: {field}: {e}"))?;
    Ok(byte[0])
}

fn promote_len(lengths: &mut Vec<usize>, index: usize) -> Option<usize> {
    if index >= lengths.len() {
        return None;
    }
    let size = lengths.remove(index);
    lengths.insert(0, size);
    Some(size)
}

// ---------------------------------------------------------------------------
// Command dispatch
// ---------------------------------------------------------------------------

fn check_overwrite(path: &std::path::Path, force: bool) -> Result<(), String> {
    if path.exists() && !force {
        return Err(format!(
            "output file {} exists (use --force to overwrite)",
            path.display()
        ));
    }
    Ok(())
}

fn run_compress(cli: &Cli, args: &StreamArgs) -> Result<(), String> {
    check_overwrite(&args.output, cli.force)?;
    let stats = compress_file(&args.input, &args.output, args.dictionaries as usize)
        .map_err(|e| e.to_string())?;

    if cli.json_output {
        let json = serde_json::json!({
            "command": "compress",
            "headers": stats.headers,
            "raw_bytes": stats.raw_size,
            "compressed_bytes": stats.compressed_size,
            "ratio": stats.compressed_size as f64 / stats.raw_size.max(1) as f64,
            "sha256": stats.raw_sha256.map(hex_string),
        });
        eprintln!("{json}");
    } else if !cli.quiet {
        eprintln!(
            "compressed {} headers: {} -> {} bytes ({:.1}%)",
            stats.headers,
            stats.raw_size,
            stats.compressed_size,
            100.0 * stats.compressed_size as f64 / stats.raw_size.max(1) as f64
        );
        if cli.verbose > 0 {
            if let Some(digest) = stats.raw_sha256 {
                eprintln!("container sha256: {}", hex_string(digest));
            }
        }
    }
    Ok(())
}

fn run_decompress(cli: &Cli, args: &StreamArgs) -> Result<(), String> {
    check_overwrite(&args.output, cli.force)?;
    let stats = decompress_file(&args.input, &args.output, args.dictionaries as usize)
        .map_err(|e| e.to_string())?;

    if cli.json_output {
        let json = serde_json::json!({
            "command": "decompress",
            "headers": stats.headers,
            "compressed_bytes": stats.compressed_size,
            "raw_bytes": stats.raw_size,
            "sha256": stats.raw_sha256.map(hex_string),
        });
        eprintln!("{json}");
    } else if !cli.quiet {
        eprintln!(
            "decompressed {} headers: {} -> {} bytes",
            stats.headers, stats.compressed_size, stats.raw_size
        );
        if cli.verbose > 0 {
            if let Some(digest) = stats.raw_sha256 {
                eprintln!("container sha256: {}", hex_string(digest));
            }
        }
    }
    Ok(())
}

fn run_info(cli: &Cli, args: &InfoArgs) -> Result<(), String> {
    let file = File::open(&args.input).map_err(|e| e.to_string())?;
    let mut reader = BufReader::with_capacity(BUF_SIZE, file);
    let info = scan_stream(&mut reader, args.dictionaries as usize)?;

    if cli.json_output {
        let json = serde_json::json!({
            "command": "info",
            "records": info.records(),
            "add_dict": info.add_dict,
            "data": info.data,
            "last": info.last,
            "prev": info.prev,
            "pairs": info.pairs,
            "compressed_bytes": info.compressed_bytes,
            "output_bytes": info.output_bytes,
        });
        eprintln!("{json}");
    } else {
        println!("records:          {}", info.records());
        println!("  add-dict:       {}", info.add_dict);
        println!("  data:           {} ({} pairs)", info.data, info.pairs);
        println!("  last:           {}", info.last);
        println!("  prev:           {}", info.prev);
        println!("compressed bytes: {}", info.compressed_bytes);
        println!("output bytes:     {}", info.output_bytes);
    }
    Ok(())
}

/// Main CLI entry point. Parses arguments via clap, dispatches commands.
pub fn run() {
    let cli = Cli::parse();
    let result = match &cli.command {
        Cmd::Compress(args) => run_compress(&cli, args),
        Cmd::Decompress(args) => run_decompress(&cli, args),
        Cmd::Info(args) => run_info(&cli, args),
    };
    if let Err(msg) = result {
        eprintln!("framepress: {msg}");
        process::exit(1);
    }
}

fn hex_string(digest: [u8; 32]) -> String {
    digest.iter().map(|b| format!("{b:02x}")).collect()
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compress::HeaderEncoder;

    #[test]
    fn scan_counts_every_record_kind() {
        let mut enc = HeaderEncoder::new(Vec::new());
        let a = [0x11u8; 54];
        let mut b = a;
        b[40] = 0x99;
        enc.encode(&a).unwrap(); // AddDict
        enc.encode(&a).unwrap(); // Last
        enc.encode(&b).unwrap(); // Data, 1 pair
        enc.encode(&a).unwrap(); // Data, 1 pair (patch back)
        enc.encode(&[0x22; 20]).unwrap(); // AddDict
        enc.encode(&a).unwrap(); // Prev
        let stream = enc.into_inner();

        let info = scan_stream(&mut stream.as_slice(), MAX_DICTIONARIES).unwrap();
        assert_eq!(info.add_dict, 2);
        assert_eq!(info.data, 2);
        assert_eq!(info.last, 1);
        assert_eq!(info.prev, 1);
        assert_eq!(info.pairs, 2);
        assert_eq!(info.compressed_bytes, stream.len() as u64);
        assert_eq!(info.output_bytes, 54 * 5 + 20);
    }

    #[test]
    fn scan_rejects_invalid_commands() {
        let err = scan_stream(&mut [0x00u8].as_slice(), MAX_DICTIONARIES).unwrap_err();
        assert!(err.contains("invalid command byte"));
    }

    #[test]
    fn scan_rejects_bad_dictionary_index() {
        let stream = [CMD_PREV, 3];
        let err = scan_stream(&mut stream.as_slice(), MAX_DICTIONARIES).unwrap_err();
        assert!(err.contains("invalid dictionary index 3"));
    }
}
