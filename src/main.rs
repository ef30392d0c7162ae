use std::env;
use std::ffi::OsString;
use std::fs::{self, File};
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use huff_zip::{HuffmanCodec, HuffmanError};
use log::{debug, error, info};

const COMPRESSED_EXT: &str = "huffman";
const DECODED_EXT: &str = "decoded";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Mode {
    Compress,
    Decompress,
}

fn print_usage() {
    eprintln!("usage: huff-zip <command> <input> [output]");
    eprintln!("       where <command> is `compress` or `decompress`");
    eprintln!("         and [output] defaults to <input>.huffman when compressing");
    eprintln!("             or <input> minus .huffman plus .decoded when decompressing");
}

fn parse_args(args: &[String]) -> Option<(Mode, PathBuf, PathBuf)> {
    let mode = match args.get(1)?.as_str() {
        "compress" | "c" => Mode::Compress,
        "decompress" | "x" => Mode::Decompress,
        _ => return None,
    };
    let input = PathBuf::from(args.get(2)?);
    let output = match args.get(3) {
        Some(path) => PathBuf::from(path),
        None => default_output(mode, &input),
    };
    if args.len() > 4 {
        return None;
    }
    Some((mode, input, output))
}

fn default_output(mode: Mode, input: &Path) -> PathBuf {
    match mode {
        Mode::Compress => with_suffix(input.as_os_str().to_owned(), COMPRESSED_EXT),
        Mode::Decompress => {
            let base = if input.extension().is_some_and(|ext| ext == COMPRESSED_EXT) {
                input.with_extension("")
            } else {
                input.to_path_buf()
            };
            with_suffix(base.into_os_string(), DECODED_EXT)
        }
    }
}

fn with_suffix(mut path: OsString, ext: &str) -> PathBuf {
    path.push(".");
    path.push(ext);
    PathBuf::from(path)
}

fn run(mode: Mode, input_path: &Path, output_path: &Path) -> Result<(), HuffmanError> {
    if input_path == output_path {
        return Err(HuffmanError::Io(std::io::Error::new(
            std::io::ErrorKind::InvalidInput,
            "input and output are the same file",
        )));
    }

    let input = File::open(input_path)?;
    let output = File::create(output_path)?;
    debug!("{:?}: {} -> {}", mode, input_path.display(), output_path.display());

    let codec = HuffmanCodec::default();
    let result = match mode {
        Mode::Compress => codec.encode_from_file(input, output).map(|summary| {
            debug!(
                "tree {} bytes, {} distinct symbols, padding {}",
                summary.tree_len, summary.distinct_symbols, summary.padding
            );
            info!(
                "compressed {} bytes to {} bytes ({:.1}%)",
                summary.original_len,
                summary.compressed_len(),
                ratio(summary.compressed_len(), summary.original_len)
            );
        }),
        Mode::Decompress => codec.decode_from_file(input, output).map(|summary| {
            info!(
                "decompressed {} payload bytes to {} bytes",
                summary.payload_len, summary.decoded_len
            );
        }),
    };

    if result.is_err() {
        if let Err(e) = fs::remove_file(output_path) {
            debug!("could not remove {}: {}", output_path.display(), e);
        }
    }
    result
}

fn ratio(part: u64, whole: u64) -> f64 {
    if whole == 0 {
        return 0.0;
    }
    part as f64 / whole as f64 * 100.0
}

fn main() -> ExitCode {
    env_logger::init();

    let args: Vec<String> = env::args().collect();
    let Some((mode, input, output)) = parse_args(&args) else {
        print_usage();
        return ExitCode::from(2);
    };

    match run(mode, &input, &output) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{}: {}", input.display(), e);
            eprintln!("huff-zip: {}: {}", input.display(), e);
            ExitCode::from(1)
        }
    }
}
