use huff_zip::{HuffmanCodec, HuffmanTree};
use std::fs::File;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let sample_text = "Hello, world! This is a sample text for Huffman compression. \
                      The quick brown fox jumps over the lazy dog. \
                      Huffman encoding is a greedy algorithm that builds optimal prefix codes.";

    let dir = std::env::temp_dir();
    let original = dir.join("huff_zip_sample.txt");
    let packed = dir.join("huff_zip_sample.txt.huffman");
    let restored = dir.join("huff_zip_sample.txt.decoded");

    std::fs::write(&original, sample_text)?;
    println!("Created sample file: {} bytes", sample_text.len());

    let tree = HuffmanTree::from_bytes(sample_text.as_bytes())?;
    let table = tree.generate_table();
    println!("{} distinct bytes, tree of {} nodes", table.len(), tree.len());
    for (byte, code) in table.iter().take(8) {
        println!("  {:?} -> {}", byte as char, code);
    }

    let codec = HuffmanCodec::default();
    let summary = codec.encode_from_file(File::open(&original)?, File::create(&packed)?)?;
    println!(
        "Compressed to: {} bytes ({:.1}% of original), padding {}",
        summary.compressed_len(),
        summary.compressed_len() as f64 / sample_text.len() as f64 * 100.0,
        summary.padding
    );

    codec.decode_from_file(File::open(&packed)?, File::create(&restored)?)?;
    let decompressed_text = std::fs::read_to_string(&restored)?;

    if sample_text == decompressed_text {
        println!("Decompression successful, data matches exactly.");
    } else {
        return Err("Decompression verification failed".into());
    }

    std::fs::remove_file(&original)?;
    std::fs::remove_file(&packed)?;
    std::fs::remove_file(&restored)?;

    Ok(())
}
