use std::fs::{self, File};
use std::io::{Cursor, Read};
use std::path::PathBuf;

use huff_zip::{
    pack, unpack, CodecConfig, ContainerHeader, FrequencyTable, HuffmanCodec, HuffmanError,
    HuffmanTree,
};
use rand::{rngs::StdRng, Rng, SeedableRng};

fn scratch_path(name: &str) -> PathBuf {
    std::env::temp_dir().join(format!("huff_zip_{}_{}", std::process::id(), name))
}

#[test]
fn test_file_roundtrip() {
    let path = scratch_path("plain.txt");
    let compressed_path = scratch_path("plain.txt.huffman");
    let dest_path = scratch_path("plain.txt.decoded");

    let mut original_text = Vec::new();
    for line in 0..2_000 {
        original_text.extend_from_slice(format!("line {} of the sample file\n", line).as_bytes());
    }
    fs::write(&path, &original_text).unwrap();

    let codec = HuffmanCodec::new(CodecConfig::new().with_chunk_size(4096));
    let summary = codec
        .encode_from_file(File::open(&path).unwrap(), File::create(&compressed_path).unwrap())
        .unwrap();

    let compressed_len = fs::metadata(&compressed_path).unwrap().len();
    assert_eq!(summary.compressed_len(), compressed_len);
    assert!(compressed_len < original_text.len() as u64);

    let decoded = codec
        .decode_from_file(File::open(&compressed_path).unwrap(), File::create(&dest_path).unwrap())
        .unwrap();
    assert_eq!(decoded.decoded_len, original_text.len() as u64);

    let mut restored = Vec::new();
    File::open(&dest_path).unwrap().read_to_end(&mut restored).unwrap();
    assert_eq!(original_text, restored);

    for p in [path, compressed_path, dest_path] {
        let _ = fs::remove_file(p);
    }
}

#[test]
fn hello_walkthrough() {
    let freq = FrequencyTable::from_bytes(b"hello");
    let counts: Vec<(char, u64)> = freq.iter().map(|(b, c)| (b as char, c)).collect();
    assert_eq!(counts, vec![('h', 1), ('e', 1), ('l', 2), ('o', 1)]);

    let tree = HuffmanTree::from_frequencies(&freq).unwrap();
    let table = tree.generate_table();
    let codes: Vec<(char, String)> = table
        .iter()
        .map(|(b, code)| (b as char, code.to_string()))
        .collect();
    assert_eq!(
        codes,
        vec![
            ('e', "01".into()),
            ('h', "10".into()),
            ('l', "11".into()),
            ('o', "00".into())
        ]
    );

    let (payload, padding) = pack(&table, b"hello").unwrap();
    assert_eq!(payload, vec![0x9f, 0x00]);
    assert_eq!(padding, 6);

    let rebuilt = HuffmanTree::deserialize(&tree.serialize()).unwrap();
    assert_eq!(unpack(&payload, padding, &rebuilt).unwrap(), b"hello");
}

#[test]
fn binary_data_round_trips() {
    let mut rng = StdRng::seed_from_u64(0);
    let codec = HuffmanCodec::new(CodecConfig::new().with_chunk_size(1000));

    for len in [1, 2, 7, 8, 9, 255, 4096, 70_001] {
        let data: Vec<u8> = (0..len).map(|_| rng.gen()).collect();
        let encoded = codec.encode(&data).unwrap();
        assert_eq!(codec.decode(&encoded).unwrap(), data, "length {}", len);
    }
}

#[test]
fn two_symbol_input_uses_one_bit_codes() {
    let codec = HuffmanCodec::default();
    let data = b"abababababababab";
    let encoded = codec.encode(data).unwrap();

    let mut cursor = Cursor::new(&encoded);
    let header = ContainerHeader::read_from(&mut cursor).unwrap();
    assert_eq!(header.padding, 0);
    assert_eq!(encoded.len() - cursor.position() as usize, 2);
    assert_eq!(codec.decode(&encoded).unwrap(), data);
}

#[test]
fn repeated_symbol_round_trips() {
    let codec = HuffmanCodec::new(CodecConfig::new().with_chunk_size(7));
    for len in [1, 2, 8, 1000] {
        let data = vec![b'a'; len];
        let encoded = codec.encode(&data).unwrap();
        assert_eq!(codec.decode(&encoded).unwrap(), data);
    }
}

#[test]
fn every_tree_truncation_is_corrupt_header() {
    let codec = HuffmanCodec::default();
    let encoded = codec.encode(b"the rain in spain stays mainly in the plain").unwrap();
    let header = ContainerHeader::read_from(&mut Cursor::new(&encoded)).unwrap();
    let payload = &encoded[header.encoded_len()..];

    for cut in 0..header.tree_data.len() {
        let truncated = ContainerHeader::new(header.tree_data[..cut].to_vec(), header.padding);
        let mut file = Vec::new();
        truncated.write_to(&mut file).unwrap();
        file.extend_from_slice(payload);

        match codec.decode(&file) {
            Err(HuffmanError::CorruptHeader(_)) => {}
            other => panic!("cut at {} gave {:?}", cut, other.map(|d| d.len())),
        }
    }
}

#[test]
fn truncated_file_never_decodes_silently() {
    let codec = HuffmanCodec::default();
    let data = b"she sells sea shells by the sea shore".repeat(3);
    let encoded = codec.encode(&data).unwrap();

    for len in 0..encoded.len() {
        assert!(codec.decode(&encoded[..len]).is_err(), "prefix of {} bytes decoded", len);
    }
}
