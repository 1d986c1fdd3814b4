use std::{fs::File, io::Read};

use pktlayers::{DecodeOptions, Layer, Packet};

/// Load a frame stored as one hex string under `tests/packet_examples`.
pub fn file_to_packet(fname: &str) -> Vec<u8> {
    // The test is executed under the crate root directory.
    let mut program_path = std::env::current_dir().unwrap();
    program_path.push("tests");
    program_path.push("packet_examples");
    program_path.push(fname);

    let mut file = File::open(program_path).unwrap();
    let mut content = String::new();
    file.read_to_string(&mut content).unwrap();
    let content = content.trim();

    assert!(content.len() % 2 == 0, "odd number of hex digits in {}", fname);
    (0..content.len())
        .step_by(2)
        .map(|i| u8::from_str_radix(&content[i..i + 2], 16).unwrap())
        .collect()
}

#[allow(dead_code)]
pub const ALL_MODES: [DecodeOptions; 4] = [
    DecodeOptions::DEFAULT,
    DecodeOptions::LAZY,
    DecodeOptions::NO_COPY,
    DecodeOptions::LAZY_NO_COPY,
];

/// Concatenate every layer's contents and the last layer's payload.
#[allow(dead_code)]
pub fn reassemble(pkt: &mut Packet<'_>) -> Vec<u8> {
    let layers: &[Layer<'_>] = pkt.layers();
    let mut out = Vec::new();
    for layer in layers {
        out.extend_from_slice(layer.contents());
    }
    if let Some(last) = layers.last() {
        out.extend_from_slice(last.payload());
    }
    out
}
