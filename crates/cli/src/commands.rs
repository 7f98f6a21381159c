//! Command implementations
//!
//! Each command returns its output lines so `main` decides where they go.

use anyhow::{bail, Context, Result};
use eoproto_config::CodecConfig;
use eoproto_core::PacketId;
use eoproto_protocol::strings::{
    bytes_to_string, decode_string, encode_string, sanitize, string_to_bytes,
};
use eoproto_protocol::{EoReader, EoWriter, PacketSequencer, Width};

use crate::cli::{Commands, StringAction};

pub fn run(command: &Commands, config: &CodecConfig) -> Result<Vec<String>> {
    match command {
        Commands::Encode { width, numbers } => {
            encode_numbers(numbers, resolve_width(width.unwrap_or(config.width))?)
        }
        Commands::Decode { width, hex } => {
            decode_numbers(hex, resolve_width(width.unwrap_or(config.width))?)
        }
        Commands::Sequence { start, count } => Ok(sequence(
            start.unwrap_or(config.sequence_start),
            *count,
        )),
        Commands::String { action } => match action {
            StringAction::Encode { text } => Ok(vec![encode_text(text, config)]),
            StringAction::Decode { hex } => Ok(vec![decode_text(hex)?]),
        },
        Commands::Inspect { hex } => inspect(hex),
    }
}

fn resolve_width(bytes: u8) -> Result<Width> {
    Width::from_len(usize::from(bytes))
        .with_context(|| format!("width must be between 1 and 4, got {}", bytes))
}

fn parse_hex(text: &str) -> Result<Vec<u8>> {
    let cleaned: String = text.chars().filter(|c| !c.is_whitespace()).collect();
    hex::decode(&cleaned).with_context(|| format!("invalid hex input: {}", text))
}

fn encode_numbers(numbers: &[u32], width: Width) -> Result<Vec<String>> {
    numbers
        .iter()
        .map(|&number| {
            let mut writer = EoWriter::new();
            writer
                .add_number(number, width)
                .with_context(|| format!("cannot encode {} as {:?}", number, width))?;
            Ok(format!("{} => {}", number, hex::encode(writer.as_slice())))
        })
        .collect()
}

fn decode_numbers(text: &str, width: Width) -> Result<Vec<String>> {
    let bytes = parse_hex(text)?;
    if bytes.len() % width.len() != 0 {
        bail!(
            "{} bytes is not a whole number of {:?} values",
            bytes.len(),
            width
        );
    }

    let mut reader = EoReader::new(bytes);
    let mut lines = Vec::new();
    while reader.remaining() > 0 {
        let start = reader.position();
        let value = reader.get_number(width)?;
        tracing::debug!(position = start, value, "decoded number");
        lines.push(value.to_string());
    }
    Ok(lines)
}

fn sequence(start: i32, count: usize) -> Vec<String> {
    let mut sequencer = PacketSequencer::new(start);
    (0..count)
        .map(|_| sequencer.next_sequence().to_string())
        .collect()
}

/// Sanitization, when configured, runs on the text before obfuscation
fn encode_text(text: &str, config: &CodecConfig) -> String {
    let mut bytes = string_to_bytes(text);
    if config.sanitize_strings {
        sanitize(&mut bytes);
    }
    encode_string(&mut bytes);
    hex::encode(bytes)
}

fn decode_text(text: &str) -> Result<String> {
    let mut bytes = parse_hex(text)?;
    decode_string(&mut bytes);
    Ok(bytes_to_string(&bytes))
}

fn inspect(text: &str) -> Result<Vec<String>> {
    let bytes = parse_hex(text)?;
    if bytes.len() < 2 {
        bail!("a packet needs at least 2 bytes for its id, got {}", bytes.len());
    }

    let id_bytes = [bytes[0], bytes[1]];
    if let Err(err) = PacketId::from_known_bytes(id_bytes) {
        tracing::warn!(%err, "packet id outside the known set");
    }
    let id = PacketId::from_bytes(id_bytes);
    let body_len = bytes.len() - 2;
    let mut lines = vec![format!("{:?} {:?} ({} byte body)", id.family, id.action, body_len)];

    let mut reader = EoReader::new(bytes[2..].to_vec());
    reader.set_chunked(true);
    let mut index = 0;
    loop {
        let chunk = reader.get_remaining_bytes()?;
        lines.push(format!("chunk {}: {}", index, hex::encode(&chunk)));
        if reader.position() >= body_len {
            break;
        }
        reader.next_chunk()?;
        index += 1;
    }
    Ok(lines)
}
