use crate::guest::{Guest, Runtime};
use crate::segment::{write_segment, Continuation, Segment, SegmentInput};
use crate::tape::WORD_BYTES;
use anyhow::{anyhow, bail};
use byteorder::{ByteOrder, LittleEndian, WriteBytesExt};
use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::Path;

/// Parses `value:type` arguments into tape words.
///
/// * `i64`: one word, decimal or `0x` hex
/// * `bytes`: `0x` hex, one word per byte
/// * `bytes-packed`: `0x` hex, eight little-endian bytes per word
pub fn parse_args(values: &[&str]) -> anyhow::Result<Vec<u64>> {
    let mut words = Vec::new();
    for v in values {
        let Some((v, t)) = v.split_once(':') else {
            bail!("input `{v}` is not of the form value:type");
        };
        match t {
            "i64" => {
                let word = match v.strip_prefix("0x") {
                    Some(hex) => u64::from_str_radix(hex, 16)?,
                    None => v.parse::<u64>()?,
                };
                words.push(word);
            }
            "bytes" => words.extend(decode_hex(v)?.into_iter().map(u64::from)),
            "bytes-packed" => words.extend(decode_hex(v)?.chunks(8).map(|chunk| {
                let mut data = [0u8; 8];
                data[..chunk.len()].copy_from_slice(chunk);
                u64::from_le_bytes(data)
            })),
            _ => bail!("unsupported input data type: {t}"),
        }
    }
    Ok(words)
}

fn decode_hex(v: &str) -> anyhow::Result<Vec<u8>> {
    let hex = v
        .strip_prefix("0x")
        .ok_or_else(|| anyhow!("bytes input needs to start with 0x"))?;
    Ok(hex::decode(hex)?)
}

/// Reads a file of little-endian u64 words, e.g. a context dump. A file
/// ending in a partial word is rejected.
pub fn parse_u64_from_file<P: AsRef<Path>>(path: P) -> anyhow::Result<Vec<u64>> {
    let path = path.as_ref();
    let bytes = fs::read(path)?;
    if bytes.len() % WORD_BYTES != 0 {
        bail!(
            "{} holds {} bytes, not a whole number of u64 words",
            path.display(),
            bytes.len()
        );
    }
    let mut words = vec![0u64; bytes.len() / WORD_BYTES];
    LittleEndian::read_u64_into(&bytes, &mut words);
    Ok(words)
}

pub fn write_u64_to_file<P: AsRef<Path>>(path: P, words: &[u64]) -> anyhow::Result<()> {
    let mut fd = BufWriter::new(File::create(path)?);
    for word in words {
        fd.write_u64::<LittleEndian>(*word)?;
    }
    fd.flush()?;
    Ok(())
}

/// Runs every segment of `guest` and writes each finished one to `seg_path`.
pub fn split_prog_into_segs<G: Guest>(
    runtime: &Runtime,
    guest: &G,
    seg_path: &str,
    context_inputs: Vec<u64>,
    inputs: Vec<SegmentInput>,
) -> anyhow::Result<(Vec<Segment>, Vec<G::Output>)> {
    if inputs.is_empty() {
        bail!("no segment inputs for {}", guest.name());
    }
    fs::create_dir_all(seg_path)?;
    let new_writer = |name: &str| -> Option<File> { File::create(name).ok() };

    let mut continuation = Continuation::new(runtime, guest, inputs.len(), context_inputs)?;
    let mut segments = Vec::new();
    let mut outputs = Vec::new();
    for input in inputs {
        let result = continuation.run_segment(input)?;
        write_segment(&result.segment, seg_path, new_writer)?;
        segments.push(result.segment);
        outputs.push(result.output);
    }
    log::info!("Split done {}", segments.len());
    Ok((segments, outputs))
}
