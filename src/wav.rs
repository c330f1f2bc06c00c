//! RIFF/WAVE container codec
//!
//! Chunk IDs are compared as big-endian tags, every numeric field inside a
//! chunk is little-endian, and chunks are word-aligned: an odd-sized chunk is
//! followed by one pad byte.

use crate::error::{MorseError, Result};

const RIFF_TAG: u32 = 0x5249_4646;
const WAVE_TAG: u32 = 0x5741_5645;
const FMT_TAG: u32 = 0x666d_7420;
const DATA_TAG: u32 = 0x6461_7461;

/// Size of the canonical header written by [`encode`]
pub const HEADER_LEN: usize = 44;

const BYTE_RATE_OFFSET: usize = 28;
const FIRST_CHUNK_OFFSET: usize = 12;
const CHUNK_HEADER_LEN: usize = 8;
const FMT_BODY_LEN: usize = 16;
const PCM_FORMAT: u16 = 1;
const BYTES_PER_SAMPLE: usize = 2;

/// Header fields of a RIFF/WAVE buffer plus the location of its `data` chunk.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WavHeader {
    pub audio_format: u16,
    pub channels: u16,
    pub sample_rate: u32,
    pub byte_rate: u32,
    pub block_align: u16,
    pub bits_per_sample: u16,
    /// Offset of the first sample byte
    pub data_offset: usize,
    pub data_size: u32,
}

impl WavHeader {
    /// Reads the `fmt ` chunk and locates the `data` chunk, in either order.
    pub fn parse(bytes: &[u8]) -> Result<Self> {
        check_riff(bytes)?;

        let mut format = None;
        let mut data = None;
        for chunk in Chunks::new(bytes) {
            match chunk.id {
                FMT_TAG if format.is_none() => {
                    let body = chunk.offset + CHUNK_HEADER_LEN;
                    if (chunk.size as usize) < FMT_BODY_LEN || body + FMT_BODY_LEN > bytes.len() {
                        return Err(MorseError::invalid_format(
                            chunk.offset,
                            format!("fmt chunk truncated ({} bytes)", chunk.size),
                        ));
                    }
                    format = Some(body);
                }
                DATA_TAG if data.is_none() => data = Some(chunk),
                other => log::trace!(
                    "Skipping '{}' chunk at offset {} ({} bytes)",
                    tag_name(other),
                    chunk.offset,
                    chunk.size
                ),
            }
            if format.is_some() && data.is_some() {
                break;
            }
        }

        let body = format.ok_or_else(|| MorseError::ChunkNotFound {
            chunk: "fmt ".to_string(),
            scanned: bytes.len(),
        })?;
        let data = data.ok_or_else(|| MorseError::ChunkNotFound {
            chunk: "data".to_string(),
            scanned: bytes.len(),
        })?;

        let header = Self {
            audio_format: read_u16_le(bytes, body),
            channels: read_u16_le(bytes, body + 2),
            sample_rate: read_u32_le(bytes, body + 4),
            byte_rate: read_u32_le(bytes, body + 8),
            block_align: read_u16_le(bytes, body + 12),
            bits_per_sample: read_u16_le(bytes, body + 14),
            data_offset: data.offset + CHUNK_HEADER_LEN,
            data_size: data.size,
        };
        if header.byte_rate == 0 {
            return Err(MorseError::invalid_format(body + 8, "byte rate is zero"));
        }
        log::debug!("Parsed WAV header: {:?}", header);
        Ok(header)
    }

    /// Length of the `data` chunk in seconds.
    pub fn duration(&self) -> f64 {
        f64::from(self.data_size) / f64::from(self.byte_rate)
    }
}

/// Returns the duration in seconds of a WAV buffer: the `data` chunk size
/// divided by the byte rate stored at offset 28.
pub fn parse_duration(bytes: &[u8]) -> Result<f64> {
    check_riff(bytes)?;

    let byte_rate = read_u32_le(bytes, BYTE_RATE_OFFSET);
    if byte_rate == 0 {
        return Err(MorseError::invalid_format(BYTE_RATE_OFFSET, "byte rate is zero"));
    }

    let data = Chunks::new(bytes)
        .find(|chunk| chunk.id == DATA_TAG)
        .ok_or_else(|| MorseError::ChunkNotFound {
            chunk: "data".to_string(),
            scanned: bytes.len(),
        })?;

    let seconds = f64::from(data.size) / f64::from(byte_rate);
    log::debug!(
        "data chunk at offset {}: {} bytes at {} B/s = {:.3}s",
        data.offset,
        data.size,
        byte_rate,
        seconds
    );
    Ok(seconds)
}

/// Serializes one sample slice per channel into a 16-bit PCM WAV buffer.
///
/// All channels must have the same length and the rate must be non-zero. Frames are interleaved across
/// channels and written little-endian after a 44-byte header.
pub fn encode<C: AsRef<[f32]>>(channels: &[C], sample_rate: u32) -> Result<Vec<u8>> {
    let first = channels
        .first()
        .ok_or_else(|| MorseError::InvalidInput("at least one channel is required".to_string()))?;
    if sample_rate == 0 {
        return Err(MorseError::InvalidInput("sample rate must be non-zero".to_string()));
    }
    let frames = first.as_ref().len();
    if let Some(idx) = channels.iter().position(|ch| ch.as_ref().len() != frames) {
        return Err(MorseError::InvalidInput(format!(
            "channel {} has {} samples, channel 0 has {}",
            idx,
            channels[idx].as_ref().len(),
            frames
        )));
    }

    let num_channels = u16::try_from(channels.len())
        .map_err(|_| MorseError::InvalidInput(format!("too many channels: {}", channels.len())))?;
    let block_align = num_channels
        .checked_mul(BYTES_PER_SAMPLE as u16)
        .ok_or_else(|| MorseError::InvalidInput("block align overflows u16".to_string()))?;
    let byte_rate = sample_rate
        .checked_mul(u32::from(block_align))
        .ok_or_else(|| MorseError::InvalidInput("byte rate overflows u32".to_string()))?;

    let length = frames
        .checked_mul(usize::from(block_align))
        .and_then(|n| n.checked_add(HEADER_LEN))
        .filter(|&n| u32::try_from(n).is_ok())
        .ok_or_else(|| MorseError::InvalidInput(format!("{} frames do not fit a WAV file", frames)))?;

    let mut out = Vec::with_capacity(length);
    out.extend_from_slice(&RIFF_TAG.to_be_bytes());
    out.extend_from_slice(&((length - 8) as u32).to_le_bytes());
    out.extend_from_slice(&WAVE_TAG.to_be_bytes());
    out.extend_from_slice(&FMT_TAG.to_be_bytes());
    out.extend_from_slice(&(FMT_BODY_LEN as u32).to_le_bytes());
    out.extend_from_slice(&PCM_FORMAT.to_le_bytes());
    out.extend_from_slice(&num_channels.to_le_bytes());
    out.extend_from_slice(&sample_rate.to_le_bytes());
    out.extend_from_slice(&byte_rate.to_le_bytes());
    out.extend_from_slice(&block_align.to_le_bytes());
    out.extend_from_slice(&16u16.to_le_bytes());
    out.extend_from_slice(&DATA_TAG.to_be_bytes());
    out.extend_from_slice(&((length - HEADER_LEN) as u32).to_le_bytes());

    for frame in 0..frames {
        for ch in channels {
            out.extend_from_slice(&float_to_pcm16(ch.as_ref()[frame]).to_le_bytes());
        }
    }

    log::debug!(
        "Encoded {} frames x {} channels at {} Hz into {} bytes",
        frames,
        num_channels,
        sample_rate,
        out.len()
    );
    Ok(out)
}

/// Converts a float sample to 16-bit PCM.
///
/// Samples are clamped to [-1, 1]. Below -0.5 the scale is 32768, otherwise
/// 32767, and the product is truncated toward zero. Existing consumers rely
/// on this exact mapping.
pub fn float_to_pcm16(sample: f32) -> i16 {
    let s = f64::from(sample).clamp(-1.0, 1.0);
    let scaled = if 0.5 + s < 0.0 { s * 32768.0 } else { s * 32767.0 };
    scaled as i16
}

/// True when the buffer starts with the `RIFF` and `WAVE` tags.
pub fn is_riff_wave(bytes: &[u8]) -> bool {
    bytes.len() >= FIRST_CHUNK_OFFSET
        && read_tag(bytes, 0) == RIFF_TAG
        && read_tag(bytes, 8) == WAVE_TAG
}

fn check_riff(bytes: &[u8]) -> Result<()> {
    if bytes.len() < HEADER_LEN {
        return Err(MorseError::invalid_format(
            bytes.len(),
            format!("need at least {} bytes, got {}", HEADER_LEN, bytes.len()),
        ));
    }
    expect_tag(bytes, 0, RIFF_TAG)?;
    expect_tag(bytes, 8, WAVE_TAG)
}

fn expect_tag(bytes: &[u8], offset: usize, expected: u32) -> Result<()> {
    let actual = read_tag(bytes, offset);
    if actual != expected {
        return Err(MorseError::invalid_format(
            offset,
            format!(
                "expected '{}', found '{}'",
                tag_name(expected),
                tag_name(actual)
            ),
        ));
    }
    Ok(())
}

#[derive(Debug, Clone, Copy)]
struct Chunk {
    id: u32,
    /// Offset of the chunk header
    offset: usize,
    size: u32,
}

/// Walks chunk headers from offset 12 while at least 8 bytes remain.
struct Chunks<'a> {
    bytes: &'a [u8],
    pos: usize,
}

impl<'a> Chunks<'a> {
    fn new(bytes: &'a [u8]) -> Self {
        Self {
            bytes,
            pos: FIRST_CHUNK_OFFSET,
        }
    }
}

impl Iterator for Chunks<'_> {
    type Item = Chunk;

    fn next(&mut self) -> Option<Chunk> {
        if self.pos.checked_add(CHUNK_HEADER_LEN)? > self.bytes.len() {
            return None;
        }
        let chunk = Chunk {
            id: read_tag(self.bytes, self.pos),
            offset: self.pos,
            size: read_u32_le(self.bytes, self.pos + 4),
        };
        let pad = (chunk.size & 1) as usize;
        self.pos = self
            .pos
            .saturating_add(CHUNK_HEADER_LEN)
            .saturating_add(chunk.size as usize)
            .saturating_add(pad);
        Some(chunk)
    }
}

// Callers guarantee `offset + N <= bytes.len()`.
fn read_tag(bytes: &[u8], offset: usize) -> u32 {
    u32::from_be_bytes([
        bytes[offset],
        bytes[offset + 1],
        bytes[offset + 2],
        bytes[offset + 3],
    ])
}

fn read_u32_le(bytes: &[u8], offset: usize) -> u32 {
    u32::from_le_bytes([
        bytes[offset],
        bytes[offset + 1],
        bytes[offset + 2],
        bytes[offset + 3],
    ])
}

fn read_u16_le(bytes: &[u8], offset: usize) -> u16 {
    u16::from_le_bytes([bytes[offset], bytes[offset + 1]])
}

fn tag_name(tag: u32) -> String {
    String::from_utf8_lossy(&tag.to_be_bytes()).into_owned()
}
