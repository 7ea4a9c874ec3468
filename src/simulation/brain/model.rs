//! Binary model encoding for trained brains.
//!
//! Layout of one brain, all values little-endian:
//!
//! ```text
//! u32 layer_count
//! u32 layer_size * layer_count
//! f32 parameter * n   (per layer: weights row-major, then biases)
//! ```
//!
//! A population file prefixes a `u32` genome count and repeats the record.

use super::Brain;
use crate::simulation::error::{Result, SimError};

const WORD: usize = 4;

/// Cursor over a model buffer that reports framing problems as `CorruptModel`.
#[derive(Debug)]
pub struct ModelReader<'a> {
    bytes: &'a [u8],
    offset: usize,
}

impl<'a> ModelReader<'a> {
    /// Starts reading at the beginning of `bytes`.
    pub fn new(bytes: &'a [u8]) -> Self {
        Self { bytes, offset: 0 }
    }

    /// Bytes not yet consumed.
    pub fn remaining(&self) -> usize {
        self.bytes.len() - self.offset
    }

    fn take_word(&mut self) -> Result<[u8; WORD]> {
        let end = self.offset + WORD;
        let word = self
            .bytes
            .get(self.offset..end)
            .and_then(|slice| <[u8; WORD]>::try_from(slice).ok())
            .ok_or_else(|| {
                SimError::CorruptModel(format!("unexpected end of data at byte {}", self.offset))
            })?;
        self.offset = end;
        Ok(word)
    }

    /// Reads one little-endian `u32`.
    pub fn read_u32(&mut self) -> Result<u32> {
        self.take_word().map(u32::from_le_bytes)
    }

    /// Reads one little-endian `f32`.
    pub fn read_f32(&mut self) -> Result<f32> {
        self.take_word().map(f32::from_le_bytes)
    }

    /// Fails if any bytes are left over.
    pub fn finish(self) -> Result<()> {
        match self.remaining() {
            0 => Ok(()),
            extra => Err(SimError::CorruptModel(format!(
                "{extra} trailing bytes after model"
            ))),
        }
    }
}

impl Brain {
    /// Serializes topology followed by every weight and bias.
    pub fn save_to_bytes(&self) -> Vec<u8> {
        let sizes = self.layer_sizes();
        let mut out = Vec::with_capacity(WORD * (1 + sizes.len() + self.parameter_count()));
        self.write_to(&mut out);
        out
    }

    /// Appends this brain's record to `out`.
    pub fn write_to(&self, out: &mut Vec<u8>) {
        let sizes = self.layer_sizes();
        out.extend_from_slice(&(sizes.len() as u32).to_le_bytes());
        for size in &sizes {
            out.extend_from_slice(&(*size as u32).to_le_bytes());
        }
        for value in self.to_flat_vector() {
            out.extend_from_slice(&value.to_le_bytes());
        }
    }

    /// Overwrites this brain's parameters from a single-brain record.
    ///
    /// The record must declare exactly this brain's topology and contain no
    /// trailing bytes. On error the brain is left unchanged.
    pub fn load_from_bytes(&mut self, bytes: &[u8]) -> Result<()> {
        let mut reader = ModelReader::new(bytes);
        let loaded = self.read_record(&mut reader)?;
        reader.finish()?;
        *self = loaded;
        Ok(())
    }

    /// Reads the next record from `reader` into a copy of this brain.
    ///
    /// The copy keeps this brain's identifier.
    pub fn read_record(&self, reader: &mut ModelReader<'_>) -> Result<Brain> {
        let layer_count = reader.read_u32()? as usize;
        if layer_count.saturating_mul(WORD) > reader.remaining() {
            return Err(SimError::CorruptModel(format!(
                "declared {layer_count} layers but only {} bytes remain",
                reader.remaining()
            )));
        }

        let declared = (0..layer_count)
            .map(|_| reader.read_u32().map(|size| size as usize))
            .collect::<Result<Vec<_>>>()?;
        let expected = self.layer_sizes();
        if declared != expected {
            return Err(SimError::CorruptModel(format!(
                "model topology {declared:?} does not match network {expected:?}"
            )));
        }

        let needed = self.parameter_count() * WORD;
        if reader.remaining() < needed {
            return Err(SimError::CorruptModel(format!(
                "need {needed} bytes of parameters, found {}",
                reader.remaining()
            )));
        }

        let mut loaded = self.clone();
        for layer in &mut loaded.layers {
            for value in layer.weights.iter_mut().chain(layer.biases.iter_mut()) {
                *value = reader.read_f32()?;
            }
        }

        Ok(loaded)
    }
}
