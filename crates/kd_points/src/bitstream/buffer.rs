//! Byte-level encoder/decoder buffers.
//!
//! All multi-byte primitives are little-endian.

use crate::error::{KdTreeError, Result};

/// Append-only output buffer.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct EncoderBuffer {
  data: Vec<u8>,
}

impl EncoderBuffer {
  pub fn new() -> Self {
    Self::default()
  }

  pub fn with_capacity(capacity: usize) -> Self {
    Self {
      data: Vec::with_capacity(capacity),
    }
  }

  #[inline]
  pub fn encode_u8(&mut self, value: u8) {
    self.data.push(value);
  }

  #[inline]
  pub fn encode_u32(&mut self, value: u32) {
    self.data.extend_from_slice(&value.to_le_bytes());
  }

  #[inline]
  pub fn encode_f32(&mut self, value: f32) {
    self.data.extend_from_slice(&value.to_le_bytes());
  }

  /// Append a raw byte range.
  pub fn encode_bytes(&mut self, bytes: &[u8]) {
    self.data.extend_from_slice(bytes);
  }

  /// Append a byte range prefixed with its `u32` length.
  pub fn encode_sized_bytes(&mut self, bytes: &[u8]) -> Result<()> {
    let len = sized_length(bytes.len())?;
    self.encode_u32(len);
    self.encode_bytes(bytes);
    Ok(())
  }

  pub fn data(&self) -> &[u8] {
    &self.data
  }

  pub fn len(&self) -> usize {
    self.data.len()
  }

  pub fn is_empty(&self) -> bool {
    self.data.is_empty()
  }

  pub fn clear(&mut self) {
    self.data.clear();
  }

  pub fn into_bytes(self) -> Vec<u8> {
    self.data
  }
}

#[inline]
fn sized_length(len: usize) -> Result<u32> {
  u32::try_from(len).map_err(|_| KdTreeError::StreamTooLong(len))
}

/// Sequential reader over a borrowed byte slice.
#[derive(Clone, Debug)]
pub struct DecoderBuffer<'a> {
  data: &'a [u8],
  pos: usize,
}

impl<'a> DecoderBuffer<'a> {
  pub fn new(data: &'a [u8]) -> Self {
    Self { data, pos: 0 }
  }

  pub fn decode_u8(&mut self) -> Result<u8> {
    let [b] = self.take_array::<1>()?;
    Ok(b)
  }

  pub fn decode_u32(&mut self) -> Result<u32> {
    Ok(u32::from_le_bytes(self.take_array()?))
  }

  pub fn decode_f32(&mut self) -> Result<f32> {
    Ok(f32::from_le_bytes(self.take_array()?))
  }

  /// Borrow the next `len` bytes.
  pub fn decode_bytes(&mut self, len: usize) -> Result<&'a [u8]> {
    let end = self.pos.checked_add(len).ok_or(KdTreeError::UnexpectedEnd)?;
    let bytes = self.data.get(self.pos..end).ok_or(KdTreeError::UnexpectedEnd)?;
    self.pos = end;
    Ok(bytes)
  }

  /// Borrow a byte range written by [`EncoderBuffer::encode_sized_bytes`].
  pub fn decode_sized_bytes(&mut self) -> Result<&'a [u8]> {
    let len = self.decode_u32()? as usize;
    self.decode_bytes(len)
  }

  /// Bytes not yet consumed.
  pub fn remaining(&self) -> usize {
    self.data.len() - self.pos
  }

  /// Number of bytes consumed so far.
  #[inline]
  pub fn position(&self) -> usize {
    self.pos
  }

  fn take_array<const N: usize>(&mut self) -> Result<[u8; N]> {
    let bytes = self.decode_bytes(N)?;
    let mut out = [0u8; N];
    out.copy_from_slice(bytes);
    Ok(out)
  }
}
