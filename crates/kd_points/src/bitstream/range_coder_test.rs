use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use super::*;

/// Bits drawn with P(1) = `p_one`, coded under a single context.
fn skewed_bits(seed: u64, count: usize, p_one: f64) -> Vec<bool> {
  let mut rng = StdRng::seed_from_u64(seed);
  (0..count).map(|_| rng.random_bool(p_one)).collect()
}

fn encode_modeled(bits: &[bool], shift: u32) -> Vec<u8> {
  let mut enc = AdaptiveBitEncoder::new(shift);
  let mut prob = BitProbability::default();
  for &bit in bits {
    enc.encode_bit(&mut prob, bit);
  }
  enc.finish()
}

#[test]
fn test_empty_stream() {
  let bytes = AdaptiveBitEncoder::new(5).finish();
  assert_eq!(bytes.len(), 5);
  assert_eq!(bytes[0], 0);

  let dec = AdaptiveBitDecoder::new(&bytes, 5).unwrap();
  dec.finish().unwrap();
}

#[test]
fn test_modeled_bits_roundtrip() {
  for (seed, p) in [(1, 0.5), (2, 0.05), (3, 0.95), (4, 0.0), (5, 1.0)] {
    let bits = skewed_bits(seed, 5_000, p);
    for shift in [4, 5] {
      let bytes = encode_modeled(&bits, shift);
      assert_eq!(bytes[0], 0, "first byte must be zero");

      let mut dec = AdaptiveBitDecoder::new(&bytes, shift).unwrap();
      let mut prob = BitProbability::default();
      for (i, &bit) in bits.iter().enumerate() {
        assert_eq!(dec.decode_bit(&mut prob).unwrap(), bit, "bit {} (p={}, shift={})", i, p, shift);
      }
      dec.finish().unwrap();
    }
  }
}

#[test]
fn test_skewed_bits_compress() {
  let bits = skewed_bits(7, 8_000, 0.02);
  let bytes = encode_modeled(&bits, 5);
  // 8000 raw bits = 1000 bytes; entropy at p=0.02 is ~0.14 bits/bit
  assert!(bytes.len() < 300, "got {} bytes", bytes.len());
}

#[test]
fn test_mixed_direct_and_modeled() {
  let mut rng = StdRng::seed_from_u64(11);
  let ops: Vec<(u32, u32)> = (0..2_000)
    .map(|_| {
      let n = rng.random_range(0..=32u32);
      let v: u32 = rng.random();
      (n, if n == 0 { 0 } else { v >> (32 - n) })
    })
    .collect();

  let mut enc = AdaptiveBitEncoder::new(4);
  let mut probs = [BitProbability::default(); 2];
  for &(n, v) in &ops {
    enc.encode_bit(&mut probs[(n & 1) as usize], v & 1 == 1);
    enc.encode_direct_bits(n, v);
  }
  let bytes = enc.finish();

  let mut dec = AdaptiveBitDecoder::new(&bytes, 4).unwrap();
  let mut probs = [BitProbability::default(); 2];
  for &(n, v) in &ops {
    assert_eq!(dec.decode_bit(&mut probs[(n & 1) as usize]).unwrap(), v & 1 == 1);
    assert_eq!(dec.decode_direct_bits(n).unwrap(), v);
  }
  dec.finish().unwrap();
}

#[test]
fn test_trailing_byte_rejected() {
  let bits = skewed_bits(3, 100, 0.3);
  let mut bytes = encode_modeled(&bits, 5);
  bytes.push(0);

  let mut dec = AdaptiveBitDecoder::new(&bytes, 5).unwrap();
  let mut prob = BitProbability::default();
  for _ in &bits {
    dec.decode_bit(&mut prob).unwrap();
  }
  assert!(matches!(dec.finish(), Err(KdTreeError::CorruptStream(_))));
}

#[test]
fn test_truncated_stream_rejected() {
  let bits = skewed_bits(9, 2_000, 0.5);
  let bytes = encode_modeled(&bits, 5);
  let truncated = &bytes[..bytes.len() - 3];

  let mut dec = AdaptiveBitDecoder::new(truncated, 5).unwrap();
  let mut prob = BitProbability::default();
  let mut result = Ok(());
  for _ in &bits {
    if let Err(e) = dec.decode_bit(&mut prob) {
      result = Err(e);
      break;
    }
  }
  assert_eq!(result, Err(KdTreeError::UnexpectedEnd));
}

#[test]
fn test_nonzero_first_byte_rejected() {
  let bytes = [1u8, 0, 0, 0, 0];
  assert!(matches!(
    AdaptiveBitDecoder::new(&bytes, 5),
    Err(KdTreeError::CorruptStream(_))
  ));
}

#[test]
fn test_probability_adapts() {
  let mut prob = BitProbability::default();
  let mut enc = AdaptiveBitEncoder::new(5);
  for _ in 0..100 {
    enc.encode_bit(&mut prob, false);
  }
  assert!(prob.p_zero() > 0.9);
  for _ in 0..200 {
    enc.encode_bit(&mut prob, true);
  }
  assert!(prob.p_zero() < 0.1);
}
