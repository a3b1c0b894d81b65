use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use super::*;

fn random_cloud(rng: &mut StdRng, count: usize) -> Vec<Vec3> {
  (0..count)
    .map(|_| {
      Vec3::new(
        rng.random_range(-100.0..100.0),
        rng.random_range(-5.0..5.0),
        rng.random_range(0.0..1000.0),
      )
    })
    .collect()
}

fn roundtrip(points: &[Vec3], quantization_bits: i32, level: CompressionLevel) -> Vec<Vec3> {
  let mut encoder = FloatPointsKdTreeEncoder::new(quantization_bits, level).unwrap();
  encoder.encode_point_cloud(points.iter().copied()).unwrap();
  let bytes = encoder.into_bytes();

  let mut buffer = DecoderBuffer::new(&bytes);
  let decoded = FloatPointsKdTreeDecoder::new(level)
    .decode_point_cloud(&mut buffer, points.len() as u32)
    .unwrap();
  assert_eq!(buffer.remaining(), 0);
  decoded
}

fn sorted(mut points: Vec<Vec3>) -> Vec<Vec3> {
  points.sort_by(|a, b| a.to_array().partial_cmp(&b.to_array()).unwrap());
  points
}

#[test]
fn test_float_bounds_encapsulate() {
  let mut bounds = FloatBounds::empty();
  assert!(!bounds.is_valid());
  bounds.encapsulate(Vec3::new(1.0, -2.0, 3.0));
  bounds.encapsulate(Vec3::new(-1.0, 4.0, 3.0));
  assert!(bounds.is_valid());
  assert_eq!(bounds.min, Vec3::new(-1.0, -2.0, 3.0));
  assert_eq!(bounds.max, Vec3::new(1.0, 4.0, 3.0));
  assert_eq!(bounds.extent(), Vec3::new(2.0, 6.0, 0.0));
}

#[test]
fn test_quantizer_endpoints() {
  let bounds = FloatBounds::new(Vec3::new(-1.0, 0.0, 5.0), Vec3::new(1.0, 10.0, 5.0));
  let quantizer = PointQuantizer::new(bounds, 8);
  assert_eq!(quantizer.quantize(bounds.min), UVec3::ZERO);
  // Flat z axis maps to 0
  assert_eq!(quantizer.quantize(bounds.max), UVec3::new(255, 255, 0));
  assert_eq!(quantizer.dequantize(UVec3::new(255, 255, 0)), bounds.max);
  assert_eq!(quantizer.dequantize(UVec3::ZERO), bounds.min);
}

#[test]
fn test_quantizer_error_bound() {
  let bounds = FloatBounds::new(Vec3::ZERO, Vec3::splat(1.0));
  let quantizer = PointQuantizer::new(bounds, 4);
  let max_error = quantizer.max_error();
  assert_eq!(max_error, Vec3::splat(1.0 / 16.0));
  for i in 0..=100 {
    let p = Vec3::splat(i as f32 / 100.0);
    let back = quantizer.dequantize(quantizer.quantize(p));
    assert!((back - p).abs().cmple(max_error).all(), "{:?} -> {:?}", p, back);
  }
}

#[test]
fn test_max_error_on_extreme_bounds() {
  let bounds = FloatBounds::new(Vec3::splat(-f32::MAX), Vec3::splat(f32::MAX));
  assert!(bounds.is_valid());
  let max_error = PointQuantizer::new(bounds, 30).max_error();
  assert!(max_error.is_finite(), "{:?}", max_error);
  assert!(max_error.cmpgt(Vec3::ZERO).all());
  // 2 * f32::MAX / 2^30
  assert_eq!(max_error.x, (f32::MAX as f64 * 2.0 / (1u64 << 30) as f64) as f32);
}

#[test]
fn test_point_limit_passes_through() {
  let mut encoder = FloatPointsKdTreeEncoder::new(8, CompressionLevel::DEFAULT).unwrap();
  encoder.encode_point_cloud([Vec3::ZERO, Vec3::ONE, Vec3::X]).unwrap();
  let result = FloatPointsKdTreeDecoder::new(CompressionLevel::DEFAULT)
    .with_point_limit(2)
    .decode_point_cloud(&mut DecoderBuffer::new(encoder.buffer().data()), 3);
  assert_eq!(result, Err(KdTreeError::TooManyPoints(3)));
}

#[test]
fn test_roundtrip_within_quantization_error() {
  let mut rng = StdRng::seed_from_u64(1);
  let points = random_cloud(&mut rng, 500);
  let mut bounds = FloatBounds::empty();
  points.iter().for_each(|p| bounds.encapsulate(*p));

  for bits in [1, 4, 11, 16, 24, 30] {
    for level in [0, 3, 5, 8, 10] {
      let level = CompressionLevel::new(level).unwrap();
      let quantizer = PointQuantizer::new(bounds, bits as u32);
      let tolerance = quantizer.max_error() + Vec3::splat(1e-3);
      let expected: Vec<Vec3> = points
        .iter()
        .map(|&p| quantizer.dequantize(quantizer.quantize(p)))
        .collect();
      for (p, e) in points.iter().zip(&expected) {
        assert!((*e - *p).abs().cmple(tolerance).all(), "{:?} -> {:?}", p, e);
      }
      assert_eq!(sorted(roundtrip(&points, bits, level)), sorted(expected));
    }
  }
}

#[test]
fn test_zero_points_payload() {
  let mut encoder = FloatPointsKdTreeEncoder::new(11, CompressionLevel::DEFAULT).unwrap();
  let stats = encoder.encode_point_cloud(std::iter::empty::<Vec3>()).unwrap();
  assert_eq!(stats.num_points, 0);

  let bytes = encoder.buffer().data();
  // Q, zeroed bounds, then the integer zero-point marker
  assert_eq!(bytes.len(), 1 + 24 + 6);
  assert_eq!(bytes[0], 11);
  assert!(bytes[1..25].iter().all(|&b| b == 0));
  assert_eq!(&bytes[25..], &[11, 5, 0, 0, 0, 0]);

  let mut buffer = DecoderBuffer::new(bytes);
  let decoded = FloatPointsKdTreeDecoder::new(CompressionLevel::DEFAULT)
    .decode_point_cloud(&mut buffer, 0)
    .unwrap();
  assert!(decoded.is_empty());
}

/// A single point has zero extent, so it reconstructs exactly.
#[test]
fn test_single_point_is_exact() {
  let point = Vec3::new(1.25, -7.5, 3.0e6);
  assert_eq!(roundtrip(&[point], 11, CompressionLevel::BEST), vec![point]);
}

#[test]
fn test_flat_cloud_keeps_flat_axis() {
  let points: Vec<Vec3> = (0..40).map(|i| Vec3::new(i as f32, 2.5, -(i as f32))).collect();
  let decoded = roundtrip(&points, 12, CompressionLevel::DEFAULT);
  assert!(decoded.iter().all(|p| p.y == 2.5));
}

#[test]
fn test_invalid_quantization_bits() {
  for bits in [0, -1, 31, i32::MAX] {
    assert_eq!(
      FloatPointsKdTreeEncoder::new(bits, CompressionLevel::DEFAULT).unwrap_err(),
      KdTreeError::InvalidQuantizationBits(bits)
    );
  }
  assert!(FloatPointsKdTreeEncoder::new(30, CompressionLevel::DEFAULT).is_ok());
}

#[test]
fn test_non_finite_coordinate_rejected() {
  let mut encoder = FloatPointsKdTreeEncoder::new(10, CompressionLevel::DEFAULT).unwrap();
  encoder.encode_point_cloud([Vec3::ONE]).unwrap();

  for bad in [f32::NAN, f32::INFINITY, f32::NEG_INFINITY] {
    let result = encoder.encode_point_cloud([Vec3::ZERO, Vec3::new(0.0, bad, 0.0)]);
    assert_eq!(result, Err(KdTreeError::NonFiniteCoordinate));
  }
  // No stale or half-written output
  assert!(encoder.buffer().is_empty());
}

#[test]
fn test_decoder_rejects_mismatched_bit_length() {
  let mut encoder = FloatPointsKdTreeEncoder::new(10, CompressionLevel::DEFAULT).unwrap();
  encoder
    .encode_point_cloud([Vec3::ZERO, Vec3::ONE, Vec3::new(0.5, 0.25, 0.0)])
    .unwrap();
  let mut bytes = encoder.into_bytes();
  bytes[0] = 12;

  let mut buffer = DecoderBuffer::new(&bytes);
  let result = FloatPointsKdTreeDecoder::new(CompressionLevel::DEFAULT).decode_point_cloud(&mut buffer, 3);
  assert!(matches!(result, Err(KdTreeError::CorruptStream(_))));
}

#[test]
fn test_decoder_rejects_bad_header() {
  let decoder = FloatPointsKdTreeDecoder::new(CompressionLevel::DEFAULT);

  // Q = 31
  let mut header = EncoderBuffer::new();
  header.encode_u8(31);
  assert!(matches!(
    decoder.decode_point_cloud(&mut DecoderBuffer::new(header.data()), 0),
    Err(KdTreeError::CorruptStream(_))
  ));

  // min > max
  let mut header = EncoderBuffer::new();
  header.encode_u8(8);
  for v in [1.0f32, 0.0, 0.0, 0.0, 0.0, 0.0] {
    header.encode_f32(v);
  }
  header.encode_bytes(&[8, 5, 0, 0, 0, 0]);
  assert!(matches!(
    decoder.decode_point_cloud(&mut DecoderBuffer::new(header.data()), 0),
    Err(KdTreeError::CorruptStream(_))
  ));

  // NaN bound
  let mut header = EncoderBuffer::new();
  header.encode_u8(8);
  for v in [0.0f32, 0.0, 0.0, f32::NAN, 0.0, 0.0] {
    header.encode_f32(v);
  }
  assert!(matches!(
    decoder.decode_point_cloud(&mut DecoderBuffer::new(header.data()), 0),
    Err(KdTreeError::CorruptStream(_))
  ));
}
