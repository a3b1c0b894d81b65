use crate::kd_tree::CompressionLevel;
use super::*;

/// (count, total) pairs covering balanced, one-sided and huge nodes.
fn count_cases() -> Vec<(u32, u32)> {
  let mut cases = Vec::new();
  for total in [2u32, 3, 4, 5, 7, 8, 100, 1023, 1024, 65_537] {
    for count in [0, 1, total / 2, total / 2 + 1, total - 1, total] {
      cases.push((count.min(total), total));
    }
  }
  cases.push((0, u32::MAX));
  cases.push((u32::MAX, u32::MAX));
  cases.push((u32::MAX / 2, u32::MAX));
  cases.push((u32::MAX / 2 + 1, u32::MAX));
  cases
}

#[test]
fn test_zigzag_roundtrip() {
  for s in [-5i64, -1, 0, 1, 2, 1 << 31, -(1 << 31)] {
    assert_eq!(unzigzag(zigzag(s)), s);
  }
  assert_eq!(zigzag(0), 0);
  assert_eq!(zigzag(-1), 1);
  assert_eq!(zigzag(1), 2);
}

#[test]
fn test_counts_roundtrip_every_level() {
  let cases = count_cases();
  for level in CompressionLevel::all() {
    let policy = level.policy();
    let mut enc = StructureEncoder::new(&policy);
    for (i, &(count, total)) in cases.iter().enumerate() {
      enc.encode_count(count, total);
      enc.encode_axis(i % 3, if i == 0 { None } else { Some((i - 1) % 3) });
    }
    let bytes = enc.finish();

    let mut dec = StructureDecoder::new(&policy, &bytes).unwrap();
    for (i, &(count, total)) in cases.iter().enumerate() {
      assert_eq!(dec.decode_count(total).unwrap(), count, "level {:?} case {}", level, i);
      let parent = if i == 0 { None } else { Some((i - 1) % 3) };
      assert_eq!(dec.decode_axis(parent).unwrap(), i % 3);
    }
    dec.finish().unwrap();
  }
}

/// Fixed-width code: `bits_for(n)` bits per count.
#[test]
fn test_fixed_count_width() {
  let policy = CompressionLevel::FASTEST.policy();
  let mut enc = StructureEncoder::new(&policy);
  enc.encode_count(3, 5); // 3 bits
  enc.encode_count(1, 2); // 2 bits
  enc.encode_count(0, 3); // 2 bits
  assert_eq!(enc.finish(), vec![0b0110_1000]);
}

#[test]
fn test_fixed_count_out_of_range_is_corrupt() {
  let policy = CompressionLevel::FASTEST.policy();
  // 3 bits holding 7 for a node of 5 points
  let bytes = [0b1110_0000];
  let mut dec = StructureDecoder::new(&policy, &bytes).unwrap();
  assert!(matches!(dec.decode_count(5), Err(KdTreeError::CorruptStream(_))));
}

#[test]
fn test_fixed_axis_three_is_corrupt() {
  let policy = CompressionLevel::FASTEST.policy();
  let bytes = [0b1100_0000];
  let mut dec = StructureDecoder::new(&policy, &bytes).unwrap();
  assert!(matches!(dec.decode_axis(None), Err(KdTreeError::CorruptStream(_))));
}

/// Balanced splits are cheap under the adaptive code.
#[test]
fn test_adaptive_favors_balanced_splits() {
  let fixed = CompressionLevel::FASTEST.policy();
  let adaptive = CompressionLevel::BEST.policy();

  let mut fixed_enc = StructureEncoder::new(&fixed);
  let mut adaptive_enc = StructureEncoder::new(&adaptive);
  for i in 0..2_000u32 {
    let total = 1_000 + (i % 17);
    let count = total / 2 + (i % 3);
    fixed_enc.encode_count(count, total);
    adaptive_enc.encode_count(count, total);
  }
  let fixed_len = fixed_enc.finish().len();
  let adaptive_len = adaptive_enc.finish().len();
  assert!(
    adaptive_len * 4 < fixed_len,
    "adaptive {} bytes vs fixed {} bytes",
    adaptive_len,
    fixed_len
  );
}
