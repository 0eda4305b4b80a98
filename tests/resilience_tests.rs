//! Resilience tests - damage stego images and verify repair or rejection.

use adaptive_stego::carrier::{BitOrdering, EmbeddingPlan, PixelGrid, HEADER_CHANNELS};
use adaptive_stego::config::{kdf_params, StegoConfig};
use adaptive_stego::crypto::KeyDerivation;
use adaptive_stego::payload::Secret;
use adaptive_stego::stego::extract;
use adaptive_stego::{Error, Stego};
use rand::{Rng, RngCore, SeedableRng};
use rand_chacha::ChaCha8Rng;
use std::collections::{HashMap, HashSet};

const PASSPHRASE: &str = "resilience_test";

/// Helper to create a 256x256 cover: noisy waves on the left half, a flat
/// patch on the right half.
fn textured_cover() -> PixelGrid {
    let mut rng = ChaCha8Rng::seed_from_u64(2024);
    PixelGrid::from_fn(256, 256, |x, y, c| {
        if x < 128 {
            let wave = 60.0 * (x as f64 * 0.3 + c as f64).sin() * (y as f64 * 0.2).cos();
            ((128.0 + wave).round() as i32 + rng.gen_range(-2..=2)).clamp(0, 255) as u8
        } else {
            (130 + rng.gen_range(-1..=1)) as u8
        }
    })
    .expect("Failed to build cover")
}

fn config() -> StegoConfig {
    StegoConfig::with_iterations(kdf_params::MIN_ITERATIONS)
}

/// Embed a random payload and return the stego image with its payload.
fn embed_random(len: usize, seed: u64) -> (PixelGrid, Vec<u8>) {
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    let mut data = vec![0u8; len];
    rng.fill_bytes(&mut data);

    let stego = Stego::new(config()).expect("Failed to create engine");
    let embedded = stego
        .embed(&textured_cover(), &Secret::new(data.clone(), None), PASSPHRASE)
        .expect("Failed to embed");
    (embedded.image, data)
}

/// Locate the three physical copies of every ciphertext bit, the way an
/// extractor holding the passphrase would.
fn ciphertext_copies(image: &PixelGrid) -> Vec<[(usize, u8); 3]> {
    let config = config();
    let plan = EmbeddingPlan::compute(image, &config.planner).expect("Failed to plan");
    let (prefix, _) = extract::read_prefix(image).expect("Failed to read header");
    let material = KeyDerivation::from_salt(prefix.salt)
        .derive(PASSPHRASE, config.kdf_iterations)
        .expect("Failed to derive key");

    BitOrdering::new(&plan, material.ordering_seed())
        .copies(&plan)
        .take(prefix.ciphertext_len as usize * 8)
        .map(|triple| triple.map(|slot| (slot.channel, slot.bit)))
        .collect()
}

#[test]
fn test_single_copy_repaired() {
    let (mut image, data) = embed_random(400, 1);
    let copies = ciphertext_copies(&image);

    let (channel, bit) = copies[0][1];
    image.flip_bit(channel, bit);

    let stego = Stego::new(config()).expect("Failed to create engine");
    let extracted = stego.extract(&image, PASSPHRASE).expect("Single flip should be repaired");
    assert_eq!(extracted.data, data);
    assert_eq!(extracted.corrected_bits, 1);
}

#[test]
fn test_one_copy_per_bit_scattered_damage() {
    let (mut image, data) = embed_random(400, 2);
    let copies = ciphertext_copies(&image);

    // damage one copy of a random subset of bits
    let mut rng = ChaCha8Rng::seed_from_u64(99);
    let mut damaged = 0;
    for triple in &copies {
        if rng.gen_bool(0.2) {
            let (channel, bit) = triple[rng.gen_range(0..3)];
            image.flip_bit(channel, bit);
            damaged += 1;
        }
    }

    let stego = Stego::new(config()).expect("Failed to create engine");
    let extracted = stego.extract(&image, PASSPHRASE).expect("Damage should be repaired");
    assert_eq!(extracted.data, data);
    assert_eq!(extracted.corrected_bits, damaged);
}

#[test]
fn test_rewritten_samples_repaired() {
    let (mut image, data) = embed_random(400, 7);
    let copies = ciphertext_copies(&image);

    let owner: HashMap<(usize, u8), usize> = copies
        .iter()
        .enumerate()
        .flat_map(|(index, triple)| triple.iter().map(move |&slot| (slot, index)))
        .collect();

    // overwrite both low bits of whole samples, at most one copy per bit
    let mut rng = ChaCha8Rng::seed_from_u64(17);
    let mut hit = HashSet::new();
    let mut rewritten = 0;
    while rewritten < 40 {
        let (channel, _) = copies[rng.gen_range(0..copies.len())][rng.gen_range(0..3)];
        let touched: Vec<usize> = [0u8, 1]
            .iter()
            .filter_map(|&bit| owner.get(&(channel, bit)).copied())
            .collect();
        if touched.iter().any(|index| hit.contains(index)) {
            continue;
        }
        hit.extend(touched);
        image.flip_bit(channel, 0);
        image.flip_bit(channel, 1);
        rewritten += 1;
    }

    let stego = Stego::new(config()).expect("Failed to create engine");
    let extracted = stego.extract(&image, PASSPHRASE).expect("Rewritten samples should be repaired");
    assert_eq!(extracted.data, data);
    assert_eq!(extracted.corrected_bits, hit.len());
}

#[test]
fn test_logical_bit_corruption_detected() {
    let (mut image, _) = embed_random(400, 3);
    let copies = ciphertext_copies(&image);

    for index in [0, copies.len() / 2, copies.len() - 1] {
        let mut damaged = image.clone();
        for (channel, bit) in copies[index] {
            damaged.flip_bit(channel, bit);
        }
        let stego = Stego::new(config()).expect("Failed to create engine");
        let result = stego.extract(&damaged, PASSPHRASE);
        assert!(
            matches!(result, Err(Error::AuthenticationFailed) | Err(Error::IntegrityMismatch)),
            "bit {} was not detected",
            index
        );
    }

    // untouched image still extracts
    let stego = Stego::new(config()).expect("Failed to create engine");
    assert!(stego.extract(&image, PASSPHRASE).is_ok());
    image.flip_bit(copies[0][0].0, copies[0][0].1);
    assert!(stego.extract(&image, PASSPHRASE).is_ok());
}

#[test]
fn test_header_single_copy_repaired() {
    let (mut image, data) = embed_random(100, 4);

    // one copy of every header bit
    for bit in 0..HEADER_CHANNELS / 3 {
        image.flip_bit(bit * 3 + bit % 3, 0);
    }

    let stego = Stego::new(config()).expect("Failed to create engine");
    let extracted = stego.extract(&image, PASSPHRASE).expect("Header should be repaired");
    assert_eq!(extracted.data, data);
    assert_eq!(extracted.corrected_bits, HEADER_CHANNELS / 3);
}

#[test]
fn test_destroyed_magic_means_no_data() {
    let (mut image, _) = embed_random(100, 5);

    // all three copies of the first magic bit
    for channel in 0..3 {
        image.flip_bit(channel, 0);
    }

    let stego = Stego::new(config()).expect("Failed to create engine");
    assert!(matches!(stego.extract(&image, PASSPHRASE), Err(Error::NoHiddenData)));
}

#[test]
fn test_tampered_salt_fails_authentication() {
    let (mut image, _) = embed_random(100, 6);

    // first salt bit sits after magic (32 bits) and version (8 bits)
    let salt_bit = 40;
    for copy in 0..3 {
        image.flip_bit(salt_bit * 3 + copy, 0);
    }

    let stego = Stego::new(config()).expect("Failed to create engine");
    assert!(matches!(
        stego.extract(&image, PASSPHRASE),
        Err(Error::AuthenticationFailed)
    ));
}
