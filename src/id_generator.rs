use rand::Rng;

use crate::document::ArtworkId;

const ADJECTIVES: [&str; 20] = [
    "Vivid", "Retro", "Dreamy", "Neon", "Cosmic", "Pixel", "Sunny", "Velvet", "Arcade", "Prismatic",
    "Zen", "Turbo", "Mint", "Ivory", "Crimson", "Azure", "Blossom", "Nimbus", "Quantum", "Amber",
];

const NOUNS: [&str; 20] = [
    "Meadow", "Orbit", "Lagoon", "Nova", "Canvas", "Bloom", "Valley", "Galaxy", "Temple", "Harbor",
    "Forest", "Mirage", "Mosaic", "Meteor", "Chai", "Nimbus", "Drift", "Aurora", "Cascade", "Vertex",
];

const TAIL_CHARS: &[u8; 36] = b"0123456789ABCDEFGHIJKLMNOPQRSTUVWXYZ";

/// Fresh artwork id (hyphen-less UUID v4)
pub fn generate_id() -> ArtworkId {
    ArtworkId::new(uuid::Uuid::new_v4().simple().to_string())
}

/// A title like `"Neon Harbor #4QZ7"`.
pub fn generate_title<R: Rng>(rng: &mut R) -> String {
    let adjective = ADJECTIVES[rng.random_range(0..ADJECTIVES.len())];
    let noun = NOUNS[rng.random_range(0..NOUNS.len())];
    let tail: String = (0..4)
        .map(|_| TAIL_CHARS[rng.random_range(0..TAIL_CHARS.len())] as char)
        .collect();
    format!("{adjective} {noun} #{tail}")
}
