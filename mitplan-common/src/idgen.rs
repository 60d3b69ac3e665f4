//! Human-readable mitplan identifier generator
//!
//! Produces ids of the form `fierce-mighty-kobold`: two adjectives and a
//! noun drawn uniformly from fixed word lists. Generation is a pure draw;
//! collision checking against live ids is the caller's responsibility
//! (retry until unused).
//!
//! The id space is small (22 * 22 * 15 ≈ 7k combinations), so collision
//! probability rises sharply after a few hundred live mitplans. That is a
//! known scaling boundary of this scheme, not something this module guards
//! against; outgrowing it means migrating to a larger id space.

use rand::Rng;

const ADJECTIVES: &[&str] = &[
    "fierce", "mighty", "sneaky", "arcane", "shadowy", "holy", "ferocious",
    "cunning", "valiant", "mystic", "ancient", "legendary", "heroic",
    "fearsome", "noble", "whimsical", "jolly", "mischievous", "glorious",
    "bouncy", "zany", "quirky",
];

const NOUNS: &[&str] = &[
    "kobold", "ogre", "murloc", "gnoll", "harpy", "quillboar", "trogg",
    "centaur", "naga", "satyr", "worgen", "dragon", "elemental", "gargoyle",
    "lich",
];

/// Generate a candidate mitplan id
pub fn generate() -> String {
    let mut rng = rand::thread_rng();
    let adjective1 = ADJECTIVES[rng.gen_range(0..ADJECTIVES.len())];
    let adjective2 = ADJECTIVES[rng.gen_range(0..ADJECTIVES.len())];
    let noun = NOUNS[rng.gen_range(0..NOUNS.len())];
    format!("{adjective1}-{adjective2}-{noun}")
}
