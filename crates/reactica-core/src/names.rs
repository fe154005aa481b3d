//! User name generation.
//!
//! Names are the identity of a user and its key in the users cache, so a
//! generator must never hand out the same name twice. [`CuteNameGenerator`]
//! combines an adjective with an animal and falls back to a numeric suffix
//! once a combination has been used.

use std::collections::BTreeSet;

use rand::Rng;
use rand::seq::IndexedRandom as _;

/// A source of unique user names.
pub trait NameSource: Send {
    /// Produce a name never returned before by this source.
    fn generate(&mut self) -> String;
}

const ADJECTIVES: &[&str] = &[
    "bouncy", "brave", "bubbly", "cheeky", "cozy", "cuddly", "curious", "dizzy",
    "fluffy", "fuzzy", "giggly", "gentle", "happy", "jolly", "lucky", "merry",
    "nimble", "perky", "plucky", "quirky", "rosy", "sleepy", "snappy", "sparkly",
    "spunky", "sunny", "tiny", "wiggly", "witty", "zesty",
];

const ANIMALS: &[&str] = &[
    "axolotl", "badger", "beaver", "bunny", "capybara", "chipmunk", "duckling",
    "ferret", "fox", "hamster", "hedgehog", "kitten", "koala", "lemur", "llama",
    "marmot", "meerkat", "mole", "narwhal", "otter", "owl", "panda", "penguin",
    "piglet", "puffin", "quokka", "raccoon", "seal", "sloth", "wombat",
];

/// Adjective + animal names, unique for the lifetime of the generator.
#[derive(Debug)]
pub struct CuteNameGenerator<R> {
    rng: R,
    issued: BTreeSet<String>,
}

impl<R: Rng> CuteNameGenerator<R> {
    /// Create a generator drawing from `rng`.
    pub const fn new(rng: R) -> Self {
        Self {
            rng,
            issued: BTreeSet::new(),
        }
    }

    /// Number of names issued so far.
    pub fn issued(&self) -> usize {
        self.issued.len()
    }
}

impl<R: Rng + Send> NameSource for CuteNameGenerator<R> {
    fn generate(&mut self) -> String {
        let adjective = ADJECTIVES.choose(&mut self.rng).copied().unwrap_or("quiet");
        let animal = ANIMALS.choose(&mut self.rng).copied().unwrap_or("mouse");
        let base = format!("{adjective}-{animal}");

        let mut name = base.clone();
        let mut suffix: u64 = 1;
        while self.issued.contains(&name) {
            suffix = suffix.saturating_add(1);
            name = format!("{base}-{suffix}");
        }
        self.issued.insert(name.clone());
        name
    }
}
