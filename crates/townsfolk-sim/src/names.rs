//! Name generation for spawned agents.

use ahash::AHashSet;

use crate::agent::{AgentName, Gender};
use crate::rng::SimRng;

const FIRST_MALE: &[&str] = &[
    "Aldric", "Bertram", "Conrad", "Dietrich", "Edmund", "Falko", "Gareth", "Henrik", "Ivo",
    "Jareth", "Kaelin", "Leoric", "Merrick", "Nolan", "Oswin", "Percival", "Roderic", "Sigmund",
    "Theron", "Ulric", "Viktor", "Walden", "Brandt", "Cedric", "Dorian", "Emeric", "Florian",
    "Godwin", "Haldor", "Ingram", "Joran", "Kenric", "Lothar", "Magnus", "Norbert",
];

const FIRST_FEMALE: &[&str] = &[
    "Adela", "Brigid", "Cecily", "Daria", "Elsbeth", "Fiona", "Greta", "Helena", "Isolde",
    "Johanna", "Katrin", "Lena", "Maren", "Nessa", "Olwen", "Petra", "Rosalind", "Sybil", "Tilda",
    "Ursula", "Vera", "Willa", "Agna", "Berta", "Cora", "Eda", "Frida", "Gerda", "Hild", "Ilsa",
    "Jutta", "Kara", "Liora", "Maeve", "Nell",
];

const LAST_NAMES: &[&str] = &[
    "Ashford", "Brewer", "Cooper", "Dyer", "Fletcher", "Grayson", "Harper", "Irwin", "Joiner",
    "Keller", "Lindgren", "Mason", "Norwood", "Oakley", "Palmer", "Reed", "Sawyer", "Thatcher",
    "Ward", "Brennan", "Carver", "Dunbar", "Falk", "Graves", "Holden", "Kern", "Lang", "Morrow",
    "Nash", "Orwell", "Pike", "Roth", "Stone", "Trask", "Voss", "Wren",
];

/// Attempts at finding an unused name before accepting a duplicate.
const MAX_ATTEMPTS: usize = 50;

/// Generates first/last name pairs, avoiding repeats within one world.
#[derive(Debug, Default)]
pub struct NameGenerator {
    used: AHashSet<String>,
}

impl NameGenerator {
    /// Creates a generator with no names in use.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Marks a fixed name as taken.
    pub fn reserve(&mut self, name: &AgentName) {
        self.used.insert(format!("{} {}", name.first, name.last));
    }

    /// Draws a name for the given gender.
    pub fn generate(&mut self, gender: Gender, rng: &mut SimRng) -> AgentName {
        let firsts = match gender {
            Gender::Male => FIRST_MALE,
            Gender::Female => FIRST_FEMALE,
        };
        let mut name = AgentName::new("Nameless", "Wanderer");
        for _ in 0..MAX_ATTEMPTS {
            let first = rng.pick(firsts).copied().unwrap_or("Nameless");
            let last = rng.pick(LAST_NAMES).copied().unwrap_or("Wanderer");
            name = AgentName::new(first, last);
            if !self.used.contains(&name.full) {
                break;
            }
        }
        self.used.insert(name.full.clone());
        name
    }

    /// Number of names handed out or reserved.
    #[must_use]
    pub fn len(&self) -> usize {
        self.used.len()
    }

    /// Whether no names are in use.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.used.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_names_are_unique() {
        let mut rng = SimRng::seeded(9);
        let mut names = NameGenerator::new();
        let mut seen = AHashSet::new();
        for i in 0..40 {
            let gender = if i % 2 == 0 { Gender::Male } else { Gender::Female };
            let name = names.generate(gender, &mut rng);
            assert!(seen.insert(name.full.clone()), "duplicate name {}", name.full);
        }
    }

    #[test]
    fn test_female_names_from_female_list() {
        let mut rng = SimRng::seeded(3);
        let mut names = NameGenerator::new();
        let name = names.generate(Gender::Female, &mut rng);
        assert!(FIRST_FEMALE.contains(&name.first.as_str()));
        assert!(LAST_NAMES.contains(&name.last.as_str()));
    }
}
