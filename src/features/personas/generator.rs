//! # Feature: Rule-based Persona Replies
//!
//! Offline reply synthesizer used when no provider is configured and as the
//! fallback when the provider fails. Randomness is injected through
//! [`RandomSource`] so the output distribution can be tested.
//!
//! - **Version**: 1.0.0
//! - **Since**: 1.0.0
//! - **Toggleable**: false

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::sync::Mutex;

use super::persona::{Persona, TEXT_PLACEHOLDER};

/// Probability that a templated reply gets an ending appended
pub const ENDING_PROBABILITY: f64 = 0.35;

/// Uniform choices over finite sets
pub trait RandomSource: Send {
    /// Uniform index in `0..len`. `len` is never zero.
    fn index(&mut self, len: usize) -> usize;

    /// `true` with the given probability
    fn chance(&mut self, probability: f64) -> bool;
}

/// Thread-local RNG from `rand`
#[derive(Debug, Default, Clone, Copy)]
pub struct ThreadRandom;

impl RandomSource for ThreadRandom {
    fn index(&mut self, len: usize) -> usize {
        rand::rng().random_range(0..len)
    }

    fn chance(&mut self, probability: f64) -> bool {
        rand::rng().random_bool(probability)
    }
}

/// Reproducible source, for tests and replay
pub struct SeededRandom(StdRng);

impl SeededRandom {
    pub fn new(seed: u64) -> Self {
        SeededRandom(StdRng::seed_from_u64(seed))
    }
}

impl RandomSource for SeededRandom {
    fn index(&mut self, len: usize) -> usize {
        self.0.random_range(0..len)
    }

    fn chance(&mut self, probability: f64) -> bool {
        self.0.random_bool(probability)
    }
}

pub struct ReplyGenerator {
    persona: &'static Persona,
    random: Mutex<Box<dyn RandomSource>>,
}

impl ReplyGenerator {
    pub fn new(persona: &'static Persona) -> Self {
        Self::with_random(persona, Box::new(ThreadRandom))
    }

    pub fn with_random(persona: &'static Persona, random: Box<dyn RandomSource>) -> Self {
        ReplyGenerator {
            persona,
            random: Mutex::new(random),
        }
    }

    pub fn persona(&self) -> &'static Persona {
        self.persona
    }

    /// Produce an in-character reply for `input`.
    ///
    /// Non-empty input always appears verbatim (trimmed) in the output.
    pub fn generate(&self, input: &str) -> String {
        let trimmed = input.trim();
        let persona = self.persona;
        // A poisoned lock only means another thread panicked mid-pick
        let mut random = self.random.lock().unwrap_or_else(|e| e.into_inner());

        if trimmed.is_empty() {
            let idle = pick(&mut **random, persona.idle_phrases);
            let ending = pick(&mut **random, persona.endings);
            return format!("{}: {idle} {ending}", persona.name);
        }

        let template = pick(&mut **random, persona.templates);
        let mut out = format!(
            "{}: {}",
            persona.name,
            template.replacen(TEXT_PLACEHOLDER, trimmed, 1)
        );
        if random.chance(ENDING_PROBABILITY) {
            out.push(' ');
            out.push_str(pick(&mut **random, persona.endings));
        }
        out
    }
}

fn pick<R: RandomSource + ?Sized>(random: &mut R, items: &'static [&'static str]) -> &'static str {
    items[random.index(items.len()).min(items.len() - 1)]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::features::personas::persona::MECHAMARU;
    use std::collections::{HashSet, VecDeque};

    /// Replays fixed indices and coin flips
    struct Scripted {
        indices: VecDeque<usize>,
        flips: VecDeque<bool>,
    }

    impl Scripted {
        fn new(indices: &[usize], flips: &[bool]) -> Box<Self> {
            Box::new(Scripted {
                indices: indices.iter().copied().collect(),
                flips: flips.iter().copied().collect(),
            })
        }
    }

    impl RandomSource for Scripted {
        fn index(&mut self, _len: usize) -> usize {
            self.indices.pop_front().expect("script ran out of indices")
        }

        fn chance(&mut self, _probability: f64) -> bool {
            self.flips.pop_front().expect("script ran out of flips")
        }
    }

    #[test]
    fn test_empty_input_uses_idle_and_ending() {
        let generator = ReplyGenerator::with_random(&MECHAMARU, Scripted::new(&[1, 3], &[]));
        assert_eq!(
            generator.generate("   "),
            "Mechamaru: My strings creak. Give an instruction.  🤖"
        );
    }

    #[test]
    fn test_empty_input_covers_all_combinations() {
        let generator = ReplyGenerator::with_random(&MECHAMARU, Box::new(SeededRandom::new(7)));
        let mut seen = HashSet::new();
        for _ in 0..2000 {
            seen.insert(generator.generate(""));
        }

        let mut expected = HashSet::new();
        for idle in MECHAMARU.idle_phrases {
            for ending in MECHAMARU.endings {
                expected.insert(format!("Mechamaru: {idle} {ending}"));
            }
        }
        assert_eq!(seen, expected);
    }

    #[test]
    fn test_template_without_ending() {
        let generator = ReplyGenerator::with_random(&MECHAMARU, Scripted::new(&[1], &[false]));
        assert_eq!(
            generator.generate("  fetch the scroll "),
            "Mechamaru: Hmph. fetch the scroll. Very well."
        );
    }

    #[test]
    fn test_template_with_ending() {
        let generator = ReplyGenerator::with_random(&MECHAMARU, Scripted::new(&[0, 0], &[true]));
        assert_eq!(
            generator.generate("guard the door"),
            "Mechamaru: ...guard the door. I will do it. ..."
        );
    }

    #[test]
    fn test_input_always_embedded_verbatim() {
        let generator = ReplyGenerator::with_random(&MECHAMARU, Box::new(SeededRandom::new(42)));
        let inputs = ["hello", "{text} literal", "ÜNÏCØDE 🤖", "multi\nline", "a"];
        for _ in 0..50 {
            for input in inputs {
                let reply = generator.generate(input);
                assert!(reply.starts_with("Mechamaru: "), "{reply}");
                assert!(reply.contains(input), "{reply:?} missing {input:?}");
            }
        }
    }

    #[test]
    fn test_thread_random_stays_in_range() {
        let mut random = ThreadRandom;
        for _ in 0..100 {
            assert!(random.index(4) < 4);
        }
    }
}
