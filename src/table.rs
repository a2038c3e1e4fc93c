//! The code table of the compressor.
//!
//! Codes below the alphabet size are literals. Every further code is a pair of a prefix code and
//! one byte, assigned in the order the pairs were learned.
use crate::{Code, Configuration};

/// What a single code stands for.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Entry {
    /// The code represents exactly this byte.
    Literal(u8),
    /// The code represents the sequence of `prefix` followed by `byte`.
    Pair { prefix: Code, byte: u8 },
}

/// A monotonically growing code table.
///
/// Lookups go through a successor index per code instead of scanning all entries. To avoid using
/// too much memory codes with few successors keep them in a short list that is searched
/// linearly; only codes with many successors get a direct map over all byte values.
pub struct Table {
    /// The configured bound on the number of entries.
    table_size: usize,
    /// The number of literal codes.
    alphabet_size: u16,
    /// Every assigned code, in order.
    entries: Vec<Entry>,
    /// The successor index of each assigned code.
    keys: Vec<FullKey>,
    simples: Vec<Simple>,
    complex: Vec<Full>,
}

#[derive(Clone, Copy)]
enum FullKey {
    NoSuccessor,
    Simple(usize),
    Full(usize),
}

const SHORT: usize = 16;

#[derive(Clone, Copy)]
struct Simple {
    codes: [Code; SHORT],
    chars: [u8; SHORT],
    count: u8,
}

#[derive(Clone, Copy)]
struct Full {
    char_continuation: [Option<Code>; 256],
}

impl Table {
    /// Create a table holding only the literal codes.
    pub fn new(config: &Configuration) -> Self {
        let alphabet_size = config.alphabet_size();
        let table_size = config.table_size();
        let mut entries = Vec::with_capacity(table_size);
        entries.extend((0..alphabet_size).map(|ch| Entry::Literal(ch as u8)));

        Table {
            table_size,
            alphabet_size,
            entries,
            keys: vec![FullKey::NoSuccessor; usize::from(alphabet_size)],
            simples: Vec::new(),
            complex: Vec::new(),
        }
    }

    /// The code the next learned pair will get.
    ///
    /// This is also the number of entries, literals included.
    pub fn next_code(&self) -> usize {
        self.entries.len()
    }

    /// The bound on the number of entries.
    pub fn table_size(&self) -> usize {
        self.table_size
    }

    /// The number of literal codes.
    pub fn alphabet_size(&self) -> u16 {
        self.alphabet_size
    }

    /// If no more pairs can be learned.
    pub fn is_full(&self) -> bool {
        self.entries.len() >= self.table_size
    }

    /// Get the entry of an assigned code.
    pub fn entry(&self, code: Code) -> Option<Entry> {
        self.entries.get(usize::from(code)).copied()
    }

    /// All assigned entries, indexed by their code.
    pub fn entries(&self) -> &[Entry] {
        &self.entries
    }

    /// Find the code of the pair `prefix` followed by `ch`.
    pub fn find(&self, prefix: Code, ch: u8) -> Option<Code> {
        match *self.keys.get(usize::from(prefix))? {
            FullKey::NoSuccessor => None,
            FullKey::Simple(idx) => {
                let nexts = &self.simples[idx];
                nexts
                    .codes
                    .iter()
                    .zip(nexts.chars.iter())
                    .take(usize::from(nexts.count))
                    .find(|&(_, &sch)| sch == ch)
                    .map(|(&scode, _)| scode)
            }
            FullKey::Full(idx) => self.complex[idx].char_continuation[usize::from(ch)],
        }
    }

    /// Find the code of a pair by looking at every learned entry in order.
    ///
    /// This is slow but obviously correct; it always agrees with `find`.
    pub fn scan(&self, prefix: Code, ch: u8) -> Option<Code> {
        let wanted = Entry::Pair { prefix, byte: ch };
        self.entries[usize::from(self.alphabet_size)..]
            .iter()
            .position(|&entry| entry == wanted)
            .map(|idx| (idx + usize::from(self.alphabet_size)) as Code)
    }

    /// Learn the pair `prefix` followed by `ch`, returning its new code.
    ///
    /// Returns `None` and leaves the table untouched once it is full. The caller must make sure
    /// the pair is not yet present and that `prefix` is an assigned code.
    pub fn insert(&mut self, prefix: Code, ch: u8) -> Option<Code> {
        if self.is_full() {
            return None;
        }

        debug_assert!(usize::from(prefix) < self.entries.len());
        debug_assert!(self.find(prefix, ch).is_none());

        let next = self.entries.len() as Code;
        let key = self.keys[usize::from(prefix)];
        match key {
            FullKey::NoSuccessor => {
                let mut simple = Simple::default();
                simple.codes[0] = next;
                simple.chars[0] = ch;
                simple.count = 1;
                self.keys[usize::from(prefix)] = FullKey::Simple(self.simples.len());
                self.simples.push(simple);
            }
            FullKey::Simple(idx) if usize::from(self.simples[idx].count) < SHORT => {
                let nexts = &mut self.simples[idx];
                let nidx = usize::from(nexts.count);
                nexts.chars[nidx] = ch;
                nexts.codes[nidx] = next;
                nexts.count += 1;
            }
            FullKey::Simple(idx) => {
                let simple = &self.simples[idx];
                let mut full = Full {
                    char_continuation: [None; 256],
                };
                for (&pch, &pcont) in simple.chars.iter().zip(simple.codes.iter()) {
                    full.char_continuation[usize::from(pch)] = Some(pcont);
                }
                full.char_continuation[usize::from(ch)] = Some(next);
                self.keys[usize::from(prefix)] = FullKey::Full(self.complex.len());
                self.complex.push(full);
            }
            FullKey::Full(idx) => {
                self.complex[idx].char_continuation[usize::from(ch)] = Some(next);
            }
        }

        self.entries.push(Entry::Pair { prefix, byte: ch });
        self.keys.push(FullKey::NoSuccessor);
        Some(next)
    }
}

impl Default for Simple {
    fn default() -> Self {
        Simple {
            codes: [0; SHORT],
            chars: [0; SHORT],
            count: 0,
        }
    }
}
