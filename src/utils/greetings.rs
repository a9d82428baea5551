#![forbid(unsafe_code)]

use std::collections::HashMap;

// ***************************************************************************
//                                Constants
// ***************************************************************************
// Greetings for each time of day, indexed by TimeSlot.  Keys are lowercase.
const GREETINGS: [(&str, [&str; 3]); 7] = [
    ("english",    ["Good morning", "Hello", "Good evening"]),
    ("french",     ["Bonjour", "Bonjour", "Bonsoir"]),
    ("german",     ["Guten morgen", "Hallo", "Guten abend"]),
    ("spanish",    ["Buenos días", "Hola", "Buenas noches"]),
    ("portuguese", ["Bom dia", "Olá", "Boa noite"]),
    ("italian",    ["Buongiorno", "Ciao", "Buonasera"]),
    ("swedish",    ["God morgon", "Hallå", "God kväll"]),
];

// ***************************************************************************
//                                TimeSlot
// ***************************************************************************
/// The three daily windows that select a greeting variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimeSlot {
    Morning = 0,
    Afternoon = 1,
    Evening = 2,
}

impl TimeSlot {
    // -----------------------------------------------------------------------
    // from_hour:
    // -----------------------------------------------------------------------
    /** Map a local hour of day onto a slot.  The evening window wraps past
     * midnight (18-24 and 0-3).  Hours outside 0-24 fall back to the
     * afternoon slot.
     */
    pub fn from_hour(hour: u32) -> Self {
        match hour {
            4..=11  => TimeSlot::Morning,
            12..=17 => TimeSlot::Afternoon,
            18..=24 | 0..=3 => TimeSlot::Evening,
            _ => TimeSlot::Afternoon,
        }
    }

    pub fn index(self) -> usize {
        self as usize
    }
}

// ***************************************************************************
//                              GreetingTable
// ***************************************************************************
/// Immutable language -> [morning, afternoon, evening] lookup built once
/// at startup and shared read-only by all request handlers.
#[derive(Debug, Clone)]
pub struct GreetingTable {
    greetings: HashMap<String, [String; 3]>,
}

impl GreetingTable {
    pub fn new() -> Self {
        let greetings = GREETINGS
            .iter()
            .map(|(lang, g)| (lang.to_string(), g.map(|s| s.to_string())))
            .collect();
        GreetingTable { greetings }
    }

    /// Case-sensitive membership test against the lowercase keys.
    pub fn contains(&self, lang: &str) -> bool {
        self.greetings.contains_key(lang)
    }

    /// The greeting for a language and slot, if the language is known.
    pub fn greeting(&self, lang: &str, slot: TimeSlot) -> Option<&str> {
        self.greetings.get(lang).map(|g| g[slot.index()].as_str())
    }

    /// The full "<greeting>, <name>" line shown on an edition.
    pub fn salutation(&self, lang: &str, slot: TimeSlot, name: &str) -> Option<String> {
        self.greeting(lang, slot).map(|g| format!("{}, {}", g, name))
    }

    /// Sorted language keys, for logging.
    pub fn languages(&self) -> Vec<&str> {
        let mut v: Vec<&str> = self.greetings.keys().map(|k| k.as_str()).collect();
        v.sort_unstable();
        v
    }
}

impl Default for GreetingTable {
    fn default() -> Self {
        Self::new()
    }
}
