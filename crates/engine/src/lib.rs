use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Side length of a (square) card, in board pixels.
pub const CARD_SIZE: f64 = 128.0;

/// Upper bound on random samples drawn for a single insertion.
pub const MAX_PLACEMENT_ATTEMPTS: u32 = 100;

pub const DEFAULT_BOARD_WIDTH: f64 = 500.0;
pub const DEFAULT_BOARD_HEIGHT: f64 = 500.0;

/// Elements every fresh board starts with: `(name, emoji, x, y)`.
pub const STARTING_ELEMENTS: [(&str, &str, f64, f64); 4] = [
    ("Fire", "🔥", 900.0, 400.0),
    ("Water", "💧", 1100.0, 400.0),
    ("Earth", "🪨", 1000.0, 250.0),
    ("Air", "🌬️", 1000.0, 550.0),
];

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Element {
    pub name: String,
    pub emoji: String,
    pub x: f64,
    pub y: f64,
}

impl Element {
    pub fn position(&self) -> Position {
        Position {
            x: self.x,
            y: self.y,
        }
    }
}

/// A resolved element that has not been given a position yet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Candidate {
    pub name: String,
    pub emoji: String,
}

impl Candidate {
    pub fn new(name: impl Into<String>, emoji: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            emoji: emoji.into(),
        }
    }
}

/// Top-left corner of a card.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Position {
    pub x: f64,
    pub y: f64,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoardSize {
    pub width: f64,
    pub height: f64,
}

impl Default for BoardSize {
    fn default() -> Self {
        Self {
            width: DEFAULT_BOARD_WIDTH,
            height: DEFAULT_BOARD_HEIGHT,
        }
    }
}

impl BoardSize {
    /// Size reported by the client. Unmeasured (missing, zero, negative, NaN) dimensions
    /// fall back to the defaults independently.
    pub fn measured(width: Option<f64>, height: Option<f64>) -> Self {
        let usable = |v: Option<f64>| v.filter(|v| v.is_finite() && *v > 0.0);
        Self {
            width: usable(width).unwrap_or(DEFAULT_BOARD_WIDTH),
            height: usable(height).unwrap_or(DEFAULT_BOARD_HEIGHT),
        }
    }
}

/// Square-footprint collision: both axes closer than one card.
///
/// Only card-to-card distance is checked; board edges are handled by the sampling range.
pub fn collides(a: Position, b: Position) -> bool {
    (a.x - b.x).abs() < CARD_SIZE && (a.y - b.y).abs() < CARD_SIZE
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Search {
    pub position: Option<Position>,
    pub attempts: u32,
}

/// Rejection-sample a free spot for a new card.
///
/// Samples are uniform over `[0, width - CARD_SIZE) x [0, height - CARD_SIZE)`. An axis
/// narrower than a card pins that coordinate to 0.
pub fn search_position<R: Rng + ?Sized>(
    elements: &[Element],
    size: BoardSize,
    rng: &mut R,
) -> Search {
    let span_x = size.width - CARD_SIZE;
    let span_y = size.height - CARD_SIZE;

    for attempt in 1..=MAX_PLACEMENT_ATTEMPTS {
        let candidate = Position {
            x: sample(rng, span_x),
            y: sample(rng, span_y),
        };
        if !elements.iter().any(|e| collides(e.position(), candidate)) {
            return Search {
                position: Some(candidate),
                attempts: attempt,
            };
        }
    }

    Search {
        position: None,
        attempts: MAX_PLACEMENT_ATTEMPTS,
    }
}

pub fn find_available_position<R: Rng + ?Sized>(
    elements: &[Element],
    size: BoardSize,
    rng: &mut R,
) -> Option<Position> {
    search_position(elements, size, rng).position
}

fn sample<R: Rng + ?Sized>(rng: &mut R, span: f64) -> f64 {
    if span > 0.0 && span.is_finite() {
        rng.gen_range(0.0..span)
    } else {
        0.0
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum PlaceOutcome {
    Placed(Element),
    Duplicate,
    NoRoom { attempts: u32 },
}

/// The set of placed elements.
///
/// Elements live in arrival order; `index` maps a name to its slot so the duplicate check
/// does not scan. Nothing is ever moved or removed, so indices stay valid.
#[derive(Debug, Clone)]
pub struct Board {
    elements: Vec<Element>,
    index: HashMap<String, usize>,
    rng: ChaCha8Rng,
}

impl Board {
    pub fn new(rng: ChaCha8Rng) -> Self {
        Self {
            elements: Vec::new(),
            index: HashMap::new(),
            rng,
        }
    }

    pub fn with_seed(seed: u64) -> Self {
        Self::new(ChaCha8Rng::seed_from_u64(seed))
    }

    pub fn from_entropy() -> Self {
        Self::new(ChaCha8Rng::from_entropy())
    }

    pub fn with_starting_elements(rng: ChaCha8Rng) -> Self {
        let mut board = Self::new(rng);
        for (name, emoji, x, y) in STARTING_ELEMENTS {
            board.insert(Element {
                name: name.to_string(),
                emoji: emoji.to_string(),
                x,
                y,
            });
        }
        board
    }

    /// A fresh game board: the starting elements, with a deterministic RNG when `seed` is set.
    pub fn new_game(seed: Option<u64>) -> Self {
        let rng = match seed {
            Some(seed) => ChaCha8Rng::seed_from_u64(seed),
            None => ChaCha8Rng::from_entropy(),
        };
        Self::with_starting_elements(rng)
    }

    pub fn elements(&self) -> &[Element] {
        &self.elements
    }

    pub fn get(&self, name: &str) -> Option<&Element> {
        self.index.get(name).map(|&i| &self.elements[i])
    }

    pub fn contains(&self, name: &str) -> bool {
        self.index.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.elements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }

    /// Monotonic board revision. The board only grows, so this is the insertion count.
    pub fn rev(&self) -> u64 {
        self.elements.len() as u64
    }

    /// Insert `candidate` unless its name is already on the board or no free spot turns up.
    pub fn place_if_new(&mut self, candidate: Candidate, size: BoardSize) -> Option<Element> {
        match self.try_place(candidate, size) {
            PlaceOutcome::Placed(element) => Some(element),
            PlaceOutcome::Duplicate => None,
            PlaceOutcome::NoRoom { .. } => None,
        }
    }

    pub fn try_place(&mut self, candidate: Candidate, size: BoardSize) -> PlaceOutcome {
        if self.contains(&candidate.name) {
            return PlaceOutcome::Duplicate;
        }

        let search = search_position(&self.elements, size, &mut self.rng);
        let Some(pos) = search.position else {
            log::warn!(
                "no free position for {:?} after {} attempts ({}x{})",
                candidate.name,
                search.attempts,
                size.width,
                size.height
            );
            return PlaceOutcome::NoRoom {
                attempts: search.attempts,
            };
        };

        let element = Element {
            name: candidate.name,
            emoji: candidate.emoji,
            x: pos.x,
            y: pos.y,
        };
        self.insert(element.clone());
        log::debug!("placed {:?} at ({:.1}, {:.1})", element.name, element.x, element.y);
        PlaceOutcome::Placed(element)
    }

    fn insert(&mut self, element: Element) {
        self.index.insert(element.name.clone(), self.elements.len());
        self.elements.push(element);
    }
}

#[cfg(test)]
mod tests;
