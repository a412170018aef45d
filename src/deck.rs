use rand::seq::SliceRandom;

use crate::catalog::{Catalog, Mode};

/// Identifies one vocabulary entry eligible for the current session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PoolItem {
    pub category: String,
    pub word_index: usize,
}

/// A prompt/answer pair ready for display.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Card {
    pub prompt: String,
    pub answer: String,
}

impl Card {
    /// Shown when the deck has nothing to present.
    pub fn placeholder() -> Self {
        Self {
            prompt: "—".to_string(),
            answer: String::new(),
        }
    }
}

/// The dealt session material: the eligible pool and the shuffled
/// presentation order (indices into `pool`, not into the vocabulary).
#[derive(Debug, Clone)]
pub struct Deck {
    pub pool: Vec<PoolItem>,
    pub order: Vec<usize>,
}

impl Deck {
    /// Build the pool from the selected category and deal a presentation
    /// order of `count` cards.
    pub fn deal(catalog: &Catalog, category: &str, count: usize) -> Self {
        let pool: Vec<PoolItem> = catalog
            .get(category)
            .map(|cat| {
                (0..cat.words.len())
                    .map(|word_index| PoolItem {
                        category: category.to_string(),
                        word_index,
                    })
                    .collect()
            })
            .unwrap_or_default();

        let order = build_order(pool.len(), count);
        Self { pool, order }
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// Pool item at a position of the presentation order.
    pub fn item_at(&self, position: usize) -> Option<&PoolItem> {
        self.order.get(position).and_then(|&idx| self.pool.get(idx))
    }
}

/// Shuffle the pool once and take a prefix. When more cards are requested
/// than the pool holds, chain independent shuffles until the target
/// length is reached, then truncate.
fn build_order(pool_size: usize, count: usize) -> Vec<usize> {
    if pool_size == 0 || count == 0 {
        return Vec::new();
    }

    let mut rng = rand::thread_rng();
    let mut order = Vec::with_capacity(count + pool_size);
    while order.len() < count {
        let mut pass: Vec<usize> = (0..pool_size).collect();
        pass.shuffle(&mut rng);
        order.extend(pass);
    }
    order.truncate(count);
    order
}

/// Project a pool item into the prompt/answer pair for the active mode.
/// A missing emoji renders as "—"; an out-of-range item degrades to the
/// placeholder card.
pub fn card_for(catalog: &Catalog, item: &PoolItem, mode: Mode) -> Card {
    let category = match catalog.get(&item.category) {
        Some(category) => category,
        None => return Card::placeholder(),
    };
    let word = match category.words.get(item.word_index) {
        Some(word) => word.clone(),
        None => return Card::placeholder(),
    };
    let emoji = category
        .emojis
        .as_ref()
        .and_then(|emojis| emojis.get(item.word_index))
        .cloned()
        .unwrap_or_else(|| "—".to_string());
    let number = (item.word_index + 1).to_string();

    match mode {
        Mode::NumToWord => Card {
            prompt: number,
            answer: word,
        },
        Mode::WordToNum => Card {
            prompt: word,
            answer: number,
        },
        Mode::EmojiToWord => Card {
            prompt: emoji,
            answer: word,
        },
        Mode::WordToEmoji => Card {
            prompt: word,
            answer: emoji,
        },
    }
}
