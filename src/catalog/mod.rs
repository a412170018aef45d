use serde::{Deserialize, Serialize};
use serde_json::from_str;
use std::collections::BTreeMap;

use include_dir::{include_dir, Dir};

static CATALOG_DIR: Dir = include_dir!("src/catalog");

/// Quiz direction: which side of a vocabulary entry is shown as the
/// prompt and which is hidden as the answer.
#[derive(
    Clone,
    Copy,
    Debug,
    PartialEq,
    Eq,
    Serialize,
    Deserialize,
    clap::ValueEnum,
    strum_macros::Display,
)]
#[serde(rename_all = "kebab-case")]
pub enum Mode {
    #[strum(serialize = "number → word")]
    NumToWord,
    #[strum(serialize = "word → number")]
    WordToNum,
    #[strum(serialize = "emoji → word")]
    EmojiToWord,
    #[strum(serialize = "word → emoji")]
    WordToEmoji,
}

/// One vocabulary category. `emojis`, when present, is aligned with
/// `words` by index.
#[derive(Deserialize, Clone, Debug)]
pub struct Category {
    pub name: String,
    #[serde(default)]
    pub ordered: bool,
    pub words: Vec<String>,
    #[serde(default)]
    pub emojis: Option<Vec<String>>,
}

/// The built-in vocabulary, embedded at compile time.
#[derive(Clone, Debug)]
pub struct Catalog {
    categories: BTreeMap<String, Category>,
}

impl Catalog {
    /// Load every embedded category file. A file that fails to parse, or
    /// whose emoji list is misaligned with its words, degrades (skipped
    /// or emojis dropped) instead of failing the whole catalog.
    pub fn load() -> Self {
        let mut categories = BTreeMap::new();

        for file in CATALOG_DIR.files() {
            if file.path().extension().map_or(true, |ext| ext != "json") {
                continue;
            }
            let Some(raw) = file.contents_utf8() else {
                continue;
            };
            match from_str::<Category>(raw) {
                Ok(mut category) => {
                    if let Some(emojis) = &category.emojis {
                        if emojis.len() != category.words.len() {
                            log::warn!(
                                "category {} has {} emojis for {} words, dropping emojis",
                                category.name,
                                emojis.len(),
                                category.words.len()
                            );
                            category.emojis = None;
                        }
                    }
                    categories.insert(category.name.clone(), category);
                }
                Err(err) => {
                    log::warn!("skipping unreadable category file {:?}: {}", file.path(), err);
                }
            }
        }

        Self { categories }
    }

    pub fn get(&self, key: &str) -> Option<&Category> {
        self.categories.get(key)
    }

    /// Category keys in stable (alphabetical) order.
    pub fn keys(&self) -> Vec<&str> {
        self.categories.keys().map(String::as_str).collect()
    }

    /// Quiz modes a category supports: number modes when it is ordered,
    /// emoji modes when it carries emojis. A category supporting neither
    /// still gets the number modes, treating the positional index as the
    /// "number".
    pub fn modes_for(&self, key: &str) -> Vec<Mode> {
        let mut modes = Vec::new();
        if let Some(category) = self.get(key) {
            if category.ordered {
                modes.push(Mode::NumToWord);
                modes.push(Mode::WordToNum);
            }
            if category.emojis.is_some() {
                modes.push(Mode::EmojiToWord);
                modes.push(Mode::WordToEmoji);
            }
        }
        if modes.is_empty() {
            modes.push(Mode::NumToWord);
            modes.push(Mode::WordToNum);
        }
        modes
    }

    pub fn supports(&self, key: &str, mode: Mode) -> bool {
        self.modes_for(key).contains(&mode)
    }
}
