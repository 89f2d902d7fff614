//! # Cards Reader Module
//!
//! Loads the oracle deck from a CSV file and, optionally, resolves one image
//! per card from a directory.
//!
//! ## CSV format
//!
//! The first row is a header. Four columns are required, matched by their
//! exact header text:
//!
//! | Column | Field |
//! |--------|-------|
//! | `Название` | name |
//! | `Описание (основной текст)` | description |
//! | `Совет (толкование карты)` | meaning |
//! | `Ключевое значение (слова, словосочетания)` | keywords |
//!
//! Other columns are ignored. Quoted multiline fields are allowed and every
//! field is trimmed.
//!
//! ## Images
//!
//! An image belongs to a card when its file stem equals the card name
//! exactly and its extension is `png`, `jpg` or `jpeg` in any letter case.

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

use crate::card::Card;
use crate::cards_errors::CardsError;

pub const NAME_COLUMN: &str = "Название";
pub const DESCRIPTION_COLUMN: &str = "Описание (основной текст)";
pub const MEANING_COLUMN: &str = "Совет (толкование карты)";
pub const KEYWORDS_COLUMN: &str = "Ключевое значение (слова, словосочетания)";
pub const IMAGE_EXTENSIONS: [&str; 3] = ["png", "jpg", "jpeg"];

/// Reads card descriptions from a CSV file and converts them to [`Card`]s
#[derive(Debug, Clone)]
pub struct CardsReader {
    csv_path: PathBuf,
    images_dir: Option<PathBuf>,
}

impl CardsReader {
    pub fn new(csv_path: impl Into<PathBuf>) -> Self {
        Self {
            csv_path: csv_path.into(),
            images_dir: None,
        }
    }

    /// Require an image for every card from `dir`
    pub fn with_images(mut self, dir: impl Into<PathBuf>) -> Self {
        self.images_dir = Some(dir.into());
        self
    }

    /// Read the whole deck.
    ///
    /// # Errors
    ///
    /// Fails on a missing file, a missing column, an empty card name, a
    /// malformed row or, when an image directory is set, a card without an
    /// image. Nothing is returned on failure.
    pub fn read_cards(&self) -> Result<Vec<Card>, CardsError> {
        if !self.csv_path.exists() {
            return Err(CardsError::NotFound(self.csv_path.clone()));
        }
        info!(path = %self.csv_path.display(), "Reading cards");

        let mut reader = csv::ReaderBuilder::new()
            .has_headers(true)
            .flexible(true)
            .from_path(&self.csv_path)?;

        let headers = reader.headers()?.clone();
        let column = |name: &str| -> Result<usize, CardsError> {
            headers
                .iter()
                .position(|header| header.trim_start_matches('\u{feff}').trim() == name)
                .ok_or_else(|| CardsError::MissingColumn {
                    row: 1,
                    column: name.to_string(),
                })
        };
        let name_idx = column(NAME_COLUMN)?;
        let description_idx = column(DESCRIPTION_COLUMN)?;
        let meaning_idx = column(MEANING_COLUMN)?;
        let keywords_idx = column(KEYWORDS_COLUMN)?;

        let images = match &self.images_dir {
            Some(dir) => Some(index_images(dir)?),
            None => None,
        };

        let mut cards = Vec::new();
        // Row 1 is the header
        for (row, record) in reader.records().enumerate().map(|(i, r)| (i + 2, r)) {
            let record = record?;
            let field = |idx: usize, column: &str| -> Result<String, CardsError> {
                record
                    .get(idx)
                    .map(|value| value.trim().to_string())
                    .ok_or_else(|| CardsError::MissingColumn {
                        row,
                        column: column.to_string(),
                    })
            };

            let name = field(name_idx, NAME_COLUMN)?;
            if name.is_empty() {
                return Err(CardsError::EmptyName { row });
            }
            let mut card = Card::new(
                name,
                field(description_idx, DESCRIPTION_COLUMN)?,
                field(meaning_idx, MEANING_COLUMN)?,
                field(keywords_idx, KEYWORDS_COLUMN)?,
            );

            if let (Some(images), Some(dir)) = (&images, &self.images_dir) {
                let path = images.get(&card.name).ok_or_else(|| CardsError::MissingImage {
                    name: card.name.clone(),
                    dir: dir.clone(),
                })?;
                card.image_path = Some(path.clone());
            }

            debug!(row, card = %card.name, "Parsed card");
            cards.push(card);
        }

        info!(count = cards.len(), "Cards loaded");
        Ok(cards)
    }
}

fn is_image(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| IMAGE_EXTENSIONS.iter().any(|known| ext.eq_ignore_ascii_case(known)))
}

/// Map image file stems to paths
fn index_images(dir: &Path) -> Result<HashMap<String, PathBuf>, CardsError> {
    if !dir.is_dir() {
        return Err(CardsError::ImageDirNotFound(dir.to_path_buf()));
    }

    let mut paths: Vec<PathBuf> = fs::read_dir(dir)?
        .map(|entry| entry.map(|e| e.path()))
        .collect::<Result<_, _>>()?;
    paths.sort();

    let mut images = HashMap::new();
    for path in paths.into_iter().filter(|p| p.is_file() && is_image(p)) {
        let Some(stem) = path.file_stem().and_then(|s| s.to_str()).map(str::to_string) else {
            continue;
        };
        if let Some(existing) = images.get(&stem) {
            warn!(card = %stem, kept = ?existing, ignored = ?path, "Several images for one card");
            continue;
        }
        images.insert(stem, path);
    }
    Ok(images)
}
