use std::path::PathBuf;

/// One card of the oracle deck
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Card {
    pub name: String,
    pub description: String,
    /// Advice, the card's interpretation
    pub meaning: String,
    pub keywords: String,
    pub image_path: Option<PathBuf>,
}

impl Card {
    pub fn new(
        name: impl Into<String>,
        description: impl Into<String>,
        meaning: impl Into<String>,
        keywords: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            meaning: meaning.into(),
            keywords: keywords.into(),
            image_path: None,
        }
    }

    pub fn with_image(mut self, image_path: impl Into<PathBuf>) -> Self {
        self.image_path = Some(image_path.into());
        self
    }
}
