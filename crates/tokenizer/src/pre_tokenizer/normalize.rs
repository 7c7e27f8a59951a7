//! Unicode normalization applied before training and encoding.
//!
//! Normalization is off by default. When enabled, the same form must be used
//! for training and encoding, so the form is persisted with the model.

use serde::{Deserialize, Serialize};
use std::borrow::Cow;
use unicode_normalization::UnicodeNormalization;

/// Normalization form.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum NormalizationForm {
    /// No normalization
    #[default]
    None,
    /// Canonical composition
    NFC,
    /// Canonical decomposition
    NFD,
    /// Compatibility composition
    NFKC,
    /// Compatibility decomposition
    NFKD,
}

impl std::str::FromStr for NormalizationForm {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "none" => Ok(Self::None),
            "nfc" => Ok(Self::NFC),
            "nfd" => Ok(Self::NFD),
            "nfkc" => Ok(Self::NFKC),
            "nfkd" => Ok(Self::NFKD),
            other => Err(format!("unknown normalization form: {other}")),
        }
    }
}

/// Unicode normalizer.
#[derive(Debug, Clone, Copy, Default)]
pub struct Normalizer {
    /// Normalization form to apply
    form: NormalizationForm,
}

impl Normalizer {
    /// Create a new normalizer.
    pub fn new(form: NormalizationForm) -> Self {
        Self { form }
    }

    /// Normalize text. Borrows the input when normalization is off.
    pub fn normalize<'a>(&self, text: &'a str) -> Cow<'a, str> {
        match self.form {
            NormalizationForm::None => Cow::Borrowed(text),
            NormalizationForm::NFC => Cow::Owned(text.nfc().collect()),
            NormalizationForm::NFD => Cow::Owned(text.nfd().collect()),
            NormalizationForm::NFKC => Cow::Owned(text.nfkc().collect()),
            NormalizationForm::NFKD => Cow::Owned(text.nfkd().collect()),
        }
    }

    /// Check if normalization is enabled.
    pub fn is_enabled(&self) -> bool {
        self.form != NormalizationForm::None
    }
}
