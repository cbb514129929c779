//! Utterance normalization and segmentation.
//!
//! Raw user text is lowercased, accent-folded and split into segments. Each
//! segment is matched against the grammars on its own.

use std::fmt;

/// Tokens that open their own segment when they start an utterance.
pub const GREETINGS: [&str; 4] = ["bonjour", "salut", "hello", "coucou"];

const SEPARATOR: &str = ",";

/// One independently matched chunk of an utterance.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Segment {
    tokens: Vec<String>,
}

impl Segment {
    #[must_use]
    pub fn new(tokens: Vec<String>) -> Self {
        Self { tokens }
    }

    #[must_use]
    pub fn tokens(&self) -> &[String] {
        &self.tokens
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }

    #[must_use]
    pub fn contains(&self, word: &str) -> bool {
        self.tokens.iter().any(|t| t == word)
    }

    /// Highest index at which `word` occurs.
    #[must_use]
    pub fn last_index_of(&self, word: &str) -> Option<usize> {
        self.tokens.iter().rposition(|t| t == word)
    }

    /// Space-joined reconstruction of the tokens.
    #[must_use]
    pub fn text(&self) -> String {
        self.tokens.join(" ")
    }
}

impl fmt::Display for Segment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.text())
    }
}

impl<S: Into<String>> FromIterator<S> for Segment {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        Self::new(iter.into_iter().map(Into::into).collect())
    }
}

fn fold_accent(ch: char) -> char {
    match ch {
        'é' | 'è' | 'ê' | 'ë' => 'e',
        'î' | 'ï' => 'i',
        'û' | 'ü' | 'ù' => 'u',
        'ô' | 'ö' | 'ò' => 'o',
        'â' | 'ä' | 'à' => 'a',
        'ç' => 'c',
        other => other,
    }
}

/// Lowercase, fold accents and drop `!`/`?`.
#[must_use]
pub fn normalize(text: &str) -> String {
    text.chars()
        .flat_map(char::to_lowercase)
        .filter(|ch| *ch != '!' && *ch != '?')
        .map(fold_accent)
        .collect()
}

/// Split normalized text into tokens. `,` and `&` yield a separator token.
#[must_use]
pub fn tokenize(text: &str) -> Vec<String> {
    let mut tokens = Vec::new();
    let mut word = String::new();

    for ch in normalize(text).chars() {
        match ch {
            ' ' | '-' => {
                if !word.is_empty() {
                    tokens.push(std::mem::take(&mut word));
                }
            }
            ',' | '&' => {
                if !word.is_empty() {
                    tokens.push(std::mem::take(&mut word));
                }
                tokens.push(SEPARATOR.to_string());
            }
            _ => word.push(ch),
        }
    }

    if !word.is_empty() {
        tokens.push(word);
    }

    tokens
}

/// Split an utterance into non-empty segments.
#[must_use]
pub fn segment(text: &str) -> Vec<Segment> {
    let mut segments = Vec::new();
    let mut current = Vec::new();

    for (i, token) in tokenize(text).into_iter().enumerate() {
        if i == 0 && GREETINGS.contains(&token.as_str()) {
            segments.push(Segment::new(vec![token]));
        } else if token == SEPARATOR {
            if !current.is_empty() {
                segments.push(Segment::new(std::mem::take(&mut current)));
            }
        } else {
            current.push(token);
        }
    }

    if !current.is_empty() {
        segments.push(Segment::new(current));
    }

    segments
}
