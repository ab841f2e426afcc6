//! Document chunking.
//!
//! Two policies are supported: fixed word windows (the default) and
//! overlapping character windows that prefer natural breakpoints.

use docqa_core::config::ChunkingConfig;
use docqa_core::{AppError, AppResult};
use text_splitter::{ChunkConfig, TextSplitter};

/// Default number of words per chunk.
pub const DEFAULT_MAX_WORDS: usize = 100;

/// How a document's text is split into chunks.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChunkStrategy {
    /// Consecutive groups of at most `max_words` whitespace-separated words,
    /// joined with a single space. No overlap.
    Words { max_words: usize },

    /// Character windows of at most `max_chars`, consecutive windows sharing
    /// up to `overlap` characters.
    Overlapping { max_chars: usize, overlap: usize },
}

impl Default for ChunkStrategy {
    fn default() -> Self {
        Self::Words {
            max_words: DEFAULT_MAX_WORDS,
        }
    }
}

impl ChunkStrategy {
    /// Build a strategy from the `chunking` configuration section.
    pub fn from_config(config: &ChunkingConfig) -> AppResult<Self> {
        let strategy = match config.strategy.as_str() {
            "words" => Self::Words {
                max_words: config.max_words,
            },
            "overlapping" => Self::Overlapping {
                max_chars: config.max_chars,
                overlap: config.overlap,
            },
            other => {
                return Err(AppError::Config(format!(
                    "Unknown chunking strategy: {}",
                    other
                )))
            }
        };
        strategy.validate()?;
        Ok(strategy)
    }

    /// Reject parameters that cannot produce a finite chunking.
    pub fn validate(&self) -> AppResult<()> {
        match *self {
            Self::Words { max_words: 0 } => Err(AppError::Config(
                "max_words must be greater than zero".to_string(),
            )),
            Self::Overlapping { max_chars: 0, .. } => Err(AppError::Config(
                "max_chars must be greater than zero".to_string(),
            )),
            Self::Overlapping { max_chars, overlap } if overlap >= max_chars => {
                Err(AppError::Config(format!(
                    "overlap ({}) must be smaller than max_chars ({})",
                    overlap, max_chars
                )))
            }
            _ => Ok(()),
        }
    }
}

/// Split `text` into chunks according to `strategy`.
///
/// Blank text yields no chunks. Every returned chunk is non-empty.
pub fn chunk_text(text: &str, strategy: &ChunkStrategy) -> AppResult<Vec<String>> {
    strategy.validate()?;

    if text.trim().is_empty() {
        return Ok(Vec::new());
    }

    let chunks = match *strategy {
        ChunkStrategy::Words { max_words } => chunk_words(text, max_words),
        ChunkStrategy::Overlapping { max_chars, overlap } => {
            chunk_overlapping(text, max_chars, overlap)?
        }
    };

    tracing::debug!(
        "Chunked {} bytes into {} chunks ({:?})",
        text.len(),
        chunks.len(),
        strategy
    );

    Ok(chunks)
}

fn chunk_words(text: &str, max_words: usize) -> Vec<String> {
    let words: Vec<&str> = text.split_whitespace().collect();
    words.chunks(max_words).map(|window| window.join(" ")).collect()
}

fn chunk_overlapping(text: &str, max_chars: usize, overlap: usize) -> AppResult<Vec<String>> {
    let config = ChunkConfig::new(max_chars)
        .with_overlap(overlap)
        .map_err(|e| AppError::Config(format!("Invalid chunk overlap: {}", e)))?;
    let splitter = TextSplitter::new(config);

    Ok(splitter
        .chunks(text)
        .map(str::trim)
        .filter(|chunk| !chunk.is_empty())
        .map(str::to_string)
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn words(n: usize) -> String {
        (0..n).map(|i| format!("w{}", i)).collect::<Vec<_>>().join(" ")
    }

    #[test]
    fn test_250_words_make_three_chunks() {
        let chunks = chunk_text(&words(250), &ChunkStrategy::default()).unwrap();

        assert_eq!(chunks.len(), 3);
        assert_eq!(chunks[0].split(' ').count(), 100);
        assert_eq!(chunks[1].split(' ').count(), 100);
        assert_eq!(chunks[2].split(' ').count(), 50);
    }

    #[test]
    fn test_words_reconstruct_modulo_whitespace() {
        let text = "  alpha\tbeta\n\ngamma   delta epsilon\r\nzeta  ";
        let chunks = chunk_text(text, &ChunkStrategy::Words { max_words: 4 }).unwrap();

        assert_eq!(chunks, vec!["alpha beta gamma delta", "epsilon zeta"]);
        let rebuilt = chunks.join(" ");
        let original: Vec<&str> = text.split_whitespace().collect();
        assert_eq!(rebuilt, original.join(" "));
    }

    #[test]
    fn test_blank_text_yields_nothing() {
        assert!(chunk_text("", &ChunkStrategy::default()).unwrap().is_empty());
        assert!(chunk_text(" \n\t ", &ChunkStrategy::default())
            .unwrap()
            .is_empty());
    }

    #[test]
    fn test_single_short_chunk() {
        let chunks = chunk_text("just a few words", &ChunkStrategy::default()).unwrap();
        assert_eq!(chunks, vec!["just a few words"]);
    }

    #[test]
    fn test_overlapping_respects_max_chars() {
        let text = "The quick brown fox jumps over the lazy dog. ".repeat(40);
        let strategy = ChunkStrategy::Overlapping {
            max_chars: 120,
            overlap: 30,
        };
        let chunks = chunk_text(&text, &strategy).unwrap();

        assert!(chunks.len() > 1);
        for chunk in &chunks {
            assert!(!chunk.is_empty());
            assert!(chunk.chars().count() <= 120);
        }
    }

    #[test]
    fn test_overlapping_chunks_cover_text_in_order() {
        let text = (0..40)
            .map(|i| format!("Sentence number {} is about topic {}.", i, i * 7))
            .collect::<Vec<_>>()
            .join(" ");
        let strategy = ChunkStrategy::Overlapping {
            max_chars: 120,
            overlap: 40,
        };
        let chunks = chunk_text(&text, &strategy).unwrap();
        assert!(chunks.len() > 1);

        let mut previous_start: Option<usize> = None;
        let mut covered_end = 0;
        for chunk in &chunks {
            let from = previous_start.map_or(0, |start| start + 1);
            let start = from
                + text[from..]
                    .find(chunk.as_str())
                    .unwrap_or_else(|| panic!("chunk not found in order: {:?}", chunk));

            if start > covered_end {
                assert!(
                    text[covered_end..start].trim().is_empty(),
                    "text skipped before {:?}",
                    chunk
                );
            }
            covered_end = covered_end.max(start + chunk.len());
            previous_start = Some(start);
        }

        assert!(text[covered_end..].trim().is_empty());
    }

    #[test]
    fn test_overlapping_utf8() {
        let text = "Gamedex é um aplicativo 🎮 com acentuação: ã, õ, ç. ".repeat(30);
        let strategy = ChunkStrategy::Overlapping {
            max_chars: 80,
            overlap: 10,
        };
        let chunks = chunk_text(&text, &strategy).unwrap();
        assert!(!chunks.is_empty());
    }

    #[test]
    fn test_invalid_strategies() {
        assert!(matches!(
            ChunkStrategy::Words { max_words: 0 }.validate(),
            Err(AppError::Config(_))
        ));
        assert!(matches!(
            chunk_text(
                "text",
                &ChunkStrategy::Overlapping {
                    max_chars: 50,
                    overlap: 50
                }
            ),
            Err(AppError::Config(_))
        ));
    }

    #[test]
    fn test_from_config() {
        let mut config = ChunkingConfig::default();
        assert_eq!(
            ChunkStrategy::from_config(&config).unwrap(),
            ChunkStrategy::Words { max_words: 100 }
        );

        config.strategy = "overlapping".to_string();
        assert_eq!(
            ChunkStrategy::from_config(&config).unwrap(),
            ChunkStrategy::Overlapping {
                max_chars: 500,
                overlap: 100
            }
        );

        config.strategy = "sentences".to_string();
        assert!(ChunkStrategy::from_config(&config).is_err());
    }
}
