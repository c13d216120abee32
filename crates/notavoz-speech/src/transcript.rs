//! Transcript segments and aggregation.

/// One transcribed stretch of speech.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TranscriptSegment {
    pub text: String,
    /// Final segments are stable; interim ones may be replaced by a later
    /// delivery.
    pub is_final: bool,
}

impl TranscriptSegment {
    pub fn final_text(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            is_final: true,
        }
    }

    pub fn interim(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            is_final: false,
        }
    }
}

/// Concatenates the text of every segment in arrival order, interim and
/// final alike. The result replaces any previously assembled transcript
/// wholesale; later deliveries supersede earlier ones.
pub fn combined_transcript(segments: &[TranscriptSegment]) -> String {
    segments.iter().map(|s| s.text.as_str()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_combined_transcript_keeps_arrival_order() {
        let segments = [
            TranscriptSegment::final_text("fazer "),
            TranscriptSegment::final_text("compras "),
            TranscriptSegment::interim("amanhã"),
        ];
        assert_eq!(combined_transcript(&segments), "fazer compras amanhã");
    }

    #[test]
    fn test_combined_transcript_includes_interim_segments() {
        let segments = [TranscriptSegment::interim("hel")];
        assert_eq!(combined_transcript(&segments), "hel");
    }

    #[test]
    fn test_combined_transcript_empty() {
        assert_eq!(combined_transcript(&[]), "");
    }
}
