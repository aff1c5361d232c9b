//! SBC-computed voice quality
//!
//! Instead of scoring in the browser, the SBC can measure the test call from
//! its own RTP/RTCP statistics. It reports the result in an `X-VoiceQuality`
//! header of the BYE that ends the test call, or of an out-of-dialog NOTIFY
//! with event `vq`. The header value has two tokens: a numeric score and a
//! color, e.g. `X-VoiceQuality: 85 green`.

use std::fmt;

use tracing::{info, warn};

use crate::config::QualityTestConfig;

/// Header carrying the SBC voice quality report
pub const X_VOICE_QUALITY: &str = "X-VoiceQuality";

/// Parsed `X-VoiceQuality` header value
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct XVoiceQuality {
    pub score: i64,
    /// Lower-cased color token
    pub color: String,
}

impl XVoiceQuality {
    /// Parse a header value
    ///
    /// Tokens are separated by single spaces. A malformed value is logged and
    /// yields `None`.
    pub fn parse(value: &str) -> Option<Self> {
        let words: Vec<&str> = value.trim().split(' ').collect();
        if words.len() != 2 {
            warn!("{} header: parsing problem: must be 2 tokens", X_VOICE_QUALITY);
            return None;
        }
        let Some(score) = parse_leading_int(words[0]) else {
            warn!("{} header: parsing problem: the first token is not number", X_VOICE_QUALITY);
            return None;
        };
        Some(Self {
            score,
            color: words[1].trim().to_lowercase(),
        })
    }

    /// Text configured for this color, if any
    pub fn text<'a>(&self, config: &'a QualityTestConfig) -> Option<&'a str> {
        config.sbc_quality_text.get(&self.color).map(String::as_str)
    }
}

/// Integer prefix of a token: optional sign then decimal digits, anything
/// after the digits is ignored (`"85%"` is 85)
fn parse_leading_int(token: &str) -> Option<i64> {
    let token = token.trim_start();
    let (negative, rest) = match token.as_bytes().first() {
        Some(b'-') => (true, &token[1..]),
        Some(b'+') => (false, &token[1..]),
        _ => (false, token),
    };
    let digits_len = rest.bytes().take_while(u8::is_ascii_digit).count();
    if digits_len == 0 {
        return None;
    }
    let value: i64 = rest[..digits_len].parse().ok()?;
    Some(if negative { -value } else { value })
}

/// Outcome of an SBC-scored test call
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SbcVerdict {
    Passed {
        score: i64,
        color: String,
        /// `None` when no text is configured for the color
        text: Option<String>,
    },
    Failed,
}

impl SbcVerdict {
    /// Verdict from the `X-VoiceQuality` header of the message ending the test
    /// call, `None` when the header is absent
    pub fn from_header(value: Option<&str>, config: &QualityTestConfig) -> Self {
        let Some(value) = value else {
            warn!("missing \"{}\" header", X_VOICE_QUALITY);
            return SbcVerdict::Failed;
        };
        match XVoiceQuality::parse(value) {
            Some(vq) => {
                let text = vq.text(config).map(str::to_string);
                info!(
                    "\"{}\" header: score=\"{}\", color=\"{}\" text=\"{}\"",
                    X_VOICE_QUALITY,
                    vq.score,
                    vq.color,
                    text.as_deref().unwrap_or("undefined")
                );
                SbcVerdict::Passed {
                    score: vq.score,
                    color: vq.color,
                    text,
                }
            }
            None => SbcVerdict::Failed,
        }
    }

    pub fn passed(&self) -> bool {
        matches!(self, SbcVerdict::Passed { .. })
    }
}

/// Verdict of an SBC-scored test call, see [`SbcVerdict::from_header`]
pub fn sbc_verdict(header: Option<&str>, config: &QualityTestConfig) -> SbcVerdict {
    SbcVerdict::from_header(header, config)
}

impl fmt::Display for SbcVerdict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SbcVerdict::Passed { text: Some(text), .. } => write!(f, "Test call quality: {}", text),
            SbcVerdict::Passed { color, .. } => write!(f, "Test call quality: {}", color),
            SbcVerdict::Failed => write!(f, "Test failed"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse() {
        assert_eq!(
            XVoiceQuality::parse(" 85 Green "),
            Some(XVoiceQuality { score: 85, color: "green".into() })
        );
        assert_eq!(XVoiceQuality::parse("3.7 yellow").map(|vq| vq.score), Some(3));
        assert_eq!(XVoiceQuality::parse("-1 gray").map(|vq| vq.score), Some(-1));
    }

    #[test]
    fn test_parse_problems() {
        assert_eq!(XVoiceQuality::parse("85"), None);
        assert_eq!(XVoiceQuality::parse("85 green extra"), None);
        assert_eq!(XVoiceQuality::parse("85  green"), None);
        assert_eq!(XVoiceQuality::parse("good green"), None);
        assert_eq!(XVoiceQuality::parse("- red"), None);
    }

    #[test]
    fn test_verdict() {
        let config = QualityTestConfig::default();

        let verdict = SbcVerdict::from_header(Some("90 green"), &config);
        assert!(verdict.passed());
        assert_eq!(verdict.to_string(), "Test call quality: Good");

        let verdict = SbcVerdict::from_header(Some("40 purple"), &config);
        assert_eq!(
            verdict,
            SbcVerdict::Passed { score: 40, color: "purple".into(), text: None }
        );
        assert_eq!(verdict.to_string(), "Test call quality: purple");

        assert_eq!(sbc_verdict(None, &config), SbcVerdict::Failed);
        assert_eq!(SbcVerdict::from_header(Some("bad"), &config), SbcVerdict::Failed);
    }
}
