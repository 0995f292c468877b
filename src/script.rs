//! Pitch script: narration text plus the ordered segments shown on screen.

/// One on-screen unit of the script (a sentence or a key point).
#[derive(Debug, Clone, PartialEq)]
pub struct ScriptSegment {
    /// Text displayed for this segment; `\n` forces a line break
    pub text: String,
    /// Relative share of the timeline (1.0 = equal split)
    pub weight: f64,
}

impl ScriptSegment {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            weight: 1.0,
        }
    }

    #[must_use]
    pub fn with_weight(mut self, weight: f64) -> Self {
        self.weight = weight;
        self
    }
}

/// Immutable pitch script consumed by both the synthesizer and the
/// visual producer.
#[derive(Debug, Clone, PartialEq)]
pub struct PitchScript {
    full_text: String,
    segments: Vec<ScriptSegment>,
}

const BEANFLOW_NARRATION: &str = "Good morning. I want to talk about the real problem in every busy coffee shop: the bottleneck at the register. During the rush, customers wait, baristas are stressed, and critical revenue is lost when people walk away from a long line. The issue isn't barista speed; it's the reactive operational model.

My solution is BeanFlow: an AI-powered system that shifts operations from reactive to proactive.

It works in two parts: first, a seamless mobile/kiosk ordering system for speed. Second, and most critical, a predictive AI engine that ingests sales history, time patterns, and even weather data to accurately forecast the next three to five orders before they are fully placed.

This prediction is translated into actionable intelligence on the barista screen, allowing them to pre-prep key ingredients (grinding the beans, steaming the milk) during the customer's payment process.

The result? We are not waiting for the order to start making the coffee. Based on my projections, this leads to a 20% improvement in service speed during peak hours, directly translating to more customers served per hour and significantly higher revenue without having to hire extra staff.

BeanFlow isn't just software; it's a competitive advantage that increases throughput, boosts profitability, and makes the barista's job easier. It's the future of efficient coffee service.

I'd be happy to show you a detailed operational model and the ROI calculator for your locations.";

const BEANFLOW_KEY_POINTS: &[(&str, f64)] = &[
    ("BeanFlow\nAI-Powered Coffee Shop Solution", 3.0),
    ("The Problem:\nBottleneck at the Register", 8.0),
    ("Customers wait...\nBaristas are stressed...\nRevenue is lost", 8.0),
    ("The Solution:\nBeanFlow AI System", 5.0),
    ("Part 1:\nSeamless Mobile/Kiosk Ordering", 6.0),
    ("Part 2:\nPredictive AI Engine", 8.0),
    ("Forecast orders before\nthey're placed", 7.0),
    ("Pre-prep ingredients\nduring payment", 6.0),
    ("Result:\n20% Faster Service", 8.0),
    ("More customers served\nHigher revenue\nNo extra staff needed", 8.0),
    ("BeanFlow:\nYour Competitive Advantage", 5.0),
    ("Let's discuss your ROI", 3.0),
];

impl PitchScript {
    /// The built-in BeanFlow pitch: full narration for speech, weighted
    /// key points for the slides.
    pub fn beanflow() -> Self {
        let segments = BEANFLOW_KEY_POINTS
            .iter()
            .map(|(text, weight)| ScriptSegment::new(*text).with_weight(*weight))
            .collect();
        Self::with_segments(BEANFLOW_NARRATION, segments)
    }

    /// Build a script from free text, one equally weighted segment per
    /// sentence.
    pub fn from_text(text: &str) -> Self {
        let segments = split_sentences(text)
            .into_iter()
            .map(ScriptSegment::new)
            .collect();
        Self::with_segments(text.trim(), segments)
    }

    /// Build a script from narration text and explicit segments.
    pub fn with_segments(full_text: impl Into<String>, segments: Vec<ScriptSegment>) -> Self {
        Self {
            full_text: full_text.into(),
            segments,
        }
    }

    /// Text sent to the speech synthesizer.
    pub fn full_text(&self) -> &str {
        &self.full_text
    }

    pub fn segments(&self) -> &[ScriptSegment] {
        &self.segments
    }

    pub fn is_empty(&self) -> bool {
        self.full_text.trim().is_empty()
    }
}

/// Split text into sentences at `.`, `!` or `?` followed by whitespace or
/// end of text, and at blank lines. Text without a terminator is a single
/// sentence.
pub fn split_sentences(text: &str) -> Vec<String> {
    let mut sentences = Vec::new();
    let mut current = String::new();
    let mut chars = text.chars().peekable();

    while let Some(c) = chars.next() {
        current.push(c);
        let next = chars.peek().copied();

        let terminator = matches!(c, '.' | '!' | '?') && next.map_or(true, char::is_whitespace);
        let paragraph = c == '\n' && next == Some('\n');

        if terminator || paragraph {
            push_trimmed(&mut sentences, &current);
            current.clear();
        }
    }
    push_trimmed(&mut sentences, &current);

    sentences
}

fn push_trimmed(sentences: &mut Vec<String>, candidate: &str) {
    let trimmed = candidate.trim();
    if !trimmed.is_empty() {
        sentences.push(trimmed.to_string());
    }
}

/// Greedy word wrap: pack whitespace-separated words into pieces of at most
/// `max_chars` characters. Words longer than `max_chars` are split mid-word.
pub fn wrap_words(text: &str, max_chars: usize) -> Vec<String> {
    let max_chars = max_chars.max(1);
    let mut pieces = Vec::new();
    let mut current = String::new();
    let mut current_len = 0;

    for word in text.split_whitespace() {
        let word_len = word.chars().count();

        if word_len > max_chars {
            if !current.is_empty() {
                pieces.push(std::mem::take(&mut current));
                current_len = 0;
            }
            let chars: Vec<char> = word.chars().collect();
            for piece in chars.chunks(max_chars) {
                pieces.push(piece.iter().collect());
            }
            continue;
        }

        let needed = if current.is_empty() {
            word_len
        } else {
            current_len + 1 + word_len
        };

        if needed > max_chars {
            pieces.push(std::mem::take(&mut current));
            current_len = 0;
        }

        if !current.is_empty() {
            current.push(' ');
            current_len += 1;
        }
        current.push_str(word);
        current_len += word_len;
    }

    if !current.is_empty() {
        pieces.push(current);
    }

    pieces
}
