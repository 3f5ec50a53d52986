//! Pluggable normalization of raw model text before it reaches the
//! candidate generator or ranking oracle (spec §4.3, §9). Some model
//! families wrap their internal reasoning in a delimiter pair before the
//! actual answer; left in place, that reasoning pollutes both candidate
//! statements and the JSON the ranking oracle tries to parse. The
//! processing step is named rather than hardcoded so new delimiter
//! conventions can be added without touching the generator or oracle.

/// A single normalization step over completed model text.
pub trait ResponsePostProcessor: Send + Sync {
    fn process(&self, text: &str) -> String;
}

/// Strips everything between a paired reasoning delimiter, e.g. the
/// `<think>...</think>` convention several open-weight reasoning models use.
/// Unterminated openings strip to end of string, since a truncated
/// generation mid-reasoning should not leak partial reasoning text either.
pub struct TagStrippingProcessor {
    open: &'static str,
    close: &'static str,
}

impl TagStrippingProcessor {
    pub const fn new(open: &'static str, close: &'static str) -> Self {
        Self { open, close }
    }
}

impl ResponsePostProcessor for TagStrippingProcessor {
    fn process(&self, text: &str) -> String {
        let mut out = String::with_capacity(text.len());
        let mut rest = text;
        loop {
            match rest.find(self.open) {
                None => {
                    out.push_str(rest);
                    break;
                }
                Some(start) => {
                    out.push_str(&rest[..start]);
                    let after_open = &rest[start + self.open.len()..];
                    match after_open.find(self.close) {
                        Some(end) => rest = &after_open[end + self.close.len()..],
                        None => break,
                    }
                }
            }
        }
        out
    }
}

/// The `<think>...</think>` convention, ready to use as a default step.
pub fn strip_reasoning_tags(text: &str) -> String {
    TagStrippingProcessor::new("<think>", "</think>").process(text)
}

/// Runs a sequence of processors in order, feeding each one's output to the
/// next.
#[derive(Default)]
pub struct PostProcessorChain {
    steps: Vec<Box<dyn ResponsePostProcessor>>,
}

impl PostProcessorChain {
    pub fn new() -> Self {
        Self { steps: Vec::new() }
    }

    pub fn push(mut self, step: Box<dyn ResponsePostProcessor>) -> Self {
        self.steps.push(step);
        self
    }

    pub fn run(&self, text: &str) -> String {
        let mut current = text.to_string();
        for step in &self.steps {
            current = step.process(&current);
        }
        current
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strips_single_reasoning_block() {
        let text = "<think>let me consider the options</think>the answer is 4";
        assert_eq!(strip_reasoning_tags(text), "the answer is 4");
    }

    #[test]
    fn strips_multiple_reasoning_blocks() {
        let text = "<think>a</think>keep<think>b</think>this";
        assert_eq!(strip_reasoning_tags(text), "keepthis");
    }

    #[test]
    fn unterminated_tag_strips_to_end() {
        let text = "kept text<think>trailing reasoning with no close";
        assert_eq!(strip_reasoning_tags(text), "kept text");
    }

    #[test]
    fn text_without_tags_is_unchanged() {
        assert_eq!(strip_reasoning_tags("plain answer"), "plain answer");
    }

    #[test]
    fn chain_runs_steps_in_order() {
        struct Upper;
        impl ResponsePostProcessor for Upper {
            fn process(&self, text: &str) -> String {
                text.to_uppercase()
            }
        }
        let chain = PostProcessorChain::new()
            .push(Box::new(TagStrippingProcessor::new("<think>", "</think>")))
            .push(Box::new(Upper));
        assert_eq!(chain.run("<think>x</think>hi"), "HI");
    }
}
