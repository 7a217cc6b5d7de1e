use crate::error::Result;
use std::thread;
use std::time::Duration;

/// A text transform applied by one pipeline stage.
///
/// Each chain position owns its transform exclusively, so implementations
/// may carry mutable state without synchronization. Errors are per-item:
/// the stage worker logs them and moves on to the next item.
pub trait Transform: Send + 'static {
    /// Transform one input line into one output line.
    fn apply(&mut self, input: String) -> Result<String>;

    /// Get a human-readable name for this transform
    fn name(&self) -> &str {
        "transform"
    }
}

/// Converts every character to uppercase
#[derive(Debug)]
pub struct Uppercaser;

impl Transform for Uppercaser {
    fn apply(&mut self, input: String) -> Result<String> {
        Ok(input.to_uppercase())
    }

    fn name(&self) -> &str {
        "uppercaser"
    }
}

/// Rotates the string one position to the right; the last character wraps
/// around to the front
#[derive(Debug)]
pub struct Rotator;

impl Transform for Rotator {
    fn apply(&mut self, input: String) -> Result<String> {
        let mut chars = input.chars();
        let Some(last) = chars.next_back() else {
            return Ok(input);
        };
        let mut output = String::with_capacity(input.len());
        output.push(last);
        output.push_str(chars.as_str());
        Ok(output)
    }

    fn name(&self) -> &str {
        "rotator"
    }
}

/// Reverses the order of characters
#[derive(Debug)]
pub struct Flipper;

impl Transform for Flipper {
    fn apply(&mut self, input: String) -> Result<String> {
        Ok(input.chars().rev().collect())
    }

    fn name(&self) -> &str {
        "flipper"
    }
}

/// Inserts a single space between each pair of characters
#[derive(Debug)]
pub struct Expander;

impl Transform for Expander {
    fn apply(&mut self, input: String) -> Result<String> {
        let mut output = String::with_capacity(input.len() * 2);
        let mut chars = input.chars();
        if let Some(first) = chars.next() {
            output.push(first);
            for c in chars {
                output.push(' ');
                output.push(c);
            }
        }
        Ok(output)
    }

    fn name(&self) -> &str {
        "expander"
    }
}

/// Prefixes every line with `"[logger] "`
#[derive(Debug)]
pub struct LogPrefixer;

impl Transform for LogPrefixer {
    fn apply(&mut self, input: String) -> Result<String> {
        Ok(format!("[logger] {input}"))
    }

    fn name(&self) -> &str {
        "logger"
    }
}

/// Prefixes every line with `"[typewriter] "`, pacing one delay per input
/// character to simulate typing
#[derive(Debug)]
pub struct Typewriter {
    delay: Duration,
}

impl Typewriter {
    /// Create a typewriter with the standard 100 ms per-character delay.
    pub fn new() -> Self {
        Self::with_delay(Duration::from_millis(100))
    }

    /// Create a typewriter with a custom per-character delay.
    pub fn with_delay(delay: Duration) -> Self {
        Self { delay }
    }
}

impl Default for Typewriter {
    fn default() -> Self {
        Self::new()
    }
}

impl Transform for Typewriter {
    fn apply(&mut self, input: String) -> Result<String> {
        if !self.delay.is_zero() {
            for _ in input.chars() {
                thread::sleep(self.delay);
            }
        }
        Ok(format!("[typewriter] {input}"))
    }

    fn name(&self) -> &str {
        "typewriter"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_uppercaser() {
        let mut t = Uppercaser;
        assert_eq!(t.apply("hello".to_string()).unwrap(), "HELLO");
        assert_eq!(t.apply("MiXeD 123".to_string()).unwrap(), "MIXED 123");
    }

    #[test]
    fn test_rotator() {
        let mut t = Rotator;
        assert_eq!(t.apply("hello".to_string()).unwrap(), "ohell");
        assert_eq!(t.apply("ab".to_string()).unwrap(), "ba");
        assert_eq!(t.apply("x".to_string()).unwrap(), "x");
        assert_eq!(t.apply(String::new()).unwrap(), "");
    }

    #[test]
    fn test_flipper() {
        let mut t = Flipper;
        assert_eq!(t.apply("hello".to_string()).unwrap(), "olleh");
        assert_eq!(t.apply(String::new()).unwrap(), "");
    }

    #[test]
    fn test_flipper_round_trip() {
        let mut t = Flipper;
        let once = t.apply("round trip".to_string()).unwrap();
        assert_eq!(t.apply(once).unwrap(), "round trip");
    }

    #[test]
    fn test_expander() {
        let mut t = Expander;
        assert_eq!(t.apply("abc".to_string()).unwrap(), "a b c");
        assert_eq!(t.apply("a".to_string()).unwrap(), "a");
        assert_eq!(t.apply(String::new()).unwrap(), "");
    }

    #[test]
    fn test_log_prefixer() {
        let mut t = LogPrefixer;
        assert_eq!(t.apply("hello".to_string()).unwrap(), "[logger] hello");
    }

    #[test]
    fn test_typewriter_prefix() {
        let mut t = Typewriter::with_delay(Duration::ZERO);
        assert_eq!(
            t.apply("hello".to_string()).unwrap(),
            "[typewriter] hello"
        );
    }

    #[test]
    fn test_rotator_multibyte() {
        let mut t = Rotator;
        assert_eq!(t.apply("héllo".to_string()).unwrap(), "ohéll");
    }
}
