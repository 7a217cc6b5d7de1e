use crate::transform::{
    Expander, Flipper, LogPrefixer, Rotator, Transform, Typewriter, Uppercaser,
};

/// Stage names the registry can construct, with the one-line descriptions
/// shown by the usage text.
pub const AVAILABLE: &[(&str, &str)] = &[
    ("logger", "Logs all strings that pass through"),
    ("typewriter", "Simulates typewriter effect with delays"),
    ("uppercaser", "Converts strings to uppercase"),
    (
        "rotator",
        "Move every character to the right. Last character moves to the beginning.",
    ),
    ("flipper", "Reverses the order of characters"),
    ("expander", "Expands each character with spaces"),
];

/// Construct a fresh transform for `name`, or `None` if the name is not
/// registered.
///
/// Every call returns a new instance, so a chain that repeats a stage name
/// gets independent state at each position.
pub fn create(name: &str) -> Option<Box<dyn Transform>> {
    match name {
        "uppercaser" => Some(Box::new(Uppercaser)),
        "rotator" => Some(Box::new(Rotator)),
        "flipper" => Some(Box::new(Flipper)),
        "expander" => Some(Box::new(Expander)),
        "logger" => Some(Box::new(LogPrefixer)),
        "typewriter" => Some(Box::new(Typewriter::new())),
        _ => None,
    }
}
