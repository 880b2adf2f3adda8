//! Localization lookup capability
//!
//! Phrase tables live with the host UI; the client only asks for a phrase by
//! key and substitutes `{n}` placeholders itself.

/// Phrase lookup by key
pub trait Localizer: Send + Sync {
    /// Localized phrase for `key`; implementations return the key itself when unknown
    fn lookup(&self, key: &str) -> String;
}

/// Built-in English phrases for the status messages the client produces
#[derive(Debug, Clone, Copy, Default)]
pub struct EnglishLocalizer;

impl Localizer for EnglishLocalizer {
    fn lookup(&self, key: &str) -> String {
        let phrase = match key {
            "translationTakeFewMinutes" => "Translation will take a few minutes",
            "translationTakeApproximatelyMinutes" => "Translation will take approximately {n} min",
            "translationTakeApproximatelyMinute" => "Translation will take approximately a minute",
            "streamNoConnectionToServer" => "No connection to the stream translation server",
            "audioNotReceived" => "Audio link not received",
            "requestTranslationFailed" => "Failed to request video translation",
            _ => key,
        };
        phrase.to_string()
    }
}

/// Replace `{n}` in a looked-up phrase
pub fn format_count(phrase: &str, n: i64) -> String {
    phrase.replace("{n}", &n.to_string())
}
