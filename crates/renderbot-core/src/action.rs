//! Callback Actions
//!
//! Closed enum over the inline-keyboard callback data. Every button the
//! bot ever renders maps to one of these, so dispatch is an exhaustive
//! match instead of string comparisons scattered through handlers.

use crate::catalog::Sku;

/// Action encoded in a callback button
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CallbackAction {
    /// Start a checkout for the given bundle
    Buy(Sku),
    /// Display-only button (e.g. the credits counter), acknowledged and dropped
    Ignore,
}

impl CallbackAction {
    /// Wire encoding used as the button's callback data
    pub fn as_data(&self) -> &'static str {
        match self {
            CallbackAction::Buy(Sku::Single) => "buy_single",
            CallbackAction::Buy(Sku::Pack5) => "buy_pack5",
            CallbackAction::Buy(Sku::Marketing) => "buy_marketing",
            CallbackAction::Ignore => "ignore",
        }
    }

    /// Parse callback data; unknown strings return `None`
    pub fn parse(data: &str) -> Option<Self> {
        match data {
            "buy_single" => Some(CallbackAction::Buy(Sku::Single)),
            "buy_pack5" => Some(CallbackAction::Buy(Sku::Pack5)),
            "buy_marketing" => Some(CallbackAction::Buy(Sku::Marketing)),
            "ignore" => Some(CallbackAction::Ignore),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_round_trip() {
        let actions = [
            CallbackAction::Buy(Sku::Single),
            CallbackAction::Buy(Sku::Pack5),
            CallbackAction::Buy(Sku::Marketing),
            CallbackAction::Ignore,
        ];
        for action in actions {
            assert_eq!(CallbackAction::parse(action.as_data()), Some(action));
        }
    }

    #[test]
    fn test_unknown_data() {
        assert_eq!(CallbackAction::parse("buy_pack50"), None);
        assert_eq!(CallbackAction::parse(""), None);
    }
}
