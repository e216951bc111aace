//! Identifier tokenization and the layered expansion resolver.

use pointwise_core::{DictionaryStore, EquipmentType};

/// Split a raw identifier into ordered tokens.
///
/// Boundaries are non-alphanumeric characters, letter/digit transitions and
/// lower-to-upper camel-case transitions: `"ROOM TEMP_4"` gives
/// `["ROOM", "TEMP", "4"]`, `"zoneTemp2"` gives `["zone", "Temp", "2"]`.
pub fn tokenize(identifier: &str) -> Vec<String> {
    let mut tokens = Vec::new();
    let mut current = String::new();
    let mut prev: Option<char> = None;

    for c in identifier.chars() {
        if !c.is_alphanumeric() {
            flush(&mut tokens, &mut current);
            prev = None;
            continue;
        }

        if let Some(p) = prev {
            let boundary = (p.is_alphabetic() && c.is_numeric())
                || (p.is_numeric() && c.is_alphabetic())
                || (p.is_lowercase() && c.is_uppercase());
            if boundary {
                flush(&mut tokens, &mut current);
            }
        }

        current.push(c);
        prev = Some(c);
    }
    flush(&mut tokens, &mut current);

    tokens
}

fn flush(tokens: &mut Vec<String>, current: &mut String) {
    if !current.is_empty() {
        tokens.push(std::mem::take(current));
    }
}

pub fn is_numeric(token: &str) -> bool {
    !token.is_empty() && token.chars().all(char::is_numeric)
}

/// One lookup strategy in the resolver chain.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Layer {
    Equipment(EquipmentType),
    Generic,
}

impl Layer {
    /// A hit, or `None` for "no opinion".
    fn resolve<'d>(&self, store: &'d DictionaryStore, token: &str) -> Option<&'d str> {
        match self {
            Self::Equipment(eq) => store.lookup_equipment(*eq, token),
            Self::Generic => store.lookup_generic(token),
        }
    }
}

/// A token expansion and the layer that produced it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Resolution<'d> {
    pub expansion: &'d str,
    pub layer: Layer,
}

/// Ordered lookup layers, tried in sequence until one answers.
#[derive(Debug, Clone)]
pub struct ResolverChain {
    layers: Vec<Layer>,
}

impl ResolverChain {
    /// Equipment table first (when known), generic table second.
    pub fn for_equipment(equipment: Option<EquipmentType>) -> Self {
        let mut layers = Vec::with_capacity(2);
        if let Some(eq) = equipment {
            layers.push(Layer::Equipment(eq));
        }
        layers.push(Layer::Generic);
        Self { layers }
    }

    pub fn layers(&self) -> &[Layer] {
        &self.layers
    }

    pub fn resolve<'d>(&self, store: &'d DictionaryStore, token: &str) -> Option<Resolution<'d>> {
        self.layers.iter().find_map(|layer| {
            layer
                .resolve(store, token)
                .map(|expansion| Resolution { expansion, layer: *layer })
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn splits_on_separators() {
        assert_eq!(tokenize("SA_TS"), vec!["SA", "TS"]);
        assert_eq!(tokenize("ROOM TEMP_4"), vec!["ROOM", "TEMP", "4"]);
        assert_eq!(tokenize("AHU-1.SF.CMD"), vec!["AHU", "1", "SF", "CMD"]);
    }

    #[test]
    fn splits_on_digit_letter_transitions() {
        assert_eq!(tokenize("ZN4TEMP"), vec!["ZN", "4", "TEMP"]);
        assert_eq!(tokenize("VAV12"), vec!["VAV", "12"]);
    }

    #[test]
    fn splits_camel_case() {
        assert_eq!(tokenize("zoneTemp2"), vec!["zone", "Temp", "2"]);
        assert_eq!(tokenize("DamperPos"), vec!["Damper", "Pos"]);
    }

    #[test]
    fn empty_and_separator_only() {
        assert!(tokenize("").is_empty());
        assert!(tokenize(" _-. ").is_empty());
    }

    #[test]
    fn numeric_detection() {
        assert!(is_numeric("4"));
        assert!(is_numeric("012"));
        assert!(!is_numeric("4A"));
        assert!(!is_numeric(""));
    }

    #[test]
    fn chain_prefers_equipment_layer() {
        let store = DictionaryStore::builtin();
        let chain = ResolverChain::for_equipment(Some(EquipmentType::Vav));
        let hit = chain.resolve(&store, "RH").unwrap();
        assert_eq!(hit.expansion, "Reheat");
        assert_eq!(hit.layer, Layer::Equipment(EquipmentType::Vav));

        let hit = chain.resolve(&store, "TEMP").unwrap();
        assert_eq!(hit.layer, Layer::Generic);
    }

    #[test]
    fn chain_without_equipment_is_generic_only() {
        let store = DictionaryStore::builtin();
        let chain = ResolverChain::for_equipment(None);
        assert_eq!(chain.layers(), &[Layer::Generic]);
        assert_eq!(chain.resolve(&store, "RH").unwrap().expansion, "Relative Humidity");
        assert!(chain.resolve(&store, "LOBBY").is_none());
    }
}
