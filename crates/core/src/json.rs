use serde::de::DeserializeOwned;

/// Deserialize the first well-formed JSON array embedded in `text`.
///
/// Model replies and web pages wrap the payload in prose, code fences or
/// markup; every `[` is tried in order and trailing content is ignored.
pub fn first_json_array<T: DeserializeOwned>(text: &str) -> Option<T> {
    text.char_indices()
        .filter(|&(_, c)| c == '[')
        .find_map(|(i, _)| {
            let mut de = serde_json::Deserializer::from_str(&text[i..]);
            T::deserialize(&mut de).ok()
        })
}
