//! AMP box: an ordered multimap of byte-string keys and values
//!
//! Lookups return the first pair whose key matches. Mutation is limited to
//! appending and removing pairs; there is no in-place replacement.

use std::borrow::Cow;

use bytes::Bytes;

use super::{CodecConfig, Error, RemoteError, Result};

/// Key of the error code in an error box
pub const ERROR_CODE_KEY: &str = "_error_code";

/// Key of the error description in an error box
pub const ERROR_DESCRIPTION_KEY: &str = "_error_description";

/// Something a box can be searched by.
///
/// Byte types match verbatim. Text is matched as ISO-8859-1, one byte per
/// character, the way header-style AMP keys are written.
pub trait BoxKey {
    /// Key bytes used for comparison
    fn key_bytes(&self) -> Cow<'_, [u8]>;
}

impl BoxKey for [u8] {
    fn key_bytes(&self) -> Cow<'_, [u8]> {
        Cow::Borrowed(self)
    }
}

impl<const N: usize> BoxKey for [u8; N] {
    fn key_bytes(&self) -> Cow<'_, [u8]> {
        Cow::Borrowed(self)
    }
}

impl BoxKey for Vec<u8> {
    fn key_bytes(&self) -> Cow<'_, [u8]> {
        Cow::Borrowed(self)
    }
}

impl BoxKey for Bytes {
    fn key_bytes(&self) -> Cow<'_, [u8]> {
        Cow::Borrowed(self)
    }
}

impl BoxKey for str {
    fn key_bytes(&self) -> Cow<'_, [u8]> {
        latin1_bytes(self)
    }
}

impl BoxKey for String {
    fn key_bytes(&self) -> Cow<'_, [u8]> {
        latin1_bytes(self)
    }
}

impl<T: BoxKey + ?Sized> BoxKey for &T {
    fn key_bytes(&self) -> Cow<'_, [u8]> {
        (**self).key_bytes()
    }
}

/// Encode text as ISO-8859-1. Characters above U+00FF become `?`.
#[must_use]
pub fn latin1_bytes(text: &str) -> Cow<'_, [u8]> {
    if text.is_ascii() {
        return Cow::Borrowed(text.as_bytes());
    }
    Cow::Owned(
        text.chars()
            .map(|c| u8::try_from(u32::from(c)).unwrap_or(b'?'))
            .collect(),
    )
}

/// Decode ISO-8859-1 bytes to text
#[must_use]
pub fn latin1_string(bytes: &[u8]) -> String {
    bytes.iter().copied().map(char::from).collect()
}

/// One key/value pair of a box
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Pair {
    key: Bytes,
    value: Bytes,
}

impl Pair {
    /// Pair key
    #[must_use]
    pub const fn key(&self) -> &Bytes {
        &self.key
    }

    /// Pair value
    #[must_use]
    pub const fn value(&self) -> &Bytes {
        &self.value
    }

    /// Values cannot be replaced through an entry view.
    pub fn set_value(&self, _value: impl Into<Bytes>) -> Result<Bytes> {
        Err(Error::Unsupported(
            "replacing a value through a box entry".to_string(),
        ))
    }
}

/// Ordered sequence of AMP key/value pairs
#[derive(Debug, Clone, Default)]
pub struct AmpBox {
    pairs: Vec<Pair>,
}

impl AmpBox {
    /// Create an empty box
    #[must_use]
    pub const fn new() -> Self {
        Self { pairs: Vec::new() }
    }

    /// Create an empty box with room for `capacity` pairs
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            pairs: Vec::with_capacity(capacity),
        }
    }

    /// Value of the first pair whose key matches
    pub fn get<K: BoxKey + ?Sized>(&self, key: &K) -> Option<&Bytes> {
        let key = key.key_bytes();
        self.pairs
            .iter()
            .find(|pair| pair.key.as_ref() == key.as_ref())
            .map(|pair| &pair.value)
    }

    /// Values of every pair whose key matches, in insertion order
    pub fn get_all<'a, K: BoxKey + ?Sized>(
        &'a self,
        key: &K,
    ) -> impl Iterator<Item = &'a Bytes> + use<'a, K> {
        let key = key.key_bytes().into_owned();
        self.pairs
            .iter()
            .filter(move |pair| pair.key.as_ref() == key.as_slice())
            .map(|pair| &pair.value)
    }

    /// Append a pair. Existing pairs with the same key are kept.
    pub fn put(&mut self, key: impl Into<Bytes>, value: impl Into<Bytes>) {
        self.pairs.push(Pair {
            key: key.into(),
            value: value.into(),
        });
    }

    /// Append a pair whose key and value are both ISO-8859-1 text
    pub fn put_text(&mut self, key: &str, value: &str) {
        let key = Bytes::from(latin1_bytes(key).into_owned());
        let value = Bytes::from(latin1_bytes(value).into_owned());
        self.put(key, value);
    }

    /// Append every pair of `other`, in order
    pub fn put_all(&mut self, other: &Self) {
        self.pairs.extend(other.pairs.iter().cloned());
    }

    /// Remove the first pair whose key matches and return its value
    pub fn remove<K: BoxKey + ?Sized>(&mut self, key: &K) -> Option<Bytes> {
        let key = key.key_bytes();
        let index = self
            .pairs
            .iter()
            .position(|pair| pair.key.as_ref() == key.as_ref())?;
        Some(self.pairs.remove(index).value)
    }

    /// Boxes are append/remove-only; clearing is refused.
    pub fn clear(&mut self) -> Result<()> {
        Err(Error::Unsupported("clearing a box".to_string()))
    }

    /// Whether any pair has this key
    pub fn contains_key<K: BoxKey + ?Sized>(&self, key: &K) -> bool {
        self.get(key).is_some()
    }

    /// Whether any pair has this value
    pub fn contains_value(&self, value: &[u8]) -> bool {
        self.pairs.iter().any(|pair| pair.value.as_ref() == value)
    }

    /// Number of pairs
    #[must_use]
    pub fn len(&self) -> usize {
        self.pairs.len()
    }

    /// Whether the box has no pairs
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }

    /// Keys in insertion order (duplicates included)
    pub fn keys(&self) -> impl Iterator<Item = &Bytes> {
        self.pairs.iter().map(Pair::key)
    }

    /// Values in insertion order
    pub fn values(&self) -> impl Iterator<Item = &Bytes> {
        self.pairs.iter().map(Pair::value)
    }

    /// Pairs in insertion order
    pub fn entries(&self) -> std::slice::Iter<'_, Pair> {
        self.pairs.iter()
    }

    /// Pairs as a slice
    #[must_use]
    pub fn pairs(&self) -> &[Pair] {
        &self.pairs
    }

    /// Remote error carried by this box, if `_error_code` is present.
    ///
    /// The code is read as ISO-8859-1 and the description as UTF-8; a
    /// description that is not valid UTF-8 is a type mismatch.
    pub fn fill_error(&self) -> Result<Option<RemoteError>> {
        let Some(code) = self.get(ERROR_CODE_KEY) else {
            return Ok(None);
        };
        let description = match self.get(ERROR_DESCRIPTION_KEY) {
            Some(value) => std::str::from_utf8(value)
                .map_err(|_| Error::mismatch_bytes("string", value))?
                .to_string(),
            None => String::new(),
        };
        Ok(Some(RemoteError::new(latin1_string(code), description)))
    }

    /// `Err(Error::Remote)` if this box carries a remote error
    pub fn check_error(&self) -> Result<()> {
        match self.fill_error()? {
            Some(remote) => Err(Error::Remote(remote)),
            None => Ok(()),
        }
    }

    /// Append the two error pairs describing `error`
    pub fn put_error(&mut self, error: &RemoteError) {
        self.put(
            ERROR_CODE_KEY,
            Bytes::from(latin1_bytes(&error.code).into_owned()),
        );
        self.put(
            ERROR_DESCRIPTION_KEY,
            Bytes::from(error.description.clone()),
        );
    }

    /// Encode to wire bytes
    pub fn encode(&self) -> Result<Vec<u8>> {
        super::encode(self)
    }

    /// Decode a single complete frame
    pub fn decode(bytes: &[u8]) -> Result<Self> {
        super::decode(Bytes::copy_from_slice(bytes))
    }

    /// Decode a single complete frame under `config`
    pub fn decode_with(bytes: &[u8], config: &CodecConfig) -> Result<Self> {
        super::decode_with(Bytes::copy_from_slice(bytes), config)
    }

    fn is_subset_of(&self, other: &Self) -> bool {
        self.pairs
            .iter()
            .all(|pair| self.get(&pair.key) == other.get(&pair.key))
    }
}

/// Two boxes are equal when every key of either box looks up the same
/// first value in both.
impl PartialEq for AmpBox {
    fn eq(&self, other: &Self) -> bool {
        self.is_subset_of(other) && other.is_subset_of(self)
    }
}

impl Eq for AmpBox {}

impl<K: Into<Bytes>, V: Into<Bytes>> FromIterator<(K, V)> for AmpBox {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut ampbox = Self::new();
        ampbox.extend(iter);
        ampbox
    }
}

impl<K: Into<Bytes>, V: Into<Bytes>> Extend<(K, V)> for AmpBox {
    fn extend<I: IntoIterator<Item = (K, V)>>(&mut self, iter: I) {
        for (key, value) in iter {
            self.put(key, value);
        }
    }
}

impl<'a> IntoIterator for &'a AmpBox {
    type Item = &'a Pair;
    type IntoIter = std::slice::Iter<'a, Pair>;

    fn into_iter(self) -> Self::IntoIter {
        self.pairs.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> AmpBox {
        AmpBox::from_iter([("a", "1"), ("b", "22"), ("a", "333")])
    }

    #[test]
    fn test_get_returns_first_match() {
        let ampbox = sample();
        assert_eq!(ampbox.get("a").unwrap().as_ref(), b"1");
        assert_eq!(ampbox.get(b"b").unwrap().as_ref(), b"22");
        assert!(ampbox.get("c").is_none());

        let all: Vec<_> = ampbox.get_all("a").map(|v| v.to_vec()).collect();
        assert_eq!(all, vec![b"1".to_vec(), b"333".to_vec()]);
    }

    #[test]
    fn test_put_never_deduplicates() {
        let mut ampbox = AmpBox::new();
        ampbox.put("k", "v1");
        ampbox.put("k", "v2");
        assert_eq!(ampbox.len(), 2);
        assert_eq!(ampbox.get("k").unwrap().as_ref(), b"v1");
    }

    #[test]
    fn test_remove_first_only() {
        let mut ampbox = sample();
        assert_eq!(ampbox.remove("a").unwrap().as_ref(), b"1");
        assert_eq!(ampbox.get("a").unwrap().as_ref(), b"333");
        assert_eq!(ampbox.len(), 2);
        assert!(ampbox.remove("missing").is_none());
    }

    #[test]
    fn test_text_keys_are_latin1() {
        let mut ampbox = AmpBox::new();
        ampbox.put(vec![0xE9u8], "acute");
        assert_eq!(ampbox.get("é").unwrap().as_ref(), b"acute");

        ampbox.put_text("ü", "ß");
        assert_eq!(ampbox.get(&[0xFCu8]).unwrap().as_ref(), &[0xDFu8]);
        assert_eq!(latin1_string(&[0x61, 0xE9]), "aé");
        assert_eq!(latin1_bytes("\u{263A}").as_ref(), b"?");
    }

    #[test]
    fn test_views_preserve_order() {
        let ampbox = sample();
        let keys: Vec<_> = ampbox.keys().map(|k| k.to_vec()).collect();
        assert_eq!(keys, vec![b"a".to_vec(), b"b".to_vec(), b"a".to_vec()]);
        let values: Vec<_> = ampbox.values().map(|v| v.to_vec()).collect();
        assert_eq!(values, vec![b"1".to_vec(), b"22".to_vec(), b"333".to_vec()]);
        assert_eq!(ampbox.entries().count(), 3);
        assert!(ampbox.contains_key("b"));
        assert!(ampbox.contains_value(b"333"));
        assert!(!ampbox.contains_value(b"4"));
        assert!(AmpBox::new().is_empty());
    }

    #[test]
    fn test_mutation_through_views_is_unsupported() {
        let mut ampbox = sample();
        assert!(matches!(ampbox.clear(), Err(Error::Unsupported(_))));
        assert_eq!(ampbox.len(), 3);

        let entry = ampbox.entries().next().unwrap();
        assert!(matches!(entry.set_value("x"), Err(Error::Unsupported(_))));
        assert_eq!(ampbox.get("a").unwrap().as_ref(), b"1");
    }

    #[test]
    fn test_equality_is_symmetric() {
        let small = AmpBox::from_iter([("a", "1")]);
        let large = AmpBox::from_iter([("a", "1"), ("b", "2")]);
        assert_ne!(small, large);
        assert_ne!(large, small);

        let reordered = AmpBox::from_iter([("b", "2"), ("a", "1")]);
        assert_eq!(large, reordered);

        // Shadowed duplicates are invisible to lookups and to equality.
        let shadowed = AmpBox::from_iter([("a", "1"), ("a", "9")]);
        assert_eq!(shadowed, small);
        assert_eq!(shadowed, shadowed.clone());
    }

    #[test]
    fn test_error_pairs() {
        let mut ampbox = AmpBox::new();
        assert!(ampbox.fill_error().unwrap().is_none());
        assert!(ampbox.check_error().is_ok());

        ampbox.put_error(&RemoteError::new("BAD_SUM", "the numbers did not add up"));
        let remote = ampbox.fill_error().unwrap().unwrap();
        assert_eq!(remote.code, "BAD_SUM");
        assert_eq!(remote.description, "the numbers did not add up");
        assert!(matches!(ampbox.check_error(), Err(Error::Remote(r)) if r == remote));
    }

    #[test]
    fn test_error_without_description() {
        let ampbox = AmpBox::from_iter([(ERROR_CODE_KEY, "UNKNOWN")]);
        let remote = ampbox.fill_error().unwrap().unwrap();
        assert_eq!(remote.code, "UNKNOWN");
        assert!(remote.description.is_empty());
    }

    #[test]
    fn test_error_code_is_latin1() {
        let mut ampbox = AmpBox::new();
        ampbox.put(ERROR_CODE_KEY, Bytes::from_static(b"\xFFBAD"));
        let remote = ampbox.fill_error().unwrap().unwrap();
        assert_eq!(remote.code, "\u{FF}BAD");

        let mut echoed = AmpBox::new();
        echoed.put_error(&remote);
        assert_eq!(echoed.get(ERROR_CODE_KEY).unwrap().as_ref(), b"\xFFBAD");
    }

    #[test]
    fn test_error_description_must_be_utf8() {
        let mut ampbox = AmpBox::new();
        ampbox.put(ERROR_CODE_KEY, Bytes::from_static(b"BAD"));
        ampbox.put(ERROR_DESCRIPTION_KEY, Bytes::from_static(b"\xFF\xFE"));
        assert!(matches!(
            ampbox.fill_error(),
            Err(Error::TypeMismatch { expected: "string", .. })
        ));
        assert!(matches!(
            ampbox.check_error(),
            Err(Error::TypeMismatch { .. })
        ));
    }
}
