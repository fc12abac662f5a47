//! # Leaf Records
//!
//! A [`Node`] is the atomic unit stored in a block: an opaque byte payload,
//! a label pointing at the logically preceding node, and an identity that
//! is the SHA-256 of the payload.
//!
//! ## Identity
//!
//! ```text
//! identity = hex(SHA-256(content))
//! ```
//!
//! The identity is computed exactly once per content assignment, in the
//! same call that stores the content. A node that has never been given
//! content has no identity; a node given *empty* content has the identity
//! of the empty string (`e3b0c442...`).
//!
//! ## Predecessors
//!
//! `predecessor` is a value, not a pointer. Nothing checks that the node
//! it names exists, and the predecessor's lifetime is independent of this
//! one. It is a label for the caller's own bookkeeping.

use serde::{Deserialize, Serialize};

use super::error::NodeError;
use crate::crypto::hash::sha256_hex;

/// An immutable leaf record.
///
/// Deserializing never trusts a stored identity: it is recomputed from the
/// decoded content.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "RawNode")]
pub struct Node {
    /// Canonical encoded payload.
    content: Vec<u8>,
    /// Identity of the preceding node. Empty for a root node.
    predecessor: String,
    /// Hex SHA-256 of `content`. `None` until content is assigned.
    identity: Option<String>,
}

impl Node {
    /// A node with no predecessor and no content.
    pub fn new_root() -> Self {
        Self::default()
    }

    /// A node that follows `predecessor`.
    pub fn new(predecessor: impl Into<String>) -> Self {
        Self {
            predecessor: predecessor.into(),
            ..Self::default()
        }
    }

    /// The synthetic empty leaf used to even out an odd leaf count.
    pub fn padding() -> Self {
        let mut node = Self::new_root();
        node.set_content(Vec::new());
        node
    }

    /// Encode `payload` with bincode and store it as this node's content.
    ///
    /// Content and identity are replaced together. If encoding fails the
    /// node is left exactly as it was.
    pub fn add_content<T>(&mut self, payload: &T) -> Result<(), NodeError>
    where
        T: Serialize + ?Sized,
    {
        let encoded = bincode::serialize(payload)?;
        self.set_content(encoded);
        Ok(())
    }

    /// Store raw bytes as content, bypassing the encoder.
    pub fn set_content(&mut self, content: Vec<u8>) {
        self.identity = Some(sha256_hex(&content));
        self.content = content;
    }

    /// Builder-style [`Node::set_content`].
    pub fn with_content(mut self, content: impl Into<Vec<u8>>) -> Self {
        self.set_content(content.into());
        self
    }

    pub fn content(&self) -> &[u8] {
        &self.content
    }

    /// Content length in bytes. This is what counts against block capacity.
    pub fn size(&self) -> usize {
        self.content.len()
    }

    pub fn predecessor(&self) -> &str {
        &self.predecessor
    }

    pub fn is_root(&self) -> bool {
        self.predecessor.is_empty()
    }

    /// Hex SHA-256 of the content, or `None` if no content was assigned.
    pub fn identity(&self) -> Option<&str> {
        self.identity.as_deref()
    }
}

/// Wire shape of a [`Node`] before its identity is re-derived.
#[derive(Deserialize)]
struct RawNode {
    content: Vec<u8>,
    predecessor: String,
    #[serde(default)]
    identity: Option<String>,
}

impl From<RawNode> for Node {
    fn from(raw: RawNode) -> Self {
        let mut node = Node::new(raw.predecessor);
        // Content present, or an identity claimed for empty content.
        if !raw.content.is_empty() || raw.identity.is_some() {
            node.set_content(raw.content);
        }
        node
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crypto::hash::sha256;

    const EMPTY_SHA256: &str = "e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855";

    #[derive(Serialize)]
    struct Reading {
        sensor: String,
        value: f64,
    }

    #[test]
    fn test_root_node_has_no_identity() {
        let node = Node::new_root();
        assert!(node.is_root());
        assert!(node.identity().is_none());
        assert_eq!(node.size(), 0);
    }

    #[test]
    fn test_new_records_predecessor_verbatim() {
        let node = Node::new("abc123");
        assert_eq!(node.predecessor(), "abc123");
        assert!(!node.is_root());
    }

    #[test]
    fn test_identity_is_sha256_of_content() {
        let node = Node::new_root().with_content(b"hello".to_vec());
        assert_eq!(node.identity(), Some(hex::encode(sha256(b"hello")).as_str()));
    }

    #[test]
    fn test_empty_content_identity() {
        let node = Node::padding();
        assert_eq!(node.identity(), Some(EMPTY_SHA256));
        assert!(node.content().is_empty());
    }

    #[test]
    fn test_add_content_uses_bincode() {
        let reading = Reading {
            sensor: "t-01".to_string(),
            value: 21.5,
        };
        let mut node = Node::new_root();
        node.add_content(&reading).unwrap();

        let expected = bincode::serialize(&reading).unwrap();
        assert_eq!(node.content(), expected.as_slice());
        assert_eq!(node.identity(), Some(sha256_hex(&expected).as_str()));
    }

    #[test]
    fn test_add_content_is_deterministic() {
        let mut a = Node::new_root();
        let mut b = Node::new("other-parent");
        a.add_content("payload").unwrap();
        b.add_content("payload").unwrap();
        assert_eq!(a.identity(), b.identity());
    }

    struct Unencodable;

    impl Serialize for Unencodable {
        fn serialize<S: serde::Serializer>(&self, _serializer: S) -> Result<S::Ok, S::Error> {
            Err(serde::ser::Error::custom("refusing to encode"))
        }
    }

    #[test]
    fn test_encode_failure_leaves_node_untouched() {
        let mut node = Node::new("parent").with_content(b"original".to_vec());
        let before = node.clone();

        let err = node.add_content(&Unencodable).unwrap_err();
        assert!(matches!(err, NodeError::Encode(_)));
        assert!(err.to_string().contains("refusing to encode"));
        assert_eq!(node, before);
    }

    #[test]
    fn test_reassigning_content_replaces_identity() {
        let mut node = Node::new_root().with_content(b"first".to_vec());
        let first = node.identity().map(str::to_owned);
        node.set_content(b"second".to_vec());
        assert_ne!(node.identity().map(str::to_owned), first);
        assert_eq!(node.identity(), Some(sha256_hex(b"second").as_str()));
    }

    #[test]
    fn test_deserialize_recomputes_identity() {
        let json = r#"{"content":[104,105],"predecessor":"","identity":"deadbeef"}"#;
        let node: Node = serde_json::from_str(json).unwrap();
        assert_eq!(node.content(), b"hi");
        assert_eq!(node.identity(), Some(sha256_hex(b"hi").as_str()));
    }

    #[test]
    fn test_deserialize_fills_missing_identity() {
        let json = r#"{"content":[104,105],"predecessor":"abc","identity":null}"#;
        let node: Node = serde_json::from_str(json).unwrap();
        assert_eq!(node.predecessor(), "abc");
        assert_eq!(node.identity(), Some(sha256_hex(b"hi").as_str()));
    }

    #[test]
    fn test_serde_roundtrip_preserves_node() {
        let assigned = Node::new("parent").with_content(b"payload".to_vec());
        let json = serde_json::to_string(&assigned).unwrap();
        assert_eq!(serde_json::from_str::<Node>(&json).unwrap(), assigned);

        let blank = Node::new_root();
        let json = serde_json::to_string(&blank).unwrap();
        let decoded: Node = serde_json::from_str(&json).unwrap();
        assert!(decoded.identity().is_none());

        let padding = Node::padding();
        let json = serde_json::to_string(&padding).unwrap();
        assert_eq!(serde_json::from_str::<Node>(&json).unwrap(), padding);
    }
}
