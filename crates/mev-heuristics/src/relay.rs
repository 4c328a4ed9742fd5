//! Relay detection from execution payload extra data.
//!
//! Builders that deliver blocks through MEV relays usually stamp their name
//! into the payload's `extra_data`. The classifier decodes that field and
//! looks for known relay name fragments. This is a best-effort signal: an
//! unrelated builder whose graffiti happens to contain a fragment is
//! misclassified, and a relay block without graffiti reads as vanilla.

use serde::Serialize;
use tracing::debug;

/// Relay name fragments matched by default, lowercase.
pub const DEFAULT_RELAYS: &[&str] = &[
    "aestus",
    "agnostic",
    "bloxroute",
    "eden",
    "flashbots",
    "manifold",
    "ultra",
    "wenmerge",
    "titan",
];

/// How a block reached its proposer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum BlockClassification {
    #[serde(rename = "MEV Relay")]
    MevRelay,
    #[serde(rename = "Vanilla Block")]
    Vanilla,
}

impl BlockClassification {
    pub fn as_str(&self) -> &'static str {
        match self {
            BlockClassification::MevRelay => "MEV Relay",
            BlockClassification::Vanilla => "Vanilla Block",
        }
    }
}

/// Classifies blocks by substring-matching relay names in their extra data.
#[derive(Debug, Clone)]
pub struct RelayClassifier {
    relays: Vec<String>,
}

impl Default for RelayClassifier {
    fn default() -> Self {
        Self::new(DEFAULT_RELAYS.iter().copied())
    }
}

impl RelayClassifier {
    /// Create a classifier for the given relay name fragments.
    ///
    /// Fragments are lowercased; empty fragments are dropped since they
    /// would match every block.
    pub fn new<I, S>(relays: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let relays = relays
            .into_iter()
            .map(|r| r.as_ref().trim().to_lowercase())
            .filter(|r| !r.is_empty())
            .collect();
        Self { relays }
    }

    pub fn relays(&self) -> &[String] {
        &self.relays
    }

    /// The first configured fragment found in the decoded extra data.
    ///
    /// Extra data that is not `0x`-prefixed hex yields `None`.
    pub fn matched_relay(&self, extra_data: &str) -> Option<&str> {
        let bytes = extra_data.strip_prefix("0x").and_then(|h| hex::decode(h).ok())?;
        let graffiti = String::from_utf8_lossy(&bytes).to_lowercase();

        let matched = self
            .relays
            .iter()
            .find(|relay| graffiti.contains(relay.as_str()))
            .map(String::as_str);
        debug!("Extra data {:?} matched relay {:?}", graffiti, matched);
        matched
    }

    /// Whether the block was produced through a known MEV relay.
    pub fn is_mev_block(&self, extra_data: &str) -> bool {
        self.matched_relay(extra_data).is_some()
    }

    pub fn classify(&self, extra_data: &str) -> BlockClassification {
        if self.is_mev_block(extra_data) {
            BlockClassification::MevRelay
        } else {
            BlockClassification::Vanilla
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn encode(graffiti: &str) -> String {
        format!("0x{}", hex::encode(graffiti))
    }

    #[test]
    fn test_detects_known_relays_case_insensitively() {
        let classifier = RelayClassifier::default();

        assert!(classifier.is_mev_block(&encode("Titan (titanbuilder.xyz)")));
        // builder graffiti without a relay name reads as vanilla
        assert!(!classifier.is_mev_block(&encode("Illuminate Dmocratize Dstribute")));
        assert!(classifier.is_mev_block(&encode("@bloXroute Max-Profit")));
        assert_eq!(classifier.matched_relay(&encode("ULTRA SOUND")), Some("ultra"));
    }

    #[test]
    fn test_matches_fragments_anywhere() {
        let classifier = RelayClassifier::default();

        // No word boundaries: "ultra" inside another word still matches.
        assert!(classifier.is_mev_block(&encode("multrasonic geth")));
        assert!(!classifier.is_mev_block(&encode("geth go1.21.5 linux")));
    }

    #[test]
    fn test_undecodable_extra_data_is_vanilla() {
        let classifier = RelayClassifier::default();

        assert!(!classifier.is_mev_block("0xzz"));
        assert!(!classifier.is_mev_block("0x123"));
        assert!(!classifier.is_mev_block("flashbots"));
        assert!(!classifier.is_mev_block(""));
        assert_eq!(classifier.classify("0x"), BlockClassification::Vanilla);
    }

    #[test]
    fn test_custom_relay_list() {
        let classifier = RelayClassifier::new(["BeaverBuild", "", "  "]);

        assert_eq!(classifier.relays(), ["beaverbuild".to_string()]);
        assert_eq!(
            classifier.classify(&encode("beaverbuild.org")),
            BlockClassification::MevRelay
        );
        assert_eq!(
            classifier.classify(&encode("Flashbots")),
            BlockClassification::Vanilla
        );
    }

    #[test]
    fn test_classification_serializes_as_label() {
        let json = serde_json::to_string(&BlockClassification::MevRelay).unwrap();
        assert_eq!(json, "\"MEV Relay\"");
        assert_eq!(BlockClassification::Vanilla.as_str(), "Vanilla Block");
    }
}
