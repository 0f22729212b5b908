use serde::{Deserialize, Serialize};

use crate::OrderRecord;

/// Result of running the extractor over one raw message.
///
/// `Skipped` is a normal outcome, not an error: the caller logs it, counts
/// it, and moves on. Skipped messages are dropped from the export rather
/// than written as zero-filled rows. Internal parse failures are folded into
/// `Skipped` so one malformed message cannot abort a batch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "outcome", content = "data", rename_all = "kebab-case")]
pub enum ExtractOutcome {
    Extracted(OrderRecord),
    Skipped(SkipReason),
}

/// Why a message produced no order data.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, thiserror::Error)]
#[serde(rename_all = "kebab-case")]
pub enum SkipReason {
    /// The message has no part whose declared content type is text/html.
    #[error("no text/html part")]
    NoHtmlPart,

    /// The HTML has no element carrying the order-confirmation style
    /// signature.
    #[error("no order-confirmation container")]
    NoOrderContainer,

    /// The raw bytes could not be parsed as a mail message at all.
    #[error("malformed MIME structure")]
    MalformedMime,
}
