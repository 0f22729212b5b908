mod fields;
mod html;

pub use fields::FieldPatterns;
pub use html::flatten_order_container;

use mail_parser::{MessageParser, PartType};
use shared_types::{ExtractOutcome, SkipReason};

/// Recovers donation order fields from raw order-confirmation emails.
///
/// `extract` never fails: structural problems (unparseable MIME, no HTML
/// part, no recognizable container) become `Skipped` outcomes so one bad
/// message cannot abort a batch. Feeding the same bytes twice yields the
/// same outcome.
pub struct OrderConfirmationExtractor {
    patterns: FieldPatterns,
}

impl OrderConfirmationExtractor {
    pub fn new() -> Self {
        Self {
            patterns: FieldPatterns::new(),
        }
    }

    pub fn extract(&self, raw: &[u8]) -> ExtractOutcome {
        let parser = MessageParser::default();
        let Some(message) = parser.parse(raw) else {
            return ExtractOutcome::Skipped(SkipReason::MalformedMime);
        };

        let Some(html) = first_html_body(&message) else {
            return ExtractOutcome::Skipped(SkipReason::NoHtmlPart);
        };

        let Some(all_text) = flatten_order_container(&html) else {
            return ExtractOutcome::Skipped(SkipReason::NoOrderContainer);
        };

        ExtractOutcome::Extracted(self.patterns.recover(&all_text))
    }
}

impl Default for OrderConfirmationExtractor {
    fn default() -> Self {
        Self::new()
    }
}

/// First part whose declared content type is text/html. mail-parser also
/// lists plain-text parts as HTML candidates (it converts them on demand),
/// so the part body is matched explicitly: a plain-text-only message must
/// count as having no HTML part.
fn first_html_body(message: &mail_parser::Message) -> Option<String> {
    let mut index = 0;
    while let Some(part) = message.html_part(index) {
        if let PartType::Html(contents) = &part.body {
            return Some(contents.to_string());
        }
        index += 1;
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use shared_types::ExtractOutcome;

    const CONTAINER_STYLE: &str = "font-size:16px;width:100%!important;height:100%!important;margin:0!important;padding:0!important;background:#f8f8f8";

    fn html_message(body: &str) -> Vec<u8> {
        format!(
            "From: donations@example.org\r\n\
             To: ops@example.org\r\n\
             Subject: Donation confirmation\r\n\
             MIME-Version: 1.0\r\n\
             Content-Type: text/html; charset=utf-8\r\n\
             \r\n\
             {body}\r\n"
        )
        .into_bytes()
    }

    fn order_html() -> String {
        format!(
            r#"<html><body><div style="{CONTAINER_STYLE}">
                <p>Order No. 10042</p>
                <p>Customer Information</p>
                <p>+1 555-123-4567 Jane Doe jane@example.com</p>
                <p>Order Summary</p>
                <p>Quantity: 3</p>
                <p>Quantity: 7</p>
                <p>Total: $12.50</p>
                <p>Thank you for your donation!</p>
            </div></body></html>"#
        )
    }

    #[test]
    fn test_extract_full_record() {
        let extractor = OrderConfirmationExtractor::new();
        let raw = html_message(&order_html());

        match extractor.extract(&raw) {
            ExtractOutcome::Extracted(record) => {
                assert_eq!(record.order_number.as_deref(), Some("10042"));
                assert_eq!(record.phone_number.as_deref(), Some("+1 555-123-4567"));
                assert_eq!(record.first_name.as_deref(), Some("Jane"));
                assert_eq!(record.last_name.as_deref(), Some("Doe"));
                assert_eq!(record.email_address.as_deref(), Some("jane@example.com"));
                assert_eq!(record.quantity.as_deref(), Some("7"));
                assert_eq!(record.total.as_deref(), Some("12.50"));
            }
            other => panic!("expected extracted record, got {other:?}"),
        }
    }

    #[test]
    fn test_plain_text_message_has_no_html_part() {
        let raw = b"From: donations@example.org\r\n\
            Subject: plain\r\n\
            Content-Type: text/plain; charset=utf-8\r\n\
            \r\n\
            Order No. 10042\r\n"
            .to_vec();

        let extractor = OrderConfirmationExtractor::new();
        assert_eq!(
            extractor.extract(&raw),
            ExtractOutcome::Skipped(SkipReason::NoHtmlPart)
        );
    }

    #[test]
    fn test_html_without_container_is_skipped() {
        let raw = html_message("<html><body><div>Order No. 1</div></body></html>");
        let extractor = OrderConfirmationExtractor::new();
        assert_eq!(
            extractor.extract(&raw),
            ExtractOutcome::Skipped(SkipReason::NoOrderContainer)
        );
    }

    #[test]
    fn test_multipart_alternative_uses_html_part() {
        let html = order_html();
        let raw = format!(
            "From: donations@example.org\r\n\
             Subject: Donation confirmation\r\n\
             MIME-Version: 1.0\r\n\
             Content-Type: multipart/alternative; boundary=\"sep\"\r\n\
             \r\n\
             --sep\r\n\
             Content-Type: text/plain; charset=utf-8\r\n\
             \r\n\
             plain fallback\r\n\
             --sep\r\n\
             Content-Type: text/html; charset=utf-8\r\n\
             \r\n\
             {html}\r\n\
             --sep--\r\n"
        )
        .into_bytes();

        let extractor = OrderConfirmationExtractor::new();
        match extractor.extract(&raw) {
            ExtractOutcome::Extracted(record) => {
                assert_eq!(record.order_number.as_deref(), Some("10042"));
            }
            other => panic!("expected extracted record, got {other:?}"),
        }
    }

    #[test]
    fn test_extract_is_pure() {
        let extractor = OrderConfirmationExtractor::new();
        let raw = html_message(&order_html());
        assert_eq!(extractor.extract(&raw), extractor.extract(&raw));
    }
}
