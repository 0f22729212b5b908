use regex::Regex;
use shared_types::OrderRecord;

const CUSTOMER_MARKER: &str = "Customer Information";
const SUMMARY_MARKER: &str = "Order Summary";
const THANKS_MARKER: &str = "Thank you";

/// Field recovery over the flattened container text. All patterns are
/// compiled once; `recover` is a pure function of its input.
///
/// The name-splitting heuristic (strip email and phone out of the customer
/// block, first/last remaining token become first/last name) is kept
/// compatible with existing exports even though it misparses middle names.
pub struct FieldPatterns {
    order_number: Regex,
    email: Regex,
    phone: Regex,
    quantity: Regex,
    total: Regex,
}

impl FieldPatterns {
    pub fn new() -> Self {
        Self {
            order_number: Regex::new(r"Order No\.\s*(\S+)").unwrap(),
            email: Regex::new(r"[A-Za-z0-9._%+-]+@[A-Za-z0-9.-]+\.[A-Za-z]{2,}").unwrap(),
            // At least seven characters so stray digit pairs (zip codes,
            // digits inside usernames) do not pass as phone numbers.
            phone: Regex::new(r"\+?\d[\d\s()\-]{5,}\d").unwrap(),
            quantity: Regex::new(r"Quantity:\s*(\d+)").unwrap(),
            // Like the quantity pattern, the amount may land on the line
            // after its marker once the template text is flattened.
            total: Regex::new(r"Total:[^\d]*(\d+(?:\.\d+)?)").unwrap(),
        }
    }

    pub fn recover(&self, all_text: &str) -> OrderRecord {
        let mut record = OrderRecord::empty();

        record.order_number = self
            .order_number
            .captures(all_text)
            .and_then(|caps| caps.get(1))
            .map(|m| m.as_str().to_string());

        if let Some(customer) = customer_block(all_text) {
            let email = self.email.find(customer).map(|m| m.as_str().to_string());
            let phone = self.phone.find(customer).map(|m| m.as_str().to_string());
            let (first_name, last_name) =
                split_name(customer, email.as_deref(), phone.as_deref());

            record.email_address = email;
            record.phone_number = phone;
            record.first_name = first_name;
            record.last_name = last_name;
        }

        let summary = summary_block(all_text);
        record.quantity = last_capture(&self.quantity, summary)
            .or_else(|| last_capture(&self.quantity, all_text));
        record.total = last_capture(&self.total, summary)
            .or_else(|| last_capture(&self.total, all_text));

        record
    }
}

impl Default for FieldPatterns {
    fn default() -> Self {
        Self::new()
    }
}

/// Text strictly between "Customer Information" and the following
/// "Order Summary" marker, or to the end of the text when no summary
/// follows. `None` when the customer marker itself is absent.
fn customer_block(all_text: &str) -> Option<&str> {
    let start = all_text.find(CUSTOMER_MARKER)? + CUSTOMER_MARKER.len();
    let rest = &all_text[start..];
    let end = rest.find(SUMMARY_MARKER).unwrap_or(rest.len());
    Some(&rest[..end])
}

/// Text strictly between "Order Summary" and whichever of the customer
/// marker, the thank-you line, or end-of-text comes first. Empty when the
/// summary marker is absent, so callers fall through to the whole-text
/// search.
fn summary_block(all_text: &str) -> &str {
    let Some(found) = all_text.find(SUMMARY_MARKER) else {
        return "";
    };
    let rest = &all_text[found + SUMMARY_MARKER.len()..];
    let end = [CUSTOMER_MARKER, THANKS_MARKER]
        .iter()
        .filter_map(|marker| rest.find(marker))
        .min()
        .unwrap_or(rest.len());
    &rest[..end]
}

/// Removes the matched email and phone substrings from the customer block;
/// the remaining whitespace-delimited tokens are the name. One token means
/// first and last name are the same; no tokens means both absent.
fn split_name(
    customer: &str,
    email: Option<&str>,
    phone: Option<&str>,
) -> (Option<String>, Option<String>) {
    let mut residue = customer.to_string();
    if let Some(email) = email {
        residue = residue.replacen(email, " ", 1);
    }
    if let Some(phone) = phone {
        residue = residue.replacen(phone, " ", 1);
    }

    let tokens: Vec<&str> = residue.split_whitespace().collect();
    let first = tokens.first().map(|t| t.to_string());
    let last = tokens.last().map(|t| t.to_string());
    (first, last)
}

fn last_capture(pattern: &Regex, text: &str) -> Option<String> {
    pattern
        .captures_iter(text)
        .last()
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn recover(text: &str) -> OrderRecord {
        FieldPatterns::new().recover(text)
    }

    #[test]
    fn test_order_number() {
        let record = recover("Order No. 10042\nsomething else");
        assert_eq!(record.order_number.as_deref(), Some("10042"));
    }

    #[test]
    fn test_customer_block_split() {
        let text = "Order No. 7\nCustomer Information\n+1 555-123-4567 Jane Doe jane@example.com\nOrder Summary\nQuantity: 2\nTotal: $10.00";
        let record = recover(text);

        assert_eq!(record.phone_number.as_deref(), Some("+1 555-123-4567"));
        assert_eq!(record.first_name.as_deref(), Some("Jane"));
        assert_eq!(record.last_name.as_deref(), Some("Doe"));
        assert_eq!(record.email_address.as_deref(), Some("jane@example.com"));
    }

    #[test]
    fn test_email_position_does_not_change_name() {
        // Email first instead of last; the name tokens are the same.
        let text = "Customer Information\njane@example.com +1 555-123-4567 Jane Doe\nOrder Summary";
        let record = recover(text);

        assert_eq!(record.first_name.as_deref(), Some("Jane"));
        assert_eq!(record.last_name.as_deref(), Some("Doe"));
        assert_eq!(record.email_address.as_deref(), Some("jane@example.com"));
    }

    #[test]
    fn test_single_name_token() {
        let text = "Customer Information\nMadonna\nOrder Summary";
        let record = recover(text);
        assert_eq!(record.first_name.as_deref(), Some("Madonna"));
        assert_eq!(record.last_name.as_deref(), Some("Madonna"));
        assert_eq!(record.phone_number, None);
        assert_eq!(record.email_address, None);
    }

    #[test]
    fn test_missing_customer_block() {
        let record = recover("Order No. 5\nOrder Summary\nQuantity: 1\nTotal: $3.00");
        assert_eq!(record.first_name, None);
        assert_eq!(record.last_name, None);
        assert_eq!(record.phone_number, None);
        assert_eq!(record.email_address, None);
        assert_eq!(record.quantity.as_deref(), Some("1"));
    }

    #[test]
    fn test_quantity_last_occurrence_wins() {
        let text = "Order Summary\nQuantity: 3\nitem\nQuantity: 7\nThank you";
        let record = recover(text);
        assert_eq!(record.quantity.as_deref(), Some("7"));
    }

    #[test]
    fn test_total_strips_currency_symbol() {
        let record = recover("Order Summary\nTotal: $12.50\nThank you");
        assert_eq!(record.total.as_deref(), Some("12.50"));
    }

    #[test]
    fn test_total_amount_on_following_line() {
        // Flattening puts marker and amount in separate fragments when the
        // template renders them as separate text nodes.
        let record = recover("Order Summary\nTotal:\n$12.50\nThank you");
        assert_eq!(record.total.as_deref(), Some("12.50"));
    }

    #[test]
    fn test_quantity_falls_back_to_whole_text() {
        // Marker appears before the summary block only.
        let text = "Quantity: 4\nOrder Summary\nTotal: $8.00\nThank you";
        let record = recover(text);
        assert_eq!(record.quantity.as_deref(), Some("4"));
        assert_eq!(record.total.as_deref(), Some("8.00"));
    }

    #[test]
    fn test_summary_block_bounded_by_thank_you() {
        let text = "Order Summary\nQuantity: 2\nThank you\nQuantity: 9";
        let record = recover(text);
        // The in-block occurrence wins; the one past "Thank you" is outside.
        assert_eq!(record.quantity.as_deref(), Some("2"));
    }

    #[test]
    fn test_digits_in_email_are_not_a_phone() {
        let text = "Customer Information\nJane Doe jane42@example.com\nOrder Summary";
        let record = recover(text);
        assert_eq!(record.phone_number, None);
        assert_eq!(record.email_address.as_deref(), Some("jane42@example.com"));
        assert_eq!(record.first_name.as_deref(), Some("Jane"));
        assert_eq!(record.last_name.as_deref(), Some("Doe"));
    }

    #[test]
    fn test_recover_is_deterministic() {
        let text = "Order No. 9\nCustomer Information\n+1 (555) 000-1111 Ann Lee ann@x.org\nOrder Summary\nQuantity: 1\nTotal: $5.25";
        assert_eq!(recover(text), recover(text));
    }
}
