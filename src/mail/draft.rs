use crate::mail::MailError;
use mail_builder::MessageBuilder;

/// A plain-text reply ready to be stored as a draft.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DraftReply<'a> {
    /// Recipient as found in a `From` header, with or without a display name.
    pub to: &'a str,
    pub subject: &'a str,
    pub body: &'a str,
}

impl DraftReply<'_> {
    /// Builds the RFC 5322 message bytes.
    pub fn to_rfc822(&self) -> Result<Vec<u8>, MailError> {
        let (name, email) = split_address(self.to);
        if email.is_empty() {
            return Err(MailError::Compose(format!(
                "no recipient address in {:?}",
                self.to
            )));
        }

        let builder = match name {
            Some(name) => MessageBuilder::new().to((name, email)),
            None => MessageBuilder::new().to(email),
        };

        builder
            .subject(self.subject)
            .text_body(self.body)
            .write_to_vec()
            .map_err(|e| MailError::Compose(e.to_string()))
    }
}

/// Splits `"Name" <addr>` into its display name and address.
///
/// The address is the last bracketed group, so brackets inside a quoted
/// display name stay part of the name.
fn split_address(input: &str) -> (Option<&str>, &str) {
    let input = input.trim();
    if let (Some(start), Some(end)) = (input.rfind('<'), input.rfind('>')) {
        if start < end {
            let email = input[start + 1..end].trim();
            let name = input[..start].trim().trim_matches('"').trim();
            return ((!name.is_empty()).then_some(name), email);
        }
    }
    (None, input.trim_matches(|c| c == '<' || c == '>'))
}
