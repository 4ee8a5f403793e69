use crate::mail::EmailMessage;
use google_gmail1::api::{Message, MessagePart};
use html2text::render::text_renderer::TrivialDecorator;

const UNKNOWN_SENDER: &str = "Unknown";
const NO_SUBJECT: &str = "No Subject";

/// Maximum depth for MIME tree traversal; deeper parts are ignored.
const MAX_MIME_DEPTH: usize = 50;

/// Wrap width for HTML rendering, wide enough to keep paragraphs on one line.
const HTML_TEXT_WIDTH: usize = 1000;

/// Decodes a `format=full` Gmail message into an [`EmailMessage`].
///
/// Every `text/plain` part is concatenated into `body` and every `text/html`
/// part into `body_html`, walking nested multiparts depth-first. When no plain
/// text exists, `body` falls back to the text content of the HTML.
pub fn parse_message(id: &str, message: &Message) -> EmailMessage {
    let payload = message.payload.as_ref();

    let sender = header_value(payload, "From").unwrap_or_else(|| UNKNOWN_SENDER.to_string());
    let subject = header_value(payload, "Subject").unwrap_or_else(|| NO_SUBJECT.to_string());

    let mut body = String::new();
    let mut body_html = String::new();
    if let Some(payload) = payload {
        match payload.parts.as_deref() {
            Some(parts) if !parts.is_empty() => {
                collect_bodies(parts, &mut body, &mut body_html, 0);
            }
            _ => {
                // Single-part message: the payload carries the body itself.
                if let Some(decoded) = decode_part(payload) {
                    if is_mime(payload, "text/html") {
                        body_html.push_str(&decoded);
                    } else {
                        body.push_str(&decoded);
                    }
                }
            }
        }
    }

    if body.trim().is_empty() && !body_html.trim().is_empty() {
        body = strip_html(&body_html);
    }

    EmailMessage {
        id: message.id.clone().unwrap_or_else(|| id.to_string()),
        sender,
        subject,
        body: body.trim().to_string(),
        body_html: body_html.trim().to_string(),
    }
}

/// Renders HTML to its text content, dropping tags without adding markup.
pub fn strip_html(html: &str) -> String {
    html2text::from_read_with_decorator(html.as_bytes(), HTML_TEXT_WIDTH, TrivialDecorator::new())
        .trim()
        .lines()
        .map(str::trim_end)
        .collect::<Vec<_>>()
        .join("\n")
}

fn header_value(payload: Option<&MessagePart>, name: &str) -> Option<String> {
    payload
        .and_then(|p| p.headers.as_ref())
        .and_then(|headers| {
            headers
                .iter()
                .find(|h| h.name.as_deref() == Some(name))
                .and_then(|h| h.value.clone())
        })
}

fn collect_bodies(parts: &[MessagePart], body: &mut String, body_html: &mut String, depth: usize) {
    if depth > MAX_MIME_DEPTH {
        return;
    }

    for part in parts {
        if let Some(decoded) = decode_part(part) {
            if is_mime(part, "text/plain") {
                body.push_str(&decoded);
            } else if is_mime(part, "text/html") {
                body_html.push_str(&decoded);
            }
        }
        if let Some(children) = part.parts.as_deref() {
            collect_bodies(children, body, body_html, depth + 1);
        }
    }
}

fn is_mime(part: &MessagePart, mime: &str) -> bool {
    part.mime_type
        .as_deref()
        .is_some_and(|m| m.eq_ignore_ascii_case(mime))
}

// The Gmail client has already base64url-decoded the body data.
fn decode_part(part: &MessagePart) -> Option<String> {
    part.body
        .as_ref()
        .and_then(|b| b.data.as_deref())
        .filter(|data| !data.is_empty())
        .map(|data| String::from_utf8_lossy(data).into_owned())
}
