use std::fmt::Write as _;

use crate::submission::Submission;

/// Text substituted for the phone field when the visitor left it blank.
pub const PHONE_NOT_PROVIDED: &str = "Not provided";

/// The fixed message every provider sends for a submission.
///
/// Both delivery paths render through the same template so a recipient
/// cannot tell which provider carried a message. Submitted values are
/// HTML-escaped before they are interpolated.
#[derive(Debug, Clone)]
pub struct MessageTemplate {
    site_name: String,
}

impl MessageTemplate {
    /// Create a template branded with the given site name.
    pub fn new(site_name: impl Into<String>) -> Self {
        Self {
            site_name: site_name.into(),
        }
    }

    /// The site name shown in the subject and footer.
    pub fn site_name(&self) -> &str {
        &self.site_name
    }

    /// Subject line for a new demo request.
    pub fn subject(&self) -> String {
        format!(
            "[New Demo Request] {} website demo request",
            self.site_name
        )
    }

    /// Render the HTML body for a submission.
    ///
    /// # Examples
    ///
    /// ```
    /// use formrelay_core::{MessageTemplate, Submission, PHONE_NOT_PROVIDED};
    ///
    /// let submission = Submission::new("A", "B", "a@b.com", None).unwrap();
    /// let html = MessageTemplate::new("ImobileBI").render_html(&submission);
    /// assert!(html.contains("a@b.com"));
    /// assert!(html.contains(PHONE_NOT_PROVIDED));
    /// ```
    pub fn render_html(&self, submission: &Submission) -> String {
        let phone = submission.phone().unwrap_or(PHONE_NOT_PROVIDED);

        let mut html = String::with_capacity(512);
        html.push_str("<h2>You have a new demo request</h2>\n");
        push_field(&mut html, "Name", submission.name());
        push_field(&mut html, "Company", submission.company());
        push_field(&mut html, "Contact email", submission.email());
        push_field(&mut html, "Contact phone", phone);
        html.push_str("<hr>\n");
        let _ = writeln!(
            html,
            "<p>This message was sent automatically by the {} website form.</p>",
            escape_html(&self.site_name)
        );
        html
    }
}

impl Default for MessageTemplate {
    fn default() -> Self {
        Self::new("ImobileBI")
    }
}

fn push_field(html: &mut String, label: &str, value: &str) {
    let _ = writeln!(
        html,
        "<p><strong>{label}:</strong> {}</p>",
        escape_html(value)
    );
}

fn escape_html(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for c in raw.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}
