use url::Url;

/// A unit of readable text pulled from a page's main content
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TextBlock {
    /// `<h1>`..`<h6>` with its level
    Heading { level: u8, text: String },
    /// Running text with whitespace collapsed
    Paragraph(String),
    /// One `<li>`
    ListItem(String),
    /// `<pre>` content, kept verbatim
    Preformatted(String),
}

impl TextBlock {
    pub fn text(&self) -> &str {
        match self {
            TextBlock::Heading { text, .. } => text,
            TextBlock::Paragraph(text)
            | TextBlock::ListItem(text)
            | TextBlock::Preformatted(text) => text,
        }
    }
}

/// Read-only view of a parsed HTML page
///
/// The extraction policy only talks to this trait, so it does not depend on
/// a particular HTML parser.
pub trait HtmlDocument {
    /// Text of `<title>`, whitespace collapsed
    fn title(&self) -> Option<String>;

    /// Text of the first `<h1>`..`<h6>` in document order
    fn first_heading(&self) -> Option<String>;

    /// `<meta name="description">`, falling back to `og:description`
    fn meta_description(&self) -> Option<String>;

    /// Readable blocks of the main content region, boilerplate removed
    fn main_content(&self) -> Vec<TextBlock>;

    /// Absolute http(s) links found on the page
    fn links(&self, base: &Url) -> Vec<Url>;
}
