//! Sitemap accumulation.
//!
//! One [`Sitemap`] is created by the build driver and lent mutably to every
//! stage. Stages append a `<url><loc>…</loc></url>` element per page they
//! emit; entries stay in emission order. [`Sitemap::finish`] closes the
//! document once all stages are done.
//!
//! ```xml
//! <?xml version="1.0" encoding="UTF-8"?><urlset xmlns="http://www.sitemaps.org/schemas/sitemap/0.9"><url><loc>https://example.com/</loc></url></urlset>
//! ```

use quick_xml::escape::escape;

/// XML namespace of the sitemap protocol.
pub const SITEMAP_NS: &str = "http://www.sitemaps.org/schemas/sitemap/0.9";

const PREAMBLE_DECL: &str = r#"<?xml version="1.0" encoding="UTF-8"?>"#;
const SUFFIX: &str = "</urlset>";

#[derive(Debug, Clone)]
pub struct Sitemap {
    domain: String,
    buf: String,
    entries: usize,
}

impl Sitemap {
    /// Start a sitemap for `domain` (e.g. `https://example.com`).
    pub fn new(domain: &str) -> Self {
        let mut buf = String::with_capacity(4096);
        buf.push_str(PREAMBLE_DECL);
        buf.push_str(&format!(r#"<urlset xmlns="{SITEMAP_NS}">"#));
        Self {
            domain: domain.trim_end_matches('/').to_string(),
            buf,
            entries: 0,
        }
    }

    /// Append the page at site-relative `path` (leading `/` optional).
    pub fn push(&mut self, path: &str) {
        let loc = format!("{}/{}", self.domain, path.trim_start_matches('/'));
        self.buf.push_str("<url><loc>");
        self.buf.push_str(&escape(loc.as_str()));
        self.buf.push_str("</loc></url>");
        self.entries += 1;
    }

    pub fn len(&self) -> usize {
        self.entries
    }

    pub fn is_empty(&self) -> bool {
        self.entries == 0
    }

    /// Close the document and return its text.
    pub fn finish(mut self) -> String {
        self.buf.push_str(SUFFIX);
        self.buf
    }
}

#[cfg(test)]
pub(crate) fn locs(xml: &str) -> Vec<String> {
    use quick_xml::Reader;
    use quick_xml::events::Event;

    let mut reader = Reader::from_str(xml);
    let mut locs = Vec::new();
    let mut in_loc = false;
    loop {
        match reader.read_event().expect("sitemap must be well-formed XML") {
            Event::Start(e) if e.local_name().as_ref() == b"loc" => in_loc = true,
            Event::End(e) if e.local_name().as_ref() == b"loc" => in_loc = false,
            Event::Text(t) if in_loc => locs.push(t.unescape().unwrap().into_owned()),
            Event::Eof => break,
            _ => {}
        }
    }
    locs
}
