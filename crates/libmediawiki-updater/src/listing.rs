// SPDX-License-Identifier: MIT OR Apache-2.0

use quick_xml::{Reader, events::Event};

/// collects the `href` targets of every `<a>` element in document order.
///
/// directory index pages are html, not xml: end-name checks are disabled and
/// unmatched end tags are tolerated. anything the reader still cannot
/// tokenize (an unterminated tag, a broken comment) is returned as an error.
pub fn extract_links(html: &str) -> Result<Vec<String>, String> {
    let mut reader = Reader::from_str(html);
    let config = reader.config_mut();
    config.trim_text(true);
    config.check_end_names = false;
    config.allow_unmatched_ends = true;

    let mut links = Vec::new();

    loop {
        match reader.read_event() {
            Ok(Event::Start(e)) | Ok(Event::Empty(e)) => {
                if !e.local_name().as_ref().eq_ignore_ascii_case(b"a") {
                    continue;
                }

                for attr in e.html_attributes().flatten() {
                    if attr.key.local_name().as_ref().eq_ignore_ascii_case(b"href") {
                        let raw = String::from_utf8_lossy(&attr.value);
                        links.push(decode_entities(raw.trim()));
                    }
                }
            }
            Ok(Event::Eof) => break,
            Err(e) => {
                return Err(format!(
                    "malformed html at position {}: {e}",
                    reader.error_position()
                ));
            }
            _ => {}
        }
    }

    Ok(links)
}

fn decode_entities(value: &str) -> String {
    value
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&#39;", "'")
        .replace("&amp;", "&")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn collects_links_in_document_order() {
        let html = r#"<!DOCTYPE html>
<html><head><title>Index of /dist/extensions/</title></head>
<body>
<h1>Index of /dist/extensions/</h1><hr><pre>
<a href="../">../</a>
<a href="Cite-REL1_42-abc1234.tar.gz">Cite-REL1_42-abc1234.tar.gz</a>   01-Jan-2025 00:00  12345
<a href="Cite-REL1_43-def5678.tar.gz">Cite-REL1_43-def5678.tar.gz</a>   01-Jan-2025 00:00  12345
</pre><hr></body>
</html>"#;

        let links = extract_links(html).unwrap();
        assert_eq!(
            links,
            vec![
                "../",
                "Cite-REL1_42-abc1234.tar.gz",
                "Cite-REL1_43-def5678.tar.gz",
            ]
        );
    }

    #[test]
    fn tolerates_html_quirks() {
        let html = r#"<table><tr><td valign=top><img src="/icons/folder.gif" alt="[DIR]"></td>
<td><A HREF="1.43/">1.43/</A></td><td nowrap>2024-12-01</td></tr></p></table>"#;

        assert_eq!(extract_links(html).unwrap(), vec!["1.43/"]);
    }

    #[test]
    fn decodes_escaped_ampersands() {
        let html = r#"<a href="list?a=1&amp;b=2">x</a>"#;
        assert_eq!(extract_links(html).unwrap(), vec!["list?a=1&b=2"]);
    }

    #[test]
    fn ignores_anchors_without_href() {
        let html = r#"<a name="top"></a><a href="x.tar.gz"/>"#;
        assert_eq!(extract_links(html).unwrap(), vec!["x.tar.gz"]);
    }

    #[test]
    fn unterminated_tag_is_an_error() {
        assert!(extract_links(r#"<html><a href="foo.tar.gz"#).is_err());
    }
}
