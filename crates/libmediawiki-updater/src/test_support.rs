// SPDX-License-Identifier: MIT OR Apache-2.0

use std::{cell::RefCell, collections::HashMap, io::Write};

use flate2::{Compression, write::GzEncoder};

use crate::{Error, Result, http::Transport};

/// serves canned responses and records every requested url.
#[derive(Default)]
pub(crate) struct MockTransport {
    responses: HashMap<String, Vec<u8>>,
    requests: RefCell<Vec<String>>,
}

impl MockTransport {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn with_page(mut self, url: &str, html: impl Into<String>) -> Self {
        self.responses.insert(url.to_string(), html.into().into_bytes());
        self
    }

    pub(crate) fn with_file(mut self, url: &str, bytes: Vec<u8>) -> Self {
        self.responses.insert(url.to_string(), bytes);
        self
    }

    pub(crate) fn requests(&self) -> Vec<String> {
        self.requests.borrow().clone()
    }

    fn respond(&self, url: &str) -> Result<&[u8]> {
        self.requests.borrow_mut().push(url.to_string());
        self.responses
            .get(url)
            .map(Vec::as_slice)
            .ok_or_else(|| Error::HttpStatus {
                url: url.to_string(),
                status: 404,
            })
    }
}

impl Transport for MockTransport {
    fn get_text(&self, url: &str) -> Result<String> {
        Ok(String::from_utf8_lossy(self.respond(url)?).into_owned())
    }

    fn download(&self, url: &str, sink: &mut dyn Write) -> Result<u64> {
        let body = self.respond(url)?;
        sink.write_all(body)?;
        Ok(body.len() as u64)
    }
}

/// builds a gzipped tarball in memory. paths ending in `/` become directory
/// entries. names are written into the header verbatim so fixtures can carry
/// paths a well-behaved archiver would refuse.
pub(crate) fn tarball(entries: &[(&str, &str, u32)]) -> Vec<u8> {
    tarball_with_links(entries, &[])
}

#[derive(Clone, Copy)]
pub(crate) enum LinkKind {
    Hard,
    Symbolic,
}

/// like [`tarball`], followed by `(path, link name, kind)` link entries.
pub(crate) fn tarball_with_links(
    entries: &[(&str, &str, u32)],
    links: &[(&str, &str, LinkKind)],
) -> Vec<u8> {
    let encoder = GzEncoder::new(Vec::new(), Compression::default());
    let mut builder = tar::Builder::new(encoder);

    for (path, contents, mode) in entries {
        let mut header = raw_header(path);
        header.set_mode(*mode);

        if path.ends_with('/') {
            header.set_entry_type(tar::EntryType::Directory);
            header.set_size(0);
            header.set_cksum();
            builder.append(&header, std::io::empty()).unwrap();
        } else {
            header.set_entry_type(tar::EntryType::Regular);
            header.set_size(contents.len() as u64);
            header.set_cksum();
            builder.append(&header, contents.as_bytes()).unwrap();
        }
    }

    for (path, link_name, kind) in links {
        let mut header = raw_header(path);
        let link = link_name.as_bytes();
        header.as_old_mut().linkname[..link.len()].copy_from_slice(link);

        let (entry_type, mode) = match kind {
            LinkKind::Hard => (tar::EntryType::Link, 0o644),
            LinkKind::Symbolic => (tar::EntryType::Symlink, 0o777),
        };
        header.set_entry_type(entry_type);
        header.set_mode(mode);
        header.set_size(0);
        header.set_cksum();
        builder.append(&header, std::io::empty()).unwrap();
    }

    builder.into_inner().unwrap().finish().unwrap()
}

fn raw_header(path: &str) -> tar::Header {
    let mut header = tar::Header::new_gnu();
    let name = path.as_bytes();
    header.as_old_mut().name[..name.len()].copy_from_slice(name);
    header
}

pub(crate) fn listing_page(hrefs: &[&str]) -> String {
    let mut html = String::from("<html><body><pre>\n<a href=\"../\">../</a>\n");
    for href in hrefs {
        html.push_str(&format!("<a href=\"{href}\">{href}</a> 01-Jan-2025 10:00 1234\n"));
    }
    html.push_str("</pre></body></html>");
    html
}
