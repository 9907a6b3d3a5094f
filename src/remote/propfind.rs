//! Request body and response parsing for WebDAV `PROPFIND` folder listings.

use crate::remote::store::{is_station_file, RemoteItem};
use quick_xml::events::Event;
use quick_xml::Reader;

/// Properties requested for every entry of the folder.
pub(crate) const PROPFIND_BODY: &str = r#"<?xml version="1.0" encoding="utf-8"?>
<d:propfind xmlns:d="DAV:">
  <d:prop>
    <d:resourcetype/>
    <d:getcontentlength/>
    <d:getlastmodified/>
    <d:getetag/>
  </d:prop>
</d:propfind>"#;

#[derive(Default)]
struct Entry {
    href: Option<String>,
    size: Option<u64>,
    last_modified: Option<String>,
    etag: Option<String>,
    is_collection: bool,
}

#[derive(Clone, Copy, PartialEq)]
enum Field {
    Href,
    Length,
    Modified,
    Etag,
}

/// Parses a `207 Multi-Status` body into the station files it lists.
///
/// Collections (the folder itself, subfolders) and files not following the
/// `.txt` convention are left out. Namespace prefixes are ignored, so both
/// `d:` and `D:` style responses are accepted.
pub(crate) fn parse_multistatus(xml: &str) -> Result<Vec<RemoteItem>, quick_xml::Error> {
    let mut reader = Reader::from_str(xml);
    reader.trim_text(true);

    let mut items = Vec::new();
    let mut entry: Option<Entry> = None;
    let mut field: Option<Field> = None;

    loop {
        match reader.read_event()? {
            Event::Start(e) => match e.local_name().as_ref() {
                b"response" => entry = Some(Entry::default()),
                b"href" => field = Some(Field::Href),
                b"getcontentlength" => field = Some(Field::Length),
                b"getlastmodified" => field = Some(Field::Modified),
                b"getetag" => field = Some(Field::Etag),
                b"collection" => mark_collection(&mut entry),
                _ => {}
            },
            Event::Empty(e) => {
                if e.local_name().as_ref() == b"collection" {
                    mark_collection(&mut entry);
                }
            }
            Event::Text(t) => {
                if let (Some(current), Some(f)) = (entry.as_mut(), field) {
                    let text = t.unescape()?.trim().to_string();
                    assign(current, f, text);
                }
            }
            Event::End(e) => match e.local_name().as_ref() {
                b"response" => {
                    if let Some(item) = entry.take().and_then(into_item) {
                        items.push(item);
                    }
                }
                b"href" | b"getcontentlength" | b"getlastmodified" | b"getetag" => field = None,
                _ => {}
            },
            Event::Eof => break,
            _ => {}
        }
    }

    Ok(items)
}

fn mark_collection(entry: &mut Option<Entry>) {
    if let Some(current) = entry.as_mut() {
        current.is_collection = true;
    }
}

fn assign(entry: &mut Entry, field: Field, text: String) {
    if text.is_empty() {
        return;
    }
    match field {
        Field::Href => entry.href = Some(text),
        Field::Length => entry.size = text.parse().ok(),
        Field::Modified => entry.last_modified = Some(text),
        Field::Etag => entry.etag = Some(text),
    }
}

fn into_item(entry: Entry) -> Option<RemoteItem> {
    if entry.is_collection {
        return None;
    }
    let href = entry.href?;
    let name = file_name_from_href(&href)?;
    if !is_station_file(&name) {
        return None;
    }
    Some(RemoteItem {
        name,
        href,
        size: entry.size,
        last_modified: entry.last_modified,
        etag: entry.etag,
    })
}

/// Last non-empty path segment of `href`, percent-decoded.
pub(crate) fn file_name_from_href(href: &str) -> Option<String> {
    let path = href.split(['?', '#']).next().unwrap_or(href);
    let segment = path.rsplit('/').find(|s| !s.is_empty())?;
    Some(percent_decode(segment))
}

fn percent_decode(input: &str) -> String {
    let bytes = input.as_bytes();
    let mut out = Vec::with_capacity(bytes.len());
    let mut i = 0;
    while i < bytes.len() {
        if bytes[i] == b'%' && i + 2 < bytes.len() {
            let hex = std::str::from_utf8(&bytes[i + 1..i + 3]).ok();
            if let Some(value) = hex.and_then(|h| u8::from_str_radix(h, 16).ok()) {
                out.push(value);
                i += 3;
                continue;
            }
        }
        out.push(bytes[i]);
        i += 1;
    }
    String::from_utf8_lossy(&out).into_owned()
}
