//! Tag extraction from catalog XML documents
//!
//! Only the handful of elements the core needs are read. Namespace prefixes
//! are ignored and anything nested under `<parents>` (the ancestor
//! breadcrumbs every catalog document carries) is skipped.

use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;

use super::{CatalogItem, SectionDetail};

const PARENTS_TAG: &[u8] = b"parents";
const INSTRUCTOR_TAG: &[u8] = b"instructor";

/// Elements tried in order for a section's label
const LABEL_TAGS: [&[u8]; 3] = [b"label", b"sectionTitle", b"sectionNumber"];

/// Elements tried in order for a section's description
const DESCRIPTION_TAGS: [&[u8]; 2] = [b"description", b"sectionText"];

/// Collect every `tag` element outside `<parents>` with its `id` and text
pub fn parse_listing(content: &str, tag: &str) -> Result<Vec<CatalogItem>, String> {
    let tag = tag.as_bytes();
    let mut reader = Reader::from_str(content);
    reader.config_mut().trim_text(true);

    let mut items = Vec::new();
    let mut parents_depth = 0usize;
    // (id, text, nesting of same-named elements inside the current item)
    let mut current: Option<(Option<String>, String, usize)> = None;

    loop {
        match reader.read_event() {
            Ok(Event::Start(ref e)) => {
                let name = e.local_name();
                if name.as_ref() == PARENTS_TAG {
                    parents_depth += 1;
                } else if parents_depth == 0 && name.as_ref() == tag {
                    match current.as_mut() {
                        Some((_, _, nesting)) => *nesting += 1,
                        None => current = Some((attribute(e, "id")?, String::new(), 0)),
                    }
                }
            }
            Ok(Event::Empty(ref e)) => {
                if parents_depth == 0 && current.is_none() && e.local_name().as_ref() == tag {
                    items.push(CatalogItem {
                        id: attribute(e, "id")?,
                        text: String::new(),
                    });
                }
            }
            Ok(Event::Text(ref e)) => {
                if let Some((_, text, _)) = current.as_mut() {
                    let unescaped = e.unescape().map_err(|e| e.to_string())?;
                    append_text(text, &unescaped);
                }
            }
            Ok(Event::CData(ref e)) => {
                if let Some((_, text, _)) = current.as_mut() {
                    let raw = std::str::from_utf8(e).map_err(|e| e.to_string())?;
                    append_text(text, raw.trim());
                }
            }
            Ok(Event::End(ref e)) => {
                let name = e.local_name();
                if name.as_ref() == PARENTS_TAG {
                    parents_depth = parents_depth.saturating_sub(1);
                } else if parents_depth == 0 && name.as_ref() == tag {
                    match current.take() {
                        Some((id, text, 0)) => items.push(CatalogItem { id, text }),
                        Some((id, text, nesting)) => current = Some((id, text, nesting - 1)),
                        None => {}
                    }
                }
            }
            Ok(Event::Eof) => break,
            Ok(_) => {}
            Err(e) => {
                return Err(format!(
                    "XML error at position {}: {}",
                    reader.buffer_position(),
                    e
                ))
            }
        }
    }

    Ok(items)
}

/// Extract label, description and instructors from a section document
pub fn parse_section_detail(content: &str) -> Result<SectionDetail, String> {
    let mut reader = Reader::from_str(content);
    reader.config_mut().trim_text(true);

    let mut labels: [Option<String>; LABEL_TAGS.len()] = Default::default();
    let mut descriptions: [Option<String>; DESCRIPTION_TAGS.len()] = Default::default();
    let mut detail = SectionDetail::default();

    let mut parents_depth = 0usize;
    // Field currently capturing text: (is_label, slot index)
    let mut capturing: Option<(bool, usize)> = None;
    let mut buffer = String::new();

    loop {
        match reader.read_event() {
            Ok(Event::Start(ref e)) => {
                let name = e.local_name();
                let name = name.as_ref();
                if name == PARENTS_TAG {
                    parents_depth += 1;
                } else if parents_depth == 0 {
                    if name == INSTRUCTOR_TAG {
                        add_instructor(&mut detail, e)?;
                    } else if capturing.is_none() {
                        capturing = field_slot(name, &labels, &descriptions);
                        buffer.clear();
                    }
                }
            }
            Ok(Event::Empty(ref e)) => {
                if parents_depth == 0 && e.local_name().as_ref() == INSTRUCTOR_TAG {
                    add_instructor(&mut detail, e)?;
                }
            }
            Ok(Event::Text(ref e)) => {
                if capturing.is_some() {
                    let unescaped = e.unescape().map_err(|e| e.to_string())?;
                    append_text(&mut buffer, &unescaped);
                }
            }
            Ok(Event::CData(ref e)) => {
                if capturing.is_some() {
                    let raw = std::str::from_utf8(e).map_err(|e| e.to_string())?;
                    append_text(&mut buffer, raw.trim());
                }
            }
            Ok(Event::End(ref e)) => {
                let name = e.local_name();
                let name = name.as_ref();
                if name == PARENTS_TAG {
                    parents_depth = parents_depth.saturating_sub(1);
                } else if let Some((is_label, slot)) = capturing {
                    let field_tag = if is_label {
                        LABEL_TAGS[slot]
                    } else {
                        DESCRIPTION_TAGS[slot]
                    };
                    if name == field_tag {
                        let value = std::mem::take(&mut buffer);
                        if is_label {
                            labels[slot] = Some(value);
                        } else {
                            descriptions[slot] = Some(value);
                        }
                        capturing = None;
                    }
                }
            }
            Ok(Event::Eof) => break,
            Ok(_) => {}
            Err(e) => {
                return Err(format!(
                    "XML error at position {}: {}",
                    reader.buffer_position(),
                    e
                ))
            }
        }
    }

    detail.label = labels.into_iter().flatten().next().unwrap_or_default();
    detail.description = descriptions.into_iter().flatten().next().unwrap_or_default();
    Ok(detail)
}

/// Which not-yet-filled field, if any, an element feeds
fn field_slot(
    name: &[u8],
    labels: &[Option<String>],
    descriptions: &[Option<String>],
) -> Option<(bool, usize)> {
    if let Some(slot) = LABEL_TAGS.iter().position(|t| *t == name) {
        return labels[slot].is_none().then_some((true, slot));
    }
    if let Some(slot) = DESCRIPTION_TAGS.iter().position(|t| *t == name) {
        return descriptions[slot].is_none().then_some((false, slot));
    }
    None
}

fn add_instructor(detail: &mut SectionDetail, e: &BytesStart) -> Result<(), String> {
    let last = attribute(e, "lastName")?.unwrap_or_default();
    let first = attribute(e, "firstName")?.unwrap_or_default();
    detail.add_instructor(&last, &first);
    Ok(())
}

fn attribute(e: &BytesStart, key: &str) -> Result<Option<String>, String> {
    match e.try_get_attribute(key).map_err(|e| e.to_string())? {
        Some(attr) => {
            let value = attr.unescape_value().map_err(|e| e.to_string())?;
            Ok(Some(value.into_owned()))
        }
        None => Ok(None),
    }
}

fn append_text(target: &mut String, piece: &str) {
    if piece.is_empty() {
        return;
    }
    if !target.is_empty() {
        target.push(' ');
    }
    target.push_str(piece);
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    const YEARS: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<ns2:schedule xmlns:ns2="http://rest.cis.illinois.edu">
  <calendarYears>
    <calendarYear id="2025" href="https://example/2025.xml">2025</calendarYear>
    <calendarYear id="2026" href="https://example/2026.xml">2026</calendarYear>
  </calendarYears>
</ns2:schedule>"#;

    const COURSE: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<ns2:course xmlns:ns2="http://rest.cis.illinois.edu" id="CS 341">
  <parents>
    <calendarYear id="2025">2025</calendarYear>
    <term id="120251">Spring 2025</term>
    <subject id="CS">Computer Science</subject>
  </parents>
  <label>System Programming</label>
  <description>Basics of system programming &amp; concurrency.</description>
  <sections>
    <section id="31187" href="https://example/31187.xml">AL1</section>
    <section id="31188" href="https://example/31188.xml">AYA</section>
    <section id="31189"/>
  </sections>
</ns2:course>"#;

    const SECTION: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<ns2:section xmlns:ns2="http://rest.cis.illinois.edu" id="31187">
  <parents>
    <course id="341">System Programming</course>
  </parents>
  <sectionNumber>AL1</sectionNumber>
  <sectionText><![CDATA[Lecture section.]]></sectionText>
  <meetings>
    <meeting id="0">
      <instructors>
        <instructor lastName="Angrave" firstName="Lawrence">Angrave, L</instructor>
        <instructor lastName="Evans" firstName="Graham">Evans, G</instructor>
      </instructors>
    </meeting>
    <meeting id="1">
      <instructors>
        <instructor lastName="Angrave" firstName="Lawrence">Angrave, L</instructor>
      </instructors>
    </meeting>
  </meetings>
</ns2:section>"#;

    #[test]
    fn test_listing_years() {
        let items = parse_listing(YEARS, "calendarYear").unwrap();
        assert_eq!(
            items,
            vec![
                CatalogItem::new(Some("2025"), "2025"),
                CatalogItem::new(Some("2026"), "2026"),
            ]
        );
    }

    #[test]
    fn test_listing_skips_parents() {
        let items = parse_listing(COURSE, "section").unwrap();
        let ids: Vec<_> = items.iter().map(|i| i.id.clone().unwrap()).collect();
        assert_eq!(ids, vec!["31187", "31188", "31189"]);

        // The subject only appears as a breadcrumb
        assert!(parse_listing(COURSE, "subject").unwrap().is_empty());
    }

    #[test]
    fn test_listing_empty_document() {
        let items = parse_listing("<ns2:term><subjects/></ns2:term>", "subject").unwrap();
        assert!(items.is_empty());
    }

    #[test]
    fn test_listing_malformed() {
        assert!(parse_listing("<a><b></a>", "b").is_err());
    }

    #[test]
    fn test_section_detail_prefers_label() {
        let detail = parse_section_detail(COURSE).unwrap();
        assert_eq!(detail.label, "System Programming");
        assert_eq!(
            detail.description,
            "Basics of system programming & concurrency."
        );
        assert!(detail.instructors.is_empty());
    }

    #[test]
    fn test_section_detail_fallback_fields() {
        let detail = parse_section_detail(SECTION).unwrap();
        assert_eq!(detail.label, "AL1");
        assert_eq!(detail.description, "Lecture section.");
        assert_eq!(detail.instructors.len(), 2);
        assert!(detail.instructors.contains("Angrave L."));
        assert!(detail.instructors.contains("Evans G."));
    }
}
