//! Marker regions and the merge engine.
//!
//! A region is the text between a start marker line (`//#<name>`) and the
//! next `//#end` line. Handler regions are merged positionally so that
//! hand-written bodies survive; every other region is replaced wholesale.

use std::collections::BTreeMap;

use lazy_static::lazy_static;
use regex::Regex;
use tracing::{debug, warn};

use crate::{
    code::{Generated, HandlerDecl},
    error::QuarryError,
    scan::scan_lines,
};

pub const MARKER_PREFIX: &str = "//#";
pub const END_MARKER: &str = "//#end";

lazy_static! {
    static ref DECLARATION: Regex =
        Regex::new(r#"^\s*(?:pub(?:\([^)]*\))?\s+)?(?:(?:default|const|async|unsafe|extern(?:\s+"[^"]*")?)\s+)*fn\s+([A-Za-z_][A-Za-z0-9_]*)"#).unwrap();
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Region {
    AsyncHandlers,
    SyncHandlers,
    ClientEnum,
    ServerEnum,
    Dispatch,
    Serializer,
    Deserializer,
}

impl Region {
    pub const ALL: [Region; 7] = [
        Region::AsyncHandlers,
        Region::SyncHandlers,
        Region::ClientEnum,
        Region::ServerEnum,
        Region::Dispatch,
        Region::Serializer,
        Region::Deserializer,
    ];

    /// Identifier written after the marker prefix.
    pub fn name(self) -> &'static str {
        match self {
            Region::AsyncHandlers => "AsyncPacketHandler",
            Region::SyncHandlers  => "SyncPacketHandler",
            Region::ClientEnum    => "ClientBoundPacket",
            Region::ServerEnum    => "ServerBoundPacket",
            Region::Dispatch      => "dispatch_sync_packet",
            Region::Serializer    => "serialize",
            Region::Deserializer  => "handle_packet",
        }
    }

    pub fn start_marker(self) -> String {
        format!("{}{}", MARKER_PREFIX, self.name())
    }

    pub fn merges_handlers(self) -> bool {
        matches!(self, Region::AsyncHandlers | Region::SyncHandlers)
    }
}

/// Byte range of a region's content plus the indentation of its start marker.
#[derive(Debug, Clone, PartialEq)]
pub struct Span {
    pub content_start: usize,
    pub content_end:   usize,
    pub indent:        String,
}

fn leading_whitespace(line: &str) -> &str {
    &line[..line.len() - line.trim_start().len()]
}

/// Finds `region` in `text`. The start marker must appear exactly once and be
/// followed by an end marker.
pub fn locate(text: &str, region: Region) -> Result<Span, QuarryError> {
    let marker = region.start_marker();
    let mut start: Option<(usize, String)> = None;
    let mut offset = 0;

    for line in text.split_inclusive('\n') {
        if line.trim() == marker {
            if start.is_some() {
                return Err(QuarryError::DuplicateRegion(region.name().to_string()));
            }
            start = Some((offset + line.len(), leading_whitespace(line).to_string()));
        }
        offset += line.len();
    }

    let (content_start, indent) =
        start.ok_or_else(|| QuarryError::MissingRegion(region.name().to_string()))?;

    let mut offset = content_start;
    for line in text[content_start..].split_inclusive('\n') {
        if line.trim() == END_MARKER {
            return Ok(Span {
                content_start,
                content_end: offset,
                indent,
            });
        }
        offset += line.len();
    }

    Err(QuarryError::UnterminatedRegion(region.name().to_string()))
}

/// Shifts a generated block to the marker's indentation.
pub fn indent_block(block: &str, indent: &str) -> String {
    block
        .lines()
        .map(|line| {
            if line.is_empty() {
                "\n".to_string()
            } else {
                format!("{}{}\n", indent, line)
            }
        })
        .collect()
}

/// Top-level method declarations as `(first_line, brace_line, brace_offset)`.
/// A declaration runs from its `fn` line to the line that opens its body.
fn find_declarations(lines: &[&str]) -> Vec<(usize, usize, usize)> {
    let infos = scan_lines(lines);
    let mut found = Vec::new();
    let mut index = 0;

    while index < lines.len() {
        let info = infos[index];
        if info.depth != 0 || !info.starts_in_code || !DECLARATION.is_match(lines[index]) {
            index += 1;
            continue;
        }
        let body = (index..lines.len()).find_map(|candidate| {
            infos[candidate].first_open.map(|offset| (candidate, offset))
        });
        match body {
            Some((end, offset)) => {
                found.push((index, end, offset));
                index = end + 1;
            }
            None => index += 1,
        }
    }

    found
}

/// A merged handler region.
#[derive(Debug, Clone, PartialEq)]
pub struct HandlerMerge {
    pub text:    String,
    /// `(existing, generated)` names of declarations paired by position whose
    /// names differ.
    pub renamed: Vec<(String, String)>,
}

/// Merges generated handler headers into an existing handler region.
///
/// Existing declarations are replaced in encounter order by the generated
/// ones; their bodies are kept. Extra generated declarations are appended
/// with stub bodies. More existing declarations than generated ones is an
/// error, since a hand-written handler would otherwise be dropped.
pub fn merge_handlers(
    region: Region,
    existing: &str,
    indent: &str,
    generated: &[HandlerDecl],
) -> Result<HandlerMerge, QuarryError> {
    let lines: Vec<&str> = existing.lines().collect();
    let declarations = find_declarations(&lines);

    if declarations.len() > generated.len() {
        return Err(QuarryError::HandlerOverflow {
            region:    region.name().to_string(),
            existing:  declarations.len(),
            generated: generated.len(),
        });
    }

    let mut out: Vec<String> = Vec::with_capacity(lines.len() + generated.len() * 3);
    let mut renamed = Vec::new();
    let mut pending = generated.iter();
    let mut next = declarations.iter().peekable();
    let mut index = 0;

    while index < lines.len() {
        let (start, end, brace) = match next.peek() {
            Some(&&(start, end, brace)) if start == index => (start, end, brace),
            _ => {
                out.push(lines[index].to_string());
                index += 1;
                continue;
            }
        };
        next.next();

        // Checked above: there are at least as many generated as existing.
        let decl = match pending.next() {
            Some(decl) => decl,
            None => break,
        };

        let existing_name = DECLARATION
            .captures(lines[start])
            .and_then(|captures| captures.get(1))
            .map(|name| name.as_str())
            .unwrap_or_default();
        if existing_name != decl.name {
            warn!(
                region = region.name(),
                existing = existing_name,
                generated = %decl.name,
                "positional merge pairs handlers with different names"
            );
            renamed.push((existing_name.to_string(), decl.name.clone()));
        }

        let body_tail = &lines[end][brace + 1..];
        out.push(format!("{}{}{}", leading_whitespace(lines[start]), decl.signature, body_tail));
        index = end + 1;
    }

    let appended: Vec<&HandlerDecl> = pending.collect();
    if !appended.is_empty() {
        while out.last().map_or(false, |line| line.trim().is_empty()) {
            out.pop();
        }
        for decl in &appended {
            if !out.is_empty() {
                out.push(String::new());
            }
            out.push(format!("{}{}", indent, decl.signature));
            if decl.unimplemented {
                out.push(format!("{}    // unimplemented", indent));
            }
            out.push(format!("{}}}", indent));
        }
    }

    debug!(
        region = region.name(),
        merged = declarations.len(),
        appended = appended.len(),
        "merged handler region"
    );
    Ok(HandlerMerge {
        text: out.iter().map(|line| format!("{}\n", line)).collect(),
        renamed,
    })
}

/// Trailing whitespace is removed from every line, line endings become `\n`
/// and the file ends with exactly one newline.
pub fn normalize_whitespace(text: &str) -> String {
    let mut out: String = text
        .lines()
        .map(|line| format!("{}\n", line.trim_end()))
        .collect();
    while out.ends_with("\n\n") {
        out.pop();
    }
    if out == "\n" {
        out.clear();
    }
    out
}

/// Writes every generated block into its region of `target`.
///
/// Regions are visited in file order and re-located after each splice, since
/// every edit moves the text that follows it. Nothing is returned unless all
/// seven regions were found and merged.
pub fn merge_regions(
    target: &str,
    generated: &BTreeMap<Region, Generated>,
) -> Result<String, QuarryError> {
    let mut text = target.replace("\r\n", "\n");

    let mut order = Region::ALL
        .iter()
        .map(|&region| locate(&text, region).map(|span| (span.content_start, region)))
        .collect::<Result<Vec<_>, _>>()?;
    order.sort();

    for (_, region) in order {
        let span = locate(&text, region)?;
        let existing = &text[span.content_start..span.content_end];

        let replacement = match generated.get(&region) {
            Some(Generated::Block(block)) => indent_block(block, &span.indent),
            Some(Generated::Handlers(decls)) => merge_handlers(region, existing, &span.indent, decls)?.text,
            None => continue,
        };
        text.replace_range(span.content_start..span.content_end, &replacement);
    }

    Ok(normalize_whitespace(&text))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn decl(name: &str, params: &str) -> HandlerDecl {
        HandlerDecl {
            name:          name.to_string(),
            signature:     format!("pub fn {}(&mut self{}) {{", name, params),
            unimplemented: false,
        }
    }

    #[test]
    fn test_locate_region() {
        let text = "fn a() {\n    //#serialize\n    old();\n    //#end\n}\n";
        let span = locate(text, Region::Serializer).unwrap();
        assert_eq!(&text[span.content_start..span.content_end], "    old();\n");
        assert_eq!(span.indent, "    ");
    }

    #[test]
    fn test_similar_marker_names_do_not_collide() {
        let text = "//#AsyncPacketHandler\n//#end\n//#SyncPacketHandler\nx\n//#end\n";
        let span = locate(text, Region::SyncHandlers).unwrap();
        assert_eq!(&text[span.content_start..span.content_end], "x\n");
    }

    #[test]
    fn test_locate_errors() {
        assert!(matches!(
            locate("nothing here\n", Region::Dispatch),
            Err(QuarryError::MissingRegion(_))
        ));
        assert!(matches!(
            locate("//#dispatch_sync_packet\nbody\n", Region::Dispatch),
            Err(QuarryError::UnterminatedRegion(_))
        ));
        assert!(matches!(
            locate("//#serialize\n//#end\n//#serialize\n//#end\n", Region::Serializer),
            Err(QuarryError::DuplicateRegion(_))
        ));
    }

    #[test]
    fn test_merge_replaces_signatures_and_keeps_bodies() {
        let existing = "    pub fn ping(&mut self, old: i32) {\n        pong();\n    }\n\n    fn status(&mut self) {\n        // todo\n    }\n";
        let merged = merge_handlers(
            Region::AsyncHandlers,
            existing,
            "    ",
            &[decl("ping", ", payload: i64"), decl("status", "")],
        )
        .unwrap()
        .text;
        assert_eq!(
            merged,
            "    pub fn ping(&mut self, payload: i64) {\n        pong();\n    }\n\n    pub fn status(&mut self) {\n        // todo\n    }\n"
        );
    }

    #[test]
    fn test_merge_handles_wrapped_signatures() {
        let existing = "    pub fn ping(\n        &mut self,\n        payload: i64,\n    ) {\n        pong(payload);\n    }\n";
        let merged =
            merge_handlers(Region::AsyncHandlers, existing, "    ", &[decl("ping", ", payload: i64")])
                .unwrap()
                .text;
        assert_eq!(
            merged,
            "    pub fn ping(&mut self, payload: i64) {\n        pong(payload);\n    }\n"
        );
    }

    #[test]
    fn test_merge_ignores_nested_functions() {
        let existing = "    fn outer(&mut self) {\n        fn inner() {}\n        inner();\n    }\n";
        let merged = merge_handlers(Region::SyncHandlers, existing, "    ", &[decl("outer", "")]).unwrap().text;
        assert_eq!(
            merged,
            "    pub fn outer(&mut self) {\n        fn inner() {}\n        inner();\n    }\n"
        );
    }

    #[test]
    fn test_merge_appends_missing_handlers() {
        let existing = "    fn ping(&mut self) {\n        pong();\n    }\n\n";
        let mut unimplemented = decl("status", "");
        unimplemented.unimplemented = true;
        let merged = merge_handlers(
            Region::SyncHandlers,
            existing,
            "    ",
            &[decl("ping", ""), decl("login", ""), unimplemented],
        )
        .unwrap()
        .text;
        assert_eq!(
            merged,
            "    pub fn ping(&mut self) {\n        pong();\n    }\n\n    pub fn login(&mut self) {\n    }\n\n    pub fn status(&mut self) {\n        // unimplemented\n    }\n"
        );
    }

    #[test]
    fn test_merge_into_empty_region() {
        let merged = merge_handlers(Region::SyncHandlers, "", "    ", &[decl("ping", "")]).unwrap().text;
        assert_eq!(merged, "    pub fn ping(&mut self) {\n    }\n");
    }

    #[test]
    fn test_merge_refuses_to_drop_handlers() {
        let existing = "fn a(&mut self) {\n}\nfn b(&mut self) {\n}\n";
        let err = merge_handlers(Region::SyncHandlers, existing, "", &[decl("a", "")]).unwrap_err();
        assert!(
            matches!(err, QuarryError::HandlerOverflow { existing: 2, generated: 1, .. }),
            "{:?}",
            err
        );
    }

    #[test]
    fn test_comment_markers_in_strings_do_not_hide_handlers() {
        let existing = "    fn a(&mut self) {\n        if self.url == \"http://x\" {\n            self.open();\n        }\n    }\n\n    pub fn b(&mut self) {\n    }\n";
        let merged = merge_handlers(
            Region::SyncHandlers,
            existing,
            "    ",
            &[decl("a", ""), decl("b", ", y: i32")],
        )
        .unwrap()
        .text;
        assert_eq!(merged.matches("fn b(").count(), 1);
        assert_eq!(
            merged,
            "    pub fn a(&mut self) {\n        if self.url == \"http://x\" {\n            self.open();\n        }\n    }\n\n    pub fn b(&mut self, y: i32) {\n    }\n"
        );
    }

    #[test]
    fn test_brace_literals_do_not_hide_handlers() {
        let existing = "    fn a(&mut self) {\n        self.name = self.name.trim_end_matches('}').to_string();\n    }\n\n    fn b(&mut self) {\n        let _ = \"{\";\n    }\n";
        let err = merge_handlers(Region::SyncHandlers, existing, "    ", &[decl("a", "")]).unwrap_err();
        assert!(
            matches!(err, QuarryError::HandlerOverflow { existing: 2, generated: 1, .. }),
            "{:?}",
            err
        );
    }

    #[test]
    fn test_qualified_declarations_are_recognized() {
        let existing = "    pub const fn a(&self) {\n    }\n    unsafe fn b(&mut self) {\n    }\n    pub(crate) extern \"C\" fn c(&mut self) {\n    }\n    pub async unsafe fn d(&mut self) {\n    }\n";
        let err = merge_handlers(
            Region::SyncHandlers,
            existing,
            "    ",
            &[decl("a", ""), decl("b", ""), decl("c", "")],
        )
        .unwrap_err();
        assert!(
            matches!(err, QuarryError::HandlerOverflow { existing: 4, generated: 3, .. }),
            "{:?}",
            err
        );

        let merged = merge_handlers(
            Region::SyncHandlers,
            existing,
            "    ",
            &[decl("a", ""), decl("b", ""), decl("c", ""), decl("d", "")],
        )
        .unwrap();
        assert!(merged.renamed.is_empty());
        assert_eq!(merged.text.matches("pub fn ").count(), 4);
    }

    #[test]
    fn test_mismatched_pairings_are_reported() {
        let existing = "    fn status(&mut self) {\n        self.status();\n    }\n\n    fn ping(&mut self) {\n        self.pong();\n    }\n";
        let merged = merge_handlers(
            Region::SyncHandlers,
            existing,
            "    ",
            &[decl("ping", ""), decl("status", "")],
        )
        .unwrap();
        assert_eq!(
            merged.renamed,
            [
                ("status".to_string(), "ping".to_string()),
                ("ping".to_string(), "status".to_string()),
            ]
        );
        // bodies stay where they were
        assert!(merged.text.starts_with("    pub fn ping(&mut self) {\n        self.status();\n"));
    }

    #[test]
    fn test_normalize_whitespace() {
        assert_eq!(normalize_whitespace("a  \r\nb\t\n\n\n"), "a\nb\n");
        assert_eq!(normalize_whitespace("a"), "a\n");
        assert_eq!(normalize_whitespace(""), "");
    }

    #[test]
    fn test_regions_are_spliced_in_file_order() {
        let mut target = String::new();
        for region in Region::ALL.iter().rev() {
            target.push_str(&format!("{}\nold\n{}\n", region.start_marker(), END_MARKER));
        }
        let generated: BTreeMap<Region, Generated> = Region::ALL
            .iter()
            .map(|&region| {
                let content = if region.merges_handlers() {
                    Generated::Handlers(Vec::new())
                } else {
                    Generated::Block(format!("{}();\nsecond_line();\n", region.name()))
                };
                (region, content)
            })
            .collect();

        let merged = merge_regions(&target, &generated).unwrap();
        assert!(merged.contains("//#serialize\nserialize();\nsecond_line();\n//#end\n"));
        assert!(merged.contains("//#handle_packet\nhandle_packet();\nsecond_line();\n//#end\n"));
        // handler regions keep non-declaration lines
        assert!(merged.contains("//#AsyncPacketHandler\nold\n//#end\n"));
        assert_eq!(merge_regions(&merged, &generated).unwrap(), merged);
    }
}
