// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

//! HTML parser using html5ever
//!
//! Best-effort recovery: malformed markup never fails here. Parse errors
//! are demoted to diagnostics and a partial tree is returned.

use html5ever::parse_document;
use html5ever::tendril::TendrilSink;
use html5ever::tree_builder::TreeBuilderOpts;
use html5ever::ParseOpts;
use markup5ever_rcdom::{Handle, NodeData as RcNodeData, RcDom};
use tracing::debug;

use super::{ScriptBlock, ScriptOrigin};
use crate::doc::tree::{MarkupTree, NodeData, NodeId};

/// Output of one markup parse pass
pub(crate) struct ParsedMarkup {
    pub tree: MarkupTree,
    pub scripts: Vec<ScriptBlock>,
    pub diagnostics: Vec<String>,
}

/// Parse markup into a tree, collecting script blocks and diagnostics.
///
/// `max_depth` bounds recursion into `<iframe srcdoc>` content; it is a
/// structural nesting limit, never a fetch depth.
pub(crate) fn parse_markup(html: &str, max_depth: usize) -> ParsedMarkup {
    let opts = ParseOpts {
        tree_builder: TreeBuilderOpts {
            drop_doctype: false,
            ..Default::default()
        },
        ..Default::default()
    };

    let dom = parse_document(RcDom::default(), opts)
        .from_utf8()
        .read_from(&mut html.as_bytes())
        .unwrap_or_else(|_| parse_document(RcDom::default(), ParseOpts::default()).one(""));

    let mut tree = MarkupTree::new();
    let root = tree.root();
    for child in dom.document.children.borrow().iter() {
        convert_node(child, root, &mut tree);
    }

    let mut diagnostics = Vec::new();
    if !dom.errors.is_empty() {
        debug!(count = dom.errors.len(), "recovered from markup parse errors");
        diagnostics.push(format!(
            "markup recovered with {} parse error(s); tree may be partial",
            dom.errors.len()
        ));
    }

    let mut scripts = Vec::new();
    collect_scripts(&tree, max_depth, &mut scripts, &mut diagnostics);

    ParsedMarkup {
        tree,
        scripts,
        diagnostics,
    }
}

fn convert_node(handle: &Handle, parent: NodeId, tree: &mut MarkupTree) {
    let data = match handle.data {
        RcNodeData::Document => {
            // Already have a document root
            for child in handle.children.borrow().iter() {
                convert_node(child, parent, tree);
            }
            return;
        }
        RcNodeData::Doctype { .. } => NodeData::doctype(),
        RcNodeData::Text { ref contents } => {
            let text = contents.borrow().to_string();
            if text.trim().is_empty() {
                return;
            }
            NodeData::text(text)
        }
        RcNodeData::Comment { ref contents } => NodeData::comment(contents.to_string()),
        RcNodeData::Element {
            ref name,
            ref attrs,
            ..
        } => {
            let mut data = NodeData::element(name.local.to_string());
            for attr in attrs.borrow().iter() {
                data.attributes
                    .push((attr.name.local.to_string(), attr.value.to_string()));
            }
            data
        }
        RcNodeData::ProcessingInstruction { .. } => return,
    };

    let id = tree.push_node(data, parent);
    for child in handle.children.borrow().iter() {
        convert_node(child, id, tree);
    }
}

/// Collect script blocks from a tree, recursing into `iframe srcdoc` up to
/// `depth_left` structural levels.
fn collect_scripts(
    tree: &MarkupTree,
    depth_left: usize,
    scripts: &mut Vec<ScriptBlock>,
    diagnostics: &mut Vec<String>,
) {
    for id in tree.elements_by_tag("script") {
        let node = tree.get(id);
        if let Some(src) = node.attr("src") {
            // External reference: recorded, never fetched here
            scripts.push(ScriptBlock {
                text: String::new(),
                origin: ScriptOrigin::ExternalRef(src.to_string()),
            });
        }
        let body = tree.text_content(id);
        if !body.trim().is_empty() {
            scripts.push(ScriptBlock {
                text: body,
                origin: ScriptOrigin::Inline,
            });
        }
    }

    for id in tree.elements_by_tag("iframe") {
        let node = tree.get(id);
        let Some(srcdoc) = node.attr("srcdoc") else {
            continue;
        };
        if srcdoc.trim().is_empty() {
            continue;
        }
        if depth_left == 0 {
            diagnostics.push("iframe srcdoc nesting exceeded max depth; skipped".to_string());
            continue;
        }
        let nested = parse_markup(srcdoc, depth_left - 1);
        scripts.extend(nested.scripts);
        diagnostics.extend(nested.diagnostics);
    }
}
