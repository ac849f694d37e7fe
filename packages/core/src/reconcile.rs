//! Child reconciliation: matches a new child sequence against the
//! previous one, diffs each matched/new pair left to right, and unmounts
//! whatever is left over, mutating the live DOM directly rather than
//! recording a patch list for later replay.

use std::collections::HashMap;

use crate::diff::{diff, unmount, DiffCtx};
use crate::document::Document;
use crate::vnode::VNode;

/// Reconciles `new_children` (already normalized — a `VNode::fragment`
/// flattening pass runs ahead of this, so no raw nested-sequence flattening
/// happens here) against `old_children`, diffing left to right and
/// moving/creating/removing DOM as needed, then stores the result on
/// `new_parent`.
///
/// `old_children` is a snapshot taken *before* this call so that it remains
/// valid even when `new_parent` and the vnode `old_children` came from are
/// the same object (the scheduler's re-render procedure,, reconciles a
/// component's new output against its own previously stored children).
#[allow(clippy::too_many_arguments)]
pub(crate) fn reconcile_children<D: Document>(
    ctx: &mut DiffCtx<D>,
    parent_dom: &D::Node,
    new_children: Vec<VNode<D>>,
    new_parent: &VNode<D>,
    old_children: &[VNode<D>],
    svg: bool,
    reference_dom: Option<D::Node>,
) {
    let parent_depth = new_parent.depth();

    // Phase B: match.
    let mut key_index: HashMap<_, usize> = HashMap::new();
    for (idx, old) in old_children.iter().enumerate() {
        if let Some(key) = old.key() {
            key_index.insert(key, idx);
        }
    }
    let mut matched = vec![false; old_children.len()];
    let mut matches: Vec<Option<usize>> = Vec::with_capacity(new_children.len());

    for new_child in &new_children {
        let candidate = if let Some(key) = new_child.key() {
            key_index.get(&key).copied().filter(|&idx| {
                !matched[idx] && old_children[idx].same_type(new_child)
            })
        } else {
            let new_pos = matches.len();
            let positional = (new_pos < old_children.len())
                .then_some(new_pos)
                .filter(|&idx| old_children[idx].key().is_none() && !matched[idx] && old_children[idx].same_type(new_child));
            positional.or_else(|| {
                old_children.iter().enumerate().find_map(|(idx, old)| {
                    (!matched[idx] && old.key().is_none() && old.same_type(new_child)).then_some(idx)
                })
            })
        };
        if let Some(idx) = candidate {
            matched[idx] = true;
        }
        matches.push(candidate);
    }

    // Phase C: diff and place, left to right.
    let mut previous_new_dom: Option<D::Node> = None;
    for (i, new_child) in new_children.iter().enumerate() {
        new_child.set_parent(new_parent);
        new_child.set_depth_index(parent_depth + 1, i);

        let reference = match &previous_new_dom {
            Some(prev) => ctx.doc.next_sibling(prev),
            None => reference_dom.clone(),
        };

        let old_match_idx = matches[i];
        let old_child = old_match_idx.map(|idx| old_children[idx].clone());

        diff(ctx, parent_dom, Some(new_child), old_child.as_ref(), svg, reference.clone());

        let Some(child_first) = new_child.first_dom() else {
            // No DOM output (e.g. a component that rendered nothing); the
            // placement cursor is unchanged.
            continue;
        };
        let child_last = new_child.last_dom().unwrap_or_else(|| child_first.clone());

        if old_match_idx.is_some() {
            let in_place = match &previous_new_dom {
                Some(prev) => ctx.doc.next_sibling(prev).as_ref() == Some(&child_first),
                None => reference_dom.as_ref() == Some(&child_first),
            };
            if !in_place {
                move_range(ctx.doc, parent_dom, &child_first, &child_last, reference.as_ref());
            }
        }

        previous_new_dom = Some(child_last);
    }

    // Phase D: unmount unmatched old children, deferred until every new
    // child has been placed so their DOM stays a valid reference point.
    for (idx, old) in old_children.iter().enumerate() {
        if !matched[idx] {
            unmount(ctx, old, false);
        }
    }

    new_parent.set_children(new_children);
}

fn move_range<D: Document>(doc: &D, parent_dom: &D::Node, first: &D::Node, last: &D::Node, reference: Option<&D::Node>) {
    let mut cursor = Some(first.clone());
    while let Some(node) = cursor {
        let next = doc.next_sibling(&node);
        doc.insert_before(parent_dom, &node, reference);
        if &node == last {
            break;
        }
        cursor = next;
    }
}
