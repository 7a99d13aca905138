//! Protein (`protein`) and peptide list (`peptide_list`) elements

use std::io::BufRead;

use log::debug;

use super::annotations::read_annotations;
use super::cursor::TagCursor;
use super::error::DocumentError;
use super::names::{attr, el};
use super::peptide::read_peptide_list;
use super::ParseContext;
use crate::model::{
    Annotations, FastaSequence, PeptideGroup, PeptideGroupNode, PeptideNode, ProteinMetadata,
};

/// Read every group of the document body, inside an optional 0.1
/// `selected_proteins` wrapper
pub(crate) fn read_document_groups<R: BufRead>(
    ctx: &mut ParseContext<'_>,
    cursor: &mut TagCursor<R>,
) -> Result<Vec<PeptideGroupNode>, DocumentError> {
    if !cursor.is_start_element(el::SELECTED_PROTEINS) {
        return read_group_list(ctx, cursor);
    }
    if cursor.is_empty_element() {
        cursor.skip_element()?;
        return Ok(Vec::new());
    }
    cursor.enter_element()?;
    let groups = read_group_list(ctx, cursor)?;
    cursor.exit_element()?;
    Ok(groups)
}

fn read_group_list<R: BufRead>(
    ctx: &mut ParseContext<'_>,
    cursor: &mut TagCursor<R>,
) -> Result<Vec<PeptideGroupNode>, DocumentError> {
    let mut groups = Vec::new();
    loop {
        if cursor.is_start_element(el::PROTEIN) {
            groups.push(read_protein(ctx, cursor)?);
        } else if cursor.is_start_element(el::PEPTIDE_LIST) {
            groups.push(read_peptide_group(ctx, cursor)?);
        } else {
            break;
        }
    }
    Ok(groups)
}

/// Protein metadata of the current tag. Groups carry their user-settable
/// name and description under a `label_` prefix.
fn read_metadata<R: BufRead>(
    ctx: &mut ParseContext<'_>,
    cursor: &TagCursor<R>,
    label: bool,
) -> ProteinMetadata {
    let prefixed = |name: &str| {
        let key = if label {
            format!("{}{name}", attr::LABEL_PREFIX)
        } else {
            name.to_string()
        };
        cursor.attribute(&key).map(str::to_string)
    };
    let owned = |name: &str| cursor.attribute(name).map(str::to_string);
    ProteinMetadata {
        name: prefixed(attr::NAME),
        description: prefixed(attr::DESCRIPTION),
        preferred_name: owned(attr::PREFERRED_NAME),
        accession: owned(attr::ACCESSION),
        gene: owned(attr::GENE),
        species: ctx.pool.intern_opt(cursor.attribute(attr::SPECIES)),
        websearch_status: owned(attr::WEBSEARCH_STATUS),
    }
}

/// Peptides of a group, directly or inside a 0.1 `selected_peptides`
/// wrapper
fn read_group_children<R: BufRead>(
    ctx: &mut ParseContext<'_>,
    cursor: &mut TagCursor<R>,
    group_sequence: Option<&str>,
) -> Result<Vec<PeptideNode>, DocumentError> {
    if !cursor.is_start_element(el::SELECTED_PEPTIDES) {
        return read_peptide_list(ctx, cursor, group_sequence);
    }
    if cursor.is_empty_element() {
        cursor.skip_element()?;
        return Ok(Vec::new());
    }
    cursor.enter_element()?;
    let children = read_peptide_list(ctx, cursor, group_sequence)?;
    cursor.exit_element()?;
    Ok(children)
}

fn read_alternatives<R: BufRead>(
    ctx: &mut ParseContext<'_>,
    cursor: &mut TagCursor<R>,
) -> Result<Vec<ProteinMetadata>, DocumentError> {
    let mut alternatives = Vec::new();
    if !cursor.is_start_element(el::ALTERNATIVES) {
        return Ok(alternatives);
    }
    if cursor.is_empty_element() {
        cursor.skip_element()?;
        return Ok(alternatives);
    }
    cursor.enter_element()?;
    while cursor.is_start_element(el::ALTERNATIVE_PROTEIN) {
        alternatives.push(read_metadata(ctx, cursor, false));
        cursor.skip_element()?;
    }
    cursor.exit_element()?;
    Ok(alternatives)
}

/// Protein sequence text with all whitespace removed
fn decode_protein_sequence(text: &str) -> String {
    text.chars().filter(|c| !c.is_whitespace()).collect()
}

/// Read a `protein` element.
///
/// 0.1 documents saved peptide lists as proteins, either flagged with
/// `peptide_list="true"` or with an `X...X` placeholder sequence; both are
/// read as peptide lists.
fn read_protein<R: BufRead>(
    ctx: &mut ParseContext<'_>,
    cursor: &mut TagCursor<R>,
) -> Result<PeptideGroupNode, DocumentError> {
    let name = cursor.attribute(attr::NAME).map(str::to_string);
    let description = cursor.attribute(attr::DESCRIPTION).map(str::to_string);
    let mut peptide_list = cursor.bool_attribute(attr::PEPTIDE_LIST, false)?;
    let auto_manage_children = cursor.bool_attribute(attr::AUTO_MANAGE_CHILDREN, true)?;
    let mut metadata = read_metadata(ctx, cursor, true);

    cursor.enter_element()?;
    let annotations = read_annotations(cursor, &mut ctx.pool)?;
    let alternatives = read_alternatives(ctx, cursor)?;
    if !cursor.is_start_element(el::SEQUENCE) {
        return Err(cursor.unexpected(format!("<{}>", el::SEQUENCE)));
    }
    let sequence = decode_protein_sequence(&cursor.read_element_text()?);

    if sequence.starts_with('X') && sequence.ends_with('X') {
        debug!("Reading protein with placeholder sequence as a peptide list");
        peptide_list = true;
    }

    let group = if peptide_list {
        metadata = metadata
            .with_name(Some(name.unwrap_or_default()))
            .with_description(description);
        PeptideGroup::PeptideList { decoy: false }
    } else if name.is_none() {
        // Without a name the FASTA header is user settable, so only the
        // label metadata is kept
        PeptideGroup::Protein(FastaSequence {
            name: None,
            description: None,
            alternatives: Vec::new(),
            sequence,
        })
    } else {
        metadata = metadata.with_description(None);
        PeptideGroup::Protein(FastaSequence {
            name,
            description,
            alternatives,
            sequence,
        })
    };

    let children = read_group_children(ctx, cursor, group.sequence())?;
    cursor.exit_element()?;

    Ok(PeptideGroupNode {
        group,
        metadata,
        annotations,
        children,
        auto_manage_children,
    })
}

/// Read a `peptide_list` element
fn read_peptide_group<R: BufRead>(
    ctx: &mut ParseContext<'_>,
    cursor: &mut TagCursor<R>,
) -> Result<PeptideGroupNode, DocumentError> {
    let metadata = read_metadata(ctx, cursor, true);
    let auto_manage_children = cursor.bool_attribute(attr::AUTO_MANAGE_CHILDREN, true)?;
    let decoy = cursor.bool_attribute(attr::DECOY, false)?;

    let mut node = PeptideGroupNode {
        group: PeptideGroup::PeptideList { decoy },
        metadata,
        annotations: Annotations::empty(),
        children: Vec::new(),
        auto_manage_children,
    };
    if cursor.is_empty_element() {
        cursor.skip_element()?;
        return Ok(node);
    }
    cursor.enter_element()?;
    node.annotations = read_annotations(cursor, &mut ctx.pool)?;
    node.children = read_group_children(ctx, cursor, None)?;
    cursor.exit_element()?;
    Ok(node)
}
