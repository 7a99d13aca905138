//! Explicit modification lists and isotope label lookups
//!
//! Modifications are written by name and bound here to the definitions in
//! the settings tables. An unknown name is fatal.

use std::io::BufRead;

use super::cursor::TagCursor;
use super::error::{DocumentError, ModificationReference};
use super::names::{attr, el};
use super::ParseContext;
use crate::format_version::FormatVersion;
use crate::model::{strip_modifications, ExplicitMod, ExplicitMods, TypedExplicitModifications};
use crate::settings::{IsotopeLabelType, TypedModifications};

/// Modification table for the `isotope_label` attribute of the current tag,
/// or for `default` when the attribute is absent or empty
pub(crate) fn read_label_type<R: BufRead>(
    ctx: &ParseContext<'_>,
    cursor: &TagCursor<R>,
    default: &IsotopeLabelType,
) -> Result<TypedModifications, DocumentError> {
    let name = cursor
        .attribute(attr::ISOTOPE_LABEL)
        .filter(|name| !name.is_empty())
        .unwrap_or(default.name());
    ctx.settings
        .modifications
        .modifications_by_name(name)
        .ok_or_else(|| {
            DocumentError::MissingModificationReference(ModificationReference::IsotopeLabelType(
                name.to_string(),
            ))
        })
}

/// One typed list; a missing element yields an empty list of `default`.
/// Positions must fall inside a sequence of `residues` residues.
fn read_typed_mods<R: BufRead>(
    ctx: &ParseContext<'_>,
    cursor: &mut TagCursor<R>,
    residues: usize,
    element: &str,
    mod_element: &str,
    default: &IsotopeLabelType,
) -> Result<TypedExplicitModifications, DocumentError> {
    if !cursor.is_start_element(element) {
        return Ok(TypedExplicitModifications::new(default.clone(), Vec::new()));
    }
    let typed = read_label_type(ctx, cursor, default)?;
    let mut modifications = Vec::new();
    if cursor.is_empty_element() {
        cursor.skip_element()?;
    } else {
        cursor.enter_element()?;
        while cursor.is_start_element(mod_element) {
            let index_aa = cursor.int_attribute(attr::INDEX_AA)?;
            let name = cursor.attribute(attr::MODIFICATION_NAME).unwrap_or_default();
            let modification = typed
                .find(name)
                .cloned()
                .ok_or_else(|| DocumentError::missing_modification(name))?;
            let index = usize::try_from(index_aa)
                .ok()
                .filter(|&index| index < residues)
                .ok_or_else(|| DocumentError::ModificationOutOfRange {
                    modification: name.to_string(),
                    index: index_aa,
                    length: residues,
                })?;
            modifications.push(ExplicitMod {
                index_aa: index,
                modification,
            });
            cursor.skip_element()?;
        }
        cursor.exit_element()?;
    }
    Ok(TypedExplicitModifications::new(typed.label_type, modifications))
}

/// Read `variable_modifications` and `explicit_modifications` at the cursor.
///
/// Returns `None` when neither is present. Documents at or before 0.2 could
/// not express "unmodified", so an explicit section there implies empty
/// static and heavy lists. `sequence` is the unmodified peptide sequence the
/// positions index into.
pub(crate) fn read_explicit_mods<R: BufRead>(
    ctx: &ParseContext<'_>,
    cursor: &mut TagCursor<R>,
    sequence: &str,
) -> Result<Option<ExplicitMods>, DocumentError> {
    let residues = sequence.chars().count();
    let light = IsotopeLabelType::light();
    let heavy = IsotopeLabelType::heavy();
    let legacy_types = ctx.version <= FormatVersion::VERSION_0_2;

    let mut static_mods = None;
    let mut heavy_mods = None;
    let mut variable = false;

    if cursor.is_start_element(el::VARIABLE_MODIFICATIONS) {
        let typed = read_typed_mods(
            ctx,
            cursor,
            residues,
            el::VARIABLE_MODIFICATIONS,
            el::VARIABLE_MODIFICATION,
            &light,
        )?;
        static_mods = Some(typed.modifications);
        variable = true;
    }

    if cursor.is_start_element(el::EXPLICIT_MODIFICATIONS) {
        if cursor.is_empty_element() {
            cursor.skip_element()?;
        } else {
            cursor.enter_element()?;
            if !variable {
                if cursor.is_start_element(el::EXPLICIT_STATIC_MODIFICATIONS) {
                    let typed = read_typed_mods(
                        ctx,
                        cursor,
                        residues,
                        el::EXPLICIT_STATIC_MODIFICATIONS,
                        el::EXPLICIT_MODIFICATION,
                        &light,
                    )?;
                    static_mods = Some(typed.modifications);
                } else if legacy_types {
                    static_mods = Some(Vec::new());
                }
            }
            let mut lists = Vec::new();
            while cursor.is_start_element(el::EXPLICIT_HEAVY_MODIFICATIONS) {
                lists.push(read_typed_mods(
                    ctx,
                    cursor,
                    residues,
                    el::EXPLICIT_HEAVY_MODIFICATIONS,
                    el::EXPLICIT_MODIFICATION,
                    &heavy,
                )?);
            }
            if legacy_types && lists.is_empty() {
                lists.push(TypedExplicitModifications::new(heavy.clone(), Vec::new()));
            }
            heavy_mods = Some(lists);
            cursor.exit_element()?;
        }
    }

    if static_mods.is_none() && heavy_mods.is_none() {
        return Ok(None);
    }
    Ok(Some(ExplicitMods::new(
        static_mods,
        heavy_mods.unwrap_or_default(),
        variable,
    )))
}

/// Skip a cached `implicit_modifications` element, which is recomputed
pub(crate) fn skip_implicit_mods<R: BufRead>(cursor: &mut TagCursor<R>) -> Result<(), DocumentError> {
    if cursor.is_start_element(el::IMPLICIT_MODIFICATIONS) {
        cursor.skip_element()?;
    }
    Ok(())
}

/// Read the `lookup_modifications` wrapper, if present. Positions index the
/// unmodified `lookup_sequence`.
pub(crate) fn read_lookup_mods<R: BufRead>(
    ctx: &ParseContext<'_>,
    cursor: &mut TagCursor<R>,
    lookup_sequence: Option<&str>,
) -> Result<Option<ExplicitMods>, DocumentError> {
    if !cursor.is_start_element(el::LOOKUP_MODIFICATIONS) {
        return Ok(None);
    }
    if cursor.is_empty_element() {
        cursor.skip_element()?;
        return Ok(None);
    }
    let sequence = strip_modifications(lookup_sequence.unwrap_or_default());
    cursor.enter_element()?;
    let mods = read_explicit_mods(ctx, cursor, &sequence)?;
    cursor.exit_element()?;
    Ok(mods)
}
