//! Inlay hints for stale go.mod versions.
//!
//! Compares the version each `require` / `replace` directive declares with
//! the version the build graph actually used, and emits a hint with a
//! one-click edit wherever the two disagree.
//!
//! The pipeline runs in four stages:
//!
//! 1. [`DirectiveIndex`] maps module paths to their replace and require
//!    directives.
//! 2. [`resolved_modules`] collects one effective version per module path
//!    from the package metadata.
//! 3. [`DirectiveIndex::discrepancy`] applies replace precedence and flags
//!    version mismatches.
//! 4. [`build_hint`] turns a mismatch into an LSP inlay hint.
//!
//! Versions are compared as opaque strings: `v1.0.0` and `v1.0.0+meta` are
//! different versions here.

use crate::parser::ParsedModule;
use crate::types::{Line, ModFile, Replace, Require};
use gomod_core::{PackageMetadata, PositionMapper};
use std::collections::{HashMap, HashSet};
use tower_lsp_server::ls_types::{
    InlayHint, InlayHintKind, InlayHintLabel, InlayHintLabelPart, InlayHintLabelPartTooltip,
    TextEdit,
};

/// Replace and require directives keyed by module path.
///
/// When a path is listed more than once, the last directive wins.
#[derive(Debug, Default)]
pub struct DirectiveIndex<'a> {
    replaces: HashMap<&'a str, &'a Replace>,
    requires: HashMap<&'a str, &'a Require>,
}

/// A directive whose declared version differs from the resolved one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Discrepancy<'a> {
    /// Directive line holding the stale version token
    pub line: &'a Line,
    pub old_version: &'a str,
    pub new_version: &'a str,
}

/// A module path and the version the build used for it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResolvedModule<'a> {
    pub path: &'a str,
    pub version: &'a str,
}

impl<'a> DirectiveIndex<'a> {
    pub fn new(file: &'a ModFile) -> Self {
        let replaces = file
            .replace
            .iter()
            .map(|r| (r.old.path.as_str(), r))
            .collect();
        let requires = file
            .require
            .iter()
            .map(|r| (r.module.path.as_str(), r))
            .collect();
        Self { replaces, requires }
    }

    pub fn replace(&self, path: &str) -> Option<&'a Replace> {
        self.replaces.get(path).copied()
    }

    pub fn require(&self, path: &str) -> Option<&'a Require> {
        self.requires.get(path).copied()
    }

    /// Compares a resolved module against its directive.
    ///
    /// A replace directive for the path is checked first and shadows any
    /// require directive for the same path.
    pub fn discrepancy<'m>(&self, module: ResolvedModule<'m>) -> Option<Discrepancy<'m>>
    where
        'a: 'm,
    {
        if let Some(replace) = self.replace(module.path) {
            return (replace.new.version != module.version).then_some(Discrepancy {
                line: &replace.syntax,
                old_version: &replace.new.version,
                new_version: module.version,
            });
        }

        let require = self.require(module.path)?;
        (require.module.version != module.version).then_some(Discrepancy {
            line: &require.syntax,
            old_version: &require.module.version,
            new_version: module.version,
        })
    }
}

/// Collects the effective version of every distinct module in `metadata`.
///
/// Packages without a module are skipped. Only the first package seen for a
/// module path is considered.
pub fn resolved_modules(metadata: &[PackageMetadata]) -> Vec<ResolvedModule<'_>> {
    let mut seen = HashSet::new();
    metadata
        .iter()
        .filter_map(|pkg| pkg.module.as_ref())
        .filter(|module| seen.insert(module.path.as_str()))
        .map(|module| ResolvedModule {
            path: &module.path,
            version: module.effective_version(),
        })
        .collect()
}

/// Builds the hint for one discrepancy.
///
/// Returns `None` when the version token span cannot be mapped to a position
/// in the document.
pub fn build_hint(discrepancy: &Discrepancy<'_>, mapper: &PositionMapper) -> Option<InlayHint> {
    let (start, end) = discrepancy.line.last_token_span();
    let range = match mapper.offset_range(start, end) {
        Ok(range) => range,
        Err(e) => {
            tracing::trace!(line = discrepancy.line.line_number, error = %e, "Skipping hint");
            return None;
        }
    };

    let part = InlayHintLabelPart {
        value: discrepancy.new_version.to_string(),
        tooltip: Some(InlayHintLabelPartTooltip::String(format!(
            "used metadata's version {} rather than go.mod's version {}",
            discrepancy.new_version, discrepancy.old_version
        ))),
        location: None,
        command: None,
    };

    Some(InlayHint {
        position: range.start,
        label: InlayHintLabel::LabelParts(vec![part]),
        kind: Some(InlayHintKind::PARAMETER),
        text_edits: Some(vec![TextEdit {
            range,
            new_text: discrepancy.new_version.to_string(),
        }]),
        tooltip: None,
        padding_left: None,
        padding_right: Some(true),
        data: None,
    })
}

/// Produces a hint for every require or replace directive whose version
/// differs from the one recorded in the package metadata.
///
/// # Examples
///
/// ```
/// use gomod_core::{Module, PackageMetadata};
/// use gomod_hints::{parse_go_mod, unexpected_versions};
/// use tower_lsp_server::ls_types::Position;
///
/// let parsed = parse_go_mod("module example.com/app\n\nrequire example.com/foo v1.0.0\n").unwrap();
/// let metadata = vec![PackageMetadata {
///     import_path: "example.com/foo".into(),
///     module: Some(Module {
///         path: "example.com/foo".into(),
///         version: "v1.2.0".into(),
///         ..Default::default()
///     }),
/// }];
///
/// let hints = unexpected_versions(&parsed, &metadata);
/// assert_eq!(hints.len(), 1);
/// assert_eq!(hints[0].position, Position::new(2, 24));
/// ```
pub fn unexpected_versions(parsed: &ParsedModule, metadata: &[PackageMetadata]) -> Vec<InlayHint> {
    let index = DirectiveIndex::new(&parsed.file);

    let hints: Vec<InlayHint> = resolved_modules(metadata)
        .into_iter()
        .filter_map(|module| index.discrepancy(module))
        .filter_map(|discrepancy| build_hint(&discrepancy, &parsed.mapper))
        .collect();

    tracing::debug!(hints = hints.len(), "Computed stale version hints");
    hints
}
