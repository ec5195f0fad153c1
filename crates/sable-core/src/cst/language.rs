//! Rowan language implementation for C#
//!
//! Connects [`CsSyntaxKind`] to Rowan's generic CST infrastructure.

use rowan::Language;

use super::CsSyntaxKind;

/// Language implementation for C#
///
/// This is a zero-sized type that implements `rowan::Language` to provide
/// the connection between our syntax kinds and Rowan's generic tree types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct CsLanguage;

impl Language for CsLanguage {
    type Kind = CsSyntaxKind;

    fn kind_from_raw(raw: rowan::SyntaxKind) -> Self::Kind {
        CsSyntaxKind::from_raw(raw.0).unwrap_or_else(|| {
            tracing::warn!("Unknown raw syntax kind {}, mapping to Error", raw.0);
            CsSyntaxKind::Error
        })
    }

    fn kind_to_raw(kind: Self::Kind) -> rowan::SyntaxKind {
        kind.into()
    }
}
