//! The fixed registry of metadata attributes a decode verdict can expose.

use strum::{Display, EnumCount, EnumIter, EnumString, IntoEnumIterator, IntoStaticStr};

/// Width of the gutter between an attribute label's colon and its value.
const LABEL_GUTTER: usize = 2;

/// One named, orderable piece of metadata about a decode outcome.
///
/// Declaration order *is* the registry order: it fixes the dense zero-based
/// ordinals, the iteration order, and the order attributes are rendered in.
/// Display names are matched case-insensitively on lookup.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    PartialOrd,
    Ord,
    EnumString,
    Display,
    EnumIter,
    EnumCount,
    IntoStaticStr,
)]
#[strum(ascii_case_insensitive)]
pub enum Attribute {
    /// Numeric status code of the decode verdict.
    #[strum(serialize = "STATUS-CODE")]
    StatusCode,
    /// Human-readable status text of the decode verdict.
    #[strum(serialize = "STATUS-TEXT")]
    StatusText,
    /// Numeric user identity recovered from the credential.
    #[strum(serialize = "UID")]
    Uid,
    /// Numeric group identity recovered from the credential.
    #[strum(serialize = "GID")]
    Gid,
    /// Length in bytes of the recovered payload.
    #[strum(serialize = "LENGTH")]
    Length,
}

impl Attribute {
    /// Iterates the registry in order.
    pub fn all() -> impl Iterator<Item = Self> {
        Self::iter()
    }

    /// Dense zero-based ordinal of this attribute in registry order.
    #[must_use]
    pub const fn ordinal(self) -> usize {
        self as usize
    }

    /// Looks up an attribute by ordinal. `None` only for an out-of-range
    /// ordinal.
    #[must_use]
    pub fn from_ordinal(ordinal: usize) -> Option<Self> {
        Self::iter().nth(ordinal)
    }

    /// Looks up an attribute by display name, case-insensitively. `None`
    /// (not an error) when the name matches nothing in the registry.
    #[must_use]
    pub fn lookup(name: &str) -> Option<Self> {
        name.parse().ok()
    }

    /// The attribute's display name.
    #[must_use]
    pub fn name(self) -> &'static str {
        self.into()
    }

    /// Column-alignment width for rendered labels: the longest display name
    /// in the registry plus a fixed gutter.
    #[must_use]
    pub fn label_pad_width() -> usize {
        let longest = Self::iter().map(|a| a.name().len()).max().unwrap_or(0);
        longest + LABEL_GUTTER
    }
}

/// The set of [`Attribute`]s currently selected for rendering.
///
/// Backed by a small bitset over the registry ordinals. The default
/// selection is the full registry, matching the behavior when no explicit
/// subset is requested.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AttributeMask(u8);

impl AttributeMask {
    /// The empty selection.
    pub const EMPTY: Self = Self(0);

    /// The full registry selection.
    pub const ALL: Self = Self((1 << Attribute::COUNT) - 1);

    /// Whether `attribute` is selected.
    #[must_use]
    pub const fn contains(self, attribute: Attribute) -> bool {
        self.0 & (1 << attribute.ordinal()) != 0
    }

    /// Adds `attribute` to the selection.
    pub fn insert(&mut self, attribute: Attribute) {
        self.0 |= 1 << attribute.ordinal();
    }

    /// Whether nothing is selected.
    #[must_use]
    pub const fn is_empty(self) -> bool {
        self.0 == 0
    }

    /// Parses an explicit attribute selection list.
    ///
    /// Names are separated by spaces, tabs, newlines, `.`, `,`, or `;`, and
    /// matched case-insensitively. Unrecognized names are silently ignored,
    /// so a list of only unknown names yields the empty selection.
    #[must_use]
    pub fn parse_selection(list: &str) -> Self {
        let mut mask = Self::EMPTY;
        for name in list.split([' ', '\t', '\n', '.', ',', ';']) {
            if name.is_empty() {
                continue;
            }
            if let Some(attribute) = Attribute::lookup(name) {
                mask.insert(attribute);
            } else {
                tracing::debug!(name, "ignoring unrecognized attribute name");
            }
        }
        mask
    }
}

impl Default for AttributeMask {
    fn default() -> Self {
        Self::ALL
    }
}

impl FromIterator<Attribute> for AttributeMask {
    fn from_iter<I: IntoIterator<Item = Attribute>>(iter: I) -> Self {
        let mut mask = Self::EMPTY;
        for attribute in iter {
            mask.insert(attribute);
        }
        mask
    }
}
