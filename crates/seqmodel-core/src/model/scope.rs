//! Combined fragments (opt/alt/loop/par/break) recovered from frame shapes.

use std::{fmt, str::FromStr};

use crate::geometry::{Bounds, Point};

/// The operator of a combined fragment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ScopeKind {
    Optional,
    Alternative,
    Loop,
    Parallel,
    Break,
}

impl ScopeKind {
    /// The short operator keyword used in event suffixes (`opt`, `alt`, ...).
    pub fn keyword(self) -> &'static str {
        match self {
            ScopeKind::Optional => "opt",
            ScopeKind::Alternative => "alt",
            ScopeKind::Loop => "loop",
            ScopeKind::Parallel => "par",
            ScopeKind::Break => "break",
        }
    }

    /// Recognize the operator from the first word of a frame caption.
    ///
    /// Matching is case-insensitive and accepts both the UML short keyword
    /// and the spelled-out form. Only the leading alphabetic run is
    /// considered, so `opt[x=1]` and `LOOP 1..n` match while `options`
    /// and `parser` do not.
    ///
    /// # Examples
    ///
    /// ```
    /// # use seqmodel_core::model::ScopeKind;
    /// assert_eq!(ScopeKind::from_caption("opt [valid=1]"), Some(ScopeKind::Optional));
    /// assert_eq!(ScopeKind::from_caption("Alternative"), Some(ScopeKind::Alternative));
    /// assert_eq!(ScopeKind::from_caption("parser"), None);
    /// ```
    pub fn from_caption(caption: &str) -> Option<Self> {
        let word: String = caption
            .trim_start()
            .chars()
            .take_while(|c| c.is_ascii_alphabetic())
            .collect();
        word.to_ascii_lowercase().parse().ok()
    }
}

impl FromStr for ScopeKind {
    type Err = &'static str;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "opt" | "optional" => Ok(ScopeKind::Optional),
            "alt" | "alternative" => Ok(ScopeKind::Alternative),
            "loop" => Ok(ScopeKind::Loop),
            "par" | "parallel" => Ok(ScopeKind::Parallel),
            "break" => Ok(ScopeKind::Break),
            _ => Err("Invalid fragment operator"),
        }
    }
}

impl fmt::Display for ScopeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.keyword())
    }
}

/// A combined fragment with its absolute bounds and optional guard.
///
/// The guard is write-once: [`Scope::try_set_guard`] is the only way to
/// assign it and it refuses once a guard is present.
#[derive(Debug, Clone, PartialEq)]
pub struct Scope {
    id: String,
    kind: ScopeKind,
    ordinal: usize,
    bounds: Bounds,
    guard: Option<String>,
}

impl Scope {
    /// Create a scope without a guard.
    ///
    /// `ordinal` is 1-based and counted per kind.
    pub fn new(id: impl Into<String>, kind: ScopeKind, ordinal: usize, bounds: Bounds) -> Self {
        Self {
            id: id.into(),
            kind,
            ordinal,
            bounds,
            guard: None,
        }
    }

    /// Id of the frame node.
    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn kind(&self) -> ScopeKind {
        self.kind
    }

    pub fn ordinal(&self) -> usize {
        self.ordinal
    }

    /// Absolute bounds of the frame.
    pub fn bounds(&self) -> Bounds {
        self.bounds
    }

    pub fn guard(&self) -> Option<&str> {
        self.guard.as_deref()
    }

    pub fn has_guard(&self) -> bool {
        self.guard.is_some()
    }

    /// Event name suffix combining kind and ordinal, e.g. `_opt1`.
    pub fn suffix(&self) -> String {
        format!("_{}{}", self.kind.keyword(), self.ordinal)
    }

    /// Assign the guard unless one is already present.
    ///
    /// Returns `true` when the assignment took effect. Empty guards are
    /// ignored and reported as not taking effect.
    pub fn try_set_guard(&mut self, guard: impl Into<String>) -> bool {
        let guard = guard.into();
        if self.guard.is_some() || guard.trim().is_empty() {
            return false;
        }
        self.guard = Some(guard);
        true
    }

    /// True when a caption positioned at `point` belongs to this frame.
    pub fn captures_label(&self, point: Point, tolerance: f32) -> bool {
        self.bounds.contains_with_top_tolerance(point, tolerance)
    }
}

/// Index of the innermost scope whose vertical span contains `y`.
///
/// Nesting is approximated by height: among all scopes spanning `y`, the
/// one with the smallest bounding-box height wins, and ties go to the scope
/// discovered first. Sibling frames of unusual aspect ratio can therefore be
/// misattributed; there is no explicit containment graph.
///
/// # Examples
///
/// ```
/// # use seqmodel_core::geometry::{Bounds, Point, Size};
/// # use seqmodel_core::model::{innermost_scope, Scope, ScopeKind};
/// let outer = Scope::new("o", ScopeKind::Loop, 1,
///     Bounds::new_from_top_left(Point::new(0.0, 0.0), Size::new(400.0, 300.0)));
/// let inner = Scope::new("i", ScopeKind::Optional, 1,
///     Bounds::new_from_top_left(Point::new(20.0, 100.0), Size::new(300.0, 50.0)));
/// let scopes = [outer, inner];
///
/// assert_eq!(innermost_scope(&scopes, 120.0), Some(1));
/// assert_eq!(innermost_scope(&scopes, 20.0), Some(0));
/// assert_eq!(innermost_scope(&scopes, 320.0), None);
/// ```
pub fn innermost_scope(scopes: &[Scope], y: f32) -> Option<usize> {
    let mut best: Option<(usize, f32)> = None;
    for (index, scope) in scopes.iter().enumerate() {
        if !scope.bounds.contains_y(y) {
            continue;
        }
        let height = scope.bounds.height();
        match best {
            Some((_, best_height)) if height >= best_height => {}
            _ => best = Some((index, height)),
        }
    }
    best.map(|(index, _)| index)
}
