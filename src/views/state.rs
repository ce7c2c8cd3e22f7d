use crate::types::{GroupedIssueIds, LoaderPhase};

/// What the cycle view shows, derived from store state it does not own.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ViewState {
    Loading,
    Empty,
    Populated,
}

impl ViewState {
    /// Classify from the store's loading phase and grouped collection.
    ///
    /// A loaded collection with zero groups is `Empty` whatever the phase.
    /// Otherwise the view stays `Loading` until something was loaded at least
    /// once; a `Mutating` refresh keeps the previous content visible.
    pub fn classify(phase: LoaderPhase, grouped: Option<&GroupedIssueIds>) -> Self {
        match grouped {
            Some(g) if g.is_empty() => Self::Empty,
            None => Self::Loading,
            Some(_) if phase == LoaderPhase::Initial => Self::Loading,
            Some(_) => Self::Populated,
        }
    }

    pub fn is_loading(self) -> bool {
        self == Self::Loading
    }
}
