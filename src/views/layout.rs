use crate::types::IssueLayout;

/// The five cycle layout renderers. Exactly one is mounted at a time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LayoutRenderer {
    List,
    Kanban,
    Calendar,
    Gantt,
    Spreadsheet,
}

impl LayoutRenderer {
    pub const ALL: [LayoutRenderer; 5] = [
        LayoutRenderer::List,
        LayoutRenderer::Kanban,
        LayoutRenderer::Calendar,
        LayoutRenderer::Gantt,
        LayoutRenderer::Spreadsheet,
    ];

    pub fn label(self) -> &'static str {
        match self {
            Self::List => "Cycle list layout",
            Self::Kanban => "Cycle kanban layout",
            Self::Calendar => "Cycle calendar layout",
            Self::Gantt => "Cycle gantt layout",
            Self::Spreadsheet => "Cycle spreadsheet layout",
        }
    }
}

/// Pick the renderer for the active layout.
///
/// An undefined layout (filters not loaded yet) or one this build does not
/// know renders nothing. Unknown values are logged, never surfaced as errors;
/// a layout added to [`IssueLayout`] needs an arm here or it stays blank.
pub fn dispatch(layout: Option<IssueLayout>) -> Option<LayoutRenderer> {
    match layout? {
        IssueLayout::List => Some(LayoutRenderer::List),
        IssueLayout::Kanban => Some(LayoutRenderer::Kanban),
        IssueLayout::Calendar => Some(LayoutRenderer::Calendar),
        IssueLayout::GanttChart => Some(LayoutRenderer::Gantt),
        IssueLayout::Spreadsheet => Some(LayoutRenderer::Spreadsheet),
        IssueLayout::Unknown => {
            tracing::warn!("layout: no renderer mapped for active layout, rendering nothing");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use super::*;

    #[test]
    fn each_known_layout_maps_to_one_renderer() {
        let cases = [
            (IssueLayout::List, LayoutRenderer::List),
            (IssueLayout::Kanban, LayoutRenderer::Kanban),
            (IssueLayout::Calendar, LayoutRenderer::Calendar),
            (IssueLayout::GanttChart, LayoutRenderer::Gantt),
            (IssueLayout::Spreadsheet, LayoutRenderer::Spreadsheet),
        ];
        for (layout, renderer) in cases {
            assert_eq!(dispatch(Some(layout)), Some(renderer));
        }
    }

    #[test]
    fn undefined_layout_renders_nothing() {
        assert_eq!(dispatch(None), None);
    }

    #[test]
    fn unknown_layout_renders_nothing() {
        assert_eq!(dispatch(Some(IssueLayout::Unknown)), None);
    }

    #[test]
    fn labels_are_distinct() {
        let labels: HashSet<_> = LayoutRenderer::ALL.iter().map(|r| r.label()).collect();
        assert_eq!(labels.len(), LayoutRenderer::ALL.len());
    }
}
