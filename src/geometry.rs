//! Geometry adapter: surface nodes <-> logical cells
//!
//! The selection logic never touches rendering. A host implements
//! [`SurfaceLayout`] over whatever it renders (DOM rows and cells, a
//! canvas index, ...), and the two functions here translate in both
//! directions on top of it.

use serde::{Deserialize, Serialize};

use crate::models::{normalize_selection, CellPos, CellSelection};

/// Overlay rectangle in surface content coordinates (scroll-adjusted)
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct GeometryRect {
    pub top: f64,
    pub left: f64,
    pub width: f64,
    pub height: f64,
}

/// Viewport-relative box of a rendered node (like `getBoundingClientRect`)
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct BoxRect {
    pub top: f64,
    pub left: f64,
    pub right: f64,
    pub bottom: f64,
}

impl BoxRect {
    pub fn new(top: f64, left: f64, right: f64, bottom: f64) -> Self {
        Self { top, left, right, bottom }
    }
}

/// What the cell area needs from a rendered grid surface
pub trait SurfaceLayout {
    type Node: PartialEq;

    /// Nearest cell container enclosing `target` (or `target` itself)
    fn enclosing_cell(&self, target: &Self::Node) -> Option<Self::Node>;

    /// Row container enclosing a cell container
    fn enclosing_row(&self, cell: &Self::Node) -> Option<Self::Node>;

    /// Rendered row containers, in display order
    fn rendered_rows(&self) -> Vec<Self::Node>;

    /// Rendered cell containers of one row, in display order
    fn rendered_cells(&self, row: &Self::Node) -> Vec<Self::Node>;

    fn bounds(&self, node: &Self::Node) -> Option<BoxRect>;

    /// Box of the scrolling surface itself
    fn surface_bounds(&self) -> Option<BoxRect>;

    /// `(scroll_left, scroll_top)` of the surface
    fn scroll_offset(&self) -> (f64, f64);
}

/// Resolve the logical cell under `target`
///
/// `None` when the target is outside any cell (header, padding, scrollbar).
/// Indices come from display order, so this walks the rendered rows and
/// cells once per call.
pub fn locate_cell<S: SurfaceLayout + ?Sized>(surface: &S, target: &S::Node) -> Option<CellPos> {
    let cell = surface.enclosing_cell(target)?;
    let row = surface.enclosing_row(&cell)?;

    let row_index = surface.rendered_rows().iter().position(|r| *r == row)?;
    let col_index = surface.rendered_cells(&row).iter().position(|c| *c == cell)?;

    Some(CellPos::new(row_index, col_index))
}

/// On-surface rectangle covering a selection
///
/// `None` when either corner cell is not rendered (for example scrolled
/// out of a virtualized viewport).
pub fn compute_selection_rect<S: SurfaceLayout + ?Sized>(surface: &S, selection: &CellSelection) -> Option<GeometryRect> {
    let n = normalize_selection(selection);

    let rows = surface.rendered_rows();
    let (Some(start_row), Some(end_row)) = (rows.get(n.start_row), rows.get(n.end_row)) else {
        log::debug!("selection rect: rows {}..={} not rendered ({} rendered)", n.start_row, n.end_row, rows.len());
        return None;
    };

    let start_cells = surface.rendered_cells(start_row);
    let end_cells = surface.rendered_cells(end_row);
    let (Some(start_cell), Some(end_cell)) = (start_cells.get(n.start_col), end_cells.get(n.end_col)) else {
        log::debug!("selection rect: cols {}..={} not rendered", n.start_col, n.end_col);
        return None;
    };

    let start = surface.bounds(start_cell)?;
    let end = surface.bounds(end_cell)?;
    let body = surface.surface_bounds()?;
    let (scroll_left, scroll_top) = surface.scroll_offset();

    Some(GeometryRect {
        top: start.top - body.top + scroll_top,
        left: start.left - body.left + scroll_left,
        width: end.right - start.left,
        height: end.bottom - start.top,
    })
}

/// Node of a [`FixedLayout`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FixedNode {
    /// The surface background, outside every cell
    Surface,
    Row(usize),
    Cell { row: usize, col: usize },
    /// Something rendered inside a cell (text span, icon)
    Content { row: usize, col: usize },
}

/// Uniform grid layout: every row and every column the same size
///
/// Useful for canvas-style hosts and for exercising the controller
/// without a browser. Only the first `rendered_rows` rows exist,
/// which models a virtualized viewport.
#[derive(Debug, Clone, PartialEq)]
pub struct FixedLayout {
    pub rows: usize,
    pub cols: usize,
    pub rendered_rows: usize,
    pub row_height: f64,
    pub col_width: f64,
    /// Viewport position of the surface's top-left corner
    pub origin: (f64, f64),
    pub scroll_left: f64,
    pub scroll_top: f64,
}

impl FixedLayout {
    pub fn new(rows: usize, cols: usize, row_height: f64, col_width: f64) -> Self {
        Self {
            rows,
            cols,
            rendered_rows: rows,
            row_height,
            col_width,
            origin: (0.0, 0.0),
            scroll_left: 0.0,
            scroll_top: 0.0,
        }
    }

    pub fn scroll_to(&mut self, left: f64, top: f64) {
        self.scroll_left = left;
        self.scroll_top = top;
    }

    /// Node under a viewport point
    pub fn hit_test(&self, x: f64, y: f64) -> FixedNode {
        let content_x = x - self.origin.0 + self.scroll_left;
        let content_y = y - self.origin.1 + self.scroll_top;
        if content_x < 0.0 || content_y < 0.0 {
            return FixedNode::Surface;
        }

        let row = (content_y / self.row_height) as usize;
        let col = (content_x / self.col_width) as usize;
        if row >= self.rendered_rows.min(self.rows) || col >= self.cols {
            return FixedNode::Surface;
        }
        FixedNode::Content { row, col }
    }

    fn cell_box(&self, row: usize, col: usize) -> BoxRect {
        let top = self.origin.1 + row as f64 * self.row_height - self.scroll_top;
        let left = self.origin.0 + col as f64 * self.col_width - self.scroll_left;
        BoxRect::new(top, left, left + self.col_width, top + self.row_height)
    }
}

impl SurfaceLayout for FixedLayout {
    type Node = FixedNode;

    fn enclosing_cell(&self, target: &FixedNode) -> Option<FixedNode> {
        match *target {
            FixedNode::Cell { row, col } | FixedNode::Content { row, col } => Some(FixedNode::Cell { row, col }),
            _ => None,
        }
    }

    fn enclosing_row(&self, cell: &FixedNode) -> Option<FixedNode> {
        match *cell {
            FixedNode::Cell { row, .. } => Some(FixedNode::Row(row)),
            _ => None,
        }
    }

    fn rendered_rows(&self) -> Vec<FixedNode> {
        (0..self.rendered_rows.min(self.rows)).map(FixedNode::Row).collect()
    }

    fn rendered_cells(&self, row: &FixedNode) -> Vec<FixedNode> {
        match *row {
            FixedNode::Row(r) => (0..self.cols).map(|col| FixedNode::Cell { row: r, col }).collect(),
            _ => Vec::new(),
        }
    }

    fn bounds(&self, node: &FixedNode) -> Option<BoxRect> {
        match *node {
            FixedNode::Cell { row, col } | FixedNode::Content { row, col } => Some(self.cell_box(row, col)),
            FixedNode::Row(row) => {
                let first = self.cell_box(row, 0);
                Some(BoxRect::new(first.top, first.left, first.left + self.cols as f64 * self.col_width, first.bottom))
            }
            FixedNode::Surface => self.surface_bounds(),
        }
    }

    fn surface_bounds(&self) -> Option<BoxRect> {
        let (left, top) = self.origin;
        Some(BoxRect::new(
            top,
            left,
            left + self.cols as f64 * self.col_width,
            top + self.rows as f64 * self.row_height,
        ))
    }

    fn scroll_offset(&self) -> (f64, f64) {
        (self.scroll_left, self.scroll_top)
    }
}
