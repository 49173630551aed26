//! Cursor tree explanation for debugging scan plans
//!
//! Renders the shape of a cursor tree as indented text via the visitor
//! protocol. Combinators decide which children a visit descends into — a
//! concatenation shows only its active child, so the output reflects where
//! the scan currently is, not the full static plan.

use strand_db_core::{Cursor, CursorVisitor};

/// Visitor that renders the visited tree as one indented line per cursor.
#[derive(Debug, Default)]
pub struct PlanExplainer {
    depth: usize,
    lines: Vec<String>,
}

impl PlanExplainer {
    pub fn new() -> Self {
        Self::default()
    }

    /// The rendered plan text
    pub fn render(&self) -> String {
        self.lines.join("\n")
    }
}

impl CursorVisitor for PlanExplainer {
    fn visit_enter(&mut self, name: &str) -> bool {
        self.lines.push(format!("{}{name}", "  ".repeat(self.depth)));
        self.depth += 1;
        true
    }

    fn visit_leave(&mut self, _name: &str) -> bool {
        self.depth = self.depth.saturating_sub(1);
        true
    }
}

/// Render a cursor tree as indented text.
pub fn explain<T: Send>(cursor: &mut dyn Cursor<T>) -> String {
    let mut explainer = PlanExplainer::new();
    cursor.accept(&mut explainer);
    explainer.render()
}
