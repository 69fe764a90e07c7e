use crate::Statement;

/// Renders a statement plan as executable SQL text, one terminated
/// statement per line.
#[must_use]
pub fn render_plan(statements: &[Statement]) -> String {
    let mut rendered = String::new();
    for statement in statements {
        rendered.push_str(&statement.sql);
        rendered.push_str(";\n");
    }
    rendered
}
