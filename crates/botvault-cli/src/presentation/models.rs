//! Model catalog display.

use std::fmt::Write as _;

use botvault_core::ModelDescriptor;

#[allow(clippy::cast_precision_loss)]
fn format_size(bytes: Option<u64>) -> String {
    match bytes {
        Some(b) if b >= 1_000_000_000 => format!("{:.1} GB", b as f64 / 1e9),
        Some(b) => format!("{:.0} MB", b as f64 / 1e6),
        None => "-".to_string(),
    }
}

/// Render the catalog as a table, marking the selected model.
pub fn format_model_table(models: &[ModelDescriptor], selected: &str) -> String {
    if models.is_empty() {
        return "No models available. Pull one with `ollama pull <model>`.\n".to_string();
    }

    let width = models
        .iter()
        .map(|m| m.name.len())
        .max()
        .unwrap_or(0)
        .max("NAME".len());

    let mut table = format!("  {:<width$}  {:>8}  MODIFIED\n", "NAME", "SIZE");
    for model in models {
        let marker = if model.name == selected { '*' } else { ' ' };
        let modified = model
            .modified_at
            .as_deref()
            .and_then(|m| m.get(..10))
            .unwrap_or("-");
        let _ = writeln!(
            table,
            "{marker} {:<width$}  {:>8}  {modified}",
            model.name,
            format_size(model.size)
        );
    }
    table
}
