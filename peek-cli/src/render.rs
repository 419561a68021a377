use peek_core::{previewable::object_url::DiskObjectUrls, PreviewState};

const DATA_URL_SHOWN: usize = 48;

/// Renders a preview state for a terminal. `Empty` renders nothing.
///
/// Errors are rendered like every other state; callers decide which stream they go to.
pub fn render(state: &PreviewState) -> Option<String> {
    match state {
        PreviewState::Empty => None,
        PreviewState::Image { data_url } => {
            let shown: String = data_url.chars().take(DATA_URL_SHOWN).collect();
            let ellipsis = if data_url.len() > shown.len() { "..." } else { "" };
            Some(format!("[image] {}{} ({} bytes)", shown, ellipsis, data_url.len()))
        }
        PreviewState::Embed { blob_url, media_type } => {
            let mut out = format!("[document] {}\n  {}", media_type, blob_url);
            if let Some(path) = DiskObjectUrls::path_of(blob_url) {
                out.push_str(&format!("\n  open or print with your viewer: {}", path));
            }
            Some(out)
        }
        PreviewState::Table { rows } => Some(render_table(rows)),
        PreviewState::Text { content } => Some(content.clone()),
        PreviewState::Error { message } => Some(format!("error: {}", message)),
    }
}

/// Lays the rows out as aligned columns. Short rows end early.
pub fn render_table<T: ToString>(rows: &[Vec<T>]) -> String {
    let cells: Vec<Vec<String>> = rows.iter()
        .map(|row| row.iter().map(|cell| cell.to_string().replace('\n', " ")).collect())
        .collect();
    let columns = cells.iter().map(Vec::len).max().unwrap_or(0);
    let mut widths = vec![0; columns];
    for row in &cells {
        for (i, cell) in row.iter().enumerate() {
            widths[i] = widths[i].max(cell.chars().count());
        }
    }

    let mut lines = Vec::with_capacity(cells.len());
    for row in &cells {
        let line = row.iter()
            .zip(&widths)
            .map(|(cell, width)| format!("{:<width$}", cell, width = *width))
            .collect::<Vec<_>>()
            .join(" | ");
        lines.push(line.trim_end().to_string());
    }
    lines.join("\n")
}
