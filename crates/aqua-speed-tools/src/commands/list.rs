//! Node list command

use anyhow::Result;
use aqua_core::{NodeList, ToolsConfig};
use console::Term;
use tabled::{settings::Style, Table, Tabled};

use crate::output;

/// One table row; `#` is the number accepted by `test`
#[derive(Tabled, Debug)]
pub struct NodeRow {
    #[tabled(rename = "#")]
    index: usize,
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "ISP")]
    isp: String,
    #[tabled(rename = "Node Type")]
    node_type: String,
    #[tabled(rename = "Required Traffic")]
    required_traffic: String,
    #[tabled(rename = "ID")]
    id: String,
}

pub fn run(nodes: &NodeList, config: &ToolsConfig) -> Result<()> {
    output::header(&format!("Available nodes ({})", nodes.len()));

    let pages = render_pages(build_rows(nodes), config.display.page_size);
    let interactive = Term::stdout().is_term();
    let total = pages.len();

    for (i, page) in pages.iter().enumerate() {
        println!("{}", page);
        if total > 1 {
            println!("Page {}/{}", i + 1, total);
            if interactive && i + 1 < total {
                output::info("Press Enter for the next page");
                Term::stdout().read_line()?;
            }
        }
    }

    Ok(())
}

/// Rows in display order, numbered from 1
pub fn build_rows(nodes: &NodeList) -> Vec<NodeRow> {
    nodes
        .sorted()
        .into_iter()
        .enumerate()
        .map(|(i, node)| NodeRow {
            index: i + 1,
            name: node.name.display().to_string(),
            isp: node.isp.display().to_string(),
            node_type: node.geo_info.kind.to_uppercase(),
            required_traffic: format_traffic(node.size.required_traffic_bytes()),
            id: node.id.clone(),
        })
        .collect()
}

/// Split rows into rendered tables of at most `page_size` rows each.
/// A page size of zero renders everything at once.
pub fn render_pages(rows: Vec<NodeRow>, page_size: usize) -> Vec<String> {
    if rows.is_empty() {
        return Vec::new();
    }
    let page_size = if page_size == 0 { rows.len() } else { page_size };

    let mut pages = Vec::new();
    let mut rows = rows.into_iter().peekable();
    while rows.peek().is_some() {
        let chunk: Vec<NodeRow> = rows.by_ref().take(page_size).collect();
        pages.push(Table::new(chunk).with(Style::rounded()).to_string());
    }
    pages
}

/// Decimal (SI) byte size, e.g. `400.00 MB`
pub fn format_traffic(bytes: u64) -> String {
    const UNITS: &[&str] = &["B", "KB", "MB", "GB", "TB"];
    let mut size = bytes as f64;
    let mut unit_index = 0;

    while size >= 1000.0 && unit_index < UNITS.len() - 1 {
        size /= 1000.0;
        unit_index += 1;
    }

    format!("{:.2} {}", size, UNITS[unit_index])
}
