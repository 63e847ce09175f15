//! `rdx labels`: label inventory with usage counts.

use crate::output::{OutputMode, Renderable, fail, render_list};
use rolodex_core::{LabelCount, Settings, Store};
use std::io::{self, Write};

impl Renderable for LabelCount {
    fn render_human(&self, w: &mut dyn Write) -> io::Result<()> {
        writeln!(w, "{:>5}  {}", self.count, self.name)
    }

    fn render_json(&self, w: &mut dyn Write) -> io::Result<()> {
        serde_json::to_writer(&mut *w, self)?;
        writeln!(w)
    }

    fn render_table(&self, w: &mut dyn Write) -> io::Result<()> {
        writeln!(w, "{}\t{}", self.name, self.count)
    }

    fn table_headers() -> &'static [&'static str] {
        &["label", "count"]
    }
}

/// Execute `rdx labels`.
///
/// # Errors
///
/// Returns an error if the store cannot be read.
pub fn run_labels(output: OutputMode, settings: &Settings) -> anyhow::Result<()> {
    let store = super::open_store(settings, output)?;
    let labels = store
        .list_labels_with_counts()
        .map_err(|err| fail(output, err))?;
    render_list(&labels, output)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn table_row_is_tab_separated() {
        let row = LabelCount {
            name: "Christmas 2023".into(),
            count: 7,
        };
        let mut buf = Vec::new();
        row.render_table(&mut buf).expect("render");
        assert_eq!(String::from_utf8(buf).expect("utf8"), "Christmas 2023\t7\n");
    }
}
