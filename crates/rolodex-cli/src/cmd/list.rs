//! `rdx list`: addresses in name order with completeness and labels.

use crate::output::{OutputMode, Renderable, fail, render_list};
use clap::Args;
use rolodex_core::{Address, Settings, Store};
use serde::Serialize;
use std::io::{self, Write};

#[derive(Args, Debug, Default)]
pub struct ListArgs {
    /// Only addresses carrying this label.
    #[arg(short, long)]
    pub label: Option<String>,
}

/// One list row as rendered in every output mode.
#[derive(Debug, Clone, Serialize)]
pub struct AddressRow {
    pub id: i64,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub nickname: Option<String>,
    pub street: String,
    pub city: String,
    pub state: String,
    pub zipcode: String,
    pub complete: bool,
    pub labels: Vec<String>,
}

impl AddressRow {
    pub fn new(address: Address, labels: Vec<String>) -> Self {
        Self {
            id: address.id.get(),
            complete: address.is_complete(),
            nickname: address.nickname().map(str::to_string),
            name: address.name,
            street: address.street,
            city: address.city,
            state: address.state,
            zipcode: address.zipcode,
            labels,
        }
    }
}

impl Renderable for AddressRow {
    fn render_human(&self, w: &mut dyn Write) -> io::Result<()> {
        let marker = if self.complete { ' ' } else { '~' };
        write!(w, "{marker} {:>4}  {}", self.id, self.name)?;
        if let Some(nick) = &self.nickname {
            write!(w, " ({nick})")?;
        }
        if self.labels.is_empty() {
            writeln!(w)
        } else {
            writeln!(w, "  [{}]", self.labels.join(", "))
        }
    }

    fn render_json(&self, w: &mut dyn Write) -> io::Result<()> {
        serde_json::to_writer(&mut *w, self)?;
        writeln!(w)
    }

    fn render_table(&self, w: &mut dyn Write) -> io::Result<()> {
        writeln!(
            w,
            "{}\t{}\t{}\t{}",
            self.id,
            self.name,
            if self.complete { "complete" } else { "incomplete" },
            self.labels.join(",")
        )
    }

    fn table_headers() -> &'static [&'static str] {
        &["id", "name", "status", "labels"]
    }
}

fn load_rows<S: Store>(store: &S, label: Option<&str>) -> rolodex_core::Result<Vec<AddressRow>> {
    let addresses = match label {
        Some(name) => store.addresses_for_label(name)?,
        None => store.list_addresses()?,
    };
    addresses
        .into_iter()
        .map(|address| {
            let labels = store
                .labels_for(address.id)?
                .into_iter()
                .map(|label| label.name().to_string())
                .collect();
            Ok(AddressRow::new(address, labels))
        })
        .collect()
}

/// Execute `rdx list`.
///
/// # Errors
///
/// Returns an error if the store cannot be read or the label is unknown.
pub fn run_list(args: &ListArgs, output: OutputMode, settings: &Settings) -> anyhow::Result<()> {
    let store = super::open_store(settings, output)?;
    let rows = load_rows(&store, args.label.as_deref()).map_err(|err| fail(output, err))?;
    tracing::debug!(count = rows.len(), label = ?args.label, "listed addresses");
    render_list(&rows, output)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use rolodex_core::{AddressFields, Error, SqliteStore};

    fn store() -> SqliteStore {
        let store = SqliteStore::in_memory().expect("store");
        let bob = store
            .create_address(&AddressFields::new("Bob", "1 Main St", "X", "Y", "1"))
            .expect("bob");
        store
            .create_address(&AddressFields::named("Alice").with_nickname("Al"))
            .expect("alice");
        let label = store.create_label("Christmas 2024").expect("label");
        store.insert_association(&label, bob.id).expect("attach");
        store
    }

    #[test]
    fn rows_follow_list_order_and_carry_labels() {
        let rows = load_rows(&store(), None).expect("rows");
        let names: Vec<_> = rows.iter().map(|r| r.name.as_str()).collect();
        assert_eq!(names, vec!["Alice", "Bob"]);
        assert!(!rows[0].complete);
        assert_eq!(rows[0].nickname.as_deref(), Some("Al"));
        assert_eq!(rows[1].labels, vec!["Christmas 2024"]);
    }

    #[test]
    fn label_filter_narrows_rows() {
        let rows = load_rows(&store(), Some("Christmas 2024")).expect("rows");
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].name, "Bob");

        assert!(matches!(
            load_rows(&store(), Some("Easter")),
            Err(Error::LabelNotFound { .. })
        ));
    }

    #[test]
    fn human_row_marks_incomplete_records() {
        let rows = load_rows(&store(), None).expect("rows");
        let mut buf = Vec::new();
        rows[0].render_human(&mut buf).expect("render");
        let line = String::from_utf8(buf).expect("utf8");
        assert!(line.starts_with('~'));
        assert!(line.contains("Alice (Al)"));
    }
}
