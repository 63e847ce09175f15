//! `rdx show`: the detail view of one address.

use crate::output::{OutputMode, fail, pretty_kv, pretty_rule, pretty_section, render_mode};
use chrono::{DateTime, Local, Utc};
use clap::Args;
use rolodex_core::focus::DetailView;
use rolodex_core::{AddressId, DetailLine, Settings, Store};
use serde::Serialize;
use std::io::Write;

#[derive(Args, Debug)]
pub struct ShowArgs {
    /// Address id (see `rdx list`).
    pub id: AddressId,
}

/// Full address detail as returned in JSON output.
#[derive(Debug, Serialize)]
pub struct ShowAddress {
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
    pub detail: Vec<DetailLine>,
    pub updated_at_us: i64,
}

impl From<DetailView> for ShowAddress {
    fn from(view: DetailView) -> Self {
        let DetailView {
            address,
            labels,
            lines,
        } = view;
        Self {
            id: address.id.get(),
            complete: address.is_complete(),
            nickname: address.nickname().map(str::to_string),
            updated_at_us: address.updated_at.timestamp_micros(),
            name: address.name,
            street: address.street,
            city: address.city,
            state: address.state,
            zipcode: address.zipcode,
            labels: labels.iter().map(|l| l.name().to_string()).collect(),
            detail: lines,
        }
    }
}

fn micros_to_local_datetime(us: i64) -> String {
    DateTime::<Utc>::from_timestamp_micros(us).map_or_else(
        || us.to_string(),
        |ts| {
            ts.with_timezone(&Local)
                .format("%Y-%m-%d %H:%M:%S")
                .to_string()
        },
    )
}

/// Load the detail view for `id`.
///
/// # Errors
///
/// Returns [`rolodex_core::Error::NotFound`] for an unknown id.
pub fn load_show<S: Store>(store: &S, id: AddressId) -> rolodex_core::Result<ShowAddress> {
    let address = store.get_address(id)?;
    Ok(DetailView::load(store, &address)?.into())
}

/// Execute `rdx show <id>`.
///
/// # Errors
///
/// Returns an error if the address does not exist or output fails.
pub fn run_show(args: &ShowArgs, output: OutputMode, settings: &Settings) -> anyhow::Result<()> {
    let store = super::open_store(settings, output)?;
    let show = load_show(&store, args.id).map_err(|err| fail(output, err))?;

    render_mode(
        output,
        &show,
        |item, w| render_show_text(item, w),
        |item, w| render_show_human(item, w),
    )
}

fn render_show_human(item: &ShowAddress, w: &mut dyn Write) -> std::io::Result<()> {
    pretty_section(w, &format!("Address {}", item.id))?;
    writeln!(w, "{}", item.name)?;
    pretty_rule(w)?;
    for line in &item.detail {
        writeln!(w, "{}", line.text)?;
    }
    pretty_rule(w)?;
    pretty_kv(
        w,
        "status",
        if item.complete { "complete" } else { "incomplete" },
    )?;
    pretty_kv(w, "updated", micros_to_local_datetime(item.updated_at_us))
}

fn render_show_text(item: &ShowAddress, w: &mut dyn Write) -> std::io::Result<()> {
    writeln!(w, "id:        {}", item.id)?;
    writeln!(w, "name:      {}", item.name)?;
    if let Some(nick) = &item.nickname {
        writeln!(w, "nickname:  {nick}")?;
    }
    writeln!(w, "street:    {}", item.street)?;
    writeln!(w, "city:      {}", item.city)?;
    writeln!(w, "state:     {}", item.state)?;
    writeln!(w, "zipcode:   {}", item.zipcode)?;
    writeln!(w, "labels:    {}", item.labels.join(", "))?;
    writeln!(w, "updated:   {}", micros_to_local_datetime(item.updated_at_us))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rolodex_core::{AddressFields, Error, SqliteStore};

    #[test]
    fn show_includes_detail_lines_and_labels() {
        let store = SqliteStore::in_memory().expect("store");
        let bob = store
            .create_address(&AddressFields::new("Bob", "1 Main St", "X", "Y", "1").with_nickname("Bobby"))
            .expect("bob");
        let label = store.create_label("Christmas 2024").expect("label");
        store.insert_association(&label, bob.id).expect("attach");

        let show = load_show(&store, bob.id).expect("show");
        let texts: Vec<_> = show.detail.iter().map(|l| l.text.as_str()).collect();
        assert_eq!(
            texts,
            vec!["Bobby", "", "1 Main St", "X, Y 1", "", "Christmas 2024"]
        );
        assert!(show.complete);

        let mut buf = Vec::new();
        render_show_text(&show, &mut buf).expect("render");
        let text = String::from_utf8(buf).expect("utf8");
        assert!(text.contains("nickname:  Bobby"));
        assert!(text.contains("labels:    Christmas 2024"));
    }

    #[test]
    fn unknown_id_is_not_found() {
        let store = SqliteStore::in_memory().expect("store");
        assert!(matches!(
            load_show(&store, AddressId::new(5)),
            Err(Error::NotFound { .. })
        ));
    }
}
