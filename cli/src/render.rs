//! Plain-text drawing of an `AppView`.

use todo_core::view::{AppView, ItemView};

fn item_line(out: &mut String, item: &ItemView) {
    let check = if item.completed { "[x]" } else { "[ ]" };
    let line = match &item.edit_buffer {
        Some(buffer) => format!("  {check} {:>4}  > {buffer}_", item.id),
        None => format!("  {check} {:>4}  {}", item.id, item.title),
    };
    out.push_str(&line);
    if item.loading {
        out.push_str("  (saving...)");
    }
    out.push('\n');
}

pub fn render(view: &AppView) -> String {
    let mut out = String::from("todos\n");

    let toggle = match (view.header.show_toggle_all, view.header.toggle_all_active) {
        (false, _) => "   ",
        (true, true) => "(v)",
        (true, false) => "( )",
    };
    let draft = if view.header.draft.is_empty() {
        "What needs to be done?"
    } else {
        view.header.draft.as_str()
    };
    let adding = if view.header.input_disabled { "  (adding...)" } else { "" };
    out.push_str(&format!("{toggle} {draft}{adding}\n"));

    for item in &view.items {
        item_line(&mut out, item);
    }
    if let Some(pending) = &view.pending {
        item_line(&mut out, pending);
    }

    if let Some(footer) = &view.footer {
        let links: Vec<String> = footer
            .links
            .iter()
            .map(|link| {
                if link.selected {
                    format!("[{}]", link.label)
                } else {
                    link.label.to_string()
                }
            })
            .collect();
        out.push_str(&format!("{} | {}", footer.items_left(), links.join(" ")));
        if footer.clear_completed_enabled {
            out.push_str(" | Clear completed");
        }
        out.push('\n');
    }

    if let Some(error) = view.error {
        out.push_str(&format!("! {error}\n"));
    }
    out
}
