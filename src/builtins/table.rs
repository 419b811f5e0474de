//! HTML tables from nested lists or dicts.

use crate::fundsl::{CallError, KwArgs, Value};
use crate::render::tag::{NestedTag, Tag};
use crate::render::{Fragment, Render};

/// `table(rows, header?, caption?)`
///
/// `rows` is a list of lists; cells are rendered with their display form
/// and escaped. Rows may differ in length. A dict gives one row per entry,
/// the key as a `<th>` followed by the value.
pub fn table(args: &KwArgs) -> Result<Fragment, CallError> {
    let mut table = NestedTag::new("table");

    if let Some(caption) = args.opt_str("caption")? {
        table = table.child(Tag::new("caption").text(caption));
    }

    if args.get("header").is_some() {
        let header = row("th", args.seq("header")?);
        table = table.child(NestedTag::new("thead").child(header));
    }

    let body = match args.require("rows")? {
        Value::Map(entries) => entries.iter().fold(NestedTag::new("tbody"), |body, (key, value)| {
            body.child(
                NestedTag::new("tr")
                    .child(Tag::new("th").text(&key.to_string()))
                    .child(Tag::new("td").text(&value.to_string())),
            )
        }),
        _ => {
            let mut body = NestedTag::new("tbody");
            for (i, cells) in args.seq("rows")?.iter().enumerate() {
                let cells = cells.as_seq().ok_or_else(|| CallError::TypeMismatch {
                    name: format!("rows[{i}]"),
                    expected: "list",
                    found: cells.type_name(),
                })?;
                body = body.child(row("td", cells));
            }
            body
        }
    };
    table = table.child(body);

    table.render().map_err(|e| CallError::Host(Box::new(e)))
}

fn row(cell: &str, values: &[Value]) -> NestedTag<'static> {
    values.iter().fold(NestedTag::new("tr"), |tr, value| {
        tr.child(Tag::new(cell).text(&value.to_string()))
    })
}
