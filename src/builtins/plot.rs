//! Chart.js line and bar plots.
//!
//! Each plot is a sized `<div>` holding a `<canvas>` and an inline script
//! that builds the chart once the page has loaded. The Chart.js bundle is
//! declared as a resource so it lands in the page head exactly once, no
//! matter how many plots a page has.

use serde_json::{Value as Json, json};

use crate::fundsl::{CallError, KwArgs, Value};
use crate::render::Fragment;

/// Chart.js bundle every plot depends on.
pub const CHART_JS: &str = "https://cdn.jsdelivr.net/npm/chart.js@4.4.1/dist/chart.umd.min.js";

const DEFAULT_WIDTH: f64 = 600.0;
const DEFAULT_HEIGHT: f64 = 400.0;

/// `line(y, x?, title?, x_label?, y_label?, width?, height?)`
///
/// `x` defaults to `0..len(y)`.
pub fn line(args: &KwArgs) -> Result<Fragment, CallError> {
    let y = args.numbers("y")?;
    let x: Vec<Json> = match args.get("x") {
        Some(_) => {
            let x = args.seq("x")?;
            if x.len() != y.len() {
                return Err(CallError::custom(format!(
                    "`x` has {} values but `y` has {}",
                    x.len(),
                    y.len()
                )));
            }
            x.iter().map(Value::to_json).collect()
        }
        None => (0..y.len()).map(Json::from).collect(),
    };
    let title = args.opt_str("title")?;

    let config = json!({
        "type": "line",
        "data": {
            "labels": x,
            "datasets": [{
                "label": title.unwrap_or(""),
                "data": y,
                "fill": false,
            }],
        },
        "options": {
            "maintainAspectRatio": false,
            "plugins": plugins(title),
            "scales": {
                "x": axis(args.opt_str("x_label")?),
                "y": axis(args.opt_str("y_label")?),
            },
        },
    });
    embed(args, &config)
}

/// `bar(labels, values, title?, vertical?, width?, height?)`
///
/// Bars are horizontal unless `vertical` is set.
pub fn bar(args: &KwArgs) -> Result<Fragment, CallError> {
    let labels = args.labels("labels")?;
    let values = args.numbers("values")?;
    if labels.len() != values.len() {
        return Err(CallError::custom(format!(
            "`labels` has {} entries but `values` has {}",
            labels.len(),
            values.len()
        )));
    }
    let title = args.opt_str("title")?;
    let index_axis = match args.opt_bool("vertical")? {
        Some(true) => "x",
        _ => "y",
    };

    let config = json!({
        "type": "bar",
        "data": {
            "labels": labels,
            "datasets": [{
                "label": title.unwrap_or(""),
                "data": values,
            }],
        },
        "options": {
            "maintainAspectRatio": false,
            "indexAxis": index_axis,
            "plugins": plugins(title),
        },
    });
    embed(args, &config)
}

fn plugins(title: Option<&str>) -> Json {
    json!({
        "legend": { "display": false },
        "title": { "display": title.is_some(), "text": title.unwrap_or("") },
    })
}

fn axis(label: Option<&str>) -> Json {
    match label {
        Some(label) => json!({ "title": { "display": true, "text": label } }),
        None => json!({}),
    }
}

fn embed(args: &KwArgs, config: &Json) -> Result<Fragment, CallError> {
    let width = args.opt_f64("width")?.unwrap_or(DEFAULT_WIDTH);
    let height = args.opt_f64("height")?.unwrap_or(DEFAULT_HEIGHT);
    let id = format!("chart_{}", uuid::Uuid::new_v4().simple());
    // `</` would close the inline script early.
    let config = config.to_string().replace("</", "<\\/");

    let markup = format!(
        "<div class=\"chart\" style=\"position:relative;width:{width}px;height:{height}px\">\n\
         <canvas id=\"{id}\"></canvas>\n\
         </div>\n\
         <script>\n\
         document.addEventListener(\"DOMContentLoaded\", function () {{\n\
         new Chart(document.getElementById(\"{id}\"), {config});\n\
         }});\n\
         </script>"
    );
    Ok(Fragment::new(markup).with_resource(CHART_JS))
}
