use std::{collections::HashMap, sync::LazyLock};

use tera::{Tera, Value};

use crate::utils;

pub const COLLECTION_WHATSAPP: &str = "collection/whatsapp.txt";
pub const COLLECTION_EMAIL: &str = "collection/email.html";
pub const REPORT_SUMMARY: &str = "report/summary.typ";

/// Templates are embedded in the binary, html ones are autoescaped by tera
pub static TEMPLATES: LazyLock<Tera> = LazyLock::new(|| {
    let mut tera = Tera::default();
    tera.register_filter("typst", typst_filter);
    tera.add_raw_templates(vec![
        (
            COLLECTION_WHATSAPP,
            include_str!("../templates/collection/whatsapp.txt"),
        ),
        (
            COLLECTION_EMAIL,
            include_str!("../templates/collection/email.html"),
        ),
        (
            REPORT_SUMMARY,
            include_str!("../templates/report/summary.typ"),
        ),
    ])
    .expect("embedded templates must parse");
    tera
});

fn typst_filter(value: &Value, _: &HashMap<String, Value>) -> tera::Result<Value> {
    let escaped = match value {
        Value::String(text) => utils::escape_typst(text),
        Value::Null => String::new(),
        other => utils::escape_typst(&other.to_string()),
    };
    Ok(Value::String(escaped))
}
