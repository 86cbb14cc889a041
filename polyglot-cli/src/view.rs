use polyglot::{ResourceTranslation, store::ResourceFileSnapshot};
use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};
use uuid::Uuid;

const MAX_VALUE_WIDTH: usize = 50;

/// One printed line of a resource file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Row {
    /// The resource id `validate --resource` takes.
    pub resource_id: Uuid,
    pub key: String,
    pub language: String,
    pub value: String,
    pub status: String,
}

/// Rows of `snapshot`, one per translation, or one per resource when
/// `language` is given (missing translations show as `-`).
pub fn rows(snapshot: &ResourceFileSnapshot, language: Option<&str>) -> Vec<Row> {
    let mut rows = Vec::new();
    for resource in &snapshot.resources {
        let translations: Vec<&ResourceTranslation> = snapshot
            .translations
            .iter()
            .filter(|t| t.translatable_resource_id == resource.id)
            .filter(|t| language.is_none_or(|l| t.language == l))
            .collect();

        if translations.is_empty() {
            rows.push(Row {
                resource_id: resource.id,
                key: resource.key.clone(),
                language: language.unwrap_or("-").to_string(),
                value: resource.source_value.clone(),
                status: "source only".to_string(),
            });
            continue;
        }
        for translation in translations {
            let (value, kind) = match (&translation.validated_value, &translation.suggested_value) {
                (Some(v), _) if !v.is_empty() => (v.clone(), ""),
                (_, Some(s)) => (s.clone(), " (suggested)"),
                _ => (String::new(), ""),
            };
            rows.push(Row {
                resource_id: resource.id,
                key: resource.key.clone(),
                language: translation.language.clone(),
                value,
                status: format!("{}{}", translation.status, kind),
            });
        }
    }
    rows
}

/// Print `rows` as an aligned table.
pub fn print_view(snapshot: &ResourceFileSnapshot, language: Option<&str>, full: bool) {
    let rows = rows(snapshot, language);
    println!("=== {} ({}) ===", snapshot.file.name, snapshot.file.id);
    println!("Resources: {}", snapshot.resources.len());
    if rows.is_empty() {
        return;
    }

    let ids: Vec<String> = rows.iter().map(|r| r.resource_id.to_string()).collect();
    let id_width = column_width(ids.iter().map(String::as_str), "Resource");
    let key_width = column_width(rows.iter().map(|r| r.key.as_str()), "Key");
    let lang_width = column_width(rows.iter().map(|r| r.language.as_str()), "Lang");
    let status_width = column_width(rows.iter().map(|r| r.status.as_str()), "Status");

    println!();
    println!(
        "{}  {}  {}  {}  Value",
        pad("Resource", id_width),
        pad("Key", key_width),
        pad("Lang", lang_width),
        pad("Status", status_width)
    );
    for (row, id) in rows.iter().zip(&ids) {
        let value = if full {
            row.value.clone()
        } else {
            truncate(&row.value, MAX_VALUE_WIDTH)
        };
        println!(
            "{}  {}  {}  {}  {}",
            pad(id, id_width),
            pad(&row.key, key_width),
            pad(&row.language, lang_width),
            pad(&row.status, status_width),
            value.replace('\n', "\\n")
        );
    }
}

fn column_width<'a>(values: impl Iterator<Item = &'a str>, header: &str) -> usize {
    values.map(UnicodeWidthStr::width).fold(header.width(), usize::max)
}

/// Pads `text` with spaces to `width` display columns.
pub fn pad(text: &str, width: usize) -> String {
    let padding = width.saturating_sub(text.width());
    format!("{}{}", text, " ".repeat(padding))
}

/// Cuts `text` to at most `max_width` display columns, ending with `...` when cut.
pub fn truncate(text: &str, max_width: usize) -> String {
    if text.width() <= max_width {
        return text.to_string();
    }
    let budget = max_width.saturating_sub(3);
    let mut width = 0;
    let mut out = String::new();
    for c in text.chars() {
        let w = c.width().unwrap_or(0);
        if width + w > budget {
            break;
        }
        width += w;
        out.push(c);
    }
    out.push_str("...");
    out
}
