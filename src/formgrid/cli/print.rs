use colored::Colorize;
use console::Term;
use formgrid::api::{GridMessage, MessageLevel, TablePage};
use formgrid::collection::{DeletedInfo, HostRename, ItemView};
use formgrid::field::LabelSide;
use formgrid::table::cell_text;
use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

const MAX_CELL_WIDTH: usize = 40;
const FALLBACK_LINE_WIDTH: usize = 100;
const COLUMN_GAP: &str = "  ";

pub fn print_messages(messages: &[GridMessage]) {
    for message in messages {
        match message.level {
            MessageLevel::Info => println!("{}", message.content.dimmed()),
            MessageLevel::Success => println!("{}", message.content.green()),
            MessageLevel::Warning => println!("{}", message.content.yellow()),
            MessageLevel::Error => println!("{}", message.content.red()),
        }
    }
}

fn line_width() -> usize {
    let term = Term::stdout();
    if term.is_term() {
        term.size().1 as usize
    } else {
        FALLBACK_LINE_WIDTH
    }
}

pub fn print_table(page: &TablePage) {
    if page.rows.is_empty() {
        println!("No matching records found.");
        println!("{}", page.summary.to_string().dimmed());
        return;
    }

    let cells: Vec<Vec<String>> = page
        .rows
        .iter()
        .map(|row| {
            page.columns
                .iter()
                .map(|c| {
                    let text = cell_text(row.get(&c.key)).replace('\n', " ");
                    truncate_to_width(&text, MAX_CELL_WIDTH)
                })
                .collect()
        })
        .collect();

    let widths: Vec<usize> = page
        .columns
        .iter()
        .enumerate()
        .map(|(i, c)| {
            cells
                .iter()
                .map(|line| line[i].width())
                .chain(std::iter::once(c.header.width()))
                .max()
                .unwrap_or(0)
        })
        .collect();

    let max_width = line_width();
    let header: Vec<String> = page
        .columns
        .iter()
        .zip(&widths)
        .map(|(c, w)| pad_to_width(&c.header, *w))
        .collect();
    println!(
        "{}",
        truncate_to_width(header.join(COLUMN_GAP).trim_end(), max_width)
            .bold()
            .cyan()
    );

    for line in &cells {
        let padded: Vec<String> = line
            .iter()
            .zip(&widths)
            .map(|(cell, w)| pad_to_width(cell, *w))
            .collect();
        println!(
            "{}",
            truncate_to_width(padded.join(COLUMN_GAP).trim_end(), max_width)
        );
    }

    println!();
    println!("{}", page.summary.to_string().dimmed());
    if page.total_pages > 1 {
        println!("{}", page_buttons(page));
    }
}

fn page_buttons(page: &TablePage) -> String {
    let mut parts = Vec::new();
    if page.page > 0 {
        parts.push("<".to_string());
    }
    for n in page.window.clone() {
        let label = (n + 1).to_string();
        if n == page.page {
            parts.push(format!("[{}]", label).yellow().to_string());
        } else {
            parts.push(label);
        }
    }
    if page.page + 1 < page.total_pages {
        parts.push(">".to_string());
    }
    parts.join(" ")
}

pub fn print_fields(items: &[ItemView]) {
    if items.is_empty() {
        println!("No fields.");
        return;
    }
    for (i, item) in items.iter().enumerate() {
        let index = format!("{}. ", i).yellow();
        let key = if item.alt_key.is_empty() {
            item.key.bold().to_string()
        } else {
            format!("{} ({})", item.key.bold(), item.alt_key)
        };
        let value = format!("= {:?}", item.value.to_string());
        let delete = if item.show_delete {
            " [x]".red().to_string()
        } else {
            String::new()
        };
        match (&item.label_text, item.label_side) {
            (Some(label), LabelSide::Left) => {
                println!("{}{} {} {}{}", index, label.dimmed(), key, value, delete)
            }
            (Some(label), LabelSide::Right) => {
                println!("{}{} {} {}{}", index, key, value, label.dimmed(), delete)
            }
            (None, _) => println!("{}{} {}{}", index, key, value, delete),
        }
    }
}

pub fn print_host_patch(patch: &[HostRename]) {
    for rename in patch {
        println!(
            "{}",
            format!(
                "host[{}].{}: {} -> {}",
                rename.index, rename.attribute, rename.from, rename.to
            )
            .dimmed()
        );
    }
}

pub fn print_deleted(deleted: &[DeletedInfo]) {
    for info in deleted {
        let numeral = info
            .key_numeral
            .map(|n| n.to_string())
            .unwrap_or_else(|| "-".to_string());
        println!(
            "{}",
            format!("deleted #{} {} (numeral {})", info.index, info.key, numeral).dimmed()
        );
    }
}

fn pad_to_width(s: &str, width: usize) -> String {
    format!("{}{}", s, " ".repeat(width.saturating_sub(s.width())))
}

fn truncate_to_width(s: &str, max_width: usize) -> String {
    if s.width() <= max_width {
        return s.to_string();
    }

    let mut result = String::new();
    let mut current_width = 0;
    for c in s.chars() {
        let char_width = c.width().unwrap_or(0);
        if current_width + char_width > max_width.saturating_sub(1) {
            result.push('…');
            return result;
        }
        result.push(c);
        current_width += char_width;
    }
    result
}
