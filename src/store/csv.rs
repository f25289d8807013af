//! Minimal CSV row codec.
//!
//! Writes rows the way common CSV writers do (minimal quoting, `\r\n`
//! terminators) and reads them back, including quoted fields that span
//! lines. Good enough for the three small tables the store keeps.

/// Encode one row, including the trailing `\r\n`.
pub fn encode_row<S: AsRef<str>>(fields: &[S]) -> String {
    let mut line = String::new();

    for (i, field) in fields.iter().enumerate() {
        if i > 0 {
            line.push(',');
        }
        let field = field.as_ref();
        if needs_quoting(field) {
            line.push('"');
            line.push_str(&field.replace('"', "\"\""));
            line.push('"');
        } else {
            line.push_str(field);
        }
    }

    line.push_str("\r\n");
    line
}

fn needs_quoting(field: &str) -> bool {
    field.contains([',', '"', '\r', '\n'])
}

/// Decode a whole table into rows of fields.
///
/// Blank lines come back as empty rows so callers can skip them together
/// with other short rows. A quote only opens a quoted field when it is the
/// first character of the field; anywhere else it is kept as text. A
/// trailing unterminated quote is closed at end of input.
pub fn decode_rows(content: &str) -> Vec<Vec<String>> {
    let mut rows = Vec::new();
    let mut row: Vec<String> = Vec::new();
    let mut field = String::new();
    let mut in_quotes = false;
    let mut row_started = false;
    let mut field_started = false;

    let mut chars = content.chars().peekable();
    while let Some(c) = chars.next() {
        if in_quotes {
            match c {
                '"' if chars.peek() == Some(&'"') => {
                    chars.next();
                    field.push('"');
                }
                '"' => in_quotes = false,
                other => field.push(other),
            }
            continue;
        }

        match c {
            '"' if !field_started => {
                in_quotes = true;
                row_started = true;
                field_started = true;
            }
            ',' => {
                row.push(std::mem::take(&mut field));
                row_started = true;
                field_started = false;
            }
            '\r' if chars.peek() == Some(&'\n') => {}
            '\n' | '\r' => {
                if row_started || !field.is_empty() {
                    row.push(std::mem::take(&mut field));
                }
                rows.push(std::mem::take(&mut row));
                row_started = false;
                field_started = false;
            }
            other => {
                field.push(other);
                row_started = true;
                field_started = true;
            }
        }
    }

    if row_started || !field.is_empty() {
        row.push(field);
        rows.push(row);
    }

    rows
}
