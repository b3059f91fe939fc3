// CSV Scanner
//
// Single pass over the input characters; no backtracking, no streaming.

/// One parsed CSV record
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CsvRecord {
    /// 1-based line where the record starts
    pub line: usize,
    pub fields: Vec<String>,
}

impl CsvRecord {
    pub fn get(&self, idx: usize) -> Option<&str> {
        self.fields.get(idx).map(String::as_str)
    }

    fn is_blank(&self) -> bool {
        self.fields.iter().all(|f| f.is_empty())
    }
}

const DELIMITER: char = ',';
const QUOTE: char = '"';
const BOM: char = '\u{feff}';

/// Parse CSV text into records
///
/// - `"` at the start of a field opens a quoted section, `""` inside it is a
///   literal quote, delimiters and line breaks inside it are kept
/// - `\n`, `\r\n` and `\r` terminate a record outside quotes
/// - an unterminated quote runs to the end of input
/// - fields are trimmed, blank records are dropped
pub fn parse_csv(input: &str) -> Vec<CsvRecord> {
    let mut records = Vec::new();
    let mut fields: Vec<String> = Vec::new();
    let mut field = String::new();

    let mut in_quotes = false;
    let mut field_started = false; // any non-whitespace seen in current field
    let mut line = 1usize;
    let mut record_line = 1usize;

    let mut chars = input.strip_prefix(BOM).unwrap_or(input).chars().peekable();

    while let Some(c) = chars.next() {
        if in_quotes {
            match c {
                QUOTE if chars.peek() == Some(&QUOTE) => {
                    chars.next();
                    field.push(QUOTE);
                }
                QUOTE => in_quotes = false,
                '\r' => {
                    if chars.peek() == Some(&'\n') {
                        chars.next();
                    }
                    line += 1;
                    field.push('\n');
                }
                '\n' => {
                    line += 1;
                    field.push('\n');
                }
                _ => field.push(c),
            }
            continue;
        }

        match c {
            QUOTE if !field_started => {
                in_quotes = true;
                field_started = true;
                field.clear();
            }
            DELIMITER => {
                fields.push(finish_field(&mut field));
                field_started = false;
            }
            '\r' | '\n' => {
                if c == '\r' && chars.peek() == Some(&'\n') {
                    chars.next();
                }
                fields.push(finish_field(&mut field));
                push_record(&mut records, record_line, std::mem::take(&mut fields));
                field_started = false;
                line += 1;
                record_line = line;
            }
            _ => {
                if !c.is_whitespace() {
                    field_started = true;
                }
                field.push(c);
            }
        }
    }

    if field_started || !field.is_empty() || !fields.is_empty() {
        fields.push(finish_field(&mut field));
        push_record(&mut records, record_line, fields);
    }

    records
}

fn finish_field(field: &mut String) -> String {
    let value = field.trim().to_string();
    field.clear();
    value
}

fn push_record(records: &mut Vec<CsvRecord>, line: usize, fields: Vec<String>) {
    let record = CsvRecord { line, fields };
    if !record.is_blank() {
        records.push(record);
    }
}
