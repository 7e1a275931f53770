//! Minimal RFC4180-style CSV output for schedule exports.

pub fn csv_quote(s: &str) -> String {
    if s.contains(',') || s.contains('"') || s.contains('\n') || s.contains('\r') {
        format!("\"{}\"", s.replace('"', "\"\""))
    } else {
        s.to_string()
    }
}

/// Serialize a header row plus data rows. Every line, including the last,
/// ends with a newline.
pub fn to_csv(headers: &[String], rows: &[Vec<String>]) -> String {
    let mut out = String::new();
    push_record(&mut out, headers);
    for row in rows {
        push_record(&mut out, row);
    }
    out
}

fn push_record(out: &mut String, fields: &[String]) {
    for (i, f) in fields.iter().enumerate() {
        if i > 0 {
            out.push(',');
        }
        out.push_str(&csv_quote(f));
    }
    out.push('\n');
}

#[cfg(test)]
pub fn parse_csv_record(line: &str) -> Vec<String> {
    let mut out: Vec<String> = Vec::new();
    let mut buf = String::new();
    let mut in_quotes = false;
    let chars: Vec<char> = line.chars().collect();
    let mut i = 0usize;
    while i < chars.len() {
        let ch = chars[i];
        if ch == '"' {
            if in_quotes && i + 1 < chars.len() && chars[i + 1] == '"' {
                buf.push('"');
                i += 2;
                continue;
            }
            in_quotes = !in_quotes;
            i += 1;
            continue;
        }
        if ch == ',' && !in_quotes {
            out.push(buf);
            buf = String::new();
            i += 1;
            continue;
        }
        buf.push(ch);
        i += 1;
    }
    out.push(buf);
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plain_fields_are_not_quoted() {
        assert_eq!(csv_quote("Algebra I"), "Algebra I");
    }

    #[test]
    fn comma_quote_and_newline_trigger_quoting() {
        assert_eq!(csv_quote("Lee, Anna"), "\"Lee, Anna\"");
        assert_eq!(
            csv_quote("He said \"hi\", ok"),
            "\"He said \"\"hi\"\", ok\""
        );
        assert_eq!(csv_quote("a\nb"), "\"a\nb\"");
    }

    #[test]
    fn quoted_field_round_trips_through_a_conformant_parser() {
        let original = "He said \"hi\", ok";
        let line = format!("{},{}", csv_quote("x"), csv_quote(original));
        let fields = parse_csv_record(&line);
        assert_eq!(fields, vec!["x".to_string(), original.to_string()]);
    }

    #[test]
    fn output_ends_with_trailing_newline() {
        let headers = vec!["A".to_string(), "B".to_string()];
        let rows = vec![vec!["1".to_string(), "2".to_string()]];
        assert_eq!(to_csv(&headers, &rows), "A,B\n1,2\n");
    }
}
