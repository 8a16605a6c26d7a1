//! Splits migration file content into individually executable statements.
//!
//! The separator is `;`, but only outside of:
//! - single-quoted literals (`''` escapes a quote),
//! - double-quoted identifiers,
//! - `--` line comments and `/* */` block comments (nesting allowed),
//! - dollar-quoted bodies (`$$ ... $$`, `$tag$ ... $tag$`).
//!
//! Backslash escapes inside `E'...'` literals are not understood; write
//! `''` instead. Fragments made only of whitespace and comments are dropped.

/// Character separating statements in a migration file
pub const STATEMENT_SEPARATOR: u8 = b';';

/// Split `sql` into trimmed statements, in file order.
pub fn split_statements(sql: &str) -> Vec<&str> {
    let bytes = sql.as_bytes();
    let mut statements = Vec::new();
    let mut start = 0;
    let mut has_code = false;
    let mut i = 0;

    while i < bytes.len() {
        match bytes[i] {
            quote @ (b'\'' | b'"') => {
                i = skip_quoted(bytes, i, quote);
                has_code = true;
            }
            b'-' if bytes.get(i + 1) == Some(&b'-') => {
                i = skip_line_comment(bytes, i);
            }
            b'/' if bytes.get(i + 1) == Some(&b'*') => {
                i = skip_block_comment(bytes, i);
            }
            // `$` continuing an identifier (`foo$bar`) never opens a tag.
            b'$' if i > 0 && is_ident_byte(bytes[i - 1]) => {
                i += 1;
                has_code = true;
            }
            b'$' => {
                i = dollar_quote_end(bytes, i).unwrap_or(i + 1);
                has_code = true;
            }
            STATEMENT_SEPARATOR => {
                if has_code {
                    statements.push(sql[start..i].trim());
                }
                has_code = false;
                i += 1;
                start = i;
            }
            b if b.is_ascii_whitespace() => i += 1,
            _ => {
                has_code = true;
                i += 1;
            }
        }
    }

    if has_code {
        statements.push(sql[start..].trim());
    }

    statements
}

/// Index just past the closing quote; unterminated quotes run to the end.
fn skip_quoted(bytes: &[u8], open: usize, quote: u8) -> usize {
    let mut j = open + 1;
    while j < bytes.len() {
        if bytes[j] == quote {
            if bytes.get(j + 1) == Some(&quote) {
                j += 2;
                continue;
            }
            return j + 1;
        }
        j += 1;
    }
    bytes.len()
}

fn skip_line_comment(bytes: &[u8], start: usize) -> usize {
    bytes[start..]
        .iter()
        .position(|&b| b == b'\n')
        .map(|offset| start + offset + 1)
        .unwrap_or(bytes.len())
}

fn skip_block_comment(bytes: &[u8], start: usize) -> usize {
    let mut depth = 0usize;
    let mut j = start;
    while j + 1 < bytes.len() {
        match (bytes[j], bytes[j + 1]) {
            (b'/', b'*') => {
                depth += 1;
                j += 2;
            }
            (b'*', b'/') => {
                depth -= 1;
                j += 2;
                if depth == 0 {
                    return j;
                }
            }
            _ => j += 1,
        }
    }
    bytes.len()
}

fn is_ident_byte(b: u8) -> bool {
    b.is_ascii_alphanumeric() || b == b'_' || b >= 0x80
}

/// If a dollar-quote tag opens at `start`, the index just past its closing tag.
///
/// `$1`-style positional parameters are not tags.
fn dollar_quote_end(bytes: &[u8], start: usize) -> Option<usize> {
    let mut j = start + 1;
    if bytes.get(j).is_some_and(u8::is_ascii_digit) {
        return None;
    }
    while j < bytes.len() && (bytes[j].is_ascii_alphanumeric() || bytes[j] == b'_') {
        j += 1;
    }
    if bytes.get(j) != Some(&b'$') {
        return None;
    }

    let tag = &bytes[start..=j];
    let body_start = j + 1;
    let close = bytes[body_start..]
        .windows(tag.len())
        .position(|window| window == tag)
        .map(|offset| body_start + offset + tag.len())
        .unwrap_or(bytes.len());
    Some(close)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_splits_on_separator_and_trims() {
        let sql = "CREATE TABLE t (id int);\n\n  ALTER TABLE t ADD COLUMN name text;  \n";
        assert_eq!(
            split_statements(sql),
            vec!["CREATE TABLE t (id int)", "ALTER TABLE t ADD COLUMN name text"]
        );
    }

    #[test]
    fn test_last_statement_without_separator() {
        assert_eq!(split_statements("SELECT 1; SELECT 2"), vec!["SELECT 1", "SELECT 2"]);
    }

    #[test]
    fn test_empty_and_whitespace_content() {
        assert!(split_statements("").is_empty());
        assert!(split_statements("  \n\t ;; ;\n").is_empty());
    }

    #[test]
    fn test_comment_only_content_has_no_statements() {
        let sql = "-- nothing to do yet\n/* placeholder; really */\n";
        assert!(split_statements(sql).is_empty());
    }

    #[test]
    fn test_separator_inside_string_literal() {
        let sql = "INSERT INTO notes VALUES ('a;b', 'it''s; fine'); SELECT 1;";
        assert_eq!(
            split_statements(sql),
            vec!["INSERT INTO notes VALUES ('a;b', 'it''s; fine')", "SELECT 1"]
        );
    }

    #[test]
    fn test_separator_inside_quoted_identifier() {
        let sql = r#"CREATE TABLE "odd;name" (id int);"#;
        assert_eq!(split_statements(sql), vec![r#"CREATE TABLE "odd;name" (id int)"#]);
    }

    #[test]
    fn test_separator_inside_comments() {
        let sql = "CREATE TABLE a (id int); -- trailing; comment\n/* block; /* nested; */ still; */ CREATE TABLE b (id int);";
        let statements = split_statements(sql);

        assert_eq!(statements.len(), 2);
        assert_eq!(statements[0], "CREATE TABLE a (id int)");
        assert!(statements[1].ends_with("CREATE TABLE b (id int)"));
    }

    #[test]
    fn test_separator_inside_dollar_quotes() {
        let sql = "CREATE FUNCTION f() RETURNS int AS $body$ BEGIN RETURN 1; END; $body$ LANGUAGE plpgsql;\nSELECT $$a;b$$;";
        let statements = split_statements(sql);

        assert_eq!(statements.len(), 2);
        assert!(statements[0].starts_with("CREATE FUNCTION f()"));
        assert!(statements[0].ends_with("LANGUAGE plpgsql"));
        assert_eq!(statements[1], "SELECT $$a;b$$");
    }

    #[test]
    fn test_positional_parameters_are_not_dollar_quotes() {
        let sql = "SELECT $1; SELECT 2;";
        assert_eq!(split_statements(sql), vec!["SELECT $1", "SELECT 2"]);
    }

    #[test]
    fn test_dollar_inside_identifier_is_not_a_tag() {
        let sql = "SELECT foo$bar$baz FROM t; SELECT 2;";
        assert_eq!(split_statements(sql), vec!["SELECT foo$bar$baz FROM t", "SELECT 2"]);
    }

    #[test]
    fn test_dollar_quote_after_identifier_boundary_still_opens() {
        let sql = "SELECT length($x$a;b$x$), col$1 FROM t; SELECT 3;";
        assert_eq!(
            split_statements(sql),
            vec!["SELECT length($x$a;b$x$), col$1 FROM t", "SELECT 3"]
        );
    }

    #[test]
    fn test_multibyte_text_is_preserved() {
        let sql = "INSERT INTO courses (title) VALUES ('Educació canina'); SELECT 'ñ';";
        assert_eq!(
            split_statements(sql),
            vec!["INSERT INTO courses (title) VALUES ('Educació canina')", "SELECT 'ñ'"]
        );
    }
}
