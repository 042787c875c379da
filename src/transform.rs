use lazy_static::lazy_static;
use regex::{Captures, NoExpand, Regex};

/// Replacement for the opening `<html>` + heading span.
///
/// Written as PL/SQL string literals joined by `||`, since the result is
/// pasted back into the body of a stored procedure.
pub const HEADER_LITERAL: &str = "'<html> <style>table{}' || \
'th,td{border:1px solid #ccc;padding:6px}' || \
'.center{text-align:center};' || '</style>' || \
'<h2 style=\"font-size:18px ; color:orange ; font-weight: bold\"> '";

/// Replacement for every opening `<table ...>` tag
pub const TABLE_LITERAL: &str =
    "'<table style=\"font-size:12px;border-collapse:collapse;width:100%\">'";

/// Opening literal for static (label) cells
pub const HEADER_CELL_LITERAL: &str =
    "'<td class=\"center\" style=\"background:#f2f2f2;font-weight: bold;\"><center>'";

/// Opening literal for cells whose content is itself concatenated at run time
pub const BODY_CELL_LITERAL: &str = "'<td class=\"center\" style=\"font-weight: normal;\"><center>'";

/// Closing literal shared by both cell styles
pub const CELL_CLOSE_LITERAL: &str = "'</center></td>'";

/// PL/SQL concatenation operator
const CONCAT: &str = "||";

lazy_static! {
    static ref HEADER_REGEX: Regex = Regex::new(r"(?i)<html>\s*<h[^>]*>").unwrap();
    static ref TABLE_REGEX: Regex = Regex::new(r"(?i)<table[^>]*>").unwrap();
    static ref CELL_REGEX: Regex = Regex::new(r"(?is)<td[^>]*>(.*?)</td>").unwrap();
}

/// Style of a rewritten `<td>` fragment
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CellStyle {
    /// Bold on a light-gray background
    Header,
    /// Normal weight
    Body,
}

impl CellStyle {
    /// Cells whose inner text contains `||` are built at run time and get the body style.
    pub fn classify(inner: &str) -> Self {
        if inner.contains(CONCAT) {
            CellStyle::Body
        } else {
            CellStyle::Header
        }
    }

    pub fn open_literal(self) -> &'static str {
        match self {
            CellStyle::Header => HEADER_CELL_LITERAL,
            CellStyle::Body => BODY_CELL_LITERAL,
        }
    }
}

/// Restyle the HTML fragments embedded in a procedure's source.
///
/// Three rules run in order, each over the output of the previous one:
///
/// 1. the first `<html>` directly followed by a heading tag becomes
///    [`HEADER_LITERAL`];
/// 2. every `<table ...>` becomes [`TABLE_LITERAL`];
/// 3. every `<td ...>inner</td>` (across lines, shortest match) becomes
///    `open || inner || close`, where `open` depends on [`CellStyle::classify`].
///
/// Matching is case-insensitive and purely textual. Attributes of the
/// replaced tags are dropped; the captured cell content is kept verbatim.
///
/// # Examples
/// ```
/// use plsql_restyle::transform::{transform, HEADER_CELL_LITERAL, CELL_CLOSE_LITERAL};
///
/// let out = transform("<td><b>X</b></td>");
/// assert_eq!(out, format!("{} || <b>X</b> || {}", HEADER_CELL_LITERAL, CELL_CLOSE_LITERAL));
/// ```
pub fn transform(source: &str) -> String {
    let text = HEADER_REGEX.replacen(source, 1, NoExpand(HEADER_LITERAL));
    let text = TABLE_REGEX.replace_all(&text, NoExpand(TABLE_LITERAL));
    let text = CELL_REGEX.replace_all(&text, |caps: &Captures| {
        let inner = caps.get(1).map_or("", |m| m.as_str());
        wrap_cell(CellStyle::classify(inner), inner)
    });
    text.into_owned()
}

fn wrap_cell(style: CellStyle, inner: &str) -> String {
    format!(
        "{} {} {} {} {}",
        style.open_literal(),
        CONCAT,
        inner,
        CONCAT,
        CELL_CLOSE_LITERAL
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn text_without_markers_is_unchanged() {
        let src = "PROCEDURE P AS\nBEGIN\n  v := 'a' || 'b';\n  htp.p('<p>hi</p>');\nEND;\n";
        assert_eq!(transform(src), src);
        assert_eq!(transform(""), "");
    }

    #[test]
    fn header_rule_replaces_open_span_only() {
        let out = transform("<html>  <h1>Title</h1>");
        assert_eq!(out, format!("{}Title</h1>", HEADER_LITERAL));
    }

    #[test]
    fn header_rule_spans_newlines_and_drops_attributes() {
        let out = transform("v := '<HTML>\n   <H3 class=\"x\">Report';");
        assert_eq!(out, format!("v := '{}Report';", HEADER_LITERAL));
    }

    #[test]
    fn header_rule_fires_once() {
        let out = transform("<html><h1>A</h1>\n<html><h2>B</h2>");
        assert_eq!(out.matches(HEADER_LITERAL).count(), 1);
        assert!(out.starts_with(HEADER_LITERAL));
        assert!(out.ends_with("<html><h2>B</h2>"));
    }

    #[test]
    fn header_rule_needs_heading_right_after_html() {
        let src = "<html><body><h1>A</h1>";
        assert_eq!(transform(src), src);
    }

    #[test]
    fn every_table_tag_is_replaced() {
        let src = "<table>x</table><TABLE CLASS=X border=1>y</TABLE><Table\nid=\"t\">";
        let out = transform(src);
        assert_eq!(out.matches(TABLE_LITERAL).count(), 3);
        assert!(!out.to_lowercase().contains("class=x"));
        assert!(out.contains("</table>"));
        assert!(out.contains("</TABLE>"));
    }

    #[test]
    fn zero_tables_zero_literals() {
        let out = transform("<td>a</td>");
        assert_eq!(out.matches(TABLE_LITERAL).count(), 0);
    }

    #[test]
    fn static_cell_gets_header_style() {
        let out = transform("<td><b>X</b></td>");
        assert_eq!(
            out,
            format!("{} || <b>X</b> || {}", HEADER_CELL_LITERAL, CELL_CLOSE_LITERAL)
        );
    }

    #[test]
    fn concatenated_cell_gets_body_style() {
        let out = transform("'<td align=\"right\">' || r.total || '</td>'");
        assert_eq!(
            out,
            format!(
                "'{} || ' || r.total || ' || {}'",
                BODY_CELL_LITERAL, CELL_CLOSE_LITERAL
            )
        );
    }

    #[test]
    fn cell_match_is_shortest_and_multiline() {
        let src = "<TD>\n  Name\n</TD><td>'||x||'</td>";
        let out = transform(src);
        let expected = format!(
            "{} || \n  Name\n || {}{} || '||x||' || {}",
            HEADER_CELL_LITERAL, CELL_CLOSE_LITERAL, BODY_CELL_LITERAL, CELL_CLOSE_LITERAL
        );
        assert_eq!(out, expected);
    }

    #[test]
    fn unclosed_cell_is_left_alone() {
        let src = "<td>open";
        assert_eq!(transform(src), src);
    }

    #[test]
    fn rules_do_not_rematch_earlier_output() {
        let out = transform("<html><h1>T</h1><table border=1><tr><td>A</td></tr></table>");
        assert_eq!(out.matches(HEADER_LITERAL).count(), 1);
        assert_eq!(out.matches(TABLE_LITERAL).count(), 1);
        assert_eq!(out.matches(HEADER_CELL_LITERAL).count(), 1);
        assert_eq!(out.matches(BODY_CELL_LITERAL).count(), 0);
    }

    #[test]
    fn classify_looks_only_for_double_bar() {
        assert_eq!(CellStyle::classify("a | b"), CellStyle::Header);
        assert_eq!(CellStyle::classify("'||v||'"), CellStyle::Body);
        assert_eq!(CellStyle::classify(""), CellStyle::Header);
    }
}
