/// SQL Dialect Module
///
/// Identifier quoting, literal escaping and table prefixing. Everything here is
/// pure string manipulation so that the builder can compile statements without
/// a live database handle.

/// Character used to escape `%`, `_` and itself inside LIKE patterns.
pub const LIKE_ESCAPE_CHAR: char = '!';

/// Quoting and escaping rules of a SQL backend.
pub trait Dialect {
    /// Character wrapped around identifiers.
    fn escape_char(&self) -> char {
        '"'
    }

    /// Table prefix configured for this connection.
    fn db_prefix(&self) -> &str {
        ""
    }

    /// Escapes a string for inclusion inside a single-quoted literal.
    ///
    /// The caller is responsible for adding the surrounding quotes.
    fn escape_string(&self, value: &str) -> String {
        value.replace('\'', "''")
    }

    /// Escapes and quotes a string literal.
    fn escape_literal(&self, value: &str) -> String {
        format!("'{}'", self.escape_string(value))
    }

    /// Escapes a string for use in a LIKE pattern with `ESCAPE '!'`.
    fn escape_like_string(&self, value: &str) -> String {
        let mut out = String::with_capacity(value.len());
        for c in self.escape_string(value).chars() {
            if c == LIKE_ESCAPE_CHAR || c == '%' || c == '_' {
                out.push(LIKE_ESCAPE_CHAR);
            }
            out.push(c);
        }
        out
    }

    /// The ` ESCAPE '!' ` clause appended after a LIKE pattern.
    fn like_escape_clause(&self) -> String {
        format!(" ESCAPE '{}' ", LIKE_ESCAPE_CHAR)
    }

    /// Adds the configured prefix unless the table already carries it.
    fn prefix_table(&self, table: &str) -> String {
        let prefix = self.db_prefix();
        if prefix.is_empty() || table.starts_with(prefix) {
            table.to_string()
        } else {
            format!("{prefix}{table}")
        }
    }

    /// Quotes every dotted segment of an identifier.
    ///
    /// Segments that are already quoted, and `*`, are left alone.
    fn protect_identifiers(&self, item: &str) -> String {
        let quote = self.escape_char();
        item.split('.')
            .map(|segment| {
                let segment = segment.trim();
                if segment == "*" || (segment.len() >= 2 && segment.starts_with(quote) && segment.ends_with(quote)) {
                    segment.to_string()
                } else {
                    let doubled = format!("{quote}{quote}");
                    format!("{quote}{}{quote}", segment.replace(quote, &doubled))
                }
            })
            .collect::<Vec<_>>()
            .join(".")
    }

    /// Statement removing every row of an already protected table name.
    fn empty_table_statement(&self, protected_table: &str) -> String {
        format!("DELETE FROM {protected_table}")
    }

    /// Statement truncating an already protected table name.
    fn truncate_statement(&self, protected_table: &str) -> String {
        format!("TRUNCATE {protected_table}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Generic;
    impl Dialect for Generic {}

    struct Prefixed;
    impl Dialect for Prefixed {
        fn escape_char(&self) -> char {
            '`'
        }

        fn db_prefix(&self) -> &str {
            "ci_"
        }
    }

    #[test]
    fn test_protect_identifiers() {
        assert_eq!(Generic.protect_identifiers("jobs"), "\"jobs\"");
        assert_eq!(Generic.protect_identifiers("main.jobs"), "\"main\".\"jobs\"");
        assert_eq!(Generic.protect_identifiers("\"jobs\""), "\"jobs\"");
        assert_eq!(Generic.protect_identifiers("jobs.*"), "\"jobs\".*");
        assert_eq!(Generic.protect_identifiers("we\"ird"), "\"we\"\"ird\"");
        assert_eq!(Prefixed.protect_identifiers("user"), "`user`");
    }

    #[test]
    fn test_escaping() {
        assert_eq!(Generic.escape_string("O'Brien"), "O''Brien");
        assert_eq!(Generic.escape_literal("O'Brien"), "'O''Brien'");
        assert_eq!(Generic.escape_like_string("ci_"), "ci!_");
        assert_eq!(Generic.escape_like_string("50%!"), "50!%!!");
        assert_eq!(Generic.like_escape_clause(), " ESCAPE '!' ");
    }

    #[test]
    fn test_prefix_table() {
        assert_eq!(Generic.prefix_table("jobs"), "jobs");
        assert_eq!(Prefixed.prefix_table("jobs"), "ci_jobs");
        assert_eq!(Prefixed.prefix_table("ci_jobs"), "ci_jobs");
    }

    #[test]
    fn test_table_statements() {
        let table = Generic.protect_identifiers("jobs");
        assert_eq!(Generic.empty_table_statement(&table), "DELETE FROM \"jobs\"");
        assert_eq!(Generic.truncate_statement(&table), "TRUNCATE \"jobs\"");
    }
}
