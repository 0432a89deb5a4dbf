//! Parsing of the ISUPPORT (numeric `005`) tokens the bridged client introspects:
//! `NICKLEN` and the `PREFIX` mode/symbol table.

/// Parsed subset of a server's ISUPPORT announcement relevant to this crate.
#[derive(Clone, Debug, Default)]
pub struct IsupportTable {
    /// Maximum nick length, if the server advertised `NICKLEN`.
    nicklen: Option<usize>,
    /// Prefix symbols in decreasing order of power, as advertised by `PREFIX=(modes)symbols`.
    prefixes: Vec<char>,
}

impl IsupportTable {
    /// Creates an empty table (no `NICKLEN`, no `PREFIX` known yet).
    pub fn new() -> Self {
        Self::default()
    }

    /// Folds one numeric `005` line's arguments into the table.
    ///
    /// Unrecognized tokens are ignored; malformed `NICKLEN=`/`PREFIX=` values leave the
    /// previous state untouched.
    pub fn apply(&mut self, args: &[&str]) {
        for arg in args {
            if let Some(value) = arg.strip_prefix("NICKLEN=") {
                if let Ok(n) = value.parse() {
                    self.nicklen = Some(n);
                }
            } else if let Some(value) = arg.strip_prefix("PREFIX=") {
                if let Some(symbols) = Self::parse_prefix_symbols(value) {
                    self.prefixes = symbols;
                }
            }
        }
    }

    fn parse_prefix_symbols(value: &str) -> Option<Vec<char>> {
        let close = value.strip_prefix('(')?;
        let paren_end = close.find(')')?;
        let symbols = &close[paren_end + 1..];
        Some(symbols.chars().collect())
    }

    /// The server-advertised `NICKLEN`, if known.
    pub fn nicklen(&self) -> Option<usize> {
        self.nicklen
    }

    /// Returns `true` if `prefix` is `@` or ranks ahead of `@` in the PREFIX table (i.e. is
    /// "more powerful than `@`").
    pub fn is_operator_or_stronger(&self, prefix: char) -> bool {
        if prefix == '@' {
            return true;
        }
        let Some(prefix_rank) = self.prefixes.iter().position(|&c| c == prefix) else {
            return false;
        };
        let Some(at_rank) = self.prefixes.iter().position(|&c| c == '@') else {
            return false;
        };
        prefix_rank < at_rank
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_nicklen() {
        let mut table = IsupportTable::new();
        table.apply(&["NICKLEN=30", "CHANTYPES=#"]);
        assert_eq!(table.nicklen(), Some(30));
    }

    #[test]
    fn parses_prefix_and_ranks_operator() {
        let mut table = IsupportTable::new();
        table.apply(&["PREFIX=(qaohv)~&@%+"]);
        assert!(table.is_operator_or_stronger('@'));
        assert!(table.is_operator_or_stronger('&'));
        assert!(table.is_operator_or_stronger('~'));
        assert!(!table.is_operator_or_stronger('%'));
        assert!(!table.is_operator_or_stronger('+'));
    }

    #[test]
    fn unknown_prefix_is_not_operator() {
        let table = IsupportTable::new();
        assert!(!table.is_operator_or_stronger('+'));
    }

    #[test]
    fn at_symbol_is_always_operator_even_without_prefix_table() {
        let table = IsupportTable::new();
        assert!(table.is_operator_or_stronger('@'));
    }
}
