// ==============================================================================
// sql.rs - Statement Builder
// ==============================================================================
// Description: Small SQL AST rendered per dialect (ClickHouse / SQLite) so
//              identifier quoting and null handling live in one place
// Author: Matt Barham
// Created: 2025-11-14
// Modified: 2025-11-20
// Version: 1.1.0
// ==============================================================================

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// SQL dialect of the target engine
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Dialect {
    /// ClickHouse-family columnar engine (production warehouse)
    ClickHouse,
    /// Embedded SQLite (local verification and tests)
    Sqlite,
}

impl Dialect {
    pub fn as_str(&self) -> &'static str {
        match self {
            Dialect::ClickHouse => "clickhouse",
            Dialect::Sqlite => "sqlite",
        }
    }

    /// Quote an already-normalized identifier
    pub fn quote_ident(&self, name: &str) -> String {
        match self {
            Dialect::ClickHouse => format!("`{}`", name.replace('`', "``")),
            Dialect::Sqlite => format!("\"{}\"", name.replace('"', "\"\"")),
        }
    }

    /// Render a string literal
    pub fn quote_literal(&self, value: &str) -> String {
        match self {
            // ClickHouse treats backslash as an escape inside string literals
            Dialect::ClickHouse => format!("'{}'", value.replace('\\', "\\\\").replace('\'', "''")),
            Dialect::Sqlite => format!("'{}'", value.replace('\'', "''")),
        }
    }
}

impl fmt::Display for Dialect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Dialect {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "clickhouse" | "ch" => Ok(Dialect::ClickHouse),
            "sqlite" | "sqlite3" => Ok(Dialect::Sqlite),
            other => Err(format!("unknown SQL dialect '{}'", other)),
        }
    }
}

/// Table or column name, lower-cased at construction
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Ident(String);

impl Ident {
    pub fn new(name: &str) -> Self {
        Self(name.trim().to_lowercase())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Display for Ident {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Scalar expression
#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    Column { qualifier: Option<String>, name: Ident },
    Literal(String),
    Integer(i64),
    /// Coerce to text
    ToText(Box<Expr>),
    /// Text concatenation of every part (nulls as empty) with a separator
    Joined { parts: Vec<Expr>, separator: String },
    IsNull(Box<Expr>),
    IsNotNull(Box<Expr>),
    Eq(Box<Expr>, Box<Expr>),
    Gt(Box<Expr>, Box<Expr>),
    Max(Box<Expr>),
    CountRows,
}

impl Expr {
    pub fn column(qualifier: &str, name: &Ident) -> Self {
        Expr::Column {
            qualifier: Some(qualifier.to_string()),
            name: name.clone(),
        }
    }

    pub fn bare_column(name: &Ident) -> Self {
        Expr::Column {
            qualifier: None,
            name: name.clone(),
        }
    }

    pub fn literal(value: impl Into<String>) -> Self {
        Expr::Literal(value.into())
    }

    pub fn is_null(self) -> Self {
        Expr::IsNull(Box::new(self))
    }

    pub fn is_not_null(self) -> Self {
        Expr::IsNotNull(Box::new(self))
    }

    pub fn equals(self, other: Expr) -> Self {
        Expr::Eq(Box::new(self), Box::new(other))
    }

    pub fn greater_than(self, other: Expr) -> Self {
        Expr::Gt(Box::new(self), Box::new(other))
    }

    /// Pipe-delimited text of the given columns.
    ///
    /// A single column is only coerced to text: some engines reject a
    /// one-argument `concat`.
    pub fn pipe_joined(qualifier: &str, columns: &[Ident]) -> Self {
        let mut parts: Vec<Expr> = columns.iter().map(|c| Expr::column(qualifier, c)).collect();
        if parts.len() == 1 {
            return Expr::ToText(Box::new(parts.remove(0)));
        }
        Expr::Joined {
            parts,
            separator: "|".to_string(),
        }
    }

    pub fn render(&self, dialect: Dialect) -> String {
        match self {
            Expr::Column { qualifier, name } => match qualifier {
                Some(q) => format!("{}.{}", q, dialect.quote_ident(name.as_str())),
                None => dialect.quote_ident(name.as_str()),
            },
            Expr::Literal(value) => dialect.quote_literal(value),
            Expr::Integer(value) => value.to_string(),
            Expr::ToText(inner) => render_to_text(inner, dialect),
            Expr::Joined { parts, separator } => {
                let sep = dialect.quote_literal(separator);
                let texts: Vec<String> = parts
                    .iter()
                    .map(|p| match dialect {
                        Dialect::ClickHouse => format!("ifNull({}, '')", render_to_text(p, dialect)),
                        Dialect::Sqlite => format!("ifnull({}, '')", render_to_text(p, dialect)),
                    })
                    .collect();
                match dialect {
                    Dialect::ClickHouse => {
                        format!("concat({})", texts.join(&format!(", {}, ", sep)))
                    }
                    Dialect::Sqlite => texts.join(&format!(" || {} || ", sep)),
                }
            }
            Expr::IsNull(inner) => match dialect {
                Dialect::ClickHouse => format!("isNull({})", inner.render(dialect)),
                Dialect::Sqlite => format!("{} IS NULL", inner.render(dialect)),
            },
            Expr::IsNotNull(inner) => match dialect {
                Dialect::ClickHouse => format!("isNotNull({})", inner.render(dialect)),
                Dialect::Sqlite => format!("{} IS NOT NULL", inner.render(dialect)),
            },
            Expr::Eq(left, right) => format!("{} = {}", left.render(dialect), right.render(dialect)),
            Expr::Gt(left, right) => format!("{} > {}", left.render(dialect), right.render(dialect)),
            Expr::Max(inner) => format!("max({})", inner.render(dialect)),
            Expr::CountRows => match dialect {
                Dialect::ClickHouse => "count()".to_string(),
                Dialect::Sqlite => "count(*)".to_string(),
            },
        }
    }
}

fn render_to_text(expr: &Expr, dialect: Dialect) -> String {
    match dialect {
        Dialect::ClickHouse => format!("toString({})", expr.render(dialect)),
        Dialect::Sqlite => format!("CAST({} AS TEXT)", expr.render(dialect)),
    }
}

#[derive(Debug, Clone, PartialEq)]
struct TableRef {
    table: Ident,
    alias: Option<String>,
}

impl TableRef {
    fn render(&self, dialect: Dialect) -> String {
        match &self.alias {
            Some(alias) => format!("{} AS {}", dialect.quote_ident(self.table.as_str()), alias),
            None => dialect.quote_ident(self.table.as_str()),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
struct LeftJoin {
    table: TableRef,
    on: Vec<Expr>,
}

/// SELECT statement with a single FROM table and optional LEFT JOINs
#[derive(Debug, Clone, PartialEq)]
pub struct Select {
    projections: Vec<(Expr, Option<String>)>,
    from: TableRef,
    joins: Vec<LeftJoin>,
    filters: Vec<Expr>,
    group_by: Vec<Expr>,
    having: Vec<Expr>,
}

impl Select {
    pub fn from(table: &Ident, alias: Option<&str>) -> Self {
        Self {
            projections: Vec::new(),
            from: TableRef {
                table: table.clone(),
                alias: alias.map(str::to_string),
            },
            joins: Vec::new(),
            filters: Vec::new(),
            group_by: Vec::new(),
            having: Vec::new(),
        }
    }

    pub fn project(mut self, expr: Expr, alias: &str) -> Self {
        self.projections.push((expr, Some(alias.to_string())));
        self
    }

    pub fn left_join(mut self, table: &Ident, alias: &str, on: Vec<Expr>) -> Self {
        self.joins.push(LeftJoin {
            table: TableRef {
                table: table.clone(),
                alias: Some(alias.to_string()),
            },
            on,
        });
        self
    }

    pub fn filter(mut self, predicate: Expr) -> Self {
        self.filters.push(predicate);
        self
    }

    pub fn group_by(mut self, expr: Expr) -> Self {
        self.group_by.push(expr);
        self
    }

    pub fn having(mut self, predicate: Expr) -> Self {
        self.having.push(predicate);
        self
    }

    pub fn render(&self, dialect: Dialect) -> String {
        let projections: Vec<String> = self
            .projections
            .iter()
            .map(|(expr, alias)| match alias {
                Some(a) => format!("{} AS {}", expr.render(dialect), a),
                None => expr.render(dialect),
            })
            .collect();

        let mut sql = format!(
            "SELECT {}\nFROM {}",
            projections.join(", "),
            self.from.render(dialect)
        );

        for join in &self.joins {
            sql.push_str(&format!(
                "\nLEFT JOIN {} ON {}",
                join.table.render(dialect),
                render_conjunction(&join.on, dialect)
            ));
        }
        if !self.filters.is_empty() {
            sql.push_str(&format!("\nWHERE {}", render_conjunction(&self.filters, dialect)));
        }
        if !self.group_by.is_empty() {
            let keys: Vec<String> = self.group_by.iter().map(|e| e.render(dialect)).collect();
            sql.push_str(&format!("\nGROUP BY {}", keys.join(", ")));
        }
        if !self.having.is_empty() {
            sql.push_str(&format!("\nHAVING {}", render_conjunction(&self.having, dialect)));
        }
        sql
    }
}

fn render_conjunction(predicates: &[Expr], dialect: Dialect) -> String {
    predicates
        .iter()
        .map(|p| p.render(dialect))
        .collect::<Vec<_>>()
        .join(" AND ")
}

/// Parameterized INSERT, one `?` placeholder per field
#[derive(Debug, Clone, PartialEq)]
pub struct Insert {
    table: Ident,
    columns: Vec<Ident>,
    arity: usize,
}

impl Insert {
    /// Insert in the table's natural column order
    pub fn positional(table: &Ident, arity: usize) -> Self {
        Self {
            table: table.clone(),
            columns: Vec::new(),
            arity,
        }
    }

    pub fn with_columns(table: &Ident, columns: &[Ident]) -> Self {
        Self {
            table: table.clone(),
            columns: columns.to_vec(),
            arity: columns.len(),
        }
    }

    pub fn render(&self, dialect: Dialect) -> String {
        let placeholders = vec!["?"; self.arity].join(", ");
        if self.columns.is_empty() {
            format!(
                "INSERT INTO {} VALUES ({})",
                dialect.quote_ident(self.table.as_str()),
                placeholders
            )
        } else {
            let columns: Vec<String> = self
                .columns
                .iter()
                .map(|c| dialect.quote_ident(c.as_str()))
                .collect();
            format!(
                "INSERT INTO {} ({}) VALUES ({})",
                dialect.quote_ident(self.table.as_str()),
                columns.join(", "),
                placeholders
            )
        }
    }
}

/// `SELECT max(column) FROM table`, used to seed sequences
pub fn max_value_query(table: &Ident, column: &Ident, dialect: Dialect) -> String {
    Select::from(table, None)
        .project(Expr::Max(Box::new(Expr::bare_column(column))), "max_value")
        .render(dialect)
}
